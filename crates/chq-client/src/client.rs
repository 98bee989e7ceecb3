//! Gateway client implementation.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use chq_core::{DeviceId, ErrorInfo, RequestId, TraceNumber};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::auth::TokenProvider;
use crate::config::GatewayConfig;
use crate::headers::{self, ClientIdentity};
use crate::models::{
    AccountList, AccountSelection, Ack, ChequeDetail, ChequeStatus, ChequebookList,
    ChequebookSelection, DeliveryInfo, ExternalCheque, ExternalChequeQuery, ImageFile, ImagesInfo,
    InitResponse, IssueResult, SheetList, SheetSelection, StepInquiry, StepTransition,
    SubsystemRequirements, WithRequestId,
};
use crate::normalize;
use crate::transport::{HttpRequest, HttpResponse, Method, RequestBody, Transport};

/// Outcome of a gateway call: the decoded payload or a normalised failure.
pub type ApiResult<T> = std::result::Result<T, ErrorInfo>;

const RETRY_MIN_DELAY: Duration = Duration::from_millis(200);
const RETRY_MAX_DELAY: Duration = Duration::from_secs(5);

/// Which side of the cheque an image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSide {
    /// Front of the cheque
    Front,
    /// Back of the cheque
    Back,
}

impl ImageSide {
    /// `front` or `back`, as used in endpoint paths.
    pub fn as_str(self) -> &'static str {
        match self {
            ImageSide::Front => "front",
            ImageSide::Back => "back",
        }
    }
}

/// Client for the cheque issuance gateway.
///
/// Cheap to clone; every clone shares the transport and token provider.
#[derive(Clone)]
pub struct GatewayClient {
    config: GatewayConfig,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenProvider>,
    identity: ClientIdentity,
    device_id: DeviceId,
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("config", &self.config)
            .field("identity", &self.identity)
            .field("device_id", &self.device_id)
            .finish_non_exhaustive()
    }
}

impl GatewayClient {
    /// Creates a client.
    pub fn new(
        config: GatewayConfig,
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenProvider>,
        identity: ClientIdentity,
        device_id: DeviceId,
    ) -> Self {
        Self {
            config,
            transport,
            tokens,
            identity,
            device_id,
        }
    }

    /// Connection settings.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Device id sent with every call.
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    // ------------------------------------------------------------
    // Request lifecycle
    // ------------------------------------------------------------

    /// `POST /requests/init`
    pub async fn init_request(&self) -> ApiResult<InitResponse> {
        self.call(Method::Post, "/requests/init", RequestBody::Empty)
            .await
    }

    /// `GET /requests/{id}/step-inquiry`
    pub async fn step_inquiry(&self, request_id: &RequestId) -> ApiResult<StepInquiry> {
        self.call(
            Method::Get,
            &format!("/requests/{}/step-inquiry", segment(request_id)),
            RequestBody::Empty,
        )
        .await
    }

    /// `PUT /requests/{id}/back`
    pub async fn back_request(&self, request_id: &RequestId) -> ApiResult<StepTransition> {
        self.call(
            Method::Put,
            &format!("/requests/{}/back", segment(request_id)),
            RequestBody::Empty,
        )
        .await
    }

    /// `GET /requests/{id}/subsystem-requirements`
    pub async fn subsystem_requirements(
        &self,
        request_id: &RequestId,
    ) -> ApiResult<SubsystemRequirements> {
        self.call(
            Method::Get,
            &format!("/requests/{}/subsystem-requirements", segment(request_id)),
            RequestBody::Empty,
        )
        .await
    }

    // ------------------------------------------------------------
    // Accounts, chequebooks, sheets
    // ------------------------------------------------------------

    /// `GET /accounts/{id}/list`
    pub async fn accounts_list(&self, request_id: &RequestId) -> ApiResult<AccountList> {
        self.call(
            Method::Get,
            &format!("/accounts/{}/list", segment(request_id)),
            RequestBody::Empty,
        )
        .await
    }

    /// `PUT /accounts/{id}/add`
    pub async fn add_account(
        &self,
        request_id: &RequestId,
        selection: &AccountSelection,
    ) -> ApiResult<Ack> {
        self.call(
            Method::Put,
            &format!("/accounts/{}/add", segment(request_id)),
            json_body(selection)?,
        )
        .await
    }

    /// `GET /chequebooks/{id}/list`
    pub async fn chequebooks_list(&self, request_id: &RequestId) -> ApiResult<ChequebookList> {
        self.call(
            Method::Get,
            &format!("/chequebooks/{}/list", segment(request_id)),
            RequestBody::Empty,
        )
        .await
    }

    /// `PUT /chequebooks/{id}/add`
    pub async fn add_chequebook(
        &self,
        request_id: &RequestId,
        selection: &ChequebookSelection,
    ) -> ApiResult<Ack> {
        self.call(
            Method::Put,
            &format!("/chequebooks/{}/add", segment(request_id)),
            json_body(selection)?,
        )
        .await
    }

    /// `POST /cheques/list`
    pub async fn sheets_list(
        &self,
        request_id: &RequestId,
        selection: &ChequebookSelection,
    ) -> ApiResult<SheetList> {
        let body = json_body(&WithRequestId {
            request_id,
            body: selection,
        })?;
        self.call(Method::Post, "/cheques/list", body).await
    }

    /// `POST /requests/compare`
    pub async fn cheque_status(
        &self,
        request_id: &RequestId,
        selection: &SheetSelection,
    ) -> ApiResult<ChequeStatus> {
        let body = json_body(&WithRequestId {
            request_id,
            body: selection,
        })?;
        self.call(Method::Post, "/requests/compare", body).await
    }

    /// `PUT /cheques/internal-add`
    pub async fn internal_add_cheque(
        &self,
        request_id: &RequestId,
        selection: &SheetSelection,
    ) -> ApiResult<StepTransition> {
        let body = json_body(&WithRequestId {
            request_id,
            body: selection,
        })?;
        self.call(Method::Put, "/cheques/internal-add", body).await
    }

    // ------------------------------------------------------------
    // Images
    // ------------------------------------------------------------

    /// `GET /images/{id}/info`
    pub async fn images_info(&self, request_id: &RequestId) -> ApiResult<ImagesInfo> {
        self.call(
            Method::Get,
            &format!("/images/{}/info", segment(request_id)),
            RequestBody::Empty,
        )
        .await
    }

    /// `PUT /images/{id}/front-upload` or `back-upload` (multipart)
    pub async fn upload_image(
        &self,
        request_id: &RequestId,
        side: ImageSide,
        image: &ImageFile,
    ) -> ApiResult<Ack> {
        let body = RequestBody::Multipart {
            field: "file".to_string(),
            file_name: image.file_name.clone(),
            mime: image.mime.clone(),
            bytes: image.bytes.clone(),
        };
        self.call(
            Method::Put,
            &format!("/images/{}/{}-upload", segment(request_id), side.as_str()),
            body,
        )
        .await
    }

    /// `GET /images/{id}/front-download` or `back-download`, raw bytes
    pub async fn download_image(
        &self,
        request_id: &RequestId,
        side: ImageSide,
    ) -> ApiResult<Vec<u8>> {
        let path = format!("/images/{}/{}-download", segment(request_id), side.as_str());
        let url = self.config.url(&path);
        self.send(Method::Get, &url, RequestBody::Empty)
            .await
            .map(|response| response.body)
    }

    /// `PUT /images/{id}/send`
    pub async fn images_send(&self, request_id: &RequestId) -> ApiResult<StepTransition> {
        self.call(
            Method::Put,
            &format!("/images/{}/send", segment(request_id)),
            RequestBody::Empty,
        )
        .await
    }

    // ------------------------------------------------------------
    // Internal cheque
    // ------------------------------------------------------------

    /// `GET /cheques/{id}/internal-detail`
    pub async fn internal_detail(&self, request_id: &RequestId) -> ApiResult<ChequeDetail> {
        self.call(
            Method::Get,
            &format!("/cheques/{}/internal-detail", segment(request_id)),
            RequestBody::Empty,
        )
        .await
    }

    /// `PUT /cheques/{id}/internal-detail`
    pub async fn save_internal_detail(
        &self,
        request_id: &RequestId,
        detail: &ChequeDetail,
    ) -> ApiResult<ChequeDetail> {
        self.call(
            Method::Put,
            &format!("/cheques/{}/internal-detail", segment(request_id)),
            json_body(detail)?,
        )
        .await
    }

    /// `PUT /cheques/{id}/issue`
    pub async fn issue(&self, request_id: &RequestId) -> ApiResult<IssueResult> {
        self.call(
            Method::Put,
            &format!("/cheques/{}/issue", segment(request_id)),
            RequestBody::Empty,
        )
        .await
    }

    /// `GET /cheques/{id}/delivery-info`
    pub async fn delivery_info(&self, request_id: &RequestId) -> ApiResult<DeliveryInfo> {
        self.call(
            Method::Get,
            &format!("/cheques/{}/delivery-info", segment(request_id)),
            RequestBody::Empty,
        )
        .await
    }

    // ------------------------------------------------------------
    // Other-bank cheque
    // ------------------------------------------------------------

    /// `GET /cheques/{id}/external-detail`
    pub async fn external_detail(&self, request_id: &RequestId) -> ApiResult<ChequeDetail> {
        self.call(
            Method::Get,
            &format!("/cheques/{}/external-detail", segment(request_id)),
            RequestBody::Empty,
        )
        .await
    }

    /// `PUT /cheques/{id}/external-issue`
    pub async fn external_issue(&self, request_id: &RequestId) -> ApiResult<IssueResult> {
        self.call(
            Method::Put,
            &format!("/cheques/{}/external-issue", segment(request_id)),
            RequestBody::Empty,
        )
        .await
    }

    /// `POST /cheques/external-inquiry`
    pub async fn external_inquiry(&self, query: &ExternalChequeQuery) -> ApiResult<ExternalCheque> {
        self.call(Method::Post, "/cheques/external-inquiry", json_body(query)?)
            .await
    }

    /// `PUT /cheques/external-add`
    pub async fn external_add(
        &self,
        request_id: &RequestId,
        query: &ExternalChequeQuery,
    ) -> ApiResult<StepTransition> {
        let body = json_body(&WithRequestId {
            request_id,
            body: query,
        })?;
        self.call(Method::Put, "/cheques/external-add", body).await
    }

    // ------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------

    async fn call<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> ApiResult<R> {
        let url = self.config.url(path);
        let response = self.send(method, &url, body).await?;
        decode(&response, method, &url)
    }

    async fn send(&self, method: Method, url: &str, body: RequestBody) -> ApiResult<HttpResponse> {
        let attempt = || self.send_once(method, url, body.clone());

        if !method.is_idempotent_read() || self.config.retry_attempts == 0 {
            return attempt().await;
        }

        attempt
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(RETRY_MIN_DELAY)
                    .with_max_delay(RETRY_MAX_DELAY)
                    .with_max_times(self.config.retry_attempts),
            )
            .sleep(tokio::time::sleep)
            .when(|err: &ErrorInfo| err.retryable)
            .notify(|err: &ErrorInfo, delay: Duration| {
                tracing::warn!(
                    method = %method,
                    url = %url,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying gateway call"
                );
            })
            .await
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        body: RequestBody,
    ) -> ApiResult<HttpResponse> {
        let token = self.tokens.access_token().await;
        let trace = TraceNumber::generate();
        let request = HttpRequest {
            method,
            url: url.to_string(),
            headers: headers::build(token.as_deref(), &self.device_id, &trace, &self.identity),
            body,
        };

        tracing::debug!(method = %method, url = %url, trace_number = %trace, "Sending gateway request");

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                let info = normalize::from_transport(&err, method, url);
                tracing::warn!(
                    method = %method,
                    url = %url,
                    trace_number = %trace,
                    kind = %info.kind,
                    transport_error = %err,
                    "Gateway unreachable"
                );
                return Err(info);
            }
        };

        if response.is_success() {
            tracing::debug!(status = response.status, trace_number = %trace, "Gateway request succeeded");
            return Ok(response);
        }

        let info = normalize::from_response(response.status, &response.body, method, url);
        tracing::warn!(
            method = %method,
            url = %url,
            trace_number = %trace,
            status = response.status,
            code = info.code.as_deref().unwrap_or("-"),
            retryable = info.retryable,
            "Gateway call failed"
        );
        Err(info)
    }
}

/// A request id as one percent-encoded path segment.
fn segment(request_id: &RequestId) -> Cow<'_, str> {
    urlencoding::encode(request_id.as_str())
}

fn json_body<T: Serialize>(body: &T) -> ApiResult<RequestBody> {
    serde_json::to_value(body).map(RequestBody::Json).map_err(|e| {
        let mut info = ErrorInfo::new(chq_core::ErrorKind::Decode, "Request body could not be encoded");
        info.transport_message = Some(e.to_string());
        info
    })
}

fn decode<R: DeserializeOwned>(response: &HttpResponse, method: Method, url: &str) -> ApiResult<R> {
    // Acknowledgements often come back as 204 or a blank 200.
    let body: &[u8] = if response.body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        &response.body
    };
    serde_json::from_slice(body)
        .map_err(|e| normalize::decode_failure(&e, response.status, method, url))
}
