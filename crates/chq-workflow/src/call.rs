//! A remote call together with its input.
//!
//! [`Call`] is what the wizard hands to the client. Keeping the input next
//! to the operation lets a failed call be re-issued verbatim on "retry".

use chq_client::models::{
    AccountSelection, ChequeDetail, ChequebookSelection, ExternalChequeQuery, ImageFile,
    SheetSelection,
};
use chq_client::{ApiResult, GatewayClient, ImageSide};
use chq_core::{ErrorInfo, ErrorKind, RequestId, Result};

use crate::operations::{Operation, Payload};

/// One gateway call and everything it needs besides the request id.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// Mint a request id
    InitRequest,
    /// Ask where the request is
    StepInquiry,
    /// List eligible accounts
    AccountsList,
    /// Bind an account
    AddAccount(AccountSelection),
    /// List chequebooks of the bound account
    ChequebooksList,
    /// Bind a chequebook
    AddChequebook(ChequebookSelection),
    /// List sheets of a chequebook
    SheetsList(ChequebookSelection),
    /// Compare a sheet with the bank's record
    ChequeStatus(SheetSelection),
    /// Bind a sheet of an own chequebook
    InternalAddCheque(SheetSelection),
    /// Which images the server holds
    ImagesInfo,
    /// Upload the front image
    FrontUpload(ImageFile),
    /// Upload the back image
    BackUpload(ImageFile),
    /// Submit both images
    ImagesSend,
    /// Step the request back server-side
    BackRequest,
    /// Downstream prerequisites
    SubsystemRequirements,
    /// Read the cheque detail
    InternalDetail,
    /// Save the cheque detail
    SaveInternalDetail(ChequeDetail),
    /// Issue an own cheque
    Issue,
    /// Pickup information
    DeliveryInfo,
    /// Read an external cheque's detail
    ExternalDetail,
    /// Issue an external cheque
    ExternalIssue,
    /// Look up another bank's cheque
    ExternalInquiry(ExternalChequeQuery),
    /// Bind another bank's cheque
    ExternalAdd(ExternalChequeQuery),
}

impl Call {
    /// The tracker this call settles.
    ///
    /// Reading and saving the internal detail share one tracker.
    pub fn operation(&self) -> Operation {
        match self {
            Call::InitRequest => Operation::InitRequest,
            Call::StepInquiry => Operation::StepInquiry,
            Call::AccountsList => Operation::AccountsList,
            Call::AddAccount(_) => Operation::AddAccount,
            Call::ChequebooksList => Operation::ChequebooksList,
            Call::AddChequebook(_) => Operation::AddChequebook,
            Call::SheetsList(_) => Operation::SheetsList,
            Call::ChequeStatus(_) => Operation::ChequeStatus,
            Call::InternalAddCheque(_) => Operation::InternalAddCheque,
            Call::ImagesInfo => Operation::ImagesInfo,
            Call::FrontUpload(_) => Operation::FrontUpload,
            Call::BackUpload(_) => Operation::BackUpload,
            Call::ImagesSend => Operation::ImagesSend,
            Call::BackRequest => Operation::BackRequest,
            Call::SubsystemRequirements => Operation::SubsystemRequirements,
            Call::InternalDetail | Call::SaveInternalDetail(_) => Operation::InternalDetail,
            Call::Issue => Operation::Issue,
            Call::DeliveryInfo => Operation::DeliveryInfo,
            Call::ExternalDetail => Operation::ExternalDetail,
            Call::ExternalIssue => Operation::ExternalIssue,
            Call::ExternalInquiry(_) => Operation::ExternalInquiry,
            Call::ExternalAdd(_) => Operation::ExternalAdd,
        }
    }

    /// The input-free call for `op`, if it has one.
    pub fn load(op: Operation) -> Option<Call> {
        let call = match op {
            Operation::InitRequest => Call::InitRequest,
            Operation::StepInquiry => Call::StepInquiry,
            Operation::AccountsList => Call::AccountsList,
            Operation::ChequebooksList => Call::ChequebooksList,
            Operation::ImagesInfo => Call::ImagesInfo,
            Operation::ImagesSend => Call::ImagesSend,
            Operation::BackRequest => Call::BackRequest,
            Operation::SubsystemRequirements => Call::SubsystemRequirements,
            Operation::InternalDetail => Call::InternalDetail,
            Operation::Issue => Call::Issue,
            Operation::DeliveryInfo => Call::DeliveryInfo,
            Operation::ExternalDetail => Call::ExternalDetail,
            Operation::ExternalIssue => Call::ExternalIssue,
            Operation::AddAccount
            | Operation::AddChequebook
            | Operation::SheetsList
            | Operation::ChequeStatus
            | Operation::InternalAddCheque
            | Operation::FrontUpload
            | Operation::BackUpload
            | Operation::ExternalInquiry
            | Operation::ExternalAdd => return None,
        };
        Some(call)
    }

    /// Whether the call is addressed by request id.
    pub fn requires_request_id(&self) -> bool {
        !matches!(self, Call::InitRequest | Call::ExternalInquiry(_))
    }

    /// Checks user input. A failing call never reaches a tracker.
    pub fn validate(&self) -> Result<()> {
        match self {
            Call::AddAccount(selection) => selection.validate(),
            Call::AddChequebook(selection) | Call::SheetsList(selection) => selection.validate(),
            Call::ChequeStatus(selection) | Call::InternalAddCheque(selection) => {
                selection.validate()
            }
            Call::FrontUpload(image) | Call::BackUpload(image) => image.validate(),
            Call::SaveInternalDetail(detail) => detail.validate(),
            Call::ExternalInquiry(query) | Call::ExternalAdd(query) => query.validate(),
            _ => Ok(()),
        }
    }

    /// Issues the call and tags the result with its operation.
    pub async fn execute(
        self,
        client: &GatewayClient,
        request_id: Option<&RequestId>,
    ) -> ApiResult<Payload> {
        let op = self.operation();
        let id = || required(request_id, op);
        let payload = match self {
            Call::InitRequest => Payload::InitRequest(client.init_request().await?),
            Call::StepInquiry => Payload::StepInquiry(client.step_inquiry(id()?).await?),
            Call::AccountsList => Payload::AccountsList(client.accounts_list(id()?).await?),
            Call::AddAccount(selection) => {
                Payload::AddAccount(client.add_account(id()?, &selection).await?)
            }
            Call::ChequebooksList => {
                Payload::ChequebooksList(client.chequebooks_list(id()?).await?)
            }
            Call::AddChequebook(selection) => {
                Payload::AddChequebook(client.add_chequebook(id()?, &selection).await?)
            }
            Call::SheetsList(selection) => {
                Payload::SheetsList(client.sheets_list(id()?, &selection).await?)
            }
            Call::ChequeStatus(selection) => {
                Payload::ChequeStatus(client.cheque_status(id()?, &selection).await?)
            }
            Call::InternalAddCheque(selection) => {
                Payload::InternalAddCheque(client.internal_add_cheque(id()?, &selection).await?)
            }
            Call::ImagesInfo => Payload::ImagesInfo(client.images_info(id()?).await?),
            Call::FrontUpload(image) => {
                Payload::FrontUpload(client.upload_image(id()?, ImageSide::Front, &image).await?)
            }
            Call::BackUpload(image) => {
                Payload::BackUpload(client.upload_image(id()?, ImageSide::Back, &image).await?)
            }
            Call::ImagesSend => Payload::ImagesSend(client.images_send(id()?).await?),
            Call::BackRequest => Payload::BackRequest(client.back_request(id()?).await?),
            Call::SubsystemRequirements => {
                Payload::SubsystemRequirements(client.subsystem_requirements(id()?).await?)
            }
            Call::InternalDetail => Payload::InternalDetail(client.internal_detail(id()?).await?),
            Call::SaveInternalDetail(detail) => {
                Payload::InternalDetail(client.save_internal_detail(id()?, &detail).await?)
            }
            Call::Issue => Payload::Issue(client.issue(id()?).await?),
            Call::DeliveryInfo => Payload::DeliveryInfo(client.delivery_info(id()?).await?),
            Call::ExternalDetail => Payload::ExternalDetail(client.external_detail(id()?).await?),
            Call::ExternalIssue => Payload::ExternalIssue(client.external_issue(id()?).await?),
            Call::ExternalInquiry(query) => {
                Payload::ExternalInquiry(client.external_inquiry(&query).await?)
            }
            Call::ExternalAdd(query) => {
                Payload::ExternalAdd(client.external_add(id()?, &query).await?)
            }
        };
        Ok(payload)
    }
}

fn required(request_id: Option<&RequestId>, op: Operation) -> ApiResult<&RequestId> {
    request_id.ok_or_else(|| {
        ErrorInfo::new(
            ErrorKind::Business,
            format!("{op} needs a request id but none has been minted"),
        )
    })
}
