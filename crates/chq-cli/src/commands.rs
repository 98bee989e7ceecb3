//! Wizard-driving subcommands.
//!
//! Every command prints a JSON report of where the request stands, so the
//! output can be piped into other tools.

use std::path::Path;
use std::sync::Arc;

use chq_client::models::ExternalChequeQuery;
use chq_client::{DeviceIdStore, EnvToken, GatewayClient, ImageSide, ReqwestTransport, Transport};
use chq_core::{Branch, RequestId, ScreenId};
use chq_host::{HostAdapter, LogChannel, detect};
use chq_workflow::{Call, Operation, OperationView, ScreenRouter, Wizard};
use serde_json::{Map, Value, json};

use crate::config::ChqConfig;
use crate::error::{Error, Result};

/// Builds a wizard talking to the configured gateway over HTTP.
pub fn build_wizard(config: &ChqConfig) -> Result<Wizard> {
    let transport = ReqwestTransport::new(&config.gateway)?;
    build_wizard_with(config, Arc::new(transport))
}

/// Builds a wizard over `transport`.
pub fn build_wizard_with(config: &ChqConfig, transport: Arc<dyn Transport>) -> Result<Wizard> {
    let device_path = config
        .device
        .id_file
        .clone()
        .or_else(DeviceIdStore::default_path)
        .ok_or_else(|| Error::config("no data directory for the device id; set device.id_file"))?;
    let device_id = DeviceIdStore::new(device_path).load_or_create()?;

    let client = GatewayClient::new(
        config.gateway.clone(),
        transport,
        Arc::new(EnvToken::new(config.auth.token_env.clone())),
        config.identity.clone(),
        device_id,
    );

    let bridge = detect(
        &config.host.environment(),
        &config.host.detection,
        Arc::new(LogChannel),
    );
    let host = HostAdapter::new(bridge).with_triggers(config.host.trigger_table()?);
    tracing::debug!(
        base_url = %config.gateway.base_url,
        embedded = host.is_embedded(),
        "Wizard ready"
    );
    Ok(Wizard::new(client, host))
}

/// Mints a request and, if it is still at the start, enters a sub-path.
pub async fn cmd_start(wizard: &mut Wizard, external: bool) -> Result<Value> {
    wizard.start().await?;
    if wizard.store().request_id().is_some() && wizard.store().screen() == ScreenId::Start {
        let branch = if external {
            Branch::External
        } else {
            Branch::Internal
        };
        wizard.choose_branch(branch).await?;
    }
    report(wizard)
}

/// Continues `request_id` from wherever the gateway says it is.
pub async fn cmd_resume(wizard: &mut Wizard, request_id: &str) -> Result<Value> {
    wizard.resume(RequestId::new(request_id)).await?;
    report(wizard)
}

/// Looks up another bank's cheque without minting a request.
pub async fn cmd_inquiry(wizard: &mut Wizard, sayad_id: &str, national_id: &str) -> Result<Value> {
    wizard.mount();
    let query = ExternalChequeQuery {
        sayad_id: sayad_id.to_string(),
        national_id: national_id.to_string(),
    };
    wizard.run(Call::ExternalInquiry(query)).await?;

    let mut report = report(wizard)?;
    if let (Some(cheque), Value::Object(map)) = (
        wizard.store().trackers().external_inquiry.data(),
        &mut report,
    ) {
        map.insert("cheque".to_string(), serde_json::to_value(cheque)?);
    }
    Ok(report)
}

/// Downloads one side of a stored cheque image into `out`.
///
/// Downloads are not tracked, so nothing about the workflow changes.
pub async fn cmd_image(
    wizard: &Wizard,
    request_id: &str,
    side: ImageSide,
    out: &Path,
) -> Result<Value> {
    let request_id = RequestId::new(request_id);
    let bytes = wizard
        .client()
        .download_image(&request_id, side)
        .await
        .map_err(chq_core::Error::from)?;
    std::fs::write(out, &bytes).map_err(|e| Error::io_with_path(e, out))?;
    tracing::info!(request_id = %request_id, side = ?side, bytes = bytes.len(), "Image saved");
    Ok(json!({
        "request_id": request_id,
        "side": side.as_str(),
        "path": out,
        "bytes": bytes.len(),
    }))
}

/// Screen order with branch, route and entry loads.
pub fn cmd_screens() -> Value {
    let screens = ScreenRouter::order()
        .iter()
        .map(|screen| {
            let descriptor = ScreenRouter::descriptor(*screen);
            json!({
                "screen": screen,
                "branch": screen.branch(),
                "route": ScreenRouter::route(*screen).path,
                "loads": descriptor.loads,
                "observes": descriptor.observes,
                "fallback": descriptor.fallback,
            })
        })
        .collect();
    Value::Array(screens)
}

/// Where the wizard stands, and every tracker that is not idle.
pub fn report(wizard: &Wizard) -> Result<Value> {
    let store = wizard.store();
    let mut views = Map::new();
    for op in Operation::ALL {
        let view = wizard.view(*op);
        if view != OperationView::Idle {
            views.insert(op.name().to_string(), serde_json::to_value(&view)?);
        }
    }
    Ok(json!({
        "request_id": store.request_id(),
        "step": store.step(),
        "screen": store.screen(),
        "route": wizard.host().current_route().map(|route| route.path.clone()),
        "outcome": wizard.outcome(),
        "views": views,
    }))
}
