//! Integration tests for the external (other bank's cheque) path.

use chq_client::Method;
use chq_client::models::ExternalChequeQuery;
use chq_core::{Branch, ScreenId, WorkflowStep};
use chq_workflow::{Call, Operation, OperationView};
use serde_json::json;

use crate::common::{REQUEST_ID, TestHarness, sayad_id};

fn query() -> ExternalChequeQuery {
    ExternalChequeQuery {
        sayad_id: sayad_id(),
        national_id: "0012345678".into(),
    }
}

#[tokio::test]
async fn test_external_path_binds_cheque_and_moves_to_upload() {
    let harness = TestHarness::new();
    harness
        .script_start("INIT")
        .ok(
            Method::Post,
            "/cheques/external-inquiry",
            json!({"sayad_id": sayad_id(), "bank_name": "Other Bank", "owner_name": "R. Tehrani"}),
        )
        .ok(Method::Put, "/cheques/external-add", json!({"step": "UPLOAD"}))
        .ok(Method::Get, "/requests/abc123/subsystem-requirements", json!({}))
        .ok(Method::Get, "/images/abc123/info", json!({}));
    let mut wizard = harness.wizard();
    wizard.start().await.unwrap();

    wizard.choose_branch(Branch::External).await.unwrap();
    assert_eq!(wizard.store().screen(), ScreenId::SayadExternal);

    wizard.run(Call::ExternalInquiry(query())).await.unwrap();
    assert_eq!(wizard.store().screen(), ScreenId::ExternalInquiry);
    let cheque = wizard.store().trackers().external_inquiry.data().unwrap();
    assert_eq!(cheque.bank_name.as_deref(), Some("Other Bank"));

    wizard.run(Call::ExternalAdd(query())).await.unwrap();
    assert_eq!(wizard.store().step(), WorkflowStep::Upload);
    assert_eq!(wizard.store().screen(), ScreenId::Upload);
    assert_eq!(harness.calls("/requests/abc123/subsystem-requirements"), 1);
}

#[tokio::test]
async fn test_external_inquiry_needs_no_request_id() {
    let harness = TestHarness::new();
    harness.ok(Method::Post, "/cheques/external-inquiry", json!({"status": "ACTIVE"}));
    let mut wizard = harness.wizard();
    wizard.mount();

    wizard.run(Call::ExternalInquiry(query())).await.unwrap();

    assert!(wizard.store().request_id().is_none());
    assert_eq!(wizard.view(Operation::ExternalInquiry), OperationView::Loaded);
}

#[tokio::test]
async fn test_external_add_failure_stays_in_branch() {
    let harness = TestHarness::new();
    harness
        .script_start("INIT")
        .ok(Method::Post, "/cheques/external-inquiry", json!({}))
        .error(
            Method::Put,
            "/cheques/external-add",
            400,
            json!({"errorCode": "CQMS-30012", "errorMessage": "Cheque already registered"}),
        );
    let mut wizard = harness.wizard();
    wizard.start().await.unwrap();
    wizard.choose_branch(Branch::External).await.unwrap();
    wizard.run(Call::ExternalInquiry(query())).await.unwrap();

    wizard.run(Call::ExternalAdd(query())).await.unwrap();

    assert_eq!(wizard.store().screen(), ScreenId::ExternalInquiry);
    match wizard.view(Operation::ExternalAdd) {
        OperationView::Failed { code, actions, .. } => {
            assert_eq!(code.as_deref(), Some("CQMS-30012"));
            assert_eq!(
                actions,
                vec![chq_workflow::RecoveryAction::Confirm {
                    target: ScreenId::SayadExternal
                }]
            );
        }
        other => unreachable!("expected a failure view, got {other:?}"),
    }
}

#[tokio::test]
async fn test_external_issue_moves_to_delivery() {
    let harness = TestHarness::new();
    harness
        .script_step("EXTERNAL_ISSUE")
        .ok(
            Method::Get,
            "/cheques/abc123/external-detail",
            json!({"sayad_id": sayad_id(), "amount": 5_000_000}),
        )
        .ok(
            Method::Put,
            "/cheques/abc123/external-issue",
            json!({"sayad_id": sayad_id(), "step": "READY_FOR_DELIVERY"}),
        )
        .ok(Method::Get, "/cheques/abc123/delivery-info", json!({"branch_name": "Central"}));
    let mut wizard = harness.wizard();

    wizard.resume(REQUEST_ID.into()).await.unwrap();
    assert_eq!(wizard.store().screen(), ScreenId::BankConfirmation);
    let detail = wizard.store().trackers().external_detail.data().unwrap();
    assert_eq!(detail.amount, Some(5_000_000));

    wizard.run(Call::ExternalIssue).await.unwrap();
    assert_eq!(wizard.store().step(), WorkflowStep::ReadyForDelivery);
    assert_eq!(wizard.store().screen(), ScreenId::Delivery);
    assert_eq!(harness.calls("/cheques/abc123/delivery-info"), 1);
}
