//! Integration tests for the internal (own chequebook) issuance path.

use chq_client::Method;
use chq_client::models::{AccountSelection, ChequebookSelection, SheetSelection};
use chq_core::{Branch, Error, ScreenId, WorkflowStep};
use chq_workflow::{Call, NO_CHEQUEBOOK, Operation, OperationView, RecoveryAction, StepOutcome};
use serde_json::json;

use crate::common::{REQUEST_ID, TestHarness, image, sayad_id};

#[tokio::test]
async fn test_start_on_upload_step_fetches_requirements() {
    let harness = TestHarness::new();
    harness
        .script_start("UPLOAD")
        .ok(
            Method::Get,
            "/requests/abc123/subsystem-requirements",
            json!({"requirements": [{"code": "SIGN", "mandatory": true}]}),
        )
        .ok(Method::Get, "/images/abc123/info", json!({}));
    let mut wizard = harness.wizard();

    wizard.start().await.unwrap();

    let store = wizard.store();
    assert_eq!(store.request_id().unwrap().as_str(), REQUEST_ID);
    assert_eq!(store.step(), WorkflowStep::Upload);
    assert_eq!(store.screen(), ScreenId::Upload);
    assert_eq!(harness.calls("/requests/abc123/subsystem-requirements"), 1);
    let requirements = store.trackers().subsystem_requirements.data().unwrap();
    assert_eq!(requirements.requirements[0].code, "SIGN");
    assert_eq!(wizard.host().current_route().unwrap().path, "/cheque/upload");
}

#[tokio::test]
async fn test_internal_path_reaches_sheet_status() {
    let harness = TestHarness::new();
    harness
        .script_start("INIT")
        .ok(
            Method::Get,
            "/accounts/abc123/list",
            json!({"accounts": [{"account_number": "0101234567"}]}),
        )
        .ok(Method::Put, "/accounts/abc123/add", json!({}))
        .ok(
            Method::Get,
            "/chequebooks/abc123/list",
            json!({"chequebooks": [{"chequebook_number": "CB-1"}]}),
        )
        .ok(Method::Put, "/chequebooks/abc123/add", json!({}))
        .ok(
            Method::Post,
            "/cheques/list",
            json!({"sheets": [{"sayad_id": sayad_id()}]}),
        )
        .ok(Method::Post, "/requests/compare", json!({"matched": true}));
    let mut wizard = harness.wizard();

    wizard.start().await.unwrap();
    assert_eq!(wizard.store().screen(), ScreenId::Start);

    wizard.choose_branch(Branch::Internal).await.unwrap();
    assert_eq!(wizard.store().screen(), ScreenId::Accounts);
    assert!(wizard.store().trackers().accounts_list.data().is_some());

    wizard
        .run(Call::AddAccount(AccountSelection {
            account_number: "0101234567".into(),
        }))
        .await
        .unwrap();
    assert_eq!(wizard.store().screen(), ScreenId::Checkbooks);
    assert_eq!(harness.calls("/chequebooks/abc123/list"), 1);

    wizard
        .run(Call::AddChequebook(ChequebookSelection {
            chequebook_number: "CB-1".into(),
        }))
        .await
        .unwrap();
    assert_eq!(wizard.store().screen(), ScreenId::Sheets);
    let sheets_request = &harness.transport.requests_to("/cheques/list")[0];
    assert!(matches!(
        &sheets_request.body,
        chq_client::RequestBody::Json(body) if body["request_id"] == json!(REQUEST_ID)
    ));

    wizard
        .run(Call::ChequeStatus(SheetSelection {
            sayad_id: sayad_id(),
        }))
        .await
        .unwrap();
    assert_eq!(wizard.store().screen(), ScreenId::Status);
    assert!(wizard.store().trackers().cheque_status.data().unwrap().matched);
}

#[tokio::test]
async fn test_no_chequebook_shows_empty_view() {
    let harness = TestHarness::new();
    harness
        .script_start("INIT")
        .ok(Method::Get, "/accounts/abc123/list", json!({"accounts": []}))
        .ok(Method::Put, "/accounts/abc123/add", json!({}))
        .ok(Method::Get, "/chequebooks/abc123/list", json!({"chequebooks": []}))
        .error(
            Method::Put,
            "/chequebooks/abc123/add",
            422,
            json!({"error_code": NO_CHEQUEBOOK, "error_message": "No chequebook is available"}),
        );
    let mut wizard = harness.wizard();
    wizard.start().await.unwrap();
    wizard.choose_branch(Branch::Internal).await.unwrap();
    wizard
        .run(Call::AddAccount(AccountSelection {
            account_number: "0101234567".into(),
        }))
        .await
        .unwrap();

    wizard
        .run(Call::AddChequebook(ChequebookSelection {
            chequebook_number: "CB-1".into(),
        }))
        .await
        .unwrap();

    let view = wizard.view(Operation::AddChequebook);
    assert_eq!(
        view,
        OperationView::Empty {
            message: "No chequebook is available".into(),
            actions: vec![RecoveryAction::ReturnToStart],
        }
    );
    assert_eq!(wizard.store().screen(), ScreenId::Checkbooks);

    wizard
        .recover(Operation::AddChequebook, RecoveryAction::ReturnToStart)
        .await
        .unwrap();
    assert_eq!(wizard.store().screen(), ScreenId::Start);
    assert!(wizard.store().request_id().is_none());
}

#[tokio::test]
async fn test_retryable_failure_then_retry() {
    let harness = TestHarness::new();
    harness
        .script_start("INIT")
        .error(
            Method::Get,
            "/accounts/abc123/list",
            503,
            json!({"code": "CQMS-20001", "message": "Core banking busy", "retryable": true}),
        )
        .ok(
            Method::Get,
            "/accounts/abc123/list",
            json!({"accounts": [{"account_number": "0101234567"}]}),
        );
    let mut wizard = harness.wizard();
    wizard.start().await.unwrap();
    wizard.choose_branch(Branch::Internal).await.unwrap();

    let view = wizard.view(Operation::AccountsList);
    assert_eq!(
        view.actions(),
        &[
            RecoveryAction::Retry,
            RecoveryAction::Confirm {
                target: ScreenId::Start
            }
        ]
    );

    wizard
        .recover(Operation::AccountsList, RecoveryAction::Retry)
        .await
        .unwrap();
    assert_eq!(wizard.view(Operation::AccountsList), OperationView::Loaded);
    assert_eq!(harness.calls("/accounts/abc123/list"), 2);
}

#[tokio::test]
async fn test_validation_never_touches_trackers() {
    let harness = TestHarness::new();
    harness.script_start("INIT");
    let mut wizard = harness.wizard();
    wizard.start().await.unwrap();
    let sent = harness.transport.requests().len();

    let err = wizard
        .run(Call::ChequeStatus(SheetSelection {
            sayad_id: "12345".into(),
        }))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation { .. }));
    assert!(wizard.store().trackers().is_initial(Operation::ChequeStatus));
    assert_eq!(harness.transport.requests().len(), sent);
}

#[tokio::test]
async fn test_request_id_is_required() {
    let harness = TestHarness::new();
    let mut wizard = harness.wizard();
    wizard.mount();

    let err = wizard.run(Call::ImagesInfo).await.unwrap_err();
    assert!(matches!(err, Error::MissingRequestId));
    assert!(harness.transport.requests().is_empty());
}

#[tokio::test]
async fn test_images_already_stored_enable_confirm() {
    let harness = TestHarness::new();
    harness
        .script_start("UPLOAD")
        .ok(Method::Get, "/requests/abc123/subsystem-requirements", json!({}))
        .ok(
            Method::Get,
            "/images/abc123/info",
            json!({"front_image": "front-ref", "back_image": "back-ref"}),
        )
        .ok(Method::Put, "/images/abc123/send", json!({"step": "SEND_IMAGE"}));
    let mut wizard = harness.wizard();
    wizard.start().await.unwrap();

    let upload = wizard.upload_view();
    assert!(upload.front_ready && upload.back_ready);
    assert!(upload.confirm_enabled);

    assert!(wizard.confirm_images().await.unwrap());
    assert_eq!(harness.calls("/images/abc123/front-upload"), 0);
    assert_eq!(harness.calls("/images/abc123/back-upload"), 0);
    assert_eq!(wizard.store().step(), WorkflowStep::SendImage);
    assert_eq!(wizard.store().screen(), ScreenId::Confirm);
}

#[tokio::test]
async fn test_confirm_uploads_selected_images() {
    let harness = TestHarness::new();
    harness
        .script_start("UPLOAD")
        .ok(Method::Get, "/requests/abc123/subsystem-requirements", json!({}))
        .ok(Method::Get, "/images/abc123/info", json!({}))
        .ok(Method::Put, "/images/abc123/front-upload", json!({}))
        .ok(Method::Put, "/images/abc123/back-upload", json!({}))
        .ok(Method::Put, "/images/abc123/send", json!({"step": "SEND_IMAGE"}));
    let mut wizard = harness.wizard();
    wizard.start().await.unwrap();
    assert!(!wizard.upload_view().confirm_enabled);
    assert!(wizard.confirm_images().await.is_err());

    wizard.select_front(image("front.jpg")).unwrap();
    wizard.select_back(image("back.jpg")).unwrap();
    assert!(wizard.confirm_images().await.unwrap());

    assert_eq!(harness.calls("/images/abc123/front-upload"), 1);
    assert_eq!(harness.calls("/images/abc123/back-upload"), 1);
    assert_eq!(harness.calls("/images/abc123/send"), 1);
    assert_eq!(wizard.store().step(), WorkflowStep::SendImage);
}

#[tokio::test]
async fn test_failed_upload_is_not_submitted() {
    let harness = TestHarness::new();
    harness
        .script_start("UPLOAD")
        .ok(Method::Get, "/requests/abc123/subsystem-requirements", json!({}))
        .ok(Method::Get, "/images/abc123/info", json!({}))
        .error(
            Method::Put,
            "/images/abc123/front-upload",
            413,
            json!({"message": "Image too large"}),
        )
        .ok(Method::Put, "/images/abc123/back-upload", json!({}));
    let mut wizard = harness.wizard();
    wizard.start().await.unwrap();
    wizard.select_front(image("front.jpg")).unwrap();
    wizard.select_back(image("back.jpg")).unwrap();

    assert!(!wizard.confirm_images().await.unwrap());
    assert_eq!(harness.calls("/images/abc123/send"), 0);
    assert!(wizard.upload_view().front_ready);
    assert!(matches!(
        wizard.view(Operation::FrontUpload),
        OperationView::Failed { .. }
    ));
}

#[tokio::test]
async fn test_out_of_order_completions_keep_latest() {
    let harness = TestHarness::new();
    harness
        .script_start("INIT")
        .ok(Method::Get, "/images/abc123/info", json!({"front_image": "first"}))
        .ok(Method::Get, "/images/abc123/info", json!({"front_image": "second"}));
    let mut wizard = harness.wizard();
    wizard.start().await.unwrap();

    let older = wizard.begin(Call::ImagesInfo).unwrap();
    let newer = wizard.begin(Call::ImagesInfo).unwrap();
    let older = older.complete().await;
    let newer = newer.complete().await;

    assert!(wizard.apply(newer).unwrap().settlement.is_applied());
    assert!(!wizard.apply(older).unwrap().settlement.is_applied());

    let info = wizard.store().trackers().images_info.data().unwrap();
    assert_eq!(info.front_image.as_deref(), Some("second"));
    assert!(!wizard.store().trackers().images_info.is_loading());
}

#[tokio::test]
async fn test_resume_into_delivery() {
    let harness = TestHarness::new();
    harness.script_step("DELIVERY").ok(
        Method::Get,
        "/cheques/abc123/delivery-info",
        json!({"branch_name": "Central", "tracking_code": "TRK-9"}),
    );
    let mut wizard = harness.wizard();

    wizard.resume(REQUEST_ID.into()).await.unwrap();

    assert_eq!(wizard.store().screen(), ScreenId::DeliveryInfo);
    let info = wizard.store().trackers().delivery_info.data().unwrap();
    assert_eq!(info.tracking_code.as_deref(), Some("TRK-9"));
    assert_eq!(wizard.outcome(), StepOutcome::InProgress);
}

#[tokio::test]
async fn test_rejected_physical_cheque_is_terminal() {
    let harness = TestHarness::new();
    harness.script_step("REJECT_PHYSIC");
    let mut wizard = harness.wizard();

    wizard.resume(REQUEST_ID.into()).await.unwrap();

    assert_eq!(wizard.outcome(), StepOutcome::Rejected);
    assert_eq!(wizard.store().screen(), ScreenId::DeliveryInfo);
    assert_eq!(harness.calls("/cheques/abc123/delivery-info"), 0);
}
