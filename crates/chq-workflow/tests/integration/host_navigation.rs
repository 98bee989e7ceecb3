//! Integration tests for back handling and host cooperation.

use chq_client::Method;
use chq_client::models::AccountSelection;
use chq_core::{Branch, ScreenId, WorkflowStep};
use chq_host::{HostAction, HostMessage, HostOutcome, Route, RouteTrigger, RouteTriggerTable};
use chq_workflow::{
    BackAction, BackOutcome, Call, Operation, RecoveryAction, ScreenRouter, StoreAction,
};
use serde_json::json;

use crate::common::{INTERFACE, REQUEST_ID, TestHarness};

fn close_on_delivery_info() -> RouteTriggerTable {
    RouteTriggerTable::new().with(
        RouteTrigger::new("/cheque/deliveryInfo", HostAction::Close, Route::new("/home")).unwrap(),
    )
}

fn delivery_harness(harness: TestHarness) -> TestHarness {
    harness.script_step("DELIVERY").ok(
        Method::Get,
        "/cheques/abc123/delivery-info",
        json!({}),
    );
    harness
}

async fn on_checkbooks(harness: &TestHarness) -> chq_workflow::Wizard {
    harness
        .script_start("INIT")
        .ok(Method::Get, "/accounts/abc123/list", json!({}))
        .ok(Method::Put, "/accounts/abc123/add", json!({}))
        .ok(Method::Get, "/chequebooks/abc123/list", json!({}));
    let mut wizard = harness.wizard();
    wizard.start().await.unwrap();
    wizard.choose_branch(Branch::Internal).await.unwrap();
    wizard
        .run(Call::AddAccount(AccountSelection {
            account_number: "42".into(),
        }))
        .await
        .unwrap();
    wizard
}

#[tokio::test]
async fn test_route_trigger_fires_once_when_embedded() {
    let harness = delivery_harness(TestHarness::embedded().with_triggers(close_on_delivery_info()));
    let mut wizard = harness.wizard();

    wizard.resume(REQUEST_ID.into()).await.unwrap();

    let posts = harness.channel.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].0, format!("{INTERFACE}.closeWebView"));
    assert_eq!(
        wizard.host().current_route().unwrap().path,
        "/cheque/deliveryInfo"
    );
}

#[tokio::test]
async fn test_route_trigger_fallback_out_of_wizard_clears_state() {
    let harness = delivery_harness(TestHarness::new().with_triggers(close_on_delivery_info()));
    let mut wizard = harness.wizard();

    wizard.resume(REQUEST_ID.into()).await.unwrap();

    assert!(harness.channel.posts().is_empty());
    assert_eq!(wizard.host().current_route().unwrap().path, "/home");
    assert_eq!(wizard.store().screen(), ScreenId::Start);
    assert_eq!(wizard.store().step(), WorkflowStep::Init);
    assert!(wizard.store().request_id().is_none());
    assert!(wizard.back_stack().is_empty());
    assert_eq!(harness.calls("/cheques/abc123/delivery-info"), 0);
}

#[tokio::test]
async fn test_route_trigger_fallback_inside_wizard_moves_screen() {
    let harness = delivery_harness(TestHarness::new().with_triggers(RouteTriggerTable::new().with(
        RouteTrigger::new(
            "/cheque/deliveryInfo",
            HostAction::Close,
            ScreenRouter::route(ScreenId::Start),
        )
        .unwrap(),
    )));
    let mut wizard = harness.wizard();

    wizard.resume(REQUEST_ID.into()).await.unwrap();

    assert_eq!(wizard.host().current_route().unwrap().path, "/cheque/start");
    assert_eq!(wizard.store().screen(), ScreenId::Start);
    assert_eq!(wizard.store().step(), WorkflowStep::Delivery);
    assert_eq!(wizard.store().request_id().unwrap().as_str(), REQUEST_ID);
}

#[tokio::test]
async fn test_back_after_restart_stays_in_new_workflow() {
    let harness = TestHarness::new();
    let mut wizard = on_checkbooks(&harness).await;
    wizard
        .recover(Operation::AddChequebook, RecoveryAction::ReturnToStart)
        .await
        .unwrap();
    assert_eq!(wizard.host().history().len(), 1);

    let outcome = wizard.back();

    assert_eq!(
        outcome,
        BackOutcome::Closed(HostOutcome::FellBack(ScreenRouter::route(ScreenId::Start)))
    );
    assert_eq!(wizard.store().screen(), ScreenId::Start);
    assert!(wizard.store().request_id().is_none());
    assert_eq!(
        wizard.host().current_route(),
        Some(&ScreenRouter::route(ScreenId::Start))
    );
}

#[tokio::test]
async fn test_clear_all_back_entry_restarts_wizard() {
    let harness = TestHarness::new();
    let mut wizard = on_checkbooks(&harness).await;
    wizard.register_back(BackAction::State(StoreAction::ClearAll));

    let outcome = wizard.back();

    assert_eq!(outcome, BackOutcome::Dispatched(StoreAction::ClearAll));
    assert_eq!(wizard.store().screen(), ScreenId::Start);
    assert!(wizard.store().request_id().is_none());
    assert!(wizard.back_stack().is_empty());
    assert_eq!(wizard.host().history().len(), 1);

    assert!(wizard.retry(Operation::AddAccount).await.is_err());
    assert_eq!(harness.calls("/accounts/abc123/add"), 1);
}

#[tokio::test]
async fn test_back_follows_screen_default() {
    let harness = TestHarness::new();
    let mut wizard = on_checkbooks(&harness).await;
    assert_eq!(wizard.store().screen(), ScreenId::Checkbooks);

    let outcome = wizard.back();

    assert_eq!(
        outcome,
        BackOutcome::Dispatched(StoreAction::SetScreen(ScreenId::Accounts))
    );
    assert_eq!(wizard.store().screen(), ScreenId::Accounts);
    assert_eq!(wizard.host().current_route().unwrap().path, "/cheque/accounts");

    wizard.back();
    assert_eq!(wizard.store().screen(), ScreenId::Start);
}

#[tokio::test]
async fn test_registered_back_shadows_default_until_removed() {
    let harness = TestHarness::new();
    let mut wizard = on_checkbooks(&harness).await;

    let id = wizard.register_back(BackAction::State(StoreAction::NextStep));
    let outcome = wizard.back();
    assert_eq!(outcome, BackOutcome::Dispatched(StoreAction::NextStep));
    assert_eq!(wizard.store().step(), WorkflowStep::Upload);
    assert_eq!(wizard.store().screen(), ScreenId::Checkbooks);

    assert!(wizard.unregister_back(id));
    wizard.back();
    assert_eq!(wizard.store().screen(), ScreenId::Accounts);
}

#[tokio::test]
async fn test_back_on_delivery_closes_or_falls_back() {
    let embedded = delivery_harness(TestHarness::embedded());
    let mut wizard = embedded.wizard();
    wizard.resume(REQUEST_ID.into()).await.unwrap();

    let outcome = wizard.back();
    assert_eq!(
        outcome,
        BackOutcome::Host(HostOutcome::Delivered(HostMessage::CloseWebView))
    );
    assert_eq!(embedded.channel.posts().len(), 1);
    assert_eq!(wizard.store().screen(), ScreenId::DeliveryInfo);

    let browser = delivery_harness(TestHarness::new());
    let mut wizard = browser.wizard();
    wizard.resume(REQUEST_ID.into()).await.unwrap();

    let outcome = wizard.back();
    assert_eq!(
        outcome,
        BackOutcome::Host(HostOutcome::FellBack(ScreenRouter::route(ScreenId::Start)))
    );
    assert_eq!(wizard.store().screen(), ScreenId::Start);
}

#[tokio::test]
async fn test_back_on_start_without_history_closes() {
    let harness = TestHarness::embedded();
    let mut wizard = harness.wizard();
    wizard.mount();

    let outcome = wizard.back();

    assert_eq!(
        outcome,
        BackOutcome::Closed(HostOutcome::Delivered(HostMessage::CloseWebView))
    );
    assert_eq!(harness.channel.posts().len(), 1);
}

#[tokio::test]
async fn test_route_back_entry_walks_history() {
    let harness = TestHarness::new();
    let mut wizard = on_checkbooks(&harness).await;
    wizard.register_back(BackAction::Route(chq_workflow::RouteChange::Back));

    let outcome = wizard.back();

    assert!(matches!(
        outcome,
        BackOutcome::Navigated(Some(ref nav)) if nav.route == ScreenRouter::route(ScreenId::Accounts)
    ));
    assert_eq!(wizard.store().screen(), ScreenId::Accounts);
}
