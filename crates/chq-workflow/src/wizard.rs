//! The wizard orchestrator.
//!
//! [`Wizard`] owns the store, the back stack and the host adapter, and is
//! the only thing that talks to the gateway. A call is split in two:
//! [`Wizard::begin`] validates input and marks the tracker pending, the
//! returned [`PendingCall`] runs without borrowing the wizard, and
//! [`Wizard::apply`] settles it and decides what happens next. Many calls
//! can be in flight; whichever finishes first is applied first, and the
//! tracker generations take care of the late ones.

use std::collections::HashMap;

use chq_client::models::ImageFile;
use chq_client::{ApiResult, GatewayClient};
use chq_core::{Branch, Error, RequestId, Result, ScreenId, Settlement, WorkflowStep};
use chq_host::{HostAdapter, HostOutcome, Navigation, Route};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde::Serialize;

use crate::back::{BackAction, BackOutcome, BackStack, DelegateId};
use crate::call::Call;
use crate::operations::{Operation, Payload};
use crate::presentation::{OperationView, RecoveryAction, StepOutcome};
use crate::router::ScreenRouter;
use crate::store::{StoreAction, Ticket, WorkflowStore};

/// A call that has been started but not settled.
#[derive(Debug)]
pub struct PendingCall {
    ticket: Ticket,
    call: Call,
    request_id: Option<RequestId>,
    client: GatewayClient,
}

impl PendingCall {
    /// Ticket that settles the call.
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// The call being made.
    pub fn call(&self) -> &Call {
        &self.call
    }

    /// Performs the request. Never fails; failures are carried in the completion.
    pub async fn complete(self) -> Completion {
        let result = self
            .call
            .clone()
            .execute(&self.client, self.request_id.as_ref())
            .await;
        Completion {
            ticket: self.ticket,
            call: self.call,
            result,
        }
    }
}

/// A finished call, ready for [`Wizard::apply`].
#[derive(Debug, Clone)]
pub struct Completion {
    /// Ticket handed out when the call began
    pub ticket: Ticket,
    /// The call that was made
    pub call: Call,
    /// What the gateway answered
    pub result: ApiResult<Payload>,
}

/// What applying a completion did.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    /// Whether the completion was recorded or discarded as stale
    pub settlement: Settlement,
    /// Calls the workflow issues next
    pub follow_ups: Vec<Call>,
}

/// Readiness of the image upload screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UploadView {
    /// A front image is selected or already stored
    pub front_ready: bool,
    /// A back image is selected or already stored
    pub back_ready: bool,
    /// Both sides are ready
    pub confirm_enabled: bool,
}

/// One cheque issuance wizard.
#[derive(Debug)]
pub struct Wizard {
    store: WorkflowStore,
    client: GatewayClient,
    host: HostAdapter,
    back: BackStack,
    screen_delegate: Option<DelegateId>,
    last_calls: HashMap<Operation, Call>,
    front_image: Option<ImageFile>,
    back_image: Option<ImageFile>,
}

impl Wizard {
    /// Creates a wizard at `INIT` / `start`.
    pub fn new(client: GatewayClient, host: HostAdapter) -> Self {
        Self {
            store: WorkflowStore::new(),
            client,
            host,
            back: BackStack::new(),
            screen_delegate: None,
            last_calls: HashMap::new(),
            front_image: None,
            back_image: None,
        }
    }

    /// The state store.
    pub fn store(&self) -> &WorkflowStore {
        &self.store
    }

    /// The host adapter.
    pub fn host(&self) -> &HostAdapter {
        &self.host
    }

    /// The back stack.
    pub fn back_stack(&self) -> &BackStack {
        &self.back
    }

    /// The gateway client.
    pub fn client(&self) -> &GatewayClient {
        &self.client
    }

    // ------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------

    /// Resets everything and shows the start screen.
    pub fn mount(&mut self) {
        self.reset();
        self.show(ScreenId::Start);
    }

    /// Resets everything. Calls still in flight settle as stale.
    pub fn unmount(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.clear_state();
        self.host.clear_history();
    }

    fn clear_state(&mut self) {
        self.store.clear_all();
        self.back.clear();
        self.screen_delegate = None;
        self.last_calls.clear();
        self.front_image = None;
        self.back_image = None;
    }

    /// Starts a new workflow: mint a request id, then ask where it stands.
    pub async fn start(&mut self) -> Result<()> {
        self.mount();
        self.run(Call::InitRequest).await
    }

    /// Continues an existing workflow.
    pub async fn resume(&mut self, request_id: RequestId) -> Result<()> {
        self.mount();
        self.store.set_request_id(request_id)?;
        self.run(Call::StepInquiry).await
    }

    // ------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------

    fn check(&self, call: &Call) -> Result<Option<RequestId>> {
        call.validate()?;
        let request_id = self.store.request_id().cloned();
        if call.requires_request_id() && request_id.is_none() {
            return Err(Error::MissingRequestId);
        }
        Ok(request_id)
    }

    /// Validates `call` and marks its tracker pending.
    ///
    /// Invalid input and a missing request id are rejected here, before any
    /// tracker changes.
    pub fn begin(&mut self, call: Call) -> Result<PendingCall> {
        let request_id = self.check(&call)?;
        let op = call.operation();
        let ticket = self.store.pending(op);
        self.last_calls.insert(op, call.clone());
        tracing::info!(
            operation = %op,
            request_id = ?request_id.as_ref().map(RequestId::as_str),
            "Calling gateway"
        );
        Ok(PendingCall {
            ticket,
            call,
            request_id,
            client: self.client.clone(),
        })
    }

    /// Settles a completion and works out the follow-up calls.
    pub fn apply(&mut self, completion: Completion) -> Result<Applied> {
        let Completion {
            ticket,
            call,
            result,
        } = completion;
        let op = ticket.operation();

        match result {
            Ok(payload) => {
                let settlement = self.store.fulfilled(ticket, payload.clone());
                if !settlement.is_applied() {
                    return Ok(Applied {
                        settlement,
                        follow_ups: Vec::new(),
                    });
                }
                let follow_ups = self.on_success(&call, payload)?;
                Ok(Applied {
                    settlement,
                    follow_ups,
                })
            }
            Err(error) => {
                tracing::warn!(
                    operation = %op,
                    kind = ?error.kind,
                    code = ?error.code,
                    retryable = error.retryable,
                    message = %error.message,
                    "Gateway call failed"
                );
                let settlement = self.store.rejected(ticket, error);
                Ok(Applied {
                    settlement,
                    follow_ups: Vec::new(),
                })
            }
        }
    }

    /// Runs `calls` concurrently, applying completions as they arrive.
    ///
    /// Returns the de-duplicated follow-ups without running them.
    pub async fn load_all(&mut self, calls: Vec<Call>) -> Result<Vec<Call>> {
        for call in &calls {
            self.check(call)?;
        }
        let mut in_flight = FuturesUnordered::new();
        for call in calls {
            in_flight.push(self.begin(call)?.complete());
        }

        let mut follow_ups: Vec<Call> = Vec::new();
        while let Some(completion) = in_flight.next().await {
            for call in self.apply(completion)?.follow_ups {
                if !follow_ups.contains(&call) {
                    follow_ups.push(call);
                }
            }
        }
        Ok(follow_ups)
    }

    /// Runs `calls` and every follow-up they lead to.
    pub async fn run_all(&mut self, calls: Vec<Call>) -> Result<()> {
        let mut batch = calls;
        while !batch.is_empty() {
            batch = self.load_all(batch).await?;
        }
        Ok(())
    }

    /// Runs one call and every follow-up it leads to.
    ///
    /// Remote failures are not errors here; they land in the tracker and
    /// are read back through [`view`](Self::view).
    pub async fn run(&mut self, call: Call) -> Result<()> {
        self.run_all(vec![call]).await
    }

    /// Re-issues the last call made for `op`.
    pub async fn retry(&mut self, op: Operation) -> Result<()> {
        let call = self
            .last_calls
            .get(&op)
            .cloned()
            .or_else(|| Call::load(op))
            .ok_or_else(|| Error::validation_field("operation", format!("nothing to retry for {op}")))?;
        tracing::info!(operation = %op, "Retrying");
        self.run(call).await
    }

    /// Carries out a recovery action offered for `op`.
    pub async fn recover(&mut self, op: Operation, action: RecoveryAction) -> Result<()> {
        match action {
            RecoveryAction::Retry => self.retry(op).await,
            RecoveryAction::Confirm { target } => {
                self.store.clear(op);
                self.show(target);
                Ok(())
            }
            RecoveryAction::ReturnToStart => {
                self.mount();
                Ok(())
            }
        }
    }

    fn on_success(&mut self, call: &Call, payload: Payload) -> Result<Vec<Call>> {
        let mut follow_ups = match payload {
            Payload::InitRequest(response) => {
                self.store.set_request_id(response.request_id)?;
                vec![Call::StepInquiry]
            }
            Payload::StepInquiry(inquiry) => self.enter_step(inquiry.step),
            Payload::AddAccount(_) => {
                self.show(ScreenId::Checkbooks);
                vec![Call::ChequebooksList]
            }
            Payload::AddChequebook(_) => {
                self.show(ScreenId::Sheets);
                match call {
                    Call::AddChequebook(selection) => vec![Call::SheetsList(selection.clone())],
                    _ => Vec::new(),
                }
            }
            Payload::ChequeStatus(_) => {
                self.show(ScreenId::Status);
                Vec::new()
            }
            Payload::InternalAddCheque(transition) | Payload::ExternalAdd(transition) => {
                self.enter_step(transition.step.unwrap_or(WorkflowStep::Upload))
            }
            Payload::FrontUpload(_) => {
                self.front_image = None;
                vec![Call::ImagesInfo]
            }
            Payload::BackUpload(_) => {
                self.back_image = None;
                vec![Call::ImagesInfo]
            }
            Payload::ImagesSend(transition) => {
                self.enter_step(transition.step.unwrap_or(WorkflowStep::SendImage))
            }
            Payload::BackRequest(transition) => {
                let step = transition.step.unwrap_or_else(|| self.store.step().previous());
                self.enter_step(step)
            }
            Payload::Issue(result) | Payload::ExternalIssue(result) => {
                self.enter_step(result.step.unwrap_or(WorkflowStep::ReadyForDelivery))
            }
            Payload::ExternalInquiry(_) => {
                self.show(ScreenId::ExternalInquiry);
                Vec::new()
            }
            Payload::AccountsList(_)
            | Payload::ChequebooksList(_)
            | Payload::SheetsList(_)
            | Payload::ImagesInfo(_)
            | Payload::SubsystemRequirements(_)
            | Payload::InternalDetail(_)
            | Payload::DeliveryInfo(_)
            | Payload::ExternalDetail(_) => Vec::new(),
        };
        // Showing a screen can leave the wizard through a route trigger.
        if self.store.request_id().is_none() {
            follow_ups.retain(|call| !call.requires_request_id());
        }
        Ok(follow_ups)
    }

    fn enter_step(&mut self, step: WorkflowStep) -> Vec<Call> {
        self.store.set_step(step);
        self.show(ScreenRouter::screen_for_step(step));
        match step {
            WorkflowStep::Init | WorkflowStep::RejectPhysic => Vec::new(),
            WorkflowStep::Upload => vec![Call::SubsystemRequirements, Call::ImagesInfo],
            WorkflowStep::SendImage | WorkflowStep::RejectImage => vec![Call::ImagesInfo],
            WorkflowStep::ConfirmImage | WorkflowStep::InternalIssue => vec![Call::InternalDetail],
            WorkflowStep::ExternalIssue => vec![Call::ExternalDetail],
            WorkflowStep::ReadyForDelivery | WorkflowStep::Delivery | WorkflowStep::ConfirmPhysic => {
                vec![Call::DeliveryInfo]
            }
        }
    }

    // ------------------------------------------------------------
    // Screens
    // ------------------------------------------------------------

    /// Shows `screen`: updates the store, pushes its route and installs its
    /// default back behaviour.
    pub fn show(&mut self, screen: ScreenId) {
        self.store.set_screen(screen);
        self.sync_route();
    }

    fn sync_route(&mut self) {
        let mut screen = self.store.screen();
        let route = ScreenRouter::route(screen);
        if self.host.current_route() != Some(&route) {
            let navigation = self.host.navigate_in_app(route);
            if !navigation.triggered.is_empty() {
                tracing::debug!(
                    route = %navigation.route,
                    fired = navigation.triggered.len(),
                    "Route triggers fired"
                );
            }
            let landed = landing(&navigation);
            if *landed != navigation.route {
                match ScreenRouter::screen_for_route(landed) {
                    Some(fallback) => {
                        self.store.set_screen(fallback);
                        screen = fallback;
                    }
                    None => {
                        tracing::info!(route = %landed, "Left the wizard, clearing state");
                        self.clear_state();
                        return;
                    }
                }
            }
        }
        self.rebind_screen_delegate(screen);
    }

    fn rebind_screen_delegate(&mut self, screen: ScreenId) {
        if let Some(id) = self.screen_delegate.take() {
            self.back.unregister(id);
        }
        self.screen_delegate = BackAction::default_for(screen).map(|action| self.back.register(action));
    }

    /// Shows `screen` and fetches what it loads on entry.
    pub async fn open(&mut self, screen: ScreenId) -> Result<()> {
        self.show(screen);
        let loads = ScreenRouter::descriptor(screen)
            .loads
            .iter()
            .filter_map(|op| Call::load(*op))
            .collect();
        self.run_all(loads).await
    }

    /// Enters the internal or external sub-path from the start screen.
    pub async fn choose_branch(&mut self, branch: Branch) -> Result<()> {
        match branch {
            Branch::Internal => self.open(ScreenId::Accounts).await,
            Branch::External => self.open(ScreenId::SayadExternal).await,
            Branch::Shared => Err(Error::validation_field(
                "branch",
                "choose the internal or the external path",
            )),
        }
    }

    /// View of `op` on the current screen.
    pub fn view(&self, op: Operation) -> OperationView {
        let fallback = ScreenRouter::descriptor(self.store.screen()).fallback;
        OperationView::from_status(&self.store.trackers().status(op), fallback)
    }

    /// Views of everything the current screen observes.
    pub fn screen_view(&self) -> Vec<(Operation, OperationView)> {
        ScreenRouter::descriptor(self.store.screen())
            .observes
            .iter()
            .map(|op| (*op, self.view(*op)))
            .collect()
    }

    /// Overall outcome as far as the step tells.
    pub fn outcome(&self) -> StepOutcome {
        StepOutcome::from(self.store.step())
    }

    // ------------------------------------------------------------
    // Back
    // ------------------------------------------------------------

    /// Registers a back override; it wins until unregistered.
    pub fn register_back(&mut self, action: BackAction) -> DelegateId {
        self.back.register(action)
    }

    /// Removes a back override.
    pub fn unregister_back(&mut self, id: DelegateId) -> bool {
        self.back.unregister(id)
    }

    /// Handles a back press.
    pub fn back(&mut self) -> BackOutcome {
        let before = self.store.screen();
        let outcome = self.back.resolve(&mut self.store, &mut self.host);
        if matches!(outcome, BackOutcome::Dispatched(StoreAction::ClearAll)) {
            self.mount();
            return outcome;
        }

        let landed = match &outcome {
            BackOutcome::Dispatched(_) => Some(self.store.screen()).filter(|s| *s != before),
            BackOutcome::Navigated(Some(navigation)) => {
                ScreenRouter::screen_for_route(landing(navigation))
            }
            BackOutcome::Host(HostOutcome::FellBack(route))
            | BackOutcome::Closed(HostOutcome::FellBack(route)) => {
                ScreenRouter::screen_for_route(route)
            }
            _ => None,
        };
        if let Some(screen) = landed {
            self.show(screen);
        }
        outcome
    }

    // ------------------------------------------------------------
    // Images
    // ------------------------------------------------------------

    /// Selects the front image for upload.
    pub fn select_front(&mut self, image: ImageFile) -> Result<()> {
        image.validate()?;
        self.front_image = Some(image);
        Ok(())
    }

    /// Selects the back image for upload.
    pub fn select_back(&mut self, image: ImageFile) -> Result<()> {
        image.validate()?;
        self.back_image = Some(image);
        Ok(())
    }

    /// Whether both sides are covered by a selection or a stored image.
    pub fn upload_view(&self) -> UploadView {
        let info = self.store.trackers().images_info.data();
        let front_ready = self.front_image.is_some() || info.is_some_and(|i| i.has_front());
        let back_ready = self.back_image.is_some() || info.is_some_and(|i| i.has_back());
        UploadView {
            front_ready,
            back_ready,
            confirm_enabled: front_ready && back_ready,
        }
    }

    /// Uploads the selected images and submits both sides.
    ///
    /// Returns `false` when an upload failed and nothing was submitted.
    pub async fn confirm_images(&mut self) -> Result<bool> {
        if !self.upload_view().confirm_enabled {
            return Err(Error::validation_field("image", "front and back images are required"));
        }

        let mut uploads = Vec::new();
        if let Some(image) = self.front_image.clone() {
            uploads.push(Call::FrontUpload(image));
        }
        if let Some(image) = self.back_image.clone() {
            uploads.push(Call::BackUpload(image));
        }
        if !uploads.is_empty() {
            self.run_all(uploads).await?;
        }

        let trackers = self.store.trackers();
        if trackers.front_upload.error().is_some() || trackers.back_upload.error().is_some() {
            tracing::warn!("Image upload failed, not submitting");
            return Ok(false);
        }
        self.run(Call::ImagesSend).await?;
        Ok(true)
    }
}

/// Where a navigation ended up: the last trigger fallback, if any fired.
fn landing(navigation: &Navigation) -> &Route {
    navigation
        .triggered
        .iter()
        .rev()
        .find_map(|outcome| match outcome {
            HostOutcome::FellBack(route) => Some(route),
            HostOutcome::Delivered(_) => None,
        })
        .unwrap_or(&navigation.route)
}
