//! The workflow state store.
//!
//! One store exists per wizard instance. It holds the business step, the
//! visible screen, the request id and every tracker, and is only ever
//! mutated through the transitions below. Nothing here performs I/O.

use chq_core::{Error, ErrorInfo, RequestId, Result, ScreenId, Settlement, WorkflowStep};
use serde::{Deserialize, Serialize};

use crate::operations::{Operation, Payload, Trackers};
use crate::router::ScreenRouter;

/// Proof that a call was started; needed to settle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    operation: Operation,
    generation: u64,
}

impl Ticket {
    /// Operation the call belongs to.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Tracker generation the call was started at.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A named store transition.
///
/// This is what a back delegate of kind "state" carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum StoreAction {
    /// Jump to a step
    SetStep(WorkflowStep),
    /// Jump to a screen
    SetScreen(ScreenId),
    /// Advance one step
    NextStep,
    /// Go back one step
    PreviousStep,
    /// Advance one screen within the current sub-path
    NextScreen,
    /// Go back one screen within the current sub-path
    PreviousScreen,
    /// Drop data and error of one tracker
    ClearTracker(Operation),
    /// Reset everything
    ClearAll,
}

/// Step, screen, request id and trackers of one workflow instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowStore {
    step: WorkflowStep,
    screen: ScreenId,
    request_id: Option<RequestId>,
    trackers: Trackers,
}

impl WorkflowStore {
    /// Creates a store at `INIT` / `start`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current business step.
    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    /// Current screen.
    pub fn screen(&self) -> ScreenId {
        self.screen
    }

    /// Request id, once minted.
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// All trackers.
    pub fn trackers(&self) -> &Trackers {
        &self.trackers
    }

    // ------------------------------------------------------------
    // Step and screen
    // ------------------------------------------------------------

    /// Jumps to `step`.
    pub fn set_step(&mut self, step: WorkflowStep) {
        if step != self.step {
            tracing::debug!(from = %self.step, to = %step, "Step changed");
        }
        self.step = step;
    }

    /// Jumps to `screen`; the only way across a branch point.
    pub fn set_screen(&mut self, screen: ScreenId) {
        if screen != self.screen {
            tracing::debug!(from = %self.screen, to = %screen, "Screen changed");
        }
        self.screen = screen;
    }

    /// Advances one step; no-op at the last step.
    pub fn next_step(&mut self) {
        self.set_step(self.step.next());
    }

    /// Goes back one step; no-op at `INIT`.
    pub fn previous_step(&mut self) {
        self.set_step(self.step.previous());
    }

    /// Advances one screen. Returns `false` at the end of the order or a branch boundary.
    pub fn next_screen(&mut self) -> bool {
        self.move_screen(ScreenRouter::next(self.screen))
    }

    /// Goes back one screen. Returns `false` at the start of the order or a branch boundary.
    pub fn previous_screen(&mut self) -> bool {
        self.move_screen(ScreenRouter::previous(self.screen))
    }

    fn move_screen(&mut self, target: Option<ScreenId>) -> bool {
        match target {
            Some(screen) => {
                self.set_screen(screen);
                true
            }
            None => {
                tracing::debug!(screen = %self.screen, "Screen move ignored at boundary");
                false
            }
        }
    }

    // ------------------------------------------------------------
    // Request id
    // ------------------------------------------------------------

    /// Binds the workflow to `request_id`.
    ///
    /// Offering the id already held is a no-op; offering a different one is
    /// rejected, since only [`clear_all`](Self::clear_all) may release it.
    pub fn set_request_id(&mut self, request_id: RequestId) -> Result<()> {
        if request_id.as_str().trim().is_empty() {
            return Err(Error::validation_field("request_id", "request id is empty"));
        }
        match &self.request_id {
            Some(current) if *current == request_id => Ok(()),
            Some(current) => Err(Error::RequestIdAlreadyMinted {
                current: current.to_string(),
            }),
            None => {
                tracing::info!(request_id = %request_id, "Workflow bound to request");
                self.request_id = Some(request_id);
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------
    // Trackers
    // ------------------------------------------------------------

    /// Marks `op` as in flight.
    ///
    /// Data and error from the previous call are cleared first so a spinner
    /// never shows next to stale error text.
    pub fn pending(&mut self, op: Operation) -> Ticket {
        self.trackers.clear(op);
        let generation = self.trackers.start(op);
        tracing::debug!(operation = %op, generation, "Operation pending");
        Ticket {
            operation: op,
            generation,
        }
    }

    /// Settles `ticket` with a payload.
    pub fn fulfilled(&mut self, ticket: Ticket, payload: Payload) -> Settlement {
        if payload.operation() != ticket.operation {
            tracing::error!(
                ticket = %ticket.operation,
                payload = %payload.operation(),
                "Payload does not belong to ticket, dropped"
            );
            return Settlement::Stale {
                current: self.trackers.generation(ticket.operation),
                received: ticket.generation,
            };
        }
        let settlement = self.trackers.succeed(ticket.generation, payload);
        self.log_settlement(ticket, settlement, "fulfilled");
        settlement
    }

    /// Settles `ticket` with a failure.
    pub fn rejected(&mut self, ticket: Ticket, error: ErrorInfo) -> Settlement {
        let settlement = self
            .trackers
            .fail(ticket.operation, ticket.generation, error);
        self.log_settlement(ticket, settlement, "rejected");
        settlement
    }

    fn log_settlement(&self, ticket: Ticket, settlement: Settlement, outcome: &str) {
        match settlement {
            Settlement::Applied => {
                tracing::debug!(operation = %ticket.operation, outcome, "Operation settled");
            }
            Settlement::Stale { current, received } => {
                tracing::debug!(
                    operation = %ticket.operation,
                    outcome,
                    current,
                    received,
                    "Late completion discarded"
                );
            }
        }
    }

    /// Drops data and error of `op`.
    pub fn clear(&mut self, op: Operation) {
        self.trackers.clear(op);
    }

    /// Back to `INIT` / `start` with no request id and every tracker initial.
    pub fn clear_all(&mut self) {
        tracing::info!(request_id = ?self.request_id.as_ref().map(RequestId::as_str), "Workflow cleared");
        self.step = WorkflowStep::Init;
        self.screen = ScreenId::Start;
        self.request_id = None;
        self.trackers.reset_all();
    }

    /// Applies a named transition.
    pub fn dispatch(&mut self, action: StoreAction) {
        match action {
            StoreAction::SetStep(step) => self.set_step(step),
            StoreAction::SetScreen(screen) => self.set_screen(screen),
            StoreAction::NextStep => self.next_step(),
            StoreAction::PreviousStep => self.previous_step(),
            StoreAction::NextScreen => {
                self.next_screen();
            }
            StoreAction::PreviousScreen => {
                self.previous_screen();
            }
            StoreAction::ClearTracker(op) => self.clear(op),
            StoreAction::ClearAll => self.clear_all(),
        }
    }
}
