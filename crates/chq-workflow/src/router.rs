//! Screen order, branch boundaries and per-screen descriptors.

use chq_core::{Branch, ScreenId, WorkflowStep};
use chq_host::Route;

use crate::operations::Operation;

/// Path prefix of every wizard route.
pub const ROUTE_PREFIX: &str = "/cheque";

/// What a screen renders from and where "confirm" sends the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenDescriptor {
    /// The screen
    pub screen: ScreenId,
    /// Trackers the screen renders
    pub observes: &'static [Operation],
    /// Operations fetched when the screen is shown
    pub loads: &'static [Operation],
    /// Where the "confirm" recovery action navigates
    pub fallback: ScreenId,
}

/// Fixed screen order with branch-aware stepping.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenRouter;

impl ScreenRouter {
    /// The fixed order.
    pub fn order() -> &'static [ScreenId] {
        &ScreenId::ORDER
    }

    /// Whether moving from `from` to `to` leaves a linear sub-path.
    ///
    /// The shared start screen borders both branches.
    pub fn crosses_branch(from: ScreenId, to: ScreenId) -> bool {
        match (from.branch(), to.branch()) {
            (Branch::Shared, _) | (_, Branch::Shared) => false,
            (a, b) => a != b,
        }
    }

    /// The following screen within the same sub-path.
    pub fn next(screen: ScreenId) -> Option<ScreenId> {
        ScreenId::at(screen.index() + 1).filter(|to| !Self::crosses_branch(screen, *to))
    }

    /// The preceding screen within the same sub-path.
    pub fn previous(screen: ScreenId) -> Option<ScreenId> {
        screen
            .index()
            .checked_sub(1)
            .and_then(ScreenId::at)
            .filter(|to| !Self::crosses_branch(screen, *to))
    }

    /// The screen a request in `step` belongs on.
    pub fn screen_for_step(step: WorkflowStep) -> ScreenId {
        match step {
            WorkflowStep::Init => ScreenId::Start,
            WorkflowStep::Upload | WorkflowStep::RejectImage => ScreenId::Upload,
            WorkflowStep::SendImage => ScreenId::Confirm,
            WorkflowStep::ConfirmImage
            | WorkflowStep::InternalIssue
            | WorkflowStep::ExternalIssue => ScreenId::BankConfirmation,
            WorkflowStep::ReadyForDelivery => ScreenId::Delivery,
            WorkflowStep::Delivery | WorkflowStep::RejectPhysic | WorkflowStep::ConfirmPhysic => {
                ScreenId::DeliveryInfo
            }
        }
    }

    /// In-app route of a screen.
    pub fn route(screen: ScreenId) -> Route {
        Route::new(format!("{ROUTE_PREFIX}/{screen}"))
    }

    /// The screen a route points at, if it is a wizard route.
    pub fn screen_for_route(route: &Route) -> Option<ScreenId> {
        route
            .path
            .strip_prefix(ROUTE_PREFIX)?
            .strip_prefix('/')?
            .trim_end_matches('/')
            .parse()
            .ok()
    }

    /// Descriptor of `screen`.
    pub fn descriptor(screen: ScreenId) -> ScreenDescriptor {
        use Operation::*;

        let (observes, loads, fallback): (&'static [Operation], &'static [Operation], ScreenId) =
            match screen {
                ScreenId::Start => (&[InitRequest, StepInquiry], &[], ScreenId::Start),
                ScreenId::Accounts => (&[AccountsList, AddAccount], &[AccountsList], ScreenId::Start),
                ScreenId::Checkbooks => (
                    &[ChequebooksList, AddChequebook],
                    &[ChequebooksList],
                    ScreenId::Accounts,
                ),
                ScreenId::Sheets => (
                    &[SheetsList, ChequeStatus],
                    &[],
                    ScreenId::Checkbooks,
                ),
                ScreenId::Status => (&[ChequeStatus, InternalAddCheque], &[], ScreenId::Sheets),
                ScreenId::Upload => (
                    &[SubsystemRequirements, ImagesInfo, FrontUpload, BackUpload, ImagesSend],
                    &[SubsystemRequirements, ImagesInfo],
                    ScreenId::Start,
                ),
                ScreenId::Confirm => (
                    &[ImagesInfo, ImagesSend, BackRequest],
                    &[ImagesInfo],
                    ScreenId::Upload,
                ),
                ScreenId::Delivery => (&[DeliveryInfo], &[DeliveryInfo], ScreenId::Start),
                ScreenId::BankConfirmation => (
                    &[InternalDetail, Issue, ExternalDetail, ExternalIssue],
                    &[],
                    ScreenId::Start,
                ),
                ScreenId::DeliveryInfo => (&[DeliveryInfo], &[DeliveryInfo], ScreenId::Start),
                ScreenId::ExternalInquiry => (
                    &[ExternalInquiry, ExternalAdd],
                    &[],
                    ScreenId::SayadExternal,
                ),
                ScreenId::SayadExternal => (&[ExternalInquiry], &[], ScreenId::Start),
            };

        ScreenDescriptor {
            screen,
            observes,
            loads,
            fallback,
        }
    }
}
