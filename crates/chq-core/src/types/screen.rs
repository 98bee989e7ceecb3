//! UI stages of the wizard.

use serde::{Deserialize, Serialize};

/// A wizard screen.
///
/// Screens are a UI concept and are distinct from [`WorkflowStep`](super::WorkflowStep).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ScreenId {
    /// Entry screen; the user picks the internal or the other-bank flow.
    #[default]
    Start,
    /// Account selection.
    Accounts,
    /// Chequebook selection.
    Checkbooks,
    /// Cheque sheet selection.
    Sheets,
    /// Cheque status comparison.
    Status,
    /// Front/back image upload.
    Upload,
    /// Image confirmation.
    Confirm,
    /// Delivery details.
    Delivery,
    /// Waiting for bank confirmation.
    BankConfirmation,
    /// Delivery tracking information.
    DeliveryInfo,
    /// Result of an other-bank cheque inquiry.
    ExternalInquiry,
    /// Sayad id entry for other-bank cheques.
    SayadExternal,
}

/// Which linear sub-path a screen belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    /// Reachable from both flows.
    Shared,
    /// Internal bank flow.
    Internal,
    /// Other-bank flow.
    External,
}

impl ScreenId {
    /// Fixed order used by `next` / `previous`.
    pub const ORDER: [ScreenId; 12] = [
        ScreenId::Start,
        ScreenId::Accounts,
        ScreenId::Checkbooks,
        ScreenId::Sheets,
        ScreenId::Status,
        ScreenId::Upload,
        ScreenId::Confirm,
        ScreenId::Delivery,
        ScreenId::BankConfirmation,
        ScreenId::DeliveryInfo,
        ScreenId::ExternalInquiry,
        ScreenId::SayadExternal,
    ];

    /// Position in [`ORDER`](Self::ORDER).
    pub fn index(self) -> usize {
        Self::ORDER
            .iter()
            .position(|s| *s == self)
            .unwrap_or_default()
    }

    /// The screen at `index`, if in range.
    pub fn at(index: usize) -> Option<Self> {
        Self::ORDER.get(index).copied()
    }

    /// The sub-path this screen belongs to.
    pub fn branch(self) -> Branch {
        match self {
            ScreenId::Start => Branch::Shared,
            ScreenId::ExternalInquiry | ScreenId::SayadExternal => Branch::External,
            _ => Branch::Internal,
        }
    }

    /// Route name of the screen.
    pub fn as_str(self) -> &'static str {
        match self {
            ScreenId::Start => "start",
            ScreenId::Accounts => "accounts",
            ScreenId::Checkbooks => "checkbooks",
            ScreenId::Sheets => "sheets",
            ScreenId::Status => "status",
            ScreenId::Upload => "upload",
            ScreenId::Confirm => "confirm",
            ScreenId::Delivery => "delivery",
            ScreenId::BankConfirmation => "bankConfirmation",
            ScreenId::DeliveryInfo => "deliveryInfo",
            ScreenId::ExternalInquiry => "externalInquiry",
            ScreenId::SayadExternal => "sayadExternal",
        }
    }
}

impl std::fmt::Display for ScreenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScreenId {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ORDER
            .iter()
            .copied()
            .find(|screen| screen.as_str() == s)
            .ok_or_else(|| {
                crate::Error::validation_field("screen", format!("unknown screen '{s}'"))
            })
    }
}
