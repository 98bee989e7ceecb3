//! The fixed set of tracked remote operations.
//!
//! Each operation owns exactly one [`AsyncOperationState`], typed with the
//! payload its endpoint returns. The table below is expanded by
//! `operations!` into the [`Operation`] tag, the [`Payload`] sum type and
//! the [`Trackers`] struct, so adding an operation is a one-line change.

use chq_client::models;
use chq_core::{AsyncOperationState, ErrorInfo, Settlement, TrackerStatus};
use serde::{Deserialize, Serialize};

macro_rules! operations {
    ($( $(#[$doc:meta])* $variant:ident => $field:ident : $payload:ty, $name:literal; )*) => {
        /// A tracked remote operation.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum Operation {
            $( $(#[$doc])* $variant, )*
        }

        impl Operation {
            /// Every operation, in declaration order.
            pub const ALL: &'static [Operation] = &[ $( Operation::$variant, )* ];

            /// Kebab-case name, as used in logs and on the command line.
            pub fn name(self) -> &'static str {
                match self {
                    $( Operation::$variant => $name, )*
                }
            }
        }

        /// A successful result, tagged with the operation that produced it.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Payload {
            $(
                #[doc = concat!("Result of `", $name, "`")]
                $variant($payload),
            )*
        }

        impl Payload {
            /// The operation this payload belongs to.
            pub fn operation(&self) -> Operation {
                match self {
                    $( Payload::$variant(_) => Operation::$variant, )*
                }
            }
        }

        /// One isolated tracker per operation.
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Trackers {
            $(
                #[doc = concat!("Tracker for `", $name, "`")]
                pub $field: AsyncOperationState<$payload>,
            )*
        }

        impl Trackers {
            /// Marks `op` as in flight and returns its generation.
            pub fn start(&mut self, op: Operation) -> u64 {
                match op {
                    $( Operation::$variant => self.$field.start(), )*
                }
            }

            /// Records `payload` on the tracker it belongs to.
            pub fn succeed(&mut self, generation: u64, payload: Payload) -> Settlement {
                match payload {
                    $( Payload::$variant(data) => self.$field.succeed(generation, data), )*
                }
            }

            /// Records `error` on the tracker of `op`.
            pub fn fail(&mut self, op: Operation, generation: u64, error: ErrorInfo) -> Settlement {
                match op {
                    $( Operation::$variant => self.$field.fail(generation, error), )*
                }
            }

            /// Drops data and error of `op`.
            pub fn clear(&mut self, op: Operation) {
                match op {
                    $( Operation::$variant => self.$field.clear(), )*
                }
            }

            /// Returns `op` to its initial snapshot.
            pub fn reset(&mut self, op: Operation) {
                match op {
                    $( Operation::$variant => self.$field.reset(), )*
                }
            }

            /// Returns every tracker to its initial snapshot.
            pub fn reset_all(&mut self) {
                $( self.$field.reset(); )*
            }

            /// Type-erased view of `op`.
            pub fn status(&self, op: Operation) -> TrackerStatus<'_> {
                match op {
                    $( Operation::$variant => self.$field.status(), )*
                }
            }

            /// Current generation of `op`.
            pub fn generation(&self, op: Operation) -> u64 {
                match op {
                    $( Operation::$variant => self.$field.generation(), )*
                }
            }

            /// Whether `op` is in its initial snapshot.
            pub fn is_initial(&self, op: Operation) -> bool {
                match op {
                    $( Operation::$variant => self.$field.is_initial(), )*
                }
            }
        }
    };
}

operations! {
    /// `POST /requests/init`
    InitRequest => init_request: models::InitResponse, "init-request";
    /// `GET /requests/{id}/step-inquiry`
    StepInquiry => step_inquiry: models::StepInquiry, "step-inquiry";
    /// `GET /accounts/{id}/list`
    AccountsList => accounts_list: models::AccountList, "accounts-list";
    /// `PUT /accounts/{id}/add`
    AddAccount => add_account: models::Ack, "add-account";
    /// `GET /chequebooks/{id}/list`
    ChequebooksList => chequebooks_list: models::ChequebookList, "chequebooks-list";
    /// `PUT /chequebooks/{id}/add`
    AddChequebook => add_chequebook: models::Ack, "add-chequebook";
    /// `POST /cheques/list`
    SheetsList => sheets_list: models::SheetList, "sheets-list";
    /// `POST /requests/compare`
    ChequeStatus => cheque_status: models::ChequeStatus, "cheque-status";
    /// `PUT /cheques/internal-add`
    InternalAddCheque => internal_add_cheque: models::StepTransition, "internal-add-cheque";
    /// `GET /images/{id}/info`
    ImagesInfo => images_info: models::ImagesInfo, "images-info";
    /// `PUT /images/{id}/front-upload`
    FrontUpload => front_upload: models::Ack, "front-upload";
    /// `PUT /images/{id}/back-upload`
    BackUpload => back_upload: models::Ack, "back-upload";
    /// `PUT /images/{id}/send`
    ImagesSend => images_send: models::StepTransition, "images-send";
    /// `PUT /requests/{id}/back`
    BackRequest => back_request: models::StepTransition, "back-request";
    /// `GET /requests/{id}/subsystem-requirements`
    SubsystemRequirements => subsystem_requirements: models::SubsystemRequirements, "subsystem-requirements";
    /// `GET` and `PUT /cheques/{id}/internal-detail`
    InternalDetail => internal_detail: models::ChequeDetail, "internal-detail";
    /// `PUT /cheques/{id}/issue`
    Issue => issue: models::IssueResult, "issue";
    /// `GET /cheques/{id}/delivery-info`
    DeliveryInfo => delivery_info: models::DeliveryInfo, "delivery-info";
    /// `GET /cheques/{id}/external-detail`
    ExternalDetail => external_detail: models::ChequeDetail, "external-detail";
    /// `PUT /cheques/{id}/external-issue`
    ExternalIssue => external_issue: models::IssueResult, "external-issue";
    /// `POST /cheques/external-inquiry`
    ExternalInquiry => external_inquiry: models::ExternalCheque, "external-inquiry";
    /// `PUT /cheques/external-add`
    ExternalAdd => external_add: models::StepTransition, "external-add";
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Operation {
    type Err = chq_core::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .iter()
            .copied()
            .find(|op| op.name() == s)
            .ok_or_else(|| chq_core::Error::validation_field("operation", format!("unknown operation '{s}'")))
    }
}
