//! Request and response bodies of the gateway API.
//!
//! Field names follow the gateway's snake_case wire format. Optional
//! fields default so that a backend adding or omitting attributes does
//! not turn a success into a decode failure.

use chq_core::validation::{
    validate_account_number, validate_national_id, validate_not_blank, validate_sayad_id,
};
use chq_core::{Error, RequestId, Result, WorkflowStep};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================
// Responses
// ============================================================

/// `POST /requests/init`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitResponse {
    /// Correlation id for the new workflow instance
    pub request_id: RequestId,
}

/// `GET /requests/{id}/step-inquiry`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInquiry {
    /// Current business step
    pub step: WorkflowStep,
    /// Free-form step annotations
    #[serde(default)]
    pub info: Vec<Value>,
}

/// A customer account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account number
    pub account_number: String,
    /// Display title
    #[serde(default)]
    pub title: Option<String>,
    /// Account type code
    #[serde(default)]
    pub account_type: Option<String>,
}

/// `GET /accounts/{id}/list`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountList {
    /// Accounts eligible for cheque issuance
    #[serde(default)]
    pub accounts: Vec<Account>,
}

/// Generic acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Optional server message
    #[serde(default)]
    pub message: Option<String>,
}

/// A chequebook on the selected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chequebook {
    /// Chequebook serial
    pub chequebook_number: String,
    /// Issue date as reported by the bank
    #[serde(default)]
    pub issue_date: Option<String>,
    /// Number of unused sheets
    #[serde(default)]
    pub remaining_sheets: Option<u32>,
}

/// `GET /chequebooks/{id}/list`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChequebookList {
    /// Available chequebooks
    #[serde(default)]
    pub chequebooks: Vec<Chequebook>,
}

/// A single cheque sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChequeSheet {
    /// 16-digit Sayad identifier
    pub sayad_id: String,
    /// Printed serial
    #[serde(default)]
    pub serial_number: Option<String>,
    /// Sheet status code
    #[serde(default)]
    pub status: Option<String>,
}

/// `POST /cheques/list`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetList {
    /// Sheets of the selected chequebook
    #[serde(default)]
    pub sheets: Vec<ChequeSheet>,
}

/// `POST /requests/compare`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChequeStatus {
    /// Whether the sheet matches the bank's record
    #[serde(default)]
    pub matched: bool,
    /// Status code
    #[serde(default)]
    pub status: Option<String>,
    /// Explanation shown to the user
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /images/{id}/info`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagesInfo {
    /// Reference to the stored front image
    #[serde(default)]
    pub front_image: Option<String>,
    /// Reference to the stored back image
    #[serde(default)]
    pub back_image: Option<String>,
}

impl ImagesInfo {
    /// Whether the server already holds a front image.
    pub fn has_front(&self) -> bool {
        self.front_image.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Whether the server already holds a back image.
    pub fn has_back(&self) -> bool {
        self.back_image.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Response of calls that move the workflow to another step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTransition {
    /// The step the request is now in, when the server reports it
    #[serde(default)]
    pub step: Option<WorkflowStep>,
    /// Optional server message
    #[serde(default)]
    pub message: Option<String>,
}

/// One prerequisite imposed by a downstream subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Requirement code
    pub code: String,
    /// Display title
    #[serde(default)]
    pub title: Option<String>,
    /// Whether the requirement blocks issuance
    #[serde(default)]
    pub mandatory: bool,
}

/// `GET /requests/{id}/subsystem-requirements`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsystemRequirements {
    /// Requirements to satisfy before issuing
    #[serde(default)]
    pub requirements: Vec<Requirement>,
}

/// A cheque beneficiary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Full name
    pub name: String,
    /// 10-digit national id
    pub national_id: String,
}

/// `GET` / `PUT /cheques/{id}/internal-detail`, `GET /cheques/{id}/external-detail`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChequeDetail {
    /// Sayad id of the cheque
    #[serde(default)]
    pub sayad_id: Option<String>,
    /// Amount in rials
    #[serde(default)]
    pub amount: Option<u64>,
    /// Due date as entered
    #[serde(default)]
    pub due_date: Option<String>,
    /// Payment reason / description
    #[serde(default)]
    pub description: Option<String>,
    /// Beneficiaries
    #[serde(default)]
    pub recipients: Vec<Recipient>,
}

impl ChequeDetail {
    /// Checks everything the user typed before it is sent.
    pub fn validate(&self) -> Result<()> {
        if let Some(sayad_id) = &self.sayad_id {
            validate_sayad_id(sayad_id)?;
        }
        if self.amount == Some(0) {
            return Err(Error::validation_field("amount", "must be greater than zero"));
        }
        for recipient in &self.recipients {
            validate_not_blank("recipient.name", &recipient.name)?;
            validate_national_id(&recipient.national_id)?;
        }
        Ok(())
    }
}

/// `PUT /cheques/{id}/issue` and `/external-issue`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueResult {
    /// Sayad id of the issued cheque
    #[serde(default)]
    pub sayad_id: Option<String>,
    /// Step after issuance
    #[serde(default)]
    pub step: Option<WorkflowStep>,
    /// Optional server message
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /cheques/{id}/delivery-info`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryInfo {
    /// Branch name
    #[serde(default)]
    pub branch_name: Option<String>,
    /// Branch code
    #[serde(default)]
    pub branch_code: Option<String>,
    /// Branch address
    #[serde(default)]
    pub address: Option<String>,
    /// Expected pickup date
    #[serde(default)]
    pub delivery_date: Option<String>,
    /// Tracking code
    #[serde(default)]
    pub tracking_code: Option<String>,
}

/// `POST /cheques/external-inquiry`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalCheque {
    /// Sayad id
    #[serde(default)]
    pub sayad_id: Option<String>,
    /// Issuing bank
    #[serde(default)]
    pub bank_name: Option<String>,
    /// Account owner
    #[serde(default)]
    pub owner_name: Option<String>,
    /// Status code
    #[serde(default)]
    pub status: Option<String>,
}

// ============================================================
// Requests
// ============================================================

/// Body of `PUT /accounts/{id}/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSelection {
    /// Selected account number
    pub account_number: String,
}

impl AccountSelection {
    /// Checks the account number shape.
    pub fn validate(&self) -> Result<()> {
        validate_account_number(&self.account_number)
    }
}

/// Body of `PUT /chequebooks/{id}/add` and `POST /cheques/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChequebookSelection {
    /// Selected chequebook
    pub chequebook_number: String,
}

impl ChequebookSelection {
    /// Checks the chequebook number is present.
    pub fn validate(&self) -> Result<()> {
        validate_not_blank("chequebook_number", &self.chequebook_number)
    }
}

/// Body of `POST /requests/compare` and `PUT /cheques/internal-add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSelection {
    /// Selected sheet
    pub sayad_id: String,
}

impl SheetSelection {
    /// Checks the Sayad id shape.
    pub fn validate(&self) -> Result<()> {
        validate_sayad_id(&self.sayad_id)
    }
}

/// Body of `POST /cheques/external-inquiry` and `PUT /cheques/external-add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalChequeQuery {
    /// Sayad id printed on the other bank's cheque
    pub sayad_id: String,
    /// National id of the account owner
    pub national_id: String,
}

impl ExternalChequeQuery {
    /// Checks both identifiers.
    pub fn validate(&self) -> Result<()> {
        validate_sayad_id(&self.sayad_id)?;
        validate_national_id(&self.national_id)
    }
}

/// An image to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// File name reported to the server
    pub file_name: String,
    /// MIME type
    pub mime: String,
    /// Contents
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Creates an image file.
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Rejects empty images and blank names.
    pub fn validate(&self) -> Result<()> {
        validate_not_blank("file_name", &self.file_name)?;
        if self.bytes.is_empty() {
            return Err(Error::validation_field("image", "must not be empty"));
        }
        Ok(())
    }
}

/// Wraps a body with the request id the gateway expects alongside it.
#[derive(Debug, Serialize)]
pub(crate) struct WithRequestId<'a, T: Serialize> {
    pub(crate) request_id: &'a RequestId,
    #[serde(flatten)]
    pub(crate) body: &'a T,
}
