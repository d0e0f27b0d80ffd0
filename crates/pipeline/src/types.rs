//! Shared value types for the verification node domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! node parameters, item payloads, and per-run accounting.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ItemIndex, NodeError};

/// Key under which the verification result (or error object) is added to each
/// output item's payload.
pub const RESULT_KEY: &str = "bounceban_result";

/// Embedded error text for items whose email address resolves to nothing.
pub const MISSING_EMAIL_MESSAGE: &str = "Email address is required";

// ---------------------------------------------------------------------------
// Node parameters
// ---------------------------------------------------------------------------

/// Operation performed by the node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Verify a single email address per input item.
    #[default]
    #[serde(rename = "validateEmail")]
    ValidateEmail,
}

impl Operation {
    /// Parses a configured operation name.
    ///
    /// Unknown names are a fatal [`NodeError::UnknownOperation`].
    pub fn parse(name: &str) -> Result<Self, NodeError> {
        match name {
            "validateEmail" => Ok(Self::ValidateEmail),
            other => Err(NodeError::UnknownOperation {
                operation: other.to_string(),
            }),
        }
    }

    /// Returns the configured name of the operation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValidateEmail => "validateEmail",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------

/// How a batch of input items is processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    /// One item at a time, in input order. The first unrecovered error aborts
    /// the invocation unless continue-on-failure is enabled.
    #[default]
    Sequential,
    /// All items concurrently. Failures are always embedded per item.
    Batch,
}

impl FromStr for ProcessingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sequential" => Ok(Self::Sequential),
            "batch" => Ok(Self::Batch),
            other => Err(format!(
                "unknown processing mode '{other}' (expected 'sequential' or 'batch')"
            )),
        }
    }
}

impl std::fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => f.write_str("sequential"),
            Self::Batch => f.write_str("batch"),
        }
    }
}

// ---------------------------------------------------------------------------

/// Verification mode sent as the `mode` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMode {
    /// Makes no assumption about the owner's company domain.
    Regular,
    /// Assumes the owner's current company domain matches the email domain,
    /// which improves results for accept-all domains.
    #[serde(rename = "deepverify")]
    DeepVerify,
}

impl VerificationMode {
    /// Wire value of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::DeepVerify => "deepverify",
        }
    }
}

impl FromStr for VerificationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(Self::Regular),
            "deepverify" => Ok(Self::DeepVerify),
            other => Err(format!(
                "unknown verification mode '{other}' (expected 'regular' or 'deepverify')"
            )),
        }
    }
}

// ---------------------------------------------------------------------------

/// Catch-all verification switch, sent as `disable_catchall_verify=0|1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatchallVerify {
    /// `0`: full verification including catch-all domains.
    #[serde(rename = "0")]
    Enabled,
    /// `1`: basic SMTP verification only. Catch-all and gateway-protected
    /// addresses come back as `unknown` with score `-1`.
    #[serde(rename = "1")]
    Disabled,
}

impl CatchallVerify {
    /// Wire value of the flag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "0",
            Self::Disabled => "1",
        }
    }
}

impl FromStr for CatchallVerify {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(Self::Enabled),
            "1" => Ok(Self::Disabled),
            other => Err(format!(
                "invalid disable_catchall_verify value '{other}' (expected '0' or '1')"
            )),
        }
    }
}

// ---------------------------------------------------------------------------

/// Optional verification settings. Only fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalFields {
    /// Verification mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<VerificationMode>,

    /// Catch-all verification switch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_catchall_verify: Option<CatchallVerify>,

    /// Webhook that receives the verification result by HTTP POST.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

// ---------------------------------------------------------------------------

/// Fully resolved query for one verification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyQuery {
    /// Address to verify. Never empty.
    pub email: String,
    /// Optional settings.
    pub fields: AdditionalFields,
}

impl VerifyQuery {
    /// Creates a query, returning `None` when `email` is blank.
    pub fn new(email: impl Into<String>, fields: AdditionalFields) -> Option<Self> {
        let email = email.into();
        let trimmed = email.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            email: trimmed.to_string(),
            fields,
        })
    }

    /// Query-string pairs in wire order: `email`, `mode`,
    /// `disable_catchall_verify`, `url`. Unset fields are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("email", self.email.clone())];
        if let Some(mode) = self.fields.mode {
            pairs.push(("mode", mode.as_str().to_string()));
        }
        if let Some(flag) = self.fields.disable_catchall_verify {
            pairs.push(("disable_catchall_verify", flag.as_str().to_string()));
        }
        if let Some(url) = self.fields.url.as_deref().filter(|u| !u.is_empty()) {
            pairs.push(("url", url.to_string()));
        }
        pairs
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// One record supplied to the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputItem {
    /// Arbitrary payload.
    pub json: Value,
}

impl InputItem {
    /// Wraps a payload.
    pub fn new(json: Value) -> Self {
        Self { json }
    }

    /// Returns the payload as an object, wrapping non-object payloads as
    /// `{"value": <payload>}`.
    fn payload_object(&self) -> Map<String, Value> {
        match &self.json {
            Value::Object(map) => map.clone(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other.clone());
                map
            }
        }
    }
}

/// Reference from an output item back to the input it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedItem {
    /// Index of the originating input item.
    pub item: ItemIndex,
}

/// One record produced by the node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputItem {
    /// Input payload plus the [`RESULT_KEY`] entry.
    pub json: Map<String, Value>,

    /// Originating input.
    #[serde(rename = "pairedItem")]
    pub paired_item: PairedItem,
}

impl OutputItem {
    /// Output carrying the service's verification result.
    pub fn with_result(index: ItemIndex, input: &InputItem, result: Value) -> Self {
        let mut json = input.payload_object();
        json.insert(RESULT_KEY.to_string(), result);
        Self {
            json,
            paired_item: PairedItem { item: index },
        }
    }

    /// Output carrying an embedded `{"error": message}` object.
    pub fn with_error(index: ItemIndex, input: &InputItem, message: impl Into<String>) -> Self {
        let mut error = Map::new();
        error.insert("error".to_string(), Value::String(message.into()));
        Self::with_result(index, input, Value::Object(error))
    }

    /// Returns the embedded error message, if this item carries one.
    pub fn error_message(&self) -> Option<&str> {
        self.json
            .get(RESULT_KEY)
            .and_then(|r| r.get("error"))
            .and_then(Value::as_str)
    }

    /// Returns the verification result (or error object).
    pub fn result(&self) -> Option<&Value> {
        self.json.get(RESULT_KEY)
    }
}

// ---------------------------------------------------------------------------
// Run accounting
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// Counters for one node invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of input items.
    pub items: usize,
    /// Items that received a verification result.
    pub verified: usize,
    /// Items skipped because no email address resolved.
    pub missing_email: usize,
    /// Items that carry an embedded service error.
    pub failed: usize,
    /// Processing mode used.
    pub processing_mode: ProcessingMode,
    /// Start of the invocation.
    pub started_at: Timestamp,
    /// End of the invocation.
    pub finished_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_parse_rejects_unknown_names() {
        assert_eq!(
            Operation::parse("validateEmail").unwrap(),
            Operation::ValidateEmail
        );
        let err = Operation::parse("bulkVerify").unwrap_err();
        assert!(matches!(err, NodeError::UnknownOperation { ref operation } if operation == "bulkVerify"));
    }

    #[test]
    fn test_query_pairs_omit_unset_fields() {
        let query = VerifyQuery::new("a@example.com", AdditionalFields::default()).unwrap();
        assert_eq!(query.query_pairs(), vec![("email", "a@example.com".to_string())]);
    }

    #[test]
    fn test_query_pairs_include_all_set_fields_in_order() {
        let fields = AdditionalFields {
            mode: Some(VerificationMode::DeepVerify),
            disable_catchall_verify: Some(CatchallVerify::Disabled),
            url: Some("https://hooks.example.com/in".into()),
        };
        let query = VerifyQuery::new("b@example.com", fields).unwrap();
        let names: Vec<_> = query.query_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["email", "mode", "disable_catchall_verify", "url"]);
        assert_eq!(query.query_pairs()[1].1, "deepverify");
        assert_eq!(query.query_pairs()[2].1, "1");
    }

    #[test]
    fn test_empty_webhook_url_is_not_sent() {
        let fields = AdditionalFields {
            url: Some(String::new()),
            ..Default::default()
        };
        let query = VerifyQuery::new("c@example.com", fields).unwrap();
        assert_eq!(query.query_pairs().len(), 1);
    }

    #[test]
    fn test_blank_email_yields_no_query() {
        assert!(VerifyQuery::new("", AdditionalFields::default()).is_none());
        assert!(VerifyQuery::new("   ", AdditionalFields::default()).is_none());
    }

    #[test]
    fn test_output_item_keeps_payload_and_adds_result() {
        let input = InputItem::new(json!({"name": "Ada", "email": "ada@example.com"}));
        let out = OutputItem::with_result(ItemIndex::new(2), &input, json!({"result": "deliverable"}));

        assert_eq!(out.json["name"], "Ada");
        assert_eq!(out.json[RESULT_KEY]["result"], "deliverable");
        assert_eq!(out.paired_item.item, ItemIndex::new(2));
        assert!(out.error_message().is_none());
    }

    #[test]
    fn test_output_item_wraps_non_object_payload() {
        let input = InputItem::new(json!("raw@example.com"));
        let out = OutputItem::with_error(ItemIndex::new(0), &input, MISSING_EMAIL_MESSAGE);
        assert_eq!(out.json["value"], "raw@example.com");
        assert_eq!(out.error_message(), Some(MISSING_EMAIL_MESSAGE));
    }

    #[test]
    fn test_output_item_serialises_paired_item_in_host_shape() {
        let input = InputItem::new(json!({}));
        let out = OutputItem::with_result(ItemIndex::new(4), &input, json!({}));
        let value = serde_json::to_value(&out).unwrap();
        assert_eq!(value["pairedItem"]["item"], 4);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("batch".parse::<ProcessingMode>().unwrap(), ProcessingMode::Batch);
        assert!("parallel".parse::<ProcessingMode>().is_err());
        assert_eq!(
            "deepverify".parse::<VerificationMode>().unwrap(),
            VerificationMode::DeepVerify
        );
        assert_eq!("0".parse::<CatchallVerify>().unwrap(), CatchallVerify::Enabled);
        assert!("2".parse::<CatchallVerify>().is_err());
    }
}
