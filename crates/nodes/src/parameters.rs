//! Node parameters and their per-item resolution.

use std::num::NonZeroUsize;

use pipeline::{AdditionalFields, FieldName, InputItem, Operation, ProcessingMode, VerifyQuery};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where an item's email address comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailSource {
    /// Read from the item payload. A name starting with `/` is a JSON pointer
    /// (`/contact/email`); anything else is a top-level key.
    Field(FieldName),
    /// The same literal address for every item.
    Literal(String),
}

impl EmailSource {
    /// Resolves the raw address for `item`. Missing fields and non-string
    /// values resolve to `None`.
    pub fn resolve<'a>(&'a self, item: &'a InputItem) -> Option<&'a str> {
        match self {
            Self::Literal(email) => Some(email.as_str()),
            Self::Field(name) => {
                let value = if name.as_str().starts_with('/') {
                    item.json.pointer(name.as_str())
                } else {
                    item.json.get(name.as_str())
                };
                value.and_then(Value::as_str)
            }
        }
    }
}

impl Default for EmailSource {
    fn default() -> Self {
        Self::Field(FieldName::email())
    }
}

/// Configuration of one node instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeParameters {
    /// Configured operation name; validated when the node executes.
    pub operation: String,

    /// Source of each item's email address.
    pub email: EmailSource,

    /// Sequential or batch processing.
    #[serde(default)]
    pub processing_mode: ProcessingMode,

    /// Optional verification settings sent with every request.
    #[serde(default)]
    pub additional_fields: AdditionalFields,

    /// Sequential mode only: embed item failures instead of aborting.
    #[serde(default)]
    pub continue_on_fail: bool,

    /// Batch mode only: cap on in-flight requests. `None` is unbounded.
    #[serde(default)]
    pub max_concurrency: Option<NonZeroUsize>,
}

impl Default for NodeParameters {
    fn default() -> Self {
        Self {
            operation: Operation::ValidateEmail.as_str().to_string(),
            email: EmailSource::default(),
            processing_mode: ProcessingMode::Sequential,
            additional_fields: AdditionalFields::default(),
            continue_on_fail: false,
            max_concurrency: None,
        }
    }
}

impl NodeParameters {
    /// Builds the request for `item`, or `None` when no email resolves.
    pub fn resolve(&self, item: &InputItem) -> Option<VerifyQuery> {
        let email = self.email.resolve(item)?;
        VerifyQuery::new(email, self.additional_fields.clone())
    }
}
