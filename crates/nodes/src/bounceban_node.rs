//! The BounceBan verification node.
//!
//! One invocation takes the full list of input items and produces exactly one
//! output item per input, paired by index. See [`BouncebanNode::execute`] for
//! the failure semantics of each processing mode.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use pipeline::{
    ApiError, EmailVerifier, InputItem, ItemIndex, NodeError, Operation, OutputItem,
    ProcessingMode, RunId, RunSummary, Timestamp, MISSING_EMAIL_MESSAGE,
};
use serde_json::Value;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::parameters::NodeParameters;

/// Result of a successful invocation.
#[derive(Debug, Clone)]
pub struct NodeOutput {
    /// Identifier recorded on the invocation's tracing span.
    pub run_id: RunId,
    /// One output per input, in input order.
    pub items: Vec<OutputItem>,
    /// Per-invocation counters.
    pub summary: RunSummary,
}

/// How a single item ended up.
enum Processed {
    Verified(OutputItem),
    MissingEmail(OutputItem),
    Failed(OutputItem),
}

impl Processed {
    fn into_output(self) -> OutputItem {
        match self {
            Self::Verified(o) | Self::MissingEmail(o) | Self::Failed(o) => o,
        }
    }
}

#[derive(Default)]
struct Tally {
    verified: usize,
    missing_email: usize,
    failed: usize,
}

impl Tally {
    fn record(&mut self, processed: &Processed) {
        match processed {
            Processed::Verified(_) => self.verified += 1,
            Processed::MissingEmail(_) => self.missing_email += 1,
            Processed::Failed(_) => self.failed += 1,
        }
    }
}

/// Verifies the email address of every input item.
pub struct BouncebanNode {
    verifier: Arc<dyn EmailVerifier>,
    parameters: NodeParameters,
}

impl BouncebanNode {
    pub fn new(verifier: Arc<dyn EmailVerifier>, parameters: NodeParameters) -> Self {
        Self {
            verifier,
            parameters,
        }
    }

    pub fn parameters(&self) -> &NodeParameters {
        &self.parameters
    }

    /// Runs the configured operation over `items`.
    ///
    /// - The operation name is validated first; an unknown name fails before
    ///   any request is sent.
    /// - An item without an email address gets an embedded
    ///   `"Email address is required"` error and no request.
    /// - [`ProcessingMode::Sequential`]: items run one at a time. The first
    ///   service error aborts with [`NodeError::ItemFailed`] unless
    ///   `continue_on_fail` is set, in which case it is embedded.
    /// - [`ProcessingMode::Batch`]: items run concurrently and every service
    ///   error is embedded in its own item; the invocation never aborts.
    pub async fn execute(&self, items: &[InputItem]) -> Result<NodeOutput, NodeError> {
        let operation = Operation::parse(&self.parameters.operation)?;
        let run_id = RunId::new_random();
        let mode = self.parameters.processing_mode;

        let span = info_span!(
            "bounceban_node",
            run_id = %run_id,
            operation = %operation,
            processing_mode = %mode,
            items = items.len(),
        );

        async move {
            let started_at = Timestamp::now();

            let (outputs, tally) = match mode {
                ProcessingMode::Sequential => self.run_sequential(operation, items).await?,
                ProcessingMode::Batch => self.run_batch(operation, items).await,
            };

            let summary = RunSummary {
                items: items.len(),
                verified: tally.verified,
                missing_email: tally.missing_email,
                failed: tally.failed,
                processing_mode: mode,
                started_at,
                finished_at: Timestamp::now(),
            };

            info!(
                verified = summary.verified,
                missing_email = summary.missing_email,
                failed = summary.failed,
                "node run complete"
            );

            Ok::<_, NodeError>(NodeOutput {
                run_id,
                items: outputs,
                summary,
            })
        }
        .instrument(span)
        .await
    }

    /// Processes one item. Service errors are returned as
    /// [`NodeError::ItemFailed`], not embedded; an unknown operation is
    /// [`NodeError::UnknownOperation`].
    pub async fn process_item(
        &self,
        index: ItemIndex,
        item: &InputItem,
    ) -> Result<OutputItem, NodeError> {
        let operation = Operation::parse(&self.parameters.operation)?;
        self.process(operation, index, item)
            .await
            .map(Processed::into_output)
            .map_err(|source| NodeError::ItemFailed {
                item: index,
                source,
            })
    }

    /// Credential test: succeeds when the service accepts the API key.
    pub async fn test_credentials(&self) -> Result<Value, ApiError> {
        self.verifier.account().await
    }

    async fn run_sequential(
        &self,
        operation: Operation,
        items: &[InputItem],
    ) -> Result<(Vec<OutputItem>, Tally), NodeError> {
        let mut outputs = Vec::with_capacity(items.len());
        let mut tally = Tally::default();

        for (i, item) in items.iter().enumerate() {
            let index = ItemIndex::new(i);

            let processed = match self.process(operation, index, item).await {
                Ok(processed) => processed,
                Err(e) if self.parameters.continue_on_fail => {
                    warn!(item = %index, error = %e, "item failed; continuing");
                    Processed::Failed(OutputItem::with_error(index, item, e.to_string()))
                }
                Err(e) => {
                    error!(item = %index, error = %e, "item failed; aborting run");
                    return Err(NodeError::ItemFailed {
                        item: index,
                        source: e,
                    });
                }
            };

            tally.record(&processed);
            outputs.push(processed.into_output());
        }

        Ok((outputs, tally))
    }

    async fn run_batch(&self, operation: Operation, items: &[InputItem]) -> (Vec<OutputItem>, Tally) {
        let tasks = items.iter().enumerate().map(|(i, item)| async move {
            let index = ItemIndex::new(i);
            match self.process(operation, index, item).await {
                Ok(processed) => processed,
                Err(e) => {
                    warn!(item = %index, error = %e, "item failed");
                    Processed::Failed(OutputItem::with_error(index, item, e.to_string()))
                }
            }
        });

        // `buffered` keeps input order regardless of completion order.
        let limit = self
            .parameters
            .max_concurrency
            .map_or(items.len().max(1), |n| n.get());
        let results: Vec<Processed> = stream::iter(tasks).buffered(limit).collect().await;

        let mut tally = Tally::default();
        let outputs = results
            .into_iter()
            .map(|processed| {
                tally.record(&processed);
                processed.into_output()
            })
            .collect();

        (outputs, tally)
    }

    async fn process(
        &self,
        operation: Operation,
        index: ItemIndex,
        item: &InputItem,
    ) -> Result<Processed, ApiError> {
        match operation {
            Operation::ValidateEmail => {
                let Some(query) = self.parameters.resolve(item) else {
                    debug!(item = %index, "no email address; skipping request");
                    return Ok(Processed::MissingEmail(OutputItem::with_error(
                        index,
                        item,
                        MISSING_EMAIL_MESSAGE,
                    )));
                };

                let result = self.verifier.verify(&query).await?;
                Ok(Processed::Verified(OutputItem::with_result(index, item, result)))
            }
        }
    }
}
