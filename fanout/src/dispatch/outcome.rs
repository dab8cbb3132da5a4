use fanout_platforms::PlatformResult;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Publish,
    Update,
    Delete,
}

impl Operation {
    fn summary_verb(&self) -> &'static str {
        match self {
            Operation::Publish => "published to",
            Operation::Update => "updated on",
            Operation::Delete => "deleted from",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Publish => "publish",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Per-platform results of one dispatch, in declared platform order.
///
/// Returned even when every platform failed.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    operation: Operation,
    results: Vec<PlatformResult>,
}

/// Transport-agnostic response body: `{success, message, results}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<PlatformResult>,
}

impl DispatchOutcome {
    pub fn new(operation: Operation, results: Vec<PlatformResult>) -> Self {
        Self { operation, results }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn results(&self) -> &[PlatformResult] {
        &self.results
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// True when at least one platform succeeded.
    pub fn is_success(&self) -> bool {
        self.succeeded() > 0
    }

    pub fn all_succeeded(&self) -> bool {
        !self.results.is_empty() && self.failed() == 0
    }

    /// e.g. `published to 1 of 2 platforms`
    pub fn message(&self) -> String {
        let total = self.results.len();
        let noun = if total == 1 { "platform" } else { "platforms" };
        format!(
            "{} {} of {} {}",
            self.operation.summary_verb(),
            self.succeeded(),
            total,
            noun
        )
    }

    pub fn into_response(self) -> DispatchResponse {
        DispatchResponse {
            success: self.is_success(),
            message: self.message(),
            results: self.results,
        }
    }
}
