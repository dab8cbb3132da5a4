//! Two-phase replacement for platforms without in-place edits.
use serde_json::{Value, json};

use crate::{PlatformError, PlatformId, PlatformResult};

/// Result of a delete-then-recreate update.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// Old post deleted and the new one created.
    Replaced { replaced_id: String, data: Value },
    /// Old post deleted, new post not created. The content is gone.
    RecreateFailed {
        deleted_id: String,
        error: PlatformError,
    },
    /// Delete failed, so the original post is untouched.
    DeleteFailed { error: PlatformError },
}

impl UpdateOutcome {
    pub fn is_replaced(&self) -> bool {
        matches!(self, UpdateOutcome::Replaced { .. })
    }

    /// Whether the upstream state changed.
    pub fn mutated(&self) -> bool {
        !matches!(self, UpdateOutcome::DeleteFailed { .. })
    }

    pub fn into_platform_result(self, platform: PlatformId) -> PlatformResult {
        match self {
            UpdateOutcome::Replaced { replaced_id, data } => PlatformResult::ok(
                platform,
                json!({ "replacedId": replaced_id, "post": data }),
            ),
            UpdateOutcome::RecreateFailed { deleted_id, error } => PlatformResult::err(
                platform,
                format!(
                    "old content removed, new content not created: post {deleted_id} was deleted but recreating it failed: {error}"
                ),
            ),
            UpdateOutcome::DeleteFailed { error } => PlatformResult::err(
                platform,
                format!("update aborted, original content left in place: {error}"),
            ),
        }
    }
}
