use fanout_platforms::{PlatformId, PlatformResult};
use serde::Serialize;
use std::{collections::HashMap, time::Duration};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PlatformStats {
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct DispatchStats {
    pub total_execution_time: Duration,
    pub dispatches: usize,
    pub rejected: usize,
    pub platforms: HashMap<PlatformId, PlatformStats>,
}

impl Default for DispatchStats {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchStats {
    pub fn new() -> Self {
        Self {
            total_execution_time: Duration::new(0, 0),
            dispatches: 0,
            rejected: 0,
            platforms: HashMap::new(),
        }
    }

    pub fn record_execution_time(&mut self, duration: Duration) {
        self.total_execution_time += duration;
        self.dispatches += 1;
    }

    /// A request that failed validation and reached no adapter.
    pub fn record_rejection(&mut self) {
        self.rejected += 1;
    }

    pub fn record_result(&mut self, result: &PlatformResult) {
        let entry = self.platforms.entry(result.platform()).or_default();
        if result.is_success() {
            entry.succeeded += 1;
        } else {
            entry.failed += 1;
        }
    }

    pub fn platform(&self, platform: PlatformId) -> PlatformStats {
        self.platforms.get(&platform).cloned().unwrap_or_default()
    }

    pub fn average_execution_time(&self) -> Duration {
        if self.dispatches == 0 {
            return Duration::new(0, 0);
        }
        self.total_execution_time / self.dispatches as u32
    }
}
