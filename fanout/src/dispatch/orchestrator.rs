#![deny(clippy::unwrap_used)]
use crate::dispatch::{
    DeleteRequest, DispatchOutcome, DispatchStats, Operation, PublishRequest,
    UpdateRequest, ValidationError,
};
use derive_builder::Builder;
use fanout_config::DispatchSettings;
use fanout_platforms::{PlatformId, PlatformResult, SharedAdapter};
use futures::future::join_all;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Builder, Clone, Debug)]
#[builder(public, setter(into))]
pub struct DispatchOptions {
    /// Invoke adapters concurrently. Results keep declared order either way.
    #[builder(default = "true")]
    pub parallel: bool,
    /// An adapter still running after this long yields a failed result. The
    /// call itself is not cancelled and finishes in the background.
    #[builder(default = "std::time::Duration::from_secs(120)")]
    pub adapter_timeout: Duration,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            adapter_timeout: Duration::from_secs(120),
        }
    }
}

impl From<&DispatchSettings> for DispatchOptions {
    fn from(settings: &DispatchSettings) -> Self {
        Self {
            parallel: settings.parallel,
            adapter_timeout: settings.adapter_timeout(),
        }
    }
}

#[derive(Clone)]
enum Action {
    Publish {
        title: String,
        description: String,
    },
    Update {
        post_id: String,
        title: String,
        description: String,
    },
    Delete {
        post_id: String,
    },
}

impl Action {
    async fn run(self, adapter: SharedAdapter) -> PlatformResult {
        match self {
            Action::Publish { title, description } => {
                adapter.publish(&title, &description).await
            }
            Action::Update {
                post_id,
                title,
                description,
            } => adapter.update(&post_id, &title, &description).await,
            Action::Delete { post_id } => adapter.delete(&post_id).await,
        }
    }
}

/// Fans one authoring request out to the registered platform adapters.
///
/// A failing, slow or missing adapter only affects its own
/// [`PlatformResult`]; the outcome always holds one result per requested
/// platform.
pub struct DispatchOrchestrator {
    adapters: HashMap<PlatformId, SharedAdapter>,
    options: DispatchOptions,
    stats: Arc<Mutex<DispatchStats>>,
}

impl DispatchOrchestrator {
    pub fn new(options: DispatchOptions) -> Self {
        Self {
            adapters: HashMap::new(),
            options,
            stats: Arc::new(Mutex::new(DispatchStats::new())),
        }
    }

    /// Register `adapter` under its own platform id, replacing any previous one.
    pub fn register(&mut self, adapter: SharedAdapter) {
        let platform = adapter.platform();
        if self.adapters.insert(platform, adapter).is_some() {
            warn!(%platform, "Replaced registered adapter");
        }
    }

    pub fn with_adapter(mut self, adapter: SharedAdapter) -> Self {
        self.register(adapter);
        self
    }

    pub fn adapter(&self, platform: PlatformId) -> Option<&SharedAdapter> {
        self.adapters.get(&platform)
    }

    /// Registered platforms in canonical order.
    pub fn platforms(&self) -> Vec<PlatformId> {
        PlatformId::ALL
            .into_iter()
            .filter(|platform| self.adapters.contains_key(platform))
            .collect()
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn dispatch(
        &self,
        request: &PublishRequest,
    ) -> Result<DispatchOutcome, ValidationError> {
        let platforms = self.validated(request.validate())?;
        let targets = platforms
            .into_iter()
            .map(|platform| {
                (
                    platform,
                    Action::Publish {
                        title: request.title.clone(),
                        description: request.description.clone(),
                    },
                )
            })
            .collect();
        Ok(self.fan_out(Operation::Publish, targets).await)
    }

    pub async fn dispatch_update(
        &self,
        request: &UpdateRequest,
    ) -> Result<DispatchOutcome, ValidationError> {
        let posts = self.validated(request.validate())?;
        let targets = posts
            .into_iter()
            .map(|(platform, post_id)| {
                (
                    platform,
                    Action::Update {
                        post_id,
                        title: request.title.clone(),
                        description: request.description.clone(),
                    },
                )
            })
            .collect();
        Ok(self.fan_out(Operation::Update, targets).await)
    }

    pub async fn dispatch_delete(
        &self,
        request: &DeleteRequest,
    ) -> Result<DispatchOutcome, ValidationError> {
        let posts = self.validated(request.validate())?;
        let targets = posts
            .into_iter()
            .map(|(platform, post_id)| (platform, Action::Delete { post_id }))
            .collect();
        Ok(self.fan_out(Operation::Delete, targets).await)
    }

    fn validated<T>(
        &self,
        validation: Result<T, ValidationError>,
    ) -> Result<T, ValidationError> {
        validation.inspect_err(|e| {
            warn!("Rejected dispatch request: {}", e);
            self.stats
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .record_rejection();
        })
    }

    async fn fan_out(
        &self,
        operation: Operation,
        targets: Vec<(PlatformId, Action)>,
    ) -> DispatchOutcome {
        let span = info_span!("dispatch", %operation, platforms = targets.len());
        async {
            let start_time = Instant::now();

            let results = if self.options.parallel {
                join_all(
                    targets
                        .iter()
                        .map(|(platform, action)| self.invoke(*platform, action)),
                )
                .await
            } else {
                let mut results = Vec::with_capacity(targets.len());
                for (platform, action) in &targets {
                    results.push(self.invoke(*platform, action).await);
                }
                results
            };

            let outcome = DispatchOutcome::new(operation, results);
            {
                let mut stats =
                    self.stats.lock().unwrap_or_else(PoisonError::into_inner);
                stats.record_execution_time(start_time.elapsed());
                for result in outcome.results() {
                    stats.record_result(result);
                }
            }
            info!(
                succeeded = outcome.succeeded(),
                failed = outcome.failed(),
                "{}",
                outcome.message()
            );
            outcome
        }
        .instrument(span)
        .await
    }

    async fn invoke(&self, platform: PlatformId, action: &Action) -> PlatformResult {
        let Some(adapter) = self.adapters.get(&platform) else {
            warn!(%platform, "No adapter registered");
            return PlatformResult::err(
                platform,
                format!("no adapter registered for platform {platform}"),
            );
        };

        // a spawned call survives the timeout, so a multi-step mutation is
        // never abandoned between its steps
        let mut call = tokio::spawn(
            action
                .clone()
                .run(adapter.clone())
                .instrument(info_span!("adapter_call", %platform)),
        );

        let timeout = self.options.adapter_timeout;
        match tokio::time::timeout(timeout, &mut call).await {
            Ok(Ok(result)) => {
                if result.is_success() {
                    debug!(%platform, "Adapter succeeded");
                } else {
                    warn!(
                        %platform,
                        "Adapter failed: {}",
                        result.error_message().unwrap_or("unknown error")
                    );
                }
                result
            }
            Ok(Err(join_error)) => {
                error!(%platform, "Adapter call aborted: {}", join_error);
                PlatformResult::err(platform, format!("adapter call aborted: {join_error}"))
            }
            Err(_elapsed) => {
                warn!(%platform, ?timeout, "Adapter timed out, leaving call to finish");
                tokio::spawn(async move {
                    match call.await {
                        Ok(result) if result.is_success() => {
                            info!(%platform, "Timed out adapter call finished successfully")
                        }
                        Ok(result) => warn!(
                            %platform,
                            "Timed out adapter call failed: {}",
                            result.error_message().unwrap_or("unknown error")
                        ),
                        Err(e) => error!(%platform, "Timed out adapter call aborted: {}", e),
                    }
                });
                PlatformResult::err(
                    platform,
                    format!("upstream call timed out after {}s", timeout.as_secs_f64()),
                )
            }
        }
    }
}
