use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tracing::{Instrument, debug, info_span, warn};

use super::report::{Report, ReportNode, ReportSubscriber};
use super::task::Task;

/// Binds one pipeline run to one [`Report`] and one root span.
///
/// Use a fresh tracker per run.
#[derive(Debug, Clone)]
pub struct Tracker {
    report: Arc<Report>,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracker {
    pub fn new() -> Self {
        Self {
            report: Arc::new(Report::new(None)),
        }
    }

    /// Tracker whose report streams every emitted snapshot to `callback`.
    pub fn with_subscriber<F>(callback: F) -> Self
    where
        F: Fn(&ReportNode) + Send + Sync + 'static,
    {
        let subscriber: ReportSubscriber = Arc::new(callback);
        Self {
            report: Arc::new(Report::new(Some(subscriber))),
        }
    }

    pub fn report_id(&self) -> &str {
        self.report.id()
    }

    /// Runs `f` with the root task. The report is completed and emitted whatever the outcome.
    pub async fn run<T, E, F, Fut>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(Task) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let span = info_span!("quiz.pipeline", report_id = %self.report.id());
        let task = Task::root(Arc::clone(&self.report), Some(span.clone()));

        let result = f(task).instrument(span).await;

        if let Err(e) = &result {
            debug!(report_id = %self.report.id(), error = %e, "Pipeline run failed");
            if let Err(record_err) =
                self.report
                    .set_at_path(&[], "error", Value::String(e.to_string()))
            {
                warn!(
                    report_id = %self.report.id(),
                    error = %record_err,
                    "Failed to record pipeline error on report root"
                );
            }
        }

        self.report.complete();
        self.report.emit();

        result
    }

    /// Final (or current) snapshot for one-shot reporting.
    pub fn get_report(&self) -> ReportNode {
        self.report.snapshot()
    }
}
