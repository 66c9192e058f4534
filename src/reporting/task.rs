use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tracing::{Instrument, Span, info_span, warn};

use super::error::ReportError;
use super::report::{Report, ReportNode};
use crate::constants::TASK_SPAN_PREFIX;

/// Scoped handle into a [`Report`]; the only way pipeline code adds nodes.
///
/// The span is optional: a task without one skips every span operation.
#[derive(Clone)]
pub struct Task {
    report: Arc<Report>,
    path: Vec<String>,
    span: Option<Span>,
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("report_id", &self.report.id())
            .field("path", &self.path)
            .field("traced", &self.span.is_some())
            .finish()
    }
}

impl Task {
    pub(crate) fn root(report: Arc<Report>, span: Option<Span>) -> Self {
        Self {
            report,
            path: Vec::new(),
            span,
        }
    }

    /// Root task over a private report with no span (tests, one-off calls).
    pub fn detached() -> Self {
        Self::root(Arc::new(Report::default()), None)
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn report_id(&self) -> &str {
        self.report.id()
    }

    /// Snapshot of the whole report this task writes into.
    pub fn snapshot(&self) -> ReportNode {
        self.report.snapshot()
    }

    /// Records `value` under `key` on this task's node and emits.
    ///
    /// Recording never fails the caller; problems are logged.
    pub fn set_data<V: Serialize>(&self, key: &str, value: V) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                warn!(key = key, error = %e, "Dropping unserializable report data");
                return;
            }
        };

        if let Err(e) = self.report.set_at_path(&self.path, key, value) {
            warn!(key = key, error = %e, "Failed to record report data");
            return;
        }
        self.report.emit();
    }

    /// Runs `f` inside a child node named `name`.
    ///
    /// The child is marked complete on `Ok` and error on `Err`; the error is returned unchanged.
    pub async fn child<T, E, F, Fut>(&self, name: &str, f: F) -> Result<T, E>
    where
        F: FnOnce(Task) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display + From<ReportError>,
    {
        let mut path = self.path.clone();
        path.push(name.to_string());

        self.report.start_at_path(&path)?;
        self.report.emit();

        let span = match &self.span {
            Some(parent) => info_span!(
                parent: parent,
                "quiz.task",
                task = %format!("{}{}", TASK_SPAN_PREFIX, name),
                report_id = %self.report.id(),
            ),
            None => Span::none(),
        };

        let child = Task {
            report: Arc::clone(&self.report),
            path: path.clone(),
            span: self.span.as_ref().map(|_| span.clone()),
        };

        let result = f(child).instrument(span).await;

        let recorded = match &result {
            Ok(_) => self.report.end_at_path(&path),
            Err(e) => self.report.error_at_path(&path, &e.to_string()),
        };
        if let Err(e) = recorded {
            warn!(task = name, error = %e, "Failed to record task outcome");
        }
        self.report.emit();

        result
    }
}
