//! Pipeline instrumentation: a path-addressed report tree, scoped tasks and the tracker.
//!
//! Every [`Task::child`] call starts a node, opens a `quiz.task` span under the parent
//! task's span, and records completion or failure. Errors are recorded and returned as-is.

pub mod error;
pub mod report;
pub mod task;
pub mod tracker;

#[cfg(test)]
mod tests;

pub use error::{ReportError, ReportResult};
pub use report::{NodeStatus, Report, ReportNode, ReportSubscriber, generate_report_id};
pub use task::Task;
pub use tracker::Tracker;
