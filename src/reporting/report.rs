//! Path-addressed execution tree.
//!
//! Nodes live in an arena indexed by their full path, so each operation is a single
//! hash lookup instead of a walk from the root. Snapshots rebuild an owned tree.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{ReportError, ReportResult};
use crate::constants::REPORT_ID_LEN;

/// Lifecycle of a report node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Pending,
    Running,
    Complete,
    Error,
}

/// Owned, detached copy of one node and its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    pub status: NodeStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub children: Vec<ReportNode>,
}

impl ReportNode {
    /// Direct child by name.
    pub fn child(&self, name: &str) -> Option<&ReportNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Descendant addressed by `path` relative to this node.
    pub fn find(&self, path: &[&str]) -> Option<&ReportNode> {
        path.iter()
            .try_fold(self, |node, segment| node.child(segment))
    }

    /// Visits every node with its path from this node.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&[&'a str], &'a ReportNode)) {
        fn inner<'a>(
            node: &'a ReportNode,
            path: &mut Vec<&'a str>,
            visit: &mut impl FnMut(&[&'a str], &'a ReportNode),
        ) {
            visit(path, node);
            for child in &node.children {
                path.push(&child.name);
                inner(child, path, visit);
                path.pop();
            }
        }

        let mut path = Vec::new();
        inner(self, &mut path, visit);
    }
}

/// Streaming callback invoked with each emitted snapshot.
pub type ReportSubscriber = Arc<dyn Fn(&ReportNode) + Send + Sync>;

struct NodeSlot {
    name: String,
    path: Vec<String>,
    children: Vec<usize>,
    status: NodeStatus,
    started_at: Option<DateTime<Utc>>,
    started: Option<Instant>,
    completed_at: Option<DateTime<Utc>>,
    duration_ms: Option<u64>,
    error: Option<String>,
    data: Map<String, Value>,
}

impl NodeSlot {
    fn running(name: String, path: Vec<String>) -> Self {
        Self {
            name,
            path,
            children: Vec::new(),
            status: NodeStatus::Running,
            started_at: Some(Utc::now()),
            started: Some(Instant::now()),
            completed_at: None,
            duration_ms: None,
            error: None,
            data: Map::new(),
        }
    }

    fn finish(&mut self, status: NodeStatus, error: Option<String>) {
        self.status = status;
        self.error = error;
        self.completed_at = Some(Utc::now());
        self.duration_ms = Some(
            self.started
                .map(|s| s.elapsed().as_millis() as u64)
                .unwrap_or(0),
        );
    }
}

struct ReportState {
    nodes: Vec<NodeSlot>,
    index: HashMap<Vec<String>, usize>,
    /// Slots released by restarted subtrees, reused before the arena grows.
    free: Vec<usize>,
}

impl ReportState {
    const ROOT: usize = 0;

    fn alloc(&mut self, slot: NodeSlot) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = slot;
                idx
            }
            None => {
                self.nodes.push(slot);
                self.nodes.len() - 1
            }
        }
    }

    fn lookup(&self, path: &[String]) -> ReportResult<usize> {
        self.index
            .get(path)
            .copied()
            .ok_or_else(|| ReportError::NodeNotFound {
                path: display_path(path),
            })
    }

    fn descendants(&self, idx: usize, out: &mut Vec<usize>) {
        for &child in &self.nodes[idx].children {
            out.push(child);
            self.descendants(child, out);
        }
    }

    fn build(&self, idx: usize) -> ReportNode {
        let slot = &self.nodes[idx];
        ReportNode {
            name: slot.name.clone(),
            report_id: None,
            status: slot.status,
            started_at: slot.started_at,
            completed_at: slot.completed_at,
            duration_ms: slot.duration_ms,
            error: slot.error.clone(),
            data: slot.data.clone(),
            children: slot.children.iter().map(|&c| self.build(c)).collect(),
        }
    }
}

fn display_path(path: &[String]) -> String {
    format!("/{}", path.join("/"))
}

/// Generates the 16-character public identifier of a report.
pub fn generate_report_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(REPORT_ID_LEN);
    id
}

/// Mutable execution tree for one pipeline run.
pub struct Report {
    id: String,
    state: Mutex<ReportState>,
    subscriber: Option<ReportSubscriber>,
}

impl std::fmt::Debug for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Report")
            .field("id", &self.id)
            .field("nodes", &self.state.lock().nodes.len())
            .field("has_subscriber", &self.subscriber.is_some())
            .finish()
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Report {
    /// Creates a report whose root node is already running.
    pub fn new(subscriber: Option<ReportSubscriber>) -> Self {
        let mut index = HashMap::new();
        index.insert(Vec::new(), ReportState::ROOT);

        Self {
            id: generate_report_id(),
            state: Mutex::new(ReportState {
                nodes: vec![NodeSlot::running("root".to_string(), Vec::new())],
                index,
                free: Vec::new(),
            }),
            subscriber,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Starts a running node at `path`; the parent must already exist.
    ///
    /// Starting an existing path resets that node in place.
    pub fn start_at_path(&self, path: &[String]) -> ReportResult<()> {
        let Some((name, parent_path)) = path.split_last() else {
            return Err(ReportError::RootPath {
                operation: "start_at_path",
            });
        };

        let mut state = self.state.lock();

        let parent = state
            .index
            .get(parent_path)
            .copied()
            .ok_or_else(|| ReportError::MissingParent {
                path: display_path(path),
            })?;

        if let Some(&existing) = state.index.get(path) {
            let mut stale = Vec::new();
            state.descendants(existing, &mut stale);
            for idx in stale {
                let stale_path = std::mem::take(&mut state.nodes[idx].path);
                state.index.remove(&stale_path);
                state.free.push(idx);
            }
            state.nodes[existing] = NodeSlot::running(name.clone(), path.to_vec());
            return Ok(());
        }

        let idx = state.alloc(NodeSlot::running(name.clone(), path.to_vec()));
        state.nodes[parent].children.push(idx);
        state.index.insert(path.to_vec(), idx);

        Ok(())
    }

    /// Marks the node at `path` complete.
    pub fn end_at_path(&self, path: &[String]) -> ReportResult<()> {
        let mut state = self.state.lock();
        let idx = state.lookup(path)?;
        state.nodes[idx].finish(NodeStatus::Complete, None);
        Ok(())
    }

    /// Marks the node at `path` failed with `error`.
    pub fn error_at_path(&self, path: &[String], error: &str) -> ReportResult<()> {
        let mut state = self.state.lock();
        let idx = state.lookup(path)?;
        state.nodes[idx].finish(NodeStatus::Error, Some(error.to_string()));
        Ok(())
    }

    /// Attaches `value` under `key`; an empty path addresses the root.
    pub fn set_at_path(&self, path: &[String], key: &str, value: Value) -> ReportResult<()> {
        let mut state = self.state.lock();
        let idx = state.lookup(path)?;
        state.nodes[idx].data.insert(key.to_string(), value);
        Ok(())
    }

    /// Finishes the root node.
    pub fn complete(&self) {
        let mut state = self.state.lock();
        state.nodes[ReportState::ROOT].finish(NodeStatus::Complete, None);
    }

    /// Number of arena slots in use or free for reuse.
    #[cfg(test)]
    pub(crate) fn arena_len(&self) -> usize {
        self.state.lock().nodes.len()
    }

    /// Deep copy of the whole tree.
    pub fn snapshot(&self) -> ReportNode {
        let mut root = self.state.lock().build(ReportState::ROOT);
        root.report_id = Some(self.id.clone());
        root
    }

    /// Sends a snapshot to the subscriber, if any. The lock is released before the call.
    pub fn emit(&self) {
        if let Some(subscriber) = &self.subscriber {
            let snapshot = self.snapshot();
            subscriber(&snapshot);
        }
    }
}
