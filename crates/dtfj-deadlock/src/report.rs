use anyhow::{anyhow, Result};
use dtfj_model::{MonitorId, Snapshot, SnapshotIndex, ThreadId};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::info;

use crate::{monitor_states, DeadlockTag, MonitorGraph, MonitorStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Report chains that run into a deadlock or a contended lock, not just
    /// closed loops.
    pub include_branches: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            include_branches: true,
        }
    }
}

impl AnalysisOptions {
    /// Reads options from a merged config JSON.
    ///
    /// Optional:
    /// - deadlock.include_branches (bool); default=true
    pub fn from_config_json(cfg: &Value) -> Result<Self> {
        let mut options = Self::default();
        if let Some(v) = cfg.pointer("/deadlock/include_branches") {
            options.include_branches = v
                .as_bool()
                .ok_or_else(|| anyhow!("deadlock.include_branches must be a bool (got {v})"))?;
        }
        Ok(options)
    }
}

/// One rendered chain of the wait-for graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeadlockChain {
    pub list_id: u32,
    pub kind: DeadlockTag,
    /// Monitors in wait order; a loop ends on its entry again.
    pub monitors: Vec<MonitorId>,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MonitorTag {
    pub monitor: MonitorId,
    pub tag: DeadlockTag,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlockedThread {
    pub thread: ThreadId,
    pub name: String,
    pub status: MonitorStatus,
    pub monitor: MonitorId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeadlockReport {
    pub loops: Vec<DeadlockChain>,
    pub branches: Vec<DeadlockChain>,
    pub tags: Vec<MonitorTag>,
    pub blocked: Vec<BlockedThread>,
}

impl DeadlockReport {
    pub fn has_deadlock(&self) -> bool {
        !self.loops.is_empty()
    }

    pub fn tag(&self, monitor: MonitorId) -> Option<DeadlockTag> {
        self.tags.iter().find(|t| t.monitor == monitor).map(|t| t.tag)
    }
}

impl fmt::Display for DeadlockReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.loops.is_empty() && self.branches.is_empty() {
            write!(f, "no deadlocks detected")?;
        }
        for (i, chain) in self.loops.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "Deadlock loop:")?;
            write!(f, "{}", chain.text)?;
        }
        for (i, chain) in self.branches.iter().enumerate() {
            if i > 0 || !self.loops.is_empty() {
                writeln!(f)?;
            }
            writeln!(f, "Deadlock branch:")?;
            write!(f, "{}", chain.text)?;
        }
        if !self.blocked.is_empty() {
            write!(f, "\n\nBlocked threads:")?;
            for b in &self.blocked {
                write!(f, "\n  {} ({}): {} {}", b.name, b.thread, b.status, b.monitor)?;
            }
        }
        Ok(())
    }
}

/// Builds and classifies the wait-for graph of one snapshot.
pub fn analyze(snapshot: &Snapshot, options: &AnalysisOptions) -> DeadlockReport {
    let mut graph = MonitorGraph::from_snapshot(snapshot);
    graph.classify();

    let mut loops = Vec::new();
    let mut branches = Vec::new();
    for list in graph.lists() {
        let kind = list.tag();
        let chain = || DeadlockChain {
            list_id: list.id,
            kind,
            monitors: graph.monitors_of(list),
            text: graph.render(list),
        };
        match kind {
            DeadlockTag::LoopDeadlock => loops.push(chain()),
            DeadlockTag::BranchDeadlock if options.include_branches => branches.push(chain()),
            _ => {}
        }
    }

    let tags = graph
        .nodes()
        .iter()
        .map(|n| MonitorTag {
            monitor: n.monitor,
            tag: n.deadlock,
        })
        .collect();

    let threads = SnapshotIndex::new(snapshot);
    let blocked = monitor_states(snapshot)
        .into_iter()
        .map(|(thread, state)| BlockedThread {
            thread,
            name: threads.thread_name(thread),
            status: state.status,
            monitor: state.monitor,
        })
        .collect();

    let report = DeadlockReport {
        loops,
        branches,
        tags,
        blocked,
    };
    info!(
        provider = %snapshot.provider,
        monitors = report.tags.len(),
        loops = report.loops.len(),
        branches = report.branches.len(),
        blocked = report.blocked.len(),
        "deadlock analysis finished"
    );
    report
}
