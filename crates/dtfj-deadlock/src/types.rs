use dtfj_model::{Access, MonitorId, ObjectId, ThreadId};
use serde::Serialize;
use std::fmt;

/// Index of a node inside a [`crate::MonitorGraph`].
pub type NodeId = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlockTag {
    Unknown,
    NoDeadlock,
    LoopDeadlock,
    BranchDeadlock,
}

impl fmt::Display for DeadlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "UNKNOWN"),
            Self::NoDeadlock => write!(f, "NO_DEADLOCK"),
            Self::LoopDeadlock => write!(f, "LOOP_DEADLOCK"),
            Self::BranchDeadlock => write!(f, "BRANCH_DEADLOCK"),
        }
    }
}

/// One monitor in the wait-for graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonitorNode {
    pub monitor: MonitorId,
    pub owner: Access<Option<ThreadId>>,
    /// `Ok(None)` for a raw monitor.
    pub object: Access<Option<ObjectId>>,
    /// Owner thread name, or a placeholder when it cannot be read.
    pub owner_name: String,
    /// Monitor the owner thread is blocked trying to enter.
    pub waiting_on: Option<NodeId>,
    /// Traversal pass that first reached this node; 0 = not visited.
    pub visit: u32,
    pub deadlock: DeadlockTag,
    /// Id of the [`NodeList`] currently holding this node.
    pub list: Option<u32>,
}

impl MonitorNode {
    /// Address shown as the owned lock: the guarded object, or the monitor
    /// itself for raw monitors.
    pub fn lock_address(&self) -> String {
        match &self.object {
            Ok(Some(object)) => format!("0x{:x}", object.0),
            Ok(None) => format!("0x{:x}", self.monitor.0),
            Err(e) => e.placeholder().to_string(),
        }
    }

    pub(crate) fn render_line(&self) -> String {
        format!(
            "thread: {} (owns lock @ {}) waiting for =>",
            self.owner_name,
            self.lock_address()
        )
    }
}

/// A chain of nodes, each waiting on the next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeList {
    pub id: u32,
    pub nodes: Vec<NodeId>,
    /// Node outside this list that the tail waits on (a convergence point or
    /// a loop entry).
    pub feeds_into: Option<NodeId>,
}

impl NodeList {
    pub fn head(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn tail(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// A closed chain repeats its entry node at the end.
    pub fn is_loop(&self) -> bool {
        self.nodes.len() > 1 && self.head() == self.tail()
    }

    pub fn tag(&self) -> DeadlockTag {
        if self.is_loop() {
            DeadlockTag::LoopDeadlock
        } else if self.feeds_into.is_some() {
            DeadlockTag::BranchDeadlock
        } else {
            DeadlockTag::NoDeadlock
        }
    }
}
