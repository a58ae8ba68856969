//! dtfj-deadlock
//!
//! Monitor wait-for graph over one snapshot.
//!
//! - One node per monitor; a node waits on monitor M when its owner thread
//!   is queued to enter M.
//! - Chains of waiting nodes are grouped into lists. A list that closes on
//!   itself is a deadlock loop; a list that runs into another chain is a
//!   branch; anything else does not deadlock.
//! - Unreadable owner or name data renders as a placeholder and never stops
//!   classification.
//!
//! Pure deterministic logic over an in-memory snapshot.

mod graph;
mod report;
mod state;
mod types;

pub use graph::MonitorGraph;
pub use report::{
    analyze, AnalysisOptions, BlockedThread, DeadlockChain, DeadlockReport, MonitorTag,
};
pub use state::{monitor_states, MonitorState, MonitorStatus};
pub use types::*;
