use dtfj_model::{Access, JavaMonitor, MonitorId, Snapshot, ThreadId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorStatus {
    WaitingToEnter,
    WaitingToBeNotifiedOn,
}

impl MonitorStatus {
    fn waiters(self, monitor: &JavaMonitor) -> &Access<Vec<ThreadId>> {
        match self {
            Self::WaitingToEnter => &monitor.enter_waiters,
            Self::WaitingToBeNotifiedOn => &monitor.notify_waiters,
        }
    }
}

impl fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaitingToEnter => write!(f, "waiting to enter"),
            Self::WaitingToBeNotifiedOn => write!(f, "waiting to be notified on"),
        }
    }
}

/// Why one thread is blocked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MonitorState {
    pub monitor: MonitorId,
    pub status: MonitorStatus,
}

/// Blocked threads keyed by thread id. A thread listed on more than one
/// monitor keeps the first in monitor id order; enter waits are recorded
/// before notify waits.
pub fn monitor_states(snapshot: &Snapshot) -> BTreeMap<ThreadId, MonitorState> {
    let mut monitors: Vec<_> = snapshot.monitors.iter().collect();
    monitors.sort_by_key(|m| m.id);

    let mut states: BTreeMap<ThreadId, MonitorState> = BTreeMap::new();
    for status in [MonitorStatus::WaitingToEnter, MonitorStatus::WaitingToBeNotifiedOn] {
        for m in &monitors {
            let Ok(waiters) = status.waiters(m) else {
                continue;
            };
            for &thread in waiters {
                if let Some(prev) = states.get(&thread) {
                    warn!(%thread, first = %prev.monitor, ignored = %m.id, "thread blocked on two monitors");
                    continue;
                }
                states.insert(thread, MonitorState { monitor: m.id, status });
            }
        }
    }
    states
}
