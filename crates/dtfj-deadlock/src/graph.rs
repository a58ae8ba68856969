//! Wait-for graph construction and classification.

use dtfj_model::{MonitorId, Snapshot, SnapshotIndex, ThreadId};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::{DeadlockTag, MonitorNode, NodeId, NodeList};

#[derive(Clone, Debug)]
pub struct MonitorGraph {
    nodes: Vec<MonitorNode>,
    index: BTreeMap<MonitorId, NodeId>,
    lists: BTreeMap<u32, NodeList>,
    next_list: u32,
    classified: bool,
}

impl MonitorGraph {
    /// One node per monitor, in monitor id order. A node waits on monitor M
    /// when its owner thread is queued in M's enter waiters; a thread owning
    /// several monitors makes each of them wait on M.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let threads = SnapshotIndex::new(snapshot);
        let mut monitors: Vec<_> = snapshot.monitors.iter().collect();
        monitors.sort_by_key(|m| m.id);

        let mut nodes = Vec::with_capacity(monitors.len());
        let mut index = BTreeMap::new();
        let mut owned: BTreeMap<ThreadId, Vec<NodeId>> = BTreeMap::new();

        for m in &monitors {
            let id = nodes.len();
            let owner_name = match &m.owner {
                Ok(Some(t)) => threads.thread_name(*t),
                Ok(None) => "<data unavailable>".to_string(),
                Err(e) => e.placeholder().to_string(),
            };
            if let Ok(Some(t)) = m.owner {
                owned.entry(t).or_default().push(id);
            }
            nodes.push(MonitorNode {
                monitor: m.id,
                owner: m.owner.clone(),
                object: m.object.clone(),
                owner_name,
                waiting_on: None,
                visit: 0,
                deadlock: DeadlockTag::Unknown,
                list: None,
            });
            index.insert(m.id, id);
        }

        for (target, m) in monitors.iter().enumerate() {
            let waiters = match &m.enter_waiters {
                Ok(w) => w,
                Err(e) => {
                    warn!(monitor = %m.id, error = %e, "enter waiters unreadable; edges skipped");
                    continue;
                }
            };
            for thread in waiters {
                for &node in owned.get(thread).map(Vec::as_slice).unwrap_or(&[]) {
                    let current = nodes[node].waiting_on;
                    match current {
                        None => nodes[node].waiting_on = Some(target),
                        Some(first) if first != target => warn!(
                            %thread,
                            first = %nodes[first].monitor,
                            ignored = %m.id,
                            "thread queued on two monitors; keeping the first"
                        ),
                        Some(_) => {}
                    }
                }
            }
        }

        Self {
            nodes,
            index,
            lists: BTreeMap::new(),
            next_list: 0,
            classified: false,
        }
    }

    pub fn nodes(&self) -> &[MonitorNode] {
        &self.nodes
    }

    pub fn node(&self, monitor: MonitorId) -> Option<&MonitorNode> {
        self.index.get(&monitor).map(|&id| &self.nodes[id])
    }

    pub fn tag(&self, monitor: MonitorId) -> Option<DeadlockTag> {
        self.node(monitor).map(|n| n.deadlock)
    }

    /// Lists in id order. Empty until [`MonitorGraph::classify`] runs.
    pub fn lists(&self) -> impl Iterator<Item = &NodeList> {
        self.lists.values()
    }

    /// Walks every chain once and tags every node. Calling it again is a
    /// no-op.
    pub fn classify(&mut self) {
        if self.classified {
            return;
        }
        let mut in_degree = vec![0usize; self.nodes.len()];
        for node in &self.nodes {
            if let Some(next) = node.waiting_on {
                in_degree[next] += 1;
            }
        }

        let mut pass = 0u32;
        for start in 0..self.nodes.len() {
            if self.nodes[start].visit != 0 {
                continue;
            }
            pass += 1;
            self.walk(start, pass, &in_degree);
        }

        for list in self.lists.values() {
            let tag = list.tag();
            for &id in &list.nodes {
                let node = &mut self.nodes[id];
                if node.deadlock == DeadlockTag::Unknown {
                    node.deadlock = tag;
                }
            }
        }
        self.classified = true;
        debug!(
            nodes = self.nodes.len(),
            lists = self.lists.len(),
            "wait-for graph classified"
        );
    }

    fn walk(&mut self, start: NodeId, pass: u32, in_degree: &[usize]) {
        let mut chain = Vec::new();
        let mut cur = start;
        loop {
            self.nodes[cur].visit = pass;
            chain.push(cur);
            let Some(next) = self.nodes[cur].waiting_on else {
                self.push_list(chain, None);
                return;
            };
            let seen = self.nodes[next].visit;
            match seen {
                0 => cur = next,
                v if v == pass => {
                    // Closed on this walk: the entry repeats at the end of
                    // the loop and the prefix becomes its own list.
                    if let Some(pos) = chain.iter().position(|&n| n == next) {
                        let mut cycle = chain.split_off(pos);
                        cycle.push(next);
                        self.push_list(cycle, None);
                        if !chain.is_empty() {
                            self.push_list(chain, Some(next));
                        }
                    } else {
                        self.push_list(chain, Some(next));
                    }
                    return;
                }
                _ => {
                    self.attach_or_split(chain, next, in_degree);
                    return;
                }
            }
        }
    }

    /// Joins a fresh chain onto a node reached by an earlier walk.
    fn attach_or_split(&mut self, chain: Vec<NodeId>, join: NodeId, in_degree: &[usize]) {
        let Some(target_id) = self.nodes[join].list else {
            self.push_list(chain, Some(join));
            return;
        };
        let Some(target) = self.lists.get(&target_id) else {
            self.push_list(chain, Some(join));
            return;
        };
        if target.is_loop() {
            self.push_list(chain, Some(join));
            return;
        }
        let Some(pos) = target.nodes.iter().position(|&n| n == join) else {
            self.push_list(chain, Some(join));
            return;
        };

        if pos == 0 {
            if in_degree[join] <= 1 {
                for &n in &chain {
                    self.nodes[n].list = Some(target_id);
                }
                if let Some(target) = self.lists.get_mut(&target_id) {
                    let tail = std::mem::replace(&mut target.nodes, chain);
                    target.nodes.extend(tail);
                }
            } else {
                self.push_list(chain, Some(join));
            }
            return;
        }

        // Converges mid-list: the target keeps its prefix and the remainder
        // moves to a fresh list.
        let (rest, feeds) = match self.lists.get_mut(&target_id) {
            Some(target) => {
                let rest = target.nodes.split_off(pos);
                let feeds = target.feeds_into.replace(join);
                (rest, feeds)
            }
            None => return,
        };
        self.push_list(rest, feeds);
        self.push_list(chain, Some(join));
    }

    fn push_list(&mut self, nodes: Vec<NodeId>, feeds_into: Option<NodeId>) -> u32 {
        let id = self.next_list;
        self.next_list += 1;
        for &n in &nodes {
            self.nodes[n].list = Some(id);
        }
        self.lists.insert(id, NodeList { id, nodes, feeds_into });
        id
    }

    /// Monitor ids of a list, followed by the node it feeds into.
    pub fn monitors_of(&self, list: &NodeList) -> Vec<MonitorId> {
        let mut ids: Vec<_> = list.nodes.iter().map(|&n| self.nodes[n].monitor).collect();
        if let Some(next) = list.feeds_into {
            ids.push(self.nodes[next].monitor);
        }
        ids
    }

    /// One `thread: <name> (owns lock @ 0x..) waiting for =>` line per
    /// node; a branch continues into the node it feeds. The last line has
    /// no trailing arrow.
    pub fn render(&self, list: &NodeList) -> String {
        let mut lines: Vec<String> = list
            .nodes
            .iter()
            .map(|&n| self.nodes[n].render_line())
            .collect();
        if let Some(next) = list.feeds_into {
            lines.push(self.nodes[next].render_line());
        }
        let text = lines.join("\n");
        match text.strip_suffix(" waiting for =>") {
            Some(trimmed) => trimmed.to_string(),
            None => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtfj_model::{DataError, ProviderKind};
    use dtfj_testkit::{graph_monitor, graph_thread, wait_for_graph};

    fn classified(edges: &[(u64, u64)]) -> MonitorGraph {
        let mut g = MonitorGraph::from_snapshot(&wait_for_graph(ProviderKind::Ddr, edges));
        g.classify();
        g
    }

    fn tag(g: &MonitorGraph, n: u64) -> Option<DeadlockTag> {
        g.tag(graph_monitor(n))
    }

    #[test]
    fn three_cycle_renders_back_to_its_entry() {
        let g = classified(&[(1, 2), (2, 3), (3, 1)]);
        let loops: Vec<_> = g.lists().filter(|l| l.is_loop()).collect();
        assert_eq!(loops.len(), 1);
        assert_eq!(
            g.render(loops[0]),
            "thread: T1 (owns lock @ 0x110) waiting for =>\n\
             thread: T2 (owns lock @ 0x210) waiting for =>\n\
             thread: T3 (owns lock @ 0x310) waiting for =>\n\
             thread: T1 (owns lock @ 0x110)"
        );
        for n in 1..=3 {
            assert_eq!(tag(&g, n), Some(DeadlockTag::LoopDeadlock));
        }
    }

    #[test]
    fn converging_chains_split_the_shared_tail() {
        let g = classified(&[(1, 3), (2, 3)]);
        assert_eq!(tag(&g, 1), Some(DeadlockTag::BranchDeadlock));
        assert_eq!(tag(&g, 2), Some(DeadlockTag::BranchDeadlock));
        assert_eq!(tag(&g, 3), Some(DeadlockTag::NoDeadlock));
        assert_eq!(g.lists().count(), 3);
    }

    #[test]
    fn chain_into_a_loop_is_a_branch() {
        // 4 -> 1 -> 2 -> 1
        let g = classified(&[(1, 2), (2, 1), (4, 1)]);
        assert_eq!(tag(&g, 1), Some(DeadlockTag::LoopDeadlock));
        assert_eq!(tag(&g, 2), Some(DeadlockTag::LoopDeadlock));
        assert_eq!(tag(&g, 4), Some(DeadlockTag::BranchDeadlock));

        let branch = g.lists().find(|l| !l.is_loop()).map(|l| g.render(l));
        assert_eq!(
            branch.as_deref(),
            Some(
                "thread: T4 (owns lock @ 0x410) waiting for =>\n\
                 thread: T1 (owns lock @ 0x110)"
            )
        );
    }

    #[test]
    fn tail_before_loop_entry_is_split_off() {
        // 1 -> 2 -> 3 -> 2, walked from 1.
        let g = classified(&[(1, 2), (2, 3), (3, 2)]);
        assert_eq!(tag(&g, 1), Some(DeadlockTag::BranchDeadlock));
        assert_eq!(tag(&g, 2), Some(DeadlockTag::LoopDeadlock));
        assert_eq!(tag(&g, 3), Some(DeadlockTag::LoopDeadlock));
    }

    #[test]
    fn later_chain_attaches_at_a_free_head() {
        // 1 -> 2 is walked first; 3 -> 1 then lands on the head of that list.
        let g = classified(&[(1, 2), (3, 1)]);
        assert_eq!(g.lists().count(), 1);
        let order = g.lists().next().map(|l| g.monitors_of(l));
        assert_eq!(
            order,
            Some(vec![graph_monitor(3), graph_monitor(1), graph_monitor(2)])
        );
        for n in 1..=3 {
            assert_eq!(tag(&g, n), Some(DeadlockTag::NoDeadlock));
        }
    }

    #[test]
    fn classify_is_idempotent() {
        let mut g = classified(&[(1, 2), (2, 1)]);
        let lists = g.lists().count();
        g.classify();
        assert_eq!(g.lists().count(), lists);
    }

    #[test]
    fn unreadable_owner_renders_placeholder() {
        let mut snap = wait_for_graph(ProviderKind::Ddr, &[(1, 2), (2, 1)]);
        if let Some(t) = snap.threads.iter_mut().find(|t| t.id == graph_thread(2)) {
            t.name = Err(DataError::corrupt("bad name"));
        }
        let mut g = MonitorGraph::from_snapshot(&snap);
        g.classify();
        let text = g.lists().find(|l| l.is_loop()).map(|l| g.render(l));
        assert!(text.is_some_and(|t| t.contains("thread: <corrupt data> (owns lock @ 0x210)")));
        assert_eq!(tag(&g, 2), Some(DeadlockTag::LoopDeadlock));
    }
}
