use dtfj_deadlock::{analyze, AnalysisOptions, DeadlockTag, MonitorStatus};
use dtfj_model::ProviderKind;
use dtfj_testkit::{graph_monitor, graph_thread, wait_for_graph};

#[test]
fn closed_cycles_of_any_length_are_loops() {
    for n in 2..=5u64 {
        let edges: Vec<(u64, u64)> = (1..=n).map(|i| (i, i % n + 1)).collect();
        let report = analyze(
            &wait_for_graph(ProviderKind::Ddr, &edges),
            &AnalysisOptions::default(),
        );
        assert_eq!(report.loops.len(), 1, "cycle of {n}");
        assert!(report.branches.is_empty());
        for i in 1..=n {
            assert_eq!(report.tag(graph_monitor(i)), Some(DeadlockTag::LoopDeadlock));
        }
        // The entry repeats at the end.
        assert_eq!(report.loops[0].monitors.len() as u64, n + 1);
        assert_eq!(report.loops[0].monitors.first(), report.loops[0].monitors.last());
    }
}

#[test]
fn three_cycle_report_text() {
    let report = analyze(
        &wait_for_graph(ProviderKind::Ddr, &[(1, 2), (2, 3), (3, 1)]),
        &AnalysisOptions::default(),
    );
    assert!(report.has_deadlock());
    let text = report.to_string();
    assert!(text.starts_with(
        "Deadlock loop:\n\
         thread: T1 (owns lock @ 0x110) waiting for =>\n\
         thread: T2 (owns lock @ 0x210) waiting for =>\n\
         thread: T3 (owns lock @ 0x310) waiting for =>\n\
         thread: T1 (owns lock @ 0x110)"
    ));
    assert!(text.contains("T2 (thread@0x2): waiting to enter monitor@0x300"));
}

#[test]
fn every_loop_thread_is_waiting_to_enter() {
    let report = analyze(
        &wait_for_graph(ProviderKind::Jextract, &[(1, 2), (2, 1)]),
        &AnalysisOptions::default(),
    );
    assert_eq!(report.blocked.len(), 2);
    assert!(report
        .blocked
        .iter()
        .all(|b| b.status == MonitorStatus::WaitingToEnter));
    assert_eq!(report.blocked[0].thread, graph_thread(1));
    assert_eq!(report.blocked[0].monitor, graph_monitor(2));
}

#[test]
fn two_independent_loops_are_reported_separately() {
    let report = analyze(
        &wait_for_graph(ProviderKind::Ddr, &[(1, 2), (2, 1), (3, 4), (4, 3)]),
        &AnalysisOptions::default(),
    );
    assert_eq!(report.loops.len(), 2);
    assert_eq!(report.to_string().matches("Deadlock loop:").count(), 2);
}
