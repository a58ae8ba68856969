use dtfj_model::ProviderKind;
use serde::Serialize;
use std::fmt;

use crate::{CompareStats, Mismatch};

/// Result of one comparison case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CaseOutcome {
    Passed,
    Failed { mismatch: Mismatch },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CaseResult {
    /// e.g. `JavaClass class@0x7f00`.
    pub name: String,
    #[serde(flatten)]
    pub outcome: CaseOutcome,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        self.outcome == CaseOutcome::Passed
    }

    pub fn mismatch(&self) -> Option<&Mismatch> {
        match &self.outcome {
            CaseOutcome::Passed => None,
            CaseOutcome::Failed { mismatch } => Some(mismatch),
        }
    }
}

/// Full report of a suite run. Cases are in deterministic order: image
/// cases, runtime, then per-entity cases sorted by id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompareReport {
    pub ddr_provider: ProviderKind,
    pub reference_provider: ProviderKind,
    pub cases: Vec<CaseResult>,
    pub stats: CompareStats,
}

impl CompareReport {
    pub fn is_clean(&self) -> bool {
        self.cases.iter().all(CaseResult::passed)
    }

    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.cases.iter().filter(|c| !c.passed())
    }
}

impl fmt::Display for CompareReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "compare {} against {}: {} cases, {} passed, {} failed",
            self.ddr_provider,
            self.reference_provider,
            self.cases.len(),
            self.passed(),
            self.failed()
        )?;
        for case in self.failures() {
            if let Some(m) = case.mismatch() {
                writeln!(f, "FAIL {}: {m}", case.name)?;
            }
        }
        write!(
            f,
            "members checked: {}, same-kind failures: {}, identity-only visits: {}, cold carve-outs: {}",
            self.stats.members_checked,
            self.stats.same_failures,
            self.stats.shallow_visits,
            self.stats.carve_outs
        )
    }
}
