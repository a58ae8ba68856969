//! dtfj-compare
//!
//! Cross-provider comparison of DTFJ snapshots. The DDR snapshot is the side
//! under test; the reference snapshot (usually jextract) is the baseline.
//!
//! - Field pairs follow one failure policy: equal values pass, equal failure
//!   kinds pass, anything else is a [`Mismatch`].
//! - Each entity type has a [`Comparator`] with a member bitmask; default
//!   masks leave out members the reference is known to get wrong.
//! - Collections are materialized, size-checked and paired after sorting.
//! - Back-references are cut by a visited set; re-entered entities compare
//!   identity members only.
//!
//! Deterministic, single-threaded, no IO.

mod comparator;
pub mod comparators;
mod context;
mod field;
mod mismatch;
mod options;
pub mod reconcile;
mod report;
mod suite;

pub use comparator::{
    catalog_entry, compare_optional, delegate, delegate_access, member_name, Comparator,
    MemberCatalog, MemberCheck,
};
pub use context::{CompareContext, CompareStats, VisitKey};
pub use field::{check_value, pair_access};
pub use mismatch::{Mismatch, Side};
pub use options::{
    CompareOptions, MaskOverride, OptionsError, DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT,
};
pub use report::{CaseOutcome, CaseResult, CompareReport};
pub use suite::run_suite;

use comparators::*;

/// Member catalog of every comparator, in a stable order.
pub fn catalog() -> Vec<MemberCatalog> {
    vec![
        catalog_entry::<ImagePointerComparator>(),
        catalog_entry::<ImageSectionComparator>(),
        catalog_entry::<ImageAddressSpaceComparator>(),
        catalog_entry::<ImageProcessComparator>(),
        catalog_entry::<ImageThreadComparator>(),
        catalog_entry::<ImageStackFrameComparator>(),
        catalog_entry::<JavaRuntimeComparator>(),
        catalog_entry::<JavaHeapComparator>(),
        catalog_entry::<JavaClassComparator>(),
        catalog_entry::<JavaFieldComparator>(),
        catalog_entry::<JavaMethodComparator>(),
        catalog_entry::<JavaObjectComparator>(),
        catalog_entry::<JavaReferenceComparator>(),
        catalog_entry::<JavaThreadComparator>(),
        catalog_entry::<JavaStackFrameComparator>(),
        catalog_entry::<JavaLocationComparator>(),
        catalog_entry::<JavaMonitorComparator>(),
    ]
}

/// Catalog entry for one entity name.
pub fn catalog_for(entity: &str) -> Option<MemberCatalog> {
    catalog().into_iter().find(|e| e.entity == entity)
}
