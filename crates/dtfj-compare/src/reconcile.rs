//! Iterator reconciliation.
//!
//! Two providers may enumerate the same logical collection in different
//! orders. Both sides are drained first, the sizes must agree, then the
//! elements are paired (after an optional sort) and compared one by one.

use dtfj_model::{ImageSection, ProviderKind};
use std::cmp::Ordering;
use tracing::{debug, warn};

use crate::comparators::ImageSectionComparator;
use crate::{delegate, CompareContext, Mismatch};

/// Name fragment of JIT split bodies that the jextract reader never reports.
pub const COLD_SECTION_MARKER: &str = "cold";

/// Compares two enumerations element by element in the order given.
pub fn reconcile_in_order<'a, T: 'a>(
    cx: &mut CompareContext<'_>,
    ddr: impl IntoIterator<Item = &'a T>,
    reference: impl IntoIterator<Item = &'a T>,
    each: impl FnMut(&mut CompareContext<'_>, &T, &T) -> Result<(), Mismatch>,
) -> Result<(), Mismatch> {
    let d: Vec<&T> = ddr.into_iter().collect();
    let r: Vec<&T> = reference.into_iter().collect();
    pair_up(cx, d, r, each)
}

/// Sorts both enumerations by `order` before pairing.
pub fn reconcile_sorted<'a, T: 'a>(
    cx: &mut CompareContext<'_>,
    ddr: impl IntoIterator<Item = &'a T>,
    reference: impl IntoIterator<Item = &'a T>,
    order: impl Fn(&T, &T) -> Ordering,
    each: impl FnMut(&mut CompareContext<'_>, &T, &T) -> Result<(), Mismatch>,
) -> Result<(), Mismatch> {
    let mut d: Vec<&T> = ddr.into_iter().collect();
    let mut r: Vec<&T> = reference.into_iter().collect();
    d.sort_by(|a, b| order(*a, *b));
    r.sort_by(|a, b| order(*a, *b));
    pair_up(cx, d, r, each)
}

fn pair_up<T>(
    cx: &mut CompareContext<'_>,
    ddr: Vec<&T>,
    reference: Vec<&T>,
    mut each: impl FnMut(&mut CompareContext<'_>, &T, &T) -> Result<(), Mismatch>,
) -> Result<(), Mismatch> {
    if ddr.len() != reference.len() {
        let m = Mismatch::Cardinality {
            path: cx.path(),
            ddr: ddr.len(),
            reference: reference.len(),
        };
        warn!(%m, "enumeration sizes differ");
        return Err(m);
    }
    for (i, (d, r)) in ddr.into_iter().zip(reference).enumerate() {
        cx.scoped(format!("[{i}]"), |cx| each(cx, d, r))?;
    }
    Ok(())
}

/// Total order of sections by base address, then name.
pub fn section_order(a: &ImageSection, b: &ImageSection) -> Ordering {
    a.base
        .sort_key()
        .cmp(&b.base.sort_key())
        .then_with(|| a.name.as_ref().ok().cmp(&b.name.as_ref().ok()))
}

/// Section lists compared by base address.
pub fn compare_sections(
    cx: &mut CompareContext<'_>,
    ddr: &[ImageSection],
    reference: &[ImageSection],
) -> Result<(), Mismatch> {
    reconcile_sorted(cx, ddr, reference, section_order, delegate::<ImageSectionComparator>)
}

/// Compiled code sections of a method.
///
/// The jextract reader does not report cold split bodies. Against a jextract
/// reference, when the counts differ, DDR sections named `*cold*` are dropped
/// before reconciling. No other reconciliation tolerates a size difference.
pub fn compare_compiled_sections(
    cx: &mut CompareContext<'_>,
    ddr: &[ImageSection],
    reference: &[ImageSection],
) -> Result<(), Mismatch> {
    if ddr.len() != reference.len() && cx.reference().snapshot().provider == ProviderKind::Jextract {
        let kept: Vec<&ImageSection> = ddr
            .iter()
            .filter(|s| !s.name_contains(COLD_SECTION_MARKER))
            .collect();
        if kept.len() != ddr.len() {
            debug!(
                path = %cx.path(),
                dropped = ddr.len() - kept.len(),
                "ignoring cold compiled sections missing from jextract"
            );
            cx.note_carve_out();
            return reconcile_sorted(
                cx,
                kept,
                reference,
                section_order,
                delegate::<ImageSectionComparator>,
            );
        }
    }
    compare_sections(cx, ddr, reference)
}
