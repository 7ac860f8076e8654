//! Per-field selection and flag editing
//!
//! All operations act on the caller's visible window, a contiguous slice
//! of the buffer. Hit-testing reads the per-fix pixel positions the
//! renderer cached; the editor never computes screen coordinates itself.

use crate::core::{FieldKind, Fix};
use crate::error::{NavError, NavResult};

/// Locate the fix nearest the pointer in a field's plot and toggle its
/// selection. Returns the window-relative index of the fix, or `None`
/// when no fix in the window has a cached pixel position.
pub fn pick(fixes: &mut [Fix], field: FieldKind, x: i32, y: i32) -> Option<usize> {
    let slot = field.index();
    let nearest = fixes
        .iter()
        .enumerate()
        .filter_map(|(i, fix)| fix.pixel[slot].map(|p| (i, p.distance_squared(x, y))))
        .min_by_key(|&(_, d)| d)
        .map(|(i, _)| i)?;

    fixes[nearest].selected.toggle(field);
    Some(nearest)
}

/// Select (or deselect) every fix within `radius` pixels of the pointer.
/// Returns the number of fixes whose state changed.
pub fn select_radius(
    fixes: &mut [Fix],
    field: FieldKind,
    x: i32,
    y: i32,
    radius: i32,
    select: bool,
) -> usize {
    let slot = field.index();
    let radius_sq = (radius as i64) * (radius as i64);
    let mut changed = 0;
    for fix in fixes.iter_mut() {
        let hit = fix.pixel[slot]
            .map(|p| p.distance_squared(x, y) <= radius_sq)
            .unwrap_or(false);
        if hit && fix.selected.get(field) != select {
            fix.selected.set(field, select);
            changed += 1;
        }
    }
    changed
}

/// Select every fix in the window for a field
pub fn select_all(fixes: &mut [Fix], field: FieldKind) -> usize {
    let mut changed = 0;
    for fix in fixes.iter_mut() {
        if !fix.selected.get(field) {
            fix.selected.set(field, true);
            changed += 1;
        }
    }
    changed
}

/// Deselect every fix in the window for a field
pub fn deselect_all(fixes: &mut [Fix], field: FieldKind) -> usize {
    let mut changed = 0;
    for fix in fixes.iter_mut() {
        if fix.selected.get(field) {
            fix.selected.set(field, false);
            changed += 1;
        }
    }
    changed
}

/// Clear selections on every field except the newly active one. Keeps the
/// invariant that at most one field has live selections, so an edit aimed
/// at one plot can never land on another.
pub fn clear_other_fields(fixes: &mut [Fix], keep: FieldKind) {
    for fix in fixes.iter_mut() {
        fix.selected.clear_except(keep);
    }
}

/// Window-relative indices of the fixes selected for a field
pub fn selected_indices(fixes: &[Fix], field: FieldKind) -> Vec<usize> {
    fixes
        .iter()
        .enumerate()
        .filter(|(_, fix)| fix.selected.get(field))
        .map(|(i, _)| i)
        .collect()
}

/// Set or clear the exclude-from-inversion flag on the fix nearest the
/// pointer. Flagging is distinct from selection and only positions carry
/// it.
pub fn set_flag_at(
    fixes: &mut [Fix],
    field: FieldKind,
    x: i32,
    y: i32,
    flagged: bool,
) -> NavResult<Option<usize>> {
    if !field.supports_flagging() {
        return Err(NavError::UnsupportedField {
            field,
            operation: "flagging".to_string(),
        });
    }
    let slot = field.index();
    let nearest = fixes
        .iter()
        .enumerate()
        .filter_map(|(i, fix)| fix.pixel[slot].map(|p| (i, p.distance_squared(x, y))))
        .min_by_key(|&(_, d)| d)
        .map(|(i, _)| i);

    if let Some(i) = nearest {
        fixes[i].flagged = flagged;
    }
    Ok(nearest)
}

/// Add a constant offset to each selected fix's value for a field.
/// Returns the number of fixes changed.
pub fn offset_selected(fixes: &mut [Fix], field: FieldKind, delta: f64) -> usize {
    let mut changed = 0;
    for fix in fixes.iter_mut() {
        if fix.selected.get(field) {
            let value = fix.value(field);
            fix.set_value(field, value + delta);
            changed += 1;
        }
    }
    changed
}

/// Restore each selected fix's field to its load-time snapshot
pub fn revert_selected(fixes: &mut [Fix], field: FieldKind) -> usize {
    let mut changed = 0;
    for fix in fixes.iter_mut() {
        if fix.selected.get(field) {
            fix.revert(field);
            changed += 1;
        }
    }
    changed
}
