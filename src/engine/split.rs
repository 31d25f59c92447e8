//! Unmerging masters and structural subdivision.

use crate::grid::{self, Footprint};
use crate::resolver;
use crate::types::{CellStyle, LegacySpan, TableCell, TableElement};

/// What [`split_cell`] did, or what it still needs from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitOutcome {
    /// The cell was a merged master; its footprint was restored to
    /// ordinary cells.
    Unmerged,
    /// The cell carries no merge; the caller should collect
    /// `(split_rows, split_cols)` parameters and call [`subdivide`].
    NeedsSubdivision,
    /// Out of range, a slave, or nothing to do.
    NoOp,
}

/// Subdivision used when the caller confirms without picking parameters:
/// split into two rows.
pub const DEFAULT_SPLIT: (u32, u32) = (2, 1);

/// Split the cell at a flat index.
///
/// A merged master is unmerged (the exact inverse of a rectangular merge).
/// When only the legacy span array shows the merge, the unmerge happens
/// directly on the legacy arrays and the canonical array is invalidated so
/// the next read rebuilds it. A plain cell reports
/// [`SplitOutcome::NeedsSubdivision`] instead of mutating anything.
pub fn split_cell(element: &mut TableElement, flat: usize) -> SplitOutcome {
    if flat >= element.cell_count() {
        return SplitOutcome::NoOp;
    }

    if element.cells_v2.is_some() {
        let mut cells = resolver::to_canonical(element);
        let Some(cell) = cells.get(flat) else {
            return SplitOutcome::NoOp;
        };
        if cell.is_master() && cell.has_span() {
            unmerge_canonical(&mut cells, flat, element.cols);
            resolver::sync_encodings(element, cells);
            return SplitOutcome::Unmerged;
        }
        if cell.is_merged {
            // Slaves are never independently split.
            return SplitOutcome::NoOp;
        }
        return SplitOutcome::NeedsSubdivision;
    }

    // Canonical array absent: the legacy arrays are authoritative.
    let span = element.legacy_spans.get(flat).copied().unwrap_or_default();
    if span.is_slave() {
        return SplitOutcome::NoOp;
    }
    if span.row_span > 1 || span.col_span > 1 {
        unmerge_legacy(element, flat, span);
        resolver::invalidate_canonical(element);
        return SplitOutcome::Unmerged;
    }
    SplitOutcome::NeedsSubdivision
}

fn unmerge_canonical(cells: &mut [TableCell], flat: usize, cols: u32) {
    let (row, col) = grid::flat_to_row_col(flat, cols);
    let (row_span, col_span) = match cells.get(flat) {
        Some(c) => (c.row_span.max(1), c.col_span.max(1)),
        None => return,
    };
    for r in row..row + row_span {
        for c in col..col + col_span {
            let f = grid::row_col_to_flat(r, c, cols);
            let Some(cell) = cells.get_mut(f) else {
                continue;
            };
            if f == flat {
                // The master keeps its content, loses its span.
                cell.row_span = 1;
                cell.col_span = 1;
                cell.is_merged = false;
            } else {
                *cell = TableCell::blank();
            }
        }
    }
}

fn unmerge_legacy(element: &mut TableElement, flat: usize, span: LegacySpan) {
    let cols = element.cols;
    let count = element.cell_count();
    if element.legacy_spans.len() < count {
        element.legacy_spans.resize(count, LegacySpan::SINGLE);
    }
    if element.legacy_content.len() < count {
        element.legacy_content.resize(count, String::new());
    }

    let (row, col) = grid::flat_to_row_col(flat, cols);
    for r in row..row + span.row_span.max(1) {
        for c in col..col + span.col_span.max(1) {
            let f = grid::row_col_to_flat(r, c, cols);
            if let Some(slot) = element.legacy_spans.get_mut(f) {
                *slot = LegacySpan::SINGLE;
            }
            if f != flat {
                if let Some(slot) = element.legacy_content.get_mut(f) {
                    slot.clear();
                }
            }
        }
    }
}

/// Structurally subdivide a plain cell into `split_rows x split_cols`.
///
/// The target explodes into independent blank cells; a neighbouring master
/// whose footprint crosses the widened area has its span extended exactly
/// once instead of being duplicated. The split tracks are exact fractions
/// of the original track, so the percentage sums are preserved.
///
/// `subdivide(el, flat, 1, 1)` is the identity. Out-of-range indices,
/// slaves, and spanning masters are defensive no-ops (the latter go
/// through [`split_cell`]'s unmerge first).
pub fn subdivide(
    element: &mut TableElement,
    flat: usize,
    split_rows: u32,
    split_cols: u32,
) -> bool {
    if flat >= element.cell_count() {
        return false;
    }
    let split_rows = split_rows.max(1);
    let split_cols = split_cols.max(1);
    if split_rows == 1 && split_cols == 1 {
        return false;
    }

    let (target_row, target_col) = grid::flat_to_row_col(flat, element.cols);
    let mut cells = resolver::to_canonical(element);
    match cells.get(flat) {
        Some(cell) if cell.is_master() && !cell.has_span() => {}
        _ => return false,
    }

    if split_cols > 1 {
        grow_columns(element, &mut cells, target_row, target_col, split_cols);
    }
    if split_rows > 1 {
        grow_rows(
            element,
            &mut cells,
            target_row,
            target_col,
            split_rows,
            split_cols,
        );
    }
    resolver::sync_encodings(element, cells);
    true
}

/// Insert `split_cols - 1` columns at the target, exploding the target into
/// blank fragments and widening every master that straddles the column.
fn grow_columns(
    element: &mut TableElement,
    cells: &mut Vec<TableCell>,
    target_row: u32,
    target_col: u32,
    split_cols: u32,
) {
    let rows = element.rows;
    let cols = element.cols;
    let delta = split_cols - 1;

    // The old track becomes split_cols equal fragments.
    let old_width = element
        .col_widths
        .get(target_col as usize)
        .copied()
        .unwrap_or(0.0);
    let fragment = old_width / f64::from(split_cols);
    if let Some(slot) = element.col_widths.get_mut(target_col as usize) {
        *slot = fragment;
    }
    for _ in 0..delta {
        element.col_widths.insert(target_col as usize + 1, fragment);
    }

    // Extend masters whose footprint crosses the split column. The target
    // itself explodes instead.
    for (f, cell) in cells.iter_mut().enumerate() {
        if cell.is_merged {
            continue;
        }
        let (r, c) = grid::flat_to_row_col(f, cols);
        if r == target_row && c == target_col {
            continue;
        }
        let fp = Footprint {
            row: r,
            col: c,
            row_span: cell.row_span.max(1),
            col_span: cell.col_span.max(1),
        };
        if fp.contains_col(target_col) {
            cell.col_span += delta;
        }
    }

    // Rebuild every row with the new column count.
    let new_cols = cols + delta;
    let mut next = Vec::with_capacity(rows as usize * new_cols as usize);
    for r in 0..rows {
        for c in 0..cols {
            let f = grid::row_col_to_flat(r, c, cols);
            let exploding = r == target_row && c == target_col;
            let cell = cells.get(f).cloned().unwrap_or_default();
            next.push(if exploding { TableCell::blank() } else { cell });
            if c == target_col {
                for _ in 0..delta {
                    next.push(if r == target_row {
                        TableCell::blank()
                    } else {
                        TableCell::slave()
                    });
                }
            }
        }
    }
    *cells = next;

    if !element.cell_styles.is_empty() {
        let mut styles = Vec::with_capacity(rows as usize * new_cols as usize);
        for r in 0..rows {
            for c in 0..cols {
                let f = grid::row_col_to_flat(r, c, cols);
                styles.push(element.cell_styles.get(f).cloned().unwrap_or_default());
                if c == target_col {
                    for _ in 0..delta {
                        styles.push(CellStyle::default());
                    }
                }
            }
        }
        element.cell_styles = styles;
    }

    element.cols = new_cols;
}

/// Insert `split_rows - 1` rows after the target row. Over the target
/// footprint's columns the new rows are independent blank cells; every
/// other column continues whatever master crosses the row.
fn grow_rows(
    element: &mut TableElement,
    cells: &mut Vec<TableCell>,
    target_row: u32,
    target_col: u32,
    split_rows: u32,
    split_cols: u32,
) {
    let rows = element.rows;
    let cols = element.cols; // already widened by column growth
    let delta = split_rows - 1;
    let frag_end = target_col + split_cols; // exclusive

    let old_height = element
        .row_heights
        .get(target_row as usize)
        .copied()
        .unwrap_or(0.0);
    let fragment = old_height / f64::from(split_rows);
    if let Some(slot) = element.row_heights.get_mut(target_row as usize) {
        *slot = fragment;
    }
    for _ in 0..delta {
        element.row_heights.insert(target_row as usize + 1, fragment);
    }

    // Extend masters whose row footprint crosses the target row, except
    // the exploding fragment cells themselves.
    for (f, cell) in cells.iter_mut().enumerate() {
        if cell.is_merged {
            continue;
        }
        let (r, c) = grid::flat_to_row_col(f, cols);
        if r == target_row && c >= target_col && c < frag_end {
            continue;
        }
        let fp = Footprint {
            row: r,
            col: c,
            row_span: cell.row_span.max(1),
            col_span: cell.col_span.max(1),
        };
        if fp.contains_row(target_row) {
            cell.row_span += delta;
        }
    }

    // Rebuild with the new rows inserted after the target row.
    let new_rows = rows + delta;
    let mut next = Vec::with_capacity(new_rows as usize * cols as usize);
    for r in 0..rows {
        for c in 0..cols {
            let f = grid::row_col_to_flat(r, c, cols);
            let exploding = r == target_row && c >= target_col && c < frag_end;
            let cell = cells.get(f).cloned().unwrap_or_default();
            next.push(if exploding { TableCell::blank() } else { cell });
        }
        if r == target_row {
            for _ in 0..delta {
                for c in 0..cols {
                    next.push(if c >= target_col && c < frag_end {
                        TableCell::blank()
                    } else {
                        TableCell::slave()
                    });
                }
            }
        }
    }
    *cells = next;

    if !element.cell_styles.is_empty() {
        let mut styles = Vec::with_capacity(new_rows as usize * cols as usize);
        for r in 0..rows {
            for c in 0..cols {
                let f = grid::row_col_to_flat(r, c, cols);
                styles.push(element.cell_styles.get(f).cloned().unwrap_or_default());
            }
            if r == target_row {
                for _ in 0..delta {
                    for _ in 0..cols {
                        styles.push(CellStyle::default());
                    }
                }
            }
        }
        element.cell_styles = styles;
    }

    element.rows = new_rows;
}
