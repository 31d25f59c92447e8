//! Collapsing a selection into one master cell.

use std::collections::BTreeMap;

use crate::grid;
use crate::resolver;
use crate::types::{TableCell, TableElement};

/// Merge the selected cells into one master.
///
/// Indices are flat row-major positions; stale (out-of-range) entries are
/// ignored. With fewer than two usable indices, or when no branch applies,
/// the element is left untouched and `false` is returned.
///
/// Two branches:
/// - a selection confined to one row merges only when its columns form a
///   contiguous run, collapsing into a single column-spanning master;
/// - a selection spanning two or more distinct rows collapses into its
///   bounding box, anchored at the top-left coordinate.
pub fn merge_selection(element: &mut TableElement, selected: &[usize]) -> bool {
    if selected.len() < 2 {
        return false;
    }

    let cols = element.cols;
    let count = element.cell_count();
    let mut by_row: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    for &flat in selected {
        if flat >= count {
            continue;
        }
        let (row, col) = grid::flat_to_row_col(flat, cols);
        by_row.entry(row).or_default().push(col);
    }
    for run in by_row.values_mut() {
        run.sort_unstable();
        run.dedup();
    }

    let total: usize = by_row.values().map(Vec::len).sum();
    if total < 2 {
        return false;
    }

    if by_row.len() == 1 {
        // Same-row merge: only a contiguous run of columns qualifies.
        let Some((&row, run)) = by_row.iter().next() else {
            return false;
        };
        if run.len() < 2 || !is_contiguous(run) {
            return false;
        }
        let Some(&first) = run.first() else {
            return false;
        };
        let Some(&last) = run.last() else {
            return false;
        };
        return apply_box(element, row, first, row, last);
    }

    // Bounding box over every selected coordinate.
    let Some(&min_row) = by_row.keys().next() else {
        return false;
    };
    let Some(&max_row) = by_row.keys().next_back() else {
        return false;
    };
    let min_col = by_row
        .values()
        .filter_map(|run| run.first().copied())
        .min()
        .unwrap_or(0);
    let max_col = by_row
        .values()
        .filter_map(|run| run.last().copied())
        .max()
        .unwrap_or(0);
    apply_box(element, min_row, min_col, max_row, max_col)
}

fn is_contiguous(run: &[u32]) -> bool {
    run.windows(2)
        .all(|pair| matches!(pair, [a, b] if b.wrapping_sub(*a) == 1))
}

/// Turn the box into one footprint: the top-left cell becomes the master
/// (keeping its content), everything else inside becomes a slave. The grid
/// is re-tiled afterwards so footprints the box swallowed partially cannot
/// leave orphaned slaves behind.
fn apply_box(
    element: &mut TableElement,
    min_row: u32,
    min_col: u32,
    max_row: u32,
    max_col: u32,
) -> bool {
    let cols = element.cols;
    let mut cells = resolver::to_canonical(element);
    let before = cells.clone();

    let anchor = grid::row_col_to_flat(min_row, min_col, cols);
    match cells.get_mut(anchor) {
        Some(master) => {
            master.row_span = max_row - min_row + 1;
            master.col_span = max_col - min_col + 1;
            master.is_merged = false;
        }
        None => return false,
    }
    for r in min_row..=max_row {
        for c in min_col..=max_col {
            if r == min_row && c == min_col {
                continue;
            }
            if let Some(slot) = cells.get_mut(grid::row_col_to_flat(r, c, cols)) {
                *slot = TableCell::slave();
            }
        }
    }

    resolver::retile(&mut cells, element.rows, element.cols);
    if cells == before {
        return false;
    }
    resolver::sync_encodings(element, cells);
    true
}
