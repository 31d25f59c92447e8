//! Conversion between the canonical cell array and the legacy encodings.
//!
//! Old documents carry cell data as parallel `legacyContent`/`legacySpans`
//! arrays (slave sentinel `{0,0}`), sometimes with the jagged per-row form
//! on top. `migrate` runs once on load and resolves everything into the
//! canonical array; after that the engines operate on the canonical form
//! only and re-derive the legacy arrays on every write.

use crate::grid;
use crate::types::{CellStyle, LegacySpan, RowSegment, TableCell, TableElement};

/// Width tolerance (percent) when aligning jagged segment widths onto the
/// uniform column tracks.
const SEGMENT_EPSILON: f64 = 0.5;

/// The canonical cell array for an element.
///
/// Returns the stored canonical array when present, padded with blank cells
/// up to `rows * cols`; otherwise synthesizes one from the legacy arrays.
/// Malformed span entries (a zero in one dimension only) normalize to an
/// ordinary unspanned cell.
#[must_use]
pub fn to_canonical(element: &TableElement) -> Vec<TableCell> {
    let count = element.cell_count();
    let mut cells = match &element.cells_v2 {
        Some(existing) => existing.clone(),
        None => synthesize_from_legacy(element),
    };
    cells.truncate(count);
    cells.resize(count, TableCell::blank());
    cells
}

fn synthesize_from_legacy(element: &TableElement) -> Vec<TableCell> {
    (0..element.cell_count())
        .map(|flat| {
            let span = element.legacy_spans.get(flat).copied().unwrap_or_default();
            if span.is_slave() {
                return TableCell::slave();
            }
            let content = element
                .legacy_content
                .get(flat)
                .cloned()
                .unwrap_or_default();
            // A zero in one dimension only is malformed, not a slave
            // sentinel; it normalizes to an ordinary unspanned cell.
            let (row_span, col_span) = if span.row_span == 0 || span.col_span == 0 {
                (1, 1)
            } else {
                (span.row_span, span.col_span)
            };
            TableCell {
                content,
                row_span,
                col_span,
                is_merged: false,
            }
        })
        .collect()
}

/// The inverse mapping: canonical array to legacy parallel arrays.
///
/// Always computed as a pair so the two legacy arrays cannot drift.
#[must_use]
pub fn from_canonical(cells: &[TableCell]) -> (Vec<String>, Vec<LegacySpan>) {
    let content = cells.iter().map(|c| c.content.clone()).collect();
    let spans = cells
        .iter()
        .map(|c| {
            if c.is_merged {
                LegacySpan::SLAVE
            } else {
                LegacySpan {
                    row_span: c.row_span.max(1),
                    col_span: c.col_span.max(1),
                }
            }
        })
        .collect();
    (content, spans)
}

/// Install `cells` as the canonical array and rebuild both legacy arrays
/// from it. Every mutation ends here, which is what keeps the encodings
/// in sync.
pub fn sync_encodings(element: &mut TableElement, cells: Vec<TableCell>) {
    let (content, spans) = from_canonical(&cells);
    element.legacy_content = content;
    element.legacy_spans = spans;
    element.cells_v2 = Some(cells);
}

/// Drop the canonical array so the next read re-derives it from the legacy
/// arrays.
pub fn invalidate_canonical(element: &mut TableElement) {
    element.cells_v2 = None;
}

/// One-time load migration: resolve the jagged row-local form, normalize
/// the track arrays, repair the tiling invariant, and fill both encodings.
pub fn migrate(element: &mut TableElement) {
    element.rows = element.rows.max(1);
    element.cols = element.cols.max(1);
    resize_tracks(&mut element.col_widths, element.cols as usize);
    resize_tracks(&mut element.row_heights, element.rows as usize);

    let mut cells = to_canonical(element);
    if let Some(segments) = element.row_segments.take() {
        overlay_segments(
            &mut cells,
            &segments,
            element.rows,
            element.cols,
            &element.col_widths,
        );
    }
    retile(&mut cells, element.rows, element.cols);
    sync_encodings(element, cells);

    if !element.cell_styles.is_empty() {
        element
            .cell_styles
            .resize(element.cell_count(), CellStyle::default());
    }
}

/// Repair the tiling invariant after a structural edit.
///
/// Walks masters in row-major order; the first master to claim a
/// coordinate wins, a later master running into claimed territory keeps
/// only its own cell, an out-of-bounds footprint is clamped, and a
/// coordinate no master claims reverts to an ordinary cell (orphaned
/// slaves keep nothing, they were empty by definition).
pub(crate) fn retile(cells: &mut Vec<TableCell>, rows: u32, cols: u32) {
    let count = rows as usize * cols as usize;
    cells.truncate(count);
    cells.resize(count, TableCell::blank());

    let mut covered = vec![false; count];
    for flat in 0..count {
        if covered.get(flat).copied().unwrap_or(false) {
            if let Some(cell) = cells.get_mut(flat) {
                *cell = TableCell::slave();
            }
            continue;
        }

        let (row, col) = grid::flat_to_row_col(flat, cols);
        let Some(cell) = cells.get_mut(flat) else {
            continue;
        };
        if cell.is_merged {
            // No master claimed this coordinate: it is not inside any
            // footprint, so it becomes an ordinary cell again.
            *cell = TableCell::blank();
            if let Some(slot) = covered.get_mut(flat) {
                *slot = true;
            }
            continue;
        }

        let mut row_span = cell.row_span.clamp(1, rows - row);
        let mut col_span = cell.col_span.clamp(1, cols - col);
        // First master wins: a footprint running into coordinates an
        // earlier master already claimed collapses to its own cell.
        let conflict = (row..row + row_span)
            .flat_map(|r| (col..col + col_span).map(move |c| grid::row_col_to_flat(r, c, cols)))
            .any(|f| covered.get(f).copied().unwrap_or(false));
        if conflict {
            row_span = 1;
            col_span = 1;
        }
        cell.row_span = row_span;
        cell.col_span = col_span;
        for r in row..row + row_span {
            for c in col..col + col_span {
                if let Some(slot) = covered.get_mut(grid::row_col_to_flat(r, c, cols)) {
                    *slot = true;
                }
            }
        }
    }
}

/// Replace rows of the uniform grid with the jagged per-row segments.
///
/// Each segment's width is matched against the cumulative uniform column
/// widths to recover how many columns it spans; a segment that does not
/// align to a column boundary takes one column.
fn overlay_segments(
    cells: &mut [TableCell],
    segments: &[RowSegment],
    rows: u32,
    cols: u32,
    col_widths: &[f64],
) {
    for (row_idx, segment) in segments.iter().enumerate() {
        let Ok(row) = u32::try_from(row_idx) else {
            break;
        };
        if row >= rows {
            break;
        }

        let mut col: u32 = 0;
        for (width, cell) in segment.widths.iter().zip(&segment.cells) {
            if col >= cols {
                break;
            }
            let span = span_for_width(*width, col, cols, col_widths);
            let anchor = grid::row_col_to_flat(row, col, cols);
            if let Some(slot) = cells.get_mut(anchor) {
                *slot = TableCell {
                    content: cell.content.clone(),
                    row_span: 1,
                    col_span: span,
                    is_merged: false,
                };
            }
            for c in col + 1..col + span {
                if let Some(slot) = cells.get_mut(grid::row_col_to_flat(row, c, cols)) {
                    *slot = TableCell::slave();
                }
            }
            col += span;
        }
        // A jagged row fully replaces the uniform row; anything the
        // segments did not reach becomes an ordinary blank cell.
        while col < cols {
            if let Some(slot) = cells.get_mut(grid::row_col_to_flat(row, col, cols)) {
                *slot = TableCell::blank();
            }
            col += 1;
        }
    }
}

fn span_for_width(width: f64, start_col: u32, cols: u32, col_widths: &[f64]) -> u32 {
    let mut acc = 0.0;
    let mut span: u32 = 0;
    let mut col = start_col;
    while col < cols {
        let w = col_widths.get(col as usize).copied().unwrap_or(0.0);
        if span > 0 && acc + w > width + SEGMENT_EPSILON {
            break;
        }
        acc += w;
        span += 1;
        col += 1;
        if (acc - width).abs() <= SEGMENT_EPSILON {
            break;
        }
    }
    span.max(1)
}

/// Resize a track array to `len` entries and rescale it to sum to 100.
pub(crate) fn resize_tracks(tracks: &mut Vec<f64>, len: usize) {
    let len = len.max(1);
    if tracks.len() > len {
        tracks.truncate(len);
    }
    if tracks.len() < len {
        let fill = if tracks.is_empty() {
            1.0
        } else {
            tracks.iter().sum::<f64>() / tracks.len() as f64
        };
        tracks.resize(len, if fill > 0.0 { fill } else { 1.0 });
    }
    let sum: f64 = tracks.iter().sum();
    if (sum - 100.0).abs() <= crate::types::TRACK_SUM_EPSILON {
        // Already normalized; leave the stored values untouched so a
        // load/save cycle is byte-stable.
        return;
    }
    if sum > f64::EPSILON {
        let scale = 100.0 / sum;
        for t in tracks.iter_mut() {
            *t *= scale;
        }
    } else {
        let equal = 100.0 / len as f64;
        for t in tracks.iter_mut() {
            *t = equal;
        }
    }
}
