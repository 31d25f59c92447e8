use serde::{Deserialize, Serialize};

use super::{CellStyle, LegacySpan, RowSegment, TableCell};
use crate::error::{GridTableError, Result};
use crate::grid;
use crate::resolver;

/// Grid of a freshly inserted table when the size picker is skipped.
pub const DEFAULT_ROWS: u32 = 3;
/// See [`DEFAULT_ROWS`].
pub const DEFAULT_COLS: u32 = 3;

/// Smallest width/height a track can be resized to, in percent.
pub const MIN_TRACK_PERCENT: f64 = 1.0;

/// Tolerance when checking that track percentages sum to 100.
pub const TRACK_SUM_EPSILON: f64 = 0.01;

/// An embeddable table element of the surrounding diagram document.
///
/// Serialized as one field of the owning element's JSON record. Two cell
/// encodings coexist for backward compatibility:
/// - `cells_v2`: the canonical dense row-major array, source of truth
///   after migration;
/// - `legacy_content` + `legacy_spans`: the parallel arrays older
///   documents were saved with, re-derived from the canonical array on
///   every mutation so the two never drift apart.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableElement {
    pub rows: u32,
    pub cols: u32,
    /// Column widths, percentages of the element width summing to 100.
    #[serde(default)]
    pub col_widths: Vec<f64>,
    /// Row heights, percentages of the element height summing to 100.
    #[serde(default)]
    pub row_heights: Vec<f64>,
    /// Canonical ("V2") cell array. `None` on documents saved before the
    /// versioned encoding existed; filled by migration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cells_v2: Option<Vec<TableCell>>,
    /// Legacy parallel array: cell text.
    #[serde(default)]
    pub legacy_content: Vec<String>,
    /// Legacy parallel array: spans with the `{0,0}` slave sentinel.
    #[serde(default)]
    pub legacy_spans: Vec<LegacySpan>,
    /// Per-cell style records, row-major. Empty means all-default.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cell_styles: Vec<CellStyle>,
    /// Jagged row-local legacy form. Input only; cleared by migration and
    /// never written back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_segments: Option<Vec<RowSegment>>,
}

impl TableElement {
    /// Create a blank table with equal tracks and both encodings in sync.
    ///
    /// Dimensions are clamped to at least 1x1.
    #[must_use]
    pub fn new(rows: u32, cols: u32) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let count = rows as usize * cols as usize;
        let mut element = Self {
            rows,
            cols,
            col_widths: vec![100.0 / f64::from(cols); cols as usize],
            row_heights: vec![100.0 / f64::from(rows); rows as usize],
            cells_v2: None,
            legacy_content: Vec::new(),
            legacy_spans: Vec::new(),
            cell_styles: Vec::new(),
            row_segments: None,
        };
        resolver::sync_encodings(&mut element, vec![TableCell::blank(); count]);
        element
    }

    /// The default 3x3 table used when no size is picked at insertion.
    #[must_use]
    pub fn default_size() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS)
    }

    /// Parse an element from its JSON snapshot, migrate legacy encodings
    /// into the canonical form, and check invariants.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or the migrated grid does
    /// not satisfy the tiling invariant.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut element: Self = serde_json::from_str(json)?;
        resolver::migrate(&mut element);
        element.validate()?;
        Ok(element)
    }

    /// Serialize the element to its JSON snapshot.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Number of coordinates in the dense grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Text content at a flat index, from whichever encoding is current.
    #[must_use]
    pub fn cell_content(&self, flat: usize) -> Option<&str> {
        match &self.cells_v2 {
            Some(cells) => cells.get(flat).map(|c| c.content.as_str()),
            None => self.legacy_content.get(flat).map(String::as_str),
        }
    }

    /// Style record at a flat index; default when none was ever set.
    #[must_use]
    pub fn cell_style(&self, flat: usize) -> CellStyle {
        self.cell_styles.get(flat).cloned().unwrap_or_default()
    }

    /// Set the text of a master cell. No-op on slaves and out-of-range
    /// indices. Writes both encodings.
    pub fn set_cell_content(&mut self, flat: usize, text: &str) -> bool {
        if flat >= self.cell_count() {
            return false;
        }
        let mut cells = resolver::to_canonical(self);
        match cells.get_mut(flat) {
            Some(cell) if cell.is_master() => text.clone_into(&mut cell.content),
            _ => return false,
        }
        resolver::sync_encodings(self, cells);
        true
    }

    /// Set the style record of a cell. No-op out of range.
    pub fn set_cell_style(&mut self, flat: usize, style: CellStyle) -> bool {
        let count = self.cell_count();
        if flat >= count {
            return false;
        }
        if self.cell_styles.len() < count {
            self.cell_styles.resize(count, CellStyle::default());
        }
        match self.cell_styles.get_mut(flat) {
            Some(slot) => {
                *slot = style;
                true
            }
            None => false,
        }
    }

    /// Change the grid to `rows x cols`, preserving content in the region
    /// both sizes cover. Masters whose footprint sticks out of the new
    /// bounds are clamped; masters anchored outside are dropped.
    ///
    /// Dimensions are clamped to at least 1x1 (the upstream count editors
    /// do the same).
    pub fn set_dimensions(&mut self, rows: u32, cols: u32) -> bool {
        let rows = rows.max(1);
        let cols = cols.max(1);
        if rows == self.rows && cols == self.cols {
            return false;
        }

        let old = resolver::to_canonical(self);
        let old_cols = self.cols;
        let count = rows as usize * cols as usize;
        let mut cells = vec![TableCell::blank(); count];

        for eff in grid::effective_cells(&old, old_cols) {
            let fp = eff.footprint;
            if fp.row >= rows || fp.col >= cols {
                continue;
            }
            let row_span = fp.row_span.min(rows - fp.row);
            let col_span = fp.col_span.min(cols - fp.col);
            let anchor = grid::row_col_to_flat(fp.row, fp.col, cols);
            if let Some(slot) = cells.get_mut(anchor) {
                *slot = TableCell {
                    content: eff.cell.content.clone(),
                    row_span,
                    col_span,
                    is_merged: false,
                };
            }
            for r in fp.row..fp.row + row_span {
                for c in fp.col..fp.col + col_span {
                    if r == fp.row && c == fp.col {
                        continue;
                    }
                    if let Some(slot) = cells.get_mut(grid::row_col_to_flat(r, c, cols)) {
                        *slot = TableCell::slave();
                    }
                }
            }
        }

        if !self.cell_styles.is_empty() {
            let mut styles = vec![CellStyle::default(); count];
            for (flat, style) in self.cell_styles.iter().enumerate() {
                let (r, c) = grid::flat_to_row_col(flat, old_cols);
                if r < rows && c < cols {
                    if let Some(slot) = styles.get_mut(grid::row_col_to_flat(r, c, cols)) {
                        *slot = style.clone();
                    }
                }
            }
            self.cell_styles = styles;
        }

        self.rows = rows;
        self.cols = cols;
        resolver::resize_tracks(&mut self.col_widths, cols as usize);
        resolver::resize_tracks(&mut self.row_heights, rows as usize);
        resolver::sync_encodings(self, cells);
        true
    }

    /// Drag the boundary between columns `idx` and `idx + 1` by `delta`
    /// percent points. Both tracks are clamped to [`MIN_TRACK_PERCENT`], so
    /// the 100% sum is preserved exactly. The last boundary is immovable.
    pub fn resize_column(&mut self, idx: usize, delta: f64) -> bool {
        resize_track_boundary(&mut self.col_widths, idx, delta)
    }

    /// Row analog of [`Self::resize_column`].
    pub fn resize_row(&mut self, idx: usize, delta: f64) -> bool {
        resize_track_boundary(&mut self.row_heights, idx, delta)
    }

    /// Check the structural invariants of the element.
    ///
    /// # Errors
    /// Returns an error on zero dimensions, track arrays that do not match
    /// the grid or sum to 100, or a canonical array whose footprints do not
    /// tile the grid exactly.
    pub fn validate(&self) -> Result<()> {
        if self.rows < 1 || self.cols < 1 {
            return Err(GridTableError::Dimension(format!(
                "table must be at least 1x1, got {}x{}",
                self.rows, self.cols
            )));
        }
        check_tracks("colWidths", &self.col_widths, self.cols as usize)?;
        check_tracks("rowHeights", &self.row_heights, self.rows as usize)?;

        let Some(cells) = &self.cells_v2 else {
            return Ok(());
        };
        let count = self.cell_count();
        if cells.len() != count {
            return Err(GridTableError::Span(format!(
                "canonical array has {} cells, grid needs {count}",
                cells.len()
            )));
        }

        let mut covered = vec![false; count];
        for eff in grid::effective_cells(cells, self.cols) {
            let fp = eff.footprint;
            if fp.end_row() > self.rows || fp.end_col() > self.cols {
                return Err(GridTableError::Span(format!(
                    "footprint at ({}, {}) exceeds the grid",
                    fp.row, fp.col
                )));
            }
            for r in fp.row..fp.end_row() {
                for c in fp.col..fp.end_col() {
                    let flat = grid::row_col_to_flat(r, c, self.cols);
                    match covered.get_mut(flat) {
                        Some(slot) if !*slot => *slot = true,
                        _ => {
                            return Err(GridTableError::Span(format!(
                                "overlapping footprints at ({r}, {c})"
                            )))
                        }
                    }
                    let is_anchor = r == fp.row && c == fp.col;
                    let is_slave = cells.get(flat).is_some_and(|cell| cell.is_merged);
                    if !is_anchor && !is_slave {
                        return Err(GridTableError::Span(format!(
                            "({r}, {c}) inside a footprint is not a slave"
                        )));
                    }
                }
            }
        }
        if covered.iter().any(|slot| !*slot) {
            return Err(GridTableError::Span(
                "footprints do not cover the grid".into(),
            ));
        }
        Ok(())
    }
}

fn check_tracks(name: &str, tracks: &[f64], expected: usize) -> Result<()> {
    if tracks.len() != expected {
        return Err(GridTableError::Dimension(format!(
            "{name} has {} entries, expected {expected}",
            tracks.len()
        )));
    }
    let sum: f64 = tracks.iter().sum();
    if (sum - 100.0).abs() > TRACK_SUM_EPSILON {
        return Err(GridTableError::Dimension(format!(
            "{name} sums to {sum}, expected 100"
        )));
    }
    Ok(())
}

fn resize_track_boundary(tracks: &mut [f64], idx: usize, delta: f64) -> bool {
    let Some(next) = idx.checked_add(1) else {
        return false;
    };
    if next >= tracks.len() {
        return false;
    }
    let Some(w0) = tracks.get(idx).copied() else {
        return false;
    };
    let Some(w1) = tracks.get(next).copied() else {
        return false;
    };
    let pair = w0 + w1;
    if pair <= 2.0 * MIN_TRACK_PERCENT {
        return false;
    }
    let new0 = (w0 + delta).clamp(MIN_TRACK_PERCENT, pair - MIN_TRACK_PERCENT);
    if (new0 - w0).abs() < f64::EPSILON {
        return false;
    }
    if let Some(slot) = tracks.get_mut(idx) {
        *slot = new0;
    }
    if let Some(slot) = tracks.get_mut(next) {
        *slot = pair - new0;
    }
    true
}
