//! Interaction facade for one table element in cell-edit mode.
//!
//! `TableEditor` tracks the live selection and the pending subdivision
//! request, and exposes settle-time dirty tracking: the collaboration layer
//! broadcasts the whole element once per settled interaction (mouse-up or
//! blur), never on intermediate drag frames.

pub mod merge;
pub mod split;

pub use merge::merge_selection;
pub use split::{split_cell, subdivide, SplitOutcome, DEFAULT_SPLIT};

use crate::resolver;
use crate::types::{CellStyle, Selection, TableElement};

/// A subdivision waiting for its `(rows, cols)` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSubdivision {
    /// Flat index of the cell to subdivide.
    pub flat: usize,
}

/// Editor state for one table element in cell-edit mode.
///
/// Exactly one table is in cell-edit mode at a time; the surrounding
/// editor constructs a `TableEditor` on entry and drops it on exit.
#[derive(Debug, Clone)]
pub struct TableEditor {
    element: TableElement,
    selection: Option<Selection>,
    pending_split: Option<PendingSubdivision>,
    dirty: bool,
}

impl TableEditor {
    /// Enter cell-edit mode on an element.
    ///
    /// Legacy encodings are migrated up front so the engines always see
    /// the canonical form.
    #[must_use]
    pub fn new(mut element: TableElement) -> Self {
        resolver::migrate(&mut element);
        Self {
            element,
            selection: None,
            pending_split: None,
            dirty: false,
        }
    }

    /// The edited element.
    #[must_use]
    pub fn element(&self) -> &TableElement {
        &self.element
    }

    /// The current selection, if any.
    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Flat indices covered by the current selection rectangle.
    #[must_use]
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selection
            .map(|sel| sel.indices(self.element.cols))
            .unwrap_or_default()
    }

    /// A pending subdivision waiting for parameters, if any.
    #[must_use]
    pub fn pending_subdivision(&self) -> Option<PendingSubdivision> {
        self.pending_split
    }

    /// Single-cell click: replaces the selection and abandons any pending
    /// subdivision.
    pub fn click(&mut self, flat: usize) {
        self.pending_split = None;
        self.selection = (flat < self.element.cell_count()).then(|| Selection::single(flat));
    }

    /// Drag-extend the selection to the hovered cell.
    pub fn drag_to(&mut self, flat: usize) {
        self.pending_split = None;
        if flat >= self.element.cell_count() {
            return;
        }
        if let Some(sel) = &mut self.selection {
            sel.extend_to(flat);
        }
    }

    /// Drop the selection and any pending subdivision.
    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.pending_split = None;
    }

    /// Replace the edited element (a remote update won). Selection and any
    /// pending subdivision are abandoned without effect; the incoming
    /// state is not considered a local edit.
    pub fn replace_element(&mut self, mut element: TableElement) {
        resolver::migrate(&mut element);
        self.element = element;
        self.selection = None;
        self.pending_split = None;
        self.dirty = false;
    }

    /// Merge the current selection. Clears it on success.
    pub fn merge_selection(&mut self) -> bool {
        self.pending_split = None;
        let Some(sel) = self.selection else {
            return false;
        };
        let indices = sel.indices(self.element.cols);
        let merged = merge::merge_selection(&mut self.element, &indices);
        if merged {
            self.selection = None;
            self.dirty = true;
        }
        merged
    }

    /// Split the single selected cell.
    ///
    /// Unmerging happens immediately; a plain cell parks a
    /// [`PendingSubdivision`] that [`Self::confirm_subdivision`] consumes.
    pub fn split_selected(&mut self) -> SplitOutcome {
        let Some(sel) = self.selection else {
            return SplitOutcome::NoOp;
        };
        if !sel.is_single() {
            return SplitOutcome::NoOp;
        }
        let flat = sel.anchor();
        let outcome = split::split_cell(&mut self.element, flat);
        self.pending_split = match outcome {
            SplitOutcome::NeedsSubdivision => Some(PendingSubdivision { flat }),
            SplitOutcome::Unmerged => {
                self.dirty = true;
                None
            }
            SplitOutcome::NoOp => None,
        };
        outcome
    }

    /// Confirm a pending subdivision with explicit parameters.
    ///
    /// Returns `false` when no request is pending (it was abandoned by a
    /// selection change or element replacement).
    pub fn confirm_subdivision(&mut self, split_rows: u32, split_cols: u32) -> bool {
        let Some(pending) = self.pending_split.take() else {
            return false;
        };
        let changed = split::subdivide(&mut self.element, pending.flat, split_rows, split_cols);
        if changed {
            self.selection = None;
            self.dirty = true;
        }
        changed
    }

    /// Confirm a pending subdivision with [`DEFAULT_SPLIT`].
    pub fn confirm_default_subdivision(&mut self) -> bool {
        let (rows, cols) = DEFAULT_SPLIT;
        self.confirm_subdivision(rows, cols)
    }

    /// See [`TableElement::set_dimensions`].
    pub fn set_dimensions(&mut self, rows: u32, cols: u32) -> bool {
        self.clear_selection();
        let changed = self.element.set_dimensions(rows, cols);
        self.mark(changed)
    }

    /// See [`TableElement::resize_column`].
    pub fn resize_column(&mut self, idx: usize, delta: f64) -> bool {
        let changed = self.element.resize_column(idx, delta);
        self.mark(changed)
    }

    /// See [`TableElement::resize_row`].
    pub fn resize_row(&mut self, idx: usize, delta: f64) -> bool {
        let changed = self.element.resize_row(idx, delta);
        self.mark(changed)
    }

    /// See [`TableElement::set_cell_content`].
    pub fn set_cell_content(&mut self, flat: usize, text: &str) -> bool {
        let changed = self.element.set_cell_content(flat, text);
        self.mark(changed)
    }

    /// See [`TableElement::set_cell_style`].
    pub fn set_cell_style(&mut self, flat: usize, style: CellStyle) -> bool {
        let changed = self.element.set_cell_style(flat, style);
        self.mark(changed)
    }

    /// Whether local edits are waiting to be broadcast.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Snapshot for the collaboration layer, yielded once per settled
    /// interaction. Returns `None` while nothing changed since the last
    /// settle.
    pub fn take_settled(&mut self) -> Option<TableElement> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.element.clone())
    }

    fn mark(&mut self, changed: bool) -> bool {
        if changed {
            self.dirty = true;
        }
        changed
    }
}
