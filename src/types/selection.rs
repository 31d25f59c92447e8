use crate::grid;

/// Rectangular cell selection tracked as an anchor plus a drag focus.
///
/// A single click replaces the selection (`anchor == focus`); dragging moves
/// only the focus. The covered set is always the bounding rectangle of the
/// two endpoints, flattened back to flat indices for the merge engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    anchor: usize,
    focus: usize,
}

impl Selection {
    /// Selection of a single cell (click).
    #[must_use]
    pub fn single(flat: usize) -> Self {
        Self {
            anchor: flat,
            focus: flat,
        }
    }

    /// Move the focus while dragging; the anchor stays put.
    pub fn extend_to(&mut self, flat: usize) {
        self.focus = flat;
    }

    /// The cell the drag started from.
    #[must_use]
    pub fn anchor(&self) -> usize {
        self.anchor
    }

    /// The cell currently hovered.
    #[must_use]
    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Whether exactly one cell is selected.
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.anchor == self.focus
    }

    /// Normalized bounds `(min_row, min_col, max_row, max_col)`.
    #[must_use]
    pub fn bounds(&self, cols: u32) -> (u32, u32, u32, u32) {
        let (row_a, col_a) = grid::flat_to_row_col(self.anchor, cols);
        let (row_b, col_b) = grid::flat_to_row_col(self.focus, cols);
        (
            row_a.min(row_b),
            col_a.min(col_b),
            row_a.max(row_b),
            col_a.max(col_b),
        )
    }

    /// Flat indices covered by the selection rectangle, row-major.
    #[must_use]
    pub fn indices(&self, cols: u32) -> Vec<usize> {
        let (min_row, min_col, max_row, max_col) = self.bounds(cols);
        let mut flat = Vec::with_capacity(
            (max_row - min_row + 1) as usize * (max_col - min_col + 1) as usize,
        );
        for row in min_row..=max_row {
            for col in min_col..=max_col {
                flat.push(grid::row_col_to_flat(row, col, cols));
            }
        }
        flat
    }
}
