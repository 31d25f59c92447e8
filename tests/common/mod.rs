#![allow(dead_code)]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use gridtable::types::{TableCell, TableElement};

/// Builder for table elements in various encoding states.
pub struct TableBuilder {
    element: TableElement,
}

impl TableBuilder {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            element: TableElement::new(rows, cols),
        }
    }

    /// Fill every cell's content with its flat index: "c0", "c1", ...
    pub fn numbered(mut self) -> Self {
        for flat in 0..self.element.cell_count() {
            assert!(self.element.set_cell_content(flat, &format!("c{flat}")));
        }
        self
    }

    pub fn content(mut self, flat: usize, text: &str) -> Self {
        assert!(self.element.set_cell_content(flat, text));
        self
    }

    /// Turn the element into a legacy-only document: keep the parallel
    /// arrays, drop the canonical array.
    pub fn legacy_only(mut self) -> Self {
        self.element.cells_v2 = None;
        self
    }

    pub fn build(self) -> TableElement {
        self.element
    }
}

/// The canonical cells of an element; panics if the canonical array is
/// absent (use `legacy_only` tables through the resolver instead).
pub fn cells(element: &TableElement) -> &[TableCell] {
    element
        .cells_v2
        .as_deref()
        .expect("canonical cell array should be present")
}

pub fn assert_master(element: &TableElement, flat: usize, row_span: u32, col_span: u32) {
    let cell = &cells(element)[flat];
    assert!(!cell.is_merged, "cell {flat} should be a master");
    assert_eq!(
        (cell.row_span, cell.col_span),
        (row_span, col_span),
        "span of cell {flat}"
    );
}

pub fn assert_slave(element: &TableElement, flat: usize) {
    let cell = &cells(element)[flat];
    assert!(cell.is_merged, "cell {flat} should be a slave");
    assert_eq!(
        (cell.row_span, cell.col_span),
        (1, 1),
        "slave {flat} must have unit spans"
    );
    assert!(cell.content.is_empty(), "slave {flat} must be empty");
}

/// An ordinary unmerged, unspanned cell with the given content.
pub fn assert_plain(element: &TableElement, flat: usize, content: &str) {
    assert_master(element, flat, 1, 1);
    assert_eq!(cells(element)[flat].content, content, "content of cell {flat}");
}

/// Track percentages must sum to 100 after any structural edit.
pub fn assert_track_sums(element: &TableElement) {
    let widths: f64 = element.col_widths.iter().sum();
    let heights: f64 = element.row_heights.iter().sum();
    assert!((widths - 100.0).abs() < 1e-6, "col widths sum to {widths}");
    assert!(
        (heights - 100.0).abs() < 1e-6,
        "row heights sum to {heights}"
    );
}

/// The legacy arrays must always agree with the canonical array.
pub fn assert_encodings_in_sync(element: &TableElement) {
    let cells = cells(element);
    assert_eq!(element.legacy_content.len(), cells.len());
    assert_eq!(element.legacy_spans.len(), cells.len());
    for (flat, cell) in cells.iter().enumerate() {
        assert_eq!(
            element.legacy_content[flat], cell.content,
            "legacy content of cell {flat}"
        );
        let span = element.legacy_spans[flat];
        if cell.is_merged {
            assert!(span.is_slave(), "cell {flat} should carry the slave sentinel");
        } else {
            assert_eq!(
                (span.row_span, span.col_span),
                (cell.row_span, cell.col_span),
                "legacy span of cell {flat}"
            );
        }
    }
}

/// Full structural health check used after every mutation under test.
pub fn assert_consistent(element: &TableElement) {
    element.validate().expect("grid invariants should hold");
    assert_track_sums(element);
    assert_encodings_in_sync(element);
}
