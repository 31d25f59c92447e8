use serde::{Deserialize, Serialize};

/// A single cell of the canonical ("V2") grid.
///
/// A cell with `is_merged == false` is a *master* occupying a
/// `row_span x col_span` rectangular footprint anchored at its own
/// coordinate. Every other coordinate inside that footprint holds a *slave*
/// (`is_merged == true`, spans of 1, empty content). Footprints never
/// overlap and tile the grid exactly.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    /// Text content. Always empty on slaves.
    #[serde(default)]
    pub content: String,
    /// Rows covered by this master's footprint (1 on slaves).
    #[serde(default = "default_span")]
    pub row_span: u32,
    /// Columns covered by this master's footprint (1 on slaves).
    #[serde(default = "default_span")]
    pub col_span: u32,
    /// True when this coordinate is hidden inside another cell's footprint.
    #[serde(default)]
    pub is_merged: bool,
}

fn default_span() -> u32 {
    1
}

impl Default for TableCell {
    fn default() -> Self {
        Self::blank()
    }
}

impl TableCell {
    /// An ordinary empty cell: `{"", 1, 1, false}`.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            content: String::new(),
            row_span: 1,
            col_span: 1,
            is_merged: false,
        }
    }

    /// An ordinary cell with content.
    #[must_use]
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::blank()
        }
    }

    /// A hidden cell inside a master's footprint.
    #[must_use]
    pub fn slave() -> Self {
        Self {
            content: String::new(),
            row_span: 1,
            col_span: 1,
            is_merged: true,
        }
    }

    /// Whether this cell anchors a footprint (it is not hidden).
    #[must_use]
    pub fn is_master(&self) -> bool {
        !self.is_merged
    }

    /// Whether this master covers more than its own coordinate.
    #[must_use]
    pub fn has_span(&self) -> bool {
        self.row_span > 1 || self.col_span > 1
    }
}

/// One entry of the legacy parallel span array.
///
/// A slave is the sentinel `{0, 0}`, distinct from the ordinary unspanned
/// `{1, 1}`. Round-trip rule: `is_merged <=> span == {0, 0}`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LegacySpan {
    #[serde(default)]
    pub row_span: u32,
    #[serde(default)]
    pub col_span: u32,
}

impl LegacySpan {
    /// Sentinel marking a slave coordinate.
    pub const SLAVE: Self = Self {
        row_span: 0,
        col_span: 0,
    };

    /// An ordinary unspanned cell.
    pub const SINGLE: Self = Self {
        row_span: 1,
        col_span: 1,
    };

    /// Whether this entry is the slave sentinel.
    #[must_use]
    pub fn is_slave(self) -> bool {
        self == Self::SLAVE
    }
}

impl Default for LegacySpan {
    fn default() -> Self {
        Self::SINGLE
    }
}

/// One row of the jagged legacy form: per-row column widths with a matching
/// cell slice. Only same-row adjacent merges were ever stored this way; the
/// form is valid input but is erased by migration and never written back.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RowSegment {
    /// Widths of this row's segments, percentages of the table width.
    pub widths: Vec<f64>,
    /// One cell per segment.
    pub cells: Vec<TableCell>,
}
