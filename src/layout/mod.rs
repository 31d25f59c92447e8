//! Pixel layout for rendering a table element.

mod table_layout;

pub use table_layout::{CellRect, MergeInfo, TableLayout};
