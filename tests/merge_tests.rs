//! Tests for the merge engine.
//!
//! A selection confined to one row merges only as a contiguous run; a
//! selection spanning two or more rows collapses into its bounding box.
//! Every merge must leave the footprints tiling the grid and the legacy
//! arrays in sync with the canonical array.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{
    assert_consistent, assert_master, assert_plain, assert_slave, TableBuilder,
};
use gridtable::engine::merge_selection;

/// 3x3 table, merge indices {0, 1, 4}: the bounding box is rows [0,1] x
/// cols [0,1]. Index 0 becomes a 2x2 master; 1, 3, 4 become slaves; the
/// rest of the grid is untouched.
#[test]
fn rectangular_merge_uses_bounding_box() {
    let mut element = TableBuilder::new(3, 3).numbered().build();

    assert!(merge_selection(&mut element, &[0, 1, 4]));

    assert_master(&element, 0, 2, 2);
    assert_eq!(element.cell_content(0), Some("c0"));
    assert_slave(&element, 1);
    assert_slave(&element, 3);
    assert_slave(&element, 4);
    for flat in [2, 5, 6, 7, 8] {
        assert_plain(&element, flat, &format!("c{flat}"));
    }
    assert_consistent(&element);
}

#[test]
fn same_row_contiguous_run_merges() {
    let mut element = TableBuilder::new(1, 4).numbered().build();

    assert!(merge_selection(&mut element, &[1, 2]));

    assert_plain(&element, 0, "c0");
    assert_master(&element, 1, 1, 2);
    assert_eq!(element.cell_content(1), Some("c1"));
    assert_slave(&element, 2);
    assert_plain(&element, 3, "c3");
    assert_consistent(&element);
}

/// Merging non-contiguous same-row indices {0, 2} in a 1x4 row is a no-op.
#[test]
fn same_row_gap_is_a_noop() {
    let mut element = TableBuilder::new(1, 4).numbered().build();
    let before = element.clone();

    assert!(!merge_selection(&mut element, &[0, 2]));

    assert_eq!(element, before);
}

#[test]
fn fewer_than_two_indices_is_a_noop() {
    let mut element = TableBuilder::new(3, 3).numbered().build();
    let before = element.clone();

    assert!(!merge_selection(&mut element, &[4]));
    assert!(!merge_selection(&mut element, &[]));

    assert_eq!(element, before);
}

#[test]
fn stale_indices_are_ignored() {
    let mut element = TableBuilder::new(2, 2).numbered().build();
    let before = element.clone();

    // Only one usable index remains after dropping the stale ones.
    assert!(!merge_selection(&mut element, &[0, 99, 100]));
    assert_eq!(element, before);

    // Two usable indices merge even with stale company.
    assert!(merge_selection(&mut element, &[0, 1, 77]));
    assert_master(&element, 0, 1, 2);
    assert_consistent(&element);
}

/// A multi-row selection with gaps still merges its full bounding box.
#[test]
fn sparse_corners_cover_the_box() {
    let mut element = TableBuilder::new(3, 3).numbered().build();

    assert!(merge_selection(&mut element, &[0, 8]));

    assert_master(&element, 0, 3, 3);
    for flat in 1..9 {
        assert_slave(&element, flat);
    }
    assert_consistent(&element);
}

/// The merge blanks everything in the box except the master's own content.
#[test]
fn merge_keeps_master_content_only() {
    let mut element = TableBuilder::new(2, 2).numbered().build();

    assert!(merge_selection(&mut element, &[0, 1, 2, 3]));

    assert_eq!(element.cell_content(0), Some("c0"));
    for flat in 1..4 {
        assert_eq!(element.cell_content(flat), Some(""));
    }
    assert_consistent(&element);
}

/// Re-merging an identical box changes nothing and reports it.
#[test]
fn identical_merge_is_a_noop() {
    let mut element = TableBuilder::new(3, 3).numbered().build();

    assert!(merge_selection(&mut element, &[0, 1, 4]));
    let before = element.clone();
    assert!(!merge_selection(&mut element, &[0, 1, 4]));
    assert_eq!(element, before);
}

/// A box that swallows part of an existing footprint must not leave
/// orphaned slaves behind: the grid is re-tiled.
#[test]
fn overlapping_merge_repairs_tiling() {
    let mut element = TableBuilder::new(3, 3).numbered().build();

    // Bottom 2x3 block first.
    assert!(merge_selection(&mut element, &[3, 4, 5, 6, 7, 8]));
    assert_master(&element, 3, 2, 3);

    // Now a vertical merge down the first column, cutting into it.
    assert!(merge_selection(&mut element, &[0, 3]));

    assert_master(&element, 0, 2, 1);
    assert_slave(&element, 3);
    assert_consistent(&element);
}

#[test]
fn merge_works_on_legacy_only_documents() {
    let mut element = TableBuilder::new(2, 2).numbered().legacy_only().build();

    assert!(merge_selection(&mut element, &[0, 1, 2, 3]));

    // The canonical array is synthesized on the way in and written back.
    assert_master(&element, 0, 2, 2);
    assert_consistent(&element);
}

/// A same-row merge cutting across a taller footprint cannot corrupt the
/// grid: the earlier footprint wins and the result is still a tiling.
#[test]
fn conflicting_merge_keeps_the_grid_consistent() {
    let mut element = TableBuilder::new(2, 3).numbered().build();

    // Vertical merge down the last column.
    assert!(merge_selection(&mut element, &[2, 5]));
    // Row merge across the bottom row, cutting into the vertical master.
    merge_selection(&mut element, &[3, 4, 5]);

    assert_master(&element, 2, 2, 1);
    assert_consistent(&element);
}
