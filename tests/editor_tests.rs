//! Tests for the interaction facade: selection lifecycle, pending
//! subdivision requests, and settle-time broadcast snapshots.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{assert_consistent, assert_master, TableBuilder};
use gridtable::engine::{SplitOutcome, TableEditor};
use gridtable::types::TableElement;

#[test]
fn click_then_drag_selects_the_rectangle() {
    let mut editor = TableEditor::new(TableElement::new(3, 3));

    editor.click(0);
    editor.drag_to(4);

    assert_eq!(editor.selected_indices(), vec![0, 1, 3, 4]);
}

#[test]
fn click_replaces_the_previous_selection() {
    let mut editor = TableEditor::new(TableElement::new(3, 3));

    editor.click(0);
    editor.drag_to(8);
    editor.click(5);

    assert_eq!(editor.selected_indices(), vec![5]);
}

#[test]
fn out_of_range_click_clears_the_selection() {
    let mut editor = TableEditor::new(TableElement::new(2, 2));

    editor.click(1);
    editor.click(99);

    assert!(editor.selected_indices().is_empty());
}

#[test]
fn merge_consumes_the_selection() {
    let mut editor = TableEditor::new(TableElement::new(3, 3));

    editor.click(0);
    editor.drag_to(4);
    assert!(editor.merge_selection());

    assert!(editor.selection().is_none());
    assert_master(editor.element(), 0, 2, 2);
    assert_consistent(editor.element());
}

#[test]
fn merge_without_enough_cells_keeps_the_selection() {
    let mut editor = TableEditor::new(TableElement::new(3, 3));

    editor.click(4);
    assert!(!editor.merge_selection());

    assert_eq!(editor.selected_indices(), vec![4]);
    assert!(!editor.is_dirty());
}

#[test]
fn split_on_a_plain_cell_parks_a_pending_request() {
    let mut editor = TableEditor::new(TableElement::new(2, 2));

    editor.click(0);
    assert_eq!(editor.split_selected(), SplitOutcome::NeedsSubdivision);

    let pending = editor.pending_subdivision().unwrap();
    assert_eq!(pending.flat, 0);
    // Nothing mutated yet.
    assert!(!editor.is_dirty());
}

#[test]
fn selection_change_abandons_the_pending_request() {
    let mut editor = TableEditor::new(TableElement::new(2, 2));

    editor.click(0);
    assert_eq!(editor.split_selected(), SplitOutcome::NeedsSubdivision);
    editor.click(3);

    assert!(editor.pending_subdivision().is_none());
    assert!(!editor.confirm_subdivision(2, 2));
    assert_eq!((editor.element().rows, editor.element().cols), (2, 2));
}

#[test]
fn element_replacement_abandons_the_pending_request() {
    let mut editor = TableEditor::new(TableElement::new(2, 2));

    editor.click(0);
    assert_eq!(editor.split_selected(), SplitOutcome::NeedsSubdivision);
    editor.replace_element(TableElement::new(4, 4));

    assert!(editor.pending_subdivision().is_none());
    assert!(!editor.confirm_subdivision(2, 2));
    assert!(!editor.is_dirty());
}

#[test]
fn confirmed_subdivision_applies_and_clears_the_selection() {
    let mut editor = TableEditor::new(TableElement::new(2, 2));

    editor.click(0);
    assert_eq!(editor.split_selected(), SplitOutcome::NeedsSubdivision);
    assert!(editor.confirm_subdivision(2, 1));

    assert_eq!((editor.element().rows, editor.element().cols), (3, 2));
    assert!(editor.selection().is_none());
    assert_consistent(editor.element());
}

#[test]
fn default_subdivision_splits_into_two_rows() {
    let mut editor = TableEditor::new(TableElement::new(2, 2));

    editor.click(3);
    assert_eq!(editor.split_selected(), SplitOutcome::NeedsSubdivision);
    assert!(editor.confirm_default_subdivision());

    assert_eq!((editor.element().rows, editor.element().cols), (3, 2));
}

#[test]
fn split_on_a_merged_master_unmerges_immediately() {
    let mut element = TableBuilder::new(3, 3).numbered().build();
    assert!(gridtable::engine::merge_selection(&mut element, &[0, 1, 4]));
    let mut editor = TableEditor::new(element);

    editor.click(0);
    assert_eq!(editor.split_selected(), SplitOutcome::Unmerged);

    assert!(editor.pending_subdivision().is_none());
    assert!(editor.is_dirty());
    assert_consistent(editor.element());
}

/// Continuous drags settle once: many resize frames, one broadcast.
#[test]
fn take_settled_yields_one_snapshot_per_interaction() {
    let mut editor = TableEditor::new(TableElement::new(2, 3));

    assert!(editor.take_settled().is_none());

    for _ in 0..10 {
        assert!(editor.resize_column(0, 1.0));
    }
    let snapshot = editor.take_settled().expect("dirty after resizing");
    assert_eq!(snapshot, *editor.element());
    assert!(editor.take_settled().is_none());
}

#[test]
fn content_edits_mark_dirty() {
    let mut editor = TableEditor::new(TableElement::new(2, 2));

    assert!(editor.set_cell_content(2, "hello"));
    assert_eq!(editor.element().cell_content(2), Some("hello"));
    assert!(editor.take_settled().is_some());
}

#[test]
fn set_dimensions_clamps_to_one() {
    let mut editor = TableEditor::new(TableElement::new(3, 3));

    assert!(editor.set_dimensions(0, 0));
    assert_eq!((editor.element().rows, editor.element().cols), (1, 1));
    assert_consistent(editor.element());
}

#[test]
fn resize_respects_the_minimum_track() {
    let mut editor = TableEditor::new(TableElement::new(1, 2));

    // Drag far past the neighbour: clamps instead of going negative.
    assert!(editor.resize_column(0, 500.0));
    let widths = &editor.element().col_widths;
    assert!(widths[1] >= 1.0);
    assert!((widths[0] + widths[1] - 100.0).abs() < 1e-9);

    // The last boundary is immovable.
    assert!(!editor.resize_column(1, 5.0));
}
