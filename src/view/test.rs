use super::*;

use crate::editor::NumberEditor;
use crate::selection::Area;
use crate::table::MemTable;

use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;

// Default geometry: columns are 100 wide after a 40 px row header,
// rows are 24 high after a 24 px column header.

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn make_view(cols: usize, rows: usize) -> TableView {
    init_tracing();
    TableView::new(table::share(MemTable::new(cols, rows)), GridConfig::default())
}

fn make_view_with_data(rows: Vec<Vec<&str>>) -> TableView {
    init_tracing();
    TableView::new(table::share(MemTable::from_rows(rows)), GridConfig::default())
}

/// Viewport x of the middle of column position `c`
fn col_x(c: i64) -> i64 {
    40 + c * 100 + 50
}

/// Viewport y of the middle of row position `r`
fn row_y(r: i64) -> i64 {
    24 + r * 24 + 12
}

const HEADER_Y: i64 = 10;
const HEADER_X: i64 = 10;

fn select(view: &TableView) -> Option<(usize, usize)> {
    view.grid().positions.select.get()?.body()
}

fn focus(view: &TableView) -> Option<(usize, usize)> {
    view.grid().positions.focus.get()?.body()
}

fn column_order(view: &TableView) -> Vec<usize> {
    view.grid().columns.sizes().index_map().order()
}

fn wait_for_copy(view: &mut TableView) -> CopyEvent {
    for _ in 0..1000 {
        match view.poll_copy() {
            Some(event) if event.is_final() => return event,
            Some(_) => {}
            None => thread::sleep(Duration::from_millis(5)),
        }
    }
    panic!("copy did not finish");
}

// === Keyboard ===

#[test]
fn test_first_arrow_lands_on_first_cell() {
    let mut view = make_view(5, 5);
    view.navigate(Direction::Right, false);
    assert_eq!(select(&view), Some((0, 0)));
    assert_eq!(focus(&view), Some((0, 0)));
}

#[test]
fn test_arrow_moves_focus_unless_extending() {
    let mut view = make_view(5, 5);
    view.navigate(Direction::Down, false);
    view.navigate(Direction::Right, false);
    assert_eq!(focus(&view), Some((1, 0)));
    assert_eq!(view.grid().selection.areas(), &[Area::cell(1, 0)]);

    view.navigate(Direction::Down, true);
    view.navigate(Direction::Right, true);
    assert_eq!(select(&view), Some((2, 1)));
    assert_eq!(focus(&view), Some((1, 0)));
    assert_eq!(view.grid().selection.areas(), &[Area::new(1, 0, 2, 1)]);
}

#[test]
fn test_arrows_skip_hidden_and_clamp() {
    let mut view = make_view(4, 2);
    view.grid_mut().columns.hide(2);
    view.move_select_to(1, 0, false);

    view.navigate(Direction::Right, false);
    assert_eq!(select(&view), Some((3, 0)));
    view.navigate(Direction::Right, false);
    assert_eq!(select(&view), Some((3, 0)));
    view.navigate(Direction::Left, false);
    assert_eq!(select(&view), Some((1, 0)));
}

#[test]
fn test_home_end_top_bottom() {
    let mut view = make_view(6, 6);
    view.grid_mut().columns.hide(5);
    view.move_select_to(2, 3, false);
    view.end(false);
    assert_eq!(select(&view), Some((4, 3)));
    view.home(true);
    assert_eq!(select(&view), Some((0, 3)));
    assert_eq!(focus(&view), Some((4, 3)));
    view.bottom(false);
    assert_eq!(select(&view), Some((0, 5)));
    view.top(false);
    assert_eq!(select(&view), Some((0, 0)));
}

#[test]
fn test_page_down_moves_one_viewport() {
    let mut view = make_view(3, 100);
    view.move_select_to(0, 0, false);
    view.page(Direction::Down, false);

    assert_eq!(select(&view), Some((0, 24)));
    assert_eq!(view.scroll().1, 576);
    assert_eq!(view.visible_range(Axis::Row), Some((24, 47)));

    view.page(Direction::Up, false);
    assert_eq!(select(&view), Some((0, 0)));
    assert_eq!(view.scroll().1, 0);
}

#[test]
fn test_navigation_scrolls_into_view() {
    let mut view = make_view(3, 100);
    view.move_select_to(0, 30, false);
    // row 30 spans 744..768 in content space; bottom edge at 600
    assert_eq!(view.scroll().1, 168);
    assert_eq!(view.visible_range(Axis::Row), Some((7, 30)));
}

// === Mouse ===

#[test]
fn test_press_and_drag_selects_area() {
    let mut view = make_view(5, 5);
    view.press(col_x(1), row_y(1), Modifiers::NONE);
    view.drag(col_x(3), row_y(3)).unwrap();
    assert!(!view.release(col_x(3), row_y(3)));

    assert_eq!(focus(&view), Some((1, 1)));
    assert_eq!(select(&view), Some((3, 3)));
    assert_eq!(view.grid().selection.areas(), &[Area::new(1, 1, 3, 3)]);
}

#[test]
fn test_ctrl_press_adds_area() {
    let mut view = make_view(5, 5);
    view.press(col_x(0), row_y(0), Modifiers::NONE);
    view.release(col_x(0), row_y(0));
    view.press(col_x(4), row_y(4), Modifiers::CTRL);
    view.release(col_x(4), row_y(4));

    let sel = &view.grid().selection;
    assert_eq!(sel.areas().len(), 2);
    assert!(sel.is_selected(0, 0));
    assert!(sel.is_selected(4, 4));
    assert!(!sel.is_selected(2, 2));
}

#[test]
fn test_drag_outside_clamps_to_body() {
    let mut view = make_view(3, 3);
    view.press(col_x(1), row_y(1), Modifiers::NONE);
    view.drag(5000, -20).unwrap();
    assert_eq!(select(&view), Some((2, 0)));
}

#[test]
fn test_hover_tracks_mouse() {
    let mut view = make_view(3, 3);
    view.hover(col_x(2), HEADER_Y);
    assert_eq!(
        view.grid().positions.mouse.get(),
        Some(CellPos::new(Pos::Cell(2), Pos::Header))
    );
    view.hover(5000, row_y(0));
    assert_eq!(
        view.grid().positions.mouse.get(),
        Some(CellPos::new(Pos::After, Pos::Cell(0)))
    );
    view.leave();
    assert_eq!(view.grid().positions.mouse.get(), None);
}

#[test]
fn test_header_press_selects_lines() {
    let mut view = make_view(5, 4);
    view.press(col_x(1), HEADER_Y, Modifiers::NONE);
    view.drag(col_x(2), HEADER_Y).unwrap();
    view.release(col_x(2), HEADER_Y);
    assert_eq!(view.grid().selection.areas(), &[Area::new(1, 0, 2, 3)]);
    assert!(view
        .grid()
        .selection
        .is_column_fully_selected(2, &view.grid().rows));

    view.press(HEADER_X, row_y(3), Modifiers::NONE);
    view.release(HEADER_X, row_y(3));
    assert_eq!(view.grid().selection.areas(), &[Area::new(0, 3, 4, 3)]);
}

#[test]
fn test_corner_press_selects_all() {
    let mut view = make_view(3, 3);
    view.press(HEADER_X, HEADER_Y, Modifiers::NONE);
    assert!(view.grid().selection.is_all());
}

#[test]
fn test_resize_gesture_is_one_step() {
    let mut view = make_view(4, 4);
    // right edge of column 1 is at x = 240
    view.press(238, HEADER_Y, Modifiers::NONE);
    assert!(matches!(view.gesture(), Some(Gesture::Resize(_))));
    view.drag(250, HEADER_Y).unwrap();
    view.drag(260, HEADER_Y).unwrap();
    assert_eq!(view.grid().columns.size_of(1), 122);
    assert!(view.release(268, HEADER_Y));

    assert_eq!(view.grid().columns.size_of(1), 130);
    assert_eq!(view.history().len(), 1);
    assert_eq!(view.undo_text(), Some("Resize column".to_string()));

    view.undo();
    assert_eq!(view.grid().columns.size_of(1), 100);
    assert_eq!(view.grid().columns.sizes().exception_count(), 0);
}

#[test]
fn test_resize_back_to_start_records_nothing() {
    let mut view = make_view(4, 4);
    view.press(238, HEADER_Y, Modifiers::NONE);
    view.drag(280, HEADER_Y).unwrap();
    assert!(!view.release(238, HEADER_Y));
    assert!(view.history().is_empty());
    assert_eq!(view.grid().columns.sizes().exception_count(), 0);
}

#[test]
fn test_resize_respects_minimum() {
    let mut view = make_view(4, 4);
    // bottom edge of row 0 is at y = 48
    view.press(HEADER_X, 47, Modifiers::NONE);
    view.release(HEADER_X, -100);
    assert_eq!(view.grid().rows.size_of(0), 8);
}

#[test]
fn test_reorder_gesture_moves_selected_columns() {
    let mut view = make_view(5, 3);
    view.press(col_x(0), HEADER_Y, Modifiers::NONE);
    view.release(col_x(0), HEADER_Y);
    view.press(col_x(1), HEADER_Y, Modifiers::SHIFT);
    view.release(col_x(1), HEADER_Y);
    assert_eq!(view.grid().selection.areas(), &[Area::new(0, 0, 1, 2)]);

    view.press(col_x(1), HEADER_Y, Modifiers::NONE);
    assert!(matches!(view.gesture(), Some(Gesture::Reorder(_))));
    assert_eq!(view.drop_position(), Err(ReorderError::NotActive));
    // past the middle of column 3: drop in front of column 4
    view.drag(col_x(3) + 10, HEADER_Y).unwrap();
    assert_eq!(view.drop_position(), Ok((Axis::Column, 4)));
    assert!(view.release(col_x(3) + 10, HEADER_Y));
    assert_eq!(view.drop_position(), Err(ReorderError::NotActive));

    assert_eq!(column_order(&view), vec![2, 3, 0, 1, 4]);
    assert_eq!(view.grid().selection.areas(), &[Area::new(2, 0, 3, 2)]);

    view.undo();
    assert_eq!(column_order(&view), vec![0, 1, 2, 3, 4]);
    assert_eq!(view.grid().selection.areas(), &[Area::new(0, 0, 1, 2)]);
}

#[test]
fn test_reorder_onto_itself_records_nothing() {
    let mut view = make_view(5, 3);
    view.press(col_x(2), HEADER_Y, Modifiers::NONE);
    view.release(col_x(2), HEADER_Y);
    view.press(col_x(2), HEADER_Y, Modifiers::NONE);
    assert!(!view.release(col_x(2) - 10, HEADER_Y));
    assert!(view.history().is_empty());
}

#[test]
fn test_reorder_refused_when_all_selected() {
    let mut view = make_view(3, 3);
    view.select_all();
    view.press(col_x(1), HEADER_Y, Modifiers::NONE);
    assert!(matches!(view.gesture(), Some(Gesture::HeaderPress { .. })));

    let err = view.drag(col_x(2), HEADER_Y).unwrap_err();
    assert_eq!(err, ReorderError::AllSelected(Axis::Column));
    assert_eq!(err.to_string(), "all columns selected, cannot reorder");
    assert!(view.gesture().is_none());
    assert!(!view.release(col_x(2), HEADER_Y));
    assert!(view.grid().selection.is_all());
    assert_eq!(column_order(&view), vec![0, 1, 2]);
}

#[test]
fn test_header_click_narrows_all_selection() {
    let mut view = make_view(3, 3);
    view.select_all();
    view.press(col_x(1), HEADER_Y, Modifiers::NONE);
    assert!(!view.release(col_x(1) + 20, HEADER_Y));

    assert!(!view.grid().selection.is_all());
    assert_eq!(view.grid().selection.areas(), &[Area::new(1, 0, 1, 2)]);
    assert!(view.gesture().is_none());
    assert!(view.history().is_empty());
}

#[test]
fn test_move_selected_rows() {
    let mut view = make_view(2, 5);
    assert_eq!(
        view.move_selected(Axis::Row, 0),
        Err(ReorderError::NothingSelected(Axis::Row))
    );
    view.grid_mut().selection.select_rows(3, 4, 2, false);
    assert_eq!(view.move_selected(Axis::Row, 0), Ok(true));
    assert_eq!(view.grid().rows.sizes().index_map().order(), vec![3, 4, 0, 1, 2]);
    assert_eq!(view.undo_text(), Some("Move 2 rows".to_string()));
}

// === Structural edits ===

#[test]
fn test_hide_selected_and_unhide_all() {
    let mut view = make_view(5, 5);
    view.move_select_to(1, 0, false);
    view.move_select_to(2, 4, true);
    assert!(view.hide_selected(Axis::Column));
    assert!(view.grid().columns.is_hidden(1));
    assert!(view.grid().columns.is_hidden(2));

    view.navigate(Direction::Right, false);
    assert_eq!(select(&view), Some((3, 4)));

    assert!(view.unhide_all(Axis::Column));
    assert!(!view.unhide_all(Axis::Column));
    view.undo();
    assert!(view.grid().columns.is_hidden(1));
    view.undo();
    assert!(!view.grid().columns.is_hidden(1));
}

#[test]
fn test_resize_selected_falls_back_to_focus() {
    let mut view = make_view(3, 3);
    view.move_select_to(2, 1, false);
    view.clear_selection();
    assert!(view.resize_selected(Axis::Row, 40));
    assert_eq!(view.grid().rows.size_of(1), 40);
    assert!(!view.resize_selected(Axis::Row, 40));
}

#[test]
fn test_zoom_steps_and_clamps() {
    let mut view = make_view(3, 3);
    assert!(view.set_zoom(2.0, 2.0));
    assert_eq!(view.grid().columns.pixels_of(0), 200);
    assert!(!view.set_zoom(2.0, 2.0));

    assert!(view.zoom_by(100.0));
    assert_eq!(view.grid().columns.zoom(), 10.0);

    view.undo();
    view.undo();
    assert_eq!(view.grid().rows.zoom(), 1.0);
}

#[test]
fn test_zoom_gesture_is_one_step() {
    let mut view = make_view(3, 3);
    view.zoom_gesture_start();
    view.zoom_gesture_update(1.5);
    view.zoom_gesture_update(3.0);
    assert_eq!(view.grid().rows.pixels_of(0), 72);
    assert!(view.zoom_gesture_end());
    assert_eq!(view.history().len(), 1);

    view.undo();
    assert_eq!(view.grid().rows.pixels_of(0), 24);
}

// === Data edits ===

#[test]
fn test_edit_commit_and_undo() {
    let mut view = make_view(3, 3);
    assert_eq!(view.begin_edit(), Err(EditError::NoFocus));

    view.move_select_to(1, 2, false);
    view.begin_edit().unwrap();
    assert_eq!(view.begin_edit(), Err(EditError::AlreadyEditing));
    view.edit_input(EditKey::Char('h'));
    view.edit_input(EditKey::Char('i'));
    assert_eq!(view.commit_edit(), Ok(true));
    assert!(!view.is_editing());
    assert_eq!(view.value_at(1, 2), Some("hi".to_string()));

    view.undo();
    assert_eq!(view.value_at(1, 2), None);
    view.redo();
    assert_eq!(view.value_at(1, 2), Some("hi".to_string()));
}

#[test]
fn test_edit_unchanged_records_nothing() {
    let mut view = make_view_with_data(vec![vec!["a"]]);
    view.move_select_to(0, 0, false);
    view.begin_edit().unwrap();
    assert_eq!(view.editor().map(|e| e.get_value()), Some(Some("a".to_string())));
    assert_eq!(view.commit_edit(), Ok(false));
    assert!(view.history().is_empty());
    assert_eq!(view.commit_edit(), Err(EditError::NotEditing));
}

#[test]
fn test_invalid_editor_value_keeps_editor_open() {
    let mut view = make_view(2, 2);
    view.editors_mut().register(0, || Box::new(NumberEditor::new()));
    view.move_select_to(0, 0, false);
    view.begin_edit().unwrap();
    view.edit_input(EditKey::Char('x'));
    assert!(matches!(view.commit_edit(), Err(EditError::Rejected(_))));
    assert!(view.is_editing());

    view.edit_input(EditKey::Backspace);
    view.edit_input(EditKey::Char('7'));
    assert_eq!(view.commit_edit(), Ok(true));
    assert_eq!(view.value_at(0, 0), Some("7".to_string()));
}

#[test]
fn test_set_value_follows_column_order() {
    let mut view = make_view_with_data(vec![vec!["a", "b", "c"]]);
    view.grid_mut().columns.move_positions(&[2], 0);
    assert_eq!(view.set_value(0, 0, Some("z".to_string())), Ok(true));
    assert_eq!(table::read(view.grid().data()).get_value(2, 0), Some("z".to_string()));
    assert_eq!(view.set_value(0, 0, Some("z".to_string())), Ok(false));
}

#[test]
fn test_set_value_rejected_by_data() {
    init_tracing();
    let data = MemTable::new(1, 1).with_validator(|_, _, v| match v {
        Some(s) if s.len() > 3 => Some("too long".to_string()),
        _ => None,
    });
    let mut view = TableView::new(table::share(data), GridConfig::default());
    assert_eq!(
        view.set_value(0, 0, Some("abcd".to_string())),
        Err(EditError::Rejected("too long".to_string()))
    );
    assert!(view.history().is_empty());
}

#[test]
fn test_delete_selection_and_undo() {
    let mut view = make_view_with_data(vec![vec!["a", "b"], vec!["c", "d"]]);
    view.move_select_to(0, 0, false);
    view.move_select_to(1, 0, true);
    assert!(view.delete_selection());
    assert_eq!(view.value_at(0, 0), None);
    assert_eq!(view.value_at(1, 0), None);
    assert_eq!(view.value_at(0, 1), Some("c".to_string()));
    assert!(!view.delete_selection());

    view.undo();
    assert_eq!(view.value_at(1, 0), Some("b".to_string()));
}

#[test]
fn test_modified_follows_clean_state() {
    let mut view = make_view(2, 2);
    assert!(!view.is_modified());
    view.set_value(0, 0, Some("x".to_string())).unwrap();
    assert!(view.is_modified());
    view.mark_saved();
    assert!(!view.is_modified());
    view.undo();
    assert!(view.is_modified());
    view.set_undo_index(1);
    assert!(!view.is_modified());
}

// === Table changes ===

#[test]
fn test_sync_counts_after_table_shrinks() {
    init_tracing();
    let mem = Arc::new(RwLock::new(MemTable::new(3, 10)));
    let shared: SharedTable = mem.clone();
    let mut view = TableView::new(shared, GridConfig::default());
    view.move_select_to(1, 2, false);
    view.move_select_to(2, 8, true);
    view.grid_mut().selection.add_area(Area::new(0, 7, 0, 9));

    mem.write().unwrap().delete_rows(5, 5);
    view.sync_counts();

    assert_eq!(view.grid().rows.count(), 5);
    assert_eq!(select(&view), Some((2, 4)));
    assert_eq!(focus(&view), Some((1, 2)));
    assert_eq!(view.grid().selection.areas(), &[Area::new(1, 2, 2, 4)]);

    mem.write().unwrap().set_column_count(1);
    view.sync_counts();

    assert_eq!(view.grid().columns.count(), 1);
    assert_eq!(select(&view), Some((0, 4)));
    assert_eq!(focus(&view), Some((0, 2)));
    assert!(view.grid().selection.areas().is_empty());
}

// === Copy ===

#[test]
fn test_copy_selection_in_background() {
    let mut view = make_view_with_data(vec![
        vec!["a", "b", "c"],
        vec!["d", "e", "f"],
    ]);
    view.move_select_to(1, 0, false);
    view.move_select_to(2, 1, true);
    view.copy_selection().unwrap();
    assert!(view.is_copying());

    match wait_for_copy(&mut view) {
        CopyEvent::Finished(text) => assert_eq!(text, "b\tc\ne\tf\n"),
        other => panic!("unexpected event {:?}", other),
    }
    assert!(!view.is_copying());
    assert!(view.copy_status().is_none());
}

#[test]
fn test_copy_refused_when_too_large() {
    init_tracing();
    let mut config = GridConfig::default();
    config.copy.max_cells = 3;
    let mut view = TableView::new(table::share(MemTable::new(2, 2)), config);
    view.select_all();
    let err = view.copy_selection().unwrap_err();
    assert!(matches!(err, CopyError::TooLarge { cells: 4, limit: 3 }));
    assert!(!view.is_copying());

    view.clear_selection();
    assert!(matches!(view.copy_selection(), Err(CopyError::NothingSelected)));
    assert!(!view.cancel_copy());
}
