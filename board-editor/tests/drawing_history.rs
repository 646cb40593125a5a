use board_core::CanvasSurface;
use board_editor::logging::try_init_for_tests;
use board_editor::{
    Canvas, FontWeight, HistoryManager, Shape, ShapeKind, ShapeTool, TableTool, TextStyle,
    TextTool, Tool,
};
use egui::{Color32, Pos2};

#[test]
fn shape_edits_undo_in_order() {
    try_init_for_tests();

    let mut canvas = Canvas::default();
    let mut history = HistoryManager::new();
    history.record_state(&canvas).unwrap();

    let tri = ShapeTool::new(ShapeKind::Triangle, Color32::BLACK, true)
        .commit(&mut canvas, &[])
        .unwrap();
    history.record_state(&canvas).unwrap();
    let after_insert = canvas.capture().unwrap();

    let copy = canvas.duplicate(tri).unwrap();
    history.record_state(&canvas).unwrap();

    canvas.remove(copy).unwrap();
    history.record_state(&canvas).unwrap();
    assert_eq!(canvas.capture().unwrap(), after_insert);

    // remove -> duplicate: four objects again
    history.undo(&mut canvas).unwrap();
    assert_eq!(canvas.len(), 4);

    // duplicate -> insert
    history.undo(&mut canvas).unwrap();
    assert_eq!(canvas.capture().unwrap(), after_insert);

    history.undo(&mut canvas).unwrap();
    assert!(canvas.is_empty());
    assert!(!history.can_undo());

    history.redo(&mut canvas).unwrap();
    history.redo(&mut canvas).unwrap();
    history.redo(&mut canvas).unwrap();
    assert_eq!(canvas.len(), 2);
    assert!(!history.can_redo());
}

#[test]
fn clear_is_an_undoable_edit() {
    try_init_for_tests();

    let mut canvas = Canvas::new(300.0, 200.0, Color32::YELLOW);
    let mut history = HistoryManager::new();

    ShapeTool::new(ShapeKind::Rectangle, Color32::RED, false)
        .commit(&mut canvas, &[Pos2::new(0.0, 30.0), Pos2::new(80.0, 90.0)])
        .unwrap();
    history.record_state(&canvas).unwrap();

    canvas.wipe();
    history.record_state(&canvas).unwrap();
    assert_eq!(canvas.background, Color32::WHITE);

    history.undo(&mut canvas).unwrap();
    assert_eq!(canvas.background, Color32::YELLOW);
    assert_eq!(canvas.len(), 2);
}

#[test]
fn table_cells_and_text_style_undo_one_edit_at_a_time() {
    try_init_for_tests();

    let mut canvas = Canvas::default();
    let mut history = HistoryManager::new();

    let table = TableTool::new(2, 2).commit(&mut canvas, &[]).unwrap();
    let title = TextTool::new("Budget", 20.0, Color32::BLACK)
        .commit(&mut canvas, &[Pos2::new(150.0, 60.0)])
        .unwrap();
    history.record_state(&canvas).unwrap();

    canvas.edit_cell(table, 0, 1, "42").unwrap();
    history.record_state(&canvas).unwrap();
    canvas
        .set_text_style(title, TextStyle::Weight(FontWeight::Bold))
        .unwrap();
    history.record_state(&canvas).unwrap();

    history.undo(&mut canvas).unwrap();
    match &canvas.object(title).unwrap().shape {
        Shape::Text { font_weight, .. } => assert_eq!(*font_weight, FontWeight::Normal),
        other => panic!("expected text, got {:?}", other),
    }
    match &canvas.object(table).unwrap().shape {
        Shape::Table { cells, .. } => assert_eq!(cells[1], "42"),
        other => panic!("expected a table, got {:?}", other),
    }

    history.undo(&mut canvas).unwrap();
    match &canvas.object(table).unwrap().shape {
        Shape::Table { cells, .. } => assert!(cells.iter().all(String::is_empty)),
        other => panic!("expected a table, got {:?}", other),
    }
}
