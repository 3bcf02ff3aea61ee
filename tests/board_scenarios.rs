//! End-to-end board scenarios through the public API
//!
//! These tests exercise the board, graph and drag controller together the
//! way the TUI does: build a board from its wire config, drag bars around,
//! commit the released proposals and observe the derived grid.

use chrono::{NaiveDate, NaiveDateTime};

use gantt_cli::domain::{
    day_start, BoardEvent, DependencyGraph, PlacementIssue, Row, RowUpdate,
};
use gantt_cli::{Board, BoardConfig, BoardError, DragController, DragIntent, DragKind, HitTarget, Point, TaskSpec};

const CELL: f64 = 30.0;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
    day_start(date(y, m, d))
}

fn task(id: &str, start: NaiveDateTime, end: NaiveDateTime, deps: &[&str]) -> TaskSpec {
    TaskSpec {
        id: id.to_string(),
        start_date: Some(start),
        end_date: Some(end),
        dependencies: deps.iter().map(|d| d.to_string()).collect(),
        ..TaskSpec::default()
    }
}

/// Two-task board: "a" on days 0-2, "b" on days 5-8 depending on "a"
fn sample_board() -> Board {
    Board::new(BoardConfig {
        tasks: vec![
            task("a", dt(2024, 5, 1), dt(2024, 5, 3), &[]),
            task("b", dt(2024, 5, 6), dt(2024, 5, 9), &["a"]),
        ],
        ..BoardConfig::default()
    })
    .unwrap()
}

fn controller() -> DragController {
    // Same cell metrics the sample board renders with
    DragController::new(CELL, 20.0)
}

#[test]
fn drag_move_commits_through_the_board() {
    let mut board = sample_board();
    let mut drag = controller();

    // Grab the middle of "b" (row 1, x 150..240) and pull it two cells left
    let grab = Point::new(200.0, 30.0);
    let target = drag.hit_test(&board, grab);
    assert_eq!(
        target,
        HitTarget::Task {
            id: "b".to_string(),
            kind: DragKind::Move,
        }
    );

    drag.pointer_down(&board, grab, target, false);
    assert!(drag.pointer_move(Point::new(200.0 - 2.0 * CELL, 30.0)));

    let intents = drag.pointer_up(&board);
    assert_eq!(
        intents,
        vec![DragIntent::OffsetProposed {
            task_id: "b".to_string(),
            offset: 3,
            reference_date: date(2024, 5, 1),
        }]
    );

    // Committing the proposal moves the task, span preserved
    for intent in intents {
        let DragIntent::OffsetProposed {
            task_id,
            offset,
            reference_date,
        } = intent
        else {
            panic!("expected an offset proposal");
        };
        board
            .update_row(RowUpdate {
                id: task_id,
                offset: Some(offset),
                span: None,
                reference_date,
            })
            .unwrap();
    }

    let b = board.get_task("b").unwrap();
    assert_eq!(b.start_date(), Some(dt(2024, 5, 4)));
    assert_eq!(b.end_date(), Some(dt(2024, 5, 7)));
    assert_eq!(
        board.rows(),
        vec![
            Row {
                id: "a".to_string(),
                offset: 0,
                span: 2,
                metadata: Default::default(),
            },
            Row {
                id: "b".to_string(),
                offset: 3,
                span: 3,
                metadata: Default::default(),
            },
        ]
    );
}

#[test]
fn drag_resize_right_grows_the_grid() {
    let mut board = sample_board();
    let mut drag = controller();

    // The last few pixels of the bar are the right resize handle
    let grab = Point::new(236.0, 30.0);
    let target = drag.hit_test(&board, grab);
    assert_eq!(
        target,
        HitTarget::Task {
            id: "b".to_string(),
            kind: DragKind::ResizeRight,
        }
    );

    drag.pointer_down(&board, grab, target, false);
    // 1.5 cells right rounds to a 2-day growth
    drag.pointer_move(Point::new(236.0 + 1.5 * CELL, 30.0));

    let intents = drag.pointer_up(&board);
    assert_eq!(
        intents,
        vec![DragIntent::SpanProposed {
            task_id: "b".to_string(),
            span: 5,
            reference_date: date(2024, 5, 1),
        }]
    );

    board
        .update_row(RowUpdate {
            id: "b".to_string(),
            offset: None,
            span: Some(5),
            reference_date: date(2024, 5, 1),
        })
        .unwrap();

    assert_eq!(board.get_task("b").unwrap().end_date(), Some(dt(2024, 5, 11)));
    assert_eq!(board.num_cols(), 11);
}

#[test]
fn rubber_band_sweep_selects_enclosed_tasks() {
    let board = sample_board();
    let mut drag = controller();

    drag.pointer_down(&board, Point::new(300.0, 50.0), HitTarget::Grid, false);
    drag.pointer_move(Point::new(-10.0, -5.0));
    let intents = drag.pointer_up(&board);

    assert!(intents.is_empty());
    let mut selected = drag.selected().to_vec();
    selected.sort();
    assert_eq!(selected, ["a", "b"]);

    // A sweep over empty grid leaves the selection alone
    drag.pointer_down(&board, Point::new(500.0, 200.0), HitTarget::Grid, true);
    drag.pointer_move(Point::new(510.0, 210.0));
    drag.pointer_up(&board);
    assert_eq!(drag.selected().len(), 2);
}

#[test]
fn conflicting_dependency_is_reported() {
    // "2" depends on "1", but "1" ends a day later than "2"
    let board = Board::new(BoardConfig {
        tasks: vec![
            task("1", dt(2020, 1, 1), dt(2020, 1, 3), &[]),
            task("2", dt(2020, 1, 1), dt(2020, 1, 2), &["1"]),
        ],
        ..BoardConfig::default()
    })
    .unwrap();

    let placements = board.invalid_placements();
    assert_eq!(placements.len(), 1);
    assert_eq!(placements[0].reason, PlacementIssue::DateConflict);
    assert_eq!(placements[0].source.id(), "2");
    assert_eq!(placements[0].dependency.unwrap().id(), "1");
}

#[test]
fn duplicate_id_is_rejected_without_side_effects() {
    let mut board = sample_board();
    let err = board
        .add_task(task("a", dt(2024, 6, 1), dt(2024, 6, 2), &[]))
        .unwrap_err();

    assert!(matches!(err, BoardError::DuplicateId(id) if id == "a"));
    assert_eq!(board.num_rows(), 2);
    assert_eq!(board.get_task("a").unwrap().start_date(), Some(dt(2024, 5, 1)));
}

#[test]
fn update_row_fans_out_date_events() {
    let mut board = sample_board();
    let events = board.subscribe();

    board
        .update_row(RowUpdate {
            id: "a".to_string(),
            offset: Some(2),
            span: None,
            reference_date: date(2024, 5, 1),
        })
        .unwrap();

    let received: Vec<BoardEvent> = events.try_iter().collect();
    assert_eq!(
        received,
        vec![
            BoardEvent::TaskStartDateChanged {
                id: "a".to_string(),
                prev: Some(dt(2024, 5, 1)),
                new: Some(dt(2024, 5, 3)),
            },
            BoardEvent::TaskFlooredStartDateChanged {
                id: "a".to_string(),
                prev: Some(date(2024, 5, 1)),
                new: Some(date(2024, 5, 3)),
            },
            BoardEvent::TaskEndDateChanged {
                id: "a".to_string(),
                prev: Some(dt(2024, 5, 3)),
                new: Some(dt(2024, 5, 5)),
            },
            BoardEvent::TaskFlooredEndDateChanged {
                id: "a".to_string(),
                prev: Some(date(2024, 5, 3)),
                new: Some(date(2024, 5, 5)),
            },
        ]
    );
}

#[test]
fn graph_survives_its_wire_form() {
    let mut graph = DependencyGraph::new();
    graph.add_vertex("a");
    graph.add_vertex("b");
    graph.add_vertex("c");
    graph.add_edge("b", "a").unwrap();
    graph.add_edge("c", "b").unwrap();
    graph.add_edge("c", "ghost").unwrap(); // dangling heads are allowed

    let wire = graph.to_string();
    let parsed: DependencyGraph = serde_json::from_str(&wire).unwrap();

    assert_eq!(parsed, graph);
    assert_eq!(parsed.heads("c"), ["b", "ghost"]);

    // Dangling heads don't break ordering
    let order = parsed.topological_order().unwrap();
    let pos = |id: &str| order.iter().position(|o| o == id).unwrap();
    assert!(pos("a") < pos("b"));
    assert!(pos("b") < pos("c"));
}

#[test]
fn dateless_board_has_no_grid() {
    let board = Board::new(BoardConfig {
        tasks: vec![TaskSpec {
            id: "someday".to_string(),
            ..TaskSpec::default()
        }],
        ..BoardConfig::default()
    })
    .unwrap();

    assert_eq!(board.num_rows(), 1);
    assert_eq!(board.num_cols(), 0);
    assert!(board.rows().is_empty());
    assert_eq!(board.min_date(), None);
}
