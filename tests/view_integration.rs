//! End-to-end exercises of the public surface: a departures-board style
//! setup where each plane view only shows manifests in an "open" status,
//! driven entirely through source mutations.

use serde_json::json;
use siftz::{Filter, FilteredView, Options, Record, Source, SourceEvent, ViewEvent};
use std::cell::RefCell;
use std::rc::Rc;

fn manifest(name: &str, status: &str) -> Record {
    Record::with_attrs([("name", json!(name)), ("status", json!(status))])
}

fn open_filter() -> Filter<Record> {
    Filter::custom(|m: &Record, _pos| {
        matches!(m.str_attr("status").as_deref(), Some("scheduled") | Some("manifest"))
    })
}

fn names(view: &FilteredView<Record>) -> Vec<String> {
    view.items()
        .iter()
        .map(|m| m.str_attr("name").unwrap())
        .collect()
}

fn tape(view: &FilteredView<Record>) -> Rc<RefCell<Vec<String>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    view.subscribe(move |event| {
        let line = match event {
            ViewEvent::Inserted { entity, at } => {
                format!("+{}@{}", entity.str_attr("name").unwrap(), at)
            }
            ViewEvent::Removed { entity, at } => {
                format!("-{}@{}", entity.str_attr("name").unwrap(), at)
            }
            other => other.kind().to_string(),
        };
        sink.borrow_mut().push(line);
    });
    seen
}

#[test]
fn board_follows_status_changes() {
    let source = Rc::new(Source::with_items([
        manifest("AM-101", "scheduled"),
        manifest("AM-102", "departed"),
        manifest("AM-103", "manifest"),
    ]));
    let board = FilteredView::new(&source, open_filter());
    assert_eq!(names(&board), ["AM-101", "AM-103"]);

    let seen = tape(&board);

    // A departure closes a manifest: it leaves the board.
    let closing = source.get(0).unwrap();
    closing.set("status", json!("departed"));
    source.touch(&closing, Options::notify()).unwrap();
    assert_eq!(names(&board), ["AM-103"]);

    // A new scheduled manifest lands mid-list.
    source
        .insert_at(1, manifest("AM-104", "scheduled"), Options::notify())
        .unwrap();
    assert_eq!(names(&board), ["AM-104", "AM-103"]);

    assert_eq!(
        *seen.borrow(),
        ["-AM-101@0", "settled", "+AM-104@0", "settled"]
    );
}

#[test]
fn board_reorders_with_the_source() {
    let source = Rc::new(Source::with_items([
        manifest("AM-201", "scheduled"),
        manifest("AM-202", "scheduled"),
        manifest("AM-203", "departed"),
    ]));
    let board = FilteredView::new(&source, open_filter());
    let seen = tape(&board);

    source.sort_by(
        |a, b| b.str_attr("name").cmp(&a.str_attr("name")),
        Options::notify(),
    );

    assert_eq!(names(&board), ["AM-202", "AM-201"]);
    assert_eq!(*seen.borrow(), ["resort", "settled"]);
}

#[test]
fn swapping_the_board_filter_announces_each_move() {
    let source = Rc::new(Source::with_items([
        manifest("AM-301", "scheduled"),
        manifest("AM-302", "departed"),
    ]));
    let board = FilteredView::new(&source, open_filter());
    let seen = tape(&board);

    // Flip the board to show closed manifests instead.
    board.set_filter(
        Filter::custom(|m: &Record, _| m.str_attr("status").as_deref() == Some("departed")),
        Options::notify(),
    );

    assert_eq!(names(&board), ["AM-302"]);
    assert_eq!(*seen.borrow(), ["-AM-301@0", "+AM-302@0", "settled"]);
}

#[test]
fn silent_reload_with_one_explicit_settle() {
    let source = Rc::new(Source::new());
    let board = FilteredView::new(&source, open_filter());
    let seen = tape(&board);

    source.reset(
        [
            manifest("AM-401", "scheduled"),
            manifest("AM-402", "departed"),
            manifest("AM-403", "manifest"),
        ],
        Options::silent(),
    );
    assert!(seen.borrow().is_empty());
    board.settle();

    assert_eq!(names(&board), ["AM-401", "AM-403"]);
    assert_eq!(*seen.borrow(), ["settled"]);
}

#[test]
fn views_are_read_only_and_say_so() {
    let source = Rc::new(Source::with_items([manifest("AM-501", "scheduled")]));
    let board = FilteredView::new(&source, open_filter());

    let err = board.reset().unwrap_err();
    assert!(err.to_string().contains("read-only"));
    assert!(err.to_string().contains("source"));
    assert_eq!(board.len(), 1);
}

#[test]
fn custom_source_observers_ride_along_with_views() {
    // A consumer can watch the raw source and a view of it at once; the
    // vocabularies line up event for event.
    let source: Rc<Source<Record>> = Rc::new(Source::new());
    let raw = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&raw);
    source.subscribe(move |_, event: &SourceEvent<Record>, _| {
        sink.borrow_mut().push(event.kind().to_string());
    });
    let board = FilteredView::all(&source);

    let a = source.push(manifest("AM-601", "scheduled"));
    source.touch(&a, Options::notify()).unwrap();
    source.remove(&a, Options::notify()).unwrap();

    assert_eq!(*raw.borrow(), ["insert", "change", "remove"]);
    assert!(board.is_empty());
}
