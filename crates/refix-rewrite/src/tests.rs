use refix_errors::FixError;
use refix_tree::SyntaxKind::*;
use refix_tree::{NodeId, SyntaxTree};
use rstest::rstest;

use crate::{EventKind, EventRecorder, Merge, RewriteEvent, merge};

const PARENT: NodeId = NodeId::new(1);
const X: NodeId = NodeId::new(10);
const Y: NodeId = NodeId::new(11);
const Z: NodeId = NodeId::new(12);

fn insert(new: NodeId) -> RewriteEvent {
    RewriteEvent::insert(PARENT, 0, new)
}

fn replace(old: NodeId, new: NodeId) -> RewriteEvent {
    RewriteEvent::replace(PARENT, 0, old, new)
}

fn remove(old: NodeId) -> RewriteEvent {
    RewriteEvent::remove(PARENT, 0, old)
}

#[rstest]
#[case::insert_then_insert(insert(X), insert(Y), Some(Merge::KeepBoth))]
#[case::insert_then_replace(insert(X), replace(X, Y), Some(Merge::Replace(insert(Y))))]
#[case::insert_then_remove(insert(X), remove(X), Some(Merge::Cancel))]
#[case::replace_then_insert(replace(X, Y), insert(Z), Some(Merge::KeepBoth))]
#[case::replace_then_replace(replace(X, Y), replace(Y, Z), Some(Merge::Replace(replace(X, Z))))]
#[case::replace_then_remove(replace(X, Y), remove(Y), Some(Merge::Replace(remove(X))))]
#[case::remove_then_insert(remove(X), insert(Y), Some(Merge::Replace(replace(X, Y))))]
#[case::remove_then_replace(remove(X), replace(X, Y), None)]
#[case::remove_then_remove(remove(X), remove(X), None)]
#[case::replace_of_a_stale_child(replace(X, Y), replace(X, Z), None)]
#[case::remove_of_a_stale_child(insert(X), remove(Y), None)]
fn merge_transitions(
    #[case] old: RewriteEvent,
    #[case] new: RewriteEvent,
    #[case] expected: Option<Merge>,
) {
    match (merge(&old, &new), expected) {
        (Ok(merged), Some(expected)) => assert_eq!(merged, expected),
        (Err(FixError::InvalidMergeTransition { index: 0, .. }), None) => {}
        (actual, expected) => panic!("{old:?} then {new:?}: got {actual:?}, expected {expected:?}"),
    }
}

fn field_tree() -> (SyntaxTree, NodeId) {
    let tree = refix_lang::parse("class A { int a, b, c; }").into_tree();
    let field = tree.preorder(tree.root()).find(|&node| tree.kind(node) == FIELD_DECL).unwrap();
    (tree, field)
}

fn kinds(recorder: &EventRecorder, parent: NodeId) -> Vec<Option<EventKind>> {
    recorder.slots(parent).unwrap().iter().map(|slot| slot.map(|event| event.kind)).collect()
}

#[test]
fn replacing_an_inserted_child_stays_an_insert() {
    let (mut tree, field) = field_tree();
    let mut recorder = EventRecorder::new();
    let first = tree.new_node(VARIABLE_DECLARATOR);
    let second = tree.new_node(VARIABLE_DECLARATOR);

    recorder.record(&tree, RewriteEvent::insert(field, 1, first)).unwrap();
    tree.insert_child(field, 1, first).unwrap();
    recorder.record(&tree, RewriteEvent::replace(field, 1, first, second)).unwrap();
    tree.replace_child(field, 1, second).unwrap();

    let slots = recorder.slots(field).unwrap();
    assert_eq!(slots.len(), 5);
    assert_eq!(slots[1], Some(RewriteEvent::insert(field, 1, second)));
    assert!(slots.iter().enumerate().all(|(position, slot)| position == 1 || slot.is_none()));
}

#[test]
fn insert_into_a_removed_slot_becomes_a_replace() {
    let (mut tree, field) = field_tree();
    let mut recorder = EventRecorder::new();
    let b = tree.children(field)[2];
    let fresh = tree.new_node(VARIABLE_DECLARATOR);

    recorder.record(&tree, RewriteEvent::remove(field, 2, b)).unwrap();
    tree.remove_child(field, 2).unwrap();
    recorder.record(&tree, RewriteEvent::insert(field, 2, fresh)).unwrap();
    tree.insert_child(field, 2, fresh).unwrap();

    assert_eq!(recorder.slots(field).unwrap()[2], Some(RewriteEvent::replace(field, 2, b, fresh)));
    assert_eq!(kinds(&recorder, field), [None, None, Some(EventKind::Replace), None]);
}

#[test]
fn removing_a_child_twice_is_rejected() {
    let (mut tree, field) = field_tree();
    let mut recorder = EventRecorder::new();
    let b = tree.children(field)[2];

    recorder.record(&tree, RewriteEvent::remove(field, 2, b)).unwrap();
    tree.remove_child(field, 2).unwrap();
    let error = recorder.record(&tree, RewriteEvent::remove(field, 2, b)).unwrap_err();

    assert!(matches!(error, FixError::InvalidMergeTransition { .. }), "{error}");
    assert_eq!(kinds(&recorder, field), [None, None, Some(EventKind::Remove), None]);
}

#[test]
fn malformed_edits_record_nothing() {
    let (tree, field) = field_tree();
    let mut recorder = EventRecorder::new();
    let b = tree.children(field)[2];

    let errors = [
        RewriteEvent::remove(field, 9, b),
        RewriteEvent::remove(field, 1, b),
        RewriteEvent::insert(field, 5, b),
        RewriteEvent { kind: EventKind::Replace, new: None, ..RewriteEvent::remove(field, 2, b) },
    ]
    .map(|event| recorder.record(&tree, event).unwrap_err().to_string());

    assert_eq!(
        errors,
        [
            "malformed edit: child index 9 out of bounds for 4 children".to_owned(),
            format!("malformed edit: child 1 is {:?}, not {b:?}", tree.children(field)[1]),
            "malformed edit: insert index 5 out of bounds for 4 children".to_owned(),
            "malformed edit: Replace is missing its nodes".to_owned(),
        ]
    );
    assert!(recorder.is_empty());
}

#[test]
fn inserts_at_the_same_index_keep_both() {
    let (mut tree, field) = field_tree();
    let mut recorder = EventRecorder::new();
    let first = tree.new_node(VARIABLE_DECLARATOR);
    let second = tree.new_node(VARIABLE_DECLARATOR);

    for node in [first, second] {
        recorder.record(&tree, RewriteEvent::insert(field, 1, node)).unwrap();
        tree.insert_child(field, 1, node).unwrap();
    }

    let slots = recorder.slots(field).unwrap();
    assert_eq!(slots[1].and_then(|event| event.new), Some(second));
    assert_eq!(slots[2].and_then(|event| event.new), Some(first));
    assert_eq!(slots.len(), tree.children(field).len());
}

#[test]
fn insert_then_remove_cancels_out() {
    let (mut tree, field) = field_tree();
    let mut recorder = EventRecorder::new();
    let fresh = tree.new_node(VARIABLE_DECLARATOR);

    recorder.record(&tree, RewriteEvent::insert(field, 3, fresh)).unwrap();
    tree.insert_child(field, 3, fresh).unwrap();
    recorder.record(&tree, RewriteEvent::remove(field, 3, fresh)).unwrap();
    tree.remove_child(field, 3).unwrap();

    assert_eq!(kinds(&recorder, field), [None; 4]);
}

#[test]
fn sessions_are_send() {
    fn assert_send<T: Send>() {}
    assert_send::<crate::FixSession<'static>>();
}
