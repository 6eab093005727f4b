use super::*;

fn rows(range: std::ops::Range<usize>) -> Vec<Slot<()>> {
    range.map(|index| Slot::Row { index, content: None }).collect()
}

#[test]
fn mount_reuses_handles_by_key() {
    let container = FakeContainer::new(10.0);
    let first = container.mount(&rows(0..3));
    assert_eq!(first, MountStats { reused: 0, created: 3, removed: 0 });
    let row_one = container.handle_for(SlotKey::Row(1)).expect("mounted");

    let mut slots = rows(1..3);
    slots.push(Slot::Dummy { offset: 3, span: 6, content: None });
    let second = container.mount(&slots);
    assert_eq!(second, MountStats { reused: 2, created: 1, removed: 1 });
    assert_eq!(container.handle_for(SlotKey::Row(1)), Some(row_one));
    assert_eq!(container.child_at(0), Some(row_one));
    assert_eq!(container.handle_for(SlotKey::Row(0)), None);
}

#[test]
fn children_are_laid_out_by_span() {
    let container = FakeContainer::new(10.0);
    let slots: Vec<Slot<()>> = vec![
        Slot::Dummy { offset: 0, span: 3, content: None },
        Slot::Row { index: 3, content: None },
    ];
    container.mount(&slots);
    let row = container.handle_for(SlotKey::Row(3)).expect("mounted");
    assert_eq!(container.bounds_of(row), Some((30.0, 40.0)));
    assert_eq!(container.content_height(), 40.0);
}

#[test]
fn cleared_children_are_disconnected() {
    let container = FakeContainer::new(10.0);
    container.mount(&rows(0..2));
    let handle = container.child_at(0).expect("mounted");
    assert!(container.is_connected(handle));

    container.clear();
    assert!(!container.is_connected(handle));
    assert_eq!(container.child_count(), 0);
    assert_eq!(container.bounds_of(handle), None);
}
