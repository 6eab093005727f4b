use dynlist_core::{DynamicListSpec, ListError, Slot, SlotKey};
use dynlist_testing::ListTestRule;

fn spec() -> DynamicListSpec {
    DynamicListSpec::default().page_size(5).branch(3).padding(0.0)
}

fn mounted(rows: u32, has_more: bool) -> ListTestRule<u32> {
    let mut rule = ListTestRule::new(spec(), (0..rows).collect(), has_more).expect("valid spec");
    rule.mount().expect("mount");
    rule
}

#[test]
fn frontier_on_screen_loads_the_next_page_and_growth_finishes_the_list() {
    let mut rule = mounted(10, true);
    assert_eq!(rule.list().root_size(), 9);
    assert_eq!(rule.loader().calls(), 1, "row 9 is on screen at mount");
    assert!(rule.list().is_loading_more());

    let row_five = rule.container().handle_for(SlotKey::Row(5));
    assert!(row_five.is_some());

    rule.resolve_page(10..15, false).expect("resolve");
    assert!(rule.list().is_done());
    assert!(!rule.list().is_loading_more());
    assert_eq!(rule.list().rendered_len(), 15);
    assert_eq!(rule.loader().calls(), 1);

    let rendered = rule.rendered().expect("rendered");
    assert!(!rendered.slots.iter().any(Slot::is_loading));
    assert_eq!(rendered.covered_len(), 15);
    assert_eq!(
        rule.container().handle_for(SlotKey::Row(5)),
        row_five,
        "growth keeps mounted rows"
    );
}

#[test]
fn scrolling_to_the_end_loads_once() {
    let mut rule = mounted(30, true);
    assert_eq!(rule.loader().calls(), 0);

    rule.scroll_to_end().expect("scroll");
    assert_eq!(rule.loader().calls(), 1);
    assert!(rule.mounted_rows().contains(&29));

    rule.scroll_to(0.0).expect("scroll");
    rule.scroll_to_end().expect("scroll");
    assert_eq!(rule.loader().calls(), 1, "single flight while outstanding");
    assert_eq!(rule.loader().outstanding(), 1);

    rule.resolve_page(30..40, false).expect("resolve");
    assert!(rule.list().is_done());
    let mounted = rule.mounted_rows();
    assert!((30..35).all(|index| mounted.contains(&index)), "{mounted:?}");
    assert_eq!(rule.rendered().map(|out| out.covered_len()), Some(40));
}

#[test]
fn content_height_is_preserved_while_scrolling() {
    let mut rule = mounted(30, true);
    let height = rule.container().content_height();
    for row in [5, 12, 20, 3] {
        rule.scroll_to_row(row).expect("scroll");
        assert_eq!(rule.container().content_height(), height);
    }
}

#[test]
fn empty_state_appears_only_once_loading_is_done() {
    let done = mounted(0, false);
    let rendered = done.rendered().expect("rendered");
    assert!(rendered.empty_state);
    assert_eq!(rendered.empty.as_deref(), Some("empty"));
    assert_eq!(done.loader().calls(), 0);

    let mut pending = mounted(0, true);
    let rendered = pending.rendered().expect("rendered");
    assert!(!rendered.empty_state);
    assert_eq!(pending.loader().calls(), 1, "frontier slots are on screen");

    pending.resolve_page(Vec::new(), false).expect("resolve");
    let rendered = pending.rendered().expect("rendered");
    assert!(rendered.empty_state);
    assert!(rendered.slots.is_empty());
}

#[test]
fn load_failure_surfaces_until_reset() {
    let mut rule = mounted(10, true);
    assert_eq!(rule.loader().calls(), 1);

    match rule.fail_page("offline") {
        Err(ListError::LoadFailed(err)) => assert_eq!(err.to_string(), "offline"),
        other => panic!("expected a load failure, got {other:?}"),
    }
    assert!(rule.pump_until_idle().is_err(), "raised again on the next render");
    assert!(!rule.list().is_loading_more());

    let cleared = rule.list_mut().reset_error();
    assert!(cleared.is_some());
    rule.pump_until_idle().expect("recovered");
    assert_eq!(rule.loader().calls(), 2);
}

#[test]
fn failure_after_the_frontier_moved_is_dropped() {
    let mut rule = mounted(10, true);
    assert_eq!(rule.loader().calls(), 1);

    rule.scroll_to_row(3).expect("scroll");
    assert!(rule.list().visibility().max() > Some(9));
    assert_eq!(rule.loader().calls(), 1, "single flight while outstanding");

    rule.fail_page("stale").expect("a superseded failure is not raised");
    assert!(rule.list().error().is_none());
    assert!(!rule.list().is_loading_more());

    rule.set_rows((0..11).collect()).expect("rows");
    assert_eq!(rule.loader().calls(), 2, "paging resumes on the next change");
}

#[test]
fn results_after_unmount_are_ignored() {
    let mut rule = mounted(30, true);
    rule.scroll_to_end().expect("scroll");
    rule.unmount();

    rule.fail_page("late").expect("nothing is rendered after unmount");
    assert!(rule.list().error().is_none());
    assert!(!rule.list().is_loading_more());
    assert_eq!(rule.observer().observed_count(), 0);
}

#[test]
fn visibility_notifications_carry_observed_bounds_only() {
    let mut rule = mounted(30, true);
    rule.scroll_to_row(6).expect("scroll");
    rule.scroll_to_row(14).expect("scroll");

    let log = rule.loader().visibility_log();
    assert_eq!(log.first(), Some(&(0, 9)));
    assert!(log.len() >= 2);
    assert!(log.iter().all(|(min, max)| min <= max));
}
