use super::*;
use dynlist_core::VisibilityRange;

fn spec() -> DynamicListSpec {
    DynamicListSpec::default().page_size(5).branch(3).padding(0.0)
}

#[test]
fn mount_windows_rows_near_the_viewport() {
    let mut rule = ListTestRule::new(spec(), (0..30u32).collect(), true).expect("valid spec");
    rule.mount().expect("mount");

    assert_eq!(rule.list().visibility(), VisibilityRange::new(0, 9));
    assert_eq!(rule.mounted_rows(), (0..11).collect::<Vec<_>>());
    assert_eq!(rule.loader().calls(), 0);
    assert!(rule.observer().observed_count() > 0);

    let covered = rule.rendered().map(RenderedList::covered_len);
    assert_eq!(covered, Some(35), "collapsed subtrees keep their space");
}

#[test]
fn missing_observer_materializes_everything() {
    let mut rule =
        ListTestRule::without_observer(spec(), (0..30u32).collect(), true).expect("valid spec");
    rule.mount().expect("mount");

    assert_eq!(rule.mounted_rows(), (0..30).collect::<Vec<_>>());
    assert_eq!(rule.observer().observed_count(), 0);
    assert!(!rule.list().tracker().is_observing());
}

#[test]
fn unmount_releases_observations() {
    let mut rule = ListTestRule::new(spec(), (0..30u32).collect(), true).expect("valid spec");
    rule.mount().expect("mount");
    rule.unmount();

    assert_eq!(rule.observer().observed_count(), 0);
    assert_eq!(rule.list().tracker().registered_count(), 0);
    assert!(!rule.list().is_mounted());
}
