use super::*;
use crate::observation::Container;
use crate::runtime::TestRuntime;
use crate::window_tree::Slot;

#[derive(Default)]
struct FakeContainer {
    children: RefCell<Vec<ElementHandle>>,
}

impl FakeContainer {
    fn with_children(count: u64) -> Rc<Self> {
        let container = Rc::new(Self::default());
        container.replace((0..count).map(handle).collect());
        container
    }

    fn replace(&self, children: Vec<ElementHandle>) {
        *self.children.borrow_mut() = children;
    }
}

impl Container for FakeContainer {
    fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    fn child_at(&self, position: usize) -> Option<ElementHandle> {
        self.children.borrow().get(position).copied()
    }

    fn is_connected(&self, element: ElementHandle) -> bool {
        self.children.borrow().contains(&element)
    }
}

#[derive(Default)]
struct FakeObserver {
    observed: RefCell<Vec<ElementHandle>>,
    unobserved: RefCell<Vec<ElementHandle>>,
}

impl VisibilityObserver for FakeObserver {
    fn observe(&self, element: ElementHandle) {
        self.observed.borrow_mut().push(element);
    }

    fn unobserve(&self, element: ElementHandle) {
        self.unobserved.borrow_mut().push(element);
    }
}

struct FakePlatform(Rc<FakeObserver>);

impl ObserverPlatform for FakePlatform {
    fn create_observer(&self, _options: &ObserverOptions) -> Option<Rc<dyn VisibilityObserver>> {
        let observer: Rc<dyn VisibilityObserver> = self.0.clone();
        Some(observer)
    }
}

struct Fixture {
    runtime: TestRuntime,
    container: Rc<FakeContainer>,
    observer: Rc<FakeObserver>,
    tracker: VisibilityTracker,
}

fn handle(raw: u64) -> ElementHandle {
    ElementHandle::new(100 + raw)
}

fn fixture(children: u64, branch: usize) -> Fixture {
    let runtime = TestRuntime::new();
    let container = FakeContainer::with_children(children);
    let observer = Rc::new(FakeObserver::default());
    let platform = FakePlatform(observer.clone());
    let tracker = VisibilityTracker::observed(
        Some(&platform),
        &ObserverOptions::with_margin(400.0),
        ContainerRef::attached(container.clone()),
        branch,
        runtime.handle(),
    );
    Fixture {
        runtime,
        container,
        observer,
        tracker,
    }
}

fn entries(visible: &[u64], hidden: &[u64]) -> Vec<ObservationEntry> {
    visible
        .iter()
        .map(|&raw| ObservationEntry::new(handle(raw), true))
        .chain(hidden.iter().map(|&raw| ObservationEntry::new(handle(raw), false)))
        .collect()
}

#[test]
fn unobserved_range_treats_everything_as_visible() {
    let fx = fixture(0, 5);
    assert!(!fx.tracker.range().is_observed());
    assert!(fx.tracker.is_visible(0, 625));
    assert!(fx.tracker.is_visible(10_000, 10_001));
}

#[test]
fn observed_range_allows_one_index_of_slack() {
    let range = VisibilityRange::new(3, 7);
    assert!(range.is_near(2, 8));
    assert!(range.is_near(8, 9), "row right after max is prefetched");
    assert!(range.is_near(0, 2), "range ending right before min is prefetched");
    assert!(!range.is_near(10, 12));
    assert!(!range.is_near(0, 1));

    let fx = fixture(0, 5);
    assert!(fx.tracker.set_range(range));
    assert!(!fx.tracker.set_range(range), "same range is not a change");
    assert!(fx.tracker.is_visible(2, 8));
    assert!(!fx.tracker.is_visible(10, 12));
}

#[test]
fn range_at_zero_does_not_underflow() {
    let range = VisibilityRange::new(0, 0);
    assert!(range.is_near(0, 1));
    assert!(range.is_near(1, 2));
    assert!(!range.is_near(2, 3));
}

#[test]
fn custom_check_is_used_verbatim() {
    let runtime = TestRuntime::new();
    let container = FakeContainer::with_children(10);
    let tracker = VisibilityTracker::with_check(
        Rc::new(|start: usize, _end: usize| start % 2 == 0),
        ContainerRef::attached(container),
        5,
        runtime.handle(),
    );
    assert!(tracker.has_custom_check());
    assert!(tracker.is_visible(0, 5));
    assert!(!tracker.is_visible(5, 10));
    assert_eq!(tracker.process_batch(&entries(&[1], &[])), None);
    assert_eq!(tracker.registered_count(), 0);
}

#[test]
fn missing_platform_degrades_to_always_visible() {
    let runtime = TestRuntime::new();
    let tracker = VisibilityTracker::observed(
        None,
        &ObserverOptions::default(),
        ContainerRef::new(),
        5,
        runtime.handle(),
    );
    assert!(!tracker.is_observing());
    assert!(tracker.is_visible(0, 5));
    assert!(tracker.set_range(VisibilityRange::new(100, 120)));
    assert!(tracker.is_visible(0, 5), "no windowing without an observer");
}

#[test]
fn leaf_group_queries_register_backing_children() {
    let fx = fixture(12, 3);
    assert!(fx.tracker.is_visible(0, 9));
    assert!(fx.observer.observed.borrow().is_empty(), "wide ranges register nothing");

    assert!(fx.tracker.is_visible(3, 6));
    assert_eq!(*fx.observer.observed.borrow(), vec![handle(3), handle(4), handle(5)]);

    fx.tracker.is_visible(3, 6);
    assert_eq!(fx.observer.observed.borrow().len(), 3, "registration is idempotent");
    assert_eq!(fx.tracker.registered_count(), 3);
}

#[test]
fn leaf_group_registration_goes_through_the_layout() {
    let fx = fixture(4, 3);
    let slots: Vec<Slot<()>> = vec![
        Slot::Dummy { offset: 0, span: 3, content: None },
        Slot::Row { index: 3, content: None },
        Slot::Row { index: 4, content: None },
        Slot::Row { index: 5, content: None },
    ];
    fx.tracker.set_layout(SlotLayout::from_slots(&slots));
    fx.tracker.is_visible(3, 6);
    assert_eq!(*fx.observer.observed.borrow(), vec![handle(1), handle(2), handle(3)]);
}

#[test]
fn batch_computes_contiguous_range() {
    let fx = fixture(10, 5);
    let changed = fx.tracker.process_batch(&entries(&[3, 4, 5, 6, 7], &[2, 8]));
    assert_eq!(changed, Some(VisibilityRange::new(3, 7)));
    assert_eq!(fx.tracker.range().min(), Some(3));
    assert_eq!(fx.tracker.range().max(), Some(7));

    let repeat = fx.tracker.process_batch(&entries(&[3], &[]));
    assert_eq!(repeat, None, "unchanged range is not reported");
}

#[test]
fn batch_maps_collapsed_children_to_their_spans() {
    let fx = fixture(4, 3);
    let slots: Vec<Slot<()>> = vec![
        Slot::Row { index: 0, content: None },
        Slot::Row { index: 1, content: None },
        Slot::Row { index: 2, content: None },
        Slot::Dummy { offset: 3, span: 6, content: None },
    ];
    fx.tracker.set_layout(SlotLayout::from_slots(&slots));
    let changed = fx.tracker.process_batch(&entries(&[2, 3], &[0, 1]));
    assert_eq!(changed, Some(VisibilityRange::new(2, 8)));
}

#[test]
fn discovered_children_register_on_the_next_tick() {
    let fx = fixture(6, 3);
    fx.tracker.process_batch(&entries(&[0, 1], &[]));
    assert!(
        fx.observer.observed.borrow().is_empty(),
        "registration never happens inside the batch"
    );

    fx.runtime.handle().drain_ui();
    let observed = fx.observer.observed.borrow().clone();
    assert_eq!(observed, vec![handle(2), handle(3), handle(4), handle(5)]);
    assert_eq!(fx.tracker.registered_count(), 4);
}

#[test]
fn detached_targets_are_unobserved_and_forgotten() {
    let fx = fixture(4, 2);
    fx.tracker.is_visible(0, 2);
    fx.tracker.process_batch(&entries(&[0, 1], &[]));
    assert_eq!(fx.tracker.range(), VisibilityRange::new(0, 1));

    // Element 0 leaves the container before its next report.
    fx.container.replace(vec![handle(1), handle(2), handle(3)]);
    let changed = fx.tracker.process_batch(&entries(&[], &[0]));
    assert_eq!(*fx.observer.unobserved.borrow(), vec![handle(0)]);
    assert_eq!(fx.tracker.registered_count(), 1);
    // Position 1 now holds element 2, which keeps the flag last seen there
    // until it reports for itself.
    assert_eq!(changed, None);

    let changed = fx.tracker.process_batch(&entries(&[], &[2]));
    assert_eq!(changed, Some(VisibilityRange::new(0, 0)));
}

#[test]
fn disconnect_releases_every_registration() {
    let fx = fixture(6, 3);
    fx.tracker.is_visible(0, 3);
    fx.tracker.is_visible(3, 6);
    assert_eq!(fx.tracker.registered_count(), 6);

    fx.tracker.disconnect();
    assert_eq!(fx.tracker.registered_count(), 0);
    let mut released = fx.observer.unobserved.borrow().clone();
    released.sort();
    assert_eq!(released, (0..6).map(handle).collect::<Vec<_>>());
}
