use dynlist_core::{DynamicListSpec, ListError};
use dynlist_testing::{ListTestRule, VIEWPORT_HEIGHT};

const TOTAL_ROWS: usize = 1000;
const PAGE_SIZE: usize = 50;
const SCROLL_STEP: f32 = 2_000.0;
const MAX_STEPS: usize = 200;

#[derive(Clone, Debug)]
struct FeedItem {
    id: usize,
    title: String,
}

impl FeedItem {
    fn new(id: usize) -> Self {
        Self {
            id,
            title: format!("Post #{id}"),
        }
    }
}

fn page(start: usize) -> Vec<FeedItem> {
    let end = (start + PAGE_SIZE).min(TOTAL_ROWS);
    (start..end).map(FeedItem::new).collect()
}

/// `ListError` is not `Send`, which `anyhow` requires.
fn host(result: Result<(), ListError>) -> anyhow::Result<()> {
    result.map_err(|err| anyhow::anyhow!("{err}"))
}

fn report(step: usize, rule: &ListTestRule<FeedItem>) {
    let list = rule.list();
    let slots = rule.rendered().map_or(0, |rendered| rendered.slots.len());
    let last = list.rows().iter().last().map(|item| (item.id, item.title.as_str()));
    log::info!(
        "step {step}: visible {}, {slots} slots for {} indices, {} rows loaded (last {last:?}), {} loads",
        list.visibility(),
        list.rendered_len(),
        list.rows().len(),
        list.loads_started(),
    );
}

fn main() -> anyhow::Result<()> {
    #[cfg(feature = "logging")]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    println!("=== dynlist feed demo ===");
    println!("Scrolls a {TOTAL_ROWS}-row feed delivered in pages of {PAGE_SIZE}.");
    println!("Set RUST_LOG=debug to follow pagination, RUST_LOG=trace for visibility.");
    println!();

    let spec = DynamicListSpec::default().page_size(PAGE_SIZE);
    spec.validate()?;
    let mut rule = ListTestRule::new(spec, page(0), true)?;
    host(rule.mount())?;
    report(0, &rule);

    for step in 1..=MAX_STEPS {
        if rule.loader().outstanding() > 0 {
            let start = rule.list().rows().len();
            let next = page(start);
            let has_more = start + next.len() < TOTAL_ROWS;
            host(rule.resolve_page(next, has_more))?;
        }

        let viewport = rule.observer().viewport();
        let bottom = (rule.container().content_height() - VIEWPORT_HEIGHT).max(0.0);
        if rule.list().is_done() && viewport.scroll_top >= bottom {
            report(step, &rule);
            break;
        }
        host(rule.scroll_to((viewport.scroll_top + SCROLL_STEP).min(bottom)))?;
        report(step, &rule);
    }

    let list = rule.list();
    if !list.is_done() {
        log::warn!("stopped after {MAX_STEPS} steps before the feed ended");
    }
    println!(
        "Loaded {} rows in {} pages; {} renders; {} elements observed at the end.",
        list.rows().len(),
        list.loads_started(),
        rule.render_count(),
        rule.observer().observed_count(),
    );
    rule.unmount();
    Ok(())
}
