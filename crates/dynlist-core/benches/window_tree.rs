use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dynlist_core::{RenderPass, Slot, SlotLayout, VisibilityRange, WindowTree};

const BRANCH: usize = 5;
const PAGE_SIZE: usize = 20;
const ROW_COUNT_SAMPLES: &[usize] = &[1_000, 10_000, 100_000];
const WINDOW: usize = 30;

fn render_window(tree: &WindowTree, rows: usize, range: VisibilityRange) -> Vec<Slot<u32>> {
    let visibility = move |start: usize, end: usize| range.is_near(start, end);
    let mut row = |index: usize| Some(index as u32);
    let mut pass = RenderPass {
        visibility: &visibility,
        row: &mut row,
        loading: None,
        dummy: None,
        data_len: rows,
        rendered_len: rows + PAGE_SIZE,
    };
    tree.render(&mut pass)
}

fn bench_narrow_window(c: &mut Criterion) {
    let tree = WindowTree::with_branch(BRANCH).expect("valid branch");
    let mut group = c.benchmark_group("window_tree_render");
    for &rows in ROW_COUNT_SAMPLES {
        group.bench_with_input(BenchmarkId::new("rows", rows), &rows, |b, &rows| {
            let middle = rows / 2;
            let range = VisibilityRange::new(middle, middle + WINDOW);
            b.iter(|| {
                let slots = render_window(&tree, rows, range);
                black_box(slots);
            });
        });
    }
    group.finish();
}

fn bench_layout_lookup(c: &mut Criterion) {
    let tree = WindowTree::with_branch(BRANCH).expect("valid branch");
    let mut group = c.benchmark_group("slot_layout_lookup");
    for &rows in ROW_COUNT_SAMPLES {
        group.bench_with_input(BenchmarkId::new("rows", rows), &rows, |b, &rows| {
            let middle = rows / 2;
            let slots = render_window(&tree, rows, VisibilityRange::new(middle, middle + WINDOW));
            let layout = SlotLayout::from_slots(&slots);

            b.iter(|| {
                for start in (middle..middle + WINDOW).step_by(BRANCH) {
                    black_box(layout.positions_for(start, start + BRANCH));
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_narrow_window, bench_layout_lookup);
criterion_main!(benches);
