//! Benchmarks for unit discovery and report rendering.
//!
//! These benchmarks measure walking trees of various sizes for
//! kustomizations, and rendering diff maps of various sizes as markdown.

use std::fs;
use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kustomize_diff::phases::discovery::{self, UnitFilter};
use kustomize_diff::result::{DiffMap, DiffOutcome};
use tempfile::TempDir;

/// Create `units` kustomizations spread over nested directories, plus as
/// many plain directories.
fn generate_tree(root: &Path, units: usize) {
    for i in 0..units {
        let unit = root.join(format!("apps/team{}/app{}/overlays/prod", i % 10, i));
        fs::create_dir_all(&unit).unwrap();
        fs::write(unit.join("kustomization.yaml"), "resources:\n- pod.yaml\n").unwrap();

        let plain = root.join(format!("docs/team{}/page{}", i % 10, i));
        fs::create_dir_all(&plain).unwrap();
        fs::write(plain.join("README.md"), "docs").unwrap();
    }
}

fn generate_diff_map(units: usize) -> DiffMap {
    let mut diff_map = DiffMap::new();
    for i in 0..units {
        let outcome = if i % 3 == 0 {
            DiffOutcome::Content(String::new())
        } else {
            DiffOutcome::Content(format!("@@ -1 +1 @@\n-  name: app{i}\n+  name: app{i}-v2\n"))
        };
        diff_map.record(format!("apps/app{i}"), outcome);
    }
    diff_map
}

fn bench_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("discovery");

    for units in [10, 100, 500] {
        let tree = TempDir::new().unwrap();
        generate_tree(tree.path(), units);

        group.bench_with_input(BenchmarkId::new("unfiltered", units), &tree, |b, tree| {
            b.iter(|| discovery::execute(black_box(tree.path()), &UnitFilter::default()))
        });

        let filter = UnitFilter::new(Some("^apps/team[0-4]/"), Some("app1")).unwrap();
        group.bench_with_input(BenchmarkId::new("filtered", units), &tree, |b, tree| {
            b.iter(|| discovery::execute(black_box(tree.path()), &filter))
        });
    }

    group.finish();
}

fn bench_markdown(c: &mut Criterion) {
    let mut group = c.benchmark_group("markdown");

    for units in [10, 100, 1000] {
        let diff_map = generate_diff_map(units);
        group.bench_with_input(BenchmarkId::new("units", units), &diff_map, |b, diff_map| {
            b.iter(|| black_box(diff_map).as_markdown())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_discovery, bench_markdown);
criterion_main!(benches);
