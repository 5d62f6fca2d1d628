// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_qualifier::context::QualifierContext;
use understory_qualifier::factory;
use understory_qualifier::qualifier::ExtensibleFlag;
use understory_qualifier::variant_map::VariantMap;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_threshold(&mut self, max: u32) -> i32 {
        (self.next_u64() % u64::from(max)) as i32
    }
}

fn gen_size_map(n: usize, ctx: &Rc<QualifierContext>) -> Rc<VariantMap<u32>> {
    let map = VariantMap::new();
    map.set_qualifier_context(Some(ctx.clone()));
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for i in 0..n {
        let w = rng.next_threshold(2000);
        let h = if i % 3 == 0 { rng.next_threshold(1500) } else { -1 };
        map.add(i as u32 + 1, factory::create_min_size(w, h));
    }
    map
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    for &n in &[8usize, 64, 512] {
        let ctx = Rc::new(QualifierContext::with_window_size(1280, 720));
        let map = gen_size_map(n, &ctx);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("size_thresholds_n{}", n), |b| {
            b.iter(|| {
                map.evaluate().unwrap();
                black_box(map.selected_item().unwrap());
            });
        });
    }
    group.finish();
}

fn bench_mixed_extensible(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed_extensible");
    let ctx = Rc::new(QualifierContext::with_window_size(1280, 720));
    let map = gen_size_map(64, &ctx);
    let flags: Vec<ExtensibleFlag> = (0..16).map(|i| ExtensibleFlag::new(i % 5 == 0)).collect();
    for (i, flag) in flags.iter().enumerate() {
        map.add(1000 + i as u32, factory::create_extensible(flag));
    }
    group.bench_function("evaluate_n80", |b| {
        b.iter(|| {
            map.evaluate().unwrap();
            black_box(map.selected_item().unwrap());
        });
    });
    group.finish();
}

fn bench_window_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_fanout");
    for &maps in &[4usize, 32, 128] {
        group.throughput(Throughput::Elements(maps as u64));
        group.bench_function(format!("resize_maps{}", maps), |b| {
            b.iter_batched(
                || {
                    let ctx = Rc::new(QualifierContext::new());
                    let owned: Vec<_> = (0..maps).map(|_| gen_size_map(16, &ctx)).collect();
                    (ctx, owned)
                },
                |(ctx, owned)| {
                    for w in (200..2000).step_by(200) {
                        ctx.on_window_changed(w, 720).unwrap();
                    }
                    black_box(owned.len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_mixed_extensible, bench_window_fanout);
criterion_main!(benches);
