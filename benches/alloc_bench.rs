//! Benchmarks for the pass-through resource.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vram_resource::{DeviceMemoryResource, DirectResource, StreamView};

fn bench_alloc_free(c: &mut Criterion) {
    let mr = DirectResource::new();

    c.bench_function("direct_alloc_free_4k", |b| {
        b.iter(|| {
            let ptr = mr.allocate(black_box(4096), StreamView::DEFAULT).unwrap();
            unsafe { mr.deallocate(ptr, 4096, StreamView::DEFAULT) };
        })
    });

    c.bench_function("direct_alloc_free_4m", |b| {
        b.iter(|| {
            let size = 4 * 1024 * 1024;
            let ptr = mr.allocate(black_box(size), StreamView::DEFAULT).unwrap();
            unsafe { mr.deallocate(ptr, size, StreamView::DEFAULT) };
        })
    });

    c.bench_function("direct_mem_info", |b| {
        b.iter(|| black_box(mr.get_mem_info(StreamView::DEFAULT).unwrap()))
    });
}

criterion_group!(benches, bench_alloc_free);
criterion_main!(benches);
