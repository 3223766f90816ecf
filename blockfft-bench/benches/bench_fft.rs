use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

use blockfft::{config, ComplexFft, FftPlanner};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rustfft::num_complex::Complex32 as RustComplex;
use rustfft::FftPlanner as RustFftPlanner;

// Counts allocations so the benches can check the transforms stay allocation-free.
struct CountingAllocator;

static ALLOCATIONS: AtomicUsize = AtomicUsize::new(0);

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

const SIZES: [usize; 5] = [64, 256, 1024, 2048, 4096];

/// Undo the `N` gain of an unnormalised round trip so repeated iterations stay finite.
fn normalize(re: &mut [f32], im: &mut [f32]) {
    let scale = 1.0 / re.len() as f32;
    for (r, i) in re.iter_mut().zip(im.iter_mut()) {
        *r *= scale;
        *i *= scale;
    }
}

fn bench_complex(c: &mut Criterion) {
    let mut group = c.benchmark_group("complex_fft");
    let mut planner = FftPlanner::new();
    for &size in &SIZES {
        let mut re: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let mut im: Vec<f32> = (0..size).map(|i| (i as f32 * 0.3).cos()).collect();

        for simd in [false, true] {
            if simd && !config::simd_available() {
                continue;
            }
            config::set_simd_enabled(Some(simd));
            let mut fft = ComplexFft::with_planner(&mut planner, size).unwrap();
            let name = if simd { "blockfft_sse" } else { "blockfft" };

            let before = ALLOCATIONS.load(Ordering::Relaxed);
            fft.forward_split(&mut re, &mut im).unwrap();
            fft.inverse_split(&mut re, &mut im).unwrap();
            normalize(&mut re, &mut im);
            assert_eq!(ALLOCATIONS.load(Ordering::Relaxed), before);

            group.bench_function(BenchmarkId::new(name, size), |b| {
                b.iter(|| {
                    fft.forward_split(&mut re, &mut im).unwrap();
                    fft.inverse_split(&mut re, &mut im).unwrap();
                    normalize(&mut re, &mut im);
                })
            });
        }
        config::set_simd_enabled(None);

        let mut rust_planner = RustFftPlanner::<f32>::new();
        let forward = rust_planner.plan_fft_forward(size);
        let inverse = rust_planner.plan_fft_inverse(size);
        let mut data: Vec<RustComplex> = re
            .iter()
            .zip(&im)
            .map(|(&r, &i)| RustComplex::new(r, i))
            .collect();
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        let mut scratch = vec![RustComplex::new(0.0, 0.0); scratch_len];
        group.bench_function(BenchmarkId::new("rustfft", size), |b| {
            b.iter(|| {
                forward.process_with_scratch(&mut data, &mut scratch);
                inverse.process_with_scratch(&mut data, &mut scratch);
                let scale = 1.0 / size as f32;
                for z in data.iter_mut() {
                    *z *= scale;
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_complex);
criterion_main!(benches);
