// Test intent: table builder properties and planner sharing.
use std::sync::Arc;
use std::thread;

use blockfft::tables::{imdct_twiddles, real_twiddles, Radix};
use blockfft::{shared_planner, ComplexFft, FftError, FftPlanner, FftTables, Imdct, RealFft};

#[test]
fn tables_are_deterministic() {
    for n in [8usize, 64, 1024, 4096] {
        assert_eq!(FftTables::new(n).unwrap(), FftTables::new(n).unwrap());
    }
}

#[test]
fn order_table_is_an_involution() {
    for log2 in 3..=12 {
        let tables = FftTables::new(1 << log2).unwrap();
        let order = tables.order();
        assert_eq!(order.len(), tables.len() / 8);
        for (b, &o) in order.iter().enumerate() {
            assert_eq!(order[o as usize] as usize, b, "len={}", tables.len());
        }
    }
}

#[test]
fn twiddles_have_unit_magnitude() {
    let tables = FftTables::new(4096).unwrap();
    for stage in tables.stages() {
        let tw = tables.stage_twiddles(stage);
        let floats = match stage.radix {
            Radix::Two => 2,
            Radix::Four => 6,
        };
        // each group is [re ×8, im ×8] per rotation
        for group in tw.chunks_exact(floats * 8) {
            for rotation in group.chunks_exact(16) {
                for l in 0..8 {
                    let (re, im) = (rotation[l], rotation[8 + l]);
                    assert!((re * re + im * im - 1.0).abs() < 1e-6);
                }
            }
        }
    }
    for w in real_twiddles(4096).unwrap().iter() {
        assert!((w.norm_sqr() - 1.0).abs() < 1e-6);
    }
    for w in imdct_twiddles(4096).unwrap().iter() {
        assert!((w.norm_sqr() - 1.0).abs() < 1e-6);
    }
}

#[test]
fn stage_spans_shrink_to_32() {
    let tables = FftTables::new(2048).unwrap();
    let spans: Vec<usize> = tables.stages().iter().map(|s| s.span()).collect();
    assert_eq!(spans, [2048, 512, 128, 32]);
    assert!(tables.stages().iter().all(|s| s.radix == Radix::Four));

    // odd log2(P/8): a single radix-2 stage at the full span
    let tables = FftTables::new(4096).unwrap();
    let spans: Vec<usize> = tables.stages().iter().map(|s| s.span()).collect();
    assert_eq!(spans, [4096, 2048, 512, 128, 32]);
    assert_eq!(tables.stages()[0].radix, Radix::Two);
    assert!(tables.stages()[1..].iter().all(|s| s.radix == Radix::Four));

    // the 8-point core of a 16-sample real transform is the radix-8 combine alone
    assert!(FftTables::new(8).unwrap().stages().is_empty());
    let tables = FftTables::new(16).unwrap();
    assert_eq!(tables.stages().len(), 1);
    assert_eq!(tables.stages()[0].radix, Radix::Two);
}

#[test]
fn unsupported_lengths_are_rejected() {
    for n in [0usize, 4, 6, 1000, 8192, usize::MAX] {
        assert_eq!(FftTables::new(n), Err(FftError::UnsupportedLength(n)));
    }
    let mut planner = FftPlanner::new();
    assert_eq!(
        planner.prepare(8).unwrap_err(),
        FftError::UnsupportedLength(8)
    );
    assert_eq!(planner.cached_tables(), 0);
}

#[test]
fn unprepared_planner_reports_missing_tables() {
    let planner = FftPlanner::new();
    assert_eq!(
        RealFft::from_planner(&planner, 256).unwrap_err(),
        FftError::TablesNotBuilt(128)
    );
    assert_eq!(
        Imdct::from_planner(&planner, 256).unwrap_err(),
        FftError::TablesNotBuilt(128)
    );
    assert_eq!(
        planner.lookup_real_twiddles(256).unwrap_err(),
        FftError::TablesNotBuilt(256)
    );
}

#[test]
fn engines_of_one_length_share_tables() {
    let mut planner = FftPlanner::new();
    planner.prepare(512).unwrap();
    let real = RealFft::from_planner(&planner, 512).unwrap();
    let complex = ComplexFft::from_planner(&planner, 256);
    // 256 was not prepared as a transform length, only as the real core
    assert!(complex.is_ok());
    assert!(Arc::ptr_eq(real.tables(), complex.unwrap().tables()));
    let again = ComplexFft::with_planner(&mut planner, 512).unwrap();
    assert!(Arc::ptr_eq(
        again.tables(),
        &planner.lookup_tables(512).unwrap()
    ));
}

#[test]
fn shared_planner_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            thread::spawn(move || {
                let mut fft = RealFft::new(1024).unwrap();
                let src: Vec<f32> = (0..1024).map(|t| ((t + i) % 7) as f32).collect();
                let mut dst = vec![0.0f32; 1024];
                fft.forward(&mut dst, &src).unwrap();
                Arc::clone(fft.tables())
            })
        })
        .collect();
    let tables: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for t in &tables[1..] {
        assert!(Arc::ptr_eq(&tables[0], t));
    }
    assert!(Arc::ptr_eq(
        &tables[0],
        &shared_planner().lookup_tables(512).unwrap()
    ));
}
