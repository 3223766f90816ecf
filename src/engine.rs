//! One-shot transforms keyed by buffer length.
//!
//! Each thread keeps one engine per length, planned on first use through the
//! [`shared_planner`](crate::fft::shared_planner). Later calls of the same
//! length reuse it and neither allocate nor take the planner lock.
//!
//! ```
//! let src = [1.0f32; 32];
//! let mut spec = [0.0f32; 32];
//! blockfft::engine::forward_real_fft(&mut spec, &src).unwrap();
//! assert!((spec[0] - 32.0).abs() < 1e-4);
//! ```

use std::cell::RefCell;

use hashbrown::hash_map::Entry;
use hashbrown::HashMap;

use crate::fft::{ComplexFft, FftError};
use crate::mdct::Imdct;
use crate::rfft::RealFft;

pub use crate::spectrum::multiply_add as spectral_multiply_add;

#[derive(Default)]
struct Engines {
    complex: HashMap<usize, ComplexFft>,
    real: HashMap<usize, RealFft>,
    imdct: HashMap<usize, Imdct>,
}

thread_local! {
    static ENGINES: RefCell<Engines> = RefCell::new(Engines::default());
}

fn with_engine<E, R>(
    select: impl FnOnce(&mut Engines) -> &mut HashMap<usize, E>,
    plan: impl FnOnce(usize) -> Result<E, FftError>,
    len: usize,
    run: impl FnOnce(&mut E) -> Result<R, FftError>,
) -> Result<R, FftError> {
    ENGINES.with(|engines| {
        let mut engines = engines.borrow_mut();
        let engine = match select(&mut engines).entry(len) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(plan(len)?),
        };
        run(engine)
    })
}

pub fn forward_complex_fft(re: &mut [f32], im: &mut [f32]) -> Result<(), FftError> {
    with_engine(|e| &mut e.complex, ComplexFft::new, re.len(), |fft| {
        fft.forward_split(re, im)
    })
}

pub fn inverse_complex_fft(re: &mut [f32], im: &mut [f32]) -> Result<(), FftError> {
    with_engine(|e| &mut e.complex, ComplexFft::new, re.len(), |fft| {
        fft.inverse_split(re, im)
    })
}

/// Real samples to a packed spectrum. `dst` and `src` must have equal length.
pub fn forward_real_fft(dst: &mut [f32], src: &[f32]) -> Result<(), FftError> {
    with_engine(|e| &mut e.real, RealFft::new, src.len(), |fft| {
        fft.forward(dst, src)
    })
}

/// Packed spectrum to `n·x`.
pub fn inverse_real_fft(dst: &mut [f32], src: &[f32]) -> Result<(), FftError> {
    with_engine(|e| &mut e.real, RealFft::new, src.len(), |fft| {
        fft.inverse(dst, src)
    })
}

/// Middle two quarters of the inverse MDCT of `src`.
pub fn imdct(dst: &mut [f32], src: &[f32]) -> Result<(), FftError> {
    with_engine(|e| &mut e.imdct, Imdct::new, src.len(), |imdct| {
        imdct.transform(dst, src)
    })
}
