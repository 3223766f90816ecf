//! # blockfft - power-of-two FFT engine for block audio filtering
//!
//! Single-precision transforms for block-based frequency-domain processing:
//! anti-aliasing and resampling filters that convolve in the frequency
//! domain, and block-transform audio decoders.
//!
//! - [`ComplexFft`]: mixed-radix (2/4/8) complex FFT over split lanes
//! - [`RealFft`]: real-input FFT with a packed spectrum layout
//! - [`Imdct`]: inverse MDCT built on the complex core
//! - [`spectrum::multiply_add`]: spectral multiply-accumulate
//! - [`engine`]: one-shot functions keyed by buffer length (`std` only)
//!
//! Every transform length is a power of two from 16 to 4096. Transforms are
//! unnormalised: an inverse after a forward transform scales by the length.
//! Twiddle tables are built once per length and shared between engines; the
//! transforms themselves never allocate.
//!
//! ## Cargo Features
//!
//! - `std` (default): shared planner, `engine` module and environment overrides
//! - `x86_64`: SSE kernels for the radix-4 stages and the multiply-accumulate
//! - `verbose-logging`: `log::debug!` output for planning and kernel selection
//!
//! ## Example
//!
//! ```
//! use blockfft::{spectrum, RealFft};
//!
//! let mut fft = RealFft::new(64).unwrap();
//! let mut x = [0.0f32; 64];
//! let mut h = [0.0f32; 64];
//! x[3] = 1.0;
//! h[0] = 0.5;
//! h[1] = 0.5;
//!
//! let mut fx = [0.0f32; 64];
//! let mut fh = [0.0f32; 64];
//! fft.forward(&mut fx, &x).unwrap();
//! fft.forward(&mut fh, &h).unwrap();
//!
//! let mut acc = [0.0f32; 64];
//! spectrum::multiply_add(&mut acc, &fx, &fh).unwrap();
//! let mut y = [0.0f32; 64];
//! fft.inverse(&mut y, &acc).unwrap();
//! assert!((y[3] / 64.0 - 0.5).abs() < 1e-5);
//! assert!((y[4] / 64.0 - 0.5).abs() < 1e-5);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
extern crate alloc;

macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            log::debug!($($arg)*);
        }
    };
}

pub mod num;

/// Twiddle and permutation tables.
pub mod tables;

mod fft_kernels;
#[cfg(all(target_arch = "x86_64", feature = "x86_64"))]
mod simd;

pub mod config;

/// Complex FFT, planner and error type.
pub mod fft;
pub mod mdct;
pub mod rfft;
pub mod spectrum;

#[cfg(feature = "std")]
pub mod engine;

pub use fft::{ComplexFft, Direction, FftError, FftPlanner};
pub use mdct::Imdct;
pub use num::{Complex32, SplitComplex};
pub use rfft::RealFft;
pub use tables::FftTables;

#[cfg(feature = "std")]
pub use fft::shared_planner;

/// Butterfly columns processed together by the kernels.
pub const LANES: usize = 8;

/// Smallest supported transform length.
pub const MIN_LEN: usize = 16;

/// Largest supported transform length.
pub const MAX_LEN: usize = 4096;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_supported_length_plans() {
        let mut planner = FftPlanner::new();
        let mut n = MIN_LEN;
        while n <= MAX_LEN {
            planner.prepare(n).unwrap();
            assert_eq!(ComplexFft::from_planner(&planner, n).unwrap().len(), n);
            assert_eq!(RealFft::from_planner(&planner, n).unwrap().len(), n);
            assert_eq!(Imdct::from_planner(&planner, n).unwrap().len(), n);
            n *= 2;
        }
        assert_eq!(
            planner.prepare(MAX_LEN * 2).unwrap_err(),
            FftError::UnsupportedLength(MAX_LEN * 2)
        );
    }
}
