//! Inverse MDCT on a quarter-length complex core.
//!
//! For `n` coefficients the full inverse transform is the `2n`-sample block
//!
//! ```text
//! y[t] = Σ_k X[k]·cos(π/n·(t + 1/2 + n/2)·(k + 1/2)),   0 <= t < 2n
//! ```
//!
//! [`Imdct`] produces only its two middle quarters, the part that carries new
//! information: `out[0..n/2]` is `y[n..3n/2]` and `out[n/2..n]` is
//! `y[n/2..n]`. The outer quarters follow from symmetry
//! (`y[t] = −y[n−1−t]` in the first half, `y[n+t] = y[2n−1−t]` in the second).
//! Windowing and overlap-add are left to the caller.

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use crate::fft::{CoreFft, FftError, FftPlanner};
use crate::num::Complex32;
use crate::tables::{check_transform_len, FftTables};

#[derive(Debug, Clone)]
pub struct Imdct {
    core: CoreFft,
    twiddles: Arc<[Complex32]>,
    a_re: Vec<f32>,
    a_im: Vec<f32>,
    b_re: Vec<f32>,
    b_im: Vec<f32>,
}

impl Imdct {
    /// Plan an IMDCT of `n` coefficients through the
    /// [`shared_planner`](crate::fft::shared_planner).
    #[cfg(feature = "std")]
    pub fn new(n: usize) -> Result<Self, FftError> {
        Self::with_planner(&mut crate::fft::shared_planner(), n)
    }

    pub fn with_planner(planner: &mut FftPlanner, n: usize) -> Result<Self, FftError> {
        check_transform_len(n)?;
        Self::from_parts(planner.tables(n / 2)?, planner.imdct_twiddles(n)?)
    }

    pub fn from_planner(planner: &FftPlanner, n: usize) -> Result<Self, FftError> {
        check_transform_len(n)?;
        Self::from_parts(
            planner.lookup_tables(n / 2)?,
            planner.lookup_imdct_twiddles(n)?,
        )
    }

    fn from_parts(tables: Arc<FftTables>, twiddles: Arc<[Complex32]>) -> Result<Self, FftError> {
        let half = tables.len();
        Ok(Self {
            core: CoreFft::new(tables)?,
            twiddles,
            a_re: vec![0.0; half],
            a_im: vec![0.0; half],
            b_re: vec![0.0; half],
            b_im: vec![0.0; half],
        })
    }

    /// Number of coefficients, equal to the number of output samples.
    pub fn len(&self) -> usize {
        2 * self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn transform(&mut self, dst: &mut [f32], src: &[f32]) -> Result<(), FftError> {
        self.check_len(dst.len())?;
        self.check_len(src.len())?;
        self.rotate_in(src);
        self.core
            .inverse(&self.a_re, &self.a_im, &mut self.b_re, &mut self.b_im);
        self.rotate_out(dst);
        Ok(())
    }

    pub fn transform_in_place(&mut self, buf: &mut [f32]) -> Result<(), FftError> {
        self.check_len(buf.len())?;
        self.rotate_in(buf);
        self.core
            .inverse(&self.a_re, &self.a_im, &mut self.b_re, &mut self.b_im);
        self.rotate_out(buf);
        Ok(())
    }

    fn check_len(&self, actual: usize) -> Result<(), FftError> {
        let expected = self.len();
        if actual != expected {
            return Err(FftError::MismatchedLengths { expected, actual });
        }
        Ok(())
    }

    /// `z[m] = (X[2m] − j·X[n−1−2m])·w[m]`
    fn rotate_in(&mut self, src: &[f32]) {
        let n = src.len();
        for (m, w) in self.twiddles.iter().enumerate() {
            let z = Complex32::new(src[2 * m], -src[n - 1 - 2 * m]).mul(*w);
            self.a_re[m] = z.re;
            self.a_im[m] = z.im;
        }
    }

    /// Rotate the core output again and scatter it outward from the block
    /// centre.
    fn rotate_out(&self, dst: &mut [f32]) {
        let half = self.b_re.len();
        for (p, w) in self.twiddles.iter().enumerate() {
            let u = Complex32::new(self.b_re[p], self.b_im[p]).mul(*w);
            if 2 * p < half {
                dst[half - 1 - 2 * p] = -u.re;
                dst[half + 2 * p] = -u.im;
            } else {
                dst[3 * half - 1 - 2 * p] = -u.re;
                dst[2 * p - half] = -u.im;
            }
        }
    }
}
