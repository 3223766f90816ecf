//! Real-input FFT built on a half-length complex core.
//!
//! `n` real samples are packed into `n/2` complex points (even samples in the
//! real lane, odd samples in the imaginary lane), transformed, and untangled
//! into the packed spectrum
//!
//! ```text
//! [X[0], X[n/2], Re X[1], Im X[1], ..., Re X[n/2-1], Im X[n/2-1]]
//! ```
//!
//! DC and Nyquist are purely real for real input, so both fit in the first
//! pair. The inverse is unnormalised: `inverse(forward(x)) == n·x`.

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use crate::fft::{CoreFft, FftError, FftPlanner};
use crate::num::{deinterleave, interleave, Complex32};
use crate::tables::{check_transform_len, FftTables};

#[derive(Debug, Clone)]
pub struct RealFft {
    core: CoreFft,
    twiddles: Arc<[Complex32]>,
    a_re: Vec<f32>,
    a_im: Vec<f32>,
    b_re: Vec<f32>,
    b_im: Vec<f32>,
}

impl RealFft {
    /// Plan through the [`shared_planner`](crate::fft::shared_planner).
    #[cfg(feature = "std")]
    pub fn new(n: usize) -> Result<Self, FftError> {
        Self::with_planner(&mut crate::fft::shared_planner(), n)
    }

    pub fn with_planner(planner: &mut FftPlanner, n: usize) -> Result<Self, FftError> {
        check_transform_len(n)?;
        Self::from_parts(planner.tables(n / 2)?, planner.real_twiddles(n)?)
    }

    /// Plan from a planner prepared with [`FftPlanner::prepare`].
    pub fn from_planner(planner: &FftPlanner, n: usize) -> Result<Self, FftError> {
        check_transform_len(n)?;
        Self::from_parts(
            planner.lookup_tables(n / 2)?,
            planner.lookup_real_twiddles(n)?,
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

    /// Number of real samples.
    pub fn len(&self) -> usize {
        2 * self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn tables(&self) -> &Arc<FftTables> {
        self.core.tables()
    }

    /// Real samples in `src` to a packed spectrum in `dst`.
    pub fn forward(&mut self, dst: &mut [f32], src: &[f32]) -> Result<(), FftError> {
        self.check_len(dst.len())?;
        self.check_len(src.len())?;
        deinterleave(src, &mut self.a_re, &mut self.a_im)?;
        self.core
            .forward(&mut self.a_re, &mut self.a_im, &mut self.b_re, &mut self.b_im);
        untangle(dst, &self.b_re, &self.b_im, &self.twiddles);
        Ok(())
    }

    pub fn forward_in_place(&mut self, buf: &mut [f32]) -> Result<(), FftError> {
        self.check_len(buf.len())?;
        deinterleave(buf, &mut self.a_re, &mut self.a_im)?;
        self.core
            .forward(&mut self.a_re, &mut self.a_im, &mut self.b_re, &mut self.b_im);
        untangle(buf, &self.b_re, &self.b_im, &self.twiddles);
        Ok(())
    }

    /// Packed spectrum in `src` to `n·x` in `dst`.
    pub fn inverse(&mut self, dst: &mut [f32], src: &[f32]) -> Result<(), FftError> {
        self.check_len(dst.len())?;
        self.check_len(src.len())?;
        retangle(src, &mut self.a_re, &mut self.a_im, &self.twiddles);
        self.core
            .inverse(&self.a_re, &self.a_im, &mut self.b_re, &mut self.b_im);
        interleave(&self.b_re, &self.b_im, dst)?;
        Ok(())
    }

    pub fn inverse_in_place(&mut self, buf: &mut [f32]) -> Result<(), FftError> {
        self.check_len(buf.len())?;
        retangle(buf, &mut self.a_re, &mut self.a_im, &self.twiddles);
        self.core
            .inverse(&self.a_re, &self.a_im, &mut self.b_re, &mut self.b_im);
        interleave(&self.b_re, &self.b_im, buf)?;
        Ok(())
    }

    fn check_len(&self, actual: usize) -> Result<(), FftError> {
        let expected = self.len();
        if actual != expected {
            return Err(FftError::MismatchedLengths { expected, actual });
        }
        Ok(())
    }
}

/// Half-length spectrum `Z` of the packed signal to the packed real spectrum.
fn untangle(dst: &mut [f32], z_re: &[f32], z_im: &[f32], twiddles: &[Complex32]) {
    let half = z_re.len();
    let quarter = half / 2;

    dst[0] = z_re[0] + z_im[0];
    dst[1] = z_re[0] - z_im[0];

    for k in 1..quarter {
        let z0 = Complex32::new(z_re[k], z_im[k]);
        let z1 = Complex32::new(z_re[half - k], z_im[half - k]);
        // spectra of the even and odd samples
        let even = Complex32::new((z0.re + z1.re) * 0.5, (z0.im - z1.im) * 0.5);
        let odd = Complex32::new((z0.im + z1.im) * 0.5, (z1.re - z0.re) * 0.5);
        let t = odd.mul(twiddles[k]);
        dst[2 * k] = even.re + t.re;
        dst[2 * k + 1] = even.im + t.im;
        dst[2 * (half - k)] = even.re - t.re;
        dst[2 * (half - k) + 1] = t.im - even.im;
    }

    dst[half] = z_re[quarter];
    dst[half + 1] = -z_im[quarter];
}

/// Packed real spectrum to the half-length spectrum to inverse-transform. The
/// exact dual of [`untangle`] without its halving.
fn retangle(src: &[f32], z_re: &mut [f32], z_im: &mut [f32], twiddles: &[Complex32]) {
    let half = z_re.len();
    let quarter = half / 2;

    z_re[0] = src[0] + src[1];
    z_im[0] = src[0] - src[1];

    for k in 1..quarter {
        let x0 = Complex32::new(src[2 * k], src[2 * k + 1]);
        let x1 = Complex32::new(src[2 * (half - k)], src[2 * (half - k) + 1]);
        let even = Complex32::new(x0.re + x1.re, x0.im - x1.im);
        let odd = Complex32::new(-(x0.im + x1.im), x0.re - x1.re);
        let t = odd.mul(twiddles[k].conj());
        z_re[k] = even.re + t.re;
        z_im[k] = even.im + t.im;
        z_re[half - k] = even.re - t.re;
        z_im[half - k] = t.im - even.im;
    }

    z_re[quarter] = 2.0 * src[half];
    z_im[quarter] = -2.0 * src[half + 1];
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn planned(n: usize) -> RealFft {
        RealFft::with_planner(&mut FftPlanner::new(), n).unwrap()
    }

    #[test]
    fn impulse_gives_flat_spectrum() {
        let mut fft = planned(16);
        let mut src = [0.0f32; 16];
        src[0] = 1.0;
        let mut dst = [0.0f32; 16];
        fft.forward(&mut dst, &src).unwrap();
        assert!((dst[0] - 1.0).abs() < 1e-6);
        assert!((dst[1] - 1.0).abs() < 1e-6);
        for k in 1..8 {
            assert!((dst[2 * k] - 1.0).abs() < 1e-6, "re {k}");
            assert!(dst[2 * k + 1].abs() < 1e-6, "im {k}");
        }
    }

    #[test]
    fn constant_goes_to_dc() {
        let mut fft = planned(64);
        let mut buf = [0.25f32; 64];
        fft.forward_in_place(&mut buf).unwrap();
        assert!((buf[0] - 16.0).abs() < 1e-4);
        for &x in &buf[1..] {
            assert!(x.abs() < 1e-4);
        }
    }

    #[test]
    fn matches_direct_dft() {
        for n in [16usize, 32, 256] {
            let mut fft = planned(n);
            let mut rng = StdRng::seed_from_u64(42);
            let src: Vec<f32> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
            let mut dst = vec![0.0f32; n];
            fft.forward(&mut dst, &src).unwrap();
            for k in 0..=n / 2 {
                let (mut re, mut im) = (0.0f64, 0.0f64);
                for (t, &x) in src.iter().enumerate() {
                    let theta = -2.0 * core::f64::consts::PI * ((k * t) % n) as f64 / n as f64;
                    re += x as f64 * theta.cos();
                    im += x as f64 * theta.sin();
                }
                let (got_re, got_im) = match k {
                    0 => (dst[0], 0.0),
                    k if k == n / 2 => (dst[1], 0.0),
                    k => (dst[2 * k], dst[2 * k + 1]),
                };
                assert!((got_re as f64 - re).abs() < 1e-3, "n={n} k={k}");
                assert!((got_im as f64 - im).abs() < 1e-3, "n={n} k={k}");
            }
        }
    }

    #[test]
    fn roundtrip_scales_by_len() {
        let mut planner = FftPlanner::new();
        for log2 in 4..=12 {
            let n = 1usize << log2;
            let mut fft = RealFft::with_planner(&mut planner, n).unwrap();
            let mut rng = StdRng::seed_from_u64(log2 as u64);
            let src: Vec<f32> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
            let mut buf = src.clone();
            fft.forward_in_place(&mut buf).unwrap();
            fft.inverse_in_place(&mut buf).unwrap();
            for (y, x) in buf.iter().zip(&src) {
                assert!((y / n as f32 - x).abs() < 1e-4, "n={n}");
            }
        }
    }

    #[test]
    fn rejects_mismatched_buffers() {
        let mut fft = planned(32);
        let src = [0.0f32; 32];
        let mut short = [0.0f32; 16];
        assert_eq!(
            fft.forward(&mut short, &src).unwrap_err(),
            FftError::MismatchedLengths {
                expected: 32,
                actual: 16
            }
        );
        assert!(fft.inverse_in_place(&mut short).is_err());
        assert_eq!(
            RealFft::with_planner(&mut FftPlanner::new(), 8).unwrap_err(),
            FftError::UnsupportedLength(8)
        );
    }
}
