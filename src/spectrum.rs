//! Operations on packed real spectra.
//!
//! A packed spectrum of a length-`n` real signal is `n` floats: DC in slot 0,
//! Nyquist in slot 1, then `(re, im)` pairs for bins `1..n/2`.

use crate::fft::FftError;
use crate::num::{mul_add, Complex32};

/// Accumulate the product of two packed spectra into `dst`.
///
/// DC and Nyquist are multiplied as reals; every other bin as a complex
/// number. Running the result through an inverse real FFT yields the circular
/// convolution of the two source signals, scaled by `n`.
pub fn multiply_add(dst: &mut [f32], src1: &[f32], src2: &[f32]) -> Result<(), FftError> {
    let n = dst.len();
    if n < 2 || n % 2 != 0 {
        return Err(FftError::UnsupportedLength(n));
    }
    for actual in [src1.len(), src2.len()] {
        if actual != n {
            return Err(FftError::MismatchedLengths {
                expected: n,
                actual,
            });
        }
    }

    // DC and Nyquist, saved before the pair loop overwrites slots 0 and 1.
    let dc = mul_add(src1[0], src2[0], dst[0]);
    let nyquist = mul_add(src1[1], src2[1], dst[1]);

    #[cfg(all(target_arch = "x86_64", feature = "x86_64"))]
    let done = if crate::config::simd_enabled() {
        crate::simd::multiply_add_pairs(dst, src1, src2);
        n & !3
    } else {
        0
    };
    #[cfg(not(all(target_arch = "x86_64", feature = "x86_64")))]
    let done = 0;

    for ((d, a), b) in dst[done..]
        .chunks_exact_mut(2)
        .zip(src1[done..].chunks_exact(2))
        .zip(src2[done..].chunks_exact(2))
    {
        let (ar, ai) = (a[0], a[1]);
        let (br, bi) = (b[0], b[1]);
        d[0] = mul_add(ar, br, mul_add(-ai, bi, d[0]));
        d[1] = mul_add(ar, bi, mul_add(ai, br, d[1]));
    }

    dst[0] = dc;
    dst[1] = nyquist;
    Ok(())
}

/// Number of distinct bins in a packed spectrum of `len` floats.
pub const fn bin_count(len: usize) -> usize {
    len / 2 + 1
}

/// Bin `k` (`0 <= k <= len/2`) of a packed spectrum.
pub fn bin(spectrum: &[f32], k: usize) -> Result<Complex32, FftError> {
    let half = checked_half(spectrum.len(), k)?;
    Ok(match k {
        0 => Complex32::new(spectrum[0], 0.0),
        k if k == half => Complex32::new(spectrum[1], 0.0),
        k => Complex32::new(spectrum[2 * k], spectrum[2 * k + 1]),
    })
}

/// Write bin `k`. The imaginary part is dropped for DC and Nyquist.
pub fn set_bin(spectrum: &mut [f32], k: usize, value: Complex32) -> Result<(), FftError> {
    let half = checked_half(spectrum.len(), k)?;
    match k {
        0 => spectrum[0] = value.re,
        k if k == half => spectrum[1] = value.re,
        k => {
            spectrum[2 * k] = value.re;
            spectrum[2 * k + 1] = value.im;
        }
    }
    Ok(())
}

fn checked_half(len: usize, k: usize) -> Result<usize, FftError> {
    if len < 2 || len % 2 != 0 {
        return Err(FftError::UnsupportedLength(len));
    }
    let half = len / 2;
    if k > half {
        return Err(FftError::BinOutOfRange(k));
    }
    Ok(half)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    fn reference(dst: &[f32], a: &[f32], b: &[f32]) -> Vec<f32> {
        let mut out = dst.to_vec();
        out[0] += a[0] * b[0];
        out[1] += a[1] * b[1];
        for k in 1..dst.len() / 2 {
            let x = Complex32::new(a[2 * k], a[2 * k + 1]);
            let y = Complex32::new(b[2 * k], b[2 * k + 1]);
            out[2 * k] += x.re * y.re - x.im * y.im;
            out[2 * k + 1] += x.re * y.im + x.im * y.re;
        }
        out
    }

    #[test]
    fn dc_and_nyquist_are_real_products() {
        let mut dst = [1.0f32, 1.0, 0.0, 0.0];
        multiply_add(&mut dst, &[2.0, 3.0, 1.0, 1.0], &[4.0, 5.0, 1.0, -1.0]).unwrap();
        assert_eq!(dst[0], 9.0);
        assert_eq!(dst[1], 16.0);
        assert!((dst[2] - 2.0).abs() < 1e-6);
        assert!(dst[3].abs() < 1e-6);
    }

    #[test]
    fn rejects_bad_lengths() {
        let mut dst = vec![0.0f32; 8];
        assert_eq!(
            multiply_add(&mut dst, &[0.0; 8], &[0.0; 6]).unwrap_err(),
            FftError::MismatchedLengths {
                expected: 8,
                actual: 6
            }
        );
        let mut odd = [0.0f32; 3];
        assert_eq!(
            multiply_add(&mut odd, &[0.0; 3], &[0.0; 3]).unwrap_err(),
            FftError::UnsupportedLength(3)
        );
        assert_eq!(
            multiply_add(&mut [], &[], &[]).unwrap_err(),
            FftError::UnsupportedLength(0)
        );
    }

    #[test]
    fn bin_accessors() {
        let mut spec = [0.0f32; 16];
        assert_eq!(bin_count(spec.len()), 9);
        set_bin(&mut spec, 0, Complex32::new(3.0, 7.0)).unwrap();
        set_bin(&mut spec, 8, Complex32::new(-2.0, 7.0)).unwrap();
        set_bin(&mut spec, 3, Complex32::new(1.5, -0.5)).unwrap();
        assert_eq!(spec[..2], [3.0, -2.0]);
        assert_eq!(bin(&spec, 0).unwrap(), Complex32::new(3.0, 0.0));
        assert_eq!(bin(&spec, 8).unwrap(), Complex32::new(-2.0, 0.0));
        assert_eq!(bin(&spec, 3).unwrap(), Complex32::new(1.5, -0.5));
        assert_eq!(bin(&spec, 9).unwrap_err(), FftError::BinOutOfRange(9));
    }

    proptest! {
        #[test]
        fn matches_reference(
            acc in proptest::collection::vec(-4.0f32..4.0, 64),
            a in proptest::collection::vec(-4.0f32..4.0, 64),
            b in proptest::collection::vec(-4.0f32..4.0, 64),
        ) {
            let want = reference(&acc, &a, &b);
            let mut got = acc.clone();
            multiply_add(&mut got, &a, &b).unwrap();
            for (g, w) in got.iter().zip(&want) {
                prop_assert!((g - w).abs() < 1e-4);
            }
        }
    }
}
