//! Scalar complex arithmetic and the split-lane buffer view shared by every
//! transform in the crate.

use crate::fft::FftError;

/// Fused multiply-add `a * b + c`.
///
/// Lowers to a single FMA instruction on targets that have one and to a plain
/// multiply and add elsewhere, so results may differ in the last bit between
/// targets.
#[inline(always)]
pub fn mul_add(a: f32, b: f32, c: f32) -> f32 {
    #[cfg(all(
        feature = "std",
        any(target_feature = "fma", target_arch = "aarch64")
    ))]
    {
        a.mul_add(b, c)
    }
    #[cfg(not(all(
        feature = "std",
        any(target_feature = "fma", target_arch = "aarch64")
    )))]
    {
        a * b + c
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex32 {
    pub re: f32,
    pub im: f32,
}

impl Complex32 {
    #[inline(always)]
    pub const fn new(re: f32, im: f32) -> Self {
        Self { re, im }
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self { re: 0.0, im: 0.0 }
    }

    /// `exp(i·theta)`, evaluated in double precision and rounded once.
    pub fn expi(theta: f64) -> Self {
        Self {
            re: libm::cos(theta) as f32,
            im: libm::sin(theta) as f32,
        }
    }

    #[inline(always)]
    pub fn conj(self) -> Self {
        Self {
            re: self.re,
            im: -self.im,
        }
    }

    #[inline(always)]
    pub fn scale(self, k: f32) -> Self {
        Self {
            re: self.re * k,
            im: self.im * k,
        }
    }

    #[inline(always)]
    pub fn norm_sqr(self) -> f32 {
        mul_add(self.re, self.re, self.im * self.im)
    }

    #[allow(clippy::should_implement_trait)]
    #[inline(always)]
    pub fn add(self, other: Self) -> Self {
        Self {
            re: self.re + other.re,
            im: self.im + other.im,
        }
    }

    #[allow(clippy::should_implement_trait)]
    #[inline(always)]
    pub fn sub(self, other: Self) -> Self {
        Self {
            re: self.re - other.re,
            im: self.im - other.im,
        }
    }

    #[allow(clippy::should_implement_trait)]
    #[inline(always)]
    pub fn mul(self, other: Self) -> Self {
        Self {
            re: mul_add(self.re, other.re, -(self.im * other.im)),
            im: mul_add(self.re, other.im, self.im * other.re),
        }
    }
}

impl core::ops::Neg for Complex32 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self {
            re: -self.re,
            im: -self.im,
        }
    }
}

impl core::ops::Add for Complex32 {
    type Output = Self;
    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Complex32::add(self, other)
    }
}

impl core::ops::Sub for Complex32 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        Complex32::sub(self, other)
    }
}

impl core::ops::Mul for Complex32 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, other: Self) -> Self {
        Complex32::mul(self, other)
    }
}

/// Mutable view of a complex buffer stored as two parallel lanes.
///
/// Point `k` is `(re[k], im[k])`. Both lanes must have the same length; the
/// transforms reject views where they do not.
#[derive(Debug, PartialEq)]
pub struct SplitComplex<'a> {
    pub re: &'a mut [f32],
    pub im: &'a mut [f32],
}

impl<'a> SplitComplex<'a> {
    pub fn new(re: &'a mut [f32], im: &'a mut [f32]) -> Result<Self, FftError> {
        if re.len() != im.len() {
            return Err(FftError::MismatchedLengths {
                expected: re.len(),
                actual: im.len(),
            });
        }
        Ok(Self { re, im })
    }

    /// View a single buffer of `2·n` floats as `n` points: the first half is
    /// the real lane, the second half the imaginary lane.
    pub fn from_halves(buf: &'a mut [f32]) -> Result<Self, FftError> {
        if buf.len() % 2 != 0 {
            return Err(FftError::UnsupportedLength(buf.len()));
        }
        let half = buf.len() / 2;
        let (re, im) = buf.split_at_mut(half);
        Ok(Self { re, im })
    }

    pub fn len(&self) -> usize {
        self.re.len()
    }

    pub fn is_empty(&self) -> bool {
        self.re.is_empty()
    }

    pub fn get(&self, k: usize) -> Option<Complex32> {
        Some(Complex32::new(*self.re.get(k)?, *self.im.get(k)?))
    }

    pub fn copy_from_complex(&mut self, input: &[Complex32]) -> Result<(), FftError> {
        copy_from_complex(input, self.re, self.im)
    }

    pub fn copy_to_complex(&self, out: &mut [Complex32]) -> Result<(), FftError> {
        copy_to_complex(self.re, self.im, out)
    }

    /// Reborrow the view for a shorter lifetime so it can be passed on by value.
    pub fn reborrow(&mut self) -> SplitComplex<'_> {
        SplitComplex {
            re: self.re,
            im: self.im,
        }
    }
}

/// Scatter interleaved complex values into split lanes.
pub fn copy_from_complex(
    input: &[Complex32],
    re: &mut [f32],
    im: &mut [f32],
) -> Result<(), FftError> {
    check_lanes(input.len(), re.len(), im.len())?;
    for ((c, r), i) in input.iter().zip(re.iter_mut()).zip(im.iter_mut()) {
        *r = c.re;
        *i = c.im;
    }
    Ok(())
}

/// Gather split lanes back into interleaved complex values.
pub fn copy_to_complex(re: &[f32], im: &[f32], out: &mut [Complex32]) -> Result<(), FftError> {
    check_lanes(out.len(), re.len(), im.len())?;
    for ((c, &r), &i) in out.iter_mut().zip(re.iter()).zip(im.iter()) {
        c.re = r;
        c.im = i;
    }
    Ok(())
}

/// Split `src` into its even-indexed samples (`even`) and odd-indexed samples
/// (`odd`).
pub fn deinterleave(src: &[f32], even: &mut [f32], odd: &mut [f32]) -> Result<(), FftError> {
    check_lanes(src.len() / 2, even.len(), odd.len())?;
    if src.len() % 2 != 0 {
        return Err(FftError::UnsupportedLength(src.len()));
    }
    for ((pair, e), o) in src.chunks_exact(2).zip(even.iter_mut()).zip(odd.iter_mut()) {
        *e = pair[0];
        *o = pair[1];
    }
    Ok(())
}

/// Inverse of [`deinterleave`].
pub fn interleave(even: &[f32], odd: &[f32], dst: &mut [f32]) -> Result<(), FftError> {
    if dst.len() % 2 != 0 {
        return Err(FftError::UnsupportedLength(dst.len()));
    }
    check_lanes(dst.len() / 2, even.len(), odd.len())?;
    for ((pair, &e), &o) in dst.chunks_exact_mut(2).zip(even.iter()).zip(odd.iter()) {
        pair[0] = e;
        pair[1] = o;
    }
    Ok(())
}

fn check_lanes(expected: usize, re: usize, im: usize) -> Result<(), FftError> {
    if re != expected {
        return Err(FftError::MismatchedLengths {
            expected,
            actual: re,
        });
    }
    if im != expected {
        return Err(FftError::MismatchedLengths {
            expected,
            actual: im,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn complex_mul_matches_definition() {
        let a = Complex32::new(1.0, -2.0);
        let b = Complex32::new(3.0, 4.0);
        let c = a.mul(b);
        assert!((c.re - 11.0).abs() < 1e-6);
        assert!((c.im - -2.0).abs() < 1e-6);
        let n = -a;
        assert_eq!(n.re, -1.0);
        assert_eq!(n.im, 2.0);
        assert_eq!(a.conj(), Complex32::new(1.0, 2.0));
    }

    #[test]
    fn expi_is_unit_magnitude() {
        for k in 0..64 {
            let w = Complex32::expi(k as f64 * 0.1);
            assert!((w.norm_sqr() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn split_from_halves() {
        let mut buf = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let split = SplitComplex::from_halves(&mut buf).unwrap();
        assert_eq!(split.len(), 3);
        assert_eq!(split.get(1), Some(Complex32::new(2.0, 5.0)));
        assert_eq!(split.get(3), None);

        let mut odd = [0.0f32; 3];
        assert_eq!(
            SplitComplex::from_halves(&mut odd).unwrap_err(),
            FftError::UnsupportedLength(3)
        );
    }

    #[test]
    fn split_rejects_mismatched_lanes() {
        let mut re = [0.0f32; 4];
        let mut im = [0.0f32; 3];
        assert_eq!(
            SplitComplex::new(&mut re, &mut im).unwrap_err(),
            FftError::MismatchedLengths {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn copy_roundtrip() {
        let data = vec![Complex32::new(1.0, -1.0), Complex32::new(2.0, -2.0)];
        let mut re = [0.0f32; 2];
        let mut im = [0.0f32; 2];
        let mut split = SplitComplex::new(&mut re, &mut im).unwrap();
        split.copy_from_complex(&data).unwrap();
        let mut back = vec![Complex32::zero(); 2];
        split.copy_to_complex(&mut back).unwrap();
        assert_eq!(back, data);

        let mut short = vec![Complex32::zero(); 1];
        assert!(split.copy_to_complex(&mut short).is_err());
    }

    #[test]
    fn deinterleave_splits_even_and_odd() {
        let src = [0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0];
        let mut even = [0.0f32; 3];
        let mut odd = [0.0f32; 3];
        deinterleave(&src, &mut even, &mut odd).unwrap();
        assert_eq!(even, [0.0, 2.0, 4.0]);
        assert_eq!(odd, [1.0, 3.0, 5.0]);

        let mut back = [0.0f32; 6];
        interleave(&even, &odd, &mut back).unwrap();
        assert_eq!(back, src);

        let mut wrong = [0.0f32; 4];
        assert!(interleave(&even, &odd, &mut wrong).is_err());
    }
}
