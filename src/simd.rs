//! SSE kernels for x86_64.
//!
//! Each lane group of [`LANES`] columns is processed as two 4-wide halves.
//! The arithmetic is the same as the portable kernels in `fft_kernels`, without
//! fused multiply-adds, so results agree to within rounding.

use core::arch::x86_64::*;

use crate::fft::Direction;
use crate::fft_kernels::StageFn;
use crate::tables::Radix;
use crate::LANES;

macro_rules! span_dispatch {
    ($kernel:ident, $log2:expr, [$($n:literal),* $(,)?]) => {
        match $log2 {
            $($n => Some($kernel::<$n> as StageFn),)*
            _ => None,
        }
    };
}

/// SSE kernel for a stage, or `None` when only the scalar kernel exists.
pub(crate) fn stage_kernel(radix: Radix, dir: Direction, log2_span: u32) -> Option<StageFn> {
    match (radix, dir) {
        (Radix::Four, Direction::Forward) => {
            span_dispatch!(dif_radix4, log2_span, [5, 6, 7, 8, 9, 10, 11, 12])
        }
        (Radix::Four, Direction::Inverse) => {
            span_dispatch!(dit_radix4, log2_span, [5, 6, 7, 8, 9, 10, 11, 12])
        }
        (Radix::Two, _) => None,
    }
}

#[inline(always)]
unsafe fn cmul(ar: __m128, ai: __m128, wr: __m128, wi: __m128) -> (__m128, __m128) {
    (
        _mm_sub_ps(_mm_mul_ps(ar, wr), _mm_mul_ps(ai, wi)),
        _mm_add_ps(_mm_mul_ps(ar, wi), _mm_mul_ps(ai, wr)),
    )
}

/// `a · conj(w)`
#[inline(always)]
unsafe fn cmul_conj(ar: __m128, ai: __m128, wr: __m128, wi: __m128) -> (__m128, __m128) {
    (
        _mm_add_ps(_mm_mul_ps(ar, wr), _mm_mul_ps(ai, wi)),
        _mm_sub_ps(_mm_mul_ps(ai, wr), _mm_mul_ps(ar, wi)),
    )
}

pub(crate) fn dif_radix4<const LOG2_SPAN: u32>(re: &mut [f32], im: &mut [f32], tw: &[f32]) {
    let span = 1usize << LOG2_SPAN;
    let quarter = span / 4;
    for (re, im) in re.chunks_exact_mut(span).zip(im.chunks_exact_mut(span)) {
        let (re01, re23) = re.split_at_mut(2 * quarter);
        let (re0, re1) = re01.split_at_mut(quarter);
        let (re2, re3) = re23.split_at_mut(quarter);
        let (im01, im23) = im.split_at_mut(2 * quarter);
        let (im0, im1) = im01.split_at_mut(quarter);
        let (im2, im3) = im23.split_at_mut(quarter);
        for (g, w) in tw.chunks_exact(6 * LANES).enumerate() {
            for h in (0..LANES).step_by(4) {
                let j = g * LANES + h;
                // SAFETY: quarter is a multiple of LANES, so j + 4 <= quarter for
                // every lane group, and each group holds 6·LANES twiddles.
                unsafe {
                    let x0r = _mm_loadu_ps(re0.as_ptr().add(j));
                    let x0i = _mm_loadu_ps(im0.as_ptr().add(j));
                    let x1r = _mm_loadu_ps(re1.as_ptr().add(j));
                    let x1i = _mm_loadu_ps(im1.as_ptr().add(j));
                    let x2r = _mm_loadu_ps(re2.as_ptr().add(j));
                    let x2i = _mm_loadu_ps(im2.as_ptr().add(j));
                    let x3r = _mm_loadu_ps(re3.as_ptr().add(j));
                    let x3i = _mm_loadu_ps(im3.as_ptr().add(j));

                    let a0r = _mm_add_ps(x0r, x2r);
                    let a0i = _mm_add_ps(x0i, x2i);
                    let a1r = _mm_sub_ps(x0r, x2r);
                    let a1i = _mm_sub_ps(x0i, x2i);
                    let b0r = _mm_add_ps(x1r, x3r);
                    let b0i = _mm_add_ps(x1i, x3i);
                    let b1r = _mm_sub_ps(x1r, x3r);
                    let b1i = _mm_sub_ps(x1i, x3i);

                    let w2r = _mm_loadu_ps(w.as_ptr().add(h));
                    let w2i = _mm_loadu_ps(w.as_ptr().add(LANES + h));
                    let w1r = _mm_loadu_ps(w.as_ptr().add(2 * LANES + h));
                    let w1i = _mm_loadu_ps(w.as_ptr().add(3 * LANES + h));
                    let w3r = _mm_loadu_ps(w.as_ptr().add(4 * LANES + h));
                    let w3i = _mm_loadu_ps(w.as_ptr().add(5 * LANES + h));

                    _mm_storeu_ps(re0.as_mut_ptr().add(j), _mm_add_ps(a0r, b0r));
                    _mm_storeu_ps(im0.as_mut_ptr().add(j), _mm_add_ps(a0i, b0i));

                    let (yr, yi) = cmul(_mm_sub_ps(a0r, b0r), _mm_sub_ps(a0i, b0i), w2r, w2i);
                    _mm_storeu_ps(re1.as_mut_ptr().add(j), yr);
                    _mm_storeu_ps(im1.as_mut_ptr().add(j), yi);

                    let (yr, yi) = cmul(_mm_add_ps(a1r, b1i), _mm_sub_ps(a1i, b1r), w1r, w1i);
                    _mm_storeu_ps(re2.as_mut_ptr().add(j), yr);
                    _mm_storeu_ps(im2.as_mut_ptr().add(j), yi);

                    let (yr, yi) = cmul(_mm_sub_ps(a1r, b1i), _mm_add_ps(a1i, b1r), w3r, w3i);
                    _mm_storeu_ps(re3.as_mut_ptr().add(j), yr);
                    _mm_storeu_ps(im3.as_mut_ptr().add(j), yi);
                }
            }
        }
    }
}

pub(crate) fn dit_radix4<const LOG2_SPAN: u32>(re: &mut [f32], im: &mut [f32], tw: &[f32]) {
    let span = 1usize << LOG2_SPAN;
    let quarter = span / 4;
    for (re, im) in re.chunks_exact_mut(span).zip(im.chunks_exact_mut(span)) {
        let (re01, re23) = re.split_at_mut(2 * quarter);
        let (re0, re1) = re01.split_at_mut(quarter);
        let (re2, re3) = re23.split_at_mut(quarter);
        let (im01, im23) = im.split_at_mut(2 * quarter);
        let (im0, im1) = im01.split_at_mut(quarter);
        let (im2, im3) = im23.split_at_mut(quarter);
        for (g, w) in tw.chunks_exact(6 * LANES).enumerate() {
            for h in (0..LANES).step_by(4) {
                let j = g * LANES + h;
                // SAFETY: same bounds as in `dif_radix4`.
                unsafe {
                    let w2r = _mm_loadu_ps(w.as_ptr().add(h));
                    let w2i = _mm_loadu_ps(w.as_ptr().add(LANES + h));
                    let w1r = _mm_loadu_ps(w.as_ptr().add(2 * LANES + h));
                    let w1i = _mm_loadu_ps(w.as_ptr().add(3 * LANES + h));
                    let w3r = _mm_loadu_ps(w.as_ptr().add(4 * LANES + h));
                    let w3i = _mm_loadu_ps(w.as_ptr().add(5 * LANES + h));

                    let u0r = _mm_loadu_ps(re0.as_ptr().add(j));
                    let u0i = _mm_loadu_ps(im0.as_ptr().add(j));
                    let (u1r, u1i) = cmul_conj(
                        _mm_loadu_ps(re1.as_ptr().add(j)),
                        _mm_loadu_ps(im1.as_ptr().add(j)),
                        w2r,
                        w2i,
                    );
                    let (u2r, u2i) = cmul_conj(
                        _mm_loadu_ps(re2.as_ptr().add(j)),
                        _mm_loadu_ps(im2.as_ptr().add(j)),
                        w1r,
                        w1i,
                    );
                    let (u3r, u3i) = cmul_conj(
                        _mm_loadu_ps(re3.as_ptr().add(j)),
                        _mm_loadu_ps(im3.as_ptr().add(j)),
                        w3r,
                        w3i,
                    );

                    let s0r = _mm_add_ps(u0r, u1r);
                    let s0i = _mm_add_ps(u0i, u1i);
                    let d0r = _mm_sub_ps(u0r, u1r);
                    let d0i = _mm_sub_ps(u0i, u1i);
                    let s1r = _mm_add_ps(u2r, u3r);
                    let s1i = _mm_add_ps(u2i, u3i);
                    let d1r = _mm_sub_ps(u3i, u2i);
                    let d1i = _mm_sub_ps(u2r, u3r);

                    _mm_storeu_ps(re0.as_mut_ptr().add(j), _mm_add_ps(s0r, s1r));
                    _mm_storeu_ps(im0.as_mut_ptr().add(j), _mm_add_ps(s0i, s1i));
                    _mm_storeu_ps(re2.as_mut_ptr().add(j), _mm_sub_ps(s0r, s1r));
                    _mm_storeu_ps(im2.as_mut_ptr().add(j), _mm_sub_ps(s0i, s1i));
                    _mm_storeu_ps(re1.as_mut_ptr().add(j), _mm_add_ps(d0r, d1r));
                    _mm_storeu_ps(im1.as_mut_ptr().add(j), _mm_add_ps(d0i, d1i));
                    _mm_storeu_ps(re3.as_mut_ptr().add(j), _mm_sub_ps(d0r, d1r));
                    _mm_storeu_ps(im3.as_mut_ptr().add(j), _mm_sub_ps(d0i, d1i));
                }
            }
        }
    }
}

/// Complex multiply-accumulate over interleaved `(re, im)` pairs, two pairs per
/// register. All three slices have the same length, a multiple of 4; the tail
/// is left to the caller.
pub(crate) fn multiply_add_pairs(dst: &mut [f32], src1: &[f32], src2: &[f32]) {
    let len = dst.len() & !3;
    // SAFETY: every access is below `len`, which is within all three slices.
    unsafe {
        let sign = _mm_set_ps(1.0, -1.0, 1.0, -1.0);
        for i in (0..len).step_by(4) {
            // a = [r0, i0, r1, i1], b = [s0, t0, s1, t1]
            let a = _mm_loadu_ps(src1.as_ptr().add(i));
            let b = _mm_loadu_ps(src2.as_ptr().add(i));
            let acc = _mm_loadu_ps(dst.as_ptr().add(i));
            let a_re = _mm_shuffle_ps::<0b10_10_00_00>(a, a);
            let a_im = _mm_shuffle_ps::<0b11_11_01_01>(a, a);
            let b_swap = _mm_shuffle_ps::<0b10_11_00_01>(b, b);
            // [r·s − i·t, r·t + i·s]
            let prod = _mm_add_ps(
                _mm_mul_ps(a_re, b),
                _mm_mul_ps(_mm_mul_ps(a_im, b_swap), sign),
            );
            _mm_storeu_ps(dst.as_mut_ptr().add(i), _mm_add_ps(acc, prod));
        }
    }
}
