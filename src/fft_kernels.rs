//! Portable butterfly kernels.
//!
//! Stage kernels operate in place on the split lanes of a whole core buffer and
//! are const-generic over `log2(span)`, so each span gets its own specialised
//! loop. [`stage_kernel`] maps a runtime span to the matching instantiation;
//! plans resolve it once and keep the `fn` pointer.
//!
//! Forward stages decimate in frequency (twiddle after the butterfly), inverse
//! stages decimate in time (conjugate twiddle before the butterfly), so every
//! inverse stage undoes its forward counterpart up to a factor of the radix.

use crate::fft::Direction;
use crate::num::mul_add;
use crate::tables::Radix;
use crate::LANES;

/// In-place stage over `(re, im)` using the stage's twiddle groups.
pub(crate) type StageFn = fn(&mut [f32], &mut [f32], &[f32]);

macro_rules! span_dispatch {
    ($kernel:ident, $log2:expr, [$($n:literal),* $(,)?]) => {
        match $log2 {
            $($n => Some($kernel::<$n> as StageFn),)*
            _ => None,
        }
    };
}

/// Scalar kernel for a stage, if `log2_span` is one the plans can produce.
pub(crate) fn stage_kernel(radix: Radix, dir: Direction, log2_span: u32) -> Option<StageFn> {
    match (radix, dir) {
        (Radix::Two, Direction::Forward) => {
            span_dispatch!(dif_radix2, log2_span, [4, 6, 8, 10, 12])
        }
        (Radix::Two, Direction::Inverse) => {
            span_dispatch!(dit_radix2, log2_span, [4, 6, 8, 10, 12])
        }
        (Radix::Four, Direction::Forward) => {
            span_dispatch!(dif_radix4, log2_span, [5, 6, 7, 8, 9, 10, 11, 12])
        }
        (Radix::Four, Direction::Inverse) => {
            span_dispatch!(dit_radix4, log2_span, [5, 6, 7, 8, 9, 10, 11, 12])
        }
    }
}

pub(crate) fn dif_radix2<const LOG2_SPAN: u32>(re: &mut [f32], im: &mut [f32], tw: &[f32]) {
    let span = 1usize << LOG2_SPAN;
    let half = span / 2;
    for (re, im) in re.chunks_exact_mut(span).zip(im.chunks_exact_mut(span)) {
        let (re0, re1) = re.split_at_mut(half);
        let (im0, im1) = im.split_at_mut(half);
        for (g, w) in tw.chunks_exact(2 * LANES).enumerate() {
            let (wr, wi) = w.split_at(LANES);
            let base = g * LANES;
            for l in 0..LANES {
                let j = base + l;
                let (ar, ai) = (re0[j], im0[j]);
                let (br, bi) = (re1[j], im1[j]);
                re0[j] = ar + br;
                im0[j] = ai + bi;
                let (dr, di) = (ar - br, ai - bi);
                re1[j] = mul_add(dr, wr[l], -(di * wi[l]));
                im1[j] = mul_add(dr, wi[l], di * wr[l]);
            }
        }
    }
}

pub(crate) fn dit_radix2<const LOG2_SPAN: u32>(re: &mut [f32], im: &mut [f32], tw: &[f32]) {
    let span = 1usize << LOG2_SPAN;
    let half = span / 2;
    for (re, im) in re.chunks_exact_mut(span).zip(im.chunks_exact_mut(span)) {
        let (re0, re1) = re.split_at_mut(half);
        let (im0, im1) = im.split_at_mut(half);
        for (g, w) in tw.chunks_exact(2 * LANES).enumerate() {
            let (wr, wi) = w.split_at(LANES);
            let base = g * LANES;
            for l in 0..LANES {
                let j = base + l;
                let (ar, ai) = (re0[j], im0[j]);
                let (xr, xi) = (re1[j], im1[j]);
                let br = mul_add(xr, wr[l], xi * wi[l]);
                let bi = mul_add(xi, wr[l], -(xr * wi[l]));
                re0[j] = ar + br;
                im0[j] = ai + bi;
                re1[j] = ar - br;
                im1[j] = ai - bi;
            }
        }
    }
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
            let base = g * LANES;
            for l in 0..LANES {
                let j = base + l;
                let (a0r, a0i) = (re0[j] + re2[j], im0[j] + im2[j]);
                let (a1r, a1i) = (re0[j] - re2[j], im0[j] - im2[j]);
                let (b0r, b0i) = (re1[j] + re3[j], im1[j] + im3[j]);
                let (b1r, b1i) = (re1[j] - re3[j], im1[j] - im3[j]);

                re0[j] = a0r + b0r;
                im0[j] = a0i + b0i;

                let (w2r, w2i) = (w[l], w[LANES + l]);
                let (w1r, w1i) = (w[2 * LANES + l], w[3 * LANES + l]);
                let (w3r, w3i) = (w[4 * LANES + l], w[5 * LANES + l]);

                let (cr, ci) = (a0r - b0r, a0i - b0i);
                re1[j] = mul_add(cr, w2r, -(ci * w2i));
                im1[j] = mul_add(cr, w2i, ci * w2r);

                // a1 − j·b1
                let (cr, ci) = (a1r + b1i, a1i - b1r);
                re2[j] = mul_add(cr, w1r, -(ci * w1i));
                im2[j] = mul_add(cr, w1i, ci * w1r);

                // a1 + j·b1
                let (cr, ci) = (a1r - b1i, a1i + b1r);
                re3[j] = mul_add(cr, w3r, -(ci * w3i));
                im3[j] = mul_add(cr, w3i, ci * w3r);
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
            let base = g * LANES;
            for l in 0..LANES {
                let j = base + l;
                let (w2r, w2i) = (w[l], w[LANES + l]);
                let (w1r, w1i) = (w[2 * LANES + l], w[3 * LANES + l]);
                let (w3r, w3i) = (w[4 * LANES + l], w[5 * LANES + l]);

                let (u0r, u0i) = (re0[j], im0[j]);
                let (u1r, u1i) = (
                    mul_add(re1[j], w2r, im1[j] * w2i),
                    mul_add(im1[j], w2r, -(re1[j] * w2i)),
                );
                let (u2r, u2i) = (
                    mul_add(re2[j], w1r, im2[j] * w1i),
                    mul_add(im2[j], w1r, -(re2[j] * w1i)),
                );
                let (u3r, u3i) = (
                    mul_add(re3[j], w3r, im3[j] * w3i),
                    mul_add(im3[j], w3r, -(re3[j] * w3i)),
                );

                let (s0r, s0i) = (u0r + u1r, u0i + u1i);
                let (d0r, d0i) = (u0r - u1r, u0i - u1i);
                let (s1r, s1i) = (u2r + u3r, u2i + u3i);
                // j·(u2 − u3)
                let (d1r, d1i) = (u3i - u2i, u2r - u3r);

                re0[j] = s0r + s1r;
                im0[j] = s0i + s1i;
                re2[j] = s0r - s1r;
                im2[j] = s0i - s1i;
                re1[j] = d0r + d1r;
                im1[j] = d0i + d1i;
                re3[j] = d0r - d1r;
                im3[j] = d0i - d1i;
            }
        }
    }
}

/// Forward radix-8 combine: 8-point DFT of each contiguous block of `src`,
/// scattered into `dst` at `order[b] + q·P/8`.
pub(crate) fn dif_radix8(
    src_re: &[f32],
    src_im: &[f32],
    dst_re: &mut [f32],
    dst_im: &mut [f32],
    order: &[u32],
) {
    let stride = src_re.len() / 8;
    for ((sr, si), &base) in src_re
        .chunks_exact(8)
        .zip(src_im.chunks_exact(8))
        .zip(order)
    {
        let mut r = [0.0f32; 8];
        let mut i = [0.0f32; 8];
        r.copy_from_slice(sr);
        i.copy_from_slice(si);
        dft8::<false>(&mut r, &mut i);
        let base = base as usize;
        for q in 0..8 {
            dst_re[base + q * stride] = r[q];
            dst_im[base + q * stride] = i[q];
        }
    }
}

/// Inverse radix-8 combine: gathers each block from the positions
/// [`dif_radix8`] scatters to and writes its inverse 8-point DFT contiguously.
pub(crate) fn dit_radix8(
    src_re: &[f32],
    src_im: &[f32],
    dst_re: &mut [f32],
    dst_im: &mut [f32],
    order: &[u32],
) {
    let stride = src_re.len() / 8;
    for ((dr, di), &base) in dst_re
        .chunks_exact_mut(8)
        .zip(dst_im.chunks_exact_mut(8))
        .zip(order)
    {
        let base = base as usize;
        let mut r = [0.0f32; 8];
        let mut i = [0.0f32; 8];
        for q in 0..8 {
            r[q] = src_re[base + q * stride];
            i[q] = src_im[base + q * stride];
        }
        dft8::<true>(&mut r, &mut i);
        dr.copy_from_slice(&r);
        di.copy_from_slice(&i);
    }
}

#[inline(always)]
fn dft8<const INVERSE: bool>(re: &mut [f32; 8], im: &mut [f32; 8]) {
    use core::f32::consts::FRAC_1_SQRT_2 as H;

    let mut ar = [0.0f32; 4];
    let mut ai = [0.0f32; 4];
    let mut dr = [0.0f32; 4];
    let mut di = [0.0f32; 4];
    for n in 0..4 {
        ar[n] = re[n] + re[n + 4];
        ai[n] = im[n] + im[n + 4];
        dr[n] = re[n] - re[n + 4];
        di[n] = im[n] - im[n + 4];
    }

    // Rotate the differences by the eighth roots of unity.
    let (r1, i1) = (dr[1], di[1]);
    let (r2, i2) = (dr[2], di[2]);
    let (r3, i3) = (dr[3], di[3]);
    if INVERSE {
        (dr[1], di[1]) = ((r1 - i1) * H, (r1 + i1) * H);
        (dr[2], di[2]) = (-i2, r2);
        (dr[3], di[3]) = (-(r3 + i3) * H, (r3 - i3) * H);
    } else {
        (dr[1], di[1]) = ((r1 + i1) * H, (i1 - r1) * H);
        (dr[2], di[2]) = (i2, -r2);
        (dr[3], di[3]) = ((i3 - r3) * H, -(r3 + i3) * H);
    }

    let (er, ei) = dft4::<INVERSE>(ar, ai);
    let (or, oi) = dft4::<INVERSE>(dr, di);
    for k in 0..4 {
        re[2 * k] = er[k];
        im[2 * k] = ei[k];
        re[2 * k + 1] = or[k];
        im[2 * k + 1] = oi[k];
    }
}

#[inline(always)]
fn dft4<const INVERSE: bool>(re: [f32; 4], im: [f32; 4]) -> ([f32; 4], [f32; 4]) {
    let (e0r, e0i) = (re[0] + re[2], im[0] + im[2]);
    let (f0r, f0i) = (re[0] - re[2], im[0] - im[2]);
    let (e1r, e1i) = (re[1] + re[3], im[1] + im[3]);
    let (gr, gi) = (re[1] - re[3], im[1] - im[3]);
    let (f1r, f1i) = if INVERSE { (-gi, gr) } else { (gi, -gr) };
    (
        [e0r + e1r, f0r + f1r, e0r - e1r, f0r - f1r],
        [e0i + e1i, f0i + f1i, e0i - e1i, f0i - f1i],
    )
}
