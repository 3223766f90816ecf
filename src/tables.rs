//! Twiddle and permutation tables for the mixed-radix core.
//!
//! A core of `P = 2^m` points (`8 <= P <= 4096`) is factored as
//! `P = 8 · 4^a · 2^b`. The forward transform runs an optional radix-2 stage at
//! span `P`, then radix-4 stages with shrinking spans down to 32, and finishes
//! with a radix-8 combine over contiguous blocks of eight points. Each stage's
//! twiddles are stored in groups of [`LANES`] butterfly columns so the kernels
//! can stream them with unit stride:
//!
//! * radix-2: `[cos ×8, sin ×8]`
//! * radix-4: `[w(2j).re ×8, w(2j).im ×8, w(j).re ×8, w(j).im ×8, w(3j).re ×8, w(3j).im ×8]`
//!
//! The radix-4 kernel writes its outputs in bit-reversed slot order, which is
//! why the `2j` rotation comes first.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::f64::consts::PI;
use core::ops::Range;

use crate::fft::FftError;
use crate::num::Complex32;
use crate::{LANES, MAX_LEN, MIN_LEN};

/// Smallest supported core, the bare radix-8 combine.
pub const MIN_CORE_LOG2: u32 = 3;
pub const MAX_CORE_LOG2: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Two,
    Four,
}

impl Radix {
    pub const fn value(self) -> usize {
        match self {
            Radix::Two => 2,
            Radix::Four => 4,
        }
    }

    /// Floats stored per butterfly column.
    const fn floats_per_column(self) -> usize {
        match self {
            Radix::Two => 2,
            Radix::Four => 6,
        }
    }
}

/// One butterfly stage of the forward plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub radix: Radix,
    pub log2_span: u32,
    twiddles: Range<usize>,
}

impl Stage {
    pub fn span(&self) -> usize {
        1 << self.log2_span
    }

    /// Butterfly columns per span.
    pub fn columns(&self) -> usize {
        self.span() / self.radix.value()
    }

    pub(crate) fn twiddle_range(&self) -> Range<usize> {
        self.twiddles.clone()
    }
}

/// Immutable per-length tables, shared through `Arc` by every engine of that
/// core length.
#[derive(Debug, Clone, PartialEq)]
pub struct FftTables {
    log2_len: u32,
    stages: Vec<Stage>,
    twiddles: Vec<f32>,
    order: Vec<u32>,
}

impl FftTables {
    pub fn new(len: usize) -> Result<Self, FftError> {
        Ok(Self::build(core_log2(len)?))
    }

    fn build(log2_len: u32) -> Self {
        let mut twiddles = Vec::new();
        let mut stages = Vec::new();
        for (radix, log2_span) in stage_plan(log2_len) {
            let start = twiddles.len();
            push_stage_twiddles(&mut twiddles, radix, log2_span);
            stages.push(Stage {
                radix,
                log2_span,
                twiddles: start..twiddles.len(),
            });
        }
        let order = block_order(log2_len);
        debug_log!(
            "blockfft: built tables for {} points ({} stages, {} twiddle floats)",
            1usize << log2_len,
            stages.len(),
            twiddles.len()
        );
        Self {
            log2_len,
            stages,
            twiddles,
            order,
        }
    }

    pub fn len(&self) -> usize {
        1 << self.log2_len
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn log2_len(&self) -> u32 {
        self.log2_len
    }

    /// Butterfly stages in forward order, radix-8 combine excluded.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage_twiddles(&self, stage: &Stage) -> &[f32] {
        &self.twiddles[stage.twiddle_range()]
    }

    pub fn twiddles(&self) -> &[f32] {
        &self.twiddles
    }

    /// Output offset of each radix-8 block.
    pub fn order(&self) -> &[u32] {
        &self.order
    }
}

/// log2 of a core length, or `UnsupportedLength` when it is not a power of two
/// in `[8, 4096]`.
pub(crate) fn core_log2(len: usize) -> Result<u32, FftError> {
    if !len.is_power_of_two() {
        return Err(FftError::UnsupportedLength(len));
    }
    let log2 = len.trailing_zeros();
    if !(MIN_CORE_LOG2..=MAX_CORE_LOG2).contains(&log2) {
        return Err(FftError::UnsupportedLength(len));
    }
    Ok(log2)
}

/// Validate a public transform length.
pub(crate) fn check_transform_len(len: usize) -> Result<(), FftError> {
    if !len.is_power_of_two() || !(MIN_LEN..=MAX_LEN).contains(&len) {
        return Err(FftError::UnsupportedLength(len));
    }
    Ok(())
}

fn stage_plan(log2_len: u32) -> Vec<(Radix, u32)> {
    let extra = log2_len - MIN_CORE_LOG2;
    let mut plan = Vec::with_capacity(1 + extra as usize / 2);
    let mut log2_span = log2_len;
    if extra % 2 == 1 {
        plan.push((Radix::Two, log2_span));
        log2_span -= 1;
    }
    for _ in 0..extra / 2 {
        plan.push((Radix::Four, log2_span));
        log2_span -= 2;
    }
    debug_assert_eq!(log2_span, MIN_CORE_LOG2);
    plan
}

fn push_stage_twiddles(out: &mut Vec<f32>, radix: Radix, log2_span: u32) {
    let span = 1usize << log2_span;
    let columns = span / radix.value();
    out.reserve(columns * radix.floats_per_column());
    let rotation = |k: usize| Complex32::expi(-2.0 * PI * k as f64 / span as f64);
    for group in (0..columns).step_by(LANES) {
        let multipliers: &[usize] = match radix {
            Radix::Two => &[1],
            Radix::Four => &[2, 1, 3],
        };
        for &m in multipliers {
            out.extend((group..group + LANES).map(|j| rotation(m * j).re));
            out.extend((group..group + LANES).map(|j| rotation(m * j).im));
        }
    }
}

fn block_order(log2_len: u32) -> Vec<u32> {
    let bits = log2_len - MIN_CORE_LOG2;
    let blocks = 1u32 << bits;
    (0..blocks)
        .map(|b| if bits == 0 { 0 } else { b.reverse_bits() >> (32 - bits) })
        .collect()
}

/// Real-FFT post-processing twiddles `exp(−2πik/n)` for `k < n/4`.
pub fn real_twiddles(n: usize) -> Result<Arc<[Complex32]>, FftError> {
    check_transform_len(n)?;
    Ok((0..n / 4)
        .map(|k| Complex32::expi(-2.0 * PI * k as f64 / n as f64))
        .collect())
}

/// IMDCT pre/post twiddles `exp(+iπ(8k+1)/(8n))` for `k < n/2`.
pub fn imdct_twiddles(n: usize) -> Result<Arc<[Complex32]>, FftError> {
    check_transform_len(n)?;
    Ok((0..n / 2)
        .map(|k| Complex32::expi(PI * (8 * k + 1) as f64 / (8 * n) as f64))
        .collect())
}
