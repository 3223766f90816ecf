//! Mixed-radix complex FFT.
//!
//! [`FftPlanner`] caches the per-length [`FftTables`]; [`ComplexFft`] owns a
//! resolved pass list plus the scratch buffer that absorbs the output
//! permutation. Forward transforms decimate in frequency and inverse transforms
//! decimate in time; neither normalises, so `inverse(forward(x)) == N·x`.
//!
//! ```
//! use blockfft::{ComplexFft, SplitComplex};
//!
//! let mut fft = ComplexFft::new(16).unwrap();
//! let mut re = [0.0f32; 16];
//! let mut im = [0.0f32; 16];
//! re[0] = 1.0;
//! fft.forward(SplitComplex::new(&mut re, &mut im).unwrap()).unwrap();
//! assert!(re.iter().all(|&x| (x - 1.0).abs() < 1e-6));
//! ```

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;

use hashbrown::HashMap;

use crate::config;
use crate::fft_kernels::{self, StageFn};
use crate::num::{Complex32, SplitComplex};
use crate::tables::{self, check_transform_len, FftTables, Radix};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftError {
    /// Length is not a power of two in the supported range.
    UnsupportedLength(usize),
    /// A caller buffer does not have the length the engine was planned for.
    MismatchedLengths { expected: usize, actual: usize },
    /// The planner was never prepared for this length.
    TablesNotBuilt(usize),
    /// Spectrum bin index past the Nyquist bin.
    BinOutOfRange(usize),
}

impl fmt::Display for FftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FftError::UnsupportedLength(len) => {
                write!(f, "unsupported transform length {len}")
            }
            FftError::MismatchedLengths { expected, actual } => {
                write!(f, "buffer length {actual} does not match expected {expected}")
            }
            FftError::TablesNotBuilt(len) => {
                write!(f, "no tables prepared for length {len}")
            }
            FftError::BinOutOfRange(bin) => write!(f, "spectrum bin {bin} out of range"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FftError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Inverse,
}

/// Cache of twiddle tables keyed by length.
///
/// Tables are immutable once built and handed out as `Arc`s, so every engine
/// of a given length shares one copy.
#[derive(Debug, Default)]
pub struct FftPlanner {
    tables: HashMap<usize, Arc<FftTables>>,
    real_twiddles: HashMap<usize, Arc<[Complex32]>>,
    imdct_twiddles: HashMap<usize, Arc<[Complex32]>>,
}

fn cached<T: ?Sized>(
    cache: &mut HashMap<usize, Arc<T>>,
    len: usize,
    build: impl FnOnce(usize) -> Result<Arc<T>, FftError>,
) -> Result<Arc<T>, FftError> {
    if let Some(hit) = cache.get(&len) {
        return Ok(Arc::clone(hit));
    }
    let built = build(len)?;
    debug_log!("blockfft: planner cache miss for length {}", len);
    cache.insert(len, Arc::clone(&built));
    Ok(built)
}

impl FftPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables for a complex core of `len` points (`8 <= len <= 4096`), built on
    /// first request.
    pub fn tables(&mut self, len: usize) -> Result<Arc<FftTables>, FftError> {
        cached(&mut self.tables, len, |len| Ok(Arc::new(FftTables::new(len)?)))
    }

    /// Previously built tables; never builds.
    pub fn lookup_tables(&self, len: usize) -> Result<Arc<FftTables>, FftError> {
        self.tables
            .get(&len)
            .cloned()
            .ok_or(FftError::TablesNotBuilt(len))
    }

    pub fn real_twiddles(&mut self, n: usize) -> Result<Arc<[Complex32]>, FftError> {
        cached(&mut self.real_twiddles, n, tables::real_twiddles)
    }

    pub fn lookup_real_twiddles(&self, n: usize) -> Result<Arc<[Complex32]>, FftError> {
        self.real_twiddles
            .get(&n)
            .cloned()
            .ok_or(FftError::TablesNotBuilt(n))
    }

    pub fn imdct_twiddles(&mut self, n: usize) -> Result<Arc<[Complex32]>, FftError> {
        cached(&mut self.imdct_twiddles, n, tables::imdct_twiddles)
    }

    pub fn lookup_imdct_twiddles(&self, n: usize) -> Result<Arc<[Complex32]>, FftError> {
        self.imdct_twiddles
            .get(&n)
            .cloned()
            .ok_or(FftError::TablesNotBuilt(n))
    }

    /// Build every table a [`ComplexFft`], [`RealFft`](crate::RealFft) or
    /// [`Imdct`](crate::Imdct) of length `len` needs, so engines can later be
    /// created with the `from_planner` constructors without building anything.
    pub fn prepare(&mut self, len: usize) -> Result<(), FftError> {
        check_transform_len(len)?;
        self.tables(len)?;
        self.tables(len / 2)?;
        self.real_twiddles(len)?;
        self.imdct_twiddles(len)?;
        Ok(())
    }

    pub fn is_prepared(&self, len: usize) -> bool {
        self.tables.contains_key(&len)
            && self.tables.contains_key(&(len / 2))
            && self.real_twiddles.contains_key(&len)
            && self.imdct_twiddles.contains_key(&len)
    }

    /// Number of cached core tables.
    pub fn cached_tables(&self) -> usize {
        self.tables.len()
    }

    pub fn clear(&mut self) {
        self.tables.clear();
        self.real_twiddles.clear();
        self.imdct_twiddles.clear();
    }
}

/// Process-wide planner used by the `new` constructors.
///
/// Only table construction happens under the lock; a poisoned lock is
/// recovered because the cache is never left half-updated.
#[cfg(feature = "std")]
pub fn shared_planner() -> std::sync::MutexGuard<'static, FftPlanner> {
    use std::sync::{Mutex, OnceLock};
    static PLANNER: OnceLock<Mutex<FftPlanner>> = OnceLock::new();
    PLANNER
        .get_or_init(|| Mutex::new(FftPlanner::new()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

#[derive(Debug, Clone)]
struct Pass {
    kernel: StageFn,
    twiddles: Range<usize>,
}

fn select_kernel(radix: Radix, dir: Direction, log2_span: u32, simd: bool) -> Option<StageFn> {
    #[cfg(all(target_arch = "x86_64", feature = "x86_64"))]
    {
        if simd {
            if let Some(kernel) = crate::simd::stage_kernel(radix, dir, log2_span) {
                return Some(kernel);
            }
        }
    }
    #[cfg(not(all(target_arch = "x86_64", feature = "x86_64")))]
    let _ = simd;
    fft_kernels::stage_kernel(radix, dir, log2_span)
}

fn resolve_passes(tables: &FftTables, dir: Direction, simd: bool) -> Result<Vec<Pass>, FftError> {
    let mut passes = tables
        .stages()
        .iter()
        .map(|stage| {
            let kernel = select_kernel(stage.radix, dir, stage.log2_span, simd)
                .ok_or(FftError::UnsupportedLength(tables.len()))?;
            Ok(Pass {
                kernel,
                twiddles: stage.twiddle_range(),
            })
        })
        .collect::<Result<Vec<_>, FftError>>()?;
    if dir == Direction::Inverse {
        passes.reverse();
    }
    Ok(passes)
}

/// Resolved forward and inverse pass lists over one set of tables.
///
/// Forward runs the stages in place on the input lanes and scatters the
/// radix-8 combine into the output lanes in natural order. Inverse gathers
/// from its input lanes and runs the mirrored stages in place on its output.
#[derive(Debug, Clone)]
pub(crate) struct CoreFft {
    tables: Arc<FftTables>,
    forward: Vec<Pass>,
    inverse: Vec<Pass>,
    simd: bool,
}

impl CoreFft {
    pub(crate) fn new(tables: Arc<FftTables>) -> Result<Self, FftError> {
        let simd = config::simd_enabled();
        debug_log!(
            "blockfft: planning {}-point core with {} kernels",
            tables.len(),
            if simd { "SSE" } else { "portable" }
        );
        Ok(Self {
            forward: resolve_passes(&tables, Direction::Forward, simd)?,
            inverse: resolve_passes(&tables, Direction::Inverse, simd)?,
            tables,
            simd,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.tables.len()
    }

    pub(crate) fn tables(&self) -> &Arc<FftTables> {
        &self.tables
    }

    pub(crate) fn uses_simd(&self) -> bool {
        self.simd
    }

    /// `re`/`im` are clobbered; the spectrum lands in `out_re`/`out_im`.
    pub(crate) fn forward(
        &self,
        re: &mut [f32],
        im: &mut [f32],
        out_re: &mut [f32],
        out_im: &mut [f32],
    ) {
        let twiddles = self.tables.twiddles();
        for pass in &self.forward {
            (pass.kernel)(re, im, &twiddles[pass.twiddles.clone()]);
        }
        fft_kernels::dif_radix8(re, im, out_re, out_im, self.tables.order());
    }

    pub(crate) fn inverse(&self, in_re: &[f32], in_im: &[f32], re: &mut [f32], im: &mut [f32]) {
        fft_kernels::dit_radix8(in_re, in_im, re, im, self.tables.order());
        let twiddles = self.tables.twiddles();
        for pass in &self.inverse {
            (pass.kernel)(re, im, &twiddles[pass.twiddles.clone()]);
        }
    }
}

/// In-place complex FFT over split lanes, `16 <= len <= 4096`.
#[derive(Debug, Clone)]
pub struct ComplexFft {
    core: CoreFft,
    scratch_re: Vec<f32>,
    scratch_im: Vec<f32>,
}

impl ComplexFft {
    /// Plan through the [`shared_planner`].
    #[cfg(feature = "std")]
    pub fn new(len: usize) -> Result<Self, FftError> {
        check_transform_len(len)?;
        let tables = shared_planner().tables(len)?;
        Self::from_tables(tables)
    }

    pub fn with_planner(planner: &mut FftPlanner, len: usize) -> Result<Self, FftError> {
        check_transform_len(len)?;
        Self::from_tables(planner.tables(len)?)
    }

    /// Plan from tables the planner already holds; fails with
    /// [`FftError::TablesNotBuilt`] instead of building them.
    pub fn from_planner(planner: &FftPlanner, len: usize) -> Result<Self, FftError> {
        check_transform_len(len)?;
        Self::from_tables(planner.lookup_tables(len)?)
    }

    fn from_tables(tables: Arc<FftTables>) -> Result<Self, FftError> {
        let len = tables.len();
        Ok(Self {
            core: CoreFft::new(tables)?,
            scratch_re: vec![0.0; len],
            scratch_im: vec![0.0; len],
        })
    }

    pub fn len(&self) -> usize {
        self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn tables(&self) -> &Arc<FftTables> {
        self.core.tables()
    }

    pub fn uses_simd(&self) -> bool {
        self.core.uses_simd()
    }

    pub fn forward(&mut self, data: SplitComplex<'_>) -> Result<(), FftError> {
        self.forward_split(data.re, data.im)
    }

    pub fn inverse(&mut self, data: SplitComplex<'_>) -> Result<(), FftError> {
        self.inverse_split(data.re, data.im)
    }

    pub fn forward_split(&mut self, re: &mut [f32], im: &mut [f32]) -> Result<(), FftError> {
        self.check_lanes(re.len(), im.len())?;
        self.core
            .forward(re, im, &mut self.scratch_re, &mut self.scratch_im);
        re.copy_from_slice(&self.scratch_re);
        im.copy_from_slice(&self.scratch_im);
        Ok(())
    }

    pub fn inverse_split(&mut self, re: &mut [f32], im: &mut [f32]) -> Result<(), FftError> {
        self.check_lanes(re.len(), im.len())?;
        self.core
            .inverse(re, im, &mut self.scratch_re, &mut self.scratch_im);
        re.copy_from_slice(&self.scratch_re);
        im.copy_from_slice(&self.scratch_im);
        Ok(())
    }

    fn check_lanes(&self, re: usize, im: usize) -> Result<(), FftError> {
        let expected = self.len();
        for actual in [re, im] {
            if actual != expected {
                return Err(FftError::MismatchedLengths { expected, actual });
            }
        }
        Ok(())
    }
}
