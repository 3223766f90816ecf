//! Runtime configuration.
//!
//! Kernel selection can be steered without recompiling. Setting
//! `BLOCKFFT_DISABLE_SIMD=1` (or `true`, `yes`, `on`) in the environment forces
//! the portable kernels even when the crate is built with the `x86_64`
//! feature. [`set_simd_enabled`] overrides the environment for the rest of the
//! process.
//!
//! The choice is read when an engine is planned; engines that already exist
//! keep the kernels they resolved.

use core::sync::atomic::{AtomicU8, Ordering};

/// Environment variable that disables the SSE kernels.
pub const DISABLE_SIMD_ENV: &str = "BLOCKFFT_DISABLE_SIMD";

const FROM_ENV: u8 = 0;
const FORCE_ON: u8 = 1;
const FORCE_OFF: u8 = 2;

static SIMD_OVERRIDE: AtomicU8 = AtomicU8::new(FROM_ENV);

/// Whether this build contains SIMD kernels at all.
pub const fn simd_available() -> bool {
    cfg!(all(target_arch = "x86_64", feature = "x86_64"))
}

/// Force the SIMD kernels on or off. `None` restores the environment-driven
/// default.
pub fn set_simd_enabled(enabled: Option<bool>) {
    let value = match enabled {
        None => FROM_ENV,
        Some(true) => FORCE_ON,
        Some(false) => FORCE_OFF,
    };
    SIMD_OVERRIDE.store(value, Ordering::Relaxed);
}

/// Whether newly planned engines use the SIMD kernels.
pub fn simd_enabled() -> bool {
    if !simd_available() {
        return false;
    }
    match SIMD_OVERRIDE.load(Ordering::Relaxed) {
        FORCE_ON => true,
        FORCE_OFF => false,
        _ => !env_disables_simd(),
    }
}

#[cfg(feature = "std")]
fn env_disables_simd() -> bool {
    use std::sync::OnceLock;
    static DISABLED: OnceLock<bool> = OnceLock::new();
    *DISABLED.get_or_init(|| {
        let disabled = std::env::var(DISABLE_SIMD_ENV)
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        if disabled {
            debug_log!("blockfft: {} set, using portable kernels", DISABLE_SIMD_ENV);
        }
        disabled
    })
}

#[cfg(not(feature = "std"))]
fn env_disables_simd() -> bool {
    false
}

/// Interpret an environment flag value.
pub fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    ["1", "true", "yes", "on"]
        .iter()
        .any(|flag| value.eq_ignore_ascii_case(flag))
}
