use std::env;
use std::process::Command;

/// Environment variable with extra space-separated cargo features.
pub const FEATURES_ENV: &str = "BLOCKFFT_FEATURES";

/// Options derived from the host machine used to configure cargo commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub features: Vec<String>,
    pub rustflags: Option<String>,
}

impl BuildConfig {
    /// Join features into a single string suitable for passing to cargo.
    pub fn features_arg(&self) -> Option<String> {
        if self.features.is_empty() {
            None
        } else {
            Some(self.features.join(" "))
        }
    }
}

/// Detect build configuration from the current machine.
pub fn detect_config() -> BuildConfig {
    let arch = detect_arch();
    let cpu_flags = detect_cpu_flags();
    let extra = env::var(FEATURES_ENV).unwrap_or_default();
    compute_config(&arch, &cpu_flags, &extra)
}

fn detect_arch() -> String {
    if let Ok(arch) = env::var("ARCH") {
        if !arch.trim().is_empty() {
            return arch;
        }
    }
    Command::new("uname")
        .arg("-m")
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_default()
}

fn detect_cpu_flags() -> String {
    if let Ok(out) = Command::new("lscpu").output() {
        let s = String::from_utf8_lossy(&out.stdout);
        for line in s.lines() {
            if line.to_lowercase().contains("flags") {
                return line.to_string();
            }
        }
    }
    if let Ok(out) = Command::new("sysctl")
        .args(["-n", "machdep.cpu.features"])
        .output()
    {
        return String::from_utf8_lossy(&out.stdout).to_string();
    }
    String::new()
}

/// Compute a [`BuildConfig`] from supplied inputs. This is separated for testing.
pub fn compute_config(arch: &str, cpu_flags: &str, extra: &str) -> BuildConfig {
    let mut features = Vec::new();
    let mut rustflags = None;

    if arch.contains("x86_64") {
        features.push("x86_64".to_string());
        // fused multiply-add in the portable kernels needs the target feature at compile time
        if cpu_flags.split_whitespace().any(|f| f.eq_ignore_ascii_case("fma")) {
            rustflags = Some("-C target-feature=+fma".to_string());
        }
    }

    for feat in extra.split_whitespace() {
        if !features.iter().any(|f| f == feat) {
            features.push(feat.to_string());
        }
    }

    BuildConfig {
        features,
        rustflags,
    }
}

fn cargo(cfg: Option<&BuildConfig>, args: &[&str]) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(args);
    if let Some(cfg) = cfg {
        if let Some(rf) = &cfg.rustflags {
            cmd.env("RUSTFLAGS", rf);
        }
        if let Some(f) = cfg.features_arg() {
            cmd.arg("--features").arg(f);
        }
    }
    cmd
}

pub fn build_command(cfg: &BuildConfig) -> Command {
    cargo(Some(cfg), &["build"])
}

pub fn test_command(cfg: &BuildConfig) -> Command {
    cargo(Some(cfg), &["test"])
}

/// Run the test suite again with the SIMD kernels switched off at runtime.
pub fn test_scalar_command(cfg: &BuildConfig) -> Command {
    let mut cmd = test_command(cfg);
    cmd.env("BLOCKFFT_DISABLE_SIMD", "1");
    cmd
}

/// Check the crate builds without `std`.
pub fn no_std_command() -> Command {
    cargo(None, &["build", "-p", "blockfft", "--no-default-features"])
}

pub fn clippy_command() -> Command {
    cargo(None, &["clippy", "--all-targets", "--all-features"])
}

pub fn fmt_command() -> Command {
    cargo(None, &["fmt", "--all"])
}

pub fn bench_command(cfg: &BuildConfig) -> Command {
    cargo(
        Some(cfg),
        &["bench", "--manifest-path", "blockfft-bench/Cargo.toml"],
    )
}
