use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::process::Command;
use xtask::*;

#[derive(Parser)]
#[command(author, version, about = "Development tasks for blockfft")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    Build,
    Test,
    /// Run the tests with BLOCKFFT_DISABLE_SIMD=1
    #[command(name = "test-scalar")]
    TestScalar,
    /// Build without the standard library
    #[command(name = "no-std")]
    NoStd,
    Clippy,
    Fmt,
    /// fmt, then clippy
    Analyze,
    /// Criterion benches against rustfft and realfft
    Bench,
}

fn run(mut cmd: Command) -> Result<()> {
    let status = cmd
        .status()
        .with_context(|| format!("failed to spawn {:?}", cmd.get_program()))?;
    if !status.success() {
        bail!("{:?} exited with {}", cmd.get_program(), status);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = detect_config();

    match cli.command {
        Commands::Build => run(build_command(&cfg)),
        Commands::Test => run(test_command(&cfg)),
        Commands::TestScalar => run(test_scalar_command(&cfg)),
        Commands::NoStd => run(no_std_command()),
        Commands::Clippy => run(clippy_command()),
        Commands::Fmt => run(fmt_command()),
        Commands::Analyze => {
            run(fmt_command())?;
            run(clippy_command())
        }
        Commands::Bench => run(bench_command(&cfg)),
    }
}
