use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_PACKAGE: &str = "ingest_validation_lambda";
/// Binaries that speak the Lambda runtime API and ship as `bootstrap` zips.
const LAMBDA_BINARIES: [&str; 1] = ["trigger_lambda"];
/// Run-once batch binaries, shipped as plain executables.
const JOB_BINARIES: [&str; 1] = ["partition_job"];
const DIST_DIR: &str = "infra/ingest_validation/dist";

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the ingest validation workspace",
    long_about = "A unified CLI for CI checks, local partition runs,\n\
                  and Lambda artifact packaging in the ingest validation workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Run the partition job against a local object root instead of S3
    PartitionLocal {
        /// Directory laid out as <root>/<bucket>/<key>
        #[arg(long, default_value = "local-objects")]
        root: String,
        /// Bucket holding the source CSV
        #[arg(long)]
        bucket: String,
        /// Key of the source CSV
        #[arg(long)]
        key: String,
        /// Optional rules document key
        #[arg(long)]
        rules_key: Option<String>,
    },
    /// Build and package Rust Lambda artifacts for Terraform inputs
    ServerlessPackage {
        /// Compilation target triple for Lambda binaries
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for binaries
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting and clippy
    Lint,
    /// Workspace tests
    Test,
    /// Lint + test
    Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package_serverless_lambdas(target: &str, profile: BuildProfile) {
    ensure_rust_target_installed(target);

    step("Build ingest validation binaries");

    let mut cargo_args = vec!["build", "-p", LAMBDA_PACKAGE, "--target", target];
    for binary in LAMBDA_BINARIES.into_iter().chain(JOB_BINARIES) {
        cargo_args.extend(["--bin", binary]);
    }
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package Terraform lambda zip artifacts and job binaries");
    let target_dir = Path::new("target").join(target).join(profile.dir_name());
    let dist_dir = Path::new(DIST_DIR);
    fs::create_dir_all(dist_dir).expect("failed to create lambda dist directory");

    let mut packaged = Vec::with_capacity(LAMBDA_BINARIES.len() + JOB_BINARIES.len());
    for binary in LAMBDA_BINARIES {
        let zip_path = dist_dir.join(format!("{binary}.zip"));
        package_lambda_zip(&target_dir.join(binary_name(binary, target)), &zip_path);
        packaged.push(zip_path);
    }
    for binary in JOB_BINARIES {
        let file_name = binary_name(binary, target);
        let job_path = dist_dir.join(&file_name);
        copy_job_binary(&target_dir.join(&file_name), &job_path);
        packaged.push(job_path);
    }

    eprintln!("\nPackaged artifacts:");
    for path in packaged {
        eprintln!("- {}", path.display());
    }
}

fn ensure_rust_target_installed(target: &str) {
    let output = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output();

    let output = match output {
        Ok(value) => value,
        Err(error) => {
            eprintln!(
                "warning: failed to run `rustup target list --installed` ({error}); continuing without target preflight"
            );
            return;
        }
    };

    let installed = String::from_utf8_lossy(&output.stdout);
    if output.status.success() && !installed.lines().any(|line| line.trim() == target) {
        panic!(
            "required rust target `{target}` is not installed. install it with `rustup target add {target}` and re-run `cargo run -p xtask -- serverless-package`"
        );
    }
}

fn binary_name(bin_name: &str, target: &str) -> String {
    if target.contains("windows") {
        format!("{bin_name}.exe")
    } else {
        bin_name.to_string()
    }
}

fn package_lambda_zip(binary_path: &Path, zip_path: &Path) {
    if !binary_path.exists() {
        panic!("expected lambda binary at '{}'", binary_path.display());
    }

    let binary = fs::read(binary_path).expect("failed to read lambda binary");
    let file = fs::File::create(zip_path).expect("failed to create lambda zip");
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)
        .expect("failed to start bootstrap entry in lambda zip");
    zip.write_all(&binary)
        .expect("failed to write bootstrap entry");
    zip.finish().expect("failed to finish lambda zip");
}

fn copy_job_binary(binary_path: &Path, dest_path: &Path) {
    if !binary_path.exists() {
        panic!("expected job binary at '{}'", binary_path.display());
    }
    fs::copy(binary_path, dest_path).expect("failed to copy job binary");
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_lint() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);
}

fn ci_test() {
    step("Test ingest_validation_core");
    run_cargo(&["test", "-p", "ingest_validation_core"]);

    step("Test ingest_validation_lambda");
    run_cargo(&["test", "-p", LAMBDA_PACKAGE]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { job } => {
            match job {
                CiJob::Lint => ci_lint(),
                CiJob::Test => ci_test(),
                CiJob::Check => {
                    ci_lint();
                    ci_test();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::PartitionLocal {
            root,
            bucket,
            key,
            rules_key,
        } => {
            let mut args: Vec<&str> = vec![
                "run",
                "-p",
                LAMBDA_PACKAGE,
                "--bin",
                "partition_job",
                "--",
                "--local_root",
                &root,
                "--input_bucket",
                &bucket,
                "--input_key",
                &key,
            ];
            if let Some(rules_key) = rules_key.as_deref() {
                args.extend(["--rules_key", rules_key]);
            }
            run_cargo(&args);
        }
        Commands::ServerlessPackage { target, profile } => {
            package_serverless_lambdas(&target, profile);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_runtime_binaries_ship_as_lambda_zips() {
        assert_eq!(LAMBDA_BINARIES, ["trigger_lambda"]);
        assert!(JOB_BINARIES.contains(&"partition_job"));
        assert!(LAMBDA_BINARIES
            .iter()
            .all(|binary| !JOB_BINARIES.contains(binary)));
    }

    #[test]
    fn job_binary_is_copied_unzipped() {
        let dir = std::env::temp_dir().join(format!("xtask-copy-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("temp dir");
        let source = dir.join("partition_job");
        fs::write(&source, b"\x7fELF").expect("write binary");

        let dest = dir.join("dist-partition_job");
        copy_job_binary(&source, &dest);
        assert_eq!(fs::read(&dest).expect("copied binary"), b"\x7fELF");

        fs::remove_dir_all(&dir).expect("cleanup");
    }
}
