//! pkiboot CLI application.
//!
//! A thin command-line layer over [`pkiboot::bootstrap`]: `setup` issues the
//! root, server and client material, `verify` checks a directory written by
//! `setup`.

use clap::{CommandFactory, Parser, Subcommand};
use pkiboot::bootstrap::{bootstrap_with_config, verify_destination};
use pkiboot::config::PkiConfig;
use pkiboot::error::{PkiError, Result};
use pkiboot::storage::layout::DEFAULT_DESTINATION_DIR;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pkiboot")]
#[command(about = "Bootstrap a root CA with server and client certificates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Setup certificates
    Setup {
        /// Common name of the root CA
        #[arg(long = "root_cn")]
        root_cn: String,

        /// Common name of the server certificate
        #[arg(long = "server_cn")]
        server_cn: String,

        /// Client certificate common names (may be empty)
        #[arg(
            short = 'c',
            long = "client_list",
            visible_alias = "cl",
            num_args = 0..,
            required = true
        )]
        client_list: Vec<String>,

        /// Destination directory (default: certificates directory next to the install location)
        #[arg(long)]
        destination: Option<PathBuf>,

        /// JSON file overriding key size, exponent, validity or organization
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Verify certificates written by setup
    Verify {
        /// Client common names whose files should be checked
        #[arg(short = 'c', long = "client_list", visible_alias = "cl", num_args = 0..)]
        client_list: Vec<String>,

        /// Directory to check (same default as setup)
        #[arg(long)]
        destination: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    match cli.command {
        Some(Commands::Setup {
            root_cn,
            server_cn,
            client_list,
            destination,
            config,
        }) => handle_setup(
            &root_cn,
            &server_cn,
            &client_list,
            destination,
            config.as_deref(),
        ),
        Some(Commands::Verify {
            client_list,
            destination,
        }) => handle_verify(&client_list, destination),
        None => {
            // No sub-command: usage only, not a failure
            Cli::command()
                .print_help()
                .map_err(|e| PkiError::io("<stdout>", e))?;
            println!();
            Ok(())
        }
    }
}

/// Rewrite the two-letter `-cl` flag to its `--cl` alias.
///
/// Clap only knows single-character short flags and would otherwise read
/// `-cl` as `-c` with the attached value `l`.
fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| if arg == "-cl" { OsString::from("--cl") } else { arg })
        .collect()
}

fn handle_setup(
    root_cn: &str,
    server_cn: &str,
    client_list: &[String],
    destination: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = PkiConfig::load(config_path)?;
    let destination = resolve_destination(destination)?;

    let report = bootstrap_with_config(&config, root_cn, server_cn, client_list, &destination)?;

    println!(
        "✓ Issued {} certificates into {}",
        report.files.len() / 2,
        report.destination.display()
    );
    for file in &report.files {
        println!("  {}", file.display());
    }

    Ok(())
}

fn handle_verify(client_list: &[String], destination: Option<PathBuf>) -> Result<()> {
    let destination = resolve_destination(destination)?;
    let checked = verify_destination(&destination, client_list)?;

    println!(
        "✓ Verified {} certificates in {}",
        checked,
        destination.display()
    );

    Ok(())
}

fn resolve_destination(destination: Option<PathBuf>) -> Result<PathBuf> {
    match destination {
        Some(path) => Ok(path),
        None => {
            let exe = std::env::current_exe().map_err(|e| PkiError::io("<current exe>", e))?;
            let install_dir = exe.parent().unwrap_or_else(|| Path::new("."));
            Ok(install_dir.join("..").join(DEFAULT_DESTINATION_DIR))
        }
    }
}
