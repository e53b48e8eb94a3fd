//! # apiguard CLI Entry Point
//!
//! Loads and compiles the contract document, then dispatches to the
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

/// apiguard — check HTTP requests and responses against an API contract.
#[derive(Parser, Debug)]
#[command(name = "apiguard", version, about)]
struct Cli {
    /// Contract document (.json, .yaml or .yml).
    #[arg(long, short = 'd', env = "APIGUARD_DOCUMENT")]
    document: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List compiled routes.
    Routes,
    /// Show the route an inbound path selects.
    Match(apiguard_cli::routes::MatchArgs),
    /// Check a request against the contract.
    Request(apiguard_cli::check::RequestArgs),
    /// Check a response against the contract.
    Response(apiguard_cli::check::ResponseArgs),
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let document = apiguard_cli::load::load_document(&cli.document)
        .with_context(|| format!("loading contract {}", cli.document.display()))?;
    let compiled = apiguard_validate::compile(&document)
        .with_context(|| format!("compiling contract {}", cli.document.display()))?;
    tracing::debug!(
        document = %cli.document.display(),
        routes = compiled.len(),
        "contract ready"
    );

    let conforms = match cli.command {
        Commands::Routes => {
            print(&apiguard_cli::routes::list_routes(&compiled))?;
            true
        }
        Commands::Match(args) => {
            let matched = apiguard_cli::routes::match_route(&compiled, &args);
            let found = matched.is_some();
            print(&matched)?;
            found
        }
        Commands::Request(args) => {
            let report = apiguard_cli::check::check_request(&compiled, &args)
                .with_context(|| format!("checking {} {}", args.method, args.path))?;
            print(&report)?;
            report.conforms()
        }
        Commands::Response(args) => {
            let report = apiguard_cli::check::check_response(&compiled, &args);
            print(&report)?;
            report.conforms()
        }
    };

    Ok(if conforms {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("serializing output")?);
    Ok(())
}
