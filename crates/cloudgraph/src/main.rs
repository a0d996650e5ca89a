// SPDX-FileCopyrightText: 2026 CloudGraph Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! cg - scan cloud provider accounts into a queryable graph.
//!
//! This is the binary entry point for the `scan` and `load` commands.

mod report;
mod run;
mod select;
mod shutdown;

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::error;

/// cg - scan cloud provider accounts into a queryable graph.
#[derive(Parser, Debug)]
#[command(name = "cg", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Scan provider accounts, save the result, and load it into the graph.
    Scan(ProviderArgs),
    /// Load previously saved scan data into the graph.
    Load(ProviderArgs),
}

impl Command {
    fn args(&self) -> &ProviderArgs {
        match self {
            Command::Scan(args) | Command::Load(args) => args,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Command::Scan(_) => "scan",
            Command::Load(_) => "load",
        }
    }
}

/// Arguments shared by every command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
struct ProviderArgs {
    /// Providers to work on, e.g. `aws` or `@acme/aws`. Defaults to every configured provider.
    #[arg(value_name = "PROVIDER")]
    providers: Vec<String>,

    /// Log at debug level and pass the debug flag to provider plugins.
    #[arg(long)]
    debug: bool,

    /// Resolve provider plugins from the local build instead of installing them.
    #[arg(long)]
    dev: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cloudgraph_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            cloudgraph_config::render_errors(&errors);
            return ExitCode::from(2);
        }
    };

    init_tracing(&config.cloud_graph.log_level, cli.command.args().debug);
    let cancel = shutdown::install_signal_handler();

    match run::execute(&cli.command, config, cancel).await {
        Ok(summary) => {
            report::print_summary(cli.command.name(), &summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(command = cli.command.name(), error = %e, "command failed");
            eprintln!("cg {}: {e}", cli.command.name());
            ExitCode::FAILURE
        }
    }
}

/// Directive used when `RUST_LOG` is not set.
///
/// Target directives match by prefix, so `cloudgraph` covers every library crate.
fn filter_directive(log_level: &str, debug: bool) -> String {
    let level = if debug { "debug" } else { log_level };
    format!("cg={level},cloudgraph={level},warn")
}

fn init_tracing(log_level: &str, debug: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(log_level, debug)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_parses_providers_and_flags() {
        let cli = Cli::try_parse_from(["cg", "scan", "aws", "@acme/gcp", "--debug"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Scan(ProviderArgs {
                providers: vec!["aws".into(), "@acme/gcp".into()],
                debug: true,
                dev: false,
            })
        );
    }

    #[test]
    fn load_without_providers_is_allowed() {
        let cli = Cli::try_parse_from(["cg", "load", "--dev"]).unwrap();
        assert_eq!(cli.command.name(), "load");
        assert!(cli.command.args().providers.is_empty());
        assert!(cli.command.args().dev);
    }

    #[test]
    fn a_subcommand_is_required() {
        assert!(Cli::try_parse_from(["cg"]).is_err());
        assert!(Cli::try_parse_from(["cg", "serve"]).is_err());
    }

    #[test]
    fn debug_flag_overrides_configured_level() {
        assert_eq!(filter_directive("info", true), "cg=debug,cloudgraph=debug,warn");
        assert_eq!(filter_directive("trace", false), "cg=trace,cloudgraph=trace,warn");
    }

    #[test]
    fn every_directive_parses() {
        for level in ["error", "warn", "info", "debug", "trace"] {
            let directive = filter_directive(level, false);
            assert!(tracing_subscriber::EnvFilter::try_new(&directive).is_ok(), "{directive}");
        }
    }
}
