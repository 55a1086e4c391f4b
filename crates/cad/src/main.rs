//! CAD CLI - Customer Account Data client.
//!
//! Provides commands for:
//! - `token`: Exchange a signed SAML assertion for an OAuth token
//! - `assertion`: Print the signed SAML assertion that would be exchanged

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{AssertionArgs, TokenArgs};
use output::Output;

/// CAD - Customer Account Data client.
#[derive(Parser)]
#[command(name = "cad", version, about)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Obtain an OAuth access token through the SAML exchange.
    Token(TokenArgs),
    /// Print a freshly signed SAML assertion.
    Assertion(AssertionArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Token(args) => args.execute(),
        Commands::Assertion(args) => args.execute(),
    };

    if let Err(err) = result {
        output.failed(&err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_assertion_flags() {
        let cli = Cli::parse_from([
            "cad",
            "assertion",
            "--encoded",
            "--customer",
            "customer-2",
            "-v",
        ]);

        assert!(cli.verbose);
        let Commands::Assertion(args) = cli.command else {
            panic!("expected assertion command");
        };
        assert!(args.encoded);
        assert_eq!(args.config.customer.as_deref(), Some("customer-2"));
    }
}
