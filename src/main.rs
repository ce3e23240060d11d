//! Swagger extraction - command-line tool deriving Swagger 2.0 documents.
//!
//! Metadata comes from a Rust project's sources, a descriptor file, or both;
//! an existing document can serve as the starting point.
//!
//! # Usage
//!
//! ```bash
//! swagger-extract [OPTIONS] [PROJECT_PATH]
//! ```
//!
//! # Examples
//!
//! Complete an existing document from a project's sources:
//! ```bash
//! swagger-extract ./my-api --base swagger.json -f json -o swagger.out.json
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! swagger-extract ./my-api --base swagger.json -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use swagger_extraction::cli;

fn main() -> Result<()> {
    // Parse once to read the verbose flag before the logger exists
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Swagger extraction starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("Swagger document extraction completed successfully");

    Ok(())
}
