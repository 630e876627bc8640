//! Story CLI - command-line client for Storyscript Cloud
//!
//! Pebble Spec v1.1 compliant

mod api;
mod cli;
mod commands;
mod config;
mod credentials;
mod document;
mod output;
mod prompt;

use clap::Parser;
use cli::{Cli, Commands};
use commands::Context;
use output::PebbleError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Handle --manifest before anything else
    if cli.manifest {
        output::print_manifest();
        return;
    }

    let out = output::Output::new(cli.agent, cli.verbose);

    // If no command provided, show help
    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            eprintln!("Error: no command provided. Use --help for usage.");
            std::process::exit(1);
        }
    };

    if let Err(e) = config::load_env() {
        out.error(PebbleError::input("ENV_LOAD_FAIL", &e.to_string()));
    }

    let settings = match config::Settings::from_env() {
        Ok(s) => s,
        Err(e) => out.error(PebbleError::input("BAD_CONFIG", &format!("{:#}", e))),
    };
    out.log("debug", &format!("Using API at {}", settings.api_url));

    let api = match api::ApiClient::new(&settings) {
        Ok(client) => client,
        Err(e @ api::ApiError::InvalidBaseUrl { .. }) => out.error(e.to_pebble("startup")),
        Err(e) => out.error(PebbleError::sys("HTTP_CLIENT", &e.to_string())),
    };

    let mut ctx = Context {
        api,
        out,
        prompter: Box::new(prompt::TerminalPrompter::stdio()),
    };

    let result = match command {
        Commands::Apps(cmd) => commands::apps::run(cmd, &mut ctx).await,
        Commands::Create(args) => commands::apps::create(args, &ctx).await,
        Commands::Registry(cmd) => commands::registry::run(cmd, &mut ctx).await,
        Commands::Containers(cmd) => commands::containers::run(cmd, &ctx).await,
    };

    if let Err(e) = result {
        ctx.out.error(PebbleError::sys("INTERNAL", &format!("{:#}", e)));
    }
}
