//! flashsess - Session store CLI
//!
//! Drives a file-backed session one request at a time: read and write dotted
//! paths, flash data, and cross request boundaries with `next-request`.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli;
mod commands;
mod config;
mod error;
mod file_store;

use cli::{Cli, Commands};
use commands::{RequestContext, access, flash, request};
use file_store::FileBackend;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("flashsess=info".parse()?))
        .init();

    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("flashsess {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Load configuration
    let mut config = config::Config::load()?;
    config.override_session_dir(cli.dir);

    let session_id = cli
        .session
        .unwrap_or_else(|| config.storage.default_session.clone());
    error::validate_session_id(&session_id)?;

    let ctx = RequestContext {
        backend: FileBackend::new(config.storage.session_dir.clone()),
        session_id,
        session_config: config.session_config(),
    };

    // Execute command
    match cli.command {
        Commands::Get { path, default } => access::get(&ctx, &path, default.as_deref()),
        Commands::Set { path, value } => access::set(&ctx, &path, &value),
        Commands::Has { path } => access::has(&ctx, &path),
        Commands::Pull { path } => access::pull(&ctx, &path),
        Commands::Push { path, value } => access::push(&ctx, &path, &value),
        Commands::Forget { path } => access::forget(&ctx, &path),
        Commands::All => access::all(&ctx),
        Commands::Clear => access::clear(&ctx),
        Commands::Flash { key, value, now } => flash::flash(&ctx, &key, &value, now),
        Commands::Keep { keys } => flash::keep(&ctx, &keys),
        Commands::Reflash => flash::reflash(&ctx),
        Commands::NextRequest => request::next_request(&ctx),
        Commands::Status { json } => request::status(&ctx, json),
        Commands::Destroy => request::destroy(&ctx),
        Commands::Version => Ok(()),
    }
}
