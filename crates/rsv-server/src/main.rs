// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Meeting-room reservation data layer binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rsv_server::{init_tracing, run_init, run_tables, version};

/// rsv-server - data layer for meeting-room reservations.
#[derive(Parser, Debug)]
#[command(
	name = "rsv-server",
	about = "Meeting-room reservation data layer",
	version
)]
struct Args {
	/// Config file to read instead of /etc/rsv/server.toml
	#[arg(long, global = true, env = "RSV_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Create any missing tables in the configured database
	Init,
	/// Print every managed table with its row count
	Tables,
	/// Show version and build information
	Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	// Load .env first so it can supply RSV_SERVER_CONFIG too
	dotenvy::dotenv().ok();

	let args = Args::parse();

	if let Command::Version = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	let config = match &args.config {
		Some(path) => rsv_server_config::load_config_with_file(path)?,
		None => rsv_server_config::load_config()?,
	};

	init_tracing(&config.logging)?;
	tracing::info!(database = %config.database.url, "starting rsv-server");

	match args.command {
		Command::Init => {
			let names = run_init(&config).await?;
			tracing::info!(tables = ?names, "database initialized");
		}
		Command::Tables => println!("{}", run_tables(&config).await?),
		Command::Version => {}
	}

	Ok(())
}
