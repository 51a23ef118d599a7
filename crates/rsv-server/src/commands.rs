// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Maintenance commands run by the binary.

use anyhow::Context;
use rsv_server_config::{DatabaseConfig, ServerConfig};
use rsv_server_db::{Database, DatabaseSettings, Tables};

pub fn database_settings(config: &DatabaseConfig) -> DatabaseSettings {
	DatabaseSettings {
		url: config.url.clone(),
		max_connections: config.max_connections,
		busy_timeout: config.busy_timeout,
		statement_timeout: config.statement_timeout,
	}
}

/// Connect to the configured store and create any missing tables.
pub async fn open_tables(config: &ServerConfig) -> anyhow::Result<Tables> {
	let db = Database::connect(&database_settings(&config.database))
		.await
		.with_context(|| format!("failed to open database {}", config.database.url))?;
	db.init().await.context("failed to bootstrap schema")?;
	Ok(Tables::new(db))
}

/// Bootstrap the schema and return the names of the tables now present.
#[tracing::instrument(skip(config), fields(database = %config.database.url))]
pub async fn run_init(config: &ServerConfig) -> anyhow::Result<Vec<String>> {
	let tables = open_tables(config).await?;
	let names = tables.database().table_names().await?;
	tracing::info!(tables = names.len(), "schema ready");
	tables.database().close().await;
	Ok(names)
}

/// One `name<TAB>rows` line per managed table.
#[tracing::instrument(skip(config), fields(database = %config.database.url))]
pub async fn run_tables(config: &ServerConfig) -> anyhow::Result<String> {
	let tables = open_tables(config).await?;
	let counts = tables.row_counts().await?;
	tables.database().close().await;

	Ok(counts
		.iter()
		.map(|(name, rows)| format!("{name}\t{rows}"))
		.collect::<Vec<_>>()
		.join("\n"))
}
