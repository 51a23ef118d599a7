// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./meeting-room.sqlite";
const DEFAULT_MAX_CONNECTIONS: u32 = 1;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_STATEMENT_TIMEOUT_MS: u64 = 30_000;

/// Database configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
	pub url: String,
	pub max_connections: u32,
	pub busy_timeout: Duration,
	pub statement_timeout: Duration,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			url: DEFAULT_DATABASE_URL.to_string(),
			max_connections: DEFAULT_MAX_CONNECTIONS,
			busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
			statement_timeout: Duration::from_millis(DEFAULT_STATEMENT_TIMEOUT_MS),
		}
	}
}

/// Database configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub max_connections: Option<u32>,
	#[serde(default)]
	pub busy_timeout_ms: Option<u64>,
	#[serde(default)]
	pub statement_timeout_ms: Option<u64>,
}

impl DatabaseConfigLayer {
	pub fn merge(&mut self, other: DatabaseConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
		if other.max_connections.is_some() {
			self.max_connections = other.max_connections;
		}
		if other.busy_timeout_ms.is_some() {
			self.busy_timeout_ms = other.busy_timeout_ms;
		}
		if other.statement_timeout_ms.is_some() {
			self.statement_timeout_ms = other.statement_timeout_ms;
		}
	}

	pub fn finalize(self) -> Result<DatabaseConfig, ConfigError> {
		let url = self.url.unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
		if url.trim().is_empty() {
			return Err(ConfigError::Validation("database.url must not be empty".to_string()));
		}

		let max_connections = self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS);
		if max_connections == 0 {
			return Err(ConfigError::Validation(
				"database.max_connections must be at least 1".to_string(),
			));
		}

		Ok(DatabaseConfig {
			url,
			max_connections,
			busy_timeout: positive_millis(
				"database.busy_timeout_ms",
				self.busy_timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS),
			)?,
			statement_timeout: positive_millis(
				"database.statement_timeout_ms",
				self.statement_timeout_ms.unwrap_or(DEFAULT_STATEMENT_TIMEOUT_MS),
			)?,
		})
	}
}

fn positive_millis(key: &str, ms: u64) -> Result<Duration, ConfigError> {
	if ms == 0 {
		return Err(ConfigError::Validation(format!("{key} must be greater than zero")));
	}
	Ok(Duration::from_millis(ms))
}
