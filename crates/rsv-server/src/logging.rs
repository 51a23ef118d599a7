// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use anyhow::Context;
use rsv_server_config::{LogFormat, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` wins over the configured level when set.
pub fn build_filter(level: &str) -> anyhow::Result<EnvFilter> {
	match EnvFilter::try_from_default_env() {
		Ok(filter) => Ok(filter),
		Err(_) => EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'")),
	}
}

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays machine-readable.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
	let registry = tracing_subscriber::registry().with(build_filter(&config.level)?);
	match config.format {
		LogFormat::Json => registry
			.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
			.try_init()?,
		LogFormat::Pretty => registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.try_init()?,
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn malformed_level_is_rejected() {
		if std::env::var_os("RUST_LOG").is_some() {
			return;
		}
		assert!(build_filter("info").is_ok());
		assert!(build_filter("rsv_server_db=debug,info").is_ok());
		assert!(build_filter("rsv_server_db=loud").is_err());
	}
}
