// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error taxonomy for the reservation data layer.
//!
//! Store failures are translated into a closed set of kinds through
//! [`STORE_CODE_TABLE`], so callers branch on [`ErrorKind`] instead of driver
//! codes.

use std::fmt;
use std::time::Duration;

use crate::policy::Action;

/// Closed set of error kinds surfaced by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	Validation,
	InvalidArgument,
	NotFound,
	Permission,
	Connection,
	Schema,
	Constraint,
	Persistence,
	Timeout,
}

impl fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			ErrorKind::Validation => "validation",
			ErrorKind::InvalidArgument => "invalid_argument",
			ErrorKind::NotFound => "not_found",
			ErrorKind::Permission => "permission",
			ErrorKind::Connection => "connection",
			ErrorKind::Schema => "schema",
			ErrorKind::Constraint => "constraint",
			ErrorKind::Persistence => "persistence",
			ErrorKind::Timeout => "timeout",
		};
		f.write_str(name)
	}
}

/// Which store-level constraint rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
	Unique,
	PrimaryKey,
	NotNull,
	Check,
	ForeignKey,
	Other,
}

impl fmt::Display for ConstraintKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			ConstraintKind::Unique => "unique",
			ConstraintKind::PrimaryKey => "primary key",
			ConstraintKind::NotNull => "not null",
			ConstraintKind::Check => "check",
			ConstraintKind::ForeignKey => "foreign key",
			ConstraintKind::Other => "other",
		};
		f.write_str(name)
	}
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Validation error: {0}")]
	Validation(String),

	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	#[error("Not found: {entity} with {key}")]
	NotFound { entity: &'static str, key: String },

	#[error("Permission denied: cannot {action} {entity} record")]
	Permission { entity: &'static str, action: Action },

	#[error("Connection error: {0}")]
	Connection(String),

	#[error("Schema error: {0}")]
	Schema(String),

	#[error("Constraint violation ({kind}): {message}")]
	Constraint { kind: ConstraintKind, message: String },

	#[error("Persistence error: {0}")]
	Persistence(String),

	#[error("Statement timed out after {elapsed:?}")]
	Timeout { elapsed: Duration },
}

pub type Result<T> = std::result::Result<T, DbError>;

impl DbError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			DbError::Validation(_) => ErrorKind::Validation,
			DbError::InvalidArgument(_) => ErrorKind::InvalidArgument,
			DbError::NotFound { .. } => ErrorKind::NotFound,
			DbError::Permission { .. } => ErrorKind::Permission,
			DbError::Connection(_) => ErrorKind::Connection,
			DbError::Schema(_) => ErrorKind::Schema,
			DbError::Constraint { .. } => ErrorKind::Constraint,
			DbError::Persistence(_) => ErrorKind::Persistence,
			DbError::Timeout { .. } => ErrorKind::Timeout,
		}
	}

	pub(crate) fn not_found_id(entity: &'static str, id: i64) -> Self {
		DbError::NotFound {
			entity,
			key: format!("id {id}"),
		}
	}

	/// Prefix the message with operation context, keeping the kind intact.
	///
	/// Structured variants (`NotFound`, `Permission`, `Timeout`) already carry
	/// their context and are returned unchanged.
	pub fn context(self, ctx: impl fmt::Display) -> Self {
		match self {
			DbError::Validation(msg) => DbError::Validation(format!("{ctx}: {msg}")),
			DbError::InvalidArgument(msg) => DbError::InvalidArgument(format!("{ctx}: {msg}")),
			DbError::Connection(msg) => DbError::Connection(format!("{ctx}: {msg}")),
			DbError::Schema(msg) => DbError::Schema(format!("{ctx}: {msg}")),
			DbError::Persistence(msg) => DbError::Persistence(format!("{ctx}: {msg}")),
			DbError::Constraint { kind, message } => DbError::Constraint {
				kind,
				message: format!("{ctx}: {message}"),
			},
			other => other,
		}
	}
}

/// Coarse class a store-native error code maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorClass {
	Constraint(ConstraintKind),
	Connection,
	Schema,
	Persistence,
}

#[derive(Debug, Clone, Copy)]
pub struct StoreCode {
	pub code: &'static str,
	pub class: StoreErrorClass,
	pub description: &'static str,
}

const fn entry(code: &'static str, class: StoreErrorClass, description: &'static str) -> StoreCode {
	StoreCode {
		code,
		class,
		description,
	}
}

/// Store-native error codes and the kind each one is reported as.
///
/// SQLite reports extended result codes; the SQLSTATE entries cover drivers
/// that report ANSI codes instead.
pub static STORE_CODE_TABLE: &[StoreCode] = &[
	// SQLite extended result codes
	entry("2067", StoreErrorClass::Constraint(ConstraintKind::Unique), "unique constraint failed"),
	entry("1555", StoreErrorClass::Constraint(ConstraintKind::PrimaryKey), "primary key constraint failed"),
	entry("2579", StoreErrorClass::Constraint(ConstraintKind::PrimaryKey), "rowid is not unique"),
	entry("1299", StoreErrorClass::Constraint(ConstraintKind::NotNull), "not null constraint failed"),
	entry("275", StoreErrorClass::Constraint(ConstraintKind::Check), "check constraint failed"),
	entry("787", StoreErrorClass::Constraint(ConstraintKind::ForeignKey), "foreign key constraint failed"),
	entry("3091", StoreErrorClass::Constraint(ConstraintKind::Other), "value does not match strict column type"),
	entry("19", StoreErrorClass::Constraint(ConstraintKind::Other), "constraint failed"),
	entry("14", StoreErrorClass::Connection, "unable to open database file"),
	entry("26", StoreErrorClass::Connection, "file is not a database"),
	entry("5", StoreErrorClass::Connection, "database is busy"),
	entry("6", StoreErrorClass::Connection, "database table is locked"),
	entry("1", StoreErrorClass::Persistence, "SQL error"),
	// SQLSTATE
	entry("23000", StoreErrorClass::Constraint(ConstraintKind::Unique), "duplicate entry"),
	entry("23502", StoreErrorClass::Constraint(ConstraintKind::NotNull), "required field is missing"),
	entry("22001", StoreErrorClass::Constraint(ConstraintKind::Check), "data too long for column"),
	entry("23503", StoreErrorClass::Constraint(ConstraintKind::ForeignKey), "referenced record violation"),
	entry("42S02", StoreErrorClass::Schema, "table not found"),
	entry("42S22", StoreErrorClass::Persistence, "column not found"),
	entry("HY000", StoreErrorClass::Persistence, "general error"),
];

pub fn classify_store_code(code: &str) -> Option<&'static StoreCode> {
	STORE_CODE_TABLE.iter().find(|entry| entry.code == code)
}

/// Translate a store error (native code plus message) into a [`DbError`].
pub fn from_store(code: Option<&str>, message: &str) -> DbError {
	let entry = code.and_then(classify_store_code);
	if let Some(entry) = entry {
		tracing::debug!(code = entry.code, description = entry.description, "classified store error");
	}

	match entry.map(|e| e.class).unwrap_or(StoreErrorClass::Persistence) {
		StoreErrorClass::Constraint(kind) => DbError::Constraint {
			kind,
			message: message.to_string(),
		},
		StoreErrorClass::Connection => DbError::Connection(message.to_string()),
		StoreErrorClass::Schema => DbError::Schema(message.to_string()),
		StoreErrorClass::Persistence if message.starts_with("no such table") => {
			DbError::Schema(message.to_string())
		}
		StoreErrorClass::Persistence => DbError::Persistence(message.to_string()),
	}
}

impl From<sqlx::Error> for DbError {
	fn from(err: sqlx::Error) -> Self {
		match err {
			sqlx::Error::Database(db_err) => from_store(db_err.code().as_deref(), db_err.message()),
			sqlx::Error::Io(e) => DbError::Connection(format!("I/O error: {e}")),
			sqlx::Error::Tls(e) => DbError::Connection(format!("TLS error: {e}")),
			sqlx::Error::Configuration(e) => DbError::Connection(format!("invalid configuration: {e}")),
			sqlx::Error::PoolTimedOut => {
				DbError::Connection("timed out waiting for a connection".to_string())
			}
			sqlx::Error::PoolClosed => DbError::Connection("connection pool is closed".to_string()),
			sqlx::Error::WorkerCrashed => DbError::Connection("database worker crashed".to_string()),
			other => DbError::Persistence(other.to_string()),
		}
	}
}
