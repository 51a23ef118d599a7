// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The record abstraction shared by every persisted entity.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::error::{DbError, Result};
use crate::value::{Fields, Row};

/// An in-memory representation of one row, validated at construction.
///
/// `id` is `None` until the persistence layer assigns one. Relationships to
/// other records are plain foreign ids, never object references.
pub trait Record: Clone + Send + Sync + Sized + 'static {
	/// Backing table.
	const TABLE: &'static str;
	/// Human-readable entity name used in errors and logs.
	const ENTITY: &'static str;
	/// Every column of the backing table, `id` included.
	const COLUMNS: &'static [&'static str];

	fn id(&self) -> Option<i64>;

	fn with_id(self, id: i64) -> Self;

	/// First violated field invariant, if any. Pure, no I/O.
	fn check(&self) -> std::result::Result<(), String>;

	/// Serialize to an ordered column map, `id` first (null when unset).
	fn to_fields(&self) -> Fields;

	/// Build a record from a stored row, validating it and populating `id`.
	fn from_row(row: &Row) -> Result<Self>;

	fn validate(&self) -> bool {
		self.check().is_ok()
	}

	fn has_id(&self) -> bool {
		matches!(self.id(), Some(id) if id > 0)
	}

	fn has_column(column: &str) -> bool {
		Self::COLUMNS.contains(&column)
	}
}

/// Return `record` if it satisfies its invariants, otherwise a
/// `DbError::Validation` naming the first violation.
pub(crate) fn validated<R: Record>(record: R) -> Result<R> {
	match record.check() {
		Ok(()) => Ok(record),
		Err(reason) => Err(DbError::Validation(format!("Invalid {}: {reason}", R::ENTITY))),
	}
}

/// Populate `id` on a record decoded from `row`.
pub(crate) fn with_row_id<R: Record>(record: R, row: &Row) -> Result<R> {
	let id = row.get_i64("id")?;
	if id <= 0 {
		return Err(DbError::Persistence(format!(
			"Stored {} has non-positive id {id}",
			R::ENTITY
		)));
	}
	Ok(record.with_id(id))
}

pub(crate) fn check_text(field: &str, value: &str, max_chars: usize) -> std::result::Result<(), String> {
	if value.trim().is_empty() {
		return Err(format!("{field} must not be empty"));
	}
	check_len(field, value, max_chars)
}

/// `value` must be strictly shorter than `max_chars` characters.
pub(crate) fn check_len(field: &str, value: &str, max_chars: usize) -> std::result::Result<(), String> {
	let len = value.chars().count();
	if len >= max_chars {
		return Err(format!(
			"{field} must be shorter than {max_chars} characters (got {len})"
		));
	}
	Ok(())
}

pub(crate) fn check_ref(field: &str, id: i64) -> std::result::Result<(), String> {
	if id <= 0 {
		return Err(format!("{field} must be a positive id (got {id})"));
	}
	Ok(())
}

pub(crate) fn check_interval(start: &NaiveDateTime, finish: &NaiveDateTime) -> std::result::Result<(), String> {
	if start >= finish {
		return Err(format!("start {start} must be before finish {finish}"));
	}
	Ok(())
}

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~.-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
	)
	.unwrap()
});

/// Whether `email` has the shape `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
	let Some((local, _)) = email.split_once('@') else {
		return false;
	};
	if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
		return false;
	}
	EMAIL_REGEX.is_match(email)
}
