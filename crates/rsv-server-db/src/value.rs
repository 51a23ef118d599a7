// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Scalar values exchanged with the store and the row maps built from them.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

use crate::error::DbError;

/// Fixed timestamp format used for every stored date.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Drop the sub-second part, which the stored format cannot hold.
pub fn whole_seconds(ts: NaiveDateTime) -> NaiveDateTime {
	ts.with_nanosecond(0).unwrap_or(ts)
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
	ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn serialize_timestamp<S: serde::Serializer>(
	ts: &NaiveDateTime,
	serializer: S,
) -> Result<S::Ok, S::Error> {
	serializer.serialize_str(&format_timestamp(ts))
}

pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, DbError> {
	NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
		.map_err(|e| DbError::Persistence(format!("Invalid timestamp '{s}': {e}")))
}

/// A bound parameter or decoded column value.
///
/// The variant decides how the value is bound, so values are never spliced
/// into SQL text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
	Null,
	Integer(i64),
	Bool(bool),
	Real(f64),
	Text(String),
}

impl Value {
	pub fn type_name(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Integer(_) => "integer",
			Value::Bool(_) => "bool",
			Value::Real(_) => "real",
			Value::Text(_) => "text",
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Value::Integer(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Text(v) => Some(v),
			_ => None,
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Integer(v)
	}
}

impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Value::Integer(i64::from(v))
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Real(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Text(v.to_string())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::Text(v)
	}
}

impl From<&NaiveDateTime> for Value {
	fn from(v: &NaiveDateTime) -> Self {
		Value::Text(format_timestamp(v))
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(v: Option<T>) -> Self {
		v.map(Into::into).unwrap_or(Value::Null)
	}
}

/// Ordered field map produced by a record's serialization.
pub type Fields = Vec<(&'static str, Value)>;

/// One result row keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, Value>);

impl Row {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
		self.0.insert(column.into(), value.into());
	}

	pub fn get(&self, column: &str) -> Option<&Value> {
		self.0.get(column)
	}

	pub fn columns(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	fn require(&self, column: &str) -> Result<&Value, DbError> {
		self
			.0
			.get(column)
			.ok_or_else(|| DbError::Persistence(format!("Missing column '{column}' in row")))
	}

	pub fn get_i64(&self, column: &str) -> Result<i64, DbError> {
		let value = self.require(column)?;
		match value {
			Value::Integer(v) => Ok(*v),
			Value::Bool(v) => Ok(i64::from(*v)),
			other => Err(type_mismatch(column, "integer", other)),
		}
	}

	pub fn get_string(&self, column: &str) -> Result<String, DbError> {
		match self.require(column)? {
			Value::Text(v) => Ok(v.clone()),
			other => Err(type_mismatch(column, "text", other)),
		}
	}

	pub fn get_opt_string(&self, column: &str) -> Result<Option<String>, DbError> {
		match self.require(column)? {
			Value::Null => Ok(None),
			Value::Text(v) => Ok(Some(v.clone())),
			other => Err(type_mismatch(column, "text or null", other)),
		}
	}

	pub fn get_timestamp(&self, column: &str) -> Result<NaiveDateTime, DbError> {
		parse_timestamp(&self.get_string(column)?)
	}

	/// Decode a driver row, choosing each value's variant from its storage class.
	pub(crate) fn from_sqlite(row: &SqliteRow) -> Result<Self, DbError> {
		let mut out = Row::new();
		for (idx, column) in row.columns().iter().enumerate() {
			let raw = row.try_get_raw(idx)?;
			let value = if raw.is_null() {
				Value::Null
			} else {
				let type_name = raw.type_info().name().to_ascii_uppercase();
				match type_name.as_str() {
					"INTEGER" | "INT" | "BOOLEAN" => Value::Integer(row.try_get::<i64, _>(idx)?),
					"REAL" => Value::Real(row.try_get::<f64, _>(idx)?),
					"TEXT" => Value::Text(row.try_get::<String, _>(idx)?),
					other => {
						return Err(DbError::Persistence(format!(
							"Unsupported column type {other} for '{}'",
							column.name()
						)))
					}
				}
			};
			out.insert(column.name(), value);
		}
		Ok(out)
	}
}

impl FromIterator<(String, Value)> for Row {
	fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
		Row(iter.into_iter().collect())
	}
}

fn type_mismatch(column: &str, expected: &str, actual: &Value) -> DbError {
	DbError::Persistence(format!(
		"Column '{column}' expected {expected}, found {}",
		actual.type_name()
	))
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::NaiveDate;

	#[test]
	fn timestamps_use_fixed_format() {
		let ts = NaiveDate::from_ymd_opt(2025, 4, 1)
			.unwrap()
			.and_hms_opt(9, 5, 0)
			.unwrap();
		assert_eq!(format_timestamp(&ts), "2025-04-01 09:05:00");
		assert_eq!(parse_timestamp("2025-04-01 09:05:00").unwrap(), ts);
	}

	#[test]
	fn malformed_timestamp_is_persistence_error() {
		let err = parse_timestamp("2025-04-01T09:05:00Z").unwrap_err();
		assert!(matches!(err, DbError::Persistence(_)));
	}

	#[test]
	fn option_none_becomes_null() {
		assert_eq!(Value::from(None::<String>), Value::Null);
		assert_eq!(Value::from(Some("x")), Value::Text("x".to_string()));
	}

	#[test]
	fn row_accessors_check_types() {
		let mut row = Row::new();
		row.insert("id", 7i64);
		row.insert("name", "Main Hall");
		row.insert("description", Value::Null);

		assert_eq!(row.get_i64("id").unwrap(), 7);
		assert_eq!(row.get_string("name").unwrap(), "Main Hall");
		assert_eq!(row.get_opt_string("description").unwrap(), None);
		assert!(row.get_i64("name").is_err());
		assert!(row.get_string("missing").is_err());
	}

	#[test]
	fn row_serializes_as_flat_map() {
		let mut row = Row::new();
		row.insert("id", 1i64);
		row.insert("name", "Alice");
		let json = serde_json::to_value(&row).unwrap();
		assert_eq!(json, serde_json::json!({"id": 1, "name": "Alice"}));
	}
}
