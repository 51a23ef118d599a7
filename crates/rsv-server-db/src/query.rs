// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Parameterized statement construction.
//!
//! Table and column identifiers come from record definitions and are checked
//! by the gateway before they get here. Values are always bound through `?`
//! placeholders; each parameter keeps a name so statements stay readable in
//! logs and tests.

use crate::value::{Fields, Value};

/// SQL text plus its parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
	sql: String,
	params: Vec<(String, Value)>,
}

impl Statement {
	pub fn new(sql: impl Into<String>) -> Self {
		Self {
			sql: sql.into(),
			params: Vec::new(),
		}
	}

	/// Append the parameter for the next `?` placeholder.
	pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.params.push((name.into(), value.into()));
		self
	}

	pub fn sql(&self) -> &str {
		&self.sql
	}

	pub fn params(&self) -> &[(String, Value)] {
		&self.params
	}

	/// `SELECT *` with an AND conjunction of `column = ?` filters.
	/// No filters selects every row.
	pub fn select(table: &str, conditions: &[(&str, Value)]) -> Self {
		let mut sql = format!("SELECT * FROM {table}");
		if !conditions.is_empty() {
			let clauses: Vec<String> = conditions
				.iter()
				.map(|(col, _)| format!("{col} = ?"))
				.collect();
			sql.push_str(" WHERE ");
			sql.push_str(&clauses.join(" AND "));
		}
		sql.push_str(" ORDER BY id");

		conditions
			.iter()
			.fold(Statement::new(sql), |stmt, (col, value)| stmt.bind(*col, value.clone()))
	}

	/// `SELECT *` matching any of `values` on one column, rendered as an OR
	/// of per-value equalities.
	pub fn select_any(table: &str, column: &str, values: &[Value]) -> Self {
		let clauses = vec![format!("{column} = ?"); values.len()];
		let sql = format!(
			"SELECT * FROM {table} WHERE {} ORDER BY id",
			clauses.join(" OR ")
		);

		values
			.iter()
			.enumerate()
			.fold(Statement::new(sql), |stmt, (i, value)| {
				stmt.bind(format!("{column}_{i}"), value.clone())
			})
	}

	pub fn select_id(table: &str, id: i64) -> Self {
		Statement::new(format!("SELECT id FROM {table} WHERE id = ?")).bind("id", id)
	}

	pub fn insert(table: &str, fields: &Fields) -> Self {
		let columns: Vec<&str> = fields.iter().map(|(col, _)| *col).collect();
		let placeholders = vec!["?"; columns.len()];
		let sql = format!(
			"INSERT INTO {table} ({}) VALUES ({})",
			columns.join(", "),
			placeholders.join(", ")
		);

		fields
			.iter()
			.fold(Statement::new(sql), |stmt, (col, value)| stmt.bind(*col, value.clone()))
	}

	/// `UPDATE` every non-id field of the row with the given id.
	pub fn update_by_id(table: &str, fields: &Fields, id: i64) -> Self {
		let set: Vec<&(&'static str, Value)> = fields.iter().filter(|(col, _)| *col != "id").collect();
		let clauses: Vec<String> = set
			.iter()
			.map(|(col, _)| format!("{col} = ?"))
			.collect();
		let sql = format!(
			"UPDATE {table} SET {} WHERE id = ?",
			clauses.join(", ")
		);

		set
			.iter()
			.fold(Statement::new(sql), |stmt, (col, value)| {
				stmt.bind(format!("set_{col}"), value.clone())
			})
			.bind("where_id", id)
	}

	pub fn delete_by_id(table: &str, id: i64) -> Self {
		Statement::new(format!("DELETE FROM {table} WHERE id = ?")).bind("id", id)
	}

	pub fn count(table: &str) -> Self {
		Statement::new(format!("SELECT COUNT(*) AS count FROM {table}"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn names(stmt: &Statement) -> Vec<&str> {
		stmt.params().iter().map(|(n, _)| n.as_str()).collect()
	}

	#[test]
	fn select_without_conditions_has_no_where() {
		let stmt = Statement::select("room", &[]);
		assert_eq!(stmt.sql(), "SELECT * FROM room ORDER BY id");
		assert!(stmt.params().is_empty());
	}

	#[test]
	fn select_conditions_are_and_joined() {
		let stmt = Statement::select(
			"rsv",
			&[("room_id", Value::Integer(3)), ("pj_id", Value::Integer(1))],
		);
		assert_eq!(
			stmt.sql(),
			"SELECT * FROM rsv WHERE room_id = ? AND pj_id = ? ORDER BY id"
		);
		assert_eq!(names(&stmt), vec!["room_id", "pj_id"]);
	}

	#[test]
	fn values_never_appear_in_sql() {
		let hostile = "x'; DROP TABLE user; --";
		let stmt = Statement::select("user", &[("email", Value::from(hostile))]);
		assert!(!stmt.sql().contains("DROP"));
		assert_eq!(stmt.params()[0].1, Value::Text(hostile.to_string()));
	}

	#[test]
	fn select_any_uses_or_of_equalities() {
		let stmt = Statement::select_any("room", "id", &[Value::Integer(1), Value::Integer(2)]);
		assert_eq!(
			stmt.sql(),
			"SELECT * FROM room WHERE id = ? OR id = ? ORDER BY id"
		);
		assert_eq!(names(&stmt), vec!["id_0", "id_1"]);
	}

	#[test]
	fn insert_enumerates_fields() {
		let fields: Fields = vec![("name", Value::from("Main Hall")), ("short_name", Value::from("MH"))];
		let stmt = Statement::insert("room", &fields);
		assert_eq!(
			stmt.sql(),
			"INSERT INTO room (name, short_name) VALUES (?, ?)"
		);
		assert_eq!(names(&stmt), vec!["name", "short_name"]);
	}

	#[test]
	fn update_sets_fields_by_id() {
		let fields: Fields = vec![
			("id", Value::Integer(4)),
			("name", Value::from("Annex")),
			("short_name", Value::from("AX")),
		];
		let stmt = Statement::update_by_id("room", &fields, 4);
		assert_eq!(
			stmt.sql(),
			"UPDATE room SET name = ?, short_name = ? WHERE id = ?"
		);
		assert_eq!(names(&stmt), vec!["set_name", "set_short_name", "where_id"]);
		assert_eq!(stmt.params()[2].1, Value::Integer(4));
	}

	#[test]
	fn delete_filters_by_id_only() {
		let stmt = Statement::delete_by_id("pj", 12);
		assert_eq!(stmt.sql(), "DELETE FROM pj WHERE id = ?");
		assert_eq!(stmt.params(), &[("id".to_string(), Value::Integer(12))]);
	}
}
