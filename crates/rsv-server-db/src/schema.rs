// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fixed table definitions created at startup when absent.

#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
	pub name: &'static str,
	pub ddl: &'static str,
}

/// Every managed table, in dependency order (referenced tables first).
pub static TABLES: &[TableSchema] = &[
	TableSchema {
		name: "user",
		ddl: r#"
		CREATE TABLE user (
			id INTEGER PRIMARY KEY AUTOINCREMENT,
			name TEXT NOT NULL CHECK (length(name) < 128),
			email TEXT NOT NULL UNIQUE CHECK (length(email) < 256)
		) STRICT
		"#,
	},
	TableSchema {
		name: "pj",
		ddl: r#"
		CREATE TABLE pj (
			id INTEGER PRIMARY KEY AUTOINCREMENT,
			rep INTEGER NOT NULL,
			name TEXT NOT NULL CHECK (length(name) < 128),
			nickname TEXT NOT NULL CHECK (length(nickname) < 64),
			max_rsv INTEGER NOT NULL CHECK (max_rsv > 0),
			FOREIGN KEY (rep) REFERENCES user(id)
		) STRICT
		"#,
	},
	TableSchema {
		name: "pj_roster",
		ddl: r#"
		CREATE TABLE pj_roster (
			id INTEGER PRIMARY KEY AUTOINCREMENT,
			pj_id INTEGER NOT NULL,
			user_id INTEGER NOT NULL,
			FOREIGN KEY (pj_id) REFERENCES pj(id),
			FOREIGN KEY (user_id) REFERENCES user(id),
			UNIQUE (pj_id, user_id)
		) STRICT
		"#,
	},
	TableSchema {
		name: "room",
		ddl: r#"
		CREATE TABLE room (
			id INTEGER PRIMARY KEY AUTOINCREMENT,
			name TEXT NOT NULL CHECK (length(name) < 128),
			short_name TEXT NOT NULL CHECK (length(short_name) < 32)
		) STRICT
		"#,
	},
	TableSchema {
		name: "rsv",
		ddl: r#"
		CREATE TABLE rsv (
			id INTEGER PRIMARY KEY AUTOINCREMENT,
			pj_id INTEGER NOT NULL,
			room_id INTEGER NOT NULL,
			start_time TEXT NOT NULL,
			end_time TEXT NOT NULL,
			created_by INTEGER NOT NULL,
			CHECK (start_time < end_time),
			FOREIGN KEY (pj_id) REFERENCES pj(id),
			FOREIGN KEY (room_id) REFERENCES room(id),
			FOREIGN KEY (created_by) REFERENCES user(id)
		) STRICT
		"#,
	},
	TableSchema {
		name: "blackout_definitions",
		ddl: r#"
		CREATE TABLE blackout_definitions (
			id INTEGER PRIMARY KEY AUTOINCREMENT,
			name TEXT NOT NULL CHECK (length(name) < 128),
			description TEXT CHECK (description IS NULL OR length(description) < 512)
		) STRICT
		"#,
	},
	TableSchema {
		name: "room_blackouts",
		ddl: r#"
		CREATE TABLE room_blackouts (
			id INTEGER PRIMARY KEY AUTOINCREMENT,
			room_id INTEGER NOT NULL,
			blackout_id INTEGER NOT NULL,
			start_time TEXT NOT NULL,
			end_time TEXT NOT NULL,
			CHECK (start_time < end_time),
			FOREIGN KEY (room_id) REFERENCES room(id),
			FOREIGN KEY (blackout_id) REFERENCES blackout_definitions(id)
		) STRICT
		"#,
	},
];

pub fn table_schema(name: &str) -> Option<&'static TableSchema> {
	TABLES.iter().find(|t| t.name == name)
}

pub fn table_names() -> impl Iterator<Item = &'static str> {
	TABLES.iter().map(|t| t.name)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_ddl_creates_its_own_table() {
		for table in TABLES {
			let expected = format!("CREATE TABLE {} (", table.name);
			assert!(table.ddl.contains(&expected), "{}", table.name);
		}
	}

	#[test]
	fn references_point_to_earlier_tables() {
		for (idx, table) in TABLES.iter().enumerate() {
			for earlier_or_missing in table.ddl.split("REFERENCES ").skip(1) {
				let target = earlier_or_missing.split('(').next().unwrap().trim();
				let pos = TABLES.iter().position(|t| t.name == target).unwrap();
				assert!(pos < idx, "{} references {} which is created later", table.name, target);
			}
		}
	}

	#[test]
	fn lookup_by_name() {
		assert!(table_schema("rsv").is_some());
		assert!(table_schema("reservations").is_none());
		assert_eq!(table_names().count(), 7);
	}
}
