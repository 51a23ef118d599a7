// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Serialize;

use crate::error::Result;
use crate::record::{check_text, validated, with_row_id, Record};
use crate::value::{Fields, Row, Value};

pub const ROOM_NAME_MAX: usize = 128;
pub const ROOM_SHORT_NAME_MAX: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
	id: Option<i64>,
	name: String,
	short_name: String,
}

impl Room {
	pub fn new(name: impl Into<String>, short_name: impl Into<String>) -> Result<Self> {
		validated(Self {
			id: None,
			name: name.into(),
			short_name: short_name.into(),
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn short_name(&self) -> &str {
		&self.short_name
	}
}

impl Record for Room {
	const TABLE: &'static str = "room";
	const ENTITY: &'static str = "room";
	const COLUMNS: &'static [&'static str] = &["id", "name", "short_name"];

	fn id(&self) -> Option<i64> {
		self.id
	}

	fn with_id(mut self, id: i64) -> Self {
		self.id = Some(id);
		self
	}

	fn check(&self) -> std::result::Result<(), String> {
		check_text("name", &self.name, ROOM_NAME_MAX)?;
		check_text("short_name", &self.short_name, ROOM_SHORT_NAME_MAX)
	}

	fn to_fields(&self) -> Fields {
		vec![
			("id", Value::from(self.id)),
			("name", Value::from(self.name.as_str())),
			("short_name", Value::from(self.short_name.as_str())),
		]
	}

	fn from_row(row: &Row) -> Result<Self> {
		let room = Room::new(row.get_string("name")?, row.get_string("short_name")?)?;
		with_row_id(room, row)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn short_name_is_bounded() {
		assert!(Room::new("Main Hall", "MH").is_ok());
		assert!(Room::new("Main Hall", "M".repeat(31)).is_ok());
		assert!(Room::new("Main Hall", "M".repeat(32)).is_err());
		assert!(Room::new("Main Hall", "").is_err());
		assert!(Room::new("", "MH").is_err());
	}

	#[test]
	fn serializes_with_field_names() {
		let room = Room::new("Main Hall", "MH").unwrap().with_id(2);
		let json = serde_json::to_value(&room).unwrap();
		assert_eq!(
			json,
			serde_json::json!({"id": 2, "name": "Main Hall", "short_name": "MH"})
		);
	}
}
