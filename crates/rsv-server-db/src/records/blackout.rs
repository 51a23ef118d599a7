// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Room blackouts: named reasons a room is unavailable, and the concrete
//! windows they apply to.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::Result;
use crate::record::{check_interval, check_len, check_ref, check_text, validated, with_row_id, Record};
use crate::value::{serialize_timestamp, whole_seconds, Fields, Row, Value};

pub const BLACKOUT_NAME_MAX: usize = 128;
pub const BLACKOUT_DESCRIPTION_MAX: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlackoutDefinition {
	id: Option<i64>,
	name: String,
	description: Option<String>,
}

impl BlackoutDefinition {
	pub fn new(name: impl Into<String>, description: Option<String>) -> Result<Self> {
		validated(Self {
			id: None,
			name: name.into(),
			description,
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}
}

impl Record for BlackoutDefinition {
	const TABLE: &'static str = "blackout_definitions";
	const ENTITY: &'static str = "blackout definition";
	const COLUMNS: &'static [&'static str] = &["id", "name", "description"];

	fn id(&self) -> Option<i64> {
		self.id
	}

	fn with_id(mut self, id: i64) -> Self {
		self.id = Some(id);
		self
	}

	fn check(&self) -> std::result::Result<(), String> {
		check_text("name", &self.name, BLACKOUT_NAME_MAX)?;
		match &self.description {
			Some(description) => check_len("description", description, BLACKOUT_DESCRIPTION_MAX),
			None => Ok(()),
		}
	}

	fn to_fields(&self) -> Fields {
		vec![
			("id", Value::from(self.id)),
			("name", Value::from(self.name.as_str())),
			("description", Value::from(self.description.clone())),
		]
	}

	fn from_row(row: &Row) -> Result<Self> {
		let definition =
			BlackoutDefinition::new(row.get_string("name")?, row.get_opt_string("description")?)?;
		with_row_id(definition, row)
	}
}

/// A window during which one room is unavailable for a given definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomBlackout {
	id: Option<i64>,
	room_id: i64,
	blackout_id: i64,
	#[serde(rename = "start_time", serialize_with = "serialize_timestamp")]
	start_at: NaiveDateTime,
	#[serde(rename = "end_time", serialize_with = "serialize_timestamp")]
	finish_at: NaiveDateTime,
}

impl RoomBlackout {
	pub fn new(
		room_id: i64,
		blackout_id: i64,
		start_at: NaiveDateTime,
		finish_at: NaiveDateTime,
	) -> Result<Self> {
		validated(Self {
			id: None,
			room_id,
			blackout_id,
			start_at: whole_seconds(start_at),
			finish_at: whole_seconds(finish_at),
		})
	}

	pub fn room_id(&self) -> i64 {
		self.room_id
	}

	pub fn blackout_id(&self) -> i64 {
		self.blackout_id
	}

	pub fn start_at(&self) -> NaiveDateTime {
		self.start_at
	}

	pub fn finish_at(&self) -> NaiveDateTime {
		self.finish_at
	}
}

impl Record for RoomBlackout {
	const TABLE: &'static str = "room_blackouts";
	const ENTITY: &'static str = "room blackout";
	const COLUMNS: &'static [&'static str] = &["id", "room_id", "blackout_id", "start_time", "end_time"];

	fn id(&self) -> Option<i64> {
		self.id
	}

	fn with_id(mut self, id: i64) -> Self {
		self.id = Some(id);
		self
	}

	fn check(&self) -> std::result::Result<(), String> {
		check_ref("room_id", self.room_id)?;
		check_ref("blackout_id", self.blackout_id)?;
		check_interval(&self.start_at, &self.finish_at)
	}

	fn to_fields(&self) -> Fields {
		vec![
			("id", Value::from(self.id)),
			("room_id", Value::from(self.room_id)),
			("blackout_id", Value::from(self.blackout_id)),
			("start_time", Value::from(&self.start_at)),
			("end_time", Value::from(&self.finish_at)),
		]
	}

	fn from_row(row: &Row) -> Result<Self> {
		let blackout = RoomBlackout::new(
			row.get_i64("room_id")?,
			row.get_i64("blackout_id")?,
			row.get_timestamp("start_time")?,
			row.get_timestamp("end_time")?,
		)?;
		with_row_id(blackout, row)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::NaiveDate;

	#[test]
	fn description_is_optional_but_bounded() {
		assert!(BlackoutDefinition::new("Maintenance", None).is_ok());
		assert!(BlackoutDefinition::new("Maintenance", Some("HVAC".to_string())).is_ok());
		assert!(BlackoutDefinition::new("Maintenance", Some("x".repeat(512))).is_err());
		assert!(BlackoutDefinition::new("", None).is_err());

		let definition = BlackoutDefinition::new("Holiday", None).unwrap();
		assert_eq!(definition.to_fields()[2], ("description", Value::Null));
	}

	#[test]
	fn blackout_window_must_be_ordered() {
		let day = NaiveDate::from_ymd_opt(2025, 12, 29).unwrap();
		let start = day.and_hms_opt(0, 0, 0).unwrap();
		let finish = day.and_hms_opt(23, 59, 59).unwrap();
		assert!(RoomBlackout::new(1, 1, start, finish).is_ok());
		assert!(RoomBlackout::new(1, 1, finish, start).is_err());
		assert!(RoomBlackout::new(1, 0, start, finish).is_err());
	}

	#[test]
	fn blackout_window_is_stored_to_the_second() {
		let day = NaiveDate::from_ymd_opt(2025, 12, 29).unwrap();
		let start = day.and_hms_milli_opt(8, 0, 0, 250).unwrap();
		let finish = day.and_hms_milli_opt(8, 0, 0, 900).unwrap();
		assert!(RoomBlackout::new(1, 1, start, finish).is_err());

		let blackout = RoomBlackout::new(1, 1, start, day.and_hms_opt(9, 0, 0).unwrap()).unwrap();
		assert_eq!(blackout.start_at(), day.and_hms_opt(8, 0, 0).unwrap());
	}
}
