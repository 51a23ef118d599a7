// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::Result;
use crate::record::{check_interval, check_ref, validated, with_row_id, Record};
use crate::value::{serialize_timestamp, whole_seconds, Fields, Row, Value};

/// A booking of one room by one project for a half-open time window.
///
/// No overlap checking happens here or in the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reservation {
	id: Option<i64>,
	pj_id: i64,
	room_id: i64,
	#[serde(rename = "start_time", serialize_with = "serialize_timestamp")]
	start_at: NaiveDateTime,
	#[serde(rename = "end_time", serialize_with = "serialize_timestamp")]
	finish_at: NaiveDateTime,
	created_by: i64,
}

impl Reservation {
	/// # Errors
	/// `DbError::Validation` if any referenced id is not positive or
	/// `start_at` is not strictly before `finish_at`. Both times are
	/// truncated to whole seconds first.
	pub fn new(
		pj_id: i64,
		room_id: i64,
		start_at: NaiveDateTime,
		finish_at: NaiveDateTime,
		created_by: i64,
	) -> Result<Self> {
		validated(Self {
			id: None,
			pj_id,
			room_id,
			start_at: whole_seconds(start_at),
			finish_at: whole_seconds(finish_at),
			created_by,
		})
	}

	pub fn pj_id(&self) -> i64 {
		self.pj_id
	}

	pub fn room_id(&self) -> i64 {
		self.room_id
	}

	pub fn start_at(&self) -> NaiveDateTime {
		self.start_at
	}

	pub fn finish_at(&self) -> NaiveDateTime {
		self.finish_at
	}

	pub fn created_by(&self) -> i64 {
		self.created_by
	}
}

impl Record for Reservation {
	const TABLE: &'static str = "rsv";
	const ENTITY: &'static str = "reservation";
	const COLUMNS: &'static [&'static str] = &[
		"id",
		"pj_id",
		"room_id",
		"start_time",
		"end_time",
		"created_by",
	];

	fn id(&self) -> Option<i64> {
		self.id
	}

	fn with_id(mut self, id: i64) -> Self {
		self.id = Some(id);
		self
	}

	fn check(&self) -> std::result::Result<(), String> {
		check_ref("pj_id", self.pj_id)?;
		check_ref("room_id", self.room_id)?;
		check_ref("created_by", self.created_by)?;
		check_interval(&self.start_at, &self.finish_at)
	}

	fn to_fields(&self) -> Fields {
		vec![
			("id", Value::from(self.id)),
			("pj_id", Value::from(self.pj_id)),
			("room_id", Value::from(self.room_id)),
			("start_time", Value::from(&self.start_at)),
			("end_time", Value::from(&self.finish_at)),
			("created_by", Value::from(self.created_by)),
		]
	}

	fn from_row(row: &Row) -> Result<Self> {
		let rsv = Reservation::new(
			row.get_i64("pj_id")?,
			row.get_i64("room_id")?,
			row.get_timestamp("start_time")?,
			row.get_timestamp("end_time")?,
			row.get_i64("created_by")?,
		)?;
		with_row_id(rsv, row)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ErrorKind;
	use chrono::NaiveDate;

	fn at(hour: u32) -> NaiveDateTime {
		NaiveDate::from_ymd_opt(2025, 6, 2)
			.unwrap()
			.and_hms_opt(hour, 0, 0)
			.unwrap()
	}

	#[test]
	fn start_must_precede_finish() {
		assert!(Reservation::new(1, 1, at(9), at(10), 1).is_ok());
		let equal = Reservation::new(1, 1, at(9), at(9), 1).unwrap_err();
		assert_eq!(equal.kind(), ErrorKind::Validation);
		let reversed = Reservation::new(1, 1, at(11), at(10), 1).unwrap_err();
		assert_eq!(reversed.kind(), ErrorKind::Validation);
	}

	#[test]
	fn sub_second_window_collapses_and_is_rejected() {
		let day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
		let err = Reservation::new(
			1,
			1,
			day.and_hms_milli_opt(9, 0, 0, 200).unwrap(),
			day.and_hms_milli_opt(9, 0, 0, 700).unwrap(),
			1,
		)
		.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Validation);

		let rsv = Reservation::new(
			1,
			1,
			day.and_hms_milli_opt(10, 0, 0, 500).unwrap(),
			at(11),
			1,
		)
		.unwrap();
		assert_eq!(rsv.start_at(), at(10));
	}

	#[test]
	fn timestamps_serialize_with_fixed_format() {
		let rsv = Reservation::new(1, 2, at(9), at(10), 3).unwrap();
		let fields = rsv.to_fields();
		assert_eq!(fields[3], ("start_time", Value::from("2025-06-02 09:00:00")));
		assert_eq!(fields[4], ("end_time", Value::from("2025-06-02 10:00:00")));

		let json = serde_json::to_value(&rsv).unwrap();
		assert_eq!(json["start_time"], "2025-06-02 09:00:00");
	}

	#[test]
	fn fields_cover_every_column() {
		let rsv = Reservation::new(1, 2, at(9), at(10), 3).unwrap();
		let names: Vec<&str> = rsv.to_fields().iter().map(|(n, _)| *n).collect();
		assert_eq!(names, Reservation::COLUMNS);
	}
}
