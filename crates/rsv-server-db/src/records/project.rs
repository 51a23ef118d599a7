// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Serialize;

use crate::error::Result;
use crate::record::{check_ref, check_text, validated, with_row_id, Record};
use crate::value::{Fields, Row, Value};

pub const PROJECT_NAME_MAX: usize = 128;
pub const PROJECT_NICKNAME_MAX: usize = 64;

/// A project that books rooms, represented by one user (`rep`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
	id: Option<i64>,
	rep: i64,
	name: String,
	nickname: String,
	max_rsv: i64,
}

impl Project {
	/// # Errors
	/// `DbError::Validation` if `rep` or `max_rsv` is not positive, or a name
	/// field is empty or too long.
	pub fn new(
		rep: i64,
		name: impl Into<String>,
		nickname: impl Into<String>,
		max_rsv: i64,
	) -> Result<Self> {
		validated(Self {
			id: None,
			rep,
			name: name.into(),
			nickname: nickname.into(),
			max_rsv,
		})
	}

	pub fn rep(&self) -> i64 {
		self.rep
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn nickname(&self) -> &str {
		&self.nickname
	}

	/// Maximum number of reservations the project may hold.
	pub fn max_rsv(&self) -> i64 {
		self.max_rsv
	}
}

impl Record for Project {
	const TABLE: &'static str = "pj";
	const ENTITY: &'static str = "project";
	const COLUMNS: &'static [&'static str] = &["id", "rep", "name", "nickname", "max_rsv"];

	fn id(&self) -> Option<i64> {
		self.id
	}

	fn with_id(mut self, id: i64) -> Self {
		self.id = Some(id);
		self
	}

	fn check(&self) -> std::result::Result<(), String> {
		check_ref("rep", self.rep)?;
		check_text("name", &self.name, PROJECT_NAME_MAX)?;
		check_text("nickname", &self.nickname, PROJECT_NICKNAME_MAX)?;
		if self.max_rsv <= 0 {
			return Err(format!("max_rsv must be positive (got {})", self.max_rsv));
		}
		Ok(())
	}

	fn to_fields(&self) -> Fields {
		vec![
			("id", Value::from(self.id)),
			("rep", Value::from(self.rep)),
			("name", Value::from(self.name.as_str())),
			("nickname", Value::from(self.nickname.as_str())),
			("max_rsv", Value::from(self.max_rsv)),
		]
	}

	fn from_row(row: &Row) -> Result<Self> {
		let project = Project::new(
			row.get_i64("rep")?,
			row.get_string("name")?,
			row.get_string("nickname")?,
			row.get_i64("max_rsv")?,
		)?;
		with_row_id(project, row)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ErrorKind;

	#[test]
	fn valid_project_constructs() {
		let pj = Project::new(1, "Robotics Club", "robo", 5).unwrap();
		assert_eq!(pj.max_rsv(), 5);
		assert_eq!(pj.to_fields().len(), Project::COLUMNS.len());
	}

	#[test]
	fn each_invalid_field_is_rejected() {
		let cases = [
			Project::new(0, "Robotics Club", "robo", 5),
			Project::new(1, "", "robo", 5),
			Project::new(1, "Robotics Club", "", 5),
			Project::new(1, "Robotics Club", "r".repeat(64), 5),
			Project::new(1, "Robotics Club", "robo", 0),
		];
		for result in cases {
			assert_eq!(result.unwrap_err().kind(), ErrorKind::Validation);
		}
	}
}
