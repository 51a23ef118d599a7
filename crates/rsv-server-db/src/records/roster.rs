// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Serialize;

use crate::error::Result;
use crate::record::{check_ref, validated, with_row_id, Record};
use crate::value::{Fields, Row, Value};

/// Membership of a user in a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRoster {
	id: Option<i64>,
	pj_id: i64,
	user_id: i64,
}

impl ProjectRoster {
	pub fn new(pj_id: i64, user_id: i64) -> Result<Self> {
		validated(Self {
			id: None,
			pj_id,
			user_id,
		})
	}

	pub fn pj_id(&self) -> i64 {
		self.pj_id
	}

	pub fn user_id(&self) -> i64 {
		self.user_id
	}
}

impl Record for ProjectRoster {
	const TABLE: &'static str = "pj_roster";
	const ENTITY: &'static str = "project roster";
	const COLUMNS: &'static [&'static str] = &["id", "pj_id", "user_id"];

	fn id(&self) -> Option<i64> {
		self.id
	}

	fn with_id(mut self, id: i64) -> Self {
		self.id = Some(id);
		self
	}

	fn check(&self) -> std::result::Result<(), String> {
		check_ref("pj_id", self.pj_id)?;
		check_ref("user_id", self.user_id)
	}

	fn to_fields(&self) -> Fields {
		vec![
			("id", Value::from(self.id)),
			("pj_id", Value::from(self.pj_id)),
			("user_id", Value::from(self.user_id)),
		]
	}

	fn from_row(row: &Row) -> Result<Self> {
		let roster = ProjectRoster::new(row.get_i64("pj_id")?, row.get_i64("user_id")?)?;
		with_row_id(roster, row)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ids_must_be_positive() {
		assert!(ProjectRoster::new(1, 2).is_ok());
		assert!(ProjectRoster::new(0, 2).is_err());
		assert!(ProjectRoster::new(1, -2).is_err());
	}
}
