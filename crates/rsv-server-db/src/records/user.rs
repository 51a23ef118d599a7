// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Serialize;

use crate::error::Result;
use crate::record::{check_len, check_text, is_valid_email, validated, with_row_id, Record};
use crate::value::{Fields, Row, Value};

pub const USER_NAME_MAX: usize = 128;
pub const USER_EMAIL_MAX: usize = 256;

/// A person who can book rooms and belong to projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
	id: Option<i64>,
	name: String,
	email: String,
}

impl User {
	/// # Errors
	/// `DbError::Validation` if the name is empty or too long, or the email
	/// is malformed.
	pub fn new(name: impl Into<String>, email: impl Into<String>) -> Result<Self> {
		validated(Self {
			id: None,
			name: name.into(),
			email: email.into(),
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn email(&self) -> &str {
		&self.email
	}
}

impl Record for User {
	const TABLE: &'static str = "user";
	const ENTITY: &'static str = "user";
	const COLUMNS: &'static [&'static str] = &["id", "name", "email"];

	fn id(&self) -> Option<i64> {
		self.id
	}

	fn with_id(mut self, id: i64) -> Self {
		self.id = Some(id);
		self
	}

	fn check(&self) -> std::result::Result<(), String> {
		check_text("name", &self.name, USER_NAME_MAX)?;
		if !is_valid_email(&self.email) {
			return Err(format!("email '{}' is not a valid address", self.email));
		}
		check_len("email", &self.email, USER_EMAIL_MAX)
	}

	fn to_fields(&self) -> Fields {
		vec![
			("id", Value::from(self.id)),
			("name", Value::from(self.name.as_str())),
			("email", Value::from(self.email.as_str())),
		]
	}

	fn from_row(row: &Row) -> Result<Self> {
		let user = User::new(row.get_string("name")?, row.get_string("email")?)?;
		with_row_id(user, row)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ErrorKind;
	use proptest::prelude::*;

	#[test]
	fn valid_user_constructs() {
		let user = User::new("Alice", "alice@example.com").unwrap();
		assert!(user.validate());
		assert!(!user.has_id());
		assert_eq!(user.name(), "Alice");
	}

	#[test]
	fn invalid_fields_fail_with_validation_error() {
		for (name, email) in [
			("", "alice@example.com"),
			("Alice", "not-an-email"),
			("Alice", ""),
		] {
			let err = User::new(name, email).unwrap_err();
			assert_eq!(err.kind(), ErrorKind::Validation, "{name:?} {email:?}");
		}
	}

	#[test]
	fn overlong_email_is_rejected() {
		let email = format!("{}@example.com", "a".repeat(250));
		assert!(User::new("Alice", email).is_err());
	}

	#[test]
	fn fields_put_id_first_and_null_when_unset() {
		let user = User::new("Alice", "alice@example.com").unwrap();
		let fields = user.to_fields();
		assert_eq!(fields[0], ("id", Value::Null));
		assert_eq!(fields[2], ("email", Value::from("alice@example.com")));

		let user = user.with_id(3);
		assert_eq!(user.to_fields()[0], ("id", Value::Integer(3)));
		assert!(user.has_id());
	}

	#[test]
	fn from_row_validates_and_sets_id() {
		let mut row = Row::new();
		row.insert("id", 9i64);
		row.insert("name", "Bob");
		row.insert("email", "bob@example.com");
		let user = User::from_row(&row).unwrap();
		assert_eq!(user.id(), Some(9));

		row.insert("email", "broken");
		assert_eq!(User::from_row(&row).unwrap_err().kind(), ErrorKind::Validation);
	}

	proptest! {
		#[test]
		fn bounded_names_are_accepted(name in "[A-Za-z][A-Za-z ]{0,126}") {
			prop_assert!(User::new(name, "someone@example.com").is_ok());
		}

		#[test]
		fn long_names_are_rejected(name in "[A-Za-z]{128,200}") {
			prop_assert!(User::new(name, "someone@example.com").is_err());
		}
	}
}
