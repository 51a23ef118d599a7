// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Helpers for tests that need a live, initialized store.

use crate::database::{Database, DatabaseSettings};
use crate::tables::Tables;

/// A fresh in-memory database with every table created.
pub async fn create_test_database() -> Database {
	let db = Database::connect(&DatabaseSettings::in_memory()).await.unwrap();
	db.init().await.unwrap();
	db
}

pub async fn create_test_tables() -> Tables {
	Tables::new(create_test_database().await)
}
