// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Data access layer for the meeting-room reservation server.
//!
//! This crate provides:
//! - A connection manager that creates the fixed schema on first start
//! - Validated record types for users, projects, rosters, rooms,
//!   reservations and room blackouts
//! - A generic [`Table`] gateway with per-record access policies
//! - Translation of store error codes into a small error taxonomy
//!
//! # Usage
//!
//! ```ignore
//! use rsv_server_db::{Database, DatabaseSettings, Tables, Room};
//!
//! let db = Database::connect(&DatabaseSettings::default()).await?;
//! db.init().await?;
//! let tables = Tables::new(db);
//! let id = tables.rooms.insert(&Room::new("Main Hall", "MH")?).await?;
//! ```

pub mod database;
pub mod error;
pub mod policy;
pub mod query;
pub mod record;
pub mod records;
pub mod schema;
pub mod table;
pub mod tables;
pub mod testing;
pub mod value;

pub use database::{Database, DatabaseSettings, ExecOutcome, DEFAULT_DATABASE_URL};
pub use error::{ConstraintKind, DbError, ErrorKind, Result};
pub use policy::{AccessPolicy, Action, AllowAll, PolicyFn};
pub use query::Statement;
pub use record::{is_valid_email, Record};
pub use records::*;
pub use table::{RecordStore, Table};
pub use tables::{
	BlackoutDefinitionTable, ProjectRosterTable, ProjectTable, ReservationTable, RoomBlackoutTable,
	RoomTable, TablePolicies, Tables, UserTable,
};
pub use value::{Fields, Row, Value};
