// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-entity gateways and the registry that builds them.

use std::sync::Arc;

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::policy::{AccessPolicy, AllowAll};
use crate::records::{
	BlackoutDefinition, Project, ProjectRoster, Reservation, Room, RoomBlackout, User,
};
use crate::table::Table;

pub type UserTable = Table<User>;
pub type ProjectTable = Table<Project>;
pub type ProjectRosterTable = Table<ProjectRoster>;
pub type RoomTable = Table<Room>;
pub type ReservationTable = Table<Reservation>;
pub type BlackoutDefinitionTable = Table<BlackoutDefinition>;
pub type RoomBlackoutTable = Table<RoomBlackout>;

impl Table<User> {
	/// Look a user up by email address.
	///
	/// # Errors
	/// `NotFound` when no readable user has this email.
	pub async fn get_by_email(&self, email: &str) -> Result<User> {
		let mut users = self.get_by_condition("email", email).await?;
		if users.is_empty() {
			return Err(DbError::NotFound {
				entity: "user",
				key: format!("email {email}"),
			});
		}
		Ok(users.swap_remove(0))
	}
}

impl Table<ProjectRoster> {
	pub async fn get_by_project(&self, pj_id: i64) -> Result<Vec<ProjectRoster>> {
		self.get_by_condition("pj_id", pj_id).await
	}

	pub async fn get_by_user(&self, user_id: i64) -> Result<Vec<ProjectRoster>> {
		self.get_by_condition("user_id", user_id).await
	}
}

impl Table<Reservation> {
	pub async fn get_by_room(&self, room_id: i64) -> Result<Vec<Reservation>> {
		self.get_by_condition("room_id", room_id).await
	}

	pub async fn get_by_project(&self, pj_id: i64) -> Result<Vec<Reservation>> {
		self.get_by_condition("pj_id", pj_id).await
	}
}

impl Table<RoomBlackout> {
	pub async fn get_by_room(&self, room_id: i64) -> Result<Vec<RoomBlackout>> {
		self.get_by_condition("room_id", room_id).await
	}
}

/// Access policy for each gateway in [`Tables`]. The default allows
/// everything; override single entries with struct update syntax.
#[derive(Clone)]
pub struct TablePolicies {
	pub users: Arc<dyn AccessPolicy<User>>,
	pub projects: Arc<dyn AccessPolicy<Project>>,
	pub rosters: Arc<dyn AccessPolicy<ProjectRoster>>,
	pub rooms: Arc<dyn AccessPolicy<Room>>,
	pub reservations: Arc<dyn AccessPolicy<Reservation>>,
	pub blackout_definitions: Arc<dyn AccessPolicy<BlackoutDefinition>>,
	pub room_blackouts: Arc<dyn AccessPolicy<RoomBlackout>>,
}

impl Default for TablePolicies {
	fn default() -> Self {
		Self {
			users: Arc::new(AllowAll),
			projects: Arc::new(AllowAll),
			rosters: Arc::new(AllowAll),
			rooms: Arc::new(AllowAll),
			reservations: Arc::new(AllowAll),
			blackout_definitions: Arc::new(AllowAll),
			room_blackouts: Arc::new(AllowAll),
		}
	}
}

/// One gateway per managed table, all sharing a single [`Database`].
///
/// Built once at startup and passed to whatever needs data access.
#[derive(Clone)]
pub struct Tables {
	pub users: UserTable,
	pub projects: ProjectTable,
	pub rosters: ProjectRosterTable,
	pub rooms: RoomTable,
	pub reservations: ReservationTable,
	pub blackout_definitions: BlackoutDefinitionTable,
	pub room_blackouts: RoomBlackoutTable,
	db: Database,
}

impl Tables {
	pub fn new(db: Database) -> Self {
		Self::with_policies(db, TablePolicies::default())
	}

	pub fn with_policies(db: Database, policies: TablePolicies) -> Self {
		Self {
			users: Table::with_policy(db.clone(), policies.users),
			projects: Table::with_policy(db.clone(), policies.projects),
			rosters: Table::with_policy(db.clone(), policies.rosters),
			rooms: Table::with_policy(db.clone(), policies.rooms),
			reservations: Table::with_policy(db.clone(), policies.reservations),
			blackout_definitions: Table::with_policy(db.clone(), policies.blackout_definitions),
			room_blackouts: Table::with_policy(db.clone(), policies.room_blackouts),
			db,
		}
	}

	pub fn database(&self) -> &Database {
		&self.db
	}

	/// Row count of every managed table, in schema order.
	#[tracing::instrument(skip(self))]
	pub async fn row_counts(&self) -> Result<Vec<(&'static str, i64)>> {
		Ok(vec![
			(self.users.table_name(), self.users.count().await?),
			(self.projects.table_name(), self.projects.count().await?),
			(self.rosters.table_name(), self.rosters.count().await?),
			(self.rooms.table_name(), self.rooms.count().await?),
			(self.reservations.table_name(), self.reservations.count().await?),
			(
				self.blackout_definitions.table_name(),
				self.blackout_definitions.count().await?,
			),
			(self.room_blackouts.table_name(), self.room_blackouts.count().await?),
		])
	}
}
