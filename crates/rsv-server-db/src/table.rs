// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Generic table gateway.
//!
//! [`Table`] provides CRUD for any [`Record`] type: it builds parameterized
//! statements, hands them to the [`Database`], turns rows back into records
//! and consults the table's [`AccessPolicy`] for every record it reads,
//! writes or deletes.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::policy::{AccessPolicy, Action, AllowAll};
use crate::query::Statement;
use crate::record::Record;
use crate::value::Value;

/// CRUD gateway for one record type.
///
/// Construct one per entity at startup and share it; cloning is cheap.
pub struct Table<R: Record> {
	db: Database,
	policy: Arc<dyn AccessPolicy<R>>,
}

impl<R: Record> Clone for Table<R> {
	fn clone(&self) -> Self {
		Self {
			db: self.db.clone(),
			policy: Arc::clone(&self.policy),
		}
	}
}

impl<R: Record> Table<R> {
	/// A gateway that allows every read, write and delete.
	pub fn new(db: Database) -> Self {
		Self::with_policy(db, Arc::new(AllowAll))
	}

	pub fn with_policy(db: Database, policy: Arc<dyn AccessPolicy<R>>) -> Self {
		Self { db, policy }
	}

	pub fn table_name(&self) -> &'static str {
		R::TABLE
	}

	pub fn database(&self) -> &Database {
		&self.db
	}

	/// Every readable record, ordered by id.
	#[tracing::instrument(skip(self), fields(table = R::TABLE))]
	pub async fn get_all(&self) -> Result<Vec<R>> {
		self
			.select_records(&[])
			.await
			.map_err(|e| self.fail("get_all", e))
	}

	/// # Errors
	/// `InvalidArgument` for a non-positive id, `NotFound` when no readable
	/// row has this id.
	#[tracing::instrument(skip(self), fields(table = R::TABLE))]
	pub async fn get_by_id(&self, id: i64) -> Result<R> {
		let result = async {
			check_id(id)?;
			self
				.select_records(&[("id", Value::Integer(id))])
				.await?
				.pop()
				.ok_or_else(|| DbError::not_found_id(R::ENTITY, id))
		}
		.await;
		result.map_err(|e| self.fail("get_by_id", e))
	}

	/// Records whose id is any of `ids`. Unknown ids are skipped.
	#[tracing::instrument(skip(self, ids), fields(table = R::TABLE, count = ids.len()))]
	pub async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<R>> {
		let values: Vec<Value> = ids.iter().copied().map(Value::Integer).collect();
		self
			.select_any("id", &values)
			.await
			.map_err(|e| self.fail("get_by_ids", e))
	}

	/// Records where `column` equals `value`. Matching nothing is not an
	/// error.
	#[tracing::instrument(skip(self, value), fields(table = R::TABLE))]
	pub async fn get_by_condition(&self, column: &str, value: impl Into<Value> + Send) -> Result<Vec<R>> {
		let conditions = [(column, value.into())];
		self
			.select_checked(&conditions)
			.await
			.map_err(|e| self.fail("get_by_condition", e))
	}

	/// Records matching every `(column, value)` pair.
	#[tracing::instrument(skip(self, conditions), fields(table = R::TABLE, count = conditions.len()))]
	pub async fn get_by_conditions(&self, conditions: &[(&str, Value)]) -> Result<Vec<R>> {
		self
			.select_checked(conditions)
			.await
			.map_err(|e| self.fail("get_by_conditions", e))
	}

	/// Records where `column` equals any of `values`, rendered as an OR of
	/// equalities. An empty list matches nothing and skips the store.
	#[tracing::instrument(skip(self, values), fields(table = R::TABLE, count = values.len()))]
	pub async fn get_by_condition_multi_value(&self, column: &str, values: &[Value]) -> Result<Vec<R>> {
		self
			.select_any(column, values)
			.await
			.map_err(|e| self.fail("get_by_condition_multi_value", e))
	}

	/// Whether a row with `id` exists. Ignores the read policy.
	#[tracing::instrument(skip(self), fields(table = R::TABLE))]
	pub async fn exists(&self, id: i64) -> Result<bool> {
		self
			.row_exists(id)
			.await
			.map_err(|e| self.fail("exists", e))
	}

	#[tracing::instrument(skip(self), fields(table = R::TABLE))]
	pub async fn count(&self) -> Result<i64> {
		self
			.db
			.count(R::TABLE)
			.await
			.map_err(|e| self.fail("count", e))
	}

	/// Insert `record` and return its id.
	///
	/// A record carrying a positive id is inserted with that id; otherwise the
	/// store assigns one.
	#[tracing::instrument(skip(self, record), fields(table = R::TABLE, id = ?record.id()))]
	pub async fn insert(&self, record: &R) -> Result<i64> {
		let result = async {
			self.ensure_allowed(Action::Write, record)?;
			self.insert_unchecked(record).await
		}
		.await;
		result.map_err(|e| self.fail("insert", e))
	}

	/// Overwrite every field of the row with the record's id.
	///
	/// # Errors
	/// `InvalidArgument` if the record has no id, `NotFound` if no row has it.
	#[tracing::instrument(skip(self, record), fields(table = R::TABLE, id = ?record.id()))]
	pub async fn update(&self, record: &R) -> Result<()> {
		let result = async {
			self.ensure_allowed(Action::Write, record)?;
			let id = persisted_id(record).ok_or_else(|| {
				DbError::InvalidArgument(format!("{} has no id to update by", R::ENTITY))
			})?;
			self.update_unchecked(record, id).await
		}
		.await;
		result.map_err(|e| self.fail("update", e))
	}

	/// Insert or update, returning the record's id.
	///
	/// - id set and row present: update by id
	/// - id set and row absent: insert keeping the caller's id
	/// - no id: insert with a store-assigned id
	#[tracing::instrument(skip(self, record), fields(table = R::TABLE, id = ?record.id()))]
	pub async fn upsert(&self, record: &R) -> Result<i64> {
		let result = async {
			self.ensure_allowed(Action::Write, record)?;
			match persisted_id(record) {
				Some(id) if self.row_exists(id).await? => {
					self.update_unchecked(record, id).await?;
					Ok(id)
				}
				_ => self.insert_unchecked(record).await,
			}
		}
		.await;
		result.map_err(|e| self.fail("upsert", e))
	}

	/// # Errors
	/// `InvalidArgument` for a non-positive id, `NotFound` when no readable
	/// row has it, `Permission` when the delete policy rejects the record.
	#[tracing::instrument(skip(self), fields(table = R::TABLE))]
	pub async fn delete_by_id(&self, id: i64) -> Result<()> {
		let result = async {
			check_id(id)?;
			let record = self
				.select_records(&[("id", Value::Integer(id))])
				.await?
				.pop()
				.ok_or_else(|| DbError::not_found_id(R::ENTITY, id))?;
			self.ensure_allowed(Action::Delete, &record)?;

			let outcome = self.db.execute(&Statement::delete_by_id(R::TABLE, id)).await?;
			if outcome.rows_affected == 0 {
				return Err(DbError::not_found_id(R::ENTITY, id));
			}
			tracing::debug!(table = R::TABLE, id, "deleted record");
			Ok(())
		}
		.await;
		result.map_err(|e| self.fail("delete_by_id", e))
	}

	async fn select_checked(&self, conditions: &[(&str, Value)]) -> Result<Vec<R>> {
		let mut seen = HashSet::with_capacity(conditions.len());
		for (column, _) in conditions {
			check_column::<R>(column)?;
			if !seen.insert(*column) {
				return Err(DbError::InvalidArgument(format!(
					"Column '{column}' appears more than once in conditions"
				)));
			}
		}
		self.select_records(conditions).await
	}

	async fn select_records(&self, conditions: &[(&str, Value)]) -> Result<Vec<R>> {
		let rows = self
			.db
			.fetch_all(&Statement::select(R::TABLE, conditions))
			.await?;
		self.readable(rows)
	}

	async fn select_any(&self, column: &str, values: &[Value]) -> Result<Vec<R>> {
		check_column::<R>(column)?;
		if values.is_empty() {
			return Ok(Vec::new());
		}
		let rows = self
			.db
			.fetch_all(&Statement::select_any(R::TABLE, column, values))
			.await?;
		self.readable(rows)
	}

	/// Convert rows into records, silently dropping unreadable ones.
	fn readable(&self, rows: Vec<crate::value::Row>) -> Result<Vec<R>> {
		let total = rows.len();
		let mut records = Vec::with_capacity(total);
		for row in &rows {
			let record = R::from_row(row)?;
			if self.policy.is_allowed(Action::Read, &record) {
				records.push(record);
			}
		}
		if records.len() < total {
			tracing::debug!(
				table = R::TABLE,
				hidden = total - records.len(),
				"read policy filtered rows"
			);
		}
		Ok(records)
	}

	async fn row_exists(&self, id: i64) -> Result<bool> {
		if id <= 0 {
			return Ok(false);
		}
		let rows = self.db.fetch_all(&Statement::select_id(R::TABLE, id)).await?;
		Ok(!rows.is_empty())
	}

	async fn insert_unchecked(&self, record: &R) -> Result<i64> {
		let explicit_id = persisted_id(record);
		let mut fields = record.to_fields();
		if explicit_id.is_none() {
			fields.retain(|(column, _)| *column != "id");
		}

		let outcome = self.db.execute(&Statement::insert(R::TABLE, &fields)).await?;
		let id = explicit_id.unwrap_or(outcome.last_insert_id);
		tracing::debug!(table = R::TABLE, id, explicit = explicit_id.is_some(), "inserted record");
		Ok(id)
	}

	async fn update_unchecked(&self, record: &R, id: i64) -> Result<()> {
		let outcome = self
			.db
			.execute(&Statement::update_by_id(R::TABLE, &record.to_fields(), id))
			.await?;
		if outcome.rows_affected == 0 {
			return Err(DbError::not_found_id(R::ENTITY, id));
		}
		tracing::debug!(table = R::TABLE, id, "updated record");
		Ok(())
	}

	fn ensure_allowed(&self, action: Action, record: &R) -> Result<()> {
		if self.policy.is_allowed(action, record) {
			Ok(())
		} else {
			Err(DbError::Permission {
				entity: R::ENTITY,
				action,
			})
		}
	}

	fn fail(&self, operation: &'static str, err: DbError) -> DbError {
		match &err {
			DbError::NotFound { .. } => {
				tracing::debug!(table = R::TABLE, operation, error = %err, "record not found")
			}
			_ => tracing::warn!(table = R::TABLE, operation, error = %err, "table operation failed"),
		}
		err.context(format!("{}.{operation}", R::TABLE))
	}
}

fn persisted_id<R: Record>(record: &R) -> Option<i64> {
	record.id().filter(|id| *id > 0)
}

fn check_id(id: i64) -> Result<()> {
	if id <= 0 {
		return Err(DbError::InvalidArgument(format!(
			"Record id must be a positive integer (got {id})"
		)));
	}
	Ok(())
}

fn check_column<R: Record>(column: &str) -> Result<()> {
	if R::has_column(column) {
		Ok(())
	} else {
		Err(DbError::InvalidArgument(format!(
			"Unknown column '{column}' for table {}",
			R::TABLE
		)))
	}
}

/// Object-safe view of a gateway for code that should not depend on the
/// concrete table type.
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
	async fn get_all(&self) -> Result<Vec<R>>;
	async fn get_by_id(&self, id: i64) -> Result<R>;
	async fn exists(&self, id: i64) -> Result<bool>;
	async fn upsert(&self, record: &R) -> Result<i64>;
	async fn delete_by_id(&self, id: i64) -> Result<()>;
}

#[async_trait]
impl<R: Record> RecordStore<R> for Table<R> {
	async fn get_all(&self) -> Result<Vec<R>> {
		self.get_all().await
	}

	async fn get_by_id(&self, id: i64) -> Result<R> {
		self.get_by_id(id).await
	}

	async fn exists(&self, id: i64) -> Result<bool> {
		self.exists(id).await
	}

	async fn upsert(&self, record: &R) -> Result<i64> {
		self.upsert(record).await
	}

	async fn delete_by_id(&self, id: i64) -> Result<()> {
		self.delete_by_id(id).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::{ConstraintKind, ErrorKind};
	use crate::policy::PolicyFn;
	use crate::records::{Room, User};
	use crate::testing::create_test_database;

	async fn rooms() -> Table<Room> {
		Table::new(create_test_database().await)
	}

	#[tokio::test]
	async fn insert_assigns_id_and_round_trips() {
		let table = rooms().await;
		let id = table.insert(&Room::new("Main Hall", "MH").unwrap()).await.unwrap();
		assert!(id > 0);

		let room = table.get_by_id(id).await.unwrap();
		assert_eq!(room.id(), Some(id));
		assert_eq!(room.name(), "Main Hall");
		assert_eq!(room.short_name(), "MH");
	}

	#[tokio::test]
	async fn get_by_id_rejects_non_positive_ids() {
		let table = rooms().await;
		for id in [0, -1] {
			let err = table.get_by_id(id).await.unwrap_err();
			assert_eq!(err.kind(), ErrorKind::InvalidArgument);
		}
	}

	#[tokio::test]
	async fn get_by_id_missing_is_not_found() {
		let table = rooms().await;
		let err = table.get_by_id(9999).await.unwrap_err();
		assert!(matches!(err, DbError::NotFound { entity: "room", .. }));
	}

	#[tokio::test]
	async fn empty_table_returns_empty_results() {
		let table = rooms().await;
		assert!(table.get_all().await.unwrap().is_empty());
		assert!(table.get_by_condition("name", "Nowhere").await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn unknown_columns_are_rejected() {
		let table = rooms().await;
		let err = table
			.get_by_condition("name; DROP TABLE room", "x")
			.await
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::InvalidArgument);

		let err = table
			.get_by_condition_multi_value("capacity", &[Value::Integer(1)])
			.await
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::InvalidArgument);
	}

	#[tokio::test]
	async fn duplicate_condition_columns_are_rejected() {
		let table = rooms().await;
		let err = table
			.get_by_conditions(&[("name", Value::from("A")), ("name", Value::from("B"))])
			.await
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::InvalidArgument);
	}

	#[tokio::test]
	async fn conditions_are_conjunctive() {
		let table = rooms().await;
		table.insert(&Room::new("Main Hall", "MH").unwrap()).await.unwrap();
		table.insert(&Room::new("Main Hall", "MH2").unwrap()).await.unwrap();

		let both = table.get_by_condition("name", "Main Hall").await.unwrap();
		assert_eq!(both.len(), 2);
		let one = table
			.get_by_conditions(&[("name", Value::from("Main Hall")), ("short_name", Value::from("MH2"))])
			.await
			.unwrap();
		assert_eq!(one.len(), 1);
		assert_eq!(one[0].short_name(), "MH2");
	}

	#[tokio::test]
	async fn multi_value_handles_empty_and_duplicate_lists() {
		let table = rooms().await;
		let a = table.insert(&Room::new("Room A", "A").unwrap()).await.unwrap();
		let b = table.insert(&Room::new("Room B", "B").unwrap()).await.unwrap();
		table.insert(&Room::new("Room C", "C").unwrap()).await.unwrap();

		assert!(table.get_by_condition_multi_value("id", &[]).await.unwrap().is_empty());

		let found = table
			.get_by_condition_multi_value(
				"id",
				&[Value::Integer(a), Value::Integer(b), Value::Integer(a)],
			)
			.await
			.unwrap();
		let ids: Vec<_> = found.iter().filter_map(|r| r.id()).collect();
		assert_eq!(ids, vec![a, b]);

		let by_ids = table.get_by_ids(&[b, 4242]).await.unwrap();
		assert_eq!(by_ids.len(), 1);
	}

	#[tokio::test]
	async fn upsert_without_id_inserts() {
		let table = rooms().await;
		let id = table.upsert(&Room::new("Main Hall", "MH").unwrap()).await.unwrap();
		assert!(table.exists(id).await.unwrap());
		assert_eq!(table.count().await.unwrap(), 1);
	}

	#[tokio::test]
	async fn upsert_with_absent_id_inserts_preserving_id() {
		let table = rooms().await;
		let room = Room::new("Seeded Room", "SR").unwrap().with_id(40);
		let id = table.upsert(&room).await.unwrap();
		assert_eq!(id, 40);
		assert_eq!(table.get_by_id(40).await.unwrap().name(), "Seeded Room");
	}

	#[tokio::test]
	async fn upsert_with_existing_id_updates() {
		let table = rooms().await;
		let id = table.insert(&Room::new("Main Hall", "MH").unwrap()).await.unwrap();

		let renamed = Room::new("Great Hall", "GH").unwrap().with_id(id);
		assert_eq!(table.upsert(&renamed).await.unwrap(), id);

		let stored = table.get_by_id(id).await.unwrap();
		assert_eq!(stored, renamed);
		assert_eq!(table.count().await.unwrap(), 1);
	}

	#[tokio::test]
	async fn stray_non_positive_id_is_stripped() {
		let table = rooms().await;
		let room = Room::new("Main Hall", "MH").unwrap().with_id(-5);
		let id = table.upsert(&room).await.unwrap();
		assert!(id > 0);
	}

	#[tokio::test]
	async fn update_requires_existing_id() {
		let table = rooms().await;
		let err = table.update(&Room::new("Main Hall", "MH").unwrap()).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::InvalidArgument);

		let err = table
			.update(&Room::new("Main Hall", "MH").unwrap().with_id(77))
			.await
			.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::NotFound);
	}

	#[tokio::test]
	async fn delete_then_exists_is_false() {
		let table = rooms().await;
		let id = table.insert(&Room::new("Main Hall", "MH").unwrap()).await.unwrap();
		table.delete_by_id(id).await.unwrap();
		assert!(!table.exists(id).await.unwrap());

		let err = table.delete_by_id(id).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::NotFound);
		let err = table.delete_by_id(0).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::InvalidArgument);
	}

	#[tokio::test]
	async fn exists_is_false_for_non_positive_ids() {
		let table = rooms().await;
		assert!(!table.exists(0).await.unwrap());
		assert!(!table.exists(-3).await.unwrap());
	}

	#[tokio::test]
	async fn store_constraint_errors_carry_operation_context() {
		let table: Table<User> = Table::new(create_test_database().await);
		table
			.insert(&User::new("Alice", "alice@example.com").unwrap())
			.await
			.unwrap();
		let err = table
			.insert(&User::new("Alice Again", "alice@example.com").unwrap())
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			DbError::Constraint {
				kind: ConstraintKind::Unique,
				..
			}
		));
		assert!(err.to_string().contains("user.insert"));
	}

	#[tokio::test]
	async fn write_policy_rejection_is_permission_error() {
		let db = create_test_database().await;
		let table: Table<Room> = Table::with_policy(
			db,
			Arc::new(PolicyFn(|action: Action, _: &Room| action != Action::Write)),
		);
		let err = table.upsert(&Room::new("Main Hall", "MH").unwrap()).await.unwrap_err();
		assert!(matches!(
			err,
			DbError::Permission {
				action: Action::Write,
				..
			}
		));
		assert_eq!(table.count().await.unwrap(), 0);
	}

	#[tokio::test]
	async fn read_policy_silently_filters_rows() {
		let db = create_test_database().await;
		let writer = Table::<Room>::new(db.clone());
		let hidden = writer.insert(&Room::new("Server Room", "SR").unwrap()).await.unwrap();
		writer.insert(&Room::new("Main Hall", "MH").unwrap()).await.unwrap();

		let reader: Table<Room> = Table::with_policy(
			db,
			Arc::new(PolicyFn(|action: Action, room: &Room| {
				action != Action::Read || room.short_name() != "SR"
			})),
		);
		let visible = reader.get_all().await.unwrap();
		assert_eq!(visible.len(), 1);
		assert_eq!(visible[0].name(), "Main Hall");

		assert_eq!(reader.get_by_id(hidden).await.unwrap_err().kind(), ErrorKind::NotFound);
		assert!(reader.exists(hidden).await.unwrap());
	}

	#[tokio::test]
	async fn delete_policy_rejection_keeps_row() {
		let db = create_test_database().await;
		let table: Table<Room> = Table::with_policy(
			db,
			Arc::new(PolicyFn(|action: Action, _: &Room| action != Action::Delete)),
		);
		let id = table.insert(&Room::new("Main Hall", "MH").unwrap()).await.unwrap();
		let err = table.delete_by_id(id).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Permission);
		assert!(table.exists(id).await.unwrap());
	}

	#[tokio::test]
	async fn record_store_trait_object_delegates() {
		let table = rooms().await;
		let store: Arc<dyn RecordStore<Room>> = Arc::new(table.clone());
		let id = store.upsert(&Room::new("Main Hall", "MH").unwrap()).await.unwrap();
		assert!(store.exists(id).await.unwrap());
		assert_eq!(store.get_all().await.unwrap().len(), 1);
		store.delete_by_id(id).await.unwrap();
		assert_eq!(store.get_by_id(id).await.unwrap_err().kind(), ErrorKind::NotFound);
	}
}
