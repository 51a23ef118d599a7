// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Connection manager: owns the store handle, bootstraps the schema and runs
//! every statement under a timeout.

use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use sqlx::sqlite::{
	Sqlite, SqliteArguments, SqliteConnectOptions, SqliteJournalMode, SqlitePool,
	SqlitePoolOptions, SqliteSynchronous,
};

use crate::error::{DbError, Result};
use crate::query::Statement;
use crate::schema;
use crate::value::{Row, Value};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./meeting-room.sqlite";

/// VM instructions between deadline checks on a running statement.
const DEADLINE_CHECK_OPS: i32 = 1_000;

/// Slack for the outer timer, so an interrupted statement reports first.
const TIMEOUT_GRACE: Duration = Duration::from_millis(100);

/// SQLITE_INTERRUPT, raised when the deadline check aborts a statement.
const SQLITE_INTERRUPT: &str = "9";

/// Connection settings, usually resolved from server configuration.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
	pub url: String,
	pub max_connections: u32,
	pub busy_timeout: Duration,
	pub statement_timeout: Duration,
}

impl Default for DatabaseSettings {
	fn default() -> Self {
		Self {
			url: DEFAULT_DATABASE_URL.to_string(),
			max_connections: 1,
			busy_timeout: Duration::from_secs(5),
			statement_timeout: Duration::from_secs(30),
		}
	}
}

impl DatabaseSettings {
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			..Default::default()
		}
	}

	pub fn in_memory() -> Self {
		Self::new("sqlite::memory:")
	}

	pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
		self.statement_timeout = timeout;
		self
	}

	fn is_in_memory(&self) -> bool {
		self.url.contains(":memory:") || self.url.contains("mode=memory")
	}
}

/// Result of a mutating statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutcome {
	pub rows_affected: u64,
	pub last_insert_id: i64,
}

/// Shared handle to the backing store.
///
/// Cloning is cheap and every clone refers to the same pool. Nothing here
/// locks; concurrent writers are serialized by SQLite itself.
#[derive(Clone)]
pub struct Database {
	pool: SqlitePool,
	statement_timeout: Duration,
	initialized: Arc<AtomicBool>,
}

impl std::fmt::Debug for Database {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Database")
			.field("statement_timeout", &self.statement_timeout)
			.field("initialized", &self.is_initialized())
			.finish()
	}
}

impl Database {
	/// Open the store described by `settings`.
	///
	/// # Errors
	/// Returns `DbError::Connection` if the URL is invalid or the store cannot
	/// be opened.
	#[tracing::instrument(skip(settings), fields(max_connections = settings.max_connections))]
	pub async fn connect(settings: &DatabaseSettings) -> Result<Self> {
		let in_memory = settings.is_in_memory();
		let mut options = SqliteConnectOptions::from_str(&settings.url)
			.map_err(|e| DbError::Connection(format!("Invalid database URL: {e}")))?
			.foreign_keys(true)
			.busy_timeout(settings.busy_timeout)
			.create_if_missing(true);
		if !in_memory {
			options = options
				.journal_mode(SqliteJournalMode::Wal)
				.synchronous(SqliteSynchronous::Normal);
		}

		let mut pool_options = SqlitePoolOptions::new().max_connections(settings.max_connections.max(1));
		if in_memory {
			// Every connection to an in-memory store is a separate database.
			pool_options = pool_options
				.max_connections(1)
				.min_connections(1)
				.idle_timeout(None)
				.max_lifetime(None);
		}

		let pool = pool_options
			.connect_with(options)
			.await
			.map_err(|e| DbError::Connection(format!("Could not open database: {e}")))?;

		tracing::debug!(in_memory, "database pool created");
		Ok(Self {
			pool,
			statement_timeout: settings.statement_timeout,
			initialized: Arc::new(AtomicBool::new(false)),
		})
	}

	/// Create any missing managed tables. Safe to call repeatedly.
	///
	/// # Errors
	/// Returns `DbError::Schema` if a table cannot be created, or the
	/// translated store error if the existing tables cannot be listed.
	#[tracing::instrument(skip(self))]
	pub async fn init(&self) -> Result<()> {
		let existing = self.table_names().await.map_err(|e| e.context("init"))?;

		for table in schema::TABLES {
			if existing.iter().any(|name| name == table.name) {
				continue;
			}
			self
				.run_raw(table.ddl)
				.await
				.map_err(|e| DbError::Schema(format!("Failed to create table {}: {e}", table.name)))?;
			tracing::info!(table = table.name, "created table");
		}

		self.initialized.store(true, Ordering::Release);
		tracing::debug!("database schema ready");
		Ok(())
	}

	/// Drop every managed table and bootstrap the schema again.
	#[tracing::instrument(skip(self))]
	pub async fn reset(&self) -> Result<()> {
		self.initialized.store(false, Ordering::Release);
		for table in schema::TABLES.iter().rev() {
			self
				.run_raw(&format!("DROP TABLE IF EXISTS {}", table.name))
				.await
				.map_err(|e| e.context(format!("reset {}", table.name)))?;
		}
		tracing::info!("dropped all managed tables");
		self.init().await
	}

	pub async fn close(&self) {
		self.pool.close().await;
		self.initialized.store(false, Ordering::Release);
		tracing::debug!("database pool closed");
	}

	pub fn is_initialized(&self) -> bool {
		self.initialized.load(Ordering::Acquire)
	}

	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}

	/// Names of all tables currently present in the store.
	#[tracing::instrument(skip(self))]
	pub async fn table_names(&self) -> Result<Vec<String>> {
		self
			.timed(async {
				let mut conn = self.deadline_connection().await?;
				let names = sqlx::query_scalar::<_, String>(
					"SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
				)
				.fetch_all(&mut *conn)
				.await;
				clear_deadline(&mut conn).await;
				names
			})
			.await
	}

	/// Run a read statement and return its rows.
	#[tracing::instrument(skip(self, stmt), fields(sql = %stmt.sql()))]
	pub async fn fetch_all(&self, stmt: &Statement) -> Result<Vec<Row>> {
		self.ensure_initialized()?;
		let rows = self
			.timed(async {
				let mut conn = self.deadline_connection().await?;
				let rows = bind_params(sqlx::query(stmt.sql()), stmt.params())
					.fetch_all(&mut *conn)
					.await;
				clear_deadline(&mut conn).await;
				rows
			})
			.await?;

		let rows = rows.iter().map(Row::from_sqlite).collect::<Result<Vec<_>>>()?;
		tracing::debug!(count = rows.len(), "statement returned rows");
		Ok(rows)
	}

	/// Run a mutating statement and report the affected row count.
	#[tracing::instrument(skip(self, stmt), fields(sql = %stmt.sql()))]
	pub async fn execute(&self, stmt: &Statement) -> Result<ExecOutcome> {
		self.ensure_initialized()?;
		let result = self
			.timed(async {
				let mut conn = self.deadline_connection().await?;
				let result = bind_params(sqlx::query(stmt.sql()), stmt.params())
					.execute(&mut *conn)
					.await;
				clear_deadline(&mut conn).await;
				result
			})
			.await?;

		let outcome = ExecOutcome {
			rows_affected: result.rows_affected(),
			last_insert_id: result.last_insert_rowid(),
		};
		tracing::debug!(rows_affected = outcome.rows_affected, "statement executed");
		Ok(outcome)
	}

	/// Row count of a managed table.
	#[tracing::instrument(skip(self))]
	pub async fn count(&self, table: &str) -> Result<i64> {
		if schema::table_schema(table).is_none() {
			return Err(DbError::InvalidArgument(format!("Unknown table '{table}'")));
		}
		let rows = self.fetch_all(&Statement::count(table)).await?;
		match rows.first() {
			Some(row) => row.get_i64("count"),
			None => Ok(0),
		}
	}

	fn ensure_initialized(&self) -> Result<()> {
		if self.is_initialized() {
			Ok(())
		} else {
			Err(DbError::Connection(
				"Database connection is not initialized; call init() first".to_string(),
			))
		}
	}

	async fn run_raw(&self, sql: &str) -> Result<()> {
		self
			.timed(async {
				let mut conn = self.deadline_connection().await?;
				let result = sqlx::query(sql).execute(&mut *conn).await;
				clear_deadline(&mut conn).await;
				result
			})
			.await
			.map(|_| ())
	}

	/// Check out a pooled connection whose statements are interrupted once
	/// the statement timeout has elapsed.
	///
	/// The handler runs on the driver's worker thread, so an abandoned
	/// statement still stops at the deadline and frees the connection.
	async fn deadline_connection(&self) -> std::result::Result<PoolConnection<Sqlite>, sqlx::Error> {
		let mut conn = self.pool.acquire().await?;
		let deadline = Instant::now() + self.statement_timeout;
		conn
			.lock_handle()
			.await?
			.set_progress_handler(DEADLINE_CHECK_OPS, move || Instant::now() < deadline);
		Ok(conn)
	}

	/// Await a driver future under the statement timeout.
	///
	/// Interrupted statements and futures still pending after the grace
	/// period both fail with `Timeout`.
	async fn timed<T, F>(&self, fut: F) -> Result<T>
	where
		F: Future<Output = std::result::Result<T, sqlx::Error>>,
	{
		match tokio::time::timeout(self.statement_timeout + TIMEOUT_GRACE, fut).await {
			Ok(Err(err)) if is_interrupt(&err) => Err(self.timed_out()),
			Ok(result) => result.map_err(DbError::from),
			Err(_) => Err(self.timed_out()),
		}
	}

	fn timed_out(&self) -> DbError {
		tracing::warn!(timeout = ?self.statement_timeout, "statement timed out");
		DbError::Timeout {
			elapsed: self.statement_timeout,
		}
	}
}

async fn clear_deadline(conn: &mut PoolConnection<Sqlite>) {
	if let Ok(mut handle) = conn.lock_handle().await {
		handle.remove_progress_handler();
	}
}

fn is_interrupt(err: &sqlx::Error) -> bool {
	matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(SQLITE_INTERRUPT))
}

fn bind_params<'q>(
	mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
	params: &'q [(String, Value)],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
	for (_, value) in params {
		query = match value {
			Value::Null => query.bind(None::<String>),
			Value::Integer(v) => query.bind(*v),
			Value::Bool(v) => query.bind(*v),
			Value::Real(v) => query.bind(*v),
			Value::Text(v) => query.bind(v.as_str()),
		};
	}
	query
}
