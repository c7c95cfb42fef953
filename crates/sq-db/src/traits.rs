//! Database trait definition

use crate::error::DbResult;
use crate::value::SqlValue;
use async_trait::async_trait;

/// Database abstraction trait for sqerge
///
/// Every method runs on the same underlying connection, so statements issued
/// between [`begin`](Database::begin) and [`commit`](Database::commit) /
/// [`rollback`](Database::rollback) all belong to that transaction.
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a single statement, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute a single statement with positional `?` parameters
    async fn execute_with(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize>;

    /// Execute multiple SQL statements (a whole migration file)
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a query with positional parameters and return every row
    async fn query_rows(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Vec<SqlValue>>>;

    /// Execute query returning row count
    async fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Return the first column of the first row as text, if any
    async fn query_one(&self, sql: &str) -> DbResult<Option<String>>;

    /// Check if a table or view exists
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Open a transaction on the connection
    async fn begin(&self) -> DbResult<()>;

    /// Commit the open transaction
    async fn commit(&self) -> DbResult<()>;

    /// Roll back the open transaction
    async fn rollback(&self) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
