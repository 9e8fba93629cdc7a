use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::repo_types::{Student, StudentRow};
use crate::context::{Cancelled, RequestContext};

/// Maximum number of rows returned by [`StudentStore::list`].
pub const LIST_LIMIT: i64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no student found")]
    NotFound,
    #[error("storage call cancelled")]
    Cancelled,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<Cancelled> for StoreError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

/// Storage operations the student service relies on. Implementations must
/// return [`StoreError::Cancelled`] promptly once `ctx` is done.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Assigns the id and `created_on`; `updated_*` start out empty.
    async fn create(&self, ctx: &RequestContext, student: Student) -> Result<Student, StoreError>;
    async fn get(&self, ctx: &RequestContext, id: &str) -> Result<Student, StoreError>;
    /// At most [`LIST_LIMIT`] rows, in storage order.
    async fn list(&self, ctx: &RequestContext) -> Result<Vec<Student>, StoreError>;
    /// Stamps `updated_on`; `created_*` are left as stored.
    async fn update(
        &self,
        ctx: &RequestContext,
        id: &str,
        student: Student,
    ) -> Result<Student, StoreError>;
    /// Deleting a missing id is not an error.
    async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<(), StoreError>;
    async fn ping(&self, ctx: &RequestContext) -> Result<(), StoreError>;
}

/// Current time at the microsecond precision `TIMESTAMPTZ` keeps, so values
/// returned from a write match what later reads give back.
pub(crate) fn now_micros() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(now.nanosecond() / 1_000 * 1_000)
        .unwrap_or(now)
}

fn row_lookup(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        other => StoreError::Database(other),
    }
}

/// Postgres-backed [`StudentStore`].
#[derive(Clone)]
pub struct PgStudentStore {
    db: PgPool,
}

impl PgStudentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn create(&self, ctx: &RequestContext, student: Student) -> Result<Student, StoreError> {
        let row = StudentRow {
            id: Uuid::new_v4().to_string(),
            created_on: Some(now_micros()),
            updated_by: None,
            updated_on: None,
            ..StudentRow::from(&student)
        };

        ctx.run(
            sqlx::query(
                r#"
                INSERT INTO student
                    (id, name, email, gender, address, created_by, created_on, updated_by, updated_on)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(&row.id)
            .bind(&row.name)
            .bind(&row.email)
            .bind(&row.gender)
            .bind(&row.address)
            .bind(&row.created_by)
            .bind(row.created_on)
            .bind(&row.updated_by)
            .bind(row.updated_on)
            .execute(&self.db),
        )
        .await??;

        debug!(id = %row.id, "student inserted");
        Ok(row.into())
    }

    async fn get(&self, ctx: &RequestContext, id: &str) -> Result<Student, StoreError> {
        let row = ctx
            .run(
                sqlx::query_as::<_, StudentRow>(
                    r#"
                    SELECT id, name, email, gender, address, created_by, created_on, updated_by, updated_on
                    FROM student
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .fetch_one(&self.db),
            )
            .await?
            .map_err(row_lookup)?;
        Ok(row.into())
    }

    async fn list(&self, ctx: &RequestContext) -> Result<Vec<Student>, StoreError> {
        let rows = ctx
            .run(
                sqlx::query_as::<_, StudentRow>(
                    r#"
                    SELECT id, name, email, gender, address, created_by, created_on, updated_by, updated_on
                    FROM student
                    LIMIT $1
                    "#,
                )
                .bind(LIST_LIMIT)
                .fetch_all(&self.db),
            )
            .await??;
        Ok(rows.into_iter().map(Student::from).collect())
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        id: &str,
        student: Student,
    ) -> Result<Student, StoreError> {
        let changes = StudentRow {
            updated_on: Some(now_micros()),
            ..StudentRow::from(&student)
        };

        let row = ctx
            .run(
                sqlx::query_as::<_, StudentRow>(
                    r#"
                    UPDATE student
                    SET name = $2, email = $3, gender = $4, address = $5,
                        updated_by = $6, updated_on = $7
                    WHERE id = $1
                    RETURNING id, name, email, gender, address, created_by, created_on, updated_by, updated_on
                    "#,
                )
                .bind(id)
                .bind(&changes.name)
                .bind(&changes.email)
                .bind(&changes.gender)
                .bind(&changes.address)
                .bind(&changes.updated_by)
                .bind(changes.updated_on)
                .fetch_one(&self.db),
            )
            .await?
            .map_err(row_lookup)?;

        debug!(id = %row.id, "student updated");
        Ok(row.into())
    }

    async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<(), StoreError> {
        let res = ctx
            .run(
                sqlx::query("DELETE FROM student WHERE id = $1")
                    .bind(id)
                    .execute(&self.db),
            )
            .await??;
        debug!(%id, rows = res.rows_affected(), "student delete issued");
        Ok(())
    }

    async fn ping(&self, ctx: &RequestContext) -> Result<(), StoreError> {
        ctx.run(sqlx::query("SELECT 1").execute(&self.db)).await??;
        Ok(())
    }
}
