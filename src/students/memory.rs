//! In-memory [`StudentStore`] for tests. Rows go through the same
//! [`StudentRow`] mapping as the Postgres adapter.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use uuid::Uuid;

use super::{
    repo::{now_micros, StoreError, StudentStore, LIST_LIMIT},
    repo_types::{Student, StudentRow},
};
use crate::context::RequestContext;

#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<StudentRow>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps for `delay` before touching the rows.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Every call fails with a database error.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Number of storage calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn io(&self, ctx: &RequestContext) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay;
        ctx.run(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
        })
        .await?;
        if self.failing {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn rows(&self) -> std::sync::MutexGuard<'_, Vec<StudentRow>> {
        self.rows.lock().expect("memory store poisoned")
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn create(&self, ctx: &RequestContext, student: Student) -> Result<Student, StoreError> {
        self.io(ctx).await?;
        let row = StudentRow {
            id: Uuid::new_v4().to_string(),
            created_on: Some(now_micros()),
            updated_by: None,
            updated_on: None,
            ..StudentRow::from(&student)
        };
        self.rows().push(row.clone());
        Ok(row.into())
    }

    async fn get(&self, ctx: &RequestContext, id: &str) -> Result<Student, StoreError> {
        self.io(ctx).await?;
        self.rows()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .map(Student::from)
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self, ctx: &RequestContext) -> Result<Vec<Student>, StoreError> {
        self.io(ctx).await?;
        Ok(self
            .rows()
            .iter()
            .take(LIST_LIMIT as usize)
            .cloned()
            .map(Student::from)
            .collect())
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        id: &str,
        student: Student,
    ) -> Result<Student, StoreError> {
        self.io(ctx).await?;
        let changes = StudentRow::from(&student);
        let mut rows = self.rows();
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound)?;
        row.name = changes.name;
        row.email = changes.email;
        row.gender = changes.gender;
        row.address = changes.address;
        row.updated_by = changes.updated_by;
        row.updated_on = Some(now_micros());
        Ok(row.clone().into())
    }

    async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<(), StoreError> {
        self.io(ctx).await?;
        self.rows().retain(|r| r.id != id);
        Ok(())
    }

    async fn ping(&self, ctx: &RequestContext) -> Result<(), StoreError> {
        self.io(ctx).await
    }
}
