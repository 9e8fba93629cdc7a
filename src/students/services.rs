use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

use super::{
    error::StudentError,
    repo::{StoreError, StudentStore},
    repo_types::Student,
};
use crate::{auth::UserId, context::RequestContext};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate(student: &Student) -> Result<(), StudentError> {
    if !student.email.is_empty() && !is_valid_email(&student.email) {
        warn!(email = %student.email, "invalid email");
        return Err(StudentError::InvalidInput("Invalid email".into()));
    }
    Ok(())
}

/// Logs the storage cause and swaps it for `fallback`. Cancellation and
/// missing rows keep their own kinds.
fn opaque(op: &'static str, err: StoreError, fallback: StudentError) -> StudentError {
    match err {
        StoreError::Cancelled => {
            warn!(op, "storage call cancelled");
            StudentError::Cancelled
        }
        StoreError::NotFound => {
            warn!(op, "no student found");
            StudentError::NotFound
        }
        other => {
            error!(op, error = %other, "storage call failed");
            fallback
        }
    }
}

/// Orchestrates student operations over a [`StudentStore`].
#[derive(Clone)]
pub struct StudentService {
    store: Arc<dyn StudentStore>,
}

impl StudentService {
    pub fn new(store: Arc<dyn StudentStore>) -> Self {
        Self { store }
    }

    pub async fn create_student(
        &self,
        ctx: &RequestContext,
        identity: Option<&UserId>,
        mut student: Student,
    ) -> Result<Student, StudentError> {
        let user = identity.ok_or(StudentError::Unauthenticated)?;
        validate(&student)?;
        student.created_by = user.to_string();
        self.store
            .create(ctx, student)
            .await
            .map_err(|e| opaque("create", e, StudentError::CreateFailed))
    }

    pub async fn get_student(&self, ctx: &RequestContext, id: &str) -> Result<Student, StudentError> {
        self.store
            .get(ctx, id)
            .await
            .map_err(|e| opaque("get", e, StudentError::FetchFailed))
    }

    pub async fn update_student(
        &self,
        ctx: &RequestContext,
        identity: Option<&UserId>,
        id: &str,
        mut student: Student,
    ) -> Result<Student, StudentError> {
        let user = identity.ok_or(StudentError::Unauthenticated)?;
        validate(&student)?;
        student.updated_by = user.to_string();
        self.store
            .update(ctx, id, student)
            .await
            .map_err(|e| opaque("update", e, StudentError::UpdateFailed))
    }

    /// Unlike the other writes, the storage cause reaches the caller.
    pub async fn delete_student(&self, ctx: &RequestContext, id: &str) -> Result<(), StudentError> {
        self.store.delete(ctx, id).await.map_err(|e| match e {
            StoreError::Cancelled => StudentError::Cancelled,
            other => {
                error!(error = %other, %id, "an error occurred deleting the student");
                StudentError::DeleteFailed(other)
            }
        })
    }

    /// Storage failures yield an empty list; only cancellation is returned.
    pub async fn list_students(&self, ctx: &RequestContext) -> Result<Vec<Student>, StudentError> {
        match self.store.list(ctx).await {
            Ok(students) => Ok(students),
            Err(StoreError::Cancelled) => Err(StudentError::Cancelled),
            Err(e) => {
                error!(error = %e, "an error occurred listing students");
                Ok(Vec::new())
            }
        }
    }

    pub async fn ready_check(&self, ctx: &RequestContext) -> Result<(), StudentError> {
        info!("checking readiness");
        self.store.ping(ctx).await.map_err(|e| match e {
            StoreError::Cancelled => StudentError::Cancelled,
            other => {
                error!(error = %other, "storage ping failed");
                StudentError::Unavailable
            }
        })
    }
}
