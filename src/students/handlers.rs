use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use super::{
    dto::{MessageResponse, StudentRequest},
    error::StudentError,
    repo_types::Student,
};
use crate::{
    auth::{require_auth, UserId},
    context::RequestContext,
    state::AppState,
};

/// Reads are open; create, update and delete go through the auth stage.
pub fn routes(state: &AppState) -> Router<AppState> {
    let auth = middleware::from_fn_with_state(state.clone(), require_auth);
    Router::new()
        .route(
            "/students",
            get(list_students).merge(post(create_student).route_layer(auth.clone())),
        )
        .route(
            "/students/:id",
            get(get_student).merge(put(update_student).delete(delete_student).route_layer(auth)),
        )
        .route("/ready", get(ready))
}

/// Keeps body rejections in the `{"error": ...}` shape.
fn request_body(
    payload: Result<Json<StudentRequest>, JsonRejection>,
) -> Result<Student, StudentError> {
    let Json(body) = payload.map_err(|rejection| {
        warn!(error = %rejection, "rejected request body");
        StudentError::InvalidInput(rejection.body_text())
    })?;
    Ok(body.into())
}

fn caller(identity: &Option<Extension<UserId>>) -> Option<&UserId> {
    identity.as_ref().map(|Extension(user)| user)
}

#[instrument(skip(state, ctx))]
pub async fn list_students(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<Student>>, StudentError> {
    let students = state.students.list_students(&ctx).await?;
    Ok(Json(students))
}

#[instrument(skip(state, ctx))]
pub async fn get_student(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<Student>, StudentError> {
    let student = state.students.get_student(&ctx, &id).await?;
    Ok(Json(student))
}

#[instrument(skip(state, ctx, payload))]
pub async fn create_student(
    State(state): State<AppState>,
    ctx: RequestContext,
    identity: Option<Extension<UserId>>,
    payload: Result<Json<StudentRequest>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<Student>), StudentError> {
    let student = request_body(payload)?;
    let student = state
        .students
        .create_student(&ctx, caller(&identity), student)
        .await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/v1/students/{}", student.id)) {
        headers.insert(LOCATION, location);
    }
    info!(id = %student.id, created_by = %student.created_by, "student created");
    Ok((StatusCode::CREATED, headers, Json(student)))
}

#[instrument(skip(state, ctx, payload))]
pub async fn update_student(
    State(state): State<AppState>,
    ctx: RequestContext,
    identity: Option<Extension<UserId>>,
    Path(id): Path<String>,
    payload: Result<Json<StudentRequest>, JsonRejection>,
) -> Result<Json<Student>, StudentError> {
    let student = request_body(payload)?;
    let student = state
        .students
        .update_student(&ctx, caller(&identity), &id, student)
        .await?;
    info!(id = %student.id, updated_by = %student.updated_by, "student updated");
    Ok(Json(student))
}

#[instrument(skip(state, ctx))]
pub async fn delete_student(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, StudentError> {
    state.students.delete_student(&ctx, &id).await?;
    info!(%id, "student deleted");
    Ok(Json(MessageResponse {
        message: format!("student {id} deleted"),
    }))
}

#[instrument(skip(state, ctx))]
pub async fn ready(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Value>, StudentError> {
    state.students.ready_check(&ctx).await?;
    Ok(Json(json!({ "status": "ready" })))
}
