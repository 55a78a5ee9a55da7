use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    model::{
        Repository, ResourceTyped, check_access,
        entity::{Group, GroupHistory, GroupHistoryCreate, Student, StudentWithGroupRow},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::students::{HistoryQuery, StudentHistoryResponse, StudentsQuery, TransferBody},
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(students_list_handler))
        .route("/{id}/history", get(students_history_handler))
        .route("/{id}/transfer", post(students_transfer_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/students/",
    description = "List students with their current group, optionally filtered by group",
    params(StudentsQuery),
    responses(
        (status = 200, description = "Students collected", body = Vec<StudentWithGroupRow>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only teachers and admins can do this", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "students",
    security(
        ("cookie" = [])
    )
)]
pub async fn students_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Query(query): Query<StudentsQuery>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.staff()?;
    let students = StudentWithGroupRow::fetch_all(state.pool(), user, query.group_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(students)))
}

#[utoipa::path(
    get,
    path = "/api/v1/students/{student_id}/history",
    description = "Group history of a student, oldest first. Students can only see their own",
    params(
        ("student_id" = Uuid, Path, description = "ID of the student"),
        HistoryQuery,
    ),
    responses(
        (status = 200, description = "History collected", body = StudentHistoryResponse),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Not your history", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "students",
    security(
        ("cookie" = [])
    )
)]
pub async fn students_history_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let student = Student::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Student::get_resource_type()))?;

    // staff may read any history, students only their own
    if !user.is_staff() {
        check_access(state.pool(), user, &student)
            .await
            .map_err(|e| WebError::from_database(Student::get_resource_type(), e))?;
    }

    let entries = GroupHistory::for_student(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(GroupHistory::get_resource_type(), e))?;

    let current_group = match (query.on, student.current_group_id()) {
        (Some(on), _) => Student::group_at(state.pool(), user, id, on).await,
        (None, Some(group_id)) => Group::find_by_id(state.pool(), user, group_id).await,
        (None, None) => Ok(None),
    }
    .map_err(|e| WebError::resource_fetch_error(Group::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(StudentHistoryResponse {
            student,
            current_group,
            entries,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/students/{student_id}/transfer",
    description = "Appends a group transfer to the student's history",
    request_body = TransferBody,
    params(
        ("student_id" = Uuid, Path, description = "ID of the student")
    ),
    responses(
        (status = 200, description = "Transfer recorded", body = GroupHistory),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only teachers and admins can do this", body = ErrorResponse),
        (status = 404, description = "Student or group not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "students",
    security(
        ("cookie" = [])
    )
)]
pub async fn students_transfer_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<TransferBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.staff()?;

    let student_exists = Student::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?
        .is_some();
    if !student_exists {
        return Err(WebError::resource_not_found(Student::get_resource_type()));
    }

    let group = Group::find_by_id(state.pool(), user, body.group_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Group::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Group::get_resource_type()))?;

    let today = Utc::now().date_naive();
    let data = GroupHistoryCreate {
        student_id: id,
        group_id: group.id(),
        transfer_date: body.transfer_date.unwrap_or(today),
        reason: body.reason.unwrap_or_default(),
    };

    let entry = GroupHistory::record_transfer(state.pool(), user, data)
        .await
        .map_err(|e| WebError::resource_fetch_error(GroupHistory::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(entry)))
}
