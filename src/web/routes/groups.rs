use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    model::{
        Repository, ResourceTyped,
        entity::{Group, GroupWithCountRow, Student, StudentWithGroupRow},
    },
    web::{AppState, RequestContext, WebError, WebResult, error::ErrorResponse, middlewares},
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(groups_list_handler))
        .route("/{id}/students", get(groups_students_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/groups/",
    description = "List all groups ordered by number, with teacher and current student count",
    responses(
        (status = 200, description = "Groups collected", body = Vec<GroupWithCountRow>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "groups",
    security(
        ("cookie" = [])
    )
)]
pub async fn groups_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let groups = GroupWithCountRow::fetch_all(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Group::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(groups)))
}

#[utoipa::path(
    get,
    path = "/api/v1/groups/{group_id}/students",
    description = "Students whose current group is the given one",
    params(
        ("group_id" = Uuid, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Students collected", body = Vec<StudentWithGroupRow>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "groups",
    security(
        ("cookie" = [])
    )
)]
pub async fn groups_students_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let exists = Group::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Group::get_resource_type(), e))?
        .is_some();

    if !exists {
        return Err(WebError::resource_not_found(Group::get_resource_type()));
    }

    let students = StudentWithGroupRow::fetch_all(state.pool(), user, Some(id))
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(students)))
}
