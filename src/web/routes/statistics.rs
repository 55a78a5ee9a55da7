use axum::{
    Json, Router, extract::State, http::StatusCode, middleware, response::IntoResponse,
    routing::get,
};

use crate::{
    history::{Timeline, build_timeline},
    model::{ResourceTyped, entity::GroupHistory},
    web::{AppState, RequestContext, WebError, WebResult, error::ErrorResponse, middlewares},
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/timeline", get(statistics_timeline_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/statistics/timeline",
    description = "Group of every student at every key date, forward-filled from the transfer history",
    responses(
        (status = 200, description = "Timeline built", body = Timeline),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 403, description = "Only teachers and admins can do this", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "statistics",
    security(
        ("cookie" = [])
    )
)]
pub async fn statistics_timeline_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.staff()?;
    let records = GroupHistory::all_records(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(GroupHistory::get_resource_type(), e))?;

    let defaults = state.config().history().default_key_dates();
    let timeline = build_timeline(&records, defaults);

    Ok((StatusCode::OK, Json(timeline)))
}
