use crate::web::{AppState, doc::ApiDoc};
use axum::Router;
use serde::Deserialize;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod assignments;
pub mod groups;
pub mod lessons;
pub mod statistics;
pub mod students;
pub mod user;

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    limit: i64,
    offset: i64,
}

pub fn build_app(state: AppState) -> Router {
    let docs = state.config().app().docs();
    let mut router = Router::new()
        .nest("/api/v1/account/", user::routes(state.clone()))
        .nest("/api/v1/groups/", groups::routes(state.clone()))
        .nest("/api/v1/students/", students::routes(state.clone()))
        .nest("/api/v1/lessons/", lessons::routes(state.clone()))
        .nest("/api/v1/statistics/", statistics::routes(state.clone()))
        .nest("/api/v1/assignments/", assignments::routes(state.clone()))
        .layer(CookieManagerLayer::default())
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    if docs {
        let openapi = ApiDoc::openapi();

        router = router.merge(SwaggerUi::new("/api/v1/docs").url("/api-doc/openapi.json", openapi));
    }

    router
}
