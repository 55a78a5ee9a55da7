use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use tower_cookies::{Cookie, Cookies, cookie::SameSite};
use uuid::Uuid;

use crate::{
    auth::{self, SESSION_TTL, SessionClaims, hash_password, verify_password},
    model::{
        DatabaseError, PaginatableRepository, Repository, ResourceTyped,
        entity::{ROLE_STUDENT, Student, UserEntity, UserEntityCreate},
    },
    web::{
        AppState, AuthenticatedUser, RequestContext, UserRole, WebError, WebResult,
        dto::account::{RegisterBody, SigninBody, UnregisteredStudent},
        error::ErrorResponse,
        middlewares::{self, AUTH_TOKEN},
        routes::PaginationQuery,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route("/page", get(user_list_handler))
        .route("/verify", get(user_verify_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ));

    Router::new()
        .route("/register", post(user_register_handler))
        .route("/signin", post(user_signin_handler))
        .route("/unregistered", get(user_unregistered_handler))
        .merge(protected)
        .with_state(state)
}

fn set_auth_cookie(state: &AppState, cookies: &Cookies, user_id: Uuid) -> WebResult<()> {
    let claims = SessionClaims::new(user_id, SESSION_TTL);
    let token = auth::issue_session(&claims, state.config().app().jwt())
        .map_err(|e| WebError::server_crypt_error(e.into()))?;

    let mut cookie = Cookie::new(AUTH_TOKEN, token);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);

    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/v1/account/register",
    request_body = RegisterBody,
    description = "Creates a student account for an unregistered student record",
    responses(
        (status = 200, description = "Account created successfully", body = UserEntity),
        (status = 400, description = "Passwords do not match", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 409, description = "Username taken or student already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account"
)]
pub async fn user_register_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<RegisterBody>,
) -> WebResult<impl IntoResponse> {
    if payload.password != payload.password_confirm {
        return Err(WebError::registration_password_mismatch());
    }

    let admin = AuthenticatedUser::admin();
    let student = Student::find_by_id(state.pool(), &admin, payload.student_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Student::get_resource_type()))?;

    if student.is_registered() {
        return Err(WebError::registration_student_taken());
    }

    let hash = hash_password(&payload.password).map_err(WebError::server_crypt_error)?;
    let data = UserEntityCreate {
        username: payload.username,
        password_hash: hash,
        role: ROLE_STUDENT.to_string(),
    };

    let mut tx = state
        .pool()
        .executor()
        .begin()
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e.into()))?;

    let created = UserEntity::insert(&mut tx, &data).await.map_err(|e| match e {
        DatabaseError::Conflict => WebError::registration_conflict(),
        e => WebError::resource_fetch_error(UserEntity::get_resource_type(), e),
    })?;

    let linked = Student::link_user(&mut tx, student.id(), created.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?;
    if !linked {
        // dropping the transaction rolls the account back
        return Err(WebError::registration_student_taken());
    }

    tx.commit()
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e.into()))?;
    tracing::info!("student {} registered as {}", student.id(), created.username());

    set_auth_cookie(&state, &cookies, created.id())?;
    Ok((StatusCode::OK, Json(created)))
}

#[utoipa::path(
    post,
    path = "/api/v1/account/signin",
    description = "Authorizes user in the system",
    request_body = SigninBody,
    responses(
        (status = 200, description = "User signed in", body = UserEntity),
        (status = 401, description = "Credentials invalid", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
)]
pub async fn user_signin_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<SigninBody>,
) -> WebResult<impl IntoResponse> {
    let admin = AuthenticatedUser::admin();
    let found = UserEntity::find_by_username(state.pool(), &admin, &payload.username)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::auth_invalid_credentials())?;

    let is_verified =
        verify_password(found.hash(), &payload.password).map_err(WebError::server_crypt_error)?;

    if !is_verified {
        return Err(WebError::auth_invalid_credentials());
    }

    set_auth_cookie(&state, &cookies, found.id())?;
    Ok((StatusCode::OK, Json(found)))
}

#[utoipa::path(
    get,
    path = "/api/v1/account/unregistered",
    description = "Student records that can still be registered",
    responses(
        (status = 200, description = "Unregistered students", body = Vec<UnregisteredStudent>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
)]
pub async fn user_unregistered_handler(State(state): State<AppState>) -> WebResult<impl IntoResponse> {
    let students = Student::unregistered(state.pool(), &AuthenticatedUser::admin())
        .await
        .map_err(|e| WebError::resource_fetch_error(Student::get_resource_type(), e))?
        .into_iter()
        .map(|s| UnregisteredStudent {
            id: s.id(),
            full_name: s.full_name().to_string(),
            class_name: s.class_name().map(str::to_string),
        })
        .collect::<Vec<_>>();

    Ok((StatusCode::OK, Json(students)))
}

#[utoipa::path(
    get,
    path = "/api/v1/account/verify",
    description = "Checks whether the auth cookie belongs to a known account",
    responses(
        (status = 200, description = "Signed in"),
        (status = 401, description = "Not signed in"),
    ),
    tag = "account",
    security(
        ("cookie" = [])
    )
)]
pub async fn user_verify_handler(ctx: RequestContext) -> WebResult<impl IntoResponse> {
    let user = ctx.maybe_user();

    if user.is_none() {
        return Ok(StatusCode::UNAUTHORIZED);
    }

    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/api/v1/account/page",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Returns requested page", body = crate::model::Page<UserEntity>),
        (status = 401, description = "You're not authorized", body = ErrorResponse),
        (status = 403, description = "You're not an admin to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "account",
    security(
        ("cookie" = [])
    )
)]
pub async fn user_list_handler(
    ctx: RequestContext,
    Query(page): Query<PaginationQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    if user.user_role() != UserRole::Admin {
        return Err(WebError::resource_forbidden(UserEntity::get_resource_type()));
    }

    let users = UserEntity::page(state.pool(), user, page.limit, page.offset)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(users)))
}
