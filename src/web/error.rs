use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::{
    auth::CryptError,
    error::log_error,
    model::{DatabaseError, ResourceType},
};

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("RegistrationUserConflict")]
    RegistrationUserConflict,

    #[error("RegistrationStudentTaken")]
    RegistrationStudentTaken,

    #[error("RegistrationPasswordMismatch")]
    RegistrationPasswordMismatch,
}

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("QuizAlreadySubmitted")]
    QuizAlreadySubmitted,

    #[error("QuizNotSubmitted")]
    QuizNotSubmitted,
}

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("AuthenticationCookieInvalid, cookie: {cookie}. Error: {error}")]
    AuthenticationCookieInvalid {
        cookie: String,
        error: jsonwebtoken::errors::Error,
    },

    #[error("AuthenticationRequired")]
    AuthenticationRequired,

    #[error("AuthenticationInvalidCredentials")]
    AuthenticationInvalidCredentials,

    #[error("AuthenticationRoleForbidden")]
    AuthenticationRoleForbidden,
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("ResourceNotFound: {resource_type}")]
    ResourceNotFound { resource_type: ResourceType },

    #[error("ResourceForbidden: {resource_type}")]
    ResourceForbidden { resource_type: ResourceType },

    #[error("ResourceFetchError: {resource_type}. Error: {error}")]
    ResourceFetchError {
        resource_type: ResourceType,
        error: DatabaseError,
    },

    #[error("ResourceBadRequest: {resource_type}. Details: {details}")]
    ResourceBadRequest {
        resource_type: ResourceType,
        details: String,
    },

    #[error("ResourceConflict: {resource_type}")]
    ResourceConflict { resource_type: ResourceType },
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("ServerCryptError: {0}")]
    ServerCryptError(#[from] crate::auth::CryptError),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    pub fn client_display(&self) -> String {
        String::from("Internal server error.")
    }
}

impl RegistrationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RegistrationUserConflict => StatusCode::CONFLICT,
            Self::RegistrationStudentTaken => StatusCode::CONFLICT,
            Self::RegistrationPasswordMismatch => StatusCode::BAD_REQUEST,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::RegistrationUserConflict => {
                String::from("Registration error, user already exists.")
            }
            Self::RegistrationStudentTaken => {
                String::from("Registration error, this student is already registered.")
            }
            Self::RegistrationPasswordMismatch => {
                String::from("Registration error, passwords do not match.")
            }
        }
    }
}

impl QuizError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::QuizAlreadySubmitted => StatusCode::CONFLICT,
            Self::QuizNotSubmitted => StatusCode::NOT_FOUND,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::QuizAlreadySubmitted => {
                String::from("Quiz error, the lesson tasks have already been submitted.")
            }
            Self::QuizNotSubmitted => {
                String::from("Quiz error, the lesson tasks have not been submitted yet.")
            }
        }
    }
}

impl AuthenticationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Self::AuthenticationInvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AuthenticationCookieInvalid { .. } => StatusCode::BAD_REQUEST,
            Self::AuthenticationRoleForbidden => StatusCode::FORBIDDEN,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::AuthenticationCookieInvalid { .. } => {
                String::from("Authentication error, cookie invalid.")
            }
            Self::AuthenticationRequired => String::from("Authentication required."),
            Self::AuthenticationInvalidCredentials => {
                String::from("Authentication error, user not found or password is invalid.")
            }
            Self::AuthenticationRoleForbidden => {
                String::from("Authentication error, your role does not allow this.")
            }
        }
    }
}

impl ResourceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ResourceForbidden { .. } => StatusCode::FORBIDDEN,
            Self::ResourceFetchError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ResourceBadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::ResourceConflict { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceNotFound { resource_type } => {
                format!("Resource error, {resource_type} not found.")
            }
            Self::ResourceForbidden { resource_type } => {
                format!("Resource error, {resource_type} forbidden.")
            }
            Self::ResourceFetchError { resource_type, .. } => {
                format!("Resource error, unable to fetch {resource_type}.")
            }
            Self::ResourceBadRequest { details, .. } => {
                format!("Resource error, bad request: {details}")
            }
            Self::ResourceConflict { resource_type } => {
                format!("Resource error, {resource_type} already exists.")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("ResourceError - {0}")]
    ResourceError(#[from] ResourceError),
    #[error("AuthenticationError - {0}")]
    AuthenticationError(#[from] AuthenticationError),
    #[error("RegistrationError - {0}")]
    RegistrationError(#[from] RegistrationError),
    #[error("ServerError - {0}")]
    ServerError(#[from] ServerError),
    #[error("QuizError - {0}")]
    QuizError(#[from] QuizError),
}

impl WebError {
    pub fn resource_not_found(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceNotFound {
            resource_type: r#type,
        })
    }

    pub fn resource_forbidden(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceForbidden {
            resource_type: r#type,
        })
    }

    pub fn resource_fetch_error(r#type: ResourceType, error: DatabaseError) -> Self {
        Self::ResourceError(ResourceError::ResourceFetchError {
            resource_type: r#type,
            error,
        })
    }

    pub fn resource_bad_request<S: Into<String>>(r#type: ResourceType, details: S) -> Self {
        Self::ResourceError(ResourceError::ResourceBadRequest {
            resource_type: r#type,
            details: details.into(),
        })
    }

    pub fn resource_conflict(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceConflict {
            resource_type: r#type,
        })
    }

    /// Maps a storage error onto the matching resource error.
    pub fn from_database(r#type: ResourceType, error: DatabaseError) -> Self {
        match error {
            DatabaseError::Forbidden => Self::resource_forbidden(r#type),
            DatabaseError::Conflict => Self::resource_conflict(r#type),
            DatabaseError::AlreadySubmitted => Self::QuizError(QuizError::QuizAlreadySubmitted),
            e => Self::resource_fetch_error(r#type, e),
        }
    }

    pub fn auth_cookie_invalid<S: Into<String>>(
        cookie: S,
        error: jsonwebtoken::errors::Error,
    ) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationCookieInvalid {
            cookie: cookie.into(),
            error,
        })
    }

    pub fn auth_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRequired)
    }

    pub fn auth_invalid_credentials() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationInvalidCredentials)
    }

    pub fn role_forbidden() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRoleForbidden)
    }

    pub fn registration_conflict() -> Self {
        Self::RegistrationError(RegistrationError::RegistrationUserConflict)
    }

    pub fn registration_student_taken() -> Self {
        Self::RegistrationError(RegistrationError::RegistrationStudentTaken)
    }

    pub fn registration_password_mismatch() -> Self {
        Self::RegistrationError(RegistrationError::RegistrationPasswordMismatch)
    }

    pub fn quiz_already_submitted() -> Self {
        Self::QuizError(QuizError::QuizAlreadySubmitted)
    }

    pub fn quiz_not_submitted() -> Self {
        Self::QuizError(QuizError::QuizNotSubmitted)
    }

    pub fn server_crypt_error(e: CryptError) -> Self {
        Self::ServerError(ServerError::ServerCryptError(e))
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            Self::ResourceError(e) => e.status_code(),
            Self::RegistrationError(e) => e.status_code(),
            Self::AuthenticationError(e) => e.status_code(),
            Self::ServerError(e) => e.status_code(),
            Self::QuizError(e) => e.status_code(),
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceError(e) => e.client_display(),
            Self::RegistrationError(e) => e.client_display(),
            Self::AuthenticationError(e) => e.client_display(),
            Self::ServerError(e) => e.client_display(),
            Self::QuizError(e) => e.client_display(),
        }
    }
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message for the client
    pub message: String,
    /// HTTP status code (stringified)
    pub status_code: String,
    /// Optional debug details (only in debug mode)
    pub details: Option<String>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        log_error(&self);

        let status_code = self.status_code();
        let display = self.client_display();

        let body = ErrorResponse {
            message: display,
            status_code: status_code.as_str().to_string(),
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        };

        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn database_errors_map_to_status_codes() {
        let cases = [
            (DatabaseError::Forbidden, StatusCode::FORBIDDEN),
            (DatabaseError::Conflict, StatusCode::CONFLICT),
            (DatabaseError::AlreadySubmitted, StatusCode::CONFLICT),
            (
                DatabaseError::SqlxError(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            let web = WebError::from_database(ResourceType::LessonTask, error);
            assert_eq!(web.status_code(), expected);
        }
    }

    #[test]
    fn quiz_errors() {
        assert_eq!(WebError::quiz_already_submitted().status_code(), StatusCode::CONFLICT);
        assert_eq!(WebError::quiz_not_submitted().status_code(), StatusCode::NOT_FOUND);
        assert!(
            WebError::quiz_already_submitted()
                .client_display()
                .contains("already been submitted")
        );
    }

    #[test]
    fn resource_messages_name_the_resource() {
        assert_eq!(
            WebError::resource_not_found(ResourceType::Lesson).client_display(),
            "Resource error, lesson not found."
        );
    }
}
