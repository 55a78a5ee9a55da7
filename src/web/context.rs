//! Request context, e.g. user id, its role, etc.
//!

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::web::{WebResult, error::WebError};

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    user_id: uuid::Uuid,
    user_role: UserRole,
}

impl AuthenticatedUser {
    pub fn new(user_id: uuid::Uuid, user_role: UserRole) -> Self {
        Self { user_id, user_role }
    }

    pub fn admin() -> Self {
        Self {
            user_role: UserRole::Admin,
            user_id: uuid::Uuid::max(), // admin ID
        }
    }

    pub fn user_id(&self) -> uuid::Uuid {
        self.user_id
    }

    pub fn user_role(&self) -> UserRole {
        self.user_role
    }

    pub fn student_id(&self) -> Option<uuid::Uuid> {
        match self.user_role {
            UserRole::Student { student_id } => Some(student_id),
            _ => None,
        }
    }

    pub fn teacher_id(&self) -> Option<uuid::Uuid> {
        match self.user_role {
            UserRole::Teacher { teacher_id } => Some(teacher_id),
            _ => None,
        }
    }

    /// Admins and teachers.
    pub fn is_staff(&self) -> bool {
        !matches!(self.user_role, UserRole::Student { .. })
    }
}

/// Role resolved once per request together with the linked profile id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    Teacher { teacher_id: uuid::Uuid },
    Student { student_id: uuid::Uuid },
}

impl UserRole {
    /// Builds a role from the stored role name and the profile rows linked to
    /// the account. Non-admin accounts without a matching profile get `None`.
    pub fn from_parts(
        role: &str,
        teacher_id: Option<uuid::Uuid>,
        student_id: Option<uuid::Uuid>,
    ) -> Option<Self> {
        match role {
            "admin" => Some(Self::Admin),
            "teacher" => teacher_id.map(|teacher_id| Self::Teacher { teacher_id }),
            _ => student_id.map(|student_id| Self::Student { student_id }),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Teacher { .. } => write!(f, "teacher"),
            Self::Student { .. } => write!(f, "student"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    maybe_user: Option<AuthenticatedUser>,
}

impl RequestContext {
    pub fn new(maybe_user: Option<AuthenticatedUser>) -> Self {
        Self { maybe_user }
    }

    pub fn admin() -> Self {
        Self::new(Some(AuthenticatedUser::admin()))
    }

    pub fn maybe_user(&self) -> Option<&AuthenticatedUser> {
        self.maybe_user.as_ref()
    }

    pub fn user(&self) -> WebResult<&AuthenticatedUser> {
        self.maybe_user.as_ref().ok_or(WebError::auth_required())
    }

    pub fn staff(&self) -> WebResult<&AuthenticatedUser> {
        let user = self.user()?;
        if !user.is_staff() {
            return Err(WebError::role_forbidden());
        }
        Ok(user)
    }

    pub fn student(&self) -> WebResult<(&AuthenticatedUser, uuid::Uuid)> {
        let user = self.user()?;
        let student_id = user.student_id().ok_or(WebError::role_forbidden())?;
        Ok((user, student_id))
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts.extensions.get::<RequestContext>();
        if let Some(ctx) = ctx {
            Ok(ctx.clone())
        } else {
            Ok(RequestContext::new(None))
        }
    }
}
