use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct RegisterBody {
    /// Unregistered student record the account is created for
    pub student_id: Uuid,
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SigninBody {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UnregisteredStudent {
    pub id: Uuid,
    pub full_name: String,
    pub class_name: Option<String>,
}
