use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub struct CookieAuthModifier;

impl Modify for CookieAuthModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "SID",
                    "JWT token for current user",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::routes::user::user_register_handler,
        crate::web::routes::user::user_signin_handler,
        crate::web::routes::user::user_unregistered_handler,
        crate::web::routes::user::user_verify_handler,
        crate::web::routes::user::user_list_handler,
        crate::web::routes::groups::groups_list_handler,
        crate::web::routes::groups::groups_students_handler,
        crate::web::routes::students::students_list_handler,
        crate::web::routes::students::students_history_handler,
        crate::web::routes::students::students_transfer_handler,
        crate::web::routes::lessons::lessons_get_handler,
        crate::web::routes::lessons::lessons_submit_handler,
        crate::web::routes::lessons::lessons_result_handler,
        crate::web::routes::statistics::statistics_timeline_handler,
        crate::web::routes::assignments::assignments_list_handler,
        crate::web::routes::assignments::assignments_create_handler,
        crate::web::routes::assignments::submissions_list_handler,
        crate::web::routes::assignments::submissions_create_handler,
        crate::web::routes::assignments::submissions_grade_handler,
    ),
    modifiers(&CookieAuthModifier),
)]
pub struct ApiDoc;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();

        for expected in [
            "/api/v1/account/register",
            "/api/v1/lessons/{date}/submit",
            "/api/v1/statistics/timeline",
            "/api/v1/assignments/submissions/{submission_id}/grade",
        ] {
            assert!(paths.iter().any(|p| p == expected), "missing {expected}");
        }
    }
}
