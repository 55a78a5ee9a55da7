mod common;
use axum::http::StatusCode;
use schoolhub::model::entity::UserEntity;
use schoolhub::web::middlewares::AUTH_TOKEN;
use serde_json::{Value, json};
use tower_cookies::cookie::SameSite;

use crate::common::{
    Action, Flow, register_action, seed_admin, seed_student, seed_student_account, seed_teacher,
    setup_server, setup_test_db, signin_action, signin_admin_action,
};

#[tokio::test]
async fn route_register_test() {
    let pool = setup_test_db().await;
    let anna = seed_student(&pool, "Anna Ivanova").await;
    let mut server = setup_server(&pool).await;
    let anna_id = anna.id().to_string();

    Flow::new()
        .step(
            Action::new("unregistered", "GET", "/api/v1/account/unregistered").assert_body(
                |body| {
                    assert!(body.contains("Anna Ivanova"));
                },
            ),
        )
        // passwords must match
        .step(
            Action::new("register_mismatch", "POST", "/api/v1/account/register")
                .with_body(json!({
                    "student_id": anna_id,
                    "username": "anna",
                    "password": "one",
                    "password_confirm": "two",
                }))
                .with_save_cookies(false)
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            register_action(&anna_id, "anna", "secret")
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
                    assert_eq!(cookie.path(), Some("/"));
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    let ent: UserEntity = serde_json::from_str(body).expect("Invalid body format");
                    assert_eq!(ent.username(), "anna");
                    assert_eq!(ent.role(), "student");
                })
                .with_expect(StatusCode::OK),
        )
        .step(Action::new("verify", "GET", "/api/v1/account/verify").with_expect(StatusCode::OK))
        // the record is taken now
        .step(
            register_action(&anna_id, "anna2", "secret")
                .with_save_cookies(false)
                .with_expect(StatusCode::CONFLICT),
        )
        .step(
            Action::new("unregistered", "GET", "/api/v1/account/unregistered").assert_body(
                |body| {
                    assert!(!body.contains("Anna Ivanova"));
                },
            ),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_register_unknown_student_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            register_action(&uuid::Uuid::new_v4().to_string(), "ghost", "ghost")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_register_username_taken_test() {
    let pool = setup_test_db().await;
    seed_teacher(&pool, "taken").await;
    let boris = seed_student(&pool, "Boris Petrov").await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            register_action(&boris.id().to_string(), "taken", "secret")
                .with_expect(StatusCode::CONFLICT)
                .assert_body(|body| assert!(body.contains("user already exists"))),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_signin_test() {
    let pool = setup_test_db().await;
    seed_teacher(&pool, "SIGNINTEST").await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            signin_action("SIGNINTEST", "SIGNINTEST")
                .assert_cookie(AUTH_TOKEN, |cookie| {
                    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
                    assert_eq!(cookie.path(), Some("/"));
                    assert_eq!(cookie.http_only(), Some(true));
                })
                .assert_body(|body| {
                    let ent: UserEntity = serde_json::from_str(body).expect("Invalid JSON format");
                    assert_eq!(ent.username(), "SIGNINTEST");
                })
                .with_expect(StatusCode::OK)
                .with_clear_cookies(true),
        )
        // wrong credentials
        .step(
            signin_action("SIGNINTEST", "WRONGPASSWORD")
                .with_save_cookies(false)
                .with_clear_cookies(true)
                .assert_body(|body| {
                    assert!(body.contains("Authentication error"));
                })
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        // non-existing account
        .step(
            signin_action("nonexisting", "nvm")
                .with_expect(StatusCode::UNAUTHORIZED)
                .assert_body(|body| assert!(body.contains("Authentication error"))),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_verify_without_cookie_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            Action::new("verify", "GET", "/api/v1/account/verify")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_user_list_test() {
    let pool = setup_test_db().await;
    seed_admin(&pool).await;
    seed_student_account(&pool, "Foo Bar", "foobar", None).await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signin_action("foobar", "foobar"))
        // try to request without admin perms
        .step(
            Action::new("user_list", "GET", "/api/v1/account/page")
                .assert_body(|body| {
                    assert!(body.contains("error"));
                })
                .with_param("limit", "5")
                .with_param("offset", "0")
                .with_expect(StatusCode::FORBIDDEN),
        )
        // acquire admin account
        .step(signin_admin_action().with_clear_cookies(true))
        .step(
            Action::new("user_list", "GET", "/api/v1/account/page")
                .with_param("limit", "5")
                .with_param("offset", "0")
                .assert_body(|body| {
                    let page: Value = serde_json::from_str(body).unwrap();
                    assert_eq!(page["total"], 2);
                    assert_eq!(page["items"].as_array().unwrap().len(), 2);
                    // hashes never leave the server
                    assert!(!body.contains("argon2"));
                })
                .with_expect(StatusCode::OK),
        )
        .run(&mut server, pool)
        .await;
}
