use crate::helpers::TestApp;

#[actix_web::test]
async fn get_profile_returns_the_caller_without_password() {
    let app = TestApp::spawn_app().await;
    let user = app.register_user("customer").await;

    let response = app.get("/api/profile", Some(&user.token)).await;
    assert_eq!(200, response.status().as_u16());

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["id"].as_i64().unwrap() as i32, user.id);
    assert_eq!(json["email"], user.email.as_str());
    assert!(json.get("password").is_none());
}

#[actix_web::test]
async fn update_profile_changes_name_and_address() {
    let app = TestApp::spawn_app().await;
    let user = app.register_user("customer").await;

    let response = app
        .put_json(
            "/api/profile",
            Some(&user.token),
            &serde_json::json!({
                "name": "Grace",
                "address": "7 New Street",
            }),
        )
        .await;

    assert_eq!(200, response.status().as_u16());

    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["name"], "Grace");
    assert_eq!(json["address"], "7 New Street");
    assert_eq!(json["email"], user.email.as_str());
}

#[actix_web::test]
async fn update_profile_to_a_taken_email_returns_400() {
    let app = TestApp::spawn_app().await;
    let first = app.register_user("customer").await;
    let second = app.register_user("customer").await;

    let response = app
        .put_json(
            "/api/profile",
            Some(&second.token),
            &serde_json::json!({ "email": first.email }),
        )
        .await;

    assert_eq!(400, response.status().as_u16());
}

#[actix_web::test]
async fn change_password_with_wrong_current_password_returns_401() {
    let app = TestApp::spawn_app().await;
    let user = app.register_user("customer").await;

    let response = app
        .put_json(
            "/api/profile/password",
            Some(&user.token),
            &serde_json::json!({
                "currentPassword": "not-the-password",
                "newPassword": "password456",
            }),
        )
        .await;

    assert_eq!(401, response.status().as_u16());
}

#[actix_web::test]
async fn change_password_rotates_the_stored_credential() {
    let app = TestApp::spawn_app().await;
    let user = app.register_user("customer").await;

    let response = app
        .put_json(
            "/api/profile/password",
            Some(&user.token),
            &serde_json::json!({
                "currentPassword": "password123",
                "newPassword": "password456",
            }),
        )
        .await;
    assert_eq!(200, response.status().as_u16());

    let old_login = app
        .post_json(
            "/api/auth/login",
            None,
            &serde_json::json!({ "email": user.email, "password": "password123" }),
        )
        .await;
    assert_eq!(401, old_login.status().as_u16());

    let new_login = app
        .post_json(
            "/api/auth/login",
            None,
            &serde_json::json!({ "email": user.email, "password": "password456" }),
        )
        .await;
    assert_eq!(200, new_login.status().as_u16());
}
