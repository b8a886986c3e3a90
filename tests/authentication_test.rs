mod common;
use common::utils::{get_data, register_user, spawn_app};
use serde_json::{json, Value};

#[tokio::test]
async fn login_returns_token_for_valid_credentials() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let user = register_user(&app.address, "Marta").await;

    // Act
    let response = client
        .post(&format!("{}/login", &app.address))
        .json(&json!({
            "email": user.email,
            "password": user.password
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    let token = body["data"]["token"].as_str().expect("No token in response");
    assert_eq!(body["data"]["user"]["id"], user.user_id.to_string());

    let profile = get_data(&app.address, "/profile/user", token).await;
    assert_eq!(profile["name"], "Marta");
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_email_alike() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let user = register_user(&app.address, "Marta").await;

    for body in [
        json!({"email": user.email, "password": "wrong-password"}),
        json!({"email": "nobody@example.com", "password": user.password}),
    ] {
        // Act
        let response = client
            .post(&format!("{}/login", &app.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.");

        // Assert
        assert_eq!(401, response.status().as_u16());
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["code"], "invalid_credentials");
    }
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    // Arrange
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    for path in ["/profile/user", "/users", "/teams", "/match", "/history"] {
        // Act
        let missing = client
            .get(&format!("{}{}", &app.address, path))
            .send()
            .await
            .expect("Failed to execute request.");
        let garbage = client
            .get(&format!("{}{}", &app.address, path))
            .header("Authorization", "Bearer not-a-jwt")
            .send()
            .await
            .expect("Failed to execute request.");

        // Assert
        assert_eq!(401, missing.status().as_u16(), "{} without a token", path);
        assert_eq!(401, garbage.status().as_u16(), "{} with a bad token", path);
    }
}
