//! Registration, login, and account self-service over HTTP

use reqwest::Client;

mod common;

#[tokio::test]
async fn test_health_check() {
    let server = common::TestServer::start().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/health", server.url))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_register_returns_account_and_token() {
    let server = common::TestServer::start().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/auth/register", server.url))
        .json(&serde_json::json!({
            "email": "Ada@Example.com",
            "password": "Passw0rd",
            "first_name": "Ada",
            "last_name": "Lovelace",
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert!(body["id"].is_number());
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["first_name"], "Ada");
    assert_eq!(body["last_name"], "Lovelace");

    let token = body["token"].as_str().unwrap();
    assert_eq!(token.len(), 40);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_register_rejects_duplicate_email_case_insensitively() {
    let server = common::TestServer::start().await;
    let client = Client::new();
    common::register_user(&server, &client, "User@x.com").await;

    let response = client
        .post(format!("{}/api/auth/register", server.url))
        .json(&serde_json::json!({
            "email": "user@x.com",
            "password": "Passw0rd",
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "A user with this email already exists.");
}

#[tokio::test]
async fn test_register_rejects_weak_passwords_per_rule() {
    let server = common::TestServer::start().await;
    let client = Client::new();

    let cases = [
        ("Sh0rt", "Password must be at least 8 characters long"),
        ("weakpass1", "Password must contain at least 1 uppercase letter"),
        ("WEAKPASS1", "Password must contain at least 1 lowercase letter"),
        ("Weakpassword", "Password must contain at least 1 digit"),
    ];

    for (password, message) in cases {
        let response = client
            .post(format!("{}/api/auth/register", server.url))
            .json(&serde_json::json!({
                "email": "ada@example.com",
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), 400, "password {password:?}");
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], message, "password {password:?}");
    }
}

#[tokio::test]
async fn test_register_rejects_invalid_email() {
    let server = common::TestServer::start().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/auth/register", server.url))
        .json(&serde_json::json!({
            "email": "not-an-email",
            "password": "Passw0rd",
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid email: must be a valid email address");
}

#[tokio::test]
async fn test_register_with_missing_fields_is_unprocessable() {
    let server = common::TestServer::start().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/auth/register", server.url))
        .json(&serde_json::json!({ "email": "ada@example.com" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn test_login_returns_the_same_token_every_time() {
    let server = common::TestServer::start().await;
    let client = Client::new();
    let registered = common::register_user(&server, &client, "ada@example.com").await;

    let mut tokens = Vec::new();
    for _ in 0..2 {
        let response = client
            .post(format!("{}/api/auth/login", server.url))
            .json(&serde_json::json!({
                "email": "ada@example.com",
                "password": "Passw0rd",
            }))
            .send()
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        tokens.push(body["token"].as_str().unwrap().to_string());
    }

    assert_eq!(tokens[0], registered);
    assert_eq!(tokens[1], registered);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let server = common::TestServer::start().await;
    let client = Client::new();
    common::register_user(&server, &client, "ada@example.com").await;

    let attempts = [
        ("ada@example.com", "WrongPass1"), // known email, wrong password
        ("nobody@example.com", "Passw0rd"), // unknown email
    ];

    let mut outcomes = Vec::new();
    for (email, password) in attempts {
        let response = client
            .post(format!("{}/api/auth/login", server.url))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body: serde_json::Value = response.json().await.unwrap();
        outcomes.push((status, body));
    }

    assert_eq!(outcomes[0].0, 400);
    assert_eq!(outcomes[0], outcomes[1]);
    assert_eq!(outcomes[0].1["error"], "Invalid email or password.");
}

#[tokio::test]
async fn test_protected_routes_require_a_valid_token() {
    let server = common::TestServer::start().await;
    let client = Client::new();

    // No Authorization header at all
    let response = client
        .get(format!("{}/api/notes", server.url))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Authentication credentials were not provided.");

    // Well-formed header, unknown token
    let response = client
        .get(format!("{}/api/notes", server.url))
        .header("Authorization", format!("Bearer {}", "0".repeat(40)))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid token.");
}

#[tokio::test]
async fn test_profile_get_and_partial_update() {
    let server = common::TestServer::start().await;
    let client = Client::new();
    let token = common::register_user(&server, &client, "ada@example.com").await;

    let response = client
        .get(format!("{}/api/auth/profile", server.url))
        .header("Authorization", format!("Bearer {token}"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let profile: serde_json::Value = response.json().await.unwrap();
    assert_eq!(profile["email"], "ada@example.com");
    assert_eq!(profile["first_name"], "Test");
    let joined = profile["date_joined"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(joined).is_ok());

    let response = client
        .put(format!("{}/api/auth/profile", server.url))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({ "first_name": "Ada" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let updated: serde_json::Value = response.json().await.unwrap();
    assert_eq!(updated["first_name"], "Ada");
    assert_eq!(updated["last_name"], "User");
    assert_eq!(updated["email"], "ada@example.com");
    assert_eq!(updated["date_joined"], profile["date_joined"]);
}

#[tokio::test]
async fn test_change_password_flow() {
    let server = common::TestServer::start().await;
    let client = Client::new();
    let token = common::register_user(&server, &client, "ada@example.com").await;

    // Wrong current password
    let response = client
        .post(format!("{}/api/auth/change-password", server.url))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({
            "old_password": "WrongPass1",
            "new_password": "NewPassw0rd",
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let response = client
        .post(format!("{}/api/auth/change-password", server.url))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({
            "old_password": "Passw0rd",
            "new_password": "NewPassw0rd",
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Password changed successfully.");

    // Old password no longer logs in, the new one does, token unchanged
    let response = client
        .post(format!("{}/api/auth/login", server.url))
        .json(&serde_json::json!({
            "email": "ada@example.com",
            "password": "Passw0rd",
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let response = client
        .post(format!("{}/api/auth/login", server.url))
        .json(&serde_json::json!({
            "email": "ada@example.com",
            "password": "NewPassw0rd",
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["token"].as_str().unwrap(), token);
}

#[tokio::test]
async fn test_delete_account_flow() {
    let server = common::TestServer::start().await;
    let client = Client::new();
    let token = common::register_user(&server, &client, "ada@example.com").await;

    let response = client
        .post(format!("{}/api/auth/delete-account", server.url))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({ "password": "WrongPass1" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let response = client
        .post(format!("{}/api/auth/delete-account", server.url))
        .header("Authorization", format!("Bearer {token}"))
        .json(&serde_json::json!({ "password": "Passw0rd" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Account deleted successfully.");

    // The token is dead and the email no longer logs in
    let response = client
        .get(format!("{}/api/auth/profile", server.url))
        .header("Authorization", format!("Bearer {token}"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);

    let response = client
        .post(format!("{}/api/auth/login", server.url))
        .json(&serde_json::json!({
            "email": "ada@example.com",
            "password": "Passw0rd",
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}
