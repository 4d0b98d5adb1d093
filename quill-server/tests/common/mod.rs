use std::net::SocketAddr;
use tokio::net::TcpListener;

pub struct TestServer {
    pub url: String,
    #[allow(dead_code)]
    pub addr: SocketAddr,
}

impl TestServer {
    pub async fn start() -> Self {
        let config = quill_server::config::Config {
            host: "127.0.0.1".into(),
            port: 0, // OS assigns port
            database: quill_server::config::DatabaseConfig {
                path: ":memory:".into(),
            },
            // Cheap argon2 parameters keep the suite fast
            password: quill_server::config::PasswordConfig {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
        };

        let state = quill_server::state::AppState::new(&config).await.unwrap();
        let app = quill_server::routes::router(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give server a moment to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            url: format!("http://{addr}"),
            addr,
        }
    }
}

/// Registers a user and hands back their token
#[allow(dead_code)]
pub async fn register_user(server: &TestServer, client: &reqwest::Client, email: &str) -> String {
    let response = client
        .post(format!("{}/api/auth/register", server.url))
        .json(&serde_json::json!({
            "email": email,
            "password": "Passw0rd",
            "first_name": "Test",
            "last_name": "User",
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    body["token"].as_str().unwrap().to_string()
}
