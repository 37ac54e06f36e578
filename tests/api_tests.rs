// tests/api_tests.rs

use quill_cms::{config::Config, models::user::User, routes, state::AppState, store, utils};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345") and the pool so
/// tests can seed fixtures directly in the blob store.
async fn spawn_app() -> (String, SqlitePool) {
    // A single connection keeps every query on the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory blob store");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        admin_username: None,
        admin_password: None,
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

/// Seeds an admin user directly in the store and returns a bearer token.
async fn admin_token(address: &str, pool: &SqlitePool) -> String {
    let admin = User {
        username: "admin".to_string(),
        password: utils::hash::hash_password("admin_password").unwrap(),
        role: "admin".to_string(),
        created_at: chrono::Utc::now(),
    };
    store::insert(pool, "user:admin", &serde_json::to_vec(&admin).unwrap())
        .await
        .unwrap();

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "username": "admin",
            "password": "admin_password"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_works() {
    // Arrange
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let unique_name = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);

    // Act
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": unique_name,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["username"].as_str().unwrap(), unique_name);
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn register_fails_validation() {
    // Arrange
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    // Act: username too short
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": "ab",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let payload = serde_json::json!({
        "username": "duplicate_user",
        "password": "password123"
    });

    let first = client
        .post(format!("{}/api/auth/register", address))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 201);

    let second = client
        .post(format!("{}/api/auth/register", address))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 409);
}

#[tokio::test]
async fn login_rejects_bad_password() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": "login_user",
            "password": "correct_password"
        }))
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "username": "login_user",
            "password": "wrong_password"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn page_crud_requires_admin_token() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/admin/pages", address))
        .json(&serde_json::json!({
            "slug": "welcome",
            "title": "Welcome",
            "body": "<p>hello</p>"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn non_admin_token_is_forbidden() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": "plain_user",
            "password": "password123"
        }))
        .send()
        .await
        .unwrap();

    let login: serde_json::Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "username": "plain_user",
            "password": "password123"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = login["token"].as_str().unwrap();

    let response = client
        .post(format!("{}/api/admin/pages", address))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "slug": "welcome",
            "title": "Welcome",
            "body": "<p>hello</p>"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn stored_page_body_is_sanitized() {
    // Arrange
    let (address, pool) = spawn_app().await;
    let token = admin_token(&address, &pool).await;
    let client = reqwest::Client::new();

    // Act: the body carries a script tag, an event handler, and a
    // javascript: link; the title carries raw markup.
    let response = client
        .post(format!("{}/api/admin/pages", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "slug": "attack",
            "title": "<script>steal()</script>",
            "summary": "line1\nline2",
            "body": "<p>ok</p><script>alert(1)</script>\
                     <img src=\"x\" onerror=\"alert(2)\">\
                     <a href=\"javascript:alert(3)\">click</a>"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    // Assert: read it back through the public API
    let page: serde_json::Value = client
        .get(format!("{}/api/pages/attack", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let body = page["body"].as_str().unwrap();
    assert!(body.contains("<p>ok</p>"));
    assert!(!body.contains("<script"));
    assert!(!body.to_ascii_lowercase().contains("onerror"));
    assert!(!body.to_ascii_lowercase().contains("javascript:"));
    assert!(body.contains("<a>click</a>"));

    assert_eq!(
        page["title"].as_str().unwrap(),
        "&lt;script&gt;steal()&lt;/script&gt;"
    );
    assert_eq!(page["summary"].as_str().unwrap(), "line1<br>line2");
    assert_eq!(page["author"].as_str().unwrap(), "admin");
}

#[tokio::test]
async fn page_update_and_delete_roundtrip() {
    let (address, pool) = spawn_app().await;
    let token = admin_token(&address, &pool).await;
    let client = reqwest::Client::new();

    let created = client
        .post(format!("{}/api/admin/pages", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "slug": "about",
            "title": "About",
            "body": "<p>first</p>"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);

    let updated = client
        .put(format!("{}/api/admin/pages/about", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "title": "About us",
            "body": "<p>second</p><div onclick=\"x()\">text</div>"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(updated.status().as_u16(), 200);
    let page: serde_json::Value = updated.json().await.unwrap();
    assert_eq!(page["body"].as_str().unwrap(), "<p>second</p><div>text</div>");

    let listed: serde_json::Value = client
        .get(format!("{}/api/pages", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let deleted = client
        .delete(format!("{}/api/admin/pages/about", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    let missing = client
        .get(format!("{}/api/pages/about", address))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn invalid_slug_is_rejected() {
    let (address, pool) = spawn_app().await;
    let token = admin_token(&address, &pool).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/admin/pages", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "slug": "../escape",
            "title": "Escape",
            "body": "<p>x</p>"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}
