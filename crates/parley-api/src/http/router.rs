//! Axum router configuration with middleware.
//!
//! Middleware: CORS, request tracing.
//!
//! When `server.web_dir` points at an existing directory, a built web client
//! is served from it. API routes and `/health` take priority; unknown paths
//! fall through to the client's `index.html`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let web_dir = state.config.server.web_dir.clone();

    let mut router = Router::new()
        // Identity and sessions
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/logout-all", post(handlers::auth::logout_all))
        .route("/me", get(handlers::auth::me))
        .route("/upgrade", post(handlers::auth::upgrade))
        // Chat and memory
        .route("/chat", post(handlers::chat::chat))
        .route("/clear-memory", post(handlers::chat::clear_memory))
        .route("/memory", get(handlers::chat::get_memory))
        // Usage
        .route("/usage", get(handlers::usage::get_usage))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if let Some(web_dir) = web_dir.filter(|dir| std::path::Path::new(dir).is_dir()) {
        let index_path = format!("{web_dir}/index.html");
        let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(index_path));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %web_dir, "Static web client serving enabled");
    }

    router
}

/// GET /health - Liveness probe with a database ping (no auth required).
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let database = sqlx::query("SELECT 1")
        .execute(&state.db_pool.reader)
        .await
        .is_ok();

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(serde_json::json!({
            "status": if database { "ok" } else { "degraded" },
            "database": database,
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use parley_infra::llm::completions::CompletionsGenerator;
    use parley_infra::sqlite::pool::DatabasePool;
    use parley_types::config::ParleyConfig;
    use serde_json::{Value, json};

    use super::*;

    #[derive(Clone)]
    struct StubGenerator {
        prompts: Arc<Mutex<Vec<String>>>,
        delay: Duration,
    }

    async fn stub_completions(
        State(stub): State<StubGenerator>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
        stub.prompts.lock().unwrap().push(prompt);
        tokio::time::sleep(stub.delay).await;
        Json(json!({ "choices": [{ "text": "Hi there!" }] }))
    }

    /// Serve a fake completions endpoint; returns its base URL and the prompts it saw.
    async fn spawn_stub(delay: Duration) -> (String, Arc<Mutex<Vec<String>>>) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/completions", post(stub_completions))
            .with_state(StubGenerator {
                prompts: Arc::clone(&prompts),
                delay,
            });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), prompts)
    }

    /// Start the API over a fresh migrated database; returns its base URL.
    async fn spawn_app(generator_url: &str, timeout_secs: u64) -> String {
        let dir = tempfile::tempdir().unwrap();
        let data_dir: PathBuf = dir.path().to_path_buf();
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);

        let mut config = ParleyConfig::default();
        config.generation.base_url = generator_url.to_string();
        config.generation.timeout_secs = timeout_secs;

        let url = format!("sqlite://{}?mode=rwc", data_dir.join("parley.db").display());
        let pool = DatabasePool::connect(&url, &config.database).await.unwrap();
        pool.migrate().await.unwrap();
        let generator = CompletionsGenerator::new(
            config.generation.base_url.clone(),
            config.generation.model.clone(),
            None,
            Duration::from_secs(timeout_secs),
        )
        .unwrap();

        let state = AppState::build(pool, config, generator).unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn post_json(
        client: &reqwest::Client,
        url: String,
        token: Option<&str>,
        body: Value,
    ) -> (u16, Value) {
        let mut request = client.post(url).json(&body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    async fn get_json(client: &reqwest::Client, url: String, token: &str) -> (u16, Value) {
        let response = client.get(url).bearer_auth(token).send().await.unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    async fn register_and_login(client: &reqwest::Client, base: &str) -> String {
        let (status, _) = post_json(
            client,
            format!("{base}/register"),
            None,
            json!({"name": "Ana", "email": "ana@x.com", "password": "secret"}),
        )
        .await;
        assert_eq!(status, 201);
        let (status, body) = post_json(
            client,
            format!("{base}/login"),
            None,
            json!({"email": "ana@x.com", "password": "secret"}),
        )
        .await;
        assert_eq!(status, 200);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_register_login_logout_flow() {
        let (stub, _) = spawn_stub(Duration::ZERO).await;
        let base = spawn_app(&stub, 30).await;
        let client = reqwest::Client::new();

        let register = json!({"name": "Ana", "email": "ana@x.com", "password": "secret"});
        let (status, body) =
            post_json(&client, format!("{base}/register"), None, register.clone()).await;
        assert_eq!(status, 201);
        assert!(body["data"]["identity_id"].is_string());
        let (status, body) = post_json(&client, format!("{base}/register"), None, register).await;
        assert_eq!(status, 409);
        assert_eq!(body["errors"][0]["code"], "EMAIL_TAKEN");

        let (status, _) = post_json(
            &client,
            format!("{base}/login"),
            None,
            json!({"email": "ana@x.com", "password": "wrong"}),
        )
        .await;
        assert_eq!(status, 401);

        let response = client
            .post(format!("{base}/login"))
            .json(&json!({"email": "ana@x.com", "password": "secret"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let cookie = response
            .headers()
            .get("set-cookie")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("parley_session="));
        assert!(cookie.contains("HttpOnly"));
        let body: Value = response.json().await.unwrap();
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let (status, me) = get_json(&client, format!("{base}/me"), &token).await;
        assert_eq!(status, 200);
        assert_eq!(me["data"]["plan"], "basic");

        // The cookie alone authenticates as well.
        let cookie_pair = cookie.split(';').next().unwrap().to_string();
        let response = client
            .get(format!("{base}/me"))
            .header("cookie", cookie_pair)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);

        let (status, _) = post_json(&client, format!("{base}/logout"), Some(&token), json!({})).await;
        assert_eq!(status, 200);
        let (status, body) = get_json(&client, format!("{base}/me"), &token).await;
        assert_eq!(status, 401);
        assert_eq!(body["errors"][0]["code"], "INVALID_SESSION");
    }

    #[tokio::test]
    async fn test_chat_remembers_previous_turn() {
        let (stub, prompts) = spawn_stub(Duration::ZERO).await;
        let base = spawn_app(&stub, 30).await;
        let client = reqwest::Client::new();
        let token = register_and_login(&client, &base).await;

        let (status, body) = post_json(
            &client,
            format!("{base}/chat"),
            Some(&token),
            json!({"message": "Hello"}),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["reply"], "Hi there!");
        assert_eq!(body["data"]["remembered"], true);

        post_json(
            &client,
            format!("{base}/chat"),
            Some(&token),
            json!({"message": "What did I just say?"}),
        )
        .await;
        let second = prompts.lock().unwrap()[1].clone();
        assert!(second.contains("user: Hello\nassistant: Hi there!"));

        let (_, memory) = get_json(&client, format!("{base}/memory?limit=10"), &token).await;
        assert_eq!(memory["data"].as_array().unwrap().len(), 4);

        let (_, usage) = get_json(&client, format!("{base}/usage"), &token).await;
        assert_eq!(usage["data"]["messages_sent"], 2);
        assert_eq!(usage["data"]["messages_received"], 2);

        let (status, cleared) =
            post_json(&client, format!("{base}/clear-memory"), Some(&token), json!({})).await;
        assert_eq!(status, 200);
        assert_eq!(cleared["data"]["cleared"], 4);
        let (_, memory) = get_json(&client, format!("{base}/memory"), &token).await;
        assert!(memory["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chat_timeout_returns_504_and_records_nothing() {
        let (stub, _) = spawn_stub(Duration::from_secs(5)).await;
        let base = spawn_app(&stub, 1).await;
        let client = reqwest::Client::new();
        let token = register_and_login(&client, &base).await;

        let (status, body) = post_json(
            &client,
            format!("{base}/chat"),
            Some(&token),
            json!({"message": "Hello"}),
        )
        .await;
        assert_eq!(status, 504);
        assert_eq!(body["errors"][0]["code"], "UPSTREAM_TIMEOUT");

        let (_, memory) = get_json(&client, format!("{base}/memory"), &token).await;
        assert!(memory["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_and_invalid_token_chat() {
        let (stub, _) = spawn_stub(Duration::ZERO).await;
        let base = spawn_app(&stub, 30).await;
        let client = reqwest::Client::new();

        let (status, body) =
            post_json(&client, format!("{base}/chat"), None, json!({"message": "Hi"})).await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["remembered"], false);
        assert_eq!(body["data"]["plan"], "basic");

        let (status, _) = post_json(
            &client,
            format!("{base}/chat"),
            Some("not-a-real-token"),
            json!({"message": "Hi"}),
        )
        .await;
        assert_eq!(status, 401);

        let (status, body) =
            post_json(&client, format!("{base}/chat"), None, json!({"message": "  "})).await;
        assert_eq!(status, 400);
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");

        let (status, _) = post_json(&client, format!("{base}/chat"), None, json!({})).await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn test_upgrade_changes_plan_for_existing_session() {
        let (stub, _) = spawn_stub(Duration::ZERO).await;
        let base = spawn_app(&stub, 30).await;
        let client = reqwest::Client::new();
        let token = register_and_login(&client, &base).await;

        let (status, body) =
            post_json(&client, format!("{base}/upgrade"), Some(&token), json!({})).await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["plan"], "premium");

        let (_, me) = get_json(&client, format!("{base}/me"), &token).await;
        assert_eq!(me["data"]["plan"], "premium");

        let (_, body) = post_json(
            &client,
            format!("{base}/chat"),
            Some(&token),
            json!({"message": "Hello"}),
        )
        .await;
        assert_eq!(body["data"]["plan"], "premium");
    }

    #[tokio::test]
    async fn test_protected_routes_require_session() {
        let (stub, _) = spawn_stub(Duration::ZERO).await;
        let base = spawn_app(&stub, 30).await;
        let client = reqwest::Client::new();

        for path in ["/logout", "/logout-all", "/upgrade", "/clear-memory"] {
            let (status, _) = post_json(&client, format!("{base}{path}"), None, json!({})).await;
            assert_eq!(status, 401, "{path}");
        }
        let response = client.get(format!("{base}/me")).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 401);

        let health = client.get(format!("{base}/health")).send().await.unwrap();
        assert_eq!(health.status().as_u16(), 200);
    }
}
