//! Integration tests for the vault backend.

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::{Config, LogFormat};
use crate::db::{init_database, Repository};
use crate::search::SearchIndex;
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    async fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");
        let index_path = temp_dir.path().join("index");

        // Initialize database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        // Initialize search index
        let search = Arc::new(SearchIndex::open(&index_path).expect("Failed to init search"));

        let mut config = Config {
            db_path,
            index_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            log_format: LogFormat::Text,
            allow_signup: true,
            max_documents: 1000,
            session_ttl_hours: 1,
            max_body_bytes: 64 * 1024,
        };
        customize(&mut config);

        let state = AppState {
            repo,
            search,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    fn post(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token)
    }

    fn put(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token)
    }

    fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    /// Register an account and return its session token.
    async fn sign_up(&self, email: &str) -> String {
        let resp = self
            .client
            .post(self.url("/api/auth/sign-up"))
            .json(&json!({ "email": email, "password": "secret-pass" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.unwrap();
        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Create a document and return its JSON representation.
    async fn create_document(&self, token: &str, document: Value) -> Value {
        let resp = self
            .post("/api/documents", token)
            .json(&document)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.unwrap();
        body["data"].clone()
    }
}

async fn error_code(resp: reqwest::Response) -> String {
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    body["error"]["code"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_landing_is_public() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/landing"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Creative Vault");
    assert!(body["data"]["description"]
        .as_str()
        .unwrap()
        .starts_with("A personal collection of ideas, product visions"));
    assert_eq!(body["data"]["signupEnabled"], true);
    assert_eq!(body["data"]["features"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"]["featuredTags"][0], "SaaS");
    assert_eq!(body["data"]["sampleTitles"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/feed"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    assert_eq!(error_code(resp).await, "UNAUTHORIZED");

    let resp = fixture
        .get("/api/documents", "not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    assert_eq!(error_code(resp).await, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_sign_up_sign_in_sign_out() {
    let fixture = TestFixture::new().await;

    let token = fixture.sign_up("Maker@Example.com ").await;

    let resp = fixture.get("/api/auth/session", &token).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["email"], "maker@example.com");

    // Sign in with the normalized email through the session header
    let resp = fixture
        .client
        .post(fixture.url("/api/auth/sign-in"))
        .json(&json!({ "email": "maker@example.com", "password": "secret-pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let second = body["data"]["token"].as_str().unwrap().to_string();
    assert_ne!(second, token);

    let resp = fixture
        .client
        .get(fixture.url("/api/auth/session"))
        .header("x-session-token", &second)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Signing out closes only that session
    let resp = fixture.post("/api/auth/sign-out", &token).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture.get("/api/auth/session", &token).send().await.unwrap();
    assert_eq!(resp.status(), 401);

    let resp = fixture.get("/api/auth/session", &second).send().await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_sign_in_rejects_bad_credentials() {
    let fixture = TestFixture::new().await;
    fixture.sign_up("maker@example.com").await;

    for (email, password) in [
        ("maker@example.com", "wrong-pass"),
        ("nobody@example.com", "secret-pass"),
    ] {
        let resp = fixture
            .client
            .post(fixture.url("/api/auth/sign-in"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"]["message"], "Invalid login credentials");
    }
}

#[tokio::test]
async fn test_sign_up_validation() {
    let fixture = TestFixture::new().await;
    fixture.sign_up("maker@example.com").await;

    let resp = fixture
        .client
        .post(fixture.url("/api/auth/sign-up"))
        .json(&json!({ "email": "MAKER@example.com", "password": "another-pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    assert_eq!(error_code(resp).await, "CONFLICT");

    let resp = fixture
        .client
        .post(fixture.url("/api/auth/sign-up"))
        .json(&json!({ "email": "new@example.com", "password": "12345" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(error_code(resp).await, "VALIDATION_ERROR");

    let resp = fixture
        .client
        .post(fixture.url("/api/auth/sign-up"))
        .json(&json!({ "email": "not-an-email", "password": "secret-pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_sign_up_disabled() {
    let fixture = TestFixture::with_config(|c| c.allow_signup = false).await;

    let resp = fixture
        .client
        .post(fixture.url("/api/auth/sign-up"))
        .json(&json!({ "email": "maker@example.com", "password": "secret-pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    assert_eq!(error_code(resp).await, "FORBIDDEN");
}

#[tokio::test]
async fn test_document_crud() {
    let fixture = TestFixture::new().await;
    let token = fixture.sign_up("maker@example.com").await;

    // Create with defaults
    let created = fixture
        .create_document(
            &token,
            json!({
                "title": "  Design Notes ",
                "content": "Grid and spacing rules",
                "tags": ["UI", " UI ", ""]
            }),
        )
        .await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["title"], "Design Notes");
    assert_eq!(created["emoji"], "📄");
    assert_eq!(created["isPublic"], false);
    assert_eq!(created["tags"], json!(["UI"]));
    assert!(created.get("excerpt").is_none());

    // Get
    let resp = fixture
        .get(&format!("/api/documents/{}", id), &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Partial update leaves other fields alone
    let resp = fixture
        .put(&format!("/api/documents/{}", id), &token)
        .json(&json!({ "excerpt": "Short summary", "isPublic": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Design Notes");
    assert_eq!(body["data"]["excerpt"], "Short summary");
    assert_eq!(body["data"]["isPublic"], true);

    // Delete
    let resp = fixture
        .delete(&format!("/api/documents/{}", id), &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .get(&format!("/api/documents/{}", id), &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    assert_eq!(error_code(resp).await, "NOT_FOUND");
}

#[tokio::test]
async fn test_document_validation() {
    let fixture = TestFixture::new().await;
    let token = fixture.sign_up("maker@example.com").await;

    let resp = fixture
        .post("/api/documents", &token)
        .json(&json!({ "title": "   ", "content": "Body" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(error_code(resp).await, "VALIDATION_ERROR");

    let created = fixture
        .create_document(&token, json!({ "title": "Kept", "content": "Body" }))
        .await;

    let resp = fixture
        .put(&format!("/api/documents/{}", created["id"].as_str().unwrap()), &token)
        .json(&json!({ "content": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_document_visibility_and_ownership() {
    let fixture = TestFixture::new().await;
    let owner = fixture.sign_up("owner@example.com").await;
    let other = fixture.sign_up("other@example.com").await;

    let public = fixture
        .create_document(
            &owner,
            json!({ "title": "Shared", "content": "Body", "isPublic": true }),
        )
        .await;
    let private = fixture
        .create_document(&owner, json!({ "title": "Secret", "content": "Body" }))
        .await;
    let public_id = public["id"].as_str().unwrap();
    let private_id = private["id"].as_str().unwrap();

    // Public documents are readable but not writable by others
    let resp = fixture
        .get(&format!("/api/documents/{}", public_id), &other)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .put(&format!("/api/documents/{}", public_id), &other)
        .json(&json!({ "title": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    assert_eq!(error_code(resp).await, "FORBIDDEN");

    let resp = fixture
        .delete(&format!("/api/documents/{}", public_id), &other)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // Private documents do not exist for others
    let resp = fixture
        .get(&format!("/api/documents/{}", private_id), &other)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = fixture
        .delete(&format!("/api/documents/{}", private_id), &other)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Listing: others see only the public one, `owner=me` sees only their own
    let resp = fixture.get("/api/documents", &other).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Shared"]);

    let resp = fixture
        .get("/api/documents?owner=me", &other)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());

    // An empty tag selects nothing, same as the feed
    let resp = fixture
        .get("/api/documents?tag=&q=", &other)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let resp = fixture
        .get("/api/documents?owner=someone", &other)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(error_code(resp).await, "BAD_REQUEST");
}

#[tokio::test]
async fn test_document_limit() {
    let fixture = TestFixture::with_config(|c| c.max_documents = 1).await;
    let token = fixture.sign_up("maker@example.com").await;

    fixture
        .create_document(&token, json!({ "title": "First", "content": "Body" }))
        .await;

    let resp = fixture
        .post("/api/documents", &token)
        .json(&json!({ "title": "Second", "content": "Body" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(error_code(resp).await, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_request_body_limit() {
    let fixture = TestFixture::with_config(|c| c.max_body_bytes = 1024).await;
    let token = fixture.sign_up("maker@example.com").await;

    let resp = fixture
        .post("/api/documents", &token)
        .json(&json!({ "title": "Huge", "content": "x".repeat(4096) }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_feed_falls_back_when_store_is_empty() {
    let fixture = TestFixture::new().await;
    let token = fixture.sign_up("maker@example.com").await;

    let resp = fixture.get("/api/feed", &token).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["source"], "fallback");
    assert_eq!(body["data"]["total"], 2);
    assert!(body["data"].get("notice").is_none());
    assert_eq!(body["data"]["documents"][0]["id"], "fallback-1");
    assert!(body["data"]["documents"][0]["readTime"]
        .as_str()
        .unwrap()
        .ends_with(" min read"));

    // The filter applies to the fallback list too
    let resp = fixture
        .get("/api/feed?tag=Workflow", &token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["documents"][0]["id"], "fallback-2");
}

#[tokio::test]
async fn test_feed_filters_store_documents() {
    let fixture = TestFixture::new().await;
    let token = fixture.sign_up("maker@example.com").await;

    fixture
        .create_document(
            &token,
            json!({ "title": "Alpha", "content": "Body", "tags": ["AI"] }),
        )
        .await;
    fixture
        .create_document(
            &token,
            json!({ "title": "Beta", "excerpt": "about ai agents", "content": "Body", "tags": ["UI"] }),
        )
        .await;

    let resp = fixture.get("/api/feed", &token).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["source"], "store");
    assert_eq!(body["data"]["total"], 2);
    // Newest first
    assert_eq!(body["data"]["documents"][0]["title"], "Beta");

    // Tag selection is case-sensitive
    let resp = fixture.get("/api/feed?tag=ai", &token).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 0);

    let resp = fixture.get("/api/feed?tag=AI", &token).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["documents"][0]["title"], "Alpha");

    // Text search is case-insensitive across title, excerpt and tags
    let resp = fixture.get("/api/feed?q=AI", &token).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    let titles: Vec<&str> = body["data"]["documents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Beta", "Alpha"]);

    // A whitespace-only query filters nothing
    let resp = fixture.get("/api/feed?q=%20%20", &token).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 2);
}

#[tokio::test]
async fn test_tags_extend_featured_list() {
    let fixture = TestFixture::new().await;
    let token = fixture.sign_up("maker@example.com").await;

    fixture
        .create_document(
            &token,
            json!({ "title": "Alpha", "content": "Body", "tags": ["AI", "Research"] }),
        )
        .await;

    let resp = fixture.get("/api/tags", &token).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["data"],
        json!(["SaaS", "UI", "AI", "Reference", "ProductVision", "Workflow", "Research"])
    );
}

#[tokio::test]
async fn test_search_respects_visibility() {
    let fixture = TestFixture::new().await;
    let owner = fixture.sign_up("owner@example.com").await;
    let other = fixture.sign_up("other@example.com").await;

    fixture
        .create_document(
            &owner,
            json!({ "title": "Public palette", "content": "Warm gradients", "isPublic": true }),
        )
        .await;
    fixture
        .create_document(
            &owner,
            json!({ "title": "Private palette", "content": "Cold gradients" }),
        )
        .await;

    let resp = fixture
        .get("/api/search?q=gradients", &owner)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["limit"], 20);

    let resp = fixture
        .get("/api/search?q=gradients&limit=500", &other)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["limit"], 100);
    assert_eq!(
        body["data"]["results"][0]["document"]["title"],
        "Public palette"
    );

    let resp = fixture.get("/api/search?q=", &owner).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn test_search_offset_bounds() {
    let fixture = TestFixture::new().await;
    let token = fixture.sign_up("maker@example.com").await;

    fixture
        .create_document(&token, json!({ "title": "Palette", "content": "Warm gradients" }))
        .await;

    let resp = fixture
        .get("/api/search?q=gradients&offset=5000", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 0);

    let resp = fixture
        .get("/api/search?q=gradients&offset=18446744073709551615", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(error_code(resp).await, "BAD_REQUEST");
}

#[tokio::test]
async fn test_search_drops_deleted_documents() {
    let fixture = TestFixture::new().await;
    let token = fixture.sign_up("maker@example.com").await;

    let created = fixture
        .create_document(&token, json!({ "title": "Ephemeral", "content": "Vanishing ink" }))
        .await;

    fixture
        .delete(&format!("/api/documents/{}", created["id"].as_str().unwrap()), &token)
        .send()
        .await
        .unwrap();

    let resp = fixture
        .get("/api/search?q=vanishing", &token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn test_profile_get_and_update() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/auth/sign-up"))
        .json(&json!({
            "email": "maker@example.com",
            "password": "secret-pass",
            "fullName": "Ada Maker"
        }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let resp = fixture.get("/api/profile", &token).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["fullName"], "Ada Maker");

    let resp = fixture
        .put("/api/profile", &token)
        .json(&json!({ "username": "ada", "githubUrl": "https://github.com/ada", "bio": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture.get("/api/profile", &token).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["username"], "ada");
    assert_eq!(body["data"]["githubUrl"], "https://github.com/ada");
    // Updates replace the whole profile
    assert!(body["data"].get("fullName").is_none());
    assert!(body["data"].get("bio").is_none());
    assert!(body["data"]["updatedAt"].is_string());
}
