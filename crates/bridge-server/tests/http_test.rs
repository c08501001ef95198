use async_trait::async_trait;
use conceptbridge::{create_router, AnalogyEngine, AppState, ChatBackend, ChatCompletion, LlmError, SeedCatalog};
use conceptbridge_client::BridgeClient;
use conceptbridge_core::*;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Chat backend that replies with a fixed completion, or fails like a rejected key.
struct ScriptedChat {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedChat {
    fn replying(reply: Value) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ChatBackend for ScriptedChat {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn is_available(&self) -> bool {
        self.reply.is_some()
    }

    async fn complete(&self, _request: ChatCompletion) -> std::result::Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().ok_or(LlmError::RequestFailed {
            status: 401,
            body: "invalid api key".to_string(),
        })
    }
}

/// Serve the built-in catalog on an ephemeral port and return its root URL.
async fn spawn(engine: AnalogyEngine) -> String {
    let state = AppState::new(SeedCatalog::builtin().unwrap(), engine);
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn analogy_reply() -> Value {
    json!({
        "title": "Mise en Place for Data",
        "explanation": "Para1\n\nPara2",
        "practical_examples": ["Prep stations"],
        "key_connections": ["Ordering"],
        "next_steps": ["Build a BST"]
    })
}

// ── Catalog ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_catalog_through_reader() {
    let base = spawn(AnalogyEngine::new(ScriptedChat::replying(analogy_reply()))).await;
    let reader = CatalogReader::new(BridgeClient::new(&base).unwrap());

    let professions = reader.list_professions().await.unwrap();
    assert_eq!(professions.len(), 5);
    assert_eq!(professions[0].name, "Cooking");

    let topics = reader.list_topics().await.unwrap();
    assert_eq!(topics[0].name, "Computer Science");

    let subtopics = reader.list_subtopics(topics[0].id).await.unwrap();
    assert!(!subtopics.is_empty());
    assert!(subtopics.iter().all(|s| s.topic_id == topics[0].id));
    assert_eq!(subtopics[0].name, "Arrays and Lists");
}

#[tokio::test]
async fn test_unknown_topic_is_unavailable() {
    let base = spawn(AnalogyEngine::new(ScriptedChat::replying(analogy_reply()))).await;
    let reader = CatalogReader::new(BridgeClient::new(&base).unwrap());

    // Path scheme 404s, the query-scoped fallback is not served either.
    let err = reader.list_subtopics(999).await.unwrap_err();
    assert!(matches!(err, BridgeError::ServiceUnavailable(_)));

    let client = reader.source();
    assert!(matches!(client.get_topic(999).await, Err(BridgeError::ServiceUnavailable(msg)) if msg.contains("404")));
    assert_eq!(client.get_profession(2).await.unwrap().name, "Sports");
}

#[tokio::test]
async fn test_subtopic_query_parameters() {
    let base = spawn(AnalogyEngine::new(ScriptedChat::replying(analogy_reply()))).await;
    let http = reqwest::Client::new();
    let url = format!("{}/api/v1/topics/1/subtopics", base);

    let limited: Vec<Subtopic> = http.get(&url).query(&[("limit", "2")]).send().await.unwrap().json().await.unwrap();
    assert_eq!(limited.len(), 2);

    let advanced: Vec<Subtopic> = http
        .get(&url)
        .query(&[("difficulty", "advanced")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!advanced.is_empty());
    assert!(advanced.iter().all(|s| s.difficulty_level == DifficultyLevel::Advanced));

    for bad in ["0", "51"] {
        let resp = http.get(&url).query(&[("limit", bad)]).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = resp.json().await.unwrap();
        assert!(body["detail"].as_str().unwrap().contains("limit"));
    }
}

#[tokio::test]
async fn test_topic_with_subtopics() {
    let base = spawn(AnalogyEngine::new(ScriptedChat::replying(analogy_reply()))).await;
    let body: Value = reqwest::get(format!("{}/api/v1/topics/1/with-subtopics", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["name"], "Computer Science");
    assert!(body["subtopics"].as_array().unwrap().len() > 1);
}

#[tokio::test]
async fn test_malformed_path_and_query_answer_with_detail() {
    let base = spawn(AnalogyEngine::new(ScriptedChat::replying(analogy_reply()))).await;
    let http = reqwest::Client::new();

    for url in [
        format!("{}/api/v1/topics/abc", base),
        format!("{}/api/v1/professions/-x", base),
        format!("{}/api/v1/topics/1/subtopics?difficulty=expert", base),
        format!("{}/api/v1/topics/1/subtopics?limit=many", base),
        format!("{}/api/v1/topics/1/with-subtopics?difficulty=expert", base),
    ] {
        let resp = http.get(&url).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST, "{}", url);
        let body: Value = resp.json().await.unwrap();
        assert!(!body["detail"].as_str().unwrap().is_empty(), "{}", url);
    }
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_endpoints() {
    let base = spawn(AnalogyEngine::new(ScriptedChat::failing())).await;
    let client = BridgeClient::new(&base).unwrap();
    assert!(client.health().await.unwrap().is_healthy());

    let body: Value = reqwest::get(format!("{}/api/v1/analogies/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["ai_service"], "unhealthy");
    assert_eq!(body["model"], "scripted");
    assert!(body["supported_professions"]
        .as_array()
        .unwrap()
        .contains(&json!("cooking")));

    let root: Value = reqwest::get(base.as_str()).await.unwrap().json().await.unwrap();
    assert_eq!(root["docs"], "/api/v1");

    let v1: Value = reqwest::get(format!("{}/api/v1/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(v1, json!({"status": "healthy", "api_version": "v1"}));
}

#[tokio::test]
async fn test_analogy_examples() {
    let chat = ScriptedChat::replying(analogy_reply());
    let base = spawn(AnalogyEngine::new(chat.clone())).await;
    let examples: Vec<Value> = reqwest::get(format!("{}/api/v1/analogies/examples", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(examples.len(), 5);
    assert_eq!(examples[0]["profession"], "Gaming");
    assert_eq!(examples[0]["concept"], "Recursion");
    assert_eq!(examples[1]["difficulty"], "beginner");
    assert_eq!(examples[3]["rating"], json!(4.9));
    assert!(examples
        .iter()
        .all(|e| e["preview"].as_str().unwrap().ends_with("...")));
    assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
}

// ── Generation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_generate_through_client() {
    let chat = ScriptedChat::replying(analogy_reply());
    let base = spawn(AnalogyEngine::new(chat.clone())).await;
    let client = BridgeClient::new(&base).unwrap();

    let result = generate(
        &client,
        "Cooking",
        "Binary Trees",
        &GenerationOptions::default(),
        &TokenBudget::default(),
    )
    .await
    .unwrap();

    assert_eq!(result.analogy_title, "Mise en Place for Data");
    assert_eq!(result.paragraphs(), vec!["Para1", "Para2"]);
    assert_eq!(result.tokens_allocated, Some(1200));
    assert_eq!(result.response_length, Some(TargetLength::Medium));
    assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_template_fallback_when_enabled() {
    let base = spawn(AnalogyEngine::new(ScriptedChat::failing())).await;
    let client = BridgeClient::new(&base).unwrap();

    let result = generate(
        &client,
        "Cooking",
        "Binary Trees",
        &GenerationOptions::default(),
        &TokenBudget::default(),
    )
    .await
    .unwrap();
    assert_eq!(result.analogy_title, "Understanding Binary Trees Through Cooking");
    assert_eq!(result.paragraphs().len(), 3);
}

#[tokio::test]
async fn test_upstream_failure_when_fallback_disabled() {
    let base = spawn(AnalogyEngine::new(ScriptedChat::failing()).with_fallback(false)).await;
    let client = BridgeClient::new(&base).unwrap();

    let err = generate(
        &client,
        "Cooking",
        "Binary Trees",
        &GenerationOptions::default(),
        &TokenBudget::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err, BridgeError::GenerationFailed("Bad Gateway".to_string()));

    let resp = reqwest::Client::new()
        .post(format!("{}/api/v1/analogies/quick-explain", base))
        .json(&json!({"profession": "Cooking", "concept": "Binary Trees"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_GATEWAY);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Failed to generate quick explanation"));
}

#[tokio::test]
async fn test_quick_explain_rejects_invalid_bodies() {
    let chat = ScriptedChat::replying(analogy_reply());
    let base = spawn(AnalogyEngine::new(chat.clone())).await;
    let http = reqwest::Client::new();
    let url = format!("{}/api/v1/analogies/quick-explain", base);

    for body in [
        json!({"profession": "Cooking", "concept": "  "}),
        json!({"profession": "", "concept": "Recursion"}),
        json!({"profession": "Cooking", "concept": "Recursion", "creativity_level": 9}),
        json!({"profession": "Cooking", "concept": "Recursion", "max_tokens": 0}),
    ] {
        let resp = http.post(&url).json(&body).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY, "{}", body);
    }
    assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_quick_explain_undecodable_bodies_answer_with_detail() {
    let chat = ScriptedChat::replying(analogy_reply());
    let base = spawn(AnalogyEngine::new(chat.clone())).await;
    let http = reqwest::Client::new();
    let url = format!("{}/api/v1/analogies/quick-explain", base);

    // Out of range for the field type, so serde rejects it before validation.
    let resp = http
        .post(&url)
        .json(&json!({"profession": "Cooking", "concept": "Recursion", "creativity_level": 300}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("creativity_level"));

    let resp = http
        .post(&url)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].is_string());

    let resp = http.post(&url).body("profession=Cooking").send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].is_string());

    assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_orchestrator_session() {
    let base = spawn(AnalogyEngine::new(ScriptedChat::replying(analogy_reply()))).await;
    let client = BridgeClient::new(&base).unwrap();
    let reader = CatalogReader::new(client.clone());

    let professions = reader.list_professions().await.unwrap();
    let topics = reader.list_topics().await.unwrap();

    let mut session = Orchestrator::default();
    session.select_profession(professions[0].clone());
    session.load_subtopics(&reader, topics[0].clone()).await.unwrap();
    let binary_trees = session
        .subtopics()
        .iter()
        .find(|s| s.name == "Binary Trees")
        .map(|s| s.id)
        .unwrap();
    session.select_subtopic(binary_trees).unwrap();
    assert!(session.is_ready());

    assert!(session.generate_with(&client).await);
    let result = session.result().unwrap();
    assert_eq!(result.concept, "Binary Trees");
    assert_eq!(result.profession_context, "Cooking");

    // Any edit leaves the result phase.
    session.set_custom_concept("Recursion");
    assert!(matches!(session.phase(), Phase::Selecting));
}
