use conceptbridge_client::BridgeClient;
use conceptbridge_core::*;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn analogy_body(explanation: &str) -> serde_json::Value {
    json!({
        "concept": "Binary Trees",
        "profession_context": "Chef",
        "analogy_title": "Binary Trees Are a Kitchen Brigade",
        "explanation": explanation,
        "practical_examples": ["Prep stations", "Ticket rail", "Pass"],
        "key_connections": ["Root = head chef", "Leaves = line cooks"],
        "next_steps": ["Traverse the brigade"],
        "generation_time": 0.42,
        "tokens_allocated": 1200,
        "response_length": "medium"
    })
}

// ── Catalog ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn lists_professions_in_server_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/professions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 3, "name": "Sports"},
            {"id": 1, "name": "Cooking", "description": "Procedural thinking"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = BridgeClient::new(server.uri()).unwrap();
    let professions = client.list_professions().await.unwrap();
    let names: Vec<_> = professions.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Sports", "Cooking"]);
    assert_eq!(professions[1].description.as_deref(), Some("Procedural thinking"));
}

#[tokio::test]
async fn catalog_http_error_is_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/topics"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = BridgeClient::new(server.uri()).unwrap();
    let err = client.list_topics().await.unwrap_err();
    match err {
        BridgeError::ServiceUnavailable(msg) => assert!(msg.contains("503"), "{}", msg),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_server_is_service_unavailable() {
    // Nothing listens on port 9 locally.
    let client = BridgeClient::with_timeout("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    assert!(matches!(
        client.list_professions().await,
        Err(BridgeError::ServiceUnavailable(_))
    ));
}

#[tokio::test]
async fn subtopics_use_path_scheme_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/topics/4/subtopics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 40, "topic_id": 4, "name": "Binary Trees", "difficulty_level": "intermediate"}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/subtopics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let reader = CatalogReader::new(BridgeClient::new(server.uri()).unwrap());
    let subtopics = reader.list_subtopics(4).await.unwrap();
    assert_eq!(subtopics.len(), 1);
    assert_eq!(subtopics[0].name, "Binary Trees");
}

#[tokio::test]
async fn subtopics_fall_back_to_query_scheme_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/topics/4/subtopics"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/subtopics"))
        .and(query_param("topic_id", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 41, "topic_id": 4, "name": "Heaps"},
            {"id": 99, "topic_id": 5, "name": "Other topic"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let reader = CatalogReader::new(BridgeClient::new(server.uri()).unwrap());
    let subtopics = reader.list_subtopics(4).await.unwrap();
    let names: Vec<_> = subtopics.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Heaps"]);
}

#[tokio::test]
async fn subtopics_both_schemes_fail_leaves_list_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let reader = CatalogReader::new(BridgeClient::new(server.uri()).unwrap());
    let mut orchestrator = Orchestrator::default();
    orchestrator.select_profession(Profession::new(1, "Chef"));

    let err = orchestrator
        .load_subtopics(&reader, Topic::new(4, "Computer Science"))
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::ServiceUnavailable(_)));
    assert!(orchestrator.subtopics().is_empty());
    assert!(orchestrator.catalog_error().is_some());
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn health_check_classifies_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "degraded", "message": "slow", "database": "connected"
        })))
        .mount(&server)
        .await;

    let client = BridgeClient::new(format!("{}/", server.uri())).unwrap();
    let report = client.health().await.unwrap();
    assert!(!report.is_healthy());
    assert_eq!(report.message, "slow");
}

// ── Generation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn chef_binary_trees_request_and_render() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analogies/quick-explain"))
        .and(body_partial_json(json!({
            "profession": "Chef",
            "concept": "Binary Trees",
            "creativity_level": 3,
            "max_tokens": 1200,
            "response_length": "medium"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(analogy_body("Para1\n\nPara2")))
        .expect(1)
        .mount(&server)
        .await;

    let client = BridgeClient::new(server.uri()).unwrap();
    let mut o = Orchestrator::default();
    o.select_profession(Profession::new(1, "Chef"));
    let ticket = o.select_topic(Topic::new(4, "Computer Science"));
    o.apply_subtopics(ticket, Ok(vec![Subtopic::new(40, 4, "Binary Trees")]));
    o.select_subtopic(40).unwrap();
    o.set_options(GenerationOptions::default().with_creativity(3).with_length(TargetLength::Medium));

    assert!(o.generate_with(&client).await);
    let result = o.result().expect("result");
    assert_eq!(result.paragraphs(), vec!["Para1", "Para2"]);
    assert_eq!(
        result.practical_examples,
        vec!["Prep stations", "Ticket rail", "Pass"]
    );
}

#[tokio::test]
async fn server_error_surfaces_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analogies/quick-explain"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = BridgeClient::new(server.uri()).unwrap();
    let mut o = Orchestrator::default();
    o.select_profession(Profession::new(1, "Chef"));
    o.set_custom_concept("Recursion");

    assert!(o.generate_with(&client).await);
    assert_eq!(o.phase(), &Phase::Failed("Internal Server Error".into()));
    assert!(o.is_ready());
}

#[tokio::test]
async fn malformed_payload_is_generation_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analogies/quick-explain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let client = BridgeClient::new(server.uri()).unwrap();
    let err = generate(
        &client,
        "Chef",
        "Recursion",
        &GenerationOptions::default(),
        &TokenBudget::default(),
    )
    .await
    .unwrap_err();
    match err {
        BridgeError::GenerationFailed(msg) => assert!(msg.starts_with("malformed response"), "{}", msg),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn slow_generation_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analogies/quick-explain"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(analogy_body("late"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = BridgeClient::with_timeout(server.uri(), Duration::from_millis(200)).unwrap();
    let err = generate(
        &client,
        "Chef",
        "Recursion",
        &GenerationOptions::default(),
        &TokenBudget::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, BridgeError::GenerationFailed(_)));
}

#[tokio::test]
async fn repeated_generations_are_not_deduplicated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analogies/quick-explain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(analogy_body("x")))
        .expect(2)
        .mount(&server)
        .await;

    let client = BridgeClient::new(server.uri()).unwrap();
    for _ in 0..2 {
        generate(
            &client,
            "Chef",
            "Recursion",
            &GenerationOptions::default(),
            &TokenBudget::default(),
        )
        .await
        .unwrap();
    }
}
