use super::{ApiError, ApiResult, AppState};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::Json,
    routing::{get, post},
    Router,
};
use conceptbridge_core::{
    prompt, DifficultyLevel, GenerationRequest, GenerationResult, HealthReport, Profession,
    ProfessionId, Subtopic, Topic, TopicId, TopicWithSubtopics, HEALTHY, MAX_CREATIVITY,
    MIN_CREATIVITY,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

const MAX_SUBTOPIC_LIMIT: usize = 50;
const MAX_TOKENS_CEILING: u32 = 4096;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/v1/health", get(api_health))
        .route("/api/v1/professions", get(list_professions))
        .route("/api/v1/professions/:id", get(get_profession))
        .route("/api/v1/topics", get(list_topics))
        .route("/api/v1/topics/:id", get(get_topic))
        .route("/api/v1/topics/:id/subtopics", get(topic_subtopics))
        .route("/api/v1/topics/:id/with-subtopics", get(topic_with_subtopics))
        .route("/api/v1/analogies/quick-explain", post(quick_explain))
        .route("/api/v1/analogies/health", get(analogy_health))
        .route("/api/v1/analogies/examples", get(analogy_examples))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "ConceptBridge API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/api/v1",
    }))
}

async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let (professions, topics, subtopics) = state.catalog.counts();
    Json(HealthReport {
        status: HEALTHY.to_string(),
        message: format!(
            "up {}s; catalog holds {} professions, {} topics, {} subtopics",
            state.start_time.elapsed().as_secs(),
            professions,
            topics,
            subtopics
        ),
        database: "connected".to_string(),
    })
}

async fn api_health() -> Json<Value> {
    Json(json!({ "status": HEALTHY, "api_version": "v1" }))
}

// ── Catalog ──────────────────────────────────────────────────────────────────

async fn list_professions(State(state): State<AppState>) -> Json<Vec<Profession>> {
    let professions = state.catalog.professions().to_vec();
    info!("Retrieved {} professions", professions.len());
    Json(professions)
}

async fn get_profession(
    State(state): State<AppState>,
    path: Result<Path<ProfessionId>, PathRejection>,
) -> ApiResult<Json<Profession>> {
    let Path(id) = path?;
    state
        .catalog
        .profession(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| {
            warn!("Profession with ID {} not found", id);
            ApiError::not_found(format!("Profession with ID {} not found", id))
        })
}

async fn list_topics(State(state): State<AppState>) -> Json<Vec<Topic>> {
    let topics = state.catalog.topics().to_vec();
    info!("Retrieved {} topics", topics.len());
    Json(topics)
}

fn find_topic(state: &AppState, id: TopicId) -> ApiResult<Topic> {
    state.catalog.topic(id).cloned().ok_or_else(|| {
        warn!("Topic with ID {} not found", id);
        ApiError::not_found(format!("Topic with ID {} not found", id))
    })
}

async fn get_topic(
    State(state): State<AppState>,
    path: Result<Path<TopicId>, PathRejection>,
) -> ApiResult<Json<Topic>> {
    let Path(id) = path?;
    find_topic(&state, id).map(Json)
}

#[derive(Debug, Deserialize)]
struct SubtopicQuery {
    difficulty: Option<DifficultyLevel>,
    limit: Option<usize>,
}

async fn topic_subtopics(
    State(state): State<AppState>,
    path: Result<Path<TopicId>, PathRejection>,
    query: Result<Query<SubtopicQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Subtopic>>> {
    let Path(id) = path?;
    let Query(query) = query?;
    let topic = find_topic(&state, id)?;
    if let Some(limit) = query.limit {
        if !(1..=MAX_SUBTOPIC_LIMIT).contains(&limit) {
            return Err(ApiError::unprocessable(format!(
                "limit must be between 1 and {}",
                MAX_SUBTOPIC_LIMIT
            )));
        }
    }

    let subtopics = state.catalog.subtopics_of(id, query.difficulty, query.limit);
    info!("Retrieved {} subtopics for topic '{}'", subtopics.len(), topic.name);
    Ok(Json(subtopics))
}

#[derive(Debug, Deserialize)]
struct WithSubtopicsQuery {
    difficulty: Option<DifficultyLevel>,
}

async fn topic_with_subtopics(
    State(state): State<AppState>,
    path: Result<Path<TopicId>, PathRejection>,
    query: Result<Query<WithSubtopicsQuery>, QueryRejection>,
) -> ApiResult<Json<TopicWithSubtopics>> {
    let Path(id) = path?;
    let Query(query) = query?;
    let topic = find_topic(&state, id)?;
    let subtopics = state.catalog.subtopics_of(id, query.difficulty, None);
    info!("Retrieved topic '{}' with {} subtopics", topic.name, subtopics.len());
    Ok(Json(TopicWithSubtopics { topic, subtopics }))
}

// ── Analogies ────────────────────────────────────────────────────────────────

fn validate_request(request: &GenerationRequest) -> ApiResult<()> {
    if request.profession.trim().is_empty() {
        return Err(ApiError::unprocessable("profession must not be empty"));
    }
    if request.concept.trim().is_empty() {
        return Err(ApiError::unprocessable("concept must not be empty"));
    }
    if !(MIN_CREATIVITY..=MAX_CREATIVITY).contains(&request.creativity_level) {
        return Err(ApiError::unprocessable(format!(
            "creativity_level must be between {} and {}",
            MIN_CREATIVITY, MAX_CREATIVITY
        )));
    }
    if request.max_tokens == 0 || request.max_tokens > MAX_TOKENS_CEILING {
        return Err(ApiError::unprocessable(format!(
            "max_tokens must be between 1 and {}",
            MAX_TOKENS_CEILING
        )));
    }
    Ok(())
}

async fn quick_explain(
    State(state): State<AppState>,
    body: Result<Json<GenerationRequest>, JsonRejection>,
) -> ApiResult<Json<GenerationResult>> {
    let Json(request) = body?;
    validate_request(&request)?;
    info!(
        "Quick explanation: {} -> {} (tokens: {}, length: {})",
        request.profession, request.concept, request.max_tokens, request.response_length
    );

    state.engine.explain(&request).await.map(Json).map_err(|e| {
        error!("Quick explanation failed: {}", e);
        ApiError::new(
            axum::http::StatusCode::BAD_GATEWAY,
            format!("Failed to generate quick explanation: {}", e),
        )
    })
}

#[derive(Serialize)]
struct AnalogyHealth {
    status: &'static str,
    ai_service: &'static str,
    model: String,
    supported_professions: Vec<&'static str>,
}

async fn analogy_health(State(state): State<AppState>) -> Json<AnalogyHealth> {
    let ai_service = if state.engine.is_available().await {
        HEALTHY
    } else {
        "unhealthy"
    };
    Json(AnalogyHealth {
        status: HEALTHY,
        ai_service,
        model: state.engine.model().to_string(),
        supported_professions: prompt::supported_professions(),
    })
}

/// Hand-written analogy previews shown on the landing page.
#[derive(Debug, Serialize)]
struct DemoExample {
    profession: &'static str,
    concept: &'static str,
    analogy_title: &'static str,
    preview: &'static str,
    difficulty: DifficultyLevel,
    rating: f64,
}

const DEMO_EXAMPLES: &[DemoExample] = &[
    DemoExample {
        profession: "Gaming",
        concept: "Recursion",
        analogy_title: "Recursion is Like Dungeon Crawling with Nested Instances",
        preview: "Just like how some RPGs have dungeons that contain smaller dungeons, recursion is a function that calls itself to solve smaller versions of the same problem...",
        difficulty: DifficultyLevel::Intermediate,
        rating: 4.8,
    },
    DemoExample {
        profession: "Cooking",
        concept: "Binary Trees",
        analogy_title: "Binary Trees are Like Recipe Organization Systems",
        preview: "Imagine organizing your recipes where each main category can only have two subcategories - like 'Quick Meals' splitting into 'Under 15 min' and 'Under 30 min'...",
        difficulty: DifficultyLevel::Beginner,
        rating: 4.6,
    },
    DemoExample {
        profession: "Sports",
        concept: "Hash Tables",
        analogy_title: "Hash Tables Work Like Team Position Assignments",
        preview: "Think of assigning players to positions using their jersey numbers. A hash function is like a formula that determines which position a player goes to...",
        difficulty: DifficultyLevel::Intermediate,
        rating: 4.5,
    },
    DemoExample {
        profession: "Music",
        concept: "Dynamic Programming",
        analogy_title: "Dynamic Programming is Like Building Musical Arrangements",
        preview: "When composing a symphony, you don't rewrite the entire piece every time. You build upon previous sections, reusing themes and motifs...",
        difficulty: DifficultyLevel::Advanced,
        rating: 4.9,
    },
    DemoExample {
        profession: "Business",
        concept: "Graph Traversal",
        analogy_title: "Graph Traversal is Like Organizational Network Analysis",
        preview: "Imagine mapping out how information flows through your company. Graph traversal algorithms are like systematic ways to visit every department...",
        difficulty: DifficultyLevel::Intermediate,
        rating: 4.4,
    },
];

async fn analogy_examples() -> Json<&'static [DemoExample]> {
    Json(DEMO_EXAMPLES)
}
