//! Servidor web Axum para explorar o pipeline de mascaramento e a busca de
//! quase-duplicatas com colaboradores de demonstração (sem modelo carregado)

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use dejavu_core::{
    clean_ocr, CorpusArtifacts, DejavuError, FlatIpIndex, MaskOptions, MaskingPipeline, Retriever,
};

mod demo;

use demo::{HashedEmbedder, LexiconTagger};

/// Estado compartilhado da aplicação: os colaboradores de demonstração.
struct AppState {
    tagger: LexiconTagger,
    embedder: HashedEmbedder,
}

#[derive(Deserialize)]
struct CleanRequest {
    text: String,
    /// `true` (padrão): só hifenização e quebras de linha; `false`: também
    /// substituições de artefatos e o conjunto `remove`.
    #[serde(default)]
    basic: Option<bool>,
    /// Caracteres a remover, como uma string (ex: `"*~#"`).
    #[serde(default)]
    remove: Option<String>,
}

#[derive(Deserialize)]
struct MaskRequest {
    sentences: Vec<String>,
    #[serde(default)]
    generic_mask: bool,
    #[serde(default)]
    pre_clean: bool,
}

#[derive(Serialize)]
struct MaskResponse {
    masked: Vec<String>,
}

#[derive(Deserialize)]
struct SearchRequest {
    queries: Vec<String>,
    corpus: Vec<String>,
    #[serde(default)]
    k: Option<usize>,
    #[serde(default)]
    generic_mask: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let state = Arc::new(AppState {
        tagger: LexiconTagger::new(),
        embedder: HashedEmbedder::default(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/clean", post(clean_handler))
        .route("/mask", post(mask_handler))
        .route("/search", post(search_handler))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("🔎 Servidor déjà-vu iniciado em http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Normalização de OCR com mapa de deslocamentos
async fn clean_handler(Json(req): Json<CleanRequest>) -> impl IntoResponse {
    let remove: HashSet<char> = req.remove.unwrap_or_default().chars().collect();
    let cleaned = clean_ocr(&req.text, req.basic.unwrap_or(true), &remove);
    info!("limpeza: {} caracteres de entrada", cleaned.offsets.len());
    Json(cleaned)
}

/// Mascaramento de entidades em lote
async fn mask_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MaskRequest>,
) -> impl IntoResponse {
    let options = MaskOptions {
        generic_mask: req.generic_mask,
        ..MaskOptions::default()
    };
    let pipeline = MaskingPipeline::with_options(&state.tagger, options, req.pre_clean);
    info!("mascarando {} sentenças", req.sentences.len());
    match pipeline.mask_batch(&req.sentences) {
        Ok(masked) => Json(MaskResponse { masked }).into_response(),
        Err(err) => internal_error(err),
    }
}

/// Busca de candidatas a duplicata: mascara, embedda e consulta o índice
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> impl IntoResponse {
    if req.corpus.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Corpus vazio"})),
        )
            .into_response();
    }

    let options = MaskOptions {
        generic_mask: req.generic_mask,
        ..MaskOptions::default()
    };
    let retriever = Retriever::new(
        MaskingPipeline::with_options(&state.tagger, options, false),
        &state.embedder,
        FlatIpIndex,
    );

    let k = req.k.unwrap_or(1);
    info!(
        "busca: {} consultas contra {} sentenças (k = {k})",
        req.queries.len(),
        req.corpus.len()
    );
    match retriever.find_duplicates(&req.queries, &req.corpus, k, CorpusArtifacts::default()) {
        Ok(results) => Json(results).into_response(),
        Err(err) => internal_error(err),
    }
}

fn internal_error(err: DejavuError) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": err.to_string()})),
    )
        .into_response()
}
