//! Core `ProviderClient` trait and the `HttpProvider` implementation.
//!
//! `HttpProvider` speaks two dialects, picked per call from
//! [`ProviderConfig::kind`]:
//!
//! | Operation    | Local                  | OpenAI-compatible             |
//! |--------------|------------------------|-------------------------------|
//! | complete     | `POST /api/generate`   | `POST /v1/chat/completions`   |
//! | list models  | `GET /api/tags`        | `GET /v1/models`              |
//! | health probe | `GET /api/tags`        | `GET /v1/models`              |
//!
//! All connection details come from the [`ProviderConfig`] passed to each
//! call; the client itself only owns the connection pool.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::{ProviderConfig, ProviderKind};

use super::wire::{self, ChatRequest, GenerateRequest};

// ---------------------------------------------------------------------------
// ProviderError
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the model backend.
///
/// Backend-specific codes are not preserved; each variant carries a
/// human-readable message for the log.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Connection, DNS, TLS or timeout failure.
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    #[error("API error: {0}")]
    Protocol(String),

    /// A successful response whose body was not the expected JSON.
    #[error("failed to parse API response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Transport("request timed out".into())
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ProviderClient trait
// ---------------------------------------------------------------------------

/// Uniform access to a language-model backend.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn ProviderClient>` between the pipeline and the status monitor.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Names of the models the backend offers.
    async fn list_models(&self, settings: &ProviderConfig) -> Result<Vec<String>, ProviderError>;

    /// `Ok(())` when the backend answers its listing endpoint successfully.
    async fn probe_health(&self, settings: &ProviderConfig) -> Result<(), ProviderError>;

    /// Run `prompt` against `settings.model` and return the trimmed reply.
    async fn complete(&self, settings: &ProviderConfig, prompt: &str)
        -> Result<String, ProviderError>;
}

// ---------------------------------------------------------------------------
// HttpProvider
// ---------------------------------------------------------------------------

/// `reqwest`-backed [`ProviderClient`] for both API dialects.
#[derive(Debug, Clone, Default)]
pub struct HttpProvider {
    client: reqwest::Client,
}

impl HttpProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared request executor.
    ///
    /// Serialises `body` once, sends it with an explicit `Content-Length`,
    /// and hands the status and raw body to [`wire::interpret_response`].
    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        settings: &ProviderConfig,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, ProviderError> {
        let url = format!("{}{}", settings.trimmed_base_url(), path);
        let mut req = self.client.request(method.clone(), &url);

        if settings.kind == ProviderKind::OpenAiCompatible {
            req = req.bearer_auth(settings.api_key.as_deref().unwrap_or(""));
        }

        if settings.timeout_secs > 0 {
            req = req.timeout(Duration::from_secs(settings.timeout_secs));
        }

        if let Some(body) = body {
            let bytes = serde_json::to_vec(body).map_err(|e| ProviderError::Parse(e.to_string()))?;
            req = req
                .header(CONTENT_TYPE, "application/json")
                .header(CONTENT_LENGTH, bytes.len())
                .body(bytes);
        }

        log::debug!("provider: {method} {url}");

        let response = req.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        wire::interpret_response(status, &text).map_err(|e| {
            log::warn!("provider: {method} {url} -> {status}: {e}");
            e
        })
    }

    async fn get(&self, settings: &ProviderConfig, path: &str) -> Result<Value, ProviderError> {
        self.execute::<Value>(Method::GET, settings, path, None).await
    }
}

#[async_trait]
impl ProviderClient for HttpProvider {
    async fn list_models(&self, settings: &ProviderConfig) -> Result<Vec<String>, ProviderError> {
        match settings.kind {
            ProviderKind::Local => wire::tag_names(self.get(settings, "/api/tags").await?),
            ProviderKind::OpenAiCompatible => {
                wire::model_ids(self.get(settings, "/v1/models").await?)
            }
        }
    }

    async fn probe_health(&self, settings: &ProviderConfig) -> Result<(), ProviderError> {
        let path = match settings.kind {
            ProviderKind::Local => "/api/tags",
            ProviderKind::OpenAiCompatible => "/v1/models",
        };
        self.get(settings, path).await.map(|_| ())
    }

    async fn complete(
        &self,
        settings: &ProviderConfig,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        match settings.kind {
            ProviderKind::Local => {
                let body = GenerateRequest::new(&settings.model, prompt);
                let value = self
                    .execute(Method::POST, settings, "/api/generate", Some(&body))
                    .await?;
                wire::generate_text(value)
            }
            ProviderKind::OpenAiCompatible => {
                let body = ChatRequest::new(&settings.model, prompt);
                let value = self
                    .execute(Method::POST, settings, "/v1/chat/completions", Some(&body))
                    .await?;
                wire::chat_text(value)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;

    /// Serve `router` on an ephemeral port and return its base URL.
    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn local(base_url: &str) -> ProviderConfig {
        ProviderConfig {
            kind: ProviderKind::Local,
            base_url: base_url.into(),
            model: "llama3".into(),
            ..ProviderConfig::default()
        }
    }

    fn remote(base_url: &str) -> ProviderConfig {
        ProviderConfig {
            kind: ProviderKind::OpenAiCompatible,
            base_url: base_url.into(),
            api_key: Some("sk-test".into()),
            model: "gpt-4o-mini".into(),
            ..ProviderConfig::default()
        }
    }

    type Seen = Arc<Mutex<Option<(HeaderMap, Value)>>>;

    #[tokio::test]
    async fn local_complete_posts_generate_and_trims() {
        let seen: Seen = Arc::default();
        let seen_in = Arc::clone(&seen);
        let router = Router::new().route(
            "/api/generate",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let seen = Arc::clone(&seen_in);
                async move {
                    *seen.lock().unwrap() = Some((headers, body));
                    Json(json!({ "response": " Bonjour ", "done": true }))
                }
            }),
        );
        // Trailing slash must be stripped before the path is appended.
        let base = format!("{}/", spawn_server(router).await);

        let text = HttpProvider::new()
            .complete(&local(&base), "Translate: Hello")
            .await
            .unwrap();
        assert_eq!(text, "Bonjour");

        let (headers, body) = seen.lock().unwrap().take().expect("request seen");
        assert_eq!(
            body,
            json!({ "model": "llama3", "prompt": "Translate: Hello", "stream": false, "keep_alive": 0 })
        );
        assert!(headers.get("authorization").is_none());
        let length: usize = headers["content-length"].to_str().unwrap().parse().unwrap();
        assert_eq!(length, serde_json::to_vec(&body).unwrap().len());
    }

    #[tokio::test]
    async fn remote_complete_sends_bearer_and_reads_choice() {
        let seen: Seen = Arc::default();
        let seen_in = Arc::clone(&seen);
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let seen = Arc::clone(&seen_in);
                async move {
                    *seen.lock().unwrap() = Some((headers, body));
                    Json(json!({
                        "choices": [{ "message": { "role": "assistant", "content": "\nHola\n" } }]
                    }))
                }
            }),
        );
        let base = spawn_server(router).await;

        let text = HttpProvider::new()
            .complete(&remote(&base), "Translate: Hello")
            .await
            .unwrap();
        assert_eq!(text, "Hola");

        let (headers, body) = seen.lock().unwrap().take().expect("request seen");
        assert_eq!(headers["authorization"], "Bearer sk-test");
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(
            body["messages"],
            json!([{ "role": "user", "content": "Translate: Hello" }])
        );
    }

    #[tokio::test]
    async fn remote_error_body_surfaces_nested_message() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": { "message": "invalid_api_key" } })),
                )
            }),
        );
        let base = spawn_server(router).await;

        let err = HttpProvider::new()
            .complete(&remote(&base), "x")
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::Protocol("invalid_api_key".into()));
    }

    #[tokio::test]
    async fn non_json_error_body_reports_status_code() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "Unauthorized") }),
        );
        let base = spawn_server(router).await;

        let err = HttpProvider::new()
            .complete(&remote(&base), "x")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ProviderError::Protocol("Request Failed. Status Code: 401".into())
        );
    }

    #[tokio::test]
    async fn remote_error_object_with_ok_status_is_parse_error() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({ "error": { "message": "quota exceeded" } })) }),
        );
        let base = spawn_server(router).await;

        let err = HttpProvider::new()
            .complete(&remote(&base), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn malformed_success_body_is_parse_error() {
        let router = Router::new().route("/api/generate", post(|| async { "not json" }));
        let base = spawn_server(router).await;

        let err = HttpProvider::new()
            .complete(&local(&base), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn list_models_for_both_dialects() {
        let router = Router::new()
            .route(
                "/api/tags",
                get(|| async { Json(json!({ "models": [{ "name": "llama3" }] })) }),
            )
            .route(
                "/v1/models",
                get(|headers: HeaderMap| async move {
                    if headers.get("authorization").is_some() {
                        (StatusCode::OK, Json(json!({ "data": [{ "id": "gpt-4o-mini" }] })))
                    } else {
                        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "no key" })))
                    }
                }),
            );
        let base = spawn_server(router).await;
        let provider = HttpProvider::new();

        assert_eq!(provider.list_models(&local(&base)).await.unwrap(), vec!["llama3"]);
        assert_eq!(
            provider.list_models(&remote(&base)).await.unwrap(),
            vec!["gpt-4o-mini"]
        );
    }

    #[tokio::test]
    async fn probe_health_follows_listing_endpoint() {
        let router = Router::new().route("/api/tags", get(|| async { Json(json!({})) }));
        let base = spawn_server(router).await;
        let provider = HttpProvider::new();

        assert!(provider.probe_health(&local(&base)).await.is_ok());
        // No `/v1/models` route: axum answers 404 with an empty body.
        assert!(matches!(
            provider.probe_health(&remote(&base)).await,
            Err(ProviderError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        // Port 9 (discard) is essentially never listening on loopback.
        let err = HttpProvider::new()
            .probe_health(&local("http://127.0.0.1:9"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)), "got {err:?}");
    }

    /// `HttpProvider` must be usable as `dyn ProviderClient`.
    #[test]
    fn provider_is_object_safe() {
        let provider: Box<dyn ProviderClient> = Box::new(HttpProvider::new());
        drop(provider);
    }
}
