//! Replicate predictions are asynchronous: a prediction is created, then its
//! status URL is polled until it succeeds, fails, or attempts run out.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ImageGenError, PollSettings, Provider};

/// cjwbw/stable-diffusion
const MODEL_VERSION: &str = "db21e45e10e0e7d49c0a2de2520b6fb10ee246e89194ae0130f356a02a0b8c08";

#[derive(Serialize)]
struct PredictionRequest<'a> {
    version: &'a str,
    input: PredictionInput<'a>,
}

#[derive(Serialize)]
struct PredictionInput<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    urls: Option<PredictionUrls>,
    #[serde(default)]
    output: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    get: Option<String>,
}

impl Prediction {
    /// First output image; the model returns a list of URLs.
    fn first_output(&self) -> Option<String> {
        match self.output.as_ref()? {
            Value::Array(items) => items.first()?.as_str().map(str::to_string),
            Value::String(url) => Some(url.clone()),
            _ => None,
        }
    }
}

fn token_header(token: &str) -> String {
    format!("Token {}", token)
}

pub(super) async fn generate(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    prompt: &str,
    poll: PollSettings,
) -> Result<String, ImageGenError> {
    let fail = |detail: String| ImageGenError::failed(Provider::Replicate, detail);

    let started: Prediction = client
        .post(format!("{}/v1/predictions", base_url))
        .header(reqwest::header::AUTHORIZATION, token_header(token))
        .json(&PredictionRequest {
            version: MODEL_VERSION,
            input: PredictionInput { prompt },
        })
        .send()
        .await
        .map_err(|e| fail(e.to_string()))?
        .json()
        .await
        .map_err(|e| fail(e.to_string()))?;

    let status_url = started
        .urls
        .and_then(|urls| urls.get)
        .ok_or_else(|| fail("Failed to initiate prediction".to_string()))?;

    for attempt in 1..=poll.max_attempts {
        tokio::time::sleep(poll.interval).await;

        let prediction: Prediction = client
            .get(&status_url)
            .header(reqwest::header::AUTHORIZATION, token_header(token))
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?
            .json()
            .await
            .map_err(|e| fail(e.to_string()))?;

        let status = prediction.status.as_deref().unwrap_or("unknown");
        tracing::debug!(attempt, status, "Polled replicate prediction");

        match status {
            "succeeded" => {
                return prediction
                    .first_output()
                    .ok_or_else(|| fail("prediction succeeded without output".to_string()));
            }
            "failed" | "canceled" => {
                return Err(fail(format!("prediction {}", status)));
            }
            _ => {}
        }
    }

    Err(ImageGenError::Timeout {
        attempts: poll.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagegen::testing::spawn_fake;
    use axum::{extract::State, http::HeaderMap, routing::get, routing::post, Json, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Clone)]
    struct FakeState {
        polls: Arc<AtomicU32>,
        /// Status reported once `ready_after` polls have happened.
        final_status: &'static str,
        ready_after: u32,
    }

    async fn status(State(state): State<FakeState>) -> Json<Value> {
        let polls = state.polls.fetch_add(1, Ordering::SeqCst) + 1;
        if polls < state.ready_after {
            return Json(json!({ "status": "processing" }));
        }
        match state.final_status {
            "succeeded" => Json(json!({
                "status": "succeeded",
                "output": ["https://replicate.example/out-0.png"]
            })),
            other => Json(json!({ "status": other })),
        }
    }

    /// Starts a fake whose create endpoint points at its own status route.
    async fn fake(final_status: &'static str, ready_after: u32) -> (String, Arc<AtomicU32>) {
        let polls = Arc::new(AtomicU32::new(0));
        let state = FakeState {
            polls: polls.clone(),
            final_status,
            ready_after,
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let status_url = format!("{}/v1/predictions/p1", base);

        let app = Router::new()
            .route(
                "/v1/predictions",
                post(move |headers: HeaderMap, Json(body): Json<Value>| {
                    let status_url = status_url.clone();
                    async move {
                        assert_eq!(headers["authorization"], "Token r8-test");
                        assert_eq!(body["version"], MODEL_VERSION);
                        assert_eq!(body["input"]["prompt"], "a spaceship");
                        Json(json!({
                            "id": "p1",
                            "status": "starting",
                            "urls": { "get": status_url }
                        }))
                    }
                }),
            )
            .route("/v1/predictions/p1", get(status))
            .with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (base, polls)
    }

    fn fast_poll(max_attempts: u32) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(5),
            max_attempts,
        }
    }

    #[tokio::test]
    async fn test_polls_until_succeeded() {
        let (base, polls) = fake("succeeded", 3).await;

        let url = generate(&reqwest::Client::new(), &base, "r8-test", "a spaceship", fast_poll(10))
            .await
            .unwrap();

        assert_eq!(url, "https://replicate.example/out-0.png");
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failed_status_stops_polling() {
        let (base, polls) = fake("failed", 2).await;

        let err = generate(&reqwest::Client::new(), &base, "r8-test", "a spaceship", fast_poll(10))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Replicate image generation failed");
        assert_eq!(polls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_times_out_after_max_attempts() {
        let (base, polls) = fake("succeeded", 100).await;

        let err = generate(&reqwest::Client::new(), &base, "r8-test", "a spaceship", fast_poll(4))
            .await
            .unwrap_err();

        assert!(matches!(err, ImageGenError::Timeout { attempts: 4 }));
        assert_eq!(err.to_string(), "Replicate image generation failed");
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(polls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_missing_status_url_fails() {
        let app = Router::new().route(
            "/v1/predictions",
            post(|| async { Json(json!({ "detail": "Invalid version" })) }),
        );
        let base = spawn_fake(app).await;

        let result =
            generate(&reqwest::Client::new(), &base, "r8-test", "x", fast_poll(1)).await;
        assert!(matches!(
            result,
            Err(ImageGenError::Failed { provider: Provider::Replicate, .. })
        ));
    }

    #[test]
    fn test_first_output_accepts_string() {
        let prediction: Prediction =
            serde_json::from_value(json!({ "status": "succeeded", "output": "https://x/y.png" }))
                .unwrap();
        assert_eq!(prediction.first_output().as_deref(), Some("https://x/y.png"));
    }
}
