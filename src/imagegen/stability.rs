use serde::{Deserialize, Serialize};

use super::{ImageGenError, Provider};

const MODEL: &str = "stable-diffusion-xl-1024-v1-0";

#[derive(Serialize)]
struct TextPrompt<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct TextToImageRequest<'a> {
    text_prompts: Vec<TextPrompt<'a>>,
    cfg_scale: u32,
    height: u32,
    width: u32,
    samples: u32,
    steps: u32,
}

#[derive(Deserialize)]
struct TextToImageResponse {
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

#[derive(Deserialize)]
struct Artifact {
    base64: Option<String>,
}

pub(super) async fn generate(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    prompt: &str,
) -> Result<String, ImageGenError> {
    let fail = |detail: String| ImageGenError::failed(Provider::Stability, detail);

    let response = client
        .post(format!("{}/v1/generation/{}/text-to-image", base_url, MODEL))
        .bearer_auth(api_key)
        .header(reqwest::header::ACCEPT, "application/json")
        .json(&TextToImageRequest {
            text_prompts: vec![TextPrompt { text: prompt }],
            cfg_scale: 7,
            height: 1024,
            width: 1024,
            samples: 1,
            steps: 30,
        })
        .send()
        .await
        .map_err(|e| fail(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(fail(format!("{}: {}", status, body)));
    }

    let data: TextToImageResponse = response.json().await.map_err(|e| fail(e.to_string()))?;
    data.artifacts
        .into_iter()
        .next()
        .and_then(|artifact| artifact.base64)
        .map(|image| format!("data:image/png;base64,{}", image))
        .ok_or_else(|| fail("response had no artifacts".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagegen::testing::spawn_fake;
    use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_returns_data_uri() {
        let app = Router::new().route(
            "/v1/generation/stable-diffusion-xl-1024-v1-0/text-to-image",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer sk-test");
                assert_eq!(body["text_prompts"][0]["text"], "a castle");
                assert_eq!(body["cfg_scale"], 7);
                assert_eq!(body["steps"], 30);
                Json(json!({ "artifacts": [{ "base64": "iVBORw0" }] }))
            }),
        );
        let base = spawn_fake(app).await;

        let image = generate(&reqwest::Client::new(), &base, "sk-test", "a castle")
            .await
            .unwrap();
        assert_eq!(image, "data:image/png;base64,iVBORw0");
    }

    #[tokio::test]
    async fn test_error_status_fails() {
        let app = Router::new().route(
            "/v1/generation/stable-diffusion-xl-1024-v1-0/text-to-image",
            post(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "message": "bad key" }))) }),
        );
        let base = spawn_fake(app).await;

        let err = generate(&reqwest::Client::new(), &base, "sk-test", "a castle")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Stability image generation failed.");
    }

    #[tokio::test]
    async fn test_missing_artifacts_fails() {
        let app = Router::new().route(
            "/v1/generation/stable-diffusion-xl-1024-v1-0/text-to-image",
            post(|| async { Json(json!({ "artifacts": [] })) }),
        );
        let base = spawn_fake(app).await;

        let result = generate(&reqwest::Client::new(), &base, "sk-test", "a castle").await;
        assert!(matches!(
            result,
            Err(ImageGenError::Failed { provider: Provider::Stability, .. })
        ));
    }
}
