use serde::{Deserialize, Serialize};

use super::{ImageGenError, Provider};

#[derive(Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Deserialize)]
struct GeneratedImage {
    url: Option<String>,
}

pub(super) async fn generate(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    prompt: &str,
) -> Result<String, ImageGenError> {
    let fail = |detail: String| ImageGenError::failed(Provider::OpenAi, detail);

    let response = client
        .post(format!("{}/v1/images/generations", base_url))
        .bearer_auth(api_key)
        .json(&GenerationRequest {
            model: "dall-e-2",
            prompt,
            n: 1,
            size: "512x512",
        })
        .send()
        .await
        .map_err(|e| fail(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(fail(format!("{}: {}", status, body)));
    }

    let data: GenerationResponse = response.json().await.map_err(|e| fail(e.to_string()))?;
    data.data
        .into_iter()
        .next()
        .and_then(|image| image.url)
        .ok_or_else(|| fail("response had no image url".to_string()))
}
