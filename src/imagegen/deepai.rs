use serde::Deserialize;

use super::{ImageGenError, Provider};

#[derive(Deserialize)]
struct Text2ImgResponse {
    output_url: Option<String>,
}

pub(super) async fn generate(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    prompt: &str,
) -> Result<String, ImageGenError> {
    let fail = |detail: String| ImageGenError::failed(Provider::DeepAi, detail);

    let response = client
        .post(format!("{}/api/text2img", base_url))
        .header("Api-Key", api_key)
        .form(&[("text", prompt)])
        .send()
        .await
        .map_err(|e| fail(e.to_string()))?;

    let status = response.status();
    let data: Text2ImgResponse = response
        .json()
        .await
        .map_err(|e| fail(format!("{}: {}", status, e)))?;

    data.output_url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| fail(format!("{}: no output_url", status)))
}
