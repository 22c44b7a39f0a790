use clap::Args;
use neomanual::client::ImageClient;
use neomanual::config::Config;

use super::{with_draft, CommandResult};

/// Generate an image from a prompt and add it to the current page
#[derive(Args)]
pub struct GenerateCommand {
    /// What the image should show
    pub prompt: String,

    /// stability (default), openai, deepai or replicate
    #[arg(long, short)]
    pub provider: Option<String>,

    /// Replace this block with the generated image
    #[arg(long)]
    pub replace: Option<String>,

    /// Only print the image URL, leave the draft alone
    #[arg(long)]
    pub print_only: bool,
}

impl GenerateCommand {
    pub async fn run(&self, config: &Config) -> CommandResult {
        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            return Err("Prompt is required".into());
        }

        println!("Generating image...");
        let client = ImageClient::new(&config.image_server_url.value);
        let image = client.generate(prompt, self.provider.as_deref()).await?;

        if self.print_only {
            println!("{}", image);
            return Ok(());
        }

        let id = with_draft(config, |editor| {
            Ok(editor.insert_generated_image(image.as_str(), prompt, self.replace.as_deref())?)
        })?;
        println!("Added generated image block {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::load_editor;
    use crate::commands::testing::test_config;
    use axum::{routing::post, Json, Router};
    use neomanual_core::Block;
    use serde_json::json;

    async fn fake_server() -> String {
        let app = Router::new().route(
            "/generate-image",
            post(|| async { Json(json!({ "image": "data:image/png;base64,AAAA" })) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_generated_image_is_inserted() {
        let (mut config, _temp_dir) = test_config();
        config.image_server_url.value = fake_server().await;

        let command = GenerateCommand {
            prompt: "a blue hedgehog".to_string(),
            provider: None,
            replace: None,
            print_only: false,
        };
        command.run(&config).await.unwrap();

        let editor = load_editor(&config).unwrap();
        match &editor.current_page().unwrap().blocks[0] {
            Block::Image(image) => {
                assert_eq!(image.src, "data:image/png;base64,AAAA");
                assert_eq!(image.alt_text.as_deref(), Some("a blue hedgehog"));
            }
            other => panic!("expected image block, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected() {
        let (config, _temp_dir) = test_config();
        let command = GenerateCommand {
            prompt: "  ".to_string(),
            provider: None,
            replace: None,
            print_only: true,
        };
        let err = command.run(&config).await.unwrap_err();
        assert_eq!(err.to_string(), "Prompt is required");
    }
}
