use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::advisor::Advisor;
use crate::error::AdvisorError;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Google Gemini text-generation client.
/// Authenticates via the x-goog-api-key header. Constructed once at startup
/// and reused; requests carry an explicit timeout so a slow model can never
/// stall a scan.
pub struct GeminiAdvisor {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiAdvisor {
    /// Create from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, AdvisorError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| AdvisorError::Config("GEMINI_API_KEY not set".into()))?;
        Ok(Self::new(api_key, None, None))
    }

    /// Create with explicit credentials and optional model / base URL
    /// overrides (the latter for testing).
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("failed to build reqwest client"),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url.unwrap_or_else(|| GEMINI_BASE_URL.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    /// First candidate's text, trimmed. Safety-blocked or empty replies
    /// come back without candidates or parts.
    fn into_text(self) -> Option<String> {
        let candidate = self.candidates?.into_iter().next()?;
        let part = candidate.content?.parts.into_iter().next()?;
        let text = part.text.trim().to_string();
        if text.is_empty() { None } else { Some(text) }
    }
}

#[async_trait]
impl Advisor for GeminiAdvisor {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, AdvisorError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::Api {
                status,
                message: body,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AdvisorError::Parse(format!("failed to parse response: {e}")))?;

        body.into_text().ok_or(AdvisorError::Empty)
    }
}
