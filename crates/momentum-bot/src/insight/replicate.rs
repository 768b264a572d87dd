//! Replicate-backed insight generator
//!
//! Creates a prediction against the configured model, polls until it reaches
//! a terminal state, then strips the model's reasoning markup. Any failure
//! after the request is accepted turns into an error-text [`Insight`] with
//! the [`ERROR_JOB_ID`] sentinel rather than an `Err`, so a billed request
//! always produces something to show and to log.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{BotError, Result};
use crate::insight::prompts::{build_news_summary_prompt, build_stock_analysis_prompt};
use crate::insight::{ERROR_JOB_ID, Insight, InsightGenerator};
use crate::market::snapshot::{NewsHeadline, StockSnapshot};

const BASE_URL: &str = "https://api.replicate.com/v1";
const POLL_INTERVAL: Duration = Duration::from_secs(2);

const TEMPERATURE: f64 = 0.75;
const MAX_TOKENS: u32 = 4096;
const TOP_P: f64 = 0.9;

#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: String,
    #[serde(default)]
    output: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl Prediction {
    fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "succeeded" | "failed" | "canceled")
    }

    /// Flatten the output field, which is either a string or a list of chunks
    fn output_text(&self) -> String {
        match &self.output {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Array(chunks)) => chunks
                .iter()
                .filter_map(serde_json::Value::as_str)
                .collect(),
            _ => String::new(),
        }
    }
}

fn think_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<think>.*?</think>").expect("valid think pattern"))
}

fn blank_run_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\n{3,}").expect("valid blank-run pattern"))
}

/// Remove `<think>` reasoning blocks and collapse the leftover whitespace
pub fn strip_think_blocks(text: &str) -> String {
    let without = think_pattern().replace_all(text, "");
    blank_run_pattern()
        .replace_all(&without, "\n\n")
        .trim()
        .to_string()
}

/// Insight generator backed by the Replicate predictions API
pub struct ReplicateClient {
    client: Client,
    token: String,
    model: String,
    generation_timeout: Duration,
}

impl ReplicateClient {
    pub fn new(
        token: impl Into<String>,
        model: impl Into<String>,
        request_timeout: Duration,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(request_timeout)
                .build()
                .unwrap_or_default(),
            token: token.into(),
            model: model.into(),
            generation_timeout,
        }
    }

    async fn create_prediction(&self, prompt: &str) -> Result<Prediction> {
        let url = format!("{BASE_URL}/models/{}/predictions", self.model);
        let body = json!({
            "input": {
                "prompt": prompt,
                "temperature": TEMPERATURE,
                "max_tokens": MAX_TOKENS,
                "top_p": TOP_P,
            }
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(BotError::Api(format!(
                "Replicate API error {status}: {detail}"
            )));
        }
        Ok(response.json().await?)
    }

    async fn get_prediction(&self, id: &str) -> Result<Prediction> {
        let url = format!("{BASE_URL}/predictions/{id}");
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(BotError::Api(format!(
                "Replicate API error {status}: {detail}"
            )));
        }
        Ok(response.json().await?)
    }

    async fn poll_until_terminal(&self, mut prediction: Prediction) -> Result<Prediction> {
        let deadline = tokio::time::Instant::now() + self.generation_timeout;
        while !prediction.is_terminal() {
            if tokio::time::Instant::now() >= deadline {
                return Err(BotError::Api(format!(
                    "prediction {} timed out after {:?}",
                    prediction.id, self.generation_timeout
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
            prediction = self.get_prediction(&prediction.id).await?;
            debug!(id = %prediction.id, status = %prediction.status, "prediction poll");
        }
        Ok(prediction)
    }

    async fn generate(&self, prompt: &str) -> Insight {
        let outcome = async {
            let prediction = self.create_prediction(prompt).await?;
            self.poll_until_terminal(prediction).await
        }
        .await;

        match outcome {
            Ok(prediction) if prediction.status == "succeeded" => Insight {
                text: strip_think_blocks(&prediction.output_text()),
                job_id: prediction.id,
            },
            Ok(prediction) => {
                let detail = prediction
                    .error
                    .map_or_else(|| prediction.status.clone(), |e| e.to_string());
                warn!(id = %prediction.id, %detail, "prediction did not succeed");
                Insight {
                    text: format!("Error generating insight: {detail}"),
                    job_id: ERROR_JOB_ID.to_string(),
                }
            }
            Err(error) => {
                warn!(%error, "prediction request failed");
                Insight {
                    text: format!("Error generating insight: {error}"),
                    job_id: ERROR_JOB_ID.to_string(),
                }
            }
        }
    }
}

#[async_trait]
impl InsightGenerator for ReplicateClient {
    async fn generate_analysis(&self, snapshot: &StockSnapshot) -> Result<Insight> {
        let prompt = build_stock_analysis_prompt(snapshot);
        Ok(self.generate(&prompt).await)
    }

    async fn summarize_news(&self, headlines: &[NewsHeadline]) -> Result<Insight> {
        let prompt = build_news_summary_prompt(headlines);
        Ok(self.generate(&prompt).await)
    }
}
