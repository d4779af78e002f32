/// Hosted language-model client for WhisperBot chat and post suggestions
///
/// Both calls are plain HTTP passthroughs. Chat replies are cleaned of
/// reasoning traces before they reach users, and every failure degrades to a
/// canned reply instead of an error.
use crate::config::ChatConfig;
use crate::metrics::wall::{INFERENCE_REQUESTS_TOTAL, INFERENCE_REQUEST_DURATION_SECONDS};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const OFFLINE_REPLY: &str = "Sorry... I am Offline";
pub const NO_RESPONSE_REPLY: &str = "No response from the model.";
pub const NO_SUGGESTION_REPLY: &str = "Oops, I couldn't think of anything right now.";

const SYSTEM_PROMPT: &str = "You are WhisperBot. \
Always reply in a witty, concise way. \
Do not include <think> or explanations. \
Just return the final witty response.";

const SUGGEST_MAX_NEW_TOKENS: u32 = 50;
const SUGGEST_TEMPERATURE: f32 = 0.9;
const SUGGEST_TOP_P: f32 = 0.95;

lazy_static! {
    static ref THINK_BLOCK: Regex = Regex::new(r"(?is)<think>.*?</think>").expect("valid regex");
    // reply truncated by max_tokens before the trace closed
    static ref UNCLOSED_THINK: Regex = Regex::new(r"(?is)<think>.*$").expect("valid regex");
    static ref OKAY_PREAMBLE: Regex =
        Regex::new(r"(?i)^\s*okay\b[^\n]*?response\.").expect("valid regex");
    static ref BARE_OKAY: Regex = Regex::new(r"(?i)^\s*okay\b[,.!]?").expect("valid regex");
}

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("inference API key is not configured")]
    NotConfigured,

    #[error("inference request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("inference endpoint returned status {0}")]
    Status(u16),

    #[error("unexpected inference response: {0}")]
    Decode(String),
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: Option<String>,
}

/// Strip reasoning traces and filler preambles from a model reply.
pub fn clean_reply(raw: &str) -> String {
    let without_blocks = THINK_BLOCK.replace_all(raw, "");
    let without_think = UNCLOSED_THINK.replace(&without_blocks, "");

    let trimmed = if OKAY_PREAMBLE.is_match(&without_think) {
        OKAY_PREAMBLE.replace(&without_think, "")
    } else {
        BARE_OKAY.replace(&without_think, "")
    };

    trimmed.trim().to_string()
}

pub fn suggestion_prompt(topic: &str) -> String {
    format!("Suggest a funny anonymous post idea about {}", topic)
}

#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    config: ChatConfig,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self { http, config })
    }

    fn api_key(&self) -> Result<&str, ChatError> {
        self.config.api_key.as_deref().ok_or(ChatError::NotConfigured)
    }

    /// Ask the chat model for a reply to `message`
    pub async fn reply(&self, message: &str) -> Result<String, ChatError> {
        let api_key = self.api_key()?;
        let timer = INFERENCE_REQUEST_DURATION_SECONDS
            .with_label_values(&["chat"])
            .start_timer();

        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: message,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        timer.observe_duration();

        if !response.status().is_success() {
            return Err(ChatError::Status(response.status().as_u16()));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Decode(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default();

        let cleaned = clean_reply(&content);
        if cleaned.is_empty() {
            debug!("Chat model returned no usable content");
            return Ok(NO_RESPONSE_REPLY.to_string());
        }

        Ok(cleaned)
    }

    /// Like `reply`, but any failure becomes the offline reply
    pub async fn reply_or_fallback(&self, message: &str) -> String {
        match self.reply(message).await {
            Ok(reply) => {
                INFERENCE_REQUESTS_TOTAL
                    .with_label_values(&["chat", "ok"])
                    .inc();
                reply
            }
            Err(e) => {
                warn!(error = %e, "Chat completion failed; replying offline");
                INFERENCE_REQUESTS_TOTAL
                    .with_label_values(&["chat", "fallback"])
                    .inc();
                OFFLINE_REPLY.to_string()
            }
        }
    }

    /// Ask the text-generation model for a post idea about `topic`
    pub async fn suggest(&self, topic: &str) -> Result<String, ChatError> {
        let api_key = self.api_key()?;
        let prompt = suggestion_prompt(topic);
        let timer = INFERENCE_REQUEST_DURATION_SECONDS
            .with_label_values(&["suggestion"])
            .start_timer();

        let response = self
            .http
            .post(&self.config.suggest_api_url)
            .bearer_auth(api_key)
            .json(&GenerationRequest {
                inputs: &prompt,
                parameters: GenerationParameters {
                    max_new_tokens: SUGGEST_MAX_NEW_TOKENS,
                    temperature: SUGGEST_TEMPERATURE,
                    top_p: SUGGEST_TOP_P,
                },
            })
            .send()
            .await?;
        timer.observe_duration();

        if !response.status().is_success() {
            return Err(ChatError::Status(response.status().as_u16()));
        }

        let generated: Vec<GeneratedText> = response
            .json()
            .await
            .map_err(|e| ChatError::Decode(e.to_string()))?;

        let text = generated
            .into_iter()
            .next()
            .and_then(|g| g.generated_text)
            .unwrap_or_default();

        // text-generation endpoints echo the prompt before the continuation
        let suggestion = text.strip_prefix(prompt.as_str()).unwrap_or(&text).trim();
        if suggestion.is_empty() {
            return Err(ChatError::Decode("empty generation".to_string()));
        }

        Ok(suggestion.to_string())
    }

    pub async fn suggest_or_fallback(&self, topic: &str) -> String {
        match self.suggest(topic).await {
            Ok(suggestion) => {
                INFERENCE_REQUESTS_TOTAL
                    .with_label_values(&["suggestion", "ok"])
                    .inc();
                suggestion
            }
            Err(e) => {
                warn!(error = %e, "Suggestion generation failed");
                INFERENCE_REQUESTS_TOTAL
                    .with_label_values(&["suggestion", "fallback"])
                    .inc();
                NO_SUGGESTION_REPLY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_think_blocks_across_lines() {
        let raw = "<think>\nlet me reason\nabout this\n</think>\nCoffee is just bean soup.";
        assert_eq!(clean_reply(raw), "Coffee is just bean soup.");
    }

    #[test]
    fn removes_multiple_and_mixed_case_blocks() {
        let raw = "<THINK>a</THINK>Hi<think>b</think> there";
        assert_eq!(clean_reply(raw), "Hi there");
    }

    #[test]
    fn drops_unclosed_trace() {
        assert_eq!(clean_reply("Sure thing.<think>half a thought"), "Sure thing.");
        assert_eq!(clean_reply("<think>never finished"), "");
    }

    #[test]
    fn strips_okay_preamble_through_response() {
        let raw = "Okay, the user wants a witty response. Mondays are a bug, not a feature.";
        assert_eq!(clean_reply(raw), "Mondays are a bug, not a feature.");
    }

    #[test]
    fn strips_bare_okay() {
        assert_eq!(clean_reply("Okay, cats rule."), "cats rule.");
    }

    #[test]
    fn leaves_ordinary_replies_alone() {
        assert_eq!(clean_reply("  Okayish is fine.  "), "Okayish is fine.");
        assert_eq!(clean_reply("Pizza is a circle of trust."), "Pizza is a circle of trust.");
    }

    #[test]
    fn suggestion_prompt_mentions_topic() {
        assert_eq!(
            suggestion_prompt("exams"),
            "Suggest a funny anonymous post idea about exams"
        );
    }

    #[tokio::test]
    async fn missing_key_is_reported_and_falls_back() {
        let client = ChatClient::new(ChatConfig::default()).unwrap();
        assert!(matches!(client.reply("hi").await, Err(ChatError::NotConfigured)));
        assert_eq!(client.reply_or_fallback("hi").await, OFFLINE_REPLY);
        assert_eq!(client.suggest_or_fallback("cats").await, NO_SUGGESTION_REPLY);
    }
}
