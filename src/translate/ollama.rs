use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::TranslateConfig;
use crate::error::{Result, SubgenError};
use super::TextTranslator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub response: String,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    pub text: String,
}

/// Line-by-line translation through an Ollama server
pub struct OllamaTranslator {
    client: Client,
    config: TranslateConfig,
}

impl OllamaTranslator {
    pub fn new(config: TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self { client, config })
    }

    /// Translate one line, retrying failed requests with exponential backoff
    async fn translate_line(&self, line: &str, source_language: &str, target_language: &str) -> Result<String> {
        let mut delay = self.config.initial_retry_delay;
        let mut attempt = 0;

        loop {
            match self.translate_text(line, source_language, target_language).await {
                Ok(translation) => return Ok(translation),
                Err(e) if attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(
                        "Translation attempt {} failed: {}. Retrying in {:.1}s",
                        attempt, e, delay
                    );
                    tokio::time::sleep(Duration::from_secs_f64(delay)).await;
                    delay *= self.config.backoff_factor;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Perform the actual translation using Ollama with JSON format
    pub async fn translate_text(&self, text: &str, source_language: &str, target_language: &str) -> Result<String> {
        let request = TranslationRequest {
            model: self.config.model.clone(),
            prompt: build_translation_prompt(text, source_language, target_language),
            stream: false,
            format: "json".to_string(),
        };

        let url = format!("{}/api/generate", self.config.endpoint);

        debug!("Sending translation request to: {}", url);

        let response = self.client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SubgenError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SubgenError::Translation(format!(
                "Ollama API error {}: {}", status, error_text
            )));
        }

        let translation_response: TranslationResponse = response.json().await
            .map_err(|e| SubgenError::Translation(format!("Failed to parse response: {}", e)))?;

        extract_translation(&translation_response.response)
    }
}

#[async_trait]
impl TextTranslator for OllamaTranslator {
    async fn translate(&self, text: &str, source_language: &str, target_language: &str) -> Result<String> {
        let lines: Vec<&str> = text.lines().collect();
        info!("Translating {} lines from {} to {}", lines.len(), source_language, target_language);

        let mut translated = String::new();
        for (idx, line) in lines.iter().enumerate() {
            if !line.trim().is_empty() {
                debug!("Translating line {}/{}: {}", idx + 1, lines.len(), line);
                let translation = self.translate_line(line, source_language, target_language).await?;
                // One output line per input line
                translated.push_str(&translation.lines().map(str::trim).collect::<Vec<_>>().join(" "));
            }
            translated.push('\n');
        }

        info!("Translated {} characters", text.chars().count());
        Ok(translated)
    }
}

/// Pull the translation out of the model's reply
pub fn extract_translation(raw_response: &str) -> Result<String> {
    let raw_response = raw_response.trim();
    debug!("Raw Ollama response: {}", raw_response);

    if raw_response.is_empty() {
        return Err(SubgenError::Translation("Empty translation received".to_string()));
    }

    if let Ok(result) = serde_json::from_str::<TranslationResult>(raw_response) {
        let text = result.text.trim();
        if text.is_empty() {
            return Err(SubgenError::Translation("Empty translation received".to_string()));
        }
        return Ok(text.to_string());
    }

    Ok(clean_translation_response(raw_response))
}

/// Build translation prompt, using JSON format
fn build_translation_prompt(text: &str, source_language: &str, target_language: &str) -> String {
    let source_name = language_code_to_name(source_language);
    let target_name = language_code_to_name(target_language);

    format!(
        "You are a professional subtitle translator.\n\
         \n\
         CRITICAL: You must translate the text from {} to {} ONLY. Do not translate to any other language.\n\
         The target language is: {} (language code: {})\n\
         The text is one subtitle line and may be an incomplete sentence; keep it a single line.\n\
         \n\
         Return ONLY the translation in JSON format as {{\"text\":\"your {} translation here\"}}.\n\
         Do not include any explanations, alternatives, or text in other languages.\n\
         \n\
         Text to translate: \"{}\"\n",
        source_name, target_name, target_name, target_language, target_name, text
    )
}

/// Convert language code to full language name for clearer prompts
fn language_code_to_name(code: &str) -> String {
    // "de_DE" and "de-DE" carry the language in the first part
    let language = code.split(['_', '-']).next().unwrap_or(code).to_lowercase();
    match language.as_str() {
        "en" => "English".to_string(),
        "de" => "German".to_string(),
        "fr" => "French".to_string(),
        "es" => "Spanish".to_string(),
        "it" => "Italian".to_string(),
        "pt" => "Portuguese".to_string(),
        "nl" => "Dutch".to_string(),
        "pl" => "Polish".to_string(),
        "ru" => "Russian".to_string(),
        "uk" => "Ukrainian".to_string(),
        "tr" => "Turkish".to_string(),
        "ar" => "Arabic".to_string(),
        "hi" => "Hindi".to_string(),
        "ja" => "Japanese".to_string(),
        "ko" => "Korean".to_string(),
        "zh" => "Chinese".to_string(),
        "sv" => "Swedish".to_string(),
        "da" => "Danish".to_string(),
        "no" => "Norwegian".to_string(),
        "fi" => "Finnish".to_string(),
        _ => code.to_string(),
    }
}

/// Clean up translation response to extract just the translation
fn clean_translation_response(response: &str) -> String {
    let lines: Vec<&str> = response.lines().collect();

    for &line in &lines {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with("Here are") ||
           trimmed.starts_with("Here is") ||
           trimmed.starts_with("Option") ||
           trimmed.starts_with("**Option") ||
           trimmed.starts_with("Translation:") {
            continue;
        }

        if trimmed.starts_with("**") && trimmed.ends_with("**") {
            continue;
        }

        return trimmed.trim_matches('"').to_string();
    }

    response.trim().to_string()
}

/// Check if Ollama is available and the model is loaded
pub async fn check_ollama_availability(endpoint: &str, model: &str) -> Result<()> {
    let client = Client::new();
    let url = format!("{}/api/show", endpoint);

    let request = json!({
        "name": model
    });

    let response = client
        .post(&url)
        .json(&request)
        .send()
        .await
        .map_err(|e| SubgenError::Translation(format!("Failed to connect to Ollama: {}", e)))?;

    if response.status().is_success() {
        info!("Ollama model '{}' is available", model);
        Ok(())
    } else {
        Err(SubgenError::Translation(format!(
            "Ollama model '{}' not found. Please pull the model first: ollama pull {}",
            model, model
        )))
    }
}
