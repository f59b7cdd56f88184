use std::process::Command;

use crate::{
    foundation::config::CaptionConfig,
    foundation::error::{FanframeError, FanframeResult},
    model::frame::Frame,
    services::process::run_with_stdin,
};

/// Shown when the endpoint rejects the request without an error message.
pub const FALLBACK_CREDITS_EXHAUSTED: &str = "Credits Exhausted";
/// Shown when the model reply is not a JSON array.
pub const FALLBACK_UNEXPECTED_FORMAT: &str = "Unexpected response format";
/// Shown when the model replies with an empty array.
pub const FALLBACK_NO_SUGGESTIONS: &str = "No suggestions available.";
/// Shown when the endpoint could not be reached at all.
pub const FALLBACK_UNEXPECTED_ERROR: &str = "An unexpected error occurred.";

/// Characters of the frame data URL embedded in the prompt.
const PROMPT_IMAGE_CHARS: usize = 50;

/// Raw HTTP reply from a caption endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptionResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl CaptionResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Caption suggestion collaborator: sends a prompt, returns the raw reply.
pub trait CaptionService: Send + Sync {
    /// Perform one completion request.
    fn complete(&self, prompt: &str) -> FanframeResult<CaptionResponse>;
}

impl<F> CaptionService for F
where
    F: Fn(&str) -> FanframeResult<CaptionResponse> + Send + Sync,
{
    fn complete(&self, prompt: &str) -> FanframeResult<CaptionResponse> {
        self(prompt)
    }
}

/// How a suggestion list came about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptionSource {
    /// Parsed from the model reply.
    Generated,
    /// The endpoint answered with a non-success status.
    ServiceError,
    /// The reply could not be parsed.
    Unparsable,
    /// The reply was an empty list.
    Empty,
    /// The request never completed.
    Transport,
}

/// Ordered caption suggestions; never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptionSuggestions {
    /// Suggestions in display order.
    pub items: Vec<String>,
    /// Where they came from.
    pub source: CaptionSource,
}

impl CaptionSuggestions {
    pub(crate) fn fallback(source: CaptionSource, text: impl Into<String>) -> Self {
        Self {
            items: vec![text.into()],
            source,
        }
    }

    /// Text that should replace the overlay caption, if any.
    ///
    /// Generated lists and endpoint/format fallbacks adopt their first entry; empty replies and
    /// transport failures leave the caption alone.
    pub fn overlay_text(&self) -> Option<&str> {
        match self.source {
            CaptionSource::Generated | CaptionSource::ServiceError | CaptionSource::Unparsable => {
                self.items.first().map(String::as_str)
            }
            CaptionSource::Empty | CaptionSource::Transport => None,
        }
    }
}

/// Prompt asking for team taglines, embedding the start of the frame's PNG data URL.
pub fn build_caption_prompt(frame: &Frame) -> FanframeResult<String> {
    let image = frame.data_url_prefix(PROMPT_IMAGE_CHARS)?;
    Ok(format!(
        "You are a creative tagline generator for the Rajasthan Royals cricket team.\n\
         Based on the following truncated base64 image string (which may not reveal all details), \
         generate a JSON array of at least 5 unique, emotionally resonant tagline suggestions.\n\
         The taglines should evoke the team's pride, passion, and energy.\n\
         Ensure that the output is a complete JSON array with no extra commentary or markdown.\n\
         Image (truncated): {image}..."
    ))
}

/// Ask `service` for suggestions. Never fails: every failure becomes a one-item fallback list.
#[tracing::instrument(skip_all)]
pub fn suggest_captions(service: &dyn CaptionService, prompt: &str) -> CaptionSuggestions {
    match service.complete(prompt) {
        Ok(resp) => interpret_response(&resp),
        Err(e) => {
            tracing::warn!(error = %e, "caption request failed");
            CaptionSuggestions::fallback(CaptionSource::Transport, FALLBACK_UNEXPECTED_ERROR)
        }
    }
}

/// Turn a raw endpoint reply into suggestions.
pub fn interpret_response(resp: &CaptionResponse) -> CaptionSuggestions {
    if !resp.is_success() {
        tracing::warn!(status = resp.status, "caption endpoint returned an error");
        let msg = error_message(&resp.body).unwrap_or_else(|| FALLBACK_CREDITS_EXHAUSTED.into());
        return CaptionSuggestions::fallback(CaptionSource::ServiceError, msg);
    }

    let parsed = extract_chat_content(&resp.body)
        .and_then(|content| parse_suggestions(strip_code_fences(&content)));
    match parsed {
        Some(items) if !items.is_empty() => CaptionSuggestions {
            items,
            source: CaptionSource::Generated,
        },
        Some(_) => CaptionSuggestions::fallback(CaptionSource::Empty, FALLBACK_NO_SUGGESTIONS),
        None => {
            tracing::warn!("caption reply could not be parsed");
            CaptionSuggestions::fallback(CaptionSource::Unparsable, FALLBACK_UNEXPECTED_FORMAT)
        }
    }
}

/// `choices[0].message.content` of a chat-completions reply, trimmed.
pub fn extract_chat_content(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    let content = v.pointer("/choices/0/message/content")?.as_str()?;
    Some(content.trim().to_string())
}

/// Remove a surrounding markdown code fence (```` ```json ```` or ```` ``` ````).
pub fn strip_code_fences(content: &str) -> &str {
    let s = content.trim();
    let s = s
        .strip_prefix("```json")
        .or_else(|| s.strip_prefix("```"))
        .unwrap_or(s);
    let s = s.trim();
    s.strip_suffix("```").unwrap_or(s).trim()
}

/// Parse a JSON array of captions. Non-string items are stringified.
pub fn parse_suggestions(content: &str) -> Option<Vec<String>> {
    let v: serde_json::Value = serde_json::from_str(content).ok()?;
    let items = v.as_array()?;
    Some(
        items
            .iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
    )
}

/// Message of an `{"error": "..."}` or `{"error": {"message": "..."}}` body.
pub fn error_message(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    let err = v.get("error")?;
    err.as_str()
        .or_else(|| err.get("message").and_then(|m| m.as_str()))
        .map(str::to_string)
}

/// OpenAI-compatible chat-completions client that shells out to `curl`.
#[derive(Clone)]
pub struct CurlCaptionService {
    cfg: CaptionConfig,
    api_key: Option<String>,
}

impl std::fmt::Debug for CurlCaptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurlCaptionService")
            .field("endpoint", &self.cfg.endpoint)
            .field("model", &self.cfg.model)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl CurlCaptionService {
    /// Build from config, reading the API key from `cfg.api_key_env`.
    pub fn from_config(cfg: &CaptionConfig) -> Self {
        let api_key = std::env::var(&cfg.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self {
            cfg: cfg.clone(),
            api_key,
        }
    }

    /// Replace the API key.
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    /// JSON request body for `prompt`.
    pub fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.cfg.model,
            "messages": [{ "role": "system", "content": prompt }],
            "temperature": self.cfg.temperature,
            "n": 1,
        })
    }
}

impl CaptionService for CurlCaptionService {
    #[tracing::instrument(skip_all, fields(endpoint = %self.cfg.endpoint))]
    fn complete(&self, prompt: &str) -> FanframeResult<CaptionResponse> {
        let body = serde_json::to_vec(&self.request_body(prompt))
            .map_err(|e| FanframeError::serde(format!("caption request: {e}")))?;

        let mut cmd = Command::new("curl");
        cmd.args(["-sS", "-X", "POST"])
            .args(["-H", "Content-Type: application/json"])
            .args(["--max-time", &self.cfg.timeout_secs.max(1).to_string()])
            .args(["--data-binary", "@-"])
            .args(["-w", "\n%{http_code}"]);
        if let Some(key) = &self.api_key {
            cmd.arg("-H").arg(format!("Authorization: Bearer {key}"));
        }
        cmd.arg(&self.cfg.endpoint);

        let out = run_with_stdin(cmd, body, "curl")?;
        parse_curl_output(&out.stdout)
    }
}

/// Split curl output produced with `-w "\n%{http_code}"` into body and status.
fn parse_curl_output(stdout: &[u8]) -> FanframeResult<CaptionResponse> {
    let text = String::from_utf8_lossy(stdout);
    let (body, code) = text
        .rsplit_once('\n')
        .ok_or_else(|| FanframeError::service("curl output lacks a status line"))?;
    let status = code
        .trim()
        .parse::<u16>()
        .map_err(|_| FanframeError::service(format!("curl reported status \"{}\"", code.trim())))?;
    if status == 0 {
        return Err(FanframeError::service("no HTTP response received"));
    }
    Ok(CaptionResponse {
        status,
        body: body.to_string(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/services/caption.rs"]
mod tests;
