use anyhow::{anyhow, bail, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::RwLock;

use crate::curve::IntensitySample;
use crate::settings::GenerationSettings;
use crate::story::models::{Language, StoryDraft};

use super::prompts::{arc_prompt, pick_genre, story_schema, system_instruction};
use super::StoryService;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Deserialize, Debug)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize, Debug)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    inline_data: Option<GeminiInlineData>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

impl GeminiResponse {
    fn parts(self) -> impl Iterator<Item = GeminiPart> {
        self.candidates
            .unwrap_or_default()
            .into_iter()
            .take(1)
            .filter_map(|c| c.content)
            .filter_map(|c| c.parts)
            .flatten()
    }
}

/// `generateContent` client for story text and chapter illustrations.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    settings: RwLock<GenerationSettings>,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, settings: GenerationSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            api_key,
            settings: RwLock::new(settings),
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }

    /// Points the client at another `generateContent` host, such as a proxy.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Applies new model names and timeout to subsequent requests.
    pub fn update_settings(&self, settings: GenerationSettings) {
        if let Ok(mut guard) = self.settings.write() {
            *guard = settings;
        }
    }

    fn settings(&self) -> GenerationSettings {
        self.settings
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    async fn generate_content(
        &self,
        settings: &GenerationSettings,
        model: &str,
        body: &Value,
    ) -> Result<GeminiResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("API Key is missing"))?;
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .timeout(settings.request_timeout())
            .json(body)
            .send()
            .await
            .with_context(|| format!("request to {model} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            bail!("{model} returned {status}: {}", truncate(&detail, 300));
        }

        response
            .json::<GeminiResponse>()
            .await
            .with_context(|| format!("unreadable response from {model}"))
    }
}

impl StoryService for GeminiClient {
    async fn generate_story(
        &self,
        samples: &[IntensitySample],
        language: Language,
    ) -> Result<StoryDraft> {
        let settings = self.settings();
        let genre = pick_genre(&mut rand::thread_rng());
        log_info!(
            "Requesting {}-chapter story ({:?}, {})",
            samples.len(),
            language,
            genre
        );

        let body = json!({
            "systemInstruction": {
                "parts": [{ "text": system_instruction(samples.len(), language, genre) }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": arc_prompt(samples) }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": story_schema(language)
            }
        });

        let response = self
            .generate_content(&settings, &settings.text_model, &body)
            .await?;
        parse_story(response)
    }

    async fn generate_image(&self, prompt: &str) -> Result<String> {
        let settings = self.settings();
        let body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "responseModalities": ["IMAGE"],
                "imageConfig": { "aspectRatio": settings.aspect_ratio }
            }
        });

        let response = self
            .generate_content(&settings, &settings.image_model, &body)
            .await?;
        let uri = parse_image(response)?;
        log_debug!("Image ready ({} bytes of URI)", uri.len());
        Ok(uri)
    }
}

fn parse_story(response: GeminiResponse) -> Result<StoryDraft> {
    let text: String = response.parts().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        bail!("No response from Gemini");
    }
    serde_json::from_str(&text).with_context(|| {
        format!(
            "story JSON did not match the schema: {}",
            truncate(&text, 200)
        )
    })
}

fn parse_image(response: GeminiResponse) -> Result<String> {
    let inline = response
        .parts()
        .filter_map(|p| p.inline_data)
        .find(|d| d.mime_type.starts_with("image/"))
        .ok_or_else(|| anyhow!("No image data found in response"))?;

    let bytes = BASE64
        .decode(inline.data.as_bytes())
        .context("image payload is not valid base64")?;
    if bytes.is_empty() {
        bail!("image payload is empty");
    }

    Ok(format!("data:{};base64,{}", inline.mime_type, inline.data))
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode, Uri};
    use axum::{Json, Router};

    use super::*;

    fn response(raw: Value) -> GeminiResponse {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn story_text_is_joined_and_parsed() {
        let story = json!({
            "title": "Ash",
            "theme": "Steampunk",
            "chapters": [{
                "chapterTitle": "Cogs",
                "content": "The foundry woke.",
                "intensity": 40,
                "imagePrompt": "brass gears in fog"
            }]
        })
        .to_string();
        let (head, tail) = story.split_at(20);
        let draft = parse_story(response(json!({
            "candidates": [{ "content": { "parts": [{ "text": head }, { "text": tail }] } }]
        })))
        .unwrap();
        assert_eq!(draft.title, "Ash");
        assert_eq!(draft.chapters[0].image_prompt, "brass gears in fog");
    }

    #[test]
    fn empty_candidates_is_an_error() {
        let err = parse_story(response(json!({ "candidates": [] }))).unwrap_err();
        assert!(err.to_string().contains("No response"));
    }

    #[test]
    fn inline_image_becomes_data_uri() {
        let uri = parse_image(response(json!({
            "candidates": [{ "content": { "parts": [
                { "text": "here you go" },
                { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgo=" } }
            ] } }]
        })))
        .unwrap();
        assert_eq!(uri, "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn text_only_image_response_is_an_error() {
        let err = parse_image(response(json!({
            "candidates": [{ "content": { "parts": [{ "text": "I cannot draw that" }] } }]
        })))
        .unwrap_err();
        assert!(err.to_string().contains("No image data"));
    }

    #[test]
    fn garbage_payload_is_rejected() {
        let result = parse_image(response(json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "image/png", "data": "***" } }
            ] } }]
        })));
        assert!(result.is_err());
    }

    #[derive(Debug)]
    struct Seen {
        path: String,
        api_key: Option<String>,
        body: Value,
    }

    #[derive(Clone)]
    struct MockGemini {
        status: StatusCode,
        reply: Value,
        seen: Arc<Mutex<Vec<Seen>>>,
    }

    async fn answer(
        State(mock): State<MockGemini>,
        uri: Uri,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        mock.seen.lock().unwrap().push(Seen {
            path: uri.path().to_string(),
            api_key: headers
                .get("x-goog-api-key")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body,
        });
        (mock.status, Json(mock.reply.clone()))
    }

    /// Serves one canned reply on a local port and records every request.
    async fn serve(status: StatusCode, reply: Value) -> (GeminiClient, Arc<Mutex<Vec<Seen>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new().fallback(answer).with_state(MockGemini {
            status,
            reply,
            seen: seen.clone(),
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = GeminiClient::new(Some("test-key".into()), GenerationSettings::default())
            .unwrap()
            .with_base_url(format!("http://{addr}/v1beta/"));
        (client, seen)
    }

    #[tokio::test]
    async fn story_request_uses_json_mode_and_key_header() {
        let story = json!({
            "title": "Ash",
            "theme": "Steampunk",
            "chapters": [{
                "chapterTitle": "Cogs",
                "content": "The foundry woke.",
                "intensity": 40,
                "imagePrompt": "brass gears in fog"
            }]
        });
        let (client, seen) = serve(
            StatusCode::OK,
            json!({ "candidates": [{ "content": { "parts": [{ "text": story.to_string() }] } }] }),
        )
        .await;

        let samples = [IntensitySample {
            index: 0,
            intensity: 40.0,
        }];
        let draft = client
            .generate_story(&samples, Language::English)
            .await
            .unwrap();
        assert_eq!(draft.chapters[0].chapter_title, "Cogs");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].path,
            "/v1beta/models/gemini-3-flash-preview:generateContent"
        );
        assert_eq!(seen[0].api_key.as_deref(), Some("test-key"));
        let config = &seen[0].body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert!(config["responseSchema"].is_object());
        let prompt = seen[0].body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap();
        assert!(prompt.contains("Chapter 1: Intensity Level 40%"));
    }

    #[tokio::test]
    async fn image_request_asks_for_image_modality() {
        let (client, seen) = serve(
            StatusCode::OK,
            json!({ "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgo=" } }
            ] } }] }),
        )
        .await;

        let uri = client.generate_image("a lighthouse").await.unwrap();
        assert_eq!(uri, "data:image/png;base64,iVBORw0KGgo=");

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen[0].path,
            "/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
        let config = &seen[0].body["generationConfig"];
        assert_eq!(config["responseModalities"], json!(["IMAGE"]));
        assert_eq!(config["imageConfig"]["aspectRatio"], "16:9");
        assert_eq!(seen[0].body["contents"][0]["parts"][0]["text"], "a lighthouse");
    }

    #[tokio::test]
    async fn error_status_surfaces_code_and_body() {
        let (client, _seen) = serve(
            StatusCode::TOO_MANY_REQUESTS,
            json!({ "error": { "message": "quota exhausted" } }),
        )
        .await;

        let err = client.generate_image("a lighthouse").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("429"), "{message}");
        assert!(message.contains("quota exhausted"), "{message}");
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let client = GeminiClient::new(None, GenerationSettings::default()).unwrap();
        let err = client.generate_image("a lighthouse").await.unwrap_err();
        assert!(err.to_string().contains("API Key is missing"));
    }
}
