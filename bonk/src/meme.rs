use std::fmt;
use std::path::Path;
use std::time::Duration;

use base64::Engine;

use crate::gemini::{GeminiClient, Part};

pub const BONK_GPT_LOGO_URL: &str =
    "https://pbs.twimg.com/media/G7l7fKlX0AAQTAB?format=jpg&name=medium";

const CHARACTER_DESCRIPTION: &str = " (IMPORTANT: The character 'Bonk GPT' is a Shiba Inu dog with bright orange fur, appearing exactly like the provided reference image. Maintain this character identity.) ";

/// Rendering style appended to the image prompt.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MemeStyle {
    #[default]
    Cartoon,
    ThreeD,
    PixelArt,
    OilPainting,
    Anime,
    Custom(String),
}

impl MemeStyle {
    /// Names accepted on the command line, one per built-in style.
    pub const NAMES: &'static [&'static str] = &["cartoon", "3d", "pixel", "oil", "anime"];
}

impl From<&str> for MemeStyle {
    fn from(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "" | "cartoon" => MemeStyle::Cartoon,
            "3d" | "3d render" | "three-d" => MemeStyle::ThreeD,
            "pixel" | "pixel art" | "pixel-art" => MemeStyle::PixelArt,
            "oil" | "oil painting" | "oil-painting" => MemeStyle::OilPainting,
            "anime" => MemeStyle::Anime,
            _ => MemeStyle::Custom(name.trim().to_string()),
        }
    }
}

impl fmt::Display for MemeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phrase = match self {
            MemeStyle::Cartoon => "cartoon",
            MemeStyle::ThreeD => "3D render",
            MemeStyle::PixelArt => "pixel art",
            MemeStyle::OilPainting => "oil painting",
            MemeStyle::Anime => "anime",
            MemeStyle::Custom(s) => s.as_str(),
        };
        f.write_str(phrase)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DataUrlError {
    #[error("not a base64 data URL")]
    NotDataUrl,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
}

/// `data:<mime>;base64,<payload>`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub data: String,
}

impl DataUrl {
    pub fn parse(url: &str) -> Result<Self, DataUrlError> {
        let rest = url
            .trim()
            .strip_prefix("data:")
            .ok_or(DataUrlError::NotDataUrl)?;
        let (header, data) = rest.split_once(',').ok_or(DataUrlError::NotDataUrl)?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or(DataUrlError::NotDataUrl)?;
        if mime_type.is_empty() {
            return Err(DataUrlError::NotDataUrl);
        }
        Ok(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Read a local image; the mime type comes from the file extension.
    pub fn from_file(path: &Path) -> Result<Self, DataUrlError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let mime_type = match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => return Err(DataUrlError::UnsupportedType(ext)),
        };
        let bytes = std::fs::read(path)?;
        Ok(Self::from_bytes(mime_type, &bytes))
    }

    pub fn decode(&self) -> Result<Vec<u8>, DataUrlError> {
        Ok(base64::engine::general_purpose::STANDARD.decode(self.data.trim())?)
    }

    /// File extension matching the mime type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => "bin",
        }
    }

    fn to_part(&self) -> Part {
        Part::inline(self.mime_type.clone(), self.data.clone())
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.data)
    }
}

/// What the generator hands back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemeImage {
    Data(DataUrl),
    /// Demo mode: a link instead of generated pixels.
    Url(String),
}

pub fn mentions_bonk_gpt(prompt: &str) -> bool {
    let lower = prompt.to_lowercase();
    lower.contains("bonk gpt") || lower.contains("bonkgpt")
}

/// Final text prompt, with the mascot description injected when needed.
pub fn build_prompt(prompt: &str, style: &MemeStyle) -> String {
    let subject = if mentions_bonk_gpt(prompt) {
        format!("{prompt}{CHARACTER_DESCRIPTION}")
    } else {
        prompt.to_string()
    };
    format!("Generate a high quality, creative image about: {subject}. Style: {style}.")
}

/// Reference image first, then the text.
fn request_parts(text: String, reference: Option<&DataUrl>) -> Vec<Part> {
    let mut parts = Vec::with_capacity(2);
    if let Some(reference) = reference {
        parts.push(reference.to_part());
    }
    parts.push(Part::text(text));
    parts
}

/// Image generation front door: real API when a client is present, the logo otherwise.
pub struct MemeFactory {
    client: Option<GeminiClient>,
    http: reqwest::Client,
    logo_url: String,
    demo_delay: Duration,
}

impl MemeFactory {
    pub fn new(client: Option<GeminiClient>) -> Self {
        Self {
            client,
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            logo_url: BONK_GPT_LOGO_URL.to_string(),
            demo_delay: Duration::from_millis(2000),
        }
    }

    pub fn with_demo_delay(mut self, delay: Duration) -> Self {
        self.demo_delay = delay;
        self
    }

    pub fn is_demo(&self) -> bool {
        self.client.is_none()
    }

    /// `None` when the API failed or returned no image.
    pub async fn generate(
        &self,
        prompt: &str,
        style: &MemeStyle,
        reference: Option<DataUrl>,
    ) -> Option<MemeImage> {
        let Some(client) = &self.client else {
            tracing::warn!("No API key found for image generation");
            tokio::time::sleep(self.demo_delay).await;
            return Some(MemeImage::Url(self.logo_url.clone()));
        };

        let mut reference = reference;
        if reference.is_none() && mentions_bonk_gpt(prompt) {
            tracing::info!("Fetching Bonk GPT logo for reference");
            reference = self.fetch_reference().await;
        }

        let parts = request_parts(build_prompt(prompt, style), reference.as_ref());
        match client.generate_image(parts).await {
            Ok(Some(inline)) => Some(MemeImage::Data(DataUrl {
                mime_type: inline.mime_type,
                data: inline.data,
            })),
            Ok(None) => {
                tracing::warn!("Image model returned no image part");
                None
            }
            Err(e) => {
                tracing::error!("Image generation failed: {e}");
                None
            }
        }
    }

    /// Download the logo as a data URL; failures only cost the reference.
    async fn fetch_reference(&self) -> Option<DataUrl> {
        let resp = match self.http.get(&self.logo_url).send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::warn!("Could not fetch reference image: HTTP {}", r.status());
                return None;
            }
            Err(e) => {
                tracing::warn!("Could not fetch reference image: {e}");
                return None;
            }
        };
        let mime_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_string())
            .filter(|v| v.starts_with("image/"))
            .unwrap_or_else(|| "image/jpeg".to_string());
        match resp.bytes().await {
            Ok(bytes) => Some(DataUrl::from_bytes(mime_type, &bytes)),
            Err(e) => {
                tracing::warn!("Could not read reference image: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::test_http::{self, Route};

    fn image_reply() -> Route {
        Route::json(
            "/models/",
            200,
            json!({ "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "image/png", "data": "bWVtZQ==" } }
            ] } }] }),
        )
    }

    #[test]
    fn style_names() {
        assert_eq!(MemeStyle::from("3D"), MemeStyle::ThreeD);
        assert_eq!(MemeStyle::from(" Pixel "), MemeStyle::PixelArt);
        assert_eq!(MemeStyle::from("oil painting"), MemeStyle::OilPainting);
        assert_eq!(MemeStyle::from(""), MemeStyle::Cartoon);
        assert_eq!(
            MemeStyle::from("Vaporwave"),
            MemeStyle::Custom("Vaporwave".into())
        );
        for name in MemeStyle::NAMES {
            assert!(!matches!(MemeStyle::from(*name), MemeStyle::Custom(_)));
        }
    }

    #[test]
    fn style_display() {
        assert_eq!(MemeStyle::default().to_string(), "cartoon");
        assert_eq!(MemeStyle::ThreeD.to_string(), "3D render");
        assert_eq!(MemeStyle::Custom("ukiyo-e".into()).to_string(), "ukiyo-e");
    }

    #[test]
    fn mascot_detection() {
        assert!(mentions_bonk_gpt("Bonk GPT riding a rocket"));
        assert!(mentions_bonk_gpt("a BONKGPT sticker"));
        assert!(!mentions_bonk_gpt("a bonk dog"));
    }

    #[test]
    fn prompt_without_mascot() {
        assert_eq!(
            build_prompt("a frog on the moon", &MemeStyle::PixelArt),
            "Generate a high quality, creative image about: a frog on the moon. Style: pixel art."
        );
    }

    #[test]
    fn prompt_with_mascot_gets_description() {
        let prompt = build_prompt("bonk gpt surfing", &MemeStyle::Cartoon);
        assert!(prompt.starts_with("Generate a high quality, creative image about: bonk gpt surfing (IMPORTANT:"));
        assert!(prompt.contains("Shiba Inu dog with bright orange fur"));
        assert!(prompt.ends_with("Style: cartoon."));
    }

    #[test]
    fn data_url_parse_and_display() {
        let url = DataUrl::parse("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(url.mime_type, "image/png");
        assert_eq!(url.data, "iVBORw0KGgo=");
        assert_eq!(url.to_string(), "data:image/png;base64,iVBORw0KGgo=");
        assert_eq!(url.extension(), "png");
    }

    #[test]
    fn data_url_rejects_other_input() {
        assert!(DataUrl::parse("https://example.com/a.png").is_err());
        assert!(DataUrl::parse("data:image/png,plain").is_err());
        assert!(DataUrl::parse("data:;base64,AAAA").is_err());
        assert!(DataUrl::parse("data:image/png;base64").is_err());
    }

    #[test]
    fn data_url_bytes_roundtrip() {
        let url = DataUrl::from_bytes("image/jpeg", b"\xff\xd8\xff");
        assert_eq!(url.extension(), "jpg");
        assert_eq!(url.decode().unwrap(), b"\xff\xd8\xff");
    }

    #[test]
    fn data_url_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.PNG");
        std::fs::write(&path, b"png-bytes").unwrap();
        let url = DataUrl::from_file(&path).unwrap();
        assert_eq!(url.mime_type, "image/png");
        assert_eq!(url.decode().unwrap(), b"png-bytes");

        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, b"hi").unwrap();
        assert!(matches!(
            DataUrl::from_file(&txt),
            Err(DataUrlError::UnsupportedType(ext)) if ext == "txt"
        ));
    }

    #[test]
    fn reference_goes_first() {
        let reference = DataUrl::from_bytes("image/png", b"x");
        let parts = request_parts("draw".into(), Some(&reference));
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].inline_data.as_ref().unwrap().mime_type, "image/png");
        assert_eq!(parts[1].text.as_deref(), Some("draw"));

        let parts = request_parts("draw".into(), None);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].text.as_deref(), Some("draw"));
    }

    #[tokio::test]
    async fn demo_mode_returns_logo() {
        let factory = MemeFactory::new(None).with_demo_delay(Duration::ZERO);
        assert!(factory.is_demo());
        let image = factory
            .generate("bonk gpt in space", &MemeStyle::Anime, None)
            .await;
        assert_eq!(image, Some(MemeImage::Url(BONK_GPT_LOGO_URL.to_string())));
    }

    #[tokio::test]
    async fn unreachable_api_yields_none() {
        let client = GeminiClient::new("k").with_base_url(test_http::closed_url().await);
        let factory = MemeFactory::new(Some(client));
        assert!(!factory.is_demo());
        assert_eq!(
            factory.generate("a frog", &MemeStyle::Cartoon, None).await,
            None
        );
    }

    #[tokio::test]
    async fn api_error_yields_none() {
        let (base, _requests) = test_http::serve(vec![Route::json(
            "/models/",
            429,
            json!({ "error": { "message": "Resource has been exhausted" } }),
        )])
        .await;
        let factory = MemeFactory::new(Some(GeminiClient::new("k").with_base_url(&base)));
        assert_eq!(
            factory.generate("a frog", &MemeStyle::Cartoon, None).await,
            None
        );
    }

    #[tokio::test]
    async fn mascot_prompt_fetches_logo_as_reference() {
        let (base, mut requests) = test_http::serve(vec![
            Route::bytes("/logo", "image/png", b"logo-bytes"),
            image_reply(),
        ])
        .await;
        let mut factory = MemeFactory::new(Some(GeminiClient::new("k").with_base_url(&base)));
        factory.logo_url = format!("{base}/logo");

        let image = factory
            .generate("Bonk GPT surfing", &MemeStyle::PixelArt, None)
            .await;
        assert_eq!(
            image,
            Some(MemeImage::Data(DataUrl {
                mime_type: "image/png".into(),
                data: "bWVtZQ==".into(),
            }))
        );

        assert_eq!(requests.recv().await.unwrap().path, "/logo");
        let body = requests.recv().await.unwrap().json();
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(
            parts[0]["inlineData"],
            json!({ "mimeType": "image/png", "data": DataUrl::from_bytes("image/png", b"logo-bytes").data })
        );
        let text = parts[1]["text"].as_str().unwrap();
        assert!(text.contains("Shiba Inu"));
        assert!(text.ends_with("Style: pixel art."));
    }

    #[tokio::test]
    async fn logo_fetch_failure_still_generates() {
        let (base, mut requests) = test_http::serve(vec![image_reply()]).await;
        let mut factory = MemeFactory::new(Some(GeminiClient::new("k").with_base_url(&base)));
        factory.logo_url = format!("{base}/missing-logo");

        let image = factory
            .generate("bonkgpt on the moon", &MemeStyle::Cartoon, None)
            .await;
        assert!(matches!(image, Some(MemeImage::Data(_))));

        assert_eq!(requests.recv().await.unwrap().path, "/missing-logo");
        let body = requests.recv().await.unwrap().json();
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert!(parts[0].get("text").is_some());
    }

    #[tokio::test]
    async fn explicit_reference_skips_logo_fetch() {
        let (base, mut requests) = test_http::serve(vec![image_reply()]).await;
        let factory = MemeFactory::new(Some(GeminiClient::new("k").with_base_url(&base)));
        let reference = DataUrl::from_bytes("image/jpeg", b"mine");

        let image = factory
            .generate("bonk gpt waving", &MemeStyle::Anime, Some(reference.clone()))
            .await;
        assert!(image.is_some());

        let request = requests.recv().await.unwrap();
        assert!(request.path.starts_with("/models/"));
        let body = request.json();
        assert_eq!(body["contents"][0]["parts"][0]["inlineData"]["data"], json!(reference.data));
        assert!(requests.try_recv().is_err());
    }
}
