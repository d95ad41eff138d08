//! Avatar images stored as `data:` URLs in settings and profile.

use anyhow::{bail, Context, Result};
use base64::Engine;
use std::path::Path;

use crate::ai::{ClientError, GenerativeClient, ImageRequest, InlineData};
use crate::store::types::AiSettings;

pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime_type};base64,{encoded}")
}

fn mime_for_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => return None,
    })
}

/// Read an image file into a `data:` URL.
pub fn avatar_from_file(path: &Path) -> Result<String> {
    let Some(mime) = mime_for_extension(path) else {
        bail!("unsupported image type: {}", path.display());
    };
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read image: {}", path.display()))?;
    Ok(data_url(mime, &bytes))
}

pub fn avatar_prompt(settings: &AiSettings) -> String {
    format!(
        "Generate a square avatar image for an AI assistant.\nName: {}.\nPersona: {}.\nStyle: Professional, digital art, clean background.",
        settings.name, settings.persona
    )
}

/// Ask the image model for an assistant avatar. `Ok(None)` when no API key is
/// set or the model returned no image.
pub async fn generate_avatar(
    client: &dyn GenerativeClient,
    settings: &AiSettings,
    model: &str,
) -> Result<Option<String>, ClientError> {
    if !settings.has_api_key() {
        return Ok(None);
    }
    let image = client
        .generate_image(ImageRequest {
            api_key: settings.api_key.clone(),
            model: model.to_string(),
            prompt: avatar_prompt(settings),
        })
        .await?;

    Ok(image.map(|InlineData { mime_type, data }| {
        let mime = if mime_type.is_empty() { "image/png" } else { mime_type.as_str() };
        data_url(mime, &data)
    }))
}
