use anyhow::{anyhow, bail, Context, Result};
use log::info;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use super::{request_id, InferenceClient};

impl InferenceClient {
    /// Sends the image as a multipart field named `image` and returns the
    /// predicted label. The classifier is not consistent about its response
    /// shape, so the label is extracted leniently by [`parse_label`].
    pub async fn classify_image(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        mime: &str,
    ) -> Result<String> {
        let rid = request_id();
        let url = format!("{}/classify_product", self.vision_base);
        info!("[{rid}] POST {url} ({file_name}, {} bytes)", bytes.len());

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .context("Invalid image mime type")?;
        let form = Form::new().part("image", part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("Failed to reach classification service")?;

        if !response.status().is_success() {
            bail!("classification service returned {}", response.status());
        }

        let body = response
            .text()
            .await
            .context("Failed to read classification response")?;
        let label = parse_label(&body)?;

        info!("[{rid}] classified as {label:?}");
        Ok(label)
    }
}

/// Accepts `{"classification": "…"}`, a bare JSON string, or a non-empty
/// plain-text body. Anything else is an error; in particular an empty body
/// must not be shown as a (blank) label.
fn parse_label(body: &str) -> Result<String> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map
            .get("classification")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("classification response has no usable label")),
        Ok(Value::String(label)) if !label.trim().is_empty() => Ok(label),
        Ok(other) => bail!("unusable classification response: {other}"),
        Err(_) => {
            let label = body.trim();
            if label.is_empty() {
                bail!("classification service returned an empty body");
            }
            Ok(label.to_string())
        }
    }
}
