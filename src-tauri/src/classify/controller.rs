use std::{
    ffi::OsStr,
    fs,
    io::Cursor,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use image::ImageReader;
use log::{error, info};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::api::InferenceHandle;
use crate::requests::RequestGate;

pub const CLASSIFY_ERROR: &str = "No fue posible clasificar la imagen. Inténtalo de nuevo.";
pub const NO_IMAGE_ERROR: &str = "Selecciona una imagen primero.";
pub const INVALID_IMAGE_ERROR: &str = "El archivo seleccionado no es una imagen válida.";

/// Metadata of the image the user picked, shown as the preview card. The
/// bytes themselves are re-read from disk at submit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickedImage {
    pub path: PathBuf,
    pub file_name: String,
    pub mime: String,
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationState {
    pub picked: Option<PickedImage>,
    pub classification: Option<String>,
    pub error: Option<String>,
    pub loading: bool,
}

/// Validates the file and reads its dimensions without a full decode.
pub fn inspect_image(path: &Path) -> Result<PickedImage> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let format = image::guess_format(&bytes).context("Unrecognized image format")?;
    let (width, height) = ImageReader::with_format(Cursor::new(&bytes), format)
        .into_dimensions()
        .context("Failed to read image dimensions")?;

    Ok(PickedImage {
        file_name: path
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or("imagen")
            .to_string(),
        mime: format.to_mime_type().to_string(),
        width,
        height,
        size_bytes: bytes.len() as u64,
        path: path.to_path_buf(),
    })
}

#[derive(Clone)]
pub struct ClassifyController {
    api: InferenceHandle,
    state: Arc<Mutex<ClassificationState>>,
    gate: RequestGate,
}

impl ClassifyController {
    pub fn new(api: InferenceHandle) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(ClassificationState::default())),
            gate: RequestGate::new(),
        }
    }

    pub async fn get_state(&self) -> ClassificationState {
        self.state.lock().await.clone()
    }

    /// Replaces the current selection. A new image invalidates whatever
    /// classification is displayed or still in flight.
    pub async fn set_picked(&self, path: PathBuf) -> ClassificationState {
        self.gate.cancel_active().await;

        let mut state = self.state.lock().await;
        match inspect_image(&path) {
            Ok(picked) => {
                info!(
                    "picked image {} ({}x{}, {})",
                    picked.file_name, picked.width, picked.height, picked.mime
                );
                state.picked = Some(picked);
                state.error = None;
            }
            Err(err) => {
                error!("Rejected picked file {}: {err:#}", path.display());
                state.picked = None;
                state.error = Some(INVALID_IMAGE_ERROR.to_string());
            }
        }
        state.classification = None;
        state.loading = false;
        state.clone()
    }

    /// Uploads the picked image and stores the predicted label. Without a
    /// selection this only sets the hint message, no request goes out.
    pub async fn classify(&self) -> ClassificationState {
        let picked = self.state.lock().await.picked.clone();
        let Some(picked) = picked else {
            let mut state = self.state.lock().await;
            state.error = Some(NO_IMAGE_ERROR.to_string());
            return state.clone();
        };

        let ticket = self.gate.begin().await;
        {
            let mut state = self.state.lock().await;
            if ticket.token.is_cancelled() {
                return state.clone();
            }
            state.loading = true;
        }

        // Re-read at submit time; the file may have changed or vanished
        // since it was picked.
        let bytes = match fs::read(&picked.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                error!("Failed to read {}: {err}", picked.path.display());
                let mut state = self.state.lock().await;
                if self.gate.finish(&ticket).await {
                    state.error = Some(INVALID_IMAGE_ERROR.to_string());
                    state.loading = false;
                }
                return state.clone();
            }
        };

        let client = self.api.current();
        let outcome = tokio::select! {
            _ = ticket.token.cancelled() => {
                info!("classification superseded before completion");
                return self.get_state().await;
            }
            result = client.classify_image(bytes, &picked.file_name, &picked.mime) => result,
        };

        let mut state = self.state.lock().await;
        if !self.gate.finish(&ticket).await {
            info!("dropping stale classification result");
            return state.clone();
        }

        match outcome {
            Ok(label) => {
                state.classification = Some(label);
                state.error = None;
            }
            Err(err) => {
                error!("Classification failed: {err:#}");
                state.error = Some(CLASSIFY_ERROR.to_string());
            }
        }
        state.loading = false;
        state.clone()
    }

    pub async fn reset(&self) -> ClassificationState {
        self.gate.cancel_active().await;

        let mut state = self.state.lock().await;
        *state = ClassificationState::default();
        state.clone()
    }
}
