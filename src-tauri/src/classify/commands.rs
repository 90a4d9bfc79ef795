use tauri::{AppHandle, Emitter, State};
use tauri_plugin_dialog::{DialogExt, FilePath};

use crate::AppState;

use super::{ClassificationState, ClassifyController};

fn controller_from_state(state: &State<'_, AppState>) -> ClassifyController {
    state.classify.clone()
}

#[tauri::command]
pub async fn get_classification_state(
    state: State<'_, AppState>,
) -> Result<ClassificationState, String> {
    let controller = controller_from_state(&state);
    Ok(controller.get_state().await)
}

/// Opens the native file dialog. Cancelling the dialog leaves the state
/// untouched.
#[tauri::command]
pub async fn pick_product_image(
    state: State<'_, AppState>,
    app_handle: AppHandle,
) -> Result<ClassificationState, String> {
    let (tx, mut rx) = tauri::async_runtime::channel::<Option<FilePath>>(1);

    app_handle
        .dialog()
        .file()
        .set_title("Selecciona la imagen del producto")
        .add_filter("Imágenes", &["png", "jpg", "jpeg", "webp", "bmp", "gif"])
        .pick_file(move |file_path| {
            let _ = tx.blocking_send(file_path);
        });

    let controller = controller_from_state(&state);
    let picked = rx.recv().await.flatten().and_then(|fp| fp.into_path().ok());
    match picked {
        Some(path) => {
            let snapshot = controller.set_picked(path).await;
            emit_classification_state(&app_handle, &snapshot);
            Ok(snapshot)
        }
        None => Ok(controller.get_state().await),
    }
}

#[tauri::command]
pub async fn classify_product_image(
    state: State<'_, AppState>,
    app_handle: AppHandle,
) -> Result<ClassificationState, String> {
    let controller = controller_from_state(&state);
    let snapshot = controller.classify().await;
    emit_classification_state(&app_handle, &snapshot);
    Ok(snapshot)
}

#[tauri::command]
pub async fn reset_classification_state(
    state: State<'_, AppState>,
    app_handle: AppHandle,
) -> Result<ClassificationState, String> {
    let controller = controller_from_state(&state);
    let snapshot = controller.reset().await;
    emit_classification_state(&app_handle, &snapshot);
    Ok(snapshot)
}

fn emit_classification_state(app_handle: &AppHandle, snapshot: &ClassificationState) {
    let _ = app_handle.emit("classification-state-changed", snapshot);
}
