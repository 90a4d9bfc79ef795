use tauri::{AppHandle, Emitter, State};

use crate::AppState;

use super::{RecommendController, RecommendationState};

fn controller_from_state(state: &State<'_, AppState>) -> RecommendController {
    state.recommend.clone()
}

#[tauri::command]
pub async fn get_recommendation_state(
    state: State<'_, AppState>,
) -> Result<RecommendationState, String> {
    let controller = controller_from_state(&state);
    Ok(controller.get_state().await)
}

#[tauri::command]
pub async fn load_top_rated(
    state: State<'_, AppState>,
    app_handle: AppHandle,
    limit: Option<u32>,
) -> Result<RecommendationState, String> {
    let controller = controller_from_state(&state);
    let snapshot = controller.load_top_rated(limit).await;
    emit_recommendation_state(&app_handle, &snapshot);
    Ok(snapshot)
}

#[tauri::command]
pub async fn fetch_recommendations(
    state: State<'_, AppState>,
    app_handle: AppHandle,
    name: String,
    k: Option<u32>,
) -> Result<RecommendationState, String> {
    let controller = controller_from_state(&state);
    let snapshot = controller.fetch_recommendations(name, k).await;
    emit_recommendation_state(&app_handle, &snapshot);
    Ok(snapshot)
}

#[tauri::command]
pub async fn toggle_product_details(
    state: State<'_, AppState>,
    app_handle: AppHandle,
    name: String,
) -> Result<RecommendationState, String> {
    let controller = controller_from_state(&state);
    let snapshot = controller.toggle_details(name).await;
    emit_recommendation_state(&app_handle, &snapshot);
    Ok(snapshot)
}

#[tauri::command]
pub async fn reset_recommendation_state(
    state: State<'_, AppState>,
    app_handle: AppHandle,
) -> Result<RecommendationState, String> {
    let controller = controller_from_state(&state);
    let snapshot = controller.reset().await;
    emit_recommendation_state(&app_handle, &snapshot);
    Ok(snapshot)
}

fn emit_recommendation_state(app_handle: &AppHandle, snapshot: &RecommendationState) {
    let _ = app_handle.emit("recommendation-state-changed", snapshot);
}
