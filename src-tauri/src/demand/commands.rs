use tauri::{AppHandle, Emitter, State};

use crate::models::DemandInput;
use crate::AppState;

use super::{DemandController, DemandState};

fn controller_from_state(state: &State<'_, AppState>) -> DemandController {
    state.demand.clone()
}

#[tauri::command]
pub async fn get_demand_state(state: State<'_, AppState>) -> Result<DemandState, String> {
    let controller = controller_from_state(&state);
    Ok(controller.get_state().await)
}

#[tauri::command]
pub async fn predict_single_day(
    state: State<'_, AppState>,
    app_handle: AppHandle,
    input: DemandInput,
) -> Result<DemandState, String> {
    let controller = controller_from_state(&state);
    let snapshot = controller.predict_single_day(input).await;
    emit_demand_state(&app_handle, &snapshot);
    Ok(snapshot)
}

#[tauri::command]
pub async fn predict_multiple_days(
    state: State<'_, AppState>,
    app_handle: AppHandle,
    days: u32,
) -> Result<DemandState, String> {
    let controller = controller_from_state(&state);
    let snapshot = controller.predict_multiple_days(days).await;
    emit_demand_state(&app_handle, &snapshot);
    Ok(snapshot)
}

#[tauri::command]
pub async fn reset_demand_state(
    state: State<'_, AppState>,
    app_handle: AppHandle,
) -> Result<DemandState, String> {
    let controller = controller_from_state(&state);
    let snapshot = controller.reset().await;
    emit_demand_state(&app_handle, &snapshot);
    Ok(snapshot)
}

fn emit_demand_state(app_handle: &AppHandle, snapshot: &DemandState) {
    let _ = app_handle.emit("demand-state-changed", snapshot);
}
