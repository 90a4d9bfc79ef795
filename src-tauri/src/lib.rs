mod api;
mod classify;
mod demand;
mod models;
mod recommend;
mod requests;
mod settings;

use api::{InferenceClient, InferenceHandle};
use classify::{
    commands::{
        classify_product_image, get_classification_state, pick_product_image,
        reset_classification_state,
    },
    ClassifyController,
};
use demand::{
    commands::{get_demand_state, predict_multiple_days, predict_single_day, reset_demand_state},
    DemandController,
};
use recommend::{
    commands::{
        fetch_recommendations, get_recommendation_state, load_top_rated,
        reset_recommendation_state, toggle_product_details,
    },
    RecommendController,
};
use settings::{InferenceSettings, SettingsStore};
use tauri::{Emitter, Manager, State};

pub(crate) struct AppState {
    pub(crate) api: InferenceHandle,
    pub(crate) demand: DemandController,
    pub(crate) classify: ClassifyController,
    pub(crate) recommend: RecommendController,
    pub(crate) settings: SettingsStore,
}

#[tauri::command]
fn get_inference_settings(state: State<AppState>) -> Result<InferenceSettings, String> {
    Ok(state.settings.inference())
}

#[tauri::command]
fn set_inference_settings(
    settings: InferenceSettings,
    state: State<AppState>,
    app_handle: tauri::AppHandle,
) -> Result<(), String> {
    let client = InferenceClient::from_settings(&settings).map_err(|e| e.to_string())?;

    state
        .settings
        .update_inference(settings.clone())
        .map_err(|e| e.to_string())?;
    state.api.replace(client);

    app_handle
        .emit("inference-settings-updated", &settings)
        .map_err(|e| e.to_string())?;

    Ok(())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("E-commerce dashboard starting up...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let settings_path = app_data_dir.join("settings.json");
                let settings_store = SettingsStore::new(settings_path)?;

                let api = InferenceHandle::new(InferenceClient::from_settings(
                    &settings_store.inference(),
                )?);

                app.manage(AppState {
                    demand: DemandController::new(api.clone()),
                    classify: ClassifyController::new(api.clone()),
                    recommend: RecommendController::new(api.clone()),
                    api,
                    settings: settings_store,
                });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            get_inference_settings,
            set_inference_settings,
            get_demand_state,
            predict_single_day,
            predict_multiple_days,
            reset_demand_state,
            get_classification_state,
            pick_product_image,
            classify_product_image,
            reset_classification_state,
            get_recommendation_state,
            load_top_rated,
            fetch_recommendations,
            toggle_product_details,
            reset_recommendation_state,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
