use std::sync::Arc;

use log::{error, info};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::api::InferenceHandle;
use crate::models::Product;
use crate::requests::RequestGate;

pub const RECOMMENDATIONS_ERROR: &str =
    "No fue posible cargar las recomendaciones. Inténtalo de nuevo.";

const DEFAULT_TOP_RATED_LIMIT: u32 = 12;
const MAX_TOP_RATED_LIMIT: u32 = 50;
const DEFAULT_NEIGHBORS: u32 = 6;
const MAX_NEIGHBORS: u32 = 20;

/// State of the recommendation page: the top-rated browse grid, the
/// neighbors of the last queried product, and which card has its detail
/// panel open.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationState {
    pub top_rated: Vec<Product>,
    pub recommendations: Vec<Product>,
    pub query: Option<String>,
    pub selected: Option<String>,
    pub error: Option<String>,
    pub loading_top_rated: bool,
    pub loading_recommendations: bool,
}

#[derive(Clone)]
pub struct RecommendController {
    api: InferenceHandle,
    state: Arc<Mutex<RecommendationState>>,
    browse_gate: RequestGate,
    query_gate: RequestGate,
}

impl RecommendController {
    pub fn new(api: InferenceHandle) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(RecommendationState::default())),
            browse_gate: RequestGate::new(),
            query_gate: RequestGate::new(),
        }
    }

    pub async fn get_state(&self) -> RecommendationState {
        self.state.lock().await.clone()
    }

    /// Fills the browse grid with the highest-rated products.
    pub async fn load_top_rated(&self, limit: Option<u32>) -> RecommendationState {
        let limit = limit
            .unwrap_or(DEFAULT_TOP_RATED_LIMIT)
            .clamp(1, MAX_TOP_RATED_LIMIT);

        let ticket = self.browse_gate.begin().await;
        {
            let mut state = self.state.lock().await;
            if ticket.token.is_cancelled() {
                return state.clone();
            }
            state.loading_top_rated = true;
        }

        let client = self.api.current();
        let outcome = tokio::select! {
            _ = ticket.token.cancelled() => {
                info!("top-rated load superseded before completion");
                return self.get_state().await;
            }
            result = client.top_rated(limit) => result,
        };

        let mut state = self.state.lock().await;
        if !self.browse_gate.finish(&ticket).await {
            info!("dropping stale top-rated response");
            return state.clone();
        }

        match outcome {
            Ok(products) => {
                state.top_rated = products;
                state.error = None;
            }
            Err(err) => {
                error!("Top-rated load failed: {err:#}");
                state.error = Some(RECOMMENDATIONS_ERROR.to_string());
            }
        }
        state.loading_top_rated = false;
        state.clone()
    }

    /// Looks the product up by name, then fetches its nearest neighbors.
    /// Both hops run under one ticket so a newer query cancels the whole
    /// pair. A blank name is a no-op.
    pub async fn fetch_recommendations(
        &self,
        name: String,
        k: Option<u32>,
    ) -> RecommendationState {
        let name = name.trim().to_string();
        if name.is_empty() {
            return self.get_state().await;
        }
        let k = k.unwrap_or(DEFAULT_NEIGHBORS).clamp(1, MAX_NEIGHBORS);

        let ticket = self.query_gate.begin().await;
        {
            let mut state = self.state.lock().await;
            if ticket.token.is_cancelled() {
                return state.clone();
            }
            state.loading_recommendations = true;
        }

        let client = self.api.current();
        let outcome = tokio::select! {
            _ = ticket.token.cancelled() => {
                info!("recommendation query superseded before completion");
                return self.get_state().await;
            }
            result = async {
                let index = client.product_index(&name).await?;
                client.recommend(index, k).await
            } => result,
        };

        let mut state = self.state.lock().await;
        if !self.query_gate.finish(&ticket).await {
            info!("dropping stale recommendation response");
            return state.clone();
        }

        match outcome {
            Ok(products) => {
                state.recommendations = products;
                state.query = Some(name);
                state.selected = None;
                state.error = None;
            }
            Err(err) => {
                error!("Recommendation query failed: {err:#}");
                state.error = Some(RECOMMENDATIONS_ERROR.to_string());
            }
        }
        state.loading_recommendations = false;
        state.clone()
    }

    /// Opens the detail panel of the named product, or closes it when it is
    /// already the open one.
    pub async fn toggle_details(&self, name: String) -> RecommendationState {
        let mut state = self.state.lock().await;
        if state.selected.as_deref() == Some(name.as_str()) {
            state.selected = None;
        } else {
            state.selected = Some(name);
        }
        state.clone()
    }

    pub async fn reset(&self) -> RecommendationState {
        self.browse_gate.cancel_active().await;
        self.query_gate.cancel_active().await;

        let mut state = self.state.lock().await;
        *state = RecommendationState::default();
        state.clone()
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use crate::api::{test_client, InferenceHandle};

    use super::*;

    fn controller_for(server: &MockServer) -> RecommendController {
        RecommendController::new(InferenceHandle::new(test_client(&server.base_url())))
    }

    #[tokio::test]
    async fn selecting_a_product_twice_closes_its_detail_panel() {
        let server = MockServer::start_async().await;
        let controller = controller_for(&server);

        let opened = controller.toggle_details("Desk Lamp".into()).await;
        assert_eq!(opened.selected.as_deref(), Some("Desk Lamp"));

        let closed = controller.toggle_details("Desk Lamp".into()).await;
        assert!(closed.selected.is_none());
    }

    #[tokio::test]
    async fn selecting_another_product_moves_the_panel() {
        let server = MockServer::start_async().await;
        let controller = controller_for(&server);

        controller.toggle_details("Desk Lamp".into()).await;
        let state = controller.toggle_details("Clip Lamp".into()).await;

        assert_eq!(state.selected.as_deref(), Some("Clip Lamp"));
    }

    #[tokio::test]
    async fn browse_grid_loads_with_the_default_limit() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/top_rated").query_param("limit", "12");
                then.status(200).json_body(json!([
                    { "name": "A", "ratings": 4.9 },
                    { "name": "B", "ratings": 4.8 }
                ]));
            })
            .await;

        let controller = controller_for(&server);
        let state = controller.load_top_rated(None).await;

        mock.assert_async().await;
        assert_eq!(state.top_rated.len(), 2);
        assert!(!state.loading_top_rated);
    }

    #[tokio::test]
    async fn query_resolves_the_index_then_fetches_neighbors() {
        let server = MockServer::start_async().await;
        let index_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/product_index")
                    .query_param("name", "Desk Lamp");
                then.status(200).json_body(json!({ "index": 42 }));
            })
            .await;
        let recommend_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/recommend")
                    .query_param("index", "42")
                    .query_param("k", "6");
                then.status(200).json_body(json!([
                    { "name": "Clip Lamp", "score": 0.93 },
                    { "name": "Floor Lamp", "score": 0.88 }
                ]));
            })
            .await;

        let controller = controller_for(&server);
        controller.toggle_details("Old Pick".into()).await;
        let state = controller
            .fetch_recommendations("  Desk Lamp  ".into(), None)
            .await;

        index_mock.assert_async().await;
        recommend_mock.assert_async().await;
        assert_eq!(state.recommendations.len(), 2);
        assert_eq!(state.query.as_deref(), Some("Desk Lamp"));
        assert!(state.selected.is_none(), "new results close the panel");
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn blank_query_sends_nothing() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/product_index");
                then.status(200).json_body(json!({ "index": 1 }));
            })
            .await;

        let controller = controller_for(&server);
        let state = controller.fetch_recommendations("   ".into(), None).await;

        assert_eq!(mock.calls_async().await, 0);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn failed_lookup_keeps_previous_recommendations() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/product_index")
                    .query_param("name", "Desk Lamp");
                then.status(200).json_body(json!({ "index": 42 }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/recommend").query_param("index", "42");
                then.status(200)
                    .json_body(json!([{ "name": "Clip Lamp", "score": 0.93 }]));
            })
            .await;

        let controller = controller_for(&server);
        controller
            .fetch_recommendations("Desk Lamp".into(), None)
            .await;

        // Unknown product: the index lookup 404s, nothing matches it.
        let state = controller
            .fetch_recommendations("No Such Product".into(), None)
            .await;

        assert_eq!(state.recommendations.len(), 1);
        assert_eq!(state.query.as_deref(), Some("Desk Lamp"));
        assert_eq!(state.error.as_deref(), Some(RECOMMENDATIONS_ERROR));
        assert!(!state.loading_recommendations);
    }

    #[tokio::test]
    async fn reset_clears_the_page() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/top_rated");
                then.status(200).json_body(json!([{ "name": "A" }]));
            })
            .await;

        let controller = controller_for(&server);
        controller.load_top_rated(Some(3)).await;
        controller.toggle_details("A".into()).await;

        let state = controller.reset().await;

        assert!(state.top_rated.is_empty());
        assert!(state.recommendations.is_empty());
        assert!(state.selected.is_none());
        assert!(!state.loading_top_rated);
        assert!(!state.loading_recommendations);
    }
}
