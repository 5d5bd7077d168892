//! `MarketplaceApi` over HTTP.

use crate::api::MarketplaceApi;
use crate::config::ClientConfig;
use crate::error::ClientError;
use reprise_types::{
    ApiEnvelope, CreateOrderRequest, CreatedOrder, DeliveryRequest, Location, NegotiationView,
    Offer, OrderState, ProposeRequest, SearchRequest, UserId,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Header the order service reads the caller's identity from.
pub const USER_ID_HEADER: &str = "x-user-id";

/// reqwest-backed client acting as one user.
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
    user_id: Option<UserId>,
}

impl HttpApi {
    pub fn new(config: &ClientConfig, user_id: Option<UserId>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ClientError::Transport(format!("HTTP client build failed: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_id,
        })
    }

    /// Same connection pool, different identity.
    pub fn as_user(&self, user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..self.clone()
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }

    fn with_identity(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.user_id {
            Some(id) => request.header(USER_ID_HEADER, id.to_string()),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self
            .with_identity(request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiEnvelope<serde_json::Value>>(&bytes)
                .ok()
                .and_then(|envelope| envelope.error.or(envelope.message));
            warn!(status = status.as_u16(), message = ?message, "Order service error");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ApiEnvelope<T> = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Decode(format!("Invalid response body: {e}")))?;
        envelope
            .data
            .ok_or_else(|| ClientError::Decode("Response carried no data".into()))
    }
}

impl MarketplaceApi for HttpApi {
    async fn offers_of(&self, seller_id: UserId) -> Result<Vec<Offer>, ClientError> {
        let request = self
            .http
            .get(self.url("/offers"))
            .query(&[("sellerId", seller_id)]);
        self.send(request).await
    }

    async fn search_locations(&self, term: &str) -> Result<Vec<Location>, ClientError> {
        debug!(term, "Searching locations");
        let body = SearchRequest {
            searched_term: term.to_string(),
        };
        self.send(self.http.post(self.url("/address/search")).json(&body))
            .await
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<CreatedOrder, ClientError> {
        self.send(self.http.post(self.url("/reprise-orders")).json(request))
            .await
    }

    async fn negotiation(&self, order_id: u64) -> Result<NegotiationView, ClientError> {
        let url = self.url(&format!("/reprise-orders/negotiation/{order_id}"));
        self.send(self.http.get(url)).await
    }

    async fn accept(&self, order_id: u64) -> Result<OrderState, ClientError> {
        let url = self.url(&format!("/reprise-orders/{order_id}/accept"));
        self.send(self.http.post(url)).await
    }

    async fn propose(&self, order_id: u64, amount: f64) -> Result<OrderState, ClientError> {
        let url = self.url(&format!("/reprise-orders/{order_id}/propose"));
        self.send(self.http.post(url).json(&ProposeRequest { amount }))
            .await
    }

    async fn choose_delivery(
        &self,
        order_id: u64,
        request: &DeliveryRequest,
    ) -> Result<OrderState, ClientError> {
        let url = self.url(&format!("/reprise-orders/{order_id}/delivery"));
        self.send(self.http.post(url).json(request)).await
    }
}
