//! Order service boundary and lifecycle cancellation.

use crate::error::ClientError;
use reprise_types::{
    CreateOrderRequest, CreatedOrder, DeliveryRequest, Location, NegotiationView, Offer,
    OrderState, UserId,
};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Calls the negotiation core makes, always on behalf of one signed-in user.
pub trait MarketplaceApi: Send + Sync {
    /// Offers listed by `seller_id`.
    fn offers_of(
        &self,
        seller_id: UserId,
    ) -> impl Future<Output = Result<Vec<Offer>, ClientError>> + Send;

    fn search_locations(
        &self,
        term: &str,
    ) -> impl Future<Output = Result<Vec<Location>, ClientError>> + Send;

    fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> impl Future<Output = Result<CreatedOrder, ClientError>> + Send;

    fn negotiation(
        &self,
        order_id: u64,
    ) -> impl Future<Output = Result<NegotiationView, ClientError>> + Send;

    fn accept(&self, order_id: u64) -> impl Future<Output = Result<OrderState, ClientError>> + Send;

    fn propose(
        &self,
        order_id: u64,
        amount: f64,
    ) -> impl Future<Output = Result<OrderState, ClientError>> + Send;

    fn choose_delivery(
        &self,
        order_id: u64,
        request: &DeliveryRequest,
    ) -> impl Future<Output = Result<OrderState, ClientError>> + Send;
}

/// Closes a wizard or card from another task, e.g. while a request is in
/// flight.
#[derive(Debug, Clone)]
pub struct CloseHandle(CancellationToken);

impl CloseHandle {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self(token)
    }

    pub fn close(&self) {
        self.0.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_cancelled()
    }
}

/// Await `call` unless the lifecycle is cancelled first; a result that lands
/// after cancellation is discarded.
pub(crate) async fn guarded<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = Result<T, ClientError>>,
) -> Result<T, ClientError> {
    if cancel.is_cancelled() {
        return Err(ClientError::Closed);
    }
    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ClientError::Closed),
        result = call => result,
    };
    if cancel.is_cancelled() {
        return Err(ClientError::Closed);
    }
    result
}
