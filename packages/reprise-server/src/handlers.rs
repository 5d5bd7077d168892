//! HTTP request handlers.

use crate::metrics::{Metrics, METRICS};
use crate::middleware::{Caller, RequestId};
use crate::orders::ListingSide;
use crate::response::HealthResponse;
use crate::state::AppState;
use crate::Error;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use reprise_types::{
    ApiEnvelope, CreateOrderRequest, CreatedOrder, DeliveryMethod, DeliveryRequest, Location,
    NegotiationView, Offer, OrderState, OrderStatus, OrderSummary, ProposeRequest, RepriseError,
    SearchRequest, UserId,
};
use serde::Deserialize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

const MIN_SEARCH_CHARS: usize = 2;
const DEFAULT_PAGE_LIMIT: u32 = 10;

type ApiResult<T> = Result<Json<ApiEnvelope<T>>, Error>;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
    payload.map(|Json(v)| v).map_err(|e| {
        warn!(error = %e, "Rejected request body");
        Error::from(RepriseError::InvalidInput("Invalid JSON body".into()))
    })
}

fn order_id(path: Result<Path<u64>, PathRejection>) -> Result<u64, Error> {
    path.map(|Path(id)| id)
        .map_err(|_| Error::from(RepriseError::InvalidInput("Invalid order id".into())))
}

fn count_request(state: &AppState) {
    state.request_count.fetch_add(1, Ordering::Relaxed);
}

/// Prometheus metrics in text exposition format.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, Error> {
    let open_orders = state
        .store
        .read()?
        .orders
        .values()
        .filter(|o| matches!(o.status, OrderStatus::Pending | OrderStatus::Accepted))
        .count();
    let body = METRICS.render(
        open_orders,
        state.request_count.load(Ordering::Relaxed),
        state.start_time.elapsed().as_secs(),
    );
    Ok((
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )],
        body,
    ))
}

/// Liveness and basic counters.
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, Error> {
    let orders = state.store.read()?.orders.len();
    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.start_time.elapsed().as_secs(),
        requests: state.request_count.load(Ordering::Relaxed),
        orders,
        persistence: state.config.persistence_enabled(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffersQuery {
    seller_id: Option<UserId>,
}

/// `GET /api/offers?sellerId=` (defaults to the caller's own offers).
pub async fn list_offers(
    State(state): State<Arc<AppState>>,
    Extension(Caller(caller)): Extension<Caller>,
    Query(query): Query<OffersQuery>,
) -> ApiResult<Vec<Offer>> {
    count_request(&state);
    let seller_id = query.seller_id.or(caller).ok_or_else(|| {
        RepriseError::InvalidInput("sellerId is required".into())
    })?;
    let offers = state.store.read()?.offers_by_seller(seller_id);
    Ok(Json(ApiEnvelope::ok(offers)))
}

/// `POST /api/address/search`
pub async fn search_addresses(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<Vec<Location>> {
    count_request(&state);
    Metrics::incr(&METRICS.address_searches);
    let request = body(payload)?;
    let term = request.searched_term.trim();
    if term.chars().count() < MIN_SEARCH_CHARS {
        return Err(RepriseError::InvalidInput(
            "searchedTerm must be at least 2 characters".into(),
        )
        .into());
    }
    let hits = state
        .store
        .read()?
        .search_addresses(term, state.config.search_result_limit);
    let message = format!("{} address(es) found", hits.len());
    Ok(Json(ApiEnvelope::ok(hits).with_message(message)))
}

/// `POST /api/reprise-orders`
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(RequestId(req_id)): Extension<RequestId>,
    Extension(Caller(caller)): Extension<Caller>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiEnvelope<CreatedOrder>>), Error> {
    count_request(&state);
    let request = body(payload)?;
    let now = state.now_ms();

    match state.store.mutate(|c| c.create_order(caller, &request, now)) {
        Ok(created) => {
            Metrics::incr(&METRICS.orders_created);
            info!(req_id = %req_id, order_id = created.order.id, "Order stored");
            Ok((
                StatusCode::CREATED,
                Json(ApiEnvelope::ok(created).with_message("Reprise order created")),
            ))
        }
        Err(e) => {
            Metrics::incr(&METRICS.orders_rejected);
            warn!(req_id = %req_id, caller = ?caller, error = %e, "Order rejected");
            Err(e)
        }
    }
}

/// `GET /api/reprise-orders/negotiation/{orderId}`
pub async fn negotiation(
    State(state): State<Arc<AppState>>,
    Extension(Caller(caller)): Extension<Caller>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<NegotiationView> {
    count_request(&state);
    Metrics::incr(&METRICS.negotiation_views);
    let id = order_id(path)?;
    let view = state.store.read()?.negotiation_view(caller, id)?;
    Ok(Json(ApiEnvelope::ok(view)))
}

/// `POST /api/reprise-orders/{orderId}/accept`
pub async fn accept(
    State(state): State<Arc<AppState>>,
    Extension(Caller(caller)): Extension<Caller>,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<OrderState> {
    count_request(&state);
    let id = order_id(path)?;
    let now = state.now_ms();
    let order = state
        .store
        .mutate(|c| c.accept_balance(caller, id, now))?;
    Metrics::incr(&METRICS.acceptances);
    Ok(Json(ApiEnvelope::ok(order).with_message("Balance accepted")))
}

/// `POST /api/reprise-orders/{orderId}/propose`
pub async fn propose(
    State(state): State<Arc<AppState>>,
    Extension(Caller(caller)): Extension<Caller>,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<ProposeRequest>, JsonRejection>,
) -> ApiResult<OrderState> {
    count_request(&state);
    let id = order_id(path)?;
    let request = body(payload)?;
    let now = state.now_ms();
    let order = state
        .store
        .mutate(|c| c.propose_balance(caller, id, request.amount, now))?;
    Metrics::incr(&METRICS.proposals);
    Ok(Json(ApiEnvelope::ok(order).with_message("Proposal sent")))
}

/// `POST /api/reprise-orders/{orderId}/delivery`
pub async fn delivery(
    State(state): State<Arc<AppState>>,
    Extension(Caller(caller)): Extension<Caller>,
    path: Result<Path<u64>, PathRejection>,
    payload: Result<Json<DeliveryRequest>, JsonRejection>,
) -> ApiResult<OrderState> {
    count_request(&state);
    let id = order_id(path)?;
    let request = body(payload)?;
    let now = state.now_ms();
    let order = state
        .store
        .mutate(|c| c.schedule_delivery(caller, id, &request, now))?;
    match request.method {
        DeliveryMethod::Delivery => Metrics::incr(&METRICS.deliveries_scheduled),
        DeliveryMethod::Pickup => Metrics::incr(&METRICS.pickups_scheduled),
    }
    Ok(Json(ApiEnvelope::ok(order).with_message("Delivery method saved")))
}

/// Raw paging parameters; unparsable values fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
    limit: Option<String>,
}

impl PageQuery {
    fn resolve(&self, max_limit: u32) -> (u32, u32) {
        let page = self
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let limit = self
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<u32>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .min(max_limit.max(1));
        (page, limit)
    }
}

async fn list(
    state: Arc<AppState>,
    caller: Option<UserId>,
    side: ListingSide,
    query: PageQuery,
) -> ApiResult<Vec<OrderSummary>> {
    count_request(&state);
    let (page, limit) = query.resolve(state.config.max_page_limit);
    let (rows, pagination) = state.store.read()?.list_orders(caller, side, page, limit)?;
    Ok(Json(ApiEnvelope::ok(rows).with_pagination(pagination)))
}

/// `GET /api/reprise-orders/received-orders-on-my-offers`
pub async fn received_orders(
    State(state): State<Arc<AppState>>,
    Extension(Caller(caller)): Extension<Caller>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Vec<OrderSummary>> {
    list(state, caller, ListingSide::Received, query).await
}

/// `GET /api/reprise-orders/sended-orders-on-my-offers`
pub async fn sent_orders(
    State(state): State<Arc<AppState>>,
    Extension(Caller(caller)): Extension<Caller>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Vec<OrderSummary>> {
    list(state, caller, ListingSide::Sent, query).await
}
