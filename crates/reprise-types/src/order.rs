//! Reprise order wire types.

use serde::{Deserialize, Serialize};

use crate::{Direction, OfferId, ProductCondition, UserId};

/// Server-reported order status.
///
/// Statuses this crate does not know are preserved verbatim in `Other` so
/// callers can refuse to act on them instead of guessing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    Accepted,
    DeliveryScheduled,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::DeliveryScheduled => "delivery_scheduled",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => Self::Pending,
            "accepted" => Self::Accepted,
            "delivery_scheduled" => Self::DeliveryScheduled,
            _ => Self::Other(raw),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    #[default]
    Delivery,
    Pickup,
}

impl DeliveryMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delivery => "delivery",
            Self::Pickup => "pickup",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "delivery" => Some(Self::Delivery),
            "pickup" => Some(Self::Pickup),
            _ => None,
        }
    }
}

/// `POST /api/reprise-orders` body.
///
/// Fields are optional on the wire so the service can answer a missing field
/// with a validation message rather than a decode failure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub sender_offer_id: Option<OfferId>,
    #[serde(default)]
    pub receiver_offer_id: Option<OfferId>,
    #[serde(default)]
    pub difference_amount: Option<f64>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub location_id: Option<i64>,
}

impl CreateOrderRequest {
    pub fn new(
        sender_offer_id: OfferId,
        receiver_offer_id: OfferId,
        difference_amount: f64,
        method: DeliveryMethod,
        location_id: Option<u64>,
    ) -> Self {
        Self {
            sender_offer_id: Some(sender_offer_id),
            receiver_offer_id: Some(receiver_offer_id),
            difference_amount: Some(difference_amount),
            method: Some(method.as_str().to_string()),
            location_id: location_id.map(|id| id as i64),
        }
    }
}

/// `POST /api/address/search` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub searched_term: String,
}

/// `POST /api/reprise-orders/{id}/propose` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposeRequest {
    pub amount: f64,
}

/// `POST /api/reprise-orders/{id}/delivery` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub method: DeliveryMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryArrangement {
    pub method: DeliveryMethod,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

/// Authoritative order fields exposed to the parties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderState {
    pub id: u64,
    pub status: OrderStatus,
    pub balance_amount: f64,
    #[serde(default)]
    pub balance_payer_id: Option<UserId>,
    #[serde(default)]
    pub balance_sender_id: Option<UserId>,
    #[serde(default)]
    pub delivery: Option<DeliveryArrangement>,
}

/// Listing frozen at order creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub offer_id: OfferId,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub product_condition: ProductCondition,
    #[serde(default)]
    pub image: Option<String>,
}

/// Compact offer card used by the negotiation view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInfo {
    pub id: OfferId,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub image: Option<String>,
}

impl From<&ProductSnapshot> for ItemInfo {
    fn from(snapshot: &ProductSnapshot) -> Self {
        Self {
            id: snapshot.offer_id,
            title: snapshot.title.clone(),
            price: snapshot.price,
            image: snapshot.image.clone(),
        }
    }
}

/// `GET /api/reprise-orders/negotiation/{id}` payload, from the caller's side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationView {
    pub target: ItemInfo,
    pub mine: ItemInfo,
    pub difference: f64,
    pub direction: Direction,
    pub order: OrderState,
    pub is_order_sender: bool,
    #[serde(default)]
    pub sender_display_name: Option<String>,
}

/// Order returned by the creation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub order: OrderState,
    pub balance_logic: BalanceLogic,
}

/// Prices the balance was computed from, and who owes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceLogic {
    pub sender_price: f64,
    pub receiver_price: f64,
    /// Owner of the cheaper offer; `None` when both prices match.
    #[serde(default)]
    pub cheaper_user_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartySummary {
    pub user_id: UserId,
    pub name: String,
}

/// Row of the sent/received order listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub order: OrderState,
    pub sender: PartySummary,
    pub receiver: PartySummary,
    pub sender_offer: ProductSnapshot,
    pub receiver_offer: ProductSnapshot,
    pub created_at_ms: u64,
}
