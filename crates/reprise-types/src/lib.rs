//! Shared wire types and pure-logic utilities for the reprise (trade-in) flow.
//! No I/O, usable by the negotiation client and the order service alike.

mod carrier;
mod envelope;
mod error;
mod offer;
mod order;
mod pricing;
mod sanitize;

pub use carrier::{CARRIERS, Carrier, CarrierQuote, discounted_price, find_carrier};
pub use envelope::{ApiEnvelope, Pagination};
pub use error::RepriseError;
pub use offer::{Location, Offer, OfferId, OfferStatus, ProductCondition, UserId};
pub use order::{
    BalanceLogic, CreateOrderRequest, CreatedOrder, DeliveryArrangement, DeliveryMethod,
    DeliveryRequest, ItemInfo, NegotiationView, OrderState, OrderStatus, OrderSummary,
    PartySummary, ProductSnapshot, ProposeRequest, SearchRequest,
};
pub use pricing::{DifferenceQuote, Direction, amount_or_zero, check_difference, parse_amount};
pub use sanitize::sanitize_string;
