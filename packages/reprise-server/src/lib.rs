//! # Reprise order service
//!
//! REST backend for trade-in ("reprise") orders: one user offers their own
//! listing, plus or minus a cash balance, for another user's listing.
//!
//! ## Quick Start
//! ```bash
//! cargo run --bin reprise-server
//! ```
//!
//! ## Endpoints
//! - `GET /health` - Health check
//! - `GET /metrics` - Prometheus counters
//! - `GET /api/offers?sellerId=` - Offers of a seller
//! - `POST /api/address/search` - Meeting/delivery address lookup
//! - `POST /api/reprise-orders` - Create an order
//! - `GET /api/reprise-orders/negotiation/{orderId}` - Negotiation view
//! - `POST /api/reprise-orders/{orderId}/accept` - Accept the balance
//! - `POST /api/reprise-orders/{orderId}/propose` - Counter-propose a balance
//! - `POST /api/reprise-orders/{orderId}/delivery` - Choose delivery or pickup
//! - `GET /api/reprise-orders/received-orders-on-my-offers` - Orders on my offers
//! - `GET /api/reprise-orders/sended-orders-on-my-offers` - Orders I sent
//!
//! The caller is identified by the `x-user-id` header.

pub mod catalog;
pub mod config;
mod error;
mod handlers;
mod metrics;
pub mod middleware;
pub mod orders;
mod response;
mod router;
mod state;
pub mod store;

pub use catalog::{Address, Catalog, CatalogSnapshot, User};
pub use config::Config;
pub use error::Error;
pub use router::create as create_router;
pub use state::AppState;
pub use store::MarketStore;
