//! # Reprise client
//!
//! Client-side negotiation core for trade-in orders:
//!
//! - [`RepriseWizard`]: pick one of my offers, settle the balance, choose
//!   delivery or pickup, then create the order.
//! - [`NegotiationCard`]: resume an existing order at the price or delivery
//!   step, driven by the server's order status.
//! - [`LocationSearch`]: debounced address lookup used by the wizard.
//!
//! All network access goes through [`MarketplaceApi`]; [`HttpApi`] is the
//! reqwest implementation.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod resumption;
pub mod search;
pub mod wizard;

#[cfg(test)]
mod testing;

pub use api::{CloseHandle, MarketplaceApi};
pub use config::ClientConfig;
pub use error::{CardError, ClientError, WizardError};
pub use http::HttpApi;
pub use resumption::{
    Affordance, CardState, DeliveryNegotiation, NegotiationCard, PriceNegotiation, Role,
};
pub use search::{LocationSearch, SearchSnapshot};
pub use wizard::{Confirmation, CreateOfferExit, NegotiationDraft, RepriseWizard, WizardStep};
