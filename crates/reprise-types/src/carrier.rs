//! Delivery carriers offered once both parties agree on the balance.

use serde::{Deserialize, Serialize};

/// A carrier with its listed price and promotional discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carrier {
    pub key: &'static str,
    pub name: &'static str,
    pub base_price: u32,
    pub discount_percent: u32,
    /// Highlighted as the best deal.
    pub best: bool,
}

pub static CARRIERS: [Carrier; 3] = [
    Carrier {
        key: "ozonexpress",
        name: "OzonExpress",
        base_price: 50,
        discount_percent: 5,
        best: false,
    },
    Carrier {
        key: "forcelog",
        name: "Forcelog",
        base_price: 48,
        discount_percent: 10,
        best: false,
    },
    Carrier {
        key: "cathedis",
        name: "Cathedis",
        base_price: 45,
        discount_percent: 15,
        best: true,
    },
];

/// `round(base_price * (1 - discount_percent / 100))`, floored at zero.
pub fn discounted_price(base_price: f64, discount_percent: f64) -> f64 {
    (base_price * (1.0 - discount_percent / 100.0)).round().max(0.0)
}

pub fn find_carrier(key: &str) -> Option<&'static Carrier> {
    CARRIERS.iter().find(|c| c.key == key)
}

impl Carrier {
    pub fn effective_price(&self) -> f64 {
        discounted_price(f64::from(self.base_price), f64::from(self.discount_percent))
    }

    pub fn quote(&self) -> CarrierQuote {
        CarrierQuote {
            key: self.key.to_string(),
            name: self.name.to_string(),
            base_price: f64::from(self.base_price),
            discount_percent: f64::from(self.discount_percent),
            effective_price: self.effective_price(),
            best: self.best,
        }
    }
}

/// Carrier as displayed to the order sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierQuote {
    pub key: String,
    pub name: String,
    pub base_price: f64,
    pub discount_percent: f64,
    pub effective_price: f64,
    pub best: bool,
}
