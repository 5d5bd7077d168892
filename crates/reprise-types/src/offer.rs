//! Listings and addresses as read by the trade-in flow.

use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type OfferId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCondition {
    New,
    LikeNew,
    #[default]
    Good,
    Fair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    #[default]
    Available,
    Reserved,
    Sold,
}

/// A single listing, owned by exactly one seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: OfferId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub seller_id: UserId,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub product_condition: ProductCondition,
    #[serde(default)]
    pub status: OfferStatus,
    #[serde(default)]
    pub is_deleted: bool,
}

impl Offer {
    pub fn is_tradeable(&self) -> bool {
        !self.is_deleted && self.status == OfferStatus::Available
    }
}

/// Address search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: u64,
    #[serde(default)]
    pub address_name: String,
    pub city: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub has_coordinates: bool,
}

impl Location {
    /// `city, sector`, or the city alone when no sector is known.
    pub fn label(&self) -> String {
        match self.sector.as_deref().filter(|s| !s.is_empty()) {
            Some(sector) => format!("{}, {}", self.city, sector),
            None => self.city.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_defaults_when_fields_missing() {
        let offer: Offer = serde_json::from_str(
            r#"{"id": 4, "title": "Bike", "price": 120.5, "sellerId": 9}"#,
        )
        .unwrap();
        assert_eq!(offer.product_condition, ProductCondition::Good);
        assert_eq!(offer.status, OfferStatus::Available);
        assert!(offer.is_tradeable());
    }

    #[test]
    fn deleted_or_sold_offers_are_not_tradeable() {
        let mut offer: Offer =
            serde_json::from_str(r#"{"id": 1, "title": "x", "price": 1, "sellerId": 1}"#).unwrap();
        offer.status = OfferStatus::Sold;
        assert!(!offer.is_tradeable());
        offer.status = OfferStatus::Available;
        offer.is_deleted = true;
        assert!(!offer.is_tradeable());
    }

    #[test]
    fn location_label_includes_sector() {
        let mut loc: Location =
            serde_json::from_str(r#"{"id": 3, "city": "Rabat", "sector": "Agdal"}"#).unwrap();
        assert_eq!(loc.label(), "Rabat, Agdal");
        loc.sector = None;
        assert_eq!(loc.label(), "Rabat");
    }

    #[test]
    fn condition_uses_snake_case() {
        let json = serde_json::to_string(&ProductCondition::LikeNew).unwrap();
        assert_eq!(json, "\"like_new\"");
    }
}
