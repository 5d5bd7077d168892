//! In-memory catalogue: users, offers, addresses and reprise orders.

use reprise_types::{
    DeliveryArrangement, Location, Offer, OfferId, OrderStatus, ProductSnapshot, UserId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: u64,
    pub address_name: String,
    pub city: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Address {
    pub fn to_location(&self) -> Location {
        let display_name = match self.sector.as_deref() {
            Some(sector) if !sector.is_empty() => {
                format!("{}, {}, {}", self.address_name, self.city, sector)
            }
            _ => format!("{}, {}", self.address_name, self.city),
        };
        Location {
            id: self.id,
            address_name: self.address_name.clone(),
            city: self.city.clone(),
            sector: self.sector.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            display_name,
            has_coordinates: self.latitude.is_some() && self.longitude.is_some(),
        }
    }
}

/// Party details frozen at order creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub is_sender: bool,
    #[serde(default)]
    pub address_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: u64,
    pub status: OrderStatus,
    pub balance_amount: f64,
    #[serde(default)]
    pub balance_payer_id: Option<UserId>,
    /// Author of the balance proposal currently on the table.
    #[serde(default)]
    pub balance_sender_id: Option<UserId>,
    pub sender: UserSnapshot,
    pub receiver: UserSnapshot,
    pub sender_offer: ProductSnapshot,
    pub receiver_offer: ProductSnapshot,
    #[serde(default)]
    pub location_id: Option<u64>,
    #[serde(default)]
    pub delivery: Option<DeliveryArrangement>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

impl Order {
    pub fn is_party(&self, user_id: UserId) -> bool {
        self.sender.user_id == user_id || self.receiver.user_id == user_id
    }
}

/// On-disk shape: plain arrays, friendlier to hand-written seed files.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub offers: Vec<Offer>,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

#[derive(Debug, Default, Clone)]
pub struct Catalog {
    pub users: BTreeMap<UserId, User>,
    pub offers: BTreeMap<OfferId, Offer>,
    pub addresses: BTreeMap<u64, Address>,
    pub orders: BTreeMap<u64, Order>,
    next_order_id: u64,
}

impl From<CatalogSnapshot> for Catalog {
    fn from(snapshot: CatalogSnapshot) -> Self {
        let orders: BTreeMap<u64, Order> =
            snapshot.orders.into_iter().map(|o| (o.id, o)).collect();
        let next_order_id = orders.keys().next_back().copied().unwrap_or(0) + 1;
        Self {
            users: snapshot.users.into_iter().map(|u| (u.id, u)).collect(),
            offers: snapshot.offers.into_iter().map(|o| (o.id, o)).collect(),
            addresses: snapshot.addresses.into_iter().map(|a| (a.id, a)).collect(),
            orders,
            next_order_id,
        }
    }
}

impl Catalog {
    pub fn to_snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            users: self.users.values().cloned().collect(),
            offers: self.offers.values().cloned().collect(),
            addresses: self.addresses.values().cloned().collect(),
            orders: self.orders.values().cloned().collect(),
        }
    }

    pub(crate) fn allocate_order_id(&mut self) -> u64 {
        let id = self.next_order_id.max(1);
        self.next_order_id = id + 1;
        id
    }

    /// Non-deleted offers of one seller, in id order.
    pub fn offers_by_seller(&self, seller_id: UserId) -> Vec<Offer> {
        self.offers
            .values()
            .filter(|o| o.seller_id == seller_id && !o.is_deleted)
            .cloned()
            .collect()
    }

    /// Case-insensitive substring search over name, city and sector.
    ///
    /// Ranked by which field matched (name, then city, then sector), then by
    /// address name.
    pub fn search_addresses(&self, term: &str, limit: usize) -> Vec<Location> {
        let needle = term.trim().to_lowercase();
        let contains = |field: &str| field.to_lowercase().contains(&needle);

        let mut hits: Vec<(u8, &Address)> = self
            .addresses
            .values()
            .filter_map(|a| {
                let rank = if contains(&a.address_name) {
                    1
                } else if contains(&a.city) {
                    2
                } else if a.sector.as_deref().is_some_and(|s| contains(s)) {
                    3
                } else {
                    return None;
                };
                Some((rank, a))
            })
            .collect();
        hits.sort_by(|(ra, a), (rb, b)| ra.cmp(rb).then_with(|| a.address_name.cmp(&b.address_name)));
        hits.into_iter()
            .take(limit)
            .map(|(_, a)| a.to_location())
            .collect()
    }
}
