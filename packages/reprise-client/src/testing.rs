//! In-memory `MarketplaceApi` for unit tests.

use crate::api::MarketplaceApi;
use crate::error::ClientError;
use reprise_types::{
    BalanceLogic, CreateOrderRequest, CreatedOrder, DeliveryArrangement, DeliveryMethod,
    DeliveryRequest, Direction, ItemInfo, Location, NegotiationView, Offer, OrderState,
    OrderStatus, UserId,
};
use std::sync::Mutex;
use std::time::Duration;

pub fn offer(id: u64, seller_id: UserId, price: f64) -> Offer {
    Offer {
        id,
        title: format!("Offer {id}"),
        description: String::new(),
        price,
        seller_id,
        image: None,
        product_condition: Default::default(),
        status: Default::default(),
        is_deleted: false,
    }
}

/// Negotiation view of a pending 200-vs-150 trade between users 1 (sender,
/// payer) and 2, as seen by `viewer`.
pub fn pending_view(viewer: UserId, author: UserId) -> NegotiationView {
    let sender_side = viewer == 1;
    let (mine, target) = if sender_side {
        (item(10, 150.0), item(20, 200.0))
    } else {
        (item(20, 200.0), item(10, 150.0))
    };
    NegotiationView {
        target,
        mine,
        difference: 50.0,
        direction: if sender_side {
            Direction::Payer
        } else {
            Direction::Recevoir
        },
        order: OrderState {
            id: 7,
            status: OrderStatus::Pending,
            balance_amount: 50.0,
            balance_payer_id: Some(1),
            balance_sender_id: Some(author),
            delivery: None,
        },
        is_order_sender: sender_side,
        sender_display_name: Some("Alice Martin".into()),
    }
}

fn item(id: u64, price: f64) -> ItemInfo {
    ItemInfo {
        id,
        title: format!("Offer {id}"),
        price,
        image: None,
    }
}

/// Scriptable fake of the order service. Mutating calls update the stored
/// negotiation view the way the real service would.
#[derive(Default)]
pub struct MockApi {
    offers: Vec<Offer>,
    search_delay: Duration,
    search_error: Option<String>,
    create_delay: Duration,
    order_delay: Duration,
    acting_user: UserId,
    view: Mutex<Option<NegotiationView>>,
    fail_next: Mutex<Option<ClientError>>,
    searches: Mutex<Vec<String>>,
    created: Mutex<Vec<CreateOrderRequest>>,
    calls: Mutex<Vec<String>>,
}

impl MockApi {
    pub fn with_offers(mut self, offers: Vec<Offer>) -> Self {
        self.offers = offers;
        self
    }

    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = delay;
        self
    }

    pub fn failing_search(mut self, message: &str) -> Self {
        self.search_error = Some(message.to_string());
        self
    }

    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = delay;
        self
    }

    /// Delay applied to negotiation reads and order mutations.
    pub fn with_order_delay(mut self, delay: Duration) -> Self {
        self.order_delay = delay;
        self
    }

    pub fn with_view(self, acting_user: UserId, view: NegotiationView) -> Self {
        *self.view.lock().unwrap() = Some(view);
        Self {
            acting_user,
            ..self
        }
    }

    pub fn fail_next(&self, status: u16, message: &str) {
        *self.fail_next.lock().unwrap() = Some(ClientError::Api {
            status,
            message: Some(message.to_string()),
        });
    }

    pub fn set_status(&self, status: OrderStatus) {
        if let Some(view) = self.view.lock().unwrap().as_mut() {
            view.order.status = status;
        }
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<CreateOrderRequest> {
        self.created.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(call.to_string());
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn order_latency(&self) {
        if !self.order_delay.is_zero() {
            tokio::time::sleep(self.order_delay).await;
        }
    }

    fn update_view(
        &self,
        f: impl FnOnce(&mut NegotiationView),
    ) -> Result<OrderState, ClientError> {
        let mut guard = self.view.lock().unwrap();
        let view = guard.as_mut().ok_or(ClientError::Api {
            status: 404,
            message: Some("Order not found".into()),
        })?;
        f(view);
        Ok(view.order.clone())
    }
}

impl MarketplaceApi for MockApi {
    async fn offers_of(&self, seller_id: UserId) -> Result<Vec<Offer>, ClientError> {
        self.record("offers")?;
        Ok(self
            .offers
            .iter()
            .filter(|o| o.seller_id == seller_id)
            .cloned()
            .collect())
    }

    async fn search_locations(&self, term: &str) -> Result<Vec<Location>, ClientError> {
        self.searches.lock().unwrap().push(term.to_string());
        if !self.search_delay.is_zero() {
            tokio::time::sleep(self.search_delay).await;
        }
        if let Some(message) = &self.search_error {
            return Err(ClientError::Api {
                status: 503,
                message: Some(message.clone()),
            });
        }
        Ok(vec![Location {
            id: 1,
            address_name: term.to_string(),
            city: "Casablanca".into(),
            sector: Some("Centre".into()),
            latitude: None,
            longitude: None,
            display_name: format!("{term}, Casablanca, Centre"),
            has_coordinates: false,
        }])
    }

    async fn create_order(&self, request: &CreateOrderRequest) -> Result<CreatedOrder, ClientError> {
        if !self.create_delay.is_zero() {
            tokio::time::sleep(self.create_delay).await;
        }
        self.record("create")?;
        self.created.lock().unwrap().push(request.clone());
        Ok(CreatedOrder {
            order: OrderState {
                id: 7,
                status: OrderStatus::Pending,
                balance_amount: request.difference_amount.unwrap_or_default(),
                balance_payer_id: None,
                balance_sender_id: None,
                delivery: None,
            },
            balance_logic: BalanceLogic {
                sender_price: 0.0,
                receiver_price: 0.0,
                cheaper_user_id: None,
            },
        })
    }

    async fn negotiation(&self, _order_id: u64) -> Result<NegotiationView, ClientError> {
        self.order_latency().await;
        self.record("negotiation")?;
        self.view.lock().unwrap().clone().ok_or(ClientError::Api {
            status: 404,
            message: Some("Order not found".into()),
        })
    }

    async fn accept(&self, _order_id: u64) -> Result<OrderState, ClientError> {
        self.order_latency().await;
        self.record("accept")?;
        self.update_view(|view| view.order.status = OrderStatus::Accepted)
    }

    async fn propose(&self, _order_id: u64, amount: f64) -> Result<OrderState, ClientError> {
        self.order_latency().await;
        self.record("propose")?;
        let author = self.acting_user;
        self.update_view(|view| {
            view.order.balance_amount = amount;
            view.difference = amount;
            view.order.balance_sender_id = Some(author);
        })
    }

    async fn choose_delivery(
        &self,
        _order_id: u64,
        request: &DeliveryRequest,
    ) -> Result<OrderState, ClientError> {
        self.order_latency().await;
        self.record("delivery")?;
        let arrangement = DeliveryArrangement {
            method: request.method,
            carrier: request.carrier.clone(),
            price: request
                .carrier
                .as_deref()
                .and_then(reprise_types::find_carrier)
                .filter(|_| request.method == DeliveryMethod::Delivery)
                .map(|c| c.effective_price()),
        };
        self.update_view(|view| {
            view.order.status = OrderStatus::DeliveryScheduled;
            view.order.delivery = Some(arrangement);
        })
    }
}
