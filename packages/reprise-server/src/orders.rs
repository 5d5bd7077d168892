//! Reprise order rules: creation, balance proposals, acceptance and delivery.
//!
//! Every operation runs against a `&mut Catalog` held under the store's write
//! lock, so checks and the resulting mutation are atomic with respect to
//! other requests.

use crate::catalog::{Catalog, Order, User, UserSnapshot};
use reprise_types::{
    check_difference, find_carrier, sanitize_string, BalanceLogic, CreateOrderRequest, CreatedOrder,
    DeliveryArrangement, DeliveryMethod, DeliveryRequest, Direction, ItemInfo, NegotiationView,
    Offer, OrderState, OrderStatus, OrderSummary, Pagination, PartySummary, ProductSnapshot,
    RepriseError, UserId,
};

/// Which side of the order a listing is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSide {
    /// Orders targeting the caller's offers.
    Received,
    /// Orders the caller initiated.
    Sent,
}

fn require_caller(caller: Option<UserId>) -> Result<UserId, RepriseError> {
    caller.ok_or_else(RepriseError::authentication_required)
}

fn product_snapshot(offer: &Offer) -> ProductSnapshot {
    ProductSnapshot {
        offer_id: offer.id,
        title: sanitize_string(&offer.title),
        price: offer.price,
        description: sanitize_string(&offer.description),
        product_condition: offer.product_condition,
        image: offer.image.clone(),
    }
}

fn user_snapshot(user: &User, is_sender: bool, address_id: Option<u64>) -> UserSnapshot {
    UserSnapshot {
        user_id: user.id,
        name: sanitize_string(&user.display_name()),
        email: sanitize_string(&user.email),
        phone: sanitize_string(&user.phone),
        is_sender,
        address_id,
    }
}

fn order_state(order: &Order) -> OrderState {
    OrderState {
        id: order.id,
        status: order.status.clone(),
        balance_amount: order.balance_amount,
        balance_payer_id: order.balance_payer_id,
        balance_sender_id: order.balance_sender_id,
        delivery: order.delivery.clone(),
    }
}

fn summary(order: &Order) -> OrderSummary {
    OrderSummary {
        order: order_state(order),
        sender: PartySummary {
            user_id: order.sender.user_id,
            name: order.sender.name.clone(),
        },
        receiver: PartySummary {
            user_id: order.receiver.user_id,
            name: order.receiver.name.clone(),
        },
        sender_offer: order.sender_offer.clone(),
        receiver_offer: order.receiver_offer.clone(),
        created_at_ms: order.created_at_ms,
    }
}

impl Catalog {
    /// Validate and store a new `pending` order initiated by `caller`.
    pub fn create_order(
        &mut self,
        caller: Option<UserId>,
        request: &CreateOrderRequest,
        now_ms: u64,
    ) -> Result<CreatedOrder, RepriseError> {
        let caller = require_caller(caller)?;

        let (Some(sender_offer_id), Some(receiver_offer_id)) =
            (request.sender_offer_id, request.receiver_offer_id)
        else {
            return Err(RepriseError::InvalidInput(
                "senderOfferId and receiverOfferId are required".into(),
            ));
        };
        let difference = request.difference_amount.unwrap_or(f64::NAN);
        if !difference.is_finite() || difference < 0.0 {
            return Err(RepriseError::InvalidInput(
                "differenceAmount must be a number >= 0".into(),
            ));
        }
        let method = request
            .method
            .as_deref()
            .and_then(DeliveryMethod::parse)
            .ok_or_else(|| {
                RepriseError::InvalidInput("method must be delivery or pickup".into())
            })?;
        let location_id = match request.location_id {
            None => None,
            Some(id) if id > 0 => Some(id as u64),
            Some(_) => return Err(RepriseError::InvalidInput("Invalid locationId".into())),
        };

        let (Some(sender_offer), Some(receiver_offer)) = (
            self.offers.get(&sender_offer_id),
            self.offers.get(&receiver_offer_id),
        ) else {
            return Err(RepriseError::offer_not_found());
        };
        if !sender_offer.is_tradeable() || !receiver_offer.is_tradeable() {
            return Err(RepriseError::InvalidInput("Offer unavailable".into()));
        }
        if sender_offer.seller_id != caller {
            return Err(RepriseError::Forbidden(
                "You do not own this offer (senderOfferId)".into(),
            ));
        }
        if sender_offer.seller_id == receiver_offer.seller_id {
            return Err(RepriseError::self_trade());
        }
        if receiver_offer.seller_id == caller {
            return Err(RepriseError::InvalidInput(
                "You cannot request a reprise on your own offer".into(),
            ));
        }

        let (Some(sender_user), Some(receiver_user)) = (
            self.users.get(&sender_offer.seller_id),
            self.users.get(&receiver_offer.seller_id),
        ) else {
            return Err(RepriseError::NotFound(
                "Sender or receiver user not found".into(),
            ));
        };

        let sender_price = sender_offer.price;
        let receiver_price = receiver_offer.price;
        if !sender_price.is_finite()
            || sender_price <= 0.0
            || !receiver_price.is_finite()
            || receiver_price <= 0.0
        {
            return Err(RepriseError::InvalidInput("Invalid offer price".into()));
        }
        check_difference(sender_price, receiver_price, difference)?;

        if let Some(id) = location_id {
            if !self.addresses.contains_key(&id) {
                return Err(RepriseError::NotFound("Address not found".into()));
            }
        }

        // The owner of the cheaper offer pays the balance.
        let cheaper_user_id = if sender_price > receiver_price {
            Some(receiver_offer.seller_id)
        } else if sender_price < receiver_price {
            Some(sender_offer.seller_id)
        } else {
            None
        };

        let order = Order {
            id: 0,
            status: OrderStatus::Pending,
            balance_amount: difference,
            balance_payer_id: cheaper_user_id,
            balance_sender_id: Some(caller),
            sender: user_snapshot(sender_user, true, location_id),
            receiver: user_snapshot(receiver_user, false, location_id),
            sender_offer: product_snapshot(sender_offer),
            receiver_offer: product_snapshot(receiver_offer),
            location_id,
            delivery: None,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        };
        let id = self.allocate_order_id();
        let order = Order { id, ..order };
        let state = order_state(&order);
        self.orders.insert(id, order);

        tracing::info!(
            order_id = id,
            sender = caller,
            method = method.as_str(),
            balance = difference,
            "Reprise order created"
        );

        Ok(CreatedOrder {
            order: state,
            balance_logic: BalanceLogic {
                sender_price,
                receiver_price,
                cheaper_user_id,
            },
        })
    }

    fn order_for_party(&self, caller: UserId, order_id: u64) -> Result<&Order, RepriseError> {
        let order = self
            .orders
            .get(&order_id)
            .ok_or_else(RepriseError::order_not_found)?;
        if !order.is_party(caller) {
            return Err(RepriseError::not_a_party());
        }
        Ok(order)
    }

    fn order_for_party_mut(
        &mut self,
        caller: UserId,
        order_id: u64,
    ) -> Result<&mut Order, RepriseError> {
        let order = self
            .orders
            .get_mut(&order_id)
            .ok_or_else(RepriseError::order_not_found)?;
        if !order.is_party(caller) {
            return Err(RepriseError::not_a_party());
        }
        Ok(order)
    }

    /// Negotiation state as seen by `caller`.
    pub fn negotiation_view(
        &self,
        caller: Option<UserId>,
        order_id: u64,
    ) -> Result<NegotiationView, RepriseError> {
        let caller = require_caller(caller)?;
        let order = self.order_for_party(caller, order_id)?;

        let is_order_sender = order.sender.user_id == caller;
        let (mine, target) = if is_order_sender {
            (&order.sender_offer, &order.receiver_offer)
        } else {
            (&order.receiver_offer, &order.sender_offer)
        };
        let direction = match order.balance_payer_id {
            Some(payer) if payer == caller => Direction::Payer,
            Some(_) => Direction::Recevoir,
            None => Direction::Egal,
        };
        let sender_display_name = Some(order.sender.name.clone()).filter(|n| !n.is_empty());

        Ok(NegotiationView {
            target: ItemInfo::from(target),
            mine: ItemInfo::from(mine),
            difference: order.balance_amount,
            direction,
            order: order_state(order),
            is_order_sender,
            sender_display_name,
        })
    }

    /// Counter-propose a new balance amount; the caller becomes its author.
    pub fn propose_balance(
        &mut self,
        caller: Option<UserId>,
        order_id: u64,
        amount: f64,
        now_ms: u64,
    ) -> Result<OrderState, RepriseError> {
        let caller = require_caller(caller)?;
        let order = self.order_for_party_mut(caller, order_id)?;
        if order.status != OrderStatus::Pending {
            return Err(RepriseError::InvalidState(format!(
                "Balance can only be negotiated on a pending order (status: {})",
                order.status
            )));
        }
        check_difference(order.sender_offer.price, order.receiver_offer.price, amount)?;

        order.balance_amount = amount;
        order.balance_sender_id = Some(caller);
        order.updated_at_ms = now_ms;
        tracing::info!(order_id, by = caller, amount, "Balance proposed");
        Ok(order_state(order))
    }

    /// Accept the balance proposal authored by the other party.
    pub fn accept_balance(
        &mut self,
        caller: Option<UserId>,
        order_id: u64,
        now_ms: u64,
    ) -> Result<OrderState, RepriseError> {
        let caller = require_caller(caller)?;
        let order = self.order_for_party_mut(caller, order_id)?;
        if order.status != OrderStatus::Pending {
            return Err(RepriseError::InvalidState(format!(
                "Only a pending order can be accepted (status: {})",
                order.status
            )));
        }
        if order.balance_sender_id == Some(caller) {
            return Err(RepriseError::InvalidState(
                "You cannot accept your own proposal".into(),
            ));
        }

        order.status = OrderStatus::Accepted;
        order.updated_at_ms = now_ms;
        tracing::info!(order_id, by = caller, amount = order.balance_amount, "Balance accepted");
        Ok(order_state(order))
    }

    /// Record the order sender's fulfilment choice on an accepted order.
    pub fn schedule_delivery(
        &mut self,
        caller: Option<UserId>,
        order_id: u64,
        request: &DeliveryRequest,
        now_ms: u64,
    ) -> Result<OrderState, RepriseError> {
        let caller = require_caller(caller)?;
        let order = self.order_for_party_mut(caller, order_id)?;
        if order.sender.user_id != caller {
            return Err(RepriseError::Forbidden(
                "Only the order sender chooses the delivery method".into(),
            ));
        }
        if order.status != OrderStatus::Accepted {
            return Err(RepriseError::InvalidState(format!(
                "Delivery is chosen once the balance is accepted (status: {})",
                order.status
            )));
        }

        let arrangement = match request.method {
            DeliveryMethod::Delivery => {
                let key = request.carrier.as_deref().unwrap_or_default();
                let carrier = find_carrier(key).ok_or_else(|| {
                    RepriseError::InvalidInput(format!("Unknown carrier: {key}"))
                })?;
                DeliveryArrangement {
                    method: DeliveryMethod::Delivery,
                    carrier: Some(carrier.key.to_string()),
                    price: Some(carrier.effective_price()),
                }
            }
            DeliveryMethod::Pickup => DeliveryArrangement {
                method: DeliveryMethod::Pickup,
                carrier: None,
                price: None,
            },
        };

        order.delivery = Some(arrangement);
        order.status = OrderStatus::DeliveryScheduled;
        order.updated_at_ms = now_ms;
        tracing::info!(
            order_id,
            method = request.method.as_str(),
            carrier = request.carrier.as_deref().unwrap_or("-"),
            "Delivery scheduled"
        );
        Ok(order_state(order))
    }

    /// Orders the caller sent or received, newest first.
    pub fn list_orders(
        &self,
        caller: Option<UserId>,
        side: ListingSide,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<OrderSummary>, Pagination), RepriseError> {
        let caller = require_caller(caller)?;
        let mut matching: Vec<&Order> = self
            .orders
            .values()
            .filter(|o| match side {
                ListingSide::Received => o.receiver.user_id == caller,
                ListingSide::Sent => o.sender.user_id == caller,
            })
            .collect();
        matching.sort_by(|a, b| {
            b.created_at_ms
                .cmp(&a.created_at_ms)
                .then_with(|| b.id.cmp(&a.id))
        });

        let pagination = Pagination::new(page, limit, matching.len() as u64);
        let rows = matching
            .into_iter()
            .skip(pagination.offset())
            .take(limit as usize)
            .map(summary)
            .collect();
        Ok((rows, pagination))
    }
}
