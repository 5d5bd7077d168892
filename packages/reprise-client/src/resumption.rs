//! Resumption card for an existing order.
//!
//! The server is the source of truth: every action is followed by a refetch,
//! and the card state is derived from the returned order status alone.

use crate::api::{guarded, CloseHandle, MarketplaceApi};
use crate::error::CardError;
use crate::wizard::format_amount;
use reprise_types::{
    amount_or_zero, find_carrier, CarrierQuote, DeliveryMethod, DeliveryRequest, NegotiationView,
    OrderState, OrderStatus, UserId, CARRIERS,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Who authored the balance proposal currently on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Author,
    Recipient,
}

/// Action offered next to the amount field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    Accept,
    Propose,
    None,
}

/// Step 1: the parties haggle over the balance.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceNegotiation {
    pub view: NegotiationView,
    pub role: Role,
    amount_input: String,
}

impl PriceNegotiation {
    fn new(view: NegotiationView, me: UserId) -> Self {
        let role = if view.order.balance_sender_id == Some(me) {
            Role::Author
        } else {
            Role::Recipient
        };
        let amount_input = format_amount(view.order.balance_amount.max(0.0));
        Self {
            view,
            role,
            amount_input,
        }
    }

    pub fn amount_input(&self) -> &str {
        &self.amount_input
    }

    /// The typed amount differs from the proposal (both floored at 0).
    pub fn is_edited(&self) -> bool {
        amount_or_zero(&self.amount_input) != self.view.order.balance_amount.max(0.0)
    }

    pub fn affordance(&self) -> Affordance {
        if self.is_edited() {
            return Affordance::Propose;
        }
        match self.role {
            Role::Author => Affordance::None,
            Role::Recipient => Affordance::Accept,
        }
    }
}

/// Step 2: the order sender picks how the items change hands.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryNegotiation {
    pub view: NegotiationView,
    chosen_method: Option<DeliveryMethod>,
}

impl DeliveryNegotiation {
    pub fn is_order_sender(&self) -> bool {
        self.view.is_order_sender
    }

    pub fn chosen_method(&self) -> Option<DeliveryMethod> {
        self.chosen_method
    }

    /// Carrier list with effective prices.
    pub fn carrier_options(&self) -> Vec<CarrierQuote> {
        CARRIERS.iter().map(|c| c.quote()).collect()
    }

    /// Shown to the receiving party while the sender decides.
    pub fn waiting_message(&self) -> Option<String> {
        if self.view.is_order_sender {
            return None;
        }
        let sender = self
            .view
            .sender_display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("the sender");
        Some(format!("Waiting for {sender} to choose the delivery method…"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CardState {
    /// Not fetched yet.
    Loading,
    /// The negotiation could not be loaded; nothing more to do.
    Unavailable { message: String },
    PriceNegotiation(PriceNegotiation),
    DeliveryNegotiation(DeliveryNegotiation),
    /// Delivery chosen; nothing left to negotiate.
    Settled { order: OrderState },
    /// Status this card does not know how to resume.
    Unresumable { status: String },
}

impl CardState {
    /// Map server state to a card step.
    pub fn from_view(view: NegotiationView, me: UserId) -> Self {
        match &view.order.status {
            OrderStatus::Pending => CardState::PriceNegotiation(PriceNegotiation::new(view, me)),
            OrderStatus::Accepted => CardState::DeliveryNegotiation(DeliveryNegotiation {
                view,
                chosen_method: None,
            }),
            OrderStatus::DeliveryScheduled => CardState::Settled { order: view.order },
            OrderStatus::Other(raw) => CardState::Unresumable {
                status: raw.clone(),
            },
        }
    }

    /// 1 or 2 for the negotiation steps.
    pub fn step_number(&self) -> Option<u8> {
        match self {
            CardState::PriceNegotiation(_) => Some(1),
            CardState::DeliveryNegotiation(_) => Some(2),
            _ => None,
        }
    }
}

pub struct NegotiationCard<A> {
    api: Arc<A>,
    me: UserId,
    order_id: u64,
    state: CardState,
    cancel: CancellationToken,
    last_error: Option<String>,
}

impl<A: MarketplaceApi> NegotiationCard<A> {
    pub fn new(api: Arc<A>, me: UserId, order_id: u64) -> Self {
        Self {
            api,
            me,
            order_id,
            state: CardState::Loading,
            cancel: CancellationToken::new(),
            last_error: None,
        }
    }

    /// Create the card and fetch its state.
    pub async fn open(api: Arc<A>, me: UserId, order_id: u64) -> Result<Self, CardError> {
        let mut card = Self::new(api, me, order_id);
        card.refresh().await?;
        Ok(card)
    }

    pub fn state(&self) -> &CardState {
        &self.state
    }

    pub fn order_id(&self) -> u64 {
        self.order_id
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle::new(self.cancel.clone())
    }

    pub fn close(&mut self) {
        self.cancel.cancel();
        self.state = CardState::Loading;
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn ensure_open(&mut self) -> Result<(), CardError> {
        if self.cancel.is_cancelled() {
            self.state = CardState::Loading;
            return Err(CardError::Closed);
        }
        Ok(())
    }

    fn fail(&mut self, err: CardError) -> CardError {
        if err == CardError::Closed {
            self.state = CardState::Loading;
        } else {
            warn!(order_id = self.order_id, error = %err, "Negotiation action failed");
            self.last_error = Some(err.user_message());
        }
        err
    }

    /// Refetch the negotiation view and re-derive the step.
    ///
    /// A failed first load is terminal (`Unavailable`); a failed refetch keeps
    /// the current step.
    pub async fn refresh(&mut self) -> Result<(), CardError> {
        self.ensure_open()?;
        let result = guarded(&self.cancel, self.api.negotiation(self.order_id)).await;
        match result {
            Ok(view) => {
                self.state = CardState::from_view(view, self.me);
                info!(
                    order_id = self.order_id,
                    step = ?self.state.step_number(),
                    "Negotiation state loaded"
                );
                Ok(())
            }
            Err(e) => {
                let err = CardError::from(e);
                if self.state == CardState::Loading && err != CardError::Closed {
                    self.state = CardState::Unavailable {
                        message: err.user_message(),
                    };
                }
                Err(self.fail(err))
            }
        }
    }

    fn price_step(&mut self) -> Result<&mut PriceNegotiation, CardError> {
        self.ensure_open()?;
        match &mut self.state {
            CardState::PriceNegotiation(step) => Ok(step),
            _ => Err(CardError::ActionUnavailable("Price negotiation")),
        }
    }

    fn delivery_step(&mut self) -> Result<&mut DeliveryNegotiation, CardError> {
        self.ensure_open()?;
        match &mut self.state {
            CardState::DeliveryNegotiation(step) if step.is_order_sender() => Ok(step),
            CardState::DeliveryNegotiation(_) => Err(CardError::NotOrderSender),
            _ => Err(CardError::ActionUnavailable("Delivery choice")),
        }
    }

    // --- Step 1 ---

    pub fn edit_amount(&mut self, input: &str) -> Result<(), CardError> {
        self.price_step()?.amount_input = input.to_string();
        Ok(())
    }

    pub fn affordance(&self) -> Affordance {
        match &self.state {
            CardState::PriceNegotiation(step) => step.affordance(),
            _ => Affordance::None,
        }
    }

    /// Accept the other party's proposal, then refetch.
    pub async fn accept(&mut self) -> Result<(), CardError> {
        if self.price_step()?.affordance() != Affordance::Accept {
            return Err(CardError::ActionUnavailable("Accept"));
        }
        let result = guarded(&self.cancel, self.api.accept(self.order_id)).await;
        if let Err(e) = result {
            return Err(self.fail(e.into()));
        }
        info!(order_id = self.order_id, "Balance accepted");
        self.last_error = None;
        self.refresh().await
    }

    /// Send the edited amount as a counter-proposal, then refetch.
    pub async fn propose(&mut self) -> Result<(), CardError> {
        let step = self.price_step()?;
        if step.affordance() != Affordance::Propose {
            return Err(CardError::ActionUnavailable("Propose"));
        }
        let amount = amount_or_zero(&step.amount_input);
        let result = guarded(&self.cancel, self.api.propose(self.order_id, amount)).await;
        if let Err(e) = result {
            return Err(self.fail(e.into()));
        }
        info!(order_id = self.order_id, amount, "Counter-proposal sent");
        self.last_error = None;
        self.refresh().await
    }

    // --- Step 2 ---

    pub fn choose_method(&mut self, method: DeliveryMethod) -> Result<(), CardError> {
        self.delivery_step()?.chosen_method = Some(method);
        Ok(())
    }

    /// Ship with `carrier_key`, then refetch.
    pub async fn choose_carrier(&mut self, carrier_key: &str) -> Result<(), CardError> {
        let step = self.delivery_step()?;
        if step.chosen_method != Some(DeliveryMethod::Delivery) {
            return Err(CardError::ActionUnavailable("Carrier selection"));
        }
        let carrier = find_carrier(carrier_key)
            .ok_or_else(|| CardError::UnknownCarrier(carrier_key.to_string()))?;
        let request = DeliveryRequest {
            method: DeliveryMethod::Delivery,
            carrier: Some(carrier.key.to_string()),
        };
        self.send_delivery(request).await
    }

    /// Confirm an in-person pickup, then refetch.
    pub async fn confirm_pickup(&mut self) -> Result<(), CardError> {
        if self.delivery_step()?.chosen_method != Some(DeliveryMethod::Pickup) {
            return Err(CardError::ActionUnavailable("Pickup confirmation"));
        }
        let request = DeliveryRequest {
            method: DeliveryMethod::Pickup,
            carrier: None,
        };
        self.send_delivery(request).await
    }

    async fn send_delivery(&mut self, request: DeliveryRequest) -> Result<(), CardError> {
        let result = guarded(
            &self.cancel,
            self.api.choose_delivery(self.order_id, &request),
        )
        .await;
        if let Err(e) = result {
            return Err(self.fail(e.into()));
        }
        info!(
            order_id = self.order_id,
            method = request.method.as_str(),
            "Delivery choice sent"
        );
        self.last_error = None;
        self.refresh().await
    }
}
