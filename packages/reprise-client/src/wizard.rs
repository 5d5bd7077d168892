//! Trade-in creation wizard: offer selection, difference negotiation, delivery.
//!
//! Steps are local state until the final submission. Closing the wizard
//! cancels its lifecycle token, drops the draft and stops the location
//! search; any response that lands afterwards is ignored.

use crate::api::{guarded, CloseHandle, MarketplaceApi};
use crate::config::ClientConfig;
use crate::error::WizardError;
use crate::search::LocationSearch;
use reprise_types::{
    CreateOrderRequest, DeliveryMethod, DifferenceQuote, Location, Offer, OfferId, OrderState,
    UserId,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    SelectOffer,
    Difference,
    Delivery,
}

/// Local, transient negotiation state for one wizard instance.
#[derive(Debug, Clone, PartialEq)]
pub struct NegotiationDraft {
    pub target_offer_id: OfferId,
    pub my_offer_id: Option<OfferId>,
    /// Raw text of the compensation field.
    pub override_input: String,
    pub delivery_method: DeliveryMethod,
    pub location_id: Option<u64>,
}

/// Successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub order: OrderState,
    pub message: String,
}

/// The user left the wizard to create an offer first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateOfferExit {
    pub target_offer_id: OfferId,
}

pub struct RepriseWizard<A> {
    api: Arc<A>,
    me: UserId,
    target: Offer,
    step: WizardStep,
    my_offers: Option<Vec<Offer>>,
    draft: Option<NegotiationDraft>,
    location_text: String,
    search: Option<LocationSearch>,
    debounce: Duration,
    min_search_chars: usize,
    cancel: CancellationToken,
    last_error: Option<String>,
}

/// Amount text without a trailing `.0` for whole numbers.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        amount.to_string()
    }
}

impl<A: MarketplaceApi + 'static> RepriseWizard<A> {
    /// Open the wizard for `target`, acting as `me`.
    pub fn open(api: Arc<A>, me: UserId, target: Offer, config: &ClientConfig) -> Self {
        let draft = NegotiationDraft {
            target_offer_id: target.id,
            my_offer_id: None,
            override_input: String::new(),
            delivery_method: DeliveryMethod::Delivery,
            location_id: None,
        };
        Self {
            api,
            me,
            target,
            step: WizardStep::SelectOffer,
            my_offers: None,
            draft: Some(draft),
            location_text: String::new(),
            search: None,
            debounce: config.debounce(),
            min_search_chars: config.min_search_chars,
            cancel: CancellationToken::new(),
            last_error: None,
        }
    }

    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle::new(self.cancel.clone())
    }

    /// Discard the draft and stop everything in flight.
    pub fn close(&mut self) {
        self.cancel.cancel();
        self.discard();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn discard(&mut self) {
        self.draft = None;
        self.my_offers = None;
        self.search = None;
        self.location_text.clear();
    }

    fn ensure_open(&mut self) -> Result<(), WizardError> {
        if self.cancel.is_cancelled() {
            self.discard();
            return Err(WizardError::Closed);
        }
        Ok(())
    }

    fn draft_mut(&mut self) -> Result<&mut NegotiationDraft, WizardError> {
        self.ensure_open()?;
        self.draft.as_mut().ok_or(WizardError::Closed)
    }

    fn require_step(&mut self, step: WizardStep) -> Result<(), WizardError> {
        self.ensure_open()?;
        if self.step != step {
            return Err(WizardError::WrongStep);
        }
        Ok(())
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn target(&self) -> &Offer {
        &self.target
    }

    pub fn draft(&self) -> Option<&NegotiationDraft> {
        self.draft.as_ref()
    }

    /// Message of the last failed submission, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // --- Step 1: offer selection ---

    /// Fetch the current user's offers.
    pub async fn load_my_offers(&mut self) -> Result<&[Offer], WizardError> {
        self.ensure_open()?;
        let offers = guarded(&self.cancel, self.api.offers_of(self.me)).await;
        let offers = match offers {
            Ok(offers) => offers,
            Err(e) => {
                let err = WizardError::from(e);
                if err == WizardError::Closed {
                    self.discard();
                }
                return Err(err);
            }
        };
        Ok(self.my_offers.insert(offers).as_slice())
    }

    fn is_self_trade(&self, offer: &Offer) -> bool {
        offer.seller_id == self.target.seller_id
    }

    /// Offers that may be proposed for the target (same-seller offers excluded).
    pub fn selectable_offers(&self) -> Vec<&Offer> {
        self.my_offers
            .iter()
            .flatten()
            .filter(|o| o.is_tradeable() && !self.is_self_trade(o))
            .collect()
    }

    /// Whether the "create an offer" exit applies: offers loaded, none usable.
    pub fn can_create_offer(&self) -> bool {
        self.my_offers.is_some() && self.selectable_offers().is_empty()
    }

    /// Leave the wizard for the external offer-creation flow.
    pub fn exit_to_offer_creation(&mut self) -> Result<CreateOfferExit, WizardError> {
        self.require_step(WizardStep::SelectOffer)?;
        let exit = CreateOfferExit {
            target_offer_id: self.target.id,
        };
        self.close();
        Ok(exit)
    }

    fn my_offer(&self, id: OfferId) -> Option<&Offer> {
        self.my_offers.iter().flatten().find(|o| o.id == id)
    }

    fn selected_offer(&self) -> Option<&Offer> {
        self.draft
            .as_ref()
            .and_then(|d| d.my_offer_id)
            .and_then(|id| self.my_offer(id))
    }

    pub fn select_offer(&mut self, offer_id: OfferId) -> Result<(), WizardError> {
        self.require_step(WizardStep::SelectOffer)?;
        let offer = self.my_offer(offer_id).ok_or(WizardError::OfferNotFound)?;
        if !offer.is_tradeable() {
            return Err(WizardError::OfferNotFound);
        }
        if self.is_self_trade(offer) {
            return Err(WizardError::SelfTrade);
        }
        self.draft_mut()?.my_offer_id = Some(offer_id);
        Ok(())
    }

    /// Advance to step 2 with the selected offer.
    pub fn confirm_selection(&mut self) -> Result<(), WizardError> {
        self.require_step(WizardStep::SelectOffer)?;
        let offer = self.selected_offer().ok_or(WizardError::NoOfferSelected)?;
        if self.is_self_trade(offer) {
            return Err(WizardError::SelfTrade);
        }
        let quote = DifferenceQuote::new(self.target.price, offer.price);
        let suggested = format_amount(quote.absolute);
        self.draft_mut()?.override_input = suggested;
        self.step = WizardStep::Difference;
        Ok(())
    }

    // --- Step 2: difference ---

    /// Price gap between the target and the selected offer.
    pub fn quote(&self) -> Option<DifferenceQuote> {
        self.selected_offer()
            .map(|mine| DifferenceQuote::new(self.target.price, mine.price))
    }

    /// Whether the compensation field is shown at all (hidden for `egal`).
    pub fn shows_compensation(&self) -> bool {
        self.quote().is_some_and(|q| q.has_compensation())
    }

    pub fn set_override(&mut self, input: &str) -> Result<(), WizardError> {
        self.require_step(WizardStep::Difference)?;
        self.draft_mut()?.override_input = input.to_string();
        Ok(())
    }

    /// Amount that submission would send.
    pub fn effective_difference(&self) -> f64 {
        match (self.quote(), self.draft.as_ref()) {
            (Some(quote), Some(draft)) => quote.effective(&draft.override_input),
            _ => 0.0,
        }
    }

    pub fn continue_to_delivery(&mut self) -> Result<(), WizardError> {
        self.require_step(WizardStep::Difference)?;
        self.step = WizardStep::Delivery;
        Ok(())
    }

    pub fn back(&mut self) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.step = match self.step {
            WizardStep::SelectOffer => return Err(WizardError::WrongStep),
            WizardStep::Difference => WizardStep::SelectOffer,
            WizardStep::Delivery => WizardStep::Difference,
        };
        Ok(())
    }

    // --- Step 3: delivery ---

    pub fn set_delivery_method(&mut self, method: DeliveryMethod) -> Result<(), WizardError> {
        self.require_step(WizardStep::Delivery)?;
        self.draft_mut()?.delivery_method = method;
        if method == DeliveryMethod::Pickup {
            self.clear_location()?;
        }
        Ok(())
    }

    pub fn location_text(&self) -> &str {
        &self.location_text
    }

    /// Feed a keystroke of the destination field into the debounced search.
    pub fn type_location(&mut self, text: &str) -> Result<(), WizardError> {
        self.require_step(WizardStep::Delivery)?;
        if self.draft_mut()?.delivery_method != DeliveryMethod::Delivery {
            return Err(WizardError::WrongStep);
        }
        self.draft_mut()?.location_id = None;
        self.location_text = text.to_string();
        let search = self.search.get_or_insert_with(|| {
            LocationSearch::spawn(
                Arc::clone(&self.api),
                self.debounce,
                self.min_search_chars,
                self.cancel.child_token(),
            )
        });
        search.input(text);
        Ok(())
    }

    /// Dropdown entries for the text currently in the field; empty once a
    /// location is selected.
    pub fn location_results(&self) -> Vec<Location> {
        let selected = self.draft.as_ref().and_then(|d| d.location_id).is_some();
        match &self.search {
            Some(search) if !selected => {
                let snapshot = search.snapshot();
                if snapshot.query == self.location_text.trim() {
                    snapshot.results
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    pub fn location_search(&self) -> Option<&LocationSearch> {
        self.search.as_ref()
    }

    pub fn select_location(&mut self, location: &Location) -> Result<(), WizardError> {
        self.require_step(WizardStep::Delivery)?;
        self.draft_mut()?.location_id = Some(location.id);
        self.location_text = location.label();
        if let Some(search) = &self.search {
            search.input("");
        }
        Ok(())
    }

    pub fn clear_location(&mut self) -> Result<(), WizardError> {
        self.draft_mut()?.location_id = None;
        self.location_text.clear();
        if let Some(search) = &self.search {
            search.input("");
        }
        Ok(())
    }

    /// Send the order. Success closes the wizard; failure keeps it on the
    /// delivery step with the error recorded for display.
    pub async fn submit(&mut self) -> Result<Confirmation, WizardError> {
        self.require_step(WizardStep::Delivery)?;
        let draft = self.draft.clone().ok_or(WizardError::Closed)?;
        let my_offer_id = draft.my_offer_id.ok_or(WizardError::NoOfferSelected)?;
        let mine = self
            .my_offer(my_offer_id)
            .filter(|o| o.is_tradeable())
            .ok_or(WizardError::OfferNotFound)?;
        if mine.seller_id != self.me {
            return Err(WizardError::NotMyOffer);
        }
        if self.is_self_trade(mine) {
            return Err(WizardError::SelfTrade);
        }

        let amount = self.effective_difference();
        let location_id = match draft.delivery_method {
            DeliveryMethod::Delivery => draft.location_id,
            DeliveryMethod::Pickup => None,
        };
        let request = CreateOrderRequest::new(
            my_offer_id,
            self.target.id,
            amount,
            draft.delivery_method,
            location_id,
        );

        let result = guarded(&self.cancel, self.api.create_order(&request)).await;
        match result {
            Ok(created) => {
                info!(
                    order_id = created.order.id,
                    target = self.target.id,
                    mine = my_offer_id,
                    amount,
                    "Reprise order submitted"
                );
                self.close();
                Ok(Confirmation {
                    order: created.order,
                    message: "Your exchange proposal has been sent".into(),
                })
            }
            Err(e) => {
                let err = WizardError::from(e);
                if err == WizardError::Closed {
                    self.discard();
                } else {
                    warn!(target = self.target.id, error = %err, "Reprise order rejected");
                    self.last_error = Some(err.user_message());
                }
                Err(err)
            }
        }
    }
}
