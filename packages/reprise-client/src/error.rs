//! Client error types.

use reprise_types::RepriseError;
use std::fmt;

/// Shown when the server gives no usable message.
pub const GENERIC_FAILURE: &str = "Something went wrong, please try again.";

/// Failure of a call to the order service.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The request never produced an HTTP response.
    Transport(String),
    /// The service answered with an error status.
    Api { status: u16, message: Option<String> },
    /// The response body did not have the expected shape.
    Decode(String),
    /// The owning wizard or card was closed while the call was in flight.
    Closed,
}

impl ClientError {
    /// Text to surface to the user: the server message when present, else a
    /// generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "transport error: {msg}"),
            ClientError::Api { status, message } => write!(
                f,
                "api error {status}: {}",
                message.as_deref().unwrap_or("<no message>")
            ),
            ClientError::Decode(msg) => write!(f, "decode error: {msg}"),
            ClientError::Closed => write!(f, "closed"),
        }
    }
}

impl std::error::Error for ClientError {}

/// Errors raised by the creation wizard.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardError {
    /// Confirm pressed with no offer selected.
    NoOfferSelected,
    /// Selected id is not among the loaded offers.
    OfferNotFound,
    /// Both offers belong to the same seller.
    SelfTrade,
    /// The selected offer is not owned by the current user.
    NotMyOffer,
    /// Action not available on the current step.
    WrongStep,
    Api(ClientError),
    Closed,
}

impl WizardError {
    pub fn user_message(&self) -> String {
        match self {
            WizardError::NoOfferSelected => "Please select one of your offers".into(),
            WizardError::OfferNotFound => "This offer is no longer available".into(),
            WizardError::SelfTrade => RepriseError::self_trade().message().to_string(),
            WizardError::NotMyOffer => "You can only propose one of your own offers".into(),
            WizardError::WrongStep => GENERIC_FAILURE.into(),
            WizardError::Api(err) => err.user_message(),
            WizardError::Closed => "This exchange has been closed".into(),
        }
    }
}

impl fmt::Display for WizardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WizardError::Api(err) => write!(f, "{err}"),
            other => f.write_str(&other.user_message()),
        }
    }
}

impl std::error::Error for WizardError {}

impl From<ClientError> for WizardError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Closed => WizardError::Closed,
            other => WizardError::Api(other),
        }
    }
}

/// Errors raised by the negotiation resumption card.
#[derive(Debug, Clone, PartialEq)]
pub enum CardError {
    /// The requested action is not offered in the current state.
    ActionUnavailable(&'static str),
    /// Only the order sender picks the fulfilment method.
    NotOrderSender,
    UnknownCarrier(String),
    Api(ClientError),
    Closed,
}

impl CardError {
    pub fn user_message(&self) -> String {
        match self {
            CardError::ActionUnavailable(action) => format!("{action} is not available right now"),
            CardError::NotOrderSender => "Only the order sender chooses the delivery".into(),
            CardError::UnknownCarrier(key) => format!("Unknown carrier: {key}"),
            CardError::Api(err) => err.user_message(),
            CardError::Closed => "This negotiation has been closed".into(),
        }
    }
}

impl fmt::Display for CardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardError::Api(err) => write!(f, "{err}"),
            other => f.write_str(&other.user_message()),
        }
    }
}

impl std::error::Error for CardError {}

impl From<ClientError> for CardError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Closed => CardError::Closed,
            other => CardError::Api(other),
        }
    }
}
