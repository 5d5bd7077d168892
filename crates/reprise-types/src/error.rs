/// Domain rule violation raised by order validation.
///
/// The variant classifies the failure; the message is user-facing and is
/// forwarded verbatim in API error bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepriseError {
    /// Malformed or out-of-range input from the caller.
    InvalidInput(String),
    /// Caller could not be identified.
    Unauthorized(String),
    /// Caller is identified but not allowed to act on the resource.
    Forbidden(String),
    /// Referenced entity does not exist.
    NotFound(String),
    /// Operation not allowed in the current order state.
    InvalidState(String),
}

impl RepriseError {
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::InvalidState(msg) => msg,
        }
    }

    pub fn authentication_required() -> Self {
        Self::Unauthorized("Authentication required".into())
    }

    pub fn offer_not_found() -> Self {
        Self::NotFound("Offer not found (sender or receiver)".into())
    }

    pub fn order_not_found() -> Self {
        Self::NotFound("Order not found".into())
    }

    pub fn not_a_party() -> Self {
        Self::Forbidden("You are not a party to this order".into())
    }

    pub fn self_trade() -> Self {
        Self::InvalidInput("Both offers belong to the same user".into())
    }
}

impl std::fmt::Display for RepriseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::InvalidState(msg) => write!(f, "Invalid state: {msg}"),
        }
    }
}

impl std::error::Error for RepriseError {}
