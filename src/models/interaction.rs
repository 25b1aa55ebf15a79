use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Kind of logged user interaction
///
/// The log is an open vocabulary: anything not listed is kept verbatim as
/// `Other` and weighted like a plain view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InteractionType {
    View,
    AddToCart,
    Purchase,
    Wishlist,
    Rating,
    Search,
    Other(String),
}

/// Weight applied to interaction types missing from the table
pub const DEFAULT_WEIGHT: f64 = 1.0;

impl InteractionType {
    /// Base weight from the interaction weight table
    pub fn base_weight(&self) -> f64 {
        match self {
            InteractionType::View => 1.0,
            InteractionType::AddToCart => 3.0,
            InteractionType::Purchase => 5.0,
            InteractionType::Wishlist => 2.0,
            InteractionType::Rating => 4.0,
            InteractionType::Search => 1.0,
            InteractionType::Other(_) => DEFAULT_WEIGHT,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InteractionType::View => "view",
            InteractionType::AddToCart => "add_to_cart",
            InteractionType::Purchase => "purchase",
            InteractionType::Wishlist => "wishlist",
            InteractionType::Rating => "rating",
            InteractionType::Search => "search",
            InteractionType::Other(raw) => raw,
        }
    }
}

impl From<&str> for InteractionType {
    fn from(raw: &str) -> Self {
        match raw {
            "view" => InteractionType::View,
            "add_to_cart" => InteractionType::AddToCart,
            "purchase" => InteractionType::Purchase,
            "wishlist" => InteractionType::Wishlist,
            "rating" => InteractionType::Rating,
            "search" => InteractionType::Search,
            other => InteractionType::Other(other.to_string()),
        }
    }
}

impl From<String> for InteractionType {
    fn from(raw: String) -> Self {
        InteractionType::from(raw.as_str())
    }
}

impl From<InteractionType> for String {
    fn from(kind: InteractionType) -> Self {
        kind.as_str().to_string()
    }
}

impl Display for InteractionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Optional magnitude attached to an interaction (rating, quantity, ...)
///
/// Stores may hold it as a number or as free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InteractionValue {
    Number(f64),
    Text(String),
}

impl InteractionValue {
    /// Numeric reading of the value, `None` when it cannot be converted
    ///
    /// Infinities and NaN count as unconvertible.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            InteractionValue::Number(n) => Some(*n),
            InteractionValue::Text(text) => text.trim().parse::<f64>().ok(),
        };
        value.filter(|v| v.is_finite())
    }
}

/// Immutable entry of the interaction log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub user_id: String,
    pub product_id: String,
    #[serde(rename = "type")]
    pub kind: InteractionType,
    #[serde(default)]
    pub value: Option<InteractionValue>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl InteractionEvent {
    pub fn new(user_id: &str, product_id: &str, kind: InteractionType) -> Self {
        Self {
            user_id: user_id.to_string(),
            product_id: product_id.to_string(),
            kind,
            value: None,
            timestamp: None,
        }
    }

    pub fn with_value(mut self, value: InteractionValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Interaction score: base weight, scaled by the value when it is numeric
    pub fn score(&self) -> f64 {
        let base = self.kind.base_weight();
        match self.value.as_ref().and_then(InteractionValue::as_f64) {
            Some(value) => base * value,
            None => base,
        }
    }
}
