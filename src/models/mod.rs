use serde::{Deserialize, Serialize};

pub mod interaction;
pub mod product;

pub use interaction::{InteractionEvent, InteractionType, InteractionValue};
pub use product::{Product, ProductCard, ProductSummary};

/// Response for `GET /recommendations/{product_id}`
#[derive(Debug, Serialize, Deserialize)]
pub struct SimilarProductsResponse {
    pub product_id: String,
    pub recommended_products: Vec<ProductSummary>,
}

/// Response for `GET /user-recommendations/{user_id}`
#[derive(Debug, Serialize, Deserialize)]
pub struct UserRecommendationsResponse {
    pub user_id: String,
    pub recommended_products: Vec<ProductCard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartStatus {
    Active,
    CheckedOut,
    Abandoned,
}

/// A user's cart with the product ids it holds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartRecord {
    pub user_id: String,
    pub status: CartStatus,
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipping,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// A past order with the product ids it contained
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub customer_id: String,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub items: Vec<String>,
}

impl OrderRecord {
    /// Whether the order counts as a purchase (not cancelled, payment not failed)
    pub fn is_purchase(&self) -> bool {
        self.order_status != OrderStatus::Cancelled && self.payment_status != PaymentStatus::Failed
    }
}
