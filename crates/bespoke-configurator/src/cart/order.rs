//! Order submission.

use crate::cart::Cart;
use crate::cart::LineItem;
use crate::error::ConfiguratorError;
use crate::ids::OrderNumber;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Who the order is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// How the order is paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Tokenized card from the payment provider.
    Card { token: String },
    /// Paid at the final fitting.
    PayAtFitting,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderServiceError {
    #[error("Order rejected: {0}")]
    Rejected(String),

    #[error("Order service unavailable: {0}")]
    Unavailable(String),
}

/// Downstream order service.
#[async_trait]
pub trait OrderService: Send + Sync {
    async fn submit(
        &self,
        customer: &Customer,
        items: &[LineItem],
        payment: &PaymentMethod,
    ) -> Result<OrderNumber, OrderServiceError>;
}

/// Submit the cart's items in a single attempt.
///
/// An empty cart fails with [`ConfiguratorError::EmptyCart`] before the
/// service is called. Service failures are returned as
/// [`ConfiguratorError::OrderSubmission`]. The cart is left as it was either way.
pub async fn submit_order(
    service: &dyn OrderService,
    customer: &Customer,
    cart: &Cart,
    payment: &PaymentMethod,
) -> Result<OrderNumber, ConfiguratorError> {
    if cart.is_empty() {
        return Err(ConfiguratorError::EmptyCart);
    }
    let subtotal = cart.subtotal()?;

    match service.submit(customer, cart.items(), payment).await {
        Ok(number) => {
            tracing::info!(
                order_number = %number,
                cart_id = %cart.id,
                items = cart.item_count(),
                subtotal = %subtotal,
                "Order submitted"
            );
            Ok(number)
        }
        Err(e) => {
            tracing::warn!(cart_id = %cart.id, error = %e, "Order submission failed");
            Err(ConfiguratorError::OrderSubmission(e.to_string()))
        }
    }
}
