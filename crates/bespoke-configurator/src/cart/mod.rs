//! Cart and order submission for configured garments.

mod cart;
mod line_item;
mod order;

pub use cart::Cart;
pub use line_item::{to_line_item, LineItem, MAX_QUANTITY_PER_ITEM};
pub use order::{submit_order, Customer, OrderService, OrderServiceError, PaymentMethod};
