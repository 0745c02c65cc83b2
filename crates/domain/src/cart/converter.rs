use super::{CartSummary, ShoppingCart};

/// Projects a shopping cart into the summary promotions are evaluated against.
///
/// The projection is total: every cart has a summary.
pub trait CartSummaryConverter: Send + Sync {
    fn to_cart_summary(&self, cart: &ShoppingCart) -> CartSummary;
}

/// Copies every cart line into the summary unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCartSummaryConverter;

impl CartSummaryConverter for DefaultCartSummaryConverter {
    fn to_cart_summary(&self, cart: &ShoppingCart) -> CartSummary {
        CartSummary::from(cart)
    }
}
