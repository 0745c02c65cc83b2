//! Domain layer for promotion discount evaluation.
//!
//! This crate provides:
//! - Money and currency value types with exact decimal arithmetic
//! - Shopping cart and the read-only cart summary promotions are evaluated against
//! - Aggregate trait for entities that record domain events
//! - Promotion aggregate with flash-sale, percentage-off and fixed-amount rules
//! - Application service for lookups, discount calculation and lifecycle changes
//! - Publisher that hands recorded events to an event store

pub mod aggregate;
pub mod cart;
pub mod error;
pub mod money;
pub mod promotion;
pub mod publisher;

pub use aggregate::{Aggregate, DomainEvent};
pub use cart::{
    CartError, CartItem, CartLine, CartSummary, CartSummaryConverter, DefaultCartSummaryConverter,
    ShoppingCart,
};
pub use common::{CustomerId, ProductId};
pub use error::DomainError;
pub use money::{Currency, Money, MoneyError};
pub use promotion::{
    CreateFixedAmountPromotion, CreateFlashSalePromotion, CreatePercentageOffPromotion,
    CreatePromotion, DiscountScope, FlashSaleView, InMemoryPromotionRepository, Promotion,
    PromotionApplicationService, PromotionDiscount, PromotionError, PromotionEvent,
    PromotionFactory, PromotionId, PromotionRepository, PromotionRule, PromotionStatus,
    PromotionType, PromotionView, RepositoryError, StackingPolicy, ValidPeriod,
};
pub use publisher::DomainEventApplicationService;
