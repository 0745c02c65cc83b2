//! Evaluation of a cart against a promotion catalogue.

use chrono::{DateTime, Duration, Utc};
use domain::{
    FlashSaleView, InMemoryPromotionRepository, Money, PromotionApplicationService,
    PromotionDiscount, PromotionView, ShoppingCart,
};
use event_store::InMemoryEventStore;
use serde::Serialize;

use crate::catalog::PromotionCatalog;
use crate::error::AppError;

/// What the promotions in a catalogue do for one cart.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub evaluated_at: DateTime<Utc>,
    pub subtotal: Money,

    /// Promotions that apply to the cart, in catalogue order.
    pub applicable: Vec<PromotionView>,

    /// Discount granted by each applicable promotion.
    pub discounts: Vec<PromotionDiscount>,

    /// Sum of every applicable discount.
    pub total_discount: Money,

    /// Total when overlapping discounts exclude each other.
    pub exclusive_discount: Money,

    pub flash_sales: Vec<FlashSaleView>,
    pub expiring_soon: Vec<PromotionView>,

    /// Events published while loading the catalogue.
    pub published_events: usize,
}

impl EvaluationReport {
    /// Returns the subtotal after the additive discount, never below zero.
    pub fn total_after_discount(&self) -> Result<Money, AppError> {
        let total = self
            .subtotal
            .saturating_sub(self.total_discount)
            .map_err(domain::PromotionError::from)
            .map_err(domain::DomainError::from)?;
        Ok(total)
    }
}

/// Loads the catalogue into a fresh in-memory service and evaluates the cart.
///
/// Promotions are created in catalogue order; an invalid entry aborts the run.
#[tracing::instrument(skip(catalog, cart), fields(promotions = catalog.len()))]
pub async fn evaluate(
    catalog: &PromotionCatalog,
    cart: &ShoppingCart,
    expiring_within: Duration,
) -> Result<EvaluationReport, AppError> {
    let store = InMemoryEventStore::new();
    let service = PromotionApplicationService::new(InMemoryPromotionRepository::new(), store.clone());

    for cmd in &catalog.promotions {
        service.create_promotion(cmd.clone()).await?;
    }

    let applicable = service.get_applicable_promotions(cart).await?;
    let discounts = service.applicable_discounts(cart).await?;
    let total_discount = service.calculate_total_discount(cart).await?;
    let exclusive_discount = service.calculate_exclusive_discount(cart).await?;
    let flash_sales = service.get_flash_sales().await?;
    let expiring_soon = service.get_expiring_soon(expiring_within).await?;
    let published_events = store.event_count().await;

    tracing::info!(
        applicable = applicable.len(),
        %total_discount,
        %exclusive_discount,
        "cart evaluated"
    );

    Ok(EvaluationReport {
        evaluated_at: Utc::now(),
        subtotal: cart.subtotal(),
        applicable,
        discounts,
        total_discount,
        exclusive_discount,
        flash_sales,
        expiring_soon,
        published_events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ProductId;
    use domain::{
        CreateFixedAmountPromotion, CreateFlashSalePromotion, CreatePromotion, Currency,
    };

    fn catalog() -> PromotionCatalog {
        let now = Utc::now();
        PromotionCatalog {
            promotions: vec![
                CreatePromotion::FlashSale(
                    CreateFlashSalePromotion::new(
                        "Flash sale",
                        now - Duration::days(1),
                        now + Duration::days(2),
                        ProductId::of("SKU-001").unwrap(),
                        Money::twd(90),
                        10,
                    )
                    .with_original_price(Money::twd(120)),
                ),
                CreatePromotion::FixedAmountOff(CreateFixedAmountPromotion::new(
                    "Fifty off",
                    now - Duration::days(1),
                    now + Duration::days(30),
                    Money::twd(50),
                )),
            ],
        }
    }

    fn cart() -> ShoppingCart {
        ShoppingCart::new(Currency::Twd)
            .with_item(ProductId::of("SKU-001").unwrap(), 3, Money::twd(120))
            .unwrap()
    }

    #[tokio::test]
    async fn test_evaluate_report() {
        let report = evaluate(&catalog(), &cart(), Duration::days(7)).await.unwrap();

        assert_eq!(report.subtotal, Money::twd(360));
        assert_eq!(report.applicable.len(), 2);
        assert_eq!(report.discounts.len(), 2);
        assert_eq!(report.total_discount, Money::twd(140));
        assert_eq!(report.exclusive_discount, Money::twd(90));
        assert_eq!(report.flash_sales.len(), 1);
        assert_eq!(report.expiring_soon.len(), 1);
        assert_eq!(report.published_events, 2);
        assert_eq!(report.total_after_discount().unwrap(), Money::twd(220));
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let report = evaluate(&PromotionCatalog::default(), &cart(), Duration::days(7))
            .await
            .unwrap();

        assert!(report.applicable.is_empty());
        assert!(report.total_discount.is_zero());
        assert!(report.exclusive_discount.is_zero());
        assert_eq!(report.total_after_discount().unwrap(), Money::twd(360));
    }

    #[tokio::test]
    async fn test_invalid_catalog_entry_aborts() {
        let now = Utc::now();
        let catalog = PromotionCatalog {
            promotions: vec![CreatePromotion::FixedAmountOff(
                CreateFixedAmountPromotion::new("Backwards", now, now - Duration::days(1), Money::twd(5)),
            )],
        };

        let result = evaluate(&catalog, &cart(), Duration::days(7)).await;
        assert!(matches!(result, Err(AppError::Domain(_))));
    }
}
