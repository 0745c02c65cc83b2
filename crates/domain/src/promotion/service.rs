//! Promotion application service.

use chrono::{DateTime, Duration, Utc};
use event_store::EventStore;

use crate::aggregate::Aggregate;
use crate::cart::{CartSummary, CartSummaryConverter, DefaultCartSummaryConverter, ShoppingCart};
use crate::error::DomainError;
use crate::money::Money;
use crate::publisher::DomainEventApplicationService;

use super::{
    CreateFixedAmountPromotion, CreateFlashSalePromotion, CreatePercentageOffPromotion,
    CreatePromotion, FlashSaleView, Promotion, PromotionDiscount, PromotionError, PromotionEvent,
    PromotionFactory, PromotionId, PromotionRepository, PromotionStatus, PromotionType,
    PromotionView, StackingPolicy,
};

/// Service orchestrating promotion lookups, discount evaluation and lifecycle
/// changes.
///
/// Mutations follow load, decide, record, save, publish. Publication is best
/// effort: a failure is logged and counted but the saved promotion stands.
pub struct PromotionApplicationService<R, S, C = DefaultCartSummaryConverter>
where
    R: PromotionRepository,
    S: EventStore,
    C: CartSummaryConverter,
{
    repository: R,
    publisher: DomainEventApplicationService<S>,
    converter: C,
}

impl<R, S> PromotionApplicationService<R, S>
where
    R: PromotionRepository,
    S: EventStore,
{
    /// Creates a service with the default cart converter.
    pub fn new(repository: R, store: S) -> Self {
        Self::with_converter(repository, store, DefaultCartSummaryConverter)
    }
}

impl<R, S, C> PromotionApplicationService<R, S, C>
where
    R: PromotionRepository,
    S: EventStore,
    C: CartSummaryConverter,
{
    /// Creates a service with a custom cart converter.
    pub fn with_converter(repository: R, store: S, converter: C) -> Self {
        Self {
            repository,
            publisher: DomainEventApplicationService::new(store),
            converter,
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns a reference to the event publisher.
    pub fn publisher(&self) -> &DomainEventApplicationService<S> {
        &self.publisher
    }

    // Creation

    /// Creates a flash-sale promotion.
    #[tracing::instrument(skip(self, cmd), fields(name = %cmd.name))]
    pub async fn create_flash_sale_promotion(
        &self,
        cmd: CreateFlashSalePromotion,
    ) -> Result<PromotionView, DomainError> {
        let promotion = PromotionFactory::create_flash_sale_promotion(cmd, Utc::now())?;
        self.persist_new(promotion).await
    }

    /// Creates a percentage-off promotion.
    #[tracing::instrument(skip(self, cmd), fields(name = %cmd.name))]
    pub async fn create_percentage_off_promotion(
        &self,
        cmd: CreatePercentageOffPromotion,
    ) -> Result<PromotionView, DomainError> {
        let promotion = PromotionFactory::create_percentage_off_promotion(cmd, Utc::now())?;
        self.persist_new(promotion).await
    }

    /// Creates a fixed-amount promotion.
    #[tracing::instrument(skip(self, cmd), fields(name = %cmd.name))]
    pub async fn create_fixed_amount_promotion(
        &self,
        cmd: CreateFixedAmountPromotion,
    ) -> Result<PromotionView, DomainError> {
        let promotion = PromotionFactory::create_fixed_amount_promotion(cmd, Utc::now())?;
        self.persist_new(promotion).await
    }

    /// Creates a promotion of any type.
    pub async fn create_promotion(&self, cmd: CreatePromotion) -> Result<PromotionView, DomainError> {
        match cmd {
            CreatePromotion::FlashSale(cmd) => self.create_flash_sale_promotion(cmd).await,
            CreatePromotion::PercentageOff(cmd) => self.create_percentage_off_promotion(cmd).await,
            CreatePromotion::FixedAmountOff(cmd) => self.create_fixed_amount_promotion(cmd).await,
        }
    }

    // Queries

    /// Returns promotions that are active right now.
    #[tracing::instrument(skip(self))]
    pub async fn get_active_promotions(&self) -> Result<Vec<PromotionView>, DomainError> {
        let promotions = self.repository.find_active_promotions(Utc::now()).await?;
        Ok(promotions.iter().map(PromotionView::from).collect())
    }

    /// Returns promotions of a type.
    #[tracing::instrument(skip(self))]
    pub async fn get_promotions_by_type(
        &self,
        promotion_type: PromotionType,
    ) -> Result<Vec<PromotionView>, DomainError> {
        let promotions = self.repository.find_by_type(promotion_type).await?;
        Ok(promotions.iter().map(PromotionView::from).collect())
    }

    /// Returns a promotion by id, or `None` if it does not exist.
    #[tracing::instrument(skip(self), fields(promotion_id = %promotion_id))]
    pub async fn get_promotion_by_id(
        &self,
        promotion_id: &PromotionId,
    ) -> Result<Option<PromotionView>, DomainError> {
        let promotion = self.repository.find_by_id(promotion_id).await?;
        Ok(promotion.as_ref().map(PromotionView::from))
    }

    /// Returns every flash sale, whatever its status.
    #[tracing::instrument(skip(self))]
    pub async fn get_flash_sales(&self) -> Result<Vec<FlashSaleView>, DomainError> {
        let promotions = self.repository.find_by_type(PromotionType::FlashSale).await?;
        Ok(promotions
            .iter()
            .filter_map(FlashSaleView::from_promotion)
            .collect())
    }

    /// Returns active promotions ending within `within`.
    #[tracing::instrument(skip(self))]
    pub async fn get_expiring_soon(
        &self,
        within: Duration,
    ) -> Result<Vec<PromotionView>, DomainError> {
        let promotions = self
            .repository
            .find_expiring_soon(Utc::now(), within)
            .await?;
        Ok(promotions.iter().map(PromotionView::from).collect())
    }

    // Evaluation

    /// Returns the active promotions that apply to the cart, in repository order.
    #[tracing::instrument(skip(self, cart))]
    pub async fn get_applicable_promotions(
        &self,
        cart: &ShoppingCart,
    ) -> Result<Vec<PromotionView>, DomainError> {
        metrics::counter!("promotion_evaluations_total", "operation" => "applicable").increment(1);

        let summary = self.converter.to_cart_summary(cart);
        let now = Utc::now();
        let promotions = self.repository.find_active_promotions(now).await?;

        let applicable: Vec<PromotionView> = promotions
            .iter()
            .filter(|p| p.is_applicable_at(&summary, now))
            .map(PromotionView::from)
            .collect();

        tracing::debug!(count = applicable.len(), "applicable promotions found");
        Ok(applicable)
    }

    /// Returns the discount one promotion grants on the cart.
    ///
    /// Fails with `PromotionError::NotFound` if the promotion does not exist;
    /// a promotion that does not apply grants zero.
    #[tracing::instrument(skip(self, cart), fields(promotion_id = %promotion_id))]
    pub async fn calculate_promotion_discount(
        &self,
        cart: &ShoppingCart,
        promotion_id: &PromotionId,
    ) -> Result<Money, DomainError> {
        metrics::counter!("promotion_evaluations_total", "operation" => "single").increment(1);

        let summary = self.converter.to_cart_summary(cart);
        let promotion = self.load(promotion_id).await?;
        let discount = promotion.calculate_discount(&summary)?;

        tracing::debug!(%discount, "promotion discount calculated");
        Ok(discount)
    }

    /// Returns the sum of every applicable promotion's discount.
    ///
    /// Discounts stack without interacting, so overlapping promotions are all
    /// counted. The result does not depend on repository order.
    #[tracing::instrument(skip(self, cart))]
    pub async fn calculate_total_discount(&self, cart: &ShoppingCart) -> Result<Money, DomainError> {
        metrics::counter!("promotion_evaluations_total", "operation" => "total").increment(1);
        self.combine(cart, StackingPolicy::Additive).await
    }

    /// Returns the total discount when overlapping promotions exclude each other.
    ///
    /// Each product line and the cart as a whole take at most one discount; the
    /// largest wins. See [`StackingPolicy::ExclusivePerScope`].
    #[tracing::instrument(skip(self, cart))]
    pub async fn calculate_exclusive_discount(
        &self,
        cart: &ShoppingCart,
    ) -> Result<Money, DomainError> {
        metrics::counter!("promotion_evaluations_total", "operation" => "exclusive").increment(1);
        self.combine(cart, StackingPolicy::ExclusivePerScope).await
    }

    /// Returns the discount of every applicable promotion, in repository order.
    pub async fn applicable_discounts(
        &self,
        cart: &ShoppingCart,
    ) -> Result<Vec<PromotionDiscount>, DomainError> {
        let summary = self.converter.to_cart_summary(cart);
        self.discounts_for(&summary, Utc::now()).await
    }

    async fn combine(
        &self,
        cart: &ShoppingCart,
        policy: StackingPolicy,
    ) -> Result<Money, DomainError> {
        let summary = self.converter.to_cart_summary(cart);
        let discounts = self.discounts_for(&summary, Utc::now()).await?;
        let total = policy
            .combine(&discounts, summary.currency())
            .map_err(PromotionError::from)?;

        tracing::debug!(?policy, promotions = discounts.len(), %total, "discounts combined");
        Ok(total)
    }

    async fn discounts_for(
        &self,
        summary: &CartSummary,
        now: DateTime<Utc>,
    ) -> Result<Vec<PromotionDiscount>, DomainError> {
        let promotions = self.repository.find_active_promotions(now).await?;

        let mut discounts = Vec::new();
        for promotion in promotions.iter().filter(|p| p.is_applicable_at(summary, now)) {
            discounts.push(PromotionDiscount {
                promotion_id: promotion.id().clone(),
                scope: promotion.rule().scope(),
                amount: promotion.calculate_discount_at(summary, now)?,
            });
        }
        Ok(discounts)
    }

    // Lifecycle

    /// Activates a draft promotion.
    #[tracing::instrument(skip(self), fields(promotion_id = %promotion_id))]
    pub async fn activate_promotion(
        &self,
        promotion_id: &PromotionId,
    ) -> Result<PromotionView, DomainError> {
        let now = Utc::now();
        let (promotion, _) = self.execute(promotion_id, |p| p.activate(now)).await?;
        tracing::info!("promotion activated");
        Ok(PromotionView::from(&promotion))
    }

    /// Withdraws a draft or active promotion.
    #[tracing::instrument(skip(self, reason), fields(promotion_id = %promotion_id))]
    pub async fn deactivate_promotion(
        &self,
        promotion_id: &PromotionId,
        reason: impl Into<String> + Send,
    ) -> Result<PromotionView, DomainError> {
        let now = Utc::now();
        let reason = reason.into();
        let (promotion, _) = self
            .execute(promotion_id, |p| p.deactivate(reason.clone(), now))
            .await?;
        tracing::info!(%reason, "promotion deactivated");
        Ok(PromotionView::from(&promotion))
    }

    /// Expires an active promotion.
    #[tracing::instrument(skip(self), fields(promotion_id = %promotion_id))]
    pub async fn expire_promotion(
        &self,
        promotion_id: &PromotionId,
    ) -> Result<PromotionView, DomainError> {
        let now = Utc::now();
        let (promotion, _) = self.execute(promotion_id, |p| p.expire(now)).await?;
        tracing::info!("promotion expired");
        Ok(PromotionView::from(&promotion))
    }

    /// Expires every active promotion whose period ended before `now`.
    ///
    /// A promotion that cannot be expired or saved is logged and skipped; the
    /// sweep carries on and returns the promotions it did expire.
    #[tracing::instrument(skip(self))]
    pub async fn expire_elapsed_promotions(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<PromotionView>, DomainError> {
        let active = self
            .repository
            .find_by_status(PromotionStatus::Active)
            .await?;

        let mut expired = Vec::new();
        for mut promotion in active
            .into_iter()
            .filter(|p| p.valid_period().has_ended(now))
        {
            let promotion_id = promotion.id().clone();
            let result = match promotion.expire(now) {
                Ok(events) => {
                    promotion.record(events);
                    self.save_and_publish(promotion).await
                }
                Err(error) => Err(error.into()),
            };

            match result {
                Ok(saved) => {
                    tracing::info!(promotion_id = %saved.id(), "elapsed promotion expired");
                    expired.push(PromotionView::from(&saved));
                }
                Err(error) => {
                    metrics::counter!("promotion_expiry_failures_total").increment(1);
                    tracing::warn!(%promotion_id, %error, "failed to expire elapsed promotion");
                }
            }
        }

        Ok(expired)
    }

    /// Applies a promotion to a checkout of the cart and returns the discount granted.
    ///
    /// Fails with `PromotionError::NotApplicable` when the promotion does not
    /// apply to the cart.
    #[tracing::instrument(skip(self, cart), fields(promotion_id = %promotion_id))]
    pub async fn record_usage(
        &self,
        cart: &ShoppingCart,
        promotion_id: &PromotionId,
    ) -> Result<Money, DomainError> {
        let summary = self.converter.to_cart_summary(cart);
        let now = Utc::now();

        let (promotion, events) = self
            .execute(promotion_id, |p| p.record_usage(&summary, now))
            .await?;

        let discount = events
            .iter()
            .find_map(|event| match event {
                PromotionEvent::PromotionUsed(data) => Some(data.discount),
                _ => None,
            })
            .unwrap_or_else(|| Money::zero(summary.currency()));

        metrics::counter!("promotion_usages_total").increment(1);
        tracing::info!(
            %discount,
            usage_count = promotion.usage_count(),
            status = %promotion.status(),
            "promotion usage recorded"
        );
        Ok(discount)
    }

    // Helpers

    async fn load(&self, promotion_id: &PromotionId) -> Result<Promotion, DomainError> {
        self.repository
            .find_by_id(promotion_id)
            .await?
            .ok_or_else(|| {
                PromotionError::NotFound {
                    promotion_id: promotion_id.to_string(),
                }
                .into()
            })
    }

    /// Loads a promotion, runs a command against it and persists the outcome.
    async fn execute<F>(
        &self,
        promotion_id: &PromotionId,
        command: F,
    ) -> Result<(Promotion, Vec<PromotionEvent>), DomainError>
    where
        F: FnOnce(&Promotion) -> Result<Vec<PromotionEvent>, PromotionError>,
    {
        let mut promotion = self.load(promotion_id).await?;
        let events = command(&promotion)?;
        promotion.record(events.clone());
        let saved = self.save_and_publish(promotion).await?;
        Ok((saved, events))
    }

    async fn persist_new(&self, promotion: Promotion) -> Result<PromotionView, DomainError> {
        let promotion_type = promotion.promotion_type();
        let saved = self.save_and_publish(promotion).await?;

        metrics::counter!("promotions_created_total", "type" => promotion_type.as_str())
            .increment(1);
        tracing::info!(promotion_id = %saved.id(), %promotion_type, "promotion created");
        Ok(PromotionView::from(&saved))
    }

    async fn save_and_publish(&self, mut promotion: Promotion) -> Result<Promotion, DomainError> {
        let saved = self.repository.save(&promotion).await?;

        if let Err(error) = self
            .publisher
            .publish_events_from_aggregate(&mut promotion)
            .await
        {
            metrics::counter!("promotion_event_publish_failures_total").increment(1);
            tracing::warn!(promotion_id = %promotion.id(), %error, "failed to publish promotion events");
        }

        Ok(saved)
    }
}
