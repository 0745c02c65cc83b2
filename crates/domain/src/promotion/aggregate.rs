//! Promotion aggregate implementation.

use chrono::{DateTime, Utc};
use event_store::Version;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::cart::CartSummary;
use crate::money::Money;

use super::{
    FlashSaleRule, PromotionError, PromotionEvent, PromotionId, PromotionRule, PromotionStatus,
    PromotionType, ValidPeriod, events::PromotionCreatedData,
};

/// Promotion aggregate root.
///
/// Owns its rule and validity period. Evaluation methods are pure; command
/// methods return the events they would raise and leave recording to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    id: PromotionId,
    name: String,
    description: Option<String>,
    promotion_type: PromotionType,
    status: PromotionStatus,
    valid_period: ValidPeriod,
    usage_limit: u32,
    usage_count: u32,
    rule: PromotionRule,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,

    /// Current version for optimistic concurrency.
    #[serde(default)]
    version: Version,

    #[serde(skip)]
    pending_events: Vec<PromotionEvent>,
}

impl Aggregate for Promotion {
    type Event = PromotionEvent;
    type Error = PromotionError;

    fn aggregate_type() -> &'static str {
        "Promotion"
    }

    fn aggregate_id(&self) -> String {
        self.id.to_string()
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            PromotionEvent::PromotionCreated(data) => self.apply_created(data),
            PromotionEvent::PromotionActivated(data) => {
                self.status = PromotionStatus::Active;
                self.updated_at = data.activated_at;
            }
            PromotionEvent::PromotionDeactivated(data) => {
                self.status = PromotionStatus::Inactive;
                self.updated_at = data.deactivated_at;
            }
            PromotionEvent::PromotionExpired(data) => {
                self.status = PromotionStatus::Expired;
                self.updated_at = data.expired_at;
            }
            PromotionEvent::PromotionUsed(data) => {
                self.usage_count = self.usage_count.saturating_add(1);
                if let PromotionRule::FlashSale(rule) = &mut self.rule {
                    rule.units_sold = rule.units_sold.saturating_add(data.units);
                }
                self.updated_at = data.used_at;
            }
            PromotionEvent::PromotionDepleted(data) => {
                self.status = PromotionStatus::Depleted;
                self.updated_at = data.depleted_at;
            }
        }
    }

    fn pending_events(&self) -> &[Self::Event] {
        &self.pending_events
    }

    fn take_pending_events(&mut self) -> Vec<Self::Event> {
        std::mem::take(&mut self.pending_events)
    }

    fn push_pending_event(&mut self, event: Self::Event) {
        self.pending_events.push(event);
    }
}

// Construction
impl Promotion {
    /// Creates a promotion from its creation event and records that event.
    ///
    /// Callers are expected to have validated `data`; see `PromotionFactory`.
    pub fn create(data: PromotionCreatedData) -> Self {
        let mut promotion = Self::from_created(&data);
        promotion.record([PromotionEvent::PromotionCreated(data)]);
        promotion
    }

    /// Rebuilds a promotion by replaying its history.
    ///
    /// The first event must be `PromotionCreated`. Returns `None` for an empty history.
    pub fn from_history(
        events: impl IntoIterator<Item = PromotionEvent>,
    ) -> Result<Option<Self>, PromotionError> {
        let mut events = events.into_iter();
        let Some(first) = events.next() else {
            return Ok(None);
        };

        let data = match first {
            PromotionEvent::PromotionCreated(data) => data,
            other => {
                return Err(PromotionError::CorruptHistory {
                    reason: format!(
                        "history must start with PromotionCreated, found {}",
                        other.event_type()
                    ),
                });
            }
        };

        let mut promotion = Self::from_created(&data);
        promotion.apply_events(std::iter::once(PromotionEvent::PromotionCreated(data)).chain(events));
        Ok(Some(promotion))
    }

    fn from_created(data: &PromotionCreatedData) -> Self {
        Self {
            id: data.promotion_id.clone(),
            name: data.name.clone(),
            description: data.description.clone(),
            promotion_type: data.promotion_type,
            status: data.status,
            valid_period: data.valid_period,
            usage_limit: data.usage_limit,
            usage_count: 0,
            rule: data.rule.clone(),
            created_at: data.created_at,
            updated_at: data.created_at,
            version: Version::initial(),
            pending_events: Vec::new(),
        }
    }

    fn apply_created(&mut self, data: PromotionCreatedData) {
        self.id = data.promotion_id;
        self.name = data.name;
        self.description = data.description;
        self.promotion_type = data.promotion_type;
        self.status = data.status;
        self.valid_period = data.valid_period;
        self.usage_limit = data.usage_limit;
        self.usage_count = 0;
        self.rule = data.rule;
        self.created_at = data.created_at;
        self.updated_at = data.created_at;
    }
}

// Query methods
impl Promotion {
    pub fn id(&self) -> &PromotionId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn promotion_type(&self) -> PromotionType {
        self.promotion_type
    }

    pub fn status(&self) -> PromotionStatus {
        self.status
    }

    pub fn valid_period(&self) -> &ValidPeriod {
        &self.valid_period
    }

    pub fn usage_limit(&self) -> u32 {
        self.usage_limit
    }

    pub fn usage_count(&self) -> u32 {
        self.usage_count
    }

    pub fn rule(&self) -> &PromotionRule {
        &self.rule
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the flash-sale rule, if this promotion has one.
    pub fn flash_sale_rule(&self) -> Option<&FlashSaleRule> {
        self.rule.as_flash_sale()
    }

    /// Returns true if the promotion is active and below its usage limit,
    /// regardless of the time window.
    pub fn can_use(&self) -> bool {
        self.status.is_active() && self.usage_count < self.usage_limit
    }

    /// Returns the number of uses left, never negative.
    pub fn remaining_usage(&self) -> u32 {
        self.usage_limit.saturating_sub(self.usage_count)
    }

    /// Returns true if the promotion applies to the cart right now.
    pub fn is_applicable(&self, cart: &CartSummary) -> bool {
        self.is_applicable_at(cart, Utc::now())
    }

    /// Returns true if the promotion is usable, `now` lies within the valid
    /// period and the rule accepts the cart.
    pub fn is_applicable_at(&self, cart: &CartSummary, now: DateTime<Utc>) -> bool {
        self.can_use() && self.valid_period.contains(now) && self.rule.is_eligible(cart)
    }

    /// Returns the discount this promotion grants on the cart right now.
    pub fn calculate_discount(&self, cart: &CartSummary) -> Result<Money, PromotionError> {
        self.calculate_discount_at(cart, Utc::now())
    }

    /// Returns the discount this promotion grants on the cart at `now`.
    ///
    /// A promotion that does not apply grants zero in the cart's currency.
    /// Fails only when the rule itself is malformed or does not match the
    /// promotion type. The result never exceeds the cart subtotal.
    pub fn calculate_discount_at(
        &self,
        cart: &CartSummary,
        now: DateTime<Utc>,
    ) -> Result<Money, PromotionError> {
        self.check_rule()?;

        if !self.is_applicable_at(cart, now) {
            return Ok(Money::zero(cart.currency()));
        }

        let discount = self.rule.discount_for(cart);
        let subtotal = cart.subtotal();
        Ok(Money::new(
            discount.amount().min(subtotal.amount()).max(Decimal::ZERO),
            cart.currency(),
        ))
    }

    fn check_rule(&self) -> Result<(), PromotionError> {
        if self.rule.promotion_type() != self.promotion_type {
            return Err(PromotionError::InvalidRule {
                promotion_id: self.id.to_string(),
                reason: format!(
                    "{} rule attached to a {} promotion",
                    self.rule.promotion_type(),
                    self.promotion_type
                ),
            });
        }

        self.rule
            .validate()
            .map_err(|violation| PromotionError::InvalidRule {
                promotion_id: self.id.to_string(),
                reason: violation.to_string(),
            })
    }
}

// Command methods (return events)
impl Promotion {
    /// Activates a draft promotion.
    pub fn activate(&self, now: DateTime<Utc>) -> Result<Vec<PromotionEvent>, PromotionError> {
        if !self.status.can_activate() {
            return Err(PromotionError::InvalidStateTransition {
                current_status: self.status,
                action: "activate",
            });
        }

        if self.valid_period.has_ended(now) {
            return Err(PromotionError::InvalidStateTransition {
                current_status: self.status,
                action: "activate after the period ended",
            });
        }

        Ok(vec![PromotionEvent::promotion_activated(now)])
    }

    /// Withdraws the promotion.
    pub fn deactivate(
        &self,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Vec<PromotionEvent>, PromotionError> {
        if !self.status.can_deactivate() {
            return Err(PromotionError::InvalidStateTransition {
                current_status: self.status,
                action: "deactivate",
            });
        }

        Ok(vec![PromotionEvent::promotion_deactivated(reason, now)])
    }

    /// Marks an active promotion as expired.
    pub fn expire(&self, now: DateTime<Utc>) -> Result<Vec<PromotionEvent>, PromotionError> {
        if !self.status.can_expire() {
            return Err(PromotionError::InvalidStateTransition {
                current_status: self.status,
                action: "expire",
            });
        }

        Ok(vec![PromotionEvent::promotion_expired(now)])
    }

    /// Records that the promotion was applied to a checkout of `cart`.
    ///
    /// Raises `PromotionDepleted` as well when this use exhausts the usage
    /// limit or the flash-sale stock.
    pub fn record_usage(
        &self,
        cart: &CartSummary,
        now: DateTime<Utc>,
    ) -> Result<Vec<PromotionEvent>, PromotionError> {
        if !self.status.can_record_usage() {
            return Err(PromotionError::InvalidStateTransition {
                current_status: self.status,
                action: "record usage",
            });
        }

        if !self.is_applicable_at(cart, now) {
            return Err(PromotionError::NotApplicable {
                promotion_id: self.id.to_string(),
            });
        }

        let discount = self.calculate_discount_at(cart, now)?;
        let units = self
            .flash_sale_rule()
            .map_or(0, |rule| rule.discounted_units(cart));

        let mut events = vec![PromotionEvent::promotion_used(
            cart.customer_id().cloned(),
            discount,
            units,
            now,
        )];

        let usage_exhausted = self.usage_count.saturating_add(1) >= self.usage_limit;
        let stock_exhausted = self
            .flash_sale_rule()
            .is_some_and(|rule| units >= rule.remaining_quantity());

        if usage_exhausted || stock_exhausted {
            events.push(PromotionEvent::promotion_depleted(now));
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::ShoppingCart;
    use crate::money::Currency;
    use chrono::{Duration, TimeZone};
    use common::ProductId;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn sku() -> ProductId {
        ProductId::of("SKU-001").unwrap()
    }

    fn created(status: PromotionStatus, usage_limit: u32, quantity_limit: u32) -> PromotionCreatedData {
        PromotionCreatedData {
            promotion_id: PromotionId::of("promo-1").unwrap(),
            name: "Summer flash sale".to_string(),
            description: None,
            promotion_type: PromotionType::FlashSale,
            status,
            valid_period: ValidPeriod::new(now() - Duration::days(1), now() + Duration::days(1))
                .unwrap(),
            usage_limit,
            rule: PromotionRule::FlashSale(
                FlashSaleRule::new(sku(), Money::twd(90), quantity_limit)
                    .with_original_price(Money::twd(120)),
            ),
            created_at: now() - Duration::days(2),
        }
    }

    fn active_promotion() -> Promotion {
        Promotion::create(created(PromotionStatus::Active, u32::MAX, 10))
    }

    fn cart_with(quantity: u32) -> CartSummary {
        let cart = ShoppingCart::new(Currency::Twd)
            .with_item(sku(), quantity, Money::twd(120))
            .unwrap();
        CartSummary::from(&cart)
    }

    #[test]
    fn test_create_records_created_event() {
        let promotion = active_promotion();

        assert_eq!(promotion.version(), Version::first());
        assert_eq!(promotion.committed_version(), Version::initial());
        assert_eq!(promotion.pending_events().len(), 1);
        assert_eq!(promotion.status(), PromotionStatus::Active);
        assert_eq!(promotion.usage_count(), 0);
    }

    #[test]
    fn test_flash_sale_discount_scenario() {
        let promotion = active_promotion();
        let cart = cart_with(3);

        assert!(promotion.is_applicable_at(&cart, now()));
        assert_eq!(
            promotion.calculate_discount_at(&cart, now()).unwrap(),
            Money::twd(90)
        );
    }

    #[test]
    fn test_not_applicable_outside_period() {
        let promotion = active_promotion();
        let cart = cart_with(3);
        let later = now() + Duration::days(5);

        assert!(!promotion.is_applicable_at(&cart, later));
        assert!(promotion.calculate_discount_at(&cart, later).unwrap().is_zero());
    }

    #[test]
    fn test_draft_is_not_applicable_but_can_be_activated() {
        let promotion = Promotion::create(created(PromotionStatus::Draft, u32::MAX, 10));
        let cart = cart_with(1);

        assert!(!promotion.can_use());
        assert!(promotion.calculate_discount_at(&cart, now()).unwrap().is_zero());

        let events = promotion.activate(now()).unwrap();
        assert!(matches!(events[0], PromotionEvent::PromotionActivated(_)));
    }

    #[test]
    fn test_activate_rejects_active_promotion() {
        let result = active_promotion().activate(now());
        assert!(matches!(
            result,
            Err(PromotionError::InvalidStateTransition {
                current_status: PromotionStatus::Active,
                action: "activate",
            })
        ));
    }

    #[test]
    fn test_mismatched_rule_is_invalid() {
        let mut data = created(PromotionStatus::Active, u32::MAX, 10);
        data.promotion_type = PromotionType::PercentageOff;
        let promotion = Promotion::create(data);

        let result = promotion.calculate_discount_at(&cart_with(1), now());
        assert!(matches!(result, Err(PromotionError::InvalidRule { .. })));
    }

    #[test]
    fn test_malformed_rule_is_invalid_even_when_not_applicable() {
        let promotion = Promotion::create(created(PromotionStatus::Active, u32::MAX, 0));
        let result = promotion.calculate_discount_at(&CartSummary::empty(Currency::Twd), now());
        assert!(matches!(result, Err(PromotionError::InvalidRule { .. })));
    }

    #[test]
    fn test_record_usage_counts_and_sells_units() {
        let mut promotion = active_promotion();
        let cart = cart_with(3);

        let events = promotion.record_usage(&cart, now()).unwrap();
        assert_eq!(events.len(), 1);
        promotion.record(events);

        assert_eq!(promotion.usage_count(), 1);
        assert_eq!(promotion.remaining_usage(), u32::MAX - 1);
        assert_eq!(promotion.flash_sale_rule().unwrap().remaining_quantity(), 7);
        assert_eq!(promotion.version(), Version::new(2));
    }

    #[test]
    fn test_record_usage_depletes_on_usage_limit() {
        let mut promotion = Promotion::create(created(PromotionStatus::Active, 1, 10));
        let cart = cart_with(1);

        let events = promotion.record_usage(&cart, now()).unwrap();
        assert!(matches!(
            events.last(),
            Some(PromotionEvent::PromotionDepleted(_))
        ));
        promotion.record(events);

        assert_eq!(promotion.status(), PromotionStatus::Depleted);
        assert!(!promotion.can_use());
        assert!(promotion.status().is_terminal());
    }

    #[test]
    fn test_record_usage_depletes_on_stock() {
        let mut promotion = Promotion::create(created(PromotionStatus::Active, u32::MAX, 2));
        let events = promotion.record_usage(&cart_with(5), now()).unwrap();
        promotion.record(events);

        assert_eq!(promotion.status(), PromotionStatus::Depleted);
        assert!(promotion.flash_sale_rule().unwrap().is_sold_out());
    }

    #[test]
    fn test_record_usage_requires_applicable_cart() {
        let promotion = active_promotion();
        let empty = CartSummary::empty(Currency::Twd);

        assert!(matches!(
            promotion.record_usage(&empty, now()),
            Err(PromotionError::NotApplicable { .. })
        ));
    }

    #[test]
    fn test_deactivate_and_expire() {
        let promotion = active_promotion();

        let events = promotion.deactivate("pulled by merchandising", now()).unwrap();
        let mut deactivated = promotion.clone();
        deactivated.record(events);
        assert_eq!(deactivated.status(), PromotionStatus::Inactive);
        assert!(deactivated.expire(now()).is_err());
        assert!(deactivated.deactivate("again", now()).is_err());

        let mut expired = promotion;
        expired.record(expired.expire(now()).unwrap());
        assert_eq!(expired.status(), PromotionStatus::Expired);
    }

    #[test]
    fn test_from_history_replays_events() {
        let mut promotion = active_promotion();
        promotion.record(promotion.record_usage(&cart_with(3), now()).unwrap());
        let history = promotion.take_pending_events();

        let replayed = Promotion::from_history(history).unwrap().unwrap();
        assert_eq!(replayed.usage_count(), 1);
        assert_eq!(replayed.version(), Version::new(2));
        assert!(replayed.pending_events().is_empty());
        assert_eq!(replayed.flash_sale_rule(), promotion.flash_sale_rule());
    }

    #[test]
    fn test_from_history_requires_created_first() {
        assert!(Promotion::from_history(Vec::new()).unwrap().is_none());
        let result = Promotion::from_history(vec![PromotionEvent::promotion_expired(now())]);
        assert!(
            matches!(result, Err(PromotionError::CorruptHistory { .. })),
            "expected CorruptHistory, got {result:?}"
        );
    }

    fn arb_status() -> impl Strategy<Value = PromotionStatus> {
        prop::sample::select(vec![
            PromotionStatus::Draft,
            PromotionStatus::Active,
            PromotionStatus::Inactive,
            PromotionStatus::Expired,
            PromotionStatus::Depleted,
        ])
    }

    fn arb_cart() -> impl Strategy<Value = CartSummary> {
        let currency = prop_oneof![Just(Currency::Twd), Just(Currency::Usd)];
        let lines = prop::collection::vec(
            (prop::sample::select(vec!["SKU-001", "SKU-002"]), 1u32..6, 1i64..300),
            0..4,
        );
        (currency, lines).prop_map(|(currency, lines)| {
            let mut cart = ShoppingCart::new(currency);
            for (id, quantity, price) in lines {
                cart.add_item(ProductId::of(id).unwrap(), quantity, Money::new(price, currency))
                    .unwrap();
            }
            CartSummary::from(&cart)
        })
    }

    proptest! {
        #[test]
        fn non_applicable_promotion_grants_zero(
            status in arb_status(),
            usage_limit in 1u32..4,
            quantity_limit in 1u32..20,
            offset_hours in -72i64..72,
            cart in arb_cart()
        ) {
            let promotion = Promotion::create(created(status, usage_limit, quantity_limit));
            let at = now() + Duration::hours(offset_hours);

            let discount = promotion.calculate_discount_at(&cart, at).unwrap();
            if promotion.is_applicable_at(&cart, at) {
                prop_assert!(discount.amount() <= cart.subtotal().amount());
                prop_assert!(!discount.is_negative());
            } else {
                prop_assert_eq!(discount, Money::zero(cart.currency()));
            }
        }
    }
}
