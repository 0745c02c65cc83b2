//! Combining the discounts of several promotions on one cart.

use common::ProductId;
use serde::{Deserialize, Serialize};

use crate::money::{Currency, Money, MoneyError};

use super::PromotionId;

/// The part of a cart a discount is taken from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscountScope {
    /// A single product line.
    Product(ProductId),

    /// The whole cart subtotal.
    WholeCart,
}

impl DiscountScope {
    /// Returns true if discounts on both scopes would reduce the same money.
    ///
    /// `WholeCart` overlaps every scope; two product scopes overlap only on the
    /// same product.
    pub fn overlaps(&self, other: &DiscountScope) -> bool {
        match (self, other) {
            (DiscountScope::WholeCart, _) | (_, DiscountScope::WholeCart) => true,
            (DiscountScope::Product(a), DiscountScope::Product(b)) => a == b,
        }
    }
}

/// The discount one applicable promotion grants on a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionDiscount {
    pub promotion_id: PromotionId,
    pub scope: DiscountScope,
    pub amount: Money,
}

/// How discounts from several promotions combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StackingPolicy {
    /// Every discount is added to the total.
    #[default]
    Additive,

    /// At most one discount per overlapping scope, largest first.
    ExclusivePerScope,
}

impl StackingPolicy {
    /// Returns the discounts that count under this policy.
    ///
    /// The exclusive policy considers discounts from largest to smallest amount,
    /// breaking ties by promotion id, and drops any whose scope overlaps one
    /// already taken. The selection does not depend on the input order.
    pub fn select<'a>(&self, discounts: &'a [PromotionDiscount]) -> Vec<&'a PromotionDiscount> {
        match self {
            StackingPolicy::Additive => discounts.iter().collect(),
            StackingPolicy::ExclusivePerScope => {
                let mut candidates: Vec<&PromotionDiscount> =
                    discounts.iter().filter(|d| d.amount.is_positive()).collect();
                candidates.sort_by(|a, b| {
                    b.amount
                        .amount()
                        .cmp(&a.amount.amount())
                        .then_with(|| a.promotion_id.cmp(&b.promotion_id))
                });

                let mut accepted: Vec<&PromotionDiscount> = Vec::new();
                for candidate in candidates {
                    if accepted.iter().all(|a| !a.scope.overlaps(&candidate.scope)) {
                        accepted.push(candidate);
                    }
                }
                accepted
            }
        }
    }

    /// Sums the selected discounts from zero in `currency`.
    pub fn combine(
        &self,
        discounts: &[PromotionDiscount],
        currency: Currency,
    ) -> Result<Money, MoneyError> {
        Money::sum(
            self.select(discounts).into_iter().map(|d| d.amount),
            currency,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn product(id: &str) -> DiscountScope {
        DiscountScope::Product(ProductId::of(id).unwrap())
    }

    fn discount(id: &str, scope: DiscountScope, amount: i64) -> PromotionDiscount {
        PromotionDiscount {
            promotion_id: PromotionId::of(id).unwrap(),
            scope,
            amount: Money::twd(amount),
        }
    }

    #[test]
    fn test_scope_overlap() {
        assert!(DiscountScope::WholeCart.overlaps(&DiscountScope::WholeCart));
        assert!(DiscountScope::WholeCart.overlaps(&product("A")));
        assert!(product("A").overlaps(&DiscountScope::WholeCart));
        assert!(product("A").overlaps(&product("A")));
        assert!(!product("A").overlaps(&product("B")));
    }

    #[test]
    fn test_additive_sums_everything() {
        let discounts = vec![
            discount("p1", product("A"), 50),
            discount("p2", product("A"), 30),
        ];

        let total = StackingPolicy::Additive
            .combine(&discounts, Currency::Twd)
            .unwrap();
        assert_eq!(total, Money::twd(80));
    }

    #[test]
    fn test_exclusive_keeps_largest_per_product() {
        let discounts = vec![
            discount("p1", product("A"), 30),
            discount("p2", product("A"), 50),
            discount("p3", product("B"), 20),
        ];

        let policy = StackingPolicy::ExclusivePerScope;
        let selected: Vec<_> = policy
            .select(&discounts)
            .into_iter()
            .map(|d| d.promotion_id.as_str())
            .collect();

        assert_eq!(selected, vec!["p2", "p3"]);
        assert_eq!(policy.combine(&discounts, Currency::Twd).unwrap(), Money::twd(70));
    }

    #[test]
    fn test_exclusive_whole_cart_excludes_product_discounts() {
        let discounts = vec![
            discount("p1", product("A"), 30),
            discount("p2", DiscountScope::WholeCart, 100),
        ];

        let total = StackingPolicy::ExclusivePerScope
            .combine(&discounts, Currency::Twd)
            .unwrap();
        assert_eq!(total, Money::twd(100));
    }

    #[test]
    fn test_exclusive_ties_break_on_promotion_id() {
        let discounts = vec![
            discount("p2", product("A"), 40),
            discount("p1", product("A"), 40),
        ];

        let selected = StackingPolicy::ExclusivePerScope.select(&discounts);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].promotion_id.as_str(), "p1");
    }

    #[test]
    fn test_empty_input_is_zero() {
        for policy in [StackingPolicy::Additive, StackingPolicy::ExclusivePerScope] {
            assert_eq!(policy.combine(&[], Currency::Twd).unwrap(), Money::twd(0));
        }
    }

    fn arb_discounts() -> impl Strategy<Value = Vec<PromotionDiscount>> {
        prop::collection::vec((0u8..4, 0i64..500), 0..8).prop_map(|entries| {
            entries
                .into_iter()
                .enumerate()
                .map(|(i, (scope, amount))| {
                    let scope = match scope {
                        0 => DiscountScope::WholeCart,
                        n => product(&format!("SKU-{n}")),
                    };
                    discount(&format!("promo-{i}"), scope, amount)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn totals_do_not_depend_on_order(discounts in arb_discounts()) {
            let mut reversed = discounts.clone();
            reversed.reverse();

            for policy in [StackingPolicy::Additive, StackingPolicy::ExclusivePerScope] {
                prop_assert_eq!(
                    policy.combine(&discounts, Currency::Twd).unwrap(),
                    policy.combine(&reversed, Currency::Twd).unwrap()
                );
            }
        }

        #[test]
        fn exclusive_never_exceeds_additive(discounts in arb_discounts()) {
            let additive = StackingPolicy::Additive.combine(&discounts, Currency::Twd).unwrap();
            let exclusive = StackingPolicy::ExclusivePerScope.combine(&discounts, Currency::Twd).unwrap();
            prop_assert!(exclusive.amount() <= additive.amount());
        }
    }
}
