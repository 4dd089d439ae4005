//! Payment reconciliation policy.

use rust_decimal::Decimal;
use serde::Serialize;

/// Outcome of reconciling a tendered amount against a total price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Settlement {
    /// Fully paid
    pub paid: bool,
    /// Amount recorded toward the total, always within `[0, total]`
    pub partial_paid: Decimal,
}

/// Parse a raw tendered/amount field.
///
/// Unparseable or negative input coerces to zero; valid input is rounded to
/// two decimal places.
pub fn parse_amount(raw: &str) -> Decimal {
    let amount = raw.trim().parse::<Decimal>().unwrap_or(Decimal::ZERO);
    if amount < Decimal::ZERO {
        Decimal::ZERO
    } else {
        amount.round_dp(2)
    }
}

/// Reconcile a tendered amount against a total price.
///
/// Precedence:
/// 1. a positive total covered in full marks the record paid, with
///    overpayment clamped to the total (neither refunded nor recorded);
/// 2. any other positive tender is a partial payment, clamped to the total;
/// 3. otherwise nothing is recorded.
///
/// A zero total can never become paid through this path; see
/// [`reconcile_with_override`] for the edit action's explicit flag.
pub fn reconcile(total_price: Decimal, tendered: Decimal) -> Settlement {
    if total_price > Decimal::ZERO && tendered >= total_price {
        Settlement {
            paid: true,
            partial_paid: total_price,
        }
    } else if tendered > Decimal::ZERO {
        Settlement {
            paid: false,
            partial_paid: tendered.min(total_price),
        }
    } else {
        Settlement {
            paid: false,
            partial_paid: Decimal::ZERO,
        }
    }
}

/// Edit-path reconciliation: like [`reconcile`], but an explicit
/// `mark_paid` flag can force the paid state regardless of the amounts.
pub fn reconcile_with_override(
    total_price: Decimal,
    tendered: Decimal,
    mark_paid: bool,
) -> Settlement {
    let partial_paid = tendered.clamp(Decimal::ZERO, total_price);
    Settlement {
        paid: mark_paid || (tendered >= total_price && total_price > Decimal::ZERO),
        partial_paid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("40"), dec("40"));
        assert_eq!(parse_amount(" 40.5 "), dec("40.50"));
        assert_eq!(parse_amount("40.999"), dec("41.00"));
        assert_eq!(parse_amount("-5"), Decimal::ZERO);
        assert_eq!(parse_amount("garbage"), Decimal::ZERO);
        assert_eq!(parse_amount(""), Decimal::ZERO);
    }

    #[test]
    fn test_overpayment_clamps() {
        let s = reconcile(dec("100"), dec("150"));
        assert!(s.paid);
        assert_eq!(s.partial_paid, dec("100"));
    }

    #[test]
    fn test_exact_payment() {
        let s = reconcile(dec("100"), dec("100"));
        assert!(s.paid);
        assert_eq!(s.partial_paid, dec("100"));
    }

    #[test]
    fn test_partial_payment() {
        let s = reconcile(dec("100"), dec("40"));
        assert!(!s.paid);
        assert_eq!(s.partial_paid, dec("40"));
    }

    #[test]
    fn test_nothing_tendered() {
        let s = reconcile(dec("0"), dec("0"));
        assert!(!s.paid);
        assert_eq!(s.partial_paid, Decimal::ZERO);
    }

    #[test]
    fn test_zero_total_never_pays_itself() {
        let s = reconcile(Decimal::ZERO, dec("50"));
        assert!(!s.paid);
        assert_eq!(s.partial_paid, Decimal::ZERO);
    }

    #[test]
    fn test_override_forces_paid() {
        let s = reconcile_with_override(dec("100"), dec("40"), true);
        assert!(s.paid);
        assert_eq!(s.partial_paid, dec("40"));
    }

    #[test]
    fn test_override_zero_total_stays_unpaid_without_flag() {
        let s = reconcile_with_override(Decimal::ZERO, Decimal::ZERO, false);
        assert!(!s.paid);

        let s = reconcile_with_override(Decimal::ZERO, Decimal::ZERO, true);
        assert!(s.paid);
    }

    proptest! {
        #[test]
        fn prop_partial_paid_stays_within_bounds(
            total_cents in 0i64..=10_000_000,
            tendered_cents in -1_000_000i64..=20_000_000,
        ) {
            let total = Decimal::new(total_cents, 2);
            let tendered = Decimal::new(tendered_cents, 2);

            let s = reconcile(total, tendered);
            prop_assert!(s.partial_paid >= Decimal::ZERO);
            prop_assert!(s.partial_paid <= total);

            // Pure function: same inputs, same outcome
            prop_assert_eq!(reconcile(total, tendered), s);

            if s.paid {
                prop_assert_eq!(s.partial_paid, total);
                prop_assert!(total > Decimal::ZERO);
            }
        }

        #[test]
        fn prop_override_respects_bounds(
            total_cents in 0i64..=10_000_000,
            tendered_cents in 0i64..=20_000_000,
            mark_paid in proptest::bool::ANY,
        ) {
            let total = Decimal::new(total_cents, 2);
            let tendered = Decimal::new(tendered_cents, 2);

            let s = reconcile_with_override(total, tendered, mark_paid);
            prop_assert!(s.partial_paid >= Decimal::ZERO);
            prop_assert!(s.partial_paid <= total);
            if mark_paid {
                prop_assert!(s.paid);
            }
        }
    }
}
