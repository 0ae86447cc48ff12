//! Quote calculator — pure mapping from collected answers to a premium.
//!
//! No I/O and no randomness: structurally identical form data always
//! produces the same premium, which is what lets the results view recompute
//! freely while the submission dispatcher stays a best-effort side effect.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::wizard::form::{AnswerValue, FormData};

/// A computed premium estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    /// Estimated monthly premium.
    pub monthly_premium: Decimal,
    /// Estimated annual premium (12 months, no discount).
    pub annual_premium: Decimal,
    pub currency: &'static str,
}

/// Compute a quote from the full form snapshot.
///
/// Unknown or missing keys fall back to the most conservative defaults so a
/// partially filled form still yields a displayable number.
pub fn calculate_quote(form: &FormData) -> Quote {
    let product = text(form, "insurance-type").unwrap_or("life");

    let base = match product {
        "auto" => dec!(58.00),
        "home" => dec!(42.00),
        "solar" => dec!(74.00),
        _ => dec!(24.00), // life
    };

    let coverage_amount = number(form, "coverage-amount").unwrap_or_else(|| match product {
        "auto" => dec!(20_000),
        "home" => dec!(250_000),
        "solar" => dec!(15_000),
        _ => dec!(250_000),
    });

    // Per-product amount loading, per 10k units of coverage.
    let per_ten_k = match product {
        "auto" => dec!(4.20),
        "home" => dec!(0.55),
        "solar" => dec!(9.80),
        _ => dec!(0.40),
    };
    let amount_loading = coverage_amount / dec!(10_000) * per_ten_k;

    let level_multiplier = match text(form, "coverage-level").unwrap_or("standard") {
        "basic" => dec!(0.85),
        "comprehensive" => dec!(1.60),
        _ => dec!(1.00), // standard
    };

    let risk_multiplier = risk_multiplier(form, product);

    // Multi-select extras add a flat amount each.
    let extras = form
        .get_answer("extras")
        .and_then(AnswerValue::as_multi)
        .map(|values| dec!(6.50) * Decimal::from(values.len() as u32))
        .unwrap_or(Decimal::ZERO);

    let monthly = ((base + amount_loading) * level_multiplier * risk_multiplier + extras)
        .round_dp(2);

    Quote {
        monthly_premium: monthly,
        annual_premium: (monthly * dec!(12)).round_dp(2),
        currency: "USD",
    }
}

fn risk_multiplier(form: &FormData, product: &str) -> Decimal {
    match product {
        "life" => {
            let age = match text(form, "age-band").unwrap_or("35-44") {
                "18-24" => dec!(0.80),
                "25-34" => dec!(0.90),
                "35-44" => dec!(1.00),
                "45-54" => dec!(1.35),
                "55-64" => dec!(1.90),
                _ => dec!(2.60),
            };
            let smoker = match text(form, "smoker") {
                Some("yes") => dec!(1.50),
                _ => dec!(1.00),
            };
            age * smoker
        }
        "auto" => match text(form, "vehicle-use").unwrap_or("personal") {
            "commercial" => dec!(1.45),
            "rideshare" => dec!(1.70),
            _ => dec!(1.00),
        },
        "home" => match text(form, "property-type").unwrap_or("house") {
            "apartment" => dec!(0.80),
            "townhouse" => dec!(0.90),
            _ => dec!(1.00),
        },
        "solar" => match text(form, "roof-direction").unwrap_or("south") {
            "north" => dec!(1.25),
            "east" | "west" => dec!(1.10),
            _ => dec!(1.00),
        },
        _ => dec!(1.00),
    }
}

fn text<'f>(form: &'f FormData, key: &str) -> Option<&'f str> {
    form.get_answer(key).and_then(AnswerValue::as_text)
}

fn number(form: &FormData, key: &str) -> Option<Decimal> {
    form.get_answer(key)
        .and_then(AnswerValue::as_number)
        .and_then(Decimal::from_f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn life_form() -> FormData {
        let mut form = FormData::new();
        form.set_answer("insurance-type", AnswerValue::from("life"));
        form.set_answer("coverage-level", AnswerValue::from("comprehensive"));
        form.set_answer("coverage-amount", AnswerValue::from(500_000.0));
        form.set_answer("age-band", AnswerValue::from("25-34"));
        form.set_answer("smoker", AnswerValue::from("no"));
        form
    }

    #[test]
    fn identical_forms_give_identical_quotes() {
        let form = life_form();
        let first = calculate_quote(&form);
        for _ in 0..10 {
            assert_eq!(calculate_quote(&form), first);
        }
        // Structurally identical, separately built form.
        assert_eq!(calculate_quote(&life_form()), first);
    }

    #[test]
    fn life_comprehensive_example() {
        // (24 + 500000/10000 * 0.40) * 1.60 * 0.90 = 63.36
        let quote = calculate_quote(&life_form());
        assert_eq!(quote.monthly_premium, dec!(63.36));
        assert_eq!(quote.annual_premium, dec!(760.32));
        assert_eq!(quote.currency, "USD");
    }

    #[test]
    fn smoker_pays_more() {
        let base = calculate_quote(&life_form());
        let mut form = life_form();
        form.set_answer("smoker", AnswerValue::from("yes"));
        let smoker = calculate_quote(&form);
        assert!(smoker.monthly_premium > base.monthly_premium);
    }

    #[test]
    fn coverage_level_orders_premiums() {
        let mut basic = life_form();
        basic.set_answer("coverage-level", AnswerValue::from("basic"));
        let mut standard = life_form();
        standard.set_answer("coverage-level", AnswerValue::from("standard"));
        let comprehensive = life_form();

        let b = calculate_quote(&basic).monthly_premium;
        let s = calculate_quote(&standard).monthly_premium;
        let c = calculate_quote(&comprehensive).monthly_premium;
        assert!(b < s && s < c);
    }

    #[test]
    fn extras_add_flat_amount() {
        let mut form = FormData::new();
        form.set_answer("insurance-type", AnswerValue::from("solar"));
        let without = calculate_quote(&form);

        form.set_answer(
            "extras",
            AnswerValue::Multi(vec!["battery".to_string(), "ev-charger".to_string()]),
        );
        let with = calculate_quote(&form);
        assert_eq!(with.monthly_premium, without.monthly_premium + dec!(13.00));
    }

    #[test]
    fn empty_form_still_quotes() {
        let quote = calculate_quote(&FormData::new());
        assert!(quote.monthly_premium > Decimal::ZERO);
    }
}
