//! # Item Pricer
//!
//! Prices a single order line against its product record.
//!
//! ## Line Price Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       price_line(line, product, box_fee)                │
//! │                                                                         │
//! │  product.base_price()          promotion price if promoted, else price │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  apply_options(...)            left fold over declared options:        │
//! │       │                          override → running = choice.price     │
//! │       │                          add      → running += choice.price    │
//! │       ▼                                                                 │
//! │  + product.unit_box_fee(fee)   0 when the product opts out             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  × line.effective_quantity()   missing/invalid quantity → 1            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  line total                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here fails. A missing product prices at zero (and is logged).

use std::collections::BTreeMap;

use tracing::error;

use crate::money::Amount;
use crate::types::{OrderLine, PricingMode, Product, ProductOption};

/// Applies one selected choice to the running price.
///
/// ## Example
/// ```rust
/// use tavola_core::money::Amount;
/// use tavola_core::pricing::apply_choice;
/// use tavola_core::types::PricingMode;
///
/// let running = Amount::new(9.0);
/// assert_eq!(apply_choice(running, Amount::new(12.0), PricingMode::Override).value(), 12.0);
/// assert_eq!(apply_choice(running, Amount::new(1.5), PricingMode::Add).value(), 10.5);
/// ```
#[inline]
pub fn apply_choice(running: Amount, choice_price: Amount, mode: PricingMode) -> Amount {
    match mode {
        PricingMode::Override => choice_price,
        PricingMode::Add => running + choice_price,
    }
}

/// Folds the selected option choices over a starting price.
///
/// Options are visited in declared order. An option without a selection, or
/// whose selected code matches no choice, leaves the price unchanged. So
/// does an option with no usable name.
pub fn apply_options(
    start: Amount,
    options: &[ProductOption],
    selections: &BTreeMap<String, String>,
) -> Amount {
    if options.is_empty() || selections.is_empty() {
        return start;
    }

    options.iter().fold(start, |running, option| {
        if option.name.is_empty() {
            return running;
        }

        let choice = selections
            .get(&option.name)
            .and_then(|code| option.choice(code));

        match choice {
            Some(choice) => apply_choice(running, choice.price, option.pricing_mode),
            None => running,
        }
    })
}

/// Unit price of a line before the packaging fee.
pub fn configured_price(line: &OrderLine, product: &Product) -> Amount {
    apply_options(product.base_price(), &product.options, &line.selections)
}

/// Computes the extended price of one order line.
///
/// ## Arguments
/// * `line` - The order line
/// * `product` - Its resolved product, `None` if the catalog has no match
/// * `box_fee` - Current per-unit packaging fee
///
/// ## Returns
/// `(configured price + packaging fee) × quantity`, or zero when the product
/// is missing.
pub fn price_line(line: &OrderLine, product: Option<&Product>, box_fee: Amount) -> Amount {
    let Some(product) = product else {
        error!(line = %line.label(), "No product for order line, pricing it at zero");
        return Amount::zero();
    };

    let unit_price = configured_price(line, product) + product.unit_box_fee(box_fee);
    unit_price.multiply_quantity(line.effective_quantity())
}

/// Packaging fee contribution of one line: `box_fee × quantity`, or zero
/// when the product opts out.
pub fn line_box_fee(line: &OrderLine, product: &Product, box_fee: Amount) -> Amount {
    product
        .unit_box_fee(box_fee)
        .multiply_quantity(line.effective_quantity())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OptionChoice;

    fn amt(v: f64) -> Amount {
        Amount::new(v)
    }

    fn approx(actual: Amount, expected: f64) {
        assert!(
            (actual.value() - expected).abs() < 1e-9,
            "expected {expected}, got {}",
            actual.value()
        );
    }

    fn product(price: f64) -> Product {
        Product {
            id: "p-1".to_string(),
            sku: "PIZ-MARG".to_string(),
            name: "Margherita".to_string(),
            price: amt(price),
            is_promotion: false,
            promotion_price: None,
            disable_box_fee: false,
            options: Vec::new(),
        }
    }

    fn option(name: &str, mode: PricingMode, choices: &[(&str, f64)]) -> ProductOption {
        ProductOption {
            name: name.to_string(),
            pricing_mode: mode,
            choices: choices
                .iter()
                .map(|(code, price)| OptionChoice {
                    code: code.to_string(),
                    price: amt(*price),
                })
                .collect(),
        }
    }

    #[test]
    fn test_plain_line() {
        let line = OrderLine::new("p-1", 2);
        approx(price_line(&line, Some(&product(8.5)), amt(0.3)), 17.6);
    }

    #[test]
    fn test_missing_product_prices_zero() {
        let line = OrderLine::new("ghost", 4);
        assert!(price_line(&line, None, amt(0.3)).is_zero());
    }

    #[test]
    fn test_promotion_replaces_price() {
        let mut p = product(10.0);
        p.is_promotion = true;
        p.promotion_price = Some(amt(4.0));

        approx(price_line(&OrderLine::new("p-1", 1), Some(&p), amt(0.3)), 4.3);
    }

    #[test]
    fn test_override_then_add() {
        let mut p = product(9.0);
        p.options = vec![
            option("size", PricingMode::Override, &[("M", 11.0), ("L", 13.0)]),
            option("extra", PricingMode::Add, &[("cheese", 1.5)]),
        ];

        let line = OrderLine::new("p-1", 1)
            .with_selection("size", "L")
            .with_selection("extra", "cheese");
        approx(configured_price(&line, &p), 14.5);
    }

    #[test]
    fn test_last_override_wins() {
        let mut p = product(9.0);
        p.options = vec![
            option("extra", PricingMode::Add, &[("cheese", 1.5)]),
            option("size", PricingMode::Override, &[("L", 13.0)]),
        ];

        let line = OrderLine::new("p-1", 1)
            .with_selection("size", "L")
            .with_selection("extra", "cheese");
        approx(configured_price(&line, &p), 13.0);
    }

    #[test]
    fn test_add_accumulates_over_promotion() {
        let mut p = product(9.0);
        p.is_promotion = true;
        p.promotion_price = Some(amt(7.0));
        p.options = vec![option("extra", PricingMode::Add, &[("ham", 2.0)])];

        let line = OrderLine::new("p-1", 1).with_selection("extra", "ham");
        approx(configured_price(&line, &p), 9.0);
    }

    #[test]
    fn test_unmatched_selections_are_skipped() {
        let mut p = product(9.0);
        p.options = vec![option("size", PricingMode::Override, &[("L", 13.0)])];

        let unknown_code = OrderLine::new("p-1", 1).with_selection("size", "XXL");
        approx(configured_price(&unknown_code, &p), 9.0);

        let unknown_option = OrderLine::new("p-1", 1).with_selection("crust", "thin");
        approx(configured_price(&unknown_option, &p), 9.0);
    }

    #[test]
    fn test_blank_names_and_codes_never_match() {
        let mut p = product(9.0);
        p.options = vec![
            option("", PricingMode::Override, &[("L", 13.0)]),
            option("extra", PricingMode::Add, &[("", 2.0)]),
        ];

        let line = OrderLine::new("p-1", 1)
            .with_selection("", "L")
            .with_selection("extra", "");
        approx(configured_price(&line, &p), 9.0);
    }

    #[test]
    fn test_opt_out_skips_box_fee() {
        let mut p = product(3.0);
        p.disable_box_fee = true;

        let line = OrderLine::new("p-1", 3);
        approx(price_line(&line, Some(&p), amt(0.5)), 9.0);
        assert!(line_box_fee(&line, &p, amt(0.5)).is_zero());
    }

    #[test]
    fn test_line_box_fee_per_unit() {
        let line = OrderLine::new("p-1", 3);
        approx(line_box_fee(&line, &product(3.0), amt(0.5)), 1.5);
    }

    #[test]
    fn test_zero_quantity_counts_as_one() {
        let line = OrderLine::new("p-1", 0);
        approx(price_line(&line, Some(&product(5.0)), amt(0.0)), 5.0);
    }
}
