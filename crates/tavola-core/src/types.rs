//! # Domain Types
//!
//! Catalog, order and quote types used by the pricing engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  INPUT (read-only)          INPUT (per request)     OUTPUT              │
//! │  ┌─────────────────┐        ┌─────────────────┐     ┌─────────────────┐ │
//! │  │    Product      │        │   OrderLine     │     │   OrderTotal    │ │
//! │  │  ─────────────  │        │  ─────────────  │     │  ─────────────  │ │
//! │  │  id, sku, name  │◄───────│  product_id     │     │  total          │ │
//! │  │  price          │        │  quantity       │     │  items_total    │ │
//! │  │  promotion      │        │  selections     │     │  box_fee_total  │ │
//! │  │  options[]      │        └─────────────────┘     │  delivery_fee   │ │
//! │  │  disable_box_fee│                                │  breakdown[]    │ │
//! │  └─────────────────┘        ┌─────────────────┐     └─────────────────┘ │
//! │  ┌─────────────────┐        │  OrderRequest   │                         │
//! │  │RestaurantSetting│        │  items[]        │                         │
//! │  │  box_fee        │        │  delivery_fee   │                         │
//! │  │  active+primary │        │  total_amount   │                         │
//! │  └─────────────────┘        └─────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Catalog types deserialize from the document store's camelCase JSON and go
//! through the lenient parsers in [`crate::parse`], so a `Product` value never
//! holds a string where a number or flag belongs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Amount;
use crate::parse::{
    default_quantity, deserialize_amount, deserialize_flag, deserialize_key, deserialize_list,
    deserialize_optional_amount, deserialize_optional_key, deserialize_pricing_mode,
    deserialize_quantity, deserialize_selections, DEFAULT_QUANTITY,
};
use crate::validation::PriceCheck;

// =============================================================================
// Pricing Mode
// =============================================================================

/// How a selected option choice changes the running line price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingMode {
    /// The choice price replaces the running price ("Size: Large = 12.00").
    Override,
    /// The choice price is added to the running price ("Extra cheese +1.50").
    #[default]
    #[serde(other)]
    Add,
}

// =============================================================================
// Product Options
// =============================================================================

/// One selectable value of a product option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChoice {
    /// Code the order line selects this choice by. Empty never matches.
    #[serde(default, deserialize_with = "deserialize_key")]
    pub code: String,

    #[serde(default, deserialize_with = "deserialize_amount")]
    pub price: Amount,
}

/// A configurable option declared on a product (size, crust, extras...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOption {
    /// Selection key used in [`OrderLine::selections`]. Empty never matches.
    #[serde(default, deserialize_with = "deserialize_key")]
    pub name: String,

    #[serde(
        default,
        alias = "type",
        alias = "mode",
        deserialize_with = "deserialize_pricing_mode"
    )]
    pub pricing_mode: PricingMode,

    #[serde(default, deserialize_with = "deserialize_list")]
    pub choices: Vec<OptionChoice>,
}

impl ProductOption {
    /// Finds a choice by its code.
    pub fn choice(&self, code: &str) -> Option<&OptionChoice> {
        if code.is_empty() {
            return None;
        }
        self.choices.iter().find(|c| c.code == code)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product as the pricing engine sees it.
///
/// Owned by the catalog; the engine never writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier.
    #[serde(alias = "_id")]
    pub id: String,

    #[serde(default)]
    pub sku: String,

    #[serde(default)]
    pub name: String,

    /// Regular price. Unparseable values price at zero.
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub price: Amount,

    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_promotion: bool,

    /// Only used while `is_promotion` is set.
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub promotion_price: Option<Amount>,

    /// Product is exempt from the packaging fee.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub disable_box_fee: bool,

    /// Options in declared order; the order matters for pricing.
    #[serde(default, deserialize_with = "deserialize_list")]
    pub options: Vec<ProductOption>,
}

impl Product {
    /// Price before options and packaging fee.
    ///
    /// ## Rules
    /// - Promotion flag set AND promotion price present → promotion price
    /// - Otherwise → regular price
    pub fn base_price(&self) -> Amount {
        match (self.is_promotion, self.promotion_price) {
            (true, Some(promo)) => promo,
            _ => self.price,
        }
    }

    /// Packaging fee that applies to one unit of this product.
    #[inline]
    pub fn unit_box_fee(&self, box_fee: Amount) -> Amount {
        if self.disable_box_fee {
            Amount::zero()
        } else {
            box_fee
        }
    }
}

// =============================================================================
// Restaurant Settings
// =============================================================================

/// Restaurant configuration record.
///
/// Several may exist; only the one flagged both active and primary is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct RestaurantSettings {
    pub id: String,
    pub name: String,
    /// Per-unit packaging fee. `None` when never configured.
    pub box_fee: Option<Amount>,
    pub is_active: bool,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Order Line
// =============================================================================

/// One line of an incoming order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Referenced product. Lines without one are never priced.
    #[serde(
        default,
        alias = "id",
        alias = "foodId",
        deserialize_with = "deserialize_optional_key"
    )]
    pub product_id: Option<String>,

    /// Client-side SKU, only used to identify the line in logs.
    #[serde(default, deserialize_with = "deserialize_optional_key")]
    pub sku: Option<String>,

    #[serde(default = "default_quantity", deserialize_with = "deserialize_quantity")]
    pub quantity: u32,

    /// Option name → selected choice code.
    #[serde(default, alias = "options", deserialize_with = "deserialize_selections")]
    pub selections: BTreeMap<String, String>,
}

impl OrderLine {
    /// Creates a line for `quantity` units of a product.
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        OrderLine {
            product_id: Some(product_id.into()),
            sku: None,
            quantity,
            selections: BTreeMap::new(),
        }
    }

    /// Adds an option selection (builder style).
    pub fn with_selection(mut self, option: impl Into<String>, code: impl Into<String>) -> Self {
        self.selections.insert(option.into(), code.into());
        self
    }

    /// Quantity used for pricing; zero falls back to one.
    #[inline]
    pub fn effective_quantity(&self) -> u32 {
        if self.quantity == 0 {
            DEFAULT_QUANTITY
        } else {
            self.quantity
        }
    }

    /// Human-readable reference for log lines.
    pub fn label(&self) -> &str {
        self.product_id
            .as_deref()
            .or(self.sku.as_deref())
            .unwrap_or("<unidentified line>")
    }
}

// =============================================================================
// Order Total
// =============================================================================

/// Priced view of one resolved order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineBreakdown {
    pub product_id: String,
    pub sku: String,
    pub name: String,
    pub quantity: u32,
    /// Line total divided by quantity (includes the packaging fee).
    pub unit_price: Amount,
    pub line_total: Amount,
    /// Packaging fee share of `line_total`.
    pub box_fee: Amount,
}

/// Server-side total for an order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderTotal {
    /// `items_total + delivery_fee`.
    pub total: Amount,
    /// Sum of line totals (packaging fees included).
    pub items_total: Amount,
    /// Packaging fees alone, for display.
    pub box_fee_total: Amount,
    pub delivery_fee: Amount,
    pub breakdown: Vec<LineBreakdown>,
}

impl OrderTotal {
    /// Total of an order with nothing to price.
    pub fn empty() -> Self {
        OrderTotal::default()
    }
}

// =============================================================================
// Order Request / Quote
// =============================================================================

/// What the storefront submits when creating an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(default)]
    pub items: Vec<OrderLine>,

    #[serde(default, deserialize_with = "deserialize_amount")]
    pub delivery_fee: Amount,

    /// The total the client computed and displayed.
    #[serde(default, alias = "total", deserialize_with = "deserialize_amount")]
    pub total_amount: Amount,
}

/// Server total plus the outcome of comparing it with the client total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderQuote {
    pub order_total: OrderTotal,
    pub price_check: PriceCheck,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_from_loose_document() {
        let product: Product = serde_json::from_value(json!({
            "_id": "p-1",
            "sku": "PIZ-MARG",
            "name": "Margherita",
            "price": "9.00",
            "isPromotion": "true",
            "promotionPrice": 7.5,
            "disableBoxFee": 1,
            "options": [
                { "name": "size", "pricingMode": "override",
                  "choices": [{ "code": "L", "price": "12" }] }
            ]
        }))
        .unwrap();

        assert_eq!(product.id, "p-1");
        assert_eq!(product.price.value(), 9.0);
        assert!(product.is_promotion);
        assert!(product.disable_box_fee);
        assert_eq!(product.options[0].pricing_mode, PricingMode::Override);
        assert_eq!(product.options[0].choices[0].price.value(), 12.0);
    }

    #[test]
    fn test_product_defaults() {
        let product: Product = serde_json::from_value(json!({ "id": "p-2" })).unwrap();
        assert!(product.price.is_zero());
        assert!(!product.is_promotion);
        assert!(product.promotion_price.is_none());
        assert!(!product.disable_box_fee);
        assert!(product.options.is_empty());
    }

    #[test]
    fn test_unknown_pricing_mode_adds() {
        let option: ProductOption =
            serde_json::from_value(json!({ "name": "extra", "pricingMode": "multiply" })).unwrap();
        assert_eq!(option.pricing_mode, PricingMode::Add);
    }

    #[test]
    fn test_loose_options_are_tolerated() {
        let product: Product = serde_json::from_value(json!({ "id": "p", "options": null })).unwrap();
        assert!(product.options.is_empty());

        let product: Product = serde_json::from_value(json!({
            "id": "p",
            "options": [
                { "name": "size", "pricingMode": null, "choices": null },
                { "name": 3, "pricingMode": "Override",
                  "choices": [{ "code": 1, "price": "2" }, { "code": null, "price": 5 }, "junk"] },
                "not an option"
            ]
        }))
        .unwrap();

        assert_eq!(product.options.len(), 2);
        assert_eq!(product.options[0].pricing_mode, PricingMode::Add);
        assert!(product.options[0].choices.is_empty());

        let numbered = &product.options[1];
        assert_eq!(numbered.name, "3");
        assert_eq!(numbered.pricing_mode, PricingMode::Override);
        assert_eq!(numbered.choices.len(), 2);
        assert_eq!(numbered.choice("1").map(|c| c.price.value()), Some(2.0));
        assert!(numbered.choice("").is_none(), "null code never matches");
    }

    #[test]
    fn test_base_price_prefers_promotion() {
        let mut product: Product = serde_json::from_value(json!({ "id": "p", "price": 8 })).unwrap();
        assert_eq!(product.base_price().value(), 8.0);

        product.promotion_price = Some(Amount::new(5.0));
        assert_eq!(product.base_price().value(), 8.0, "flag not set yet");

        product.is_promotion = true;
        assert_eq!(product.base_price().value(), 5.0);

        product.promotion_price = None;
        assert_eq!(product.base_price().value(), 8.0, "flag without promotion price");
    }

    #[test]
    fn test_order_line_defaults() {
        let line: OrderLine = serde_json::from_value(json!({ "productId": "p-1" })).unwrap();
        assert_eq!(line.quantity, 1);
        assert!(line.selections.is_empty());

        let line: OrderLine = serde_json::from_value(json!({ "sku": "X", "quantity": "abc" })).unwrap();
        assert_eq!(line.quantity, 1);
        assert_eq!(line.label(), "X");
    }

    #[test]
    fn test_effective_quantity() {
        let line = OrderLine::new("p", 0);
        assert_eq!(line.effective_quantity(), 1);
        assert_eq!(OrderLine::new("p", 3).effective_quantity(), 3);
    }

    #[test]
    fn test_order_request_parsing() {
        let request: OrderRequest = serde_json::from_value(json!({
            "items": [{ "productId": "a", "quantity": 2, "selections": { "size": "L" } }],
            "deliveryFee": "2.0",
            "totalAmount": 23.9
        }))
        .unwrap();

        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].selections.get("size").map(String::as_str), Some("L"));
        assert_eq!(request.delivery_fee.value(), 2.0);
        assert_eq!(request.total_amount.value(), 23.9);
    }

    #[test]
    fn test_order_request_with_loose_selections() {
        let request: OrderRequest = serde_json::from_value(json!({
            "items": [
                { "productId": "A", "selections": { "size": null, "n": 2, "crust": "thin" } },
                { "productId": 42, "selections": null },
                { "productId": "C", "selections": ["size", "L"] }
            ]
        }))
        .unwrap();

        let first = &request.items[0];
        assert_eq!(first.selections.len(), 2);
        assert_eq!(first.selections["n"], "2");
        assert_eq!(first.selections["crust"], "thin");
        assert!(!first.selections.contains_key("size"));

        assert_eq!(request.items[1].product_id.as_deref(), Some("42"));
        assert!(request.items[1].selections.is_empty());
        assert!(request.items[2].selections.is_empty());
    }
}
