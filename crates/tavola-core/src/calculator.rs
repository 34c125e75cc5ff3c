//! # Order Totalizer
//!
//! Computes the authoritative total of an order from catalog data and
//! checks it against what the client submitted.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     PriceCalculator::total_order                        │
//! │                                                                         │
//! │  lines[] ──► empty? ──yes──► OrderTotal::empty() (no lookups)          │
//! │                │                                                        │
//! │                no                                                       │
//! │                ▼                                                        │
//! │  ┌──────────────────────────┐   ┌──────────────────────────┐           │
//! │  │ SettingsSource           │   │ ProductLookup            │  joined   │
//! │  │ find_active_primary()    │   │ find_by_ids(distinct ids)│           │
//! │  │ errors → box fee 0       │   │ errors → abort           │           │
//! │  └────────────┬─────────────┘   └────────────┬─────────────┘           │
//! │               └──────────────┬───────────────┘                          │
//! │                              ▼                                          │
//! │  for each line: resolve product ─ missing? → log, skip                 │
//! │                              │                                          │
//! │                              ▼                                          │
//! │  price_line() + line_box_fee() → breakdown entry, running sums          │
//! │                              │                                          │
//! │                              ▼                                          │
//! │  total = items_total + delivery_fee                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Collaborators
//! Storage is reached through two traits so the engine carries no database
//! code. `tavola-db` implements both on its repositories; tests use
//! in-memory fakes and [`FixedBoxFee`].

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Amount;
use crate::pricing::{line_box_fee, price_line};
use crate::types::{
    LineBreakdown, OrderLine, OrderQuote, OrderRequest, OrderTotal, Product, RestaurantSettings,
};
use crate::validation::validate_price;

// =============================================================================
// Collaborator Traits
// =============================================================================

/// Bulk product lookup.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// Returns the products matching `ids`.
    ///
    /// Unknown ids are simply absent from the result.
    async fn find_by_ids(&self, ids: &[String]) -> CoreResult<Vec<Product>>;
}

/// Access to the authoritative restaurant settings record.
#[async_trait]
pub trait SettingsSource: Send + Sync {
    /// Returns the record flagged both active and primary, if any.
    async fn find_active_primary(&self) -> CoreResult<Option<RestaurantSettings>>;
}

/// Settings source with a fixed packaging fee.
///
/// ## Usage
/// ```rust
/// use tavola_core::calculator::FixedBoxFee;
/// use tavola_core::money::Amount;
///
/// let settings = FixedBoxFee(Amount::new(0.3));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedBoxFee(pub Amount);

#[async_trait]
impl SettingsSource for FixedBoxFee {
    async fn find_active_primary(&self) -> CoreResult<Option<RestaurantSettings>> {
        let now = Utc::now();
        Ok(Some(RestaurantSettings {
            id: "fixed".to_string(),
            name: "fixed".to_string(),
            box_fee: Some(self.0),
            is_active: true,
            is_primary: true,
            created_at: now,
            updated_at: now,
        }))
    }
}

// =============================================================================
// Price Calculator
// =============================================================================

/// The pricing engine.
///
/// Holds no state of its own; every call reads catalog and settings afresh,
/// so concurrent calls for different orders are independent.
#[derive(Debug, Clone)]
pub struct PriceCalculator<P, S> {
    products: P,
    settings: S,
}

impl<P, S> PriceCalculator<P, S>
where
    P: ProductLookup,
    S: SettingsSource,
{
    /// Creates a calculator over a product lookup and a settings source.
    pub fn new(products: P, settings: S) -> Self {
        PriceCalculator { products, settings }
    }

    /// Current per-unit packaging fee.
    ///
    /// Never fails: a missing record, a missing fee, or a settings error all
    /// yield zero so order processing is not blocked by settings.
    pub async fn get_box_fee(&self) -> Amount {
        match self.settings.find_active_primary().await {
            Ok(Some(RestaurantSettings {
                box_fee: Some(fee), ..
            })) => fee,
            Ok(Some(settings)) => {
                warn!(settings_id = %settings.id, "Primary settings have no box fee, using 0");
                Amount::zero()
            }
            Ok(None) => {
                warn!("No active primary restaurant settings, using box fee 0");
                Amount::zero()
            }
            Err(e) => {
                error!(error = %e, "Failed to load restaurant settings, using box fee 0");
                Amount::zero()
            }
        }
    }

    /// Computes the server-side total of an order.
    ///
    /// ## Arguments
    /// * `lines` - Order lines as submitted
    /// * `delivery_fee` - Delivery fee for the order
    ///
    /// ## Returns
    /// * `Ok(OrderTotal)` - Lines whose product was not found are left out
    /// * `Err(CoreError::LookupFailed)` - Catalog could not be read
    ///
    /// An empty `lines` returns an all-zero total without touching storage;
    /// the delivery fee is not charged on an empty order.
    pub async fn total_order(&self, lines: &[OrderLine], delivery_fee: Amount) -> CoreResult<OrderTotal> {
        if lines.is_empty() {
            debug!("Empty order, nothing to price");
            return Ok(OrderTotal::empty());
        }

        let ids = distinct_product_ids(lines);

        let lookup = async {
            if ids.is_empty() {
                Ok(Vec::new())
            } else {
                self.products.find_by_ids(&ids).await
            }
        };
        let (box_fee, products) = futures_util::join!(self.get_box_fee(), lookup);
        let products = products?;

        debug!(
            lines = lines.len(),
            requested = ids.len(),
            found = products.len(),
            box_fee = %box_fee,
            "Resolved order products"
        );

        let index: HashMap<&str, &Product> = products.iter().map(|p| (p.id.as_str(), p)).collect();

        let mut items_total = Amount::zero();
        let mut box_fee_total = Amount::zero();
        let mut breakdown = Vec::with_capacity(lines.len());

        for line in lines {
            let Some(product) = line.product_id.as_deref().and_then(|id| index.get(id).copied()) else {
                warn!(line = %line.label(), "Product not found, line excluded from total");
                continue;
            };

            let quantity = line.effective_quantity();
            let line_total = price_line(line, Some(product), box_fee);
            let line_fee = line_box_fee(line, product, box_fee);

            items_total += line_total;
            box_fee_total += line_fee;

            breakdown.push(LineBreakdown {
                product_id: product.id.clone(),
                sku: product.sku.clone(),
                name: product.name.clone(),
                quantity,
                unit_price: line_total.per_unit(quantity),
                line_total,
                box_fee: line_fee,
            });
        }

        Ok(OrderTotal {
            total: items_total + delivery_fee,
            items_total,
            box_fee_total,
            delivery_fee,
            breakdown,
        })
    }

    /// Prices an order request and compares it with the submitted total.
    ///
    /// A negative `tolerance` is rejected with `CoreError::Validation`
    /// before anything is read.
    pub async fn quote(&self, request: &OrderRequest, tolerance: Amount) -> CoreResult<OrderQuote> {
        if tolerance.is_negative() {
            return Err(ValidationError::Negative {
                field: "tolerance".to_string(),
            }
            .into());
        }

        let order_total = self
            .total_order(&request.items, request.delivery_fee)
            .await?;
        let price_check = validate_price(request.total_amount, order_total.total, tolerance);

        Ok(OrderQuote {
            order_total,
            price_check,
        })
    }

    /// Prices an order request and refuses it on a price mismatch.
    ///
    /// ## Returns
    /// * `Ok(OrderTotal)` - Totals agree within `tolerance`
    /// * `Err(CoreError::PriceMismatch)` - Submitted total is off
    /// * `Err(CoreError::LookupFailed)` - Catalog could not be read
    pub async fn confirm(&self, request: &OrderRequest, tolerance: Amount) -> CoreResult<OrderTotal> {
        let OrderQuote {
            order_total,
            price_check,
        } = self.quote(request, tolerance).await?;

        if !price_check.is_valid {
            warn!(
                client = %price_check.client_amount,
                server = %price_check.server_amount,
                difference = %price_check.difference,
                tolerance = %price_check.tolerance,
                "Order total mismatch, refusing order"
            );
            return Err(CoreError::PriceMismatch {
                client: price_check.client_amount,
                server: price_check.server_amount,
                difference: price_check.difference,
            });
        }

        info!(total = %order_total.total, lines = order_total.breakdown.len(), "Order price confirmed");
        Ok(order_total)
    }
}

/// Distinct product ids referenced by `lines`, in first-seen order.
fn distinct_product_ids(lines: &[OrderLine]) -> Vec<String> {
    let mut seen = HashSet::new();
    lines
        .iter()
        .filter_map(|line| line.product_id.as_deref())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
