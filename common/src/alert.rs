use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::ProductType;
use crate::decay::{compute_shelf_life, FreshnessTier};
use crate::product::{Product, ProductId};

/// A product that needs attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub product_id: ProductId,
    pub product_name: String,
    pub product_type: ProductType,
    pub status: FreshnessTier,
    pub shelf_life_percentage: f64,
    pub message: String,
}

/// Evaluate every product as of `now` and keep those in the warning or expired
/// tier, in input order. Products with no observed condition are skipped.
pub fn scan_alerts<'a, I>(products: I, now: DateTime<Utc>) -> Vec<Alert>
where
    I: IntoIterator<Item = &'a Product>,
{
    products
        .into_iter()
        .filter_map(|product| {
            let conditions = product.conditions()?;
            let estimate =
                compute_shelf_life(product.product_type, product.added_date, now, conditions);
            if !estimate.status.needs_attention() {
                return None;
            }
            Some(Alert {
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                product_type: product.product_type,
                status: estimate.status,
                shelf_life_percentage: estimate.percentage,
                message: format!("{} is {}!", product.name, estimate.status),
            })
        })
        .collect()
}
