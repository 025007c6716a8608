//! Extracted product records.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validate::{require_len, require_non_empty, require_range, Validate};

/// One product specification as a name/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpec {
    /// Specification name, e.g. "capacity".
    pub name: String,

    /// Specification value, e.g. "7 kg".
    pub value: String,
}

/// A product record extracted from a single listing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedProduct {
    /// The search-result page this record was extracted from.
    pub page_url: String,

    /// Product title.
    pub title: String,

    /// Product image URL.
    pub image_url: String,

    /// Canonical product URL.
    pub product_url: String,

    /// Current price of the product.
    pub current_price: f64,

    /// Price before discount, when the listing shows one.
    #[serde(default)]
    pub original_price: Option<f64>,

    /// Discount percentage, when the listing shows one.
    #[serde(default)]
    pub discount_percentage: Option<f64>,

    /// Most important specifications to compare, between one and five.
    pub specs: Vec<ProductSpec>,

    /// Recommendation rank out of 5, higher is better.
    pub recommendation_rank: u32,

    /// Why the capability does or does not recommend this product.
    pub recommendation_notes: Vec<String>,
}

impl ExtractedProduct {
    /// JSON schema handed to the extraction capability as the structured
    /// output target.
    pub fn json_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "page_url": { "type": "string", "description": "The original url of the product page" },
                "title": { "type": "string", "description": "The title of the product" },
                "image_url": { "type": "string", "description": "The url of the product image" },
                "product_url": { "type": "string", "description": "The canonical url of the product" },
                "current_price": { "type": "number", "description": "The current price of the product" },
                "original_price": {
                    "type": ["number", "null"],
                    "description": "The price before discount, null when there is no discount",
                },
                "discount_percentage": {
                    "type": ["number", "null"],
                    "description": "The discount percentage, null when there is no discount",
                },
                "specs": {
                    "type": "array",
                    "minItems": 1,
                    "maxItems": 5,
                    "description": "The most important specifications to compare",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "value": { "type": "string" },
                        },
                        "required": ["name", "value"],
                    },
                },
                "recommendation_rank": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 5,
                    "description": "Rank out of 5, higher is better",
                },
                "recommendation_notes": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Why to recommend or not recommend this product compared to the others",
                },
            },
            "required": [
                "page_url", "title", "image_url", "product_url", "current_price",
                "specs", "recommendation_rank", "recommendation_notes",
            ],
            "additionalProperties": false,
        })
    }
}

impl Validate for ExtractedProduct {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("page_url", &self.page_url)?;
        require_non_empty("title", &self.title)?;
        require_non_empty("product_url", &self.product_url)?;
        if self.current_price <= 0.0 {
            return Err(ValidationError::new("current_price", "must be positive"));
        }
        require_len("specs", self.specs.len(), 1, 5)?;
        require_range("recommendation_rank", self.recommendation_rank, 1, 5)?;
        Ok(())
    }
}

/// Positional set of extracted products, bounded to the requested top-N
/// count. `None` is the fallback record for a URL whose extraction failed;
/// positions are preserved so results stay traceable to their candidates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedProductSet {
    /// One entry per candidate URL, in candidate order.
    pub products: Vec<Option<ExtractedProduct>>,
}

impl ExtractedProductSet {
    /// Create a product set.
    pub fn new(products: Vec<Option<ExtractedProduct>>) -> Self {
        Self { products }
    }

    /// Records that extracted successfully, in candidate order.
    pub fn extracted(&self) -> impl Iterator<Item = &ExtractedProduct> {
        self.products.iter().flatten()
    }

    /// Number of successfully extracted records.
    pub fn extracted_count(&self) -> usize {
        self.extracted().count()
    }

    /// Total entries, fallbacks included.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the set has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Schema-check non-null entries. A failing record is demoted to the
    /// fallback entry so positions stay traceable; fallbacks pass through
    /// unchanged.
    pub fn into_validated(self) -> Self {
        let products = self
            .products
            .into_iter()
            .map(|entry| match entry {
                Some(product) => match product.validate() {
                    Ok(()) => Some(product),
                    Err(e) => {
                        tracing::warn!(
                            page_url = %product.page_url,
                            error = %e,
                            "dropping extracted product that failed validation"
                        );
                        None
                    }
                },
                None => None,
            })
            .collect();
        Self { products }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(rank: u32, spec_count: usize) -> ExtractedProduct {
        ExtractedProduct {
            page_url: "https://www.noon.com/p/1".to_string(),
            title: "Front load washing machine".to_string(),
            image_url: "https://cdn.noon.com/p/1.jpg".to_string(),
            product_url: "https://www.noon.com/p/1".to_string(),
            current_price: 1299.0,
            original_price: Some(1499.0),
            discount_percentage: Some(13.3),
            specs: (0..spec_count)
                .map(|i| ProductSpec {
                    name: format!("spec {i}"),
                    value: "value".to_string(),
                })
                .collect(),
            recommendation_rank: rank,
            recommendation_notes: vec!["good value".to_string()],
        }
    }

    #[test]
    fn rank_must_stay_within_one_to_five() {
        assert!(product(1, 2).validate().is_ok());
        assert!(product(5, 2).validate().is_ok());
        assert_eq!(
            product(0, 2).validate().unwrap_err().field,
            "recommendation_rank"
        );
        assert_eq!(
            product(6, 2).validate().unwrap_err().field,
            "recommendation_rank"
        );
    }

    #[test]
    fn specs_must_stay_within_one_to_five() {
        assert_eq!(product(3, 0).validate().unwrap_err().field, "specs");
        assert_eq!(product(3, 6).validate().unwrap_err().field, "specs");
        assert!(product(3, 5).validate().is_ok());
    }

    #[test]
    fn invalid_record_is_demoted_to_fallback_in_place() {
        let set = ExtractedProductSet::new(vec![
            Some(product(3, 2)),
            Some(product(9, 2)),
            None,
        ])
        .into_validated();

        assert_eq!(set.len(), 3);
        assert_eq!(set.extracted_count(), 1);
        assert!(set.products[0].is_some());
        assert!(set.products[1].is_none());
        assert!(set.products[2].is_none());
    }

    #[test]
    fn fallback_entries_serialize_as_null() {
        let set = ExtractedProductSet::new(vec![None, Some(product(4, 1))]);
        let json = serde_json::to_string(&set).unwrap();
        assert!(json.contains("null"));

        let back: ExtractedProductSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.extracted_count(), 1);
    }
}
