use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Stable product identifier.
///
/// Catalog endpoints emit ids as JSON numbers or strings; both collapse into
/// the same string form so `1` and `"1"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for ProductId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(serde_json::Number),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

/// One catalog entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub thumbnail: String,
}

impl Product {
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        description: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            price,
            thumbnail: String::new(),
        }
    }

    /// Whether this product passes an optional maximum-price bound.
    pub fn within_price(&self, max_price: Option<f64>) -> bool {
        max_price.is_none_or(|bound| self.price <= bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_compare_equal() {
        let numeric: ProductId = serde_json::from_str("7").unwrap();
        let text: ProductId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(numeric, text);
        assert_eq!(numeric, ProductId::from(7u64));
        assert_eq!(numeric.as_str(), "7");
    }

    #[test]
    fn product_ignores_unknown_fields() {
        let json = r#"{
            "id": 1,
            "title": "Essence Mascara",
            "description": "Lash princess",
            "price": 9.99,
            "thumbnail": "https://cdn.example/1.png",
            "rating": 4.94,
            "tags": ["beauty"]
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "1");
        assert_eq!(product.title, "Essence Mascara");
        assert_eq!(product.thumbnail, "https://cdn.example/1.png");
    }

    #[test]
    fn missing_description_defaults_to_empty() {
        let product: Product =
            serde_json::from_str(r#"{"id":"a","title":"Bare","price":1}"#).unwrap();
        assert!(product.description.is_empty());
        assert!(product.thumbnail.is_empty());
    }

    #[test]
    fn within_price_is_inclusive() {
        let product = Product::new(1u64, "Phone", "", 500.0);
        assert!(product.within_price(None));
        assert!(product.within_price(Some(500.0)));
        assert!(!product.within_price(Some(499.99)));
    }
}
