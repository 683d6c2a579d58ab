//! Filter engine: free-text query plus optional price ceiling over the catalog.

use std::collections::HashMap;

use itertools::Itertools;
use thiserror::Error;

use super::index::SearchIndex;
use crate::model::types::{Product, ProductId};

/// The filter was requested before the search index exists.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("search index is not available yet")]
pub struct IndexUnavailable;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceInputError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("'{0}' is not a finite price")]
    NotFinite(String),

    #[error("price bound cannot be negative ({0})")]
    Negative(String),
}

/// User-controlled filter inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    pub text: String,
    pub max_price: Option<f64>,
}

impl QueryState {
    pub fn new(text: impl Into<String>, max_price: Option<f64>) -> Self {
        Self {
            text: text.into(),
            max_price,
        }
    }

    /// Whitespace-only text counts as no query.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn is_unfiltered(&self) -> bool {
        !self.has_text() && self.max_price.is_none()
    }
}

/// Parse the raw contents of the price control.
///
/// Empty input clears the bound. Anything else must be a finite, non-negative
/// number; NaN and infinities are rejected rather than turned into a bound.
pub fn parse_price_input(raw: &str) -> Result<Option<f64>, PriceInputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| PriceInputError::NotANumber(trimmed.to_string()))?;
    if !value.is_finite() {
        return Err(PriceInputError::NotFinite(trimmed.to_string()));
    }
    if value < 0.0 {
        return Err(PriceInputError::Negative(trimmed.to_string()));
    }
    Ok(Some(value))
}

/// Compute the visible subset of `catalog` for `state`.
///
/// With no query text and no price bound the whole catalog comes back in
/// catalog order without touching the index. Otherwise the index is required;
/// query hits keep their ranked order, a bare price bound keeps catalog order.
pub fn filter_products<'a>(
    catalog: &'a [Product],
    index: Option<&dyn SearchIndex>,
    state: &QueryState,
) -> Result<Vec<&'a Product>, IndexUnavailable> {
    if state.is_unfiltered() {
        return Ok(catalog.iter().collect());
    }
    let index = index.ok_or(IndexUnavailable)?;

    let text = state.text.trim();
    let candidates = if text.is_empty() {
        catalog.iter().collect()
    } else {
        ranked_candidates(catalog, index, text)
    };

    let visible: Vec<&Product> = candidates
        .into_iter()
        .filter(|product| product.within_price(state.max_price))
        .collect();

    tracing::debug!(
        query = text,
        max_price = ?state.max_price,
        visible = visible.len(),
        "filter applied"
    );
    Ok(visible)
}

fn ranked_candidates<'a>(
    catalog: &'a [Product],
    index: &dyn SearchIndex,
    text: &str,
) -> Vec<&'a Product> {
    let hits = match index.search(text) {
        Ok(hits) => hits,
        Err(err) => {
            tracing::warn!(query = text, "search failed, showing no hits: {err}");
            return Vec::new();
        }
    };

    let by_id: HashMap<&ProductId, &Product> = catalog.iter().map(|p| (&p.id, p)).collect();
    hits.iter()
        .unique()
        .filter_map(|id| {
            let product = by_id.get(id).copied();
            if product.is_none() {
                tracing::debug!(%id, "search hit has no catalog entry");
            }
            product
        })
        .collect()
}
