//! Explicit lifecycle for one product-finder session.
//!
//! `Uninitialized -> Loading -> Ready` is the happy path; `Loading -> Failed`
//! records a catalog that could not be fetched or indexed. `Ready` and
//! `Failed` are terminal. Query state may be edited in any phase, but the
//! filter only produces results once `Ready`.

use std::fmt;

use thiserror::Error;

use crate::catalog::{self, CatalogLoader, LoadError};
use crate::model::types::Product;
use crate::search::filter::{
    self, IndexUnavailable, PriceInputError, QueryState, parse_price_input,
};
use crate::search::index::SearchIndex;
use crate::search::tantivy::{FieldBoosts, TantivySearchIndex};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot {action} while {phase}")]
pub struct TransitionError {
    pub action: &'static str,
    pub phase: &'static str,
}

pub enum Phase {
    Uninitialized,
    Loading,
    Ready {
        catalog: Vec<Product>,
        index: Box<dyn SearchIndex + Send + Sync>,
    },
    Failed {
        reason: String,
    },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready { .. } => "ready",
            Self::Failed { .. } => "failed",
        }
    }
}

impl fmt::Debug for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready { catalog, .. } => f
                .debug_struct("Ready")
                .field("products", &catalog.len())
                .finish_non_exhaustive(),
            Self::Failed { reason } => f.debug_struct("Failed").field("reason", reason).finish(),
            other => f.write_str(other.name()),
        }
    }
}

/// Owned state of one session: lifecycle phase plus the user's filter inputs.
#[derive(Debug)]
pub struct ProductFinder {
    phase: Phase,
    query: QueryState,
}

impl Default for ProductFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductFinder {
    pub fn new() -> Self {
        Self {
            phase: Phase::Uninitialized,
            query: QueryState::default(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Uninitialized | Phase::Loading)
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    /// The loaded catalog, once `Ready`.
    pub fn catalog(&self) -> Option<&[Product]> {
        match &self.phase {
            Phase::Ready { catalog, .. } => Some(catalog),
            _ => None,
        }
    }

    pub fn begin_loading(&mut self) -> Result<(), TransitionError> {
        self.expect_phase("begin loading", |p| matches!(p, Phase::Uninitialized))?;
        self.phase = Phase::Loading;
        Ok(())
    }

    pub fn finish_loading(
        &mut self,
        catalog: Vec<Product>,
        index: Box<dyn SearchIndex + Send + Sync>,
    ) -> Result<(), TransitionError> {
        self.expect_phase("finish loading", |p| matches!(p, Phase::Loading))?;
        tracing::info!(products = catalog.len(), "finder ready");
        self.phase = Phase::Ready { catalog, index };
        Ok(())
    }

    pub fn fail_loading(&mut self, reason: impl Into<String>) -> Result<(), TransitionError> {
        self.expect_phase("fail loading", |p| matches!(p, Phase::Loading))?;
        let reason = reason.into();
        tracing::error!("error fetching products: {reason}");
        self.phase = Phase::Failed { reason };
        Ok(())
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query.text = text.into();
    }

    /// Apply the raw price control contents. On error the previous bound stays.
    pub fn set_price_input(&mut self, raw: &str) -> Result<(), PriceInputError> {
        match parse_price_input(raw) {
            Ok(bound) => {
                self.query.max_price = bound;
                Ok(())
            }
            Err(err) => {
                tracing::warn!("rejected price input: {err}");
                Err(err)
            }
        }
    }

    pub fn clear_price(&mut self) {
        self.query.max_price = None;
    }

    pub fn has_active_filter(&self) -> bool {
        !self.query.is_unfiltered()
    }

    /// Recompute the visible set from scratch.
    pub fn visible(&self) -> Result<Vec<&Product>, IndexUnavailable> {
        match &self.phase {
            Phase::Ready { catalog, index } => {
                filter::filter_products(catalog, Some(&**index), &self.query)
            }
            _ => Err(IndexUnavailable),
        }
    }

    fn expect_phase(
        &self,
        action: &'static str,
        allowed: impl Fn(&Phase) -> bool,
    ) -> Result<(), TransitionError> {
        if allowed(&self.phase) {
            Ok(())
        } else {
            Err(TransitionError {
                action,
                phase: self.phase.name(),
            })
        }
    }
}

/// Options for [`load_catalog`].
#[derive(Debug, Clone)]
pub struct LoadSettings {
    pub products_field: String,
    pub boosts: FieldBoosts,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            products_field: catalog::DEFAULT_PRODUCTS_FIELD.to_string(),
            boosts: FieldBoosts::default(),
        }
    }
}

/// Result of [`load_catalog`], handed from the loader task to the UI.
pub type LoadOutcome = Result<(Vec<Product>, TantivySearchIndex), LoadError>;

/// Fetch the catalog and build its index in one step.
pub async fn load_catalog<L: CatalogLoader>(loader: &L, settings: &LoadSettings) -> LoadOutcome {
    let products = catalog::load_products(loader, &settings.products_field).await?;
    let index = TantivySearchIndex::build(&products, settings.boosts)?;
    Ok((products, index))
}
