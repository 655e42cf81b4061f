//! Represents one catalog item as the remote API returns it.
//!
//! # Identity
//! The `id` is always assigned by the remote system. Locally created drafts
//! ([`ProductDraft`]) carry no id; the store only learns it from the create
//! response.
//!
//! See [`ProductPatch`] for the field-level update payload and [`ProductPage`]
//! for the collection envelope used by list and search responses.
use serde::{Deserialize, Serialize};

use std::fmt::Display;

/// Type-safe identifier for Products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "product_{}", self.0)
    }
}

/// Upper bound of the rating scale.
pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub brand: String,
    pub description: String,
    pub stock: u32,
    pub price: f64,
    pub rating: f64,
}

impl Product {
    /// Builds the server-side record for a draft once an id has been assigned.
    pub fn from_draft(id: ProductId, draft: ProductDraft) -> Self {
        Self {
            id,
            title: draft.title,
            brand: draft.brand,
            description: draft.description,
            stock: draft.stock,
            price: draft.price,
            rating: draft.rating,
        }
    }

    /// Checks the numeric invariants a confirmed product must hold.
    ///
    /// `stock` is unsigned, so only `price` and `rating` need checking.
    pub fn validate(&self) -> Result<(), String> {
        check_price(self.price)?;
        check_rating(self.rating)
    }

    /// Applies every field present in `patch`. Absent fields are untouched.
    pub fn apply(&mut self, patch: &ProductPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(brand) = &patch.brand {
            self.brand = brand.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
    }
}

pub(crate) fn check_price(price: f64) -> Result<(), String> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(format!("Invalid price: {}", price))
    }
}

pub(crate) fn check_rating(rating: f64) -> Result<(), String> {
    if rating.is_finite() && (0.0..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(format!("Invalid rating: {}", rating))
    }
}

/// DTO for Product creation. The server assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub title: String,
    pub brand: String,
    pub description: String,
    pub stock: u32,
    pub price: f64,
    pub rating: f64,
}

/// DTO for Product updates. Only the populated fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

impl ProductPatch {
    pub fn stock(stock: u32) -> Self {
        Self {
            stock: Some(stock),
            ..Self::default()
        }
    }

    pub fn price(price: f64) -> Self {
        Self {
            price: Some(price),
            ..Self::default()
        }
    }

    /// Full-record replacement: every editable field taken from `product`.
    pub fn replace(product: &Product) -> Self {
        Self {
            title: Some(product.title.clone()),
            brand: Some(product.brand.clone()),
            description: Some(product.description.clone()),
            stock: Some(product.stock),
            price: Some(product.price),
            rating: Some(product.rating),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Envelope the backend wraps list and search results in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
}
