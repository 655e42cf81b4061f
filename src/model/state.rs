//! The store's snapshot and the filtered view derived from it.

use super::product::Product;
use serde::{Deserialize, Serialize};

/// Product fields the local filter can match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Title,
    Brand,
    Description,
}

impl SearchField {
    fn value<'a>(&self, product: &'a Product) -> &'a str {
        match self {
            SearchField::Title => &product.title,
            SearchField::Brand => &product.brand,
            SearchField::Description => &product.description,
        }
    }
}

/// Everything the store owns, published as one value on every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    /// Server-confirmed products, in server response order.
    pub items: Vec<Product>,
    /// True while at least one tracked, non-superseded remote call is outstanding.
    pub loading: bool,
    /// Current search string; empty means no filter.
    pub filter_term: String,
}

impl StoreState {
    /// The filtered view: items whose `fields` contain `filter_term`, ignoring case.
    pub fn filtered(&self, fields: &[SearchField]) -> Vec<Product> {
        filter_products(&self.items, &self.filter_term, fields)
    }
}

/// Case-insensitive substring filter. Only the empty term keeps everything;
/// whitespace in the term is matched literally.
pub fn filter_products(items: &[Product], term: &str, fields: &[SearchField]) -> Vec<Product> {
    if term.is_empty() {
        return items.to_vec();
    }
    let needle = term.to_lowercase();
    items
        .iter()
        .filter(|product| {
            fields
                .iter()
                .any(|field| field.value(product).to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProductDraft, ProductId};

    fn product(id: u64, title: &str, brand: &str) -> Product {
        Product::from_draft(
            ProductId(id),
            ProductDraft {
                title: title.into(),
                brand: brand.into(),
                ..ProductDraft::default()
            },
        )
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "iPhone 9", "Apple"),
            product(2, "Galaxy Book", "Samsung"),
            product(3, "MacBook Pro", "Apple"),
        ]
    }

    #[test]
    fn test_empty_term_yields_everything() {
        let state = StoreState {
            items: catalog(),
            ..StoreState::default()
        };
        assert_eq!(state.filtered(&[SearchField::Title]), catalog());
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let state = StoreState {
            items: catalog(),
            filter_term: "BOOK".into(),
            ..StoreState::default()
        };
        let ids: Vec<u64> = state
            .filtered(&[SearchField::Title])
            .iter()
            .map(|p| p.id.0)
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_filter_only_checks_configured_fields() {
        let items = catalog();
        assert!(filter_products(&items, "apple", &[SearchField::Title]).is_empty());
        assert_eq!(
            filter_products(&items, "apple", &[SearchField::Title, SearchField::Brand]).len(),
            2
        );
    }

    #[test]
    fn test_whitespace_in_term_is_significant() {
        let items = vec![product(1, "iPhone X", "Apple"), product(2, "Pixel", "Google")];
        let ids = |term: &str| -> Vec<u64> {
            filter_products(&items, term, &[SearchField::Title])
                .iter()
                .map(|p| p.id.0)
                .collect()
        };

        assert!(ids("x ").is_empty());
        assert_eq!(ids(" "), vec![1]);
        assert_eq!(ids(" X"), vec![1]);
        assert_eq!(ids(""), vec![1, 2]);
    }

    #[test]
    fn test_filter_keeps_order() {
        let items = catalog();
        let result = filter_products(&items, "o", &[SearchField::Title]);
        let ids: Vec<u64> = result.iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
