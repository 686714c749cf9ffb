//! Table-driven search and sort over an entity's fields
//!
//! Entities opt in by implementing [`Searchable`], declaring which string
//! fields a search value is matched against and which fields can order a
//! result set. [`SearchQuery::apply`] then works for any such entity without
//! knowing its shape.
//!
//! # Example
//!
//! ```rust
//! use address_service::models::AddressData;
//! use address_service::repository::SearchQuery;
//!
//! let rome = AddressData {
//!     street: "Via Appia".into(),
//!     house_number: "1".into(),
//!     postcode: "00178".into(),
//!     city: "Rome".into(),
//!     country: "IT".into(),
//! }
//! .into_address(1);
//!
//! let query = SearchQuery::new("appia", "City", true);
//! assert_eq!(query.apply(vec![rome]).len(), 1);
//! ```

use std::cmp::Ordering;

/// Comparable value extracted from an entity for ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey<'a> {
    Integer(i64),
    /// Compared ordinally (byte order), not by locale
    Text(&'a str),
}

/// A named string field that search values are matched against
pub struct SearchField<E> {
    pub name: &'static str,
    pub value: for<'a> fn(&'a E) -> &'a str,
}

/// A named field that results can be ordered by
pub struct SortField<E> {
    pub name: &'static str,
    pub key: for<'a> fn(&'a E) -> SortKey<'a>,
}

/// Static field tables declared beside an entity
pub trait Searchable: Sized + 'static {
    /// Fields checked by a search value, in declaration order
    const SEARCH_FIELDS: &'static [SearchField<Self>];

    /// Fields accepted as a sort key
    const SORT_FIELDS: &'static [SortField<Self>];

    /// Look up a sort field by name, ignoring ASCII case
    fn sort_field(name: &str) -> Option<&'static SortField<Self>> {
        Self::SORT_FIELDS
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
    }

    /// Whether any search field contains `needle`
    ///
    /// `needle` must already be lowercased.
    fn matches(&self, needle: &str) -> bool {
        Self::SEARCH_FIELDS
            .iter()
            .any(|field| (field.value)(self).to_lowercase().contains(needle))
    }
}

/// Filter + order request over a [`Searchable`] entity set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub search_value: String,
    pub sort_by: String,
    pub ascending: bool,
}

impl SearchQuery {
    pub fn new(search_value: impl Into<String>, sort_by: impl Into<String>, ascending: bool) -> Self {
        Self {
            search_value: search_value.into(),
            sort_by: sort_by.into(),
            ascending,
        }
    }

    /// Filter, then order, the given entities
    ///
    /// An empty search value keeps everything. An unknown `sort_by` leaves the
    /// input order untouched regardless of `ascending`.
    pub fn apply<E: Searchable>(&self, entities: Vec<E>) -> Vec<E> {
        let mut results = if self.search_value.is_empty() {
            entities
        } else {
            let needle = self.search_value.to_lowercase();
            entities
                .into_iter()
                .filter(|entity| entity.matches(&needle))
                .collect()
        };

        if let Some(field) = E::sort_field(&self.sort_by) {
            results.sort_by(|a, b| compare(field, a, b));
            if !self.ascending {
                results.reverse();
            }
        }

        results
    }
}

fn compare<E>(field: &SortField<E>, a: &E, b: &E) -> Ordering {
    (field.key)(a).cmp(&(field.key)(b))
}
