//! Address entity and its request payload

use serde::{Deserialize, Serialize};

use crate::repository::{SearchField, Searchable, SortField, SortKey};
use crate::responses::ValidationError;

/// A stored postal address
///
/// `id` is assigned by the store on insert and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "PascalCase")]
pub struct Address {
    #[serde(default, alias = "Id")]
    pub id: i64,
    #[serde(default, alias = "Street")]
    pub street: String,
    #[serde(default, alias = "HouseNumber")]
    pub house_number: String,
    #[serde(default, alias = "Postcode")]
    pub postcode: String,
    #[serde(default, alias = "City")]
    pub city: String,
    #[serde(default, alias = "Country")]
    pub country: String,
}

impl Address {
    /// Free-text form used for geocoding lookups
    pub fn query_text(&self) -> String {
        format!(
            "{} {}, {} {}, {}",
            self.street, self.house_number, self.postcode, self.city, self.country
        )
    }
}

impl Searchable for Address {
    const SEARCH_FIELDS: &'static [SearchField<Self>] = &[
        SearchField {
            name: "Street",
            value: |a| &a.street,
        },
        SearchField {
            name: "HouseNumber",
            value: |a| &a.house_number,
        },
        SearchField {
            name: "Postcode",
            value: |a| &a.postcode,
        },
        SearchField {
            name: "City",
            value: |a| &a.city,
        },
        SearchField {
            name: "Country",
            value: |a| &a.country,
        },
    ];

    const SORT_FIELDS: &'static [SortField<Self>] = &[
        SortField {
            name: "Id",
            key: |a| SortKey::Integer(a.id),
        },
        SortField {
            name: "Street",
            key: |a| SortKey::Text(&a.street),
        },
        SortField {
            name: "HouseNumber",
            key: |a| SortKey::Text(&a.house_number),
        },
        SortField {
            name: "Postcode",
            key: |a| SortKey::Text(&a.postcode),
        },
        SortField {
            name: "City",
            key: |a| SortKey::Text(&a.city),
        },
        SortField {
            name: "Country",
            key: |a| SortKey::Text(&a.country),
        },
    ];
}

/// Request body for creating or replacing an address
///
/// Any `id` in the body is ignored; the store or the path decides it.
/// Missing keys deserialize to empty strings and are rejected by [`validate`](Self::validate).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressData {
    #[serde(alias = "Street")]
    pub street: String,
    #[serde(alias = "HouseNumber")]
    pub house_number: String,
    #[serde(alias = "Postcode")]
    pub postcode: String,
    #[serde(alias = "City")]
    pub city: String,
    #[serde(alias = "Country")]
    pub country: String,
}

impl AddressData {
    /// Check that every field carries a non-blank value
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new("Validation failed");

        for (field, value) in [
            ("street", &self.street),
            ("houseNumber", &self.house_number),
            ("postcode", &self.postcode),
            ("city", &self.city),
            ("country", &self.country),
        ] {
            if value.trim().is_empty() {
                errors.add_field_error(field, "REQUIRED", format!("The {} field is required.", field));
            }
        }

        if errors.has_errors() {
            return Err(errors);
        }
        Ok(())
    }

    /// Attach an id, producing the stored form
    pub fn into_address(self, id: i64) -> Address {
        Address {
            id,
            street: self.street,
            house_number: self.house_number,
            postcode: self.postcode,
            city: self.city,
            country: self.country,
        }
    }
}

impl From<Address> for AddressData {
    fn from(address: Address) -> Self {
        Self {
            street: address.street,
            house_number: address.house_number,
            postcode: address.postcode,
            city: address.city,
            country: address.country,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn main_st() -> AddressData {
        AddressData {
            street: "Main St".to_string(),
            house_number: "5".to_string(),
            postcode: "10001".to_string(),
            city: "NYC".to_string(),
            country: "US".to_string(),
        }
    }

    #[test]
    fn test_serializes_camel_case() {
        let address = main_st().into_address(1);
        let json = serde_json::to_value(&address).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["houseNumber"], "5");
        assert_eq!(json["postcode"], "10001");
    }

    #[test]
    fn test_accepts_pascal_case_keys() {
        let data: AddressData = serde_json::from_str(
            r#"{"Street":"Main St","HouseNumber":"5","Postcode":"10001","City":"NYC","Country":"US"}"#,
        )
        .unwrap();
        assert_eq!(data, main_st());
    }

    #[test]
    fn test_missing_keys_fail_validation() {
        let data: AddressData = serde_json::from_str(r#"{"street":"Main St"}"#).unwrap();
        let errors = data.validate().unwrap_err();
        assert_eq!(errors.error_count(), 4);
        assert!(errors.errors.contains_key("houseNumber"));
        assert!(!errors.errors.contains_key("street"));
    }

    #[test]
    fn test_whitespace_is_empty() {
        let mut data = main_st();
        data.street = "   ".to_string();
        let errors = data.validate().unwrap_err();
        assert!(errors.errors.contains_key("street"));
    }

    #[test]
    fn test_valid_data_passes() {
        assert!(main_st().validate().is_ok());
    }

    #[test]
    fn test_body_id_is_ignored() {
        let data: AddressData = serde_json::from_str(
            r#"{"id":77,"street":"Main St","houseNumber":"5","postcode":"10001","city":"NYC","country":"US"}"#,
        )
        .unwrap();
        assert_eq!(data.into_address(3).id, 3);
    }

    #[test]
    fn test_query_text() {
        let address = main_st().into_address(1);
        assert_eq!(address.query_text(), "Main St 5, 10001 NYC, US");
    }
}
