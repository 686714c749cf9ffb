use serde::{Deserialize, Serialize};

use super::Address;

/// Great-circle distance between two stored addresses, in kilometers
///
/// Built per request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub address1: Address,
    pub address2: Address,
    pub distance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_keys() {
        let distance = Distance {
            address1: Address::default(),
            address2: Address::default(),
            distance: 12.5,
        };
        let json = serde_json::to_value(&distance).unwrap();
        assert!(json.get("address1").is_some());
        assert!(json.get("address2").is_some());
        assert_eq!(json["distance"], 12.5);
    }
}
