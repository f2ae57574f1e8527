use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{trim, trim_opt, Normalize};

/// Delivery address payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddressRequest {
    #[validate(length(max = 50, message = "Label must be at most 50 characters"))]
    pub label: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Street must be 1-255 characters"))]
    pub street: String,

    #[validate(length(min = 1, max = 100, message = "City must be 1-100 characters"))]
    pub city: String,

    #[validate(length(max = 100, message = "State must be at most 100 characters"))]
    pub state: Option<String>,

    #[validate(length(max = 20, message = "Postal code must be at most 20 characters"))]
    pub postal_code: Option<String>,

    #[validate(length(max = 100, message = "Country must be at most 100 characters"))]
    pub country: Option<String>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: f64,

    #[validate(length(max = 20, message = "Floor must be at most 20 characters"))]
    pub floor: Option<String>,

    #[validate(length(max = 50, message = "Apartment must be at most 50 characters"))]
    pub apartment: Option<String>,

    #[validate(length(max = 255, message = "Landmark must be at most 255 characters"))]
    pub landmark: Option<String>,

    #[validate(length(max = 500, message = "Delivery instructions must be at most 500 characters"))]
    pub instructions: Option<String>,

    pub is_default: Option<bool>,
}

impl Normalize for AddressRequest {
    fn normalize(self) -> Self {
        Self {
            label: trim_opt(self.label),
            street: trim(self.street),
            city: trim(self.city),
            state: trim_opt(self.state),
            postal_code: trim_opt(self.postal_code),
            country: trim_opt(self.country),
            floor: trim_opt(self.floor),
            apartment: trim_opt(self.apartment),
            landmark: trim_opt(self.landmark),
            instructions: trim_opt(self.instructions),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::prepare;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<AddressRequest, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn accepts_minimal_address() {
        let req = parse(json!({
            "street": "12 Harbour Road",
            "city": "Lisbon",
            "latitude": 38.7223,
            "longitude": -9.1393
        }))
        .unwrap();
        let req = prepare(req).unwrap();
        assert!(req.floor.is_none());
        assert!(req.is_default.is_none());
    }

    #[test]
    fn optional_details_are_trimmed_and_blank_ones_dropped() {
        let req = parse(json!({
            "street": "  12 Harbour Road ",
            "city": "Lisbon",
            "latitude": 0.0,
            "longitude": 0.0,
            "floor": " 3 ",
            "apartment": "   ",
            "landmark": "Next to the pharmacy",
            "instructions": ""
        }))
        .unwrap();
        let req = prepare(req).unwrap();
        assert_eq!(req.street, "12 Harbour Road");
        assert_eq!(req.floor.as_deref(), Some("3"));
        assert!(req.apartment.is_none());
        assert!(req.instructions.is_none());
        assert_eq!(req.landmark.as_deref(), Some("Next to the pharmacy"));
    }

    #[test]
    fn missing_street_fails_to_parse() {
        let res = parse(json!({"city": "Lisbon", "latitude": 1.0, "longitude": 1.0}));
        assert!(res.is_err());
    }

    #[test]
    fn string_latitude_fails_to_parse() {
        let res = parse(json!({
            "street": "x", "city": "y", "latitude": "north", "longitude": 1.0
        }));
        assert!(res.is_err());
    }

    #[test]
    fn whitespace_street_is_rejected() {
        let req = parse(json!({
            "street": "   ", "city": "Lisbon", "latitude": 1.0, "longitude": 1.0
        }))
        .unwrap();
        let errors = prepare(req).unwrap_err();
        assert_eq!(errors, vec!["Street must be 1-255 characters".to_string()]);
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let req = parse(json!({
            "street": "x", "city": "y", "latitude": 91.0, "longitude": -180.5
        }))
        .unwrap();
        let errors = prepare(req).unwrap_err();
        assert_eq!(
            errors,
            vec![
                "Latitude must be between -90 and 90".to_string(),
                "Longitude must be between -180 and 180".to_string(),
            ]
        );
    }

    #[test]
    fn long_instructions_are_rejected() {
        let req = parse(json!({
            "street": "x", "city": "y", "latitude": 1.0, "longitude": 1.0,
            "instructions": "a".repeat(501)
        }))
        .unwrap();
        assert!(prepare(req).is_err());
    }
}
