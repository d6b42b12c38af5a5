use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{ApiError, Result};
use crate::hydrate::{lenient, Hydrate};

/// Destination and quantity for a freight quote.
#[derive(Debug, Clone, Serialize, Validate)]
#[validate(schema(function = "validate_freight_request"))]
pub struct FreightRequest {
    #[validate(length(min = 1, message = "postal code is required"))]
    pub postal_code: String,
    pub quantity: f64,
    #[validate(length(equal = 2, message = "country must be a two-letter code"))]
    pub country: String,
}

impl FreightRequest {
    pub fn new(postal_code: &str, quantity: f64, country: &str) -> Self {
        Self {
            postal_code: postal_code.to_string(),
            quantity,
            country: country.to_string(),
        }
    }

    /// # Errors
    ///
    /// `ApiError::Validation` describing every failed rule.
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| ApiError::Validation(e.to_string()))
    }
}

fn validate_freight_request(request: &FreightRequest) -> std::result::Result<(), ValidationError> {
    if request.postal_code.trim().is_empty() {
        return Err(ValidationError::new("postal_code_blank"));
    }
    if !(request.quantity.is_finite() && request.quantity > 0.0) {
        return Err(ValidationError::new("quantity_not_positive"));
    }
    if !request.country.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::new("country_not_alphabetic"));
    }
    Ok(())
}

/// Freight quote returned by `api/item/{id}/freight`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FreightResponse {
    #[serde(deserialize_with = "lenient::f64_value")]
    pub rate: f64,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub carrier: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub service: Option<String>,
    #[serde(default)]
    pub transit_days: Option<u32>,
}

impl Hydrate for FreightResponse {
    const NAME: &'static str = "FreightResponse";
}
