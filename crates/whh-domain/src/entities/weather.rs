//! Historic weather data point

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// One recorded weather observation
///
/// `id` is assigned by the store on insert; values built with
/// [`WeatherData::new`] carry `0` until then.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WeatherData {
    /// Store-assigned identifier
    pub id: i32,
    /// Observation date
    pub date: NaiveDate,
    /// Temperature in degrees Celsius
    #[validate(custom(function = "validate_temperature"))]
    pub temperature: f64,
    /// Free text summary
    #[validate(length(max = 100, message = "summary must be at most 100 characters"))]
    pub summary: String,
}

impl WeatherData {
    /// Create an unsaved data point
    pub fn new<S: Into<String>>(date: NaiveDate, temperature: f64, summary: S) -> Self {
        Self {
            id: 0,
            date,
            temperature,
            summary: summary.into(),
        }
    }

    /// Run field validation and map failures to a domain error
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| Error::validation(format!("Invalid weather data: {e}")))
    }

    /// Copy with the store-assigned identifier
    pub fn with_id(mut self, id: i32) -> Self {
        self.id = id;
        self
    }
}

fn validate_temperature(value: f64) -> std::result::Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("temperature_not_finite"))
    }
}
