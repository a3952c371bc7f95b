//! Named test sites used as template origins.

use crate::error::TemplateError;
use crate::geometry::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_LOCATION: &str = "costa-rica-field";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestLocation {
    pub coordinate: Coordinate,
    /// Altitude templates use when the caller does not give one.
    pub default_altitude_m: f64,
}

/// Read-only lookup table; fixed once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct TestLocations {
    sites: BTreeMap<String, TestLocation>,
}

impl TestLocations {
    pub fn new(sites: impl IntoIterator<Item = (String, TestLocation)>) -> Self {
        Self {
            sites: sites.into_iter().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TestLocation> {
        self.sites.get(name)
    }

    pub fn resolve(&self, name: &str) -> Result<&TestLocation, TemplateError> {
        self.get(name)
            .ok_or_else(|| TemplateError::UnknownLocation(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

impl Default for TestLocations {
    fn default() -> Self {
        Self::new([(
            DEFAULT_LOCATION.to_string(),
            TestLocation {
                coordinate: Coordinate::new(10.32352, -84.430511),
                default_altitude_m: 30.0,
            },
        )])
    }
}
