//! Configuration for the helpdesk engine.

use std::env;

use crate::error::{HelpdeskError, Result};

/// Engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct HelpdeskConfig {
    /// Maximum distance between a technician and a ticket, in kilometres.
    /// `None` means unbounded.
    pub max_radius_km: Option<f64>,

    /// Mark technicians unavailable when they take a ticket, and available
    /// again when they complete it.
    pub release_on_assign: bool,
}

impl Default for HelpdeskConfig {
    fn default() -> Self {
        Self {
            max_radius_km: None,
            release_on_assign: true,
        }
    }
}

impl HelpdeskConfig {
    /// Create configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `HELPDESK_MAX_RADIUS_KM` - Radius limit in km (default: unbounded)
    /// - `HELPDESK_RELEASE_ON_ASSIGN` - Toggle availability on assign/complete (default: true)
    pub fn from_env() -> Result<Self> {
        let max_radius_km = match env::var("HELPDESK_MAX_RADIUS_KM") {
            Ok(v) if !v.trim().is_empty() => {
                let radius: f64 = v.trim().parse().map_err(|_| {
                    HelpdeskError::InvalidInput(format!("HELPDESK_MAX_RADIUS_KM: {}", v))
                })?;
                Some(radius)
            }
            _ => None,
        };

        let release_on_assign = match env::var("HELPDESK_RELEASE_ON_ASSIGN") {
            Ok(v) if !v.trim().is_empty() => parse_bool(&v).ok_or_else(|| {
                HelpdeskError::InvalidInput(format!("HELPDESK_RELEASE_ON_ASSIGN: {}", v))
            })?,
            _ => true,
        };

        let config = Self::default()
            .with_max_radius_km(max_radius_km)?
            .with_release_on_assign(release_on_assign);

        Ok(config)
    }

    /// Set the radius limit. Rejects negative or non-finite values.
    pub fn with_max_radius_km(mut self, radius: Option<f64>) -> Result<Self> {
        if let Some(r) = radius {
            if !r.is_finite() || r < 0.0 {
                return Err(HelpdeskError::InvalidInput(format!(
                    "max radius must be a non-negative number of km, got {}",
                    r
                )));
            }
        }
        self.max_radius_km = radius;
        Ok(self)
    }

    pub fn with_release_on_assign(mut self, release: bool) -> Self {
        self.release_on_assign = release;
        self
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
