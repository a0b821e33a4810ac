//! # Pure Data Module - Data Transfer Objects Only
//!
//! Configuration data structures and their TOML mapping. Loading files is the
//! caller's business; missing sections map to defaults, never to errors.

use serde::Deserialize;

use crate::image::{Direction, SizeCatalog};

/// Scaling configuration DTO.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScalingConfig {
    pub scaling: ScalingSection,
    pub cache: CacheSection,
    pub resizer: ResizerSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScalingSection {
    /// Site-wide quality; registered as the quality utility when set.
    pub quality: Option<u8>,
    pub default_direction: Direction,
    /// Default named size catalog, `name = [width, height]`.
    pub sizes: SizeCatalog,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Scale records kept per content object before the oldest are evicted.
    pub max_records: usize,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self { max_records: 256 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResizerSection {
    /// JPEG quality used when a request carries none.
    pub jpeg_quality: u8,
}

impl Default for ResizerSection {
    fn default() -> Self {
        Self { jpeg_quality: 88 }
    }
}

impl ScalingConfig {
    /// v1 defaults.
    pub fn defaults() -> Self {
        Self::default()
    }

    /// Map a parsed TOML document onto the DTO.
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        Ok(toml_value.clone().try_into()?)
    }
}
