//! Data provider definitions.

use serde::{Deserialize, Serialize};

use crate::{Extra, ProviderSlug};

fn default_display() -> bool {
    true
}

/// An export format a provider can produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Format {
    pub slug: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(flatten)]
    pub extra: Extra,
}

/// A data source definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub slug: ProviderSlug,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_description: Option<String>,

    #[serde(default)]
    pub favorite: bool,

    #[serde(default)]
    pub hidden: bool,

    #[serde(default = "default_display")]
    pub display: bool,

    #[serde(default)]
    pub supported_formats: Vec<Format>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl Provider {
    /// Slugs of the formats picked when the user has not chosen any.
    ///
    /// Prefers `gpkg`, or `gtiff` for coverage (`wcs`) services, and falls
    /// back to the first supported format.
    pub fn default_formats(&self) -> Vec<String> {
        let is_coverage = self.extra.get("type").and_then(|t| t.as_str()) == Some("wcs");
        let preferred = if is_coverage { "gtiff" } else { "gpkg" };

        if self.supported_formats.iter().any(|f| f.slug == preferred) {
            return vec![preferred.to_string()];
        }
        self.supported_formats
            .first()
            .map(|f| vec![f.slug.clone()])
            .unwrap_or_default()
    }
}
