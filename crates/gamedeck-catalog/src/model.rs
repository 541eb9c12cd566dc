//! Catalog data types shared by the fetcher, the cache and the filter engine

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Viewport widths below this are treated as mobile
pub const MOBILE_MAX_WIDTH: u32 = 768;

/// Viewport widths below this (and at least [`MOBILE_MAX_WIDTH`]) are treated as tablet
pub const TABLET_MAX_WIDTH: u32 = 1024;

/// One game record as delivered by the catalog endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub provider: String,
    /// Classification tags, in upstream order
    #[serde(default)]
    pub tags: Vec<String>,
    /// Playable on mobile devices
    #[serde(default = "default_capable")]
    pub mobile: bool,
    /// Playable on desktop devices
    #[serde(default = "default_capable")]
    pub desktop: bool,
}

fn default_capable() -> bool {
    true
}

impl CatalogEntry {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            provider: provider.into(),
            tags: Vec::new(),
            mobile: true,
            desktop: true,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_devices(mut self, mobile: bool, desktop: bool) -> Self {
        self.mobile = mobile;
        self.desktop = desktop;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Top-level category of games being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogScope {
    Slot,
    Casino,
    #[default]
    All,
}

impl CatalogScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Slot => "slot",
            Self::Casino => "casino",
            Self::All => "all",
        }
    }
}

impl fmt::Display for CatalogScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogScope {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slot" | "slots" => Ok(Self::Slot),
            "casino" => Ok(Self::Casino),
            "all" => Ok(Self::All),
            _ => Err(CatalogError::UnknownVariant {
                kind: "scope",
                value: s.to_string(),
            }),
        }
    }
}

/// Three-way device bucket used for capability filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Tablet,
    #[default]
    Desktop,
}

impl DeviceClass {
    /// Classify a viewport by its CSS pixel width
    pub fn from_viewport_width(width: u32) -> Self {
        if width < MOBILE_MAX_WIDTH {
            Self::Mobile
        } else if width < TABLET_MAX_WIDTH {
            Self::Tablet
        } else {
            Self::Desktop
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
            Self::Desktop => "desktop",
        }
    }

    /// Whether an entry may be shown on this device class.
    ///
    /// Tablets admit both capabilities.
    pub fn admits(self, entry: &CatalogEntry) -> bool {
        match self {
            Self::Mobile => entry.mobile,
            Self::Desktop => entry.desktop,
            Self::Tablet => true,
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceClass {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mobile" => Ok(Self::Mobile),
            "tablet" => Ok(Self::Tablet),
            "desktop" => Ok(Self::Desktop),
            _ => Err(CatalogError::UnknownVariant {
                kind: "device class",
                value: s.to_string(),
            }),
        }
    }
}
