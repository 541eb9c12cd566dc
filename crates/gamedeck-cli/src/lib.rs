//! gamedeck CLI library
//!
//! Argument types, configuration resolution and command handlers for the
//! `gamedeck` binary.

pub mod commands;
pub mod output;

use anyhow::Context;
use clap::{Args, Subcommand};
use gamedeck_catalog::{CatalogConfig, CatalogScope, DeviceClass};
use std::path::PathBuf;

/// Output format for command results
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Tables and plain text
    #[default]
    Text,
    /// Compact JSON
    Json,
    /// Indented JSON
    JsonPretty,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        matches!(self, Self::Json | Self::JsonPretty)
    }

    /// Serialize `value` in this format's JSON flavour
    pub fn to_json<T: serde::Serialize>(self, value: &T) -> serde_json::Result<String> {
        if self == Self::JsonPretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Catalog endpoint URL
    #[arg(long, global = true, env = "GAMEDECK_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Directory for the persisted cache
    #[arg(long, global = true, env = "GAMEDECK_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

impl GlobalOptions {
    /// Configuration file first, then command-line overrides
    pub fn load_config(&self) -> anyhow::Result<CatalogConfig> {
        let mut config = match &self.config {
            Some(path) => CatalogConfig::from_toml_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => CatalogConfig::new(),
        };

        if let Some(endpoint) = &self.endpoint {
            config = config
                .with_endpoint(endpoint)
                .with_context(|| format!("invalid endpoint: {endpoint}"))?;
        }
        if let Some(dir) = &self.cache_dir {
            config = config.with_cache_dir(dir);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Which catalog to work on
#[derive(Args, Debug, Clone)]
pub struct CatalogTarget {
    /// Catalog scope (slot, casino, all)
    #[arg(short, long, default_value = "all")]
    pub scope: CatalogScope,

    /// Device class (mobile, tablet, desktop)
    #[arg(short, long, conflicts_with = "width")]
    pub device: Option<DeviceClass>,

    /// Viewport width in pixels, classified into a device class
    #[arg(short, long)]
    pub width: Option<u32>,
}

impl CatalogTarget {
    pub fn device(&self) -> DeviceClass {
        match (self.device, self.width) {
            (Some(device), _) => device,
            (None, Some(width)) => DeviceClass::from_viewport_width(width),
            (None, None) => DeviceClass::default(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct BrowseArgs {
    #[command(flatten)]
    pub target: CatalogTarget,

    /// Game type filter (e.g. slot, live, table); "all" disables it
    #[arg(short = 't', long = "type", default_value = "all")]
    pub game_type: String,

    /// Provider filter (exact match)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Page to show, clamped into the available range
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CacheCommands {
    /// List persisted catalogs with their age
    List,
    /// Remove every cached catalog
    Clear,
    /// Remove expired catalogs
    Sweep,
}
