// MIT License - Copyright (c) 2026 Peter Wright
// SCSGate switch platform

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::error::{Result, ScsGateError};
use crate::message::ScsId;

/// Value of the `type` field that marks a scenario switch.
pub const CONF_SCENARIO: &str = "scenario";

/// One `[devices.<slug>]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    /// Bus address of the device
    pub scs_id: ScsId,
    /// `"scenario"` for scenario switches; absent for traditional switches
    #[serde(rename = "type", default)]
    pub switch_type: Option<String>,
    /// Display name (defaults to the slug)
    #[serde(default)]
    pub name: Option<String>,
}

/// How a configured device is set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchKind<'a> {
    Traditional,
    Scenario,
    Unknown(&'a str),
}

impl DeviceConfig {
    pub fn kind(&self) -> SwitchKind<'_> {
        match self.switch_type.as_deref() {
            None => SwitchKind::Traditional,
            Some(CONF_SCENARIO) => SwitchKind::Scenario,
            Some(other) => SwitchKind::Unknown(other),
        }
    }

    /// Configured name, or the slug when none was given.
    pub fn display_name<'a>(&'a self, slug: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(slug)
    }
}

/// Platform configuration: devices keyed by slug.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlatformConfig {
    pub devices: BTreeMap<String, DeviceConfig>,
}

impl PlatformConfig {
    pub fn builder() -> PlatformConfigBuilder {
        PlatformConfigBuilder::default()
    }

    /// Parse and validate a TOML document holding a `devices` table.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: PlatformConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check slugs, scs ids and scs id uniqueness.
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashMap<&ScsId, &str> = HashMap::new();
        for (slug, device) in &self.devices {
            if !is_slug(slug) {
                return Err(ScsGateError::InvalidSlug { slug: slug.clone() });
            }
            if device.scs_id.is_empty() {
                return Err(ScsGateError::EmptyScsId { slug: slug.clone() });
            }
            if let Some(first) = seen.insert(&device.scs_id, slug) {
                return Err(ScsGateError::DuplicateScsId {
                    scs_id: device.scs_id.to_string(),
                    first: first.to_string(),
                    second: slug.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Lowercase, replace runs of non-alphanumerics with `_`, trim `_` at the ends.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_sep = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

/// Whether `text` is already a valid slug.
pub fn is_slug(text: &str) -> bool {
    !text.is_empty() && slugify(text) == text
}

/// Builder for PlatformConfig.
#[derive(Debug, Clone, Default)]
pub struct PlatformConfigBuilder {
    config: PlatformConfig,
}

impl PlatformConfigBuilder {
    pub fn device(mut self, slug: impl Into<String>, device: DeviceConfig) -> Self {
        self.config.devices.insert(slug.into(), device);
        self
    }

    pub fn traditional(self, slug: impl Into<String>, scs_id: impl Into<ScsId>, name: &str) -> Self {
        self.device(
            slug,
            DeviceConfig {
                scs_id: scs_id.into(),
                switch_type: None,
                name: Some(name.to_string()),
            },
        )
    }

    pub fn scenario(self, slug: impl Into<String>, scs_id: impl Into<ScsId>, name: &str) -> Self {
        self.device(
            slug,
            DeviceConfig {
                scs_id: scs_id.into(),
                switch_type: Some(CONF_SCENARIO.to_string()),
                name: Some(name.to_string()),
            },
        )
    }

    pub fn build(self) -> PlatformConfig {
        self.config
    }
}
