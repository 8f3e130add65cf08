//! Transformer configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use wps_adapter_xml::XmlConfig;
use wps_translation::namespace::{OWS_1_1, OWS_2_0, WPS_1_0, WPS_2_0};

const XLINK: &str = "http://www.w3.org/1999/xlink";

/// Configuration for a [`crate::LegacyTransformer`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformerConfig {
    /// Service identifier expected in the root `service` attribute (default: `WPS`)
    pub service: String,
    /// Leading token of legacy `version` values (default: `1.`)
    pub legacy_token: String,
    /// Leading token of current `version` values (default: `2.`)
    pub current_token: String,
    /// YAML rule file extending the built-in rule list
    pub rules_file: Option<PathBuf>,
    /// XML reading and writing options
    pub xml: XmlConfig,
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            service: "WPS".to_string(),
            legacy_token: "1.".to_string(),
            current_token: "2.".to_string(),
            rules_file: None,
            xml: XmlConfig::default(),
        }
    }
}

impl TransformerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from YAML
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a configuration file. A relative `rules_file` is resolved against
    /// the directory of the configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io("read config", path.display().to_string(), e.to_string()))?;
        let mut config = Self::from_yaml(&content)?;

        if let Some(rules) = config.rules_file.take() {
            config.rules_file = Some(match path.parent() {
                Some(dir) if rules.is_relative() => dir.join(rules),
                _ => rules,
            });
        }
        debug!(
            path = %path.display(),
            rules_file = ?config.rules_file,
            "Loaded transformer config"
        );
        Ok(config)
    }

    pub fn with_rules_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.rules_file = Some(path.into());
        self
    }

    pub fn with_xml(mut self, xml: XmlConfig) -> Self {
        self.xml = xml;
        self
    }

    /// XML options with the conventional WPS prefixes added for any namespace
    /// that has no configured prefix
    pub fn xml_config(&self) -> XmlConfig {
        let mut xml = self.xml.clone();
        for (uri, prefix) in [
            (WPS_2_0, "wps"),
            (WPS_1_0, "wps"),
            (OWS_2_0, "ows"),
            (OWS_1_1, "ows"),
            (XLINK, "xlink"),
        ] {
            if xml.preferred_prefix(uri).is_none() {
                xml = xml.prefix(uri, prefix);
            }
        }
        xml
    }
}
