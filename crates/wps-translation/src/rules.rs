//! Translation rules
//!
//! Rules are authored in the Current → Legacy direction. A rule's `parent`
//! is either a single local name (the parent keeps its name in both
//! vocabularies) or `"Canonical/Wire"` when the parent element is itself
//! renamed; the first segment keys the export lookup and the last segment
//! keys the derived import lookup.

use crate::namespace::{OWS_1_1, OWS_2_0, WPS_1_0, WPS_2_0};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// One rename, Current → Legacy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRule {
    /// Parent context, `None` when the rule applies under any parent
    #[serde(rename = "parent", default, skip_serializing_if = "Option::is_none")]
    pub parent_local: Option<String>,

    /// Canonical (current) local name
    #[serde(rename = "from")]
    pub from_local: String,

    /// Wire (legacy) local name
    #[serde(rename = "to")]
    pub to_local: String,
}

/// A namespace that moved between the schema generations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespacePair {
    pub current: String,
    pub legacy: String,
}

/// Names that kept their spelling but moved namespace.
///
/// On import, an element that ends up with no namespace and whose renamed
/// local name is listed here is placed in `namespace`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disambiguation {
    pub namespace: String,
    #[serde(default)]
    pub names: Vec<String>,
}

/// A complete rule list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Rule set name
    pub name: String,

    #[serde(default)]
    pub rules: Vec<TranslationRule>,

    #[serde(default)]
    pub namespaces: Vec<NamespacePair>,

    #[serde(default)]
    pub disambiguation: Option<Disambiguation>,
}

impl TranslationRule {
    /// Rule applying under any parent
    pub fn global(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            parent_local: None,
            from_local: from.into(),
            to_local: to.into(),
        }
    }

    /// Rule applying only under `parent`
    pub fn under(
        parent: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            parent_local: Some(parent.into()),
            from_local: from.into(),
            to_local: to.into(),
        }
    }

    /// Parent key on the canonical (export) side
    pub fn export_parent(&self) -> Option<&str> {
        self.parent_local
            .as_deref()
            .and_then(|p| p.split('/').next())
    }

    /// Parent key on the wire (import) side: the last path segment
    pub fn import_parent(&self) -> Option<&str> {
        self.parent_local
            .as_deref()
            .and_then(|p| p.rsplit('/').next())
    }

    /// The same rule seen from the wire side
    pub fn inverted(&self) -> Self {
        Self {
            parent_local: self.import_parent().map(str::to_string),
            from_local: self.to_local.clone(),
            to_local: self.from_local.clone(),
        }
    }

    /// Reject empty names and parent paths with more than two segments
    pub fn validate(&self) -> Result<()> {
        if self.from_local.trim().is_empty() || self.to_local.trim().is_empty() {
            return Err(Error::invalid_rule(self.to_string(), "empty local name"));
        }
        if let Some(parent) = &self.parent_local {
            let segments: Vec<&str> = parent.split('/').collect();
            if segments.len() > 2 || segments.iter().any(|s| s.trim().is_empty()) {
                return Err(Error::invalid_rule(
                    self.to_string(),
                    "parent must be 'Name' or 'Canonical/Wire'",
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for TranslationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parent_local {
            Some(parent) => write!(f, "{parent}.{} -> {}", self.from_local, self.to_local),
            None => write!(f, "{} -> {}", self.from_local, self.to_local),
        }
    }
}

impl NamespacePair {
    pub fn new(current: impl Into<String>, legacy: impl Into<String>) -> Self {
        Self {
            current: current.into(),
            legacy: legacy.into(),
        }
    }
}

impl RuleSet {
    /// The built-in WPS 2.0 → WPS 1.0.0 rule list
    pub fn wps() -> Self {
        Self {
            name: "wps".to_string(),
            rules: vec![
                TranslationRule::global("Result", "ExecuteResponse"),
                TranslationRule::global("supportedCRS", "CRS"),
                TranslationRule::global("ProcessOfferings", "ProcessDescriptions"),
                TranslationRule::under("Capabilities", "Contents", "ProcessOfferings"),
                TranslationRule::under("Data", "BoundingBox", "BoundingBoxData"),
                TranslationRule::under("Data", "LiteralValue", "LiteralData"),
                TranslationRule::under("Output", "ComplexData", "ComplexOutput"),
                TranslationRule::under("Output", "LiteralData", "LiteralOutput"),
                TranslationRule::under("Output", "BoundingBoxData", "BoundingBoxOutput"),
                TranslationRule::under("Contents/ProcessOfferings", "ProcessSummary", "Process"),
                TranslationRule::under(
                    "ProcessOfferings/ProcessDescriptions",
                    "ProcessOffering",
                    "ProcessDescription",
                ),
            ],
            namespaces: vec![
                NamespacePair::new(OWS_2_0, OWS_1_1),
                NamespacePair::new(WPS_2_0, WPS_1_0),
            ],
            disambiguation: Some(Disambiguation {
                namespace: WPS_2_0.to_string(),
                names: [
                    "Input",
                    "Output",
                    "LiteralData",
                    "ComplexData",
                    "BoundingBoxData",
                    "Format",
                ]
                .into_iter()
                .map(str::to_string)
                .collect(),
            }),
        }
    }

    /// Parse a rule set from YAML
    pub fn parse_yaml(content: &str) -> Result<Self> {
        let set: Self = serde_yaml::from_str(content).map_err(|e| Error::Parse(e.to_string()))?;
        for rule in &set.rules {
            rule.validate()?;
        }
        debug!(name = %set.name, rules = set.rules.len(), "Parsed rule set");
        Ok(set)
    }

    /// Parse a rule set from a YAML file
    pub fn parse_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Append the rules, namespaces and disambiguation names of `other`
    pub fn extend(&mut self, other: RuleSet) {
        self.rules.extend(other.rules);
        self.namespaces.extend(other.namespaces);
        if let Some(theirs) = other.disambiguation {
            match &mut self.disambiguation {
                Some(mine) => mine.names.extend(theirs.names),
                None => self.disambiguation = Some(theirs),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_path_segments() {
        let rule = TranslationRule::under("Contents/ProcessOfferings", "ProcessSummary", "Process");
        assert_eq!(rule.export_parent(), Some("Contents"));
        assert_eq!(rule.import_parent(), Some("ProcessOfferings"));

        let plain = TranslationRule::under("Output", "ComplexData", "ComplexOutput");
        assert_eq!(plain.export_parent(), Some("Output"));
        assert_eq!(plain.import_parent(), Some("Output"));

        assert_eq!(TranslationRule::global("Result", "ExecuteResponse").import_parent(), None);
    }

    #[test]
    fn test_inverted_takes_wire_parent() {
        let rule = TranslationRule::under("Contents/ProcessOfferings", "ProcessSummary", "Process");
        assert_eq!(
            rule.inverted(),
            TranslationRule::under("ProcessOfferings", "Process", "ProcessSummary")
        );
    }

    #[test]
    fn test_validate_rejects_bad_rules() {
        assert!(TranslationRule::global("", "x").validate().is_err());
        assert!(TranslationRule::under("a/b/c", "x", "y").validate().is_err());
        assert!(TranslationRule::under("a/", "x", "y").validate().is_err());
        assert!(TranslationRule::under("a/b", "x", "y").validate().is_ok());
    }

    #[test]
    fn test_parse_yaml_rule_file() {
        let yaml = r#"
name: extra
rules:
  - from: StatusInfo
    to: Status
    parent: Result/ExecuteResponse
  - from: JobID
    to: JobId
namespaces:
  - current: urn:new
    legacy: urn:old
"#;
        let set = RuleSet::parse_yaml(yaml).unwrap();
        assert_eq!(set.name, "extra");
        assert_eq!(set.rules.len(), 2);
        assert_eq!(set.rules[0].import_parent(), Some("ExecuteResponse"));
        assert_eq!(set.rules[1].parent_local, None);
        assert_eq!(set.namespaces, vec![NamespacePair::new("urn:new", "urn:old")]);
        assert!(set.disambiguation.is_none());
    }

    #[test]
    fn test_parse_yaml_rejects_invalid_rule() {
        let yaml = "name: bad\nrules:\n  - from: ''\n    to: X\n";
        assert!(matches!(
            RuleSet::parse_yaml(yaml),
            Err(Error::InvalidRule { .. })
        ));
        assert!(matches!(RuleSet::parse_yaml("rules: ["), Err(Error::Parse(_))));
    }

    #[test]
    fn test_extend_merges_disambiguation() {
        let mut set = RuleSet::wps();
        let before = set.rules.len();
        set.extend(RuleSet {
            name: "extra".to_string(),
            rules: vec![TranslationRule::global("JobID", "JobId")],
            namespaces: vec![],
            disambiguation: Some(Disambiguation {
                namespace: WPS_2_0.to_string(),
                names: vec!["Data".to_string()],
            }),
        });
        assert_eq!(set.rules.len(), before + 1);
        let names = &set.disambiguation.unwrap().names;
        assert!(names.contains(&"Data".to_string()));
        assert!(names.contains(&"Format".to_string()));
    }
}
