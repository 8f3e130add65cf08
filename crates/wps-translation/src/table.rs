//! Translation table
//!
//! Bidirectional rename lookup built from a [`RuleSet`]. Lookup order for a
//! local name is: the `parent.local` entry when a parent is known, then the
//! `local` entry, then the name itself.

use crate::namespace::NamespaceMap;
use crate::rules::{RuleSet, TranslationRule};
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;
use wps_ir::QName;

static WPS_TABLE: LazyLock<TranslationTable> = LazyLock::new(|| {
    TranslationTable::from_rules(&RuleSet::wps()).expect("built-in WPS rule set is consistent")
});

/// Direction of a translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Canonical (current) names to legacy wire names, used when writing
    Export,

    /// Legacy wire names to canonical names, used when reading
    Import,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Export => f.write_str("export"),
            Self::Import => f.write_str("import"),
        }
    }
}

/// Local-name lookup for one direction
#[derive(Debug, Clone, Default)]
struct NameMap {
    /// parent local name -> (local name -> renamed local name)
    contextual: HashMap<String, HashMap<String, String>>,
    global: HashMap<String, String>,
}

impl NameMap {
    fn insert(
        &mut self,
        direction: Direction,
        parent: Option<&str>,
        from: &str,
        to: &str,
    ) -> Result<()> {
        let (slot, key) = match parent {
            Some(parent) => (
                self.contextual.entry(parent.to_string()).or_default(),
                format!("{parent}.{from}"),
            ),
            None => (&mut self.global, from.to_string()),
        };

        match slot.get(from) {
            Some(existing) if existing != to => Err(Error::Conflict {
                direction,
                key,
                existing: existing.clone(),
                new: to.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                slot.insert(from.to_string(), to.to_string());
                Ok(())
            }
        }
    }

    fn lookup<'a>(&'a self, parent: Option<&str>, local: &'a str) -> &'a str {
        if let Some(renamed) = parent
            .and_then(|p| self.contextual.get(p))
            .and_then(|names| names.get(local))
        {
            return renamed;
        }
        self.global.get(local).map_or(local, String::as_str)
    }

    fn len(&self) -> usize {
        self.global.len() + self.contextual.values().map(HashMap::len).sum::<usize>()
    }
}

/// Process-wide immutable rename and namespace tables
#[derive(Debug, Clone)]
pub struct TranslationTable {
    name: String,
    rules: Vec<TranslationRule>,
    export: NameMap,
    import: NameMap,
    namespaces: NamespaceMap,
    disambiguation_namespace: Option<String>,
    disambiguation: HashSet<String>,
}

impl TranslationTable {
    /// Build both directions from an authored (Current → Legacy) rule list
    pub fn from_rules(set: &RuleSet) -> Result<Self> {
        let mut export = NameMap::default();
        let mut import = NameMap::default();

        for rule in &set.rules {
            rule.validate()?;
            export.insert(
                Direction::Export,
                rule.export_parent(),
                &rule.from_local,
                &rule.to_local,
            )?;
            let inverse = rule.inverted();
            import.insert(
                Direction::Import,
                inverse.parent_local.as_deref(),
                &inverse.from_local,
                &inverse.to_local,
            )?;
        }

        let (disambiguation_namespace, disambiguation) = match &set.disambiguation {
            Some(d) => (Some(d.namespace.clone()), d.names.iter().cloned().collect()),
            None => (None, HashSet::new()),
        };

        let table = Self {
            name: set.name.clone(),
            rules: set.rules.clone(),
            export,
            import,
            namespaces: NamespaceMap::from_pairs(&set.namespaces),
            disambiguation_namespace,
            disambiguation,
        };
        debug!(
            name = %table.name,
            export_entries = table.export.len(),
            import_entries = table.import.len(),
            namespaces = table.namespaces.len(),
            "Built translation table"
        );
        Ok(table)
    }

    /// Shared table for the built-in WPS rule list
    pub fn wps() -> &'static TranslationTable {
        &WPS_TABLE
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Authored rules this table was built from
    pub fn rules(&self) -> &[TranslationRule] {
        &self.rules
    }

    /// Rename a local name given the local name of its parent
    pub fn rename<'a>(
        &'a self,
        direction: Direction,
        parent: Option<&str>,
        local: &'a str,
    ) -> &'a str {
        match direction {
            Direction::Export => self.export.lookup(parent, local),
            Direction::Import => self.import.lookup(parent, local),
        }
    }

    /// Substitute a namespace URI
    pub fn rename_ns<'a>(&'a self, direction: Direction, uri: &'a str) -> &'a str {
        self.namespaces.map(direction, uri)
    }

    /// Translate an element name: namespace, local part, then the import-side
    /// namespace disambiguation for unqualified names.
    pub fn translate_element(
        &self,
        direction: Direction,
        parent: Option<&str>,
        name: &QName,
    ) -> QName {
        let namespace = self.rename_ns(direction, &name.namespace);
        let local = self.rename(direction, parent, &name.local);

        let unqualified_import = direction == Direction::Import && namespace.is_empty();
        if unqualified_import && self.disambiguation.contains(local) {
            if let Some(forced) = &self.disambiguation_namespace {
                return QName::new(forced.clone(), local);
            }
        }
        QName::new(namespace, local)
    }

    /// Translate an attribute name; attributes keep their local name
    pub fn translate_attribute(&self, direction: Direction, name: &QName) -> QName {
        QName::new(self.rename_ns(direction, &name.namespace), name.local.clone())
    }

    /// Whether `local` is in the disambiguation set
    pub fn is_ambiguous(&self, local: &str) -> bool {
        self.disambiguation.contains(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::{OWS_1_1, OWS_2_0, WPS_1_0, WPS_2_0};
    use crate::rules::TranslationRule;

    fn table() -> &'static TranslationTable {
        TranslationTable::wps()
    }

    #[test]
    fn test_contextual_before_global() {
        let t = table();
        assert_eq!(t.rename(Direction::Export, Some("Output"), "LiteralData"), "LiteralOutput");
        assert_eq!(t.rename(Direction::Export, Some("Input"), "LiteralData"), "LiteralData");
        assert_eq!(t.rename(Direction::Export, Some("Data"), "LiteralValue"), "LiteralData");
        assert_eq!(t.rename(Direction::Export, Some("Anything"), "supportedCRS"), "CRS");
        assert_eq!(t.rename(Direction::Export, None, "Result"), "ExecuteResponse");
    }

    #[test]
    fn test_import_keyed_by_wire_parent() {
        fn import(parent: Option<&str>, local: &'static str) -> &'static str {
            table().rename(Direction::Import, parent, local)
        }
        let t = table();
        assert_eq!(import(Some("ProcessOfferings"), "Process"), "ProcessSummary");
        assert_eq!(import(Some("Capabilities"), "ProcessOfferings"), "Contents");
        assert_eq!(t.rename(Direction::Import, None, "ProcessDescriptions"), "ProcessOfferings");
        assert_eq!(
            t.rename(Direction::Import, Some("ProcessDescriptions"), "ProcessDescription"),
            "ProcessOffering"
        );
        // The export-side parent name does not key the import table.
        assert_eq!(t.rename(Direction::Import, Some("Contents"), "Process"), "Process");
    }

    #[test]
    fn test_unmapped_names_pass_through() {
        let t = table();
        for direction in [Direction::Export, Direction::Import] {
            let unmapped = "ServiceIdentification";
            assert_eq!(t.rename(direction, Some("Capabilities"), unmapped), unmapped);
            assert_eq!(t.rename(direction, None, "Identifier"), "Identifier");
        }
    }

    #[test]
    fn test_translate_element_maps_namespace() {
        let t = table();
        let exported = t.translate_element(
            Direction::Export,
            Some("Capabilities"),
            &QName::new(WPS_2_0, "Contents"),
        );
        assert_eq!(exported, QName::new(WPS_1_0, "ProcessOfferings"));

        let imported = t.translate_element(Direction::Import, None, &QName::new(OWS_1_1, "Title"));
        assert_eq!(imported, QName::new(OWS_2_0, "Title"));
    }

    #[test]
    fn test_unqualified_ambiguous_name_gets_current_namespace() {
        let t = table();
        let imported = t.translate_element(
            Direction::Import,
            Some("DefaultValue"),
            &QName::local("LiteralData"),
        );
        assert_eq!(imported, QName::new(WPS_2_0, "LiteralData"));

        let renamed_then_forced =
            t.translate_element(Direction::Import, Some("Output"), &QName::local("LiteralOutput"));
        assert_eq!(renamed_then_forced, QName::new(WPS_2_0, "LiteralData"));

        let untouched = t.translate_element(Direction::Import, None, &QName::local("DataInputs"));
        assert_eq!(untouched, QName::local("DataInputs"));

        // Export never forces a namespace.
        let exported = t.translate_element(Direction::Export, None, &QName::local("Format"));
        assert_eq!(exported, QName::local("Format"));
    }

    #[test]
    fn test_attribute_keeps_local_name() {
        let t = table();
        let attr = t.translate_attribute(Direction::Export, &QName::new(WPS_2_0, "processVersion"));
        assert_eq!(attr, QName::new(WPS_1_0, "processVersion"));
        let plain = t.translate_attribute(Direction::Import, &QName::local("supportedCRS"));
        assert_eq!(plain, QName::local("supportedCRS"));
    }

    #[test]
    fn test_disambiguation_set() {
        let t = table();
        assert!(t.is_ambiguous("ComplexData"));
        assert!(t.is_ambiguous("Format"));
        assert!(!t.is_ambiguous("Identifier"));
    }

    #[test]
    fn test_conflicting_rules_rejected() {
        let mut set = RuleSet::wps();
        set.rules.push(TranslationRule::global("Result", "Response"));
        assert!(matches!(
            TranslationTable::from_rules(&set),
            Err(Error::Conflict {
                direction: Direction::Export,
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_rule_is_tolerated() {
        let mut set = RuleSet::wps();
        set.rules.push(TranslationRule::global("Result", "ExecuteResponse"));
        assert!(TranslationTable::from_rules(&set).is_ok());
    }
}
