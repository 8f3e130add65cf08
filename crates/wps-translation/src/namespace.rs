//! Namespace substitution between the two schema generations

use crate::rules::NamespacePair;
use crate::table::Direction;
use std::collections::HashMap;

/// OWS common namespace used by WPS 1.0.0
pub const OWS_1_1: &str = "http://www.opengis.net/ows/1.1";
/// OWS common namespace used by WPS 2.0
pub const OWS_2_0: &str = "http://www.opengis.net/ows/2.0";
/// WPS 1.0.0 service namespace
pub const WPS_1_0: &str = "http://www.opengis.net/wps/1.0.0";
/// WPS 2.0 service namespace
pub const WPS_2_0: &str = "http://www.opengis.net/wps/2.0";

/// Total URI → URI map with identity default, in both directions
#[derive(Debug, Clone, Default)]
pub struct NamespaceMap {
    export: HashMap<String, String>,
    import: HashMap<String, String>,
}

impl NamespaceMap {
    /// Build the map from current/legacy pairs
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = &'a NamespacePair>) -> Self {
        let mut map = Self::default();
        for pair in pairs {
            map.export.insert(pair.current.clone(), pair.legacy.clone());
            map.import.insert(pair.legacy.clone(), pair.current.clone());
        }
        map
    }

    /// Substitute `uri` for the given direction; unknown URIs are returned as-is
    pub fn map<'a>(&'a self, direction: Direction, uri: &'a str) -> &'a str {
        let table = match direction {
            Direction::Export => &self.export,
            Direction::Import => &self.import,
        };
        table.get(uri).map_or(uri, String::as_str)
    }

    /// Number of substituted namespaces
    pub fn len(&self) -> usize {
        self.export.len()
    }

    pub fn is_empty(&self) -> bool {
        self.export.is_empty()
    }
}
