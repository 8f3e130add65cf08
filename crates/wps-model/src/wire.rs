//! Shared shaping helpers for the record codecs

use crate::{Error, Result};
use wps_ir::{Element, QName, Version};
use wps_translation::namespace::{OWS_2_0, WPS_2_0};

pub(crate) const XLINK: &str = "http://www.w3.org/1999/xlink";

pub(crate) fn wps(local: &str) -> QName {
    QName::new(WPS_2_0, local)
}

pub(crate) fn ows(local: &str) -> QName {
    QName::new(OWS_2_0, local)
}

/// Name of an element inside a process description body. The legacy schema
/// leaves these unqualified.
pub(crate) fn body(version: Version, local: &str) -> QName {
    match version {
        Version::Legacy => QName::local(local),
        Version::Current => wps(local),
    }
}

/// Root element carrying the service identification attributes and the
/// canonical namespace declarations
pub(crate) fn root(version: Version, local: &str) -> Element {
    let mut root = Element::new(wps(local));
    root.declare_namespace(Some("wps"), WPS_2_0)
        .declare_namespace(Some("ows"), OWS_2_0)
        .set_attribute(QName::local("service"), "WPS")
        .set_attribute(QName::local("version"), version.wire_version());
    root
}

pub(crate) fn text_child(parent: &mut Element, name: QName, text: &str) {
    parent.add_child(Element::with_text(name, text));
}

/// Identifier, title and abstract children in the order each vocabulary
/// expects them
pub(crate) fn identify(
    parent: &mut Element,
    version: Version,
    identifier: &str,
    title: &str,
    abstract_text: Option<&str>,
) {
    match version {
        Version::Legacy => {
            text_child(parent, ows("Identifier"), identifier);
            text_child(parent, ows("Title"), title);
            parent.add_text_child(ows("Abstract"), abstract_text);
        }
        Version::Current => {
            text_child(parent, ows("Title"), title);
            parent.add_text_child(ows("Abstract"), abstract_text);
            text_child(parent, ows("Identifier"), identifier);
        }
    }
}

/// `processVersion` is a qualified attribute in the legacy schema
pub(crate) fn process_version_attribute(version: Version) -> QName {
    match version {
        Version::Legacy => wps("processVersion"),
        Version::Current => QName::local("processVersion"),
    }
}

pub(crate) fn required_child<'a>(element: &'a Element, local: &str) -> Result<&'a Element> {
    element
        .find_child(local)
        .ok_or_else(|| Error::missing_element(&element.name.local, local))
}

pub(crate) fn required_text(element: &Element, local: &str) -> Result<String> {
    required_child(element, local)?
        .text()
        .map(str::to_string)
        .ok_or_else(|| Error::missing_element(&element.name.local, local))
}

pub(crate) fn optional_text(element: &Element, local: &str) -> Option<String> {
    element.child_text(local).map(str::to_string)
}

pub(crate) fn required_attribute(element: &Element, local: &str) -> Result<String> {
    element
        .attribute(local)
        .map(str::to_string)
        .ok_or_else(|| Error::missing_attribute(&element.name.local, local))
}

/// Space separated attribute list, as `jobControlOptions` uses
pub(crate) fn attribute_list(element: &Element, local: &str) -> Option<Vec<String>> {
    element
        .attribute(local)
        .map(|v| v.split_whitespace().map(str::to_string).collect())
}

pub(crate) fn parse_bool(field: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(Error::invalid_value(field, other, "expected a boolean")),
    }
}

pub(crate) fn parse_occurs(field: &str, value: Option<&str>, default: u32) -> Result<u32> {
    match value.map(str::trim) {
        None => Ok(default),
        Some("unbounded") => Ok(u32::MAX),
        Some(v) => v
            .parse()
            .map_err(|_| Error::invalid_value(field, v, "expected a count or 'unbounded'")),
    }
}

pub(crate) fn format_occurs(value: u32) -> String {
    if value == u32::MAX {
        "unbounded".to_string()
    } else {
        value.to_string()
    }
}

/// Check that `element` is the expected root for `record`
pub(crate) fn expect_name(element: &Element, local: &str) -> Result<()> {
    if element.name.local == local {
        Ok(())
    } else {
        Err(Error::UnexpectedRoot {
            found: element.name.local.clone(),
        })
    }
}
