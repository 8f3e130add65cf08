//! Execution results
//!
//! `Result` in the current vocabulary, `ExecuteResponse` on the legacy wire.
//! The legacy form nests outputs in a `ProcessOutputs` wrapper and names
//! each output with an `ows:Identifier` child instead of an `id` attribute.

use crate::projection::{CurrentOnly, LegacyOnly, WireCodec};
use crate::proxy::{Proxy, ProxySlot, WrapperProxy};
use crate::wire::{
    XLINK, expect_name, optional_text, ows, required_attribute, root, text_child, wps,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use wps_ir::{Element, QName, Version};
use wps_translation::namespace::{OWS_2_0, WPS_2_0};

/// Outcome of a process execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteResult {
    pub job_id: CurrentOnly<String>,
    pub status_location: LegacyOnly<String>,
    /// Identifier of the executed process, echoed by the legacy response
    pub process: LegacyOnly<String>,
    pub outputs: Vec<OutputData>,
}

/// One produced output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputData {
    pub identifier: String,
    pub title: LegacyOnly<String>,
    pub value: DataValue,
}

/// Output payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataValue {
    Literal {
        value: String,
        data_type: Option<String>,
    },
    /// Inline complex data, textual content only
    Complex {
        mime_type: Option<String>,
        content: String,
    },
    Reference {
        href: String,
        mime_type: Option<String>,
    },
    BoundingBox {
        crs: Option<String>,
        lower: String,
        upper: String,
    },
}

/// Legacy `ProcessOutputs` wrapper over [`ExecuteResult::outputs`]
pub struct ResultOutputs;

impl WrapperProxy for ResultOutputs {
    type Owner = ExecuteResult;
    type Item = OutputData;
    const WRAPPER: &'static str = "ProcessOutputs";

    fn items(owner: &ExecuteResult) -> &[OutputData] {
        &owner.outputs
    }

    fn items_mut(owner: &mut ExecuteResult) -> &mut Vec<OutputData> {
        &mut owner.outputs
    }
}

impl ExecuteResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, output: OutputData) -> Self {
        self.outputs.push(output);
        self
    }

    /// Find an output by identifier
    pub fn output(&self, identifier: &str) -> Option<&OutputData> {
        self.outputs.iter().find(|o| o.identifier == identifier)
    }
}

impl OutputData {
    pub fn new(identifier: impl Into<String>, value: DataValue) -> Self {
        Self {
            identifier: identifier.into(),
            title: LegacyOnly::new(),
            value,
        }
    }

    pub fn literal(identifier: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            identifier,
            DataValue::Literal {
                value: value.into(),
                data_type: None,
            },
        )
    }
}

impl WireCodec for ExecuteResult {
    const ELEMENT: &'static str = "Result";

    fn encode(&self, version: Version) -> Element {
        match version {
            Version::Legacy => {
                let mut element = root(version, Self::ELEMENT);
                if let Some(location) = self.status_location.get(version) {
                    element.set_attribute(QName::local("statusLocation"), location.as_str());
                }
                if let Some(process) = self.process.get(version) {
                    let mut reference = Element::new(wps("Process"));
                    text_child(&mut reference, ows("Identifier"), process);
                    element.add_child(reference);
                }
                let outputs = Proxy::<ResultOutputs>::of(self);
                element.add_child(outputs.encode(version, wps(ResultOutputs::WRAPPER)));
                element
            }
            Version::Current => {
                // The current result root carries no service/version attributes.
                let mut element = Element::new(wps(Self::ELEMENT));
                element
                    .declare_namespace(Some("wps"), WPS_2_0)
                    .declare_namespace(Some("ows"), OWS_2_0)
                    .declare_namespace(Some("xlink"), XLINK);
                element.add_text_child(wps("JobID"), self.job_id.get(version).map(String::as_str));
                for output in &self.outputs {
                    element.add_child(output.encode(version));
                }
                element
            }
        }
    }

    fn decode(version: Version, element: &Element) -> Result<Self> {
        expect_name(element, Self::ELEMENT)?;

        let mut result = ExecuteResult::new();
        result.job_id.set_opt(optional_text(element, "JobID"));
        result
            .status_location
            .set_opt(element.attribute("statusLocation").map(str::to_string));
        result.process.set_opt(
            element
                .find_child("Process")
                .and_then(|p| p.child_text("Identifier"))
                .map(str::to_string),
        );

        let outputs = element.find_child(ResultOutputs::WRAPPER).unwrap_or(element);
        let mut slot = ProxySlot::<ResultOutputs>::unbound();
        slot.bind(&mut result)?;
        let count = slot.decode(version, outputs)?;
        debug!(outputs = count, %version, "Decoded execute result");
        Ok(result)
    }
}

impl WireCodec for OutputData {
    const ELEMENT: &'static str = "Output";

    fn encode(&self, version: Version) -> Element {
        let mut element = Element::new(wps(Self::ELEMENT));
        match version {
            Version::Legacy => {
                text_child(&mut element, ows("Identifier"), &self.identifier);
                element.add_text_child(ows("Title"), self.title.get(version).map(String::as_str));
            }
            Version::Current => {
                element.set_attribute(QName::local("id"), self.identifier.as_str());
            }
        }
        element.add_child(self.value.encode(version));
        element
    }

    fn decode(version: Version, element: &Element) -> Result<Self> {
        let identifier = element
            .attribute("id")
            .map(str::to_string)
            .or_else(|| optional_text(element, "Identifier"))
            .ok_or_else(|| Error::missing_attribute("Output", "id"))?;
        let mut output = OutputData::new(identifier, DataValue::decode_within(version, element)?);
        output.title.set_opt(optional_text(element, "Title"));
        Ok(output)
    }
}

impl DataValue {
    pub fn encode(&self, version: Version) -> Element {
        match self {
            Self::Reference { href, mime_type } => {
                let mut element = Element::new(wps("Reference"));
                let href_name = match version {
                    Version::Legacy => QName::local("href"),
                    Version::Current => QName::new(XLINK, "href"),
                };
                element.set_attribute(href_name, href.as_str());
                if let Some(mime_type) = mime_type {
                    element.set_attribute(QName::local("mimeType"), mime_type.as_str());
                }
                element
            }
            Self::Literal { value, data_type } => {
                let mut literal = Element::with_text(wps("LiteralValue"), value.as_str());
                if let Some(data_type) = data_type {
                    literal.set_attribute(QName::local("dataType"), data_type.as_str());
                }
                let mut data = Element::new(wps("Data"));
                data.add_child(literal);
                data
            }
            Self::Complex { mime_type, content } => match version {
                Version::Legacy => {
                    let mut complex = Element::with_text(wps("ComplexData"), content.as_str());
                    if let Some(mime_type) = mime_type {
                        complex.set_attribute(QName::local("mimeType"), mime_type.as_str());
                    }
                    let mut data = Element::new(wps("Data"));
                    data.add_child(complex);
                    data
                }
                Version::Current => {
                    let mut data = Element::with_text(wps("Data"), content.as_str());
                    if let Some(mime_type) = mime_type {
                        data.set_attribute(QName::local("mimeType"), mime_type.as_str());
                    }
                    data
                }
            },
            Self::BoundingBox { crs, lower, upper } => {
                let mut bbox = Element::new(wps("BoundingBox"));
                if let Some(crs) = crs {
                    bbox.set_attribute(QName::local("crs"), crs.as_str());
                }
                text_child(&mut bbox, ows("LowerCorner"), lower);
                text_child(&mut bbox, ows("UpperCorner"), upper);
                let mut data = Element::new(wps("Data"));
                data.add_child(bbox);
                data
            }
        }
    }

    /// Decode the payload child of an output
    pub fn decode_within(_version: Version, output: &Element) -> Result<Self> {
        if let Some(reference) = output.find_child("Reference") {
            return Ok(Self::Reference {
                href: required_attribute(reference, "href")?,
                mime_type: reference.attribute("mimeType").map(str::to_string),
            });
        }

        let data = output
            .find_child("Data")
            .ok_or_else(|| Error::missing_element("Output", "Data"))?;

        if let Some(literal) = data.find_child("LiteralValue") {
            return Ok(Self::Literal {
                value: literal.text().unwrap_or_default().to_string(),
                data_type: literal.attribute("dataType").map(str::to_string),
            });
        }
        if let Some(bbox) = data.find_child("BoundingBox") {
            return Ok(Self::BoundingBox {
                crs: bbox.attribute("crs").map(str::to_string),
                lower: optional_text(bbox, "LowerCorner").unwrap_or_default(),
                upper: optional_text(bbox, "UpperCorner").unwrap_or_default(),
            });
        }
        let complex = data.find_child("ComplexData").unwrap_or(data);
        Ok(Self::Complex {
            mime_type: complex.attribute("mimeType").map(str::to_string),
            content: complex.text.clone().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExecuteResult {
        let mut result = ExecuteResult::new()
            .with_output(OutputData::new(
                "area",
                DataValue::Literal {
                    value: "12.5".to_string(),
                    data_type: Some("xs:double".to_string()),
                },
            ))
            .with_output(OutputData::new(
                "shape",
                DataValue::Reference {
                    href: "http://example.org/out/1.gml".to_string(),
                    mime_type: Some("application/gml+xml".to_string()),
                },
            ));
        result.job_id.set("job-7".to_string());
        result.status_location.set("http://example.org/status/7".to_string());
        result.process.set("buffer".to_string());
        result
    }

    #[test]
    fn test_current_result_shape() {
        let element = sample().encode(Version::Current);
        assert_eq!(element.name, wps("Result"));
        assert_eq!(element.attribute("version"), None);
        assert_eq!(element.child_text("JobID"), Some("job-7"));
        assert_eq!(element.attribute("statusLocation"), None);
        assert!(element.find_child("ProcessOutputs").is_none());

        let output = &element.children[1];
        assert_eq!(output.attribute("id"), Some("area"));
        assert!(output.find_child("Identifier").is_none());

        let reference = element.children[2].find_child("Reference").unwrap();
        assert_eq!(reference.attributes[0].name, QName::new(XLINK, "href"));
    }

    #[test]
    fn test_legacy_result_shape() {
        let element = sample().encode(Version::Legacy);
        assert_eq!(element.attribute("version"), Some("1.0.0"));
        assert_eq!(element.attribute("statusLocation"), Some("http://example.org/status/7"));
        assert!(element.find_child("JobID").is_none());

        let outputs = element.find_child("ProcessOutputs").unwrap();
        let first = &outputs.children[0];
        assert_eq!(first.attribute("id"), None);
        assert_eq!(first.child_text("Identifier"), Some("area"));
        let data = first.find_child("Data").unwrap();
        assert_eq!(data.find_child("LiteralValue").unwrap().text(), Some("12.5"));
    }

    #[test]
    fn test_round_trip_keeps_version_specific_fields() {
        let original = sample();

        let current = ExecuteResult::decode(Version::Current, &original.encode(Version::Current));
        let current = current.unwrap();
        assert_eq!(current.outputs, original.outputs);
        assert_eq!(current.job_id.get(Version::Current).map(String::as_str), Some("job-7"));
        assert_eq!(current.status_location.stored(), None);

        let legacy = ExecuteResult::decode(Version::Legacy, &original.encode(Version::Legacy));
        let legacy = legacy.unwrap();
        assert_eq!(legacy.outputs, original.outputs);
        assert_eq!(legacy.process.stored().map(String::as_str), Some("buffer"));
        assert_eq!(legacy.job_id.stored(), None);
    }

    #[test]
    fn test_complex_payload_placement() {
        let value = DataValue::Complex {
            mime_type: Some("application/json".to_string()),
            content: "{\"type\":\"Point\"}".to_string(),
        };
        let current = value.encode(Version::Current);
        assert_eq!(current.attribute("mimeType"), Some("application/json"));

        let legacy = value.encode(Version::Legacy);
        assert!(legacy.attribute("mimeType").is_none());
        assert_eq!(
            legacy.find_child("ComplexData").unwrap().attribute("mimeType"),
            Some("application/json")
        );

        let mut output = Element::new(wps("Output"));
        output.add_child(legacy);
        assert_eq!(DataValue::decode_within(Version::Legacy, &output).unwrap(), value);
    }

    #[test]
    fn test_output_without_identifier() {
        let mut output = Element::new(wps("Output"));
        output.add_child(Element::with_text(wps("Data"), "x"));
        assert!(matches!(
            OutputData::decode(Version::Current, &output),
            Err(Error::MissingAttribute { .. })
        ));
    }
}
