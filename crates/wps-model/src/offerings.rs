//! Process descriptions
//!
//! The two vocabularies disagree mostly on structure here: the current one
//! puts the description inside a `Process` element and lists inputs and
//! outputs directly, the legacy one wraps them in `DataInputs` and
//! `ProcessOutputs` and spells formats as `Default`/`Supported` groups.

use crate::projection::{CurrentOnly, LegacyOnly, WireCodec};
use crate::proxy::{Proxy, ProxySlot, WrapperProxy};
use crate::wire::{
    attribute_list, body, expect_name, format_occurs, identify, optional_text, ows, parse_bool,
    parse_occurs, process_version_attribute, required_text, root, text_child, wps,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use wps_ir::{Element, QName, Version};

/// Root list of full process descriptions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOfferings {
    pub offerings: Vec<ProcessOffering>,
}

/// Full description of one process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOffering {
    pub identifier: String,
    pub title: String,
    pub abstract_text: Option<String>,
    pub process_version: Option<String>,
    pub inputs: Vec<InputDescription>,
    pub outputs: Vec<OutputDescription>,
    pub store_supported: LegacyOnly<bool>,
    pub status_supported: LegacyOnly<bool>,
    pub job_control_options: CurrentOnly<Vec<String>>,
    pub output_transmission: CurrentOnly<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDescription {
    pub identifier: String,
    pub title: String,
    pub abstract_text: Option<String>,
    pub min_occurs: u32,
    /// `u32::MAX` stands for `unbounded`
    pub max_occurs: u32,
    pub data: DataDescription,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDescription {
    pub identifier: String,
    pub title: String,
    pub abstract_text: Option<String>,
    pub data: DataDescription,
}

/// What kind of data an input or output carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataDescription {
    Literal(LiteralDescription),
    Complex(ComplexDescription),
    BoundingBox(BoundingBoxDescription),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteralDescription {
    pub data_type: Option<String>,
    /// Empty means any value
    pub allowed_values: Vec<String>,
    pub default_value: Option<String>,
    pub formats: CurrentOnly<Vec<Format>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexDescription {
    pub formats: Vec<Format>,
    pub maximum_megabytes: LegacyOnly<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBoxDescription {
    /// Supported CRS identifiers, default first
    pub supported_crs: Vec<String>,
    pub formats: CurrentOnly<Vec<Format>>,
}

/// A supported data format
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    pub mime_type: String,
    pub encoding: Option<String>,
    pub schema: Option<String>,
    pub default: bool,
}

/// Legacy `DataInputs` wrapper over [`ProcessOffering::inputs`]
pub struct DataInputs;

/// Legacy `ProcessOutputs` wrapper over [`ProcessOffering::outputs`]
pub struct ProcessOutputs;

impl WrapperProxy for DataInputs {
    type Owner = ProcessOffering;
    type Item = InputDescription;
    const WRAPPER: &'static str = "DataInputs";

    fn items(owner: &ProcessOffering) -> &[InputDescription] {
        &owner.inputs
    }

    fn items_mut(owner: &mut ProcessOffering) -> &mut Vec<InputDescription> {
        &mut owner.inputs
    }
}

impl WrapperProxy for ProcessOutputs {
    type Owner = ProcessOffering;
    type Item = OutputDescription;
    const WRAPPER: &'static str = "ProcessOutputs";

    fn items(owner: &ProcessOffering) -> &[OutputDescription] {
        &owner.outputs
    }

    fn items_mut(owner: &mut ProcessOffering) -> &mut Vec<OutputDescription> {
        &mut owner.outputs
    }
}

impl ProcessOffering {
    pub fn new(identifier: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            abstract_text: None,
            process_version: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            store_supported: LegacyOnly::new(),
            status_supported: LegacyOnly::new(),
            job_control_options: CurrentOnly::new(),
            output_transmission: CurrentOnly::new(),
        }
    }

    pub fn with_input(mut self, input: InputDescription) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_output(mut self, output: OutputDescription) -> Self {
        self.outputs.push(output);
        self
    }
}

impl InputDescription {
    pub fn new(
        identifier: impl Into<String>,
        title: impl Into<String>,
        data: DataDescription,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            abstract_text: None,
            min_occurs: 1,
            max_occurs: 1,
            data,
        }
    }

    pub fn occurs(mut self, min: u32, max: u32) -> Self {
        self.min_occurs = min;
        self.max_occurs = max;
        self
    }
}

impl OutputDescription {
    pub fn new(
        identifier: impl Into<String>,
        title: impl Into<String>,
        data: DataDescription,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            abstract_text: None,
            data,
        }
    }
}

impl Format {
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            ..Self::default()
        }
    }

    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }

    /// Same format, ignoring the default flag
    fn same_as(&self, other: &Format) -> bool {
        self.mime_type == other.mime_type
            && self.encoding == other.encoding
            && self.schema == other.schema
    }
}

impl WireCodec for ProcessOfferings {
    const ELEMENT: &'static str = "ProcessOfferings";

    fn encode(&self, version: Version) -> Element {
        let mut element = root(version, Self::ELEMENT);
        for offering in &self.offerings {
            element.add_child(offering.encode(version));
        }
        element
    }

    fn decode(version: Version, element: &Element) -> Result<Self> {
        expect_name(element, Self::ELEMENT)?;
        let offerings = element
            .find_children(ProcessOffering::ELEMENT)
            .map(|child| ProcessOffering::decode(version, child))
            .collect::<Result<Vec<_>>>()?;
        debug!(offerings = offerings.len(), %version, "Decoded process offerings");
        Ok(Self { offerings })
    }
}

impl WireCodec for ProcessOffering {
    const ELEMENT: &'static str = "ProcessOffering";

    fn encode(&self, version: Version) -> Element {
        let mut element = Element::new(body(version, Self::ELEMENT));
        if let Some(process_version) = &self.process_version {
            element.set_attribute(process_version_attribute(version), process_version.as_str());
        }
        if let Some(store) = self.store_supported.get(version) {
            element.set_attribute(QName::local("storeSupported"), store.to_string());
        }
        if let Some(status) = self.status_supported.get(version) {
            element.set_attribute(QName::local("statusSupported"), status.to_string());
        }
        if let Some(options) = self.job_control_options.get(version) {
            element.set_attribute(QName::local("jobControlOptions"), options.join(" "));
        }
        if let Some(modes) = self.output_transmission.get(version) {
            element.set_attribute(QName::local("outputTransmission"), modes.join(" "));
        }

        match version {
            Version::Legacy => {
                identify(
                    &mut element,
                    version,
                    &self.identifier,
                    &self.title,
                    self.abstract_text.as_deref(),
                );
                if !self.inputs.is_empty() {
                    let inputs = Proxy::<DataInputs>::of(self);
                    element.add_child(inputs.encode(version, QName::local(DataInputs::WRAPPER)));
                }
                let outputs = Proxy::<ProcessOutputs>::of(self);
                element.add_child(outputs.encode(version, QName::local(ProcessOutputs::WRAPPER)));
            }
            Version::Current => {
                let mut process = Element::new(wps("Process"));
                identify(
                    &mut process,
                    version,
                    &self.identifier,
                    &self.title,
                    self.abstract_text.as_deref(),
                );
                for input in &self.inputs {
                    process.add_child(input.encode(version));
                }
                for output in &self.outputs {
                    process.add_child(output.encode(version));
                }
                element.add_child(process);
            }
        }
        element
    }

    fn decode(version: Version, element: &Element) -> Result<Self> {
        let description = element.find_child("Process").unwrap_or(element);

        let mut offering = ProcessOffering::new(
            required_text(description, "Identifier")?,
            required_text(description, "Title")?,
        );
        offering.abstract_text = optional_text(description, "Abstract");
        offering.process_version = element.attribute("processVersion").map(str::to_string);
        offering.store_supported.set_opt(
            element
                .attribute("storeSupported")
                .map(|v| parse_bool("storeSupported", v))
                .transpose()?,
        );
        offering.status_supported.set_opt(
            element
                .attribute("statusSupported")
                .map(|v| parse_bool("statusSupported", v))
                .transpose()?,
        );
        offering
            .job_control_options
            .set_opt(attribute_list(element, "jobControlOptions"));
        offering
            .output_transmission
            .set_opt(attribute_list(element, "outputTransmission"));

        {
            let inputs = description.find_child(DataInputs::WRAPPER).unwrap_or(description);
            let mut slot = ProxySlot::<DataInputs>::unbound();
            slot.bind(&mut offering)?;
            slot.decode(version, inputs)?;
        }
        {
            let outputs = description
                .find_child(ProcessOutputs::WRAPPER)
                .unwrap_or(description);
            let mut slot = ProxySlot::<ProcessOutputs>::unbound();
            slot.bind(&mut offering)?;
            slot.decode(version, outputs)?;
        }
        Ok(offering)
    }
}

impl WireCodec for InputDescription {
    const ELEMENT: &'static str = "Input";

    fn encode(&self, version: Version) -> Element {
        let mut element = Element::new(body(version, Self::ELEMENT));
        element
            .set_attribute(QName::local("minOccurs"), self.min_occurs.to_string())
            .set_attribute(QName::local("maxOccurs"), format_occurs(self.max_occurs));
        identify(
            &mut element,
            version,
            &self.identifier,
            &self.title,
            self.abstract_text.as_deref(),
        );
        element.add_child(self.data.encode(version));
        element
    }

    fn decode(version: Version, element: &Element) -> Result<Self> {
        Ok(Self {
            identifier: required_text(element, "Identifier")?,
            title: required_text(element, "Title")?,
            abstract_text: optional_text(element, "Abstract"),
            min_occurs: parse_occurs("minOccurs", element.attribute("minOccurs"), 1)?,
            max_occurs: parse_occurs("maxOccurs", element.attribute("maxOccurs"), 1)?,
            data: DataDescription::decode_within(version, element)?,
        })
    }
}

impl WireCodec for OutputDescription {
    const ELEMENT: &'static str = "Output";

    fn encode(&self, version: Version) -> Element {
        let mut element = Element::new(body(version, Self::ELEMENT));
        identify(
            &mut element,
            version,
            &self.identifier,
            &self.title,
            self.abstract_text.as_deref(),
        );
        element.add_child(self.data.encode(version));
        element
    }

    fn decode(version: Version, element: &Element) -> Result<Self> {
        Ok(Self {
            identifier: required_text(element, "Identifier")?,
            title: required_text(element, "Title")?,
            abstract_text: optional_text(element, "Abstract"),
            data: DataDescription::decode_within(version, element)?,
        })
    }
}

impl DataDescription {
    const NAMES: [&'static str; 3] = ["LiteralData", "ComplexData", "BoundingBoxData"];

    /// Canonical element name
    pub fn element_name(&self) -> &'static str {
        match self {
            Self::Literal(_) => Self::NAMES[0],
            Self::Complex(_) => Self::NAMES[1],
            Self::BoundingBox(_) => Self::NAMES[2],
        }
    }

    pub fn encode(&self, version: Version) -> Element {
        let mut element = Element::new(body(version, self.element_name()));
        match self {
            Self::Literal(literal) => encode_literal(&mut element, version, literal),
            Self::Complex(complex) => {
                if let Some(limit) = complex.maximum_megabytes.get(version) {
                    element.set_attribute(QName::local("maximumMegabytes"), limit.to_string());
                }
                encode_formats(&mut element, version, &complex.formats);
            }
            Self::BoundingBox(bbox) => {
                if let Some(formats) = bbox.formats.get(version) {
                    encode_formats(&mut element, version, formats);
                }
                encode_crs(&mut element, version, &bbox.supported_crs);
            }
        }
        element
    }

    /// Decode the data description child of an input or output
    pub fn decode_within(version: Version, parent: &Element) -> Result<Self> {
        let element = parent
            .children
            .iter()
            .find(|c| Self::NAMES.contains(&c.name.local.as_str()))
            .ok_or_else(|| Error::missing_element(&parent.name.local, Self::NAMES.join("|")))?;

        match element.name.local.as_str() {
            "LiteralData" => Ok(Self::Literal(decode_literal(version, element)?)),
            "ComplexData" => {
                let mut complex = ComplexDescription {
                    formats: decode_formats(version, element)?,
                    ..ComplexDescription::default()
                };
                complex.maximum_megabytes.set_opt(
                    element
                        .attribute("maximumMegabytes")
                        .map(|v| {
                            v.trim().parse().map_err(|_| {
                                Error::invalid_value("maximumMegabytes", v, "expected a count")
                            })
                        })
                        .transpose()?,
                );
                Ok(Self::Complex(complex))
            }
            _ => {
                let mut bbox = BoundingBoxDescription {
                    supported_crs: decode_crs(element),
                    ..BoundingBoxDescription::default()
                };
                if element.find_child("Supported").is_none() {
                    let formats = decode_formats(version, element)?;
                    if !formats.is_empty() {
                        bbox.formats.set(formats);
                    }
                }
                Ok(Self::BoundingBox(bbox))
            }
        }
    }
}

impl WireCodec for Format {
    const ELEMENT: &'static str = "Format";

    fn encode(&self, version: Version) -> Element {
        let mut element = Element::new(body(version, Self::ELEMENT));
        match version {
            Version::Legacy => {
                text_child(&mut element, QName::local("MimeType"), &self.mime_type);
                element.add_text_child(QName::local("Encoding"), self.encoding.as_deref());
                element.add_text_child(QName::local("Schema"), self.schema.as_deref());
            }
            Version::Current => {
                element.set_attribute(QName::local("mimeType"), self.mime_type.as_str());
                if let Some(encoding) = &self.encoding {
                    element.set_attribute(QName::local("encoding"), encoding.as_str());
                }
                if let Some(schema) = &self.schema {
                    element.set_attribute(QName::local("schema"), schema.as_str());
                }
                if self.default {
                    element.set_attribute(QName::local("default"), "true");
                }
            }
        }
        element
    }

    fn decode(_version: Version, element: &Element) -> Result<Self> {
        let mime_type = element
            .attribute("mimeType")
            .map(str::to_string)
            .or_else(|| optional_text(element, "MimeType"))
            .ok_or_else(|| Error::missing_attribute("Format", "mimeType"))?;
        Ok(Self {
            mime_type,
            encoding: element
                .attribute("encoding")
                .map(str::to_string)
                .or_else(|| optional_text(element, "Encoding")),
            schema: element
                .attribute("schema")
                .map(str::to_string)
                .or_else(|| optional_text(element, "Schema")),
            default: element
                .attribute("default")
                .map(|v| parse_bool("default", v))
                .transpose()?
                .unwrap_or(false),
        })
    }
}

fn encode_literal(element: &mut Element, version: Version, literal: &LiteralDescription) {
    if version == Version::Legacy {
        element.add_text_child(ows("DataType"), literal.data_type.as_deref());
        encode_allowed_values(element, &literal.allowed_values);
        element.add_text_child(QName::local("DefaultValue"), literal.default_value.as_deref());
        return;
    }

    let mut domain = Element::new(QName::local("LiteralDataDomain"));
    if let Some(formats) = literal.formats.get(version) {
        encode_formats(element, version, formats);
    }
    domain.set_attribute(QName::local("default"), "true");
    encode_allowed_values(&mut domain, &literal.allowed_values);
    domain.add_text_child(ows("DataType"), literal.data_type.as_deref());
    domain.add_text_child(ows("DefaultValue"), literal.default_value.as_deref());
    element.add_child(domain);
}

fn encode_allowed_values(element: &mut Element, values: &[String]) {
    if values.is_empty() {
        element.add_child(Element::new(ows("AnyValue")));
        return;
    }
    let mut allowed = Element::new(ows("AllowedValues"));
    for value in values {
        text_child(&mut allowed, ows("Value"), value);
    }
    element.add_child(allowed);
}

fn decode_literal(version: Version, element: &Element) -> Result<LiteralDescription> {
    let domain = element.find_child("LiteralDataDomain").unwrap_or(element);
    let mut literal = LiteralDescription {
        data_type: optional_text(domain, "DataType"),
        allowed_values: domain
            .find_child("AllowedValues")
            .map(|allowed| {
                allowed
                    .find_children("Value")
                    .filter_map(Element::text)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        default_value: optional_text(domain, "DefaultValue"),
        formats: CurrentOnly::new(),
    };
    let formats = decode_formats(version, element)?;
    if !formats.is_empty() {
        literal.formats.set(formats);
    }
    Ok(literal)
}

/// Current: flat `Format` children with a `default` flag. Legacy: one
/// format under `Default`, all of them under `Supported`.
fn encode_formats(element: &mut Element, version: Version, formats: &[Format]) {
    match version {
        Version::Current => {
            for format in formats {
                element.add_child(format.encode(version));
            }
        }
        Version::Legacy => {
            let Some(default) = formats.iter().find(|f| f.default).or(formats.first()) else {
                return;
            };
            let mut default_group = Element::new(QName::local("Default"));
            default_group.add_child(default.encode(version));
            let mut supported = Element::new(QName::local("Supported"));
            for format in formats {
                supported.add_child(format.encode(version));
            }
            element.add_child(default_group).add_child(supported);
        }
    }
}

fn decode_formats(version: Version, element: &Element) -> Result<Vec<Format>> {
    let Some(supported) = element.find_child("Supported") else {
        return element
            .find_children(Format::ELEMENT)
            .map(|f| Format::decode(version, f))
            .collect();
    };

    let default = element
        .find_child("Default")
        .and_then(|d| d.find_child(Format::ELEMENT))
        .map(|f| Format::decode(version, f))
        .transpose()?;
    let mut formats = supported
        .find_children(Format::ELEMENT)
        .map(|f| Format::decode(version, f))
        .collect::<Result<Vec<_>>>()?;

    if let Some(default) = default {
        match formats.iter_mut().find(|f| f.same_as(&default)) {
            Some(format) => format.default = true,
            None => formats.insert(0, default.as_default()),
        }
    }
    Ok(formats)
}

fn encode_crs(element: &mut Element, version: Version, crs: &[String]) {
    match version {
        Version::Current => {
            for (index, name) in crs.iter().enumerate() {
                let mut child = Element::with_text(wps("supportedCRS"), name.as_str());
                if index == 0 {
                    child.set_attribute(QName::local("default"), "true");
                }
                element.add_child(child);
            }
        }
        Version::Legacy => {
            let Some(first) = crs.first() else {
                return;
            };
            let mut default = Element::new(QName::local("Default"));
            text_child(&mut default, QName::local("supportedCRS"), first);
            let mut supported = Element::new(QName::local("Supported"));
            for name in crs {
                text_child(&mut supported, QName::local("supportedCRS"), name);
            }
            element.add_child(default).add_child(supported);
        }
    }
}

fn decode_crs(element: &Element) -> Vec<String> {
    let (default, listed): (Option<&str>, Vec<&str>) = match element.find_child("Supported") {
        Some(supported) => (
            element
                .find_child("Default")
                .and_then(|d| d.child_text("supportedCRS")),
            supported
                .find_children("supportedCRS")
                .filter_map(Element::text)
                .collect(),
        ),
        None => {
            let all: Vec<&Element> = element.find_children("supportedCRS").collect();
            (
                all.iter()
                    .find(|c| c.attribute("default") == Some("true"))
                    .and_then(|c| c.text()),
                all.iter().filter_map(|c| c.text()).collect(),
            )
        }
    };

    let mut crs: Vec<String> = default.map(str::to_string).into_iter().collect();
    for name in listed {
        if !crs.iter().any(|c| c == name) {
            crs.push(name.to_string());
        }
    }
    crs
}
