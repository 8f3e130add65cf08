//! Capabilities document

use crate::projection::{CurrentOnly, LegacyOnly, WireCodec};
use crate::proxy::{Proxy, ProxySlot, WrapperProxy};
use crate::wire::{
    attribute_list, expect_name, identify, optional_text, ows, process_version_attribute,
    required_child, required_text, root, text_child, wps,
};
use crate::Result;
use serde::{Deserialize, Serialize};
use wps_ir::{Element, QName, Version};

/// Service metadata and the list of offered processes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub title: String,
    pub abstract_text: Option<String>,
    pub processes: Vec<ProcessSummary>,

    /// Supported languages, default first
    pub languages: LegacyOnly<Vec<String>>,
    pub update_sequence: LegacyOnly<String>,
}

/// Brief description of an offered process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSummary {
    pub identifier: String,
    pub title: String,
    pub abstract_text: Option<String>,
    pub process_version: Option<String>,
    pub job_control_options: CurrentOnly<Vec<String>>,
    pub output_transmission: CurrentOnly<Vec<String>>,
}

/// The process list wrapper (`Contents`, `ProcessOfferings` on the legacy wire)
pub struct Contents;

impl WrapperProxy for Contents {
    type Owner = Capabilities;
    type Item = ProcessSummary;
    const WRAPPER: &'static str = "Contents";

    fn items(owner: &Capabilities) -> &[ProcessSummary] {
        &owner.processes
    }

    fn items_mut(owner: &mut Capabilities) -> &mut Vec<ProcessSummary> {
        &mut owner.processes
    }
}

impl Capabilities {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            abstract_text: None,
            processes: Vec::new(),
            languages: LegacyOnly::new(),
            update_sequence: LegacyOnly::new(),
        }
    }

    pub fn with_process(mut self, process: ProcessSummary) -> Self {
        self.processes.push(process);
        self
    }

    /// Find an offered process by identifier
    pub fn process(&self, identifier: &str) -> Option<&ProcessSummary> {
        self.processes.iter().find(|p| p.identifier == identifier)
    }
}

impl ProcessSummary {
    pub fn new(identifier: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            abstract_text: None,
            process_version: None,
            job_control_options: CurrentOnly::new(),
            output_transmission: CurrentOnly::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.process_version = Some(version.into());
        self
    }
}

impl WireCodec for Capabilities {
    const ELEMENT: &'static str = "Capabilities";

    fn encode(&self, version: Version) -> Element {
        let mut element = root(version, Self::ELEMENT);
        if let Some(sequence) = self.update_sequence.get(version) {
            element.set_attribute(QName::local("updateSequence"), sequence.as_str());
        }

        let mut identification = Element::new(ows("ServiceIdentification"));
        text_child(&mut identification, ows("Title"), &self.title);
        identification.add_text_child(ows("Abstract"), self.abstract_text.as_deref());
        text_child(&mut identification, ows("ServiceType"), "WPS");
        text_child(&mut identification, ows("ServiceTypeVersion"), version.wire_version());
        element.add_child(identification);

        element.add_child(Proxy::<Contents>::of(self).encode(version, wps(Contents::WRAPPER)));

        if let Some(languages) = self.languages.get(version).filter(|l| !l.is_empty()) {
            element.add_child(encode_languages(languages));
        }
        element
    }

    fn decode(version: Version, element: &Element) -> Result<Self> {
        expect_name(element, Self::ELEMENT)?;
        let identification = required_child(element, "ServiceIdentification")?;

        let mut capabilities = Capabilities::new(required_text(identification, "Title")?);
        capabilities.abstract_text = optional_text(identification, "Abstract");
        capabilities
            .update_sequence
            .set_opt(element.attribute("updateSequence").map(str::to_string));
        capabilities
            .languages
            .set_opt(element.find_child("Languages").map(decode_languages));

        if let Some(contents) = element.find_child(Contents::WRAPPER) {
            let mut slot = ProxySlot::<Contents>::unbound();
            slot.bind(&mut capabilities)?;
            slot.decode(version, contents)?;
        }
        Ok(capabilities)
    }
}

impl WireCodec for ProcessSummary {
    const ELEMENT: &'static str = "ProcessSummary";

    fn encode(&self, version: Version) -> Element {
        let mut element = Element::new(wps(Self::ELEMENT));
        if let Some(process_version) = &self.process_version {
            element.set_attribute(process_version_attribute(version), process_version.as_str());
        }
        if let Some(options) = self.job_control_options.get(version) {
            element.set_attribute(QName::local("jobControlOptions"), options.join(" "));
        }
        if let Some(modes) = self.output_transmission.get(version) {
            element.set_attribute(QName::local("outputTransmission"), modes.join(" "));
        }
        identify(
            &mut element,
            version,
            &self.identifier,
            &self.title,
            self.abstract_text.as_deref(),
        );
        element
    }

    fn decode(_version: Version, element: &Element) -> Result<Self> {
        let mut summary = ProcessSummary::new(
            required_text(element, "Identifier")?,
            required_text(element, "Title")?,
        );
        summary.abstract_text = optional_text(element, "Abstract");
        summary.process_version = element.attribute("processVersion").map(str::to_string);
        summary
            .job_control_options
            .set_opt(attribute_list(element, "jobControlOptions"));
        summary
            .output_transmission
            .set_opt(attribute_list(element, "outputTransmission"));
        Ok(summary)
    }
}

fn encode_languages(languages: &[String]) -> Element {
    let mut wrapper = Element::new(wps("Languages"));
    let mut default = Element::new(wps("Default"));
    if let Some(first) = languages.first() {
        text_child(&mut default, ows("Language"), first);
    }
    let mut supported = Element::new(wps("Supported"));
    for language in languages {
        text_child(&mut supported, ows("Language"), language);
    }
    wrapper.add_child(default).add_child(supported);
    wrapper
}

fn decode_languages(wrapper: &Element) -> Vec<String> {
    let default = wrapper
        .find_child("Default")
        .and_then(|d| d.child_text("Language"))
        .map(str::to_string);
    let mut languages: Vec<String> = default.into_iter().collect();
    if let Some(supported) = wrapper.find_child("Supported") {
        for language in supported.find_children("Language").filter_map(Element::text) {
            if !languages.iter().any(|l| l == language) {
                languages.push(language.to_string());
            }
        }
    }
    languages
}
