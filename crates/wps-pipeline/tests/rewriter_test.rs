//! Stream-level behaviour of the read and write rewriters

use wps_ir::{Attribute, EventSink, EventSource, QName, VecSink, VecSource, Version, XmlEvent};
use wps_pipeline::{LegacyTransformer, TransformingReader, TransformingWriter};
use wps_translation::TranslationTable;
use wps_translation::namespace::{OWS_1_1, OWS_2_0, WPS_1_0, WPS_2_0};

fn start(namespace: &str, local: &str) -> XmlEvent {
    XmlEvent::start(QName::new(namespace, local), vec![])
}

fn end(namespace: &str, local: &str) -> XmlEvent {
    XmlEvent::end(QName::new(namespace, local))
}

fn root(namespace: &str, local: &str, version: Option<&str>) -> XmlEvent {
    let mut attributes = vec![Attribute::unqualified("service", "WPS")];
    if let Some(version) = version {
        attributes.push(Attribute::unqualified("version", version));
    }
    XmlEvent::start(QName::new(namespace, local), attributes)
}

fn legacy_capabilities() -> Vec<XmlEvent> {
    vec![
        root(WPS_1_0, "Capabilities", Some("1.0.0")),
        XmlEvent::namespace(Some("wps"), WPS_1_0),
        XmlEvent::namespace(Some("ows"), OWS_1_1),
        start(WPS_1_0, "ProcessOfferings"),
        start(WPS_1_0, "Process"),
        start(OWS_1_1, "Identifier"),
        XmlEvent::text("buffer"),
        end(OWS_1_1, "Identifier"),
        end(WPS_1_0, "Process"),
        end(WPS_1_0, "ProcessOfferings"),
        end(WPS_1_0, "Capabilities"),
    ]
}

fn current_capabilities() -> Vec<XmlEvent> {
    vec![
        root(WPS_2_0, "Capabilities", Some("2.0.0")),
        start(WPS_2_0, "Contents"),
        start(WPS_2_0, "ProcessSummary"),
        end(WPS_2_0, "ProcessSummary"),
        end(WPS_2_0, "Contents"),
        end(WPS_2_0, "Capabilities"),
    ]
}

fn legacy_writer() -> TransformingWriter<'static, VecSink> {
    TransformingWriter::new(VecSink::new(), TranslationTable::wps(), Version::Legacy)
}

fn drain<S: EventSource>(source: &mut S) -> Vec<XmlEvent>
where
    S::Error: std::fmt::Debug,
{
    let mut events = Vec::new();
    while let Some(event) = source.next_event().unwrap() {
        events.push(event);
    }
    events
}

fn start_names(events: &[XmlEvent]) -> Vec<String> {
    events
        .iter()
        .filter(|e| e.is_start())
        .filter_map(|e| e.name())
        .map(|n| n.local.clone())
        .collect()
}

#[test]
fn test_import_legacy_capabilities_resolves_canonical_names() {
    let transformer = LegacyTransformer::new();
    let mut reader = transformer
        .translate_for_read(VecSource::new(legacy_capabilities()))
        .unwrap();
    assert_eq!(reader.version(), Version::Legacy);

    let events = drain(&mut reader);
    assert_eq!(
        start_names(&events),
        ["Capabilities", "Contents", "ProcessSummary", "Identifier"]
    );
    assert_eq!(events[0].name(), Some(&QName::new(WPS_2_0, "Capabilities")));
    assert_eq!(events[1], XmlEvent::namespace(Some("wps"), WPS_2_0));
    assert_eq!(events[2], XmlEvent::namespace(Some("ows"), OWS_2_0));
    assert_eq!(events[5].name(), Some(&QName::new(OWS_2_0, "Identifier")));
    assert_eq!(events.last(), Some(&end(WPS_2_0, "Capabilities")));

    let stats = reader.stats();
    assert_eq!(stats.events, events.len());
    assert_eq!(stats.namespaces_renamed, 2);
}

#[test]
fn test_export_complex_output_under_legacy() {
    let mut writer = legacy_writer();
    writer
        .add_all(vec![
            start(WPS_2_0, "Output"),
            start(WPS_2_0, "ComplexData"),
            end(WPS_2_0, "ComplexData"),
            end(WPS_2_0, "Output"),
        ])
        .unwrap();
    writer.finish().unwrap();

    let events = writer.into_inner().into_events();
    assert_eq!(
        events,
        vec![
            start(WPS_1_0, "Output"),
            start(WPS_1_0, "ComplexOutput"),
            end(WPS_1_0, "ComplexOutput"),
            end(WPS_1_0, "Output"),
        ]
    );
}

#[test]
fn test_export_result_root_per_version() {
    let transformer = LegacyTransformer::new();
    let events = vec![start(WPS_2_0, "Result"), end(WPS_2_0, "Result")];

    let mut legacy = transformer.translate_for_write(VecSink::new(), Version::Legacy);
    legacy.add_all(events.clone()).unwrap();
    assert_eq!(
        legacy.into_inner().into_events(),
        vec![start(WPS_1_0, "ExecuteResponse"), end(WPS_1_0, "ExecuteResponse")]
    );

    let mut current = transformer.translate_for_write(VecSink::new(), Version::Current);
    current.add_all(events.clone()).unwrap();
    assert_eq!(current.into_inner().into_events(), events);
}

#[test]
fn test_unqualified_literal_data_under_default_value_gets_current_namespace() {
    let events = vec![
        root(WPS_1_0, "ProcessDescriptions", Some("1.0.0")),
        start("", "DefaultValue"),
        start("", "LiteralData"),
        end("", "LiteralData"),
        end("", "DefaultValue"),
        end(WPS_1_0, "ProcessDescriptions"),
    ];
    let transformer = LegacyTransformer::new();
    let mut reader = transformer.translate_for_read(VecSource::new(events)).unwrap();
    let events = drain(&mut reader);

    assert_eq!(events[0].name(), Some(&QName::new(WPS_2_0, "ProcessOfferings")));
    assert_eq!(events[1].name(), Some(&QName::local("DefaultValue")));
    assert_eq!(events[2].name(), Some(&QName::new(WPS_2_0, "LiteralData")));
    assert_eq!(events[3].name(), Some(&QName::new(WPS_2_0, "LiteralData")));
}

#[test]
fn test_stack_depth_follows_nesting() {
    let input = legacy_capabilities();
    let mut expected = Vec::new();
    let mut depth = 0usize;
    for event in &input {
        match event {
            XmlEvent::StartElement { .. } => depth += 1,
            XmlEvent::EndElement { .. } => depth -= 1,
            _ => {}
        }
        expected.push(depth);
    }

    let mut reader = TransformingReader::new(
        VecSource::new(input),
        TranslationTable::wps(),
        Version::Legacy,
    );
    let mut observed = Vec::new();
    while reader.next_event().unwrap().is_some() {
        observed.push(reader.depth());
    }
    assert_eq!(observed, expected);
    assert_eq!(reader.depth(), 0);
    assert!(reader.context().is_empty());
}

#[test]
fn test_writer_stack_balances() {
    let mut writer = legacy_writer();
    for event in current_capabilities() {
        writer.add(event).unwrap();
    }
    writer.finish().unwrap();
    assert_eq!(writer.depth(), 0);
}

#[test]
fn test_repeated_peek_translates_once() {
    let mut reader = TransformingReader::new(
        VecSource::new(legacy_capabilities()),
        TranslationTable::wps(),
        Version::Legacy,
    );
    reader.next_event().unwrap();
    reader.next_event().unwrap();
    reader.next_event().unwrap();
    assert_eq!(reader.depth(), 1);

    let first = reader.peek().unwrap().cloned();
    for _ in 0..5 {
        assert_eq!(reader.peek().unwrap().cloned(), first);
    }
    assert_eq!(reader.depth(), 2);
    assert_eq!(reader.stats().events, 4);

    let taken = reader.next_event().unwrap();
    assert_eq!(taken, first);
    assert_eq!(taken.unwrap().name(), Some(&QName::new(WPS_2_0, "Contents")));
    assert_eq!(reader.depth(), 2);
}

#[test]
fn test_root_without_version_reads_as_current() {
    let events = vec![root(WPS_2_0, "Capabilities", None), end(WPS_2_0, "Capabilities")];
    let transformer = LegacyTransformer::new();
    let reader = transformer.translate_for_read(VecSource::new(events)).unwrap();
    assert_eq!(reader.version(), Version::Current);
}

#[test]
fn test_current_stream_is_not_renamed() {
    let transformer = LegacyTransformer::new();
    let mut reader = transformer
        .translate_for_read(VecSource::new(current_capabilities()))
        .unwrap();
    let events = drain(&mut reader);
    assert_eq!(events, current_capabilities());
    assert!(reader.stats().is_identity());
}

#[test]
fn test_sequential_reads_do_not_share_version() {
    let transformer = LegacyTransformer::new();

    let mut legacy = transformer
        .translate_for_read(VecSource::new(legacy_capabilities()))
        .unwrap();
    let legacy_names = start_names(&drain(&mut legacy));

    let mut current = transformer
        .translate_for_read(VecSource::new(current_capabilities()))
        .unwrap();
    assert_eq!(current.version(), Version::Current);
    let current_names = start_names(&drain(&mut current));

    assert_eq!(current_names, ["Capabilities", "Contents", "ProcessSummary"]);
    assert_eq!(&legacy_names[..3], current_names.as_slice());
}

#[test]
fn test_concurrent_reads_do_not_share_version() {
    let transformer = LegacyTransformer::new();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let transformer = &transformer;
                scope.spawn(move || {
                    let input = if i % 2 == 0 {
                        legacy_capabilities()
                    } else {
                        current_capabilities()
                    };
                    let mut reader = transformer.translate_for_read(VecSource::new(input)).unwrap();
                    let version = reader.version();
                    (i, version, start_names(&drain(&mut reader)))
                })
            })
            .collect();

        for handle in handles {
            let (i, version, names) = handle.join().unwrap();
            let expected = if i % 2 == 0 {
                Version::Legacy
            } else {
                Version::Current
            };
            assert_eq!(version, expected);
            assert_eq!(&names[..3], ["Capabilities", "Contents", "ProcessSummary"]);
        }
    });
}
