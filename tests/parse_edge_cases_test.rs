//! Documents that are truncated, malformed or unusual in shape

use occurrence_ingest::adapters::database::Gateways;
use occurrence_ingest::adapters::memory::{MemoryGateway, MemoryImageResolver, MemoryImageStore};
use occurrence_ingest::config::IngestPolicyConfig;
use occurrence_ingest::core::ingest::AnnotationProcessor;
use occurrence_ingest::core::parse::{AnnotationStateMachine, EventReader};
use occurrence_ingest::core::synthesis::RecordSynthesizer;
use occurrence_ingest::domain::{CollectionId, Expectation};
use std::sync::Arc;

fn processor(gateway: Arc<MemoryGateway>) -> AnnotationProcessor {
    let synthesizer = RecordSynthesizer::new(
        Gateways {
            occurrences: gateway,
            images: Arc::new(MemoryImageStore::new()),
        },
        Arc::new(MemoryImageResolver::new()),
        IngestPolicyConfig::default(),
        "http://images.example.org/image/",
    )
    .unwrap();
    AnnotationProcessor::new(synthesizer)
}

fn gateway() -> Arc<MemoryGateway> {
    Arc::new(MemoryGateway::new().with_collection(CollectionId::new(1).unwrap(), "HUH", "NEVP"))
}

const ONE_ANNOTATION: &str = r#"<rdf:RDF>
  <oa:Annotation rdf:about="urn:uuid:a1">
    <oa:hasBody>
      <dwcFP:Occurrence rdf:about="urn:uuid:o1">
        <dwc:institutionCode>HUH</dwc:institutionCode>
        <dwc:collectionCode>NEVP</dwc:collectionCode>
        <dwc:catalogNumber>00200</dwc:catalogNumber>
      </dwcFP:Occurrence>
    </oa:hasBody>
  </oa:Annotation>
</rdf:RDF>"#;

async fn annotations(xml: &str) -> Vec<occurrence_ingest::domain::Annotation> {
    let mut events = EventReader::new(xml.as_bytes());
    let mut machine = AnnotationStateMachine::new();
    let mut sealed = Vec::new();
    while let Some(event) = events.next_event().await.unwrap() {
        sealed.extend(machine.handle(event));
    }
    sealed
}

#[tokio::test]
async fn test_truncated_before_first_commit() {
    let gateway = gateway();
    let cut = ONE_ANNOTATION.find("</dwcFP:Occurrence>").unwrap();
    let truncated = &ONE_ANNOTATION[..cut];

    let summary = processor(gateway.clone())
        .process(truncated.as_bytes(), "truncated")
        .await;

    assert!(!summary.could_parse);
    assert!(!summary.success);
    assert_eq!(summary.annotations_closed, 0);
    assert_eq!(summary.insert_count, 0);
    assert_eq!(gateway.occurrence_count().await, 0);
    assert!(summary.errors[0].starts_with("Parse error at byte"));
}

#[tokio::test]
async fn test_mismatched_end_tag_is_parse_error() {
    let xml = "<rdf:RDF><oa:Annotation></dwcFP:Occurrence></rdf:RDF>";
    let summary = processor(gateway()).process(xml.as_bytes(), "bad").await;
    assert!(!summary.could_parse);
}

#[tokio::test]
async fn test_empty_document_is_parse_error() {
    let summary = processor(gateway()).process("".as_bytes(), "empty").await;
    assert!(!summary.could_parse);
    assert_eq!(summary.record_count, 0);
}

#[tokio::test]
async fn test_document_without_annotations_succeeds() {
    let summary = processor(gateway())
        .process("<rdf:RDF></rdf:RDF>".as_bytes(), "none")
        .await;
    assert!(summary.could_parse);
    assert!(summary.success);
    assert_eq!(summary.annotations_closed, 0);
}

#[tokio::test]
async fn test_misspelled_occurrence_element_is_accepted() {
    let xml = ONE_ANNOTATION.replace("dwcFP:Occurrence", "dwcFP:Occurence");
    let summary = processor(gateway()).process(xml.as_bytes(), "misspelled").await;
    assert!(summary.success, "{:?}", summary.errors);
    assert_eq!(summary.record_count, 1);
    assert_eq!(summary.insert_count, 1);
}

#[tokio::test]
async fn test_element_names_match_case_insensitively() {
    let xml = ONE_ANNOTATION
        .replace("oa:Annotation", "OA:ANNOTATION")
        .replace("dwc:catalogNumber", "DWC:CATALOGNUMBER");
    let sealed = annotations(&xml).await;
    assert_eq!(sealed.len(), 1);
    assert_eq!(
        sealed[0].occurrence.as_ref().unwrap().catalog_number,
        "00200"
    );
}

#[tokio::test]
async fn test_entities_and_cdata_are_unescaped() {
    let xml = r#"<rdf:RDF><oa:Annotation><dwcFP:Occurrence>
        <dwc:locality>Bog &amp; fen</dwc:locality>
        <dwc:recordedBy><![CDATA[O'Brien, P.]]></dwc:recordedBy>
      </dwcFP:Occurrence></oa:Annotation></rdf:RDF>"#;
    let sealed = annotations(xml).await;
    let occurrence = sealed[0].occurrence.as_ref().unwrap();
    assert_eq!(occurrence.locality, "Bog & fen");
    assert_eq!(occurrence.recorded_by, "O'Brien, P.");
}

#[tokio::test]
async fn test_update_expectation_and_motivations() {
    let xml = r#"<rdf:RDF><oa:Annotation rdf:about="urn:uuid:a9">
        <oad:Expectation_Update/>
        <oa:motivatedBy rdf:resource="http://www.w3.org/ns/oa#editing"/>
        <oa:motivatedBy rdf:resource="http://www.w3.org/ns/oa#editing"/>
      </oa:Annotation></rdf:RDF>"#;
    let sealed = annotations(xml).await;
    assert_eq!(sealed[0].expectation, Expectation::Update);
    assert_eq!(sealed[0].motivations.len(), 2);
    assert!(sealed[0].occurrence.is_none());
}

#[tokio::test]
async fn test_unknown_elements_are_ignored() {
    let xml = ONE_ANNOTATION.replace(
        "<dwc:catalogNumber>",
        "<dwc:habitat>Swamp</dwc:habitat><dc:type>PhysicalObject</dc:type><dwc:catalogNumber>",
    );
    let sealed = annotations(&xml).await;
    let occurrence = sealed[0].occurrence.as_ref().unwrap();
    assert_eq!(occurrence.catalog_number, "00200");
    assert!(occurrence.locality.is_empty());
}
