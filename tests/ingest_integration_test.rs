//! End-to-end ingest of an annotation document against in-memory stores

use occurrence_ingest::adapters::database::Gateways;
use occurrence_ingest::adapters::memory::{MemoryGateway, MemoryImageResolver, MemoryImageStore};
use occurrence_ingest::config::{IngestConfig, IngestPolicyConfig};
use occurrence_ingest::core::ingest::AnnotationProcessor;
use occurrence_ingest::core::synthesis::RecordSynthesizer;
use occurrence_ingest::domain::{CollectionId, TaxonId};
use std::path::PathBuf;
use std::sync::Arc;

const BASE: &str = "http://images.example.org/image/";

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/nevp_annotations.rdf")
}

fn registered() -> MemoryGateway {
    MemoryGateway::new()
        .with_collection(CollectionId::new(7).unwrap(), "HUH", "NEVP")
        .with_taxon("Carex alba L.", TaxonId::new(40).unwrap(), "Cyperaceae")
        .with_taxon("Carex alba", TaxonId::new(40).unwrap(), "Cyperaceae")
}

struct Setup {
    gateway: Arc<MemoryGateway>,
    images: Arc<MemoryImageStore>,
}

impl Setup {
    fn new(gateway: MemoryGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
            images: Arc::new(MemoryImageStore::new()),
        }
    }

    fn processor(&self, allow_updates: bool) -> AnnotationProcessor {
        let synthesizer = RecordSynthesizer::new(
            Gateways {
                occurrences: self.gateway.clone(),
                images: self.images.clone(),
            },
            Arc::new(MemoryImageResolver::new()),
            IngestPolicyConfig {
                allow_updates,
                ..IngestPolicyConfig::default()
            },
            BASE,
        )
        .unwrap();
        AnnotationProcessor::new(synthesizer)
    }
}

#[tokio::test]
async fn test_document_ingest_counts() {
    let setup = Setup::new(registered());
    let summary = setup.processor(false).process_file(fixture()).await;

    assert!(summary.could_parse, "{:?}", summary.errors);
    assert!(summary.success);
    assert_eq!(summary.record_count, 2);
    assert_eq!(summary.annotations_closed, 2);
    assert_eq!(summary.expected_annotations, Some(2));
    assert_eq!(summary.insert_count, 2);
    assert_eq!(summary.success_count, 2);
    assert_eq!(summary.failure_count, 0);
    assert!(summary.warnings.is_empty(), "{:?}", summary.warnings);
}

#[tokio::test]
async fn test_occurrence_fields_are_derived() {
    let setup = Setup::new(registered());
    setup.processor(false).process_file(fixture()).await;

    let records = setup.gateway.occurrences().await;
    assert_eq!(records.len(), 2);

    let first = &records[0];
    let identity = first.identity.as_ref().unwrap();
    assert_eq!(identity.collection_id, CollectionId::new(7).ok());
    assert_eq!(identity.catalog_number, "00101");
    assert_eq!(identity.dbpk, "NEVP00101");
    assert_eq!(identity.record_entered_by, "Jane Transcriber");
    assert_eq!(first.occurrence_id, "urn:uuid:occ-00101");
    assert_eq!(first.basis_of_record, "PreservedSpecimen");
    assert_eq!(first.recorded_by, "Smith, J.");
    assert_eq!(first.associated_collectors, " Doe, A.");
    assert_eq!(first.country, "United States of America");
    assert_eq!(first.type_status, "Isotype");
    assert_eq!(first.storage_location.as_deref(), Some("Herbarium cabinet 12"));

    let event = first.event.as_ref().unwrap();
    assert_eq!(event.event_date, "2001-05-17");
    assert_eq!(event.year.as_deref(), Some("2001"));
    assert_eq!(event.month.as_deref(), Some("05"));
    assert_eq!(event.day.as_deref(), Some("17"));
    assert_eq!(event.verbatim_event_date, "17 May 2001");

    let taxon = first.taxon.as_ref().unwrap();
    assert_eq!(taxon.sciname, "Carex alba");
    assert_eq!(taxon.scientific_name, "Carex alba L.");
    assert_eq!(taxon.tid_interpreted, TaxonId::new(40).ok());
    assert_eq!(taxon.family, "Cyperaceae");
    assert_eq!(taxon.taxon_rank, "species");

    let second = &records[1];
    let event = second.event.as_ref().unwrap();
    assert_eq!(event.event_date, "");
    assert_eq!(event.year.as_deref(), Some("1899"));
    assert_eq!(event.month.as_deref(), Some("07"));
    assert_eq!(event.day, None);
    assert_eq!(second.taxon.as_ref().unwrap().taxon_rank, "genus");
}

#[tokio::test]
async fn test_determinations_mark_filed_under_as_current() {
    let setup = Setup::new(registered());
    setup.processor(false).process_file(fixture()).await;

    let determinations = setup.gateway.determinations().await;
    assert_eq!(determinations.len(), 3);

    assert_eq!(determinations[0].sciname, "Carex lurida");
    assert!(!determinations[0].is_current);
    assert_eq!(determinations[0].identification_remarks, "[ICNAFP]");

    assert_eq!(determinations[1].sciname, "Carex alba L.");
    assert!(determinations[1].is_current);
    assert_eq!(determinations[1].identification_remarks, "Isotype[ICNAFP]");

    // Single identification is current by default
    assert!(determinations[2].is_current);
}

#[tokio::test]
async fn test_image_record_combines_access_points() {
    let setup = Setup::new(registered());
    setup.processor(false).process_file(fixture()).await;

    let images = setup.images.images().await;
    assert_eq!(images.len(), 1);

    let image = &images[0].record;
    assert_eq!(image.source_url, format!("{BASE}00101.dng"));
    assert_eq!(
        image.web_url,
        format!("{BASE}00101.jpg?rotate=guess&resize=1250&format=jpeg,quality,100")
    );
    assert_eq!(
        image.large_url,
        format!("{BASE}00101.jpg?rotate=guess&format=jpeg,quality,100")
    );
    assert_eq!(image.caption, "NEVP 00101 Carex alba L.");
    assert_eq!(image.photographer, "Jane Transcriber");
    assert_eq!(image.copyright, "CC BY-NC 3.0");
    assert_eq!(image.owner, "President and Fellows of Harvard College");
    assert_eq!(image.notes, "Attribution required");
    assert_eq!(image.tid, TaxonId::new(40).ok());
    assert_eq!(image.sort_sequence, 50);
    assert_eq!(image.image_type, "specimen");
    assert_eq!(
        image.locality,
        "United States of America Maine Penobscot Orono Wet meadow by the Stillwater River"
    );
}

#[tokio::test]
async fn test_second_run_skips_existing_records() {
    let setup = Setup::new(registered());
    setup.processor(false).process_file(fixture()).await;

    let summary = setup.processor(false).process_file(fixture()).await;

    assert!(summary.success);
    assert_eq!(summary.insert_count, 0);
    assert_eq!(summary.skipped_count, 2);
    assert_eq!(summary.success_count, 0);
    assert_eq!(setup.gateway.occurrence_count().await, 2);
}

#[tokio::test]
async fn test_second_run_with_updates_rewrites_in_place() {
    let setup = Setup::new(registered());
    setup.processor(false).process_file(fixture()).await;

    let summary = setup.processor(true).process_file(fixture()).await;

    assert!(summary.success);
    assert_eq!(summary.update_count, 2);
    assert_eq!(summary.insert_count, 0);
    assert_eq!(setup.gateway.occurrence_count().await, 2);
    assert_eq!(setup.gateway.determinations().await.len(), 3);
    assert_eq!(setup.images.images().await.len(), 1);
}

#[tokio::test]
async fn test_unregistered_collection_fails_each_record() {
    let setup = Setup::new(MemoryGateway::new());
    let summary = setup.processor(false).process_file(fixture()).await;

    assert!(summary.could_parse);
    assert!(!summary.success);
    assert_eq!(summary.failure_count, 2);
    assert_eq!(setup.gateway.occurrence_count().await, 0);

    let text = summary.error_text();
    assert!(text.contains("foreign key constraint fails"));
    assert!(text.contains("Interpretation: Record contains a collectionCode"));
    assert!(text.contains("collid=[], institutionCode=[HUH], collectionCode=[NEVP]"));
}

#[tokio::test]
async fn test_dry_run_from_config() {
    let mut config = IngestConfig::default();
    config.application.dry_run = true;

    let processor = AnnotationProcessor::from_config(&config).await.unwrap();
    let summary = processor.process_file(fixture()).await;

    assert!(summary.success, "{:?}", summary.errors);
    assert_eq!(summary.insert_count, 2);
}
