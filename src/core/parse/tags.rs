//! Fixed vocabulary of the annotation document
//!
//! Qualified element names are matched case-insensitively. [`Tag`] covers the
//! elements that open or close a builder scope; [`TextTarget`] names the
//! builder field that receives character data for a given element.

/// Elements with open/close behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Annotation,
    ExpectationInsert,
    ExpectationUpdate,
    Transcribing,
    MotivatedBy,
    AnnotatedBy,
    Occurrence,
    Identification,
    Event,
    HasCollectingEvent,
    HasCollectionById,
    HasAssociatedMedia,
    Image,
    HasAccessPoint,
    HasBasisOfRecord,
    HasTaxonId,
}

impl Tag {
    /// Looks up a qualified element name
    pub fn from_name(name: &str) -> Option<Self> {
        let tag = match name.to_ascii_lowercase().as_str() {
            "oa:annotation" => Self::Annotation,
            "oad:expectation_insert" => Self::ExpectationInsert,
            "oad:expectation_update" => Self::ExpectationUpdate,
            "oa:transcribing" | "oad:transcribing" => Self::Transcribing,
            "oa:motivatedby" => Self::MotivatedBy,
            "oa:annotatedby" => Self::AnnotatedBy,
            // The misspelling appears in documents produced by older clients
            "dwcfp:occurrence" | "dwcfp:occurence" => Self::Occurrence,
            "dwcfp:identification" => Self::Identification,
            "dwcfp:event" => Self::Event,
            "dwcfp:hascollectingevent" => Self::HasCollectingEvent,
            "dwcfp:hascollectionbyid" => Self::HasCollectionById,
            "dwcfp:hasassociatedmedia" => Self::HasAssociatedMedia,
            "dcmitype:image" => Self::Image,
            "ac:hasaccesspoint" => Self::HasAccessPoint,
            "dwcfp:hasbasisofrecord" => Self::HasBasisOfRecord,
            "dwcfp:hastaxonid" => Self::HasTaxonId,
            _ => return None,
        };
        Some(tag)
    }
}

/// Builder scope a text field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Document,
    Annotation,
    Annotator,
    Occurrence,
    Identification,
    Event,
    Media,
    AccessPoint,
}

/// Destination of character data inside an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTarget {
    // Document
    Count,

    // Annotation
    AnnotatedAt,

    // Annotator
    AnnotatorName,
    AnnotatorMbox,
    AnnotatorHomepage,

    // Occurrence
    InstitutionCode,
    CollectionCode,
    CatalogNumber,
    DateLastModified,
    RecordedBy,
    RecordNumber,
    Country,
    StateProvince,
    County,
    Municipality,
    Locality,
    Notes,
    MinimumElevation,
    MaximumElevation,
    DateModified,
    StorageLocation,

    // Identification
    ScientificName,
    Family,
    Genus,
    IdentificationQualifier,
    SpecificEpithet,
    ScientificNameAuthorship,
    InfraspecificEpithet,
    InfraspecificRank,
    NomenclaturalCode,
    IdentifiedBy,
    DateIdentified,
    TaxonId,
    FiledUnderNameInCollection,
    TypeStatus,

    // Collecting event
    EventDate,
    VerbatimEventDate,
    Year,
    Month,
    Day,

    // Associated media
    Rights,
    Owner,
    UsageTerms,

    // Access point
    Variant,
    AccessUri,
    Format,
    HashFunction,
    HashValue,
}

impl TextTarget {
    /// Looks up a qualified element name
    pub fn from_name(name: &str) -> Option<Self> {
        let target = match name.to_ascii_lowercase().as_str() {
            "co:count" => Self::Count,
            "oa:annotatedat" => Self::AnnotatedAt,

            "foaf:name" => Self::AnnotatorName,
            "foaf:mbox_sha1sum" => Self::AnnotatorMbox,
            "foaf:workplacehomepage" | "foaf:worlplacehomepage" => Self::AnnotatorHomepage,

            "dwc:institutioncode" => Self::InstitutionCode,
            "dwc:collectioncode" => Self::CollectionCode,
            "dwc:catalognumber" => Self::CatalogNumber,
            "dc:created" => Self::DateLastModified,
            "dwc:recordedby" => Self::RecordedBy,
            "dwc:recordnumber" => Self::RecordNumber,
            "dwc:country" => Self::Country,
            "dwc:stateprovince" => Self::StateProvince,
            "dwc:county" => Self::County,
            "dwc:municipality" => Self::Municipality,
            "dwc:locality" => Self::Locality,
            "notes" | "dwc:occurrenceremarks" => Self::Notes,
            "dwc:minimumelevationinmeters" => Self::MinimumElevation,
            "dwc:maximumelevationinmeters" => Self::MaximumElevation,
            "dwc:modified" => Self::DateModified,
            "obo:obi_0000967" => Self::StorageLocation,

            "dwc:scientificname" => Self::ScientificName,
            "dwc:family" => Self::Family,
            "dwc:genus" => Self::Genus,
            "dwc:identificationqualifier" => Self::IdentificationQualifier,
            "dwc:specificepithet" => Self::SpecificEpithet,
            "dwc:scientificnameauthorship" => Self::ScientificNameAuthorship,
            "dwc:infraspecificepithet" => Self::InfraspecificEpithet,
            "dwcfp:infraspecificrank" => Self::InfraspecificRank,
            "dwc:nomenclaturalcode" => Self::NomenclaturalCode,
            "dwc:identifiedby" => Self::IdentifiedBy,
            "dwc:dateidentified" | "dwc:dateidentifed" => Self::DateIdentified,
            "dwcfp:hastaxonid" => Self::TaxonId,
            "dwcfp:isfiledundernameincollection" => Self::FiledUnderNameInCollection,
            "dwc:typestatus" => Self::TypeStatus,

            "dwc:eventdate" => Self::EventDate,
            "dwc:verbatimeventdate" => Self::VerbatimEventDate,
            "dwc:year" => Self::Year,
            "dwc:month" => Self::Month,
            "dwc:day" => Self::Day,

            "dc:rights" => Self::Rights,
            "xmprights:owner" => Self::Owner,
            "xmprights:usageterms" => Self::UsageTerms,

            "ac:variant" => Self::Variant,
            "ac:accessuri" => Self::AccessUri,
            "dc:format" => Self::Format,
            "ac:hashfunction" => Self::HashFunction,
            "ac:hashvalue" => Self::HashValue,
            _ => return None,
        };
        Some(target)
    }

    /// Which builder must be open for this text to land
    pub fn scope(self) -> Scope {
        use TextTarget::*;
        match self {
            Count => Scope::Document,
            AnnotatedAt => Scope::Annotation,
            AnnotatorName | AnnotatorMbox | AnnotatorHomepage => Scope::Annotator,
            InstitutionCode | CollectionCode | CatalogNumber | DateLastModified | RecordedBy
            | RecordNumber | Country | StateProvince | County | Municipality | Locality | Notes
            | MinimumElevation | MaximumElevation | DateModified | StorageLocation => {
                Scope::Occurrence
            }
            ScientificName | Family | Genus | IdentificationQualifier | SpecificEpithet
            | ScientificNameAuthorship | InfraspecificEpithet | InfraspecificRank
            | NomenclaturalCode | IdentifiedBy | DateIdentified | TaxonId
            | FiledUnderNameInCollection | TypeStatus => Scope::Identification,
            EventDate | VerbatimEventDate | Year | Month | Day => Scope::Event,
            Rights | Owner | UsageTerms => Scope::Media,
            Variant | AccessUri | Format | HashFunction | HashValue => Scope::AccessPoint,
        }
    }
}
