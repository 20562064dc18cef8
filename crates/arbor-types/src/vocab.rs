//! Predicate and class IRIs used in repository statement graphs.

pub mod rdf {
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

pub mod xsd {
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
    pub const LONG: &str = "http://www.w3.org/2001/XMLSchema#long";
}

pub mod ldp {
    pub const RDF_SOURCE: &str = "http://www.w3.org/ns/ldp#RDFSource";
    pub const NON_RDF_SOURCE: &str = "http://www.w3.org/ns/ldp#NonRDFSource";
    pub const BASIC_CONTAINER: &str = "http://www.w3.org/ns/ldp#BasicContainer";
}

pub mod iana {
    pub const DESCRIBED_BY: &str = "http://www.iana.org/assignments/relation/describedby";
}

pub mod fedora {
    pub const BINARY: &str = "http://fedora.info/definitions/v4/repository#Binary";
    pub const CREATED: &str = "http://fedora.info/definitions/v4/repository#created";
    pub const LAST_MODIFIED: &str = "http://fedora.info/definitions/v4/repository#lastModified";
    pub const EXTERNAL_CONTENT: &str = "http://fedora.info/definitions/fcrepo#ExternalContent";
}

pub mod pcdm {
    pub const OBJECT: &str = "http://pcdm.org/models#Object";
    pub const COLLECTION: &str = "http://pcdm.org/models#Collection";
    pub const FILE: &str = "http://pcdm.org/models#File";
    pub const MEMBER_OF: &str = "http://pcdm.org/models#memberOf";
    pub const HAS_FILE: &str = "http://pcdm.org/models#hasFile";
}

pub mod ebucore {
    pub const FILENAME: &str = "http://www.ebu.ch/metadata/ontologies/ebucore/ebucore#filename";
    pub const MIME_TYPE: &str = "http://www.ebu.ch/metadata/ontologies/ebucore/ebucore#hasMimeType";
}

pub mod premis {
    pub const EVENT: &str = "http://www.loc.gov/premis/rdf/v3/Event";
    pub const HAS_EVENT_TYPE: &str = "http://www.loc.gov/premis/rdf/v3/hasEventType";
    pub const HAS_EVENT_DATE_TIME: &str = "http://www.loc.gov/premis/rdf/v3/hasEventDateTime";
    pub const HAS_EVENT_DETAIL: &str = "http://www.loc.gov/premis/rdf/v3/hasEventDetail";
    pub const HAS_AGENT: &str = "http://www.loc.gov/premis/rdf/v3/hasEventRelatedAgent";
    pub const HAS_SIZE: &str = "http://www.loc.gov/premis/rdf/v3/hasSize";
    pub const HAS_MESSAGE_DIGEST: &str = "http://www.loc.gov/premis/rdf/v3/hasMessageDigest";
}

/// Repository-specific classes and relations.
pub mod arbor {
    pub const NS: &str = "https://w3id.org/arbor/model#";

    pub const CONTENT_ROOT: &str = "https://w3id.org/arbor/model#ContentRoot";
    pub const ADMIN_UNIT: &str = "https://w3id.org/arbor/model#AdminUnit";
    pub const COLLECTION: &str = "https://w3id.org/arbor/model#Collection";
    pub const FOLDER: &str = "https://w3id.org/arbor/model#Folder";
    pub const WORK: &str = "https://w3id.org/arbor/model#Work";
    pub const FILE_OBJECT: &str = "https://w3id.org/arbor/model#FileObject";
    pub const DEPOSIT_RECORD: &str = "https://w3id.org/arbor/model#DepositRecord";
    pub const TOMBSTONE: &str = "https://w3id.org/arbor/model#Tombstone";
    pub const EVENT_LOG: &str = "https://w3id.org/arbor/model#EventLog";

    pub const PRIMARY_OBJECT: &str = "https://w3id.org/arbor/model#primaryObject";
    pub const MEMBER_ORDER: &str = "https://w3id.org/arbor/model#memberOrder";
    pub const HAS_MANIFEST: &str = "https://w3id.org/arbor/model#hasManifest";
    pub const HAS_EVENT: &str = "https://w3id.org/arbor/model#hasEvent";
    pub const ORIGINAL_TYPE: &str = "https://w3id.org/arbor/model#originalType";
    pub const TITLE: &str = "https://w3id.org/arbor/model#title";
}
