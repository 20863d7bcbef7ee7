//! Wire types of the document-registration API.
//!
//! Field names follow the remote JSON schema exactly. Absent values are sent
//! as `null`; dates are `yyyy-MM-dd`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A document submitted for registration.
///
/// Common fields are shared by every document kind; the kind-specific payload
/// is flattened into the same JSON object and selected by `doc_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Client-side document identifier
    #[serde(default)]
    pub doc_id: Option<String>,
    /// Document status as known to the client
    #[serde(default)]
    pub doc_status: Option<String>,
    /// Participant description
    #[serde(default)]
    pub description: Option<DocumentDescription>,
    /// Whether the goods are imported
    #[serde(default, rename = "importRequest")]
    pub import_request: bool,
    /// Kind-specific payload
    #[serde(flatten)]
    pub kind: DocumentKind,
}

impl Document {
    /// Creates a document of the given kind with every common field empty.
    pub fn new(kind: DocumentKind) -> Self {
        Document {
            doc_id: None,
            doc_status: None,
            description: None,
            import_request: false,
            kind,
        }
    }

    /// Wire name of the document kind.
    pub fn doc_type(&self) -> &'static str {
        self.kind.doc_type()
    }
}

/// Participant description attached to a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDescription {
    /// Taxpayer number of the participant
    #[serde(default, rename = "participantInn")]
    pub participant_inn: Option<String>,
}

/// Supported document kinds, tagged by `doc_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "doc_type")]
pub enum DocumentKind {
    /// Introduction into circulation of goods produced in the country
    #[serde(rename = "LP_INTRODUCE_GOODS")]
    LpIntroduceGoods(LpIntroduceGoods),
}

impl DocumentKind {
    /// Wire name of the kind.
    pub fn doc_type(&self) -> &'static str {
        match self {
            DocumentKind::LpIntroduceGoods(_) => "LP_INTRODUCE_GOODS",
        }
    }
}

impl From<LpIntroduceGoods> for DocumentKind {
    fn from(payload: LpIntroduceGoods) -> Self {
        DocumentKind::LpIntroduceGoods(payload)
    }
}

/// Payload of an `LP_INTRODUCE_GOODS` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LpIntroduceGoods {
    /// Taxpayer number of the owner
    pub owner_inn: Option<String>,
    /// Taxpayer number of the participant
    pub participant_inn: Option<String>,
    /// Taxpayer number of the producer
    pub producer_inn: Option<String>,
    /// Date of production
    pub production_date: Option<NaiveDate>,
    /// Production type, e.g. `OWN_PRODUCTION`
    pub production_type: Option<String>,
    /// Product lines
    pub products: Option<Vec<Product>>,
    /// Registration date
    pub reg_date: Option<NaiveDate>,
    /// Registration number
    pub reg_number: Option<String>,
}

/// One product line of an `LP_INTRODUCE_GOODS` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    /// Kind of conformity certificate
    pub certificate_document: Option<String>,
    /// Certificate issue date
    pub certificate_document_date: Option<NaiveDate>,
    /// Certificate number
    pub certificate_document_number: Option<String>,
    /// Taxpayer number of the owner
    pub owner_inn: Option<String>,
    /// Taxpayer number of the producer
    pub producer_inn: Option<String>,
    /// Date of production
    pub production_date: Option<NaiveDate>,
    /// Commodity nomenclature code
    pub tnved_code: Option<String>,
    /// Unit identification code
    pub uit_code: Option<String>,
    /// Transport package identification code
    pub uitu_code: Option<String>,
}

/// Success payload of document creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentResponse {
    /// Identifier assigned by the remote service
    pub id: String,
}
