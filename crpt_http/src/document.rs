use serde::Deserialize;
use serde::Serialize;

use crate::errors::Result;
use crate::serde_helpers::serialize_empty_if_none;

/// Document submitted to the registration endpoint
///
/// Every string field is optional and is sent as `""` when absent. `products`
/// is omitted from the payload when `None` and sent as an array (possibly
/// empty) when `Some`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    #[serde(serialize_with = "serialize_empty_if_none")]
    pub doc_id: Option<String>,

    #[serde(serialize_with = "serialize_empty_if_none")]
    pub doc_status: Option<String>,

    #[serde(serialize_with = "serialize_empty_if_none")]
    pub doc_type: Option<String>,

    #[serde(rename = "importRequest", alias = "import_request")]
    pub import_request: bool,

    #[serde(serialize_with = "serialize_empty_if_none")]
    pub owner_inn: Option<String>,

    #[serde(serialize_with = "serialize_empty_if_none")]
    pub participant_inn: Option<String>,

    #[serde(serialize_with = "serialize_empty_if_none")]
    pub producer_inn: Option<String>,

    #[serde(serialize_with = "serialize_empty_if_none")]
    pub production_date: Option<String>,

    #[serde(serialize_with = "serialize_empty_if_none")]
    pub production_type: Option<String>,

    #[serde(serialize_with = "serialize_empty_if_none")]
    pub reg_date: Option<String>,

    #[serde(serialize_with = "serialize_empty_if_none")]
    pub reg_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
}

/// Product line of a [`Document`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    #[serde(serialize_with = "serialize_empty_if_none")]
    pub certificate_document: Option<String>,

    #[serde(serialize_with = "serialize_empty_if_none")]
    pub certificate_document_date: Option<String>,

    #[serde(serialize_with = "serialize_empty_if_none")]
    pub certificate_document_number: Option<String>,

    #[serde(serialize_with = "serialize_empty_if_none")]
    pub owner_inn: Option<String>,

    #[serde(serialize_with = "serialize_empty_if_none")]
    pub producer_inn: Option<String>,

    #[serde(serialize_with = "serialize_empty_if_none")]
    pub production_date: Option<String>,

    #[serde(serialize_with = "serialize_empty_if_none")]
    pub tnved_code: Option<String>,

    #[serde(serialize_with = "serialize_empty_if_none")]
    pub uit_code: Option<String>,

    #[serde(serialize_with = "serialize_empty_if_none")]
    pub uitu_code: Option<String>,
}

impl Document {
    /// Request body for the registration endpoint
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
