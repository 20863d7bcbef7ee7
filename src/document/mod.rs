//! Documents accepted by the registration API.

mod types;

pub use types::{
    Document, DocumentDescription, DocumentKind, DocumentResponse, LpIntroduceGoods, Product,
};

use std::path::Path;

use anyhow::{Context, Result};

/// An `LP_INTRODUCE_GOODS` document with every field empty.
///
/// Used by the command-line tool when no document file is given.
pub fn sample_document() -> Document {
    Document::new(LpIntroduceGoods::default().into())
}

/// Reads a JSON document from disk.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid document.
pub async fn load_document(path: &Path) -> Result<Document> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read document file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse document file {}", path.display()))
}
