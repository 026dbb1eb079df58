//! CSV rendering of result pages.
//!
//! Each document type exports a fixed set of columns. Values are read from
//! dotted `_source` paths; arrays along the path are flattened and their
//! values joined with `", "`. Aggregations and links are not exported.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use scholar_search::{DocumentType, PagedSearch};
use serde_json::Value;

use crate::error::RestError;

/// Byte order mark prefixed to every export.
pub const UTF8_BOM: &str = "\u{feff}";

/// Field delimiter.
pub const DELIMITER: u8 = b';';

const MULTI_VALUE_SEPARATOR: &str = ", ";

/// An exported column.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    /// Header cell.
    pub header: &'static str,
    /// Dotted `_source` path.
    pub path: &'static str,
}

const fn column(header: &'static str, path: &'static str) -> Column {
    Column { header, path }
}

static PUBLICATION_COLUMNS: &[Column] = &[
    column("url", "id"),
    column("title", "entityDescription.mainTitle"),
    column("publicationDate", "entityDescription.publicationDate.year"),
    column("publicationInstance", "entityDescription.reference.publicationInstance.type"),
    column("publicationContextName", "entityDescription.reference.publicationContext.name"),
    column("contributors", "entityDescription.contributors.identity.name"),
];

static TICKET_COLUMNS: &[Column] = &[
    column("url", "id"),
    column("type", "type"),
    column("status", "status"),
    column("createdDate", "createdDate"),
    column("modifiedDate", "modifiedDate"),
    column("publicationTitle", "publication.mainTitle"),
    column("owner", "owner.username"),
    column("assignee", "assignee.username"),
];

static IMPORT_CANDIDATE_COLUMNS: &[Column] = &[
    column("url", "id"),
    column("title", "mainTitle"),
    column("importStatus", "importStatus.candidateStatus"),
    column("publicationYear", "publicationYear"),
    column("publicationInstance", "publicationInstance.type"),
    column("contributors", "contributors.identity.name"),
    column("organizations", "organizations.id"),
];

/// Returns the exported columns of `document_type`.
pub fn columns(document_type: DocumentType) -> &'static [Column] {
    match document_type {
        DocumentType::Publication => PUBLICATION_COLUMNS,
        DocumentType::Ticket => TICKET_COLUMNS,
        DocumentType::ImportCandidate => IMPORT_CANDIDATE_COLUMNS,
    }
}

/// Renders the hits of `page` as a CSV document.
pub fn render(document_type: DocumentType, page: &PagedSearch) -> Result<Vec<u8>, RestError> {
    let columns = columns(document_type);

    let mut writer = WriterBuilder::new()
        .delimiter(DELIMITER)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::CRLF)
        .from_writer(UTF8_BOM.as_bytes().to_vec());

    writer.write_record(columns.iter().map(|c| c.header))?;
    for hit in &page.hits {
        writer.write_record(columns.iter().map(|c| cell(hit, c.path)))?;
    }

    writer.into_inner().map_err(|e| RestError::InternalError {
        message: format!("CSV serialization failed: {}", e),
    })
}

/// Reads every scalar below `path`, flattening arrays.
fn cell(document: &Value, path: &str) -> String {
    let mut nodes = vec![document];
    for segment in path.split('.') {
        nodes = nodes
            .into_iter()
            .flat_map(|node| match node {
                Value::Array(items) => items.iter().collect::<Vec<_>>(),
                other => vec![other],
            })
            .filter_map(|node| node.get(segment))
            .collect();
    }

    nodes
        .into_iter()
        .flat_map(|node| match node {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            other => vec![other],
        })
        .filter_map(|value| match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(MULTI_VALUE_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn page(hits: Vec<Value>) -> PagedSearch {
        PagedSearch {
            context: "ctx".to_string(),
            id: "https://api.test/search/resources".to_string(),
            total_hits: hits.len() as u64,
            hits,
            next_results: None,
            previous_results: None,
            next_search_after_results: None,
            aggregations: BTreeMap::new(),
            processing_time: 1,
        }
    }

    #[test]
    fn test_cell_flattens_arrays() {
        let document = json!({
            "entityDescription": {
                "contributors": [
                    { "identity": { "name": "Ada" } },
                    { "identity": { "name": "Grace" } },
                    { "identity": {} }
                ]
            }
        });
        assert_eq!(
            cell(&document, "entityDescription.contributors.identity.name"),
            "Ada, Grace"
        );
        assert_eq!(cell(&document, "entityDescription.mainTitle"), "");
    }

    #[test]
    fn test_cell_numbers() {
        assert_eq!(cell(&json!({ "publicationYear": 2021 }), "publicationYear"), "2021");
    }

    #[test]
    fn test_render_format() {
        let bytes = render(
            DocumentType::Ticket,
            &page(vec![json!({
                "id": "https://api.test/ticket/1",
                "type": "DoiRequest",
                "status": "New",
                "publication": { "mainTitle": "Deep \"sea\"" }
            })]),
        )
        .unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with(UTF8_BOM));
        let lines: Vec<&str> = text[UTF8_BOM.len()..].split("\r\n").collect();
        assert_eq!(
            lines[0],
            "\"url\";\"type\";\"status\";\"createdDate\";\"modifiedDate\";\"publicationTitle\";\"owner\";\"assignee\""
        );
        assert_eq!(
            lines[1],
            "\"https://api.test/ticket/1\";\"DoiRequest\";\"New\";\"\";\"\";\"Deep \"\"sea\"\"\";\"\";\"\""
        );
        assert_eq!(lines[2], "");
    }

    #[test]
    fn test_empty_page_has_header_only() {
        let bytes = render(DocumentType::Publication, &page(Vec::new())).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.matches("\r\n").count(), 1);
    }
}
