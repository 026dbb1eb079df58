//! Access policy per document type.
//!
//! Authorization decisions are made upstream; this module only turns the
//! resolved scope into the filter clauses embedded in the query.
//!
//! | Document type | Restriction |
//! |---------------|-------------|
//! | Publication | `status` is `PUBLISHED` |
//! | Ticket | owning organization, or one of its ancestors, is in scope |
//! | ImportCandidate | an affiliated organization is in scope |
//!
//! Tickets and import candidates are never served without an organization
//! scope: [`access_filter`] returns `None` and the query keeps matching
//! nothing.

use scholar_search::taxonomy::{Taxonomy, TaxonomyRules};
use scholar_search::{AccessFilter, Catalogue, DocumentType};
use serde_json::json;

use crate::extractors::OrganizationScope;

/// Status of publicly visible publications.
pub const PUBLISHED: &str = "PUBLISHED";

const PUBLICATION_STATUS_FIELD: &str = "status.keyword";
const TICKET_ORGANIZATION_FIELD: &str = "organizationIds.keyword";
const CANDIDATE_ORGANIZATIONS_PATH: &str = "organizations";
const CANDIDATE_ORGANIZATION_FIELD: &str = "organizations.id.keyword";
const ORGANIZATION_PREFIX: &str = "cristin/organization";

/// Resolves the access filter of a request.
pub fn access_filter(catalogue: &Catalogue, scope: &OrganizationScope) -> Option<AccessFilter> {
    match catalogue.document_type() {
        DocumentType::Publication => {
            Some(AccessFilter::unrestricted().require_term(PUBLICATION_STATUS_FIELD, PUBLISHED))
        }
        DocumentType::Ticket => {
            let organizations = organization_uris(catalogue.rules(), scope)?;
            Some(AccessFilter::unrestricted().require_any(TICKET_ORGANIZATION_FIELD, organizations))
        }
        DocumentType::ImportCandidate => {
            let organizations = organization_uris(catalogue.rules(), scope)?;
            Some(AccessFilter::unrestricted().with_clause(json!({
                "nested": {
                    "path": CANDIDATE_ORGANIZATIONS_PATH,
                    "query": { "terms": { CANDIDATE_ORGANIZATION_FIELD: organizations } }
                }
            })))
        }
    }
}

fn organization_uris(rules: &TaxonomyRules, scope: &OrganizationScope) -> Option<Vec<String>> {
    if scope.is_empty() {
        return None;
    }
    Some(
        scope
            .organizations()
            .iter()
            .map(|id| rules.expand_uri(ORGANIZATION_PREFIX, id))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholar_search::taxonomy::import_candidate::IMPORT_CANDIDATES;
    use scholar_search::taxonomy::publication::PUBLICATIONS;
    use scholar_search::taxonomy::ticket::TICKETS;

    const HOST: &str = "https://api.test";

    #[test]
    fn test_publications_are_published_only() {
        let catalogue = Catalogue::new(&PUBLICATIONS, HOST).unwrap();
        let filter = access_filter(&catalogue, &OrganizationScope::default()).unwrap();
        assert_eq!(
            filter.clauses(),
            &[json!({ "term": { "status.keyword": "PUBLISHED" } })]
        );
    }

    #[test]
    fn test_tickets_scoped_to_organizations() {
        let catalogue = Catalogue::new(&TICKETS, HOST).unwrap();
        let scope = OrganizationScope::new(["1.0.0.0"]);
        let filter = access_filter(&catalogue, &scope).unwrap();
        assert_eq!(
            filter.clauses()[0]["terms"]["organizationIds.keyword"],
            json!(["https://api.test/cristin/organization/1.0.0.0"])
        );
    }

    #[test]
    fn test_import_candidates_scoped_through_nested_organizations() {
        let catalogue = Catalogue::new(&IMPORT_CANDIDATES, HOST).unwrap();
        let scope = OrganizationScope::new(["https://api.test/cristin/organization/2.0.0.0"]);
        let filter = access_filter(&catalogue, &scope).unwrap();
        let nested = &filter.clauses()[0]["nested"];
        assert_eq!(nested["path"], "organizations");
        assert_eq!(
            nested["query"]["terms"]["organizations.id.keyword"][0],
            "https://api.test/cristin/organization/2.0.0.0"
        );
    }

    #[test]
    fn test_no_scope_stays_denied() {
        for definition in [&TICKETS, &IMPORT_CANDIDATES] {
            let catalogue = Catalogue::new(definition, HOST).unwrap();
            assert!(access_filter(&catalogue, &OrganizationScope::default()).is_none());
        }
    }
}
