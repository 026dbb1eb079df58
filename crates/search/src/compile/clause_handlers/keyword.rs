//! Exact value clauses.

use serde_json::{Value, json};

const KEYWORD_SUFFIX: &str = ".keyword";

/// Matches `value` exactly.
pub fn term_clause(field: &str, value: &str) -> Value {
    json!({ "term": { field: value } })
}

/// Matches `value` exactly on the keyword field, or approximately on its
/// analysed parent field.
pub fn fuzzy_keyword_clause(field: &str, value: &str) -> Value {
    let text_field = field.strip_suffix(KEYWORD_SUFFIX).unwrap_or(field);
    json!({
        "bool": {
            "should": [
                { "term": { field: value } },
                {
                    "match": {
                        text_field: {
                            "query": value,
                            "fuzziness": "AUTO"
                        }
                    }
                }
            ],
            "minimum_should_match": 1
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_clause() {
        assert_eq!(
            term_clause("status.keyword", "PUBLISHED"),
            json!({ "term": { "status.keyword": "PUBLISHED" } })
        );
    }

    #[test]
    fn test_fuzzy_keyword_uses_parent_field() {
        let clause = fuzzy_keyword_clause("doi.keyword", "10.1000/xyz");
        let should = clause["bool"]["should"].as_array().unwrap();
        assert_eq!(should[0]["term"]["doi.keyword"], "10.1000/xyz");
        assert_eq!(should[1]["match"]["doi"]["query"], "10.1000/xyz");
        assert_eq!(clause["bool"]["minimum_should_match"], 1);
    }
}
