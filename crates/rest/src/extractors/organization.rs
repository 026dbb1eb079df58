//! Organization scope extractor.
//!
//! The gateway in front of the API authenticates the caller and forwards the
//! organizations it may curate in the `X-Organization-Id` header. The header
//! is trusted as set; requests without it carry no scope.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderName, StatusCode, request::Parts},
};

/// Header carrying the caller's organization identifiers.
pub static X_ORGANIZATION_ID: HeaderName = HeaderName::from_static("x-organization-id");

/// The organizations a request is scoped to.
///
/// # Example
///
/// ```rust,ignore
/// use scholar_rest::extractors::OrganizationScope;
///
/// async fn handler(scope: OrganizationScope) {
///     println!("Organizations: {:?}", scope.organizations());
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationScope {
    organizations: Vec<String>,
}

impl OrganizationScope {
    /// Creates a scope over `organizations`.
    pub fn new<I, S>(organizations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            organizations: organizations.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the organization identifiers.
    pub fn organizations(&self) -> &[String] {
        &self.organizations
    }

    /// Returns true when the request carries no organization.
    pub fn is_empty(&self) -> bool {
        self.organizations.is_empty()
    }
}

/// Reads the comma separated identifiers of every `X-Organization-Id` header.
fn extract_organizations(headers: &HeaderMap) -> Result<Vec<String>, &'static str> {
    let mut organizations = Vec::new();
    for value in headers.get_all(&X_ORGANIZATION_ID) {
        let value = value
            .to_str()
            .map_err(|_| "Invalid X-Organization-Id header")?;
        organizations.extend(
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
        );
    }
    Ok(organizations)
}

impl<S> FromRequestParts<S> for OrganizationScope
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let organizations =
            extract_organizations(&parts.headers).map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
        Ok(Self { organizations })
    }
}
