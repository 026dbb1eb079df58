//! Application state for the search API.
//!
//! Holds the long-lived objects every request shares: the search engine,
//! the compiled catalogues, the promotion source and the configuration.

use std::sync::Arc;

use scholar_search::taxonomy::import_candidate::IMPORT_CANDIDATES;
use scholar_search::taxonomy::publication::PUBLICATIONS;
use scholar_search::taxonomy::ticket::TICKETS;
use scholar_search::taxonomy::CatalogueDefinition;
use scholar_search::{
    Catalogue, DocumentType, NoPromotions, PromotionSource, SearchEngine, TaxonomyError,
};

use crate::config::ServerConfig;

/// The compiled catalogue of every document type.
#[derive(Debug)]
pub struct Catalogues {
    publications: Catalogue,
    tickets: Catalogue,
    import_candidates: Catalogue,
}

impl Catalogues {
    /// Compiles every catalogue for the configured API host and page size.
    pub fn new(config: &ServerConfig) -> Result<Self, TaxonomyError> {
        Ok(Self {
            publications: compile(&PUBLICATIONS, config)?,
            tickets: compile(&TICKETS, config)?,
            import_candidates: compile(&IMPORT_CANDIDATES, config)?,
        })
    }

    /// Returns the catalogue of `document_type`.
    pub fn get(&self, document_type: DocumentType) -> &Catalogue {
        match document_type {
            DocumentType::Publication => &self.publications,
            DocumentType::Ticket => &self.tickets,
            DocumentType::ImportCandidate => &self.import_candidates,
        }
    }
}

fn compile(
    definition: &'static CatalogueDefinition,
    config: &ServerConfig,
) -> Result<Catalogue, TaxonomyError> {
    let catalogue = Catalogue::new(definition, config.api_host.as_str())?;
    Ok(match config.default_page_size {
        Some(size) => catalogue.with_default_size(size),
        None => catalogue,
    })
}

/// Shared application state for the REST API.
///
/// # Type Parameters
///
/// * `E` - The search engine (must implement [`SearchEngine`])
///
/// # Example
///
/// ```rust,ignore
/// use scholar_rest::{AppState, ServerConfig};
/// use scholar_search::backends::ElasticsearchEngine;
/// use std::sync::Arc;
///
/// let engine = ElasticsearchEngine::new(Default::default())?;
/// let state = AppState::new(Arc::new(engine), ServerConfig::default())?;
/// ```
pub struct AppState<E> {
    /// The search engine.
    engine: Arc<E>,

    /// Compiled catalogues.
    catalogues: Arc<Catalogues>,

    /// Promoted result lookup.
    promotions: Arc<dyn PromotionSource>,

    /// Server configuration.
    config: Arc<ServerConfig>,
}

// Manually implement Clone since E is wrapped in Arc and doesn't need to be Clone
impl<E> Clone for AppState<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            catalogues: Arc::clone(&self.catalogues),
            promotions: Arc::clone(&self.promotions),
            config: Arc::clone(&self.config),
        }
    }
}

impl<E: SearchEngine> AppState<E> {
    /// Creates a new AppState, compiling the catalogues once.
    ///
    /// Promotions are disabled until [`AppState::with_promotions`] is called.
    pub fn new(engine: Arc<E>, config: ServerConfig) -> Result<Self, TaxonomyError> {
        let catalogues = Catalogues::new(&config)?;
        Ok(Self {
            engine,
            catalogues: Arc::new(catalogues),
            promotions: Arc::new(NoPromotions),
            config: Arc::new(config),
        })
    }

    /// Replaces the promotion source.
    pub fn with_promotions(mut self, promotions: Arc<dyn PromotionSource>) -> Self {
        self.promotions = promotions;
        self
    }

    /// Returns a reference to the search engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Returns the catalogue of `document_type`.
    pub fn catalogue(&self, document_type: DocumentType) -> &Catalogue {
        self.catalogues.get(document_type)
    }

    /// Returns the promotion source.
    pub fn promotions(&self) -> &dyn PromotionSource {
        self.promotions.as_ref()
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
