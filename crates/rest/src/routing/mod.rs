//! Route configuration for the search API.

pub mod search_routes;

pub use search_routes::{
    HEALTH_PATH, IMPORT_CANDIDATES_PATH, RESOURCES_PATH, TICKETS_PATH, create_routes,
    endpoint_path,
};
