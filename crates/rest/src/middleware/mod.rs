//! Request processing helpers shared by the handlers.

pub mod content_type;

pub use content_type::{ResponseFormat, negotiate_format};
