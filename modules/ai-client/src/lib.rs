//! Thin Claude client used by the newslens pipeline.
//!
//! Every request carries a client-side timeout. Responses are returned as
//! plain text; callers locate the structured block themselves with
//! [`util::extract_json_block`] so surrounding prose never breaks parsing.

pub mod claude;
pub mod error;
pub mod schema;
pub mod util;

pub use claude::Claude;
pub use error::AiError;
pub use schema::StructuredOutput;
