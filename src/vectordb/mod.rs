//! Qdrant REST integration.
//!
//! The gateway only understands the search body well enough to widen it and reorder its hits;
//! every other request is relayed verbatim through [`QdrantRestClient::forward`].

pub mod client;
pub mod error;
pub mod headers;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;

pub use client::QdrantRestClient;
pub use error::VectorDbError;
pub use headers::{scrub_request_headers, scrub_response_headers, search_auth_headers};
#[cfg(any(test, feature = "mock"))]
pub use mock::{CannedResponse, MockQdrant, RecordedRequest};
pub use model::{SearchParams, search_vector, widen_search_body};
