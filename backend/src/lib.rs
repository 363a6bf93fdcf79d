//! Everyone Plays the Same Song backend.
//!
//! Quarterly cover rounds move through signups, song voting, covering and a
//! listening party. The phase calculator in [`domain::round`] decides which
//! phase a round is in; the rest of the crate exposes that over HTTP and
//! persists rounds, votes and submissions in PostgreSQL.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
