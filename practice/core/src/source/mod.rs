//! Sequence Sources
//!
//! Where practice sequences come from. The engine only knows the
//! [`SequenceSource`] trait; concrete sources decide whether that means a
//! REST call or a built-in catalog.
//!
//! # Available Sources
//!
//! - **Http**: the yogaflow REST API (`GET /sequences/{id}`)
//! - **Catalog**: in-memory library, used offline and as a mock API
//!
//! # Usage
//!
//! ```ignore
//! use practice_core::source::{HttpSequenceSource, SequenceSource};
//!
//! let source = HttpSequenceSource::new("http://localhost:8080/api")?;
//! let sequence = source.fetch(&"sun-salutation".into()).await?;
//! ```

mod catalog;
mod http;
mod traits;

pub use catalog::CatalogSequenceSource;
pub use http::HttpSequenceSource;
pub use traits::{FailureKind, FetchError, SequenceSource};
