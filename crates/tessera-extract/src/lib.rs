//! # Tessera Extract
//!
//! Assembles the input mapping that field validation reads from.
//!
//! | Step | Behaviour |
//! |------|-----------|
//! | Negotiate | `application/json` decodes the raw body, anything else uses the pre-parsed body |
//! | Check | The body must be an object; a JSON body must fit the size limit |
//! | Merge | Query parameters first, body on top |
//! | Normalise | Strings are trimmed recursively |
//!
//! ## Example
//!
//! ```rust
//! use tessera_core::ServerRequest;
//! use tessera_extract::extract_fields;
//! use bytes::Bytes;
//!
//! let request = ServerRequest::from_http(
//!     http::Request::builder()
//!         .uri("/search?q=%20rust%20")
//!         .body(Bytes::new())
//!         .unwrap(),
//! );
//!
//! let input = extract_fields(&request).unwrap();
//! assert_eq!(input["q"], "rust");
//! ```

#![doc(html_root_url = "https://docs.rs/tessera-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod extractor;
mod trim;

pub use error::{ExtractionError, ExtractionSource};
pub use extractor::{extract_fields, query_params, FieldExtractor, DEFAULT_MAX_BODY_SIZE};
pub use trim::{trim_str, trim_value, TRIM_CHARS};
