//! HTTP protocol layer module
//!
//! Range parsing, MIME lookup and response builders, decoupled from the
//! content store and the delivery pipeline.

pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use range::{parse_range_header, RangeOutcome, RangeWindow};
pub use response::{
    build_404_response, build_405_response, build_416_response, build_500_response,
    build_full_response, build_options_response, build_partial_response,
};
