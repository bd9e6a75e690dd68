//! Text serialization (RFC 5545 §3.1, RFC 6350 §3.2).
//!
//! - Escape: text and parameter value escaping
//! - Fold: content line folding at a configurable octet width
//! - Serializer: tree walk in document order

mod escape;
mod fold;
mod serializer;

pub use escape::{escape_param_value, escape_text};
pub use fold::{fold_line, fold_line_at};
pub use serializer::{SerializeOptions, serialize, serialize_property, serialize_with};
