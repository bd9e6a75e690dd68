//! XML encodings: xCal (RFC 6321) and xCard (RFC 6351).
//!
//! Both map onto the same component tree as the text encoding. Reading goes
//! through a small owned element tree built from `quick_xml` events; writing
//! builds that tree and streams it back out.

mod build;
mod element;
mod error;
mod namespace;
mod parse;
mod value;

pub use build::{to_xml, to_xml_all};
pub use error::{XmlError, XmlErrorKind, XmlResult};
pub use namespace::Namespace;
pub use parse::{parse_xml, parse_xml_with};
