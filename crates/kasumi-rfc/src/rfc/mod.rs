//! RFC 5545 / 6350 document handling.
//!
//! - `core`: value model and component tree
//! - `parse`: text-encoding parser
//! - `build`: text-encoding serializer
//! - `xml`: xCal / xCard encodings
//! - `tz`: timezone resolution
//! - `itip`: scheduling broker
//! - `split`: one-object-at-a-time splitting of larger files

pub mod build;
pub mod core;
pub mod itip;
pub mod parse;
pub mod split;
pub mod tz;
pub mod xml;


pub use build::serialize;
pub use core::{Component, ComponentKind, Node, Parameter, Property, Value};
pub use parse::{ParseError, ParseResult, parse};
pub use xml::{parse_xml, to_xml};
