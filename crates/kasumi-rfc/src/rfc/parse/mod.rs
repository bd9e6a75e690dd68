//! Text-encoding parser (RFC 5545 §3, RFC 6350 §3).
//!
//! - Lexer: unfolding and content-line tokenizing
//! - Values: typed value parsers
//! - Charset: vCard 2.1 quoted-printable and `CHARSET` handling
//! - Parser: component tree construction, lenient or strict

mod charset;
mod diagnostics;
mod error;
mod lexer;
mod options;
mod parser;
pub mod values;

pub use diagnostics::Diagnostic;
pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use lexer::{LogicalLine, parse_content_line, unfold};
pub use options::ParseOptions;
pub use parser::{Parser, parse, parse_with};
