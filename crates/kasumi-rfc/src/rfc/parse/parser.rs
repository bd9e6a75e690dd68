//! Document parser for iCalendar and vCard.
//!
//! Builds a component tree from unfolded content lines. Value types come from
//! the `VALUE` parameter, then the property registry, then TEXT.

use std::collections::{HashMap, HashSet};

use kasumi_core::DocumentKind;

use super::charset;
use super::diagnostics::Diagnostic;
use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{LogicalLine, parse_content_line, unfold};
use super::options::ParseOptions;
use super::values::{self, unescape_text};
use crate::error::{ValueError, ValueErrorKind};
use crate::rfc::core::{
    Component, ComponentKind, ContentLine, Parameter, Property, Value, ValueType, names, registry,
};

/// Parses a document with default (lenient) options.
///
/// ## Errors
///
/// Returns an error if the input is not a well-formed iCalendar or vCard
/// document.
pub fn parse(input: &str) -> ParseResult<Component> {
    Parser::new(ParseOptions::default()).parse(input)
}

/// Parses a document and returns it with the diagnostics collected on the way.
///
/// ## Errors
///
/// Returns an error if the input is malformed, or in strict mode if any
/// diagnostic condition occurs.
pub fn parse_with(input: &str, options: &ParseOptions) -> ParseResult<(Component, Vec<Diagnostic>)> {
    let mut parser = Parser::new(options.clone());
    let root = parser.parse(input)?;
    Ok((root, parser.take_diagnostics()))
}

/// A reusable parser holding options and the diagnostics of its last run.
#[derive(Debug)]
pub struct Parser {
    options: ParseOptions,
    diagnostics: Vec<Diagnostic>,
    document: DocumentKind,
    document_tzids: HashSet<String>,
    known_tzids: HashMap<String, bool>,
}

impl Parser {
    #[must_use]
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            diagnostics: Vec::new(),
            document: DocumentKind::Calendar,
            document_tzids: HashSet::new(),
            known_tzids: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Findings from the last [`Parser::parse`] call.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Parses one document rooted at `VCALENDAR` or `VCARD`.
    ///
    /// ## Errors
    ///
    /// Returns a positioned error for empty input, a root that is not a
    /// document, unbalanced `BEGIN`/`END`, malformed content lines, or nesting
    /// deeper than the configured limit. In strict mode value errors,
    /// unresolved timezones, over-long lines, trailing content and structure
    /// errors are fatal too.
    #[tracing::instrument(skip(self, input), fields(input_len = input.len(), strict = self.options.strict))]
    pub fn parse(&mut self, input: &str) -> ParseResult<Component> {
        tracing::debug!("Parsing document");
        self.diagnostics.clear();
        self.known_tzids.clear();

        let lines = unfold(input, !self.options.strict);
        if lines.is_empty() {
            tracing::warn!("Empty input");
            return Err(ParseError::new(ParseErrorKind::EmptyInput, 1, 1));
        }
        tracing::trace!(count = lines.len(), "Unfolded lines");

        let content_lines = self.lex(lines)?;
        self.document_tzids = content_lines
            .iter()
            .filter(|cl| cl.name == names::TZID)
            .map(|cl| cl.raw_value.trim().to_string())
            .collect();

        let root = self.build(content_lines)?;

        if self.options.strict
            && let Some(err) = root.validate().first()
        {
            tracing::warn!(error = %err, "Structure validation failed");
            return Err(ParseError::from_structure(err, 1));
        }

        tracing::debug!(
            root = root.name(),
            diagnostics = self.diagnostics.len(),
            "Document parsed"
        );
        Ok(root)
    }

    fn lex(&mut self, lines: Vec<LogicalLine>) -> ParseResult<Vec<ContentLine>> {
        let mut content_lines = Vec::with_capacity(lines.len());
        for line in lines {
            if line.octets > self.options.max_line_octets {
                if self.options.strict {
                    return Err(
                        ParseError::new(ParseErrorKind::LineTooLong, line.line, 1)
                            .with_context(format!("{} octets", line.octets)),
                    );
                }
                self.diagnostics.push(Diagnostic::LineTooLong {
                    line: line.line,
                    octets: line.octets,
                });
            }
            content_lines.push(parse_content_line(&line.text, line.line)?);
        }
        Ok(content_lines)
    }

    fn build(&mut self, content_lines: Vec<ContentLine>) -> ParseResult<Component> {
        let mut iter = content_lines.into_iter();
        let Some(first) = iter.next() else {
            return Err(ParseError::new(ParseErrorKind::EmptyInput, 1, 1));
        };
        if first.name != "BEGIN" {
            return Err(ParseError::new(ParseErrorKind::MissingBegin, first.line, 1)
                .with_context(format!("found {}", first.name)));
        }
        let root_name = first.raw_value.trim().to_ascii_uppercase();
        let root_kind = ComponentKind::parse(&root_name);
        if !matches!(root_kind, ComponentKind::Calendar | ComponentKind::Card) {
            return Err(ParseError::new(ParseErrorKind::InvalidRoot, first.line, 1)
                .with_context(root_name));
        }
        self.document = root_kind.document();

        let mut stack = vec![(Component::named(root_name), first.line)];
        let mut last_line = first.line;

        for cl in iter.by_ref() {
            last_line = cl.line;
            match cl.name.as_str() {
                "BEGIN" => {
                    if stack.len() >= self.options.max_depth {
                        return Err(ParseError::new(ParseErrorKind::DepthExceeded, cl.line, 1)
                            .with_context(format!("limit {}", self.options.max_depth)));
                    }
                    let name = cl.raw_value.trim().to_ascii_uppercase();
                    tracing::trace!(component = %name, line = cl.line, "Begin component");
                    stack.push((Component::named(name), cl.line));
                }
                "END" => {
                    let end_name = cl.raw_value.trim().to_ascii_uppercase();
                    let Some((component, _)) = stack.pop() else {
                        break;
                    };
                    if component.name() != end_name {
                        return Err(
                            ParseError::new(ParseErrorKind::MismatchedComponent, cl.line, 1)
                                .with_context(format!(
                                    "expected END:{}, got END:{end_name}",
                                    component.name()
                                )),
                        );
                    }
                    match stack.last_mut() {
                        Some((parent, _)) => {
                            parent.add_child(component);
                        }
                        None => return self.finish(component, iter.next()),
                    }
                }
                _ => {
                    let property = self.property(cl)?;
                    if let Some((parent, _)) = stack.last_mut() {
                        parent.add_child(property);
                    }
                }
            }
        }

        let (open, begin_line) = stack
            .last()
            .map_or_else(|| (String::new(), 1), |(c, line)| (c.name().to_string(), *line));
        Err(ParseError::new(ParseErrorKind::MissingEnd, last_line, 1)
            .with_context(format!("missing END:{open} for BEGIN on line {begin_line}")))
    }

    /// Handles whatever follows the root's `END`.
    fn finish(&mut self, root: Component, trailing: Option<ContentLine>) -> ParseResult<Component> {
        if let Some(extra) = trailing {
            if self.options.strict {
                return Err(ParseError::new(ParseErrorKind::TrailingContent, extra.line, 1));
            }
            tracing::warn!(line = extra.line, "Ignoring content after document end");
            self.diagnostics
                .push(Diagnostic::TrailingContent { line: extra.line });
        }
        Ok(root)
    }

    fn property(&mut self, cl: ContentLine) -> ParseResult<Property> {
        let ContentLine {
            group,
            name,
            mut params,
            raw_value,
            line,
            value_column,
        } = cl;
        let param = |params: &[Parameter], key: &str| {
            params
                .iter()
                .find(|p| p.is(key))
                .and_then(|p| p.value())
                .map(str::to_string)
        };

        let encoding = param(&params, names::ENCODING).map(|e| e.to_ascii_uppercase());
        let mut raw = raw_value;

        if encoding.as_deref() == Some("QUOTED-PRINTABLE") {
            let charset_name = param(&params, names::CHARSET);
            let (text, exact) =
                charset::decode(charset::decode_quoted_printable(&raw), charset_name.as_deref());
            if !exact {
                let charset_name = charset_name.unwrap_or_else(|| "UTF-8".to_string());
                if self.options.strict {
                    return Err(ParseError::new(
                        ParseErrorKind::Value(ValueErrorKind::InvalidCharset),
                        line,
                        value_column,
                    )
                    .with_context(charset_name));
                }
                tracing::warn!(line, charset = %charset_name, "Lossy charset decode");
                self.diagnostics.push(Diagnostic::Charset {
                    line,
                    charset: charset_name,
                });
            }
            raw = text;
            params.retain(|p| !p.is(names::ENCODING) && !p.is(names::CHARSET));
        }

        let base64 = matches!(encoding.as_deref(), Some("B" | "BASE64"));
        let explicit = param(&params, names::VALUE);

        let ty = if base64 {
            ValueType::Binary
        } else if let Some(declared) = explicit.as_deref() {
            if let Some(ty) = ValueType::from_param(declared) {
                ty
            } else {
                tracing::trace!(property = %name, value_type = declared, "Unknown VALUE type");
                return Ok(Property::from_parts(group, name, params, Value::Unknown(raw)));
            }
        } else {
            registry::default_value_type(self.document, &name)
        };

        let parsed = self.typed_value(&name, ty, &raw, explicit.is_some());
        let mut value = match parsed {
            Ok(value) => value,
            Err(err) if self.options.strict => {
                return Err(ParseError::from_value(&err, line, value_column)
                    .with_context(format!("{name}: {:?}", err.value)));
            }
            Err(err) => {
                tracing::warn!(line, property = %name, error = %err, "Value kept as text");
                self.diagnostics.push(Diagnostic::ValueFallback {
                    line,
                    property: name.clone(),
                    error: err,
                });
                Value::Text(unescape_text(&raw))
            }
        };

        if let Some(tzid) = param(&params, names::TZID)
            && values::has_floating(&value)
        {
            if self.is_known_tzid(&tzid) {
                value = values::zone(value, &tzid);
            } else if self.options.strict {
                return Err(ParseError::new(
                    ParseErrorKind::Value(ValueErrorKind::UnresolvedTimezone),
                    line,
                    value_column,
                )
                .with_context(tzid));
            } else {
                tracing::warn!(line, tzid = %tzid, "Unresolved TZID, keeping floating time");
                self.diagnostics
                    .push(Diagnostic::TimezoneUnresolved { line, tzid });
            }
        }

        Ok(Property::from_parts(group, name, params, value))
    }

    fn typed_value(
        &self,
        name: &str,
        ty: ValueType,
        raw: &str,
        explicit: bool,
    ) -> Result<Value, ValueError> {
        if ty == ValueType::Binary {
            return values::parse_binary(raw, self.options.strict).map(Value::Binary);
        }
        if !explicit && registry::is_structured(self.document, name) {
            return Ok(values::parse_structured(raw));
        }
        let value = if registry::is_multi_value(self.document, name) {
            values::parse_list(ty, raw)?
        } else {
            values::parse_single(ty, raw)?
        };
        if self.options.strict && ty == ValueType::DateTime && values::has_date(&value) {
            return Err(ValueError::new(ValueErrorKind::InvalidDateTime, raw));
        }
        Ok(value)
    }

    fn is_known_tzid(&mut self, tzid: &str) -> bool {
        if self.document_tzids.contains(tzid) {
            return true;
        }
        if let Some(&known) = self.known_tzids.get(tzid) {
            return known;
        }
        let known = self.options.provider.resolve(tzid).is_some();
        self.known_tzids.insert(tzid.to_string(), known);
        known
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::core::{Date, DateTime, Duration};

    const EVENT: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:evt-1@example.com\r\n\
DTSTAMP:20260101T000000Z\r\n\
DTSTART;TZID=America/New_York:20260110T090000\r\n\
DURATION:PT1H\r\n\
SUMMARY:Planning\\, round 2\r\n\
CATEGORIES:WORK,PLANNING\r\n\
SEQUENCE:3\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test_log::test]
    fn parses_typed_event() {
        let calendar = parse(EVENT).unwrap();
        assert_eq!(calendar.kind(), ComponentKind::Calendar);
        let event = calendar.component("VEVENT").unwrap();
        assert_eq!(event.text("SUMMARY"), Some("Planning, round 2"));
        assert_eq!(
            event.property("DTSTART").unwrap().value(),
            &Value::DateTime(DateTime::zoned(2026, 1, 10, 9, 0, 0, "America/New_York"))
        );
        assert_eq!(
            event.property("DURATION").unwrap().value(),
            &Value::Duration(Duration::hours(1))
        );
        assert_eq!(event.property("SEQUENCE").unwrap().value().as_integer(), Some(3));
        assert_eq!(
            event.property("CATEGORIES").unwrap().value(),
            &Value::List(vec![Value::text("WORK"), Value::text("PLANNING")])
        );
    }

    #[test_log::test]
    fn value_param_overrides_default() {
        let input = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nDTSTART;VALUE=DATE:20260110\r\n\
X-COUNT;VALUE=INTEGER:7\r\nX-ODD;VALUE=X-MADE-UP:raw\\,text\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
        let calendar = parse(input).unwrap();
        let event = calendar.component("VEVENT").unwrap();
        assert_eq!(
            event.property("DTSTART").unwrap().value(),
            &Value::Date(Date::new(2026, 1, 10))
        );
        assert_eq!(event.property("X-COUNT").unwrap().value(), &Value::Integer(7));
        assert_eq!(
            event.property("X-ODD").unwrap().value(),
            &Value::Unknown("raw\\,text".into())
        );
    }

    #[test_log::test]
    fn lenient_value_fallback_records_diagnostic() {
        let input = "BEGIN:VCALENDAR\r\nBEGIN:VTODO\r\nPRIORITY:high\r\nEND:VTODO\r\nEND:VCALENDAR\r\n";
        let (calendar, diagnostics) = parse_with(input, &ParseOptions::default()).unwrap();
        let todo = calendar.component("VTODO").unwrap();
        assert_eq!(todo.text("PRIORITY"), Some("high"));
        assert!(matches!(
            diagnostics.as_slice(),
            [Diagnostic::ValueFallback { line: 3, .. }]
        ));

        let err = parse_with(input, &ParseOptions::strict()).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Value(ValueErrorKind::InvalidInteger));
        assert_eq!((err.line, err.column), (3, 10));
    }

    #[test_log::test]
    fn unresolved_tzid() {
        let input = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nDTSTART;TZID=Nowhere/Special:20260110T090000\r\n\
END:VEVENT\r\nEND:VCALENDAR\r\n";
        let (calendar, diagnostics) = parse_with(input, &ParseOptions::default()).unwrap();
        let dtstart = calendar.component("VEVENT").unwrap().property("DTSTART").unwrap();
        assert!(dtstart.value().as_datetime().is_some_and(DateTime::is_floating));
        assert_eq!(dtstart.param_value("TZID"), Some("Nowhere/Special"));
        assert_eq!(
            diagnostics,
            vec![Diagnostic::TimezoneUnresolved {
                line: 3,
                tzid: "Nowhere/Special".into()
            }]
        );

        let err = parse_with(input, &ParseOptions::strict()).unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::Value(ValueErrorKind::UnresolvedTimezone)
        );
    }

    #[test_log::test]
    fn tzid_defined_later_in_document() {
        let input = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nDTSTART;TZID=Custom Zone:20260110T090000\r\n\
END:VEVENT\r\nBEGIN:VTIMEZONE\r\nTZID:Custom Zone\r\nBEGIN:STANDARD\r\nDTSTART:19700101T000000\r\n\
TZOFFSETFROM:+0100\r\nTZOFFSETTO:+0100\r\nEND:STANDARD\r\nEND:VTIMEZONE\r\nEND:VCALENDAR\r\n";
        let (calendar, diagnostics) = parse_with(input, &ParseOptions::default()).unwrap();
        assert!(diagnostics.is_empty());
        let dtstart = calendar.component("VEVENT").unwrap().property("DTSTART").unwrap();
        assert_eq!(
            dtstart.value().as_datetime().and_then(DateTime::tzid),
            Some("Custom Zone")
        );
    }

    #[test_log::test]
    fn structural_errors() {
        let kind = |input: &str| parse(input).unwrap_err().kind;
        assert_eq!(kind(""), ParseErrorKind::EmptyInput);
        assert_eq!(kind("\r\n\r\n"), ParseErrorKind::EmptyInput);
        assert_eq!(kind("VERSION:2.0\r\n"), ParseErrorKind::MissingBegin);
        assert_eq!(kind("BEGIN:VEVENT\r\nEND:VEVENT\r\n"), ParseErrorKind::InvalidRoot);
        assert_eq!(
            kind("BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nEND:VCALENDAR\r\n"),
            ParseErrorKind::MismatchedComponent
        );
        assert_eq!(
            kind("BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nUID:x\r\n"),
            ParseErrorKind::MissingEnd
        );
    }

    #[test_log::test]
    fn depth_limit() {
        let mut input = String::from("BEGIN:VCALENDAR\r\n");
        for _ in 0..4 {
            input.push_str("BEGIN:X-NEST\r\n");
        }
        for _ in 0..4 {
            input.push_str("END:X-NEST\r\n");
        }
        input.push_str("END:VCALENDAR\r\n");

        let options = ParseOptions {
            max_depth: 4,
            ..ParseOptions::default()
        };
        let err = parse_with(&input, &options).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::DepthExceeded);
        assert_eq!(err.line, 5);

        let options = ParseOptions {
            max_depth: 5,
            ..ParseOptions::default()
        };
        assert!(parse_with(&input, &options).is_ok());
    }

    #[test_log::test]
    fn trailing_content() {
        let input = "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:A\r\nEND:VCARD\r\nFN:stray\r\n";
        let (card, diagnostics) = parse_with(input, &ParseOptions::default()).unwrap();
        assert_eq!(card.kind(), ComponentKind::Card);
        assert_eq!(diagnostics, vec![Diagnostic::TrailingContent { line: 5 }]);

        let err = parse_with(input, &ParseOptions::strict()).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TrailingContent);
    }

    #[test_log::test]
    fn line_length_limit() {
        let long = format!(
            "BEGIN:VCARD\r\nVERSION:4.0\r\nFN:A\r\nNOTE:{}\r\nEND:VCARD\r\n",
            "x".repeat(100)
        );
        let (_, diagnostics) = parse_with(&long, &ParseOptions::default()).unwrap();
        assert_eq!(
            diagnostics,
            vec![Diagnostic::LineTooLong {
                line: 4,
                octets: 105
            }]
        );
        let err = parse_with(&long, &ParseOptions::strict()).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::LineTooLong);
    }

    #[test_log::test]
    fn vcard21_quoted_printable() {
        let input = "BEGIN:VCARD\r\nVERSION:2.1\r\nN:Doe;John\r\nFN:John Doe\r\n\
NOTE;ENCODING=QUOTED-PRINTABLE;CHARSET=ISO-8859-1:Caf=E9 =\r\nconvers=E9\r\n\
TEL;HOME;VOICE:555-1234\r\nEND:VCARD\r\n";
        let card = parse(input).unwrap();
        let note = card.property("NOTE").unwrap();
        assert_eq!(note.as_text(), Some("Café conversé"));
        assert!(note.param("ENCODING").is_none());
        assert!(note.param("CHARSET").is_none());
        assert_eq!(card.property("TEL").unwrap().param_values("TYPE"), vec!["HOME", "VOICE"]);
        assert_eq!(
            card.property("N").unwrap().value(),
            &Value::Structured(vec![vec!["Doe".into()], vec!["John".into()]])
        );
    }

    #[test_log::test]
    fn base64_payload() {
        let input = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:A\r\nPHOTO;ENCODING=b;TYPE=JPEG:aGVs\r\n  bG8=\r\nEND:VCARD\r\n";
        let card = parse(input).unwrap();
        assert_eq!(
            card.property("PHOTO").unwrap().value(),
            &Value::Binary(b"hello".to_vec())
        );
        let err = parse_with(input, &ParseOptions::strict()).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Value(ValueErrorKind::InvalidBinary));
    }

    #[test_log::test]
    fn strict_mode_validates_structure() {
        let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:x\r\nBEGIN:VEVENT\r\n\
DTSTAMP:20260101T000000Z\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
        assert!(parse(input).is_ok());
        let err = parse_with(input, &ParseOptions::strict()).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Structure);
        assert!(err.context.contains("UID"));
    }

    #[test_log::test]
    fn strict_rejects_bare_date_in_datetime_slot() {
        let input = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:x\r\nBEGIN:VEVENT\r\nUID:a\r\n\
DTSTAMP:20260101T000000Z\r\nDTSTART:20260110\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
        let calendar = parse(input).unwrap();
        assert_eq!(
            calendar.component("VEVENT").unwrap().property("DTSTART").unwrap().value(),
            &Value::Date(Date::new(2026, 1, 10))
        );
        let err = parse_with(input, &ParseOptions::strict()).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Value(ValueErrorKind::InvalidDateTime));
    }
}
