//! Splitting larger files into one object at a time.
//!
//! A CalDAV import hands in one `VCALENDAR` holding many events; a CardDAV
//! import hands in many concatenated `VCARD`s. [`Splitter`] turns either into
//! a lazy sequence of standalone documents: one calendar per UID (with every
//! timezone the source carries) or one card per `BEGIN:VCARD` block.

use std::collections::VecDeque;

use kasumi_core::constants::PRODUCT_ID;

use crate::error::RfcResult;
use crate::rfc::core::{Component, ComponentKind};
use crate::rfc::parse::{ParseOptions, Parser};

/// Lazy, finite iterator over the objects of a calendar or vCard file.
///
/// [`Splitter::reset`] starts over from the beginning of the input.
#[derive(Debug)]
pub struct Splitter {
    input: String,
    parser: Parser,
    source: Source,
}

#[derive(Debug)]
enum Source {
    Calendar(CalendarState),
    Cards { offset: usize },
}

#[derive(Debug)]
enum CalendarState {
    Unparsed,
    Ready {
        prodid: String,
        timezones: Vec<Component>,
        groups: VecDeque<Vec<Component>>,
    },
    Done,
}

impl Splitter {
    /// Splits one `VCALENDAR` into one calendar per UID.
    #[must_use]
    pub fn icalendar(input: impl Into<String>) -> Self {
        Self::icalendar_with(input, ParseOptions::default())
    }

    #[must_use]
    pub fn icalendar_with(input: impl Into<String>, options: ParseOptions) -> Self {
        Self {
            input: input.into(),
            parser: Parser::new(options),
            source: Source::Calendar(CalendarState::Unparsed),
        }
    }

    /// Splits concatenated `VCARD`s, parsing each block as it is reached.
    #[must_use]
    pub fn vcard(input: impl Into<String>) -> Self {
        Self::vcard_with(input, ParseOptions::default())
    }

    #[must_use]
    pub fn vcard_with(input: impl Into<String>, options: ParseOptions) -> Self {
        Self {
            input: input.into(),
            parser: Parser::new(options),
            source: Source::Cards { offset: 0 },
        }
    }

    /// Starts over from the beginning of the input.
    pub fn reset(&mut self) {
        self.source = match self.source {
            Source::Calendar(_) => Source::Calendar(CalendarState::Unparsed),
            Source::Cards { .. } => Source::Cards { offset: 0 },
        };
    }

    fn next_calendar(&mut self) -> Option<RfcResult<Component>> {
        let Source::Calendar(state) = &mut self.source else {
            return None;
        };
        if matches!(state, CalendarState::Unparsed) {
            match load_calendar(&mut self.parser, &self.input) {
                Ok(ready) => *state = ready,
                Err(err) => {
                    *state = CalendarState::Done;
                    return Some(Err(err));
                }
            }
        }
        let CalendarState::Ready {
            prodid,
            timezones,
            groups,
        } = state
        else {
            return None;
        };
        let group = groups.pop_front()?;

        let mut calendar = Component::calendar(prodid.as_str());
        for timezone in &*timezones {
            calendar.add_child(timezone.clone());
        }
        for component in group {
            calendar.add_child(component);
        }
        Some(Ok(calendar))
    }

    fn next_card(&mut self) -> Option<RfcResult<Component>> {
        let Source::Cards { offset } = &mut self.source else {
            return None;
        };
        let (start, end) = next_card_block(&self.input, *offset)?;
        *offset = end;
        tracing::trace!(start, end, "vCard block");
        Some(self.parser.parse(&self.input[start..end]).map_err(Into::into))
    }
}

impl Iterator for Splitter {
    type Item = RfcResult<Component>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.source {
            Source::Calendar(_) => self.next_calendar(),
            Source::Cards { .. } => self.next_card(),
        }
    }
}

/// Parses the calendar and groups its components by UID.
#[tracing::instrument(skip(parser, input), fields(input_len = input.len()))]
fn load_calendar(parser: &mut Parser, input: &str) -> RfcResult<CalendarState> {
    let root = parser.parse(input)?;
    let prodid = root.text("PRODID").unwrap_or(PRODUCT_ID).to_string();

    let mut timezones = Vec::new();
    let mut groups: Vec<(Option<String>, Vec<Component>)> = Vec::new();
    for component in root.components() {
        if component.kind() == ComponentKind::Timezone {
            timezones.push(component.clone());
            continue;
        }
        let uid = component.uid().map(str::to_string);
        match uid
            .as_ref()
            .and_then(|uid| groups.iter_mut().find(|(key, _)| key.as_ref() == Some(uid)))
        {
            Some((_, members)) => members.push(component.clone()),
            None => groups.push((uid, vec![component.clone()])),
        }
    }

    tracing::debug!(
        objects = groups.len(),
        timezones = timezones.len(),
        "Calendar split"
    );
    Ok(CalendarState::Ready {
        prodid,
        timezones,
        groups: groups.into_iter().map(|(_, members)| members).collect(),
    })
}

/// Byte range of the next `BEGIN:VCARD` .. `END:VCARD` block at or after
/// `offset`. An unterminated block runs to the end of the input.
fn next_card_block(input: &str, offset: usize) -> Option<(usize, usize)> {
    let mut start = None;
    let mut depth = 0usize;
    let mut position = offset;

    while position < input.len() {
        let line_end = input[position..]
            .find('\n')
            .map_or(input.len(), |i| position + i + 1);
        let line = input[position..line_end].trim();

        if line.eq_ignore_ascii_case("BEGIN:VCARD") {
            if start.is_none() {
                start = Some(position);
            }
            depth += 1;
        } else if line.eq_ignore_ascii_case("END:VCARD") && start.is_some() {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return start.map(|start| (start, line_end));
            }
        }
        position = line_end;
    }
    start.map(|start| (start, input.len()))
}
