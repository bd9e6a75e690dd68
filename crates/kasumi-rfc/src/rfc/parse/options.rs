//! Parser settings.

use std::sync::Arc;

use kasumi_core::Settings;
use kasumi_core::constants::{DEFAULT_LINE_OCTETS, DEFAULT_MAX_DEPTH, DEFAULT_TIMEZONE};

use crate::rfc::core::Component;
use crate::rfc::tz::{DocumentResolver, IanaProvider, TimezoneProvider};

/// How forgiving the parser is and where it looks up timezones.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Promote value errors, unresolved timezones, over-long lines, trailing
    /// content and structure errors to [`super::ParseError`]s.
    pub strict: bool,
    /// Deepest allowed component nesting (the root is depth 1).
    pub max_depth: usize,
    /// Longest physical line, in octets, accepted in strict mode.
    pub max_line_octets: usize,
    /// Zone that floating times are read in for time-range queries.
    pub default_timezone: String,
    /// Source for `TZID`s the document does not define itself.
    pub provider: Arc<dyn TimezoneProvider>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_line_octets: DEFAULT_LINE_OCTETS,
            default_timezone: DEFAULT_TIMEZONE.to_string(),
            provider: Arc::new(IanaProvider),
        }
    }
}

impl From<&Settings> for ParseOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            strict: settings.parser.strict,
            max_depth: settings.parser.max_depth,
            max_line_octets: settings.parser.max_line_octets,
            default_timezone: settings.parser.default_timezone.clone(),
            ..Self::default()
        }
    }
}

impl ParseOptions {
    /// Default options with strict mode on.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn TimezoneProvider>) -> Self {
        self.provider = provider;
        self
    }

    /// Resolver for a parsed document using these options' provider and
    /// default timezone.
    #[must_use]
    pub fn resolver_for(&self, root: &Component) -> DocumentResolver {
        DocumentResolver::new(Arc::clone(&self.provider))
            .with_document(root)
            .with_default_timezone_id(&self.default_timezone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_flow_into_options() {
        let mut settings = Settings::default();
        settings.parser.strict = true;
        settings.parser.max_depth = 8;
        let options = ParseOptions::from(&settings);
        assert!(options.strict);
        assert_eq!(options.max_depth, 8);
        assert_eq!(options.max_line_octets, DEFAULT_LINE_OCTETS);
    }
}
