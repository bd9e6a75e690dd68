/// Crate identity shared across members
pub const PRODUCT_NAME: &str = "kasumi";
pub const PRODUCT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default `PRODID` written into generated calendars
pub const PRODUCT_ID: &str =
    const_str::concat!("-//", PRODUCT_NAME, "//", PRODUCT_NAME, " ", PRODUCT_VERSION, "//EN");

/// RFC 5545 §3.1 line length in octets, excluding the line break
pub const DEFAULT_LINE_OCTETS: usize = 75;

/// Nesting depth beyond which parsing fails fast
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Zone used for floating times when a query needs an absolute instant
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// XML namespaces for the xCal (RFC 6321) and xCard (RFC 6351) encodings
pub const XCAL_NS: &str = "urn:ietf:params:xml:ns:icalendar-2.0";
pub const XCARD_NS: &str = "urn:ietf:params:xml:ns:vcard-4.0";

/// Configuration file looked up in the working directory
pub const CONFIG_FILE: &str = const_str::concat!(PRODUCT_NAME, ".toml");
