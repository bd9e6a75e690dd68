//! Legacy vCard 2.1 encodings: quoted-printable and `CHARSET`.

/// Decodes quoted-printable (`=XX` hex escapes). Soft line breaks were
/// already joined during unfolding; a malformed escape is kept literally.
#[must_use]
pub fn decode_quoted_printable(raw: &str) -> Vec<u8> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'='
            && let Some(hex) = bytes.get(i + 1..i + 3)
            && let Ok(hex) = std::str::from_utf8(hex)
            && let Ok(byte) = u8::from_str_radix(hex, 16)
        {
            out.push(byte);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

/// Decodes bytes in the declared charset.
///
/// UTF-8 (the default), ISO-8859-1 and US-ASCII decode exactly. Any other
/// charset, or bytes invalid in the declared one, decode as lossy UTF-8 and
/// the returned flag is `false`.
#[must_use]
pub fn decode(bytes: Vec<u8>, charset: Option<&str>) -> (String, bool) {
    let charset = charset.map(str::to_ascii_uppercase);
    match charset.as_deref() {
        None | Some("UTF-8" | "UTF8") => match String::from_utf8(bytes) {
            Ok(text) => (text, true),
            Err(err) => (String::from_utf8_lossy(err.as_bytes()).into_owned(), false),
        },
        Some("ISO-8859-1" | "LATIN1" | "LATIN-1") => {
            (bytes.iter().map(|&b| char::from(b)).collect(), true)
        }
        Some("US-ASCII" | "ASCII") => {
            let exact = bytes.is_ascii();
            (String::from_utf8_lossy(&bytes).into_owned(), exact)
        }
        Some(_) => (String::from_utf8_lossy(&bytes).into_owned(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_printable() {
        assert_eq!(decode_quoted_printable("caf=C3=A9 =3D ok"), "café = ok".as_bytes());
        assert_eq!(decode_quoted_printable("bad=ZZ="), b"bad=ZZ=");
    }

    #[test]
    fn charsets() {
        assert_eq!(decode(vec![0x63, 0xE9], Some("iso-8859-1")), ("c\u{e9}".to_string(), true));
        assert_eq!(decode("é".as_bytes().to_vec(), None), ("é".to_string(), true));
        let (text, exact) = decode(vec![0x63, 0xE9], Some("UTF-8"));
        assert_eq!(text, "c\u{fffd}");
        assert!(!exact);
        assert!(!decode(b"abc".to_vec(), Some("SHIFT_JIS")).1);
    }
}
