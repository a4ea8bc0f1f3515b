//! Percent-encoding helpers matching the transport's url escaping rules:
//! everything except ASCII alphanumerics and `-._~` is encoded.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

const URL_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Returns a percent-encoded copy of `data`.
pub fn escape(data: &str) -> String {
    utf8_percent_encode(data, URL_ESCAPE).to_string()
}

/// Decodes percent-encoded `data` once.
pub fn unescape(data: &str) -> String {
    percent_decode_str(data).decode_utf8_lossy().into_owned()
}

/// Decodes percent-encoded `data` repeatedly until nothing is left to decode.
pub fn unescape_recurse(data: &str) -> String {
    let mut current = data.to_owned();
    loop {
        let decoded = unescape(&current);
        if decoded == current {
            return decoded;
        }
        current = decoded;
    }
}
