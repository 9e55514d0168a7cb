//! Literal helpers shared by the dialect renderers.

use std::fmt::Write as _;

use crate::{Error, Result};

/// `'it''s'` style quoting with an optional prefix such as `N` or `E`.
#[must_use]
pub fn quote_string(prefix: &str, raw: &str) -> String {
    format!("{prefix}'{}'", raw.replace('\'', "''"))
}

pub fn render_real(value: f64) -> Result<String> {
    if !value.is_finite() {
        return Err(Error::UnsupportedType(format!(
            "non-finite float `{value}` has no SQL literal"
        )));
    }

    // `{:?}` keeps a trailing `.0` so the backend reads a float, not an integer.
    Ok(format!("{value:?}"))
}

#[must_use]
pub fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(out, "{byte:02X}").expect("writing to String should not fail");
    }
    out
}
