use std::fmt::Write;

/// Percent-encodes everything outside the URI-component safe set, the way
/// browsers encode a query parameter value.
pub fn percent_encode(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  for byte in input.bytes() {
    match byte {
      b'A'..=b'Z'
      | b'a'..=b'z'
      | b'0'..=b'9'
      | b'-'
      | b'_'
      | b'.'
      | b'!'
      | b'~'
      | b'*'
      | b'\''
      | b'('
      | b')' => out.push(byte as char),
      _ => {
        let _ = write!(out, "%{byte:02X}");
      }
    }
  }
  out
}

/// Fractional hours rendered without float noise, e.g. `1.1`.
pub fn format_hours(hours: f64) -> String {
  let rounded = (hours * 100.0).round() / 100.0;
  format!("{rounded}")
}
