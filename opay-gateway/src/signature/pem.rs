//! PEM normalization for configured key material.
//!
//! Keys pasted from configuration files often carry stray indentation,
//! carriage returns or joined lines. The header and footer lines are kept
//! verbatim on their own lines; the body is reduced to the base64 alphabet and
//! re-wrapped at 64 columns.

const MARKER: &str = "-----";
const LINE_WIDTH: usize = 64;

/// Normalize a PEM document. Input without a `-----BEGIN` marker is only
/// trimmed.
///
/// ```
/// use opay_gateway::signature::pem::normalize_pem;
///
/// let messy = "  -----BEGIN PUBLIC KEY-----  MIIB IjAN\r\n\tBgkq -----END PUBLIC KEY-----  ";
/// assert_eq!(
///     normalize_pem(messy),
///     "-----BEGIN PUBLIC KEY-----\nMIIBIjANBgkq\n-----END PUBLIC KEY-----\n"
/// );
/// ```
pub fn normalize_pem(input: &str) -> String {
    let Some(header) = find_marker(input, "-----BEGIN", 0) else {
        return input.trim().to_string();
    };
    let footer = find_marker(input, "-----END", header.1);

    let body_end = footer.map_or(input.len(), |(start, _)| start);
    let body: String = input[header.1..body_end]
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        .collect();

    let mut out = String::with_capacity(body.len() + body.len() / LINE_WIDTH + 128);
    out.push_str(&input[header.0..header.1]);
    out.push('\n');
    // body is pure ASCII, so byte chunks are valid UTF-8
    for line in body.as_bytes().chunks(LINE_WIDTH) {
        out.push_str(std::str::from_utf8(line).unwrap_or_default());
        out.push('\n');
    }
    if let Some((start, end)) = footer {
        out.push_str(&input[start..end]);
        out.push('\n');
    }
    out
}

/// Locate `-----BEGIN ...-----` style markers, returning `(start, end)`.
fn find_marker(input: &str, prefix: &str, from: usize) -> Option<(usize, usize)> {
    let start = from + input[from..].find(prefix)?;
    let label_start = start + prefix.len();
    let close = label_start + input[label_start..].find(MARKER)?;
    Some((start, close + MARKER.len()))
}

/// Label of the first PEM block, e.g. `RSA PRIVATE KEY`.
pub(crate) fn pem_label(pem: &str) -> Option<&str> {
    let (start, end) = find_marker(pem, "-----BEGIN ", 0)?;
    Some(pem[start + "-----BEGIN ".len()..end - MARKER.len()].trim())
}
