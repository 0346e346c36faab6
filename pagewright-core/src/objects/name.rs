//! `#XX` escaping for name objects.

fn is_delimiter(byte: u8) -> bool {
    matches!(
        byte,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

/// Escapes a decoded name for output, without the leading solidus.
///
/// Characters are treated as single bytes (U+0000..U+00FF), matching how the
/// lexer decodes them.
pub fn escape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        let code = ch as u32;
        let byte = code.min(0xFF) as u8;
        if code > 0xFF || byte < b'!' || byte > b'~' || byte == b'#' || is_delimiter(byte) {
            out.push_str(&format!("#{byte:02X}"));
        } else {
            out.push(ch);
        }
    }
    out
}

/// Resolves `#XX` escapes in raw name bytes. Returns `None` on a malformed escape.
pub fn unescape_name(raw: &[u8]) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'#' {
            let hex = raw.get(i + 1..i + 3)?;
            let hi = (hex[0] as char).to_digit(16)?;
            let lo = (hex[1] as char).to_digit(16)?;
            out.push(char::from((hi * 16 + lo) as u8));
            i += 3;
        } else {
            out.push(raw[i] as char);
            i += 1;
        }
    }
    Some(out)
}
