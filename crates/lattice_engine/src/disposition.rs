/// Extracts a safe filename from a `Content-Disposition` header value.
///
/// Reads `filename="..."` (or an unquoted `filename=...` token), drops any
/// directory part and replaces characters that are not allowed in file
/// names. Returns `None` when no usable name remains.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let raw = split_params(header).into_iter().find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim().eq_ignore_ascii_case("filename").then_some(value.trim())
    })?;
    let sanitized = sanitize_filename(&unquote(raw));
    (!sanitized.is_empty()).then_some(sanitized)
}

/// Splits on `;` outside quoted strings.
fn split_params(header: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (idx, c) in header.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                params.push(header[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    params.push(header[start..].trim());
    params
}

/// Contents of a quoted-string (with `\"` escapes), or the token as-is.
fn unquote(raw: &str) -> String {
    let Some(rest) = raw.strip_prefix('"') else {
        return raw.to_string();
    };
    let mut out = String::new();
    let mut chars = rest.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => break,
            '\\' => out.extend(chars.next()),
            other => out.push(other),
        }
    }
    out
}

/// Keeps the last path component and maps forbidden characters to `_`.
pub fn sanitize_filename(input: &str) -> String {
    let base = input.rsplit(['/', '\\']).next().unwrap_or(input);
    let cleaned: String = base
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let trimmed = cleaned.trim_matches(&[' ', '.'][..]);
    let mut name = trimmed.to_string();
    let stem = file_stem(trimmed);
    if is_reserved_windows_name(stem) {
        name.insert(stem.len(), '_');
    }
    name
}

fn file_stem(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
