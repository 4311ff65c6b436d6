/// The first `max_chars` characters of `s`, never splitting a character.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Strip markdown code fences from a response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Locate the first balanced JSON object in free text.
///
/// Models often wrap the object in prose or code fences. Braces inside string
/// literals (including escaped quotes) do not count toward the balance.
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse the first balanced JSON object in `text` into `T`.
pub fn parse_structured<T: serde::de::DeserializeOwned>(
    text: &str,
) -> Result<T, crate::AiError> {
    let block = extract_json_block(strip_code_blocks(text))
        .ok_or_else(|| crate::AiError::Parse("no JSON object found in response".into()))?;
    Ok(serde_json::from_str(block)?)
}
