use plancritic_core::Review;

/// Strip surrounding whitespace and a markdown code fence, if any.
///
/// Handles "```json" and bare "```" openers, with or without a closing fence.
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    let clean = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let clean = clean.trim_end();
    clean.strip_suffix("```").unwrap_or(clean).trim()
}

/// Extract the first balanced `{...}` object, ignoring braces inside strings.
fn extract_json_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;
    let mut start_idx = None;

    for (i, c) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        if c == '\\' && in_string {
            escape_next = true;
            continue;
        }

        if c == '"' {
            if start_idx.is_some() {
                in_string = !in_string;
            }
            continue;
        }

        if in_string {
            continue;
        }

        if c == '{' {
            if depth == 0 {
                start_idx = Some(i);
            }
            depth += 1;
        } else if c == '}' && depth > 0 {
            depth -= 1;
            if depth == 0 {
                if let Some(start) = start_idx {
                    return Some(&text[start..=i]);
                }
            }
        }
    }

    None
}

/// Parse provider output into a [`Review`].
///
/// Tries the fence-stripped text first, then the first balanced object found
/// anywhere in the response (models sometimes wrap JSON in prose). Returns the
/// last decode error when nothing parses.
pub fn parse_review(text: &str) -> Result<Review, serde_json::Error> {
    let primary = extract_json(text);
    let err = match serde_json::from_str::<Review>(primary) {
        Ok(review) => return Ok(review),
        Err(err) => err,
    };

    match extract_json_object(text) {
        Some(fragment) if fragment != primary => serde_json::from_str(fragment),
        _ => Err(err),
    }
}
