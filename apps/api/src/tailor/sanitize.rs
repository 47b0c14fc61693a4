//! Response sanitizer: strips the non-payload artifacts models wrap around
//! JSON so the remainder can be handed to the parser.

/// Removes invisible characters, markdown code fences, surrounding
/// whitespace, a leading BOM, and C0 control characters (tab survives) from
/// raw model output, in that order.
///
/// The pass runs to a fixed point: stripping one artifact layer can expose
/// another (a control byte ahead of a fence hides the fence from a single
/// pass), and `sanitize(sanitize(x))` must equal `sanitize(x)`.
pub fn sanitize(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let next = sanitize_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn sanitize_pass(text: &str) -> String {
    let no_invisible: String = text
        .chars()
        .filter(|c| !matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}'))
        .collect();

    let unfenced = strip_code_fences(&no_invisible);
    let trimmed = unfenced.trim();
    let no_bom = trimmed.strip_prefix('\u{FEFF}').unwrap_or(trimmed);

    // Literal control characters only. Escaped sequences inside JSON strings
    // ("\n") are two plain characters and pass through untouched.
    no_bom
        .chars()
        .filter(|&c| c == '\t' || c as u32 >= 0x20)
        .collect()
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_fence_with_json_tag() {
        assert_eq!(sanitize("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_strips_fence_without_tag() {
        assert_eq!(sanitize("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_unfenced_input_passes_through() {
        assert_eq!(sanitize("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn test_removes_zero_width_characters() {
        let input = "\u{200B}{\"a\":\u{200C} 1\u{200D}}\u{FEFF}";
        assert_eq!(sanitize(input), "{\"a\": 1}");
    }

    #[test]
    fn test_removes_leading_bom() {
        assert_eq!(sanitize("\u{FEFF}{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn test_strips_control_characters_but_keeps_tab() {
        let input = "\u{0001}{\"a\":\t1}\u{0007}";
        assert_eq!(sanitize(input), "{\"a\":\t1}");
    }

    #[test]
    fn test_preserves_escaped_newline_in_payload() {
        // The two-character sequence \n inside a JSON string is not a control
        // character and must survive, then parse back to a real newline.
        let input = "{\"content\": \"line1\\nline2\"}";
        let clean = sanitize(input);
        assert_eq!(clean, input);

        let value: serde_json::Value = serde_json::from_str(&clean).unwrap();
        assert_eq!(value["content"], "line1\nline2");
    }

    #[test]
    fn test_idempotent_on_fenced_input() {
        let once = sanitize("```json\n{\"a\": 1}\n```");
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn test_idempotent_when_stripping_exposes_a_fence() {
        // The control byte hides the fence from a naive single pass; the
        // fixed-point loop still reduces this to bare JSON.
        let input = "\u{0001}```json\n{\"a\": 1}\n```";
        let once = sanitize(input);
        assert_eq!(once, "{\"a\": 1}");
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn test_fence_inside_whitespace() {
        assert_eq!(sanitize("  \n```json\n{\"a\": 1}\n```  \n"), "{\"a\": 1}");
    }

    #[test]
    fn test_empty_input_is_unchanged() {
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_plain_prose_survives_minus_newlines() {
        // Non-JSON fallback text stays recoverable after stripping.
        let input = "I cannot produce JSON for this,\nsorry.";
        assert_eq!(sanitize(input), "I cannot produce JSON for this,sorry.");
    }
}
