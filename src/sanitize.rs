//! filesystem path sanitization (C1)

const UNSAFE_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// strip filesystem-unsafe characters from `s` and truncate the UTF-8
/// encoding to at most `max_bytes`, never splitting a multi-byte code point.
/// trailing whitespace is stripped after truncation. §4.1/§8 invariant 1.
pub fn sanitize(s: &str, max_bytes: usize) -> String {
    let stripped: String = s.chars().filter(|c| !UNSAFE_CHARS.contains(c)).collect();

    if stripped.len() <= max_bytes {
        return stripped;
    }

    let mut end = max_bytes;
    while end > 0 && !stripped.is_char_boundary(end) {
        end -= 1;
    }

    stripped[..end].trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_unsafe_characters() {
        assert_eq!(sanitize("a/b:c*d", 200), "abcd");
    }

    #[test]
    fn truncates_ascii_to_byte_limit() {
        let input = "a".repeat(201);
        let out = sanitize(&input, 200);
        assert_eq!(out.len(), 200);
        assert!(out.chars().all(|c| c == 'a'));
    }

    #[test]
    fn truncates_multibyte_on_char_boundary() {
        let input = "Пр".repeat(200);
        let out = sanitize(&input, 100);
        assert!(out.len() <= 100);
        assert!(String::from_utf8(out.into_bytes()).is_ok());
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(sanitize("", 200), "");
    }

    #[test]
    fn unchanged_when_already_safe() {
        assert_eq!(sanitize("already safe title", 200), "already safe title");
    }

    #[test]
    fn strips_trailing_whitespace_after_truncation() {
        let input = format!("{}   more", "a".repeat(10));
        let out = sanitize(&input, 10);
        assert_eq!(out, "a".repeat(10));
    }
}
