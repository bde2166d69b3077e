/// Join segment texts in order with single spaces, skipping blank segments.
pub fn assemble_text<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|segment| segment.as_ref().trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Character classes found in an assembled transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentFlags {
    /// Any code point above the ASCII range (any script, emoji included)
    pub has_non_ascii_letterish: bool,
    /// Any ASCII letter
    pub has_ascii_alpha: bool,
}

impl ContentFlags {
    pub fn scan(text: &str) -> Self {
        let mut flags = Self::default();
        for c in text.chars() {
            if !c.is_ascii() {
                flags.has_non_ascii_letterish = true;
            } else if c.is_ascii_alphabetic() {
                flags.has_ascii_alpha = true;
            }
            if flags.has_non_ascii_letterish && flags.has_ascii_alpha {
                break;
            }
        }
        flags
    }

    /// Whether the text looks like transcript content rather than UI chrome
    pub fn is_valid(&self) -> bool {
        self.has_non_ascii_letterish || self.has_ascii_alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_skips_blank_segments() {
        assert_eq!(assemble_text(&["Hello", "  ", "world"]), "Hello world");
    }

    #[test]
    fn test_assemble_trims_and_keeps_order() {
        let segments = vec![" one\n".to_string(), String::new(), "two ".to_string(), "\tthree".to_string()];
        assert_eq!(assemble_text(&segments), "one two three");
    }

    #[test]
    fn test_assemble_all_blank_is_empty() {
        assert_eq!(assemble_text(&[" ", "\n", ""]), "");
    }

    #[test]
    fn test_ascii_text_is_valid() {
        let flags = ContentFlags::scan("hello world");
        assert!(flags.has_ascii_alpha);
        assert!(!flags.has_non_ascii_letterish);
        assert!(flags.is_valid());
    }

    #[test]
    fn test_devanagari_text_is_valid() {
        let flags = ContentFlags::scan("नमस्ते दुनिया");
        assert!(flags.has_non_ascii_letterish);
        assert!(!flags.has_ascii_alpha);
        assert!(flags.is_valid());
    }

    #[test]
    fn test_punctuation_only_is_invalid() {
        let flags = ContentFlags::scan("!!! --- ...");
        assert_eq!(flags, ContentFlags::default());
        assert!(!flags.is_valid());
    }

    #[test]
    fn test_emoji_counts_as_non_ascii() {
        assert!(ContentFlags::scan("🎵 123").is_valid());
    }
}
