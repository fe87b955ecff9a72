use regex::bytes::{Regex, RegexBuilder};
use tracing::trace;

/// Regex fragment for a single `*`: any run of bytes, newlines included.
const WILDCARD: &str = "(?s-u:.)*";

/// Whole-line matcher compiled from one glob-lite pattern.
///
/// `*` matches any run of characters, `**` matches one literal `*`, and every
/// other character matches itself. The match is anchored at both ends of the
/// line.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    raw: String,
    regex: Regex,
}

impl CompiledPattern {
    pub fn new(raw: &str) -> Self {
        let source = Self::translate(raw);
        trace!(pattern = raw, regex = %source, "compiled pattern");

        // literals are escaped and both size limits are lifted
        let regex = RegexBuilder::new(&source)
            .size_limit(usize::MAX)
            .dfa_size_limit(usize::MAX)
            .build()
            .expect("escaped glob pattern without size limits always compiles");

        CompiledPattern {
            raw: raw.to_string(),
            regex,
        }
    }

    /// Translate the pattern into an anchored regex, one code point at a time.
    fn translate(raw: &str) -> String {
        let mut source = String::with_capacity(raw.len() + 8);
        source.push_str(r"\A");

        let mut chars = raw.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch == '*' {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    source.push_str(r"\*");
                } else {
                    source.push_str(WILDCARD);
                }
            } else {
                // N.B. grapheme clusters are not kept together
                let mut buf = [0u8; 4];
                source.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
            }
        }

        source.push_str(r"\z");
        source
    }

    /// The pattern as supplied.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_match(&self, line: impl AsRef<[u8]>) -> bool {
        self.regex.is_match(line.as_ref())
    }
}

/// Ordered any-of collection of compiled patterns, plus the invert flag.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<CompiledPattern>,
    invert: bool,
}

impl PatternSet {
    pub fn new<I, S>(raw_patterns: I, invert: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        PatternSet {
            patterns: raw_patterns
                .into_iter()
                .map(|raw| CompiledPattern::new(raw.as_ref()))
                .collect(),
            invert,
        }
    }

    /// True iff any pattern matches the whole line. Always false when the set
    /// is empty; inversion is not applied here.
    pub fn matches(&self, line: impl AsRef<[u8]>) -> bool {
        let line = line.as_ref();
        self.patterns.iter().any(|pattern| pattern.is_match(line))
    }

    /// Whether the line belongs on the output stream.
    pub fn should_output(&self, line: impl AsRef<[u8]>) -> bool {
        self.invert != self.matches(line)
    }

    pub fn invert(&self) -> bool {
        self.invert
    }

    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, line: &str) -> bool {
        CompiledPattern::new(pattern).is_match(line)
    }

    #[test]
    fn test_trailing_wildcard() {
        assert!(matches("hello*", "hello"));
        assert!(matches("hello*", "hello world"));
        assert!(!matches("hello*", "xhello"));
    }

    #[test]
    fn test_leading_wildcard() {
        assert!(matches("*world", "world"));
        assert!(matches("*world", "hello world"));
        assert!(!matches("*world", "world hello"));
    }

    #[test]
    fn test_inner_wildcards() {
        assert!(matches("a*b*c", "abc"));
        assert!(matches("a*b*c", "a--b--c"));
        assert!(matches("*", ""));
        assert!(matches("*", "anything at all"));
        assert!(!matches("a*b*c", "a--c--b"));
    }

    #[test]
    fn test_double_asterisk_is_literal() {
        assert!(matches("hello**world", "hello*world"));
        assert!(!matches("hello**world", "helloworld"));
        assert!(!matches("hello**world", "hello big world"));
        assert!(matches("**", "*"));
        assert!(!matches("**", ""));
    }

    #[test]
    fn test_odd_asterisk_run_decomposes_left_to_right() {
        assert!(matches("a***b", "a*b"));
        assert!(matches("a***b", "a*xyzb"));
        assert!(!matches("a***b", "ab"));
        assert!(!matches("a***b", "axyz*b"));

        // four asterisks are two literals
        assert!(matches("a****b", "a**b"));
        assert!(!matches("a****b", "a*x*b"));
    }

    #[test]
    fn test_match_is_anchored() {
        assert!(matches("hello world", "hello world"));
        assert!(!matches("hello", "hello world"));
        assert!(!matches("world", "hello world"));
        assert!(matches("", ""));
        assert!(!matches("", "x"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert!(matches("a.b", "a.b"));
        assert!(!matches("a.b", "axb"));
        assert!(matches("[x](y)?+{1}|^$\\", "[x](y)?+{1}|^$\\"));
        assert!(matches("(unbalanced*", "(unbalanced stuff"));
        assert!(!matches("a+", "aaa"));
    }

    #[test]
    fn test_unicode_code_points() {
        assert!(matches("héllo*", "héllo wörld"));
        assert!(matches("*ß", "straße"));
        assert!(matches("日本*", "日本語"));
        assert!(!matches("日本*", "中日本"));
        assert!(matches("*🦀*", "rust 🦀 crab"));
    }

    #[test]
    fn test_invalid_utf8_lines_still_match_wildcards() {
        let pattern = CompiledPattern::new("bin*");
        assert!(pattern.is_match(b"bin\xff\xfe"));
        assert!(!pattern.is_match(b"\xffbin"));
    }

    #[test]
    fn test_very_long_pattern_compiles() {
        let pattern = "x*[y]".repeat(500);
        let line = "x[y]".repeat(500);
        assert!(matches(&pattern, &line));
        assert!(!matches(&pattern, &line[1..]));
    }

    #[test]
    fn test_raw_is_preserved() {
        assert_eq!(CompiledPattern::new("a***b").raw(), "a***b");
    }

    #[test]
    fn test_empty_set_never_matches() {
        let set = PatternSet::new(Vec::<String>::new(), false);
        assert!(set.is_empty());
        assert!(!set.matches("hello"));
        assert!(!set.matches(""));
        assert!(!set.should_output("hello"));

        let inverted = PatternSet::new(Vec::<String>::new(), true);
        assert!(!inverted.matches("hello"));
        assert!(inverted.should_output("hello"));
    }

    #[test]
    fn test_set_matches_any_pattern() {
        let set = PatternSet::new(["foo*", "*bar"], false);
        assert!(set.matches("foo baz"));
        assert!(set.matches("baz bar"));
        assert!(!set.matches("baz"));
    }

    #[test]
    fn test_should_output_is_invert_xor_match() {
        let lines = ["hello world", "goodbye", "", "hello"];
        for invert in [false, true] {
            let set = PatternSet::new(["hello*"], invert);
            for line in lines {
                assert_eq!(set.should_output(line), invert ^ set.matches(line), "{line:?}");
            }
        }
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let set = PatternSet::new(["b", "a", "c*"], true);
        let raws: Vec<&str> = set.patterns().iter().map(CompiledPattern::raw).collect();
        assert_eq!(raws, vec!["b", "a", "c*"]);
        assert_eq!(set.len(), 3);
        assert!(set.invert());
    }
}
