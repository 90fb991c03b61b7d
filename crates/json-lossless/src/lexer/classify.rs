/// The character classes that drive the lexer's run detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    /// May be part of a value-like run: letters, digits, `_ - . +`.
    Value,
    /// Separates runs without any other meaning, including control characters.
    Whitespace,
    /// Starts a structural token, a string, a comment, or an unknown symbol.
    Symbol,
}

pub(crate) fn classify(c: char) -> CharClass {
    match c {
        '{' | '}' | '[' | ']' | ',' | ':' | '"' | '/' => CharClass::Symbol,
        '.' | '+' | '-' | '_' => CharClass::Value,
        c if c.is_alphanumeric() => CharClass::Value,
        c if c.is_whitespace() || c.is_control() => CharClass::Whitespace,
        _ => CharClass::Symbol,
    }
}

/// Characters that may not appear raw inside a string literal.
pub(crate) fn must_be_escaped(c: char) -> bool {
    c < '\u{0020}'
        || ('\u{007f}'..='\u{009f}').contains(&c)
        || c == '\u{2028}'
        || c == '\u{2029}'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_characters_are_symbols() {
        for c in ['{', '}', '[', ']', ',', ':', '"', '/'] {
            assert_eq!(classify(c), CharClass::Symbol);
        }
    }

    #[test]
    fn value_characters() {
        for c in ['a', 'Z', '0', '9', '_', '-', '.', '+', 'é', '数'] {
            assert_eq!(classify(c), CharClass::Value, "{c:?}");
        }
    }

    #[test]
    fn whitespace_and_control() {
        for c in [' ', '\t', '\n', '\r', '\u{0000}', '\u{000b}', '\u{00a0}'] {
            assert_eq!(classify(c), CharClass::Whitespace, "{c:?}");
        }
    }

    #[test]
    fn leftover_punctuation_is_a_symbol() {
        for c in ['%', '&', '(', ')', ';', '€', '!'] {
            assert_eq!(classify(c), CharClass::Symbol, "{c:?}");
        }
    }

    #[test]
    fn line_separators_must_be_escaped() {
        assert!(must_be_escaped('\u{0008}'));
        assert!(must_be_escaped('\u{007f}'));
        assert!(must_be_escaped('\u{2028}'));
        assert!(must_be_escaped('\u{2029}'));
        assert!(!must_be_escaped(' '));
        assert!(!must_be_escaped('a'));
    }
}
