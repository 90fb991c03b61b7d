use num_bigint::BigInt;
use triomphe::Arc;

use crate::error::{Error, ErrorCode, Parameter};
use crate::green::list::GreenLen;

/// A decoded string literal.
///
/// `value` is the payload after escape sequences are resolved; `length` is
/// the byte length of the literal in the source, surrounding quotes included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringToken {
    pub(crate) value: String,
    pub(crate) length: usize,
}

impl StringToken {
    /// The decoded payload, without quotes.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl GreenLen for StringToken {
    fn green_len(&self) -> usize {
        self.length
    }
}

/// A string literal in which one or more lexical errors occurred.
///
/// Carries the best-effort decoded payload and the errors themselves, with
/// spans relative to the literal's first quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorStringToken {
    pub(crate) value: String,
    pub(crate) length: usize,
    pub(crate) errors: Vec<Error>,
}

impl ErrorStringToken {
    /// The decoded payload with erroneous pieces skipped.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The lexical errors, with spans relative to the literal start.
    pub fn errors(&self) -> &[Error] {
        self.errors.as_slice()
    }
}

impl GreenLen for ErrorStringToken {
    fn green_len(&self) -> usize {
        self.length
    }
}

/// An integer literal with an arbitrary-precision value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerToken {
    pub(crate) value: BigInt,
    pub(crate) length: usize,
}

impl IntegerToken {
    pub fn value(&self) -> &BigInt {
        &self.value
    }
}

impl GreenLen for IntegerToken {
    fn green_len(&self) -> usize {
        self.length
    }
}

/// A value-like character run that is neither a boolean nor an integer,
/// such as `nul` or `1.5e3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValueToken {
    pub(crate) text: String,
}

impl UnknownValueToken {
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A single character that could not be classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSymbolToken {
    pub(crate) display: String,
    pub(crate) length: usize,
}

impl UnknownSymbolToken {
    /// A printable form of the character, `\uXXXX` when it is not printable.
    pub fn display(&self) -> &str {
        &self.display
    }
}

/// A terminal symbol emitted by the lexer.
///
/// Tokens carry lengths, never positions; the lexer guarantees that the
/// lengths of the emitted sequence sum to the source length with no gaps or
/// overlaps. Structural and boolean tokens are plain variants with a fixed
/// length; payload-carrying tokens share their payload behind an [`Arc`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GreenToken {
    Whitespace(usize),
    /// A `//` or closed `/* */` comment, terminator excluded for the former.
    Comment(usize),
    /// A `/*` comment that ran into the end of input.
    UnterminatedComment(usize),
    CurlyOpen,
    CurlyClose,
    SquareOpen,
    SquareClose,
    Colon,
    Comma,
    String(Arc<StringToken>),
    ErrorString(Arc<ErrorStringToken>),
    Integer(Arc<IntegerToken>),
    UnknownValue(Arc<UnknownValueToken>),
    UnknownSymbol(Arc<UnknownSymbolToken>),
    True,
    False,
}

impl GreenToken {
    pub(crate) fn whitespace(length: usize) -> Self {
        assert!(length > 0, "whitespace cannot be empty");
        GreenToken::Whitespace(length)
    }

    pub(crate) fn comment(length: usize) -> Self {
        assert!(length >= 2, "a comment is at least two bytes");
        GreenToken::Comment(length)
    }

    pub(crate) fn unterminated_comment(length: usize) -> Self {
        assert!(length >= 2, "an unterminated comment is at least two bytes");
        GreenToken::UnterminatedComment(length)
    }

    pub(crate) fn string(value: String, length: usize) -> Self {
        assert!(length >= 2, "a terminated string includes both quotes");
        GreenToken::String(Arc::new(StringToken { value, length }))
    }

    pub(crate) fn error_string(value: String, length: usize, errors: Vec<Error>) -> Self {
        assert!(length >= 1, "an error string includes at least its open quote");
        GreenToken::ErrorString(Arc::new(ErrorStringToken {
            value,
            length,
            errors,
        }))
    }

    pub(crate) fn integer(value: BigInt, length: usize) -> Self {
        assert!(length > 0);
        GreenToken::Integer(Arc::new(IntegerToken { value, length }))
    }

    pub(crate) fn unknown_value(text: String) -> Self {
        assert!(!text.is_empty());
        GreenToken::UnknownValue(Arc::new(UnknownValueToken { text }))
    }

    pub(crate) fn unknown_symbol(c: char) -> Self {
        GreenToken::UnknownSymbol(Arc::new(UnknownSymbolToken {
            display: friendly_char(c),
            length: c.len_utf8(),
        }))
    }

    /// Whitespace and comments: tokens that occupy source positions but do
    /// not participate in the value grammar.
    pub fn is_background(&self) -> bool {
        matches!(
            self,
            GreenToken::Whitespace(_) | GreenToken::Comment(_) | GreenToken::UnterminatedComment(_)
        )
    }

    /// Can this token begin a value?
    pub fn is_value_starter(&self) -> bool {
        matches!(
            self,
            GreenToken::CurlyOpen
                | GreenToken::SquareOpen
                | GreenToken::String(_)
                | GreenToken::ErrorString(_)
                | GreenToken::Integer(_)
                | GreenToken::UnknownValue(_)
                | GreenToken::UnknownSymbol(_)
                | GreenToken::True
                | GreenToken::False
        )
    }

    /// Append the lexical diagnostics this token carries, anchored at its
    /// absolute `start`. Most tokens carry none.
    pub fn collect_errors(&self, start: usize, out: &mut Vec<Error>) {
        match self {
            GreenToken::UnterminatedComment(length) => {
                out.push(Error::new(ErrorCode::UnterminatedMultiLineComment, start, *length));
            }
            GreenToken::ErrorString(token) => {
                out.extend(token.errors.iter().map(|error| error.shifted(start)));
            }
            GreenToken::UnknownSymbol(token) => {
                out.push(Error::with_parameter(
                    ErrorCode::UnexpectedSymbol,
                    start,
                    token.length,
                    Parameter::Str(Some(token.display.clone())),
                ));
            }
            _ => {}
        }
    }
}

impl GreenLen for GreenToken {
    fn green_len(&self) -> usize {
        match self {
            GreenToken::Whitespace(length)
            | GreenToken::Comment(length)
            | GreenToken::UnterminatedComment(length) => *length,
            GreenToken::CurlyOpen
            | GreenToken::CurlyClose
            | GreenToken::SquareOpen
            | GreenToken::SquareClose
            | GreenToken::Colon
            | GreenToken::Comma => 1,
            GreenToken::String(token) => token.length,
            GreenToken::ErrorString(token) => token.length,
            GreenToken::Integer(token) => token.length,
            GreenToken::UnknownValue(token) => token.text.len(),
            GreenToken::UnknownSymbol(token) => token.length,
            GreenToken::True => 4,
            GreenToken::False => 5,
        }
    }
}

/// A printable rendering of `c`: the character itself, or `\uXXXX` for
/// characters that have no sensible glyph.
pub(crate) fn friendly_char(c: char) -> String {
    if c.is_control() {
        format!("\\u{:04x}", c as u32)
    } else {
        c.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_token_lengths() {
        assert_eq!(GreenToken::Colon.green_len(), 1);
        assert_eq!(GreenToken::CurlyOpen.green_len(), 1);
        assert_eq!(GreenToken::True.green_len(), 4);
        assert_eq!(GreenToken::False.green_len(), 5);
    }

    #[test]
    fn unknown_symbol_length_is_its_utf8_length() {
        let token = GreenToken::unknown_symbol('%');
        assert_eq!(token.green_len(), 1);
        let token = GreenToken::unknown_symbol('€');
        assert_eq!(token.green_len(), 3);
    }

    #[test]
    fn unknown_symbol_display_escapes_control_characters() {
        match GreenToken::unknown_symbol('\u{1b}') {
            GreenToken::UnknownSymbol(token) => assert_eq!(token.display(), "\\u001b"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn background_and_starter_partition() {
        assert!(GreenToken::Whitespace(1).is_background());
        assert!(GreenToken::Comment(2).is_background());
        assert!(!GreenToken::Comma.is_background());

        assert!(GreenToken::CurlyOpen.is_value_starter());
        assert!(GreenToken::unknown_symbol('&').is_value_starter());
        assert!(!GreenToken::CurlyClose.is_value_starter());
        assert!(!GreenToken::Colon.is_value_starter());
        assert!(!GreenToken::Whitespace(1).is_value_starter());
    }

    #[test]
    fn unterminated_comment_reports_a_warning() {
        let mut errors = Vec::new();
        GreenToken::unterminated_comment(6).collect_errors(10, &mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), ErrorCode::UnterminatedMultiLineComment);
        assert_eq!(errors[0].start(), 10);
        assert_eq!(errors[0].length(), 6);
    }

    #[test]
    fn error_string_shifts_relative_spans() {
        let inner = Error::new(ErrorCode::UnrecognizedEscapeSequence, 3, 2);
        let token = GreenToken::error_string("abcd".into(), 8, vec![inner]);
        let mut errors = Vec::new();
        token.collect_errors(5, &mut errors);
        assert_eq!(errors[0].start(), 8);
        assert_eq!(errors[0].length(), 2);
    }
}
