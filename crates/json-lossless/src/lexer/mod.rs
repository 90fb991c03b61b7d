mod classify;

use num_bigint::BigInt;

use crate::error::{Error, ErrorCode, Parameter};
use crate::green::GreenToken;

use classify::{classify, must_be_escaped, CharClass};

/// Lexes source text into a flat sequence of [`GreenToken`]s.
///
/// The lexer never fails: malformed pieces of input become error-carrying
/// tokens ([`GreenToken::ErrorString`], [`GreenToken::UnknownSymbol`],
/// [`GreenToken::UnterminatedComment`]) and the emitted lengths always sum to
/// the byte length of the source, with no gaps and no overlaps.
///
/// ## Example
/// ```rust
/// use json_lossless::{tokenize, GreenLen};
///
/// let source = "[1, 2] // pair";
/// let total: usize = tokenize(source).map(|token| token.green_len()).sum();
/// assert_eq!(total, source.len());
/// ```
#[derive(Debug, Clone)]
pub struct Lexer<'input> {
    source: &'input str,
    position: usize,
}

impl<'input> Lexer<'input> {
    /// Create a new instance of `Lexer` over `source`.
    pub fn new(source: &'input str) -> Self {
        Self {
            source,
            position: 0,
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = GreenToken;

    fn next(&mut self) -> Option<GreenToken> {
        let rest = &self.source[self.position..];
        let first = rest.chars().next()?;
        let (token, consumed) = match classify(first) {
            CharClass::Whitespace => scan_run(rest, CharClass::Whitespace),
            CharClass::Value => scan_run(rest, CharClass::Value),
            CharClass::Symbol => scan_symbol(rest, first),
        };
        debug_assert!(consumed > 0 && consumed <= rest.len());
        self.position += consumed;
        Some(token)
    }
}

/// Consume a maximal run of characters of `class`, starting at the first
/// character of `rest`.
fn scan_run(rest: &str, class: CharClass) -> (GreenToken, usize) {
    let length = rest
        .char_indices()
        .find(|(_, c)| classify(*c) != class)
        .map_or(rest.len(), |(index, _)| index);
    let token = match class {
        CharClass::Whitespace => GreenToken::whitespace(length),
        CharClass::Value => interpret_value(&rest[..length]),
        CharClass::Symbol => unreachable!("symbols are dispatched per character"),
    };
    (token, length)
}

fn scan_symbol(rest: &str, first: char) -> (GreenToken, usize) {
    match first {
        '{' => (GreenToken::CurlyOpen, 1),
        '}' => (GreenToken::CurlyClose, 1),
        '[' => (GreenToken::SquareOpen, 1),
        ']' => (GreenToken::SquareClose, 1),
        ':' => (GreenToken::Colon, 1),
        ',' => (GreenToken::Comma, 1),
        '"' => scan_string(rest),
        '/' => match rest[1..].chars().next() {
            Some('/') => scan_line_comment(rest),
            Some('*') => scan_block_comment(rest),
            _ => (GreenToken::unknown_symbol('/'), 1),
        },
        c => (GreenToken::unknown_symbol(c), c.len_utf8()),
    }
}

/// `//` up to but not including the line terminator; the terminator joins the
/// following whitespace run.
fn scan_line_comment(rest: &str) -> (GreenToken, usize) {
    let length = rest.find(['\n', '\r']).unwrap_or(rest.len());
    (GreenToken::comment(length), length)
}

fn scan_block_comment(rest: &str) -> (GreenToken, usize) {
    match rest[2..].find("*/") {
        Some(index) => {
            let length = 2 + index + 2;
            (GreenToken::comment(length), length)
        }
        None => (GreenToken::unterminated_comment(rest.len()), rest.len()),
    }
}

/// Scan a string literal starting at the opening quote.
///
/// The decoded payload is buffered; every lexical error is recorded with a
/// span relative to the opening quote and no character is appended for the
/// erroneous piece.
fn scan_string(rest: &str) -> (GreenToken, usize) {
    let mut value = String::new();
    let mut errors = Vec::new();
    let mut chars = rest.char_indices();
    chars.next(); // opening quote

    loop {
        let Some((index, c)) = chars.next() else {
            // End of input before the closing quote.
            let length = rest.len();
            errors.push(Error::new(ErrorCode::UnterminatedString, 0, length));
            return (GreenToken::error_string(value, length, errors), length);
        };
        match c {
            '"' => {
                let length = index + 1;
                let token = if errors.is_empty() {
                    GreenToken::string(value, length)
                } else {
                    GreenToken::error_string(value, length, errors)
                };
                return (token, length);
            }
            '\\' => scan_escape(rest, index, &mut chars, &mut value, &mut errors),
            c if must_be_escaped(c) => {
                errors.push(Error::with_parameter(
                    ErrorCode::IllegalControlCharacterInString,
                    index,
                    c.len_utf8(),
                    Parameter::Char(c),
                ));
            }
            c => value.push(c),
        }
    }
}

/// Decode one escape sequence; `index` is the relative position of the
/// backslash.
fn scan_escape(
    rest: &str,
    index: usize,
    chars: &mut std::str::CharIndices<'_>,
    value: &mut String,
    errors: &mut Vec<Error>,
) {
    let Some((_, escape)) = chars.next() else {
        // A lone backslash at the end of input; the unterminated string
        // error follows on the next iteration.
        errors.push(Error::with_parameter(
            ErrorCode::UnrecognizedEscapeSequence,
            index,
            1,
            Parameter::Str(Some("\\".to_string())),
        ));
        return;
    };
    match escape {
        '"' | '\\' | '/' => value.push(escape),
        'b' => value.push('\u{0008}'),
        'f' => value.push('\u{000c}'),
        'n' => value.push('\n'),
        'r' => value.push('\r'),
        't' => value.push('\t'),
        'v' => value.push('\u{000b}'),
        'u' => {
            // Exactly four hex digits, case-insensitive. Only hex digits are
            // consumed, so a premature quote still closes the string.
            let mut digits = 0;
            let mut code = 0u32;
            while digits < 4 {
                let mut probe = chars.clone();
                match probe.next().and_then(|(_, c)| c.to_digit(16)) {
                    Some(digit) => {
                        code = code * 16 + digit;
                        digits += 1;
                        *chars = probe;
                    }
                    None => break,
                }
            }
            let consumed = 2 + digits;
            let decoded = (digits == 4).then_some(code).and_then(char::from_u32);
            match decoded {
                Some(c) => value.push(c),
                // Too few digits, or a surrogate code point a Rust string
                // cannot hold.
                None => errors.push(Error::with_parameter(
                    ErrorCode::UnrecognizedUnicodeEscapeSequence,
                    index,
                    consumed,
                    Parameter::Str(Some(rest[index..index + consumed].to_string())),
                )),
            }
        }
        other => {
            let length = 1 + other.len_utf8();
            errors.push(Error::with_parameter(
                ErrorCode::UnrecognizedEscapeSequence,
                index,
                length,
                Parameter::Str(Some(rest[index..index + length].to_string())),
            ));
        }
    }
}

/// Interpret one value-character run as a boolean, an integer, or an unknown
/// value token.
pub(crate) fn interpret_value(text: &str) -> GreenToken {
    match text {
        "true" => GreenToken::True,
        "false" => GreenToken::False,
        _ => match parse_integer(text) {
            Some(value) => GreenToken::integer(value, text.len()),
            None => GreenToken::unknown_value(text.to_string()),
        },
    }
}

/// An optional `+`/`-` sign followed by one or more ASCII digits.
///
/// Accumulates in an `i64` and falls over to arbitrary precision on the
/// first overflow.
fn parse_integer(text: &str) -> Option<BigInt> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'+' => (false, &text[1..]),
        b'-' => (true, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut small: i64 = 0;
    for (position, byte) in digits.bytes().enumerate() {
        let digit = i64::from(byte - b'0');
        match small.checked_mul(10).and_then(|n| n.checked_add(digit)) {
            Some(next) => small = next,
            None => return Some(parse_big_integer(negative, &digits.as_bytes()[position..], small)),
        }
    }
    Some(if negative {
        BigInt::from(-small)
    } else {
        BigInt::from(small)
    })
}

#[cold]
fn parse_big_integer(negative: bool, remaining: &[u8], accumulated: i64) -> BigInt {
    let mut value = BigInt::from(accumulated);
    for byte in remaining {
        value = value * 10u32 + u32::from(byte - b'0');
    }
    if negative {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::green::GreenLen;

    fn lex(source: &str) -> Vec<GreenToken> {
        Lexer::new(source).collect()
    }

    fn total_len(source: &str) -> usize {
        lex(source).iter().map(GreenToken::green_len).sum()
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(lex("").is_empty());
    }

    #[test]
    fn lengths_cover_the_source() {
        for source in [
            "",
            "   ",
            "[0,1,2,]",
            "{\"k\": true}\n",
            "// comment\n[1]",
            "/* open",
            "\"unterminated",
            "日本 12é+ %",
            "{]:,}",
        ] {
            assert_eq!(total_len(source), source.len(), "{source:?}");
        }
    }

    #[test]
    fn structural_symbols() {
        assert_eq!(
            lex("{}[],:"),
            vec![
                GreenToken::CurlyOpen,
                GreenToken::CurlyClose,
                GreenToken::SquareOpen,
                GreenToken::SquareClose,
                GreenToken::Comma,
                GreenToken::Colon,
            ]
        );
    }

    #[test]
    fn value_runs() {
        assert_eq!(lex("true"), vec![GreenToken::True]);
        assert_eq!(lex("false"), vec![GreenToken::False]);
        // A value run swallows signs and dots, making the whole run unknown.
        assert_eq!(
            lex("truefalse"),
            vec![GreenToken::unknown_value("truefalse".into())]
        );
        assert_eq!(lex("1.5"), vec![GreenToken::unknown_value("1.5".into())]);
        assert_eq!(lex("-"), vec![GreenToken::unknown_value("-".into())]);
        assert_eq!(lex("+-2"), vec![GreenToken::unknown_value("+-2".into())]);
    }

    #[test]
    fn integers() {
        match &lex("-127")[0] {
            GreenToken::Integer(token) => {
                assert_eq!(token.value(), &BigInt::from(-127));
                assert_eq!(token.green_len(), 4);
            }
            other => panic!("expected integer, got {other:?}"),
        }
        match &lex("+90")[0] {
            GreenToken::Integer(token) => assert_eq!(token.value(), &BigInt::from(90)),
            other => panic!("expected integer, got {other:?}"),
        }
    }

    #[test]
    fn integer_larger_than_a_machine_word() {
        let text = "170141183460469231731687303715884105727"; // 2^127 - 1
        match &lex(text)[0] {
            GreenToken::Integer(token) => {
                assert_eq!(token.value().to_string(), text);
                assert_eq!(token.green_len(), text.len());
            }
            other => panic!("expected integer, got {other:?}"),
        }
    }

    #[test]
    fn integer_fidelity_round_trip() {
        for text in ["0", "-1", "9223372036854775807", "-9223372036854775809", "00042"] {
            match &lex(text)[0] {
                GreenToken::Integer(token) => {
                    let reparsed: BigInt = text.parse().unwrap();
                    assert_eq!(token.value(), &reparsed, "{text}");
                }
                other => panic!("expected integer for {text}, got {other:?}"),
            }
        }
    }

    #[test]
    fn line_comment_excludes_the_terminator() {
        let tokens = lex("// note\r\n1");
        assert_eq!(tokens[0], GreenToken::Comment(7));
        assert_eq!(tokens[1], GreenToken::Whitespace(2));
    }

    #[test]
    fn block_comment_includes_its_close() {
        assert_eq!(lex("/*a*/")[0], GreenToken::Comment(5));
        assert_eq!(lex("/**/")[0], GreenToken::Comment(4));
        assert_eq!(lex("/*/")[0], GreenToken::UnterminatedComment(3));
        assert_eq!(lex("/* open")[0], GreenToken::UnterminatedComment(7));
    }

    #[test]
    fn lone_slash_is_an_unknown_symbol() {
        let tokens = lex("/1");
        assert_eq!(tokens[0], GreenToken::unknown_symbol('/'));
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn plain_string() {
        match &lex("\"hello\"")[0] {
            GreenToken::String(token) => {
                assert_eq!(token.value(), "hello");
                assert_eq!(token.green_len(), 7);
            }
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn escape_sequences_decode() {
        match &lex(r#""a\n\t\"\\\/Ab\v""#)[0] {
            GreenToken::String(token) => assert_eq!(token.value(), "a\n\t\"\\/Ab\u{000b}"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_escape_sequence() {
        // "ab\qcd" : error at relative offset 3, length 2, no char appended
        match &lex(r#""ab\qcd""#)[0] {
            GreenToken::ErrorString(token) => {
                assert_eq!(token.value(), "abcd");
                assert_eq!(token.green_len(), 8);
                assert_eq!(token.errors().len(), 1);
                let error = &token.errors()[0];
                assert_eq!(error.code(), ErrorCode::UnrecognizedEscapeSequence);
                assert_eq!(error.start(), 3);
                assert_eq!(error.length(), 2);
                assert_eq!(
                    error.parameters(),
                    &[Parameter::Str(Some("\\q".to_string()))]
                );
            }
            other => panic!("expected error string, got {other:?}"),
        }
    }

    #[test]
    fn unicode_escape_needs_four_hex_digits() {
        match &lex(r#""\u12g""#)[0] {
            GreenToken::ErrorString(token) => {
                assert_eq!(token.value(), "g");
                let error = &token.errors()[0];
                assert_eq!(error.code(), ErrorCode::UnrecognizedUnicodeEscapeSequence);
                assert_eq!(error.start(), 1);
                assert_eq!(error.length(), 4); // `\u12`
            }
            other => panic!("expected error string, got {other:?}"),
        }
    }

    #[test]
    fn surrogate_escape_is_rejected() {
        match &lex(r#""\ud800""#)[0] {
            GreenToken::ErrorString(token) => {
                assert_eq!(token.errors()[0].code(), ErrorCode::UnrecognizedUnicodeEscapeSequence);
                assert_eq!(token.errors()[0].length(), 6);
            }
            other => panic!("expected error string, got {other:?}"),
        }
    }

    #[test]
    fn control_character_in_string() {
        let source = "\"a\u{001b}b\"";
        match &lex(source)[0] {
            GreenToken::ErrorString(token) => {
                assert_eq!(token.value(), "ab");
                let error = &token.errors()[0];
                assert_eq!(error.code(), ErrorCode::IllegalControlCharacterInString);
                assert_eq!(error.start(), 2);
                assert_eq!(error.length(), 1);
                assert_eq!(error.parameters(), &[Parameter::Char('\u{001b}')]);
            }
            other => panic!("expected error string, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_string_spans_the_whole_literal() {
        match &lex("\"abc")[0] {
            GreenToken::ErrorString(token) => {
                assert_eq!(token.value(), "abc");
                assert_eq!(token.green_len(), 4);
                let error = token.errors().last().unwrap();
                assert_eq!(error.code(), ErrorCode::UnterminatedString);
                assert_eq!(error.start(), 0);
                assert_eq!(error.length(), 4);
            }
            other => panic!("expected error string, got {other:?}"),
        }
    }

    #[test]
    fn backslash_at_end_of_input() {
        match &lex("\"a\\")[0] {
            GreenToken::ErrorString(token) => {
                let codes: Vec<_> = token.errors().iter().map(|e| e.code()).collect();
                assert_eq!(
                    codes,
                    vec![
                        ErrorCode::UnrecognizedEscapeSequence,
                        ErrorCode::UnterminatedString
                    ]
                );
            }
            other => panic!("expected error string, got {other:?}"),
        }
    }

    #[test]
    fn escaped_quote_does_not_close() {
        match &lex(r#""a\"b""#)[0] {
            GreenToken::String(token) => {
                assert_eq!(token.value(), "a\"b");
                assert_eq!(token.green_len(), 6);
            }
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn retokenizing_a_single_token_reproduces_it() {
        let source = "{\"k\": [1, true, /*x*/ nul]}";
        let mut offset = 0;
        for token in Lexer::new(source) {
            let length = token.green_len();
            let slice = &source[offset..offset + length];
            let again: Vec<GreenToken> = Lexer::new(slice).collect();
            assert_eq!(again, vec![token]);
            offset += length;
        }
        assert_eq!(offset, source.len());
    }

    #[test]
    fn unknown_symbols_cover_multibyte_characters() {
        let tokens = lex("€");
        assert_eq!(tokens[0], GreenToken::unknown_symbol('€'));
        assert_eq!(tokens[0].green_len(), 3);
    }
}
