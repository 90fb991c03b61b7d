use std::fmt;

/// How serious a diagnostic is.
///
/// Almost everything the lexer and parser report is an [`Error`]; the single
/// exception is an unterminated block comment, which still produces a usable
/// background token and is therefore only a [`Severity::Warning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// Machine-readable code for every diagnostic this crate can produce.
///
/// The `Display` implementation gives a fixed English phrase per code.
/// Richer rendering (interpolating [`Parameter`]s, localization) is left to
/// the consumer; see the fields on [`Error`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    #[error("unexpected symbol")]
    UnexpectedSymbol,
    #[error("unterminated multi-line comment")]
    UnterminatedMultiLineComment,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unrecognized escape sequence")]
    UnrecognizedEscapeSequence,
    #[error("unrecognized unicode escape sequence")]
    UnrecognizedUnicodeEscapeSequence,
    #[error("illegal control character in string")]
    IllegalControlCharacterInString,
    #[error("unrecognized value")]
    UnrecognizedValue,
    #[error("expected end of input")]
    ExpectedEndOfInput,
    #[error("invalid property key")]
    InvalidPropertyKey,
    #[error("multiple property keys")]
    MultiplePropertyKeys,
    #[error("multiple property key sections")]
    MultiplePropertyKeySections,
    #[error("multiple values")]
    MultipleValues,
    #[error("missing property key")]
    MissingPropertyKey,
    #[error("missing value")]
    MissingValue,
    #[error("property key already exists")]
    PropertyKeyAlreadyExists,
    #[error("control symbol in array")]
    ControlSymbolInArray,
    #[error("control symbol in object")]
    ControlSymbolInObject,
    #[error("unexpected end of input in array")]
    UnexpectedEofInArray,
    #[error("unexpected end of input in object")]
    UnexpectedEofInObject,
}

impl ErrorCode {
    /// The severity associated with this code.
    pub fn severity(self) -> Severity {
        match self {
            ErrorCode::UnterminatedMultiLineComment => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// A typed argument attached to an [`Error`].
///
/// Parameters are ordered and tagged so an external formatter can interpolate
/// them into a human-readable message. A `Str(None)` renders as a
/// distinguished "null" token.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Parameter {
    Char(char),
    Str(Option<String>),
    Untyped(String),
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::Char(c) => write!(f, "{c:?}"),
            Parameter::Str(Some(s)) => write!(f, "{s:?}"),
            Parameter::Str(None) => write!(f, "null"),
            Parameter::Untyped(s) => write!(f, "{s}"),
        }
    }
}

/// A diagnostic produced while lexing or parsing.
///
/// Errors are never thrown: the lexer and parser always recover and keep
/// going, and the full ordered list is returned alongside the syntax tree by
/// [`SyntaxTree::errors`](crate::SyntaxTree::errors). `start` and `length`
/// are byte offsets into the source; spans never exceed the source length.
#[derive(Clone, PartialEq, Eq)]
pub struct Error {
    pub(crate) code: ErrorCode,
    pub(crate) severity: Severity,
    pub(crate) start: usize,
    pub(crate) length: usize,
    pub(crate) parameters: Vec<Parameter>,
}

impl Error {
    /// Create a new instance of `Error` without parameters.
    pub fn new(code: ErrorCode, start: usize, length: usize) -> Self {
        Self {
            code,
            severity: code.severity(),
            start,
            length,
            parameters: Vec::new(),
        }
    }

    /// Create a new instance of `Error` with a single parameter.
    pub fn with_parameter(code: ErrorCode, start: usize, length: usize, parameter: Parameter) -> Self {
        Self {
            code,
            severity: code.severity(),
            start,
            length,
            parameters: vec![parameter],
        }
    }

    /// Get the error's code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the error's severity.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the byte offset at which the error begins.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Get the length of the error span in bytes.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Get the error's parameters.
    pub fn parameters(&self) -> &[Parameter] {
        self.parameters.as_slice()
    }

    /// The same error moved `offset` bytes to the right.
    ///
    /// Errors inside a string literal are recorded relative to the literal's
    /// first quote; the parser shifts them by the literal's absolute start.
    pub(crate) fn shifted(&self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            ..self.clone()
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self.start + self.length;
        write!(f, "{:?}@{}..{}", self.code, self.start, end)?;
        if self.severity == Severity::Warning {
            write!(f, " (warning)")?;
        }
        for parameter in &self.parameters {
            write!(f, " {parameter:?}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_severity_is_derived_from_the_code() {
        let err = Error::new(ErrorCode::UnterminatedMultiLineComment, 4, 2);
        assert_eq!(err.severity(), Severity::Warning);
        assert_eq!(format!("{err:?}"), "UnterminatedMultiLineComment@4..6 (warning)");

        let err = Error::new(ErrorCode::UnterminatedString, 0, 3);
        assert_eq!(err.severity(), Severity::Error);
    }

    #[test]
    fn parameters_keep_their_order_and_render_null_strings() {
        let err = Error {
            code: ErrorCode::UnrecognizedEscapeSequence,
            severity: Severity::Error,
            start: 3,
            length: 2,
            parameters: vec![
                Parameter::Str(Some("\\q".to_string())),
                Parameter::Str(None),
                Parameter::Char('x'),
            ],
        };
        assert_eq!(format!("{err:?}"), r#"UnrecognizedEscapeSequence@3..5 "\\q" null 'x'"#);
    }

    #[test]
    fn shifted_moves_only_the_start() {
        let err = Error::with_parameter(
            ErrorCode::UnrecognizedEscapeSequence,
            3,
            2,
            Parameter::Str(Some("\\q".to_string())),
        );
        let shifted = err.shifted(10);
        assert_eq!(shifted.start(), 13);
        assert_eq!(shifted.length(), 2);
        assert_eq!(shifted.parameters(), err.parameters());
    }
}
