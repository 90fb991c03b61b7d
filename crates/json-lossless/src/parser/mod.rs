use std::collections::HashSet;

use triomphe::Arc;

use crate::error::{Error, ErrorCode, Parameter};
use crate::green::{
    BackgroundList, GreenLen, GreenToken, GreenValue, KeyValue, ListNode, MapNode, MultiValue,
    ValueWithBackground,
};
use crate::lexer::Lexer;
use crate::syntax::SyntaxTree;

/// Parse JSON-like source text into a lossless syntax tree.
///
/// The parser is deliberately permissive: comments are kept, malformed input
/// is recovered from, and every problem is reported as a structured
/// [`Error`](crate::Error) instead of aborting. The resulting tree always
/// covers the entire source.
///
/// ## Example
/// ```rust
/// use json_lossless::Parser;
///
/// let parser = Parser::new("{\"a\": [1, 2], /* sizes */ \"b\": true}");
/// let tree = parser.parse();
/// assert!(tree.errors().is_empty());
/// assert_eq!(tree.syntax().len(), 36);
/// ```
#[derive(Debug)]
pub struct Parser<'input> {
    lexer: Lexer<'input>,
    source: &'input str,
    /// Absolute byte offset of the next token the lexer will emit.
    position: usize,
    /// A foreground token handed back after lookahead.
    lookahead: Option<Shifted>,
    /// The list of errors accumulated so far, in detection order.
    errors: Vec<Error>,
}

/// One step of the pull interface: the next foreground token together with
/// the background run that preceded it.
#[derive(Debug)]
struct Shifted {
    background: Vec<GreenToken>,
    /// `None` at end of input.
    token: Option<GreenToken>,
    /// Absolute start of `token`; the end-of-input offset when `token` is
    /// `None`.
    token_start: usize,
}

/// Result of parsing one value slot.
struct ParsedSlot {
    node: Arc<MultiValue>,
    /// Did the slot get at least one actual value?
    got_value: bool,
    /// Absolute start of the slot's first content, or of the position where
    /// it would have been.
    content_start: usize,
}

impl<'input> Parser<'input> {
    /// Create a new instance of a parser given an input string.
    pub fn new(source: &'input str) -> Self {
        Self {
            lexer: Lexer::new(source),
            source,
            position: 0,
            lookahead: None,
            errors: Vec::new(),
        }
    }

    /// Parse the input and return the tree together with all errors.
    pub fn parse(mut self) -> SyntaxTree {
        let root = self.parse_root();
        debug_assert_eq!(root.green_len(), self.source.len());
        SyntaxTree::new(root, self.errors)
    }

    /// Pull the next foreground token, absorbing background tokens and
    /// collecting the lexical errors every pulled token carries.
    fn shift(&mut self) -> Shifted {
        if let Some(shifted) = self.lookahead.take() {
            return shifted;
        }
        let mut background = Vec::new();
        loop {
            let start = self.position;
            match self.lexer.next() {
                None => {
                    return Shifted {
                        background,
                        token: None,
                        token_start: start,
                    }
                }
                Some(token) => {
                    token.collect_errors(start, &mut self.errors);
                    self.position += token.green_len();
                    if token.is_background() {
                        background.push(token);
                    } else {
                        return Shifted {
                            background,
                            token: Some(token),
                            token_start: start,
                        };
                    }
                }
            }
        }
    }

    /// Leave a foreground token at the cursor for the enclosing context. Its
    /// background has already been absorbed by the current slot, so none is
    /// attached.
    fn give_back(&mut self, token: GreenToken, token_start: usize) {
        debug_assert!(self.lookahead.is_none());
        self.lookahead = Some(Shifted {
            background: Vec::new(),
            token: Some(token),
            token_start,
        });
    }

    /// The top-level value slot. Unlike an inner slot, it can never stop
    /// before end of input: stray structural tokens are consumed as
    /// [`GreenValue::StraySymbol`] so the tree still covers them, and
    /// anything after the first value is reported against
    /// [`ErrorCode::ExpectedEndOfInput`].
    fn parse_root(&mut self) -> Arc<MultiValue> {
        let mut values: Vec<Arc<ValueWithBackground>> = Vec::new();
        loop {
            let next = self.shift();
            let before = BackgroundList::new(next.background);
            match next.token {
                None => {
                    return if values.is_empty() {
                        MultiValue::new(
                            vec![ValueWithBackground::new(before, GreenValue::Missing)],
                            BackgroundList::empty(),
                        )
                    } else {
                        MultiValue::new(values, before)
                    };
                }
                Some(token) if token.is_value_starter() => {
                    if !values.is_empty() {
                        self.errors.push(Error::new(
                            ErrorCode::ExpectedEndOfInput,
                            next.token_start,
                            token.green_len(),
                        ));
                    }
                    let content = self.parse_value(token, next.token_start);
                    values.push(ValueWithBackground::new(before, content));
                }
                Some(token) => {
                    self.errors.push(Error::new(
                        ErrorCode::ExpectedEndOfInput,
                        next.token_start,
                        token.green_len(),
                    ));
                    values.push(ValueWithBackground::new(before, GreenValue::StraySymbol(token)));
                }
            }
        }
    }

    /// Parse exactly one value slot, tolerating extra consecutive values.
    ///
    /// Afterwards the next foreground at the cursor is guaranteed not to be
    /// a value starter, and carries no background of its own: everything up
    /// to it belongs to the returned slot.
    fn parse_multi_value(&mut self, duplicate_code: ErrorCode) -> ParsedSlot {
        let first = self.shift();
        let before = BackgroundList::new(first.background);

        let starter = match first.token {
            Some(token) if token.is_value_starter() => token,
            other => {
                if let Some(token) = other {
                    self.give_back(token, first.token_start);
                }
                return ParsedSlot {
                    node: MultiValue::new(
                        vec![ValueWithBackground::new(before, GreenValue::Missing)],
                        BackgroundList::empty(),
                    ),
                    got_value: false,
                    content_start: first.token_start,
                };
            }
        };

        let content_start = first.token_start;
        let content = self.parse_value(starter, content_start);
        let mut values = vec![ValueWithBackground::new(before, content)];

        loop {
            let next = self.shift();
            match next.token {
                Some(token) if token.is_value_starter() => {
                    self.errors.push(Error::new(
                        duplicate_code,
                        next.token_start,
                        token.green_len(),
                    ));
                    let content = self.parse_value(token, next.token_start);
                    values.push(ValueWithBackground::new(
                        BackgroundList::new(next.background),
                        content,
                    ));
                }
                other => {
                    if let Some(token) = other {
                        self.give_back(token, next.token_start);
                    }
                    return ParsedSlot {
                        node: MultiValue::new(values, BackgroundList::new(next.background)),
                        got_value: true,
                        content_start,
                    };
                }
            }
        }
    }

    /// Turn one value-starter token into a green value, descending into
    /// lists and maps.
    fn parse_value(&mut self, starter: GreenToken, start: usize) -> GreenValue {
        match starter {
            GreenToken::True => GreenValue::Bool(true),
            GreenToken::False => GreenValue::Bool(false),
            GreenToken::Integer(token) => GreenValue::Integer(token),
            GreenToken::String(token) => GreenValue::String(token),
            GreenToken::ErrorString(token) => GreenValue::ErrorString(token),
            GreenToken::UnknownSymbol(token) => GreenValue::UnknownSymbol(token),
            GreenToken::UnknownValue(token) => {
                self.errors.push(Error::with_parameter(
                    ErrorCode::UnrecognizedValue,
                    start,
                    token.text().len(),
                    Parameter::Str(Some(token.text().to_string())),
                ));
                GreenValue::UnknownValue(token)
            }
            GreenToken::SquareOpen => GreenValue::List(self.parse_list()),
            GreenToken::CurlyOpen => GreenValue::Map(self.parse_map()),
            _ => unreachable!("only value starters reach parse_value"),
        }
    }

    /// Parse list items after the opening bracket has been consumed.
    fn parse_list(&mut self) -> Arc<ListNode> {
        let mut items = Vec::new();
        loop {
            let slot = self.parse_multi_value(ErrorCode::MultipleValues);
            let got_value = slot.got_value;
            items.push(slot.node);

            let next = self.shift();
            debug_assert!(next.background.is_empty());
            match next.token {
                Some(GreenToken::Comma) => {
                    if !got_value {
                        self.errors
                            .push(Error::new(ErrorCode::MissingValue, next.token_start, 1));
                    }
                }
                Some(GreenToken::SquareClose) => return ListNode::new(items, false),
                None => {
                    self.errors.push(Error::new(
                        ErrorCode::UnexpectedEofInArray,
                        next.token_start,
                        0,
                    ));
                    return ListNode::new(items, true);
                }
                Some(token) => {
                    self.errors.push(Error::new(
                        ErrorCode::ControlSymbolInArray,
                        next.token_start,
                        token.green_len(),
                    ));
                    self.give_back(token, next.token_start);
                    return ListNode::new(items, true);
                }
            }
        }
    }

    /// Parse map entries after the opening brace has been consumed.
    ///
    /// Every iteration appends an entry, even an all-empty one, so the tree
    /// stays lossless; the missing-key and missing-value diagnostics only
    /// fire for entries in which at least a key or a colon was seen.
    fn parse_map(&mut self) -> Arc<MapNode> {
        let mut entries = Vec::new();
        let mut seen_keys: HashSet<String> = HashSet::new();
        loop {
            let key_slot = self.parse_multi_value(ErrorCode::MultiplePropertyKeys);
            let got_key = key_slot.got_value;
            let mut valid_key = None;
            if got_key {
                match key_slot.node.first_content() {
                    GreenValue::String(key) => {
                        if seen_keys.insert(key.value().to_string()) {
                            valid_key = Some(key.clone());
                        } else {
                            // Duplicate detection compares decoded values;
                            // the report carries the raw quoted source.
                            let length = key.length;
                            let raw =
                                &self.source[key_slot.content_start..key_slot.content_start + length];
                            self.errors.push(Error::with_parameter(
                                ErrorCode::PropertyKeyAlreadyExists,
                                key_slot.content_start,
                                length,
                                Parameter::Str(Some(raw.to_string())),
                            ));
                        }
                    }
                    content => {
                        self.errors.push(Error::new(
                            ErrorCode::InvalidPropertyKey,
                            key_slot.content_start,
                            content.green_len(),
                        ));
                    }
                }
            }

            let mut sections = vec![key_slot.node];
            let mut got_value = false;
            let mut colons = 0;
            loop {
                let next = self.shift();
                match next.token {
                    Some(GreenToken::Colon) => {
                        debug_assert!(next.background.is_empty());
                        if colons > 0 {
                            self.errors.push(Error::new(
                                ErrorCode::MultiplePropertyKeySections,
                                next.token_start,
                                1,
                            ));
                        }
                        colons += 1;
                        let value_slot = self.parse_multi_value(ErrorCode::MultipleValues);
                        got_value |= value_slot.got_value;
                        sections.push(value_slot.node);
                    }
                    other => {
                        if let Some(token) = other {
                            self.give_back(token, next.token_start);
                        }
                        break;
                    }
                }
            }

            let next = self.shift();
            debug_assert!(next.background.is_empty());
            let terminator_len = next.token.as_ref().map_or(0, GreenToken::green_len);
            if got_key || colons > 0 {
                if !got_key {
                    self.errors.push(Error::new(
                        ErrorCode::MissingPropertyKey,
                        next.token_start,
                        terminator_len,
                    ));
                }
                if !got_value {
                    self.errors.push(Error::new(
                        ErrorCode::MissingValue,
                        next.token_start,
                        terminator_len,
                    ));
                }
            }
            entries.push(KeyValue::new(valid_key, sections));

            match next.token {
                Some(GreenToken::Comma) => {}
                Some(GreenToken::CurlyClose) => return MapNode::new(entries, false),
                None => {
                    self.errors.push(Error::new(
                        ErrorCode::UnexpectedEofInObject,
                        next.token_start,
                        0,
                    ));
                    return MapNode::new(entries, true);
                }
                Some(token) => {
                    self.errors.push(Error::new(
                        ErrorCode::ControlSymbolInObject,
                        next.token_start,
                        token.green_len(),
                    ));
                    self.give_back(token, next.token_start);
                    return MapNode::new(entries, true);
                }
            }
        }
    }
}
