//! Visitor interfaces over terminal symbols.
//!
//! Consumers such as syntax highlighters dispatch on token kinds in two
//! situations: while draining the lexer directly ([`GreenTokenVisitor`]) and
//! while rendering a parsed tree ([`SyntaxTokenVisitor`]). Both traits offer
//! one overridable method per terminal kind with a required fallback, and an
//! associated `Output` so the same interface serves unit, result-returning,
//! and stateful visitors. Traversal itself is up to the caller — typically
//! [`SyntaxNode::terminals_in_range`](crate::SyntaxNode::terminals_in_range).

use crate::green::GreenToken;
use crate::syntax::SyntaxNode;

/// Dispatch over green tokens, straight off the lexer.
pub trait GreenTokenVisitor {
    type Output;

    /// Fallback for every token kind without a dedicated override.
    fn visit_token(&mut self, token: &GreenToken) -> Self::Output;

    fn visit_whitespace(&mut self, token: &GreenToken) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_comment(&mut self, token: &GreenToken) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_unterminated_comment(&mut self, token: &GreenToken) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_curly_open(&mut self, token: &GreenToken) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_curly_close(&mut self, token: &GreenToken) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_square_open(&mut self, token: &GreenToken) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_square_close(&mut self, token: &GreenToken) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_colon(&mut self, token: &GreenToken) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_comma(&mut self, token: &GreenToken) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_string(&mut self, token: &GreenToken) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_error_string(&mut self, token: &GreenToken) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_integer(&mut self, token: &GreenToken) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_unknown_value(&mut self, token: &GreenToken) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_unknown_symbol(&mut self, token: &GreenToken) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_boolean(&mut self, token: &GreenToken) -> Self::Output {
        self.visit_token(token)
    }
}

impl GreenToken {
    /// Dispatch to the visitor method for this token's kind.
    pub fn accept<V: GreenTokenVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            GreenToken::Whitespace(_) => visitor.visit_whitespace(self),
            GreenToken::Comment(_) => visitor.visit_comment(self),
            GreenToken::UnterminatedComment(_) => visitor.visit_unterminated_comment(self),
            GreenToken::CurlyOpen => visitor.visit_curly_open(self),
            GreenToken::CurlyClose => visitor.visit_curly_close(self),
            GreenToken::SquareOpen => visitor.visit_square_open(self),
            GreenToken::SquareClose => visitor.visit_square_close(self),
            GreenToken::Colon => visitor.visit_colon(self),
            GreenToken::Comma => visitor.visit_comma(self),
            GreenToken::String(_) => visitor.visit_string(self),
            GreenToken::ErrorString(_) => visitor.visit_error_string(self),
            GreenToken::Integer(_) => visitor.visit_integer(self),
            GreenToken::UnknownValue(_) => visitor.visit_unknown_value(self),
            GreenToken::UnknownSymbol(_) => visitor.visit_unknown_symbol(self),
            GreenToken::True | GreenToken::False => visitor.visit_boolean(self),
        }
    }
}

/// Dispatch over red terminals, with positions available through the handle.
pub trait SyntaxTokenVisitor {
    type Output;

    /// Fallback for every token kind without a dedicated override.
    fn visit_token(&mut self, token: &SyntaxNode) -> Self::Output;

    fn visit_whitespace(&mut self, token: &SyntaxNode) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_comment(&mut self, token: &SyntaxNode) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_unterminated_comment(&mut self, token: &SyntaxNode) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_curly_open(&mut self, token: &SyntaxNode) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_curly_close(&mut self, token: &SyntaxNode) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_square_open(&mut self, token: &SyntaxNode) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_square_close(&mut self, token: &SyntaxNode) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_colon(&mut self, token: &SyntaxNode) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_comma(&mut self, token: &SyntaxNode) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_string(&mut self, token: &SyntaxNode) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_error_string(&mut self, token: &SyntaxNode) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_integer(&mut self, token: &SyntaxNode) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_unknown_value(&mut self, token: &SyntaxNode) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_unknown_symbol(&mut self, token: &SyntaxNode) -> Self::Output {
        self.visit_token(token)
    }
    fn visit_boolean(&mut self, token: &SyntaxNode) -> Self::Output {
        self.visit_token(token)
    }
}

impl SyntaxNode {
    /// Dispatch to the visitor method for this terminal's kind, or `None`
    /// when the node is not a terminal symbol.
    pub fn accept_token<V: SyntaxTokenVisitor>(&self, visitor: &mut V) -> Option<V::Output> {
        let crate::green::GreenElement::Token(token) = self.green() else {
            return None;
        };
        Some(match token {
            GreenToken::Whitespace(_) => visitor.visit_whitespace(self),
            GreenToken::Comment(_) => visitor.visit_comment(self),
            GreenToken::UnterminatedComment(_) => visitor.visit_unterminated_comment(self),
            GreenToken::CurlyOpen => visitor.visit_curly_open(self),
            GreenToken::CurlyClose => visitor.visit_curly_close(self),
            GreenToken::SquareOpen => visitor.visit_square_open(self),
            GreenToken::SquareClose => visitor.visit_square_close(self),
            GreenToken::Colon => visitor.visit_colon(self),
            GreenToken::Comma => visitor.visit_comma(self),
            GreenToken::String(_) => visitor.visit_string(self),
            GreenToken::ErrorString(_) => visitor.visit_error_string(self),
            GreenToken::Integer(_) => visitor.visit_integer(self),
            GreenToken::UnknownValue(_) => visitor.visit_unknown_value(self),
            GreenToken::UnknownSymbol(_) => visitor.visit_unknown_symbol(self),
            GreenToken::True | GreenToken::False => visitor.visit_boolean(self),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::green::GreenLen;
    use crate::{parse, tokenize};

    /// A toy highlighter: one style per interesting token kind.
    #[derive(Default)]
    struct Highlighter {
        spans: Vec<(usize, usize, &'static str)>,
    }

    impl SyntaxTokenVisitor for Highlighter {
        type Output = ();

        fn visit_token(&mut self, _token: &SyntaxNode) {}

        fn visit_string(&mut self, token: &SyntaxNode) {
            self.spans.push((token.absolute_start(), token.len(), "string"));
        }

        fn visit_integer(&mut self, token: &SyntaxNode) {
            self.spans.push((token.absolute_start(), token.len(), "number"));
        }

        fn visit_comment(&mut self, token: &SyntaxNode) {
            self.spans.push((token.absolute_start(), token.len(), "comment"));
        }
    }

    #[test]
    fn highlighting_over_a_range_query() {
        let source = "{\"k\": 1} /*done*/";
        let tree = parse(source);
        let mut highlighter = Highlighter::default();
        for terminal in tree.syntax().terminals_in_range(0, source.len()) {
            terminal.accept_token(&mut highlighter);
        }
        assert_eq!(
            highlighter.spans,
            vec![(1, 3, "string"), (6, 1, "number"), (9, 8, "comment")]
        );
    }

    #[test]
    fn accept_on_a_composite_returns_none() {
        let tree = parse("[1]");
        let mut highlighter = Highlighter::default();
        assert!(tree.syntax().accept_token(&mut highlighter).is_none());
    }

    /// A green visitor with a result: byte length of value-ish tokens.
    struct ForegroundLen;

    impl GreenTokenVisitor for ForegroundLen {
        type Output = usize;

        fn visit_token(&mut self, _token: &GreenToken) -> usize {
            0
        }

        fn visit_string(&mut self, token: &GreenToken) -> usize {
            token.green_len()
        }

        fn visit_integer(&mut self, token: &GreenToken) -> usize {
            token.green_len()
        }

        fn visit_boolean(&mut self, token: &GreenToken) -> usize {
            token.green_len()
        }
    }

    #[test]
    fn green_dispatch_with_results() {
        let total: usize = tokenize("[1, true, \"x\"]")
            .map(|token| token.accept(&mut ForegroundLen))
            .sum();
        assert_eq!(total, 1 + 4 + 3);
    }
}
