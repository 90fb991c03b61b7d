use json_lossless::green::{GreenElement, GreenLen};
use json_lossless::{parse, tokenize, GreenValue, SyntaxNode};
use proptest::prelude::*;

fn root_content(node: &SyntaxNode) -> GreenValue {
    match node.green() {
        GreenElement::MultiValue(root) => root.first_content().clone(),
        _ => unreachable!("the root is always a multi value"),
    }
}

proptest! {
    /// The lexer tiles the source: lengths sum to the input length with no
    /// gaps and no overlaps.
    #[test]
    fn tokens_tile_the_source(source in any::<String>()) {
        let total: usize = tokenize(&source).map(|token| token.green_len()).sum();
        prop_assert_eq!(total, source.len());
    }

    /// Whatever the input, the tree covers it and every error span stays
    /// inside it.
    #[test]
    fn tree_and_errors_stay_in_bounds(source in any::<String>()) {
        let tree = parse(&source);
        prop_assert_eq!(tree.syntax().len(), source.len());
        for error in tree.errors() {
            prop_assert!(error.start() + error.length() <= source.len());
        }
    }

    /// The full-range terminal query yields every lexer token exactly once,
    /// in source order and contiguously.
    #[test]
    fn terminal_query_enumerates_every_token_once(source in any::<String>()) {
        let tree = parse(&source);
        let terminals = tree.syntax().terminals_in_range(0, source.len());
        let mut offset = 0;
        for terminal in &terminals {
            prop_assert!(terminal.is_token());
            prop_assert_eq!(terminal.absolute_start(), offset);
            offset += terminal.len();
        }
        prop_assert_eq!(offset, source.len());
        prop_assert_eq!(terminals.len(), tokenize(&source).count());
    }

    /// Every red node agrees with its green element and fits in the source.
    #[test]
    fn red_green_lengths_agree(source in any::<String>()) {
        fn walk(node: &SyntaxNode, source_len: usize) -> Result<(), TestCaseError> {
            prop_assert_eq!(node.len(), node.green().green_len());
            prop_assert!(node.absolute_start() + node.len() <= source_len);
            for (index, child) in node.children().enumerate() {
                prop_assert_eq!(node.child_start(index), Some(child.start()));
                walk(&child, source_len)?;
            }
            Ok(())
        }
        let tree = parse(&source);
        walk(&tree.syntax(), source.len())?;
    }

    /// An integer literal holds exactly the value its text denotes.
    #[test]
    fn integer_literals_round_trip(value in any::<i128>()) {
        let text = value.to_string();
        let tree = parse(&text);
        prop_assert!(tree.errors().is_empty());
        match root_content(&tree.syntax()) {
            GreenValue::Integer(token) => prop_assert_eq!(token.value().to_string(), text),
            other => prop_assert!(false, "expected an integer, got {:?}", other),
        }
    }

    /// A trailing comma adds a missing item that the filtered count ignores.
    #[test]
    fn trailing_comma_is_filtered(values in prop::collection::vec(any::<i64>(), 1..8), trailing in any::<bool>()) {
        let mut source = format!(
            "[{}",
            values.iter().map(i64::to_string).collect::<Vec<_>>().join(",")
        );
        if trailing {
            source.push(',');
        }
        source.push(']');

        let tree = parse(&source);
        prop_assert!(tree.errors().is_empty());
        match root_content(&tree.syntax()) {
            GreenValue::List(list) => {
                prop_assert_eq!(list.items().len(), values.len() + usize::from(trailing));
                prop_assert_eq!(list.filtered_item_count(), values.len());
            }
            other => prop_assert!(false, "expected a list, got {:?}", other),
        }
    }

    /// The valid-pairs view keeps the first occurrence of each key, and its
    /// key offsets land on the opening quote of the key.
    #[test]
    fn valid_pairs_reflect_first_occurrences(
        entries in prop::collection::vec(("[a-z]{1,3}", any::<i32>()), 1..6)
    ) {
        let body = entries
            .iter()
            .map(|(key, value)| format!("\"{key}\":{value}"))
            .collect::<Vec<_>>()
            .join(",");
        let source = format!("{{{body}}}");

        let tree = parse(&source);
        match root_content(&tree.syntax()) {
            GreenValue::Map(map) => {
                let pairs: Vec<(String, String)> = map
                    .valid_key_value_pairs()
                    .map(|pair| {
                        // the map starts at offset 0, so pair offsets are absolute
                        prop_assert_eq!(source.as_bytes()[pair.key_offset], b'"');
                        Ok((pair.key.value().to_string(), format!("{:?}", pair.value)))
                    })
                    .collect::<Result<_, TestCaseError>>()?;

                let mut seen = std::collections::HashSet::new();
                let expected: Vec<(String, String)> = entries
                    .iter()
                    .filter(|(key, _)| seen.insert(key.clone()))
                    .map(|(key, value)| {
                        let parsed = parse(&value.to_string());
                        (key.clone(), format!("{:?}", root_content(&parsed.syntax())))
                    })
                    .collect();
                prop_assert_eq!(pairs, expected);
            }
            other => prop_assert!(false, "expected a map, got {:?}", other),
        }
    }
}

/// Re-lexing the text of any single token reproduces that token.
#[test]
fn single_token_lexing_is_idempotent() {
    let source = "{\"k\": [1, true, -42, nul, /*c*/ \"s\"], \"done\": false} // tail";
    let mut offset = 0;
    for token in tokenize(source) {
        let text = &source[offset..offset + token.green_len()];
        let again: Vec<_> = tokenize(text).collect();
        offset += token.green_len();
        assert_eq!(again, vec![token]);
    }
    assert_eq!(offset, source.len());
}
