use std::sync::OnceLock;

use triomphe::Arc;

use crate::green::list::{GreenLen, SeparatedSpanList, SpanList};
use crate::green::token::{
    ErrorStringToken, GreenToken, IntegerToken, StringToken, UnknownSymbolToken, UnknownValueToken,
};

/// An ordered run of background tokens: whitespace, comments, and
/// unterminated comments. The empty list is a canonical shared instance.
#[derive(Debug, PartialEq, Eq)]
pub struct BackgroundList {
    tokens: SpanList<GreenToken>,
}

impl BackgroundList {
    pub fn new(tokens: Vec<GreenToken>) -> Arc<Self> {
        if tokens.is_empty() {
            return Self::empty();
        }
        debug_assert!(tokens.iter().all(GreenToken::is_background));
        Arc::new(Self {
            tokens: SpanList::new(tokens),
        })
    }

    /// The canonical empty background.
    pub fn empty() -> Arc<Self> {
        static EMPTY: OnceLock<Arc<BackgroundList>> = OnceLock::new();
        EMPTY
            .get_or_init(|| {
                Arc::new(BackgroundList {
                    tokens: SpanList::empty(),
                })
            })
            .clone()
    }

    pub fn tokens(&self) -> &SpanList<GreenToken> {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl GreenLen for BackgroundList {
    fn green_len(&self) -> usize {
        self.tokens.total_len()
    }
}

/// A parsed value inhabiting a value position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GreenValue {
    Bool(bool),
    Integer(Arc<IntegerToken>),
    String(Arc<StringToken>),
    ErrorString(Arc<ErrorStringToken>),
    UnknownValue(Arc<UnknownValueToken>),
    UnknownSymbol(Arc<UnknownSymbolToken>),
    /// A value position for which recovery found nothing. Length zero.
    Missing,
    List(Arc<ListNode>),
    Map(Arc<MapNode>),
    /// A structural token in a value position at the top level, kept so the
    /// tree still covers it.
    StraySymbol(GreenToken),
}

impl GreenValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, GreenValue::Missing)
    }

    /// The tree element this value contributes to its parent.
    pub(crate) fn to_element(&self) -> GreenElement {
        match self {
            GreenValue::Bool(true) => GreenElement::Token(GreenToken::True),
            GreenValue::Bool(false) => GreenElement::Token(GreenToken::False),
            GreenValue::Integer(token) => GreenElement::Token(GreenToken::Integer(token.clone())),
            GreenValue::String(token) => GreenElement::Token(GreenToken::String(token.clone())),
            GreenValue::ErrorString(token) => {
                GreenElement::Token(GreenToken::ErrorString(token.clone()))
            }
            GreenValue::UnknownValue(token) => {
                GreenElement::Token(GreenToken::UnknownValue(token.clone()))
            }
            GreenValue::UnknownSymbol(token) => {
                GreenElement::Token(GreenToken::UnknownSymbol(token.clone()))
            }
            GreenValue::Missing => GreenElement::Missing,
            GreenValue::List(node) => GreenElement::List(node.clone()),
            GreenValue::Map(node) => GreenElement::Map(node.clone()),
            GreenValue::StraySymbol(token) => GreenElement::Token(token.clone()),
        }
    }
}

impl GreenLen for GreenValue {
    fn green_len(&self) -> usize {
        match self {
            GreenValue::Bool(true) => 4,
            GreenValue::Bool(false) => 5,
            GreenValue::Integer(token) => token.length,
            GreenValue::String(token) => token.length,
            GreenValue::ErrorString(token) => token.length,
            GreenValue::UnknownValue(token) => token.text.len(),
            GreenValue::UnknownSymbol(token) => token.length,
            GreenValue::Missing => 0,
            GreenValue::List(node) => node.green_len(),
            GreenValue::Map(node) => node.green_len(),
            GreenValue::StraySymbol(token) => token.green_len(),
        }
    }
}

/// A value together with the background that precedes it.
#[derive(Debug, PartialEq, Eq)]
pub struct ValueWithBackground {
    before: Arc<BackgroundList>,
    content: GreenValue,
    length: usize,
}

impl ValueWithBackground {
    pub fn new(before: Arc<BackgroundList>, content: GreenValue) -> Arc<Self> {
        let length = before.green_len() + content.green_len();
        Arc::new(Self {
            before,
            content,
            length,
        })
    }

    pub fn before(&self) -> &Arc<BackgroundList> {
        &self.before
    }

    pub fn content(&self) -> &GreenValue {
        &self.content
    }
}

impl GreenLen for ValueWithBackground {
    fn green_len(&self) -> usize {
        self.length
    }
}

/// A single value slot.
///
/// Error recovery means a slot can hold more than one accidental value, or a
/// missing one. A missing value can only be the sole entry, in which case all
/// surrounding background is absorbed into its `before` and `trailing` stays
/// empty.
#[derive(Debug, PartialEq, Eq)]
pub struct MultiValue {
    values: SpanList<Arc<ValueWithBackground>>,
    trailing: Arc<BackgroundList>,
}

impl MultiValue {
    pub fn new(values: Vec<Arc<ValueWithBackground>>, trailing: Arc<BackgroundList>) -> Arc<Self> {
        assert!(!values.is_empty(), "a value slot holds at least one value");
        if values[0].content().is_missing() {
            assert!(
                values.len() == 1 && trailing.is_empty(),
                "a missing value is alone in its slot and absorbs all background"
            );
        }
        assert!(
            values.iter().skip(1).all(|value| !value.content().is_missing()),
            "only the first value of a slot may be missing"
        );
        Arc::new(Self {
            values: SpanList::new(values),
            trailing,
        })
    }

    pub fn values(&self) -> &SpanList<Arc<ValueWithBackground>> {
        &self.values
    }

    pub fn trailing(&self) -> &Arc<BackgroundList> {
        &self.trailing
    }

    /// The first (grammatical) value of the slot.
    pub fn first_content(&self) -> &GreenValue {
        self.values.element(0).content()
    }
}

impl GreenLen for MultiValue {
    fn green_len(&self) -> usize {
        self.values.total_len() + self.trailing.green_len()
    }
}

/// One object entry: a key slot plus any number of colon-separated value
/// slots.
///
/// `sections[0]` holds the key. `valid_key` is only present when the key slot
/// starts with a string literal that did not duplicate an earlier key, and is
/// then pointer-equal to that literal.
#[derive(Debug, PartialEq, Eq)]
pub struct KeyValue {
    valid_key: Option<Arc<StringToken>>,
    sections: SeparatedSpanList<Arc<MultiValue>>,
}

impl KeyValue {
    pub fn new(valid_key: Option<Arc<StringToken>>, sections: Vec<Arc<MultiValue>>) -> Arc<Self> {
        let sections = SeparatedSpanList::new(sections, GreenToken::Colon);
        if let Some(key) = &valid_key {
            match sections.element(0).first_content() {
                GreenValue::String(first) => {
                    assert!(
                        Arc::ptr_eq(key, first),
                        "valid_key must be the first content of the key section"
                    );
                }
                _ => panic!("valid_key must be the first content of the key section"),
            }
        }
        Arc::new(Self { valid_key, sections })
    }

    pub fn valid_key(&self) -> Option<&Arc<StringToken>> {
        self.valid_key.as_ref()
    }

    pub fn sections(&self) -> &SeparatedSpanList<Arc<MultiValue>> {
        &self.sections
    }

    /// The first value slot after the first colon, if any.
    pub fn value_section(&self) -> Option<&Arc<MultiValue>> {
        (self.sections.len() > 1).then(|| self.sections.element(1))
    }
}

impl GreenLen for KeyValue {
    fn green_len(&self) -> usize {
        self.sections.total_len()
    }
}

/// A `[` … `]` list. The closing bracket may be missing after recovery.
#[derive(Debug, PartialEq, Eq)]
pub struct ListNode {
    items: SeparatedSpanList<Arc<MultiValue>>,
    missing_close: bool,
}

impl ListNode {
    pub fn new(items: Vec<Arc<MultiValue>>, missing_close: bool) -> Arc<Self> {
        Arc::new(Self {
            items: SeparatedSpanList::new(items, GreenToken::Comma),
            missing_close,
        })
    }

    pub fn items(&self) -> &SeparatedSpanList<Arc<MultiValue>> {
        &self.items
    }

    pub fn missing_close(&self) -> bool {
        self.missing_close
    }

    /// Item count with a trailing comma tolerated: a final missing item does
    /// not count.
    pub fn filtered_item_count(&self) -> usize {
        let len = self.items.len();
        if self.items.element(len - 1).first_content().is_missing() {
            len - 1
        } else {
            len
        }
    }
}

impl GreenLen for ListNode {
    fn green_len(&self) -> usize {
        1 + self.items.total_len() + usize::from(!self.missing_close)
    }
}

/// One `(key, value)` pair of [`MapNode::valid_key_value_pairs`]. Offsets are
/// relative to the map's opening brace; red-tree callers add the map's
/// absolute start.
#[derive(Debug, Clone, Copy)]
pub struct ValidKeyValuePair<'a> {
    pub key_offset: usize,
    pub key: &'a Arc<StringToken>,
    pub value_offset: usize,
    pub value: &'a GreenValue,
}

/// A `{` … `}` map. The closing brace may be missing after recovery.
#[derive(Debug, PartialEq, Eq)]
pub struct MapNode {
    entries: SeparatedSpanList<Arc<KeyValue>>,
    missing_close: bool,
}

impl MapNode {
    pub fn new(entries: Vec<Arc<KeyValue>>, missing_close: bool) -> Arc<Self> {
        Arc::new(Self {
            entries: SeparatedSpanList::new(entries, GreenToken::Comma),
            missing_close,
        })
    }

    pub fn entries(&self) -> &SeparatedSpanList<Arc<KeyValue>> {
        &self.entries
    }

    pub fn missing_close(&self) -> bool {
        self.missing_close
    }

    /// The entries that survived recovery intact: a valid key and a present
    /// first value. Yields in source order.
    pub fn valid_key_value_pairs(&self) -> impl Iterator<Item = ValidKeyValuePair<'_>> {
        (0..self.entries.len()).filter_map(move |index| {
            let entry = self.entries.element(index);
            let key = entry.valid_key()?;
            let value_slot = entry.value_section()?;
            let value = value_slot.first_content();
            if value.is_missing() {
                return None;
            }
            let entry_offset = 1 + self.entries.element_offset(index);
            let key_slot = entry.sections().element(0);
            Some(ValidKeyValuePair {
                key_offset: entry_offset + key_slot.values().element(0).before().green_len(),
                key,
                value_offset: entry_offset
                    + entry.sections().element_offset(1)
                    + value_slot.values().element(0).before().green_len(),
                value,
            })
        })
    }
}

impl GreenLen for MapNode {
    fn green_len(&self) -> usize {
        1 + self.entries.total_len() + usize::from(!self.missing_close)
    }
}

/// Any element of the green tree, as seen by the red overlay: a terminal
/// token, a composite node, or the zero-length missing value.
#[derive(Debug, Clone)]
pub enum GreenElement {
    Token(GreenToken),
    Background(Arc<BackgroundList>),
    ValueWithBackground(Arc<ValueWithBackground>),
    MultiValue(Arc<MultiValue>),
    KeyValue(Arc<KeyValue>),
    List(Arc<ListNode>),
    Map(Arc<MapNode>),
    Missing,
}

impl GreenElement {
    /// Is this element a terminal symbol emitted by the lexer?
    pub fn is_token(&self) -> bool {
        matches!(self, GreenElement::Token(_))
    }

    pub fn child_count(&self) -> usize {
        match self {
            GreenElement::Token(_) | GreenElement::Missing => 0,
            GreenElement::Background(background) => background.tokens().len(),
            GreenElement::ValueWithBackground(_) => 2,
            GreenElement::MultiValue(node) => node.values().len() + 1,
            GreenElement::KeyValue(node) => node.sections().interleaved_len(),
            GreenElement::List(node) => {
                1 + node.items().interleaved_len() + usize::from(!node.missing_close())
            }
            GreenElement::Map(node) => {
                1 + node.entries().interleaved_len() + usize::from(!node.missing_close())
            }
        }
    }

    pub fn child(&self, index: usize) -> GreenElement {
        match self {
            GreenElement::Token(_) | GreenElement::Missing => {
                panic!("terminal elements have no children")
            }
            GreenElement::Background(background) => {
                GreenElement::Token(background.tokens().element(index).clone())
            }
            GreenElement::ValueWithBackground(node) => match index {
                0 => GreenElement::Background(node.before().clone()),
                1 => node.content().to_element(),
                _ => panic!("a value with background has exactly two children"),
            },
            GreenElement::MultiValue(node) => {
                if index < node.values().len() {
                    GreenElement::ValueWithBackground(node.values().element(index).clone())
                } else if index == node.values().len() {
                    GreenElement::Background(node.trailing().clone())
                } else {
                    panic!("child index out of range")
                }
            }
            GreenElement::KeyValue(node) => Self::interleaved_child(node.sections(), index, |s| {
                GreenElement::MultiValue(s.clone())
            }),
            GreenElement::List(node) => {
                let interleaved = node.items().interleaved_len();
                if index == 0 {
                    GreenElement::Token(GreenToken::SquareOpen)
                } else if index - 1 < interleaved {
                    Self::interleaved_child(node.items(), index - 1, |s| {
                        GreenElement::MultiValue(s.clone())
                    })
                } else if index - 1 == interleaved && !node.missing_close() {
                    GreenElement::Token(GreenToken::SquareClose)
                } else {
                    panic!("child index out of range")
                }
            }
            GreenElement::Map(node) => {
                let interleaved = node.entries().interleaved_len();
                if index == 0 {
                    GreenElement::Token(GreenToken::CurlyOpen)
                } else if index - 1 < interleaved {
                    Self::interleaved_child(node.entries(), index - 1, |s| {
                        GreenElement::KeyValue(s.clone())
                    })
                } else if index - 1 == interleaved && !node.missing_close() {
                    GreenElement::Token(GreenToken::CurlyClose)
                } else {
                    panic!("child index out of range")
                }
            }
        }
    }

    /// Start of child `index` within this element. A pure function of green
    /// offsets: no red node is materialized.
    pub fn child_offset(&self, index: usize) -> usize {
        match self {
            GreenElement::Token(_) | GreenElement::Missing => {
                panic!("terminal elements have no children")
            }
            GreenElement::Background(background) => background.tokens().offset(index),
            GreenElement::ValueWithBackground(node) => match index {
                0 => 0,
                1 => node.before().green_len(),
                _ => panic!("a value with background has exactly two children"),
            },
            GreenElement::MultiValue(node) => {
                if index < node.values().len() {
                    node.values().offset(index)
                } else if index == node.values().len() {
                    node.values().total_len()
                } else {
                    panic!("child index out of range")
                }
            }
            GreenElement::KeyValue(node) => node.sections().interleaved_offset(index),
            GreenElement::List(node) => {
                let interleaved = node.items().interleaved_len();
                if index == 0 {
                    0
                } else if index - 1 < interleaved {
                    1 + node.items().interleaved_offset(index - 1)
                } else {
                    1 + node.items().total_len()
                }
            }
            GreenElement::Map(node) => {
                let interleaved = node.entries().interleaved_len();
                if index == 0 {
                    0
                } else if index - 1 < interleaved {
                    1 + node.entries().interleaved_offset(index - 1)
                } else {
                    1 + node.entries().total_len()
                }
            }
        }
    }

    fn interleaved_child<E>(
        list: &SeparatedSpanList<Arc<E>>,
        index: usize,
        element: impl Fn(&Arc<E>) -> GreenElement,
    ) -> GreenElement
    where
        Arc<E>: GreenLen,
    {
        if index % 2 == 0 {
            element(list.element(index / 2))
        } else {
            GreenElement::Token(list.separator().clone())
        }
    }
}

impl GreenLen for GreenElement {
    fn green_len(&self) -> usize {
        match self {
            GreenElement::Token(token) => token.green_len(),
            GreenElement::Background(node) => node.green_len(),
            GreenElement::ValueWithBackground(node) => node.green_len(),
            GreenElement::MultiValue(node) => node.green_len(),
            GreenElement::KeyValue(node) => node.green_len(),
            GreenElement::List(node) => node.green_len(),
            GreenElement::Map(node) => node.green_len(),
            GreenElement::Missing => 0,
        }
    }
}
