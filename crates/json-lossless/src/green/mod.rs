//! The immutable, position-independent layer of the syntax tree.
//!
//! Green tokens and nodes carry only lengths and child references, never
//! absolute positions, so identical subtrees can be shared freely. The
//! position-aware view on top of them lives in [`crate::syntax`].

mod list;
mod node;
mod token;

pub use list::{GreenLen, SeparatedSpanList, SpanList};
pub use node::{
    BackgroundList, GreenElement, GreenValue, KeyValue, ListNode, MapNode, MultiValue,
    ValidKeyValuePair, ValueWithBackground,
};
pub use token::{
    ErrorStringToken, GreenToken, IntegerToken, StringToken, UnknownSymbolToken, UnknownValueToken,
};
