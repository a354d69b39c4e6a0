//! Parsed form of a field binding tag.

use crate::value::Tag;

/// Attribute conformance, from the name prefix: `?` optional, `!` required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Conformance {
    Optional,
    #[default]
    Recommended,
    Required,
}

/// Everything a binding tag says about one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrDescriptor {
    pub name: String,
    pub conformance: Conformance,
    /// Explicit wire tag, or `Tag::ZERO` when the tag string names none.
    pub tag: Tag,
    /// Out-of-band tag used to encode the zero value (`Tag::ZERO`: none).
    pub zero_tag: Tag,
    pub min: i32,
    pub max: i32,
}

impl AttrDescriptor {
    pub fn new(name: impl Into<String>, conformance: Conformance) -> Self {
        AttrDescriptor {
            name: name.into(),
            conformance,
            tag: Tag::ZERO,
            zero_tag: Tag::ZERO,
            min: i32::MIN,
            max: i32::MAX,
        }
    }

    /// True when `min`/`max` narrow the full i32 range.
    pub fn is_bounded(&self) -> bool {
        self.min != i32::MIN || self.max != i32::MAX
    }
}
