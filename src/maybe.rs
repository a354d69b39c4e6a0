//! Optional value that remembers why it is absent.
//!
//! On the wire an absent value is an out-of-band tag (`no-value`,
//! `unknown`, ...). `Maybe<T>` keeps that tag so it survives a
//! decode/encode cycle, where `Option<T>` would collapse it into `None`.

use crate::value::Tag;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Maybe<T> {
    value: T,
    reason: Tag,
    ok: bool,
}

impl<T: Default> Maybe<T> {
    /// A present value.
    pub fn some(value: T) -> Self {
        Maybe {
            value,
            reason: Tag::ZERO,
            ok: true,
        }
    }

    /// An absent value, encoded as `reason` (an out-of-band tag).
    pub fn absent(reason: Tag) -> Self {
        Maybe {
            value: T::default(),
            reason,
            ok: false,
        }
    }

    pub fn set(&mut self, value: T) {
        *self = Maybe::some(value);
    }

    /// Mark as absent with the given out-of-band reason.
    pub fn del(&mut self, reason: Tag) {
        *self = Maybe::absent(reason);
    }

    pub fn get(&self) -> Option<&T> {
        self.ok.then_some(&self.value)
    }

    pub fn is_set(&self) -> bool {
        self.ok
    }

    /// Out-of-band tag recorded for an absent value; `Tag::ZERO` otherwise.
    pub fn reason(&self) -> Tag {
        self.reason
    }

    pub fn into_option(self) -> Option<T> {
        self.ok.then_some(self.value)
    }
}

impl<T: Default> From<Option<T>> for Maybe<T> {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => Maybe::some(v),
            None => Maybe::default(),
        }
    }
}
