//! Bindable structures.
//!
//! [`Fields`] is the field table of a structure: which fields take part in
//! encoding, under which binding tag, in declaration order. [`Object`] adds
//! the raw attribute store, which keeps everything decoded, bound or not.
//!
//! The table is normally written with [`ipp_fields!`](crate::ipp_fields):
//!
//! ```
//! use ippcodec::{ipp_fields, ipp_object, RawAttrs};
//!
//! #[derive(Debug, Default)]
//! struct JobAttrs {
//!     raw: RawAttrs,
//!     priority: i32,
//!     name: String,
//!     finishings: Vec<i32>,
//! }
//!
//! ipp_fields!(JobAttrs {
//!     priority: "?job-priority,1:100",
//!     name: "job-name,name",
//!     finishings: "finishings,enum",
//! });
//! ipp_object!(JobAttrs, raw);
//! ```

use crate::codec::{self, AttrInfo, CodecBuilder, CodecError};
use crate::decoder::{DecodeError, DecodeOptions, Decoder};
use crate::value::{Attribute, Attributes};
use std::collections::HashMap;

/// Structure with a field binding table.
pub trait Fields: Default + Send + Sync + 'static {
    /// Register the bound fields, in declaration order.
    fn fields(b: &mut CodecBuilder<'_, Self>);
}

/// Bindable structure that retains the raw attributes it was decoded from.
pub trait Object: Fields {
    fn raw_attrs(&self) -> &RawAttrs;

    fn raw_attrs_mut(&mut self) -> &mut RawAttrs;

    /// Attributes this type binds, with their tags.
    fn known_attrs() -> Result<Vec<AttrInfo>, CodecError> {
        codec::known_attrs::<Self>()
    }

    /// Raw attribute by name.
    fn get(&self, name: &str) -> Option<&Attribute> {
        self.raw_attrs().get(name)
    }

    /// Decode `attr` into its field (if bound) and store it in the raw
    /// attributes, replacing an attribute of the same name.
    fn set(&mut self, attr: Attribute) -> Result<(), CodecError> {
        Decoder::new(DecodeOptions::default()).decode_single(self, &attr)?;
        self.raw_attrs_mut().put(attr);
        Ok(())
    }
}

/// Raw attributes of a decoded object, first occurrence of each name only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawAttrs {
    attrs: Attributes,
    by_name: HashMap<String, usize>,
    errors: Vec<DecodeError>,
}

impl RawAttrs {
    pub fn all(&self) -> &[Attribute] {
        &self.attrs
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.by_name.get(name).map(|&i| &self.attrs[i])
    }

    /// Non-fatal errors reported while the attributes were decoded.
    pub fn errors(&self) -> &[DecodeError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub(crate) fn save(&mut self, attrs: &[Attribute], errors: Vec<DecodeError>) {
        self.attrs = Vec::with_capacity(attrs.len());
        self.by_name = HashMap::with_capacity(attrs.len());
        self.errors = errors;

        for attr in attrs {
            if !self.by_name.contains_key(&attr.name) {
                self.by_name.insert(attr.name.clone(), self.attrs.len());
                self.attrs.push(attr.clone());
            }
        }
    }

    pub(crate) fn put(&mut self, attr: Attribute) {
        match self.by_name.get(&attr.name) {
            Some(&i) => self.attrs[i] = attr,
            None => {
                self.by_name.insert(attr.name.clone(), self.attrs.len());
                self.attrs.push(attr);
            }
        }
    }
}

/// Implement [`Fields`] from a field list.
///
/// Each entry is `field: "binding-tag"` or `#[embed] field` for an
/// embedded structure whose fields are spliced in place. Fields not
/// listed are not bound.
#[macro_export]
macro_rules! ipp_fields {
    (@fields $b:ident;) => {};
    (@fields $b:ident; #[embed] $field:ident $(, $($rest:tt)*)?) => {
        $b.embed(stringify!($field), |s| &s.$field, |s| &mut s.$field);
        $crate::ipp_fields!(@fields $b; $($($rest)*)?);
    };
    (@fields $b:ident; $field:ident : $tag:literal $(, $($rest:tt)*)?) => {
        $b.field(stringify!($field), $tag, |s| &s.$field, |s| &mut s.$field);
        $crate::ipp_fields!(@fields $b; $($($rest)*)?);
    };
    ($ty:ty { $($body:tt)* }) => {
        impl $crate::object::Fields for $ty {
            fn fields(b: &mut $crate::codec::CodecBuilder<'_, Self>) {
                $crate::ipp_fields!(@fields b; $($body)*);
            }
        }
    };
}

/// Implement [`Object`] by naming the [`RawAttrs`] field.
#[macro_export]
macro_rules! ipp_object {
    ($ty:ty, $raw:ident) => {
        impl $crate::object::Object for $ty {
            fn raw_attrs(&self) -> &$crate::object::RawAttrs {
                &self.$raw
            }

            fn raw_attrs_mut(&mut self) -> &mut $crate::object::RawAttrs {
                &mut self.$raw
            }
        }
    };
}

/// Allow [`Fields`] types as collection values (`T`, `Vec<T>`, `Option<T>`).
/// The type must also be `Clone + PartialEq`.
#[macro_export]
macro_rules! ipp_collection {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::binding::Leaf for $ty {
            fn binding() -> ::core::result::Result<
                $crate::binding::Binding<Self>,
                $crate::codec::BuildError,
            > {
                $crate::binding::collection::<$ty>()
            }
        }

        $crate::__leaf_field_type!($ty);
    )+};
}

/// Declare a string newtype that is always encoded as `keyword`.
#[macro_export]
macro_rules! ipp_keyword {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
        $vis struct $name(pub ::std::string::String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::convert::From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl $crate::binding::Leaf for $name {
            fn binding() -> ::core::result::Result<
                $crate::binding::Binding<Self>,
                $crate::codec::BuildError,
            > {
                let b = <::std::string::String as $crate::binding::Leaf>::binding()?;
                ::core::result::Result::Ok(
                    b.map($name, |v| &v.0).forced($crate::value::Tag::KEYWORD),
                )
            }
        }

        $crate::__leaf_field_type!($name);
    };
}

/// Declare an integer newtype that is always encoded as `enum`.
#[macro_export]
macro_rules! ipp_enum {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis struct $name(pub i32);

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl $crate::binding::Leaf for $name {
            fn binding() -> ::core::result::Result<
                $crate::binding::Binding<Self>,
                $crate::codec::BuildError,
            > {
                let b = <i32 as $crate::binding::Leaf>::binding()?;
                ::core::result::Result::Ok(
                    b.map($name, |v| &v.0).forced($crate::value::Tag::ENUM),
                )
            }
        }

        $crate::__leaf_field_type!($name);
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Tag;

    #[test]
    fn save_keeps_first_occurrence() {
        let mut raw = RawAttrs::default();
        raw.save(
            &[
                Attribute::new("a", Tag::INTEGER, 1),
                Attribute::new("b", Tag::INTEGER, 2),
                Attribute::new("a", Tag::INTEGER, 3),
            ],
            Vec::new(),
        );
        assert_eq!(raw.all().len(), 2);
        assert_eq!(raw.get("a").map(|a| a.values[0].1.as_i32()), Some(Some(1)));
    }

    #[test]
    fn put_replaces_or_appends() {
        let mut raw = RawAttrs::default();
        raw.put(Attribute::new("a", Tag::INTEGER, 1));
        raw.put(Attribute::new("b", Tag::INTEGER, 2));
        raw.put(Attribute::new("a", Tag::INTEGER, 5));
        let names: Vec<_> = raw.all().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(raw.get("a").and_then(|a| a.values[0].1.as_i32()), Some(5));
    }
}
