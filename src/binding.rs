//! Elementary bindings and field adapters.
//!
//! A [`Binding`] is the natural wire tag of one value kind plus its
//! single-value encode/decode functions. [`Leaf`] types provide one.
//! A field's shape (`T`, `Vec<T>`, `Option<T>`, `Maybe<T>`) is described by
//! [`FieldType`], which wraps the leaf binding into an [`Adapter`] working on
//! the whole value list of an attribute.

use crate::codec::{codec, BuildError};
use crate::decoder::{DecodeError, Decoder, PathElem, ValueError};
use crate::maybe::Maybe;
use crate::object::Fields;
use crate::value::{
    DateTime, IntegerOrRange, Range, Resolution, Tag, TextWithLang, Value, ValueType, Values,
    Version,
};
use std::sync::Arc;

pub type EncodeFn<T> = Arc<dyn Fn(&T) -> (Tag, Value) + Send + Sync>;
pub type DecodeFn<T> = Arc<dyn Fn(&mut Decoder, Tag, &Value) -> Result<T, DecodeError> + Send + Sync>;

/// Single-value binding of a value kind.
///
/// `encode` may return `Tag::ZERO`, meaning "use the attribute's tag".
pub struct Binding<T> {
    /// Natural wire tag (`Tag::ZERO`: values carry their own tags).
    pub tag: Tag,
    /// Tag this kind always uses unless the binding tag overrides it.
    pub forced: Option<Tag>,
    pub encode: EncodeFn<T>,
    pub decode: DecodeFn<T>,
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Binding {
            tag: self.tag,
            forced: self.forced,
            encode: self.encode.clone(),
            decode: self.decode.clone(),
        }
    }
}

impl<T: 'static> Binding<T> {
    pub fn new<E, D>(tag: Tag, encode: E, decode: D) -> Self
    where
        E: Fn(&T) -> (Tag, Value) + Send + Sync + 'static,
        D: Fn(&mut Decoder, Tag, &Value) -> Result<T, DecodeError> + Send + Sync + 'static,
    {
        Binding {
            tag,
            forced: None,
            encode: Arc::new(encode),
            decode: Arc::new(decode),
        }
    }

    pub fn forced(mut self, tag: Tag) -> Self {
        self.forced = Some(tag);
        self
    }

    /// Binding of a newtype over `T`.
    pub fn map<U: 'static>(self, wrap: fn(T) -> U, unwrap: fn(&U) -> &T) -> Binding<U> {
        let encode = self.encode;
        let decode = self.decode;
        Binding {
            tag: self.tag,
            forced: self.forced,
            encode: Arc::new(move |v: &U| encode(unwrap(v))),
            decode: Arc::new(move |dec: &mut Decoder, tag: Tag, v: &Value| {
                decode(dec, tag, v).map(wrap)
            }),
        }
    }

    /// Reject integer values outside `[min, max]` before decoding.
    pub fn with_bounds(self, min: i32, max: i32) -> Self {
        let inner = self.decode.clone();
        Binding {
            decode: Arc::new(move |dec: &mut Decoder, tag: Tag, v: &Value| {
                if let Value::Integer(n) = v {
                    if *n < min || *n > max {
                        return Err(dec.error(ValueError::OutOfRange(i64::from(*n))));
                    }
                }
                inner(dec, tag, v)
            }),
            ..self
        }
    }
}

/// Binding of a nested structure as a collection value.
pub fn collection<E: Fields>() -> Result<Binding<E>, BuildError> {
    let codec = codec::<E>()?;
    let enc = codec.clone();
    Ok(Binding::new(
        Tag::BEGIN_COLLECTION,
        move |v: &E| (Tag::ZERO, Value::Collection(enc.encode_attrs(v))),
        move |dec: &mut Decoder, tag: Tag, v: &Value| match v {
            Value::Collection(attrs) => {
                let mut out = E::default();
                codec.decode_attrs(dec, &mut out, attrs)?;
                Ok(out)
            }
            _ => Err(dec.err_convert(tag, v, ValueType::Collection)),
        },
    ))
}

/// Value kind with an elementary binding.
pub trait Leaf: Clone + Default + PartialEq + Send + Sync + 'static {
    fn binding() -> Result<Binding<Self>, BuildError>;
}

impl Leaf for bool {
    fn binding() -> Result<Binding<Self>, BuildError> {
        Ok(Binding::new(
            Tag::BOOLEAN,
            |v: &bool| (Tag::ZERO, Value::Boolean(*v)),
            |dec: &mut Decoder, tag: Tag, v: &Value| match v {
                Value::Boolean(b) => Ok(*b),
                _ => Err(dec.err_convert(tag, v, ValueType::Boolean)),
            },
        ))
    }
}

macro_rules! integer_leaf {
    ($($t:ty),* $(,)?) => {$(
        impl Leaf for $t {
            fn binding() -> Result<Binding<Self>, BuildError> {
                Ok(Binding::new(
                    Tag::INTEGER,
                    |v: &$t| (Tag::ZERO, Value::Integer(i32::from(*v))),
                    |dec: &mut Decoder, tag: Tag, v: &Value| match v {
                        Value::Integer(n) => <$t>::try_from(*n)
                            .map_err(|_| dec.error(ValueError::OutOfRange(i64::from(*n)))),
                        _ => Err(dec.err_convert(tag, v, ValueType::Integer)),
                    },
                ))
            }
        }
    )*};
}

integer_leaf!(i32, i16, u16, i8, u8);

impl Leaf for String {
    fn binding() -> Result<Binding<Self>, BuildError> {
        Ok(Binding::new(
            Tag::TEXT,
            |v: &String| (Tag::ZERO, Value::String(v.clone())),
            |dec: &mut Decoder, tag: Tag, v: &Value| match v {
                Value::String(s) => Ok(s.clone()),
                Value::Binary(b) => {
                    String::from_utf8(b.clone()).map_err(|_| dec.error(ValueError::InvalidUtf8))
                }
                _ => Err(dec.err_convert(tag, v, ValueType::String)),
            },
        ))
    }
}

impl Leaf for Range {
    fn binding() -> Result<Binding<Self>, BuildError> {
        Ok(Binding::new(
            Tag::RANGE,
            |v: &Range| (Tag::ZERO, Value::Range(*v)),
            |dec: &mut Decoder, tag: Tag, v: &Value| match v {
                Value::Range(r) => Ok(*r),
                _ => Err(dec.err_convert(tag, v, ValueType::Range)),
            },
        ))
    }
}

impl Leaf for Resolution {
    fn binding() -> Result<Binding<Self>, BuildError> {
        Ok(Binding::new(
            Tag::RESOLUTION,
            |v: &Resolution| (Tag::ZERO, Value::Resolution(*v)),
            |dec: &mut Decoder, tag: Tag, v: &Value| match v {
                Value::Resolution(r) => Ok(*r),
                _ => Err(dec.err_convert(tag, v, ValueType::Resolution)),
            },
        ))
    }
}

impl Leaf for TextWithLang {
    fn binding() -> Result<Binding<Self>, BuildError> {
        Ok(Binding::new(
            Tag::TEXT_LANG,
            |v: &TextWithLang| (Tag::ZERO, Value::TextWithLang(v.clone())),
            |dec: &mut Decoder, tag: Tag, v: &Value| match v {
                Value::TextWithLang(t) => Ok(t.clone()),
                _ => Err(dec.err_convert(tag, v, ValueType::TextWithLang)),
            },
        ))
    }
}

impl Leaf for Version {
    fn binding() -> Result<Binding<Self>, BuildError> {
        Ok(Binding::new(
            Tag::KEYWORD,
            |v: &Version| (Tag::ZERO, Value::String(v.to_string())),
            |dec: &mut Decoder, tag: Tag, v: &Value| match v {
                Value::String(s) => parse_version(s)
                    .ok_or_else(|| dec.error(ValueError::InvalidVersion(s.clone()))),
                _ => Err(dec.err_convert(tag, v, ValueType::String)),
            },
        ))
    }
}

/// Parse `major.minor`, each part a decimal u8.
fn parse_version(s: &str) -> Option<Version> {
    let (major, minor) = s.split_once('.')?;
    let digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    if !digits(major) || !digits(minor) {
        return None;
    }
    Some(Version::new(major.parse().ok()?, minor.parse().ok()?))
}

impl Leaf for DateTime {
    fn binding() -> Result<Binding<Self>, BuildError> {
        Ok(Binding::new(
            Tag::DATE_TIME,
            |v: &DateTime| (Tag::ZERO, Value::DateTime(*v)),
            |dec: &mut Decoder, tag: Tag, v: &Value| match v {
                Value::DateTime(t) => Ok(*t),
                _ => Err(dec.err_convert(tag, v, ValueType::DateTime)),
            },
        ))
    }
}

impl Leaf for IntegerOrRange {
    fn binding() -> Result<Binding<Self>, BuildError> {
        Ok(Binding::new(
            Tag::ZERO,
            |v: &IntegerOrRange| match v {
                IntegerOrRange::Integer(n) => (Tag::INTEGER, Value::Integer(*n)),
                IntegerOrRange::Range(r) => (Tag::RANGE, Value::Range(*r)),
            },
            |dec: &mut Decoder, tag: Tag, v: &Value| match v {
                Value::Integer(n) => Ok(IntegerOrRange::Integer(*n)),
                Value::Range(r) => Ok(IntegerOrRange::Range(*r)),
                _ => Err(dec.error(ValueError::ConvertIntegerOrRange {
                    from_tag: tag,
                    from: v.value_type(),
                })),
            },
        ))
    }
}

pub type AdapterEncodeFn<F> = Arc<dyn Fn(&F) -> Values + Send + Sync>;
pub type AdapterDecodeFn<F> =
    Arc<dyn Fn(&mut Decoder, &[(Tag, Value)]) -> Result<F, DecodeError> + Send + Sync>;

/// Whole-attribute encode/decode for one field shape.
pub struct Adapter<F> {
    pub encode: AdapterEncodeFn<F>,
    pub decode: AdapterDecodeFn<F>,
}

/// Shape of a bindable field over its leaf kind.
pub trait FieldType: Default + Send + Sync + 'static {
    type Leaf: Leaf;
    /// One wire value per element.
    const REPEATED: bool = false;

    fn adapt(leaf: Binding<Self::Leaf>, zero_tag: Tag) -> Adapter<Self>;

    fn is_zero(&self) -> bool;
}

/// Implements [`FieldType`] for leaf kinds used as plain fields.
#[doc(hidden)]
#[macro_export]
macro_rules! __leaf_field_type {
    ($($t:ty),* $(,)?) => {$(
        impl $crate::binding::FieldType for $t {
            type Leaf = $t;

            fn adapt(
                leaf: $crate::binding::Binding<$t>,
                _zero_tag: $crate::value::Tag,
            ) -> $crate::binding::Adapter<$t> {
                $crate::binding::scalar(leaf)
            }

            fn is_zero(&self) -> bool {
                *self == <$t as ::core::default::Default>::default()
            }
        }
    )*};
}

crate::__leaf_field_type!(
    bool,
    i32,
    i16,
    u16,
    i8,
    u8,
    String,
    Range,
    Resolution,
    TextWithLang,
    Version,
    DateTime,
    IntegerOrRange,
);

impl<T: Leaf> FieldType for Vec<T> {
    type Leaf = T;
    const REPEATED: bool = true;

    fn adapt(leaf: Binding<T>, _zero_tag: Tag) -> Adapter<Self> {
        slice(leaf)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Leaf> FieldType for Option<T> {
    type Leaf = T;

    fn adapt(leaf: Binding<T>, zero_tag: Tag) -> Adapter<Self> {
        optional(leaf, zero_tag)
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }
}

impl<T: Leaf> FieldType for Maybe<T> {
    type Leaf = T;

    fn adapt(leaf: Binding<T>, _zero_tag: Tag) -> Adapter<Self> {
        maybe(leaf)
    }

    fn is_zero(&self) -> bool {
        !self.is_set() && self.reason() == Tag::ZERO
    }
}

fn first_value<'a>(
    dec: &Decoder,
    vals: &'a [(Tag, Value)],
) -> Result<&'a (Tag, Value), DecodeError> {
    vals.first().ok_or_else(|| dec.error(ValueError::NoValues))
}

fn is_void(tag: Tag) -> bool {
    tag.value_type() == ValueType::Void
}

/// Exactly one value.
pub fn scalar<T: Leaf>(leaf: Binding<T>) -> Adapter<T> {
    let Binding { encode, decode, .. } = leaf;
    Adapter {
        encode: Arc::new(move |v: &T| vec![encode(v)]),
        decode: Arc::new(move |dec: &mut Decoder, vals: &[(Tag, Value)]| {
            let (tag, v) = first_value(dec, vals)?;
            decode(dec, *tag, v)
        }),
    }
}

/// One value per element, order preserved. A leading out-of-band value
/// decodes as an empty vector.
pub fn slice<T: Leaf>(leaf: Binding<T>) -> Adapter<Vec<T>> {
    let Binding { encode, decode, .. } = leaf;
    Adapter {
        encode: Arc::new(move |v: &Vec<T>| -> Values { v.iter().map(|x| encode(x)).collect() }),
        decode: Arc::new(move |dec: &mut Decoder, vals: &[(Tag, Value)]| {
            if vals.first().map_or(false, |(tag, _)| is_void(*tag)) {
                return Ok(Vec::new());
            }

            dec.path_enter();
            let mut out = Vec::with_capacity(vals.len());
            for (i, (tag, v)) in vals.iter().enumerate() {
                dec.path_set(PathElem::Index(i));
                match decode(dec, *tag, v) {
                    Ok(x) => out.push(x),
                    Err(err) if dec.keep_trying() => dec.push(err),
                    Err(err) => {
                        dec.path_leave();
                        return Err(err);
                    }
                }
            }
            dec.path_leave();
            Ok(out)
        }),
    }
}

/// `None` encodes as `zero_tag` when one is declared; an out-of-band value
/// decodes as `None`.
pub fn optional<T: Leaf>(leaf: Binding<T>, zero_tag: Tag) -> Adapter<Option<T>> {
    let Binding { encode, decode, .. } = leaf;
    Adapter {
        encode: Arc::new(move |v: &Option<T>| match v {
            Some(x) => vec![encode(x)],
            None if zero_tag != Tag::ZERO => vec![(zero_tag, Value::Void)],
            None => Vec::new(),
        }),
        decode: Arc::new(move |dec: &mut Decoder, vals: &[(Tag, Value)]| {
            let (tag, v) = first_value(dec, vals)?;
            if is_void(*tag) {
                return Ok(None);
            }
            decode(dec, *tag, v).map(Some)
        }),
    }
}

/// Like [`optional`], but the out-of-band tag is kept in the value.
pub fn maybe<T: Leaf>(leaf: Binding<T>) -> Adapter<Maybe<T>> {
    let Binding { encode, decode, .. } = leaf;
    Adapter {
        encode: Arc::new(move |v: &Maybe<T>| match v.get() {
            Some(x) => vec![encode(x)],
            None if v.reason() != Tag::ZERO => vec![(v.reason(), Value::Void)],
            None => Vec::new(),
        }),
        decode: Arc::new(move |dec: &mut Decoder, vals: &[(Tag, Value)]| {
            let (tag, v) = first_value(dec, vals)?;
            if is_void(*tag) {
                return Ok(Maybe::absent(*tag));
            }
            decode(dec, *tag, v).map(Maybe::some)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_strings() {
        assert_eq!(parse_version("2.0"), Some(Version::new(2, 0)));
        assert_eq!(parse_version("1.1"), Some(Version::new(1, 1)));
        assert_eq!(parse_version("2"), None);
        assert_eq!(parse_version("2.0.1"), None);
        assert_eq!(parse_version("256.0"), None);
        assert_eq!(parse_version("+1.0"), None);
    }
}
