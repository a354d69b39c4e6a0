//! Decoder context: options, path to the current value, collected diagnostics.

use crate::codec::{codec, CodecError};
use crate::object::Object;
use crate::value::{Attribute, Tag, Value, ValueType};
use log::warn;
use std::fmt::Write as _;

/// Options used when an object is decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Do not stop on value decoding errors: reset the problematic field
    /// (or skip the problematic slice element), record the error and
    /// continue.
    pub keep_trying: bool,
}

/// Why a single value could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("can't convert {from_tag} to {to}")]
    Convert {
        from_tag: Tag,
        from: ValueType,
        to: ValueType,
    },
    #[error("can't convert {from_tag} to Integer or RangeOfInteger")]
    ConvertIntegerOrRange { from_tag: Tag, from: ValueType },
    #[error("value {0} out of range")]
    OutOfRange(i64),
    #[error("octetString value is not valid UTF-8")]
    InvalidUtf8,
    #[error("{0:?}: invalid version string")]
    InvalidVersion(String),
    #[error("at least 1 value required")]
    NoValues,
    #[error("1 value expected, {0} present")]
    TooManyValues(usize),
    #[error("missing required attribute")]
    MissingRequired,
}

/// Decode error annotated with the decoded type and the path to the value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("IPP decode {typename}: {path:?}: {kind}")]
pub struct DecodeError {
    pub typename: String,
    pub path: String,
    pub kind: ValueError,
}

impl DecodeError {
    /// True if the observed value was an out-of-band (void) placeholder
    /// rather than a genuine type mismatch.
    pub fn is_oob(&self) -> bool {
        matches!(
            self.kind,
            ValueError::Convert {
                from: ValueType::Void,
                ..
            } | ValueError::ConvertIntegerOrRange {
                from: ValueType::Void,
                ..
            }
        )
    }
}

/// One level of the decode path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathElem {
    Name(String),
    Index(usize),
}

/// Decodes objects from attribute lists.
#[derive(Debug, Default)]
pub struct Decoder {
    opt: DecodeOptions,
    typename: String,
    path: Vec<PathElem>,
    errors: Vec<DecodeError>,
}

impl Decoder {
    pub fn new(opt: DecodeOptions) -> Self {
        Decoder {
            opt,
            typename: String::new(),
            path: Vec::with_capacity(8),
            errors: Vec::new(),
        }
    }

    pub fn options(&self) -> DecodeOptions {
        self.opt
    }

    pub fn keep_trying(&self) -> bool {
        self.opt.keep_trying
    }

    fn begin(&mut self, typename: &str) {
        self.typename.clear();
        self.typename.push_str(typename);
        self.path.clear();
        self.errors.clear();
    }

    /// Decode `obj` from `attrs`. On success the de-duplicated attributes
    /// and the non-fatal diagnostics are saved into the object's raw store.
    pub fn decode<O: Object>(&mut self, obj: &mut O, attrs: &[Attribute]) -> Result<(), CodecError> {
        let codec = codec::<O>()?;
        self.begin(codec.typename());
        codec.decode_attrs(self, obj, attrs)?;
        obj.raw_attrs_mut().save(attrs, self.errors.clone());
        Ok(())
    }

    /// Decode (update) a single attribute of `obj`. Attributes the object
    /// doesn't know are accepted and ignored.
    pub fn decode_single<O: Object>(&mut self, obj: &mut O, attr: &Attribute) -> Result<(), CodecError> {
        let codec = codec::<O>()?;
        self.begin(codec.typename());
        codec.decode_one(self, obj, attr)?;
        Ok(())
    }

    /// Non-fatal errors of the last decode.
    pub fn errors(&self) -> &[DecodeError] {
        &self.errors
    }

    pub(crate) fn path_enter(&mut self) {
        self.path.push(PathElem::Index(0));
    }

    pub(crate) fn path_leave(&mut self) {
        self.path.pop();
    }

    pub(crate) fn path_set(&mut self, elem: PathElem) {
        if let Some(last) = self.path.last_mut() {
            *last = elem;
        }
    }

    /// Current path, e.g. `media-col-database[2]/media-size/x-dimension`.
    pub fn path_string(&self) -> String {
        let mut out = String::new();
        for elem in &self.path {
            match elem {
                PathElem::Name(name) => {
                    if !out.is_empty() {
                        out.push('/');
                    }
                    out.push_str(name);
                }
                PathElem::Index(i) => {
                    let _ = write!(out, "[{i}]");
                }
            }
        }
        out
    }

    /// Wrap `kind` with the type name and current path.
    pub fn error(&self, kind: ValueError) -> DecodeError {
        DecodeError {
            typename: self.typename.clone(),
            path: self.path_string(),
            kind,
        }
    }

    /// Type conversion error for an observed value.
    pub fn err_convert(&self, tag: Tag, value: &Value, to: ValueType) -> DecodeError {
        self.error(ValueError::Convert {
            from_tag: tag,
            from: value.value_type(),
            to,
        })
    }

    /// Record a non-fatal error.
    pub(crate) fn push(&mut self, err: DecodeError) {
        warn!("{err}");
        self.errors.push(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_formatting() {
        let mut dec = Decoder::new(DecodeOptions::default());
        dec.path_enter();
        dec.path_set(PathElem::Name("media-col-database".into()));
        dec.path_enter();
        dec.path_set(PathElem::Index(2));
        dec.path_enter();
        dec.path_set(PathElem::Name("media-size".into()));
        dec.path_enter();
        dec.path_set(PathElem::Name("x-dimension".into()));
        assert_eq!(dec.path_string(), "media-col-database[2]/media-size/x-dimension");

        dec.path_leave();
        dec.path_leave();
        assert_eq!(dec.path_string(), "media-col-database[2]");
    }

    #[test]
    fn void_conversion_is_oob() {
        let dec = Decoder::new(DecodeOptions::default());
        let err = dec.err_convert(Tag::NO_VALUE, &Value::Void, ValueType::Integer);
        assert!(err.is_oob());
        let err = dec.err_convert(Tag::BOOLEAN, &Value::Boolean(true), ValueType::Integer);
        assert!(!err.is_oob());
        assert_eq!(err.kind.to_string(), "can't convert boolean to Integer");
    }
}
