//! # ippcodec: type-driven IPP attribute codec
//!
//! Converts between Rust structures and the tagged-attribute representation
//! of the Internet Printing Protocol (RFC 8010/8011): an attribute is a name
//! plus an ordered list of `(tag, value)` pairs, and collections nest.
//!
//! A structure declares which of its fields take part, and how, with a
//! binding tag per field. The plan built from those tags (the codec) is
//! validated once, on first use, and cached for the process lifetime.
//!
//! ## Binding tags
//!
//! - `name` / `?name` / `!name`: recommended / optional / required attribute
//! - `,keyword`: wire type (`boolean`, `integer`, `enum`, `keyword`, `name`,
//!   `text`, `uri`, `urischeme`, `charset`, `naturallanguage`,
//!   `mimemediatype`, `resolution`, `rangeofinteger`, `textwithlanguage`,
//!   `namewithlanguage`, `datetime`, `collection`, `string`), optionally
//!   followed by `|unknown` or `|no-value` to encode the zero value out of band
//! - `,>N` / `,<N`: exclusive limits; `,N:M` inclusive range (`M` may be
//!   `MAX`)
//!
//! ## Field shapes
//!
//! `T`, `Vec<T>` (one value per element), `Option<T>` and [`Maybe<T>`]
//! (out-of-band aware), where `T` is an elementary kind (`bool`, `i32`,
//! `u16`, `String`, [`Range`], [`Resolution`], [`TextWithLang`], [`Version`],
//! [`DateTime`], [`IntegerOrRange`], ...) or a nested collection declared
//! with [`ipp_collection!`].
//!
//! ## Example
//!
//! ```
//! use ippcodec::{decode, encode, ipp_collection, ipp_fields, ipp_object, RawAttrs};
//!
//! #[derive(Debug, Clone, Default, PartialEq)]
//! struct MediaSize {
//!     x: i32,
//!     y: i32,
//! }
//! ipp_fields!(MediaSize { x: "x-dimension", y: "y-dimension" });
//! ipp_collection!(MediaSize);
//!
//! #[derive(Debug, Default)]
//! struct Job {
//!     raw: RawAttrs,
//!     name: String,
//!     copies: u16,
//!     size: Option<MediaSize>,
//! }
//! ipp_fields!(Job {
//!     name: "job-name,name",
//!     copies: "?copies,1:999",
//!     size: "?media-size",
//! });
//! ipp_object!(Job, raw);
//!
//! let job = Job {
//!     name: "report".into(),
//!     copies: 2,
//!     size: Some(MediaSize { x: 21000, y: 29700 }),
//!     ..Default::default()
//! };
//! let attrs = encode(&job).unwrap();
//! assert_eq!(attrs.len(), 3);
//!
//! let mut out = Job::default();
//! decode(&mut out, &attrs).unwrap();
//! assert_eq!(out.copies, 2);
//! assert_eq!(out.size, job.size);
//! ```

pub mod ast;
pub mod binding;
pub mod codec;
pub mod decoder;
pub mod dump;
pub mod maybe;
pub mod object;
pub mod parser;
pub mod value;
pub mod wire;

pub use ast::{AttrDescriptor, Conformance};
pub use binding::{Binding, FieldType, Leaf};
pub use codec::{codec, decode, encode, known_attrs, AttrInfo, BuildError, Codec, CodecBuilder, CodecError};
pub use decoder::{DecodeError, DecodeOptions, Decoder, ValueError};
pub use maybe::Maybe;
pub use object::{Fields, Object, RawAttrs};
pub use parser::{parse_tag, TagError};
pub use value::{
    Attribute, Attributes, DateTime, IntegerOrRange, Range, Resolution, Tag, TextWithLang, Units,
    Value, ValueType, Values, Version,
};
pub use wire::{decode_attributes, encode_attributes, WireError, MAX_COLLECTION_DEPTH};
