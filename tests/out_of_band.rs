//! # Out-of-band values: encode/decode behaviour
//!
//! IPP marks a value that is absent for a reason with a tag that carries no
//! payload (`unknown`, `no-value`, `not-settable`, ...). On our side these
//! are [`Value::Void`].
//!
//! ## Rules
//!
//! - **Binding tag suffix** `|unknown` / `|no-value`: a field holding its zero
//!   value is encoded as one value with that tag, instead of its zero value.
//! - **Decoding a void value** into a plain field resets the field to its zero
//!   value. This is never an error, with or without `keep_trying`.
//! - **`Option<T>`**: a void value decodes as `None`; `None` encodes as the
//!   declared suffix tag, or is omitted when there is none.
//! - **`Maybe<T>`**: like `Option<T>`, but the out-of-band tag is kept, so
//!   `not-settable` stays `not-settable` after a decode/encode cycle.
//! - **`Vec<T>`**: a leading void value decodes as an empty vector.
//!
//! ## Test index
//!
//! | Test | Behaviour |
//! |------|-----------|
//! | `zero_value_encodes_as_suffix_tag` | zero fields with `|no-value` / `|unknown` → one void value |
//! | `oob_round_trip_restores_zero_values` | encode zero struct → decode → zero struct, no diagnostics |
//! | `void_value_resets_field` | non-zero field + void value → zero |
//! | `void_value_for_kinds_without_suffix` | no suffix declared: still reset, still no error |
//! | `option_*` | `None` ↔ void / omitted, `Some` ↔ value |
//! | `maybe_*` | reason tag survives a round trip |
//! | `slice_*` | leading void → empty vector |

use ippcodec::{
    decode, encode, ipp_collection, ipp_fields, ipp_object, Attribute, DecodeOptions, Decoder,
    IntegerOrRange, Maybe, RawAttrs, Tag, Value,
};

fn void(name: &str, tag: Tag) -> Attribute {
    Attribute::new(name, tag, Value::Void)
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Size {
    x: i32,
    y: i32,
}
ipp_fields!(Size {
    x: "x-dimension",
    y: "y-dimension",
});
ipp_collection!(Size);

#[derive(Debug, Default)]
struct Oob {
    raw: RawAttrs,
    media: String,
    copies: i32,
    finishings: Vec<i32>,
}
ipp_fields!(Oob {
    media: "media,keyword|no-value",
    copies: "copies,integer|unknown",
    finishings: "finishings,enum|no-value",
});
ipp_object!(Oob, raw);

#[test]
fn zero_value_encodes_as_suffix_tag() {
    let attrs = encode(&Oob::default()).expect("encode");
    assert_eq!(
        attrs,
        vec![
            void("media", Tag::NO_VALUE),
            void("copies", Tag::UNKNOWN),
            void("finishings", Tag::NO_VALUE),
        ]
    );

    let attrs = encode(&Oob {
        media: "iso_a4_210x297mm".into(),
        copies: 2,
        finishings: vec![3],
        ..Default::default()
    })
    .expect("encode");
    assert_eq!(attrs[0], Attribute::new("media", Tag::KEYWORD, "iso_a4_210x297mm"));
    assert_eq!(attrs[1], Attribute::new("copies", Tag::INTEGER, 2));
    assert_eq!(attrs[2], Attribute::new("finishings", Tag::ENUM, 3));
}

#[test]
fn oob_round_trip_restores_zero_values() {
    let attrs = encode(&Oob::default()).expect("encode");

    let mut out = Oob {
        media: "na_letter_8.5x11in".into(),
        copies: 5,
        finishings: vec![4, 5],
        ..Default::default()
    };
    decode(&mut out, &attrs).expect("decode");
    assert_eq!(out.media, "");
    assert_eq!(out.copies, 0);
    assert!(out.finishings.is_empty());
    assert!(out.raw.errors().is_empty());
}

#[test]
fn void_value_resets_field() {
    let mut out = Oob {
        copies: 9,
        ..Default::default()
    };
    decode(&mut out, &[void("copies", Tag::NO_VALUE)]).expect("decode");
    assert_eq!(out.copies, 0);
}

#[derive(Debug, Default)]
struct Plain {
    raw: RawAttrs,
    flag: bool,
    int_or_range: IntegerOrRange,
    size: Size,
}
ipp_fields!(Plain {
    flag: "flag",
    int_or_range: "int-or-range",
    size: "size",
});
ipp_object!(Plain, raw);

#[test]
fn void_value_for_kinds_without_suffix() {
    let attrs = [
        void("flag", Tag::UNKNOWN),
        void("int-or-range", Tag::NOT_SETTABLE),
        void("size", Tag::NO_VALUE),
    ];
    let start = || Plain {
        flag: true,
        int_or_range: IntegerOrRange::Integer(5),
        size: Size { x: 1, y: 2 },
        ..Default::default()
    };

    let mut out = start();
    decode(&mut out, &attrs).expect("decode");
    assert!(!out.flag);
    assert_eq!(out.int_or_range, IntegerOrRange::Integer(0));
    assert_eq!(out.size, Size::default());
    assert!(out.raw.errors().is_empty());

    let mut dec = Decoder::new(DecodeOptions { keep_trying: true });
    let mut out = start();
    dec.decode(&mut out, &attrs).expect("decode");
    assert!(!out.flag);
    assert!(dec.errors().is_empty());
}

// -----------------------------------------------------------------------------
// Option<T>
// -----------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Optional {
    raw: RawAttrs,
    priority: Option<i32>,
    size: Option<Size>,
    hold: Option<String>,
}
ipp_fields!(Optional {
    priority: "job-priority,integer|no-value",
    size: "media-size",
    hold: "?job-hold-until,keyword",
});
ipp_object!(Optional, raw);

#[test]
fn option_none_encodes_as_suffix_or_is_omitted() {
    let attrs = encode(&Optional::default()).expect("encode");
    assert_eq!(attrs, vec![void("job-priority", Tag::NO_VALUE)]);
}

#[test]
fn option_some_encodes_value() {
    let obj = Optional {
        priority: Some(50),
        size: Some(Size { x: 10, y: 20 }),
        hold: Some("indefinite".into()),
        ..Default::default()
    };
    let attrs = encode(&obj).expect("encode");
    assert_eq!(attrs.len(), 3);
    assert_eq!(attrs[0], Attribute::new("job-priority", Tag::INTEGER, 50));
    assert_eq!(attrs[1].values[0].0, Tag::BEGIN_COLLECTION);
    assert_eq!(attrs[2], Attribute::new("job-hold-until", Tag::KEYWORD, "indefinite"));

    let mut out = Optional::default();
    decode(&mut out, &attrs).expect("decode");
    assert_eq!(out.priority, Some(50));
    assert_eq!(out.size, obj.size);
    assert_eq!(out.hold, obj.hold);
}

#[test]
fn option_void_decodes_as_none() {
    let mut out = Optional {
        priority: Some(1),
        hold: Some("no-hold".into()),
        ..Default::default()
    };
    decode(
        &mut out,
        &[void("job-priority", Tag::NO_VALUE), void("job-hold-until", Tag::UNKNOWN)],
    )
    .expect("decode");
    assert_eq!(out.priority, None);
    assert_eq!(out.hold, None);
}

// -----------------------------------------------------------------------------
// Maybe<T>
// -----------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Settable {
    raw: RawAttrs,
    name: Maybe<String>,
    copies: Maybe<i32>,
}
ipp_fields!(Settable {
    name: "job-name,name",
    copies: "copies",
});
ipp_object!(Settable, raw);

#[test]
fn maybe_keeps_reason_through_round_trip() {
    let obj = Settable {
        name: Maybe::absent(Tag::NOT_SETTABLE),
        copies: Maybe::some(3),
        ..Default::default()
    };
    let attrs = encode(&obj).expect("encode");
    assert_eq!(
        attrs,
        vec![
            void("job-name", Tag::NOT_SETTABLE),
            Attribute::new("copies", Tag::INTEGER, 3),
        ]
    );

    let mut out = Settable::default();
    decode(&mut out, &attrs).expect("decode");
    assert!(!out.name.is_set());
    assert_eq!(out.name.reason(), Tag::NOT_SETTABLE);
    assert_eq!(out.copies.get(), Some(&3));
    assert_eq!(encode(&out).expect("re-encode"), attrs);
}

#[test]
fn maybe_unset_without_reason_is_omitted() {
    let attrs = encode(&Settable::default()).expect("encode");
    assert!(attrs.is_empty());
}

#[test]
fn maybe_accessors() {
    let mut m: Maybe<i32> = Maybe::default();
    assert_eq!(m.get(), None);
    assert_eq!(m.reason(), Tag::ZERO);

    m.set(7);
    assert!(m.is_set());
    assert_eq!(m.reason(), Tag::ZERO);

    m.del(Tag::UNKNOWN);
    assert!(!m.is_set());
    assert_eq!(m.reason(), Tag::UNKNOWN);
    assert_eq!(m.clone().into_option(), None);

    assert_eq!(Maybe::from(Some(4)).into_option(), Some(4));
    assert_eq!(Maybe::<i32>::from(None), Maybe::default());
}

// -----------------------------------------------------------------------------
// Vec<T>
// -----------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Lists {
    raw: RawAttrs,
    sizes: Vec<Size>,
    types: Vec<String>,
}
ipp_fields!(Lists {
    sizes: "media-size-supported",
    types: "media-type-supported,keyword",
});
ipp_object!(Lists, raw);

#[test]
fn slice_leading_void_is_empty() {
    let mut out = Lists {
        types: vec!["stationery".into()],
        ..Default::default()
    };
    decode(
        &mut out,
        &[
            void("media-size-supported", Tag::UNKNOWN),
            void("media-type-supported", Tag::NO_VALUE),
        ],
    )
    .expect("decode");
    assert!(out.sizes.is_empty());
    assert!(out.types.is_empty());
}

#[test]
fn slice_of_collections_round_trip() {
    let obj = Lists {
        sizes: vec![Size { x: 21000, y: 29700 }, Size { x: 10000, y: 15000 }],
        types: vec!["stationery".into(), "photographic".into()],
        ..Default::default()
    };
    let attrs = encode(&obj).expect("encode");
    assert_eq!(attrs[0].values.len(), 2);
    assert_eq!(
        attrs[1].values,
        vec![
            (Tag::KEYWORD, Value::from("stationery")),
            (Tag::KEYWORD, Value::from("photographic")),
        ]
    );

    let mut out = Lists::default();
    decode(&mut out, &attrs).expect("decode");
    assert_eq!(out.sizes, obj.sizes);
    assert_eq!(out.types, obj.types);
}
