//! Binding tag unit tests: syntax (parse success/failure) and the resulting descriptors.

use ippcodec::{parse_tag, Conformance, Tag, TagError};

// ==================== Attribute name and conformance ====================

#[test]
fn parse_plain_name_is_recommended() {
    let d = parse_tag("printer-name").expect("parse");
    assert_eq!(d.name, "printer-name");
    assert_eq!(d.conformance, Conformance::Recommended);
    assert_eq!(d.tag, Tag::ZERO);
    assert_eq!(d.zero_tag, Tag::ZERO);
    assert_eq!((d.min, d.max), (i32::MIN, i32::MAX));
}

#[test]
fn parse_optional_and_required_prefixes() {
    let d = parse_tag("?job-priority").expect("parse");
    assert_eq!(d.name, "job-priority");
    assert_eq!(d.conformance, Conformance::Optional);

    let d = parse_tag("!attributes-charset").expect("parse");
    assert_eq!(d.name, "attributes-charset");
    assert_eq!(d.conformance, Conformance::Required);
}

#[test]
fn parse_rejects_missing_name() {
    assert_eq!(parse_tag(""), Err(TagError::MissingName));
    assert_eq!(parse_tag("?"), Err(TagError::MissingName));
    assert_eq!(parse_tag("!"), Err(TagError::MissingName));
    assert_eq!(parse_tag(",integer"), Err(TagError::MissingName));
}

#[test]
fn parse_trims_parts_and_skips_empty_ones() {
    let d = parse_tag(" job-name , name ,, ").expect("parse");
    assert_eq!(d.name, "job-name");
    assert_eq!(d.tag, Tag::NAME);
}

// ==================== Keywords ====================

#[test]
fn parse_every_keyword() {
    let cases = [
        ("boolean", Tag::BOOLEAN),
        ("charset", Tag::CHARSET),
        ("collection", Tag::BEGIN_COLLECTION),
        ("datetime", Tag::DATE_TIME),
        ("enum", Tag::ENUM),
        ("integer", Tag::INTEGER),
        ("keyword", Tag::KEYWORD),
        ("mimemediatype", Tag::MIME_TYPE),
        ("name", Tag::NAME),
        ("namewithlanguage", Tag::NAME_LANG),
        ("naturalLanguage", Tag::LANGUAGE),
        ("rangeOfInteger", Tag::RANGE),
        ("resolution", Tag::RESOLUTION),
        ("string", Tag::STRING),
        ("text", Tag::TEXT),
        ("textwithlanguage", Tag::TEXT_LANG),
        ("uri", Tag::URI),
        ("urischeme", Tag::URI_SCHEME),
    ];
    for (kw, tag) in cases {
        let d = parse_tag(&format!("attr,{kw}")).expect(kw);
        assert_eq!(d.tag, tag, "{kw}");
        assert_eq!(d.zero_tag, Tag::ZERO, "{kw}");
    }
}

#[test]
fn parse_oob_suffixes() {
    let d = parse_tag("fld,keyword|no-value").expect("parse");
    assert_eq!(d.tag, Tag::KEYWORD);
    assert_eq!(d.zero_tag, Tag::NO_VALUE);

    let d = parse_tag("fld,integer|unknown").expect("parse");
    assert_eq!(d.tag, Tag::INTEGER);
    assert_eq!(d.zero_tag, Tag::UNKNOWN);
}

#[test]
fn parse_rejects_unknown_keyword() {
    let err = parse_tag("fld,int").unwrap_err();
    assert_eq!(err, TagError::UnknownParam("int".into()));
    assert_eq!(err.to_string(), "unknown keyword: \"int\"");

    assert!(matches!(parse_tag("fld,keyword|none"), Err(TagError::UnknownParam(_))));
    assert!(matches!(parse_tag("fld,names"), Err(TagError::UnknownParam(_))));
}

// ==================== Limits ====================

#[test]
fn parse_limits_are_exclusive() {
    let d = parse_tag("copies,>0,<1000").expect("parse");
    assert_eq!(d.min, 1);
    assert_eq!(d.max, 999);
}

#[test]
fn parse_limit_errors() {
    assert_eq!(
        parse_tag("a,>x"),
        Err(TagError::InvalidLimit(">x".into()))
    );
    assert_eq!(
        parse_tag("a,<-2147483648"),
        Err(TagError::LimitOutOfRange("<-2147483648".into()))
    );
    assert_eq!(
        parse_tag("a,>99999999999").unwrap_err().to_string(),
        "\">99999999999\": limit out of range"
    );
}

// ==================== Ranges ====================

#[test]
fn parse_range_forms() {
    let d = parse_tag("?job-priority,1:100").expect("parse");
    assert_eq!((d.min, d.max), (1, 100));

    let d = parse_tag("a,0:MAX").expect("parse");
    assert_eq!((d.min, d.max), (0, i32::MAX));

    let d = parse_tag("a,-2147483648:-1").expect("parse");
    assert_eq!((d.min, d.max), (i32::MIN, -1));
}

#[test]
fn parse_range_accepts_only_plain_form() {
    assert!(matches!(parse_tag("a,(1:100)"), Err(TagError::InvalidRange(_))));
    assert!(matches!(parse_tag("a,(100)"), Err(TagError::UnknownParam(_))));
    assert!(matches!(parse_tag("a,1:2:3"), Err(TagError::UnknownParam(_))));
    assert!(matches!(parse_tag("a,MIN:5"), Err(TagError::InvalidRange(_))));
    assert!(matches!(parse_tag("a,MAX:5"), Err(TagError::InvalidRange(_))));
}

#[test]
fn parse_range_errors() {
    assert_eq!(
        parse_tag("a,5:1"),
        Err(TagError::EmptyRange { min: 5, max: 1 })
    );
    assert_eq!(parse_tag("a,5:1").unwrap_err().to_string(), "range (5:1): min>max");
    assert!(matches!(parse_tag("a,1:x"), Err(TagError::InvalidRange(_))));
    assert!(matches!(
        parse_tag("a,0:2147483648"),
        Err(TagError::InvalidRange(_))
    ));
}

#[test]
fn parse_parameters_are_order_independent() {
    let a = parse_tag("?media,keyword|no-value,1:5").expect("parse");
    let b = parse_tag("?media,1:5,keyword|no-value").expect("parse");
    assert_eq!(a, b);
}
