//! Wire values for encoding/decoding (attribute representation).
//!
//! An attribute is a name plus a non-empty, ordered list of `(Tag, Value)`
//! pairs. Collection values carry a nested attribute list.

use chrono::FixedOffset;
use std::fmt;

/// Timestamp carried by `dateTime` values.
pub type DateTime = chrono::DateTime<FixedOffset>;

/// Ordered list of tagged values of one attribute.
pub type Values = Vec<(Tag, Value)>;

/// Ordered list of attributes (group contents or collection members).
pub type Attributes = Vec<Attribute>;

/// Wire tag (RFC 8010, section 3.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Tag(pub u8);

impl Tag {
    /// Not a wire tag: "use the default".
    pub const ZERO: Tag = Tag(0x00);

    pub const OPERATION_GROUP: Tag = Tag(0x01);
    pub const JOB_GROUP: Tag = Tag(0x02);
    pub const END: Tag = Tag(0x03);
    pub const PRINTER_GROUP: Tag = Tag(0x04);
    pub const UNSUPPORTED_GROUP: Tag = Tag(0x05);

    pub const UNSUPPORTED_VALUE: Tag = Tag(0x10);
    pub const DEFAULT: Tag = Tag(0x11);
    pub const UNKNOWN: Tag = Tag(0x12);
    pub const NO_VALUE: Tag = Tag(0x13);
    pub const NOT_SETTABLE: Tag = Tag(0x15);
    pub const DELETE_ATTR: Tag = Tag(0x16);
    pub const ADMIN_DEFINE: Tag = Tag(0x17);

    pub const INTEGER: Tag = Tag(0x21);
    pub const BOOLEAN: Tag = Tag(0x22);
    pub const ENUM: Tag = Tag(0x23);

    pub const STRING: Tag = Tag(0x30);
    pub const DATE_TIME: Tag = Tag(0x31);
    pub const RESOLUTION: Tag = Tag(0x32);
    pub const RANGE: Tag = Tag(0x33);
    pub const BEGIN_COLLECTION: Tag = Tag(0x34);
    pub const TEXT_LANG: Tag = Tag(0x35);
    pub const NAME_LANG: Tag = Tag(0x36);
    pub const END_COLLECTION: Tag = Tag(0x37);

    pub const TEXT: Tag = Tag(0x41);
    pub const NAME: Tag = Tag(0x42);
    pub const RESERVED_STRING: Tag = Tag(0x43);
    pub const KEYWORD: Tag = Tag(0x44);
    pub const URI: Tag = Tag(0x45);
    pub const URI_SCHEME: Tag = Tag(0x46);
    pub const CHARSET: Tag = Tag(0x47);
    pub const LANGUAGE: Tag = Tag(0x48);
    pub const MIME_TYPE: Tag = Tag(0x49);
    pub const MEMBER_NAME: Tag = Tag(0x4a);

    pub const EXTENSION: Tag = Tag(0x7f);

    /// Group delimiter tags (0x00..=0x0f) never carry values.
    pub fn is_delimiter(self) -> bool {
        self.0 < 0x10
    }

    /// Value type a tag carries on the wire.
    pub fn value_type(self) -> ValueType {
        match self {
            Tag::INTEGER | Tag::ENUM => ValueType::Integer,
            Tag::BOOLEAN => ValueType::Boolean,
            Tag::UNSUPPORTED_VALUE
            | Tag::DEFAULT
            | Tag::UNKNOWN
            | Tag::NO_VALUE
            | Tag::NOT_SETTABLE
            | Tag::DELETE_ATTR
            | Tag::ADMIN_DEFINE
            | Tag::END_COLLECTION => ValueType::Void,
            Tag::TEXT
            | Tag::NAME
            | Tag::RESERVED_STRING
            | Tag::KEYWORD
            | Tag::URI
            | Tag::URI_SCHEME
            | Tag::CHARSET
            | Tag::LANGUAGE
            | Tag::MIME_TYPE
            | Tag::MEMBER_NAME => ValueType::String,
            Tag::DATE_TIME => ValueType::DateTime,
            Tag::RESOLUTION => ValueType::Resolution,
            Tag::RANGE => ValueType::Range,
            Tag::TEXT_LANG | Tag::NAME_LANG => ValueType::TextWithLang,
            Tag::BEGIN_COLLECTION => ValueType::Collection,
            t if t.is_delimiter() => ValueType::Invalid,
            _ => ValueType::Binary,
        }
    }

    fn name(self) -> Option<&'static str> {
        Some(match self {
            Tag::ZERO => "zero",
            Tag::OPERATION_GROUP => "operation-attributes-tag",
            Tag::JOB_GROUP => "job-attributes-tag",
            Tag::END => "end-of-attributes-tag",
            Tag::PRINTER_GROUP => "printer-attributes-tag",
            Tag::UNSUPPORTED_GROUP => "unsupported-attributes-tag",
            Tag::UNSUPPORTED_VALUE => "unsupported",
            Tag::DEFAULT => "default",
            Tag::UNKNOWN => "unknown",
            Tag::NO_VALUE => "no-value",
            Tag::NOT_SETTABLE => "not-settable",
            Tag::DELETE_ATTR => "delete-attribute",
            Tag::ADMIN_DEFINE => "admin-define",
            Tag::INTEGER => "integer",
            Tag::BOOLEAN => "boolean",
            Tag::ENUM => "enum",
            Tag::STRING => "octetString",
            Tag::DATE_TIME => "dateTime",
            Tag::RESOLUTION => "resolution",
            Tag::RANGE => "rangeOfInteger",
            Tag::BEGIN_COLLECTION => "collection",
            Tag::TEXT_LANG => "textWithLanguage",
            Tag::NAME_LANG => "nameWithLanguage",
            Tag::END_COLLECTION => "endCollection",
            Tag::TEXT => "textWithoutLanguage",
            Tag::NAME => "nameWithoutLanguage",
            Tag::RESERVED_STRING => "reservedString",
            Tag::KEYWORD => "keyword",
            Tag::URI => "uri",
            Tag::URI_SCHEME => "uriScheme",
            Tag::CHARSET => "charset",
            Tag::LANGUAGE => "naturalLanguage",
            Tag::MIME_TYPE => "mimeMediaType",
            Tag::MEMBER_NAME => "memberAttrName",
            Tag::EXTENSION => "extension",
            _ => return None,
        })
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:02x}", self.0),
        }
    }
}

/// Value type class; tags of the same class share a payload representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Invalid,
    Void,
    Integer,
    Boolean,
    String,
    DateTime,
    Resolution,
    Range,
    TextWithLang,
    Binary,
    Collection,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueType::Invalid => "Invalid",
            ValueType::Void => "Void",
            ValueType::Integer => "Integer",
            ValueType::Boolean => "Boolean",
            ValueType::String => "String",
            ValueType::DateTime => "DateTime",
            ValueType::Resolution => "Resolution",
            ValueType::Range => "Range",
            ValueType::TextWithLang => "TextWithLang",
            ValueType::Binary => "Binary",
            ValueType::Collection => "Collection",
        };
        f.write_str(s)
    }
}

/// Resolution units (RFC 8010: 3 = dots per inch, 4 = dots per cm).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Units(pub u8);

impl Units {
    pub const DPI: Units = Units(3);
    pub const DPCM: Units = Units(4);
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Units::DPI => f.write_str("dpi"),
            Units::DPCM => f.write_str("dpcm"),
            Units(u) => write!(f, "unknown-units({u})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Resolution {
    pub xres: i32,
    pub yres: i32,
    pub units: Units,
}

/// `rangeOfInteger`: inclusive lower..upper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub lower: i32,
    pub upper: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TextWithLang {
    pub lang: String,
    pub text: String,
}

/// Protocol version, `major.minor`, packed as `major << 8 | minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Version(pub u16);

impl Version {
    pub fn new(major: u8, minor: u8) -> Self {
        Version(u16::from(major) << 8 | u16::from(minor))
    }

    pub fn major(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn minor(self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major(), self.minor())
    }
}

/// Either a single integer or a range; the tag travels with each value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerOrRange {
    Integer(i32),
    Range(Range),
}

impl Default for IntegerOrRange {
    fn default() -> Self {
        IntegerOrRange::Integer(0)
    }
}

/// A single wire value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No payload (out-of-band values, end-collection).
    Void,
    Integer(i32),
    Boolean(bool),
    String(String),
    DateTime(DateTime),
    Resolution(Resolution),
    Range(Range),
    TextWithLang(TextWithLang),
    Binary(Vec<u8>),
    Collection(Attributes),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Void => ValueType::Void,
            Value::Integer(_) => ValueType::Integer,
            Value::Boolean(_) => ValueType::Boolean,
            Value::String(_) => ValueType::String,
            Value::DateTime(_) => ValueType::DateTime,
            Value::Resolution(_) => ValueType::Resolution,
            Value::Range(_) => ValueType::Range,
            Value::TextWithLang(_) => ValueType::TextWithLang,
            Value::Binary(_) => ValueType::Binary,
            Value::Collection(_) => ValueType::Collection,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Integer(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Range> for Value {
    fn from(v: Range) -> Self {
        Value::Range(v)
    }
}

impl From<Resolution> for Value {
    fn from(v: Resolution) -> Self {
        Value::Resolution(v)
    }
}

impl From<TextWithLang> for Value {
    fn from(v: TextWithLang) -> Self {
        Value::TextWithLang(v)
    }
}

impl From<DateTime> for Value {
    fn from(v: DateTime) -> Self {
        Value::DateTime(v)
    }
}

/// Named attribute with its values.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub values: Values,
}

impl Attribute {
    pub fn new(name: impl Into<String>, tag: Tag, value: impl Into<Value>) -> Self {
        Attribute {
            name: name.into(),
            values: vec![(tag, value.into())],
        }
    }

    pub fn with_values(name: impl Into<String>, values: Values) -> Self {
        Attribute {
            name: name.into(),
            values,
        }
    }

    /// Append one more value.
    pub fn push(&mut self, tag: Tag, value: impl Into<Value>) {
        self.values.push((tag, value.into()));
    }
}
