//! Binary attribute encoding (RFC 8010, section 3.1.4 onwards).
//!
//! Each value is written as `tag(1) name-length(2) name value-length(2) value`.
//! Additional values of an attribute have an empty name. Collections are
//! `begCollection`, then a `memberAttrName` value followed by the member's
//! values for every member, then `endCollection`.
//!
//! String-class values are decoded lossily: invalid UTF-8 sequences become
//! U+FFFD. octetString values are kept as raw bytes.

use crate::value::{
    Attribute, Attributes, DateTime, Range, Resolution, Tag, TextWithLang, Units, Value, ValueType,
};
use byteorder::{BigEndian, ByteOrder, ReadBytesExt, WriteBytesExt};
use chrono::{Datelike, FixedOffset, NaiveDate, Timelike};
use log::trace;
use std::io::{Cursor, Read, Write};

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("truncated input: {0}")]
    Io(#[from] std::io::Error),
    #[error("{tag}: invalid value length {len}")]
    InvalidLength { tag: Tag, len: usize },
    #[error("value too long: {0} bytes")]
    TooLong(usize),
    #[error("unexpected tag {0}")]
    UnexpectedTag(Tag),
    #[error("additional value without attribute name")]
    MissingName,
    #[error("attribute {0:?} has no values")]
    NoValues(String),
    #[error("invalid dateTime value")]
    InvalidDateTime,
    #[error("collections nested deeper than {0} levels")]
    TooDeep(usize),
}

/// Maximum nesting of collection values accepted by the decoder.
pub const MAX_COLLECTION_DEPTH: usize = 64;

/// Encode an attribute list (no group delimiters).
pub fn encode_attributes(attrs: &[Attribute]) -> Result<Vec<u8>, WireError> {
    let mut w = Vec::new();
    for attr in attrs {
        write_attribute(&mut w, attr)?;
    }
    Ok(w)
}

/// Decode an attribute list. Stops at `end-of-attributes-tag` or at the end
/// of input; any other delimiter tag is an error.
pub fn decode_attributes(bytes: &[u8]) -> Result<Attributes, WireError> {
    let mut r = Cursor::new(bytes);
    let mut attrs: Attributes = Vec::new();

    while (r.position() as usize) < bytes.len() {
        let tag = Tag(r.read_u8()?);
        if tag == Tag::END {
            break;
        }
        if tag.is_delimiter() {
            return Err(WireError::UnexpectedTag(tag));
        }

        let name = read_string(&mut r)?;
        let value = read_value(&mut r, tag, 0)?;
        trace!("wire: {tag} {name:?} at {}", r.position());

        if !name.is_empty() {
            attrs.push(Attribute::with_values(name, vec![(tag, value)]));
        } else {
            attrs
                .last_mut()
                .ok_or(WireError::MissingName)?
                .values
                .push((tag, value));
        }
    }

    Ok(attrs)
}

fn write_attribute(w: &mut Vec<u8>, attr: &Attribute) -> Result<(), WireError> {
    if attr.values.is_empty() {
        return Err(WireError::NoValues(attr.name.clone()));
    }
    for (i, (tag, value)) in attr.values.iter().enumerate() {
        let name = if i == 0 { attr.name.as_str() } else { "" };
        write_value(w, *tag, name, value)?;
    }
    Ok(())
}

fn write_value(w: &mut Vec<u8>, tag: Tag, name: &str, value: &Value) -> Result<(), WireError> {
    if tag.is_delimiter() {
        return Err(WireError::UnexpectedTag(tag));
    }
    w.write_u8(tag.0)?;
    write_bytes(w, name.as_bytes())?;

    let mut data = Vec::new();
    match value {
        Value::Void => {}
        Value::Integer(n) => data.write_i32::<BigEndian>(*n)?,
        Value::Boolean(b) => data.write_u8(u8::from(*b))?,
        Value::String(s) => data.extend_from_slice(s.as_bytes()),
        Value::DateTime(t) => write_date_time(&mut data, t)?,
        Value::Resolution(res) => {
            data.write_i32::<BigEndian>(res.xres)?;
            data.write_i32::<BigEndian>(res.yres)?;
            data.write_u8(res.units.0)?;
        }
        Value::Range(rng) => {
            data.write_i32::<BigEndian>(rng.lower)?;
            data.write_i32::<BigEndian>(rng.upper)?;
        }
        Value::TextWithLang(t) => {
            write_bytes(&mut data, t.lang.as_bytes())?;
            write_bytes(&mut data, t.text.as_bytes())?;
        }
        Value::Binary(b) => data.extend_from_slice(b),
        Value::Collection(members) => {
            write_bytes(w, &[])?;
            for member in members {
                w.write_u8(Tag::MEMBER_NAME.0)?;
                write_bytes(w, &[])?;
                write_bytes(w, member.name.as_bytes())?;
                for (tag, value) in &member.values {
                    write_value(w, *tag, "", value)?;
                }
            }
            w.write_u8(Tag::END_COLLECTION.0)?;
            write_bytes(w, &[])?;
            return write_bytes(w, &[]);
        }
    }
    write_bytes(w, &data)
}

fn write_bytes(w: &mut Vec<u8>, data: &[u8]) -> Result<(), WireError> {
    let len = u16::try_from(data.len()).map_err(|_| WireError::TooLong(data.len()))?;
    w.write_u16::<BigEndian>(len)?;
    w.write_all(data)?;
    Ok(())
}

fn write_date_time(w: &mut Vec<u8>, t: &DateTime) -> Result<(), WireError> {
    let year = u16::try_from(t.year()).map_err(|_| WireError::InvalidDateTime)?;
    let offset = t.offset().local_minus_utc();
    let (dir, offset) = if offset < 0 {
        (b'-', -offset)
    } else {
        (b'+', offset)
    };

    w.write_u16::<BigEndian>(year)?;
    w.write_all(&[
        t.month() as u8,
        t.day() as u8,
        t.hour() as u8,
        t.minute() as u8,
        t.second() as u8,
        (t.nanosecond() / 100_000_000).min(9) as u8,
        dir,
        (offset / 3600) as u8,
        (offset % 3600 / 60) as u8,
    ])?;
    Ok(())
}

fn read_bytes(r: &mut Cursor<&[u8]>) -> Result<Vec<u8>, WireError> {
    let len = r.read_u16::<BigEndian>()? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_string(r: &mut Cursor<&[u8]>) -> Result<String, WireError> {
    Ok(String::from_utf8_lossy(&read_bytes(r)?).into_owned())
}

/// `depth` is the number of collections enclosing the value.
fn read_value(r: &mut Cursor<&[u8]>, tag: Tag, depth: usize) -> Result<Value, WireError> {
    let data = read_bytes(r)?;
    if tag == Tag::BEGIN_COLLECTION {
        if depth >= MAX_COLLECTION_DEPTH {
            return Err(WireError::TooDeep(MAX_COLLECTION_DEPTH));
        }
        return read_collection(r, depth + 1).map(Value::Collection);
    }
    decode_value(tag, &data)
}

fn read_collection(r: &mut Cursor<&[u8]>, depth: usize) -> Result<Attributes, WireError> {
    let mut members: Attributes = Vec::new();
    loop {
        let tag = Tag(r.read_u8()?);
        read_bytes(r)?; // member values have no name

        match tag {
            Tag::END_COLLECTION => {
                read_bytes(r)?;
                return Ok(members);
            }
            Tag::MEMBER_NAME => {
                let name = read_string(r)?;
                members.push(Attribute::with_values(name, Vec::new()));
            }
            t if t.is_delimiter() => return Err(WireError::UnexpectedTag(t)),
            _ => {
                let value = read_value(r, tag, depth)?;
                members
                    .last_mut()
                    .ok_or(WireError::MissingName)?
                    .values
                    .push((tag, value));
            }
        }
    }
}

fn decode_value(tag: Tag, data: &[u8]) -> Result<Value, WireError> {
    let check_len = |len: usize| {
        if data.len() == len {
            Ok(())
        } else {
            Err(WireError::InvalidLength {
                tag,
                len: data.len(),
            })
        }
    };

    Ok(match tag.value_type() {
        ValueType::Void => Value::Void,
        ValueType::Integer => {
            check_len(4)?;
            Value::Integer(BigEndian::read_i32(data))
        }
        ValueType::Boolean => {
            check_len(1)?;
            Value::Boolean(data[0] != 0)
        }
        ValueType::String => Value::String(String::from_utf8_lossy(data).into_owned()),
        ValueType::DateTime => {
            check_len(11)?;
            Value::DateTime(decode_date_time(data)?)
        }
        ValueType::Resolution => {
            check_len(9)?;
            Value::Resolution(Resolution {
                xres: BigEndian::read_i32(&data[0..4]),
                yres: BigEndian::read_i32(&data[4..8]),
                units: Units(data[8]),
            })
        }
        ValueType::Range => {
            check_len(8)?;
            Value::Range(Range {
                lower: BigEndian::read_i32(&data[0..4]),
                upper: BigEndian::read_i32(&data[4..8]),
            })
        }
        ValueType::TextWithLang => {
            let mut r = Cursor::new(data);
            let lang = read_string(&mut r)?;
            let text = read_string(&mut r)?;
            if r.position() as usize != data.len() {
                return Err(WireError::InvalidLength {
                    tag,
                    len: data.len(),
                });
            }
            Value::TextWithLang(TextWithLang { lang, text })
        }
        ValueType::Binary | ValueType::Collection | ValueType::Invalid => {
            Value::Binary(data.to_vec())
        }
    })
}

fn decode_date_time(data: &[u8]) -> Result<DateTime, WireError> {
    if data[7] > 9 {
        return Err(WireError::InvalidDateTime);
    }
    let year = i32::from(BigEndian::read_u16(&data[0..2]));
    let offset = i32::from(data[9]) * 3600 + i32::from(data[10]) * 60;
    let offset = match data[8] {
        b'+' => FixedOffset::east_opt(offset),
        b'-' => FixedOffset::west_opt(offset),
        _ => None,
    }
    .ok_or(WireError::InvalidDateTime)?;

    NaiveDate::from_ymd_opt(year, u32::from(data[2]), u32::from(data[3]))
        .and_then(|d| {
            d.and_hms_milli_opt(
                u32::from(data[4]),
                u32::from(data[5]),
                u32::from(data[6]),
                u32::from(data[7]) * 100,
            )
        })
        .and_then(|t| t.and_local_timezone(offset).single())
        .ok_or(WireError::InvalidDateTime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_layout() {
        let attrs = vec![Attribute::new("copies", Tag::INTEGER, 3)];
        let bytes = encode_attributes(&attrs).expect("encode");
        assert_eq!(
            bytes,
            [0x21, 0x00, 0x06, b'c', b'o', b'p', b'i', b'e', b's', 0x00, 0x04, 0, 0, 0, 3]
        );
    }

    #[test]
    fn short_integer_is_rejected() {
        let bytes = [0x21, 0x00, 0x01, b'a', 0x00, 0x02, 0, 1];
        assert!(matches!(
            decode_attributes(&bytes),
            Err(WireError::InvalidLength { len: 2, .. })
        ));
    }
}
