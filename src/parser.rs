//! Parse field binding tags (`"?job-priority,integer,1:100"`) using PEST.
//!
//! Part 0 is the attribute name with an optional conformance prefix.
//! Every other part is a wire-type keyword (optionally with an OOB
//! suffix), a `>N`/`<N` limit, or an `N:M` range (`M` may be `MAX`).

use crate::ast::{AttrDescriptor, Conformance};
use crate::value::Tag;
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "tag.pest"]
struct TagParser;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("missed attribute name")]
    MissingName,
    #[error("unknown keyword: {0:?}")]
    UnknownParam(String),
    #[error("{0:?}: invalid limit")]
    InvalidLimit(String),
    #[error("{0:?}: limit out of range")]
    LimitOutOfRange(String),
    #[error("range {0}: invalid value")]
    InvalidRange(String),
    #[error("range ({min}:{max}): min>max")]
    EmptyRange { min: i32, max: i32 },
}

/// Map a wire-type keyword (lowercase) to its tag.
pub fn keyword_tag(kw: &str) -> Option<Tag> {
    Some(match kw {
        "boolean" => Tag::BOOLEAN,
        "charset" => Tag::CHARSET,
        "collection" => Tag::BEGIN_COLLECTION,
        "datetime" => Tag::DATE_TIME,
        "enum" => Tag::ENUM,
        "integer" => Tag::INTEGER,
        "keyword" => Tag::KEYWORD,
        "mimemediatype" => Tag::MIME_TYPE,
        "name" => Tag::NAME,
        "namewithlanguage" => Tag::NAME_LANG,
        "naturallanguage" => Tag::LANGUAGE,
        "rangeofinteger" => Tag::RANGE,
        "resolution" => Tag::RESOLUTION,
        "string" => Tag::STRING,
        "text" => Tag::TEXT,
        "textwithlanguage" => Tag::TEXT_LANG,
        "uri" => Tag::URI,
        "urischeme" => Tag::URI_SCHEME,
        _ => return None,
    })
}

/// Parse one binding tag into an attribute descriptor.
pub fn parse_tag(source: &str) -> Result<AttrDescriptor, TagError> {
    let mut parts = source.split(',').map(str::trim);
    let first = parts.next().unwrap_or_default();

    let (conformance, name) = if let Some(name) = first.strip_prefix('?') {
        (Conformance::Optional, name)
    } else if let Some(name) = first.strip_prefix('!') {
        (Conformance::Required, name)
    } else {
        (Conformance::Recommended, first)
    };
    if name.is_empty() {
        return Err(TagError::MissingName);
    }

    let mut desc = AttrDescriptor::new(name, conformance);
    for part in parts.filter(|p| !p.is_empty()) {
        apply_param(&mut desc, part)?;
    }
    Ok(desc)
}

fn apply_param(desc: &mut AttrDescriptor, part: &str) -> Result<(), TagError> {
    let pairs = TagParser::parse(Rule::param, part)
        .map_err(|_| TagError::UnknownParam(part.to_string()))?;
    for pair in pairs {
        match pair.as_rule() {
            Rule::keyword => build_keyword(desc, pair, part)?,
            Rule::limit => build_limit(desc, pair, part)?,
            Rule::range => build_range(desc, pair, part)?,
            _ => {}
        }
    }
    Ok(())
}

fn build_keyword(
    desc: &mut AttrDescriptor,
    pair: pest::iterators::Pair<Rule>,
    part: &str,
) -> Result<(), TagError> {
    let mut zero_tag = Tag::ZERO;
    for inner in pair.into_inner() {
        let text = inner.as_str().to_ascii_lowercase();
        match inner.as_rule() {
            Rule::keyword_name => {
                desc.tag = keyword_tag(&text)
                    .ok_or_else(|| TagError::UnknownParam(part.to_string()))?;
            }
            Rule::oob => {
                zero_tag = if text == "|unknown" {
                    Tag::UNKNOWN
                } else {
                    Tag::NO_VALUE
                };
            }
            _ => {}
        }
    }
    desc.zero_tag = zero_tag;
    Ok(())
}

fn build_limit(
    desc: &mut AttrDescriptor,
    pair: pest::iterators::Pair<Rule>,
    part: &str,
) -> Result<(), TagError> {
    let mut op = "";
    let mut value = "";
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::limit_op => op = inner.as_str(),
            Rule::limit_value => value = inner.as_str(),
            _ => {}
        }
    }

    let v: i64 = value
        .parse()
        .map_err(|_| TagError::InvalidLimit(part.to_string()))?;
    let lo = i64::from(i32::MIN);
    let hi = i64::from(i32::MAX);

    match op {
        ">" if (lo - 1..=hi - 1).contains(&v) => desc.min = (v + 1) as i32,
        "<" if (lo + 1..=hi + 1).contains(&v) => desc.max = (v - 1) as i32,
        _ => return Err(TagError::LimitOutOfRange(part.to_string())),
    }
    Ok(())
}

fn build_range(
    desc: &mut AttrDescriptor,
    pair: pest::iterators::Pair<Rule>,
    part: &str,
) -> Result<(), TagError> {
    let bounds: Vec<&str> = pair
        .into_inner()
        .filter(|p| p.as_rule() == Rule::bound)
        .map(|p| p.as_str())
        .collect();
    let [lower, upper] = bounds.as_slice() else {
        return Err(TagError::InvalidRange(part.to_string()));
    };

    let min = parse_bound(lower, part)?;
    let max = match *upper {
        "MAX" => i32::MAX,
        s => parse_bound(s, part)?,
    };
    if min > max {
        return Err(TagError::EmptyRange { min, max });
    }

    desc.min = min;
    desc.max = max;
    Ok(())
}

fn parse_bound(s: &str, part: &str) -> Result<i32, TagError> {
    s.parse()
        .map_err(|_| TagError::InvalidRange(part.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_and_suffix_are_case_insensitive() {
        let d = parse_tag("media,KeyWord|No-Value").expect("parse");
        assert_eq!(d.tag, Tag::KEYWORD);
        assert_eq!(d.zero_tag, Tag::NO_VALUE);
    }

    #[test]
    fn longer_keywords_win_over_prefixes() {
        assert_eq!(parse_tag("a,namewithlanguage").unwrap().tag, Tag::NAME_LANG);
        assert_eq!(parse_tag("a,textWithLanguage").unwrap().tag, Tag::TEXT_LANG);
        assert_eq!(parse_tag("a,uriScheme").unwrap().tag, Tag::URI_SCHEME);
        assert_eq!(parse_tag("a,uri").unwrap().tag, Tag::URI);
    }

    #[test]
    fn limit_edges() {
        let d = parse_tag("a,>-2147483649").expect("parse");
        assert_eq!(d.min, i32::MIN);
        let d = parse_tag("a,<2147483648").expect("parse");
        assert_eq!(d.max, i32::MAX);
        assert!(matches!(
            parse_tag("a,>2147483647"),
            Err(TagError::LimitOutOfRange(_))
        ));
        assert!(matches!(parse_tag("a,<"), Err(TagError::InvalidLimit(_))));
    }
}
