//! Minimal XML element tree reader
//!
//! Enough XML to read what BLAST+ writes with `-outfmt 5`: declaration,
//! doctype, comments, attributes, CDATA and the predefined entities. There is
//! no namespace or DTD processing.

use crate::{Result, SeqServerError};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till1, take_until, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::value,
    error::{Error, ErrorKind},
    multi::many0,
    sequence::{delimited, tuple},
    IResult,
};

/// An element together with its attributes and ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlChild>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlChild {
    Element(XmlNode),
    Text(String),
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(XmlChild::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlChild::Text(text.into()));
        self
    }

    /// Shorthand for an element holding a single text leaf.
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).with_text(text)
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlNode> {
        self.children.iter().filter_map(|child| match child {
            XmlChild::Element(node) => Some(node),
            XmlChild::Text(_) => None,
        })
    }

    pub fn first_text(&self) -> Option<&str> {
        self.children.iter().find_map(|child| match child {
            XmlChild::Text(text) => Some(text.as_str()),
            XmlChild::Element(_) => None,
        })
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Merge adjacent text runs and, for elements with element children,
    /// drop the indentation between them.
    fn normalize(&mut self) {
        let mut merged: Vec<XmlChild> = Vec::with_capacity(self.children.len());
        for child in self.children.drain(..) {
            match (merged.last_mut(), child) {
                (Some(XmlChild::Text(previous)), XmlChild::Text(text)) => previous.push_str(&text),
                (_, child) => merged.push(child),
            }
        }

        if merged.iter().any(|c| matches!(c, XmlChild::Element(_))) {
            merged.retain(|c| match c {
                XmlChild::Text(text) => !text.trim().is_empty(),
                XmlChild::Element(_) => true,
            });
        }

        self.children = merged;
    }
}

/// Parse a complete XML document and return its root element.
pub fn parse_xml(input: &str) -> Result<XmlNode> {
    let document = input.strip_prefix('\u{feff}').unwrap_or(input);

    let (rest, _) = many0(misc)(document).map_err(|e| describe(document, e))?;
    if rest.is_empty() {
        return Err(SeqServerError::Parse("XML document has no root element".to_string()));
    }

    let (rest, root) = element(rest).map_err(|e| describe(document, e))?;
    let (rest, _) = many0(misc)(rest).map_err(|e| describe(document, e))?;

    if !rest.is_empty() {
        return Err(SeqServerError::Parse(format!(
            "unexpected content after </{}> at line {}",
            root.name,
            line_of(document, rest)
        )));
    }

    Ok(root)
}

fn describe(document: &str, err: nom::Err<Error<&str>>) -> SeqServerError {
    match err {
        nom::Err::Incomplete(_) => {
            SeqServerError::Parse("unexpected end of XML document".to_string())
        }
        nom::Err::Error(e) | nom::Err::Failure(e) => SeqServerError::Parse(format!(
            "malformed XML near line {} ({:?})",
            line_of(document, e.input),
            e.code
        )),
    }
}

fn line_of(document: &str, remaining: &str) -> usize {
    let consumed = document.len().saturating_sub(remaining.len());
    document[..consumed].matches('\n').count() + 1
}

fn name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '.'))(input)
}

fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_until("\""), char('"')),
        delimited(char('\''), take_until("'"), char('\'')),
    ))(input)
}

fn attribute(input: &str) -> IResult<&str, (String, String)> {
    let (input, _) = multispace1(input)?;
    let (input, key) = name(input)?;
    let (input, _) = tuple((multispace0, char('='), multispace0))(input)?;
    let (input, raw) = quoted(input)?;
    Ok((input, (key.to_string(), decode_entities(raw))))
}

fn comment(input: &str) -> IResult<&str, &str> {
    delimited(tag("<!--"), take_until("-->"), tag("-->"))(input)
}

fn processing_instruction(input: &str) -> IResult<&str, &str> {
    delimited(tag("<?"), take_until("?>"), tag("?>"))(input)
}

fn doctype(input: &str) -> IResult<&str, &str> {
    delimited(tag("<!DOCTYPE"), take_until(">"), char('>'))(input)
}

fn cdata(input: &str) -> IResult<&str, &str> {
    delimited(tag("<![CDATA["), take_until("]]>"), tag("]]>"))(input)
}

fn misc(input: &str) -> IResult<&str, ()> {
    alt((
        value((), multispace1),
        value((), comment),
        value((), processing_instruction),
        value((), doctype),
    ))(input)
}

fn closing_tag<'a>(input: &'a str, expected: &str) -> IResult<&'a str, ()> {
    let (input, _) = tag("</")(input)?;
    let (input, _) = tag(expected)(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char('>')(input)?;
    Ok((input, ()))
}

fn element(input: &str) -> IResult<&str, XmlNode> {
    let (input, _) = char('<')(input)?;
    let (input, tag_name) = name(input)?;
    let (input, attributes) = many0(attribute)(input)?;
    let (input, _) = multispace0(input)?;

    let mut node = XmlNode {
        name: tag_name.to_string(),
        attributes,
        children: Vec::new(),
    };

    if let Ok((rest, _)) = tag::<&str, &str, Error<&str>>("/>")(input) {
        return Ok((rest, node));
    }
    let (mut input, _) = char('>')(input)?;

    loop {
        if input.is_empty() {
            return Err(nom::Err::Failure(Error::new(input, ErrorKind::Eof)));
        }

        if input.starts_with("</") {
            let (rest, _) = closing_tag(input, tag_name)
                .map_err(|_| nom::Err::Failure(Error::new(input, ErrorKind::Tag)))?;
            input = rest;
            break;
        }

        if let Ok((rest, _)) = comment(input) {
            input = rest;
            continue;
        }

        if let Ok((rest, _)) = processing_instruction(input) {
            input = rest;
            continue;
        }

        if let Ok((rest, text)) = cdata(input) {
            node.children.push(XmlChild::Text(text.to_string()));
            input = rest;
            continue;
        }

        if input.starts_with('<') {
            let (rest, child) = element(input)?;
            node.children.push(XmlChild::Element(child));
            input = rest;
            continue;
        }

        let (rest, text) = take_till1(|c: char| c == '<')(input)?;
        node.children.push(XmlChild::Text(decode_entities(text)));
        input = rest;
    }

    node.normalize();
    Ok((input, node))
}

/// Replace the predefined entities and numeric character references.
/// Unknown entities are left as they are.
pub(crate) fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos..];

        let decoded = after
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&after[1..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &after[end + 1..];
            }
            None => {
                out.push('&');
                rest = &after[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()
            } else {
                entity.strip_prefix('#').and_then(|dec| dec.parse::<u32>().ok())
            };
            code.and_then(char::from_u32)
        }
    }
}
