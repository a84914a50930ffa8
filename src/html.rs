use once_cell::sync::Lazy;
use pest::{iterators::Pair, Parser};
use pest_derive::Parser;
use regex::{Captures, Regex};
use thiserror::Error;

#[derive(Parser)]
#[grammar = "pest/html.pest"]
pub struct HtmlParser;

#[derive(Error, Debug)]
pub enum HtmlError {
    #[error("failed to parse HTML document: {0}")]
    Parse(#[from] pest::error::Error<Rule>),
}

static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);").unwrap());

/// Text content of every `<pre>` element, in document order.
pub fn pre_blocks(html: &str) -> Result<Vec<String>, HtmlError> {
    let pairs = HtmlParser::parse(Rule::document, html)?;

    Ok(pairs
        .flat_map(Pair::into_inner)
        .filter(|pair| pair.as_rule() == Rule::pre)
        .filter_map(|pre| pre.into_inner().next())
        .map(|content| text_content(content.as_str()))
        .collect())
}

/// Drops nested markup and decodes character references, like the DOM `textContent`.
pub fn text_content(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut in_tag = false;
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            // a `<` not followed by a tag name or `/`, `!`, `?` is plain text
            '<' if !in_tag
                && chars
                    .peek()
                    .is_some_and(|c| c.is_ascii_alphabetic() || matches!(*c, '/' | '!' | '?')) =>
            {
                in_tag = true;
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    decode_entities(&text)
}

fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |captures: &Captures| {
            let entity = &captures[1];
            let decoded = if let Some(hex) = entity.strip_prefix("#x").or(entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => None,
                }
            };
            decoded.map_or_else(|| captures[0].to_string(), String::from)
        })
        .into_owned()
}
