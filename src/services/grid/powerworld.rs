//! PowerWorld auxiliary (AUX) file parsing.
//!
//! An AUX file is a sequence of blocks of the form
//!
//! ```text
//! DATA (Bus, [BusNum, BusName, Latitude:1, Longitude:1])
//! {
//!    1001 "ODESSA 2 0" 31.90 -102.26
//! }
//! ```
//!
//! Several blocks may share a name (Travis150 has one `Branch` block for lines
//! and another for transformers).

use std::str::FromStr;

use regex::Regex;

use super::GridDataError;

/// One `DATA (Name, [fields]) { rows }` block.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxBlock {
    pub fields: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl AuxBlock {
    /// Position of a field in the header.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }

    /// Iterate rows as field-addressable records.
    pub fn records(&self) -> impl Iterator<Item = AuxRecord<'_>> {
        self.rows.iter().map(move |tokens| AuxRecord {
            block: self,
            tokens,
        })
    }
}

/// A single row of an [`AuxBlock`].
#[derive(Debug, Clone, Copy)]
pub struct AuxRecord<'a> {
    block: &'a AuxBlock,
    tokens: &'a [String],
}

impl<'a> AuxRecord<'a> {
    /// Raw token for a field, `None` when the field or column is missing.
    pub fn raw(&self, field: &str) -> Option<&'a str> {
        let idx = self.block.field_index(field)?;
        self.tokens.get(idx).map(String::as_str)
    }

    /// Parsed value for a field, `None` when missing or malformed.
    pub fn get<T: FromStr>(&self, field: &str) -> Option<T> {
        self.raw(field)?.parse().ok()
    }
}

/// Split an AUX data line on whitespace, keeping double-quoted strings intact.
///
/// Quotes are stripped. An unterminated quote runs to the end of the line.
pub fn tokenize_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c == '"' {
            chars.next();
            let body_start = start + 1;
            let mut end = line.len();
            for (i, ch) in chars.by_ref() {
                if ch == '"' {
                    end = i;
                    break;
                }
            }
            tokens.push(line[body_start..end].to_string());
        } else if c.is_whitespace() {
            chars.next();
        } else {
            let mut end = line.len();
            while let Some(&(i, ch)) = chars.peek() {
                if ch.is_whitespace() || ch == '"' {
                    end = i;
                    break;
                }
                chars.next();
            }
            tokens.push(line[start..end].to_string());
        }
    }

    tokens
}

/// Parse every block named `block_name` from AUX text, in file order.
pub fn parse_blocks(text: &str, block_name: &str) -> Result<Vec<AuxBlock>, GridDataError> {
    let pattern = format!(
        r"(?s)DATA\s*\({}\s*,\s*\[([^\]]+)\]\s*\)\s*\{{(.*?)\}}",
        regex::escape(block_name)
    );
    let re = Regex::new(&pattern)?;

    let blocks = re
        .captures_iter(text)
        .map(|caps| {
            let header = caps.get(1).map_or("", |m| m.as_str());
            let body = caps.get(2).map_or("", |m| m.as_str());

            let fields = header
                .replace('\n', " ")
                .split(',')
                .map(|f| f.trim().to_string())
                .collect();

            let rows = body
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with("//"))
                .map(tokenize_line)
                .filter(|tokens| !tokens.is_empty())
                .collect();

            AuxBlock { fields, rows }
        })
        .collect();

    Ok(blocks)
}

/// First block named `block_name`, or a `MissingBlock` error.
pub fn require_block(
    text: &str,
    block_name: &str,
    context: &str,
) -> Result<AuxBlock, GridDataError> {
    parse_blocks(text, block_name)?
        .into_iter()
        .next()
        .ok_or_else(|| GridDataError::MissingBlock {
            block: block_name.to_string(),
            context: context.to_string(),
        })
}
