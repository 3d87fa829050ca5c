//! Observed-state parser
//!
//! Turns the line-oriented output of a base-scope directory search (LDIF as
//! printed by `ldapsearch -LLL`) into an [`ObservedEntry`].

use crate::traits::SearchResponse;

/// Remove a leading `{SCHEME}` token from a value.
///
/// The token runs from a leading `{` to the first `}`. Values without a
/// leading `{`, or without a closing `}`, are returned unchanged.
pub fn strip_scheme(value: &str) -> &str {
    if !value.starts_with('{') {
        return value;
    }
    match value.find('}') {
        Some(end) => &value[end + 1..],
        None => value,
    }
}

/// One observed attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedValue {
    raw: String,
    stripped: String,
}

impl ObservedValue {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let stripped = strip_scheme(&raw).to_string();
        Self { raw, stripped }
    }

    /// The value exactly as the directory returned it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The value with any scheme prefix removed; comparison only.
    pub fn stripped(&self) -> &str {
        &self.stripped
    }
}

/// The live state of the managed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedEntry {
    /// The entry does not exist.
    Absent,
    /// The entry exists; attributes in the order the directory returned them.
    Present(Vec<(String, Vec<ObservedValue>)>),
}

impl ObservedEntry {
    /// Build an observed entry from a search collaborator response.
    pub fn from_search(response: SearchResponse) -> Self {
        match response {
            SearchResponse::NoSuchObject => ObservedEntry::Absent,
            SearchResponse::Entry(text) => parse_search_output(&text),
        }
    }

    /// Build a present entry from `(name, raw value)` pairs.
    pub fn from_pairs<I, N, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let mut attributes: Vec<(String, Vec<ObservedValue>)> = Vec::new();
        for (name, value) in pairs {
            let name = name.into();
            let value = ObservedValue::new(value);
            match attributes.iter_mut().find(|(n, _)| *n == name) {
                Some((_, values)) => values.push(value),
                None => attributes.push((name, vec![value])),
            }
        }
        ObservedEntry::Present(attributes)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ObservedEntry::Absent)
    }

    /// Observed values of an attribute; `None` when absent or not returned.
    pub fn get(&self, name: &str) -> Option<&[ObservedValue]> {
        match self {
            ObservedEntry::Absent => None,
            ObservedEntry::Present(attributes) => attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, values)| values.as_slice()),
        }
    }

    /// Every observed `(name, value)` pair in directory order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &ObservedValue)> {
        let attributes: &[(String, Vec<ObservedValue>)] = match self {
            ObservedEntry::Absent => &[],
            ObservedEntry::Present(attributes) => attributes,
        };
        attributes
            .iter()
            .flat_map(|(n, values)| values.iter().map(move |v| (n.as_str(), v)))
    }
}

/// Parse raw search output into a present [`ObservedEntry`].
///
/// Lines that do not carry a `key: value` separator are skipped, so blank
/// record separators are harmless. The `dn:` line is kept like any other
/// key and is simply never declared as an attribute.
///
/// Base64 values (`cn:: w6lsw6g=`) are not decoded. A declaration only
/// matches such a value when it is written in the same encoded form.
pub fn parse_search_output(text: &str) -> ObservedEntry {
    let pairs = unfold_lines(text)
        .into_iter()
        .filter_map(|line| split_line(&line).map(|(k, v)| (k.to_string(), v.to_string())))
        .collect::<Vec<_>>();
    ObservedEntry::from_pairs(pairs)
}

/// Join folded continuation lines onto their logical line.
fn unfold_lines(text: &str) -> Vec<String> {
    let mut logical: Vec<String> = Vec::new();
    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        match (line.strip_prefix(' '), logical.last_mut()) {
            (Some(continuation), Some(previous)) if !previous.is_empty() => {
                previous.push_str(continuation);
            }
            _ => logical.push(line.to_string()),
        }
    }
    logical
}

/// Split at the first run of colons followed by a space.
///
/// `mail: a@x` and the base64 form `userPassword:: e1NTSEF9` both split; the
/// value is kept verbatim.
fn split_line(line: &str) -> Option<(&str, &str)> {
    let bytes = line.as_bytes();
    let mut start = 0;
    while let Some(offset) = line[start..].find(':') {
        let colon = start + offset;
        let mut end = colon;
        while end < bytes.len() && bytes[end] == b':' {
            end += 1;
        }
        if end < bytes.len() && bytes[end] == b' ' {
            return Some((&line[..colon], &line[end + 1..]));
        }
        start = end;
    }
    None
}
