//! URL template engine.
//!
//! Route patterns are immutable string templates mixing literal segments
//! with two kinds of named parameter slots:
//!
//! - *String slots*, marked `:name`, carrying an opaque string value.
//! - *Identity slots*, marked `@name`, carrying an entity identifier. Their
//!   parameter record key is prefixed `uuid_`, and the slot name (lowercased)
//!   names the entity kind the identifier belongs to. On the wire the value
//!   is still a plain string.
//!
//! A pattern is parsed once into a [`RoutePattern`], the structured schema
//! object both sides of the wire share: the client substitutes concrete
//! values into it, the server translates it into the external router's
//! native syntax before registration.
//!
//! # Example
//!
//! ```
//! use route_bind::{Params, RoutePattern};
//!
//! let route = RoutePattern::parse("/things/:id/children/@childId/edit").unwrap();
//! let params = Params::new().set("id", "42").uuid("childId", "abc");
//!
//! assert_eq!(route.substitute(&params), "/things/42/children/abc/edit");
//! assert_eq!(route.router_pattern(), "/things/:id/children/:uuid_childId/edit");
//! ```
//!
//! Substituting with a parameter omitted leaves the slot token literally in
//! the URL. This is a documented footgun, not a detected error: the call
//! will fail later at the transport level, typically as a 404.

use std::collections::HashMap;

use crate::error::Error;

/// The two parameter slot kinds a route pattern can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// A `:name` slot holding an opaque string.
    String,
    /// An `@name` slot holding an entity identifier.
    Identity,
}

/// One named parameter slot found in a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// The slot name as written in the pattern, without its marker.
    pub name: String,
    /// Whether the slot was marked `:` or `@`.
    pub kind: SlotKind,
}

impl Slot {
    /// The key this slot uses in a parameter record: the plain name for
    /// string slots, `uuid_<name>` for identity slots.
    pub fn record_key(&self) -> String {
        match self.kind {
            SlotKind::String => self.name.clone(),
            SlotKind::Identity => format!("uuid_{}", self.name),
        }
    }

    /// The entity kind an identity slot's value belongs to (the slot name,
    /// lowercased). `None` for string slots.
    pub fn entity_kind(&self) -> Option<String> {
        match self.kind {
            SlotKind::String => None,
            SlotKind::Identity => Some(self.name.to_lowercase()),
        }
    }

    /// The literal token this slot occupies in the pattern.
    fn token(&self) -> String {
        match self.kind {
            SlotKind::String => format!(":{}", self.name),
            SlotKind::Identity => format!("@{}", self.name),
        }
    }
}

/// An ordered parameter record: one `(record key, value)` entry per slot the
/// caller supplies.
///
/// Built fluently; identity-slot values go in through [`Params::uuid`],
/// which applies the `uuid_` key prefix:
///
/// ```
/// use route_bind::Params;
///
/// let params = Params::new().set("id", "42").uuid("childId", "abc");
/// assert_eq!(params.get("uuid_childId"), Some("abc"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    /// Create an empty parameter record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value for a string slot. Replaces any earlier value for the
    /// same key.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name.into(), value.into());
        self
    }

    /// Set the value for an identity slot; the record key becomes
    /// `uuid_<name>`.
    pub fn uuid(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(format!("uuid_{}", name.into()), value.into());
        self
    }

    fn insert(&mut self, key: String, value: String) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Look up a value by its record key (`uuid_`-prefixed for identity
    /// slots).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over `(record key, value)` entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries in the record.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A parsed route pattern: the raw template plus the slots found in it, in
/// the order of a single left-to-right scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    slots: Vec<Slot>,
}

impl RoutePattern {
    /// Parse a pattern, recording every `:name` and `@name` slot.
    ///
    /// A slot marker counts only at the start of a path segment, so the
    /// colon in an absolute address (`https://...`) stays literal. A slot
    /// runs from its marker to the next `/` or the end of the string. Empty
    /// slot names and duplicate slot names are rejected; slot names must be
    /// unique within one pattern.
    pub fn parse(pattern: &str) -> Result<Self, Error> {
        let mut slots: Vec<Slot> = Vec::new();
        let bytes = pattern.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let marker = bytes[i];
            let at_segment_start = i == 0 || bytes[i - 1] == b'/';
            if at_segment_start && (marker == b':' || marker == b'@') {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end] != b'/' {
                    end += 1;
                }
                let name = &pattern[start..end];
                if name.is_empty() {
                    return Err(Error::template(format!(
                        "empty slot name in pattern {pattern}"
                    )));
                }
                if slots.iter().any(|s| s.name == name) {
                    return Err(Error::template(format!(
                        "duplicate slot name {name} in pattern {pattern}"
                    )));
                }
                let kind = if marker == b':' {
                    SlotKind::String
                } else {
                    SlotKind::Identity
                };
                slots.push(Slot {
                    name: name.to_string(),
                    kind,
                });
                i = end;
            } else {
                i += 1;
            }
        }
        Ok(Self {
            raw: pattern.to_string(),
            slots,
        })
    }

    /// The pattern as declared.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The slots found in the pattern, in scan order. This is the derived
    /// parameter record type: one entry per slot, keyed by
    /// [`Slot::record_key`].
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Whether the pattern contains any slots. Patterns without slots have
    /// no parameter record; call sites must not attempt substitution.
    pub fn has_slots(&self) -> bool {
        !self.slots.is_empty()
    }

    /// Check a supplied parameter record against the pattern's slots.
    ///
    /// Every supplied key must name a slot; supplying any record at all for
    /// a slotless pattern is an error. An *omitted* slot is not detected
    /// here; it stays literally in the substituted URL.
    pub fn validate(&self, params: &Params) -> Result<(), Error> {
        if !self.has_slots() {
            if params.is_empty() {
                return Ok(());
            }
            return Err(Error::template(format!(
                "pattern {} takes no parameters",
                self.raw
            )));
        }
        for (key, _) in params.iter() {
            if !self.slots.iter().any(|s| s.record_key() == key) {
                return Err(Error::template(format!(
                    "parameter {key} does not name a slot of pattern {}",
                    self.raw
                )));
            }
        }
        Ok(())
    }

    /// Substitute concrete values into the pattern.
    ///
    /// Keys starting with `uuid_` replace the matching `@name` token, other
    /// keys replace the matching `:name` token. Slot names are unique, so
    /// replacement order does not matter. Slots with no supplied value are
    /// left as-is.
    pub fn substitute(&self, params: &Params) -> String {
        let mut url = self.raw.clone();
        for (key, value) in params.iter() {
            let token = match key.strip_prefix("uuid_") {
                Some(name) => format!("@{name}"),
                None => format!(":{key}"),
            };
            url = replace_token(&url, &token, value);
        }
        url
    }

    /// Translate the pattern into the external router's native syntax:
    /// every `@name` becomes `:uuid_name`, `:name` passes through unchanged.
    pub fn router_pattern(&self) -> String {
        let mut out = self.raw.clone();
        for slot in &self.slots {
            if slot.kind == SlotKind::Identity {
                out = replace_token(&out, &slot.token(), &format!(":uuid_{}", slot.name));
            }
        }
        out
    }

    /// Match a concrete path against the pattern, recovering the parameter
    /// record. Returns `None` if the path does not fit.
    pub fn match_path(&self, path: &str) -> Option<Params> {
        let pattern_segments: Vec<&str> = self.raw.split('/').collect();
        let path_segments: Vec<&str> = path.split('/').collect();
        if pattern_segments.len() != path_segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (pattern_segment, path_segment) in pattern_segments.iter().zip(&path_segments) {
            if let Some(name) = pattern_segment.strip_prefix(':') {
                if path_segment.is_empty() {
                    return None;
                }
                params = params.set(name, *path_segment);
            } else if let Some(name) = pattern_segment.strip_prefix('@') {
                if path_segment.is_empty() {
                    return None;
                }
                params = params.uuid(name, *path_segment);
            } else if pattern_segment != path_segment {
                return None;
            }
        }
        Some(params)
    }

    /// Build the parameter record from router-extracted native parameters,
    /// in slot order. Keys the router did not supply are skipped.
    pub fn record_from(&self, native: &HashMap<String, String>) -> Params {
        let mut params = Params::new();
        for slot in &self.slots {
            let key = slot.record_key();
            if let Some(value) = native.get(&key) {
                params.insert(key, value.clone());
            }
        }
        params
    }
}

/// Replace every occurrence of `token` that ends at a segment boundary
/// (followed by `/` or the end of the string). Boundary awareness keeps a
/// slot named `id` from eating the prefix of a slot named `idx` in another
/// segment.
fn replace_token(url: &str, token: &str, value: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let mut rest = url;
    while let Some(pos) = rest.find(token) {
        let after = pos + token.len();
        let at_boundary = rest[after..].chars().next().map_or(true, |c| c == '/');
        out.push_str(&rest[..pos]);
        if at_boundary {
            out.push_str(value);
        } else {
            out.push_str(token);
        }
        rest = &rest[after..];
    }
    out.push_str(rest);
    out
}
