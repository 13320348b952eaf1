//! Path templates with `{name}` placeholders.
//!
//! This is the only place placeholders are parsed. Both the resource-key call
//! shape (match a concrete path against the template) and the named-argument
//! call shape (substitute values into the template) go through
//! [`PathTemplate`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]+)\}").expect("placeholder pattern is valid"));

/// Single-segment capture used in place of every placeholder.
const SEGMENT_CAPTURE: &str = "([^/]+)";

#[derive(Clone, Debug)]
enum Piece {
    Literal(String),
    Placeholder(String),
}

/// A parsed endpoint path such as `/api/v1/repository/{namespace}/{repository}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathTemplate {
    raw: String,
    pieces: Vec<Piece>,
    placeholders: Vec<String>,
    matcher: Regex,
}

/// Outcome of substituting values into a [`PathTemplate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Substitution {
    path: String,
    unresolved: Vec<String>,
}

impl Substitution {
    /// Returns the path with every resolvable placeholder filled in.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Placeholder names that had no value, in template order.
    #[must_use]
    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }

    /// Whether every placeholder received a value.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Consumes the substitution, returning the path.
    #[must_use]
    pub fn into_path(self) -> String {
        self.path
    }
}

impl PathTemplate {
    /// Parses a template string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPathTemplate`] when the template contains a
    /// stray brace or a placeholder name containing `/` or `{`.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let invalid = |reason: &str| Error::InvalidPathTemplate {
            template: raw.clone(),
            reason: reason.to_owned(),
        };

        let mut pieces = Vec::new();
        let mut placeholders: Vec<String> = Vec::new();
        let mut cursor = 0;

        for captures in PLACEHOLDER.captures_iter(&raw) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            push_literal(&mut pieces, &raw[cursor..whole.start()])
                .map_err(|()| invalid("unbalanced brace"))?;

            let name = name.as_str();
            if name.trim().is_empty() || name.contains(['/', '{']) {
                return Err(invalid("placeholder names must be a single path segment"));
            }
            if !placeholders.iter().any(|known| known == name) {
                placeholders.push(name.to_owned());
            }
            pieces.push(Piece::Placeholder(name.to_owned()));
            cursor = whole.end();
        }
        push_literal(&mut pieces, &raw[cursor..]).map_err(|()| invalid("unbalanced brace"))?;

        let mut pattern = String::from("^");
        for piece in &pieces {
            match piece {
                Piece::Literal(text) => pattern.push_str(&regex::escape(text)),
                Piece::Placeholder(_) => pattern.push_str(SEGMENT_CAPTURE),
            }
        }
        pattern.push('$');

        let matcher = Regex::new(&pattern).map_err(|err| invalid(&err.to_string()))?;

        Ok(Self {
            raw,
            pieces,
            placeholders,
            matcher,
        })
    }

    /// Returns the raw template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Distinct placeholder names in order of first appearance.
    #[must_use]
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Whether the template has any placeholder.
    #[must_use]
    pub fn has_placeholders(&self) -> bool {
        !self.placeholders.is_empty()
    }

    /// Returns `true` when `name` is one of the template's placeholders.
    #[must_use]
    pub fn is_placeholder(&self, name: &str) -> bool {
        self.placeholders.iter().any(|known| known == name)
    }

    /// Whether a concrete path has this template's shape.
    #[must_use]
    pub fn matches(&self, concrete: &str) -> bool {
        self.matcher.is_match(&rooted(concrete))
    }

    /// Recovers placeholder values from a concrete path.
    ///
    /// Returns an empty map when the path does not have the template's shape,
    /// or when one placeholder name repeats with two different values.
    #[must_use]
    pub fn extract(&self, concrete: &str) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        if !self.has_placeholders() {
            return values;
        }

        let concrete = rooted(concrete);
        let Some(captures) = self.matcher.captures(&concrete) else {
            return values;
        };

        let names = self.pieces.iter().filter_map(|piece| match piece {
            Piece::Placeholder(name) => Some(name),
            Piece::Literal(_) => None,
        });
        for (name, capture) in names.zip(captures.iter().skip(1)) {
            let Some(capture) = capture else {
                return BTreeMap::new();
            };
            let value = capture.as_str();
            match values.get(name) {
                Some(existing) if existing != value => return BTreeMap::new(),
                Some(_) => {}
                None => {
                    values.insert(name.clone(), value.to_owned());
                }
            }
        }
        values
    }

    /// Fills placeholders with the supplied values.
    ///
    /// Placeholders without a value are left in place and reported through
    /// [`Substitution::unresolved`].
    #[must_use]
    pub fn substitute(&self, values: &BTreeMap<String, String>) -> Substitution {
        let mut path = String::with_capacity(self.raw.len());
        let mut unresolved: Vec<String> = Vec::new();

        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => path.push_str(text),
                Piece::Placeholder(name) => {
                    if let Some(value) = values.get(name) {
                        path.push_str(value);
                    } else {
                        path.push('{');
                        path.push_str(name);
                        path.push('}');
                        if !unresolved.contains(name) {
                            unresolved.push(name.clone());
                        }
                    }
                }
            }
        }

        Substitution { path, unresolved }
    }
}

fn push_literal(pieces: &mut Vec<Piece>, text: &str) -> std::result::Result<(), ()> {
    if text.contains(['{', '}']) {
        return Err(());
    }
    if !text.is_empty() {
        pieces.push(Piece::Literal(text.to_owned()));
    }
    Ok(())
}

fn rooted(path: &str) -> String {
    if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{path}")
    }
}

impl PartialEq for PathTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for PathTemplate {}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for PathTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PathTemplate {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<PathTemplate> for String {
    fn from(value: PathTemplate) -> Self {
        value.raw
    }
}
