//! Deterministic cache key construction.
//!
//! Positional parts keep their call order, named arguments are sorted by name,
//! and every component is escaped so two different queries can never encode to
//! the same string.

use std::fmt::Display;

const PART_SEPARATOR: char = ':';
const ARG_SEPARATOR: char = '=';
const ESCAPE: char = '\\';

/// Builder for cache keys.
///
/// ```
/// use ksi_stats::data_fetcher::cache::CacheKey;
///
/// let a = CacheKey::new("t").arg("x", 1).arg("y", 2).build();
/// let b = CacheKey::new("t").arg("y", 2).arg("x", 1).build();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CacheKey {
    parts: Vec<String>,
    args: Vec<(String, String)>,
}

impl CacheKey {
    pub fn new(prefix: impl Display) -> Self {
        Self {
            parts: vec![prefix.to_string()],
            args: Vec::new(),
        }
    }

    /// Appends a positional component.
    pub fn part(mut self, part: impl Display) -> Self {
        self.parts.push(part.to_string());
        self
    }

    /// Adds a named component. Order of `arg` calls doesn't matter.
    pub fn arg(mut self, name: impl Display, value: impl Display) -> Self {
        self.args.push((name.to_string(), value.to_string()));
        self
    }

    pub fn build(self) -> String {
        build_key(&self.parts, &self.args)
    }
}

/// Joins positional parts and sorted named arguments into one key.
pub fn build_key<P, N, V>(parts: &[P], args: &[(N, V)]) -> String
where
    P: AsRef<str>,
    N: AsRef<str>,
    V: AsRef<str>,
{
    let mut sorted: Vec<(&str, &str)> = args
        .iter()
        .map(|(n, v)| (n.as_ref(), v.as_ref()))
        .collect();
    sorted.sort_unstable();

    let mut key = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            key.push(PART_SEPARATOR);
        }
        push_escaped(&mut key, part.as_ref());
    }
    for (name, value) in sorted {
        if !key.is_empty() || !parts.is_empty() {
            key.push(PART_SEPARATOR);
        }
        push_escaped(&mut key, name);
        key.push(ARG_SEPARATOR);
        push_escaped(&mut key, value);
    }
    key
}

fn push_escaped(out: &mut String, component: &str) {
    for c in component.chars() {
        if c == PART_SEPARATOR || c == ARG_SEPARATOR || c == ESCAPE {
            out.push(ESCAPE);
        }
        out.push(c);
    }
}
