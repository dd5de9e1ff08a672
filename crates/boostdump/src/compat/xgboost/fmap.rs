//! Feature name to index mapping.
//!
//! XGBoost writes split features by name. Without names the trainer uses
//! `f0`, `f1`, ...; with names it uses whatever the training frame carried.
//! A [`FeatureMap`] resolves either form to the index of the feature in the
//! prediction vector.
//!
//! The map can be built from an ordered name list or from XGBoost's
//! `fmap.txt` format: one `<index>\t<name>\t<type>` entry per line, with type
//! `q` (quantitative), `i` (indicator), `int` or `float`.

use std::collections::HashMap;
use std::str::FromStr;

/// Error type for feature map construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureMapError {
    #[error("fmap line {line}: expected `<index>\\t<name>\\t<type>`")]
    InvalidLine { line: usize },
    #[error("fmap line {line}: expected index {expected}, found {found}")]
    IndexOutOfOrder {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("fmap line {line}: unsupported feature type `{kind}`")]
    UnsupportedType { line: usize, kind: String },
    #[error("duplicate feature name `{0}`")]
    DuplicateName(String),
}

/// Feature type tag from an fmap file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeatureKind {
    #[default]
    Quantitative,
    Indicator,
    Integer,
    Float,
}

impl FromStr for FeatureKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "q" => Ok(Self::Quantitative),
            "i" => Ok(Self::Indicator),
            "int" => Ok(Self::Integer),
            "float" => Ok(Self::Float),
            _ => Err(()),
        }
    }
}

/// Resolves dump feature names to vector indices.
///
/// An empty map (the default) resolves XGBoost's positional names `f<N>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMap {
    names: Vec<String>,
    kinds: Vec<FeatureKind>,
    index: HashMap<String, u32>,
}

impl FeatureMap {
    /// Map `names[i]` to index `i`.
    pub fn from_names<I, S>(names: I) -> Result<Self, FeatureMapError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = Self::default();
        for name in names {
            map.insert(name.into(), FeatureKind::default())?;
        }
        Ok(map)
    }

    /// Parse XGBoost's `fmap.txt` format.
    pub fn from_fmap(content: &str) -> Result<Self, FeatureMapError> {
        let mut map = Self::default();

        for (line_idx, line) in content.lines().enumerate() {
            let line_no = line_idx + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();
            let (Some(idx), Some(name), Some(kind), None) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            else {
                return Err(FeatureMapError::InvalidLine { line: line_no });
            };

            let idx: usize = idx
                .parse()
                .map_err(|_| FeatureMapError::InvalidLine { line: line_no })?;
            if idx != map.len() {
                return Err(FeatureMapError::IndexOutOfOrder {
                    line: line_no,
                    expected: map.len(),
                    found: idx,
                });
            }

            let kind = kind.parse().map_err(|_| FeatureMapError::UnsupportedType {
                line: line_no,
                kind: kind.to_string(),
            })?;
            map.insert(name.to_string(), kind)?;
        }

        Ok(map)
    }

    fn insert(&mut self, name: String, kind: FeatureKind) -> Result<(), FeatureMapError> {
        if self.index.contains_key(&name) {
            return Err(FeatureMapError::DuplicateName(name));
        }
        self.index.insert(name.clone(), self.names.len() as u32);
        self.names.push(name);
        self.kinds.push(kind);
        Ok(())
    }

    /// Resolve a dump feature name to its index.
    pub fn resolve(&self, name: &str) -> Option<u32> {
        if self.names.is_empty() {
            return name.strip_prefix('f').and_then(parse_positional);
        }
        self.index.get(name).copied()
    }

    /// Name of feature `index`, if the map is named.
    pub fn name(&self, index: u32) -> Option<&str> {
        self.names.get(index as usize).map(String::as_str)
    }

    pub fn kind(&self, index: u32) -> Option<FeatureKind> {
        self.kinds.get(index as usize).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Canonical decimal index: digits only, no leading zero.
fn parse_positional(digits: &str) -> Option<u32> {
    let canonical = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'));
    if canonical { digits.parse().ok() } else { None }
}
