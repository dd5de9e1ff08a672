//! XGBoost text dump parser.
//!
//! Parses the output of `Booster.dump_model()` / `get_dump()`:
//!
//! ```text
//! booster[0]:
//! 0:[bmi<0.00956] yes=1,no=2,missing=1
//! 	1:leaf=25.84091
//! 	2:leaf=53.0696678
//! booster[1]:
//! 0:leaf=-1.5
//! ```
//!
//! Each `booster[N]:` header opens a tree. Node lines are either
//! `<id>:[<feature><<threshold>] yes=<id>,no=<id>,missing=<id>` or
//! `<id>:leaf=<value>`, optionally followed by `,gain=<f>,cover=<f>` when the
//! model was dumped with statistics. Indentation is cosmetic: structure comes
//! from the node ids alone.

use tracing::debug;

use crate::repr::gbdt::{Forest, ForestError, Node, NodeId, Split, Tree, TreeBuilder, TreeValidationError};

use super::fmap::FeatureMap;

// =============================================================================
// Error types
// =============================================================================

/// Error type for dump parsing. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedModelError {
    #[error("line {line}: node line appears before any booster header")]
    MissingBoosterHeader { line: usize },
    #[error("line {line}: invalid booster header `{text}`")]
    InvalidBoosterHeader { line: usize, text: String },
    #[error("line {line}: expected booster[{expected}], found booster[{found}]")]
    BoosterIndexMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: cannot decode node `{text}`: {reason}")]
    InvalidNode {
        line: usize,
        text: String,
        reason: &'static str,
    },
    #[error("line {line}: unsupported comparison `{op}`, only `<` is supported")]
    UnsupportedComparison { line: usize, op: String },
    #[error("line {line}: unknown feature `{name}`")]
    UnknownFeature { line: usize, name: String },
    #[error("booster {booster}: {source}")]
    InvalidTree {
        booster: usize,
        #[source]
        source: TreeValidationError,
    },
    #[error("dump contains no boosters")]
    NoBoosters,
    #[error(transparent)]
    InvalidForest(#[from] ForestError),
}

// =============================================================================
// Parsed dump
// =============================================================================

/// A parsed XGBoost text dump: validated trees in file order.
#[derive(Debug, Clone)]
pub struct XgbDump {
    trees: Vec<Tree>,
}

impl XgbDump {
    /// Parse a dump, resolving feature names through `feature_map`.
    ///
    /// Either every tree parses and validates, or an error is returned; no
    /// partial result is observable.
    pub fn parse(content: &str, feature_map: &FeatureMap) -> Result<Self, MalformedModelError> {
        let mut trees = Vec::new();
        // Booster currently being filled: (index, builder)
        let mut current: Option<(usize, TreeBuilder)> = None;

        for (line_idx, raw) in content.lines().enumerate() {
            let line_no = line_idx + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with("booster") {
                let found = parse_header(line, line_no)?;
                let expected = trees.len() + usize::from(current.is_some());
                if found != expected {
                    return Err(MalformedModelError::BoosterIndexMismatch {
                        line: line_no,
                        expected,
                        found,
                    });
                }
                if let Some((booster, builder)) = current.take() {
                    trees.push(freeze(booster, builder)?);
                }
                current = Some((found, TreeBuilder::new()));
                continue;
            }

            let Some((booster, builder)) = current.as_mut() else {
                return Err(MalformedModelError::MissingBoosterHeader { line: line_no });
            };
            let node = parse_node(line, line_no, feature_map)?;
            builder
                .push(node)
                .map_err(|source| MalformedModelError::InvalidTree {
                    booster: *booster,
                    source,
                })?;
        }

        if let Some((booster, builder)) = current.take() {
            trees.push(freeze(booster, builder)?);
        }
        if trees.is_empty() {
            return Err(MalformedModelError::NoBoosters);
        }

        debug!(n_trees = trees.len(), "parsed xgboost dump");
        Ok(Self { trees })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Group trees round by round into a forest with `n_groups` outputs.
    pub fn into_forest(self, n_groups: u32) -> Result<Forest, MalformedModelError> {
        Ok(Forest::from_trees(self.trees, n_groups)?)
    }
}

/// Parse a dump straight into a forest with `n_groups` output groups.
pub fn parse_dump(
    content: &str,
    feature_map: &FeatureMap,
    n_groups: u32,
) -> Result<Forest, MalformedModelError> {
    XgbDump::parse(content, feature_map)?.into_forest(n_groups)
}

// =============================================================================
// Parsing helpers
// =============================================================================

fn freeze(booster: usize, builder: TreeBuilder) -> Result<Tree, MalformedModelError> {
    builder
        .freeze()
        .map_err(|source| MalformedModelError::InvalidTree { booster, source })
}

/// Parse `booster[N]:` and return `N`.
fn parse_header(line: &str, line_no: usize) -> Result<usize, MalformedModelError> {
    line.strip_prefix("booster[")
        .and_then(|rest| rest.strip_suffix("]:"))
        .and_then(|idx| idx.parse().ok())
        .ok_or_else(|| MalformedModelError::InvalidBoosterHeader {
            line: line_no,
            text: line.to_string(),
        })
}

fn parse_node(line: &str, line_no: usize, feature_map: &FeatureMap) -> Result<Node, MalformedModelError> {
    let invalid = |reason: &'static str| MalformedModelError::InvalidNode {
        line: line_no,
        text: line.to_string(),
        reason,
    };

    let (id, body) = line.split_once(':').ok_or_else(|| invalid("missing `<id>:` prefix"))?;
    let id: NodeId = id.trim().parse().map_err(|_| invalid("invalid node id"))?;
    let body = body.trim();

    if let Some(attrs) = body.strip_prefix("leaf=") {
        let mut fields = attrs.split(',');
        let value = fields
            .next()
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| invalid("invalid leaf value"))?;

        let mut node = Node::leaf(id, value);
        for field in fields {
            match parse_attr(field).ok_or_else(|| invalid("malformed attribute"))? {
                ("cover", v) => node = node.with_cover(parse_f32(v).ok_or_else(|| invalid("invalid cover"))?),
                _ => return Err(invalid("unexpected leaf attribute")),
            }
        }
        return Ok(node);
    }

    let (condition, attrs) = body
        .strip_prefix('[')
        .and_then(|rest| rest.split_once(']'))
        .ok_or_else(|| invalid("expected `leaf=` or `[condition]`"))?;

    let (feature_name, threshold) = parse_condition(condition).map_err(|e| match e {
        ConditionError::Comparison(op) => MalformedModelError::UnsupportedComparison { line: line_no, op },
        ConditionError::Malformed => invalid("malformed split condition"),
    })?;

    let feature = feature_map
        .resolve(feature_name)
        .ok_or_else(|| MalformedModelError::UnknownFeature {
            line: line_no,
            name: feature_name.to_string(),
        })?;
    let threshold = parse_f32(threshold).ok_or_else(|| invalid("invalid threshold"))?;

    let mut yes = None;
    let mut no = None;
    let mut missing = None;
    let mut gain = None;
    let mut cover = None;

    for field in attrs.trim().split(',') {
        let (key, value) = parse_attr(field).ok_or_else(|| invalid("malformed attribute"))?;
        let slot_is_set = match key {
            "yes" => yes.replace(parse_id(value).ok_or_else(|| invalid("invalid yes id"))?).is_some(),
            "no" => no.replace(parse_id(value).ok_or_else(|| invalid("invalid no id"))?).is_some(),
            "missing" => missing
                .replace(parse_id(value).ok_or_else(|| invalid("invalid missing id"))?)
                .is_some(),
            "gain" => gain.replace(parse_f32(value).ok_or_else(|| invalid("invalid gain"))?).is_some(),
            "cover" => cover.replace(parse_f32(value).ok_or_else(|| invalid("invalid cover"))?).is_some(),
            _ => return Err(invalid("unexpected split attribute")),
        };
        if slot_is_set {
            return Err(invalid("repeated attribute"));
        }
    }

    let split = Split {
        feature,
        threshold,
        yes: yes.ok_or_else(|| invalid("missing `yes=`"))?,
        no: no.ok_or_else(|| invalid("missing `no=`"))?,
        missing: missing.ok_or_else(|| invalid("missing `missing=`"))?,
    };

    let mut node = Node::internal(id, split);
    node.gain = gain;
    node.cover = cover;
    Ok(node)
}

enum ConditionError {
    Comparison(String),
    Malformed,
}

/// Split `<feature><<threshold>` into its feature name and threshold text.
fn parse_condition(condition: &str) -> Result<(&str, &str), ConditionError> {
    match condition.find('<') {
        Some(pos) => {
            let (name, rest) = condition.split_at(pos);
            let threshold = &rest[1..];
            if threshold.starts_with('=') {
                return Err(ConditionError::Comparison("<=".to_string()));
            }
            if name.is_empty() || threshold.is_empty() {
                return Err(ConditionError::Malformed);
            }
            Ok((name, threshold))
        }
        None => {
            for op in [">=", ">", "!=", "=="] {
                if condition.contains(op) {
                    return Err(ConditionError::Comparison(op.to_string()));
                }
            }
            // Indicator splits (`[f3]`) carry no threshold.
            Err(ConditionError::Malformed)
        }
    }
}

fn parse_attr(field: &str) -> Option<(&str, &str)> {
    let (key, value) = field.trim().split_once('=')?;
    Some((key.trim(), value.trim()))
}

fn parse_id(s: &str) -> Option<NodeId> {
    s.parse().ok()
}

fn parse_f32(s: &str) -> Option<f32> {
    s.parse::<f32>().ok().filter(|v| !v.is_nan())
}

// =============================================================================
// Tests
// =============================================================================
