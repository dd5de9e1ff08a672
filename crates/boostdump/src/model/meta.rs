//! Model metadata.
//!
//! Task classification and introspection data for a loaded model.

use serde::{Deserialize, Serialize};

use super::OutputTransform;
use crate::Error;

/// Type of prediction task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskKind {
    /// Regression (continuous target).
    #[default]
    Regression,
    /// Binary classification (one logit per row).
    BinaryClassification,
    /// Multi-class classification (one logit per class).
    MulticlassClassification {
        /// Number of classes.
        n_classes: usize,
    },
}

impl TaskKind {
    /// Resolve a task tag and class count.
    ///
    /// Accepts the short tags `regression`, `binary` and `multiclass` as well
    /// as the XGBoost objective names that map onto them. Regression and binary
    /// tasks take `num_classes` 0 or 1; multiclass needs at least 2.
    pub fn from_tag(tag: &str, num_classes: usize) -> Result<Self, Error> {
        let task = match tag {
            "regression" | "reg:squarederror" | "reg:linear" | "reg:absoluteerror"
            | "reg:pseudohubererror" => Self::Regression,
            "binary" | "binary:logistic" | "reg:logistic" => Self::BinaryClassification,
            "multiclass" | "multi:softprob" | "multi:softmax" => {
                Self::MulticlassClassification { n_classes: num_classes }
            }
            _ => return Err(Error::UnsupportedTaskType(tag.to_string())),
        };

        let valid = match task {
            Self::Regression | Self::BinaryClassification => num_classes <= 1,
            Self::MulticlassClassification { n_classes } => n_classes >= 2,
        };
        if !valid {
            return Err(Error::InvalidClassCount {
                task: tag.to_string(),
                num_classes,
            });
        }
        Ok(task)
    }

    /// Returns the number of output groups for this task.
    pub fn n_groups(&self) -> usize {
        match self {
            Self::Regression | Self::BinaryClassification => 1,
            Self::MulticlassClassification { n_classes } => *n_classes,
        }
    }

    /// The transform that turns raw scores into this task's output.
    pub fn output_transform(&self) -> OutputTransform {
        match self {
            Self::Regression => OutputTransform::Identity,
            Self::BinaryClassification => OutputTransform::Sigmoid,
            Self::MulticlassClassification { .. } => OutputTransform::Softmax,
        }
    }

    /// Returns true if this is a classification task.
    pub fn is_classification(&self) -> bool {
        matches!(
            self,
            Self::BinaryClassification | Self::MulticlassClassification { .. }
        )
    }
}

/// Shape and task information of a loaded model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Feature names (optional).
    pub feature_names: Option<Vec<String>>,
    /// Minimum feature vector length the model can evaluate.
    pub n_features: usize,
    /// Number of output groups.
    pub n_groups: usize,
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Task type.
    pub task: TaskKind,
    /// Base scores (one per group).
    pub base_scores: Vec<f32>,
}

impl ModelMeta {
    pub fn new(task: TaskKind, n_features: usize, n_trees: usize) -> Self {
        let n_groups = task.n_groups();
        Self {
            feature_names: None,
            n_features,
            n_groups,
            n_trees,
            task,
            base_scores: vec![0.0; n_groups],
        }
    }

    /// Set feature names.
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }

    /// Set base scores.
    pub fn with_base_scores(mut self, scores: Vec<f32>) -> Self {
        self.base_scores = scores;
        self
    }

    /// Boosting rounds: trees per output group.
    pub fn n_rounds(&self) -> usize {
        self.n_trees / self.n_groups.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("regression", 1, TaskKind::Regression)]
    #[case("reg:squarederror", 0, TaskKind::Regression)]
    #[case("reg:linear", 1, TaskKind::Regression)]
    #[case("binary", 1, TaskKind::BinaryClassification)]
    #[case("binary:logistic", 0, TaskKind::BinaryClassification)]
    #[case("reg:logistic", 1, TaskKind::BinaryClassification)]
    #[case("multiclass", 3, TaskKind::MulticlassClassification { n_classes: 3 })]
    #[case("multi:softprob", 2, TaskKind::MulticlassClassification { n_classes: 2 })]
    #[case("multi:softmax", 10, TaskKind::MulticlassClassification { n_classes: 10 })]
    fn recognized_tags(#[case] tag: &str, #[case] num_classes: usize, #[case] expected: TaskKind) {
        assert_eq!(TaskKind::from_tag(tag, num_classes).unwrap(), expected);
    }

    #[rstest]
    #[case("ranking")]
    #[case("rank:pairwise")]
    #[case("Regression")]
    #[case("")]
    fn unknown_tags_are_unsupported(#[case] tag: &str) {
        let err = TaskKind::from_tag(tag, 1).unwrap_err();
        assert!(matches!(err, Error::UnsupportedTaskType(t) if t == tag));
    }

    #[rstest]
    #[case("regression", 2)]
    #[case("binary", 3)]
    #[case("multiclass", 1)]
    #[case("multiclass", 0)]
    fn class_count_must_fit_the_task(#[case] tag: &str, #[case] num_classes: usize) {
        let err = TaskKind::from_tag(tag, num_classes).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidClassCount { num_classes: n, .. } if n == num_classes
        ));
    }

    #[test]
    fn transform_follows_task() {
        assert_eq!(TaskKind::Regression.output_transform(), OutputTransform::Identity);
        assert_eq!(
            TaskKind::BinaryClassification.output_transform(),
            OutputTransform::Sigmoid
        );
        assert_eq!(
            TaskKind::MulticlassClassification { n_classes: 3 }.output_transform(),
            OutputTransform::Softmax
        );
    }

    #[test]
    fn task_kind_n_groups() {
        assert_eq!(TaskKind::Regression.n_groups(), 1);
        assert_eq!(TaskKind::BinaryClassification.n_groups(), 1);
        assert_eq!(TaskKind::MulticlassClassification { n_classes: 5 }.n_groups(), 5);
        assert!(!TaskKind::Regression.is_classification());
    }

    #[test]
    fn meta_serde_roundtrip() {
        let meta = ModelMeta::new(TaskKind::MulticlassClassification { n_classes: 3 }, 4, 6)
            .with_feature_names(vec!["a".into(), "b".into(), "c".into(), "d".into()]);
        assert_eq!(meta.n_rounds(), 2);
        assert_eq!(meta.base_scores, vec![0.0; 3]);

        let json = serde_json::to_string(&meta).unwrap();
        let restored: ModelMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, meta);
    }
}
