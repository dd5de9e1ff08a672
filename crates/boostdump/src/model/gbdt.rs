//! GBDT model facade.
//!
//! [`GBDTModel`] owns a validated [`Forest`] plus the task that decides how
//! raw scores are calibrated. It is immutable after construction, so one
//! instance can serve predictions from any number of threads.

use ndarray::{Array2, ArrayView2};
use tracing::{debug, info};

use crate::compat::xgboost::{FeatureMap, XgbDump};
use crate::data::SampleAccessor;
use crate::explainability::{compute_forest_importance, ExplainError, FeatureImportance, ImportanceType};
use crate::inference::gbdt::Predictor;
use crate::model::{ModelConfig, ModelMeta, OutputTransform, Prediction, TaskKind};
use crate::repr::gbdt::{Forest, NodeId};
use crate::utils::run_with_threads;
use crate::{Error, Parallelism, PredictError};

/// A loaded gradient-boosted tree ensemble.
///
/// # Example
///
/// ```
/// use boostdump::model::{GBDTModel, ModelConfig, Prediction};
///
/// let dump = "\
/// booster[0]:
/// 0:[f0<0.5] yes=1,no=2,missing=1
/// \t1:leaf=-0.4
/// \t2:leaf=0.6
/// ";
/// let config = ModelConfig::builder().task("binary:logistic").build().unwrap();
/// let model = GBDTModel::from_dump(dump, &config).unwrap();
///
/// let Prediction::Binary { positive } = model.predict(&[0.9f32]).unwrap() else {
///     unreachable!()
/// };
/// assert!(positive > 0.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GBDTModel {
    forest: Forest,
    meta: ModelMeta,
    n_threads: usize,
}

impl GBDTModel {
    /// Parse a text dump and configure it for the task in `config`.
    ///
    /// Feature names in `config` resolve named split conditions; without
    /// them the dump must use XGBoost's positional `f<N>` names.
    pub fn from_dump(text: &str, config: &ModelConfig) -> Result<Self, Error> {
        let feature_map = match &config.feature_names {
            Some(names) => FeatureMap::from_names(names.iter().cloned())?,
            None => FeatureMap::default(),
        };
        Self::from_dump_with_feature_map(text, &feature_map, config)
    }

    /// Like [`from_dump`](Self::from_dump), with names taken from a
    /// [`FeatureMap`] (for example one read from an `fmap.txt`).
    ///
    /// The map takes precedence over `config.feature_names`.
    pub fn from_dump_with_feature_map(
        text: &str,
        feature_map: &FeatureMap,
        config: &ModelConfig,
    ) -> Result<Self, Error> {
        config.validate()?;
        let task = TaskKind::from_tag(&config.task, config.num_classes)?;
        let n_groups = task.n_groups();
        let base_scores = config.base_scores(n_groups)?;

        let dump = XgbDump::parse(text, feature_map)?;
        debug!(n_trees = dump.n_trees(), n_groups, "building forest");
        let forest = dump
            .into_forest(n_groups as u32)?
            .with_base_score(base_scores.clone())?;

        let feature_names = if feature_map.is_empty() {
            config.feature_names.clone()
        } else {
            Some(feature_map.names().to_vec())
        };
        let n_features = forest
            .n_features_required()
            .max(feature_names.as_ref().map_or(0, Vec::len));

        let mut meta = ModelMeta::new(task, n_features, forest.n_trees()).with_base_scores(base_scores);
        meta.feature_names = feature_names;

        info!(
            task = ?task,
            n_trees = meta.n_trees,
            n_rounds = meta.n_rounds(),
            n_features = meta.n_features,
            "loaded model from text dump"
        );

        Ok(Self {
            forest,
            meta,
            n_threads: config.n_threads,
        })
    }

    /// Get reference to the underlying forest.
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Get reference to model metadata.
    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    pub fn task(&self) -> TaskKind {
        self.meta.task
    }

    pub fn n_trees(&self) -> usize {
        self.forest.n_trees()
    }

    /// Number of output groups.
    pub fn n_groups(&self) -> usize {
        self.meta.n_groups
    }

    /// Minimum feature vector length accepted by prediction.
    pub fn n_features(&self) -> usize {
        self.forest.n_features_required()
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.meta.feature_names.as_deref()
    }

    pub fn output_transform(&self) -> OutputTransform {
        self.meta.task.output_transform()
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Raw per-group scores (before any transform).
    pub fn predict_raw<S: SampleAccessor + ?Sized>(&self, features: &S) -> Result<Vec<f32>, PredictError> {
        self.forest.predict_raw(features)
    }

    /// Calibrated prediction for one feature vector.
    pub fn predict<S: SampleAccessor + ?Sized>(&self, features: &S) -> Result<Prediction, PredictError> {
        let mut scores = self.forest.predict_raw(features)?;
        self.output_transform().apply(&mut scores);

        Ok(match self.meta.task {
            TaskKind::Regression => Prediction::Regression { value: scores[0] },
            TaskKind::BinaryClassification => Prediction::Binary { positive: scores[0] },
            TaskKind::MulticlassClassification { .. } => Prediction::Multiclass { probabilities: scores },
        })
    }

    /// Calibrated predictions for every row, shape `[n_rows, n_groups]`.
    ///
    /// Binary models yield the positive-class probability in column 0.
    pub fn predict_batch(
        &self,
        features: ArrayView2<f32>,
        parallelism: Parallelism,
    ) -> Result<Array2<f32>, PredictError> {
        Predictor::new(&self.forest)
            .with_transform(self.output_transform())
            .predict(features, parallelism)
    }

    /// Raw scores for every row, shape `[n_rows, n_groups]`.
    pub fn predict_batch_raw(
        &self,
        features: ArrayView2<f32>,
        parallelism: Parallelism,
    ) -> Result<Array2<f32>, PredictError> {
        Predictor::new(&self.forest).predict(features, parallelism)
    }

    /// [`predict_batch`](Self::predict_batch) on a pool sized by the
    /// configured `n_threads`.
    pub fn predict_batch_threaded(&self, features: ArrayView2<f32>) -> Result<Array2<f32>, PredictError> {
        run_with_threads(self.n_threads, |parallelism| self.predict_batch(features, parallelism))
    }

    /// Dump id of the leaf each tree routes `features` to, in tree order.
    pub fn predict_leaf<S: SampleAccessor + ?Sized>(&self, features: &S) -> Result<Vec<NodeId>, PredictError> {
        self.forest.predict_leaf(features)
    }

    // =========================================================================
    // Feature Importance
    // =========================================================================

    /// Compute feature importance with a specific importance type.
    ///
    /// # Errors
    ///
    /// Returns `ExplainError::MissingNodeStats` if gain/cover importance
    /// is requested but the dump carried no statistics.
    pub fn feature_importance(&self, importance_type: ImportanceType) -> Result<FeatureImportance, ExplainError> {
        compute_forest_importance(
            &self.forest,
            self.meta.n_features,
            importance_type,
            self.meta.feature_names.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FeatureVector;
    use crate::model::BaseScore;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    const DIABETES: &str = "\
booster[0]:
0:[bmi<0.00956] yes=1,no=2,missing=1
\t1:[bmi<-0.0353] yes=3,no=4,missing=3
\t\t3:[bp<-0.04] yes=7,no=8,missing=7
\t\t\t7:leaf=25.84091
\t\t\t8:leaf=33.0292702
\t\t4:[bp<0.0287] yes=9,no=10,missing=9
\t\t\t9:leaf=38.7487526
\t\t\t10:leaf=51.0882378
\t2:[bmi<0.0735] yes=5,no=6,missing=5
\t\t5:leaf=53.0696678
\t\t6:leaf=69.4000015
booster[1]:
0:[bmi<0.00527] yes=1,no=2,missing=1
\t1:[bp<0.0115] yes=3,no=4,missing=3
\t\t3:leaf=21.6618233
\t\t4:leaf=30.7186508
\t2:[bp<0.0259] yes=5,no=6,missing=5
\t\t5:leaf=43.4056662
\t\t6:leaf=53.6857452
";

    const MULTICLASS: &str = "\
booster[0]:
0:[f0<1] yes=1,no=2,missing=1
\t1:leaf=0.5
\t2:leaf=-0.25
booster[1]:
0:[f1<1] yes=1,no=2,missing=2
\t1:leaf=0.1
\t2:leaf=0.4
booster[2]:
0:leaf=-0.3
booster[3]:
0:leaf=0.2
booster[4]:
0:leaf=0.0
booster[5]:
0:[f0<2] yes=1,no=2,missing=1
\t1:leaf=0.1
\t2:leaf=0.6
";

    fn diabetes() -> GBDTModel {
        let config = ModelConfig::builder()
            .feature_names(["age", "sex", "bmi", "bp"].map(String::from).to_vec())
            .build()
            .unwrap();
        GBDTModel::from_dump(DIABETES, &config).unwrap()
    }

    #[test]
    fn regression_reference_value() {
        let model = diabetes();
        assert_eq!(model.task(), TaskKind::Regression);
        assert_eq!(model.n_trees(), 2);
        assert_eq!(model.n_features(), 4);

        let prediction = model.predict(&[0.038f32, 0.0507, 0.0617, 0.0219]).unwrap();
        let Prediction::Regression { value } = prediction else {
            panic!("expected regression, got {prediction:?}");
        };
        assert_abs_diff_eq!(value, 96.475334, epsilon = 1e-4);
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let model = diabetes();
        let row = [0.038f32, 0.0507, 0.0617, 0.0219];
        let first = model.predict_raw(&row).unwrap();
        for _ in 0..10 {
            assert_eq!(model.predict_raw(&row).unwrap(), first);
        }
    }

    #[test]
    fn missing_values_use_recorded_branch() {
        let model = diabetes();
        // bmi missing -> yes at both roots, bp missing -> yes
        let row = FeatureVector::missing(4);
        let raw = model.predict_raw(&row).unwrap();
        assert_abs_diff_eq!(raw[0], 25.84091 + 21.6618233, epsilon = 1e-4);
        assert_eq!(model.predict_leaf(&row).unwrap(), vec![7, 3]);
    }

    #[test]
    fn short_vector_is_rejected() {
        let model = diabetes();
        let err = model.predict(&[0.038f32, 0.0507, 0.0617]).unwrap_err();
        assert_eq!(err, PredictError::FeatureIndexOutOfRange { required: 4, provided: 3 });
    }

    #[test]
    fn binary_probability() {
        let dump = "booster[0]:\n0:[f0<0.5] yes=1,no=2,missing=1\n1:leaf=-0.4\n2:leaf=0.6\nbooster[1]:\n0:leaf=0.1\n";
        let config = ModelConfig::builder().task("binary").build().unwrap();
        let model = GBDTModel::from_dump(dump, &config).unwrap();

        let prediction = model.predict(&[0.9f32]).unwrap();
        let expected = 1.0 / (1.0 + (-0.7f32).exp());
        assert_abs_diff_eq!(prediction.as_slice()[0], expected, epsilon = 1e-6);
        assert_abs_diff_eq!(prediction.negative().unwrap(), 1.0 - expected, epsilon = 1e-6);
        assert_eq!(prediction.class(), Some(1));
    }

    #[test]
    fn multiclass_groups_trees_by_round() {
        let config = ModelConfig::builder().task("multi:softprob").num_classes(3).build().unwrap();
        let model = GBDTModel::from_dump(MULTICLASS, &config).unwrap();
        assert_eq!(model.forest().n_rounds(), 2);

        let raw = model.predict_raw(&[0.0f32, 0.0]).unwrap();
        assert_abs_diff_eq!(raw[0], 0.7, epsilon = 1e-6);
        assert_abs_diff_eq!(raw[1], 0.1, epsilon = 1e-6);
        assert_abs_diff_eq!(raw[2], -0.2, epsilon = 1e-6);

        let prediction = model.predict(&[0.0f32, 0.0]).unwrap();
        let Prediction::Multiclass { probabilities } = &prediction else {
            panic!("expected multiclass, got {prediction:?}");
        };
        assert_abs_diff_eq!(probabilities.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
        assert_eq!(prediction.class(), Some(0));
    }

    #[test]
    fn multiclass_tree_count_must_fill_rounds() {
        let config = ModelConfig::builder().task("multiclass").num_classes(4).build().unwrap();
        let err = GBDTModel::from_dump(MULTICLASS, &config).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedModel(crate::compat::xgboost::MalformedModelError::InvalidForest(
                crate::repr::gbdt::ForestError::TreeCountMismatch { n_trees: 6, .. }
            ))
        ));
    }

    #[test]
    fn base_score_shifts_every_group() {
        let config = ModelConfig::builder()
            .task("multiclass")
            .num_classes(3)
            .base_score(BaseScore::PerGroup(vec![1.0, 2.0, 3.0]))
            .build()
            .unwrap();
        let model = GBDTModel::from_dump(MULTICLASS, &config).unwrap();
        let raw = model.predict_raw(&[0.0f32, 0.0]).unwrap();
        assert_abs_diff_eq!(raw[0], 1.7, epsilon = 1e-6);
        assert_abs_diff_eq!(raw[1], 2.1, epsilon = 1e-6);
        assert_abs_diff_eq!(raw[2], 2.8, epsilon = 1e-6);
        assert_eq!(model.meta().base_scores, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn config_errors_surface() {
        let config = ModelConfig::builder().task("rank:pairwise").build().unwrap();
        assert!(matches!(
            GBDTModel::from_dump(DIABETES, &config),
            Err(Error::UnsupportedTaskType(_))
        ));

        let config = ModelConfig::builder()
            .task("regression")
            .base_score(BaseScore::PerGroup(vec![0.0, 0.0]))
            .build()
            .unwrap();
        assert!(matches!(GBDTModel::from_dump(DIABETES, &config), Err(Error::Config(_))));

        // Named splits without names.
        let config = ModelConfig::default();
        assert!(matches!(
            GBDTModel::from_dump(DIABETES, &config),
            Err(Error::MalformedModel(_))
        ));
    }

    #[test]
    fn batch_matches_single_row() {
        let config = ModelConfig::builder().task("multiclass").num_classes(3).n_threads(2).build().unwrap();
        let model = GBDTModel::from_dump(MULTICLASS, &config).unwrap();
        let features = array![[0.0f32, 0.0], [1.5, 2.0], [f32::NAN, f32::NAN], [3.0, 0.5]];

        let batch = model.predict_batch(features.view(), Parallelism::Parallel).unwrap();
        let threaded = model.predict_batch_threaded(features.view()).unwrap();
        assert_eq!(batch, threaded);

        for (row, out) in features.rows().into_iter().zip(batch.rows()) {
            let single = model.predict(&row).unwrap();
            assert_eq!(out.to_vec(), single.as_slice());
        }

        let raw = model.predict_batch_raw(features.view(), Parallelism::Sequential).unwrap();
        assert_eq!(raw.row(0).to_vec(), model.predict_raw(&features.row(0)).unwrap());
    }

    #[test]
    fn leaf_ids_follow_dump_ids() {
        let model = diabetes();
        let leaves = model.predict_leaf(&[0.038f32, 0.0507, 0.0617, 0.0219]).unwrap();
        assert_eq!(leaves, vec![5, 5]);
    }

    #[test]
    fn importance_uses_feature_names() {
        let model = diabetes();
        let imp = model.feature_importance(ImportanceType::Split).unwrap();
        assert_eq!(imp.values(), &[0.0, 0.0, 4.0, 4.0]);
        assert_eq!(
            imp.to_named(),
            vec![("bmi".to_string(), 4.0), ("bp".to_string(), 4.0)]
        );
        assert!(matches!(
            model.feature_importance(ImportanceType::Gain),
            Err(ExplainError::MissingNodeStats("gain"))
        ));
    }

    #[test]
    fn model_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GBDTModel>();
        assert_send_sync::<Forest>();
    }
}
