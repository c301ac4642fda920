//! Model artifact adapter.
//!
//! An artifact is a JSON array whose first two elements are the trained
//! estimator and the vectorizer it was fitted with:
//!
//! ```json
//! [
//!   {"kind": "multinomial_nb", "classes": ["F", "M", "UNISSEX"],
//!    "class_log_prior": [...], "feature_log_prob": [[...], [...], [...]]},
//!   {"analyzer": "char_wb", "ngram_range": [2, 4], "vocabulary": {" ma": 0, ...}}
//! ]
//! ```
//!
//! Loading validates shape and capabilities up front so a bad artifact stops
//! the process at startup instead of failing on the first request.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::classifier::{ClassProbabilities, SexClassifier};
use crate::error::ModelError;
use crate::vectorizer::{SparseVector, Vectorizer};

/// Trained estimator, tagged by `kind` in the artifact.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    MultinomialNb {
        classes: Vec<String>,
        class_log_prior: Vec<f64>,
        feature_log_prob: Vec<Vec<f64>>,
    },
    LogisticRegression {
        classes: Vec<String>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
}

impl Estimator {
    /// Fields each kind needs to produce class probabilities.
    fn required_fields(kind: &str) -> Option<&'static [&'static str]> {
        match kind {
            "multinomial_nb" => Some(&["class_log_prior", "feature_log_prob"]),
            "logistic_regression" => Some(&["coef", "intercept"]),
            _ => None,
        }
    }

    pub fn classes(&self) -> &[String] {
        match self {
            Self::MultinomialNb { classes, .. } | Self::LogisticRegression { classes, .. } => classes,
        }
    }

    /// Number of input features the estimator was fitted on.
    fn n_features(&self) -> usize {
        match self {
            Self::MultinomialNb { feature_log_prob, .. } => feature_log_prob.first().map_or(0, Vec::len),
            Self::LogisticRegression { coef, .. } => coef.first().map_or(0, Vec::len),
        }
    }

    fn validate(&self) -> Result<(), String> {
        let n_classes = self.classes().len();
        if n_classes == 0 {
            return Err("model has no classes".into());
        }
        let n_features = self.n_features();
        match self {
            Self::MultinomialNb { class_log_prior, feature_log_prob, .. } => {
                if class_log_prior.len() != n_classes {
                    return Err(format!(
                        "class_log_prior has {} entries for {n_classes} classes",
                        class_log_prior.len()
                    ));
                }
                if feature_log_prob.len() != n_classes {
                    return Err(format!(
                        "feature_log_prob has {} rows for {n_classes} classes",
                        feature_log_prob.len()
                    ));
                }
                if feature_log_prob.iter().any(|row| row.len() != n_features) {
                    return Err("feature_log_prob rows differ in width".into());
                }
            }
            Self::LogisticRegression { coef, intercept, .. } => {
                let binary = coef.len() == 1 && n_classes == 2;
                if !binary && coef.len() != n_classes {
                    return Err(format!("coef has {} rows for {n_classes} classes", coef.len()));
                }
                if intercept.len() != coef.len() {
                    return Err(format!(
                        "intercept has {} entries for {} coef rows",
                        intercept.len(),
                        coef.len()
                    ));
                }
                if coef.iter().any(|row| row.len() != n_features) {
                    return Err("coef rows differ in width".into());
                }
            }
        }
        Ok(())
    }

    /// Class probabilities for one feature vector, in class order.
    pub fn predict_proba(&self, x: &SparseVector) -> Vec<f64> {
        match self {
            Self::MultinomialNb { class_log_prior, feature_log_prob, .. } => {
                let jll: Vec<f64> = class_log_prior
                    .iter()
                    .zip(feature_log_prob)
                    .map(|(prior, row)| prior + dot(row, x))
                    .collect();
                softmax(&jll)
            }
            Self::LogisticRegression { coef, intercept, .. } => {
                let scores: Vec<f64> = coef
                    .iter()
                    .zip(intercept)
                    .map(|(row, b)| dot(row, x) + b)
                    .collect();
                if scores.len() == 1 {
                    let p = 1.0 / (1.0 + (-scores[0]).exp());
                    vec![1.0 - p, p]
                } else {
                    softmax(&scores)
                }
            }
        }
    }
}

fn dot(weights: &[f64], x: &SparseVector) -> f64 {
    x.iter()
        .filter_map(|(col, v)| weights.get(*col).map(|w| w * v))
        .sum()
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// `SexClassifier` backed by a loaded model artifact.
#[derive(Debug, Clone)]
pub struct ArtifactClassifier {
    estimator: Estimator,
    vectorizer: Vectorizer,
    classes: Vec<String>,
}

impl ArtifactClassifier {
    /// Load and validate an artifact file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|e| ModelError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let classifier = Self::from_json_str(&content)?;
        tracing::info!(
            path = %path.display(),
            classes = ?classifier.classes,
            vocabulary = classifier.vectorizer.vocabulary.len(),
            "loaded model artifact"
        );
        Ok(classifier)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let value: Value = serde_json::from_str(json).map_err(|e| ModelError::Parse(e.to_string()))?;
        Self::from_value(value)
    }

    /// Validate the pair structure and capabilities, then build the classifier.
    pub fn from_value(value: Value) -> Result<Self, ModelError> {
        let Value::Array(mut parts) = value else {
            return Err(ModelError::Type("expected artifact as a (model, vectorizer) pair".into()));
        };
        if parts.len() < 2 {
            return Err(ModelError::Type("expected artifact as a (model, vectorizer) pair".into()));
        }
        let vectorizer = parts.swap_remove(1);
        let model = parts.swap_remove(0);

        check_model_capabilities(&model)?;
        check_vectorizer_capabilities(&vectorizer)?;

        let estimator: Estimator =
            serde_json::from_value(model).map_err(|e| ModelError::Type(format!("model: {e}")))?;
        let vectorizer: Vectorizer =
            serde_json::from_value(vectorizer).map_err(|e| ModelError::Type(format!("vectorizer: {e}")))?;

        estimator.validate().map_err(ModelError::Type)?;
        vectorizer.validate().map_err(ModelError::Type)?;
        if vectorizer.min_features() > estimator.n_features() {
            return Err(ModelError::Type(format!(
                "vectorizer produces {} features but model expects {}",
                vectorizer.min_features(),
                estimator.n_features()
            )));
        }

        let classes = estimator.classes().iter().map(|c| c.to_uppercase()).collect();
        Ok(Self { estimator, vectorizer, classes })
    }

    /// Uppercased class labels in model order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

fn check_model_capabilities(model: &Value) -> Result<(), ModelError> {
    let Some(obj) = model.as_object() else {
        return Err(ModelError::Type("model must be an object".into()));
    };
    let Some(kind) = obj.get("kind").and_then(Value::as_str) else {
        return Err(ModelError::Type("model must declare `kind`".into()));
    };
    let Some(required) = Estimator::required_fields(kind) else {
        return Err(ModelError::Type(format!("unsupported model kind '{kind}'")));
    };
    if !obj.contains_key("classes") {
        return Err(ModelError::Type("model must provide `classes`".into()));
    }
    for field in required {
        if !obj.contains_key(*field) {
            return Err(ModelError::Type(format!("model must provide `{field}`")));
        }
    }
    Ok(())
}

fn check_vectorizer_capabilities(vectorizer: &Value) -> Result<(), ModelError> {
    match vectorizer.as_object() {
        Some(obj) if obj.contains_key("vocabulary") => Ok(()),
        Some(_) => Err(ModelError::Type("vectorizer must provide `vocabulary`".into())),
        None => Err(ModelError::Type("vectorizer must be an object".into())),
    }
}

impl SexClassifier for ArtifactClassifier {
    fn predict_proba(&self, name: &str) -> ClassProbabilities {
        let x = self.vectorizer.transform(name);
        self.classes
            .iter()
            .cloned()
            .zip(self.estimator.predict_proba(&x))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nb_artifact() -> Value {
        json!([
            {
                "kind": "multinomial_nb",
                "classes": ["F", "M"],
                "class_log_prior": [0.0, 0.0],
                "feature_log_prob": [[0.0, -2.0], [-2.0, 0.0]]
            },
            {"analyzer": "word", "vocabulary": {"maria": 0, "joão": 1}}
        ])
    }

    #[test]
    fn not_a_pair() {
        let err = ArtifactClassifier::from_value(json!({"kind": "multinomial_nb"})).unwrap_err();
        assert!(matches!(err, ModelError::Type(_)));
        let err = ArtifactClassifier::from_value(json!([{}])).unwrap_err();
        assert!(matches!(err, ModelError::Type(_)));
    }

    #[test]
    fn model_without_probabilities() {
        let err = ArtifactClassifier::from_value(json!([
            {"kind": "multinomial_nb", "classes": ["F", "M"], "class_log_prior": [0.0, 0.0]},
            {"vocabulary": {}}
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "invalid model artifact: model must provide `feature_log_prob`");
    }

    #[test]
    fn model_without_classes() {
        let err = ArtifactClassifier::from_value(json!([
            {"kind": "logistic_regression", "coef": [[1.0]], "intercept": [0.0]},
            {"vocabulary": {"a": 0}}
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "invalid model artifact: model must provide `classes`");
    }

    #[test]
    fn vectorizer_without_transform() {
        let mut artifact = nb_artifact();
        artifact[1] = json!({"analyzer": "word"});
        let err = ArtifactClassifier::from_value(artifact).unwrap_err();
        assert_eq!(err.to_string(), "invalid model artifact: vectorizer must provide `vocabulary`");
    }

    #[test]
    fn vocabulary_wider_than_model() {
        let mut artifact = nb_artifact();
        artifact[1]["vocabulary"]["ana"] = json!(5);
        let err = ArtifactClassifier::from_value(artifact).unwrap_err();
        assert!(matches!(err, ModelError::Type(_)));
    }

    #[test]
    fn unknown_kind() {
        let err = ArtifactClassifier::from_value(json!([
            {"kind": "random_forest", "classes": ["F"]},
            {"vocabulary": {}}
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "invalid model artifact: unsupported model kind 'random_forest'");
    }

    #[test]
    fn nb_probabilities_sum_to_one() {
        let clf = ArtifactClassifier::from_value(nb_artifact()).unwrap();
        let proba = clf.predict_proba("Maria");
        assert_eq!(proba[0].0, "F");
        let total: f64 = proba.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!(proba[0].1 > proba[1].1);
    }

    #[test]
    fn nb_unknown_name_follows_prior() {
        let clf = ArtifactClassifier::from_value(nb_artifact()).unwrap();
        let proba = clf.predict_proba("Zoe");
        assert!((proba[0].1 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn binary_logistic_regression() {
        let clf = ArtifactClassifier::from_value(json!([
            {"kind": "logistic_regression", "classes": ["f", "m"], "coef": [[-3.0, 3.0]], "intercept": [0.0]},
            {"analyzer": "word", "vocabulary": {"maria": 0, "joão": 1}}
        ]))
        .unwrap();
        assert_eq!(clf.classes(), ["F", "M"]);
        assert_eq!(clf.classify("joão"), crate::Label::Male);
        assert_eq!(clf.classify("maria"), crate::Label::Female);
    }

    #[test]
    fn softmax_is_stable_for_large_scores() {
        let p = softmax(&[1000.0, 1000.0]);
        assert_eq!(p, vec![0.5, 0.5]);
    }
}
