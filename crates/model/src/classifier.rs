use serde::Serialize;

use crate::names::title_case;

/// Per-class probabilities in the model's class order.
/// Class labels are uppercased.
pub type ClassProbabilities = Vec<(String, f64)>;

/// Predicted sex for a first name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Label {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "U")]
    Unisex,
}

impl Label {
    /// Map a model class label onto M/F/U. Unknown classes fall back to `U`.
    pub fn from_class(class: &str) -> Self {
        match class {
            "M" | "MASCULINO" => Self::Male,
            "F" | "FEMININO" => Self::Female,
            _ => Self::Unisex,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Unisex => "U",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label plus the three probabilities it was derived from, rounded to 3 decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    #[serde(rename = "sexo_predito")]
    pub label: Label,
    #[serde(rename = "prob_feminino")]
    pub prob_f: f64,
    #[serde(rename = "prob_masculino")]
    pub prob_m: f64,
    #[serde(rename = "prob_unissex")]
    pub prob_u: f64,
}

impl Prediction {
    fn unisex_default() -> Self {
        Self {
            label: Label::Unisex,
            prob_f: 0.0,
            prob_m: 0.0,
            prob_u: 1.0,
        }
    }
}

/// A first-name sex classifier.
///
/// Implementors only provide raw per-class probabilities; labelling and
/// tie-breaking live in the provided methods so every backend resolves them
/// the same way. Implementations are shared read-only across requests.
pub trait SexClassifier: Send + Sync {
    /// Probabilities for an already title-cased first name.
    fn predict_proba(&self, name: &str) -> ClassProbabilities;

    /// Top-1 class mapped onto M/F/U. Empty input is `U` without consulting the model.
    fn classify(&self, first_name: &str) -> Label {
        if first_name.is_empty() {
            return Label::Unisex;
        }
        let proba = self.predict_proba(&title_case(first_name));
        match top_class(&proba) {
            Some(class) => Label::from_class(class),
            None => Label::Unisex,
        }
    }

    /// Label with probabilities. Ties resolve unisex, then masculine, then feminine.
    fn classify_with_proba(&self, first_name: &str) -> Prediction {
        if first_name.is_empty() {
            return Prediction::unisex_default();
        }
        let proba = self.predict_proba(&title_case(first_name));
        let prob_f = class_prob(&proba, &["F", "FEMININO"]);
        let prob_m = class_prob(&proba, &["M", "MASCULINO"]);
        // Only the long unisex label counts here; a bare `U` class is ignored.
        let prob_u = class_prob(&proba, &["UNISSEX"]);

        let label = if prob_u >= prob_f && prob_u >= prob_m {
            Label::Unisex
        } else if prob_m >= prob_f {
            Label::Male
        } else {
            Label::Female
        };

        Prediction {
            label,
            prob_f: round3(prob_f),
            prob_m: round3(prob_m),
            prob_u: round3(prob_u),
        }
    }
}

/// Class with the highest probability; the first one wins on ties.
fn top_class(proba: &[(String, f64)]) -> Option<&str> {
    let mut best: Option<(&str, f64)> = None;
    for (class, p) in proba {
        match best {
            Some((_, bp)) if *p <= bp => {}
            _ => best = Some((class.as_str(), *p)),
        }
    }
    best.map(|(class, _)| class)
}

/// Probability of the first of `names` with a non-zero value. Absent classes count as 0.
fn class_prob(proba: &[(String, f64)], names: &[&str]) -> f64 {
    let lookup = |name: &str| {
        proba
            .iter()
            .find(|(class, _)| class == name)
            .map(|(_, p)| *p)
            .unwrap_or(0.0)
    };
    names
        .iter()
        .map(|name| lookup(name))
        .find(|p| *p != 0.0)
        .unwrap_or(0.0)
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}
