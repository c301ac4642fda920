use serde::Serialize;

// ---------------------------------------------------------------------------
// Declared sex
// ---------------------------------------------------------------------------

/// Canonical declared sex, after normalization of the free-text input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeclaredSex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

// ---------------------------------------------------------------------------
// Reconciliation output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    /// Declared value matches the prediction.
    #[serde(rename = "CERTO")]
    Certo,
    /// Declared value is missing or disagrees with the prediction.
    #[serde(rename = "CORRIGIR")]
    Corrigir,
    /// The prediction itself is unisex; a person has to check.
    #[serde(rename = "VALIDAR")]
    Validar,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Certo, Status::Corrigir, Status::Validar];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Certo => "CERTO",
            Self::Corrigir => "CORRIGIR",
            Self::Validar => "VALIDAR",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value written to the "Sexo Validado" column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValidatedSex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "UNISSEX")]
    Unisex,
}

impl ValidatedSex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Unisex => "UNISSEX",
        }
    }
}

impl std::fmt::Display for ValidatedSex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reconciled {
    pub validated: ValidatedSex,
    pub status: Status,
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub total: usize,
    pub certo: usize,
    pub corrigir: usize,
    pub validar: usize,
}

impl ReconSummary {
    pub fn record(&mut self, status: Status) {
        self.total += 1;
        match status {
            Status::Certo => self.certo += 1,
            Status::Corrigir => self.corrigir += 1,
            Status::Validar => self.validar += 1,
        }
    }

    pub fn count(&self, status: Status) -> usize {
        match status {
            Status::Certo => self.certo,
            Status::Corrigir => self.corrigir,
            Status::Validar => self.validar,
        }
    }
}

impl FromIterator<Status> for ReconSummary {
    fn from_iter<I: IntoIterator<Item = Status>>(iter: I) -> Self {
        let mut summary = Self::default();
        for status in iter {
            summary.record(status);
        }
        summary
    }
}
