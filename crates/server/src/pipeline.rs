//! Upload → annotated workbook.
//!
//! Reads the uploaded bytes, predicts a label per row from the first name,
//! reconciles it with the declared `Sexo` and writes `Sexo Validado` and
//! `Status` back before exporting to XLSX.

use validasexo_io::{import_table, xlsx, Cell, SourceFormat, Table};
use validasexo_model::{first_name, SexClassifier};
use validasexo_recon::{normalize_declared, reconcile, ReconSummary};

use crate::schema::{Schema, SchemaError, COL_SEXO_VALIDADO, COL_STATUS};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// No reader accepted the file.
    #[error("formato de arquivo não reconhecido: {0}")]
    Read(String),
    #[error(transparent)]
    Input(#[from] SchemaError),
    #[error("falha ao gerar a planilha: {0}")]
    Write(String),
}

impl PipelineError {
    /// Whether the caller sent something unusable, as opposed to an export failure.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Read(_) | Self::Input(_))
    }
}

/// Result of a processed upload.
#[derive(Debug)]
pub struct Processed {
    pub xlsx: Vec<u8>,
    pub source: SourceFormat,
    pub summary: ReconSummary,
}

pub fn process_file(bytes: &[u8], classifier: &dyn SexClassifier) -> Result<Processed, PipelineError> {
    let (mut table, source) = import_table(bytes).map_err(PipelineError::Read)?;
    let summary = annotate(&mut table, classifier)?;
    let xlsx = xlsx::export_to_bytes(&table).map_err(PipelineError::Write)?;

    tracing::info!(
        %source,
        rows = summary.total,
        certo = summary.certo,
        corrigir = summary.corrigir,
        validar = summary.validar,
        "processed upload"
    );

    Ok(Processed { xlsx, source, summary })
}

/// Add `Sexo Validado` and `Status` to every row of `table`.
///
/// Existing columns with those names are overwritten in place, so annotating
/// an already annotated table yields the same values.
pub fn annotate(table: &mut Table, classifier: &dyn SexClassifier) -> Result<ReconSummary, PipelineError> {
    let schema = Schema::resolve(table)?;

    let mut validated = Vec::with_capacity(table.row_count());
    let mut statuses = Vec::with_capacity(table.row_count());
    let mut summary = ReconSummary::default();

    for row in 0..table.row_count() {
        let record = schema.record(table, row);
        let predicted = classifier.classify(&first_name(record.nome));
        let declared = normalize_declared(record.sexo.as_deref());
        let outcome = reconcile(declared, predicted);

        summary.record(outcome.status);
        validated.push(Cell::text(outcome.validated.as_str()));
        statuses.push(Cell::text(outcome.status.as_str()));
    }

    table.set_column(COL_SEXO_VALIDADO, validated).map_err(PipelineError::Write)?;
    table.set_column(COL_STATUS, statuses).map_err(PipelineError::Write)?;
    Ok(summary)
}
