//! Column layout of the uploaded table.
//!
//! Columns are resolved once per upload into a `Schema`; rows are then read
//! through the typed `PersonRecord` view instead of by column name.

use validasexo_io::{Cell, Table};

pub const COL_NOME: &str = "Nome";
pub const COL_DATA_NASCIMENTO: &str = "Data de Nascimento";
pub const COL_CPF: &str = "CPF";
pub const COL_SEXO: &str = "Sexo";
pub const COL_SEXO_VALIDADO: &str = "Sexo Validado";
pub const COL_STATUS: &str = "Status";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    MissingColumn(&'static str),
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn(column) => write!(f, "a planilha precisa ter a coluna '{column}'"),
        }
    }
}

impl std::error::Error for SchemaError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    nome: usize,
    sexo: usize,
    data_nascimento: Option<usize>,
    cpf: Option<usize>,
}

/// One person as read from a row. Absent or empty cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonRecord<'a> {
    /// Full name, only when the cell holds text.
    pub nome: Option<&'a str>,
    pub data_nascimento: Option<&'a Cell>,
    pub cpf: Option<&'a Cell>,
    /// Declared sex as free text.
    pub sexo: Option<String>,
}

impl Schema {
    /// Resolve column positions. `Nome` is required; a missing `Sexo` column
    /// is appended to the table, empty.
    pub fn resolve(table: &mut Table) -> Result<Self, SchemaError> {
        let nome = table
            .column_index(COL_NOME)
            .ok_or(SchemaError::MissingColumn(COL_NOME))?;
        let sexo = table.ensure_column(COL_SEXO);
        Ok(Self {
            nome,
            sexo,
            data_nascimento: table.column_index(COL_DATA_NASCIMENTO),
            cpf: table.column_index(COL_CPF),
        })
    }

    pub fn record<'a>(&self, table: &'a Table, row: usize) -> PersonRecord<'a> {
        let optional = move |col: Option<usize>| col.map(|c| table.cell(row, c)).filter(|c| !c.is_empty());
        PersonRecord {
            nome: table.cell(row, self.nome).as_text(),
            data_nascimento: optional(self.data_nascimento),
            cpf: optional(self.cpf),
            sexo: table.cell(row, self.sexo).to_display(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nome_is_required() {
        let mut table = Table::new(vec!["Name".into()], vec![vec![Cell::text("Maria")]]);
        assert_eq!(Schema::resolve(&mut table), Err(SchemaError::MissingColumn("Nome")));
        assert_eq!(
            SchemaError::MissingColumn("Nome").to_string(),
            "a planilha precisa ter a coluna 'Nome'"
        );
    }

    #[test]
    fn sexo_is_appended_when_missing() {
        let mut table = Table::new(vec!["Nome".into()], vec![vec![Cell::text("Maria")]]);
        let schema = Schema::resolve(&mut table).unwrap();
        assert_eq!(table.headers(), ["Nome", "Sexo"]);
        assert_eq!(schema.record(&table, 0).sexo, None);
    }

    #[test]
    fn record_reads_optional_fields() {
        let mut table = Table::new(
            vec!["CPF".into(), "Nome".into(), "Sexo".into(), "Data de Nascimento".into()],
            vec![
                vec![Cell::text("123"), Cell::text("Ana Lima"), Cell::text("F"), Cell::DateTime(33604.0)],
                vec![Cell::Empty, Cell::Number(7.0), Cell::Empty, Cell::Empty],
            ],
        );
        let schema = Schema::resolve(&mut table).unwrap();

        let first = schema.record(&table, 0);
        assert_eq!(first.nome, Some("Ana Lima"));
        assert_eq!(first.cpf, Some(&Cell::text("123")));
        assert_eq!(first.data_nascimento, Some(&Cell::DateTime(33604.0)));
        assert_eq!(first.sexo.as_deref(), Some("F"));

        let second = schema.record(&table, 1);
        assert_eq!(second.nome, None);
        assert_eq!(second.cpf, None);
        assert_eq!(second.sexo, None);
    }
}
