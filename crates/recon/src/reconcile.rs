use validasexo_model::Label;

use crate::model::{DeclaredSex, Reconciled, Status, ValidatedSex};

/// Reconcile a declared sex against the predicted label.
///
/// - Unisex prediction → `UNISSEX` / `VALIDAR`, whatever was declared
/// - Nothing declared → prediction / `CORRIGIR`
/// - Declared matches → prediction / `CERTO`
/// - Declared differs → prediction / `CORRIGIR`
pub fn reconcile(declared: Option<DeclaredSex>, predicted: Label) -> Reconciled {
    let validated = match predicted {
        Label::Unisex => {
            return Reconciled {
                validated: ValidatedSex::Unisex,
                status: Status::Validar,
            }
        }
        Label::Male => ValidatedSex::Male,
        Label::Female => ValidatedSex::Female,
    };

    let status = match declared {
        None => Status::Corrigir,
        Some(d) if matches_label(d, predicted) => Status::Certo,
        Some(_) => Status::Corrigir,
    };

    Reconciled { validated, status }
}

fn matches_label(declared: DeclaredSex, predicted: Label) -> bool {
    matches!(
        (declared, predicted),
        (DeclaredSex::Male, Label::Male) | (DeclaredSex::Female, Label::Female)
    )
}
