//! Member ("adherent") entity model and DTOs.

use mutuelle_core::adherent::{Organisme, RightsCategory, Sexe, Statut};
use mutuelle_core::types::{Date, DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::{check_amount, double_option};

/// A member row from the `adherents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Adherent {
    pub id: DbId,
    /// Zero-padded id; set in the insert transaction and never updated.
    pub nax: String,
    pub nom: String,
    pub prenom: String,
    pub date_naissance: Date,
    pub cin: String,
    #[sqlx(try_from = "String")]
    pub sexe: Sexe,
    pub date_recrutement: Option<Date>,
    #[sqlx(try_from = "String")]
    pub statut: Statut,
    #[sqlx(try_from = "String")]
    pub a_droit: RightsCategory,
    pub numero_tel: String,
    pub rib: String,
    pub ville: String,
    pub adresse: String,
    pub salaire: Decimal,
    #[sqlx(try_from = "String")]
    pub organisme_employeur: Organisme,
    #[sqlx(try_from = "String")]
    pub section_cotisation: Organisme,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new member.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAdherent {
    #[validate(length(min = 1, max = 100))]
    pub nom: String,
    #[validate(length(min = 1, max = 100))]
    pub prenom: String,
    pub date_naissance: Date,
    #[validate(length(min = 1, max = 10))]
    pub cin: String,
    pub sexe: Sexe,
    pub date_recrutement: Option<Date>,
    pub statut: Statut,
    pub a_droit: RightsCategory,
    #[validate(length(max = 15))]
    pub numero_tel: String,
    #[validate(length(max = 24))]
    pub rib: String,
    #[validate(length(max = 100))]
    pub ville: String,
    pub adresse: String,
    #[validate(custom(function = "check_amount"))]
    pub salaire: Decimal,
    pub organisme_employeur: Organisme,
    pub section_cotisation: Organisme,
}

/// DTO for updating an existing member. All fields are optional.
///
/// `nax` is deliberately absent: it never changes after creation.
/// `date_recrutement: null` clears the recruitment date.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "check_update_amount"))]
pub struct UpdateAdherent {
    #[validate(length(min = 1, max = 100))]
    pub nom: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub prenom: Option<String>,
    pub date_naissance: Option<Date>,
    #[validate(length(min = 1, max = 10))]
    pub cin: Option<String>,
    pub sexe: Option<Sexe>,
    #[serde(default, deserialize_with = "double_option")]
    pub date_recrutement: Option<Option<Date>>,
    pub statut: Option<Statut>,
    pub a_droit: Option<RightsCategory>,
    #[validate(length(max = 15))]
    pub numero_tel: Option<String>,
    #[validate(length(max = 24))]
    pub rib: Option<String>,
    #[validate(length(max = 100))]
    pub ville: Option<String>,
    pub adresse: Option<String>,
    pub salaire: Option<Decimal>,
    pub organisme_employeur: Option<Organisme>,
    pub section_cotisation: Option<Organisme>,
}

fn check_update_amount(input: &UpdateAdherent) -> Result<(), ValidationError> {
    match &input.salaire {
        Some(salaire) => check_amount(salaire),
        None => Ok(()),
    }
}

/// Exact-match filters for `GET /adherents`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdherentFilter {
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub cin: Option<String>,
    pub statut: Option<Statut>,
    pub a_droit: Option<RightsCategory>,
    pub nax: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recruitment_date_absent_null_or_set() {
        let absent: UpdateAdherent = serde_json::from_str(r#"{"nom": "Alaoui"}"#).unwrap();
        assert_eq!(absent.date_recrutement, None);

        let cleared: UpdateAdherent =
            serde_json::from_str(r#"{"date_recrutement": null}"#).unwrap();
        assert_eq!(cleared.date_recrutement, Some(None));

        let set: UpdateAdherent =
            serde_json::from_str(r#"{"date_recrutement": "2012-06-15"}"#).unwrap();
        assert_eq!(
            set.date_recrutement,
            Some(Date::from_ymd_opt(2012, 6, 15))
        );
    }
}
