//! Repository for the `adherents` table.

use mutuelle_core::adherent::{format_nax, RightsCategory};
use mutuelle_core::types::DbId;
use sqlx::{PgConnection, PgExecutor};

use crate::models::adherent::{Adherent, AdherentFilter, CreateAdherent, UpdateAdherent};
use crate::{clamp_limit, clamp_offset};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, nax, nom, prenom, date_naissance, cin, sexe, date_recrutement, \
    statut, a_droit, numero_tel, rib, ville, adresse, salaire, organisme_employeur, \
    section_cotisation, created_at, updated_at";

/// Provides CRUD operations for members.
///
/// Writes that affect the cotisation lifecycle (insert, rights changes) are
/// sequenced by [`crate::lifecycle::CotisationLifecycle`]; call these
/// directly only for reads and deletes.
pub struct AdherentRepo;

impl AdherentRepo {
    /// Insert a new member, assigning `id` and `nax` in the same statement
    /// sequence so `nax` is never observed empty.
    pub async fn insert(
        conn: &mut PgConnection,
        input: &CreateAdherent,
    ) -> Result<Adherent, sqlx::Error> {
        let id: DbId =
            sqlx::query_scalar("SELECT nextval(pg_get_serial_sequence('adherents', 'id'))")
                .fetch_one(&mut *conn)
                .await?;

        let query = format!(
            "INSERT INTO adherents (id, nax, nom, prenom, date_naissance, cin, sexe, \
                date_recrutement, statut, a_droit, numero_tel, rib, ville, adresse, salaire, \
                organisme_employeur, section_cotisation) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Adherent>(&query)
            .bind(id)
            .bind(format_nax(id))
            .bind(&input.nom)
            .bind(&input.prenom)
            .bind(input.date_naissance)
            .bind(&input.cin)
            .bind(input.sexe.as_str())
            .bind(input.date_recrutement)
            .bind(input.statut.as_str())
            .bind(input.a_droit.as_str())
            .bind(&input.numero_tel)
            .bind(&input.rib)
            .bind(&input.ville)
            .bind(&input.adresse)
            .bind(input.salaire)
            .bind(input.organisme_employeur.as_str())
            .bind(input.section_cotisation.as_str())
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a member by id.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Adherent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM adherents WHERE id = $1");
        sqlx::query_as::<_, Adherent>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a member by id and lock the row until the transaction ends.
    pub async fn find_for_update(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Adherent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM adherents WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Adherent>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Load several members at once, in no particular order.
    pub async fn find_by_ids(
        executor: impl PgExecutor<'_>,
        ids: &[DbId],
    ) -> Result<Vec<Adherent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM adherents WHERE id = ANY($1)");
        sqlx::query_as::<_, Adherent>(&query)
            .bind(ids)
            .fetch_all(executor)
            .await
    }

    /// List members matching every provided filter exactly, ordered by id.
    pub async fn list(
        executor: impl PgExecutor<'_>,
        filter: &AdherentFilter,
    ) -> Result<Vec<Adherent>, sqlx::Error> {
        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        for (column, present) in [
            ("nom", filter.nom.is_some()),
            ("prenom", filter.prenom.is_some()),
            ("cin", filter.cin.is_some()),
            ("statut", filter.statut.is_some()),
            ("a_droit", filter.a_droit.is_some()),
            ("nax", filter.nax.is_some()),
        ] {
            if present {
                conditions.push(format!("{column} = ${bind_idx}"));
                bind_idx += 1;
            }
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM adherents {where_clause} \
             ORDER BY id \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Adherent>(&query);
        if let Some(ref nom) = filter.nom {
            q = q.bind(nom);
        }
        if let Some(ref prenom) = filter.prenom {
            q = q.bind(prenom);
        }
        if let Some(ref cin) = filter.cin {
            q = q.bind(cin);
        }
        if let Some(statut) = filter.statut {
            q = q.bind(statut.as_str());
        }
        if let Some(a_droit) = filter.a_droit {
            q = q.bind(a_droit.as_str());
        }
        if let Some(ref nax) = filter.nax {
            q = q.bind(nax);
        }

        q = q
            .bind(clamp_limit(filter.limit))
            .bind(clamp_offset(filter.offset));
        q.fetch_all(executor).await
    }

    /// Update a member. Only non-`None` fields in `input` are applied;
    /// `date_recrutement: Some(None)` clears the date.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        executor: impl PgExecutor<'_>,
        id: DbId,
        input: &UpdateAdherent,
    ) -> Result<Option<Adherent>, sqlx::Error> {
        let query = format!(
            "UPDATE adherents SET \
                nom = COALESCE($2, nom), \
                prenom = COALESCE($3, prenom), \
                date_naissance = COALESCE($4, date_naissance), \
                cin = COALESCE($5, cin), \
                sexe = COALESCE($6, sexe), \
                date_recrutement = CASE WHEN $17 THEN $7 ELSE date_recrutement END, \
                statut = COALESCE($8, statut), \
                a_droit = COALESCE($9, a_droit), \
                numero_tel = COALESCE($10, numero_tel), \
                rib = COALESCE($11, rib), \
                ville = COALESCE($12, ville), \
                adresse = COALESCE($13, adresse), \
                salaire = COALESCE($14, salaire), \
                organisme_employeur = COALESCE($15, organisme_employeur), \
                section_cotisation = COALESCE($16, section_cotisation) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Adherent>(&query)
            .bind(id)
            .bind(input.nom.as_deref())
            .bind(input.prenom.as_deref())
            .bind(input.date_naissance)
            .bind(input.cin.as_deref())
            .bind(input.sexe.map(|v| v.as_str()))
            .bind(input.date_recrutement.flatten())
            .bind(input.statut.map(|v| v.as_str()))
            .bind(input.a_droit.map(|v| v.as_str()))
            .bind(input.numero_tel.as_deref())
            .bind(input.rib.as_deref())
            .bind(input.ville.as_deref())
            .bind(input.adresse.as_deref())
            .bind(input.salaire)
            .bind(input.organisme_employeur.map(|v| v.as_str()))
            .bind(input.section_cotisation.map(|v| v.as_str()))
            .bind(input.date_recrutement.is_some())
            .fetch_optional(executor)
            .await
    }

    /// Set only the rights category. Returns `None` if the member is gone.
    pub async fn set_rights(
        executor: impl PgExecutor<'_>,
        id: DbId,
        a_droit: RightsCategory,
    ) -> Result<Option<Adherent>, sqlx::Error> {
        let query = format!(
            "UPDATE adherents SET a_droit = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Adherent>(&query)
            .bind(id)
            .bind(a_droit.as_str())
            .fetch_optional(executor)
            .await
    }

    /// Permanently delete a member. Cotisations and soins go with it
    /// (`ON DELETE CASCADE`). Returns `true` if a row was removed.
    pub async fn delete(executor: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM adherents WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
