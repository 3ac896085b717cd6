//! Repository for the `soins` table.

use std::collections::HashMap;

use mutuelle_core::soin::DEFAULT_BENEFICIARY;
use mutuelle_core::types::DbId;
use sqlx::{PgConnection, PgExecutor};

use super::cotisation_repo::escape_like;
use super::AdherentRepo;
use crate::models::soin::{CreateSoin, Soin, SoinFilter, SoinWithAdherent, UpdateSoin};
use crate::{clamp_limit, clamp_offset};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, adherent_id, num_recu, statut_dossier, montant_dossier, \
    type_beneficier, date_soin, date_fin_soin, created_at, updated_at";

/// Same columns, qualified for queries joining `adherents`.
const JOINED_COLUMNS: &str = "s.id, s.adherent_id, s.num_recu, s.statut_dossier, \
    s.montant_dossier, s.type_beneficier, s.date_soin, s.date_fin_soin, \
    s.created_at, s.updated_at";

/// Provides CRUD operations for claims.
pub struct SoinRepo;

impl SoinRepo {
    /// Insert a new claim. `type_beneficier` falls back to the default
    /// beneficiary when omitted.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        input: &CreateSoin,
    ) -> Result<Soin, sqlx::Error> {
        let query = format!(
            "INSERT INTO soins (adherent_id, num_recu, statut_dossier, montant_dossier, \
                type_beneficier, date_soin, date_fin_soin) \
             VALUES ($1, $2, $3, $4, COALESCE($5, $6), $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Soin>(&query)
            .bind(input.adherent_id)
            .bind(&input.num_recu)
            .bind(input.statut_dossier.as_str())
            .bind(input.montant_dossier)
            .bind(input.type_beneficier.as_deref())
            .bind(DEFAULT_BENEFICIARY)
            .bind(input.date_soin)
            .bind(input.date_fin_soin)
            .fetch_one(executor)
            .await
    }

    /// Find a claim by id.
    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Soin>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM soins WHERE id = $1");
        sqlx::query_as::<_, Soin>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a claim by id with its member embedded.
    pub async fn find_with_adherent(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<SoinWithAdherent>, sqlx::Error> {
        let Some(soin) = Self::find_by_id(&mut *conn, id).await? else {
            return Ok(None);
        };
        Ok(Self::attach_adherents(conn, vec![soin]).await?.pop())
    }

    /// List claims matching the filter, ordered by id.
    ///
    /// - `adherent__cin`, `adherent__nax`, `statut_dossier`: exact
    /// - `adherent__nom`, `adherent__prenom`, `num_recu`: case-insensitive substring
    pub async fn list(
        executor: impl PgExecutor<'_>,
        filter: &SoinFilter,
    ) -> Result<Vec<Soin>, sqlx::Error> {
        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        for (expr, present) in [
            ("a.cin = ", filter.adherent_cin.is_some()),
            ("a.nom ILIKE ", filter.adherent_nom.is_some()),
            ("a.prenom ILIKE ", filter.adherent_prenom.is_some()),
            ("a.nax = ", filter.adherent_nax.is_some()),
            ("s.num_recu ILIKE ", filter.num_recu.is_some()),
            ("s.statut_dossier = ", filter.statut_dossier.is_some()),
        ] {
            if present {
                conditions.push(format!("{expr}${bind_idx}"));
                bind_idx += 1;
            }
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM soins s \
             JOIN adherents a ON a.id = s.adherent_id \
             {where_clause} \
             ORDER BY s.id \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Soin>(&query);
        if let Some(ref cin) = filter.adherent_cin {
            q = q.bind(cin.clone());
        }
        if let Some(ref nom) = filter.adherent_nom {
            q = q.bind(format!("%{}%", escape_like(nom)));
        }
        if let Some(ref prenom) = filter.adherent_prenom {
            q = q.bind(format!("%{}%", escape_like(prenom)));
        }
        if let Some(ref nax) = filter.adherent_nax {
            q = q.bind(nax.clone());
        }
        if let Some(ref num_recu) = filter.num_recu {
            q = q.bind(format!("%{}%", escape_like(num_recu)));
        }
        if let Some(statut) = filter.statut_dossier {
            q = q.bind(statut.as_str());
        }

        q = q
            .bind(clamp_limit(filter.limit))
            .bind(clamp_offset(filter.offset));
        q.fetch_all(executor).await
    }

    /// List claims with their members embedded.
    pub async fn list_with_adherents(
        conn: &mut PgConnection,
        filter: &SoinFilter,
    ) -> Result<Vec<SoinWithAdherent>, sqlx::Error> {
        let soins = Self::list(&mut *conn, filter).await?;
        Self::attach_adherents(conn, soins).await
    }

    /// Update a claim. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        executor: impl PgExecutor<'_>,
        id: DbId,
        input: &UpdateSoin,
    ) -> Result<Option<Soin>, sqlx::Error> {
        let query = format!(
            "UPDATE soins SET \
                adherent_id = COALESCE($2, adherent_id), \
                num_recu = COALESCE($3, num_recu), \
                statut_dossier = COALESCE($4, statut_dossier), \
                montant_dossier = COALESCE($5, montant_dossier), \
                type_beneficier = COALESCE($6, type_beneficier), \
                date_soin = COALESCE($7, date_soin), \
                date_fin_soin = COALESCE($8, date_fin_soin) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Soin>(&query)
            .bind(id)
            .bind(input.adherent_id)
            .bind(input.num_recu.as_deref())
            .bind(input.statut_dossier.map(|v| v.as_str()))
            .bind(input.montant_dossier)
            .bind(input.type_beneficier.as_deref())
            .bind(input.date_soin)
            .bind(input.date_fin_soin)
            .fetch_optional(executor)
            .await
    }

    /// Delete a claim. Returns `true` if a row was removed.
    pub async fn delete(executor: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM soins WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Pair each claim with its member, loading members in one query.
    ///
    /// A claim whose member vanished between the two queries is dropped.
    async fn attach_adherents(
        conn: &mut PgConnection,
        soins: Vec<Soin>,
    ) -> Result<Vec<SoinWithAdherent>, sqlx::Error> {
        let mut ids: Vec<DbId> = soins.iter().map(|s| s.adherent_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let adherents: HashMap<DbId, _> = AdherentRepo::find_by_ids(&mut *conn, &ids)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        Ok(soins
            .into_iter()
            .filter_map(|soin| {
                let adherent = adherents.get(&soin.adherent_id)?.clone();
                Some(SoinWithAdherent { soin, adherent })
            })
            .collect())
    }
}
