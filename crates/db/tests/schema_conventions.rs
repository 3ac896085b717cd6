//! Schema-wide conventions the repositories and the API error mapping rely on.

use sqlx::PgPool;

async fn user_tables(pool: &PgPool) -> Vec<String> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT table_name
         FROM information_schema.tables
         WHERE table_schema = 'public'
           AND table_type = 'BASE TABLE'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(pool)
    .await
    .unwrap();
    rows.into_iter().map(|(t,)| t).collect()
}

/// All `id` columns are bigint.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_all_pks_are_bigint(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, data_type
         FROM information_schema.columns
         WHERE column_name = 'id'
           AND table_schema = 'public'
           AND table_name != '_sqlx_migrations'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(rows.len(), 5);
    for (table, data_type) in &rows {
        assert_eq!(data_type, "bigint", "{table}.id should be bigint");
    }
}

/// Every table has timestamptz `created_at`/`updated_at` and the trigger
/// that maintains `updated_at`.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_all_tables_have_timestamps_and_trigger(pool: PgPool) {
    for table in user_tables(&pool).await {
        for col in ["created_at", "updated_at"] {
            let data_type: Option<(String,)> = sqlx::query_as(
                "SELECT data_type
                 FROM information_schema.columns
                 WHERE table_schema = 'public' AND table_name = $1 AND column_name = $2",
            )
            .bind(&table)
            .bind(col)
            .fetch_optional(&pool)
            .await
            .unwrap();
            let (data_type,) =
                data_type.unwrap_or_else(|| panic!("Table {table} is missing column {col}"));
            assert_eq!(data_type, "timestamp with time zone", "{table}.{col}");
        }

        let (has_trigger,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM information_schema.triggers
                WHERE event_object_table = $1 AND trigger_name = 'set_updated_at'
            )",
        )
        .bind(&table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(has_trigger, "Table {table} has no set_updated_at trigger");
    }
}

/// Unique constraints and indexes are named `uq_*` so duplicates map to 409.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unique_indexes_are_named_uq(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT tablename, indexname
         FROM pg_indexes
         WHERE schemaname = 'public'
           AND indexdef LIKE 'CREATE UNIQUE INDEX%'
           AND indexname NOT LIKE '%_pkey'
           AND tablename != '_sqlx_migrations'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!rows.is_empty());
    for (table, index) in &rows {
        assert!(index.starts_with("uq_"), "{table}: unique index {index} is not named uq_*");
    }
}

/// Every foreign key column is indexed and cascades on delete.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_fks_are_indexed_and_cascade(pool: PgPool) {
    let fks: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT tc.table_name, kcu.column_name, rc.delete_rule
         FROM information_schema.table_constraints tc
         JOIN information_schema.key_column_usage kcu
             ON tc.constraint_name = kcu.constraint_name
             AND tc.table_schema = kcu.table_schema
         JOIN information_schema.referential_constraints rc
             ON rc.constraint_name = tc.constraint_name
             AND rc.constraint_schema = tc.table_schema
         WHERE tc.constraint_type = 'FOREIGN KEY'
           AND tc.table_schema = 'public'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(fks.len(), 3, "cotisations, soins and user_sessions reference a parent");
    for (table, column, delete_rule) in &fks {
        assert_eq!(delete_rule, "CASCADE", "{table}.{column}");

        let (has_index,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM pg_indexes
                WHERE schemaname = 'public' AND tablename = $1 AND indexdef LIKE $2
            )",
        )
        .bind(table)
        .bind(format!("%({column})%"))
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(has_index, "FK column {table}.{column} has no index");
    }
}
