//! Write functions - load typed sales rows into PostgreSQL

use crate::config::DatabaseConfig;
use crate::ingestion::schema::{create_table_sql, insert_prefix, SALE_TABLE};
use crate::ingestion::types::{SqlValue, TypedRow, WriteStats};
use anyhow::{Context, Result};
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder, Transaction};
use tracing::{debug, info, warn};

/// Rows per INSERT statement. PostgreSQL caps a statement at 65535 bind
/// parameters, which is 1638 rows of the 40-column layout.
pub const INSERT_CHUNK_ROWS: usize = 1000;

/// Connect, ensure the table, insert every row in one transaction.
/// The connection is closed whether or not the work succeeds.
pub async fn load_sales(config: &DatabaseConfig, rows: &[TypedRow]) -> Result<WriteStats> {
    info!(
        "Connecting to database {} at {}:{}",
        config.dbname, config.host, config.port
    );
    let mut conn = PgConnection::connect_with(&config.connect_options())
        .await
        .context("Failed to connect to database")?;
    info!("Database connected");

    let result = ensure_and_insert(&mut conn, rows).await;

    match conn.close().await {
        Ok(()) => debug!("Database connection closed"),
        Err(e) => warn!("Failed to close database connection cleanly: {}", e),
    }

    result
}

async fn ensure_and_insert(conn: &mut PgConnection, rows: &[TypedRow]) -> Result<WriteStats> {
    ensure_sales_table(conn).await?;
    insert_sales(conn, rows).await
}

/// Create the sales table if it does not exist. No migration is attempted.
pub async fn ensure_sales_table(conn: &mut PgConnection) -> Result<()> {
    let ddl = create_table_sql();
    debug!("Ensuring table:\n{}", ddl);

    sqlx::query(&ddl)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("Failed to create table {}", SALE_TABLE))?;

    info!("Table {} ready", SALE_TABLE);
    Ok(())
}

/// Insert all rows inside a single transaction.
/// One bad row (duplicate key, over-long value) means nothing is committed.
pub async fn insert_sales(conn: &mut PgConnection, rows: &[TypedRow]) -> Result<WriteStats> {
    if rows.is_empty() {
        info!("No rows to insert");
        return Ok(WriteStats::default());
    }

    info!("Inserting {} rows into {}", rows.len(), SALE_TABLE);

    let mut tx = conn.begin().await.context("Failed to begin transaction")?;

    match insert_chunks(&mut tx, rows).await {
        Ok(stats) => {
            tx.commit()
                .await
                .context("Failed to commit insert transaction")?;
            info!("Write complete: {}", stats);
            Ok(stats)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                warn!("Rollback failed: {}", rollback);
            }
            Err(e.context("Insert transaction rolled back, no rows committed"))
        }
    }
}

async fn insert_chunks(
    tx: &mut Transaction<'_, Postgres>,
    rows: &[TypedRow],
) -> Result<WriteStats> {
    let prefix = insert_prefix();
    let mut stats = WriteStats::default();

    for (n, chunk) in rows.chunks(INSERT_CHUNK_ROWS).enumerate() {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(prefix.as_str());

        builder.push_values(chunk, |mut b, row| {
            for value in &row.values {
                match value {
                    SqlValue::Integer(v) => {
                        b.push_bind(*v);
                    }
                    SqlValue::Text(v) => {
                        b.push_bind(v.clone());
                    }
                    SqlValue::Date(v) => {
                        b.push_bind(*v);
                    }
                }
            }
        });

        let result = builder
            .build()
            .execute(&mut **tx)
            .await
            .with_context(|| {
                format!("Insert statement {} ({} rows) failed", n + 1, chunk.len())
            })?;

        stats.inserted += result.rows_affected() as usize;
        stats.statements += 1;
        debug!(
            "Statement {}: inserted {} rows",
            n + 1,
            result.rows_affected()
        );
    }

    Ok(stats)
}
