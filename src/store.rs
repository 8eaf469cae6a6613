use sqlx::sqlite::SqlitePool;

use crate::error::AppError;
use crate::model::{DailyElectricityRecord, ElectricityInput, ElectricityModel, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Created(i64),
    Updated(i64),
}

/// Inserts a reading for a new date, or overwrites the row named by `input.id`.
///
/// Inserts are rejected with [`AppError::DuplicateDate`] when a row for the
/// same date exists. Updates overwrite `date`, `electricity` and `diff` as
/// given, without checking the new date against other rows.
pub async fn upsert(pool: &SqlitePool, input: &ElectricityInput) -> Result<Upserted, AppError> {
    match input.id {
        Some(id) => update(pool, id, input).await.map(Upserted::Updated),
        None => insert(pool, input).await.map(Upserted::Created),
    }
}

async fn insert(pool: &SqlitePool, input: &ElectricityInput) -> Result<i64, AppError> {
    // Lookup and insert in one statement so concurrent submissions for the
    // same date cannot both pass the check.
    let result = sqlx::query_as::<_, Record>(
        r#"
        INSERT INTO daily_electricity
        ("date", electricity, diff)
        SELECT $1, $2, $3
        WHERE NOT EXISTS (
            SELECT 1 FROM daily_electricity WHERE "date" = $1
        )
        RETURNING id;
        "#,
    )
    .bind(&input.date)
    .bind(input.electricity)
    .bind(input.diff)
    .fetch_optional(pool)
    .await;

    match result {
        Ok(Some(record)) => {
            log::info!("created record {} for {}", record.id, input.date);
            Ok(record.id)
        }
        Ok(None) => Err(AppError::DuplicateDate(input.date.clone())),
        Err(e) => Err(AppError::InsertFailed(e)),
    }
}

async fn update(pool: &SqlitePool, id: i64, input: &ElectricityInput) -> Result<i64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE daily_electricity
        SET "date" = $1, electricity = $2, diff = $3, updated_at = CURRENT_TIMESTAMP
        WHERE id = $4;
        "#,
    )
    .bind(&input.date)
    .bind(input.electricity)
    .bind(input.diff)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(id));
    }

    log::info!("updated record {} for {}", id, input.date);
    Ok(id)
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<ElectricityModel>, AppError> {
    let records = sqlx::query_as::<_, ElectricityModel>(
        r#"SELECT id, "date", electricity, diff FROM daily_electricity ORDER BY id;"#,
    )
    .fetch_all(pool)
    .await?;

    Ok(records)
}

pub async fn find_by_id(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<DailyElectricityRecord>, AppError> {
    let record = sqlx::query_as::<_, DailyElectricityRecord>(
        r#"
        SELECT id, "date", electricity, diff, created_at, updated_at
        FROM daily_electricity
        WHERE id = $1;
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}
