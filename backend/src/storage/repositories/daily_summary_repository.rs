use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::DailySummary;
use sqlx::{sqlite::SqliteRow, Row, Sqlite, Transaction};
use tracing::debug;

use crate::storage::connection::DbConnection;
use crate::storage::traits::{DailySummaryStorage, UpsertOutcome};

const SELECT_COLUMNS: &str = "date, opening_balance, daily_income, total_balance, daily_expenses, closing_balance, revision";

/// SQLite-backed repository for daily summaries
#[derive(Clone)]
pub struct DailySummaryRepository {
    db: DbConnection,
}

impl DailySummaryRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_summary(row: &SqliteRow) -> Result<DailySummary> {
        Ok(DailySummary {
            date: row.try_get("date")?,
            opening_balance: row.try_get("opening_balance")?,
            daily_income: row.try_get("daily_income")?,
            total_balance: row.try_get("total_balance")?,
            daily_expenses: row.try_get("daily_expenses")?,
            closing_balance: row.try_get("closing_balance")?,
            revision: Some(row.try_get("revision")?),
        })
    }

    async fn insert_if_absent(tx: &mut Transaction<'_, Sqlite>, summary: &DailySummary) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO daily_summaries
                (date, opening_balance, daily_income, total_balance, daily_expenses, closing_balance, revision)
            VALUES (?, ?, ?, ?, ?, ?, 1)
            ON CONFLICT(date) DO NOTHING
            "#,
        )
        .bind(summary.date)
        .bind(summary.opening_balance)
        .bind(summary.daily_income)
        .bind(summary.total_balance)
        .bind(summary.daily_expenses)
        .bind(summary.closing_balance)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Replace every column of an existing row and bump its revision.
    /// With `only_if_revision` the row is only touched when its revision matches.
    async fn replace(
        tx: &mut Transaction<'_, Sqlite>,
        summary: &DailySummary,
        only_if_revision: Option<i64>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE daily_summaries
            SET opening_balance = ?,
                daily_income = ?,
                total_balance = ?,
                daily_expenses = ?,
                closing_balance = ?,
                revision = revision + 1,
                updated_at = CURRENT_TIMESTAMP
            WHERE date = ? AND (? IS NULL OR revision = ?)
            "#,
        )
        .bind(summary.opening_balance)
        .bind(summary.daily_income)
        .bind(summary.total_balance)
        .bind(summary.daily_expenses)
        .bind(summary.closing_balance)
        .bind(summary.date)
        .bind(only_if_revision)
        .bind(only_if_revision)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn current_revision(tx: &mut Transaction<'_, Sqlite>, date: NaiveDate) -> Result<i64> {
        let revision: Option<i64> = sqlx::query_scalar("SELECT revision FROM daily_summaries WHERE date = ?")
            .bind(date)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(revision.unwrap_or(0))
    }

    async fn fetch_in_tx(tx: &mut Transaction<'_, Sqlite>, date: NaiveDate) -> Result<DailySummary> {
        let row = sqlx::query(&format!("SELECT {} FROM daily_summaries WHERE date = ?", SELECT_COLUMNS))
            .bind(date)
            .fetch_one(&mut **tx)
            .await?;
        Self::row_to_summary(&row)
    }
}

#[async_trait]
impl DailySummaryStorage for DailySummaryRepository {
    async fn get_summary(&self, date: NaiveDate) -> Result<Option<DailySummary>> {
        let row = sqlx::query(&format!("SELECT {} FROM daily_summaries WHERE date = ?", SELECT_COLUMNS))
            .bind(date)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::row_to_summary).transpose()
    }

    async fn list_summaries(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Vec<DailySummary>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM daily_summaries
            WHERE (? IS NULL OR date >= ?) AND (? IS NULL OR date <= ?)
            ORDER BY date ASC
            "#,
            SELECT_COLUMNS
        ))
        .bind(from)
        .bind(from)
        .bind(to)
        .bind(to)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_summary).collect()
    }

    async fn upsert_summary(&self, summary: &DailySummary, expected_revision: Option<i64>) -> Result<UpsertOutcome> {
        let mut tx = self.db.pool().begin().await?;

        let created = match expected_revision {
            None => {
                if Self::insert_if_absent(&mut tx, summary).await? {
                    true
                } else {
                    Self::replace(&mut tx, summary, None).await?;
                    false
                }
            }
            Some(0) => {
                if !Self::insert_if_absent(&mut tx, summary).await? {
                    let current = Self::current_revision(&mut tx, summary.date).await?;
                    tx.rollback().await?;
                    return Ok(UpsertOutcome::RevisionMismatch { current });
                }
                true
            }
            Some(expected) => {
                if !Self::replace(&mut tx, summary, Some(expected)).await? {
                    let current = Self::current_revision(&mut tx, summary.date).await?;
                    tx.rollback().await?;
                    return Ok(UpsertOutcome::RevisionMismatch { current });
                }
                false
            }
        };

        let stored = Self::fetch_in_tx(&mut tx, summary.date).await?;
        tx.commit().await?;

        debug!(date = %stored.date, revision = ?stored.revision, created, "Daily summary written");

        if created {
            Ok(UpsertOutcome::Created(stored))
        } else {
            Ok(UpsertOutcome::Replaced(stored))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test() -> DailySummaryRepository {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        DailySummaryRepository::new(db)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_get_missing_summary() {
        let repo = setup_test().await;
        let result = repo.get_summary(date("2024-03-01")).await.expect("Query failed");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let repo = setup_test().await;
        let summary = DailySummary::from_inputs(date("2024-03-01"), 0.0, 500.0, 200.0);

        let outcome = repo.upsert_summary(&summary, None).await.expect("Failed to store summary");
        let stored = match outcome {
            UpsertOutcome::Created(stored) => stored,
            other => panic!("Expected Created, got {:?}", other),
        };
        assert_eq!(stored.revision, Some(1));
        assert_eq!(stored.closing_balance, 300.0);

        let fetched = repo.get_summary(summary.date).await.unwrap().unwrap();
        assert_eq!(fetched, stored);
    }

    #[tokio::test]
    async fn test_second_save_replaces_instead_of_duplicating() {
        let repo = setup_test().await;
        let first = DailySummary::from_inputs(date("2024-03-01"), 0.0, 500.0, 200.0);
        let second = DailySummary::from_inputs(date("2024-03-01"), 0.0, 500.0, 50.0);

        repo.upsert_summary(&first, None).await.unwrap();
        let outcome = repo.upsert_summary(&second, None).await.unwrap();

        match outcome {
            UpsertOutcome::Replaced(stored) => {
                assert_eq!(stored.daily_expenses, 50.0);
                assert_eq!(stored.closing_balance, 450.0);
                assert_eq!(stored.revision, Some(2));
            }
            other => panic!("Expected Replaced, got {:?}", other),
        }

        let all = repo.list_summaries(None, None).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_expected_revision_guards_overwrite() {
        let repo = setup_test().await;
        let summary = DailySummary::from_inputs(date("2024-03-01"), 0.0, 100.0, 0.0);
        repo.upsert_summary(&summary, None).await.unwrap();

        // Stale writer still thinks revision 0 (record absent)
        let stale = repo.upsert_summary(&summary, Some(0)).await.unwrap();
        assert_eq!(stale, UpsertOutcome::RevisionMismatch { current: 1 });

        let stale = repo.upsert_summary(&summary, Some(7)).await.unwrap();
        assert_eq!(stale, UpsertOutcome::RevisionMismatch { current: 1 });

        let updated = DailySummary::from_inputs(date("2024-03-01"), 0.0, 100.0, 30.0);
        match repo.upsert_summary(&updated, Some(1)).await.unwrap() {
            UpsertOutcome::Replaced(stored) => assert_eq!(stored.revision, Some(2)),
            other => panic!("Expected Replaced, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_expected_revision_on_missing_record() {
        let repo = setup_test().await;
        let summary = DailySummary::from_inputs(date("2024-03-01"), 0.0, 100.0, 0.0);

        let outcome = repo.upsert_summary(&summary, Some(4)).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::RevisionMismatch { current: 0 });
        assert!(repo.get_summary(summary.date).await.unwrap().is_none());

        let outcome = repo.upsert_summary(&summary, Some(0)).await.unwrap();
        assert!(matches!(outcome, UpsertOutcome::Created(_)));
    }

    #[tokio::test]
    async fn test_list_summaries_in_date_order_with_bounds() {
        let repo = setup_test().await;
        for (day, income) in [("2024-03-03", 30.0), ("2024-03-01", 10.0), ("2024-03-02", 20.0)] {
            let summary = DailySummary::from_inputs(date(day), 0.0, income, 0.0);
            repo.upsert_summary(&summary, None).await.unwrap();
        }

        let all = repo.list_summaries(None, None).await.unwrap();
        let dates: Vec<_> = all.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date("2024-03-01"), date("2024-03-02"), date("2024-03-03")]);

        let tail = repo.list_summaries(Some(date("2024-03-02")), None).await.unwrap();
        assert_eq!(tail.len(), 2);

        let window = repo
            .list_summaries(Some(date("2024-03-02")), Some(date("2024-03-02")))
            .await
            .unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].daily_income, 20.0);
    }
}
