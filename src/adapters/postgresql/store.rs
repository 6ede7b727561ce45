//! PostgreSQL case store

use super::client::PostgreSQLClient;
use crate::adapters::store::CaseStore;
use crate::domain::case::{CaseLogEntry, CaseRecord, CaseStatus};
use crate::domain::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_postgres::Row;

const CASE_COLUMNS: &str = "case_info_id, patient_identifier, person_id, job_id, status, \
     server_host, server_url, status_url, trigger_at, created, activated, \
     last_updated, last_successful, tries_left, case_started_running";

/// PostgreSQL-backed [`CaseStore`]
pub struct PostgresCaseStore {
    client: Arc<PostgreSQLClient>,
}

impl PostgresCaseStore {
    pub fn new(client: Arc<PostgreSQLClient>) -> Self {
        Self { client }
    }

    fn case_from_row(row: &Row) -> CaseRecord {
        let status: String = row.get("status");
        CaseRecord {
            id: row.get("case_info_id"),
            patient_identifier: row.get("patient_identifier"),
            person_id: row.get("person_id"),
            job_id: row.get("job_id"),
            status: CaseStatus::from_str_lossy(&status),
            server_host: row.get("server_host"),
            server_url: row.get("server_url"),
            status_url: row.get("status_url"),
            trigger_at: row.get("trigger_at"),
            created_at: row.get("created"),
            activated_at: row.get("activated"),
            last_updated_at: row.get("last_updated"),
            last_successful_at: row.get("last_successful"),
            tries_left: row.get("tries_left"),
            case_started_running_at: row.get("case_started_running"),
        }
    }

    fn excluded_status_strings() -> Vec<&'static str> {
        CaseStatus::EXCLUDED_FROM_POLLING
            .iter()
            .map(CaseStatus::as_str)
            .collect()
    }
}

#[async_trait]
impl CaseStore for PostgresCaseStore {
    async fn search_due(
        &self,
        due_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<CaseRecord>> {
        let excluded = Self::excluded_status_strings();
        let query = format!(
            "SELECT {CASE_COLUMNS} FROM case_info \
             WHERE trigger_at <= $1 AND status != ALL($2) \
             ORDER BY status DESC, trigger_at ASC \
             LIMIT $3"
        );

        let rows = self
            .client
            .query(&query, &[&due_before, &excluded, &limit])
            .await?;

        Ok(rows.iter().map(Self::case_from_row).collect())
    }

    async fn create(&self, case: &CaseRecord) -> Result<CaseRecord> {
        let query = format!(
            "INSERT INTO case_info (patient_identifier, person_id, job_id, status, \
             server_host, server_url, status_url, trigger_at, created, activated, \
             last_updated, last_successful, tries_left, case_started_running) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {CASE_COLUMNS}"
        );

        let row = self
            .client
            .query_one(
                &query,
                &[
                    &case.patient_identifier,
                    &case.person_id,
                    &case.job_id,
                    &case.status.as_str(),
                    &case.server_host,
                    &case.server_url,
                    &case.status_url,
                    &case.trigger_at,
                    &case.created_at,
                    &case.activated_at,
                    &case.last_updated_at,
                    &case.last_successful_at,
                    &case.tries_left,
                    &case.case_started_running_at,
                ],
            )
            .await?;

        Ok(Self::case_from_row(&row))
    }

    async fn update(&self, case: &CaseRecord) -> Result<()> {
        let now = Utc::now();
        self.client
            .execute(
                "UPDATE case_info SET patient_identifier = $2, job_id = $3, status = $4, \
                 server_host = $5, server_url = $6, status_url = $7, trigger_at = $8, \
                 last_updated = $9, last_successful = $10, tries_left = $11, \
                 case_started_running = $12 \
                 WHERE case_info_id = $1",
                &[
                    &case.id,
                    &case.patient_identifier,
                    &case.job_id,
                    &case.status.as_str(),
                    &case.server_host,
                    &case.server_url,
                    &case.status_url,
                    &case.trigger_at,
                    &now,
                    &case.last_successful_at,
                    &case.tries_left,
                    &case.case_started_running_at,
                ],
            )
            .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<CaseRecord>> {
        let query = format!("SELECT {CASE_COLUMNS} FROM case_info WHERE case_info_id = $1");
        let rows = self.client.query(&query, &[&id]).await?;
        Ok(rows.first().map(Self::case_from_row))
    }

    async fn append_log(&self, case_id: i64, text: &str) -> Result<()> {
        self.client
            .execute(
                "INSERT INTO case_log (case_info_id, log_datetime, text) VALUES ($1, $2, $3)",
                &[&case_id, &Utc::now(), &text],
            )
            .await?;
        Ok(())
    }

    async fn logs(&self, case_id: i64) -> Result<Vec<CaseLogEntry>> {
        let rows = self
            .client
            .query(
                "SELECT case_log_id, case_info_id, log_datetime, text FROM case_log \
                 WHERE case_info_id = $1 ORDER BY log_datetime ASC, case_log_id ASC",
                &[&case_id],
            )
            .await?;

        Ok(rows
            .iter()
            .map(|row| CaseLogEntry {
                id: row.get("case_log_id"),
                case_id: row.get("case_info_id"),
                logged_at: row.get("log_datetime"),
                text: row.get("text"),
            })
            .collect())
    }
}
