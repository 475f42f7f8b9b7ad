use crate::error::Result;
use crate::models::customer::{Customer, CustomerStatus};
use crate::services::customer_service::CustomerService;
use chrono::{DateTime, Datelike, Duration, Local, Months, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatistics {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub today: i64,
    pub this_week: i64,
    pub this_month: i64,
    /// approved/total as a percentage, one decimal place, 0 when empty.
    pub approval_rate: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayBuckets {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub total: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub statistics: DashboardStatistics,
    pub recent_customers: Vec<Customer>,
    /// Trailing 30 days, keyed by creation date (`YYYY-MM-DD`).
    pub registrations_by_date: BTreeMap<String, DayBuckets>,
}

#[derive(Clone)]
pub struct DashboardService {
    pool: PgPool,
    customers: CustomerService,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        let customers = CustomerService::new(pool.clone());
        Self { pool, customers }
    }

    pub async fn overview(&self) -> Result<DashboardData> {
        let counts = self.customers.status_counts().await?;

        let now = Utc::now();
        let today = self.count_created_since(local_midnight()).await?;
        let this_week = self.count_created_since(now - Duration::days(7)).await?;
        let month_start = now
            .checked_sub_months(Months::new(1))
            .unwrap_or(now - Duration::days(30));
        let this_month = self.count_created_since(month_start).await?;

        let rows = self.created_statuses_since(now - Duration::days(30)).await?;
        let registrations_by_date = bucket_by_day(&rows);

        let (recent_customers, _) = self.customers.list(None, None, 1, 10).await?;

        Ok(DashboardData {
            statistics: DashboardStatistics {
                total: counts.total,
                pending: counts.pending,
                approved: counts.approved,
                rejected: counts.rejected,
                today,
                this_week,
                this_month,
                approval_rate: approval_rate(counts.approved, counts.total),
            },
            recent_customers,
            registrations_by_date,
        })
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE created_at >= $1")
                .bind(since)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn created_statuses_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<(DateTime<Utc>, CustomerStatus)>> {
        let rows = sqlx::query_as(
            "SELECT created_at, status FROM customers WHERE created_at >= $1 ORDER BY created_at",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// Start of the current calendar day in the server's local timezone.
fn local_midnight() -> DateTime<Utc> {
    Local::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|t| t.and_local_timezone(Local).earliest())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

/// Bucket creation timestamps by their UTC calendar date.
fn bucket_by_day(rows: &[(DateTime<Utc>, CustomerStatus)]) -> BTreeMap<String, DayBuckets> {
    let mut buckets: BTreeMap<String, DayBuckets> = BTreeMap::new();
    for (created_at, status) in rows {
        let date = created_at.date_naive();
        let key = format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day());
        let entry = buckets.entry(key).or_default();
        match status {
            CustomerStatus::Pending => entry.pending += 1,
            CustomerStatus::Approved => entry.approved += 1,
            CustomerStatus::Rejected => entry.rejected += 1,
        }
        entry.total += 1;
    }
    buckets
}

fn approval_rate(approved: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (approved as f64 / total as f64 * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 30, 0).unwrap()
    }

    #[test]
    fn buckets_group_by_calendar_day() {
        let rows = vec![
            (at(2026, 8, 1, 0), CustomerStatus::Pending),
            (at(2026, 8, 1, 9), CustomerStatus::Approved),
            (at(2026, 8, 1, 23), CustomerStatus::Approved),
            (at(2026, 8, 3, 12), CustomerStatus::Rejected),
        ];
        let buckets = bucket_by_day(&rows);
        assert_eq!(buckets.len(), 2);

        let first = buckets.get("2026-08-01").expect("bucket");
        assert_eq!(first.pending, 1);
        assert_eq!(first.approved, 2);
        assert_eq!(first.rejected, 0);
        assert_eq!(first.total, 3);

        let second = buckets.get("2026-08-03").expect("bucket");
        assert_eq!(second.rejected, 1);
        assert_eq!(second.total, 1);
        // BTreeMap keeps the histogram in date order
        assert_eq!(
            buckets.keys().collect::<Vec<_>>(),
            vec!["2026-08-01", "2026-08-03"]
        );
    }

    #[test]
    fn empty_input_yields_no_buckets() {
        assert!(bucket_by_day(&[]).is_empty());
    }

    #[test]
    fn approval_rate_is_one_decimal_percentage() {
        assert_eq!(approval_rate(0, 0), 0.0);
        assert_eq!(approval_rate(1, 3), 33.3);
        assert_eq!(approval_rate(2, 3), 66.7);
        assert_eq!(approval_rate(3, 3), 100.0);
    }
}
