use crate::dto::customer_dto::{CreateCustomerPayload, UpdateCustomerPayload};
use crate::error::{Error, Result};
use crate::models::customer::{Customer, CustomerStatus, StatusCounts};
use crate::utils::validation::{is_valid_email, validate};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const CUSTOMER_COLUMNS: &str = "id, first_name, last_name, email, phone, company, address, city, \
     state, country, zip_code, notes, status, shopify_customer_id, approved_at, rejected_at, \
     approved_by, created_at, updated_at";

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 50;

/// Page count for a listing: ceiling of `total / limit`.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

/// Parse the `status` query value. `all`, empty or absent means no filter.
pub fn parse_status_filter(raw: Option<&str>) -> Result<Option<CustomerStatus>> {
    match raw {
        None | Some("") | Some("all") => Ok(None),
        Some(other) => other
            .parse::<CustomerStatus>()
            .map(Some)
            .map_err(Error::BadRequest),
    }
}

fn normalize_search(raw: Option<&str>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty()).map(|s| s.to_string())
}

/// Empty strings submitted for optional fields are stored as NULL.
fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[derive(Clone)]
pub struct CustomerService {
    pool: PgPool,
}

impl CustomerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(customer)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(customer)
    }

    /// Paginated listing, newest first. Search is a case-sensitive substring
    /// match across first name, last name, email and company; a row matching
    /// any of them qualifies.
    pub async fn list(
        &self,
        status: Option<CustomerStatus>,
        search: Option<&str>,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Customer>, i64)> {
        let page = page.max(1);
        let limit = limit.max(1);
        let search = normalize_search(search);
        let offset = (page - 1) * limit;

        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers \
             WHERE ($1::customer_status IS NULL OR status = $1) \
               AND ($2::text IS NULL \
                    OR strpos(first_name, $2) > 0 \
                    OR strpos(last_name, $2) > 0 \
                    OR strpos(email, $2) > 0 \
                    OR strpos(COALESCE(company, ''), $2) > 0) \
             ORDER BY created_at DESC \
             LIMIT $3 OFFSET $4"
        ))
        .bind(status)
        .bind(search.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM customers \
             WHERE ($1::customer_status IS NULL OR status = $1) \
               AND ($2::text IS NULL \
                    OR strpos(first_name, $2) > 0 \
                    OR strpos(last_name, $2) > 0 \
                    OR strpos(email, $2) > 0 \
                    OR strpos(COALESCE(company, ''), $2) > 0)",
        )
        .bind(status)
        .bind(search.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok((customers, total))
    }

    /// Unpaginated listing for the staff review view; search additionally
    /// matches the phone column.
    pub async fn list_for_review(
        &self,
        status: Option<CustomerStatus>,
        search: Option<&str>,
    ) -> Result<Vec<Customer>> {
        let search = normalize_search(search);
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers \
             WHERE ($1::customer_status IS NULL OR status = $1) \
               AND ($2::text IS NULL \
                    OR strpos(first_name, $2) > 0 \
                    OR strpos(last_name, $2) > 0 \
                    OR strpos(email, $2) > 0 \
                    OR strpos(COALESCE(phone, ''), $2) > 0 \
                    OR strpos(COALESCE(company, ''), $2) > 0) \
             ORDER BY created_at DESC"
        ))
        .bind(status)
        .bind(search.as_deref())
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    pub async fn count_by_status(&self, status: Option<CustomerStatus>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM customers WHERE ($1::customer_status IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn status_counts(&self) -> Result<StatusCounts> {
        let rows: Vec<(CustomerStatus, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM customers GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            match status {
                CustomerStatus::Pending => counts.pending = count,
                CustomerStatus::Approved => counts.approved = count,
                CustomerStatus::Rejected => counts.rejected = count,
            }
            counts.total += count;
        }
        Ok(counts)
    }

    pub async fn create(&self, payload: CreateCustomerPayload) -> Result<Customer> {
        validate(&payload)?;
        if !is_valid_email(&payload.email) {
            return Err(Error::BadRequest(
                "Please enter a valid email address".to_string(),
            ));
        }

        if self.get_by_email(&payload.email).await?.is_some() {
            return Err(Error::DuplicateEmail(
                "Customer with this email already exists".to_string(),
            ));
        }

        let customer = sqlx::query_as::<_, Customer>(&format!(
            "INSERT INTO customers \
                 (first_name, last_name, email, phone, company, address, city, state, country, \
                  zip_code, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(&payload.email)
        .bind(blank_to_none(payload.phone))
        .bind(blank_to_none(payload.company))
        .bind(blank_to_none(payload.address))
        .bind(blank_to_none(payload.city))
        .bind(blank_to_none(payload.state))
        .bind(blank_to_none(payload.country))
        .bind(blank_to_none(payload.zip_code))
        .bind(blank_to_none(payload.notes))
        .fetch_one(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateCustomerPayload) -> Result<Customer> {
        let existing = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound("Customer not found".to_string()))?;

        if let Some(new_email) = payload.email.as_deref() {
            if !new_email.is_empty() && new_email != existing.email {
                if self.get_by_email(new_email).await?.is_some() {
                    return Err(Error::DuplicateEmail("Email already exists".to_string()));
                }
            }
        }

        let merged = merge_update(&existing, &payload, Utc::now())?;

        let customer = sqlx::query_as::<_, Customer>(&format!(
            "UPDATE customers SET \
                 first_name = $2, last_name = $3, email = $4, phone = $5, company = $6, \
                 address = $7, city = $8, state = $9, country = $10, zip_code = $11, \
                 notes = $12, status = $13, approved_at = $14, rejected_at = $15, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(id)
        .bind(&merged.first_name)
        .bind(&merged.last_name)
        .bind(&merged.email)
        .bind(&merged.phone)
        .bind(&merged.company)
        .bind(&merged.address)
        .bind(&merged.city)
        .bind(&merged.state)
        .bind(&merged.country)
        .bind(&merged.zip_code)
        .bind(&merged.notes)
        .bind(merged.status)
        .bind(merged.approved_at)
        .bind(merged.rejected_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let deleted: Option<Uuid> =
            sqlx::query_scalar("DELETE FROM customers WHERE id = $1 RETURNING id")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        if deleted.is_none() {
            return Err(Error::NotFound("Customer not found".to_string()));
        }
        Ok(())
    }

    /// Transition persistence for the approval workflow: one UPDATE carrying
    /// all bookkeeping fields.
    pub async fn mark_approved(
        &self,
        id: Uuid,
        shopify_customer_id: Option<String>,
        approved_by: &str,
        notes: Option<String>,
    ) -> Result<Customer> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "UPDATE customers SET \
                 status = 'approved', shopify_customer_id = $2, approved_at = NOW(), \
                 approved_by = $3, notes = $4, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(id)
        .bind(shopify_customer_id)
        .bind(approved_by)
        .bind(notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(customer)
    }

    pub async fn mark_rejected(
        &self,
        id: Uuid,
        approved_by: &str,
        notes: Option<String>,
    ) -> Result<Customer> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "UPDATE customers SET \
                 status = 'rejected', rejected_at = NOW(), approved_by = $2, notes = $3, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(id)
        .bind(approved_by)
        .bind(notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(customer)
    }
}

#[derive(Debug)]
struct MergedUpdate {
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    company: Option<String>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
    zip_code: Option<String>,
    notes: Option<String>,
    status: CustomerStatus,
    approved_at: Option<DateTime<Utc>>,
    rejected_at: Option<DateTime<Utc>>,
}

/// Apply a partial update on top of the stored row. Entering `approved` or
/// `rejected` through this path stamps the matching timestamp, same as the
/// explicit transitions; leaving a status never clears its timestamp.
fn merge_update(
    existing: &Customer,
    payload: &UpdateCustomerPayload,
    now: DateTime<Utc>,
) -> Result<MergedUpdate> {
    fn required(field: &str, incoming: &Option<String>, current: &str) -> Result<String> {
        match incoming {
            None => Ok(current.to_string()),
            Some(s) if s.is_empty() => {
                Err(Error::BadRequest(format!("{} cannot be empty", field)))
            }
            Some(s) => Ok(s.clone()),
        }
    }

    fn optional(incoming: &Option<String>, current: &Option<String>) -> Option<String> {
        match incoming {
            None => current.clone(),
            Some(s) if s.is_empty() => None,
            Some(s) => Some(s.clone()),
        }
    }

    let email = required("Email", &payload.email, &existing.email)?;
    if !is_valid_email(&email) {
        return Err(Error::BadRequest(
            "Please enter a valid email address".to_string(),
        ));
    }

    let status = match payload.status.as_deref() {
        None | Some("") => existing.status,
        Some(raw) => raw.parse::<CustomerStatus>().map_err(Error::BadRequest)?,
    };

    let approved_at = if status == CustomerStatus::Approved && existing.status != CustomerStatus::Approved {
        Some(now)
    } else {
        existing.approved_at
    };
    let rejected_at = if status == CustomerStatus::Rejected && existing.status != CustomerStatus::Rejected {
        Some(now)
    } else {
        existing.rejected_at
    };

    Ok(MergedUpdate {
        first_name: required("First name", &payload.first_name, &existing.first_name)?,
        last_name: required("Last name", &payload.last_name, &existing.last_name)?,
        email,
        phone: optional(&payload.phone, &existing.phone),
        company: optional(&payload.company, &existing.company),
        address: optional(&payload.address, &existing.address),
        city: optional(&payload.city, &existing.city),
        state: optional(&payload.state, &existing.state),
        country: optional(&payload.country, &existing.country),
        zip_code: optional(&payload.zip_code, &existing.zip_code),
        notes: optional(&payload.notes, &existing.notes),
        status,
        approved_at,
        rejected_at,
    })
}
