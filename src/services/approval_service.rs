use crate::error::{Error, Result};
use crate::models::customer::{Customer, CustomerStatus};
use crate::services::customer_service::CustomerService;
use crate::services::shopify_service::{
    build_customer_input, effective_notes, extract_gid_id, CustomerDirectory, ShopifyCustomer,
};
use uuid::Uuid;

/// The approval workflow: pending registrations move to `approved` (with a
/// mirror record created in Shopify) or `rejected`. Only re-entering the
/// current status is refused; reversing an earlier decision stays allowed.
#[derive(Clone)]
pub struct ApprovalService {
    customers: CustomerService,
}

fn ensure_can_approve(status: CustomerStatus) -> Result<()> {
    if status == CustomerStatus::Approved {
        return Err(Error::InvalidTransition(
            "Customer is already approved".to_string(),
        ));
    }
    Ok(())
}

fn ensure_can_reject(status: CustomerStatus) -> Result<()> {
    if status == CustomerStatus::Rejected {
        return Err(Error::InvalidTransition(
            "Customer is already rejected".to_string(),
        ));
    }
    Ok(())
}

impl ApprovalService {
    pub fn new(customers: CustomerService) -> Self {
        Self { customers }
    }

    /// Create the customer in Shopify, then persist the approved status plus
    /// bookkeeping fields in one update.
    pub async fn approve<D: CustomerDirectory>(
        &self,
        directory: &D,
        id: Uuid,
        notes: Option<String>,
        actor: &str,
    ) -> Result<(Customer, ShopifyCustomer)> {
        let customer = self
            .customers
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound("Customer not found".to_string()))?;
        ensure_can_approve(customer.status)?;

        let input = build_customer_input(&customer, notes.as_deref());
        let created = directory.create_customer(input).await?;

        let shopify_customer_id = extract_gid_id(&created.id);
        let notes = effective_notes(notes.as_deref(), customer.notes.as_deref());

        // No transaction spans the remote create and this update: a failure
        // past this point leaves the Shopify record without a matching local
        // approval, and nothing reconciles the two.
        let updated = self
            .customers
            .mark_approved(id, shopify_customer_id, actor, notes)
            .await?;

        tracing::info!(customer_id = %id, approved_by = actor, "Customer approved");
        Ok((updated, created))
    }

    /// Local-only transition; no Shopify call is made.
    pub async fn reject(&self, id: Uuid, notes: Option<String>, actor: &str) -> Result<Customer> {
        let customer = self
            .customers
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound("Customer not found".to_string()))?;
        ensure_can_reject(customer.status)?;

        let notes = effective_notes(notes.as_deref(), customer.notes.as_deref());
        let updated = self.customers.mark_rejected(id, actor, notes).await?;

        tracing::info!(customer_id = %id, rejected_by = actor, "Customer rejected");
        Ok(updated)
    }
}
