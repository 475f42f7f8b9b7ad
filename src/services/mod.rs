pub mod approval_service;
pub mod customer_service;
pub mod dashboard_service;
pub mod export_service;
pub mod shopify_service;
