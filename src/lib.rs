pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    approval_service::ApprovalService, customer_service::CustomerService,
    dashboard_service::DashboardService, shopify_service::ShopifyService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub customer_service: CustomerService,
    pub approval_service: ApprovalService,
    pub shopify_service: ShopifyService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap();

        let customer_service = CustomerService::new(pool.clone());
        let approval_service = ApprovalService::new(customer_service.clone());
        let shopify_service = ShopifyService::new(
            &config.shopify_shop_domain,
            config.shopify_admin_api_token.clone(),
            &config.shopify_api_version,
            http_client,
        );
        let dashboard_service = DashboardService::new(pool.clone());

        Self {
            pool,
            customer_service,
            approval_service,
            shopify_service,
            dashboard_service,
        }
    }
}
