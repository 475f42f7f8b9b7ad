pub mod customer_routes;
pub mod dashboard;
pub mod export;
pub mod health;
pub mod register;
