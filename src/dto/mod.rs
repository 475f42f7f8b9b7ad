pub mod customer_dto;
