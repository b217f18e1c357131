pub mod admin;
pub mod auth;
pub mod deliveries;
pub mod health_check;
pub mod menu;
pub mod orders;
pub mod profile;
pub mod restaurants;
