mod admin;
mod deliveries;
mod health_check;
mod menu;
mod profile;
