pub mod admin;
pub mod deliveries;
pub mod menu_items;
pub mod orders;
pub mod restaurants;
pub mod users;
