pub mod phone_number;
pub mod user_email;
