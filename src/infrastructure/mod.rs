pub mod activity;
pub mod connectivity;
pub mod database;
