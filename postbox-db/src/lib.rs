pub mod client;
mod record;
pub mod repository;
pub mod unit_of_work;
