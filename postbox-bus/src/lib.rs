pub mod bus;
pub mod use_cases;
