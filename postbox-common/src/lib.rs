pub mod event;
pub mod model;
