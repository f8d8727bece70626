pub mod range;
pub mod route;
pub mod target;
