pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use routes::{admin_routes, public_routes, routes};
pub use services::FileService;
