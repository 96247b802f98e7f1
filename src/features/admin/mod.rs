pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod workers;

pub use routes::routes;
pub use services::TrashService;
pub use workers::RetentionSweeper;
