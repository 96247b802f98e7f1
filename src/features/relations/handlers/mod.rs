mod relation_handler;

pub use relation_handler::*;
