mod character_handler;

pub use character_handler::*;
