mod character_dto;

pub use character_dto::*;
