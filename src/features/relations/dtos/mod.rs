mod relation_dto;

pub use relation_dto::*;
