mod wiki_dto;

pub use wiki_dto::*;
