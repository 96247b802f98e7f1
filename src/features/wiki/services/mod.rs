mod wiki_service;

pub use wiki_service::WikiService;
