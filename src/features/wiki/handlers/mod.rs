mod wiki_handler;

pub use wiki_handler::*;
