mod wiki_page;

pub use wiki_page::WikiPage;
