pub mod admin;
pub mod auth;
pub mod characters;
pub mod files;
pub mod relations;
pub mod resources;
pub mod wiki;
