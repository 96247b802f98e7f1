use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating wiki page slugs
    /// Must be lowercase alphanumeric with single hyphens between segments
    /// - Valid: "aria-the-bard", "chapter1", "a-b-c"
    /// - Invalid: "-aria", "aria-", "aria--bard", "Aria", "aria_bard"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// Regex for SQL identifiers the entity store will interpolate
    /// - Valid: "deleted_at", "character_id", "_internal"
    /// - Invalid: "DeletedAt", "1col", "name; drop", "t.id"
    pub static ref IDENTIFIER_REGEX: Regex = Regex::new(r"^[a-z_][a-z0-9_]*$").unwrap();
}
