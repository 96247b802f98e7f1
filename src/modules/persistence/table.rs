use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Primary key column shared by every table
pub const ID: &str = "id";

/// Tombstone column carried by soft-deletable tables
pub const DELETED_AT: &str = "deleted_at";

/// Maintained by the store on every update for tables that have it
pub const UPDATED_AT: &str = "updated_at";

/// Every table reachable through the entity store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Comments,
    Characters,
    Resources,
    ResourceFiles,
    WikiPages,
    RelationTypes,
    Relations,
}

impl Table {
    pub const fn name(self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Comments => "comments",
            Table::Characters => "characters",
            Table::Resources => "resources",
            Table::ResourceFiles => "resource_files",
            Table::WikiPages => "wiki_pages",
            Table::RelationTypes => "relation_types",
            Table::Relations => "relations",
        }
    }

    /// The guarded entity this table backs, if it carries `deleted_at`
    pub fn soft_deletable(self) -> Option<SoftDeletable> {
        SoftDeletable::ALL
            .into_iter()
            .find(|entity| entity.table() == self)
    }

    /// Whether the table has an `updated_at` column
    pub const fn tracks_updates(self) -> bool {
        matches!(
            self,
            Table::Users | Table::Comments | Table::Characters | Table::Resources | Table::WikiPages
        )
    }
}

/// The guarded set: entities deleted by tombstone rather than row removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum SoftDeletable {
    #[serde(rename = "users")]
    User,
    #[serde(rename = "comments")]
    Comment,
    #[serde(rename = "characters")]
    Character,
    #[serde(rename = "resources")]
    Resource,
    #[serde(rename = "resource-files")]
    ResourceFile,
    #[serde(rename = "wiki-pages")]
    WikiPage,
}

impl SoftDeletable {
    pub const ALL: [SoftDeletable; 6] = [
        SoftDeletable::User,
        SoftDeletable::Comment,
        SoftDeletable::Character,
        SoftDeletable::Resource,
        SoftDeletable::ResourceFile,
        SoftDeletable::WikiPage,
    ];

    pub const fn table(self) -> Table {
        match self {
            SoftDeletable::User => Table::Users,
            SoftDeletable::Comment => Table::Comments,
            SoftDeletable::Character => Table::Characters,
            SoftDeletable::Resource => Table::Resources,
            SoftDeletable::ResourceFile => Table::ResourceFiles,
            SoftDeletable::WikiPage => Table::WikiPages,
        }
    }

    /// Soft-deletable children that follow this entity into and out of the
    /// trash, with the column referencing the parent
    pub const fn dependents(self) -> &'static [(SoftDeletable, &'static str)] {
        match self {
            SoftDeletable::Resource => &[(SoftDeletable::ResourceFile, "resource_id")],
            _ => &[],
        }
    }

    /// Path segment naming the entity, as in `/trash/resource-files`
    pub const fn as_str(self) -> &'static str {
        match self {
            SoftDeletable::User => "users",
            SoftDeletable::Comment => "comments",
            SoftDeletable::Character => "characters",
            SoftDeletable::Resource => "resources",
            SoftDeletable::ResourceFile => "resource-files",
            SoftDeletable::WikiPage => "wiki-pages",
        }
    }
}

impl fmt::Display for SoftDeletable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SoftDeletable> for Table {
    fn from(entity: SoftDeletable) -> Self {
        entity.table()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guarded_set_is_exactly_six_tables() {
        let guarded: Vec<Table> = [
            Table::Users,
            Table::Comments,
            Table::Characters,
            Table::Resources,
            Table::ResourceFiles,
            Table::WikiPages,
            Table::RelationTypes,
            Table::Relations,
        ]
        .into_iter()
        .filter(|t| t.soft_deletable().is_some())
        .collect();

        assert_eq!(guarded.len(), 6);
        assert!(Table::Relations.soft_deletable().is_none());
        assert!(Table::RelationTypes.soft_deletable().is_none());
        assert_eq!(
            Table::ResourceFiles.soft_deletable(),
            Some(SoftDeletable::ResourceFile)
        );
    }

    #[test]
    fn test_entity_path_names() {
        let parsed: SoftDeletable = serde_json::from_str("\"resource-files\"").unwrap();
        assert_eq!(parsed, SoftDeletable::ResourceFile);
        let parsed: SoftDeletable = serde_json::from_str("\"wiki-pages\"").unwrap();
        assert_eq!(parsed.table().name(), "wiki_pages");
        assert!(serde_json::from_str::<SoftDeletable>("\"relations\"").is_err());

        for entity in SoftDeletable::ALL {
            let json = serde_json::to_string(&entity).unwrap();
            assert_eq!(json, format!("\"{}\"", entity));
        }
    }

    #[test]
    fn test_only_resources_carry_dependents() {
        assert_eq!(
            SoftDeletable::Resource.dependents(),
            &[(SoftDeletable::ResourceFile, "resource_id")]
        );
        for entity in SoftDeletable::ALL {
            for (child, _) in entity.dependents() {
                assert!(child.dependents().is_empty());
            }
        }
    }
}
