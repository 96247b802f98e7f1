mod relation;

pub use relation::{Relation, RelationType};
