mod filter;
mod guard;
mod store;
mod table;

pub use filter::{
    live, tombstoned, Changes, Condition, FieldValue, Filter, FindOptions, SortDirection,
};
pub use guard::{SoftDeleteAdmin, SoftDeleteGuard};
pub use store::{decode, decode_all, EntityStore, PgEntityStore, Row};
pub use table::{SoftDeletable, Table, DELETED_AT, ID, UPDATED_AT};
