/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Admin role - can manage relation types, uploads, and the trash
pub const ROLE_ADMIN: &str = "admin";

// =============================================================================
// RETENTION
// =============================================================================

/// Default age, in days, after which tombstoned rows are purged
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

/// Upper bound accepted for a retention age, in days
pub const MAX_RETENTION_DAYS: i64 = 36_500;
