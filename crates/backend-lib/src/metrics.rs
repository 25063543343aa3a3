// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const USER_REGISTERED: &str = "auth.user.registered";
pub const LOGIN_SUCCESS: &str = "auth.login.success";
pub const LOGIN_FAILED: &str = "auth.login.failed";
pub const TOKEN_REFRESHED: &str = "auth.token.refreshed";
pub const TOKEN_REVOKED: &str = "auth.token.revoked";
pub const TODO_CREATED: &str = "todo.created";
pub const TODO_UPDATED: &str = "todo.updated";
pub const TODO_DELETED: &str = "todo.deleted";
pub const TODO_BULK_SIZE: &str = "todo.bulk.batch_size";
