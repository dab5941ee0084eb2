//! Short random identifiers used to correlate log lines.

use uuid::Uuid;

const SHORT_ID_LEN: usize = 8;

/// Returns an 8 character lowercase hex id.
pub fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(SHORT_ID_LEN);
    id
}

/// Returns `<prefix>_<short id>`.
pub fn prefixed_id(prefix: &str) -> String {
    format!("{}_{}", prefix, short_id())
}
