//! Core domain logic for idvault.
//! This crate is the single source of truth for identity-record invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod projection;
pub mod repo;
pub mod service;
pub mod time;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::attribute::{
    normalize_attribute_name, Attribute, AttributeError, AttributeResult, AttributeRow,
    AttributeValue,
};
pub use model::record::{
    parse_record_key, parse_record_kind, IdentityRecord, RecordKeyError, RecordKind,
    RecordValidationError,
};
pub use projection::AttributeProjector;
pub use repo::record_repo::{
    RecordListQuery, RecordRepository, RepoError, RepoResult, SqliteRecordRepository,
};
pub use service::record_service::{RecordService, RecordServiceError, RecordsListResult};
pub use time::{Clock, SystemClock};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
