// Infrastructure seams shared by the domains.

pub mod audit;
pub mod test_dependencies;
pub mod traits;

pub use audit::{LoggingAuditSink, PgAuditSink};
pub use traits::{AuditEvent, BaseAuditSink};
