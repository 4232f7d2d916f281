//! Progress deviation analysis engine
//!
//! Compares a season's recorded farming progress against a time-based
//! expectation model, aggregates bottom-up (stage → detail → season →
//! portfolio) and emits rule-based remediation recommendations. All
//! computation is synchronous, deterministic, and free of I/O: callers fetch
//! the records, pick the `as_of` date, and receive a pure projection.

mod detail;
mod policy;
mod recommend;
mod report;
mod schedule;
mod season;
mod stage;

pub use detail::*;
pub use policy::*;
pub use recommend::*;
pub use report::*;
pub use schedule::*;
pub use season::*;
pub use stage::*;
