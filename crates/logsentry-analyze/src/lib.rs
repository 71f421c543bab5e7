//! Access-log parsing and ranking queries for logsentry.
//!
//! - **Parsing** - [`LineParser`] turns Common/Combined log bytes into
//!   [`FieldRecord`]s, one group per line. Lines that do not match become a
//!   single `raw` record instead of failing the parse.
//! - **Ranking** - [`RankAggregator`] groups record values by frequency and
//!   assigns dense ranks, so tied values share a rank.
//! - **Queries** - unique IPs, top visited paths and top active IPs, each
//!   reading through a shared [`LogSource`] that only yields bytes a virus
//!   scan has cleared.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use logsentry_analyze::{LogSource, TopActiveIpsHandler, TopActiveIpsQuery};
//!
//! let source = Arc::new(LogSource::new(gate, lifecycle, "access.log"));
//! let groups = TopActiveIpsHandler::new(source)
//!     .handle(TopActiveIpsQuery { count: 3 })
//!     .await?;
//!
//! for group in &groups {
//!     println!("#{} ({} hits): {:?}", group.rank, group.hit_count, group.items);
//! }
//! ```

mod parser;
mod query;
mod rank;

pub use parser::LineParser;
pub use query::{
    LifecycleSignal, LogSource, TopActiveIpsHandler, TopActiveIpsQuery, TopVisitedPathsHandler,
    TopVisitedPathsQuery, UniqueIpsHandler,
};
pub use rank::RankAggregator;

// Re-export core types
pub use logsentry_core::{AnalyzeError, FIELD_NAMES, FieldRecord, RAW_KEY, RankedGroup};
