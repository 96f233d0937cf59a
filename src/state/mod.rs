//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `UrlState`: The state of an individual URL once popped (claimed, fetched, scoped out, failed)
//! - `VisitLedger`: The shared URL -> state arena used to claim URLs exactly once

mod ledger;
mod url_state;

// Re-export main types
pub use ledger::{Claim, VisitLedger};
pub use url_state::UrlState;
