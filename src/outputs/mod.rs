//! Everything the run writes to disk.
//!
//! # Submodules
//!
//! - [`json`]: builds the [`StatusReport`](crate::models::StatusReport) and
//!   writes it as pretty JSON
//! - [`snapshot`]: best-effort page dumps for manual inspection when a
//!   source could not be read
//!
//! # Output Structure
//!
//! ```text
//! docs/
//! └── status.json            # status snapshot, overwritten each run
//!
//! debug/
//! ├── x_profile.html         # no link found / blocked profile
//! ├── ig_post.html           # blocked post page
//! └── tt_timeout_0.html      # failure on attempt 0
//! ```

pub mod json;
pub mod snapshot;
