//! **angprep** - Interactive beam-parameter editor for GRSISort angular-correlation macros
//!
//! Asks for the beam radius, optional index exclusions, and whether to fit the
//! histogram, then rewrites `angCorr.C` in place, keeping the pre-edit copy at
//! `angCorr.C.bk`.

/// Rewrite pipeline - prompt collection, replacement planning, in-place editing
pub mod core {
    /// Prompt answers, replacement templates, and the ordered rule table
    pub mod plan;
    pub use plan::{Answers, Pattern, RewritePlan, RewriteRule};

    /// Interactive prompt collection on stdin/stdout
    pub mod prompt;
    pub use prompt::collect as collect_answers;

    /// Streaming in-place rewrite with a sibling backup
    pub mod rewrite;
    pub use rewrite::{rewrite_content, rewrite_in_place, run};
}

// Strategic re-exports for the binary and tests
pub use core::plan::{Answers, RewritePlan};
pub use core::rewrite::{PrepCliError, RewriteReport, TARGET_FILE, run};
