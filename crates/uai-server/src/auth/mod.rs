//! Authentication plumbing outside the user workflows.

pub mod bootstrap;
pub mod extractor;

pub use bootstrap::{AdminAccount, BootstrapOutcome, bootstrap_admin};
pub use extractor::AuthenticatedUser;
