//! # vault-organizer
//!
//! Reorganizes a directory tree of Markdown notes ("vault") using a folder
//! structure suggested by the Anthropic Messages API.
//!
//! The pipeline is a single forward pass: index the vault, optionally back it
//! up, fetch an [`OrganizationPlan`](planner::OrganizationPlan) from the API,
//! confirm with the user, then move files and write a report into the vault
//! root. See [`pipeline::Organizer`].

pub mod anthropic;
pub mod backup;
pub mod error;
pub mod index;
pub mod organize;
pub mod pipeline;
pub mod planner;
pub mod report;

pub use error::{OrganizerError, Result};
pub use index::{FileRecord, index_vault};
pub use pipeline::{Organizer, OrganizeOptions};
pub use planner::OrganizationPlan;
