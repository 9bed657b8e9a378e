//! Input ingestion for Learning Copilot.
//!
//! Three sources feed curriculum generation besides a free-text topic:
//!
//! - uploaded syllabus files, read by extension ([`process_file`])
//! - keyword sections found in syllabus text ([`parse_syllabus_structure`])
//! - public GitHub repositories ([`GitHubFetcher::analyze_repository`])

pub mod error;
pub mod files;
pub mod github;
pub mod syllabus;

pub use error::{IngestError, Result};
pub use files::{process_file, syllabus_document, FileFormat, IngestedFile};
pub use github::{
    is_not_found, learning_content, parse_github_url, DirectoryListing, GitHubFetcher, KeyFile, RepoAnalysis,
    RepoLocation, SpecificPath, StructureNode,
};
pub use syllabus::{parse_syllabus_structure, SyllabusStructure};
