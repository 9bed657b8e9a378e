//! Curriculum generation for Learning Copilot.
//!
//! [`CurriculumGenerator`] turns a topic, syllabus, repository analysis or
//! quick-start template into a structured curriculum, and produces project
//! scaffolds, code reviews, adaptations and chat guidance on top of it.
//!
//! Every structured operation returns a [`completion::StructuredOutcome`]:
//! model output that is not a JSON object is a normal result, not an error.

pub mod document;
pub mod error;
pub mod generator;
pub mod karpathy;
pub mod prompts;
pub mod wisdom;

pub use document::{
    AdaptationReport, Adaptations, CapstoneProject, CodeAnalysis, Curriculum, Difficulty,
    Exercise, ImplementationStep, Module, ProjectIdea, ProjectScaffold, TestCase,
};
pub use error::{CurriculumError, Result};
pub use generator::{CurriculumGenerator, ProgressSummary, GUIDANCE_HISTORY_TURNS};
pub use karpathy::{KarpathyMode, QuestionKind};
pub use prompts::{QuickStartTemplate, QUICK_START_TEMPLATES};
