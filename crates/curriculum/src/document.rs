//! Typed views of generated documents.
//!
//! Model output is loosely shaped, so every field defaults when missing or
//! null. Unknown keys on a [`Curriculum`] (such as the provenance keys added
//! after generation) are kept in `extra`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Decode a field, falling back to its default when it is null or mistyped.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Text field; numbers and booleans are kept as their JSON text.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_text(&Value::deserialize(deserializer)?))
}

/// List of text; a lone scalar becomes a one-item list.
fn lenient_texts<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(value_text)
            .collect(),
        Value::Null | Value::Object(_) => Vec::new(),
        scalar => vec![value_text(&scalar)],
    })
}

/// List of objects; entries that do not fit are dropped.
fn lenient_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Capstone given as an object, or as a bare title.
fn lenient_capstone<'de, D>(deserializer: D) -> Result<Option<CapstoneProject>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(object) => serde_json::from_value(Value::Object(object)).ok(),
        Value::String(title) if !title.trim().is_empty() => Some(CapstoneProject {
            title,
            ..CapstoneProject::default()
        }),
        _ => None,
    })
}

/// Render a loosely typed JSON value as display text.
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Difficulty tier of a module within its curriculum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Tier by position: first third beginner, second third intermediate,
    /// the rest advanced.
    pub fn for_position(index: usize, total: usize) -> Self {
        let index = index as f64;
        let total = total as f64;
        if index < total * 0.33 {
            Difficulty::Beginner
        } else if index < total * 0.66 {
            Difficulty::Intermediate
        } else {
            Difficulty::Advanced
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated curriculum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Curriculum {
    #[serde(deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(deserialize_with = "lenient_texts")]
    pub prerequisites: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub estimated_duration: String,
    #[serde(deserialize_with = "lenient_items")]
    pub modules: Vec<Module>,
    #[serde(deserialize_with = "lenient_capstone")]
    pub capstone_project: Option<CapstoneProject>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Curriculum {
    /// Build a typed view of stored curriculum JSON.
    ///
    /// Modules without an id get the positional id `module_<index>`.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let mut curriculum: Curriculum = serde_json::from_value(value)?;
        for (index, module) in curriculum.modules.iter_mut().enumerate() {
            if module.id.is_empty() {
                module.id = format!("module_{}", index);
            }
        }
        Ok(curriculum)
    }

    /// Position of a module by id.
    pub fn module_index(&self, module_id: &str) -> Option<usize> {
        self.modules.iter().position(|m| m.id == module_id)
    }

    pub fn module(&self, module_id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == module_id)
    }

    /// Difficulty of a module; unknown ids are rated as the first module.
    pub fn difficulty_of(&self, module_id: &str) -> Difficulty {
        let index = self.module_index(module_id).unwrap_or(0);
        Difficulty::for_position(index, self.modules.len())
    }

    /// Concepts taught by modules before `module_id`, at most `limit`.
    ///
    /// An unknown id collects the concepts of every module.
    pub fn prior_concepts(&self, module_id: &str, limit: usize) -> Vec<String> {
        self.modules
            .iter()
            .take_while(|m| m.id != module_id)
            .flat_map(|m| m.concepts.iter().cloned())
            .take(limit)
            .collect()
    }

    /// Provenance tag added after generation (`topic`, `syllabus`, ...).
    pub fn generated_from(&self) -> Option<&str> {
        self.extra.get("generated_from").and_then(Value::as_str)
    }
}

/// One curriculum module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Module {
    #[serde(deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(deserialize_with = "lenient_texts")]
    pub learning_outcomes: Vec<String>,
    #[serde(deserialize_with = "lenient_texts")]
    pub concepts: Vec<String>,
    #[serde(deserialize_with = "lenient_items")]
    pub projects: Vec<ProjectIdea>,
    #[serde(deserialize_with = "lenient_items")]
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectIdea {
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(deserialize_with = "lenient_text")]
    pub difficulty: String,
    #[serde(deserialize_with = "lenient_text")]
    pub estimated_time: String,
    #[serde(deserialize_with = "lenient_texts")]
    pub skills_practiced: Vec<String>,
}

impl ProjectIdea {
    /// Difficulty label, `intermediate` when the model left it out.
    pub fn difficulty_label(&self) -> &str {
        if self.difficulty.is_empty() {
            "intermediate"
        } else {
            &self.difficulty
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exercise {
    #[serde(rename = "type", deserialize_with = "lenient_text")]
    pub kind: String,
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(deserialize_with = "lenient_text")]
    pub difficulty: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapstoneProject {
    #[serde(deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(deserialize_with = "lenient_texts")]
    pub requirements: Vec<String>,
    #[serde(deserialize_with = "lenient_texts")]
    pub deliverables: Vec<String>,
}

/// A generated hands-on project for one module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectScaffold {
    #[serde(deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(deserialize_with = "lenient_text")]
    pub goal: String,
    #[serde(deserialize_with = "lenient_texts")]
    pub learning_objectives: Vec<String>,
    #[serde(deserialize_with = "lenient_items")]
    pub implementation_steps: Vec<ImplementationStep>,
    #[serde(deserialize_with = "lenient_text")]
    pub starter_code: String,
    #[serde(deserialize_with = "lenient_items")]
    pub test_cases: Vec<TestCase>,
    #[serde(deserialize_with = "lenient_texts")]
    pub extensions: Vec<String>,
    #[serde(deserialize_with = "lenient_texts")]
    pub debugging_tips: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImplementationStep {
    /// Step number as the model wrote it.
    pub step: Value,
    #[serde(deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(deserialize_with = "lenient_text")]
    pub code_hint: String,
    #[serde(deserialize_with = "lenient_text")]
    pub checkpoint: String,
}

impl ImplementationStep {
    pub fn step_label(&self) -> String {
        value_text(&self.step)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestCase {
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
    pub input: Value,
    pub expected_output: Value,
}

impl TestCase {
    pub fn input_text(&self) -> String {
        value_text(&self.input)
    }

    pub fn expected_text(&self) -> String {
        value_text(&self.expected_output)
    }
}

/// Review of a code submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeAnalysis {
    #[serde(deserialize_with = "lenient")]
    pub requirements_met: bool,
    #[serde(deserialize_with = "lenient")]
    pub completeness_score: f64,
    #[serde(deserialize_with = "lenient_texts")]
    pub strengths: Vec<String>,
    #[serde(deserialize_with = "lenient_texts")]
    pub improvements: Vec<String>,
    #[serde(deserialize_with = "lenient_texts")]
    pub bugs: Vec<String>,
    #[serde(deserialize_with = "lenient_texts")]
    pub next_steps: Vec<String>,
}

/// Suggested changes to a curriculum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Adaptations {
    #[serde(deserialize_with = "lenient_texts")]
    pub recommendations: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub pace_adjustment: String,
    #[serde(deserialize_with = "lenient")]
    pub additional_projects: Vec<Value>,
    #[serde(deserialize_with = "lenient")]
    pub module_modifications: Vec<Value>,
}

impl Adaptations {
    /// Additional projects rendered as text.
    pub fn project_lines(&self) -> Vec<String> {
        self.additional_projects.iter().map(value_text).collect()
    }

    pub fn modification_lines(&self) -> Vec<String> {
        self.module_modifications.iter().map(value_text).collect()
    }
}

/// Adaptations together with what they were based on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptationReport {
    pub original_curriculum: Value,
    pub adaptations: Adaptations,
    pub based_on_progress: usize,
}
