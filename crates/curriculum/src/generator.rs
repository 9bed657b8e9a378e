//! Curriculum generation on top of the completion client.

use std::sync::Arc;

use completion::{
    parse_structured, ChatMessage, CompletionClient, CompletionOptions, ReasoningEffort,
    StructuredOutcome, Verbosity,
};
use ingest::{RepoAnalysis, SyllabusStructure};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::document::{Curriculum, Module};
use crate::error::Result;
use crate::karpathy::{enhance_curriculum_prompt, KarpathyMode};
use crate::prompts::{self, QuickStartTemplate};

/// Syllabus topics included in the generation input.
const SYLLABUS_TOPICS: usize = 10;
const SYLLABUS_PREREQUISITES: usize = 5;
const SYLLABUS_OUTCOMES: usize = 5;
const SYLLABUS_RAW_CHARS: usize = 3000;

const README_EXCERPT_CHARS: usize = 2000;
const STRUCTURE_SUMMARY_ITEMS: usize = 20;

/// Prior concepts passed to project generation.
const PROJECT_PREREQUISITES: usize = 5;

/// Chat turns replayed to the learning assistant.
pub const GUIDANCE_HISTORY_TURNS: usize = 5;

/// Module ids grouped by status, as input to adaptation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSummary {
    pub completed: Vec<String>,
    pub in_progress: Vec<String>,
}

/// Generates curricula, projects, reviews and guidance.
#[derive(Clone)]
pub struct CurriculumGenerator {
    client: Arc<CompletionClient>,
}

impl CurriculumGenerator {
    pub fn new(client: Arc<CompletionClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &CompletionClient {
        &self.client
    }

    /// Generate a curriculum from arbitrary input text.
    pub async fn generate_curriculum(
        &self,
        input: &str,
        source_type: &str,
    ) -> Result<StructuredOutcome> {
        self.generate_with_system(prompts::CURRICULUM_SYSTEM_PROMPT, input, source_type)
            .await
    }

    async fn generate_with_system(
        &self,
        system_prompt: &str,
        input: &str,
        source_type: &str,
    ) -> Result<StructuredOutcome> {
        info!(source_type, input_chars = input.len(), "Generating curriculum");

        let messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(prompts::curriculum_generation_prompt(source_type, input)),
        ];
        let options = CompletionOptions::new()
            .verbosity(Verbosity::High)
            .reasoning_effort(ReasoningEffort::High);

        let outcome = self
            .client
            .complete_structured(messages, options, "curriculum")
            .await?;

        if let Some(error) = outcome.error() {
            warn!(source_type, "Curriculum generation returned unparsable output: {}", error);
        }
        Ok(outcome)
    }

    pub async fn generate_from_topic(
        &self,
        topic: &str,
        level: &str,
        duration: &str,
    ) -> Result<StructuredOutcome> {
        let input = prompts::curriculum_prompt(topic, level, duration);
        let outcome = self.generate_curriculum(&input, "topic").await?;

        Ok(with_provenance(
            outcome,
            [
                ("generated_from", json!("topic")),
                ("input_topic", json!(topic)),
                ("level", json!(level)),
                ("duration", json!(duration)),
            ],
        ))
    }

    pub async fn generate_from_syllabus(
        &self,
        content: &str,
        structure: &SyllabusStructure,
    ) -> Result<StructuredOutcome> {
        let input = syllabus_input(content, structure);
        let outcome = self.generate_curriculum(&input, "syllabus").await?;

        Ok(with_provenance(
            outcome,
            [
                ("generated_from", json!("syllabus")),
                ("syllabus_structure", serde_json::to_value(structure)?),
            ],
        ))
    }

    pub async fn generate_from_repository(
        &self,
        analysis: &RepoAnalysis,
    ) -> Result<StructuredOutcome> {
        let input = repository_input(analysis);
        let outcome = self
            .generate_curriculum(&input, "github_repository")
            .await?;

        Ok(with_provenance(
            outcome,
            [
                ("generated_from", json!("github")),
                (
                    "repository",
                    json!({
                        "name": analysis.name,
                        "url": analysis.url,
                        "language": analysis.language,
                    }),
                ),
            ],
        ))
    }

    /// Generate a beginner curriculum from a quick-start template.
    pub async fn generate_from_template(
        &self,
        template: &QuickStartTemplate,
    ) -> Result<StructuredOutcome> {
        let input = enhance_curriculum_prompt(&template.input());
        let outcome = self
            .generate_with_system(prompts::CURRICULUM_EXPERT_PROMPT, &input, "template")
            .await?;

        Ok(with_provenance(
            outcome,
            [
                ("generated_from", json!("template")),
                ("template", json!(template.key)),
                ("level", json!("beginner")),
            ],
        ))
    }

    /// Generate a project scaffold for one module.
    ///
    /// Prerequisites are the concepts of the modules before it; difficulty
    /// follows the module's position in the curriculum.
    pub async fn generate_project(
        &self,
        module: &Module,
        curriculum: &Curriculum,
    ) -> Result<StructuredOutcome> {
        let prerequisites = curriculum.prior_concepts(&module.id, PROJECT_PREREQUISITES);
        let difficulty = curriculum.difficulty_of(&module.id);

        info!(module = %module.id, %difficulty, "Generating project scaffold");

        let messages = vec![
            ChatMessage::system(prompts::PROJECT_SYSTEM_PROMPT),
            ChatMessage::user(prompts::scaffold_prompt(
                &module.title,
                &prerequisites,
                difficulty,
            )),
        ];

        Ok(self
            .client
            .complete_structured(
                messages,
                CompletionOptions::new().verbosity(Verbosity::High),
                "project scaffold",
            )
            .await?)
    }

    /// Review a code submission against project requirements.
    pub async fn analyze_code_submission(
        &self,
        code: &str,
        requirements: &Value,
    ) -> Result<StructuredOutcome> {
        debug!(code_chars = code.len(), "Analyzing code submission");

        let messages = vec![
            ChatMessage::system(prompts::REVIEW_SYSTEM_PROMPT),
            ChatMessage::user(prompts::analysis_prompt(code, requirements)),
        ];

        Ok(self
            .client
            .complete_structured(messages, CompletionOptions::new(), "analysis")
            .await?)
    }

    /// Suggest curriculum changes based on progress and feedback.
    ///
    /// A parsed result is `{original_curriculum, adaptations,
    /// based_on_progress}`.
    pub async fn adapt_curriculum(
        &self,
        curriculum: &Value,
        progress: &ProgressSummary,
        feedback: Option<&str>,
    ) -> Result<StructuredOutcome> {
        let title = curriculum
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let messages = vec![
            ChatMessage::system(prompts::ADAPTATION_SYSTEM_PROMPT),
            ChatMessage::user(prompts::adaptation_prompt(
                title,
                &progress.completed,
                &progress.in_progress,
                feedback,
            )),
        ];

        let text = self
            .client
            .complete(messages, CompletionOptions::new().structured())
            .await?;

        Ok(match parse_structured(&text, "adaptations") {
            StructuredOutcome::Parsed(adaptations) => {
                let mut report = Map::new();
                report.insert("original_curriculum".into(), curriculum.clone());
                report.insert("adaptations".into(), Value::Object(adaptations));
                report.insert(
                    "based_on_progress".into(),
                    json!(progress.completed.len()),
                );
                StructuredOutcome::Parsed(report)
            }
            StructuredOutcome::Failed { raw_response, .. } => StructuredOutcome::Failed {
                error: "Failed to generate adaptations".to_string(),
                raw_response,
            },
        })
    }

    /// Answer a learner's question in the context of their path.
    ///
    /// Only the last [`GUIDANCE_HISTORY_TURNS`] history messages are sent.
    /// With a mode, its coaching prompt replaces the default one.
    pub async fn learning_guidance(
        &self,
        question: &str,
        context: &str,
        current_module: Option<&str>,
        history: &[ChatMessage],
        mode: Option<KarpathyMode>,
    ) -> Result<String> {
        let system_prompt = match mode {
            Some(mode) => mode.system_prompt(context),
            None => prompts::GUIDANCE_SYSTEM_PROMPT.to_string(),
        };

        let mut messages = vec![ChatMessage::system(system_prompt)];

        let skip = history.len().saturating_sub(GUIDANCE_HISTORY_TURNS);
        messages.extend(history.iter().skip(skip).cloned());

        let mut user_message = format!("Context: {}", context);
        if let Some(module) = current_module {
            user_message.push_str(&format!("\nCurrent Module: {}", module));
        }
        user_message.push_str(&format!("\n\nQuestion: {}", question));
        messages.push(ChatMessage::user(user_message));

        Ok(self
            .client
            .complete(
                messages,
                CompletionOptions::new()
                    .verbosity(Verbosity::Medium)
                    .reasoning_effort(ReasoningEffort::Medium),
            )
            .await?)
    }

    /// Explain a piece of code, or guide debugging when an error is given.
    pub async fn explain_code(&self, code: &str, error: Option<&str>) -> Result<String> {
        let messages = vec![
            ChatMessage::system(prompts::LEARNING_COACH_PROMPT),
            ChatMessage::user(prompts::explanation_prompt(code, error)),
        ];

        Ok(self
            .client
            .complete(messages, CompletionOptions::new())
            .await?)
    }
}

/// Add keys to a parsed outcome; failures pass through untouched.
fn with_provenance<const N: usize>(
    outcome: StructuredOutcome,
    entries: [(&str, Value); N],
) -> StructuredOutcome {
    match outcome {
        StructuredOutcome::Parsed(mut object) => {
            for (key, value) in entries {
                object.insert(key.to_string(), value);
            }
            StructuredOutcome::Parsed(object)
        }
        failed => failed,
    }
}

fn syllabus_input(content: &str, structure: &SyllabusStructure) -> String {
    fn head(items: &[String], n: usize) -> String {
        items.iter().take(n).cloned().collect::<Vec<_>>().join(", ")
    }

    format!(
        "Syllabus Analysis:
Topics: {}
Prerequisites: {}
Learning Outcomes: {}

Raw Content:
{}",
        head(&structure.topics, SYLLABUS_TOPICS),
        head(&structure.prerequisites, SYLLABUS_PREREQUISITES),
        head(&structure.learning_outcomes, SYLLABUS_OUTCOMES),
        content.chars().take(SYLLABUS_RAW_CHARS).collect::<String>(),
    )
}

fn repository_input(analysis: &RepoAnalysis) -> String {
    format!(
        "Repository: {}
Description: {}
Language: {}
Topics: {}

README Excerpt:
{}

Structure Overview:
{}
",
        analysis.name,
        analysis.description.as_deref().unwrap_or("N/A"),
        analysis.language.as_deref().unwrap_or("Unknown"),
        analysis.topics.join(", "),
        analysis
            .readme
            .chars()
            .take(README_EXCERPT_CHARS)
            .collect::<String>(),
        analysis.structure.summary(STRUCTURE_SUMMARY_ITEMS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use completion::{
        async_trait, ChatCompletionRequest, CompletionConfig, CompletionError,
        CompletionTransport,
    };
    use ingest::DirectoryListing;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct FakeTransport {
        replies: Arc<Mutex<VecDeque<String>>>,
        sent: Arc<Mutex<Vec<ChatCompletionRequest>>>,
    }

    impl FakeTransport {
        fn replying(replies: &[&str]) -> Self {
            let transport = Self::default();
            transport
                .replies
                .lock()
                .unwrap()
                .extend(replies.iter().map(|r| r.to_string()));
            transport
        }

        fn sent(&self) -> Vec<ChatCompletionRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionTransport for FakeTransport {
        async fn send(
            &self,
            request: &ChatCompletionRequest,
        ) -> std::result::Result<String, CompletionError> {
            self.sent.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| CompletionError::Network("no reply".into()))
        }
    }

    fn generator(model: &str, transport: &FakeTransport) -> CurriculumGenerator {
        let config = CompletionConfig::builder()
            .api_key("test")
            .model(model)
            .build();
        let client = CompletionClient::with_transport(config, Box::new(transport.clone()));
        CurriculumGenerator::new(Arc::new(client))
    }

    fn curriculum() -> Curriculum {
        Curriculum::from_value(json!({
            "title": "Neural Nets",
            "modules": [
                {"id": "m1", "title": "Bigrams", "concepts": ["counting", "sampling", "smoothing"]},
                {"id": "m2", "title": "MLP", "concepts": ["embeddings", "tanh", "batching"]},
                {"id": "m3", "title": "Attention", "concepts": ["softmax"]}
            ]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_topic_generation_adds_provenance() {
        let transport = FakeTransport::replying(&[r#"{"title": "GPT from scratch", "modules": []}"#]);
        let generator = generator("gpt-5-mini", &transport);

        let outcome = generator
            .generate_from_topic("transformers", "beginner", "4 weeks")
            .await
            .unwrap();
        let value = outcome.into_value();
        assert_eq!(value["generated_from"], "topic");
        assert_eq!(value["input_topic"], "transformers");
        assert_eq!(value["level"], "beginner");

        let sent = transport.sent();
        assert_eq!(sent[0].verbosity, Some(Verbosity::High));
        assert_eq!(sent[0].reasoning_effort, Some(ReasoningEffort::High));
        assert!(sent[0].response_format.is_some());
        assert!(sent[0].messages[1].content.contains("Design a comprehensive curriculum for: transformers"));
    }

    #[tokio::test]
    async fn test_failed_generation_has_no_provenance() {
        let transport = FakeTransport::replying(&["I cannot do that"]);
        let generator = generator("gpt-4", &transport);

        let value = generator
            .generate_from_topic("rust", "advanced", "2 weeks")
            .await
            .unwrap()
            .into_value();
        assert_eq!(value["error"], "Failed to parse curriculum");
        assert_eq!(value["raw_response"], "I cannot do that");
        assert!(value.get("generated_from").is_none());
    }

    #[tokio::test]
    async fn test_syllabus_input_is_bounded() {
        let transport = FakeTransport::replying(&[r#"{"title": "ML"}"#]);
        let generator = generator("gpt-4", &transport);

        let structure = SyllabusStructure {
            topics: (0..15).map(|i| format!("topic {}", i)).collect(),
            prerequisites: (0..8).map(|i| format!("pre {}", i)).collect(),
            ..Default::default()
        };
        let content = "x".repeat(5000);

        let value = generator
            .generate_from_syllabus(&content, &structure)
            .await
            .unwrap()
            .into_value();
        assert_eq!(value["generated_from"], "syllabus");
        assert_eq!(value["syllabus_structure"]["topics"][14], "topic 14");

        let prompt = &transport.sent()[0].messages[1].content;
        assert!(prompt.contains("topic 9"));
        assert!(!prompt.contains("topic 10"));
        assert!(prompt.contains("pre 4"));
        assert!(!prompt.contains("pre 5"));
        assert!(prompt.contains(&"x".repeat(3000)));
        assert!(!prompt.contains(&"x".repeat(3001)));
    }

    #[tokio::test]
    async fn test_repository_generation() {
        let transport = FakeTransport::replying(&[r#"{"title": "micrograd"}"#]);
        let generator = generator("gpt-4", &transport);

        let analysis = RepoAnalysis {
            name: "micrograd".into(),
            description: None,
            url: "https://github.com/karpathy/micrograd".into(),
            language: Some("Jupyter Notebook".into()),
            topics: vec![],
            stars: 10,
            structure: DirectoryListing::default(),
            readme: "A tiny autograd engine".into(),
            key_files: vec![],
            specific_path: None,
        };

        let value = generator
            .generate_from_repository(&analysis)
            .await
            .unwrap()
            .into_value();
        assert_eq!(value["generated_from"], "github");
        assert_eq!(value["repository"]["name"], "micrograd");
        assert_eq!(value["repository"]["language"], "Jupyter Notebook");

        let prompt = &transport.sent()[0].messages[1].content;
        assert!(prompt.starts_with("Given the following github_repository content:"));
        assert!(prompt.contains("Description: N/A"));
    }

    #[tokio::test]
    async fn test_project_uses_prior_concepts_and_difficulty() {
        let transport = FakeTransport::replying(&[r#"{"title": "Mini attention"}"#]);
        let generator = generator("gpt-5", &transport);
        let curriculum = curriculum();

        let outcome = generator
            .generate_project(&curriculum.modules[2], &curriculum)
            .await
            .unwrap();
        assert!(outcome.is_parsed());

        let sent = transport.sent();
        let prompt = &sent[0].messages[1].content;
        assert!(prompt.contains("learning: Attention"));
        assert!(prompt.contains("Prerequisites: counting, sampling, smoothing, embeddings, tanh\n"));
        assert!(prompt.contains("Difficulty: advanced"));
        assert_eq!(sent[0].verbosity, Some(Verbosity::High));
        assert_eq!(sent[0].reasoning_effort, Some(ReasoningEffort::Medium));
    }

    #[tokio::test]
    async fn test_project_parse_failure_kind() {
        let transport = FakeTransport::replying(&["oops"]);
        let generator = generator("gpt-4", &transport);
        let curriculum = curriculum();

        let outcome = generator
            .generate_project(&curriculum.modules[0], &curriculum)
            .await
            .unwrap();
        assert_eq!(outcome.error(), Some("Failed to parse project scaffold"));
    }

    #[tokio::test]
    async fn test_adaptation_report() {
        let transport = FakeTransport::replying(&[
            r#"{"recommendations": ["slow down"], "pace_adjustment": "slower"}"#,
            "not json",
        ]);
        let generator = generator("gpt-4", &transport);
        let original = json!({"title": "Neural Nets", "modules": []});
        let progress = ProgressSummary {
            completed: vec!["m1".into(), "m2".into()],
            in_progress: vec!["m3".into()],
        };

        let value = generator
            .adapt_curriculum(&original, &progress, Some("too fast"))
            .await
            .unwrap()
            .into_value();
        assert_eq!(value["original_curriculum"], original);
        assert_eq!(value["adaptations"]["pace_adjustment"], "slower");
        assert_eq!(value["based_on_progress"], 2);

        let failed = generator
            .adapt_curriculum(&original, &progress, None)
            .await
            .unwrap()
            .into_value();
        assert_eq!(failed["error"], "Failed to generate adaptations");
        assert_eq!(failed["raw_response"], "not json");

        let prompt = &transport.sent()[0].messages[1].content;
        assert!(prompt.contains("Current Curriculum: Neural Nets\nCompleted Modules: m1, m2\nIn Progress: m3"));
    }

    #[tokio::test]
    async fn test_guidance_keeps_last_five_turns() {
        let transport = FakeTransport::replying(&["Try printing the shapes.", "ok"]);
        let generator = generator("gpt-5-mini", &transport);
        let history: Vec<ChatMessage> = (0..8)
            .map(|i| {
                if i % 2 == 0 {
                    ChatMessage::user(format!("q{}", i))
                } else {
                    ChatMessage::assistant(format!("a{}", i))
                }
            })
            .collect();

        let answer = generator
            .learning_guidance("why NaN?", "Learning: GPT", Some("MLP"), &history, None)
            .await
            .unwrap();
        assert_eq!(answer, "Try printing the shapes.");

        let sent = transport.sent();
        let messages = &sent[0].messages;
        assert_eq!(messages.len(), 1 + 5 + 1);
        assert_eq!(messages[0].content, prompts::GUIDANCE_SYSTEM_PROMPT);
        assert_eq!(messages[1].content, "a3");
        assert_eq!(
            messages[6].content,
            "Context: Learning: GPT\nCurrent Module: MLP\n\nQuestion: why NaN?"
        );
        assert_eq!(sent[0].verbosity, Some(Verbosity::Medium));
        assert!(sent[0].response_format.is_none());

        generator
            .learning_guidance("hi", "ctx", None, &[], Some(KarpathyMode::AblationMode))
            .await
            .unwrap();
        let sent = transport.sent();
        assert!(sent[1].messages[0].content.starts_with("You guide systematic ablation"));
        assert_eq!(sent[1].messages[1].content, "Context: ctx\n\nQuestion: hi");
    }

    #[tokio::test]
    async fn test_template_generation() {
        let transport = FakeTransport::replying(&[r#"{"title": "LLM"}"#]);
        let generator = generator("gpt-4", &transport);
        let template = QuickStartTemplate::find("llm").unwrap();

        let value = generator
            .generate_from_template(template)
            .await
            .unwrap()
            .into_value();
        assert_eq!(value["generated_from"], "template");
        assert_eq!(value["template"], "llm");

        let sent = transport.sent();
        assert_eq!(sent[0].messages[0].content, prompts::CURRICULUM_EXPERT_PROMPT);
        assert!(sent[0].messages[1].content.contains("CRITICAL: Follow Karpathy's teaching philosophy"));
    }

    #[tokio::test]
    async fn test_upstream_error_propagates() {
        let transport = FakeTransport::default();
        let generator = generator("gpt-4", &transport);

        let result = generator.explain_code("x = 1", None).await;
        assert!(matches!(
            result,
            Err(crate::CurriculumError::Completion(CompletionError::Network(_)))
        ));
    }
}
