//! Prompt templates.

use serde_json::Value;

use crate::document::Difficulty;

/// System prompt for curriculum generation.
pub const CURRICULUM_SYSTEM_PROMPT: &str = "You are an expert educator following Andrej Karpathy's \"learn by doing\" philosophy.
You create structured, project-based curricula that emphasize building over theory.
Every concept should be learned through implementation and hands-on coding.";

/// System prompt for quick-start template generation.
pub const CURRICULUM_EXPERT_PROMPT: &str = "You are an expert curriculum designer inspired by Andrej Karpathy's teaching philosophy.
Your core principles:
- \"What I cannot create, I do not understand\" - learning through building
- Every concept must be implemented in code
- Theory serves practice, not the other way around
- Start simple, build complexity gradually
- Projects should be exciting and immediately useful
- Debugging and failure are essential learning tools";

/// System prompt for project scaffolds.
pub const PROJECT_SYSTEM_PROMPT: &str =
    "You are a coding instructor who creates engaging, practical projects.";

/// System prompt for code review.
pub const REVIEW_SYSTEM_PROMPT: &str =
    "You are a code reviewer focused on learning and improvement.";

/// System prompt for curriculum adaptation.
pub const ADAPTATION_SYSTEM_PROMPT: &str =
    "You are an adaptive learning system that personalizes curricula based on progress.";

/// Default system prompt for the learning assistant chat.
pub const GUIDANCE_SYSTEM_PROMPT: &str = "You are a supportive coding instructor following the \"learn by doing\" philosophy.
Guide learners through implementation, encourage experimentation, and help debug issues.
Focus on understanding through building rather than just explaining theory.
When helping with code, provide hints and guidance rather than complete solutions.";

/// System prompt for code explanations.
pub const LEARNING_COACH_PROMPT: &str = "You are a supportive coding mentor who guides through implementation.
Your approach:
- Give hints, not solutions
- Encourage experimentation and \"productive failure\"
- Celebrate debugging as learning
- Connect code to concepts
- Suggest \"what if\" modifications
- Build confidence through incremental success";

const CURRICULUM_SHAPE: &str = r#"{
    "title": "Course title",
    "description": "Brief course description",
    "prerequisites": ["list", "of", "prerequisites"],
    "estimated_duration": "X weeks",
    "modules": [
        {
            "id": "module_1",
            "title": "Module title",
            "description": "What you'll build",
            "learning_outcomes": ["outcome1", "outcome2"],
            "concepts": ["concept1", "concept2"],
            "projects": [
                {
                    "name": "Project name",
                    "description": "What you'll build",
                    "difficulty": "beginner/intermediate/advanced",
                    "estimated_time": "X hours",
                    "skills_practiced": ["skill1", "skill2"]
                }
            ],
            "exercises": [
                {
                    "type": "coding/debugging/optimization",
                    "description": "Exercise description",
                    "difficulty": "easy/medium/hard"
                }
            ]
        }
    ],
    "capstone_project": {
        "title": "Final project title",
        "description": "Comprehensive project description",
        "requirements": ["req1", "req2"],
        "deliverables": ["deliverable1", "deliverable2"]
    }
}"#;

const SCAFFOLD_SHAPE: &str = r#"{
    "title": "Project title",
    "goal": "What you'll build",
    "learning_objectives": ["obj1", "obj2"],
    "implementation_steps": [
        {
            "step": 1,
            "title": "Step title",
            "description": "What to do",
            "code_hint": "Optional code snippet",
            "checkpoint": "How to verify this step works"
        }
    ],
    "starter_code": "Complete starter code with TODOs",
    "test_cases": [
        {
            "description": "Test description",
            "input": "Test input",
            "expected_output": "Expected result"
        }
    ],
    "extensions": ["challenge1", "challenge2"],
    "debugging_tips": ["tip1", "tip2"]
}"#;

const ANALYSIS_SHAPE: &str = r#"{
    "requirements_met": true/false,
    "completeness_score": 0-100,
    "strengths": ["strength1", "strength2"],
    "improvements": ["improvement1", "improvement2"],
    "bugs": ["bug1", "bug2"],
    "next_steps": ["suggestion1", "suggestion2"]
}"#;

const ADAPTATION_SHAPE: &str = r#"{
    "recommendations": ["rec1", "rec2"],
    "pace_adjustment": "faster/slower/maintain",
    "additional_projects": [{project specs}],
    "module_modifications": [{module changes}]
}"#;

/// User prompt asking for a curriculum built from `input`.
pub fn curriculum_generation_prompt(source_type: &str, input: &str) -> String {
    format!(
        "Given the following {source_type} content:

{input}

Generate a comprehensive, project-based curriculum that:
1. Breaks concepts into buildable projects (not just theory)
2. Each module includes hands-on coding exercises
3. Projects build on each other progressively
4. Focuses on implementation and practical understanding
5. Includes clear learning outcomes
6. Suggests real-world applications

Return as JSON with this structure:
{CURRICULUM_SHAPE}"
    )
}

/// User prompt asking for a project scaffold.
pub fn scaffold_prompt(topic: &str, prerequisites: &[String], difficulty: Difficulty) -> String {
    format!(
        "Design a hands-on coding project for learning: {topic}

Prerequisites: {prerequisites}
Difficulty: {difficulty}

Create a detailed project specification including:
1. Clear project goal and what the learner will build
2. Step-by-step implementation guide with milestones
3. Starter code template with TODO comments
4. Test cases to verify completion
5. Extension challenges for advanced learners
6. Common pitfalls and debugging tips

Make it engaging, practical, and focused on building real understanding through implementation.

Return as JSON with structure:
{SCAFFOLD_SHAPE}",
        prerequisites = prerequisites.join(", "),
    )
}

/// User prompt asking for a structured code review.
pub fn analysis_prompt(code: &str, requirements: &Value) -> String {
    let requirements =
        serde_json::to_string_pretty(requirements).unwrap_or_else(|_| requirements.to_string());
    format!(
        "Analyze this code submission for a learning project:

Project Requirements:
{requirements}

Submitted Code:
```
{code}
```

Provide constructive feedback including:
1. Whether requirements are met
2. Code quality and style
3. Potential improvements
4. Bug identification
5. Learning suggestions

Return as JSON:
{ANALYSIS_SHAPE}"
    )
}

/// User prompt asking how to adapt a curriculum to progress so far.
pub fn adaptation_prompt(
    title: &str,
    completed: &[String],
    in_progress: &[String],
    feedback: Option<&str>,
) -> String {
    format!(
        "Current Curriculum: {title}
Completed Modules: {completed}
In Progress: {in_progress}
User Feedback: {feedback}

Suggest adaptations:
1. Should any modules be simplified or expanded?
2. Are there missing topics based on progress?
3. Should the pace be adjusted?
4. What additional projects would help?

Return as JSON with structure:
{ADAPTATION_SHAPE}",
        completed = completed.join(", "),
        in_progress = in_progress.join(", "),
        feedback = feedback.filter(|f| !f.trim().is_empty()).unwrap_or("None"),
    )
}

/// Brief for a topic-based curriculum.
pub fn curriculum_prompt(topic: &str, level: &str, duration: &str) -> String {
    format!(
        "Design a comprehensive curriculum for: {topic}

Learning Level: {level}
Preferred Duration: {duration}
Philosophy: Learn by building, inspired by Karpathy's approach

Structure Required:
1. Clear learning path with 5-8 modules
2. Each module has 2-3 hands-on projects
3. Projects build upon previous work
4. Include debugging challenges
5. Real-world applications
6. Estimated time commitments

For each module provide:
- Title and core concept
- What you'll build (specific project)
- Key skills practiced
- Common mistakes to learn from
- Extension challenges

Make it exciting and immediately practical!"
    )
}

/// Brief for a single learning project.
pub fn project_prompt(concept: &str, prerequisites: &[String]) -> String {
    let prerequisites = if prerequisites.is_empty() {
        "None".to_string()
    } else {
        prerequisites.join(", ")
    };

    format!(
        "Design a hands-on project to learn: {concept}

Prerequisites: {prerequisites}

Create an engaging project that:
1. Teaches {concept} through building something real
2. Starts with working code that needs modification
3. Includes intentional bugs to fix
4. Has clear checkpoints for progress
5. Suggests experiments and variations

Structure:
- Project goal (what they'll build)
- Starter code with TODOs
- Step-by-step implementation guide
- Test cases for validation
- Common errors and fixes
- \"What if\" experiments
- Extension challenges

Make it fun and immediately useful!"
    )
}

/// Ask for an explanation of `code`, or for debugging guidance when an
/// error is given.
pub fn explanation_prompt(code: &str, error: Option<&str>) -> String {
    match error.filter(|e| !e.trim().is_empty()) {
        Some(error) => format!(
            "A learner encountered this error while coding:

Code:
```
{code}
```

Error:
```
{error}
```

Provide guidance that:
1. Helps them understand WHY the error occurred
2. Guides them to find the solution (don't give it directly)
3. Suggests debugging strategies
4. Explains the underlying concept
5. Prevents similar errors in future

Be encouraging and treat errors as learning opportunities!"
        ),
        None => format!(
            "Explain this code in the context of learning by doing:

Code:
```
{code}
```

Provide:
1. What the code does (in plain language)
2. Key concepts demonstrated
3. Potential modifications to explore
4. Common mistakes to avoid
5. Real-world applications

Focus on building intuition through experimentation!"
        ),
    }
}

/// Ask for free-text feedback on a project submission.
pub fn review_prompt(code: &str, requirements: &str) -> String {
    format!(
        "Review this learning project submission:

Requirements:
{requirements}

Submitted Code:
```
{code}
```

Provide constructive feedback:
1. What works well (be specific)
2. Requirements completion status
3. Code quality observations
4. Bugs or potential issues
5. Improvement suggestions
6. Next learning steps

Be encouraging while pushing for excellence!"
    )
}

/// A quick-start curriculum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickStartTemplate {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Longer design brief, when one exists.
    pub brief: Option<&'static str>,
}

impl QuickStartTemplate {
    pub fn find(key: &str) -> Option<&'static QuickStartTemplate> {
        QUICK_START_TEMPLATES.iter().find(|t| t.key == key)
    }

    /// Generation input: the description, followed by the brief if any.
    pub fn input(&self) -> String {
        match self.brief {
            Some(brief) => format!("{}\n\n{}", self.description, brief),
            None => self.description.to_string(),
        }
    }
}

pub const QUICK_START_TEMPLATES: &[QuickStartTemplate] = &[
    QuickStartTemplate {
        key: "llm",
        title: "🤖 Build Your Own LLM",
        description: "Learn to build language models from scratch, starting with bigrams and progressing to transformers",
        brief: Some(
            "Create a curriculum for building Language Models from scratch.
Start with character-level models and progress to transformer architecture.
Each module should result in a working implementation that students can experiment with.
Include projects like:
- Bigram language model
- N-gram model with smoothing
- Simple RNN
- LSTM text generator
- Attention mechanism
- Mini-GPT implementation",
        ),
    },
    QuickStartTemplate {
        key: "web",
        title: "🌐 Full-Stack Web Dev",
        description: "Master web development by building real applications with modern frameworks",
        brief: Some(
            "Design a full-stack web development curriculum.
Focus on building real applications from day one.
Progress from static sites to dynamic applications.
Include projects like:
- Personal portfolio
- Interactive todo app
- Real-time chat application
- Social media clone
- E-commerce platform
- API development",
        ),
    },
    QuickStartTemplate {
        key: "data",
        title: "📊 Data Science by Doing",
        description: "Learn data science through hands-on projects with real datasets",
        brief: Some(
            "Create a data science curriculum through practical projects.
Emphasize understanding through implementation.
Build custom implementations before using libraries.
Include projects like:
- Data parser from scratch
- Statistical analyzer
- Visualization engine
- ML algorithm implementations
- Neural network from numpy
- Real dataset analysis",
        ),
    },
    QuickStartTemplate {
        key: "games",
        title: "🎮 Game Development",
        description: "Create games while learning programming fundamentals",
        brief: None,
    },
    QuickStartTemplate {
        key: "systems",
        title: "🔧 Systems Programming",
        description: "Build low-level tools and understand how computers really work",
        brief: None,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generation_prompt_embeds_input_and_shape() {
        let prompt = curriculum_generation_prompt("syllabus", "Week 1: tensors");
        assert!(prompt.starts_with("Given the following syllabus content:\n\nWeek 1: tensors"));
        assert!(prompt.contains("\"capstone_project\""));
        assert!(prompt.contains("\"id\": \"module_1\""));
    }

    #[test]
    fn test_scaffold_prompt() {
        let prompt = scaffold_prompt(
            "Attention",
            &["softmax".to_string(), "matmul".to_string()],
            Difficulty::Advanced,
        );
        assert!(prompt.contains("Prerequisites: softmax, matmul\nDifficulty: advanced"));
        assert!(prompt.contains("\"starter_code\""));
    }

    #[test]
    fn test_analysis_prompt_pretty_prints_requirements() {
        let prompt = analysis_prompt("print(1)", &json!({"title": "Counter"}));
        assert!(prompt.contains("{\n  \"title\": \"Counter\"\n}"));
        assert!(prompt.contains("```\nprint(1)\n```"));
    }

    #[test]
    fn test_adaptation_prompt_feedback_default() {
        let prompt = adaptation_prompt("GPT", &["m1".into(), "m2".into()], &[], None);
        assert!(prompt.contains("Completed Modules: m1, m2\nIn Progress: \nUser Feedback: None"));

        let prompt = adaptation_prompt("GPT", &[], &["m3".into()], Some("too fast"));
        assert!(prompt.contains("User Feedback: too fast"));
    }

    #[test]
    fn test_project_prompt_without_prerequisites() {
        assert!(project_prompt("tokenizers", &[]).contains("Prerequisites: None"));
        assert!(project_prompt("tokenizers", &["regex".into()]).contains("Prerequisites: regex"));
    }

    #[test]
    fn test_explanation_prompt_modes() {
        let debugging = explanation_prompt("x = 1/0", Some("ZeroDivisionError"));
        assert!(debugging.contains("Error:\n```\nZeroDivisionError\n```"));

        let explaining = explanation_prompt("x = 1", None);
        assert!(explaining.starts_with("Explain this code"));
        assert_eq!(explanation_prompt("x = 1", Some("  ")), explaining);
    }

    #[test]
    fn test_review_prompt() {
        let prompt = review_prompt("fn main() {}", "Print hello");
        assert!(prompt.contains("Requirements:\nPrint hello"));
    }

    #[test]
    fn test_quick_start_templates() {
        assert_eq!(QUICK_START_TEMPLATES.len(), 5);
        let llm = QuickStartTemplate::find("llm").unwrap();
        assert!(llm.input().contains("Mini-GPT implementation"));
        let games = QuickStartTemplate::find("games").unwrap();
        assert_eq!(games.input(), games.description);
        assert!(QuickStartTemplate::find("cooking").is_none());
    }
}
