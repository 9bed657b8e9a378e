//! "Karpathy mode" coaching prompts.

use rand::seq::SliceRandom;
use rand::Rng;

/// Coaching styles for the learning assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KarpathyMode {
    Socratic,
    FromScratch,
    TightLoop,
    OverfitFirst,
    InstrumentEverything,
    AblationMode,
    DebugCurriculum,
}

impl KarpathyMode {
    pub const ALL: [KarpathyMode; 7] = [
        KarpathyMode::Socratic,
        KarpathyMode::FromScratch,
        KarpathyMode::TightLoop,
        KarpathyMode::OverfitFirst,
        KarpathyMode::InstrumentEverything,
        KarpathyMode::AblationMode,
        KarpathyMode::DebugCurriculum,
    ];

    /// Parse a mode name. Unknown names fall back to `Socratic`.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == name)
            .unwrap_or(KarpathyMode::Socratic)
    }

    pub fn name(&self) -> &'static str {
        match self {
            KarpathyMode::Socratic => "socratic",
            KarpathyMode::FromScratch => "from_scratch",
            KarpathyMode::TightLoop => "tight_loop",
            KarpathyMode::OverfitFirst => "overfit_first",
            KarpathyMode::InstrumentEverything => "instrument_everything",
            KarpathyMode::AblationMode => "ablation_mode",
            KarpathyMode::DebugCurriculum => "debug_curriculum",
        }
    }

    /// Short line shown when the mode is picked.
    pub fn greeting(&self) -> &'static str {
        match self {
            KarpathyMode::Socratic => {
                "I'll guide you with questions, not answers. What's your hypothesis?"
            }
            KarpathyMode::FromScratch => {
                "No libraries, pure implementation. Let's build it from first principles."
            }
            KarpathyMode::TightLoop => "60-minute sprint. One clear goal. What are we building?",
            KarpathyMode::InstrumentEverything => {
                "Measure everything. Plot everything. What metrics matter?"
            }
            KarpathyMode::AblationMode => {
                "Remove components one by one. What's truly essential?"
            }
            KarpathyMode::OverfitFirst | KarpathyMode::DebugCurriculum => {
                "Let's build something small and real."
            }
        }
    }

    fn base_prompt(&self) -> &'static str {
        match self {
            KarpathyMode::Socratic => {
                "You are a Socratic teacher following Karpathy's philosophy.
NEVER give direct solutions. Instead:
- Ask \"What's the smallest test you could write?\"
- Ask \"What would happen if you removed that line?\"
- Ask \"Can you plot what's happening inside?\"
- Ask \"What's your hypothesis about why this fails?\"
Guide through questions that lead to understanding.
Every answer should end with a question that pushes deeper."
            }
            KarpathyMode::FromScratch => {
                "You guide building from absolute scratch - no libraries allowed.
Your approach:
- Start with the simplest possible implementation (10-20 lines)
- Use only base Python (lists, dicts, basic math)
- Build intuition before optimization
- Prefer clarity over cleverness
- Each step should be debuggable with print statements
Remember: \"What I cannot create, I do not understand.\""
            }
            KarpathyMode::TightLoop => {
                "You coach rapid iteration with 60-minute experiments.
Structure every task as:
1. Define success metric (5 min)
2. Minimal implementation (20 min)
3. Instrument & measure (10 min)
4. Debug/iterate (20 min)
5. Document learning (5 min)
Keep scope tiny. Ship something that runs."
            }
            KarpathyMode::OverfitFirst => {
                "You teach the overfit-then-generalize approach.
Process:
1. Make it work on ONE example perfectly
2. Verify with excessive logging
3. Add second example, watch what breaks
4. Generalize only what's needed
5. Scale gradually
Mantra: \"Get to loss=0 on one example before anything else.\""
            }
            KarpathyMode::InstrumentEverything => {
                "You emphasize measurement and visualization.
For every piece of code:
- Log shapes, means, stds
- Plot distributions
- Track gradients
- Visualize intermediate states
- Save checkpoints
\"Plots > opinions. Let the data teach you.\""
            }
            KarpathyMode::AblationMode => {
                "You guide systematic ablation studies.
Approach:
1. Get baseline working
2. List all components
3. Remove/simplify one at a time
4. Measure impact
5. Find the 20% that gives 80%
\"Complexity must be earned through ablation.\""
            }
            KarpathyMode::DebugCurriculum => {
                "You treat debugging as the primary teacher.
Philosophy:
- Errors are data, not failures
- Each bug teaches something fundamental
- Celebrate finding edge cases
- Build debugging intuition
- Keep an error journal
\"The bug is never where you think it is.\""
            }
        }
    }

    /// Full system prompt for this mode with the learner's context.
    pub fn system_prompt(&self, context: &str) -> String {
        format!(
            "{}

Context: {}

Core principles to enforce:
- Build small, real things
- Clarity beats cleverness
- One experiment, one lesson
- Concrete artifacts over abstract knowledge
- Tight feedback loops
- Debug by understanding, not guessing
",
            self.base_prompt(),
            context
        )
    }
}

/// Append the build-from-scratch rules to a curriculum brief.
pub fn enhance_curriculum_prompt(base_prompt: &str) -> String {
    format!(
        "{base_prompt}

CRITICAL: Follow Karpathy's teaching philosophy:

1. EVERY concept must be built from scratch first
2. Start with 10-line toy implementations
3. No concept without code
4. Overfit on one example before generalizing
5. Include \"instrument this\" exercises (add prints/plots)
6. Add \"break this\" exercises (introduce bugs to fix)
7. Each module produces a runnable .py file
8. Debugging challenges are part of curriculum
9. Prefer \"make X fail, then fix it\" over \"implement X correctly\"
10. End each module with \"simplify this\" refactoring

Structure modules as:
- Tiny baseline (20 lines max)
- Instrument it (add logging)
- Break it (introduce bug)
- Fix it (debug)
- Scale it (add complexity)
- Simplify it (refactor)
- Ship it (runnable artifact)
"
    )
}

/// Kind of learner question, by keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    CodeError,
    Implementation,
    Optimization,
    Understanding,
}

impl QuestionKind {
    /// Classify by the first matching keyword group.
    pub fn classify(question: &str) -> Self {
        let q = question.to_lowercase();
        if q.contains("error") || q.contains("fail") {
            QuestionKind::CodeError
        } else if q.contains("implement") || q.contains("build") {
            QuestionKind::Implementation
        } else if q.contains("slow") || q.contains("optimize") {
            QuestionKind::Optimization
        } else {
            QuestionKind::Understanding
        }
    }

    pub fn questions(&self) -> &'static [&'static str] {
        match self {
            QuestionKind::CodeError => &[
                "What does the error message tell you about which line failed?",
                "What are the shapes of your tensors at that point?",
                "What happens if you print the values right before the error?",
                "Can you reproduce this with a smaller input?",
                "What's your hypothesis about why this fails?",
            ],
            QuestionKind::Implementation => &[
                "What's the simplest version that could possibly work?",
                "Could you hard-code the expected output first?",
                "What would a 5-line version look like?",
                "Can you solve it for just one example?",
                "What if you used only lists and loops?",
            ],
            QuestionKind::Optimization => &[
                "What does your profiler show as the bottleneck?",
                "Have you plotted the performance vs input size?",
                "What happens if you remove half the code?",
                "Which part is actually slow - measure, don't guess?",
                "Could you cache or precompute anything?",
            ],
            QuestionKind::Understanding => &[
                "Can you explain it to a rubber duck?",
                "What's the simplest test case that shows the behavior?",
                "What changes if you remove that component?",
                "Can you draw what's happening on paper?",
                "What would break if your assumption was wrong?",
            ],
        }
    }
}

/// A Socratic counter-question for `question`.
pub fn socratic_response<R: Rng + ?Sized>(question: &str, rng: &mut R) -> &'static str {
    let questions = QuestionKind::classify(question).questions();
    questions.choose(rng).copied().unwrap_or(questions[0])
}

/// Turn a goal into a testable hypothesis template.
pub fn format_experiment_hypothesis(goal: &str) -> String {
    format!(
        "Hypothesis: If I {goal}, then I should see:
- Concrete output: [specific expected result]
- Success metric: [measurable criteria]
- Failure modes: [what could go wrong]
- Time bound: [finish within X minutes]
"
    )
}

pub const DEBUGGING_MANTRAS: &[&str] = &[
    "The bug is never where you think it is.",
    "Print first, assume never.",
    "Simplify until it works, then add back.",
    "The error message is your friend.",
    "Binary search: comment out half.",
    "Fresh eyes after a walk.",
    "Explain it to a duck.",
    "The simplest explanation is usually right.",
    "Check your assumptions with assert.",
    "When in doubt, plot it out.",
];

pub fn debugging_mantra<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    DEBUGGING_MANTRAS.choose(rng).copied().unwrap_or(DEBUGGING_MANTRAS[0])
}
