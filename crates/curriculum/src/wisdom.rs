//! Philosophy copy shown around the UI.

use rand::seq::SliceRandom;
use rand::Rng;

/// A quote with a one-line gloss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub text: &'static str,
    pub context: &'static str,
}

const fn quote(text: &'static str, context: &'static str) -> Quote {
    Quote { text, context }
}

pub const QUOTES: &[Quote] = &[
    quote("Build small, real things.", "Start with tiny, working implementations"),
    quote("What I cannot create, I do not understand.", "True understanding comes from building"),
    quote("Clarity beats cleverness.", "Write code that explains itself"),
    quote("Plots > opinions.", "Let the data speak through visualization"),
    quote("Own the stack end-to-end.", "Understand every layer of your system"),
    quote("One experiment, one lesson.", "Each iteration should teach you something"),
    quote("Overfit first, then generalize.", "Make it work on one example before scaling"),
    quote("Debugging is the curriculum.", "Errors are your best teachers"),
    quote("Tight loops, fast feedback.", "Short experiments, quick iterations"),
    quote("Instrument everything.", "Measure, plot, understand"),
    quote("Data ≫ lore.", "Inspect your data before trusting assumptions"),
    quote("Simple > fancy.", "Complexity must be earned"),
    quote("Reproduce & ablate.", "Rebuild results, then remove pieces"),
    quote("Readable code wins.", "Small files, clear names, zero magic"),
    quote("Teach to learn.", "Explaining solidifies understanding"),
];

/// (title, description) principle cards, in display order.
pub const PRINCIPLES: &[(&str, &str)] = &[
    ("🔨 Do the Thing", "Implement tiny, working versions before reading/watching more."),
    ("🏗️ From Scratch First", "Write minimal reference code you can step through line-by-line."),
    ("🔄 End-to-End Mindset", "Own the whole pipeline (data → model → train → eval → deploy)."),
    ("🎯 Overfit Then Generalize", "Make it work on a toy problem, then scale."),
    ("📊 Instrument Everything", "Plot losses, grads, activations; let the graphs teach you."),
    ("🔍 Data ≫ Lore", "Inspect samples, labels, splits; catch leaks and shortcuts early."),
    ("✨ Simple > Fancy", "Fewer layers, fewer knobs; complexity is earned."),
    ("🧪 Reproduce & Ablate", "Rebuild results, then remove pieces to see what truly matters."),
    ("⚡ Tight Loops", "Short experiments, fast iteration, frequent checkpoints."),
    ("📖 Readable Code", "Small files, clear names, zero magic; comments explain why, not what."),
    ("🎁 Concrete Artifacts", "Every lesson ends with something you can run or demo."),
    ("👨‍🏫 Teach to Learn", "Write notes, explain decisions, log what surprised you."),
];

pub const LEARNING_MANTRAS: &[&str] = &[
    "Start each session with a small experiment you can finish in ≤60 min.",
    "Keep a run journal: config, seed, commit hash, hypothesis, result, next step.",
    "Treat errors as data: debugging is the curriculum.",
    "Prefer deterministic baselines over 'maybe better' tweaks.",
    "One variable at a time: change it, measure it, document it.",
    "Read the source (yours and upstream) when confused; the code is the truth.",
];

pub const ANTI_PATTERNS: &[&str] = &[
    "Broad tutorials with no artifact",
    "Giant refactors before passing baseline",
    "Tuning hyperparams without plots or notes",
    "'It trains' without checking splits or leakage",
    "Multiple changes at once",
    "Complexity before understanding",
];

/// Stages of the end-to-end build pipeline, as (icon, label).
pub const BUILD_PIPELINE: &[(&str, &str)] = &[
    ("📊", "Data"),
    ("🧠", "Model"),
    ("🏋️", "Train"),
    ("📈", "Eval"),
    ("🚀", "Deploy"),
];

pub fn random_quote<R: Rng + ?Sized>(rng: &mut R) -> Quote {
    QUOTES.choose(rng).copied().unwrap_or(QUOTES[0])
}

pub fn random_mantra<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    LEARNING_MANTRAS.choose(rng).copied().unwrap_or(LEARNING_MANTRAS[0])
}

/// The first `count` principle cards.
pub fn principle_cards(count: usize) -> &'static [(&'static str, &'static str)] {
    &PRINCIPLES[..count.min(PRINCIPLES.len())]
}

/// A Socratic prompt about `topic` pitched at `level`.
///
/// Unknown levels are treated as `beginner`.
pub fn socratic_prompt<R: Rng + ?Sized>(topic: &str, level: &str, rng: &mut R) -> String {
    let templates: [&str; 4] = match level {
        "intermediate" => [
            "What happens if you remove half the code from {}?",
            "Can you plot the internals of {} as it runs?",
            "What's the simplest baseline for {}?",
            "How would you instrument {} to understand it better?",
        ],
        "advanced" => [
            "What's the minimal reproduction of {}'s core behavior?",
            "How would you ablate components of {}?",
            "What unexpected behavior emerges in {} at scale?",
            "Can you rebuild {} from memory in 30 minutes?",
        ],
        _ => [
            "What's the smallest working version of {} you can build?",
            "Can you implement {} in under 100 lines?",
            "What would a toy example of {} look like?",
            "How would you test if your {} implementation works?",
        ],
    };

    let template = templates.choose(rng).copied().unwrap_or(templates[0]);
    template.replace("{}", topic)
}
