//! Tiny wins: small achievements with a streak and a daily count.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Wins closer together than this extend the streak.
const STREAK_WINDOW_SECS: i64 = 3600;

/// An achievement kind from the fixed catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinKind {
    pub key: &'static str,
    pub icon: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

const fn kind(
    key: &'static str,
    icon: &'static str,
    title: &'static str,
    description: &'static str,
) -> WinKind {
    WinKind {
        key,
        icon,
        title,
        description,
    }
}

pub const WIN_KINDS: &[WinKind] = &[
    kind("first_run", "🏃", "First Run", "Got code running!"),
    kind("debug_fix", "🐛", "Bug Squashed", "Fixed an error"),
    kind("plot_made", "📊", "Plot Created", "Visualized data"),
    kind("baseline", "📈", "Baseline Set", "Established baseline"),
    kind("overfit", "🎯", "Overfit Achieved", "Made it work on one example"),
    kind("generalize", "🌍", "Generalized", "Scaled to more examples"),
    kind("refactor", "♻️", "Refactored", "Simplified code"),
    kind("instrument", "🔍", "Instrumented", "Added logging/metrics"),
    kind("reproduce", "🔄", "Reproduced", "Matched expected results"),
    kind("ablation", "🧪", "Ablated", "Identified key component"),
    kind("speedup", "⚡", "Optimized", "Made it faster"),
    kind("readable", "📖", "Clarified", "Made code more readable"),
    kind("artifact", "🎁", "Shipped", "Created runnable artifact"),
    kind("taught", "👨‍🏫", "Explained", "Documented learning"),
];

impl WinKind {
    pub fn find(key: &str) -> Option<&'static WinKind> {
        WIN_KINDS.iter().find(|k| k.key == key)
    }
}

/// A recorded win.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TinyWin {
    pub kind: &'static str,
    pub icon: &'static str,
    pub title: &'static str,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-session wins log.
#[derive(Debug, Clone, Default)]
pub struct TinyWins {
    wins: Vec<TinyWin>,
    streak: u32,
    daily_count: u32,
}

impl TinyWins {
    /// Record a win of `kind`. Empty `details` use the kind's description.
    ///
    /// Returns `None` for kinds outside the catalog.
    pub fn add_win(&mut self, kind: &str, details: &str) -> Option<&TinyWin> {
        self.add_win_at(kind, details, Utc::now())
    }

    pub(crate) fn add_win_at(
        &mut self,
        kind: &str,
        details: &str,
        now: DateTime<Utc>,
    ) -> Option<&TinyWin> {
        let kind = WinKind::find(kind)?;

        match self.wins.last() {
            Some(previous) => {
                self.streak = if (now - previous.timestamp).num_seconds() < STREAK_WINDOW_SECS {
                    self.streak + 1
                } else {
                    1
                };
                self.daily_count = if previous.timestamp.date_naive() == now.date_naive() {
                    self.daily_count + 1
                } else {
                    1
                };
            }
            None => {
                self.streak = 1;
                self.daily_count = 1;
            }
        }

        let description = if details.trim().is_empty() {
            kind.description.to_string()
        } else {
            details.trim().to_string()
        };

        self.wins.push(TinyWin {
            kind: kind.key,
            icon: kind.icon,
            title: kind.title,
            description,
            timestamp: now,
        });
        self.wins.last()
    }

    pub fn total(&self) -> usize {
        self.wins.len()
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn daily_count(&self) -> u32 {
        self.daily_count
    }

    /// The last `limit` wins, oldest first.
    pub fn recent(&self, limit: usize) -> &[TinyWin] {
        let start = self.wins.len().saturating_sub(limit);
        &self.wins[start..]
    }

    pub fn motivational_message(&self) -> &'static str {
        match self.wins.len() {
            0 => "🚀 Ready to start building? Every expert was once a beginner!",
            1..=4 => "💪 Great start! Keep those tiny wins coming!",
            5..=9 => "🔥 You're on fire! Building momentum one win at a time!",
            10..=19 => "⭐ Impressive progress! You're embodying the build-to-learn philosophy!",
            _ => "🏆 Master builder! You've truly embraced learning by doing!",
        }
    }

    /// Plain-text log of every win.
    pub fn export(&self) -> String {
        let mut output = format!("🏆 TINY WINS LOG\n{}\n\n", "=".repeat(40));
        for win in &self.wins {
            output.push_str(&format!(
                "{} {}\n   {}\n   {}\n\n",
                win.icon,
                win.title,
                win.description,
                win.timestamp.format("%Y-%m-%d %H:%M")
            ));
        }
        output
    }
}

/// "just now", "5 min ago", "2 hours ago", "1 day ago".
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);
    let plural = |n: i64| if n > 1 { "s" } else { "" };

    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3600 {
        format!("{} min ago", seconds / 60)
    } else if seconds < 86_400 {
        let hours = seconds / 3600;
        format!("{} hour{} ago", hours, plural(hours))
    } else {
        let days = seconds / 86_400;
        format!("{} day{} ago", days, plural(days))
    }
}
