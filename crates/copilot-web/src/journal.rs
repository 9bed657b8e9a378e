//! Experiment journal: hypothesis, config, metrics and the lesson learned.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentStatus {
    Running,
    Completed,
}

impl ExperimentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperimentStatus::Running => "running",
            ExperimentStatus::Completed => "completed",
        }
    }
}

/// Code, plot or note attached to an experiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifact {
    pub name: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Experiment {
    /// 1-based, in start order.
    pub id: u32,
    pub timestamp: DateTime<Utc>,
    pub hypothesis: String,
    pub config: Map<String, Value>,
    pub status: ExperimentStatus,
    pub result: Option<String>,
    pub insight: Option<String>,
    /// Seconds from start to completion.
    pub duration: Option<f64>,
    pub artifacts: Vec<Artifact>,
    pub metrics: BTreeMap<String, f64>,
}

/// Per-session experiment log with at most one running experiment.
#[derive(Debug, Clone, Default)]
pub struct ExperimentJournal {
    experiments: Vec<Experiment>,
    current: Option<usize>,
}

impl ExperimentJournal {
    /// Start an experiment and make it current. Returns its id.
    ///
    /// A still-running experiment stays in the log as `running`.
    pub fn start(&mut self, hypothesis: &str, config: Map<String, Value>) -> u32 {
        self.start_at(hypothesis, config, Utc::now())
    }

    pub(crate) fn start_at(
        &mut self,
        hypothesis: &str,
        config: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> u32 {
        let id = self.experiments.len() as u32 + 1;
        self.experiments.push(Experiment {
            id,
            timestamp: now,
            hypothesis: hypothesis.to_string(),
            config,
            status: ExperimentStatus::Running,
            result: None,
            insight: None,
            duration: None,
            artifacts: Vec::new(),
            metrics: BTreeMap::new(),
        });
        self.current = Some(self.experiments.len() - 1);
        id
    }

    pub fn current(&self) -> Option<&Experiment> {
        self.current.and_then(|idx| self.experiments.get(idx))
    }

    fn current_mut(&mut self) -> Option<&mut Experiment> {
        self.current.and_then(|idx| self.experiments.get_mut(idx))
    }

    /// Record a metric on the current experiment. `false` when none runs.
    pub fn log_metric(&mut self, name: &str, value: f64) -> bool {
        match self.current_mut() {
            Some(experiment) => {
                experiment.metrics.insert(name.to_string(), value);
                true
            }
            None => false,
        }
    }

    pub fn add_artifact(&mut self, name: &str, content: &str) -> bool {
        match self.current_mut() {
            Some(experiment) => {
                experiment.artifacts.push(Artifact {
                    name: name.to_string(),
                    content: content.to_string(),
                    timestamp: Utc::now(),
                });
                true
            }
            None => false,
        }
    }

    /// Close the current experiment with its result and insight.
    pub fn complete(&mut self, result: &str, insight: &str) -> Option<&Experiment> {
        self.complete_at(result, insight, Utc::now())
    }

    pub(crate) fn complete_at(
        &mut self,
        result: &str,
        insight: &str,
        now: DateTime<Utc>,
    ) -> Option<&Experiment> {
        let idx = self.current.take()?;
        let experiment = self.experiments.get_mut(idx)?;

        experiment.status = ExperimentStatus::Completed;
        experiment.result = Some(result.to_string());
        experiment.insight = Some(insight.to_string());
        experiment.duration = Some((now - experiment.timestamp).num_milliseconds() as f64 / 1000.0);

        Some(&*experiment)
    }

    /// The last `limit` experiments, oldest first.
    pub fn recent(&self, limit: usize) -> &[Experiment] {
        let start = self.experiments.len().saturating_sub(limit);
        &self.experiments[start..]
    }

    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.experiments)
    }

    /// "Exp #N: insight" for every completed experiment with an insight.
    pub fn insights(&self) -> Vec<String> {
        self.experiments
            .iter()
            .filter(|e| e.status == ExperimentStatus::Completed)
            .filter_map(|e| {
                e.insight
                    .as_deref()
                    .filter(|i| !i.is_empty())
                    .map(|i| format!("Exp #{}: {}", e.id, i))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 4, 10, minute, second).unwrap()
    }

    fn config() -> Map<String, Value> {
        match json!({"learning_rate": 0.001, "batch_size": 32}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_lifecycle() {
        let mut journal = ExperimentJournal::default();
        assert!(!journal.log_metric("loss", 1.0));

        let id = journal.start_at("If I halve the lr, loss is smoother", config(), at(0, 0));
        assert_eq!(id, 1);
        assert_eq!(journal.current().unwrap().status, ExperimentStatus::Running);

        assert!(journal.log_metric("loss", 2.3));
        assert!(journal.log_metric("loss", 1.9));
        assert!(journal.add_artifact("train.py", "print('hi')"));

        let done = journal
            .complete_at("smoother curve", "lr was too high", at(1, 30))
            .unwrap();
        assert_eq!(done.status, ExperimentStatus::Completed);
        assert_eq!(done.duration, Some(90.0));
        assert_eq!(done.metrics["loss"], 1.9);
        assert_eq!(done.artifacts.len(), 1);

        assert!(journal.current().is_none());
        assert!(journal.complete_at("again", "nothing", at(2, 0)).is_none());
        assert!(!journal.add_artifact("late.py", ""));
    }

    #[test]
    fn test_sequential_ids_and_recent() {
        let mut journal = ExperimentJournal::default();
        for i in 0..4 {
            journal.start_at(&format!("h{}", i), Map::new(), at(i, 0));
        }
        // Restarting leaves earlier experiments running
        assert_eq!(journal.recent(10)[0].status, ExperimentStatus::Running);
        assert_eq!(journal.current().unwrap().id, 4);

        let recent = journal.recent(2);
        assert_eq!(recent.iter().map(|e| e.id).collect::<Vec<_>>(), vec![3, 4]);
    }

    #[test]
    fn test_export_and_insights() {
        let mut journal = ExperimentJournal::default();
        journal.start_at("a", config(), at(0, 0));
        journal.complete_at("ok", "batch norm matters", at(0, 10));
        journal.start_at("b", Map::new(), at(1, 0));
        journal.complete_at("meh", "", at(1, 5));
        journal.start_at("c", Map::new(), at(2, 0));

        assert_eq!(journal.insights(), vec!["Exp #1: batch norm matters"]);

        let exported: Value = serde_json::from_str(&journal.export_json().unwrap()).unwrap();
        assert_eq!(exported.as_array().unwrap().len(), 3);
        assert_eq!(exported[0]["status"], "completed");
        assert_eq!(exported[0]["config"]["batch_size"], 32);
        assert_eq!(exported[2]["status"], "running");
        assert_eq!(exported[2]["result"], Value::Null);
    }
}
