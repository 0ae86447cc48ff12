//! Question definitions — the nodes of the wizard's step graph.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Reserved id of the entry step.
pub const START_STEP: &str = "start";
/// Reserved id of the terminal step.
pub const RESULTS_STEP: &str = "results";

/// The input variant a step presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    SingleSelect,
    MultiSelect,
    Slider,
    ContactFields,
    LocationSelect,
    AiRecommendation,
    Terminal,
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SingleSelect => "single-select",
            Self::MultiSelect => "multi-select",
            Self::Slider => "slider",
            Self::ContactFields => "contact-fields",
            Self::LocationSelect => "location-select",
            Self::AiRecommendation => "ai-recommendation",
            Self::Terminal => "terminal",
        };
        write!(f, "{s}")
    }
}

/// One selectable option on a select-kind step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    pub value: String,
    pub label: String,
}

impl QuestionOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Slider bounds and default.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SliderConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default_value: f64,
}

/// A single step of the wizard.
///
/// Successors are either static (`next_step_id`, always wins) or resolved
/// through the `branches` table keyed by the literal answer value. The
/// branching table is explicit: answers never double as step ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub kind: QuestionKind,
    /// Form key the answer is stored under; defaults to the step id.
    /// Lets branch-specific steps ("life-coverage-level") share one
    /// semantic key ("coverage-level").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_key: Option<String>,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered options for select kinds; empty otherwise.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<QuestionOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slider: Option<SliderConfig>,
    /// Field names collected by contact-fields steps.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    /// Static successor; if set, used unconditionally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step_id: Option<String>,
    /// Dynamic successors: answer value -> next step id.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub branches: HashMap<String, String>,
}

impl Question {
    /// Start a builder for a step of the given kind.
    pub fn builder(id: impl Into<String>, kind: QuestionKind) -> QuestionBuilder {
        QuestionBuilder {
            question: Question {
                id: id.into(),
                kind,
                answer_key: None,
                prompt: String::new(),
                description: None,
                options: Vec::new(),
                slider: None,
                fields: Vec::new(),
                next_step_id: None,
                branches: HashMap::new(),
            },
        }
    }

    /// Whether this step ends the wizard.
    pub fn is_terminal(&self) -> bool {
        self.kind == QuestionKind::Terminal
    }

    /// The form key this step's answer is stored under.
    pub fn answer_key(&self) -> &str {
        self.answer_key.as_deref().unwrap_or(&self.id)
    }

    /// All successor ids this step can reach (static first, then branches).
    pub fn successors(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        if let Some(ref next) = self.next_step_id {
            out.push(next);
        }
        let mut branch_targets: Vec<&str> = self.branches.values().map(String::as_str).collect();
        branch_targets.sort_unstable();
        out.extend(branch_targets);
        out
    }
}

/// Fluent builder for [`Question`].
pub struct QuestionBuilder {
    question: Question,
}

impl QuestionBuilder {
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.question.prompt = prompt.into();
        self
    }

    pub fn key(mut self, answer_key: impl Into<String>) -> Self {
        self.question.answer_key = Some(answer_key.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.question.description = Some(description.into());
        self
    }

    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.question.options.push(QuestionOption::new(value, label));
        self
    }

    pub fn slider(mut self, min: f64, max: f64, step: f64, default_value: f64) -> Self {
        self.question.slider = Some(SliderConfig {
            min,
            max,
            step,
            default_value,
        });
        self
    }

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.question.fields.push(name.into());
        self
    }

    pub fn next(mut self, step_id: impl Into<String>) -> Self {
        self.question.next_step_id = Some(step_id.into());
        self
    }

    pub fn branch(mut self, answer: impl Into<String>, step_id: impl Into<String>) -> Self {
        self.question.branches.insert(answer.into(), step_id.into());
        self
    }

    pub fn build(self) -> Question {
        self.question
    }
}
