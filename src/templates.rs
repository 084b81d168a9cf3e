//! Starting points for new notes.
//!
//! A note can start blank, from a study template (title, color, style and a
//! content scaffold), or from a quick prompt that becomes the title.
use crate::{NoteDraft, NotebookStyle, Result};

/// Quick palette offered when creating a note. The first entry is the
/// default for blank notes.
pub const COLOR_OPTIONS: [&str; 12] = [
    "#2563eb", "#f97316", "#10b981", "#facc15", "#ef4444", "#a855f7", "#0ea5e9", "#fb7185",
    "#38bdf8", "#22d3ee", "#94a3b8", "#f472b6",
];

/// Color preselected for notes started from a quick prompt.
pub const PROMPT_COLOR: &str = "#0ea5e9";

/// A ready-made study card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyTemplate {
    pub id: &'static str,
    pub emoji: &'static str,
    pub course: &'static str,
    pub focus: &'static str,
    pub description: &'static str,
    pub tasks: &'static [&'static str],
    pub default_title: &'static str,
    pub default_style: NotebookStyle,
    pub suggested_color: &'static str,
    pub note_scaffold: &'static str,
}

pub static STUDY_TEMPLATES: [StudyTemplate; 3] = [
    StudyTemplate {
        id: "math-final",
        emoji: "📐",
        course: "Calculus",
        focus: "Limits & derivatives review card",
        description: "Collect the key formulas and sample problems for the weekend exam on one page.",
        tasks: &[
            "Definitions and key theorems",
            "Sample problem + solution steps",
            "What I got stuck on / questions",
        ],
        default_title: "Math - Limits summary",
        default_style: NotebookStyle::Lined,
        suggested_color: "#4f46e5",
        note_scaffold: "📌 Limits & derivatives review plan\n\n1. Key definitions / theorems:\n- \n\n2. Sample problem and solution:\n- Problem:\n- Solution steps:\n\n3. Stuck on / ask the lecturer:\n- ",
    },
    StudyTemplate {
        id: "biology-lab",
        emoji: "🧬",
        course: "Biology Lab",
        focus: "Lab report draft",
        description: "Record the hypothesis, experiment steps and observations as a table.",
        tasks: &[
            "Hypothesis and aim",
            "Materials / method",
            "Observations and result",
            "Extra notes",
        ],
        default_title: "Bio lab - Cell mitosis experiment",
        default_style: NotebookStyle::Grid,
        suggested_color: "#059669",
        note_scaffold: "🔬 Lab report\n\nHypothesis:\nAim:\n\nMaterials / Method:\n- \n\nObservations:\n- \n\nResult & discussion:\n- ",
    },
    StudyTemplate {
        id: "history-essay",
        emoji: "📚",
        course: "Modern History",
        focus: "Essay plan",
        description: "Fill the introduction, body and conclusion with your main arguments.",
        tasks: &[
            "Thesis statement",
            "3 supporting arguments",
            "Sources / quotes",
            "Closing sentence",
        ],
        default_title: "History - Assessment essay",
        default_style: NotebookStyle::Plain,
        suggested_color: "#c026d3",
        note_scaffold: "📝 Essay plan\n\nThesis statement:\n\nIntroduction:\n- hook\n- context\n\nBody arguments:\n1)\n2)\n3)\n\nSource notes:\n- \n\nConclusion:\n- ",
    },
];

pub const QUICK_PROMPTS: [&str; 4] = [
    "After-class insight",
    "Lecturer emphasis",
    "Likely exam questions",
    "Things I left out",
];

pub fn find_template(id: &str) -> Option<&'static StudyTemplate> {
    STUDY_TEMPLATES.iter().find(|template| template.id == id)
}

/// Where a new note starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationContext {
    Blank,
    Template(&'static StudyTemplate),
    Prompt(String),
}

impl CreationContext {
    /// Title suggested before the user types anything.
    pub fn initial_title(&self) -> &str {
        match self {
            CreationContext::Blank => "",
            CreationContext::Template(template) => template.default_title,
            CreationContext::Prompt(prompt) => prompt,
        }
    }

    pub fn initial_color(&self) -> &str {
        match self {
            CreationContext::Blank => COLOR_OPTIONS[0],
            CreationContext::Template(template) => template.suggested_color,
            CreationContext::Prompt(_) => PROMPT_COLOR,
        }
    }

    pub fn initial_style(&self) -> NotebookStyle {
        match self {
            CreationContext::Template(template) => template.default_style,
            _ => NotebookStyle::Plain,
        }
    }

    /// Body the note starts with, given the title the user confirmed.
    pub fn initial_content(&self, title: &str) -> String {
        match self {
            CreationContext::Blank => String::new(),
            CreationContext::Template(template) => template.note_scaffold.to_string(),
            CreationContext::Prompt(_) => format!("# {}\n\n", title),
        }
    }

    /// Builds a draft, falling back to this context's suggestions for any
    /// value the user did not supply.
    pub fn draft(
        &self,
        title: Option<&str>,
        color: Option<&str>,
        style: Option<NotebookStyle>,
    ) -> Result<NoteDraft> {
        let draft = NoteDraft::new(
            title.unwrap_or(self.initial_title()),
            color.unwrap_or(self.initial_color()),
            style.unwrap_or(self.initial_style()),
        )?;
        let content = self.initial_content(draft.title());
        Ok(draft.with_content(content))
    }
}
