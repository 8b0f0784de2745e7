//! Built-in diagnosis flows.

use serde::{Deserialize, Serialize};

use super::machine::PhaseSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    /// Conversational interrogation over envy, rage and loss.
    Shadow,
    /// Unfinished sentences grouped by life area.
    Sentence,
    /// Career construction interview.
    Cci,
    /// Guided value-lantern questions.
    Lantern,
    /// Sorting and ranking the value cards.
    #[serde(rename = "cards")]
    CardSort,
}

impl FlowKind {
    pub const ALL: [FlowKind; 5] = [
        Self::Shadow,
        Self::Sentence,
        Self::Cci,
        Self::Lantern,
        Self::CardSort,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shadow => "shadow",
            Self::Sentence => "sentence",
            Self::Cci => "cci",
            Self::Lantern => "lantern",
            Self::CardSort => "cards",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Shadow => "Shadow Profiling",
            Self::Sentence => "Unfinished Sentences",
            Self::Cci => "Career Construction Interview",
            Self::Lantern => "Value Lantern",
            Self::CardSort => "Value Card Sort",
        }
    }

    /// Whether the flow runs as a [`DiagnosisSession`](super::DiagnosisSession).
    pub fn is_phased(&self) -> bool {
        !matches!(self, Self::CardSort)
    }

    /// Phase sequence for this flow. `chat_quota` only affects the shadow
    /// flow; the card sort has no phases and yields an empty list.
    pub fn phases(&self, chat_quota: usize) -> Vec<PhaseSpec> {
        match self {
            Self::Shadow => shadow_phases(chat_quota),
            Self::Sentence => sentence_phases(),
            Self::Cci => cci_phases(),
            Self::Lantern => lantern_phases(),
            Self::CardSort => Vec::new(),
        }
    }
}

impl std::str::FromStr for FlowKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s.to_lowercase())
            .ok_or_else(|| format!("unknown diagnosis flow: {s}"))
    }
}

// ── Shadow ──────────────────────────────────────────────────────────────

pub(crate) struct ShadowPhase {
    pub id: &'static str,
    pub label: &'static str,
    pub opening: &'static str,
    pub follow_ups: [&'static str; 2],
}

pub(crate) const SHADOW_PHASES: [ShadowPhase; 3] = [
    ShadowPhase {
        id: "envy",
        label: "Envy",
        opening: "Defendant, the first examination begins.\n\
            We start with your envy: a craving for something you want but do not have.\n\
            There is no need to hide it in this court.\n\n\
            Question: whose what do you envy so much you can't stand it?\n\
            Someone on social media, someone close, someone famous. Be specific.",
        follow_ups: [
            "Dig deeper into that. What exactly bothers you?",
            "If you had it, how would your life change?",
        ],
    },
    ShadowPhase {
        id: "rage",
        label: "Rage",
        opening: "Next is your rage.\n\
            Rage is a defense that fires when a rule you must protect gets broken.\n\n\
            Question: what behavior can you never forgive?\n\
            Describe the act that makes you want to lash out.",
        follow_ups: [
            "Which rule of yours did that break?",
            "What would it mean about you if you let it slide?",
        ],
    },
    ShadowPhase {
        id: "loss",
        label: "Loss",
        opening: "The final examination. This one cuts closest.\n\
            Imagine everything being taken away: money, status, honor, relationships,\n\
            one by one.\n\n\
            Question: when everything is taken, what do you refuse to let go of until the end?\n\
            Name the thing without which you would no longer be yourself.",
        follow_ups: [
            "Why that, above everything else?",
            "Who would you be without it?",
        ],
    },
];

pub(crate) const LAST_RESORT_FOLLOW_UP: &str = "Continue.";

pub(crate) fn shadow_phase(id: &str) -> Option<&'static ShadowPhase> {
    SHADOW_PHASES.iter().find(|p| p.id == id)
}

fn shadow_phases(chat_quota: usize) -> Vec<PhaseSpec> {
    let quota = chat_quota.max(1);
    SHADOW_PHASES
        .iter()
        .map(|p| PhaseSpec::exactly(p.id, p.label, p.opening, quota))
        .collect()
}

// ── Unfinished sentences ────────────────────────────────────────────────

pub(crate) const SENTENCE_CATEGORIES: [(&str, &str, &[&str]); 5] = [
    (
        "money",
        "Money",
        &[
            "About money, my family taught me to be ___.",
            "What I fear most about money is ___.",
            "If I found a $100 bill on the ground, I would ___.",
        ],
    ),
    (
        "work",
        "Work",
        &[
            "What I am most proud of in my work is ___.",
            "The one way of working I refuse is ___ work.",
            "When my effort goes unrewarded, I feel ___.",
        ],
    ),
    (
        "relationship",
        "Relationships",
        &[
            "In my family, what I must protect above all is ___.",
            "In love, the thing that ends it for me is ___.",
            "What I value most in my friends is ___.",
        ],
    ),
    (
        "health",
        "Health",
        &[
            "About health, the one thing I won't compromise on is ___.",
            "When I'm near my mental limit, I tend to ___.",
        ],
    ),
    (
        "life",
        "Life",
        &[
            "The one thing in life I refuse to give up is ___.",
            "As an adult I realized I actually valued ___.",
        ],
    ),
];

const SENTENCE_PROMPT: &str = "Complete each sentence with the first thing that comes to mind.";

fn sentence_phases() -> Vec<PhaseSpec> {
    SENTENCE_CATEGORIES
        .iter()
        .map(|(id, label, stems)| {
            PhaseSpec::exactly(id, label, SENTENCE_PROMPT, stems.len())
                .with_items(stems.iter().copied())
        })
        .collect()
}

// ── Career construction interview ───────────────────────────────────────

const CCI_QUESTIONS: [(&str, &str, &str, usize); 6] = [
    (
        "role_models",
        "Role models",
        "Who did you admire or look up to? Name up to three people, real or fictional, and why.",
        3,
    ),
    (
        "favorite_media",
        "Favorite media",
        "What magazines, shows, channels or podcasts do you follow regularly, \
         and what draws you to them?",
        3,
    ),
    (
        "favorite_story",
        "Favorite story",
        "Which book, film or series has stayed with you? Summarize it and say why.",
        2,
    ),
    (
        "motto",
        "Motto",
        "What is your motto or a saying you love? When do you recall it?",
        2,
    ),
    (
        "early_recollections",
        "Early recollections",
        "Share up to three vivid memories from ages 3 to 8, with the feelings you had.",
        3,
    ),
    (
        "subjects_leisure",
        "Subjects and leisure",
        "Which school subjects did you love, or which hobby absorbs you now? Why?",
        3,
    ),
];

fn cci_phases() -> Vec<PhaseSpec> {
    CCI_QUESTIONS
        .iter()
        .map(|(id, label, prompt, max)| PhaseSpec::new(id, label, prompt, 1, *max))
        .collect()
}

// ── Value lantern ───────────────────────────────────────────────────────

pub(crate) const LANTERN_SECTIONS: [(&str, &str, &[&str]); 4] = [
    (
        "flame",
        "Flame",
        &[
            "What is your most important value? Define it in your own words.",
            "Imagine a day where that value is fully realized. What is it like?",
        ],
    ),
    (
        "protection",
        "Protection",
        &[
            "Which habits protect that value? (separate several with ';')",
            "What must you say no to in order to protect it? (separate several with ';')",
        ],
    ),
    (
        "handle",
        "Handle",
        &[
            "What signs does your body show when the value is threatened? (separate with ';')",
            "What signs does your mind show? (separate with ';')",
            "When the signs persist, what do you want to tell yourself?",
        ],
    ),
    (
        "light",
        "Light",
        &[
            "What state are you in when the flame burns bright?",
            "How does that light affect the people around you?",
        ],
    ),
];

fn lantern_phases() -> Vec<PhaseSpec> {
    LANTERN_SECTIONS
        .iter()
        .map(|(id, label, questions)| {
            PhaseSpec::exactly(id, label, "Answer each question in turn.", questions.len())
                .with_items(questions.iter().copied())
        })
        .collect()
}
