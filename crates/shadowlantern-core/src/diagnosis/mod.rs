//! Guided diagnosis flows.
//!
//! [`DiagnosisSession`] is the generic phase machine. [`Conversation`] adds
//! the per-phase exchange quota used by the shadow interrogation, and
//! [`FlowKind`] provides the built-in phase sequences. [`CardSort`] is the
//! one flow that ranks value cards instead of collecting answers.

mod card_sort;
mod conversation;
mod flows;
mod machine;
mod record;

pub use card_sort::{
    CardChoice, CardSort, CardSortResult, CardSortStep, RankMove, RankedValue, FINAL_SIZE,
    SHORTLIST_SIZE,
};
pub use conversation::{ChatTurn, Conversation, CLOSING_MESSAGE};
pub use flows::FlowKind;
pub use record::{DiagnosisHistory, DiagnosisRecord};
pub(crate) use flows::{LANTERN_SECTIONS, SENTENCE_CATEGORIES};
pub use machine::{
    DiagnosisSession, LogMessage, PhaseResponses, PhaseSpec, SessionStatus, Speaker, Transition,
};
