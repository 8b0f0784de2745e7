//! Quota-driven chat interrogation on top of [`DiagnosisSession`].
//!
//! Each phase runs a fixed number of exchanges. The counter lives on the
//! conversation and resets on every phase transition. Between exchanges the
//! caller supplies the next question, normally from the interpreter, or
//! falls back to [`Conversation::fallback_follow_up`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::flows::{shadow_phase, FlowKind, LAST_RESORT_FOLLOW_UP};
use super::machine::{DiagnosisSession, PhaseResponses, Transition};
use crate::error::{CoreError, ValidationError};

/// What happened after the user answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "turn", rename_all = "snake_case")]
pub enum ChatTurn {
    /// The phase continues; a follow-up question is needed.
    AwaitFollowUp { phase: String, exchange: usize },
    /// Quota reached; the transition and the next opening were logged.
    PhaseChanged {
        transition: String,
        opening: String,
        phase: String,
    },
    /// Last quota reached; the closing message was logged.
    Finished { closing: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    session: DiagnosisSession,
    quota: usize,
    exchanges_in_phase: usize,
}

pub const CLOSING_MESSAGE: &str = "All testimony is in.\n\n\
    Your values have surfaced from the three shadows.\n\
    Request the analysis to hear the verdict.";

impl Conversation {
    /// Start the shadow interrogation, logging the first opening.
    ///
    /// # Errors
    /// Propagates phase validation failures.
    pub fn shadow(quota: usize, now: DateTime<Utc>) -> Result<Self, CoreError> {
        let quota = quota.max(1);
        let mut session = DiagnosisSession::new(FlowKind::Shadow.phases(quota))?;
        if let Some(first) = session.current_phase() {
            let opening = first.prompt.clone();
            session.push_system(opening, now);
        }
        Ok(Self {
            session,
            quota,
            exchanges_in_phase: 0,
        })
    }

    pub fn session(&self) -> &DiagnosisSession {
        &self.session
    }

    pub fn quota(&self) -> usize {
        self.quota
    }

    pub fn exchanges_in_phase(&self) -> usize {
        self.exchanges_in_phase
    }

    pub fn current_phase_id(&self) -> Option<&str> {
        self.session.current_phase().map(|p| p.id.as_str())
    }

    pub fn is_complete(&self) -> bool {
        self.session.is_complete()
    }

    /// Last system line, typically the question awaiting an answer.
    pub fn last_prompt(&self) -> Option<&str> {
        self.session
            .message_log()
            .iter()
            .rev()
            .find(|m| m.speaker == super::machine::Speaker::System)
            .map(|m| m.text.as_str())
    }

    /// Record the user's answer and advance the exchange counter.
    ///
    /// # Errors
    /// Blank answers and answers after completion are rejected unchanged.
    pub fn respond(&mut self, text: &str, now: DateTime<Utc>) -> Result<ChatTurn, ValidationError> {
        let transition = self.session.submit(text, now)?;
        self.exchanges_in_phase += 1;

        match transition {
            Transition::Stayed { phase, .. } => Ok(ChatTurn::AwaitFollowUp {
                phase,
                exchange: self.exchanges_in_phase,
            }),
            Transition::Advanced { from, to } => {
                self.exchanges_in_phase = 0;
                let from_label = label_of(&from);
                let to_label = label_of(&to);
                let transition =
                    format!("The {from_label} examination is complete.\n\nNext comes {to_label}.");
                let opening = self
                    .session
                    .current_phase()
                    .map(|p| p.prompt.clone())
                    .unwrap_or_default();
                self.session.push_system(transition.clone(), now);
                self.session.push_system(opening.clone(), now);
                debug!(from = %from, to = %to, "shadow phase changed");
                Ok(ChatTurn::PhaseChanged {
                    transition,
                    opening,
                    phase: to,
                })
            }
            Transition::Completed { .. } => {
                self.exchanges_in_phase = 0;
                self.session.push_system(CLOSING_MESSAGE, now);
                Ok(ChatTurn::Finished {
                    closing: CLOSING_MESSAGE.to_string(),
                })
            }
        }
    }

    /// Log the next question for the current phase.
    pub fn push_question(&mut self, question: impl Into<String>, now: DateTime<Utc>) {
        self.session.push_system(question, now);
    }

    /// Static follow-up for the current exchange.
    pub fn fallback_follow_up(&self) -> &'static str {
        self.current_phase_id()
            .and_then(shadow_phase)
            .and_then(|p| p.follow_ups.get(self.exchanges_in_phase.saturating_sub(1)))
            .copied()
            .unwrap_or(LAST_RESORT_FOLLOW_UP)
    }

    /// Responses per phase once the interrogation is over.
    ///
    /// # Errors
    /// Fails while phases remain.
    pub fn finish(&self) -> Result<Vec<PhaseResponses>, ValidationError> {
        self.session.finish()
    }
}

fn label_of(phase_id: &str) -> &'static str {
    shadow_phase(phase_id).map(|p| p.label).unwrap_or("this")
}
