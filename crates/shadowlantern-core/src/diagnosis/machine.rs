//! Phase-by-phase response collection.
//!
//! A [`DiagnosisSession`] walks an ordered list of [`PhaseSpec`]s. Each
//! phase accepts between `min_responses` and `max_responses` answers:
//! reaching the maximum advances automatically, and [`advance`] moves on
//! early once the minimum is met. [`go_back`] re-opens the previous phase
//! and hands its answers back for editing.
//!
//! [`advance`]: DiagnosisSession::advance
//! [`go_back`]: DiagnosisSession::go_back

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ValidationError};

/// One step of a diagnosis flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSpec {
    pub id: String,
    pub label: String,
    /// Opening prompt shown when the phase is entered.
    pub prompt: String,
    /// Individual questions within the phase (sentence stems, interview
    /// questions). Empty for free-form phases.
    #[serde(default)]
    pub items: Vec<String>,
    pub min_responses: usize,
    pub max_responses: usize,
}

impl PhaseSpec {
    pub fn new(
        id: &str,
        label: &str,
        prompt: &str,
        min_responses: usize,
        max_responses: usize,
    ) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            prompt: prompt.to_string(),
            items: Vec::new(),
            min_responses,
            max_responses,
        }
    }

    pub fn with_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        self
    }

    /// Phase requiring exactly `n` responses.
    pub fn exactly(id: &str, label: &str, prompt: &str, n: usize) -> Self {
        Self::new(id, label, prompt, n, n)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::InvalidPhase {
                phase: self.id.clone(),
                message: "phase id is empty".into(),
            });
        }
        if self.min_responses == 0 {
            return Err(ConfigError::InvalidPhase {
                phase: self.id.clone(),
                message: "min_responses must be at least 1".into(),
            });
        }
        if self.max_responses < self.min_responses {
            return Err(ConfigError::InvalidPhase {
                phase: self.id.clone(),
                message: format!(
                    "max_responses ({}) is below min_responses ({})",
                    self.max_responses, self.min_responses
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Responses collected for one phase, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseResponses {
    pub phase: String,
    pub label: String,
    pub responses: Vec<String>,
}

/// Where the session stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStatus {
    InPhase {
        index: usize,
        phase: String,
        responses: usize,
        min: usize,
        max: usize,
    },
    Complete,
}

/// Outcome of a submit or an explicit advance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "transition", rename_all = "snake_case")]
pub enum Transition {
    /// Still collecting for the same phase.
    Stayed { phase: String, responses: usize },
    Advanced { from: String, to: String },
    Completed { from: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisSession {
    phases: Vec<PhaseSpec>,
    current: usize,
    responses: Vec<Vec<String>>,
    message_log: Vec<LogMessage>,
}

impl DiagnosisSession {
    /// Start a session at the first phase.
    ///
    /// # Errors
    /// Fails if `phases` is empty or a phase has inconsistent bounds.
    pub fn new(phases: Vec<PhaseSpec>) -> Result<Self, ConfigError> {
        if phases.is_empty() {
            return Err(ConfigError::EmptyPhaseSequence);
        }
        for phase in &phases {
            phase.validate()?;
        }
        let responses = vec![Vec::new(); phases.len()];
        Ok(Self {
            phases,
            current: 0,
            responses,
            message_log: Vec::new(),
        })
    }

    pub fn phases(&self) -> &[PhaseSpec] {
        &self.phases
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.phases.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_phase(&self) -> Option<&PhaseSpec> {
        self.phases.get(self.current)
    }

    /// Responses recorded so far for the current phase.
    pub fn current_responses(&self) -> &[String] {
        self.responses
            .get(self.current)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn responses_for(&self, phase_id: &str) -> Option<&[String]> {
        let index = self.phases.iter().position(|p| p.id == phase_id)?;
        Some(&self.responses[index])
    }

    pub fn message_log(&self) -> &[LogMessage] {
        &self.message_log
    }

    pub fn status(&self) -> SessionStatus {
        match self.current_phase() {
            Some(phase) => SessionStatus::InPhase {
                index: self.current,
                phase: phase.id.clone(),
                responses: self.current_responses().len(),
                min: phase.min_responses,
                max: phase.max_responses,
            },
            None => SessionStatus::Complete,
        }
    }

    /// Append a system line to the log.
    pub fn push_system(&mut self, text: impl Into<String>, now: DateTime<Utc>) {
        self.message_log.push(LogMessage {
            speaker: Speaker::System,
            text: text.into(),
            timestamp: now,
        });
    }

    /// Record a response for the current phase.
    ///
    /// Advances when the phase reaches its maximum.
    ///
    /// # Errors
    /// Rejects blank text and submissions after completion without changing
    /// any state.
    pub fn submit(
        &mut self,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Transition, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::empty("response"));
        }
        let phase = self.current_phase().ok_or(ValidationError::SessionComplete)?;
        let max = phase.max_responses;
        let phase_id = phase.id.clone();
        let recorded = &mut self.responses[self.current];
        if recorded.len() >= max {
            return Err(ValidationError::TooManyResponses { phase: phase_id, max });
        }
        recorded.push(text.to_string());
        let count = recorded.len();
        self.message_log.push(LogMessage {
            speaker: Speaker::User,
            text: text.to_string(),
            timestamp: now,
        });

        if count >= max {
            Ok(self.move_next())
        } else {
            Ok(Transition::Stayed {
                phase: phase_id,
                responses: count,
            })
        }
    }

    /// Leave the current phase before its maximum.
    ///
    /// # Errors
    /// Fails when the minimum has not been met or the session is complete.
    pub fn advance(&mut self) -> Result<Transition, ValidationError> {
        let phase = self.current_phase().ok_or(ValidationError::SessionComplete)?;
        let count = self.current_responses().len();
        if count < phase.min_responses {
            return Err(ValidationError::OutOfRange {
                field: format!("{} responses", phase.id),
                value: count as i64,
                min: phase.min_responses as i64,
                max: phase.max_responses as i64,
            });
        }
        Ok(self.move_next())
    }

    fn move_next(&mut self) -> Transition {
        let from = self.phases[self.current].id.clone();
        self.current += 1;
        match self.current_phase() {
            Some(next) => {
                debug!(from = %from, to = %next.id, "diagnosis phase advanced");
                Transition::Advanced {
                    from,
                    to: next.id.clone(),
                }
            }
            None => {
                debug!(from = %from, "diagnosis complete");
                Transition::Completed { from }
            }
        }
    }

    /// Re-enter the previous phase, discarding its recorded responses.
    ///
    /// Returns the discarded responses so the caller can offer them for
    /// editing. Partial responses in the phase being left are dropped too.
    ///
    /// # Errors
    /// Fails at the first phase.
    pub fn go_back(&mut self) -> Result<Vec<String>, ValidationError> {
        if self.current == 0 {
            return Err(ValidationError::invalid_state("already at the first phase"));
        }
        if let Some(partial) = self.responses.get_mut(self.current) {
            partial.clear();
        }
        self.current -= 1;
        let discarded = std::mem::take(&mut self.responses[self.current]);
        debug!(
            phase = %self.phases[self.current].id,
            discarded = discarded.len(),
            "diagnosis went back"
        );
        Ok(discarded)
    }

    /// All responses in phase order.
    pub fn collected(&self) -> Vec<PhaseResponses> {
        self.phases
            .iter()
            .zip(&self.responses)
            .map(|(phase, responses)| PhaseResponses {
                phase: phase.id.clone(),
                label: phase.label.clone(),
                responses: responses.clone(),
            })
            .collect()
    }

    /// Hand over the collected responses of a completed session.
    ///
    /// # Errors
    /// Fails while phases remain.
    pub fn finish(&self) -> Result<Vec<PhaseResponses>, ValidationError> {
        if !self.is_complete() {
            return Err(ValidationError::invalid_state(format!(
                "diagnosis still in phase {}",
                self.current + 1
            )));
        }
        Ok(self.collected())
    }
}
