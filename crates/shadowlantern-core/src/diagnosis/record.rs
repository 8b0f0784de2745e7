//! Finished diagnoses kept for later use (lantern seeding, review).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::flows::FlowKind;
use super::machine::PhaseResponses;

/// Most records kept per flow.
const RECORDS_PER_FLOW: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisRecord {
    pub flow: FlowKind,
    pub completed_at: DateTime<Utc>,
    pub responses: Vec<PhaseResponses>,
    /// Analysis result as returned to the user.
    #[serde(default)]
    pub analysis: Value,
    #[serde(default)]
    pub primary_value: Option<String>,
    #[serde(default)]
    pub from_fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosisHistory {
    pub records: Vec<DiagnosisRecord>,
}

impl DiagnosisHistory {
    pub fn record(&mut self, record: DiagnosisRecord) {
        info!(flow = record.flow.as_str(), fallback = record.from_fallback, "diagnosis recorded");
        let flow = record.flow;
        self.records.push(record);

        let count = self.records.iter().filter(|r| r.flow == flow).count();
        if count > RECORDS_PER_FLOW {
            if let Some(oldest) = self.records.iter().position(|r| r.flow == flow) {
                self.records.remove(oldest);
            }
        }
    }

    pub fn latest(&self, flow: FlowKind) -> Option<&DiagnosisRecord> {
        self.records.iter().rev().find(|r| r.flow == flow)
    }

    /// Primary value of the most recent diagnosis that found one.
    pub fn latest_primary_value(&self) -> Option<&str> {
        self.records
            .iter()
            .rev()
            .find_map(|r| r.primary_value.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn record(flow: FlowKind, minute: u32, value: Option<&str>) -> DiagnosisRecord {
        DiagnosisRecord {
            flow,
            completed_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap(),
            responses: Vec::new(),
            analysis: Value::Null,
            primary_value: value.map(str::to_string),
            from_fallback: false,
        }
    }

    #[test]
    fn latest_per_flow() {
        let mut history = DiagnosisHistory::default();
        history.record(record(FlowKind::Shadow, 1, Some("Freedom")));
        history.record(record(FlowKind::Cci, 2, None));
        assert_eq!(history.latest(FlowKind::Shadow).unwrap().completed_at.minute(), 1);
        assert_eq!(history.latest_primary_value(), Some("Freedom"));
        assert!(history.latest(FlowKind::Sentence).is_none());
    }

    #[test]
    fn keeps_bounded_records_per_flow() {
        let mut history = DiagnosisHistory::default();
        history.record(record(FlowKind::Cci, 0, None));
        for m in 0..(RECORDS_PER_FLOW as u32 + 3) {
            history.record(record(FlowKind::Shadow, m, None));
        }
        let shadows = history.records.iter().filter(|r| r.flow == FlowKind::Shadow);
        assert_eq!(shadows.count(), RECORDS_PER_FLOW);
        assert!(history.latest(FlowKind::Cci).is_some());
    }
}
