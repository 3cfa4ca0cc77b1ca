// Pipeline output types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sentiment::Sentiment;

/// One analyzed speaker turn. Records are independent of each other and
/// ordered by the diarizer's turn start times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Turn start in seconds.
    pub start_time: f64,
    /// Turn end in seconds.
    pub end_time: f64,
    /// Speaker display label.
    pub speaker: String,
    /// Transcript text, empty only under the emit-empty policy.
    pub transcription: String,
    /// Top-k sentiment labels, best first. Empty when the transcription is
    /// empty.
    pub sentiment: Vec<Sentiment>,
}

impl fmt::Display for AnalysisRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Time: {:.2}s - {:.2}s", self.start_time, self.end_time)?;
        writeln!(f, "Speaker: {}", self.speaker)?;
        writeln!(f, "Transcription: {}", self.transcription)?;
        if self.sentiment.is_empty() {
            write!(f, "Sentiment: -")
        } else {
            let labels: Vec<String> = self
                .sentiment
                .iter()
                .map(|s| format!("{} ({:.2})", s.label, s.score))
                .collect();
            write!(f, "Sentiment: {}", labels.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_block() {
        let record = AnalysisRecord {
            start_time: 0.0,
            end_time: 2.5,
            speaker: "Speaker 1".to_string(),
            transcription: "hello there".to_string(),
            sentiment: vec![Sentiment {
                label: "POSITIVE".to_string(),
                score: 0.987,
            }],
        };
        let text = record.to_string();
        assert!(text.contains("Time: 0.00s - 2.50s"));
        assert!(text.contains("Speaker: Speaker 1"));
        assert!(text.contains("Transcription: hello there"));
        assert!(text.contains("Sentiment: POSITIVE (0.99)"));
    }

    #[test]
    fn test_display_without_sentiment() {
        let record = AnalysisRecord {
            start_time: 1.0,
            end_time: 2.0,
            speaker: "Speaker 2".to_string(),
            transcription: String::new(),
            sentiment: Vec::new(),
        };
        assert!(record.to_string().ends_with("Sentiment: -"));
    }
}
