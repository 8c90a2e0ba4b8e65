//! Speech transcript intake.
//!
//! Capture itself happens elsewhere; this module only folds the recognizer's
//! events into the text that gets submitted when capture ends.

use serde::{Deserialize, Serialize};

/// Events produced by a speech recognizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum TranscriptEvent {
    Started,
    /// Provisional text for the phrase being spoken; replaces the previous one.
    Interim(String),
    /// A settled phrase.
    Final(String),
    End,
    Error(String),
}

/// Running transcript for one capture session.
#[derive(Debug, Default, Clone)]
pub struct TranscriptAccumulator {
    final_text: String,
    interim: String,
    listening: bool,
}

impl TranscriptAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// What the input box should show right now.
    pub fn preview(&self) -> &str {
        if self.final_text.is_empty() {
            &self.interim
        } else {
            &self.final_text
        }
    }

    /// Fold one event in. Returns the text to submit when capture ends with a
    /// non-empty final transcript.
    pub fn apply(&mut self, event: TranscriptEvent) -> Option<String> {
        match event {
            TranscriptEvent::Started => {
                self.reset();
                self.listening = true;
                None
            }
            TranscriptEvent::Interim(text) => {
                self.interim = text;
                None
            }
            TranscriptEvent::Final(text) => {
                self.final_text.push_str(&text);
                self.final_text.push(' ');
                self.interim.clear();
                None
            }
            TranscriptEvent::End => {
                let transcript = self.final_text.trim().to_string();
                self.reset();
                (!transcript.is_empty()).then_some(transcript)
            }
            TranscriptEvent::Error(reason) => {
                // Recognizers still send `End` afterwards; settled text is kept for it.
                tracing::warn!(%reason, "Speech recognition error");
                self.interim.clear();
                self.listening = false;
                None
            }
        }
    }

    fn reset(&mut self) {
        self.final_text.clear();
        self.interim.clear();
        self.listening = false;
    }
}
