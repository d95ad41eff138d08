//! Memory capture: deciding whether a chat exchange should leave an `auto`
//! memory behind, and what that memory says.

use crate::config::MemoryCaptureConfig;

/// Decides whether an exchange becomes a memory entry.
pub trait MemoryCapturePolicy: Send + Sync {
    /// Content of the memory to write, or `None` to write nothing.
    fn capture(&self, input: &str, reply: &str) -> Option<String>;
}

/// Length/keyword trigger.
///
/// Fires when the reply is longer than `min_reply_chars` characters or the
/// input contains `keyword` (case-sensitive). The memory echoes the input and
/// the first `reply_preview_chars` characters of the reply. This is a crude
/// trigger, not semantic extraction.
#[derive(Debug, Clone)]
pub struct HeuristicCapture {
    pub min_reply_chars: usize,
    pub keyword: String,
    pub reply_preview_chars: usize,
    pub input_preview_chars: usize,
}

impl Default for HeuristicCapture {
    fn default() -> Self {
        Self::from_config(&MemoryCaptureConfig::default())
    }
}

impl HeuristicCapture {
    pub fn from_config(config: &MemoryCaptureConfig) -> Self {
        Self {
            min_reply_chars: config.min_reply_chars,
            keyword: config.keyword.clone(),
            reply_preview_chars: config.reply_preview_chars,
            input_preview_chars: config.input_preview_chars,
        }
    }

    pub fn triggers(&self, input: &str, reply: &str) -> bool {
        let keyword_hit = !self.keyword.is_empty() && input.contains(self.keyword.as_str());
        reply.chars().count() > self.min_reply_chars || keyword_hit
    }
}

impl MemoryCapturePolicy for HeuristicCapture {
    fn capture(&self, input: &str, reply: &str) -> Option<String> {
        if !self.triggers(input, reply) {
            return None;
        }
        let said = truncate_chars(input, self.input_preview_chars);
        let said = if said.len() < input.len() {
            format!("{said}...")
        } else {
            said.to_string()
        };
        let responded = truncate_chars(reply, self.reply_preview_chars);
        Some(format!("User said: \"{said}\". AI responded: \"{responded}...\""))
    }
}

/// Never writes anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCapture;

impl MemoryCapturePolicy for NeverCapture {
    fn capture(&self, _input: &str, _reply: &str) -> Option<String> {
        None
    }
}

/// Policy selected by `[memory_capture]`.
pub fn policy_from_config(config: &MemoryCaptureConfig) -> Box<dyn MemoryCapturePolicy> {
    if config.enabled {
        Box::new(HeuristicCapture::from_config(config))
    } else {
        Box::new(NeverCapture)
    }
}

/// Longest prefix of `s` holding at most `max` characters.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_reply_triggers() {
        let policy = HeuristicCapture::default();
        let reply = "x".repeat(120);
        let memory = policy.capture("remind me to call mom", &reply).unwrap();
        assert_eq!(
            memory,
            format!(
                "User said: \"remind me to call mom\". AI responded: \"{}...\"",
                "x".repeat(50)
            )
        );
    }

    #[test]
    fn short_reply_without_keyword_does_not_trigger() {
        let policy = HeuristicCapture::default();
        assert!(policy.capture("how are you", &"y".repeat(40)).is_none());
    }

    #[test]
    fn threshold_is_strictly_greater() {
        let policy = HeuristicCapture::default();
        assert!(policy.capture("hi", &"z".repeat(100)).is_none());
        assert!(policy.capture("hi", &"z".repeat(101)).is_some());
    }

    #[test]
    fn keyword_triggers_on_short_reply() {
        let policy = HeuristicCapture::default();
        let memory = policy.capture("please remember my gym is at 6", "Noted.").unwrap();
        assert!(memory.contains("AI responded: \"Noted....\""));
        // literal, case-sensitive match
        assert!(policy.capture("Remember this", "Noted.").is_none());
    }

    #[test]
    fn long_input_is_truncated_on_char_boundary() {
        let policy = HeuristicCapture {
            input_preview_chars: 3,
            ..HeuristicCapture::default()
        };
        let memory = policy.capture("ééééé remember", "ok").unwrap();
        assert!(memory.starts_with("User said: \"ééé...\"."));
    }

    #[test]
    fn disabled_config_never_captures() {
        let config = MemoryCaptureConfig {
            enabled: false,
            ..MemoryCaptureConfig::default()
        };
        let policy = policy_from_config(&config);
        assert!(policy.capture("remember", &"x".repeat(500)).is_none());
    }
}
