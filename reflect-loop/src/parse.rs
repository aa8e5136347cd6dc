//! Parses the oracle's single-line reply into an [`Action`].

use reflect_sinks::{Action, ActionKind};

const PREFIXES: &[(&str, ActionKind)] = &[
    ("IDLE:", ActionKind::Idle),
    ("REFLECT:", ActionKind::Reflect),
    ("GOAL:", ActionKind::Goal),
    ("ESCALATE:", ActionKind::Escalate),
];

/// Trims `reply` and case-insensitively prefix-matches it against
/// `{IDLE:, REFLECT:, GOAL:, ESCALATE:}`. On a match the remainder becomes
/// both the description and payload. On no match the action is `reflect`
/// with the full (trimmed) reply as its description.
#[must_use]
pub fn parse_action(reply: &str) -> Action {
    let trimmed = reply.trim();
    let lowered = trimmed.to_ascii_lowercase();

    for (prefix, kind) in PREFIXES {
        if lowered.starts_with(&prefix.to_ascii_lowercase()) {
            let remainder = trimmed[prefix.len()..].trim();
            return Action::new(*kind, remainder, remainder);
        }
    }

    Action::new(ActionKind::Reflect, trimmed, trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_prefix_case_insensitively() {
        let action = parse_action("escalate: prod database is down");
        assert_eq!(action.kind(), ActionKind::Escalate);
        assert_eq!(action.payload(), "prod database is down");
    }

    #[test]
    fn unrecognized_reply_defaults_to_reflect() {
        let action = parse_action("I'm not sure what to do next.");
        assert_eq!(action.kind(), ActionKind::Reflect);
        assert_eq!(action.description(), "I'm not sure what to do next.");
    }

    #[test]
    fn idle_prefix_is_recognized() {
        let action = parse_action("IDLE: nothing needs attention");
        assert_eq!(action.kind(), ActionKind::Idle);
        assert!(!action.requires_handling());
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let action = parse_action("  GOAL: roll out v2  \n");
        assert_eq!(action.kind(), ActionKind::Goal);
        assert_eq!(action.payload(), "roll out v2");
    }
}
