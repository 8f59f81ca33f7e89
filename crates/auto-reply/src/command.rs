//! Slash-command detection for inbound text.

use switchboard_config::SwitchboardConfig;

/// Commands every channel understands.
pub const BUILTIN_COMMANDS: &[&str] = &[
    "new", "reset", "clear", "compact", "context", "model", "sandbox", "sessions", "status",
    "stop", "help",
];

/// The command name in `text`, lowercased and without a `@botname` suffix.
fn command_name(text: &str) -> Option<String> {
    let rest = text.trim_start().strip_prefix('/')?;
    let token = rest.split_whitespace().next()?;
    let name = token.split_once('@').map_or(token, |(name, _)| name);
    (!name.is_empty()).then(|| name.to_lowercase())
}

/// Whether `text` starts with a built-in or configured control command.
pub fn has_control_command(text: &str, config: &SwitchboardConfig) -> bool {
    let Some(name) = command_name(text) else {
        return false;
    };
    BUILTIN_COMMANDS.contains(&name.as_str())
        || config
            .messages
            .commands
            .extra
            .iter()
            .map(|extra| extra.trim().trim_start_matches('/'))
            .any(|extra| extra.eq_ignore_ascii_case(&name))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("/new", true)]
    #[case("  /Reset please", true)]
    #[case("/stop@switchboard_bot", true)]
    #[case("/help\nmore", true)]
    #[case("/deploy", false)]
    #[case("/", false)]
    #[case("/@bot", false)]
    #[case("new", false)]
    #[case("hello /new", false)]
    #[case("", false)]
    fn builtins(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(has_control_command(text, &SwitchboardConfig::default()), expected);
    }

    #[test]
    fn configured_extras() {
        let mut cfg = SwitchboardConfig::default();
        cfg.messages.commands.extra = vec!["/Deploy".into(), "pause".into()];
        assert!(has_control_command("/deploy now", &cfg));
        assert!(has_control_command("/PAUSE", &cfg));
        assert!(!has_control_command("/resume", &cfg));
    }
}
