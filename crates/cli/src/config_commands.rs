use {anyhow::Result, clap::Subcommand};

use switchboard_config::{Diagnostic, Severity, SwitchboardConfig, validate};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the loaded configuration and report warnings.
    Validate {
        /// Show informational diagnostics too.
        #[arg(long)]
        verbose: bool,
    },
    /// Print the effective configuration as JSON.
    Show,
}

pub fn handle_config(action: ConfigAction, config: &SwitchboardConfig) -> Result<()> {
    match action {
        ConfigAction::Validate { verbose } => {
            for line in check(config, verbose) {
                eprintln!("{line}");
            }
            Ok(())
        },
        ConfigAction::Show => crate::print_json(config),
    }
}

/// ANSI color codes.
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Report lines for `config validate`, ending with a summary.
fn check(config: &SwitchboardConfig, verbose: bool) -> Vec<String> {
    let diagnostics = validate(config);

    let mut lines: Vec<String> = diagnostics
        .iter()
        .filter(|d| verbose || d.severity != Severity::Info)
        .map(render)
        .collect();
    if !lines.is_empty() {
        lines.push(String::new());
    }

    let warnings = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    lines.push(if warnings == 0 {
        "No issues found.".to_string()
    } else {
        format!("{warnings} warning(s)")
    });
    lines
}

fn render(d: &Diagnostic) -> String {
    let color = match d.severity {
        Severity::Warning => YELLOW,
        Severity::Info => CYAN,
    };
    format!("  {BOLD}{color}{}{RESET} {}: {}", d.severity, d.path, d.message)
}

#[cfg(test)]
mod tests {
    use {super::*, std::io::Write, switchboard_config::load_config};

    fn load(toml: &str) -> SwitchboardConfig {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(toml.as_bytes()).unwrap();
        load_config(file.path()).unwrap()
    }

    #[test]
    fn clean_config_reports_no_issues() {
        let config = load("[[agents.list]]\nid = \"main\"\n");
        assert_eq!(check(&config, true), vec!["No issues found."]);
    }

    #[test]
    fn warnings_are_listed_and_counted() {
        let config = load("[[agents.list]]\nid = \"main\"\n\n[[agents.list]]\nid = \"MAIN\"\n");
        let lines = check(&config, false);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("agents.list[1].id"));
        assert!(lines[0].contains("duplicate agent id"));
        assert_eq!(lines[2], "1 warning(s)");
    }

    #[test]
    fn info_needs_verbose() {
        let config = load(concat!(
            "[[agents.list]]\nid = \"main\"\n\n",
            "[channels.slack]\nhistory_limit = 0\n",
        ));
        assert_eq!(check(&config, false), vec!["No issues found."]);

        let lines = check(&config, true);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("channels.slack.history_limit"));
        assert_eq!(lines[2], "No issues found.");
    }

    #[test]
    fn show_serializes_the_loaded_config() {
        let config = load(concat!(
            "[[agents.list]]\nid = \"main\"\nname = \"Main\"\n\n",
            "[channels.telegram]\ndebounceMs = 250\n",
        ));
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["agents"]["list"][0]["id"], "main");
        assert_eq!(value["agents"]["list"][0]["name"], "Main");
        assert_eq!(value["channels"]["telegram"]["debounce_ms"], 250);
    }
}
