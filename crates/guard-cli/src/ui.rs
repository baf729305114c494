use std::io::IsTerminal;
use std::sync::OnceLock;

use crate::cli::{GlobalFlags, OutputFormat};

#[derive(Clone, Copy, Debug)]
pub struct UiPrefs {
    pub table_color: bool,
    pub progress: bool,
    pub term_width: Option<usize>,
}

static UI_PREFS: OnceLock<UiPrefs> = OnceLock::new();

pub fn init(flags: &GlobalFlags) {
    let is_tty = std::io::stdout().is_terminal();
    let _ = UI_PREFS.set(resolve(
        flags,
        is_tty,
        std::env::var_os("NO_COLOR").is_some(),
        std::env::var("COLUMNS").ok().as_deref(),
    ));
}

fn resolve(flags: &GlobalFlags, is_tty: bool, no_color: bool, columns: Option<&str>) -> UiPrefs {
    let interactive = is_tty && !flags.quiet;
    UiPrefs {
        table_color: interactive && flags.format == OutputFormat::Table && !no_color,
        progress: interactive && flags.format != OutputFormat::Json,
        term_width: columns
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|width| *width >= 40),
    }
}

#[must_use]
pub fn prefs() -> UiPrefs {
    *UI_PREFS.get().unwrap_or(&UiPrefs {
        table_color: false,
        progress: false,
        term_width: None,
    })
}

#[cfg(test)]
mod tests {
    use super::resolve;
    use crate::cli::{GlobalFlags, OutputFormat};

    fn flags(format: OutputFormat, quiet: bool) -> GlobalFlags {
        GlobalFlags {
            format,
            limit: None,
            quiet,
            verbose: false,
            project: None,
        }
    }

    #[test]
    fn json_never_shows_progress() {
        let prefs = resolve(&flags(OutputFormat::Json, false), true, false, None);
        assert!(!prefs.progress);
        assert!(!prefs.table_color);
    }

    #[test]
    fn table_on_tty_gets_progress_and_color() {
        let prefs = resolve(&flags(OutputFormat::Table, false), true, false, Some("120"));
        assert!(prefs.progress);
        assert!(prefs.table_color);
        assert_eq!(prefs.term_width, Some(120));
    }

    #[test]
    fn quiet_or_piped_output_is_plain() {
        assert!(!resolve(&flags(OutputFormat::Table, true), true, false, None).progress);
        assert!(!resolve(&flags(OutputFormat::Raw, false), false, false, None).progress);
        assert!(!resolve(&flags(OutputFormat::Table, false), true, true, None).table_color);
    }

    #[test]
    fn narrow_or_garbage_columns_are_ignored() {
        let f = flags(OutputFormat::Table, false);
        assert_eq!(resolve(&f, true, false, Some("20")).term_width, None);
        assert_eq!(resolve(&f, true, false, Some("wide")).term_width, None);
    }
}
