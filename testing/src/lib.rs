//! Helpers shared by the test suites of the workspace crates.

use ansi_term::Colour;
use difference::{Changeset, Difference};
use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

/// Installs a global subscriber that writes through the test harness, so
/// output is only shown for failing tests. Filtered by `RUST_LOG`.
///
/// Safe to call from every test.
pub fn init_logger() {
    static INIT: OnceCell<()> = OnceCell::new();

    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        // Another harness may already have installed one.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init();
    });
}

/// A line based, colored diff of two strings.
pub fn diff(actual: &str, expected: &str) -> String {
    let Changeset { diffs, .. } = Changeset::new(actual, expected, "\n");

    let mut out = String::new();
    for d in diffs {
        match d {
            Difference::Same(ref x) => {
                out += &format!(" {}\n", x.replace('\n', "\n "));
            }
            Difference::Add(ref x) => {
                out += &format!("{}\n", Colour::Green.paint(format!("+{}", x.replace('\n', "\n+"))));
            }
            Difference::Rem(ref x) => {
                out += &format!("{}\n", Colour::Red.paint(format!("-{}", x.replace('\n', "\n-"))));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_strings_have_no_changes() {
        let out = diff("a\nb", "a\nb");
        assert!(!out.contains('+'));
        assert!(!out.contains('-'));
    }

    #[test]
    fn changed_line_is_marked() {
        let out = diff("a\nb", "a\nc");
        assert!(out.contains("-b"));
        assert!(out.contains("+c"));
    }
}
