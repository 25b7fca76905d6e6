//! Launcher template with a single required placeholder

use crate::{Error, Result};

/// Launcher source shipped with the builder
pub const LAUNCHER_TEMPLATE: &str = include_str!("resources/launcher.js");

/// Runtime bridge shipped verbatim next to the launcher
pub const BRIDGE_SOURCE: &str = include_str!("resources/bridge.js");

/// Token in [`LAUNCHER_TEMPLATE`] replaced with the entry statements
pub const PLACEHOLDER: &str = "// PLACEHOLDER";

/// A template whose placeholder is known to occur exactly once
#[derive(Debug, Clone, Copy)]
pub struct LauncherTemplate<'a> {
    source: &'a str,
    placeholder: &'a str,
}

impl<'a> LauncherTemplate<'a> {
    /// Check that `placeholder` occurs exactly once in `source`
    pub fn new(source: &'a str, placeholder: &'a str) -> Result<Self> {
        let occurrences = if placeholder.is_empty() {
            0
        } else {
            source.matches(placeholder).count()
        };
        if occurrences != 1 {
            return Err(Error::Template {
                placeholder: placeholder.to_string(),
                occurrences,
            });
        }
        Ok(Self {
            source,
            placeholder,
        })
    }

    /// Replace the placeholder with `replacement`
    #[must_use]
    pub fn render(&self, replacement: &str) -> String {
        self.source.replacen(self.placeholder, replacement, 1)
    }
}

/// Statements that enter the `user` directory and load the bundled module
/// at `user/<entrypoint>`.
#[must_use]
pub fn entry_statements(bundled_path: &str) -> String {
    let specifier = serde_json::Value::String(format!("./{bundled_path}")).to_string();
    format!(r#"process.chdir("./user"); listener = require({specifier});"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_template_has_one_placeholder() {
        assert!(LauncherTemplate::new(LAUNCHER_TEMPLATE, PLACEHOLDER).is_ok());
    }

    #[test]
    fn test_render_replaces_placeholder() {
        let template = LauncherTemplate::new("a\n// PLACEHOLDER\nb", PLACEHOLDER).unwrap();
        assert_eq!(template.render("x();"), "a\nx();\nb");
    }

    #[test]
    fn test_missing_placeholder() {
        let err = LauncherTemplate::new("no token here", PLACEHOLDER).unwrap_err();
        assert!(matches!(err, Error::Template { occurrences: 0, .. }));
    }

    #[test]
    fn test_duplicate_placeholder() {
        let err =
            LauncherTemplate::new("// PLACEHOLDER\n// PLACEHOLDER", PLACEHOLDER).unwrap_err();
        assert!(matches!(err, Error::Template { occurrences: 2, .. }));
    }

    #[test]
    fn test_entry_statements() {
        assert_eq!(
            entry_statements("user/index.js"),
            r#"process.chdir("./user"); listener = require("./user/index.js");"#
        );
        assert_eq!(
            entry_statements(r#"user/we"ird.js"#),
            r#"process.chdir("./user"); listener = require("./user/we\"ird.js");"#
        );
    }
}
