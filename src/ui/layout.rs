//! Page shell.

use std::fmt;

use crate::config::AppMetadata;

/// Document language of every page.
pub const LANG: &str = "en";

/// The frame around every page: metadata plus the document language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageShell {
    pub title: String,
    pub description: String,
    pub lang: &'static str,
}

impl PageShell {
    pub fn new(metadata: &AppMetadata) -> Self {
        Self {
            title: metadata.title.clone(),
            description: metadata.description.clone(),
            lang: LANG,
        }
    }

    /// Frame `body` with the page header.
    pub fn render(&self, body: &dyn fmt::Display) -> String {
        format!("{self}\n{body}")
    }
}

impl Default for PageShell {
    fn default() -> Self {
        Self::new(&AppMetadata::default())
    }
}

impl fmt::Display for PageShell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}]", self.title, self.lang)?;
        write!(f, "{}", self.description)
    }
}
