//! # Pad View
//!
//! The presentation sink. Classified dumps are rendered into HTML fragments and
//! kept in arrival order; [`PadView::page`] wraps them in a full document. When an
//! output path is configured the document is rewritten after every update, so any
//! browser pointed at the file shows the latest state.

use crate::config::PadConfig;
use crate::formatter::{FormatProvider, Formatter, Templates};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, error, warn};

/// Placeholder shown while a freshly started listener has received nothing.
pub const WAITING_MESSAGE: &str = "Waiting for dump output...";

/// Receives classified dumps and clear signals.
pub trait DumpSink: Send {
    /// Append a dump and refresh the presentation.
    fn dump(&mut self, formatter: &Formatter);
    /// Drop every dump and refresh the presentation.
    fn clear(&mut self);
    /// Drop every dump and show `message` in their place.
    fn reset(&mut self, _message: &str) {
        self.clear();
    }
    /// Apply a freshly loaded configuration.
    fn configure(&mut self, _config: &PadConfig) {}
}

/// Ordered list of rendered dumps plus the page chrome.
pub struct PadView {
    templates: Templates,
    fragments: Vec<String>,
    message: Option<String>,
    port: u16,
    auto_scroll: bool,
    output: Option<PathBuf>,
}

impl PadView {
    /// Create an empty view.
    ///
    /// # Errors
    ///
    /// Fails if the built-in templates do not compile.
    pub fn new(output: Option<PathBuf>) -> Result<Self> {
        let config = PadConfig::default();
        Ok(Self {
            templates: Templates::new().context("failed to compile pad templates")?,
            fragments: Vec::new(),
            message: None,
            port: config.listen_port,
            auto_scroll: config.auto_scroll_to_bottom,
            output,
        })
    }

    /// Pick up the port and scrolling settings from a (re)loaded configuration.
    pub fn set_config(&mut self, config: &PadConfig) {
        self.port = config.listen_port;
        self.auto_scroll = config.auto_scroll_to_bottom;
    }

    #[must_use]
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Render and append a dump without refreshing the output.
    ///
    /// A dump that fails to render is logged and skipped.
    pub fn add(&mut self, formatter: &Formatter) {
        match formatter.render(&self.templates) {
            Ok(fragment) => {
                debug!(variant = %formatter.variant(), fragment_bytes = fragment.len(), "dump added");
                self.fragments.push(fragment);
            }
            Err(err) => error!(variant = %formatter.variant(), error = %err, "skipping dump"),
        }
    }

    /// Reset to an empty pad showing `message` (nothing when empty), without
    /// refreshing the output.
    pub fn clear_without_update(&mut self, message: &str) {
        self.fragments.clear();
        self.message = (!message.is_empty()).then(|| message.to_string());
    }

    /// Reset to an empty pad showing `message` and refresh the output.
    pub fn clear_with_message(&mut self, message: &str) {
        self.clear_without_update(message);
        self.refresh();
    }

    /// The full HTML document.
    ///
    /// # Errors
    ///
    /// Fails if the page template cannot be rendered.
    pub fn page(&self) -> Result<String> {
        let ctx = minijinja::context! {
            message => self.message.as_deref(),
            dumps => self
                .fragments
                .iter()
                .map(|fragment| minijinja::Value::from_safe_string(fragment.clone()))
                .collect::<Vec<_>>(),
            port => self.port,
            auto_scroll => self.auto_scroll,
        };
        self.templates
            .render("page.html", ctx)
            .context("failed to render pad page")
    }

    /// Write the document to the output path, if one is configured.
    ///
    /// # Errors
    ///
    /// Fails if the page cannot be rendered or written.
    pub fn update(&self) -> Result<()> {
        let Some(path) = &self.output else {
            return Ok(());
        };
        let page = self.page()?;
        std::fs::write(path, page)
            .with_context(|| format!("failed to write pad page {}", path.display()))?;
        debug!(path = %path.display(), dumps = self.fragments.len(), "pad page written");
        Ok(())
    }

    fn refresh(&self) {
        if let Err(err) = self.update() {
            warn!(error = %format!("{err:#}"), "pad page not updated");
        }
    }
}

impl DumpSink for PadView {
    fn dump(&mut self, formatter: &Formatter) {
        self.add(formatter);
        self.refresh();
    }

    fn clear(&mut self) {
        self.clear_with_message("");
    }

    fn reset(&mut self, message: &str) {
        self.clear_with_message(message);
    }

    fn configure(&mut self, config: &PadConfig) {
        self.set_config(config);
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::{classify, FormatSettings};
    use serde_json::json;

    fn dump_value(view: &mut PadView, value: serde_json::Value) {
        view.dump(&classify(value, &FormatSettings::default()));
    }

    #[test]
    fn test_dumps_kept_in_order() {
        let mut view = PadView::new(None).unwrap();
        dump_value(&mut view, json!("first"));
        dump_value(&mut view, json!(2));
        assert_eq!(view.fragments().len(), 2);
        assert!(view.fragments()[0].contains("first"));
        assert!(view.fragments()[1].contains('2'));

        let page = view.page().unwrap();
        let first = page.find("first").unwrap();
        let second = page.find("dump-number").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_clear_with_message() {
        let mut view = PadView::new(None).unwrap();
        dump_value(&mut view, json!({"$type": "Foo, Bar", "A": 1}));
        view.clear_with_message(WAITING_MESSAGE);
        assert!(view.fragments().is_empty());
        assert_eq!(view.message(), Some(WAITING_MESSAGE));
        assert!(view.page().unwrap().contains("Waiting for dump output..."));

        view.clear();
        assert_eq!(view.message(), None);
        assert!(!view.page().unwrap().contains("pad-message"));
    }

    #[test]
    fn test_page_settings() {
        let mut view = PadView::new(None).unwrap();
        let config = PadConfig {
            listen_port: 6001,
            auto_scroll_to_bottom: false,
            ..PadConfig::default()
        };
        view.set_config(&config);
        let page = view.page().unwrap();
        assert!(page.contains("Listening on port 6001"));
        assert!(!page.contains("scrollTo"));

        view.set_config(&PadConfig::default());
        assert!(view.page().unwrap().contains("scrollTo"));
    }

    #[test]
    fn test_output_file_follows_updates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pad.html");
        let mut view = PadView::new(Some(path.clone())).unwrap();

        dump_value(&mut view, json!({"$type": "html", "$html": "<b>bold</b>"}));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<b>bold</b>"));

        view.clear();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("<b>bold</b>"));
    }

    #[test]
    fn test_add_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pad.html");
        let mut view = PadView::new(Some(path.clone())).unwrap();
        view.add(&classify(json!(1), &FormatSettings::default()));
        assert!(!path.exists());
        view.update().unwrap();
        assert!(path.exists());
    }
}
