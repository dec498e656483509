//! Desktop entry (.desktop file) generation for XDG autostart.
//!
//! Only the keys XDG autostart launchers read are emitted.

use crate::error::{Result, TrayError};
use std::fs;
use std::path::Path;
use tracing::debug;

/// A desktop entry representation.
#[derive(Debug, Clone)]
pub struct DesktopEntry {
    /// Entry name.
    pub name: String,
    /// Comment/description.
    pub comment: Option<String>,
    /// Executable command.
    pub exec: String,
    /// Whether to run in a terminal.
    pub terminal: bool,
    /// Whether this entry should not be displayed in menus.
    pub no_display: bool,
    /// Whether GNOME should honour the autostart entry.
    pub autostart_enabled: bool,
}

impl Default for DesktopEntry {
    fn default() -> Self {
        Self {
            name: String::new(),
            comment: None,
            exec: String::new(),
            terminal: false,
            no_display: false,
            autostart_enabled: true,
        }
    }
}

impl DesktopEntry {
    /// Create a new desktop entry builder.
    pub fn builder() -> DesktopEntryBuilder {
        DesktopEntryBuilder::new()
    }

    /// Generate the .desktop file content.
    pub fn render(&self) -> String {
        let mut lines = vec![
            "[Desktop Entry]".to_string(),
            "Type=Application".to_string(),
            format!("Name={}", self.name),
        ];

        if let Some(ref comment) = self.comment {
            lines.push(format!("Comment={}", comment));
        }

        lines.push(format!("Exec={}", self.exec));

        lines.push(format!("Terminal={}", self.terminal));

        if self.no_display {
            lines.push("NoDisplay=true".to_string());
        }

        lines.push(format!(
            "X-GNOME-Autostart-enabled={}",
            self.autostart_enabled
        ));

        let mut content = lines.join("\n");
        content.push('\n');
        content
    }

    /// Write the desktop entry to a file.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| TrayError::Io {
                message: "create autostart directory".to_string(),
                path: Some(parent.to_path_buf()),
                source: Some(e),
            })?;
        }

        fs::write(path, self.render()).map_err(|e| TrayError::Io {
            message: "write desktop file".to_string(),
            path: Some(path.to_path_buf()),
            source: Some(e),
        })?;

        debug!("Wrote desktop entry to {:?}", path);

        Ok(())
    }
}

/// Quote a path for the `Exec` key.
pub fn quote_exec(path: &Path) -> String {
    let raw = path.display().to_string();
    if raw.contains(|c: char| c.is_whitespace() || c == '"') {
        format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        raw
    }
}

/// Builder for desktop entries.
pub struct DesktopEntryBuilder {
    entry: DesktopEntry,
}

impl DesktopEntryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            entry: DesktopEntry::default(),
        }
    }

    /// Set the entry name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.entry.name = name.into();
        self
    }

    /// Set the comment.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.entry.comment = Some(comment.into());
        self
    }

    /// Set the executable command.
    pub fn exec(mut self, exec: impl Into<String>) -> Self {
        self.entry.exec = exec.into();
        self
    }

    /// Set whether to run in terminal.
    pub fn terminal(mut self, terminal: bool) -> Self {
        self.entry.terminal = terminal;
        self
    }

    /// Hide the entry from application menus.
    pub fn no_display(mut self, no_display: bool) -> Self {
        self.entry.no_display = no_display;
        self
    }

    /// Build the desktop entry.
    pub fn build(self) -> DesktopEntry {
        self.entry
    }
}

impl Default for DesktopEntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
