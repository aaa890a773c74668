// Filesystem existence filter

use super::Filter;
use crate::value::as_text;
use crate::{MessageTemplate, Severity};
use serde_json::Value;
use std::path::{Component, Path as FsPath, PathBuf};

/// The value, taken relative to `root`, must name an existing file or
/// directory. Values escaping the root with `..` never match.
#[derive(Debug, Clone)]
pub struct Path {
    root: PathBuf,
    message: MessageTemplate,
    severity: Severity,
}

message_builders!(Path);

impl Path {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            message: MessageTemplate::new("%s does not exist"),
            severity: Severity::Error,
        }
    }

    pub fn root(&self) -> &FsPath {
        &self.root
    }

    /// Location of `relative` below the root, if it stays inside it.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let relative = FsPath::new(relative.trim_start_matches('/'));
        let contained = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        contained.then(|| self.root.join(relative))
    }
}

impl Filter for Path {
    fn name(&self) -> &str {
        "path"
    }

    fn check(&self, value: &Value, _index: Option<usize>) -> bool {
        as_text(value)
            .and_then(|text| self.resolve(&text))
            .is_some_and(|path| path.exists())
    }

    fn message(&self) -> &MessageTemplate {
        &self.message
    }

    fn severity(&self) -> Severity {
        self.severity
    }
}
