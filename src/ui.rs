use log::{info, warn};

use crate::sample::ShaderMap;

/// A declarative settings panel a sample may mount in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSpec {
    pub title: String,
    pub body: String,
}

/// Seam to the external widget toolkit.
///
/// The viewer only needs three things from it: tearing down the panels of a
/// superseded sample, mounting panels for the new one, and surfacing
/// user-visible notices.
pub trait Workspace {
    /// Removes every panel mounted by the previously active sample.
    fn clear(&mut self);
    /// Mounts a panel for the currently active sample.
    fn add_panel(&mut self, panel: PanelSpec);
    /// Surfaces a user-visible notice.
    fn alert(&mut self, title: &str, message: &str);
}

/// Seam to the external shader editor.
pub trait EditorSink {
    /// Replaces the editor's buffers with the active sample's shaders.
    fn sync_shaders(&mut self, shaders: &ShaderMap);
}

/// Workspace used when no widget toolkit is wired up: panels and alerts go
/// to the log.
#[derive(Debug, Default)]
pub struct LogWorkspace;

impl Workspace for LogWorkspace {
    fn clear(&mut self) {}

    fn add_panel(&mut self, panel: PanelSpec) {
        info!("panel '{}': {}", panel.title, panel.body);
    }

    fn alert(&mut self, title: &str, message: &str) {
        warn!("{title}: {message}");
    }
}

/// Editor sink used when no editor is wired up.
#[derive(Debug, Default)]
pub struct LogEditor;

impl EditorSink for LogEditor {
    fn sync_shaders(&mut self, shaders: &ShaderMap) {
        let names = shaders.keys().map(String::as_str).collect::<Vec<_>>();
        info!("editor synchronized with shaders {names:?}");
    }
}
