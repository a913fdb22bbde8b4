pub mod clipboard;
pub mod scene;
pub mod selection;
pub mod session;
pub mod settings;

use std::path::Path;

pub use clipboard::Clipboard;
pub use scene::{Model, ModelId, ModelKind, ModelStatus, ModelTemplate, NameManager, Scene};
pub use selection::{Direction, SelPath, Selection, SelectionManager, SelectionOperation};
pub use session::{PointTarget, SessionState};
pub use settings::{EditorSettings, ImportSettings};

/// Reads model files for import commands.
///
/// A failed load does not fail the command: the model keeps the returned
/// reason and stays in the tree as an invalid placeholder.
pub trait ModelLoader {
    fn load(&self, path: &Path, import: &ImportSettings) -> Result<(), String>;
}

/// Loader that checks the extension and that the file is readable.
#[derive(Debug, Default)]
pub struct FileModelLoader;

impl ModelLoader for FileModelLoader {
    fn load(&self, path: &Path, import: &ImportSettings) -> Result<(), String> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| format!("{} has no file extension", path.display()))?;
        if !import.accepts(extension) {
            return Err(format!("unsupported file type .{extension}"));
        }
        let metadata = std::fs::metadata(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        if !metadata.is_file() {
            return Err(format!("{} is not a file", path.display()));
        }
        Ok(())
    }
}

/// Combined editor state that executors operate on
pub struct EditorState {
    pub scene: Scene,
    pub selection: SelectionManager,
    pub clipboard: Clipboard,
    pub session: SessionState,
    pub settings: EditorSettings,
    pub loader: Box<dyn ModelLoader>,
}

impl EditorState {
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            scene: Scene::new(),
            selection: SelectionManager::new(),
            clipboard: Clipboard::new(),
            session: SessionState::new(),
            settings,
            loader: Box::new(FileModelLoader),
        }
    }

    pub fn with_loader(mut self, loader: impl ModelLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    /// Replace the selection with the given paths.
    pub fn select(&mut self, selection: Selection) {
        self.selection.change_selection(&mut self.scene, selection);
    }

    /// Select models by name. Unknown names are fatal.
    pub fn select_names<S: AsRef<str>>(&mut self, names: &[S]) {
        let selection: Selection = names
            .iter()
            .map(|name| self.scene.expect_path(name.as_ref()))
            .collect();
        self.select(selection);
    }

    pub fn deselect_all(&mut self) {
        self.selection.deselect_all(&mut self.scene);
    }

    /// Names of the selected models, primary first.
    pub fn selected_names(&self) -> Vec<String> {
        self.selection
            .selection()
            .models()
            .map(|id| self.scene.model(id).name().to_string())
            .collect()
    }

    /// Drop the whole document and start over with an empty scene.
    pub fn reset(&mut self) {
        self.take_document();
    }

    /// Detach the document, leaving an empty one in its place.
    pub fn take_document(&mut self) -> Document {
        let selection = self.selection.selection().clone();
        self.selection.deselect_all(&mut self.scene);
        Document {
            scene: std::mem::replace(&mut self.scene, Scene::new()),
            clipboard: std::mem::take(&mut self.clipboard),
            session: std::mem::replace(&mut self.session, SessionState::new()),
            selection,
        }
    }

    /// Put back a document detached with [`EditorState::take_document`].
    pub fn restore_document(&mut self, document: Document) {
        self.selection.deselect_all(&mut self.scene);
        self.scene = document.scene;
        self.clipboard = document.clipboard;
        self.session = document.session;
        self.select(document.selection);
    }
}

/// Everything a session load replaces: the scene, clipboard, session
/// values and the selection that was active.
pub struct Document {
    scene: Scene,
    clipboard: Clipboard,
    session: SessionState,
    selection: Selection,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}
