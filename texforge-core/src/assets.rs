//! Fonts and images used by templates.
//!
//! # Layout
//!
//! ```text
//! <root>/
//!   assets/
//!     fonts/    (*.otf, *.ttf, *.woff, *.woff2)
//!     images/   (*.png, *.jpg, *.jpeg, *.pdf, *.eps, *.svg)
//! ```
//!
//! Imports copy files into the layout; templates reference them through the
//! `config.*_path` variables written by [`AssetManager::inject_paths`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::AssetError;
use crate::nested;
use crate::ValueMap;

const FONT_EXTENSIONS: &[&str] = &["otf", "ttf", "woff", "woff2"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "pdf", "eps", "svg"];

/// Category of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetKind {
    Font,
    Image,
}

impl AssetKind {
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            AssetKind::Font => FONT_EXTENSIONS,
            AssetKind::Image => IMAGE_EXTENSIONS,
        }
    }

    /// Directory name under `assets/`.
    pub fn dir_name(self) -> &'static str {
        match self {
            AssetKind::Font => "fonts",
            AssetKind::Image => "images",
        }
    }

    /// Whether `path` has one of this kind's extensions (case-insensitive).
    pub fn matches(self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .is_some_and(|e| self.extensions().contains(&e.as_str()))
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Font => write!(f, "font"),
            AssetKind::Image => write!(f, "image"),
        }
    }
}

/// Result of importing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The file was copied to `dest`.
    Copied { dest: PathBuf },
    /// `dest` already existed and overwrite was off; nothing was copied.
    Kept { dest: PathBuf },
}

impl ImportOutcome {
    pub fn dest(&self) -> &Path {
        match self {
            ImportOutcome::Copied { dest } | ImportOutcome::Kept { dest } => dest,
        }
    }
}

/// One file in the asset tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    pub kind: AssetKind,
    pub name: String,
    pub size_bytes: u64,
    pub extension: String,
}

/// Manages `assets/` under a project root.
#[derive(Debug, Clone)]
pub struct AssetManager {
    root: PathBuf,
}

impl AssetManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        AssetManager { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join("assets")
    }

    pub fn dir_for(&self, kind: AssetKind) -> PathBuf {
        self.assets_dir().join(kind.dir_name())
    }

    /// Create `assets/fonts` and `assets/images` if missing.
    pub fn ensure_dirs(&self) -> Result<(), AssetError> {
        for kind in [AssetKind::Font, AssetKind::Image] {
            let dir = self.dir_for(kind);
            std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        }
        Ok(())
    }

    /// Copy one file into the directory for `kind`.
    ///
    /// A leading `~` in `source` is expanded. Files with an unexpected
    /// extension are still copied, with a warning.
    pub fn import(
        &self,
        kind: AssetKind,
        source: &Path,
        overwrite: bool,
    ) -> Result<ImportOutcome, AssetError> {
        let source = expand_home(source);
        if !source.is_file() {
            return Err(AssetError::NotFound { path: source });
        }
        if !kind.matches(&source) {
            tracing::warn!("{} may not be a valid {kind} file", source.display());
        }

        self.ensure_dirs()?;
        let file_name = source
            .file_name()
            .ok_or_else(|| AssetError::NotFound { path: source.clone() })?;
        let dest = self.dir_for(kind).join(file_name);

        if dest.exists() && !overwrite {
            tracing::debug!("keeping existing {}", dest.display());
            return Ok(ImportOutcome::Kept { dest });
        }
        std::fs::copy(&source, &dest).map_err(|e| io_err(&dest, e))?;
        tracing::info!("imported {kind}: {}", dest.display());
        Ok(ImportOutcome::Copied { dest })
    }

    /// Import every file of `kind` found directly inside `dir`.
    pub fn import_dir(
        &self,
        kind: AssetKind,
        dir: &Path,
        overwrite: bool,
    ) -> Result<Vec<ImportOutcome>, AssetError> {
        let dir = expand_home(dir);
        if !dir.is_dir() {
            return Err(AssetError::NotADirectory { path: dir });
        }
        let mut sources: Vec<PathBuf> = std::fs::read_dir(&dir)
            .map_err(|e| io_err(&dir, e))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && kind.matches(p))
            .collect();
        sources.sort();

        sources
            .iter()
            .map(|source| self.import(kind, source, overwrite))
            .collect()
    }

    /// All files under `assets/fonts` and `assets/images`, sorted by kind
    /// then name. Missing directories list as empty.
    pub fn list(&self) -> Result<Vec<AssetEntry>, AssetError> {
        let mut entries = Vec::new();
        for kind in [AssetKind::Font, AssetKind::Image] {
            let dir = self.dir_for(kind);
            if !dir.exists() {
                continue;
            }
            for entry in std::fs::read_dir(&dir).map_err(|e| io_err(&dir, e))? {
                let entry = entry.map_err(|e| io_err(&dir, e))?;
                let meta = entry.metadata().map_err(|e| io_err(entry.path(), e))?;
                if !meta.is_file() {
                    continue;
                }
                let path = entry.path();
                entries.push(AssetEntry {
                    kind,
                    name: entry.file_name().to_string_lossy().into_owned(),
                    size_bytes: meta.len(),
                    extension: path
                        .extension()
                        .map(|e| e.to_string_lossy().to_uppercase())
                        .unwrap_or_default(),
                });
            }
        }
        entries.sort_by(|a, b| (a.kind, &a.name).cmp(&(b.kind, &b.name)));
        Ok(entries)
    }

    /// Write `config.texmf_path`, `config.fonts_path` and
    /// `config.images_path` (relative to the root) into `values`.
    pub fn inject_paths(&self, values: &mut ValueMap) -> Result<(), crate::PathError> {
        let assets = PathBuf::from("assets");
        let paths = [
            ("config.texmf_path", assets.clone()),
            ("config.fonts_path", assets.join(AssetKind::Font.dir_name())),
            ("config.images_path", assets.join(AssetKind::Image.dir_name())),
        ];
        for (key, path) in paths {
            let text = path.to_string_lossy().replace('\\', "/");
            nested::assign(values, key, Value::String(text))?;
        }
        Ok(())
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> AssetError {
    AssetError::Io {
        path: path.into(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> (TempDir, TempDir, AssetManager) {
        let project = TempDir::new().expect("project");
        let source = TempDir::new().expect("source");
        let manager = AssetManager::new(project.path());
        (project, source, manager)
    }

    #[test]
    fn import_copies_into_kind_directory() {
        let (_project, source, manager) = setup();
        let font = source.path().join("FiraSans-Regular.otf");
        std::fs::write(&font, b"font").unwrap();

        let outcome = manager.import(AssetKind::Font, &font, false).unwrap();
        assert!(matches!(outcome, ImportOutcome::Copied { .. }));
        assert_eq!(outcome.dest(), manager.dir_for(AssetKind::Font).join("FiraSans-Regular.otf"));
        assert!(outcome.dest().exists());
    }

    #[test]
    fn existing_destination_is_kept_without_overwrite() {
        let (_project, source, manager) = setup();
        let logo = source.path().join("logo.png");
        std::fs::write(&logo, b"v1").unwrap();
        manager.import(AssetKind::Image, &logo, false).unwrap();

        std::fs::write(&logo, b"v2").unwrap();
        let kept = manager.import(AssetKind::Image, &logo, false).unwrap();
        assert!(matches!(kept, ImportOutcome::Kept { .. }));
        assert_eq!(std::fs::read(kept.dest()).unwrap(), b"v1");

        let copied = manager.import(AssetKind::Image, &logo, true).unwrap();
        assert!(matches!(copied, ImportOutcome::Copied { .. }));
        assert_eq!(std::fs::read(copied.dest()).unwrap(), b"v2");
    }

    #[test]
    fn missing_source_is_not_found() {
        let (_project, source, manager) = setup();
        let err = manager
            .import(AssetKind::Font, &source.path().join("nope.ttf"), false)
            .unwrap_err();
        assert!(matches!(err, AssetError::NotFound { .. }));
    }

    #[test]
    fn import_dir_filters_by_extension_case_insensitively() {
        let (_project, source, manager) = setup();
        for name in ["a.TTF", "b.woff2", "notes.txt"] {
            std::fs::write(source.path().join(name), b"x").unwrap();
        }
        let outcomes = manager.import_dir(AssetKind::Font, source.path(), false).unwrap();
        assert_eq!(outcomes.len(), 2);

        let names: Vec<String> = manager.list().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["a.TTF", "b.woff2"]);
    }

    #[test]
    fn list_reports_kind_and_size() {
        let (_project, source, manager) = setup();
        let img = source.path().join("header.jpg");
        std::fs::write(&img, vec![0u8; 2048]).unwrap();
        manager.import(AssetKind::Image, &img, false).unwrap();

        let entries = manager.list().unwrap();
        assert_eq!(
            entries,
            vec![AssetEntry {
                kind: AssetKind::Image,
                name: "header.jpg".into(),
                size_bytes: 2048,
                extension: "JPG".into(),
            }]
        );
    }

    #[test]
    fn list_without_assets_dir_is_empty() {
        let (_project, _source, manager) = setup();
        assert!(manager.list().unwrap().is_empty());
    }

    #[test]
    fn inject_paths_writes_config_block() {
        let (_project, _source, manager) = setup();
        let mut values = ValueMap::new();
        values.insert("config".into(), json!({"theme": "uccs"}));
        manager.inject_paths(&mut values).unwrap();
        assert_eq!(
            values.get("config"),
            Some(&json!({
                "theme": "uccs",
                "texmf_path": "assets",
                "fonts_path": "assets/fonts",
                "images_path": "assets/images",
            }))
        );
    }
}
