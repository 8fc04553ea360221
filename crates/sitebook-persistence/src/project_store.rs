//! Project storage.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use sitebook_models::{Project, ProjectId};

use crate::atomic::{atomic_write_json, ensure_dir, read_json, read_json_optional, remove_if_exists};
use crate::error::{PersistenceError, Result};

/// Maps an ID to a file-system-safe file stem.
///
/// ASCII letters, digits and `-` are kept; every other byte is written as
/// `%XX`. The mapping is reversible, so distinct IDs never share a file.
pub(crate) fn file_stem(id: &str) -> String {
    let mut stem = String::with_capacity(id.len());
    for byte in id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

/// Lists the `.json` files directly inside `dir`; a missing directory is empty.
pub(crate) fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let read_err = |source| PersistenceError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Stores one JSON file per project:
/// ```text
/// base_path/
/// └── projects/
///     ├── proj-1b9d....json
///     └── proj-7c41....json
/// ```
pub struct ProjectStore {
    base_path: PathBuf,
}

impl ProjectStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn projects_dir(&self) -> PathBuf {
        self.base_path.join("projects")
    }

    fn project_path(&self, id: &ProjectId) -> PathBuf {
        self.projects_dir()
            .join(format!("{}.json", file_stem(id.as_str())))
    }

    /// Writes a project, replacing any previous version.
    pub fn save(&self, project: &Project) -> Result<()> {
        ensure_dir(&self.projects_dir())?;
        atomic_write_json(&self.project_path(&project.id), project)
    }

    /// Writes a new project. Fails if the ID or the code is already taken.
    pub fn insert(&self, project: &Project) -> Result<()> {
        if self.project_path(&project.id).exists() {
            return Err(PersistenceError::Duplicate {
                kind: "project",
                id: project.id.to_string(),
            });
        }
        if !project.code.is_empty() && self.find(&project.code)?.is_some() {
            return Err(PersistenceError::Duplicate {
                kind: "project code",
                id: project.code.clone(),
            });
        }
        self.save(project)
    }

    pub fn load(&self, id: &ProjectId) -> Result<Project> {
        self.load_optional(id)?
            .ok_or_else(|| PersistenceError::NotFound {
                kind: "project",
                id: id.to_string(),
            })
    }

    pub fn load_optional(&self, id: &ProjectId) -> Result<Option<Project>> {
        read_json_optional(&self.project_path(id))
    }

    /// Loads every readable project, ordered by code then name.
    ///
    /// Unreadable files are logged and skipped.
    pub fn list(&self) -> Result<Vec<Project>> {
        let mut projects = Vec::new();
        for path in json_files(&self.projects_dir())? {
            match read_json::<Project>(&path) {
                Ok(project) => projects.push(project),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable project"),
            }
        }

        projects.sort_by(|a, b| {
            a.code
                .to_lowercase()
                .cmp(&b.code.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(projects)
    }

    /// Finds a project by ID or code.
    pub fn find(&self, key: &str) -> Result<Option<Project>> {
        if let Some(project) = self.load_optional(&ProjectId::from(key.trim()))? {
            return Ok(Some(project));
        }
        Ok(self.list()?.into_iter().find(|p| p.matches_key(key)))
    }

    /// Deletes a project file. Returns whether it existed.
    pub fn delete(&self, id: &ProjectId) -> Result<bool> {
        remove_if_exists(&self.project_path(id))
    }
}
