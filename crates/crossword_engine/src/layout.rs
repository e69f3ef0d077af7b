use std::path::{Path, PathBuf};

use crate::persist::ensure_output_dir;
use crate::{ParameterError, PersistError, PuzzleRequest};

/// Where a run writes its puzzles and its conversion log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPlan {
    root: PathBuf,
    explicit_file: Option<PathBuf>,
}

impl OutputPlan {
    /// Decide the layout for `item_count` puzzles written under `requested`.
    ///
    /// Several items always go to `<dir>/<type>/<date>-<type>.puz`. A single
    /// item goes straight to `requested` when it has an extension, otherwise
    /// `requested` is treated as the directory. Nothing is created here.
    pub fn resolve(requested: &Path, item_count: usize) -> Result<Self, ParameterError> {
        let target = std::path::absolute(requested).unwrap_or_else(|_| requested.to_path_buf());

        if item_count > 1 {
            if target.exists() && !target.is_dir() {
                return Err(ParameterError::OutputNotDirectory(target));
            }
            return Ok(Self {
                root: target,
                explicit_file: None,
            });
        }

        if target.extension().is_some() && !target.is_dir() {
            let root = target
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            return Ok(Self {
                root,
                explicit_file: Some(target),
            });
        }

        Ok(Self {
            root: target,
            explicit_file: None,
        })
    }

    /// Directory holding the conversion log.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn explicit_file(&self) -> Option<&Path> {
        self.explicit_file.as_deref()
    }

    /// Create the root directory.
    pub fn prepare(&self) -> Result<(), PersistError> {
        ensure_output_dir(&self.root)
    }

    pub fn destination(&self, request: &PuzzleRequest) -> PathBuf {
        match &self.explicit_file {
            Some(file) => file.clone(),
            None => self
                .root
                .join(request.kind.as_str())
                .join(request.file_name()),
        }
    }
}
