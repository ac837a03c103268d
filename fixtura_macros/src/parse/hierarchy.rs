use std::path::{Path, PathBuf};

use relative_path::{RelativePath, RelativePathBuf};
use thiserror::Error;

#[derive(PartialEq, Debug, Clone)]
pub(crate) struct File<T> {
    pub(crate) name: String,
    pub(crate) path: PathBuf,
    pub(crate) content: T,
}

impl<T> File<T> {
    pub(crate) fn new(name: impl Into<String>, path: PathBuf, content: T) -> Self {
        Self {
            name: name.into(),
            path,
            content,
        }
    }

    /// `name` without the `.rs` extension.
    pub(crate) fn stem(&self) -> &str {
        self.name.strip_suffix(".rs").unwrap_or(&self.name)
    }
}

/// A directory and everything discovered below it, in lexical order.
#[derive(PartialEq, Debug, Clone)]
pub(crate) struct Folder<T> {
    pub(crate) name: String,
    pub(crate) files: Vec<File<T>>,
    pub(crate) folders: Vec<Folder<T>>,
}

impl<T> Folder<T> {
    pub(crate) fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: vec![],
            folders: vec![],
        }
    }

    #[cfg(test)]
    pub(crate) fn add_folder(mut self, folder: Folder<T>) -> Self {
        self.folders.push(folder);
        self
    }

    #[cfg(test)]
    pub(crate) fn add_file(mut self, file: File<T>) -> Self {
        self.files.push(file);
        self
    }

    fn add_file_in_sub_folder(&mut self, path: &[&str], file: File<T>) {
        match path.split_first() {
            None => self.files.push(file),
            Some((first, rest)) => {
                if let Some(inner) = self.folders.iter_mut().find(|f| f.name == *first) {
                    inner.add_file_in_sub_folder(rest, file)
                } else {
                    let mut inner = Folder::empty(*first);
                    inner.add_file_in_sub_folder(rest, file);
                    self.folders.push(inner);
                }
            }
        }
    }

    pub(crate) fn add_file_path(&mut self, path: &RelativePath, file: File<T>) {
        let segments = path.iter().filter(|s| !s.is_empty()).collect::<Vec<_>>();
        self.add_file_in_sub_folder(&segments, file);
    }

    #[cfg(test)]
    pub(crate) fn file(&self, name: &str) -> Option<&File<T>> {
        self.files.iter().find(|f| f.name == name)
    }
}

#[derive(Error, Debug)]
pub(crate) enum HierarchyError {
    #[error("Cannot guess crate root due: {0}")]
    CrateRoot(String),
    #[error("Cannot get files from glob due: {0}")]
    InvalidGlob(String),
    #[error("Not a directory: '{0}'")]
    NotADirectory(PathBuf),
    #[error("Not a file error: {0}")]
    NotAFile(PathBuf),
    #[error("The file should be in a folder: '{0}'")]
    NotInFolder(PathBuf),
    #[error("Path is not valid UTF-8: '{0}'")]
    NotUtf8(PathBuf),
    #[error("Path '{path}' is not below '{root}'")]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

#[derive(PartialEq, Debug, Clone)]
pub(crate) struct Hierarchy<T> {
    pub(crate) folder: Folder<T>,
}

impl<T> Hierarchy<T> {
    /// Group `files` (absolute paths below `root`) by their folder. Each
    /// file's content is built from its absolute and its `root` relative
    /// path.
    pub(crate) fn build(
        root: &Path,
        files: Vec<PathBuf>,
        mut get_content: impl FnMut(&Path, &RelativePath) -> T,
    ) -> Result<Self, HierarchyError> {
        let name = root
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| HierarchyError::NotADirectory(root.to_owned()))?;
        let mut folder = Folder::empty(name);
        for abs_path in files {
            let relative_path = relative_to(root, &abs_path)?;
            let parent = relative_path
                .parent()
                .ok_or_else(|| HierarchyError::NotInFolder(abs_path.clone()))?;
            let fname = relative_path
                .file_name()
                .ok_or_else(|| HierarchyError::NotAFile(abs_path.clone()))?
                .to_owned();
            let content = get_content(&abs_path, &relative_path);
            folder.add_file_path(parent, File::new(fname, abs_path, content));
        }
        Ok(Self { folder })
    }
}

pub(crate) fn relative_to(root: &Path, path: &Path) -> Result<RelativePathBuf, HierarchyError> {
    let stripped = path
        .strip_prefix(root)
        .map_err(|_| HierarchyError::OutsideRoot {
            path: path.to_owned(),
            root: root.to_owned(),
        })?;
    RelativePathBuf::from_path(stripped).map_err(|_| HierarchyError::NotUtf8(path.to_owned()))
}
