use glob::glob;
use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

/// Filesystem access of the `discover!` scan.
pub(crate) trait SysEngine {
    /// Absolute path of the crate that invokes the macro.
    fn crate_root() -> Result<PathBuf, String> {
        env::var_os("CARGO_MANIFEST_DIR")
            .map(PathBuf::from)
            .ok_or_else(|| {
                "CARGO_MANIFEST_DIR is not set: cannot locate the test directory".to_owned()
            })
    }

    /// Canonical paths of the files below `dir` that match `pattern`.
    fn find(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, String> {
        let full = dir.join(pattern);
        let full = full
            .to_str()
            .ok_or_else(|| format!("`{}` is not valid UTF-8", full.display()))?;
        glob(full)
            .map_err(|e| format!("invalid pattern `{full}`: {e}"))?
            .map(|entry| {
                let path = entry.map_err(|e| format!("cannot walk {}: {e}", e.path().display()))?;
                path.canonicalize()
                    .map_err(|e| format!("cannot resolve {}: {e}", path.display()))
            })
            .collect()
    }

    fn read_file(path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

pub(crate) struct DefaultSysEngine;

impl SysEngine for DefaultSysEngine {}
