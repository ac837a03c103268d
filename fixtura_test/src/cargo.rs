use std::{
    ffi::OsString,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    process::Command,
};

use crate::utils::Stringable;

fn cargo() -> OsString {
    std::env::var_os("CARGO").unwrap_or_else(|| "cargo".into())
}

/// Build the `name` test target of the crate in `manifest_dir` and return
/// the path of its executable.
pub fn test_executable(manifest_dir: impl AsRef<Path>, name: &str) -> io::Result<PathBuf> {
    let output = Command::new(cargo())
        .current_dir(manifest_dir)
        .args(["test", "--no-run", "--message-format=json", "--test", name])
        .output()?;
    if !output.status.success() {
        return Err(io::Error::new(
            ErrorKind::Other,
            format!("cannot build test `{name}`:\n{}", output.stderr.str()),
        ));
    }
    output
        .stdout
        .str()
        .lines()
        .filter(|line| is_test_artifact(line, name))
        .find_map(executable)
        .ok_or_else(|| {
            io::Error::new(
                ErrorKind::NotFound,
                format!("cargo didn't report an executable for test `{name}`"),
            )
        })
}

fn is_test_artifact(message: &str, name: &str) -> bool {
    message.contains(r#""reason":"compiler-artifact""#)
        && message.contains(r#""kind":["test"]"#)
        && message.contains(&format!(r#""name":"{name}""#))
}

fn executable(message: &str) -> Option<PathBuf> {
    const KEY: &str = r#""executable":""#;
    let start = message.find(KEY)? + KEY.len();
    let end = start + message[start..].find('"')?;
    Some(PathBuf::from(message[start..end].replace(r"\\", r"\")))
}
