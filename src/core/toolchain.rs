//! Location of the Java toolchain

use std::path::{Path, PathBuf};

/// JDK location plus extra artifacts declared for optional tools
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toolchain {
    pub java_home: Option<PathBuf>,
    /// Additional jar locations searched for optional compiler backends
    pub artifacts: Vec<PathBuf>,
}

impl Toolchain {
    /// Toolchain rooted at `java_home`, falling back to `$JAVA_HOME`
    pub fn new(java_home: Option<PathBuf>, artifacts: Vec<PathBuf>) -> Self {
        let java_home = java_home.or_else(|| std::env::var_os("JAVA_HOME").map(PathBuf::from));
        Self {
            java_home,
            artifacts,
        }
    }

    /// The `java` launcher
    pub fn java_executable(&self) -> String {
        self.tool_executable("java")
    }

    /// `<java_home>/bin/<name>` when it exists, otherwise the bare name resolved on PATH
    pub fn tool_executable(&self, name: &str) -> String {
        if let Some(home) = &self.java_home {
            let candidate = home.join("bin").join(executable_name(name));
            if candidate.is_file() {
                return candidate.display().to_string();
            }
        }
        name.to_string()
    }

    /// First declared artifact whose file name starts with `prefix` and ends in `.jar`
    pub fn find_artifact(&self, prefix: &str) -> Option<&Path> {
        self.artifacts
            .iter()
            .filter(|p| p.is_file())
            .find(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(prefix) && n.ends_with(".jar"))
            })
            .map(PathBuf::as_path)
    }
}

fn executable_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}
