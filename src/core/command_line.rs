//! Command line assembly for forked JVM tools

use crate::core::classpath::ClassPath;
use crate::core::error::{BuildError, Result};

/// Builds the argument list for launching a tool's entry point
///
/// Whatever order the setters are called in, [`CommandLineBuilder::build`]
/// always renders:
///
/// 1. VM arguments
/// 2. System properties (`-Dkey=value`, or `-Dkey` when the value is empty)
/// 3. Class path (`-cp <path>`), omitted when empty
/// 4. Entry point
/// 5. Program arguments
#[derive(Debug, Clone)]
pub struct CommandLineBuilder {
    entry_point: String,
    vm_arguments: Vec<String>,
    system_properties: Vec<(String, String)>,
    classpath: ClassPath,
    arguments: Vec<String>,
    use_arg_file: bool,
}

impl CommandLineBuilder {
    /// Create a builder for the given entry point (fully qualified main class)
    pub fn for_entry_point(entry_point: impl Into<String>) -> Result<Self> {
        let entry_point = entry_point.into();
        if entry_point.trim().is_empty() {
            return Err(BuildError::Validation(
                "entry point must not be empty".to_string(),
            ));
        }
        Ok(Self {
            entry_point,
            vm_arguments: Vec::new(),
            system_properties: Vec::new(),
            classpath: ClassPath::empty(),
            arguments: Vec::new(),
            use_arg_file: false,
        })
    }

    /// Add VM arguments (cumulative)
    pub fn with_vm_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vm_arguments.extend(arguments.into_iter().map(Into::into));
        self
    }

    /// Add system properties (cumulative; a repeated key keeps its position and takes the new value)
    pub fn with_system_properties<I, K, V>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in properties {
            let key = key.into();
            let value = value.into();
            match self.system_properties.iter_mut().find(|(k, _)| *k == key) {
                Some(existing) => existing.1 = value,
                None => self.system_properties.push((key, value)),
            }
        }
        self
    }

    /// Set the class path, replacing any previously configured one
    pub fn with_classpath(mut self, classpath: &ClassPath) -> Self {
        self.classpath = classpath.clone();
        self
    }

    /// Set the class path from raw entries, replacing any previously configured one
    pub fn with_classpath_entries<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries: Vec<String> = entries.into_iter().map(Into::into).collect();
        self.classpath = ClassPath::of(entries);
        self
    }

    /// Add program arguments (cumulative)
    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(arguments.into_iter().map(Into::into));
        self
    }

    /// Allow the class path to be passed through an argument file where the platform prefers it
    pub fn use_arg_file(mut self, allow: bool) -> Self {
        self.use_arg_file = allow;
        self
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Render the command line
    pub fn build(&self) -> Vec<String> {
        let mut command_line = Vec::new();

        command_line.extend(self.vm_arguments.iter().cloned());

        command_line.extend(
            self.system_properties
                .iter()
                .filter_map(|(key, value)| format_system_property(key, value)),
        );

        command_line.extend(self.classpath.args_with("-cp", self.use_arg_file));

        command_line.push(self.entry_point.clone());
        command_line.extend(self.arguments.iter().cloned());

        command_line
    }
}

fn format_system_property(key: &str, value: &str) -> Option<String> {
    if key.is_empty() {
        return None;
    }
    if value.is_empty() {
        Some(format!("-D{}", key))
    } else {
        Some(format!("-D{}={}", key, value))
    }
}
