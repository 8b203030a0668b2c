//! Option and command line construction for each build step
//!
//! Everything here is pure: settings and class paths in, argument lists out.

use crate::core::classpath::ClassPath;
use crate::core::command_line::CommandLineBuilder;
use crate::core::error::{BuildError, Result};
use crate::core::settings::{CompileSettings, DocumentSettings, TranslateSettings};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Translator entry point used when none is configured
pub const DEFAULT_TRANSLATOR: &str = "com.google.gwt.dev.Compiler";

/// Interface description generator used when none is configured
pub const DEFAULT_DOCUMENTER: &str = "org.apache.cxf.tools.java2ws.JavaToWS";

pub const DEFAULT_STYLE: &str = "OBF";
pub const DEFAULT_LOG_LEVEL: &str = "INFO";

fn push_value(args: &mut Vec<String>, flag: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}

fn push_flag(args: &mut Vec<String>, flag: &str, enabled: bool) {
    if enabled {
        args.push(flag.to_string());
    }
}

/// Compiler options for one module, without the source file list
///
/// `-properties` is only emitted for backends that accept a properties file;
/// for the others a configured file is ignored with a warning.
pub fn compile_options(
    settings: &CompileSettings,
    output_directory: &Path,
    module_classpath: &ClassPath,
    sourcepath: &[PathBuf],
    accepts_properties_file: bool,
) -> Vec<String> {
    let mut options = Vec::new();

    push_value(&mut options, "-source", settings.source.as_deref());
    push_value(&mut options, "-target", settings.target.as_deref());

    options.push("-d".to_string());
    options.push(output_directory.display().to_string());

    let mut classpath = module_classpath.clone();
    if let Some(entries) = &settings.classpath_entries {
        classpath = classpath.append(&ClassPath::of(entries));
    }
    options.extend(classpath.args("-classpath"));
    options.extend(ClassPath::of_paths(sourcepath).args("-sourcepath"));

    if let Some(properties) = &settings.properties_file {
        if !accepts_properties_file {
            warn!(
                "Compiler properties file {} is not supported by this compiler, ignoring",
                properties.display()
            );
        } else if properties.is_file() {
            options.push("-properties".to_string());
            options.push(properties.display().to_string());
        } else {
            warn!(
                "Compiler properties file {} does not exist, ignoring",
                properties.display()
            );
        }
    }

    push_value(&mut options, "-encoding", settings.encoding.as_deref());
    push_flag(&mut options, "-nowarn", settings.nowarn);
    push_flag(&mut options, "-deprecation", settings.show_deprecation);
    push_flag(&mut options, "-g:none", !settings.debug);

    if let Some(extra) = &settings.compiler_arguments {
        options.extend(extra.iter().cloned());
    }

    options
}

/// Program arguments for the translator; translation units come last
pub fn translate_arguments(settings: &TranslateSettings) -> Vec<String> {
    let mut args = Vec::new();

    push_flag(&mut args, "-failOnError", settings.fail_on_error);
    push_value(
        &mut args,
        "-XmethodNameDisplayMode",
        settings.method_name_display_mode.as_deref(),
    );
    push_value(&mut args, "-war", settings.war_directory.as_deref());
    push_flag(&mut args, "-strict", settings.strict);
    push_value(
        &mut args,
        "-style",
        Some(settings.style.as_deref().unwrap_or(DEFAULT_STYLE)),
    );
    push_value(
        &mut args,
        "-logLevel",
        Some(settings.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)),
    );
    push_value(&mut args, "-localWorkers", settings.local_workers.as_deref());
    push_value(&mut args, "-optimize", settings.optimize.as_deref());
    push_value(&mut args, "-workDir", settings.work_dir.as_deref());
    push_value(&mut args, "-extra", settings.extra_dir.as_deref());
    push_flag(&mut args, "-saveSource", settings.save_source);

    if let Some(units) = &settings.modules {
        args.extend(units.iter().filter(|u| !u.is_empty()).cloned());
    }

    args
}

/// Whether any translation unit is configured
pub fn has_translation_units(settings: &TranslateSettings) -> bool {
    settings
        .modules
        .as_ref()
        .is_some_and(|units| units.iter().any(|u| !u.is_empty()))
}

/// Full translator command line: `java` followed by the builder output
///
/// The class path is the module class path, then the step's own entries,
/// then the module's source directories.
pub fn translate_command(
    java: &str,
    settings: &TranslateSettings,
    module_classpath: &ClassPath,
    source_directories: &[PathBuf],
) -> Result<Vec<String>> {
    let mut classpath = module_classpath.clone();
    if let Some(entries) = &settings.classpath_entries {
        classpath = classpath.append(&ClassPath::of(entries));
    }
    classpath = classpath.append(&ClassPath::of_paths(source_directories));

    let entry_point = settings.entry_point.as_deref().unwrap_or(DEFAULT_TRANSLATOR);
    let builder = CommandLineBuilder::for_entry_point(entry_point)?
        .with_vm_arguments(settings.jvm_arguments.iter().flatten().cloned())
        .with_system_properties(settings.system_properties.iter().flatten())
        .with_classpath(&classpath)
        .with_arguments(translate_arguments(settings))
        .use_arg_file(true);

    Ok(with_launcher(java, builder))
}

/// Program arguments for the documenter; the service class comes last
pub fn document_arguments(settings: &DocumentSettings) -> Vec<String> {
    let mut args = Vec::new();

    push_flag(&mut args, "-wsdl", settings.generate_wsdl);
    push_flag(&mut args, "-createxsdimports", settings.create_xsd_imports);
    if let Some(dir) = &settings.output_directory {
        args.push("-d".to_string());
        args.push(dir.display().to_string());
    }
    push_value(&mut args, "-o", settings.output_file.as_deref());

    if let Some(extra) = &settings.arguments {
        args.extend(extra.iter().cloned());
    }

    if let Some(service) = settings.service_class.as_deref().filter(|s| !s.is_empty()) {
        args.push(service.to_string());
    }

    args
}

/// Full documenter command line: `java` followed by the builder output
pub fn document_command(
    java: &str,
    settings: &DocumentSettings,
    module_classpath: &ClassPath,
) -> Result<Vec<String>> {
    let mut classpath = module_classpath.clone();
    if let Some(entries) = &settings.classpath_entries {
        classpath = classpath.append(&ClassPath::of(entries));
    }

    let entry_point = settings.entry_point.as_deref().unwrap_or(DEFAULT_DOCUMENTER);
    let builder = CommandLineBuilder::for_entry_point(entry_point)?
        .with_vm_arguments(settings.jvm_arguments.iter().flatten().cloned())
        .with_system_properties(settings.system_properties.iter().flatten())
        .with_classpath(&classpath)
        .with_arguments(document_arguments(settings))
        .use_arg_file(true);

    Ok(with_launcher(java, builder))
}

fn with_launcher(java: &str, builder: CommandLineBuilder) -> Vec<String> {
    let mut command = vec![java.to_string()];
    command.extend(builder.build());
    command
}

/// The output directory a compile step writes to
pub fn require_output_directory(module: &str, output: Option<&Path>) -> Result<PathBuf> {
    output.map(Path::to_path_buf).ok_or_else(|| {
        BuildError::Configuration(format!(
            "module {} enables compile but declares no output directory",
            module
        ))
    })
}
