//! Step settings with layered defaults
//!
//! Every build step is configured by a settings record that can appear twice:
//! once in the global `defaults` block and once on a module. The effective
//! settings are computed with [`merge`]:
//!
//! - an `Option` field set on the module wins, otherwise the default's value is used
//! - plain booleans (`enabled`, `fail_on_error`, ...) always come from the module record
//! - a record missing on either side leaves the other side unchanged

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A settings record that can be layered over a defaults record
pub trait Layered: Sized {
    /// Fill every unset field of `self` from `defaults`
    fn layer_over(self, defaults: &Self) -> Self;
}

/// Merge a defaults record with an override record
pub fn merge<T: Layered + Clone>(defaults: Option<&T>, overrides: Option<&T>) -> Option<T> {
    match (defaults, overrides) {
        (None, None) => None,
        (Some(defaults), None) => Some(defaults.clone()),
        (None, Some(overrides)) => Some(overrides.clone()),
        (Some(defaults), Some(overrides)) => Some(overrides.clone().layer_over(defaults)),
    }
}

/// Declares a settings record: `take` fields are plain booleans read from the
/// override, `inherit` fields are optional and fall back to the defaults.
macro_rules! layered_settings {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            take {
                $( $(#[$tmeta:meta])* $tfield:ident = $tdefault:expr ),* $(,)?
            }
            inherit {
                $( $(#[$imeta:meta])* $ifield:ident : $ity:ty ),* $(,)?
            }
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(default, deny_unknown_fields)]
        pub struct $name {
            $( $(#[$tmeta])* pub $tfield: bool, )*
            $(
                $(#[$imeta])*
                #[serde(skip_serializing_if = "Option::is_none")]
                pub $ifield: Option<$ity>,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $( $tfield: $tdefault, )*
                    $( $ifield: None, )*
                }
            }
        }

        impl Layered for $name {
            fn layer_over(self, defaults: &Self) -> Self {
                Self {
                    $( $tfield: self.$tfield, )*
                    $( $ifield: self.$ifield.or_else(|| defaults.$ifield.clone()), )*
                }
            }
        }
    };
}

layered_settings! {
    /// Source-to-bytecode compilation of a module's own sources
    pub struct CompileSettings {
        take {
            enabled = false,
            /// Suppress compiler warnings
            nowarn = true,
            /// Emit debug information; `false` adds `-g:none`
            debug = true,
            show_deprecation = false,
        }
        inherit {
            source: String,
            target: String,
            encoding: String,
            /// Compiler properties file, passed only when it exists
            properties_file: PathBuf,
            compiler_arguments: Vec<String>,
            classpath_entries: Vec<String>,
        }
    }
}

layered_settings! {
    /// Translation of module sources into deployable script artifacts
    pub struct TranslateSettings {
        take {
            enabled = false,
            save_source = false,
            strict = false,
            fail_on_error = true,
        }
        inherit {
            entry_point: String,
            /// Translation units, rendered last on the command line
            modules: Vec<String>,
            war_directory: String,
            style: String,
            log_level: String,
            local_workers: String,
            optimize: String,
            work_dir: String,
            extra_dir: String,
            method_name_display_mode: String,
            classpath_entries: Vec<String>,
            jvm_arguments: Vec<String>,
            system_properties: BTreeMap<String, String>,
        }
    }
}

layered_settings! {
    /// Interface description generation from a service class
    pub struct DocumentSettings {
        take {
            enabled = false,
            generate_wsdl = true,
            create_xsd_imports = false,
        }
        inherit {
            entry_point: String,
            service_class: String,
            output_directory: PathBuf,
            output_file: String,
            classpath_entries: Vec<String>,
            arguments: Vec<String>,
            jvm_arguments: Vec<String>,
            system_properties: BTreeMap<String, String>,
        }
    }
}

layered_settings! {
    /// Packaging of web content and compiled output into a single archive
    pub struct PackageSettings {
        take {
            enabled = false,
            include_classes = true,
            fail_on_error = true,
        }
        inherit {
            source_directory: PathBuf,
            destination: PathBuf,
            /// Defaults to the module output directory
            classes_directory: PathBuf,
            additional_content_directories: Vec<PathBuf>,
            lib_entries: Vec<PathBuf>,
        }
    }
}

/// Global defaults for every step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StepDefaults {
    pub compile: Option<CompileSettings>,
    pub translate: Option<TranslateSettings>,
    pub document: Option<DocumentSettings>,
    pub package: Option<PackageSettings>,
}
