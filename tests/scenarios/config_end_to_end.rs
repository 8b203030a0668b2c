//! Scenario: layered defaults and module resolution from a build file

use crate::helpers::*;
use modbuild::{BuildConfig, BuildEvent, ModuleResolver, RunStatus};
use tempfile::TempDir;

#[tokio::test]
async fn test_defaults_layer_under_module_settings() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("core/src/Core.java"), "class Core { }");
    write(&dir.path().join("legacy/src/Old.java"), "class Old { }");

    let yaml = r#"
source: "11"
target: "11"
defaults:
  compile:
    enabled: true
    encoding: UTF-8
    compiler_arguments: [-parameters]
modules:
  - name: core
    source_directories: [core/src]
    output_directory: core/classes
  - name: legacy
    source_directories: [legacy/src]
    output_directory: legacy/classes
    compile:
      enabled: true
      source: "1.8"
      target: "1.8"
      compiler_arguments: []
"#;
    let build = dir.path().join("build.yaml");
    std::fs::write(&build, yaml).unwrap();
    let config = BuildConfig::from_file(&build).unwrap();
    config.validate().unwrap();
    let resolution = ModuleResolver::new(&config).resolve();

    let compiler = FakeCompiler::new();
    let engine = engine_with(compiler.clone(), None);
    let report = engine.execute(&resolution).await;
    assert_eq!(report.status, RunStatus::Completed);

    let calls = compiler.calls();
    let value = |options: &Vec<String>, flag: &str| {
        let i = options.iter().position(|o| o == flag).unwrap();
        options[i + 1].clone()
    };

    assert_eq!(value(&calls[0], "-source"), "11");
    assert_eq!(value(&calls[0], "-encoding"), "UTF-8");
    assert!(calls[0].contains(&"-parameters".to_string()));

    assert_eq!(value(&calls[1], "-source"), "1.8");
    assert_eq!(value(&calls[1], "-target"), "1.8");
    // inherited from defaults since the module left it unset
    assert_eq!(value(&calls[1], "-encoding"), "UTF-8");
    // an explicit empty list still overrides
    assert!(!calls[1].contains(&"-parameters".to_string()));
}

#[tokio::test]
async fn test_modules_without_a_reason_to_build_are_reported_skipped() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("real/src/Real.java"), "class Real { }");

    let yaml = r#"
defaults:
  compile:
    enabled: true
modules:
  - name: ghost
    source_directories: [ghost/src]
  - name: real
    source_directories: [real/src]
    output_directory: real/classes
  - name: idle
    source_directories: [real/src]
    output_directory: idle/classes
    compile:
      enabled: false
"#;
    let config = BuildConfig::from_yaml_in(yaml, dir.path()).unwrap();
    let resolution = ModuleResolver::new(&config).resolve();
    assert_eq!(resolution.skipped.len(), 1);
    assert_eq!(resolution.skipped[0].name, "ghost");

    let engine = engine_with(FakeCompiler::new(), None);
    let recorder = EventRecorder::attach(&engine).await;
    let report = engine.execute(&resolution).await;

    assert_eq!(report.status, RunStatus::Completed);
    let skipped: Vec<String> = recorder
        .events()
        .into_iter()
        .filter_map(|e| match e {
            BuildEvent::ModuleSkipped { module, .. } => Some(module),
            _ => None,
        })
        .collect();
    assert_eq!(skipped, vec!["ghost", "idle"]);
    assert_eq!(class_files(&dir.path().join("real/classes")), vec!["Real.class"]);
}

#[test]
fn test_unknown_keys_are_rejected() {
    let yaml = r#"
modules:
  - name: a
    compile:
      enabled: true
      optimise: true
"#;
    assert!(BuildConfig::from_yaml(yaml).is_err());
}
