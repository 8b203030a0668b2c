//! Integration tests with a real JDK
//!
//! These tests require `javac` (and `java`) from `$JAVA_HOME` or `PATH`.
//! They are tagged with `#[ignore]` and should be run explicitly with:
//!
//!     cargo test --test integration -- --ignored

use modbuild::{BuildConfig, BuildEngine, CompilerRegistry, Interrupt, ModuleResolver, RunStatus};
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

async fn run(yaml: &str, dir: &Path) -> modbuild::RunReport {
    let config = BuildConfig::from_yaml_in(yaml, dir).unwrap();
    config.validate().unwrap();
    let resolution = ModuleResolver::new(&config).resolve();
    let engine =
        BuildEngine::from_config(&config, &CompilerRegistry::with_defaults(), Interrupt::new())
            .unwrap();
    engine.execute(&resolution).await
}

#[tokio::test]
#[ignore] // Requires a JDK
async fn test_javac_compiles_circular_modules() {
    let dir = TempDir::new().unwrap();
    write(
        &dir.path().join("a/src/com/example/a/Alpha.java"),
        "package com.example.a;\npublic class Alpha { public com.example.b.Beta beta; }\n",
    );
    write(
        &dir.path().join("b/src/com/example/b/Beta.java"),
        "package com.example.b;\npublic class Beta { public com.example.a.Alpha alpha; }\n",
    );

    let yaml = r#"
defaults:
  compile:
    enabled: true
modules:
  - name: b
    source_directories: [b/src]
    output_directory: b/classes
  - name: a
    source_directories: [a/src]
    output_directory: a/classes
"#;
    let report = run(yaml, dir.path()).await;

    assert_eq!(report.status, RunStatus::Completed, "{:?}", report.failure);
    assert!(dir.path().join("b/classes/com/example/b/Beta.class").is_file());
    assert!(dir.path().join("a/classes/com/example/a/Alpha.class").is_file());
}

#[tokio::test]
#[ignore] // Requires a JDK
async fn test_javac_errors_abort_the_run() {
    let dir = TempDir::new().unwrap();
    write(
        &dir.path().join("bad/src/Bad.java"),
        "public class Bad { Missing missing; }\n",
    );

    let yaml = r#"
modules:
  - name: bad
    source_directories: [bad/src]
    output_directory: bad/classes
    compile:
      enabled: true
"#;
    let report = run(yaml, dir.path()).await;

    assert_eq!(report.status, RunStatus::Failed);
    assert!(report.failure.unwrap().contains("error"));
}
