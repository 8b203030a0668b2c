//! Scenario: class paths are built from declared output directories

use crate::helpers::*;
use modbuild::core::classpath::PATH_SEPARATOR;
use modbuild::execution::module_classpath;
use modbuild::{BuildConfig, ModuleResolver};
use tempfile::TempDir;

#[tokio::test]
async fn test_compile_classpath_lists_every_output_before_anything_is_built() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("one/src/One.java"), "class One { }");
    write(&dir.path().join("two/src/Two.java"), "class Two { }");
    write(&dir.path().join("lib/dep.jar"), "jar");

    let yaml = r#"
dependency_classpath: [lib/dep.jar, lib/absent.jar]
defaults:
  compile:
    enabled: true
modules:
  - name: one
    source_directories: [one/src]
    output_directory: one/classes
  - name: two
    source_directories: [two/src]
    output_directory: two/classes
    classpath_entries: [/opt/extra.jar]
"#;
    let config = BuildConfig::from_yaml_in(yaml, dir.path()).unwrap();
    let resolution = ModuleResolver::new(&config).resolve();

    let compiler = FakeCompiler::new();
    let engine = engine_with(compiler.clone(), None)
        .with_dependency_classpath(config.dependency_classpath());
    engine.execute(&resolution).await;

    let root = dir.path();
    let expected_two = [
        root.join("one/classes").display().to_string(),
        root.join("two/classes").display().to_string(),
        root.join("lib/dep.jar").display().to_string(),
        "/opt/extra.jar".to_string(),
    ]
    .join(PATH_SEPARATOR);

    let calls = compiler.calls();
    let classpath = |options: &Vec<String>| {
        let i = options.iter().position(|o| o == "-classpath").unwrap();
        options[i + 1].clone()
    };
    // one is compiled while two/classes does not exist yet; it is listed anyway
    assert!(classpath(&calls[0]).contains("two/classes"));
    assert_eq!(classpath(&calls[1]), expected_two);

    let two = resolution.module("two").unwrap();
    assert_eq!(
        module_classpath(&resolution.modules, &config.dependency_classpath(), two).to_string(),
        expected_two
    );
}
