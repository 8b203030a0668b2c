//! Scenario: backend-specific compiler options
#![cfg(unix)]

use crate::helpers::*;
use modbuild::{BuildConfig, BuildEngine, CompilerRegistry, Interrupt, ModuleResolver, RunStatus};
use tempfile::TempDir;

const BUILD: &str = r#"
java_home: jdk
modules:
  - name: a
    source_directories: [a/src]
    output_directory: a/classes
    compile:
      enabled: true
      properties_file: compiler.prefs
"#;

#[tokio::test]
async fn test_javac_build_with_properties_file_compiles() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("a/src/Hello.java"), "class Hello { }");
    write(&dir.path().join("compiler.prefs"), "org.eclipse.jdt.core.compiler.source=17\n");
    let args = dir.path().join("javac-args.txt");
    // mirrors javac rejecting ecj's -properties flag
    fake_tool(
        &dir.path().join("jdk"),
        "javac",
        &format!(
            "for a in \"$@\"; do\n  echo \"$a\" >> '{}'\n  if [ \"$a\" = \"-properties\" ]; then echo 'error: invalid flag: -properties'; exit 2; fi\ndone",
            args.display()
        ),
    );

    let config = BuildConfig::from_yaml_in(BUILD, dir.path()).unwrap();
    let resolution = ModuleResolver::new(&config).resolve();
    let engine =
        BuildEngine::from_config(&config, &CompilerRegistry::with_defaults(), Interrupt::new())
            .unwrap();
    let report = engine.execute(&resolution).await;

    assert_eq!(report.status, RunStatus::Completed, "{:?}", report.failure);
    let recorded = std::fs::read_to_string(&args).unwrap();
    assert!(recorded.lines().any(|l| l == "-d"));
    assert!(!recorded.lines().any(|l| l == "-properties"));
}

#[tokio::test]
async fn test_fake_compiler_options_leave_out_properties_file() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("a/src/Hello.java"), "class Hello { }");
    write(&dir.path().join("compiler.prefs"), "");

    let config = BuildConfig::from_yaml_in(BUILD, dir.path()).unwrap();
    let resolution = ModuleResolver::new(&config).resolve();
    let compiler = FakeCompiler::new();
    let engine = engine_with(compiler.clone(), None);
    let report = engine.execute(&resolution).await;

    assert_eq!(report.status, RunStatus::Completed);
    assert!(!compiler.calls()[0].contains(&"-properties".to_string()));
}
