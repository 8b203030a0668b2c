//! Scenario: two modules whose sources reference each other

use crate::helpers::*;
use modbuild::{BuildConfig, ModuleResolver, RunStatus, StepKind};
use tempfile::TempDir;

const BUILD: &str = r#"
name: circular
modules:
  - name: beta
    source_directories: [beta/src]
    output_directory: beta/classes
    compile:
      enabled: true
  - name: alpha
    source_directories: [alpha/src]
    output_directory: alpha/classes
    compile:
      enabled: true
"#;

fn layout(dir: &TempDir) {
    write(&dir.path().join("alpha/src/Alpha.java"), "class Alpha { Beta beta; }");
    write(&dir.path().join("alpha/src/Shared.java"), "class Shared { Alpha alpha; }");
    write(&dir.path().join("beta/src/Beta.java"), "class Beta { Alpha alpha; Shared shared; }");
}

#[tokio::test]
async fn test_modules_referencing_each_other_compile_in_declaration_order() {
    let dir = TempDir::new().unwrap();
    layout(&dir);
    let config = BuildConfig::from_yaml_in(BUILD, dir.path()).unwrap();
    let resolution = ModuleResolver::new(&config).resolve();

    let compiler = FakeCompiler::new();
    let engine = engine_with(compiler.clone(), None);
    let recorder = EventRecorder::attach(&engine).await;

    let report = engine.execute(&resolution).await;

    assert_eq!(report.status, RunStatus::Completed, "{:?}", report.failure);
    assert_eq!(
        recorder.started_steps(),
        vec![
            ("beta".to_string(), StepKind::Compile),
            ("alpha".to_string(), StepKind::Compile),
        ]
    );

    // beta compiled first, resolving Alpha and Shared from source only
    assert_eq!(class_files(&dir.path().join("beta/classes")), vec!["Beta.class"]);
    assert_eq!(
        class_files(&dir.path().join("alpha/classes")),
        vec!["Alpha.class", "Shared.class"]
    );
}

#[tokio::test]
async fn test_every_compile_sees_the_same_shared_sourcepath() {
    let dir = TempDir::new().unwrap();
    layout(&dir);
    let config = BuildConfig::from_yaml_in(BUILD, dir.path()).unwrap();
    let resolution = ModuleResolver::new(&config).resolve();

    let compiler = FakeCompiler::new();
    let engine = engine_with(compiler.clone(), None);
    engine.execute(&resolution).await;

    let sourcepaths: Vec<String> = compiler
        .calls()
        .iter()
        .map(|options| {
            let i = options.iter().position(|o| o == "-sourcepath").unwrap();
            options[i + 1].clone()
        })
        .collect();
    assert_eq!(sourcepaths.len(), 2);
    assert_eq!(sourcepaths[0], sourcepaths[1]);
    assert!(sourcepaths[0].contains("beta"));
    assert!(sourcepaths[0].contains("alpha"));
}

#[tokio::test]
async fn test_unresolvable_reference_aborts_the_run() {
    let dir = TempDir::new().unwrap();
    layout(&dir);
    write(&dir.path().join("beta/src/Broken.java"), "class Broken { Missing missing; }");
    let config = BuildConfig::from_yaml_in(BUILD, dir.path()).unwrap();
    let resolution = ModuleResolver::new(&config).resolve();

    let engine = engine_with(FakeCompiler::new(), None);
    let recorder = EventRecorder::attach(&engine).await;
    let report = engine.execute(&resolution).await;

    assert_eq!(report.status, RunStatus::Failed);
    assert!(report.failure.as_deref().unwrap().contains("compile failed"));
    // alpha never starts
    assert_eq!(recorder.started_steps().len(), 1);
    assert!(class_files(&dir.path().join("beta/classes")).is_empty());
}
