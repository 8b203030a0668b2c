//! Scenario: which step failures stop the run
#![cfg(unix)]

use crate::helpers::*;
use modbuild::core::state::StepOutcome;
use modbuild::{BuildConfig, Interrupt, ModuleResolver, RunStatus, StepKind};
use tempfile::TempDir;

fn build_yaml(translate_fail_on_error: bool) -> String {
    format!(
        r#"
java_home: jdk
modules:
  - name: web
    source_directories: [web/src]
    output_directory: web/classes
    compile:
      enabled: true
    translate:
      enabled: true
      fail_on_error: {}
      modules: [com.example.App]
    package:
      enabled: true
      source_directory: web/war
      destination: out/web.war
  - name: api
    source_directories: [api/src]
    output_directory: api/classes
    compile:
      enabled: true
"#,
        translate_fail_on_error
    )
}

fn layout(dir: &TempDir) {
    write(&dir.path().join("web/src/App.java"), "class App { }");
    write(&dir.path().join("web/war/index.html"), "<html/>");
    write(&dir.path().join("api/src/Api.java"), "class Api { }");
    fake_java(&dir.path().join("jdk"), "echo \"translator says no\"\nexit 3");
}

#[tokio::test]
async fn test_lenient_translate_failure_continues() {
    let dir = TempDir::new().unwrap();
    layout(&dir);
    let config = BuildConfig::from_yaml_in(&build_yaml(false), dir.path()).unwrap();
    let resolution = ModuleResolver::new(&config).resolve();

    let engine = engine_with(FakeCompiler::new(), config.java_home.clone());
    let recorder = EventRecorder::attach(&engine).await;
    let report = engine.execute(&resolution).await;

    assert_eq!(report.status, RunStatus::Completed, "{:?}", report.failure);
    assert_eq!(recorder.warnings(), vec![("web".to_string(), StepKind::Translate)]);
    assert_eq!(report.warning_count(), 1);

    let web = report.module("web").unwrap();
    assert!(matches!(
        web.outcome(StepKind::Translate),
        Some(StepOutcome::FailedNonFatal { error }) if error.contains("exited with code 3")
    ));
    assert_eq!(web.outcome(StepKind::Package), Some(&StepOutcome::Success));
    assert!(dir.path().join("out/web.war").is_file());
    assert_eq!(class_files(&dir.path().join("api/classes")), vec!["Api.class"]);
}

#[tokio::test]
async fn test_strict_translate_failure_aborts_everything_after_it() {
    let dir = TempDir::new().unwrap();
    layout(&dir);
    let config = BuildConfig::from_yaml_in(&build_yaml(true), dir.path()).unwrap();
    let resolution = ModuleResolver::new(&config).resolve();

    let engine = engine_with(FakeCompiler::new(), config.java_home.clone());
    let recorder = EventRecorder::attach(&engine).await;
    let report = engine.execute(&resolution).await;

    assert_eq!(report.status, RunStatus::Failed);
    assert_eq!(
        recorder.started_steps(),
        vec![
            ("web".to_string(), StepKind::Compile),
            ("web".to_string(), StepKind::Translate),
        ]
    );
    // compiled output of the aborted module stays on disk
    assert_eq!(class_files(&dir.path().join("web/classes")), vec!["App.class"]);
    assert!(!dir.path().join("out/web.war").exists());
    assert!(report.module("api").is_none());
}

#[tokio::test]
async fn test_document_failure_is_always_fatal() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("svc/src/Service.java"), "class Service { }");
    fake_java(&dir.path().join("jdk"), "exit 1");

    let yaml = r#"
java_home: jdk
modules:
  - name: svc
    source_directories: [svc/src]
    output_directory: svc/classes
    document:
      enabled: true
      service_class: com.example.Service
      output_directory: svc/wsdl
"#;
    let config = BuildConfig::from_yaml_in(yaml, dir.path()).unwrap();
    let resolution = ModuleResolver::new(&config).resolve();

    let engine = engine_with(FakeCompiler::new(), config.java_home.clone());
    let report = engine.execute(&resolution).await;

    assert_eq!(report.status, RunStatus::Failed);
    assert!(matches!(
        report.module("svc").unwrap().outcome(StepKind::Document),
        Some(StepOutcome::FailedFatal { .. })
    ));
}

#[tokio::test]
async fn test_translate_receives_module_sources_on_its_classpath() {
    let dir = TempDir::new().unwrap();
    layout(&dir);
    let args = dir.path().join("args.txt");
    fake_java(
        &dir.path().join("jdk"),
        &format!("for a in \"$@\"; do echo \"$a\" >> '{}'; done", args.display()),
    );
    let config = BuildConfig::from_yaml_in(&build_yaml(true), dir.path()).unwrap();
    let resolution = ModuleResolver::new(&config).resolve();

    let engine = engine_with(FakeCompiler::new(), config.java_home.clone());
    let report = engine.execute(&resolution).await;
    assert_eq!(report.status, RunStatus::Completed, "{:?}", report.failure);

    let recorded = std::fs::read_to_string(&args).unwrap();
    let lines: Vec<&str> = recorded.lines().collect();
    let cp = lines.iter().position(|l| *l == "-cp").unwrap();
    assert!(lines[cp + 1].ends_with(&dir.path().join("web/src").display().to_string()));
    assert!(lines.contains(&"com.google.gwt.dev.Compiler"));
    assert_eq!(lines.last(), Some(&"com.example.App"));
}

#[tokio::test]
async fn test_lenient_package_write_failure_warns_and_continues() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("web/src/App.java"), "class App { }");
    write(&dir.path().join("web/war/index.html"), "<html/>");
    write(&dir.path().join("api/src/Api.java"), "class Api { }");
    // a directory where the archive file should go
    std::fs::create_dir_all(dir.path().join("out/web.war")).unwrap();

    let yaml = r#"
modules:
  - name: web
    source_directories: [web/src]
    output_directory: web/classes
    compile:
      enabled: true
    package:
      enabled: true
      fail_on_error: false
      source_directory: web/war
      destination: out/web.war
  - name: api
    source_directories: [api/src]
    output_directory: api/classes
    compile:
      enabled: true
"#;
    let config = BuildConfig::from_yaml_in(yaml, dir.path()).unwrap();
    let resolution = ModuleResolver::new(&config).resolve();

    let engine = engine_with(FakeCompiler::new(), None);
    let recorder = EventRecorder::attach(&engine).await;
    let report = engine.execute(&resolution).await;

    assert_eq!(report.status, RunStatus::Completed, "{:?}", report.failure);
    assert_eq!(recorder.warnings(), vec![("web".to_string(), StepKind::Package)]);
    assert!(matches!(
        report.module("web").unwrap().outcome(StepKind::Package),
        Some(StepOutcome::FailedNonFatal { .. })
    ));
    assert!(dir.path().join("out/web.war").is_dir());
    assert_eq!(class_files(&dir.path().join("api/classes")), vec!["Api.class"]);
}

#[tokio::test]
async fn test_interrupted_lenient_translate_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("web/src/App.java"), "class App { }");
    fake_java(&dir.path().join("jdk"), "sleep 5");

    let yaml = r#"
java_home: jdk
modules:
  - name: web
    source_directories: [web/src]
    output_directory: web/classes
    translate:
      enabled: true
      fail_on_error: false
      modules: [com.example.App]
"#;
    let config = BuildConfig::from_yaml_in(yaml, dir.path()).unwrap();
    let resolution = ModuleResolver::new(&config).resolve();

    let interrupt = Interrupt::new();
    let engine = engine_interruptible(FakeCompiler::new(), config.java_home.clone(), interrupt.clone());
    trigger_after(&interrupt, 200);
    let started = std::time::Instant::now();
    let report = engine.execute(&resolution).await;

    assert!(started.elapsed() < std::time::Duration::from_secs(4));
    assert_eq!(report.status, RunStatus::Completed, "{:?}", report.failure);
    assert!(matches!(
        report.module("web").unwrap().outcome(StepKind::Translate),
        Some(StepOutcome::FailedNonFatal { error }) if error.contains("interrupted")
    ));
}

#[tokio::test]
async fn test_interrupted_document_is_fatal() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("svc/src/Service.java"), "class Service { }");
    fake_java(&dir.path().join("jdk"), "sleep 5");

    let yaml = r#"
java_home: jdk
modules:
  - name: svc
    source_directories: [svc/src]
    output_directory: svc/classes
    document:
      enabled: true
      service_class: com.example.Service
      output_directory: svc/wsdl
"#;
    let config = BuildConfig::from_yaml_in(yaml, dir.path()).unwrap();
    let resolution = ModuleResolver::new(&config).resolve();

    let interrupt = Interrupt::new();
    let engine = engine_interruptible(FakeCompiler::new(), config.java_home.clone(), interrupt.clone());
    trigger_after(&interrupt, 200);
    let report = engine.execute(&resolution).await;

    assert_eq!(report.status, RunStatus::Failed);
    assert!(matches!(
        report.module("svc").unwrap().outcome(StepKind::Document),
        Some(StepOutcome::FailedFatal { error }) if error.contains("interrupted")
    ));
}
