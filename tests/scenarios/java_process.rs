//! Scenario: declared Java processes run against the project class path
#![cfg(unix)]

use crate::helpers::*;
use modbuild::core::classpath::PATH_SEPARATOR;
use modbuild::{BuildConfig, BuildError, Interrupt, JavaProcessRunner, ProcessOutcome};
use tempfile::TempDir;

const YAML: &str = r#"
java_home: jdk
dependency_classpath: [lib/dep.jar, lib/missing.jar]
modules:
  - name: web
    source_directories: [web/src]
    output_directory: web/classes
  - name: api
    source_directories: [api/src]
    output_directory: api/classes
java_processes:
  - name: codegen
    main_class: com.example.Codegen
    classpath_entries: [tools/codegen.jar]
    jvm_arguments: [-Xmx256m]
    system_properties:
      codegen.out: gen
    arguments: [--verbose]
    working_directory: work
  - name: flaky
    main_class: com.example.Flaky
    include_project_classpath: false
    fail_on_error: false
  - name: broken
    main_class: com.example.Broken
"#;

fn layout(dir: &TempDir) {
    std::fs::create_dir_all(dir.path().join("web/classes")).unwrap();
    std::fs::create_dir_all(dir.path().join("work")).unwrap();
    write(&dir.path().join("lib/dep.jar"), "jar");
    let record = dir.path().join("record.txt");
    fake_java(
        &dir.path().join("jdk"),
        &format!(
            "pwd > '{record}'\nfor a in \"$@\"; do echo \"$a\" >> '{record}'; done\ncase \"$*\" in *Codegen*) exit 0;; *) exit 7;; esac",
            record = record.display()
        ),
    );
}

fn recorded(dir: &TempDir) -> Vec<String> {
    std::fs::read_to_string(dir.path().join("record.txt"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_process_runs_with_project_classpath_and_working_directory() {
    let dir = TempDir::new().unwrap();
    layout(&dir);
    let config = BuildConfig::from_yaml_in(YAML, dir.path()).unwrap();
    config.validate().unwrap();

    let runner = JavaProcessRunner::from_config(&config, Interrupt::new());
    let outcome = runner.run(config.java_process("codegen").unwrap()).await.unwrap();
    assert_eq!(outcome, ProcessOutcome::Succeeded);

    let lines = recorded(&dir);
    let work = dir.path().join("work").canonicalize().unwrap();
    assert_eq!(std::path::Path::new(&lines[0]).canonicalize().unwrap(), work);
    assert_eq!(
        &lines[1..],
        &[
            "-Xmx256m".to_string(),
            "-Dcodegen.out=gen".to_string(),
            "-cp".to_string(),
            [
                dir.path().join("web/classes").display().to_string(),
                dir.path().join("lib/dep.jar").display().to_string(),
                dir.path().join("tools/codegen.jar").display().to_string(),
            ]
            .join(PATH_SEPARATOR),
            "com.example.Codegen".to_string(),
            "--verbose".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_exit_code_handling_follows_fail_on_error() {
    let dir = TempDir::new().unwrap();
    layout(&dir);
    let config = BuildConfig::from_yaml_in(YAML, dir.path()).unwrap();
    let runner = JavaProcessRunner::from_config(&config, Interrupt::new());

    let flaky = runner.run(config.java_process("flaky").unwrap()).await.unwrap();
    assert_eq!(flaky, ProcessOutcome::FailedLenient { code: 7 });
    assert!(!recorded(&dir).iter().any(|l| l == "-cp"));

    let broken = runner.run(config.java_process("broken").unwrap()).await;
    assert!(matches!(
        broken,
        Err(BuildError::ProcessFailure { ref name, code: 7, .. }) if name == "broken"
    ));
}

#[tokio::test]
async fn test_interrupt_stops_a_running_process() {
    let dir = TempDir::new().unwrap();
    fake_java(&dir.path().join("jdk"), "sleep 5");
    let config = BuildConfig::from_yaml_in(YAML, dir.path()).unwrap();

    let interrupt = Interrupt::new();
    let runner = JavaProcessRunner::from_config(&config, interrupt.clone());
    trigger_after(&interrupt, 200);
    let result = runner.run(config.java_process("codegen").unwrap()).await;

    assert!(matches!(result, Err(BuildError::Process(_))));
}
