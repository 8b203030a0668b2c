use anyhow::{bail, Context, Result};
use modbuild::cli::commands::{
    ClasspathCommand, ExecCommand, PlanCommand, RunCommand, ValidateCommand,
};
use modbuild::cli::output::*;
use modbuild::cli::{Cli, Command};
use modbuild::core::classpath::cleanup_arg_files;
use modbuild::execution::sources::existing_directories;
use modbuild::execution::{module_classpath, JavaProcessRunner, ModuleResolver, ProcessOutcome};
use modbuild::{BuildConfig, BuildEngine, ClassPath, CompilerRegistry, Interrupt};
use std::path::Path;
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let result = match &cli.command {
        Command::Run(cmd) => run_build(cmd).await,
        Command::Validate(cmd) => validate_build(cmd),
        Command::Plan(cmd) => plan_build(cmd),
        Command::Classpath(cmd) => write_classpath(cmd),
        Command::Exec(cmd) => exec_processes(cmd).await,
    };

    cleanup_arg_files();
    result
}

fn load_config(file: &str) -> Result<BuildConfig> {
    let config = BuildConfig::from_file(file).context("Failed to load build file")?;
    config.validate().context("Build file is invalid")?;
    Ok(config)
}

async fn run_build(cmd: &RunCommand) -> Result<()> {
    let config = load_config(&cmd.file)?;

    println!(
        "{} Loaded build: {}",
        INFO,
        style(config.display_name()).bold()
    );

    if cmd.skip || config.skip {
        println!("{} Skipping build execution (skip=true)", SKIP);
        return Ok(());
    }

    if config.modules.is_empty() {
        println!("{} No build modules configured, skipping.", INFO);
        return Ok(());
    }

    for name in &cmd.module {
        if config.module(name).is_none() {
            bail!("Unknown module: {}", name);
        }
    }

    let interrupt = interrupt_on_ctrl_c();
    let resolution = ModuleResolver::new(&config).resolve();
    let engine = BuildEngine::from_config(&config, &CompilerRegistry::with_defaults(), interrupt)
        .context("Failed to set up the build")?
        .with_module_filter(cmd.module.clone());

    engine
        .add_event_handler(|event| println!("{}", format_build_event(&event)))
        .await;

    let report = engine.execute(&resolution).await;

    println!("\n{} Modules:", INFO);
    for module in &report.modules {
        println!(
            "  {} {}",
            style(&module.name).bold(),
            format_module_state(&module.state)
        );
        for (step, outcome) in &module.steps {
            println!("    {:<10} {}", step.to_string(), format_step_outcome(outcome));
        }
    }

    let warnings = report.warning_count();
    if warnings > 0 {
        println!("{} {} step(s) failed without stopping the build", WARN, warnings);
    }

    if !report.is_success() {
        println!(
            "\n{} Build failed: {}",
            CROSS,
            style(report.failure.as_deref().unwrap_or("unknown error")).red()
        );
        cleanup_arg_files();
        std::process::exit(1);
    }

    println!("\n{} Build {}", CHECK, format_status(report.status));
    Ok(())
}

/// Interrupt that fires on the first Ctrl-C
fn interrupt_on_ctrl_c() -> Interrupt {
    let interrupt = Interrupt::new();
    let signal = interrupt.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping running tools");
            signal.trigger();
        }
    });
    interrupt
}

async fn exec_processes(cmd: &ExecCommand) -> Result<()> {
    let config = load_config(&cmd.file)?;

    if cmd.skip {
        println!("{} Skipping java-process execution (skip=true)", SKIP);
        return Ok(());
    }

    let processes = if cmd.names.is_empty() {
        config.java_processes.iter().collect::<Vec<_>>()
    } else {
        let mut selected = Vec::new();
        for name in &cmd.names {
            match config.java_process(name) {
                Some(process) => selected.push(process),
                None => bail!("Unknown java process: {}", name),
            }
        }
        selected
    };

    if processes.is_empty() {
        println!("{} No java processes configured, skipping.", INFO);
        return Ok(());
    }

    let runner = JavaProcessRunner::from_config(&config, interrupt_on_ctrl_c());
    for process in processes {
        println!("{} {} ({})", ROCKET, style(&process.name).bold(), process.main_class);
        let outcome = runner
            .run(process)
            .await
            .with_context(|| format!("Java process {} failed", process.name))?;
        match outcome {
            ProcessOutcome::Skipped => println!("{} {} skipped", SKIP, process.name),
            ProcessOutcome::Succeeded => println!("{} {} completed", CHECK, process.name),
            ProcessOutcome::FailedLenient { code } => {
                println!("{} {} exited with code {}", WARN, process.name, code)
            }
        }
    }

    Ok(())
}

fn validate_build(cmd: &ValidateCommand) -> Result<()> {
    let config = match load_config(&cmd.file) {
        Ok(config) => config,
        Err(e) => {
            if cmd.json {
                println!("{}", serde_json::json!({ "valid": false, "error": format!("{:#}", e) }));
            } else {
                println!("{} Build file is invalid: {:#}", CROSS, e);
            }
            std::process::exit(1);
        }
    };

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("{} Build file is valid", CHECK);
    println!("  Name: {}", style(config.display_name()).bold());
    println!("  Compiler: {}", config.compiler.backend);
    println!("  Modules: {}", config.modules.len());
    for module in &config.modules {
        println!("    - {}", module.display_name());
    }
    if !config.java_processes.is_empty() {
        println!("  Java processes: {}", config.java_processes.len());
        for process in &config.java_processes {
            println!("    - {} ({})", process.name, process.main_class);
        }
    }

    Ok(())
}

fn plan_build(cmd: &PlanCommand) -> Result<()> {
    let config = load_config(&cmd.file)?;
    let resolution = ModuleResolver::new(&config).resolve();
    let dependency_classpath = config.dependency_classpath();

    println!("{} Plan for {}", INFO, style(config.display_name()).bold());

    for skipped in &resolution.skipped {
        println!(
            "\n{} {} skipped: {}",
            SKIP,
            style(&skipped.name).dim(),
            skipped.reason
        );
    }

    for module in &resolution.modules {
        let steps: Vec<String> = module.step_kinds().iter().map(|s| s.to_string()).collect();
        println!("\n  {}", style(&module.name).bold());
        println!(
            "    steps:     {}",
            if steps.is_empty() {
                style("(none)".to_string()).dim().to_string()
            } else {
                steps.join(" → ")
            }
        );
        if let Some(output) = &module.output_directory {
            println!("    output:    {}", output.display());
        }
        println!("    classpath:");
        for entry in module_classpath(&resolution.modules, &dependency_classpath, module).entries() {
            println!("      {}", entry);
        }
    }

    Ok(())
}

fn write_classpath(cmd: &ClasspathCommand) -> Result<()> {
    let config = load_config(&cmd.file)?;
    let resolution = ModuleResolver::new(&config).resolve();

    let module = match resolution.module(&cmd.module) {
        Some(module) => module,
        None if config.module(&cmd.module).is_some() => {
            bail!("Module {} was skipped during resolution", cmd.module)
        }
        None => bail!("Unknown module: {}", cmd.module),
    };

    let mut classpath = ClassPath::empty();
    if cmd.sources {
        classpath = ClassPath::of_paths(existing_directories(&module.source_directories));
    }
    let classpath = classpath.append(&module_classpath(
        &resolution.modules,
        &config.dependency_classpath(),
        module,
    ));

    match &cmd.output {
        Some(output) => {
            let output = Path::new(output);
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(output, classpath.to_string())
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("{} Wrote class path to {}", CHECK, output.display());
        }
        None => println!("{}", classpath),
    }

    Ok(())
}
