//! CLI tool to inspect the declarations in PHP source files.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use phpscan_rs::{ClassScanner, Error, FileScanner, MethodScanner, ScanOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "phpscan")]
#[command(version)]
#[command(about = "Static scanner for PHP declarations")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Treat input as PHP code from the first byte (no `<?php` needed)
    #[arg(long, global = true)]
    code: bool,

    /// Fail a file on its first lexical diagnostic
    #[arg(long, global = true)]
    strict: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List the classes and functions declared in each file
    List {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print every declaration with its members and parameters
    Describe {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Report lexical diagnostics; exits non-zero if any are found
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = ScanOptions::new().start_in_code(cli.code);

    let (Command::List { files } | Command::Describe { files } | Command::Check { files }) =
        &cli.command;

    let mut had_error = false;

    for path in files {
        let shown = path.display();
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{shown}: {e}");
                had_error = true;
                continue;
            }
        };

        let file = FileScanner::with_options(&content, &options);
        if cli.strict {
            if let Some(err) = file.diagnostics().first() {
                eprintln!("{shown}: {}", Error::MalformedSource(err.clone()));
                had_error = true;
                continue;
            }
        }

        match &cli.command {
            Command::List { .. } => list(&file),
            Command::Describe { .. } => {
                if let Err(e) = describe(&file) {
                    eprintln!("{shown}: {e}");
                    had_error = true;
                }
            }
            Command::Check { .. } => {
                if file.diagnostics().is_empty() {
                    eprintln!("{shown}: ok");
                } else {
                    for diagnostic in file.diagnostics() {
                        eprintln!("{shown}: {diagnostic}");
                    }
                    had_error = true;
                }
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn list(file: &FileScanner) {
    for class in file.classes() {
        println!("class {class}");
    }
    for function in file.functions() {
        println!("function {function}");
    }
}

fn describe(file: &FileScanner) -> Result<(), Error> {
    if let Some(namespace) = file.namespace() {
        println!("namespace {namespace}");
    }
    for (alias, name) in file.uses() {
        println!("use {name} as {alias}");
    }
    for name in file.classes() {
        describe_class(file.class(name)?)?;
    }
    for name in file.functions() {
        describe_method(file.function(name)?, "");
    }
    Ok(())
}

fn describe_class(class: &ClassScanner) -> Result<(), Error> {
    let kind = format!("{:?}", class.kind()).to_lowercase();
    print!("{kind} {} (lines {}-{})", class.name(), class.line_start(), class.line_end());
    if let Some(parent) = class.parent_class() {
        print!(" extends {parent}");
    }
    if !class.interfaces().is_empty() {
        print!(" implements {}", class.interfaces().join(", "));
    }
    println!();

    for name in class.traits() {
        println!("  use {name}");
    }
    for name in class.constants() {
        let constant = class.constant(name)?;
        println!("  const {name} = {}", constant.value().unwrap_or(""));
    }
    for name in class.properties() {
        let property = class.property(name)?;
        print!("  {} ", property.visibility());
        if let Some(hint) = property.type_hint() {
            print!("{hint} ");
        }
        print!("${name}");
        if let Some(value) = property.default_value() {
            print!(" = {value}");
        }
        println!();
    }
    for name in class.methods() {
        describe_method(class.method(name)?, "  ");
    }
    Ok(())
}

fn describe_method(method: &MethodScanner, indent: &str) {
    let mut flags = vec![method.visibility().to_string()];
    if method.is_abstract() {
        flags.push("abstract".to_string());
    }
    if method.is_final() {
        flags.push("final".to_string());
    }
    if method.is_static() {
        flags.push("static".to_string());
    }
    print!(
        "{indent}{} function {}() (lines {}-{})",
        flags.join(" "),
        method.name(),
        method.line_start(),
        method.line_end()
    );
    if let Some(ret) = method.return_type() {
        print!(": {ret}");
    }
    println!();

    for param in method.parameter_scanners() {
        print!("{indent}  #{} ${}", param.position(), param.name());
        if let Some(class) = param.class() {
            print!(" [{class}]");
        } else if let Some(hint) = param.type_hint() {
            print!(" [{hint}]");
        }
        if let Some(value) = param.default_value() {
            print!(" = {value}");
        }
        println!();
    }
}
