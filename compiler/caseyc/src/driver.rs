//! The staged compilation pipeline.

use std::fs;

use casey_diagnostic::DiagnosticList;
use casey_java::javac::DEFAULT_TIMEOUT;
use casey_java::{compile_project, generate, GenerateOptions};
use casey_parse::load;

use crate::cli::{parse_args, usage, CliArgs, Language};

/// Run the full pipeline and return the process exit code:
/// `0` success, `1` argument parsing, `2` document parsing,
/// `3` code generation, `4` native compilation.
pub fn run(args: &[String]) -> i32 {
    let cli = match parse_args(args) {
        Ok(cli) => cli,
        Err(error) => {
            eprintln!("{error}");
            eprintln!();
            eprintln!("{}", usage());
            eprintln!("[STAGE 1: COMMANDLINE-PARSING FAILED]");
            return 1;
        }
    };
    println!("[STAGE 1: COMMANDLINE-PARSING COMPLETE]");

    let Some(project) = parse_stage(&cli) else {
        eprintln!("[STAGE 2: CASEY-PARSING FAILED]");
        return 2;
    };
    println!("[STAGE 2: CASEY-PARSING COMPLETE]");

    let generated_ok = match cli.language {
        Language::Java => generate_stage(&cli, &project),
    };
    if !generated_ok {
        eprintln!("[STAGE 3: CODE-GENERATION FAILED]");
        return 3;
    }
    println!("[STAGE 3: CODE-GENERATION COMPLETE]");

    let compiled_ok = match cli.language {
        Language::Java => compile_stage(&cli),
    };
    if !compiled_ok {
        eprintln!("[STAGE 4: CODE-COMPILATION FAILED]");
        return 4;
    }
    println!("[STAGE 4: CODE-COMPILATION COMPLETE]");
    0
}

fn report(diagnostics: &DiagnosticList) {
    for diagnostic in diagnostics.iter() {
        eprintln!("{diagnostic}");
    }
}

fn parse_stage(cli: &CliArgs) -> Option<casey_parse::LoadedProject> {
    tracing::debug!(path = %cli.path.display(), "reading document");
    let text = match fs::read_to_string(&cli.path) {
        Ok(text) => text,
        Err(error) => {
            eprintln!("could not read `{}`: {error}", cli.path.display());
            return None;
        }
    };
    match load(&text) {
        Ok(project) => {
            // Warnings and function-local errors: report now, the broken
            // functions are skipped during generation.
            report(&project.diagnostics);
            Some(project)
        }
        Err(diagnostics) => {
            report(&diagnostics);
            None
        }
    }
}

fn generate_stage(cli: &CliArgs, project: &casey_parse::LoadedProject) -> bool {
    tracing::debug!(entry = %cli.function, "generating sources");
    let options = GenerateOptions {
        entry_function: cli.function.clone(),
        parameters: cli.parameters.clone(),
        ignore_comments: cli.ignore_comments,
        output_root: cli.base_path(),
    };
    let diagnostics = generate(
        &project.tree,
        project.root,
        &project.broken_functions,
        &options,
    );
    report(&diagnostics);
    // A function that failed to load counts as a generation failure even
    // though its siblings were still emitted.
    !diagnostics.has_errors()
        && !project.diagnostics.has_errors()
        && project.broken_functions.is_empty()
}

fn compile_stage(cli: &CliArgs) -> bool {
    match compile_project(&cli.base_path(), &cli.function_path(), DEFAULT_TIMEOUT) {
        Ok(()) => true,
        Err(error) => {
            eprintln!("{error}");
            false
        }
    }
}
