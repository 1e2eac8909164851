//! Command-line argument parsing.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Target language of a compilation run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Language {
    Java,
}

impl Language {
    pub fn parse(text: &str) -> Option<Language> {
        match text.to_ascii_lowercase().as_str() {
            "java" => Some(Language::Java),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Java => write!(f, "JAVA"),
        }
    }
}

/// Parsed command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliArgs {
    /// The document to compile.
    pub path: PathBuf,
    /// Full dotted path of the function to start with.
    pub function: String,
    pub language: Language,
    /// `-pa name=value` pairs for the entry function.
    pub parameters: Vec<(String, String)>,
    pub ignore_comments: bool,
}

impl CliArgs {
    /// The directory the document lives in; generated sources go here.
    pub fn base_path(&self) -> PathBuf {
        self.path
            .parent()
            .map_or_else(PathBuf::new, Path::to_path_buf)
    }

    /// Path of the entry function's generated source file.
    pub fn function_path(&self) -> PathBuf {
        let mut relative = self.function.replace('.', "/");
        relative.push_str(".java");
        self.base_path().join(relative)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("missing value for {0}")]
    MissingValue(String),
    #[error("missing required option {0}")]
    MissingRequired(&'static str),
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    #[error("parameter `{0}` is not of the form name=value")]
    BadParameter(String),
    #[error("unknown language `{0}` (supported: JAVA)")]
    UnknownLanguage(String),
}

/// Parse the command line (without the executable name).
pub fn parse_args(args: &[String]) -> Result<CliArgs, CliError> {
    let mut path = None;
    let mut function = None;
    let mut language = None;
    let mut parameters = Vec::new();
    let mut ignore_comments = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-p" | "--path" => {
                let value = iter
                    .next()
                    .ok_or_else(|| CliError::MissingValue(arg.clone()))?;
                path = Some(PathBuf::from(value));
            }
            "-f" | "--function" => {
                let value = iter
                    .next()
                    .ok_or_else(|| CliError::MissingValue(arg.clone()))?;
                function = Some(value.clone());
            }
            "-l" | "--language" => {
                let value = iter
                    .next()
                    .ok_or_else(|| CliError::MissingValue(arg.clone()))?;
                language = Some(
                    Language::parse(value).ok_or_else(|| CliError::UnknownLanguage(value.clone()))?,
                );
            }
            "-pa" | "--parameter" => {
                let value = iter
                    .next()
                    .ok_or_else(|| CliError::MissingValue(arg.clone()))?;
                let (key, parameter_value) = value
                    .split_once('=')
                    .ok_or_else(|| CliError::BadParameter(value.clone()))?;
                parameters.push((key.to_owned(), parameter_value.to_owned()));
            }
            "-i" | "--ignorecomments" => ignore_comments = true,
            other => return Err(CliError::UnknownOption(other.to_owned())),
        }
    }

    Ok(CliArgs {
        path: path.ok_or(CliError::MissingRequired("-p/--path"))?,
        function: function.ok_or(CliError::MissingRequired("-f/--function"))?,
        language: language.ok_or(CliError::MissingRequired("-l/--language"))?,
        parameters,
        ignore_comments,
    })
}

/// Usage text printed on argument errors.
pub fn usage() -> String {
    [
        "Usage: caseyc -p <document.casey> -f <Project.pkg.Function> -l <language> [options]",
        "",
        "Options:",
        "  -p,  --path <file>            The .casey document to compile",
        "  -f,  --function <full.name>   The function to start with",
        "  -l,  --language <name>        The target language (JAVA)",
        "  -pa, --parameter <name=value> A parameter of the start function (repeatable)",
        "  -i,  --ignorecomments         Do not emit comments into the generated code",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn parses_the_full_surface() {
        let parsed = parse_args(&args(&[
            "-p",
            "demo/program.casey",
            "-f",
            "Prj.util.Greet",
            "-l",
            "java",
            "-pa",
            "who=world",
            "-pa",
            "times=3",
            "-i",
        ]))
        .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(parsed.path, PathBuf::from("demo/program.casey"));
        assert_eq!(parsed.function, "Prj.util.Greet");
        assert_eq!(parsed.language, Language::Java);
        assert_eq!(
            parsed.parameters,
            vec![
                ("who".to_owned(), "world".to_owned()),
                ("times".to_owned(), "3".to_owned()),
            ]
        );
        assert!(parsed.ignore_comments);
    }

    #[test]
    fn long_flags_are_accepted() {
        let parsed = parse_args(&args(&[
            "--path",
            "p.casey",
            "--function",
            "P.f",
            "--language",
            "JAVA",
        ]))
        .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(parsed.language, Language::Java);
        assert!(!parsed.ignore_comments);
    }

    #[test]
    fn missing_required_options_are_reported() {
        assert_eq!(
            parse_args(&args(&["-p", "p.casey", "-l", "java"])),
            Err(CliError::MissingRequired("-f/--function"))
        );
        assert_eq!(
            parse_args(&args(&["-f", "P.f", "-l", "java"])),
            Err(CliError::MissingRequired("-p/--path"))
        );
    }

    #[test]
    fn unknown_language_is_rejected() {
        assert_eq!(
            parse_args(&args(&["-p", "p", "-f", "P.f", "-l", "lua"])),
            Err(CliError::UnknownLanguage("lua".to_owned()))
        );
    }

    #[test]
    fn malformed_parameter_is_rejected() {
        assert_eq!(
            parse_args(&args(&["-p", "p", "-f", "P.f", "-l", "java", "-pa", "oops"])),
            Err(CliError::BadParameter("oops".to_owned()))
        );
    }

    #[test]
    fn derived_paths() {
        let parsed = parse_args(&args(&["-p", "demo/program.casey", "-f", "P.util.f", "-l", "java"]))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(parsed.base_path(), PathBuf::from("demo"));
        assert_eq!(parsed.function_path(), PathBuf::from("demo/P/util/f.java"));
    }
}
