//! Command-line surface for the `onr-lsp` binary.
//!
//! `onr-lsp` with no arguments (or `serve`) runs the language server over
//! stdio. `format` runs the formatter over a file or stdin, and `version`
//! prints the build banner.

use clap::{Arg, ArgAction, ArgMatches, Command};
use onr_analysis::{format_document, FormatOptions};
use std::io::{Error, ErrorKind, Read, Write};

pub fn command() -> Command {
    Command::new("onr-lsp")
        .about("Language server and formatter for the ONR provider DSL")
        .subcommand(Command::new("serve").about("Run the language server over stdio"))
        .subcommand(
            Command::new("format")
                .about("Format an ONR DSL document")
                .arg(
                    Arg::new("tab-size")
                        .long("tab-size")
                        .value_parser(clap::value_parser!(u32))
                        .default_value("2")
                        .help("Tab size when using spaces"),
                )
                .arg(
                    Arg::new("tabs")
                        .long("tabs")
                        .action(ArgAction::SetTrue)
                        .help("Use tabs for indentation"),
                )
                .arg(
                    Arg::new("write")
                        .long("write")
                        .short('w')
                        .action(ArgAction::SetTrue)
                        .help("Write result back to file"),
                )
                .arg(
                    Arg::new("path")
                        .index(1)
                        .help("File to format, or '-' for stdin"),
                ),
        )
        .subcommand(Command::new("version").about("Show version information"))
}

pub fn version_banner() -> String {
    let commit = option_env!("ONR_COMMIT").unwrap_or("unknown");
    let build_date = option_env!("ONR_BUILD_DATE").unwrap_or("").trim();
    format!(
        "onr-lsp version={} commit={} build_date={}",
        env!("CARGO_PKG_VERSION"),
        commit,
        build_date
    )
}

/// Runs the `format` subcommand against the given streams. `--write` requires
/// a real path and leaves the file untouched when formatting changes nothing.
pub fn run_format(
    matches: &ArgMatches,
    input: &mut dyn Read,
    output: &mut dyn Write,
) -> std::io::Result<()> {
    let tab_size = matches.get_one::<u32>("tab-size").copied().unwrap_or(2);
    let insert_spaces = !matches.get_flag("tabs");
    let write = matches.get_flag("write");
    let path = matches
        .get_one::<String>("path")
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .unwrap_or("-");

    let source = read_format_source(path, input)?;
    let formatted = format_document(
        &source,
        FormatOptions {
            tab_size,
            insert_spaces,
        },
    );

    if write {
        return write_formatted_output(path, &source, &formatted);
    }
    output.write_all(formatted.as_bytes())
}

fn read_format_source(path: &str, input: &mut dyn Read) -> std::io::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        input.read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path)
}

fn write_formatted_output(path: &str, source: &str, formatted: &str) -> std::io::Result<()> {
    if path == "-" {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "--write requires a file path",
        ));
    }
    if formatted == source {
        return Ok(());
    }
    std::fs::write(path, formatted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;

    fn format_matches(args: &[&str]) -> ArgMatches {
        let matches = command()
            .try_get_matches_from(args)
            .expect("argument parsing");
        match matches.subcommand() {
            Some(("format", sub)) => sub.clone(),
            other => panic!("expected format subcommand, got {other:?}"),
        }
    }

    const UNFORMATTED: &str =
        "provider \"x\" {\ndefaults {\nrequest {\nreq_map openai_chat_to_openai_responses;\n}\n}\n}\n";
    const FORMATTED: &str =
        "provider \"x\" {\n  defaults {\n    request {\n      req_map openai_chat_to_openai_responses;\n    }\n  }\n}\n";

    #[test]
    fn formats_stdin_to_stdout() {
        let sub = format_matches(&["onr-lsp", "format"]);
        let mut input = Cursor::new(UNFORMATTED);
        let mut output = Vec::new();
        run_format(&sub, &mut input, &mut output).expect("format");
        assert_eq!(String::from_utf8(output).expect("utf8"), FORMATTED);
    }

    #[test]
    fn formats_with_custom_tab_size() {
        let sub = format_matches(&["onr-lsp", "format", "--tab-size", "4"]);
        let mut input = Cursor::new("a {\nb;\n}\n");
        let mut output = Vec::new();
        run_format(&sub, &mut input, &mut output).expect("format");
        assert_eq!(String::from_utf8(output).expect("utf8"), "a {\n    b;\n}\n");
    }

    #[test]
    fn formats_with_tabs() {
        let sub = format_matches(&["onr-lsp", "format", "--tabs"]);
        let mut input = Cursor::new("a {\nb;\n}\n");
        let mut output = Vec::new();
        run_format(&sub, &mut input, &mut output).expect("format");
        assert_eq!(String::from_utf8(output).expect("utf8"), "a {\n\tb;\n}\n");
    }

    #[test]
    fn write_rewrites_the_file_in_place() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gw.conf");
        fs::write(&path, UNFORMATTED).expect("seed file");

        let path_str = path.to_string_lossy().into_owned();
        let sub = format_matches(&["onr-lsp", "format", "--write", &path_str]);
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        run_format(&sub, &mut input, &mut output).expect("format");

        assert_eq!(fs::read_to_string(&path).expect("read back"), FORMATTED);
        assert!(output.is_empty());
    }

    #[test]
    fn write_without_path_is_an_error() {
        let sub = format_matches(&["onr-lsp", "format", "-w"]);
        let mut input = Cursor::new(UNFORMATTED);
        let mut output = Vec::new();
        let err = run_format(&sub, &mut input, &mut output).expect_err("must fail");
        assert!(err.to_string().contains("--write requires a file path"));
    }

    #[test]
    fn version_banner_names_the_binary() {
        let banner = version_banner();
        assert!(banner.starts_with("onr-lsp version="));
        assert!(banner.contains("commit="));
        assert!(banner.contains("build_date="));
    }

    #[test]
    fn rejects_extra_positional_arguments() {
        assert!(command()
            .try_get_matches_from(["onr-lsp", "format", "a.conf", "b.conf"])
            .is_err());
    }
}
