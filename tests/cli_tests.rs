//! Argument parsing and file-driven runs of the front end.

use clap::Parser;
use lmc::cli::{run_with, Cli, CliError, DEFAULT_MEM_SIZE};
use lmc::error::VmError;
use std::io::Write;
use tempfile::NamedTempFile;

const ADD_ONE: &str = "    INP\n    ADD one\n    OUT\n    HLT\none DAT 1\n";

fn source(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

fn cli(file: &NamedTempFile, extra: &[&str]) -> Cli {
    let path = file.path().to_str().unwrap();
    let mut args = vec!["lmc", path];
    args.extend_from_slice(extra);
    Cli::try_parse_from(args).unwrap()
}

fn execute(cli: &Cli, input: &str) -> (Result<(), CliError>, String) {
    let mut out = Vec::new();
    let result = run_with(cli, input.as_bytes(), &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn cli_parse_defaults() {
    let cli = Cli::try_parse_from(["lmc", "prog.lmc"]).unwrap();
    assert_eq!(cli.file.to_str(), Some("prog.lmc"));
    assert_eq!(cli.mem_size, DEFAULT_MEM_SIZE);
    assert!(!cli.no_prompt);
    assert!(!cli.no_extensions);
    assert!(!cli.append_hlt);
    assert!(!cli.dump);
    assert!(!cli.verbose);
}

#[test]
fn cli_parse_flags() {
    let cli = Cli::try_parse_from([
        "lmc",
        "prog.lmc",
        "-m",
        "100",
        "--no-prompt",
        "--no-extensions",
        "--append-hlt",
        "-d",
        "-v",
    ])
    .unwrap();
    assert_eq!(cli.mem_size, 100);
    assert!(cli.no_prompt);
    assert!(cli.no_extensions);
    assert!(cli.append_hlt);
    assert!(cli.dump);
    assert!(cli.verbose);
}

#[test]
fn cli_requires_a_file() {
    assert!(Cli::try_parse_from(["lmc"]).is_err());
}

#[test]
fn cli_rejects_bad_mem_size() {
    assert!(Cli::try_parse_from(["lmc", "prog.lmc", "--mem-size", "lots"]).is_err());
}

#[test]
fn runs_source_file() {
    let file = source(ADD_ONE);
    let (result, out) = execute(&cli(&file, &["--no-prompt"]), "5\n");
    result.unwrap();
    assert_eq!(out, "6\n");
}

#[test]
fn prompts_by_default() {
    let file = source(ADD_ONE);
    let (result, out) = execute(&cli(&file, &[]), "41\n");
    result.unwrap();
    assert_eq!(out, ">? 42\n");
}

#[test]
fn dump_lists_words_without_running() {
    let file = source("INP\nHLT\nDAT -1\n");
    let (result, out) = execute(&cli(&file, &["--dump"]), "");
    result.unwrap();
    assert_eq!(
        out,
        "    0  0x48000001   9 1\n    1  0x00000000   0 0\n    2  0xffffffff  31 134217727\n"
    );
}

#[test]
fn program_must_fit_memory() {
    let file = source(ADD_ONE);
    let (result, _) = execute(&cli(&file, &["-m", "4"]), "");
    assert!(matches!(
        result,
        Err(CliError::TooLarge { len: 5, mem_size: 4 })
    ));
}

#[test]
fn assembly_errors_surface() {
    let file = source("OTC\n");
    let (result, _) = execute(&cli(&file, &["--no-extensions"]), "");
    let err = result.unwrap_err();
    assert!(matches!(err, CliError::Asm(_)));
    assert_eq!(
        err.to_string(),
        "line 1: OTC is a non-standard extension and extensions are disabled"
    );
}

#[test]
fn append_hlt_stops_fallthrough() {
    let file = source("OUT\n");
    let (result, out) = execute(&cli(&file, &["--append-hlt", "-m", "1"]), "");
    assert!(matches!(result, Err(CliError::TooLarge { len: 2, .. })));
    assert_eq!(out, "");

    let (result, out) = execute(&cli(&file, &["--append-hlt"]), "");
    result.unwrap();
    assert_eq!(out, "0\n");
}

#[test]
fn machine_faults_surface() {
    let file = source("BRA 10\n");
    let (result, _) = execute(&cli(&file, &["-m", "10"]), "");
    assert!(matches!(
        result,
        Err(CliError::Vm(VmError::FetchOutOfBounds { ip: 10, len: 10 }))
    ));
}

#[test]
fn missing_file_is_reported() {
    let cli = Cli::try_parse_from(["lmc", "/definitely/not/here.lmc"]).unwrap();
    let (result, _) = execute(&cli, "");
    let err = result.unwrap_err();
    assert!(matches!(err, CliError::Read { .. }));
    assert!(err.to_string().starts_with("failed to read /definitely/not/here.lmc"));
}

#[test]
fn no_extensions_refuses_otc_stored_as_data() {
    let file = source("    LDA c\n    BRA d\nd   DAT 1207959574\n    HLT\nc   DAT 65\n");
    let (result, out) = execute(&cli(&file, &["--no-extensions", "--no-prompt"]), "");
    assert!(matches!(
        result,
        Err(CliError::Vm(VmError::ExtensionDisabled { ip: 2 }))
    ));
    assert_eq!(out, "");

    let (result, out) = execute(&cli(&file, &["--no-prompt"]), "");
    result.unwrap();
    assert_eq!(out, "A");
}
