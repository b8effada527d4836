//! Common test utilities and macros

use brilrun::RunConfig;
use std::path::Path;

#[derive(Debug)]
pub enum TestResult {
    /// The program ran to completion and printed exactly this.
    Output(String),
    Error(String),
    ErrorRegex(String),
}

impl PartialEq for TestResult {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TestResult::Output(a), TestResult::Output(b)) => a == b,
            (TestResult::Error(a), TestResult::Error(b)) => a == b,
            (TestResult::ErrorRegex(pattern), TestResult::Error(msg)) => {
                regex::Regex::new(pattern).unwrap().is_match(msg)
            }
            (TestResult::Error(msg), TestResult::ErrorRegex(pattern)) => {
                regex::Regex::new(pattern).unwrap().is_match(msg)
            }
            _ => false,
        }
    }
}

/// Loads `input_file`, runs it with `args` and captures what it printed.
///
/// Errors are rendered with their whole context chain, the way the binary
/// reports them.
pub fn run_interpreter_test(input_file: &Path, args: &[&str], config: &RunConfig) -> TestResult {
    let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
    let mut out: Vec<u8> = Vec::new();
    let result = brilrun::load_file(input_file, None)
        .and_then(|program| brilrun::run(&program, &args, config, &mut out));
    match result {
        Ok(_) => TestResult::Output(String::from_utf8(out).unwrap()),
        Err(e) => TestResult::Error(format!("{e:#}")),
    }
}

#[macro_export]
macro_rules! check_interpreter {
    ($test_name:ident, input=$input_file:expr, result=$expected:expr) => {
        check_interpreter!($test_name, input = $input_file, args = [], result = $expected);
    };
    ($test_name:ident, input=$input_file:expr, args=[$($arg:expr),* $(,)?], result=$expected:expr) => {
        check_interpreter!(
            $test_name,
            input = $input_file,
            args = [$($arg),*],
            config = brilrun::RunConfig::default(),
            result = $expected
        );
    };
    ($test_name:ident, input=$input_file:expr, args=[$($arg:expr),* $(,)?], config=$config:expr, result=$expected:expr) => {
        #[test]
        fn $test_name() {
            let input_path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
                .join("tests")
                .join("inputs")
                .join($input_file);

            let args: &[&str] = &[$($arg),*];
            let result = crate::common::run_interpreter_test(&input_path, args, &$config);
            assert_eq!(result, $expected);
        }
    };
}
