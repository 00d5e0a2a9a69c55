//! Rendering of results and errors for the terminal

use natpl_core::lexer::LineIndex;
use natpl_core::runtime::ProgramError;
use natpl_core::EvalResult;

/// Text echoed for a line in interactive use: values and print lines
pub fn format_result(result: &EvalResult) -> Option<String> {
    match result {
        EvalResult::Empty => None,
        EvalResult::Value(value) => Some(value.to_string()),
        EvalResult::PrintValue(expr, value) => Some(format!("{expr} = {value}")),
    }
}

/// Text for a `print` line, the only output of a program run
pub fn format_print(result: &EvalResult) -> Option<String> {
    match result {
        EvalResult::PrintValue(..) => format_result(result),
        _ => None,
    }
}

/// Describe a failed program with `line:column` locations, prefixed by the
/// origin (a file name) when there is one
pub fn describe_error(source: &str, origin: Option<&str>, error: &ProgramError) -> String {
    let index = LineIndex::new(source);
    let prefix = origin.map(|o| format!("{o}:")).unwrap_or_default();

    match error {
        ProgramError::Parse(errors) => errors
            .iter()
            .map(|e| {
                let location = index.location(e.span.start);
                format!("{prefix}{location}: parse error: {e}")
            })
            .collect::<Vec<_>>()
            .join("\n"),
        ProgramError::Runtime { line, error } => {
            let span = error.span();
            if span.is_dummy() {
                format!("{prefix}{line}: {error}")
            } else {
                let location = index.location(span.start);
                format!("{prefix}{location}: {error}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use natpl_core::Runtime;

    fn run(source: &str) -> Result<Vec<EvalResult>, ProgramError> {
        Runtime::new().eval_source(source)
    }

    #[test]
    fn results_are_formatted() {
        let results = run("unit m\nx = 2 m\nprint x * 3").unwrap();
        let echoed: Vec<_> = results.iter().filter_map(format_result).collect();
        assert_eq!(echoed, vec!["2 m", "x * 3 = 6 m"]);

        let printed: Vec<_> = results.iter().filter_map(format_print).collect();
        assert_eq!(printed, vec!["x * 3 = 6 m"]);
    }

    #[test]
    fn runtime_error_location() {
        let source = "unit m\nx = 1 m\ny = x + bar";
        let err = run(source).unwrap_err();
        assert_eq!(
            describe_error(source, Some("calc.natpl"), &err),
            "calc.natpl:3:9: undefined name: bar"
        );
    }

    #[test]
    fn parse_error_locations() {
        let source = "1 +\n2 *";
        let err = run(source).unwrap_err();
        let message = describe_error(source, None, &err);
        let lines: Vec<_> = message.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1:4: parse error:"), "{message}");
        assert!(lines[1].starts_with("2:4: parse error:"), "{message}");
    }
}
