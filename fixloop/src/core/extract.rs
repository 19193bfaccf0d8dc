//! Candidate normalization: pull runnable code out of free-form model text.

use std::sync::LazyLock;

use regex::Regex;

/// A complete fenced region. The optional info string is only consumed when it
/// sits alone on the opening line, so single-line fences keep their content.
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:[A-Za-z0-9_+.\-]*[ \t]*\r?\n)?(.*?)```").expect("fence regex")
});

/// A bare language token on the first line of unfenced text.
static LEADING_LANG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:python3?|py)[ \t]*(?:\r?\n|$)").expect("language regex")
});

/// Extract candidate code from fixer output.
///
/// - One or more fenced regions: the content of the last one, trimmed.
/// - No complete fence: all backticks removed, a leading `python`/`py` line
///   dropped, trimmed.
///
/// Total on every input; never fails.
pub fn extract_code(response: &str) -> String {
    if response.trim().is_empty() {
        return String::new();
    }

    if let Some(last) = FENCE_RE.captures_iter(response).last()
        && let Some(body) = last.get(1)
    {
        return body.as_str().trim().to_string();
    }

    let unticked = response.replace('`', "");
    LEADING_LANG_RE
        .replace(unticked.trim(), "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_last_fenced_block() {
        let text = "first:\n```python\nx = 1\n```\nbetter:\n```python\nx = 2\nprint(x)\n```\ndone";
        assert_eq!(extract_code(text), "x = 2\nprint(x)");
    }

    #[test]
    fn fence_without_language_tag() {
        assert_eq!(extract_code("```\nprint('hi')\n```"), "print('hi')");
    }

    #[test]
    fn single_line_fence_keeps_content() {
        assert_eq!(extract_code("```print(1)```"), "print(1)");
    }

    #[test]
    fn unfenced_text_drops_stray_ticks_and_language_line() {
        let text = "python\n`def f(x):`\n    return x";
        assert_eq!(extract_code(text), "def f(x):\n    return x");
    }

    #[test]
    fn identifier_starting_with_py_is_not_a_language_token() {
        assert_eq!(extract_code("pyramid = 3\nprint(pyramid)"), "pyramid = 3\nprint(pyramid)");
    }

    #[test]
    fn unclosed_fence_is_not_an_error() {
        assert_eq!(extract_code("```python\nprint(1)"), "print(1)");
    }

    #[test]
    fn empty_and_blank_inputs_yield_empty() {
        assert_eq!(extract_code(""), "");
        assert_eq!(extract_code("  \n\t"), "");
        assert_eq!(extract_code("``````"), "");
    }

    #[test]
    fn normalizing_normalized_text_is_a_no_op() {
        let samples = [
            "def f(x):\n    return x\n\nprint(f(2))",
            "import math\nprint(math.sqrt(4))",
            "# Fixed code\nx = 10",
        ];
        for sample in samples {
            let once = extract_code(sample);
            assert_eq!(once, sample.trim());
            assert_eq!(extract_code(&once), once);
        }
    }
}
