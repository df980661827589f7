//! Prompt builders for AI-test validation.
//!
//! The validator reviews model-written tests before they gate the
//! solution. It has two modes: a plain review of fresh tests, and a review
//! in the context of a failing run of the AI suite, where the question is
//! whether the tests themselves are at fault. Both modes end with a fixed
//! verdict line the caller parses.

use crate::problem::ProblemSpecification;
use crate::session::ExecutionResult;

/// Review prompt for freshly generated test code.
const TEST_VALIDATION_TEMPLATE: &str = r#"Given a coding problem:
```
{problem_description}
```

Your mission is to validate this testing code from QA. Check whether this code is reasonable or not:
```
{test_code}
```

You can output your reasoning and thoughts concisely. Output the result in the last line in this fixed format:
* `Validation result: yes` , if it's reasonable.
* `Validation result: no` , if it's not reasonable."#;

/// Review prompt for test code whose run against the candidate failed.
const TEST_VALIDATION_WITH_FAILURE_TEMPLATE: &str = r#"Given a coding problem:
```
{problem_description}
```

Someone wrote a solution, but an error occurred when QA made a test. This is the combined code:
```
{code}
```

And the error was:
```
{error}
```

Your mission is to validate the QA testing block inside it. Check whether the QA code itself is reasonable or not.

You can output your reasoning and thoughts concisely. Output the result in the last line in this fixed format:
* `Validation result: yes` , if it's reasonable.
* `Validation result: no` , if it's not reasonable."#;

/// Builds the plain review prompt for freshly generated tests.
pub fn build_test_validation_prompt(problem: &ProblemSpecification, test_code: &str) -> String {
    TEST_VALIDATION_TEMPLATE
        .replace("{problem_description}", &problem.problem_description)
        .replace("{test_code}", test_code)
}

/// Builds the review prompt used after the AI suite failed against the
/// candidate, embedding the failing combined payload and its error output.
pub fn build_test_validation_with_failure_prompt(
    problem: &ProblemSpecification,
    failure: &ExecutionResult,
) -> String {
    TEST_VALIDATION_WITH_FAILURE_TEMPLATE
        .replace("{problem_description}", &problem.problem_description)
        .replace("{code}", &failure.code)
        .replace("{error}", &failure.stderr)
}
