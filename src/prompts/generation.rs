//! Prompt builders for solution and test synthesis.
//!
//! Both generation roles share the same output protocol: the model may
//! think out loud, but the code it emits must sit between literal marker
//! lines so the extractor can pull it out mechanically. Regeneration
//! prompts are single user messages appended to the running conversation.

use crate::problem::ProblemSpecification;
use crate::session::ExecutionResult;

/// A system/user prompt pair for one generation call.
///
/// Contains both the system prompt (defining the role and output protocol)
/// and the user prompt (the problem material).
#[derive(Debug, Clone)]
pub struct GenerationPrompt {
    /// System prompt establishing the role and output protocol.
    pub system: String,
    /// User prompt with the problem to work on.
    pub user: String,
}

impl GenerationPrompt {
    /// Creates a new generation prompt with the given system and user messages.
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// System prompt for solution synthesis.
const SOLUTION_SYSTEM_PROMPT: &str = r#"You are an excellent Python programmer who solves coding-competition problems.

You will be given a problem description, input/output examples, and the interface of the function to implement. Your job is to complete the implementation of the interface so that it solves the problem. Implement the interface and only the interface. Avoid writing code that tests your implementation.

The output protocol:
You may write out your thoughts, but you must enclose your code between "===code-start===" and "===code-end===" lines so the code can be extracted mechanically. An illustration:

<your thoughts>

===code-start===
# the Python code of your solution goes here
===code-end===

<your conclusion, if any>"#;

/// System prompt for test synthesis.
const TEST_SYSTEM_PROMPT: &str = r#"You are an excellent QA engineer who creates testing examples for Python coding problems.

You will be given a problem description, input/output examples, and the interface of the function a student is attempting. Your job is to write a code snippet that exercises the student's function with additional inputs. The snippet must use `assert` to check whether each case passes. Output only testing code; do not implement the solution yourself.

The output protocol:
You may write out your thoughts, but you must enclose your testing code between "===test-start===" and "===test-end===" lines so the code can be extracted mechanically. An illustration:

<your thoughts>

===test-start===
# the Python code that tests the student's code goes here
===test-end===

<your conclusion, if any>"#;

/// Shared problem block embedded in both generation user prompts.
const PROBLEM_BLOCK_TEMPLATE: &str = r#"Problem description:
```
{problem_description}
```

Input/output examples:
```
{example_description}
```

The interface to implement:
```
{solution_interface}
```"#;

const SOLUTION_USER_TEMPLATE: &str = r#"Generate Python code to solve the following problem.

{problem_block}"#;

const TEST_USER_TEMPLATE: &str = r#"Generate Python code for testing purposes.

{problem_block}"#;

/// Feedback message for regenerating after a failing run.
const REGENERATE_AFTER_FAILURE_TEMPLATE: &str = r#"The code you generated had errors and cannot pass QA.
The following is the code you generated together with the QA test:

{code}


And the error was:

{error}

{human_comment}

Learn from the errors and regenerate the solution using the same output protocol."#;

/// Feedback message for regenerating from a human comment alone.
const REGENERATE_FROM_FEEDBACK_TEMPLATE: &str = r#"Regenerate the solution using the same output protocol.

{human_comment}"#;

fn problem_block(problem: &ProblemSpecification) -> String {
    PROBLEM_BLOCK_TEMPLATE
        .replace("{problem_description}", &problem.problem_description)
        .replace("{example_description}", &problem.example_description)
        .replace("{solution_interface}", &problem.solution_interface)
}

/// Builds the prompt pair for a first solution generation.
pub fn build_solution_generation_prompt(problem: &ProblemSpecification) -> GenerationPrompt {
    GenerationPrompt::new(
        SOLUTION_SYSTEM_PROMPT,
        SOLUTION_USER_TEMPLATE.replace("{problem_block}", &problem_block(problem)),
    )
}

/// Builds the prompt pair for test synthesis.
pub fn build_test_generation_prompt(problem: &ProblemSpecification) -> GenerationPrompt {
    GenerationPrompt::new(
        TEST_SYSTEM_PROMPT,
        TEST_USER_TEMPLATE.replace("{problem_block}", &problem_block(problem)),
    )
}

/// Builds the feedback message for regenerating a solution after a failing
/// run, embedding the combined payload that failed, its error output, and
/// any human comment.
pub fn build_regeneration_after_failure_prompt(
    failure: &ExecutionResult,
    human_comment: Option<&str>,
) -> String {
    REGENERATE_AFTER_FAILURE_TEMPLATE
        .replace("{code}", &failure.code)
        .replace("{error}", &failure.stderr)
        .replace("{human_comment}", human_comment.unwrap_or(""))
}

/// Builds the feedback message for regenerating a solution from a human
/// comment when the last run did not fail.
pub fn build_regeneration_from_feedback_prompt(human_comment: Option<&str>) -> String {
    REGENERATE_FROM_FEEDBACK_TEMPLATE.replace("{human_comment}", human_comment.unwrap_or(""))
}
