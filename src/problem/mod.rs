//! Problem specifications and their directory loader.
//!
//! A problem is described by four plain-text fields: the statement, worked
//! examples, the interface the solution must implement, and known-good
//! example tests. On disk a problem is a directory holding one file per
//! field. Loading is the only step of a session that is allowed to fail
//! hard: every later fallibility is folded into session state.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ProblemError;

/// Maximum size in bytes for a single problem field.
pub const MAX_FIELD_BYTES: usize = 10 * 1024;

/// File names expected inside a problem directory.
pub const DESCRIPTION_FILE: &str = "DESCRIPTION";
pub const EXAMPLE_FILE: &str = "EXAMPLE";
pub const INTERFACE_FILE: &str = "INTERFACE";
pub const TEST_FILE: &str = "TEST";

/// A programming problem in the four-part form the workflow consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemSpecification {
    /// Natural-language statement of the problem.
    pub problem_description: String,
    /// Worked input/output examples.
    pub example_description: String,
    /// Function or class skeleton the solution must implement.
    pub solution_interface: String,
    /// Known-good example test code (assertions against the interface).
    pub example_test_code: String,
}

impl ProblemSpecification {
    /// Build a specification from in-memory fields, enforcing the same
    /// invariants as the directory loader.
    pub fn new(
        problem_description: impl Into<String>,
        example_description: impl Into<String>,
        solution_interface: impl Into<String>,
        example_test_code: impl Into<String>,
    ) -> Result<Self, ProblemError> {
        let spec = Self {
            problem_description: problem_description.into(),
            example_description: example_description.into(),
            solution_interface: solution_interface.into(),
            example_test_code: example_test_code.into(),
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Load a problem from a directory containing the four field files.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ProblemError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ProblemError::NotADirectory(dir.display().to_string()));
        }

        let spec = Self {
            problem_description: read_field(dir, DESCRIPTION_FILE)?,
            example_description: read_field(dir, EXAMPLE_FILE)?,
            solution_interface: read_field(dir, INTERFACE_FILE)?,
            example_test_code: read_field(dir, TEST_FILE)?,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check the non-empty and size invariants on every field.
    pub fn validate(&self) -> Result<(), ProblemError> {
        let fields = [
            (DESCRIPTION_FILE, &self.problem_description),
            (EXAMPLE_FILE, &self.example_description),
            (INTERFACE_FILE, &self.solution_interface),
            (TEST_FILE, &self.example_test_code),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ProblemError::EmptyField(name.to_string()));
            }
            if value.len() > MAX_FIELD_BYTES {
                return Err(ProblemError::FieldTooLarge {
                    file: name.to_string(),
                    size: value.len(),
                    limit: MAX_FIELD_BYTES,
                });
            }
        }
        Ok(())
    }
}

fn read_field(dir: &Path, file: &str) -> Result<String, ProblemError> {
    let path = dir.join(file);
    if !path.is_file() {
        return Err(ProblemError::MissingFile(path.display().to_string()));
    }
    let size = fs::metadata(&path)?.len() as usize;
    if size > MAX_FIELD_BYTES {
        return Err(ProblemError::FieldTooLarge {
            file: path.display().to_string(),
            size,
            limit: MAX_FIELD_BYTES,
        });
    }
    Ok(fs::read_to_string(&path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_problem_dir(dir: &Path) {
        fs::write(dir.join(DESCRIPTION_FILE), "Find the longest substring without repeating characters.").unwrap();
        fs::write(dir.join(EXAMPLE_FILE), "Input: s = \"abcabcbb\"\nOutput: 3").unwrap();
        fs::write(
            dir.join(INTERFACE_FILE),
            "class Solution:\n    def lengthOfLongestSubstring(self, s: str) -> int:",
        )
        .unwrap();
        fs::write(
            dir.join(TEST_FILE),
            "assert Solution().lengthOfLongestSubstring(\"abcabcbb\") == 3",
        )
        .unwrap();
    }

    #[test]
    fn loads_all_four_fields_from_directory() {
        let tmp = tempfile::tempdir().unwrap();
        write_problem_dir(tmp.path());

        let spec = ProblemSpecification::from_dir(tmp.path()).unwrap();
        assert!(spec.problem_description.contains("longest substring"));
        assert!(spec.example_description.starts_with("Input:"));
        assert!(spec.solution_interface.contains("lengthOfLongestSubstring"));
        assert!(spec.example_test_code.contains("assert"));
    }

    #[test]
    fn rejects_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        write_problem_dir(tmp.path());
        fs::remove_file(tmp.path().join(INTERFACE_FILE)).unwrap();

        let err = ProblemSpecification::from_dir(tmp.path()).unwrap_err();
        assert!(matches!(err, ProblemError::MissingFile(_)));
    }

    #[test]
    fn rejects_oversize_field_before_any_stage_runs() {
        let tmp = tempfile::tempdir().unwrap();
        write_problem_dir(tmp.path());
        fs::write(tmp.path().join(DESCRIPTION_FILE), "x".repeat(MAX_FIELD_BYTES + 1)).unwrap();

        let err = ProblemSpecification::from_dir(tmp.path()).unwrap_err();
        match err {
            ProblemError::FieldTooLarge { size, limit, .. } => {
                assert_eq!(size, MAX_FIELD_BYTES + 1);
                assert_eq!(limit, MAX_FIELD_BYTES);
            }
            other => panic!("expected FieldTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn field_at_exact_limit_is_accepted() {
        let tmp = tempfile::tempdir().unwrap();
        write_problem_dir(tmp.path());
        fs::write(tmp.path().join(DESCRIPTION_FILE), "x".repeat(MAX_FIELD_BYTES)).unwrap();

        assert!(ProblemSpecification::from_dir(tmp.path()).is_ok());
    }

    #[test]
    fn rejects_empty_field() {
        let tmp = tempfile::tempdir().unwrap();
        write_problem_dir(tmp.path());
        fs::write(tmp.path().join(TEST_FILE), "   \n").unwrap();

        let err = ProblemSpecification::from_dir(tmp.path()).unwrap_err();
        assert!(matches!(err, ProblemError::EmptyField(name) if name == TEST_FILE));
    }

    #[test]
    fn rejects_non_directory_path() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("not-a-dir");
        fs::write(&file, "x").unwrap();

        let err = ProblemSpecification::from_dir(&file).unwrap_err();
        assert!(matches!(err, ProblemError::NotADirectory(_)));
    }

    #[test]
    fn in_memory_constructor_enforces_invariants() {
        let err = ProblemSpecification::new("desc", "", "iface", "test").unwrap_err();
        assert!(matches!(err, ProblemError::EmptyField(_)));

        let spec = ProblemSpecification::new("desc", "ex", "iface", "test").unwrap();
        assert_eq!(spec.solution_interface, "iface");
    }
}
