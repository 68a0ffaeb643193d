//! Question catalog - the fixed, ordered questionnaire

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::core::config;
use crate::core::{AppError, AppResult};

/// One question with its fixed set of choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Stable identifier, used as the key in the stored answers
    pub key: String,
    /// Text shown to the user
    pub prompt: String,
    /// Selectable choices, in display order
    pub options: Vec<String>,
}

impl Question {
    pub fn new(key: &str, prompt: &str, options: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            prompt: prompt.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }
}

/// Ordered, validated, immutable list of questions.
///
/// The order defines the flow; changing it is a deployment-time change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

impl QuestionCatalog {
    /// Builds a catalog, rejecting empty catalogs, empty or duplicate keys,
    /// empty prompts and questions without options.
    ///
    /// Every option becomes an inline button, so it must be non-empty and fit
    /// in the callback data after the answer prefix
    /// ([`config::onboarding::max_option_bytes`]).
    pub fn new(questions: Vec<Question>) -> AppResult<Self> {
        if questions.is_empty() {
            return Err(AppError::Validation("question catalog is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for question in &questions {
            if question.key.trim().is_empty() {
                return Err(AppError::Validation("question key must not be empty".to_string()));
            }
            if !seen.insert(question.key.as_str()) {
                return Err(AppError::Validation(format!("duplicate question key: {}", question.key)));
            }
            if question.prompt.trim().is_empty() {
                return Err(AppError::Validation(format!("question '{}' has an empty prompt", question.key)));
            }
            if question.options.is_empty() {
                return Err(AppError::Validation(format!("question '{}' has no options", question.key)));
            }
            for option in &question.options {
                validate_option(&question.key, option)?;
            }
        }

        Ok(Self { questions })
    }

    /// Loads a catalog from a JSON array of `{key, prompt, options}` objects.
    pub fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let raw = fs_err::read_to_string(path.as_ref())?;
        let questions: Vec<Question> = serde_json::from_str(&raw)?;
        Self::new(questions)
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a constructed catalog; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(|q| q.key.as_str())
    }
}

fn validate_option(key: &str, option: &str) -> AppResult<()> {
    if option.trim().is_empty() {
        return Err(AppError::Validation(format!("question '{key}' has an empty option")));
    }
    let max = config::onboarding::max_option_bytes();
    if option.len() > max {
        return Err(AppError::Validation(format!(
            "option '{option}' of question '{key}' is {} bytes, at most {max} fit in a button",
            option.len()
        )));
    }
    Ok(())
}

impl Default for QuestionCatalog {
    /// The Velto questionnaire.
    fn default() -> Self {
        Self {
            questions: vec![
                Question::new(
                    "experience",
                    "What is your experience level?",
                    &["Beginner", "Intermediate", "Advanced"],
                ),
                Question::new(
                    "interest",
                    "What are you most interested in?",
                    &["Trading", "Investing", "Learning"],
                ),
                Question::new(
                    "time",
                    "How much time can you dedicate weekly?",
                    &["< 5 hrs", "5–10 hrs", "10+ hrs"],
                ),
                Question::new("rules", "Do you agree to follow the group rules?", &["Yes", "No"]),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = QuestionCatalog::default();
        let rebuilt = QuestionCatalog::new(catalog.iter().cloned().collect()).unwrap();

        assert_eq!(rebuilt, catalog);
        assert_eq!(
            catalog.keys().collect::<Vec<_>>(),
            vec!["experience", "interest", "time", "rules"]
        );
    }

    #[test]
    fn test_rejects_duplicate_keys() {
        let err = QuestionCatalog::new(vec![
            Question::new("rules", "A?", &["Yes"]),
            Question::new("rules", "B?", &["No"]),
        ])
        .unwrap_err();

        assert!(err.to_string().contains("duplicate question key: rules"));
    }

    #[test]
    fn test_rejects_empty_catalog_and_options() {
        assert!(QuestionCatalog::new(Vec::new()).is_err());
        assert!(QuestionCatalog::new(vec![Question::new("rules", "A?", &[])]).is_err());
        assert!(QuestionCatalog::new(vec![Question::new(" ", "A?", &["Yes"])]).is_err());
    }

    #[test]
    fn test_rejects_empty_prompt() {
        let err = QuestionCatalog::new(vec![Question::new("rules", "  ", &["Yes"])]).unwrap_err();
        assert!(err.to_string().contains("empty prompt"));
    }

    #[test]
    fn test_rejects_empty_option() {
        for blank in ["", "   "] {
            let err = QuestionCatalog::new(vec![Question::new("rules", "Agree?", &["Yes", blank])]).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
            assert!(err.to_string().contains("empty option"));
        }
    }

    #[test]
    fn test_option_must_fit_callback_data() {
        // 60 bytes of option + "ans:" is exactly the 64-byte limit
        let longest = "x".repeat(60);
        assert!(QuestionCatalog::new(vec![Question::new("q", "Pick", &[longest.as_str()])]).is_ok());

        let too_long = "I agree to the group rules and the code of conduct, including moderation";
        let err = QuestionCatalog::new(vec![Question::new("rules", "Agree?", &["Yes", too_long])]).unwrap_err();
        assert!(err.to_string().contains("at most 60"));

        // Measured in bytes: 21 en dashes are 63 bytes
        let dashes = "–".repeat(21);
        assert!(QuestionCatalog::new(vec![Question::new("q", "Pick", &[dashes.as_str()])]).is_err());
    }

    #[test]
    fn test_from_json_file_validates_options() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"key":"rules","prompt":"Rules?","options":["Yes",""]}}]"#).unwrap();

        let err = QuestionCatalog::from_json_file(file.path()).unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"key":"lang","prompt":"Language?","options":["Rust","Go"]}},
                {{"key":"rules","prompt":"Rules?","options":["Yes","No"]}}]"#
        )
        .unwrap();

        let catalog = QuestionCatalog::from_json_file(file.path()).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().options, vec!["Rust", "Go"]);
        assert_eq!(catalog.get(2), None);
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = QuestionCatalog::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
