//! Pre-submission checks. Pure; the first failing rule wins.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::form::FormState;
use crate::{MAX_PROMPT_COUNT, MIN_PROMPT_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("Application overview is required")]
    MissingOverview,
    #[error("Meta prompt is required")]
    MissingMetaPrompt,
    #[error("At least one category must be selected")]
    NoCategories,
    #[error("Number of prompts must be between 1 and 100")]
    CountOutOfRange,
}

/// Checks in fixed precedence: overview, meta prompt, categories, count.
pub fn validate(form: &FormState) -> Result<(), ValidationError> {
    if form.overview.trim().is_empty() {
        return Err(ValidationError::MissingOverview);
    }
    if form.meta_prompt.trim().is_empty() {
        return Err(ValidationError::MissingMetaPrompt);
    }
    if form.categories.is_empty() {
        return Err(ValidationError::NoCategories);
    }
    if !(MIN_PROMPT_COUNT..=MAX_PROMPT_COUNT).contains(&form.count) {
        return Err(ValidationError::CountOutOfRange);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;

    fn valid_form() -> FormState {
        let mut form = FormState::default();
        form.overview = "A customer support chatbot".into();
        form.meta_prompt = "You are a red-team assistant".into();
        form.categories.toggle(Category::PromptInjection);
        form.count = 5;
        form
    }

    #[test]
    fn accepts_a_complete_form() {
        assert_eq!(validate(&valid_form()), Ok(()));
    }

    #[test]
    fn whitespace_only_overview_is_missing() {
        let mut form = valid_form();
        form.overview = " \n\t ".into();
        assert_eq!(validate(&form), Err(ValidationError::MissingOverview));
    }

    #[test]
    fn whitespace_only_meta_prompt_is_missing() {
        let mut form = valid_form();
        form.meta_prompt = "   ".into();
        assert_eq!(validate(&form), Err(ValidationError::MissingMetaPrompt));
    }

    #[test]
    fn empty_selection_is_rejected() {
        let mut form = valid_form();
        form.categories.remove(Category::PromptInjection);
        assert_eq!(validate(&form), Err(ValidationError::NoCategories));
    }

    #[test]
    fn count_bounds_are_inclusive() {
        for (count, ok) in [(0, false), (1, true), (100, true), (101, false), (-3, false), (150, false)] {
            let mut form = valid_form();
            form.count = count;
            assert_eq!(validate(&form).is_ok(), ok, "count {count}");
        }
    }

    #[test]
    fn first_failing_rule_wins() {
        let form = FormState {
            count: 0,
            ..FormState::default()
        };
        assert_eq!(validate(&form), Err(ValidationError::MissingOverview));

        let mut form = valid_form();
        form.meta_prompt.clear();
        form.categories = Default::default();
        form.count = 500;
        assert_eq!(validate(&form), Err(ValidationError::MissingMetaPrompt));
    }

    #[test]
    fn messages_are_fixed() {
        assert_eq!(
            ValidationError::MissingOverview.to_string(),
            "Application overview is required"
        );
        assert_eq!(
            ValidationError::NoCategories.to_string(),
            "At least one category must be selected"
        );
        assert_eq!(
            ValidationError::CountOutOfRange.to_string(),
            "Number of prompts must be between 1 and 100"
        );
    }
}
