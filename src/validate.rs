use crate::domain::{is_valid_hex, Category};
use crate::error::ValidationError;

pub const TASK_NAME_MIN: usize = 2;
pub const TASK_NAME_MAX: usize = 50;
pub const DESCRIPTION_MAX: usize = 500;

/// Validate task form fields; returns the trimmed name
pub fn task_fields<'a>(name: &'a str, category: &str, description: &str) -> Result<&'a str, ValidationError> {
    let name = task_name(name)?;
    if category.trim().is_empty() {
        return Err(ValidationError::MissingCategory);
    }
    self::description(description)?;
    Ok(name)
}

pub fn description(description: &str) -> Result<(), ValidationError> {
    if description.chars().count() > DESCRIPTION_MAX {
        return Err(ValidationError::DescriptionTooLong { max: DESCRIPTION_MAX });
    }
    Ok(())
}

/// Validate a task name; returns it trimmed
pub fn task_name(name: &str) -> Result<&str, ValidationError> {
    let name = name.trim();
    let len = name.chars().count();
    if len < TASK_NAME_MIN {
        return Err(ValidationError::TaskNameTooShort { min: TASK_NAME_MIN });
    }
    if len > TASK_NAME_MAX {
        return Err(ValidationError::TaskNameTooLong { max: TASK_NAME_MAX });
    }
    Ok(name)
}

/// Validate a new category against the existing ones; returns the trimmed name
pub fn new_category<'a>(name: &'a str, color: &str, existing: &[Category]) -> Result<&'a str, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyCategoryName);
    }
    if existing.iter().any(|c| c.matches(name)) {
        return Err(ValidationError::DuplicateCategory(name.to_string()));
    }
    if !is_valid_hex(color) {
        return Err(ValidationError::InvalidColor(color.to_string()));
    }
    Ok(name)
}
