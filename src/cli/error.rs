// Error handling utilities for consistent error messages and exit codes

use std::process;
use crate::models::{DealType, TaskPriority, TaskStatus};

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing resources, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Parse a taxonomy argument (`rental` or `builder`)
pub fn parse_deal_type(value: &str) -> Result<DealType, String> {
    DealType::from_str(&value.to_lowercase())
        .ok_or_else(|| format!("Invalid deal type: '{}'. Use 'rental' or 'builder'.", value))
}

/// Parse a task status argument, accepting `-` as well as `_` separators
pub fn parse_task_status(value: &str) -> Result<TaskStatus, String> {
    let normalized = value.to_lowercase().replace('-', "_");
    TaskStatus::from_str(&normalized).ok_or_else(|| {
        let valid: Vec<&str> = TaskStatus::ALL.iter().map(|s| s.as_str()).collect();
        format!("Invalid task status: '{}'. Valid statuses: {}.", value, valid.join(", "))
    })
}

pub fn parse_priority(value: &str) -> Result<TaskPriority, String> {
    TaskPriority::from_str(&value.to_lowercase())
        .ok_or_else(|| format!("Invalid priority: '{}'. Use low, medium, high or urgent.", value))
}
