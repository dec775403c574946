// View filtering for tasks

use crate::task::Task;
use eyre::{Result, eyre};
use std::str::FromStr;

/// Which tasks the filtered view shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterType {
    #[default]
    All,
    Completed,
    Pending,
}

impl FilterType {
    /// Whether a task is visible under this filter
    pub fn matches(self, task: &Task) -> bool {
        match self {
            FilterType::All => true,
            FilterType::Completed => task.completed,
            FilterType::Pending => !task.completed,
        }
    }
}

impl std::fmt::Display for FilterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterType::All => write!(f, "all"),
            FilterType::Completed => write!(f, "completed"),
            FilterType::Pending => write!(f, "pending"),
        }
    }
}

impl FromStr for FilterType {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(FilterType::All),
            "completed" | "done" => Ok(FilterType::Completed),
            "pending" | "active" => Ok(FilterType::Pending),
            other => Err(eyre!("Unknown filter: {} (expected all, completed or pending)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(completed: bool) -> Task {
        let mut task = Task::new("t").unwrap();
        task.completed = completed;
        task
    }

    #[test]
    fn test_filter_matches() {
        let done = task(true);
        let open = task(false);

        assert!(FilterType::All.matches(&done));
        assert!(FilterType::All.matches(&open));
        assert!(FilterType::Completed.matches(&done));
        assert!(!FilterType::Completed.matches(&open));
        assert!(FilterType::Pending.matches(&open));
        assert!(!FilterType::Pending.matches(&done));
    }

    #[test]
    fn test_filter_default_is_all() {
        assert_eq!(FilterType::default(), FilterType::All);
    }

    #[test]
    fn test_filter_from_str() {
        assert_eq!("all".parse::<FilterType>().unwrap(), FilterType::All);
        assert_eq!("Completed".parse::<FilterType>().unwrap(), FilterType::Completed);
        assert_eq!("pending".parse::<FilterType>().unwrap(), FilterType::Pending);
        assert!("archived".parse::<FilterType>().is_err());
    }

    #[test]
    fn test_filter_display() {
        assert_eq!(FilterType::All.to_string(), "all");
        assert_eq!(FilterType::Pending.to_string(), "pending");
    }
}
