use regex::{Regex, RegexBuilder};

use crate::error::{Error, Result};

/// Account-name filter compiled from a query string.
#[derive(Debug, Clone)]
pub struct AccountFilter {
    pattern: Option<Regex>,
}

impl AccountFilter {
    pub fn compile(filter: &str) -> Result<Self> {
        let filter = filter.trim();
        if filter.is_empty() {
            return Ok(Self { pattern: None });
        }
        let pattern = RegexBuilder::new(filter)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::Filter {
                filter: filter.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn matches(&self, account: &str) -> bool {
        self.pattern
            .as_ref()
            .map_or(true, |pattern| pattern.is_match(account))
    }
}
