use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Separator between account name segments (`Assets:Bank:Checking`).
pub const ACCOUNT_SEPARATOR: char = ':';

/// Index of an account inside the [`AccountTree`] that minted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(usize);

impl AccountId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One node of the account hierarchy.
///
/// The parent link is a lookup-only index into the owning tree.
#[derive(Debug, Clone)]
pub struct Account {
    name: String,
    fullname: String,
    depth: usize,
    parent: Option<AccountId>,
}

impl Account {
    /// Last segment of the full name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fullname(&self) -> &str {
        &self.fullname
    }

    /// Distance from the root; the root is 0 and top-level accounts are 1.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<AccountId> {
        self.parent
    }
}

/// Arena of accounts keyed by full name, rooted at an unnamed master account.
#[derive(Debug, Clone)]
pub struct AccountTree {
    accounts: Vec<Account>,
    by_name: HashMap<String, AccountId>,
}

impl Default for AccountTree {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountTree {
    pub const ROOT: AccountId = AccountId(0);

    pub fn new() -> Self {
        let root = Account {
            name: String::new(),
            fullname: String::new(),
            depth: 0,
            parent: None,
        };
        let mut by_name = HashMap::new();
        by_name.insert(String::new(), Self::ROOT);
        Self {
            accounts: vec![root],
            by_name,
        }
    }

    /// Returns the id for `fullname`, creating it and any missing ancestors.
    pub fn insert(&mut self, fullname: &str) -> Result<AccountId> {
        validate_name(fullname)?;
        if let Some(id) = self.by_name.get(fullname) {
            return Ok(*id);
        }

        let mut parent = Self::ROOT;
        let mut path = String::with_capacity(fullname.len());
        for segment in fullname.split(ACCOUNT_SEPARATOR) {
            if !path.is_empty() {
                path.push(ACCOUNT_SEPARATOR);
            }
            path.push_str(segment);

            parent = match self.by_name.get(&path) {
                Some(id) => *id,
                None => {
                    let id = AccountId(self.accounts.len());
                    let depth = self.accounts[parent.0].depth + 1;
                    self.accounts.push(Account {
                        name: segment.to_string(),
                        fullname: path.clone(),
                        depth,
                        parent: Some(parent),
                    });
                    self.by_name.insert(path.clone(), id);
                    id
                }
            };
        }
        Ok(parent)
    }

    pub fn find(&self, fullname: &str) -> Option<AccountId> {
        self.by_name.get(fullname).copied()
    }

    /// # Panics
    /// If `id` was not minted by this tree.
    pub fn account(&self, id: AccountId) -> &Account {
        &self.accounts[id.0]
    }

    pub fn contains(&self, fullname: &str) -> bool {
        self.by_name.contains_key(fullname)
    }

    /// Number of accounts, including the root.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.len() == 1
    }

    /// Accounts in creation order; parents always precede their children.
    pub fn iter(&self) -> impl Iterator<Item = (AccountId, &Account)> {
        self.accounts
            .iter()
            .enumerate()
            .map(|(i, account)| (AccountId(i), account))
    }

    /// `id` followed by each ancestor up to and including the root.
    pub fn path_to_root(&self, id: AccountId) -> Result<Vec<AccountId>> {
        let mut path = Vec::with_capacity(self.account(id).depth + 1);
        let mut current = Some(id);
        while let Some(next) = current {
            if path.len() >= self.accounts.len() {
                return Err(Error::ParentCycle {
                    name: self.account(id).fullname.clone(),
                });
            }
            path.push(next);
            current = self.account(next).parent;
        }
        Ok(path)
    }

    /// Nearest ancestor-or-self whose depth is `<= depth`.
    pub fn ancestor_at_depth(&self, id: AccountId, depth: usize) -> AccountId {
        let mut current = id;
        while self.account(current).depth > depth {
            match self.account(current).parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    #[cfg(test)]
    pub(crate) fn set_parent_unchecked(&mut self, id: AccountId, parent: AccountId) {
        self.accounts[id.0].parent = Some(parent);
    }
}

fn validate_name(fullname: &str) -> Result<()> {
    if fullname.is_empty() || fullname.split(ACCOUNT_SEPARATOR).any(|s| s.trim().is_empty()) {
        return Err(Error::InvalidAccountName {
            name: fullname.to_string(),
        });
    }
    Ok(())
}
