//! Parser configuration

/// Decides which keys open a block scalar even without a `|` or `>` marker
///
/// Specification documents are full of free-text `description` fields whose
/// authors wrap long lines without a block indicator. Listing a key here makes
/// every indented line beneath it part of one folded string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockScalarPolicy {
    implicit_keys: Vec<String>,
}

impl Default for BlockScalarPolicy {
    fn default() -> Self {
        Self {
            implicit_keys: vec!["description".to_string()],
        }
    }
}

impl BlockScalarPolicy {
    /// Only explicit block indicators open a block scalar
    pub fn explicit_only() -> Self {
        Self {
            implicit_keys: Vec::new(),
        }
    }

    /// Add a key that always opens a block scalar
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if !self.implicit_keys.contains(&key) {
            self.implicit_keys.push(key);
        }
        self
    }

    /// Whether `key` opens a block scalar under this policy
    pub fn is_implicit(&self, key: &str) -> bool {
        self.implicit_keys.iter().any(|k| k == key)
    }

    pub fn implicit_keys(&self) -> &[String] {
        &self.implicit_keys
    }
}

/// Options for the structural parser
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Block scalar policy
    pub block_scalars: BlockScalarPolicy,

    /// Fail on the first structural recovery instead of reporting it
    pub strict: bool,
}

impl ParseOptions {
    /// Replace the block scalar policy
    pub fn with_block_scalars(mut self, policy: BlockScalarPolicy) -> Self {
        self.block_scalars = policy;
        self
    }

    /// Turn structural recoveries into errors
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_treats_description_as_block() {
        let policy = BlockScalarPolicy::default();
        assert!(policy.is_implicit("description"));
        assert!(!policy.is_implicit("summary"));
    }

    #[test]
    fn test_policy_builder() {
        let policy = BlockScalarPolicy::explicit_only()
            .with_key("summary")
            .with_key("summary");
        assert_eq!(policy.implicit_keys(), &["summary".to_string()]);
        assert!(!policy.is_implicit("description"));
    }
}
