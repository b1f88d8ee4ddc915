use std::fmt;

/// Identity of a contract member as seen by interceptors and conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodInfo {
    contract: &'static str,
    name: &'static str,
    parameters: &'static [&'static str],
}

impl MethodInfo {
    pub const fn new(
        contract: &'static str,
        name: &'static str,
        parameters: &'static [&'static str],
    ) -> Self {
        Self {
            contract,
            name,
            parameters,
        }
    }

    pub fn contract(&self) -> &'static str {
        self.contract
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parameters(&self) -> &'static [&'static str] {
        self.parameters
    }
}

impl fmt::Display for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.contract, self.name)
    }
}
