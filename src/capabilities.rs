//! NNTP capabilities as advertised by an upstream (RFC 3977 Section 5.2)
//!
//! Each line is `NAME [arg ...]`. Lines are kept in the order the server sent
//! them, upper-cased, so arguments compare case-insensitively.

/// Ordered capability lines of one connection
#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    lines: Vec<String>,
}

impl Capabilities {
    /// Build from the lines of a 101 reply
    pub fn parse(lines: &[String]) -> Self {
        Self {
            lines: lines
                .iter()
                .map(|l| l.trim().to_uppercase())
                .filter(|l| !l.is_empty())
                .collect(),
        }
    }

    /// All capability lines, in server order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Complete line for a capability, looked up by its first token
    #[must_use]
    pub fn get(&self, capability: &str) -> Option<&str> {
        let capability = capability.to_uppercase();
        self.lines
            .iter()
            .find(|line| line.split_whitespace().next() == Some(capability.as_str()))
            .map(String::as_str)
    }

    /// Check if a capability is advertised
    #[must_use]
    pub fn has(&self, capability: &str) -> bool {
        self.get(capability).is_some()
    }

    /// Whether `capability` is advertised with `argument`
    ///
    /// `None` when the capability itself is absent.
    #[must_use]
    pub fn has_arg(&self, capability: &str, argument: &str) -> Option<bool> {
        let line = self.get(capability)?;
        Some(
            line.split_whitespace()
                .skip(1)
                .any(|arg| arg.eq_ignore_ascii_case(argument)),
        )
    }
}
