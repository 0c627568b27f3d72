//! Identifier and type-tag checks. Every name that reaches SQL text passes through here first.

use crate::error::ConfigError;
use regex::Regex;
use std::sync::OnceLock;

/// Column name reserved for the surrogate key.
pub const ID_COLUMN: &str = "id";

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static identifier pattern"))
}

fn type_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z][A-Za-z0-9_]*( [A-Za-z][A-Za-z0-9_]*)*( ?\(\s*\d+\s*(,\s*\d+\s*)?\))?$")
            .expect("static type tag pattern")
    })
}

pub fn is_identifier(name: &str) -> bool {
    identifier_re().is_match(name)
}

/// Accepts tags such as `TEXT`, `INTEGER`, `DOUBLE PRECISION`, `VARCHAR(255)`, `DECIMAL(10, 2)`.
pub fn is_type_tag(tag: &str) -> bool {
    type_tag_re().is_match(tag)
}

pub fn validate_identifier(kind: &'static str, name: &str) -> Result<(), ConfigError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            kind,
            name: name.to_string(),
        })
    }
}
