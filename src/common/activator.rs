use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SUPER = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
        const SHIFT = 1 << 3;
    }
}

const MODIFIER_NAMES: [(Modifiers, &str); 4] = [
    (Modifiers::SUPER, "super"),
    (Modifiers::CTRL, "ctrl"),
    (Modifiers::ALT, "alt"),
    (Modifiers::SHIFT, "shift"),
];

impl Modifiers {
    fn from_binding_name(name: &str) -> Option<Modifiers> {
        match name.to_ascii_lowercase().as_str() {
            "super" | "logo" | "win" => Some(Modifiers::SUPER),
            "ctrl" | "control" => Some(Modifiers::CTRL),
            "alt" => Some(Modifiers::ALT),
            "shift" => Some(Modifiers::SHIFT),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivatorParseError {
    #[error("unknown modifier <{0}>")]
    UnknownModifier(String),
    #[error("modifier is missing its closing '>'")]
    UnterminatedModifier,
    #[error("binding has no key")]
    MissingKey,
    #[error("invalid key name {0:?}")]
    InvalidKey(String),
}

/// A key combination such as `<super> KEY_W`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Activator {
    modifiers: Modifiers,
    key: String,
}

impl Activator {
    pub fn new(modifiers: Modifiers, key: impl Into<String>) -> Self {
        Self { modifiers, key: key.into().to_ascii_uppercase() }
    }

    pub fn modifiers(&self) -> Modifiers { self.modifiers }

    pub fn key(&self) -> &str { &self.key }

    pub fn matches(&self, modifiers: Modifiers, key: &str) -> bool {
        self.modifiers == modifiers && self.key.eq_ignore_ascii_case(key)
    }
}

impl Default for Activator {
    fn default() -> Self { Activator::new(Modifiers::SUPER, "KEY_W") }
}

impl FromStr for Activator {
    type Err = ActivatorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut modifiers = Modifiers::empty();
        let mut rest = s.trim_start();
        while let Some(tail) = rest.strip_prefix('<') {
            let end = tail.find('>').ok_or(ActivatorParseError::UnterminatedModifier)?;
            let name = tail[..end].trim();
            modifiers |= Modifiers::from_binding_name(name)
                .ok_or_else(|| ActivatorParseError::UnknownModifier(name.to_string()))?;
            rest = tail[end + 1..].trim_start();
        }

        let key = rest.trim_end();
        if key.is_empty() {
            return Err(ActivatorParseError::MissingKey);
        }
        if key.chars().any(|c| c.is_whitespace() || c == '<' || c == '>') {
            return Err(ActivatorParseError::InvalidKey(key.to_string()));
        }
        Ok(Activator::new(modifiers, key))
    }
}

impl TryFrom<String> for Activator {
    type Error = ActivatorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

impl From<Activator> for String {
    fn from(value: Activator) -> Self { value.to_string() }
}

impl fmt::Display for Activator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in MODIFIER_NAMES {
            if self.modifiers.contains(flag) {
                write!(f, "<{name}> ")?;
            }
        }
        f.write_str(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    #[test]
    fn parses_default_binding() {
        let activator: Activator = "<super>KEY_W".parse().unwrap();
        assert_eq!(activator, Activator::default());
        assert!(activator.matches(Modifiers::SUPER, "key_w"));
        assert!(!activator.matches(Modifiers::SUPER | Modifiers::SHIFT, "KEY_W"));
    }

    #[test]
    fn parses_spaced_modifiers_in_any_case() {
        let activator: Activator = " <Ctrl> <alt>  KEY_TAB ".parse().unwrap();
        assert_eq!(activator.modifiers(), Modifiers::CTRL | Modifiers::ALT);
        assert_eq!(activator.key(), "KEY_TAB");
        assert_eq!(activator.to_string(), "<ctrl> <alt> KEY_TAB");
    }

    #[test]
    fn rejects_malformed_bindings() {
        assert_eq!(
            "<hyper>KEY_W".parse::<Activator>(),
            Err(ActivatorParseError::UnknownModifier("hyper".into()))
        );
        assert_eq!("<super".parse::<Activator>(), Err(ActivatorParseError::UnterminatedModifier));
        assert_eq!("<super>".parse::<Activator>(), Err(ActivatorParseError::MissingKey));
        assert_eq!(
            "<super>KEY W".parse::<Activator>(),
            Err(ActivatorParseError::InvalidKey("KEY W".into()))
        );
    }
}
