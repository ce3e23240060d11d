//! Property naming strategies.
//!
//! Translate an internal property name into the name used on the wire.

use super::PropertyMetadata;

/// Translates a property into its serialized name
pub trait NamingStrategy: Send + Sync {
    fn translate_name(&self, property: &PropertyMetadata) -> String;
}

/// Keeps the internal name unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdenticalNaming;

impl NamingStrategy for IdenticalNaming {
    fn translate_name(&self, property: &PropertyMetadata) -> String {
        property.name.clone()
    }
}

/// Converts `camelCase` names into separated words (`camel_case` by default)
#[derive(Debug, Clone)]
pub struct CamelCaseNaming {
    separator: String,
    lowercase: bool,
}

impl CamelCaseNaming {
    pub fn new(separator: impl Into<String>, lowercase: bool) -> Self {
        Self {
            separator: separator.into(),
            lowercase,
        }
    }
}

impl Default for CamelCaseNaming {
    fn default() -> Self {
        Self::new("_", true)
    }
}

impl NamingStrategy for CamelCaseNaming {
    fn translate_name(&self, property: &PropertyMetadata) -> String {
        let mut translated = String::with_capacity(property.name.len() + 4);
        let mut previous_lower = false;
        for ch in property.name.chars() {
            if ch.is_uppercase() && previous_lower {
                translated.push_str(&self.separator);
            }
            previous_lower = ch.is_lowercase() || ch.is_ascii_digit();
            translated.push(ch);
        }
        if self.lowercase {
            translated.to_lowercase()
        } else {
            translated
        }
    }
}

/// Honours an explicit serialized name, delegating to another strategy otherwise
#[derive(Debug, Clone, Default)]
pub struct SerializedNameNaming<N> {
    delegate: N,
}

impl<N: NamingStrategy> SerializedNameNaming<N> {
    pub fn new(delegate: N) -> Self {
        Self { delegate }
    }
}

impl<N: NamingStrategy> NamingStrategy for SerializedNameNaming<N> {
    fn translate_name(&self, property: &PropertyMetadata) -> String {
        match &property.serialized_name {
            Some(name) => name.clone(),
            None => self.delegate.translate_name(property),
        }
    }
}
