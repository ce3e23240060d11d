//! Metadata providers consumed by the extractors.
//!
//! Extractors never introspect anything themselves: class layouts, validation
//! rules, documentation comments and type declarations all come from the
//! capability traits defined here. [`registry::MetadataRegistry`] implements
//! every one of them and can be filled programmatically, from a descriptor
//! file, or from Rust sources through [`rust_source::RustSourceLoader`].

pub mod docblock;
pub mod naming;
pub mod registry;
pub mod rust_source;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Type names that denote a collection in the provider's type notation.
///
/// A two-parameter form (`array<string, User>`) is a keyed collection whose
/// element is the second parameter; a one-parameter form is a plain sequence.
pub const COLLECTION_MARKERS: &[&str] = &[
    "array",
    "ArrayCollection",
    "Vec",
    "VecDeque",
    "HashSet",
    "BTreeSet",
    "HashMap",
    "BTreeMap",
    "IndexMap",
];

/// Wrappers that add nothing to the wire shape of their first parameter
pub const TRANSPARENT_WRAPPERS: &[&str] = &["Option", "Box", "Arc", "Rc", "Cow"];

/// A declared type in `Name<Param, ...>` notation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeRef {
    pub name: String,
    pub params: Vec<TypeRef>,
}

impl TypeRef {
    /// A type without parameters
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// A type with parameters
    pub fn generic(name: impl Into<String>, params: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Parse a type expression.
    ///
    /// Understands `Name<A, B>`, the `T[]` sequence shorthand, nullable forms
    /// (`?T`, `T|null`), leading `\` namespaces and `&`/`::` Rust paths.
    /// Returns `None` for an empty expression.
    pub fn parse(input: &str) -> Option<TypeRef> {
        let mut text = input.trim();
        if text.is_empty() {
            return None;
        }

        let alternatives = split_top_level(text, '|');
        if alternatives.len() > 1 {
            let chosen = alternatives
                .into_iter()
                .find(|alt| !matches!(alt.trim(), "null" | "None" | "void"))?;
            return TypeRef::parse(chosen);
        }

        text = text.trim_start_matches('?').trim_start_matches('&').trim();
        if let Some(rest) = text.strip_prefix("mut ") {
            text = rest.trim();
        }
        if text.starts_with('\'') {
            // lifetime in `&'a T`
            text = text.split_once(' ').map(|(_, rest)| rest.trim()).unwrap_or(text);
        }

        if let Some(inner) = text.strip_suffix("[]") {
            return TypeRef::parse(inner).map(|element| TypeRef::generic("array", vec![element]));
        }

        let (head, params) = match (text.find('<'), text.rfind('>')) {
            (Some(open), Some(close)) if close > open => {
                let params = split_top_level(&text[open + 1..close], ',')
                    .into_iter()
                    .filter_map(TypeRef::parse)
                    .collect();
                (&text[..open], params)
            }
            _ => (text, Vec::new()),
        };

        let head = head.trim().trim_start_matches('\\');
        let name = head.rsplit("::").next().unwrap_or(head).trim();
        if name.is_empty() {
            return None;
        }

        Some(TypeRef::generic(name, params))
    }

    /// Whether the name is one of the [`COLLECTION_MARKERS`]
    pub fn is_collection(&self) -> bool {
        COLLECTION_MARKERS.contains(&self.name.as_str())
    }

    /// Element type of a collection encoding, if this is one
    pub fn collection_element(&self) -> Option<&TypeRef> {
        if !self.is_collection() {
            return None;
        }
        match self.params.as_slice() {
            [_, value, ..] => Some(value),
            [single] => Some(single),
            [] => None,
        }
    }

    /// Strip [`TRANSPARENT_WRAPPERS`] down to the type they carry
    pub fn unwrap_transparent(&self) -> &TypeRef {
        let mut current = self;
        while TRANSPARENT_WRAPPERS.contains(&current.name.as_str()) {
            match current.params.first() {
                Some(inner) => current = inner,
                None => break,
            }
        }
        current
    }
}

/// Split on `separator` outside of `<...>` nesting
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, ch) in text.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(&text[start..index]);
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
            write!(f, "<{}>", params.join(", "))?;
        }
        Ok(())
    }
}

impl TryFrom<String> for TypeRef {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TypeRef::parse(&value).ok_or_else(|| format!("invalid type expression: {:?}", value))
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

/// Serialization metadata for one property of a class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyMetadata {
    /// Owning class; filled in by the registry when loading descriptors
    #[serde(default)]
    pub class: String,
    /// Internal property name
    pub name: String,
    /// Declared type, if the provider knows it
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_ref: Option<TypeRef>,
    /// Explicit wire name overriding the naming strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialized_name: Option<String>,
    #[serde(default)]
    pub read_only: bool,
    /// Serializer groups; an empty list means the implicit `Default` group
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    /// Accessor method backing a virtual (computed) property
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessor: Option<String>,
}

/// Group every property belongs to when it declares none
pub const DEFAULT_GROUP: &str = "Default";

impl PropertyMetadata {
    pub fn new(class: impl Into<String>, name: impl Into<String>, type_ref: Option<TypeRef>) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            type_ref,
            ..Default::default()
        }
    }

    /// Whether the property takes part in serialization for any of `groups`
    pub fn in_any_group<'a, I>(&self, groups: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        let own: Vec<&str> = if self.groups.is_empty() {
            vec![DEFAULT_GROUP]
        } else {
            self.groups.iter().map(String::as_str).collect()
        };
        groups.into_iter().any(|group| own.contains(&group.as_str()))
    }
}

/// Serialization metadata for a class, properties in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassMetadata {
    pub name: String,
    pub properties: Vec<PropertyMetadata>,
}

/// A validation rule attached to a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    NotBlank,
    NotNull,
    Length {
        #[serde(default)]
        min: Option<u64>,
        #[serde(default)]
        max: Option<u64>,
    },
    Range {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    Choice { choices: Vec<Value> },
}

impl Constraint {
    /// Stable kind name, as used in descriptors
    pub fn kind(&self) -> &'static str {
        match self {
            Constraint::NotBlank => "not_blank",
            Constraint::NotNull => "not_null",
            Constraint::Length { .. } => "length",
            Constraint::Range { .. } => "range",
            Constraint::Choice { .. } => "choice",
        }
    }
}

/// All constraints declared on one property
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyConstraints {
    pub property: String,
    pub constraints: Vec<Constraint>,
}

/// How a type is declared, which decides whether it names a single outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    #[default]
    Concrete,
    Abstract,
    Interface,
    Trait,
}

/// A named type declaration (used to resolve `@throws` targets)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: DeclarationKind,
    /// Direct ancestors, most specific first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    /// Raw documentation comment of the declaration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl TypeDeclaration {
    pub fn is_concrete(&self) -> bool {
        self.kind == DeclarationKind::Concrete
    }
}

/// A method descriptor: optional owning class plus method name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    pub name: String,
}

impl MethodRef {
    pub fn new(class: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            class: class.map(str::to_string),
            name: name.into(),
        }
    }

    /// Parse `method` or `Class::method`
    pub fn parse(text: &str) -> Self {
        match text.rsplit_once("::") {
            Some((class, name)) => MethodRef::new(Some(class), name),
            None => MethodRef::new(None, text),
        }
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.class {
            Some(class) => write!(f, "{}::{}", class, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Source of per-class property metadata
pub trait PropertyMetadataSource: Send + Sync {
    /// Metadata for `class`, or `None` when the class is unknown
    fn class_metadata(&self, class: &str) -> Option<&ClassMetadata>;

    /// Variant names of an enumeration, or `None` when `name` is not one
    fn enum_variants(&self, _name: &str) -> Option<&[String]> {
        None
    }
}

/// Source of validation constraints
pub trait ConstraintSource: Send + Sync {
    /// Constraints of every property of `class`; empty when none are declared
    fn property_constraints(&self, class: &str) -> &[PropertyConstraints];
}

/// Source of raw documentation comments
pub trait DocCommentSource: Send + Sync {
    fn property_doc(&self, class: &str, property: &str) -> Option<&str>;

    fn method_doc(&self, method: &MethodRef) -> Option<&str>;
}

/// Source of type declarations
pub trait DeclarationSource: Send + Sync {
    fn declaration(&self, name: &str) -> Option<&TypeDeclaration>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_and_generic() {
        assert_eq!(TypeRef::parse("string"), Some(TypeRef::named("string")));
        assert_eq!(
            TypeRef::parse("array<string, App\\Entity\\User>"),
            Some(TypeRef::generic(
                "array",
                vec![TypeRef::named("string"), TypeRef::named("App\\Entity\\User")]
            ))
        );
        assert_eq!(TypeRef::parse("   "), None);
    }

    #[test]
    fn test_parse_nested_generics() {
        let parsed = TypeRef::parse("HashMap<String, Vec<Option<User>>>").unwrap();
        assert_eq!(parsed.to_string(), "HashMap<String, Vec<Option<User>>>");
        assert_eq!(parsed.params.len(), 2);
    }

    #[test]
    fn test_parse_shorthand_and_nullable_forms() {
        assert_eq!(TypeRef::parse("User[]").unwrap().to_string(), "array<User>");
        assert_eq!(TypeRef::parse("?int").unwrap(), TypeRef::named("int"));
        assert_eq!(TypeRef::parse("null|User").unwrap(), TypeRef::named("User"));
        assert_eq!(TypeRef::parse("\\DateTime").unwrap(), TypeRef::named("DateTime"));
        assert_eq!(TypeRef::parse("&'a str").unwrap(), TypeRef::named("str"));
        assert_eq!(
            TypeRef::parse("std::collections::HashSet<u32>").unwrap().to_string(),
            "HashSet<u32>"
        );
    }

    #[test]
    fn test_collection_element_selection() {
        let keyed = TypeRef::parse("array<string, User>").unwrap();
        assert_eq!(keyed.collection_element(), Some(&TypeRef::named("User")));

        let sequence = TypeRef::parse("Vec<User>").unwrap();
        assert_eq!(sequence.collection_element(), Some(&TypeRef::named("User")));

        assert_eq!(TypeRef::named("array").collection_element(), None);
        assert_eq!(TypeRef::parse("Page<User>").unwrap().collection_element(), None);
    }

    #[test]
    fn test_unwrap_transparent() {
        let wrapped = TypeRef::parse("Option<Box<Node>>").unwrap();
        assert_eq!(wrapped.unwrap_transparent(), &TypeRef::named("Node"));
    }

    #[test]
    fn test_group_membership_defaults() {
        let mut property = PropertyMetadata::new("User", "name", None);
        let default_group = vec![DEFAULT_GROUP.to_string()];
        let read = vec!["read".to_string()];

        assert!(property.in_any_group(&default_group));
        assert!(!property.in_any_group(&read));

        property.groups = vec!["read".to_string()];
        assert!(property.in_any_group(&read));
        assert!(!property.in_any_group(&default_group));
    }

    #[test]
    fn test_constraint_descriptor_format() {
        let constraint: Constraint = serde_yaml::from_str("kind: length\nmin: 1\nmax: 20\n").unwrap();
        assert_eq!(constraint, Constraint::Length { min: Some(1), max: Some(20) });
        assert_eq!(constraint.kind(), "length");
    }

    #[test]
    fn test_method_ref_parse() {
        assert_eq!(MethodRef::parse("UserController::show"), MethodRef::new(Some("UserController"), "show"));
        assert_eq!(MethodRef::parse("list_users"), MethodRef::new(None, "list_users"));
    }
}
