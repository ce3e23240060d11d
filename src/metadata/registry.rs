//! In-memory metadata provider.
//!
//! [`MetadataRegistry`] implements every provider trait. It is filled either
//! programmatically, by [`super::rust_source::RustSourceLoader`], or from a
//! YAML/JSON descriptor:
//!
//! ```yaml
//! classes:
//!   User:
//!     properties:
//!       - name: login
//!         type: string
//!         doc: The login used to sign in
//!         constraints: [{ kind: not_blank }]
//!       - name: roles
//!         type: array<string>
//!         groups: [admin]
//! enums:
//!   Status: [active, disabled]
//! methods:
//!   - class: UserController
//!     name: show
//!     doc: |
//!       Show one user.
//!       @return User
//! declarations:
//!   NotFoundError: { kind: concrete, parents: [HttpError] }
//! ```

use super::{
    ClassMetadata, Constraint, ConstraintSource, DeclarationSource, DocCommentSource, MethodRef,
    PropertyConstraints, PropertyMetadata, PropertyMetadataSource, TypeDeclaration,
};
use crate::error::Result;
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Metadata for classes, enumerations, methods and type declarations
#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    classes: IndexMap<String, ClassMetadata>,
    enums: IndexMap<String, Vec<String>>,
    constraints: IndexMap<String, Vec<PropertyConstraints>>,
    property_docs: HashMap<(String, String), String>,
    method_docs: IndexMap<MethodRef, String>,
    declarations: IndexMap<String, TypeDeclaration>,
}

#[derive(Debug, Deserialize)]
struct Descriptor {
    #[serde(default)]
    classes: IndexMap<String, ClassDescriptor>,
    #[serde(default)]
    enums: IndexMap<String, Vec<String>>,
    #[serde(default)]
    methods: Vec<MethodDescriptor>,
    #[serde(default)]
    declarations: IndexMap<String, TypeDeclaration>,
}

#[derive(Debug, Deserialize)]
struct ClassDescriptor {
    #[serde(default)]
    properties: Vec<PropertyDescriptor>,
}

#[derive(Debug, Deserialize)]
struct PropertyDescriptor {
    #[serde(flatten)]
    metadata: PropertyMetadata,
    #[serde(default)]
    doc: Option<String>,
    #[serde(default)]
    constraints: Vec<Constraint>,
}

#[derive(Debug, Deserialize)]
struct MethodDescriptor {
    #[serde(flatten)]
    method: MethodRef,
    doc: String,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a descriptor file; `.json` files are read as JSON, anything else as YAML
    pub fn from_descriptor_file(path: &Path) -> Result<Self> {
        let mut registry = Self::new();
        registry.load_descriptor_file(path)?;
        Ok(registry)
    }

    /// Merge a descriptor file into this registry
    pub fn load_descriptor_file(&mut self, path: &Path) -> Result<()> {
        debug!("Loading metadata descriptor: {}", path.display());
        let content = fs::read_to_string(path)?;
        let descriptor: Descriptor = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };
        self.merge_descriptor(descriptor);
        Ok(())
    }

    /// Merge a YAML (or JSON) descriptor given as text
    pub fn load_descriptor_str(&mut self, content: &str) -> Result<()> {
        let descriptor: Descriptor = serde_yaml::from_str(content)?;
        self.merge_descriptor(descriptor);
        Ok(())
    }

    fn merge_descriptor(&mut self, descriptor: Descriptor) {
        for (class, class_descriptor) in descriptor.classes {
            self.classes.entry(class.clone()).or_insert_with(|| ClassMetadata {
                name: class.clone(),
                properties: Vec::new(),
            });
            for property in class_descriptor.properties {
                let mut metadata = property.metadata;
                metadata.class = class.clone();
                if let Some(doc) = property.doc {
                    self.set_property_doc(&class, &metadata.name, doc);
                }
                for constraint in property.constraints {
                    self.add_constraint(&class, &metadata.name, constraint);
                }
                self.add_property(metadata);
            }
        }
        for (name, variants) in descriptor.enums {
            self.add_enum(name, variants);
        }
        for method in descriptor.methods {
            self.set_method_doc(method.method, method.doc);
        }
        for (name, mut declaration) in descriptor.declarations {
            declaration.name = name;
            self.add_declaration(declaration);
        }
    }

    /// Append a property to its class (`property.class`), creating the class if needed
    pub fn add_property(&mut self, property: PropertyMetadata) {
        let class = self
            .classes
            .entry(property.class.clone())
            .or_insert_with(|| ClassMetadata {
                name: property.class.clone(),
                properties: Vec::new(),
            });
        match class.properties.iter_mut().find(|existing| existing.name == property.name) {
            Some(existing) => *existing = property,
            None => class.properties.push(property),
        }
    }

    /// Register a class with no properties yet
    pub fn add_class(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.classes.entry(name.clone()).or_insert_with(|| ClassMetadata {
            name,
            properties: Vec::new(),
        });
    }

    pub fn add_enum(&mut self, name: impl Into<String>, variants: Vec<String>) {
        self.enums.insert(name.into(), variants);
    }

    pub fn add_constraint(&mut self, class: &str, property: &str, constraint: Constraint) {
        let entries = self.constraints.entry(class.to_string()).or_default();
        match entries.iter_mut().find(|entry| entry.property == property) {
            Some(entry) => entry.constraints.push(constraint),
            None => entries.push(PropertyConstraints {
                property: property.to_string(),
                constraints: vec![constraint],
            }),
        }
    }

    pub fn set_property_doc(&mut self, class: &str, property: &str, doc: impl Into<String>) {
        self.property_docs
            .insert((class.to_string(), property.to_string()), doc.into());
    }

    pub fn set_method_doc(&mut self, method: MethodRef, doc: impl Into<String>) {
        self.method_docs.insert(method, doc.into());
    }

    /// Record a declaration; parents already known for the name are kept
    pub fn add_declaration(&mut self, mut declaration: TypeDeclaration) {
        if let Some(existing) = self.declarations.get(&declaration.name) {
            for parent in &existing.parents {
                if !declaration.parents.contains(parent) {
                    declaration.parents.push(parent.clone());
                }
            }
        }
        self.declarations.insert(declaration.name.clone(), declaration);
    }

    /// Link `child` to a direct ancestor, declaring `child` as concrete if it is still unknown
    pub fn add_parent(&mut self, child: &str, parent: &str) {
        let declaration = self
            .declarations
            .entry(child.to_string())
            .or_insert_with(|| TypeDeclaration {
                name: child.to_string(),
                ..Default::default()
            });
        if !declaration.parents.iter().any(|existing| existing == parent) {
            declaration.parents.push(parent.to_string());
        }
    }

    /// Names of every known class, in registration order
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Every documented method, in registration order
    pub fn methods(&self) -> impl Iterator<Item = &MethodRef> {
        self.method_docs.keys()
    }

    /// Resolve `method` or `Class::method` to a documented method.
    ///
    /// A bare name matches a free function first, then the first method of
    /// that name on any class.
    pub fn resolve_method(&self, id: &str) -> Option<&MethodRef> {
        let wanted = MethodRef::parse(id);
        if let Some((method, _)) = self.method_docs.get_key_value(&wanted) {
            return Some(method);
        }
        if wanted.class.is_none() {
            return self.method_docs.keys().find(|method| method.name == wanted.name);
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.enums.is_empty()
            && self.method_docs.is_empty()
            && self.declarations.is_empty()
    }
}

impl PropertyMetadataSource for MetadataRegistry {
    fn class_metadata(&self, class: &str) -> Option<&ClassMetadata> {
        self.classes.get(class)
    }

    fn enum_variants(&self, name: &str) -> Option<&[String]> {
        self.enums.get(name).map(Vec::as_slice)
    }
}

impl ConstraintSource for MetadataRegistry {
    fn property_constraints(&self, class: &str) -> &[PropertyConstraints] {
        self.constraints.get(class).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl DocCommentSource for MetadataRegistry {
    fn property_doc(&self, class: &str, property: &str) -> Option<&str> {
        self.property_docs
            .get(&(class.to_string(), property.to_string()))
            .map(String::as_str)
    }

    fn method_doc(&self, method: &MethodRef) -> Option<&str> {
        self.method_docs.get(method).map(String::as_str)
    }
}

impl DeclarationSource for MetadataRegistry {
    fn declaration(&self, name: &str) -> Option<&TypeDeclaration> {
        self.declarations.get(name)
    }
}
