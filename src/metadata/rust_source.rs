//! Metadata loader for Rust source trees.
//!
//! Walks a project directory, parses every `.rs` file with `syn` and records
//! what the extractors need into a [`MetadataRegistry`]:
//!
//! - structs with named fields become classes; `#[serde(rename)]` and
//!   `#[serde(skip)]` are honoured, `///` comments become property docs and
//!   the `@groups a b` / `@readonly` doc tags set serializer groups and the
//!   read-only flag
//! - `#[validate(...)]` entries `not_blank`, `required`, `length(min, max)`
//!   and `range(min, max)` become constraints
//! - enums whose variants are all unit variants become enumerations
//! - documented free functions and `impl` methods become documented methods
//! - structs, enums and traits are recorded as type declarations

use super::docblock::DocBlock;
use super::registry::MetadataRegistry;
use super::{Constraint, DeclarationKind, MethodRef, PropertyMetadata, TypeDeclaration, TypeRef};
use crate::error::{ExtractionError, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use walkdir::WalkDir;

/// Loads Rust sources into a [`MetadataRegistry`]
pub struct RustSourceLoader;

/// Outcome of loading a directory
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Number of `.rs` files discovered
    pub files_scanned: usize,
    /// Number of files parsed and recorded
    pub files_loaded: usize,
    /// Inaccessible paths and unparseable files
    pub warnings: Vec<String>,
}

/// Serde attributes relevant to the wire shape of a field or variant
#[derive(Debug, Default)]
struct SerdeAttributes {
    rename: Option<String>,
    skip: bool,
}

impl RustSourceLoader {
    /// Recursively collect `.rs` files below `root`, skipping `target` and hidden directories
    pub fn scan(root: &Path) -> (Vec<PathBuf>, Vec<String>) {
        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
            if entry.path() == root {
                return true;
            }
            let file_name = entry.file_name().to_string_lossy();
            !file_name.starts_with('.') && file_name != "target"
        });

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("rs") {
                        rust_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        rust_files.sort();
        (rust_files, warnings)
    }

    /// Load every Rust file below `root`. Files that fail to parse are skipped with a warning.
    pub fn load_directory(root: &Path, registry: &mut MetadataRegistry) -> Result<LoadReport> {
        if !root.is_dir() {
            return Err(ExtractionError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("not a directory: {}", root.display()),
            )));
        }

        let (files, warnings) = Self::scan(root);
        let mut report = LoadReport {
            files_scanned: files.len(),
            warnings,
            ..Default::default()
        };

        for file in &files {
            match Self::load_file(file, registry) {
                Ok(()) => report.files_loaded += 1,
                Err(e) => {
                    warn!("Skipping {}: {}", file.display(), e);
                    report.warnings.push(e.to_string());
                }
            }
        }

        debug!(
            "Loaded {} of {} Rust files from {}",
            report.files_loaded,
            report.files_scanned,
            root.display()
        );
        Ok(report)
    }

    pub fn load_file(path: &Path, registry: &mut MetadataRegistry) -> Result<()> {
        let content = fs::read_to_string(path)?;
        Self::load_source(&content, path, registry)
    }

    /// Parse `code` (reported as `file` in errors) and record its items
    pub fn load_source(code: &str, file: &Path, registry: &mut MetadataRegistry) -> Result<()> {
        let syntax_tree = syn::parse_file(code).map_err(|e| ExtractionError::Parse {
            file: file.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::load_items(&syntax_tree.items, registry);
        Ok(())
    }

    fn load_items(items: &[syn::Item], registry: &mut MetadataRegistry) {
        for item in items {
            match item {
                syn::Item::Struct(item_struct) => Self::load_struct(item_struct, registry),
                syn::Item::Enum(item_enum) => Self::load_enum(item_enum, registry),
                syn::Item::Trait(item_trait) => registry.add_declaration(TypeDeclaration {
                    name: item_trait.ident.unraw().to_string(),
                    kind: DeclarationKind::Trait,
                    parents: Vec::new(),
                    doc: doc_text(&item_trait.attrs),
                }),
                syn::Item::Fn(item_fn) => {
                    if let Some(doc) = doc_text(&item_fn.attrs) {
                        let method = MethodRef::new(None, item_fn.sig.ident.unraw().to_string());
                        registry.set_method_doc(method, doc);
                    }
                }
                syn::Item::Impl(item_impl) => Self::load_impl(item_impl, registry),
                syn::Item::Mod(item_mod) => {
                    if let Some((_, items)) = &item_mod.content {
                        Self::load_items(items, registry);
                    }
                }
                _ => {}
            }
        }
    }

    fn load_struct(item_struct: &syn::ItemStruct, registry: &mut MetadataRegistry) {
        let class = item_struct.ident.unraw().to_string();
        debug!("Recording struct: {}", class);

        registry.add_declaration(TypeDeclaration {
            name: class.clone(),
            kind: DeclarationKind::Concrete,
            parents: Vec::new(),
            doc: doc_text(&item_struct.attrs),
        });

        let syn::Fields::Named(named_fields) = &item_struct.fields else {
            return;
        };
        registry.add_class(class.clone());

        for field in &named_fields.named {
            let Some(ident) = &field.ident else {
                continue;
            };
            let serde_attrs = serde_attributes(&field.attrs);
            if serde_attrs.skip {
                debug!("Skipping {}.{} (serde skip)", class, ident);
                continue;
            }

            let name = ident.unraw().to_string();
            let mut property = PropertyMetadata::new(class.clone(), name.clone(), type_ref_from_syn(&field.ty));
            property.serialized_name = serde_attrs.rename;

            if let Some(doc) = doc_text(&field.attrs) {
                let block = DocBlock::parse(&doc);
                property.read_only = block.other_tags("readonly").next().is_some();
                property.groups = block
                    .other_tags("groups")
                    .flat_map(|body| body.split(|c: char| c.is_whitespace() || c == ','))
                    .filter(|group| !group.is_empty())
                    .map(str::to_string)
                    .collect();
                registry.set_property_doc(&class, &name, doc);
            }

            for constraint in validation_constraints(&field.attrs) {
                registry.add_constraint(&class, &name, constraint);
            }

            registry.add_property(property);
        }
    }

    fn load_enum(item_enum: &syn::ItemEnum, registry: &mut MetadataRegistry) {
        let name = item_enum.ident.unraw().to_string();
        debug!("Recording enum: {}", name);

        registry.add_declaration(TypeDeclaration {
            name: name.clone(),
            kind: DeclarationKind::Concrete,
            parents: Vec::new(),
            doc: doc_text(&item_enum.attrs),
        });

        let unit_only = item_enum
            .variants
            .iter()
            .all(|variant| matches!(variant.fields, syn::Fields::Unit));
        if !unit_only || item_enum.variants.is_empty() {
            return;
        }

        let variants = item_enum
            .variants
            .iter()
            .filter_map(|variant| {
                let attrs = serde_attributes(&variant.attrs);
                if attrs.skip {
                    return None;
                }
                Some(attrs.rename.unwrap_or_else(|| variant.ident.unraw().to_string()))
            })
            .collect();
        registry.add_enum(name, variants);
    }

    fn load_impl(item_impl: &syn::ItemImpl, registry: &mut MetadataRegistry) {
        let syn::Type::Path(self_ty) = item_impl.self_ty.as_ref() else {
            return;
        };
        let Some(segment) = self_ty.path.segments.last() else {
            return;
        };
        let class = segment.ident.unraw().to_string();

        if let Some((_, trait_path, _)) = &item_impl.trait_ {
            if let Some(trait_segment) = trait_path.segments.last() {
                registry.add_parent(&class, &trait_segment.ident.unraw().to_string());
            }
        }

        for impl_item in &item_impl.items {
            if let syn::ImplItem::Fn(method) = impl_item {
                if let Some(doc) = doc_text(&method.attrs) {
                    let method_ref = MethodRef::new(Some(class.as_str()), method.sig.ident.unraw().to_string());
                    registry.set_method_doc(method_ref, doc);
                }
            }
        }
    }
}

/// Concatenated `///` lines, or `None` when undocumented
fn doc_text(attrs: &[syn::Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            syn::Meta::NameValue(syn::MetaNameValue {
                value: syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(text),
                    ..
                }),
                ..
            }) => Some(text.value()),
            _ => None,
        })
        .map(|line| line.strip_prefix(' ').map(str::to_string).unwrap_or(line))
        .collect();

    let doc = lines.join("\n");
    if doc.trim().is_empty() {
        None
    } else {
        Some(doc)
    }
}

/// Convert a `syn` type into the provider's type notation
fn type_ref_from_syn(ty: &syn::Type) -> Option<TypeRef> {
    match ty {
        syn::Type::Path(type_path) => {
            let segment = type_path.path.segments.last()?;
            let params = match &segment.arguments {
                syn::PathArguments::AngleBracketed(args) => args
                    .args
                    .iter()
                    .filter_map(|arg| match arg {
                        syn::GenericArgument::Type(inner) => type_ref_from_syn(inner),
                        _ => None,
                    })
                    .collect(),
                _ => Vec::new(),
            };
            Some(TypeRef::generic(segment.ident.unraw().to_string(), params))
        }
        syn::Type::Reference(reference) => type_ref_from_syn(&reference.elem),
        syn::Type::Paren(paren) => type_ref_from_syn(&paren.elem),
        syn::Type::Group(group) => type_ref_from_syn(&group.elem),
        syn::Type::Slice(slice) => {
            type_ref_from_syn(&slice.elem).map(|element| TypeRef::generic("array", vec![element]))
        }
        syn::Type::Array(array) => {
            type_ref_from_syn(&array.elem).map(|element| TypeRef::generic("array", vec![element]))
        }
        _ => None,
    }
}

fn serde_attributes(attrs: &[syn::Attribute]) -> SerdeAttributes {
    let mut serde_attrs = SerdeAttributes::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if meta.input.peek(syn::Token![=]) {
                    let value: syn::LitStr = meta.value()?.parse()?;
                    serde_attrs.rename = Some(value.value());
                } else {
                    // rename(serialize = "...", deserialize = "...")
                    meta.parse_nested_meta(|inner| {
                        if inner.path.is_ident("serialize") {
                            let value: syn::LitStr = inner.value()?.parse()?;
                            serde_attrs.rename = Some(value.value());
                            Ok(())
                        } else {
                            skip_meta_value(&inner)
                        }
                    })?;
                }
                Ok(())
            } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                serde_attrs.skip = true;
                Ok(())
            } else {
                skip_meta_value(&meta)
            }
        });
        if let Err(e) = parsed {
            debug!("Ignoring unparseable serde attribute: {}", e);
        }
    }

    serde_attrs
}

fn validation_constraints(attrs: &[syn::Attribute]) -> Vec<Constraint> {
    let mut constraints = Vec::new();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("validate")) {
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("not_blank") {
                constraints.push(Constraint::NotBlank);
            } else if meta.path.is_ident("required") {
                constraints.push(Constraint::NotNull);
            } else if meta.path.is_ident("length") {
                let (min, max) = numeric_bounds(&meta)?;
                constraints.push(Constraint::Length {
                    min: min.filter(|v| *v >= 0.0).map(|v| v as u64),
                    max: max.filter(|v| *v >= 0.0).map(|v| v as u64),
                });
            } else if meta.path.is_ident("range") {
                let (min, max) = numeric_bounds(&meta)?;
                constraints.push(Constraint::Range { min, max });
            } else {
                skip_meta_value(&meta)?;
            }
            Ok(())
        });
        if let Err(e) = parsed {
            debug!("Ignoring unparseable validate attribute: {}", e);
        }
    }

    constraints
}

/// Read `min = ..`/`max = ..` out of `name(min = 1, max = 10)`
fn numeric_bounds(meta: &ParseNestedMeta) -> syn::Result<(Option<f64>, Option<f64>)> {
    let mut min = None;
    let mut max = None;
    if !meta.input.peek(syn::token::Paren) {
        return Ok((min, max));
    }
    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("min") {
            let expr: syn::Expr = inner.value()?.parse()?;
            min = numeric_literal(&expr);
        } else if inner.path.is_ident("max") {
            let expr: syn::Expr = inner.value()?.parse()?;
            max = numeric_literal(&expr);
        } else {
            skip_meta_value(&inner)?;
        }
        Ok(())
    })?;
    Ok((min, max))
}

fn numeric_literal(expr: &syn::Expr) -> Option<f64> {
    match expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Int(value),
            ..
        }) => value.base10_parse::<f64>().ok(),
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Float(value),
            ..
        }) => value.base10_parse::<f64>().ok(),
        syn::Expr::Unary(syn::ExprUnary {
            op: syn::UnOp::Neg(_),
            expr,
            ..
        }) => numeric_literal(expr).map(|value| -value),
        _ => None,
    }
}

/// Consume the value of a meta item we do not interpret
fn skip_meta_value(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        meta.value()?.parse::<syn::Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_meta_value(&inner))?;
    }
    Ok(())
}
