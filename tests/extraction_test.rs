use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use swagger_extraction::{
    cli::{generate, CliArgs, OutputFormat},
    config::ExtractionConfig,
    extraction::{extractor::register_default_extractors, ExtractionContext, ModelContext, Source, SwaggerEngine, Target},
    metadata::{registry::MetadataRegistry, rust_source::RustSourceLoader},
    schema::{Schema, Swagger},
    serializer::{dump_json, dump_yaml},
};
use tempfile::TempDir;

fn fixture(path: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(path)
}

fn blog_args() -> CliArgs {
    CliArgs {
        project_path: Some(fixture("blog_project")),
        base_path: Some(fixture("base_swagger.json")),
        metadata_path: None,
        config_path: Some(fixture("config.yaml")),
        output_format: OutputFormat::Json,
        output_path: None,
        skip_validation: false,
        verbose: false,
    }
}

fn blog_registry() -> MetadataRegistry {
    let mut registry = MetadataRegistry::new();
    let report = RustSourceLoader::load_directory(&fixture("blog_project"), &mut registry)
        .expect("Failed to load fixture project");
    assert_eq!(report.files_scanned, 4);
    assert_eq!(report.files_loaded, 3, "broken.rs must be skipped");
    registry
}

fn as_json(swagger: &Swagger) -> serde_json::Value {
    serde_json::to_value(swagger).expect("Failed to convert document")
}

#[test]
fn test_definitions_from_rust_sources() {
    let swagger = generate(&blog_args()).expect("Failed to generate document");
    let doc = as_json(&swagger);

    let definitions = swagger.definitions.as_ref().unwrap();
    let names: Vec<_> = definitions.keys().cloned().collect();
    assert_eq!(names, vec!["Article".to_string(), "Author".to_string()]);

    let article = &doc["definitions"]["Article"];
    let properties: Vec<_> = definitions["Article"].properties.keys().cloned().collect();
    assert_eq!(
        properties,
        vec!["id", "title", "body", "tags", "status", "author", "internal_notes"]
    );

    assert_eq!(
        article["properties"]["id"],
        json!({
            "type": "integer",
            "format": "int64",
            "description": "Unique identifier.",
            "readOnly": true
        })
    );
    assert_eq!(
        article["properties"]["title"],
        json!({
            "type": "string",
            "format": "not empty",
            "minLength": 3,
            "maxLength": 120,
            "description": "Headline shown in listings."
        })
    );
    assert_eq!(article["properties"]["body"], json!({ "type": "string", "description": "" }));
    assert_eq!(
        article["properties"]["tags"],
        json!({ "type": "array", "items": { "type": "string" }, "description": "" })
    );
    assert_eq!(
        article["properties"]["status"],
        json!({ "type": "string", "enum": ["Draft", "live"], "description": "" })
    );
    assert_eq!(article["required"], json!(["title"]));
}

#[test]
fn test_nested_classes_and_cycles() {
    let swagger = generate(&blog_args()).expect("Failed to generate document");
    let doc = as_json(&swagger);

    let author = &doc["definitions"]["Article"]["properties"]["author"];
    assert_eq!(author["type"], "object");
    assert_eq!(
        author["properties"]["age"],
        json!({
            "type": "integer",
            "format": "int32",
            "minimum": 0.0,
            "maximum": 150.0,
            "description": ""
        })
    );
    assert_eq!(author["required"], json!(["age"]));
    // Article is already being resolved: the back reference stays a bare object
    assert_eq!(
        author["properties"]["articles"],
        json!({ "type": "array", "items": { "type": "object" }, "description": "" })
    );

    let articles = &doc["definitions"]["Author"]["properties"]["articles"];
    assert_eq!(articles["items"]["properties"]["title"]["minLength"], 3);
    assert_eq!(articles["items"]["properties"]["author"], json!({ "type": "object", "description": "" }));
}

#[test]
fn test_operations_from_doc_comments() {
    let swagger = generate(&blog_args()).expect("Failed to generate document");
    let doc = as_json(&swagger);

    let show = &doc["paths"]["/articles/{id}"]["get"];
    assert_eq!(show["summary"], "Show one article.");
    assert_eq!(show["description"], "Drafts are only visible to their author.");
    assert_eq!(
        show["parameters"][0],
        json!({
            "name": "id",
            "in": "path",
            "required": true,
            "description": "Article identifier",
            "type": "integer",
            "format": "int64"
        })
    );

    let responses = show["responses"].as_object().unwrap();
    let codes: Vec<_> = responses.keys().cloned().collect();
    assert_eq!(codes, vec!["404", "200", "403"]);
    // already documented in the base document
    assert_eq!(responses["404"]["description"], "No such article");
    assert_eq!(responses["200"]["description"], "The article");
    assert_eq!(responses["200"]["schema"]["properties"]["title"]["format"], "not empty");
    assert_eq!(responses["403"]["description"], "Caller may not read this draft");
}

#[test]
fn test_body_parameters_and_exception_fallbacks() {
    let swagger = generate(&blog_args()).expect("Failed to generate document");
    let doc = as_json(&swagger);

    let create = &doc["paths"]["/articles"]["post"];
    assert_eq!(create["summary"], "Create an article.");
    assert_eq!(
        create["parameters"][0]["schema"]["properties"]["title"],
        json!({ "type": "string", "description": "Headline of the new article" })
    );
    assert_eq!(create["responses"]["200"]["description"], "");
    // no mapping anywhere in the lineage: 500 with the declaration's doc
    assert_eq!(create["responses"]["500"]["description"], "The payload failed validation.");

    let list = &doc["paths"]["/articles"]["get"];
    assert_eq!(list["deprecated"], true);
    assert_eq!(list["parameters"][0]["type"], "integer");
    assert_eq!(list["parameters"][0]["format"], "int32");

    let health = &doc["paths"]["/health"]["get"];
    assert_eq!(health, &json!({ "operationId": "health", "responses": { "200": { "description": "OK" } } }));
}

#[test]
fn test_generated_document_dumps() {
    let swagger = generate(&blog_args()).expect("Failed to generate document");

    let json = dump_json(&swagger).expect("Document should be valid");
    let reparsed: Swagger = serde_json::from_str(&json).unwrap();
    assert_eq!(reparsed, swagger);

    let yaml = dump_yaml(&swagger).expect("Document should be valid");
    assert!(yaml.contains("basePath: /api"));
}

#[test]
fn test_generation_is_idempotent() {
    let first = generate(&blog_args()).expect("Failed to generate document");

    let registry = Arc::new(blog_registry());
    let config = ExtractionConfig::from_file(&fixture("config.yaml")).unwrap();
    let mut engine = SwaggerEngine::new();
    register_default_extractors(&mut engine, registry.clone(), &config);

    let mut second = first.clone();
    for class in registry.class_names() {
        let schema = second.definitions_mut().get_mut(class).unwrap();
        let mut context = ExtractionContext::with_parameters(&engine, config.context_parameters());
        engine
            .extract(&Source::Class(class), &mut Target::Schema(schema), &mut context)
            .unwrap();
    }
    let raw = std::fs::read_to_string(fixture("base_swagger.json")).unwrap();
    engine
        .extract_into(&Source::Raw(&raw), &mut Target::Document(&mut second))
        .unwrap();

    assert_eq!(second, first);
}

#[test]
fn test_serializer_groups_filter_properties() {
    let registry = Arc::new(blog_registry());
    let config = ExtractionConfig {
        out_model_context: ModelContext::with_groups(["admin"]),
        ..Default::default()
    };
    let mut engine = SwaggerEngine::new();
    register_default_extractors(&mut engine, registry, &config);

    let mut schema = Schema::default();
    let mut context = ExtractionContext::with_parameters(&engine, config.context_parameters());
    engine
        .extract(&Source::Class("Article"), &mut Target::Schema(&mut schema), &mut context)
        .unwrap();

    let names: Vec<_> = schema.properties.keys().cloned().collect();
    assert_eq!(names, vec!["internal_notes".to_string()]);
    assert_eq!(schema.properties["internal_notes"].description.as_deref(), Some("Editorial notes."));
}

#[test]
fn test_target_directory_is_not_scanned() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let root = temp_dir.path();
    std::fs::create_dir_all(root.join("src")).unwrap();
    std::fs::create_dir_all(root.join("target/debug")).unwrap();
    std::fs::write(root.join("src/lib.rs"), "pub struct Visible { pub id: u32 }").unwrap();
    std::fs::write(root.join("target/debug/out.rs"), "pub struct Hidden { pub id: u32 }").unwrap();

    let mut args = blog_args();
    args.project_path = Some(root.to_path_buf());
    args.base_path = None;
    let swagger = generate(&args).expect("Failed to generate document");

    let definitions = swagger.definitions.as_ref().unwrap();
    assert!(definitions.contains_key("Visible"));
    assert!(!definitions.contains_key("Hidden"));
    // no base document: nothing to validate against
    assert!(dump_json(&swagger).is_err());
}
