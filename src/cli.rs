use crate::config::ExtractionConfig;
use crate::extraction::extractor::{register_default_extractors, SwaggerDocumentExtractor};
use crate::extraction::{ExtractionContext, Source, SwaggerEngine, Target};
use crate::metadata::registry::MetadataRegistry;
use crate::metadata::rust_source::RustSourceLoader;
use crate::schema::{Schema, Swagger};
use crate::serializer::{dump_json, dump_yaml, serialize_json, serialize_yaml, write_to_file};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Swagger extraction - Derive a Swagger 2.0 document from Rust types, validation rules and doc comments
#[derive(Parser, Debug)]
#[command(name = "swagger-extract")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to a Rust project whose sources provide the metadata
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: Option<PathBuf>,

    /// Existing Swagger 2.0 document (JSON or YAML) to start from
    #[arg(short = 'b', long = "base", value_name = "FILE")]
    pub base_path: Option<PathBuf>,

    /// Metadata descriptor (YAML or JSON)
    #[arg(short = 'm', long = "metadata", value_name = "FILE")]
    pub metadata_path: Option<PathBuf>,

    /// Extraction configuration (YAML or JSON)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Write the document even when it fails validation
    #[arg(long = "skip-validation")]
    pub skip_validation: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    #[default]
    Yaml,
    /// JSON format
    Json,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if args.project_path.is_none() && args.metadata_path.is_none() {
        anyhow::bail!("Either a project path or a metadata descriptor (--metadata) is required");
    }

    if let Some(ref project_path) = args.project_path {
        if !project_path.is_dir() {
            anyhow::bail!("Project path is not a directory: {}", project_path.display());
        }
        info!("Project path: {}", project_path.display());
    }

    for (label, path) in [
        ("Base document", &args.base_path),
        ("Metadata descriptor", &args.metadata_path),
        ("Configuration", &args.config_path),
    ] {
        if let Some(path) = path {
            if !path.is_file() {
                anyhow::bail!("{} does not exist: {}", label, path.display());
            }
            info!("{}: {}", label, path.display());
        }
    }

    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Build the metadata registry from the project sources and the descriptor
fn load_registry(args: &CliArgs) -> Result<MetadataRegistry> {
    let mut registry = MetadataRegistry::new();

    if let Some(ref project_path) = args.project_path {
        info!("Loading Rust sources...");
        let report = RustSourceLoader::load_directory(project_path, &mut registry)
            .with_context(|| format!("Failed to load sources from {}", project_path.display()))?;
        for warning in &report.warnings {
            warn!("{}", warning);
        }
        info!("Loaded {} of {} Rust files", report.files_loaded, report.files_scanned);
    }

    if let Some(ref metadata_path) = args.metadata_path {
        info!("Loading metadata descriptor...");
        registry
            .load_descriptor_file(metadata_path)
            .with_context(|| format!("Failed to load metadata descriptor {}", metadata_path.display()))?;
    }

    if registry.is_empty() {
        warn!("No metadata found; the document will only contain the base document");
    }
    Ok(registry)
}

/// Extract every known class into `definitions`
fn extract_definitions(
    engine: &SwaggerEngine,
    registry: &MetadataRegistry,
    config: &ExtractionConfig,
    swagger: &mut Swagger,
) -> Result<usize> {
    let mut count = 0;
    for class in registry.class_names() {
        debug!("Extracting definition: {}", class);
        let schema = swagger
            .definitions_mut()
            .entry(class.to_string())
            .or_insert_with(Schema::default);
        let mut context = ExtractionContext::with_parameters(engine, config.context_parameters());
        engine
            .extract(&Source::Class(class), &mut Target::Schema(schema), &mut context)
            .with_context(|| format!("Failed to extract definition {}", class))?;
        count += 1;
    }
    Ok(count)
}

/// Extract documented methods into the operations naming them
fn extract_operations(
    engine: &SwaggerEngine,
    registry: &MetadataRegistry,
    config: &ExtractionConfig,
    swagger: &mut Swagger,
) -> Result<usize> {
    let mut count = 0;
    for (path, item) in swagger.paths.iter_mut().flatten() {
        for (method, operation) in item.operations_mut() {
            let Some(operation_id) = operation.operation_id.clone() else {
                continue;
            };
            let Some(method_ref) = registry.resolve_method(&operation_id) else {
                debug!("No documented method for {} {} ({})", method, path, operation_id);
                continue;
            };
            debug!("Extracting {} into {} {}", method_ref, method, path);
            let mut context = ExtractionContext::with_parameters(engine, config.context_parameters());
            engine
                .extract(&Source::Method(method_ref), &mut Target::Operation(operation), &mut context)
                .with_context(|| format!("Failed to extract operation {}", operation_id))?;
            count += 1;
        }
    }
    Ok(count)
}

/// Build the document described by `args` without writing it
pub fn generate(args: &CliArgs) -> Result<Swagger> {
    // Step 1: Collect metadata
    let registry = Arc::new(load_registry(args)?);

    // Step 2: Configure the engine
    let config = match args.config_path {
        Some(ref path) => ExtractionConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => ExtractionConfig::default(),
    };
    let mut engine = SwaggerEngine::new();
    register_default_extractors(&mut engine, registry.clone(), &config);
    debug!("Engine: {:?}", engine);

    // Step 3: Bootstrap from the base document
    let mut swagger = Swagger::new();
    if let Some(ref base_path) = args.base_path {
        info!("Merging base document...");
        let raw = fs::read_to_string(base_path)
            .with_context(|| format!("Failed to read base document {}", base_path.display()))?;
        if !SwaggerDocumentExtractor::is_signed(&raw) {
            warn!(
                "Base document {} is not a Swagger 2.0 document; ignoring it",
                base_path.display()
            );
        }
        engine
            .extract_into(&Source::Raw(&raw), &mut Target::Document(&mut swagger))
            .with_context(|| format!("Failed to merge base document {}", base_path.display()))?;
    }

    // Step 4: Definitions
    info!("Extracting definitions...");
    let definitions = extract_definitions(&engine, &registry, &config, &mut swagger)?;

    // Step 5: Operations
    info!("Extracting operations...");
    let operations = extract_operations(&engine, &registry, &config, &mut swagger)?;

    info!("Extracted {} definitions and {} operations", definitions, operations);
    Ok(swagger)
}

/// Serialize `swagger`, validating it first unless `skip_validation` is set
pub fn render(swagger: &Swagger, format: OutputFormat, skip_validation: bool) -> Result<String> {
    if skip_validation {
        warn!("Validation skipped; the document may not be valid Swagger 2.0");
        return match format {
            OutputFormat::Yaml => serialize_yaml(swagger),
            OutputFormat::Json => serialize_json(swagger),
        };
    }
    let content = match format {
        OutputFormat::Yaml => dump_yaml(swagger)?,
        OutputFormat::Json => dump_json(swagger)?,
    };
    Ok(content)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting Swagger document extraction...");

    let swagger = generate(&args)?;

    // Step 6: Validate and serialize
    info!("Serializing to {:?} format...", args.output_format);
    let content = render(&swagger, args.output_format, args.skip_validation)?;

    // Step 7: Output to file or stdout
    if let Some(ref output_path) = args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote Swagger document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    Ok(())
}
