use anyhow::Context;
use clap::Parser;
use pano_bundle_core::config::DEFAULT_CONFIG_FILE;
use pano_bundle_core::{
    BuildError, BundleArtifact, BundleBuilder, BundleConfig, BundleSpec, CliOverrides, RewriteRule,
};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// pano-bundle - Bundle Panorama declaration modules into versioned .d.ts files
#[derive(Parser, Debug, Clone)]
#[command(name = "pano-bundle")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Comma-separated modules to concatenate, in order (e.g. shared,p2ce)
    #[arg(value_name = "MODULES", requires = "output_name")]
    modules: Option<String>,

    /// Bundle name; written to <OUT_DIR>/<OUTPUT_NAME>.d.ts
    #[arg(value_name = "OUTPUT_NAME")]
    output_name: Option<String>,

    /// Build a preset target from the configuration (repeatable)
    #[arg(short, long = "target", value_name = "NAME", conflicts_with = "modules")]
    targets: Vec<String>,

    /// Build every configured target
    #[arg(long, conflicts_with_all = ["modules", "targets"])]
    all: bool,

    /// Replace FROM with TO throughout the bundle body
    #[arg(long, value_name = "FROM=TO", requires = "modules")]
    rewrite: Option<String>,

    /// Version substituted into the header
    #[arg(long = "pkg-version", env = "npm_package_version", value_name = "VERSION")]
    pkg_version: Option<String>,

    /// Path to pano-bundle.yaml configuration file
    #[arg(short, long, value_name = "FILE")]
    project: Option<PathBuf>,

    /// Source root containing one directory per module
    #[arg(long, value_name = "DIR")]
    src_dir: Option<PathBuf>,

    /// Header file prepended to every bundle
    #[arg(long, value_name = "FILE")]
    header: Option<PathBuf>,

    /// Output directory for bundles
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Only bundle files directly inside each module directory
    #[arg(long)]
    no_recursive: bool,

    /// Print bundles to stdout instead of writing them
    #[arg(long)]
    dry_run: bool,

    /// Initialize a new project with a configuration file and header
    #[arg(long)]
    init: bool,
}

fn main() -> anyhow::Result<()> {
    // RUST_LOG wins when set; RUST_LOG=debug shows per-file logs
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.init {
        init_project(cli.project.as_deref())?;
        return Ok(());
    }

    if cli.modules.is_none() && cli.targets.is_empty() && !cli.all {
        anyhow::bail!(
            "Expected <MODULES> <OUTPUT_NAME>, --target <NAME> or --all. Use --help for usage information."
        );
    }

    // Configuration errors surface before any file is touched
    let version = match cli.pkg_version.as_deref() {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return Err(BuildError::MissingVersion.into()),
    };
    let rewrite = cli
        .rewrite
        .as_deref()
        .map(str::parse::<RewriteRule>)
        .transpose()?;

    let config = load_config(&cli)?;
    let specs = resolve_specs(&cli, &config, rewrite)?;

    info!("pano-bundle - version {}", version);
    debug!("Layout: {:?}", config.layout);

    let builder = BundleBuilder::new(config.layout);

    if cli.dry_run {
        return print_bundles(&builder, &specs, &version);
    }

    build_all(&builder, &specs, &version)
}

/// Initialize a new project with a configuration file and header
fn init_project(config_path: Option<&Path>) -> anyhow::Result<()> {
    println!("Initializing new pano-bundle project...");

    let config_path = config_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    let config = BundleConfig::default();

    if config_path.exists() {
        println!("{} already exists, leaving it untouched", config_path.display());
    } else {
        let yaml = format!(
            "# pano-bundle configuration\n# Targets are built with `pano-bundle --target <name>` or `--all`\n\n{}",
            config.to_yaml()?
        );
        std::fs::write(config_path, yaml)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        println!("Created {}", config_path.display());
    }

    let layout = &config.layout;
    for module in ["shared", "p2ce", "momentum"] {
        std::fs::create_dir_all(layout.module_dir(module))?;
    }
    println!("Created {}/ module directories", layout.src_dir.display());

    if !layout.header.exists() {
        let header = format!(
            "/**\n * Panorama type declarations\n * @version {}\n */\n\n",
            layout.version_placeholder
        );
        std::fs::write(&layout.header, header)?;
        println!("Created {}", layout.header.display());
    }

    println!("\nProject initialized successfully!");
    println!("Run 'pano-bundle --all --pkg-version 1.0.0' to build every bundle.");

    Ok(())
}

/// Load configuration from file (if present) and apply CLI overrides
fn load_config(cli: &Cli) -> anyhow::Result<BundleConfig> {
    let mut config = if let Some(ref project_path) = cli.project {
        BundleConfig::from_file(project_path)
            .with_context(|| format!("Failed to load config file {}", project_path.display()))?
    } else {
        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            BundleConfig::from_file(&default_path)
                .with_context(|| format!("Failed to load {}", DEFAULT_CONFIG_FILE))?
        } else {
            BundleConfig::default()
        }
    };

    let overrides = CliOverrides {
        src_dir: cli.src_dir.clone(),
        header: cli.header.clone(),
        out_dir: cli.out_dir.clone(),
        recursive: cli.no_recursive.then_some(false),
    };
    config.merge(&overrides);

    Ok(config)
}

/// Turn the positional arguments or selected targets into build specs
///
/// A positional bundle named after a configured target picks up that
/// target's rewrite unless `--rewrite` is given. Repeated targets are built
/// once.
fn resolve_specs(
    cli: &Cli,
    config: &BundleConfig,
    rewrite: Option<RewriteRule>,
) -> anyhow::Result<Vec<BundleSpec>> {
    if let (Some(modules), Some(output_name)) = (&cli.modules, &cli.output_name) {
        let mut spec = BundleSpec::from_module_list(modules, output_name.as_str());
        spec.rewrite_rule = rewrite.or_else(|| config.rewrite_for(output_name));
        return Ok(vec![spec]);
    }

    let specs: Vec<BundleSpec> = if cli.all {
        config.targets.iter().map(|t| t.to_spec()).collect()
    } else {
        cli.targets
            .iter()
            .map(|name| Ok(config.target(name)?.to_spec()))
            .collect::<anyhow::Result<_>>()?
    };

    Ok(dedup_by_output(specs))
}

/// Keep the first spec for each output name; two specs writing the same
/// file must not run in parallel
fn dedup_by_output(specs: Vec<BundleSpec>) -> Vec<BundleSpec> {
    let mut seen = HashSet::new();
    specs
        .into_iter()
        .filter(|spec| {
            let fresh = seen.insert(spec.output_name.clone());
            if !fresh {
                warn!("Skipping duplicate bundle '{}'", spec.output_name);
            }
            fresh
        })
        .collect()
}

fn print_bundles(builder: &BundleBuilder, specs: &[BundleSpec], version: &str) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for spec in specs {
        let bundle = builder
            .assemble(spec, version)
            .with_context(|| format!("Failed to assemble bundle '{}'", spec.output_name))?;
        info!(
            "{}: {} file(s), {} replacement(s)",
            spec.output_name,
            bundle.files.len(),
            bundle.replacements
        );
        out.write_all(&bundle.contents())?;
    }

    out.flush()?;
    Ok(())
}

/// Build every spec; several specs are built in parallel
fn build_all(builder: &BundleBuilder, specs: &[BundleSpec], version: &str) -> anyhow::Result<()> {
    use rayon::prelude::*;

    if let [spec] = specs {
        build_one(builder, spec, version)?;
        info!("Bundle completed successfully!");
        return Ok(());
    }

    info!("Building {} bundle(s)...", specs.len());

    let results: Vec<anyhow::Result<BundleArtifact>> = specs
        .par_iter()
        .map(|spec| build_one(builder, spec, version))
        .collect();

    let mut failures = 0;
    for result in results {
        if let Err(e) = result {
            error!("{:#}", e);
            failures += 1;
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} bundle(s) failed", failures, specs.len());
    }

    info!("All {} bundle(s) completed successfully!", specs.len());
    Ok(())
}

fn build_one(builder: &BundleBuilder, spec: &BundleSpec, version: &str) -> anyhow::Result<BundleArtifact> {
    let artifact = builder
        .build(spec, version)
        .with_context(|| format!("Failed to build bundle '{}'", spec.output_name))?;

    if let Some(ref rule) = spec.rewrite_rule {
        info!(
            "{}: rewrote {} ({} replacement(s))",
            spec.output_name, rule, artifact.replacements
        );
    }

    Ok(artifact)
}
