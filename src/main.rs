// opvars - resolve host and group variables from 1Password secret references
//
// This is the main entry point for the application.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use opvars::backend::CommandBackend;
use opvars::config::Config;
use opvars::init::{init_project, InitConfig};
use opvars::inventory::Entity;
use opvars::provider::VarsProvider;
use std::path::{Path, PathBuf};

/// opvars - resolve host and group variables from 1Password secret references
#[derive(Parser, Debug)]
#[command(name = "opvars")]
#[command(author = "Yanis <yanis@example.com>")]
#[command(version)]
#[command(about = "Resolve host and group variables from 1Password secret references", long_about = None)]
struct Cli {
    /// Increase diagnostic verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check prerequisites and system configuration
    Doctor {
        /// Path to the configuration file (default: opvars.yaml)
        #[arg(short, long, default_value = "opvars.yaml")]
        config: String,
    },

    /// Resolve variables for hosts and groups and print the merged result
    Resolve {
        /// Entities to resolve: NAME, host:NAME or group:NAME
        #[arg(required = true)]
        entities: Vec<String>,

        /// Path to the configuration file (default: opvars.yaml)
        #[arg(short, long, default_value = "opvars.yaml")]
        config: String,

        /// Override the inventory base directory
        #[arg(short, long)]
        inventory: Option<String>,

        /// Override the secret CLI program
        #[arg(long)]
        command: Option<String>,

        /// Output format for the merged variables
        #[arg(short, long, value_enum, default_value = "yaml")]
        format: OutputFormat,
    },

    /// Initialize a new project with an inventory skeleton
    Init {
        /// Directory to initialize (default: current directory)
        #[arg(short, long, default_value = ".")]
        dir: String,

        /// Don't create an example secrets file
        #[arg(long, default_value = "false")]
        no_example: bool,

        /// Overwrite existing files without prompting
        #[arg(long, default_value = "false")]
        force: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Yaml,
    Json,
}

fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

fn run_doctor(config_path: &str) -> Result<()> {
    println!("🔍 opvars Doctor");
    println!("Checking prerequisites...\n");

    let mut all_checks_passed = true;

    // Check 1: configuration file
    print!("1. Checking configuration file '{}'... ", config_path);
    let config = if Path::new(config_path).exists() {
        match Config::from_file(config_path).and_then(|c| c.validate().map(|_| c)) {
            Ok(config) => {
                println!("✓");
                Some(config)
            }
            Err(e) => {
                println!("✗");
                println!("   ❌ Configuration is invalid: {}", e);
                all_checks_passed = false;
                None
            }
        }
    } else {
        println!("⊘");
        println!("   ⚠️  Not found, using defaults (run 'opvars init' to create one)");
        Some(Config::default())
    };

    // Check 2: secret CLI installation
    let command = config.as_ref().map(|c| c.command.clone()).unwrap_or_else(|| "op".to_string());
    print!("2. Checking if '{}' is installed... ", command);
    if check_binary(&command) {
        println!("✓");
    } else {
        println!("✗");
        println!("   ❌ '{}' is not installed or not in PATH", command);
        println!("   📦 Install the 1Password CLI from: https://developer.1password.com/docs/cli/");
        all_checks_passed = false;
    }

    // Check 3: inventory layout
    print!("3. Checking inventory layout... ");
    if let Some(config) = &config {
        let inventory = config.inventory_path()?;
        if inventory.is_dir() {
            let host_vars = inventory.join("host_vars");
            let group_vars = inventory.join("group_vars");
            if host_vars.is_dir() || group_vars.is_dir() {
                println!("✓");
            } else {
                println!("✗");
                println!(
                    "   ❌ Neither host_vars/ nor group_vars/ found under: {}",
                    inventory.display()
                );
                println!("   💡 Run 'opvars init' to create the skeleton");
                all_checks_passed = false;
            }
        } else {
            println!("✗");
            println!("   ❌ Inventory directory not found: {}", inventory.display());
            all_checks_passed = false;
        }
    } else {
        println!("⊘");
        println!("   ⚠️  Skipped (configuration is invalid)");
    }

    println!();
    if all_checks_passed {
        println!("✅ All checks passed! Your system is ready.");
        Ok(())
    } else {
        println!("❌ Some checks failed. Please fix the issues above.");
        Err(anyhow::anyhow!("Doctor checks failed"))
    }
}

fn run_resolve(
    entity_specs: &[String],
    config_path: &str,
    inventory: Option<String>,
    command: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    // Step 1: Load configuration, falling back to defaults when overrides
    // make the file unnecessary
    let mut config = if Path::new(config_path).exists() {
        let config = Config::from_file(config_path)
            .with_context(|| format!("Failed to load config from: {}", config_path))?;
        config.validate().with_context(|| "Configuration validation failed")?;
        config
    } else {
        Config::default()
    };

    if let Some(inventory) = inventory {
        config.inventory = inventory;
    }
    if let Some(command) = command {
        config.command = command;
    }
    config.validate()?;

    // Step 2: Parse the requested entities
    let entities = entity_specs
        .iter()
        .map(|spec| Entity::parse(spec))
        .collect::<Result<Vec<_>, _>>()?;

    // Step 3: Run the resolution pipeline
    let base_path: PathBuf = config.inventory_path()?;
    let backend = CommandBackend::new(config.command.clone());
    let mut provider = VarsProvider::with_backend(&base_path, Box::new(backend));

    let vars = provider.get_vars(entities)?;

    // Step 4: Print the aggregate result
    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(&vars)
            .with_context(|| "Failed to render resolved variables as YAML")?,
        OutputFormat::Json => {
            let json = serde_json::to_value(&vars)
                .with_context(|| "Failed to render resolved variables as JSON")?;
            format!("{}\n", serde_json::to_string_pretty(&json)?)
        }
    };
    print!("{}", rendered);

    Ok(())
}

fn run_init(dir: &str, no_example: bool, force: bool) -> Result<()> {
    init_project(InitConfig {
        project_dir: PathBuf::from(dir),
        create_example: !no_example,
        force,
    })
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Doctor { config } => {
            if let Err(e) = run_doctor(&config) {
                eprintln!("\nError: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Resolve {
            entities,
            config,
            inventory,
            command,
            format,
        } => {
            if let Err(e) = run_resolve(&entities, &config, inventory, command, format) {
                eprintln!("\nError: {}", e);
                eprintln!("\n💡 Run 'opvars doctor' to check your configuration.");
                std::process::exit(1);
            }
        }
        Commands::Init {
            dir,
            no_example,
            force,
        } => {
            if let Err(e) = run_init(&dir, no_example, force) {
                eprintln!("\nError: {}", e);
                eprintln!("\n⚠️  Project initialization failed.");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
