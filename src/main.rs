use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use std::io;
use std::path::PathBuf;
use tracing::{debug, info};

use blood_compatibility::{
    parse_spoken, AppConfig, BloodType, BloodTypeRegistry, CheckReport, CompatibilityEngine,
    Explanation, FileConfig, InteractionMode, QueryReport, ReportFormat, ReportGenerator,
    Selection,
};

/// ABO/Rh blood-type donation compatibility explorer
#[derive(Parser, Debug)]
#[command(
    name = "blood-compatibility",
    version,
    about = "Explore which blood types can give to and receive from each other",
    long_about = r#"
An educational tool for ABO/Rh blood-type compatibility:
- Find every recipient a donor type can give to
- Find every donor a recipient type can receive from
- Check a single donor/recipient pair
- Print the full 8x8 compatibility chart
- Explore interactively

Blood types may be written as labels (O-, AB+) or spelled out (ab positive, o neg, O dương).
"#
)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    format: Option<ReportFormat>,

    /// Write reports to this directory instead of stdout
    #[arg(short, long, value_name = "DIR", global = true)]
    output: Option<PathBuf>,

    /// TOML file with default mode, format and output directory
    #[arg(short, long, value_name = "FILE", env = "BLOOD_COMPAT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List compatible counterparts of a blood type
    Query {
        /// Blood type, e.g. "A+" or "a positive"
        blood_type: String,
        /// give: find recipients, receive: find donors
        #[arg(short, long, value_enum)]
        mode: Option<InteractionMode>,
    },
    /// Check whether a donor can give to a recipient
    Check { donor: String, recipient: String },
    /// Print the full donor x recipient chart
    Chart,
    /// Explain the ABO/Rh rules behind a selection
    Explain {
        blood_type: String,
        #[arg(short, long, value_enum)]
        mode: Option<InteractionMode>,
    },
    /// Pick blood types and roles from a menu
    Interactive {
        #[arg(short, long, value_enum)]
        mode: Option<InteractionMode>,
    },
    /// List the eight blood types
    Types,
    /// Generate shell completions
    Completions { shell: Shell },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        generate_completions(shell);
        return Ok(());
    }

    init_logging(cli.verbose);

    let file_config = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };

    let command_mode = match &cli.command {
        Commands::Query { mode, .. }
        | Commands::Explain { mode, .. }
        | Commands::Interactive { mode } => *mode,
        _ => None,
    };

    let config = AppConfig::resolve(file_config, command_mode, cli.format, cli.output.clone());
    debug!("Effective configuration: {:?}", config);

    match cli.command {
        Commands::Query { blood_type, .. } => run_query(&blood_type, &config),
        Commands::Check { donor, recipient } => run_check(&donor, &recipient, &config),
        Commands::Chart => run_chart(&config),
        Commands::Explain { blood_type, .. } => run_explain(&blood_type, &config),
        Commands::Interactive { .. } => run_interactive_mode(&config),
        Commands::Types => list_types(&config),
        Commands::Completions { .. } => Ok(()),
    }
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("blood_compatibility={}", level))
        .with_writer(io::stderr)
        .init();
}

fn parse_blood_type(candidate: &str) -> Result<BloodType> {
    parse_spoken(candidate).with_context(|| {
        format!(
            "Expected one of: {}",
            BloodType::all()
                .map(|id| id.label())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })
}

fn emit(config: &AppConfig, stem: &str, content: &str) -> Result<()> {
    match &config.output_dir {
        Some(dir) => {
            let path = ReportGenerator::new(config.format).write_to_dir(dir, stem, content)?;
            println!(
                "{} Report saved to: {}",
                style("✓").green().bold(),
                style(path.display()).cyan()
            );
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn run_query(candidate: &str, config: &AppConfig) -> Result<()> {
    let selected = parse_blood_type(candidate)?;
    info!("Querying {} in {} mode", selected, config.mode);

    let report = QueryReport::new(selected, config.mode);
    let content = ReportGenerator::new(config.format).render_query(&report)?;
    emit(config, &format!("query_{}", selected), &content)
}

fn run_check(donor: &str, recipient: &str, config: &AppConfig) -> Result<()> {
    let donor = parse_blood_type(donor)?;
    let recipient = parse_blood_type(recipient)?;
    let report = CheckReport::new(donor, recipient);

    if !config.prints_styled() {
        let content = ReportGenerator::new(config.format).render_check(&report)?;
        return emit(config, &format!("check_{}_{}", donor, recipient), &content);
    }

    if report.compatible {
        println!(
            "{} {} can donate to {}",
            style("✓").green().bold(),
            style(donor).bold(),
            style(recipient).bold()
        );
    } else {
        println!(
            "{} {} cannot donate to {} ({} mismatch)",
            style("✗").red().bold(),
            style(donor).bold(),
            style(recipient).bold(),
            report.mismatches().join(" and ")
        );
    }

    Ok(())
}

fn run_chart(config: &AppConfig) -> Result<()> {
    let chart = CompatibilityEngine::new().chart();
    let content = ReportGenerator::new(config.format).render_chart(&chart)?;
    emit(config, "chart", &content)
}

fn run_explain(candidate: &str, config: &AppConfig) -> Result<()> {
    let selected = parse_blood_type(candidate)?;
    let explanation = Explanation::for_selection(selected, config.mode);
    let content = ReportGenerator::new(config.format).render_explanation(&explanation)?;
    emit(config, &format!("explain_{}", selected), &content)
}

fn list_types(config: &AppConfig) -> Result<()> {
    if !config.prints_styled() {
        let content = ReportGenerator::new(config.format).render_types(BloodTypeRegistry::all())?;
        return emit(config, "types", &content);
    }

    println!("{}", style("Blood Types:").bold().cyan());
    println!();

    for entity in BloodTypeRegistry::all() {
        println!(
            "  {:<4} {} ABO group {}, Rh {}",
            style(entity.label()).red().bold(),
            style("-").dim(),
            entity.abo_group,
            entity.rh_factor
        );
    }

    Ok(())
}

fn print_selection(selection: &Selection) {
    let Some(selected) = selection.selected() else {
        println!("{}", style(Explanation::prompt()).dim());
        return;
    };

    let highlighted = selection.highlighted();
    println!();
    for id in BloodType::all() {
        let cell = format!("[{:^5}]", id.label());
        if id == selected {
            print!("{} ", style(cell).white().on_red().bold());
        } else if highlighted.contains(&id) {
            print!("{} ", style(cell).green().bold());
        } else {
            print!("{} ", style(cell).dim());
        }
    }
    println!();
    println!();

    for connection in selection.connections() {
        println!(
            "  {} {} {}",
            style(connection.from).bold(),
            style("→").red(),
            style(connection.to).bold()
        );
    }

    let explanation = Explanation::for_selection(selected, selection.mode());
    println!();
    println!("{}", explanation.summary);
    println!();
}

fn run_interactive_mode(config: &AppConfig) -> Result<()> {
    println!(
        "{}",
        style("╔══════════════════════════════════════════════════════════════╗").red()
    );
    println!(
        "{}",
        style("║        Blood Type Compatibility - Interactive Mode           ║")
            .red()
            .bold()
    );
    println!(
        "{}",
        style("╚══════════════════════════════════════════════════════════════╝").red()
    );
    println!();

    let theme = ColorfulTheme::default();
    let mut selection = Selection::new(config.mode);

    loop {
        let switch_label = format!(
            "Switch to {} mode",
            selection.mode().toggled()
        );
        let mut items: Vec<String> = BloodType::all().map(|id| id.to_string()).collect();
        items.push("Type or say a blood type...".to_string());
        items.push(switch_label);
        items.push("Quit".to_string());

        let prompt = format!(
            "Mode {} ({}), pick a blood type",
            selection.mode(),
            selection.mode().role()
        );
        let choice = Select::with_theme(&theme)
            .with_prompt(prompt)
            .default(selection.selected().map(|id| id.index()).unwrap_or(0))
            .items(&items)
            .interact()?;

        match choice {
            index if index < BloodType::COUNT => {
                selection.toggle(BloodTypeRegistry::all()[index].id);
            }
            index if index == BloodType::COUNT => {
                let candidate: String = Input::with_theme(&theme)
                    .with_prompt("Blood type")
                    .interact_text()?;
                if selection.select_str(&candidate).is_err() {
                    println!(
                        "{} Unrecognized blood type: {}",
                        style("✗").red(),
                        style(candidate.trim()).yellow()
                    );
                    continue;
                }
            }
            index if index == BloodType::COUNT + 1 => {
                let mode = selection.mode().toggled();
                selection.set_mode(mode);
            }
            _ => break,
        }

        print_selection(&selection);
    }

    Ok(())
}
