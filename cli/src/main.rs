use clap::Parser;
use skald_core::Reconstruction;
use skald_types::Settings;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(version, about = "Reconstruct a battle timeline from a captured session log")]
struct Cli {
    /// Path to the captured log, or `-` to read from stdin
    log: String,

    /// Emit the timeline as JSON for the viewer
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings: Settings = confy::load("skald", None).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load settings, using defaults");
        Settings::default()
    });

    let result = if cli.log == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| e.to_string())?;
        skald_core::load_battle(&text)
    } else {
        skald_core::load_battle_file(resolve_log_path(&settings, Path::new(&cli.log)))
    };

    let reconstruction = result.map_err(|e| e.to_string())?;

    if cli.json || settings.json_output {
        let json = serde_json::to_string_pretty(&reconstruction).map_err(|e| e.to_string())?;
        println!("{json}");
    } else {
        print_timeline(&reconstruction);
    }

    Ok(())
}

/// Resolve a log path, joining with the configured log directory if
/// relative.
fn resolve_log_path(settings: &Settings, path: &Path) -> PathBuf {
    if path.is_absolute() || settings.log_directory.is_empty() {
        path.to_path_buf()
    } else {
        Path::new(&settings.log_directory).join(path)
    }
}

fn print_timeline(reconstruction: &Reconstruction) {
    let battle = &reconstruction.battle;
    println!(
        "{} ({}), room {}",
        battle.display_name, battle.game_type, battle.room_name
    );
    for (index, player) in battle.players.iter().enumerate() {
        let name = player.name.as_deref().unwrap_or("?");
        let groups: Vec<&str> = player
            .groups
            .iter()
            .filter_map(|g| g.name.as_deref())
            .collect();
        println!("  p{index} {name}: {}", groups.join(", "));
    }
    println!();

    for (index, event) in reconstruction.timeline.iter().enumerate() {
        println!("{index:4} {}", event.describe());
    }
}
