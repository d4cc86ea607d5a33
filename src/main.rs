//! EzSave - Command line
//!
//! Inspect and edit save data, slots and schemas from the terminal.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use ezsave::format;
use ezsave::save::{generate_random_key, DEFAULT_MAX_SLOTS};
use ezsave::value::{parse_bool, Rotator, Vector3};
use ezsave::{EzSave, FieldDescriptor, FieldType, Format, Settings, SlotId, Value};

#[derive(Parser, Debug)]
#[command(name = "ezsave", version, about = "Format-agnostic save game tool")]
struct Cli {
    /// Settings file (RON)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Base directory, overriding the settings
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// File format, overriding the settings
    #[arg(long, global = true, value_parser = parse_format)]
    format: Option<Format>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show format, file paths and counts
    Info,
    /// Write the current data (with schema defaults) to the config file
    Save,
    /// Reload the config file and report its size
    Load,
    /// List every key with its type and value
    Keys,
    /// Print a value
    Get {
        key: String,
        /// Read as this type; prints the stored value when omitted
        #[arg(long, value_enum)]
        kind: Option<Kind>,
    },
    /// Set a scalar value
    Set {
        key: String,
        value: String,
        #[arg(long, value_enum, default_value_t = Kind::String)]
        kind: Kind,
    },
    /// Set an array value
    SetArray {
        key: String,
        #[arg(long, value_enum, default_value_t = Kind::String)]
        kind: Kind,
        values: Vec<String>,
    },
    /// Remove a key
    Remove { key: String },
    /// Check the data against the schema
    Validate,
    /// List save slots
    Slots {
        #[arg(long, default_value_t = DEFAULT_MAX_SLOTS)]
        max: u32,
    },
    /// Save the current data into a slot (number, -1 or "auto")
    SaveSlot {
        #[arg(allow_negative_numbers = true)]
        slot: SlotId,
    },
    /// Load a slot into the config file
    LoadSlot {
        #[arg(allow_negative_numbers = true)]
        slot: SlotId,
    },
    /// Copy a slot
    CopySlot {
        #[arg(allow_negative_numbers = true)]
        from: SlotId,
        #[arg(allow_negative_numbers = true)]
        to: SlotId,
    },
    /// Delete a slot and its metadata
    DeleteSlot {
        #[arg(allow_negative_numbers = true)]
        slot: SlotId,
    },
    /// Edit slot metadata
    SlotMeta {
        #[arg(allow_negative_numbers = true)]
        slot: SlotId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        play_time: Option<f64>,
        #[arg(long)]
        player_level: Option<String>,
        #[arg(long)]
        character_level: Option<i32>,
        #[arg(long)]
        custom_data: Option<String>,
    },
    /// Attach a PNG screenshot to a slot
    Screenshot {
        #[arg(allow_negative_numbers = true)]
        slot: SlotId,
        file: PathBuf,
    },
    /// Save to the auto-save slot
    AutoSave,
    /// Save to the last used slot
    QuickSave,
    /// Load the last used slot
    QuickLoad,
    /// Delete all slots, config and schema
    DeleteAll {
        #[arg(long, default_value_t = DEFAULT_MAX_SLOTS)]
        max: u32,
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Schema maintenance
    #[command(subcommand)]
    Schema(SchemaCommand),
    /// Write config and schema in another format
    Convert {
        #[arg(value_parser = parse_format)]
        to: Format,
    },
    /// Print a random encryption key
    Keygen,
}

#[derive(Subcommand, Debug)]
enum SchemaCommand {
    /// Print the schema in the active format
    Show,
    /// Add a field; without a name it is called NewField{n}
    AddField {
        name: Option<String>,
        #[arg(long, value_enum, default_value_t = Kind::String)]
        kind: Kind,
        #[arg(long)]
        array: bool,
        #[arg(long, default_value = "")]
        default: String,
    },
    /// Remove a field
    RemoveField { name: String },
    /// Write the example schema and config if missing
    Examples,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Int,
    Float,
    Bool,
    String,
    Vector,
    Rotator,
}

impl From<Kind> for FieldType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Int => FieldType::Int,
            Kind::Float => FieldType::Float,
            Kind::Bool => FieldType::Bool,
            Kind::String => FieldType::String,
            Kind::Vector => FieldType::Vector,
            Kind::Rotator => FieldType::Rotator,
        }
    }
}

fn parse_format(s: &str) -> Result<Format, String> {
    s.parse().map_err(|e: ezsave::FormatError| e.to_string())
}

/// Normalise command-line text into the stored form for a kind
fn typed_text(kind: Kind, text: &str) -> Result<String> {
    Ok(match kind {
        Kind::Int => text
            .trim()
            .parse::<i64>()
            .with_context(|| format!("'{}' is not an integer", text))?
            .to_string(),
        Kind::Float => {
            let value: f64 = text.trim().parse().with_context(|| format!("'{}' is not a number", text))?;
            Value::float(value).as_scalar().unwrap_or_default().to_string()
        }
        Kind::Bool => parse_bool(text).to_string(),
        Kind::String => text.to_string(),
        Kind::Vector => Vector3::parse(text)
            .with_context(|| format!("'{}' is not x,y,z", text))?
            .to_string(),
        Kind::Rotator => Rotator::parse(text)
            .with_context(|| format!("'{}' is not pitch,yaw,roll", text))?
            .to_string(),
    })
}

fn load_settings(cli: &Cli) -> Settings {
    let path = cli.settings.clone().unwrap_or_else(Settings::default_path);
    let mut settings = Settings::load_or_default(&path);
    if let Some(root) = &cli.root {
        settings.root = Some(root.clone());
    }
    if let Some(format) = cli.format {
        settings.format = format;
    }
    settings
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    )
    .init();

    log::info!("Starting EzSave v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let settings = load_settings(&cli);
    let save = EzSave::new(settings.clone());

    run(&cli.command, &save, &settings)
}

fn run(command: &Command, save: &EzSave, settings: &Settings) -> Result<()> {
    match command {
        Command::Info => println!("{}", save.info()),
        Command::Save => {
            save.save()?;
            println!("Saved to {}", save.config_file_path().display());
        }
        Command::Load => {
            save.reload()?;
            println!("Loaded {} keys", save.snapshot().len());
        }
        Command::Keys => {
            for (key, value) in save.snapshot().iter() {
                let shape = if value.is_array() { "[]" } else { "" };
                println!("{} ({}{}) = {}", key, value.field_type, shape, value.display_text());
            }
        }
        Command::Get { key, kind } => match kind {
            None => match save.get_value(key) {
                Some(value) => println!("{}", value.display_text()),
                None => bail!("Key '{}' not found", key),
            },
            Some(Kind::Int) => println!("{}", save.get_int(key, 0)),
            Some(Kind::Float) => println!("{}", save.get_float(key, 0.0)),
            Some(Kind::Bool) => println!("{}", save.get_bool(key, false)),
            Some(Kind::String) => println!("{}", save.get_string(key, "")),
            Some(Kind::Vector) => println!("{}", save.get_vector(key, Vector3::ZERO)),
            Some(Kind::Rotator) => println!("{}", save.get_rotator(key, Rotator::ZERO)),
        },
        Command::Set { key, value, kind } => {
            save.set_value(key, Value::scalar((*kind).into(), typed_text(*kind, value)?));
            save.save()?;
            println!("{} = {}", key, value);
        }
        Command::SetArray { key, kind, values } => {
            let items = values
                .iter()
                .map(|v| typed_text(*kind, v))
                .collect::<Result<Vec<_>>>()?;
            save.set_value(key, Value::array((*kind).into(), items));
            save.save()?;
            println!("{} = [{}]", key, values.join(", "));
        }
        Command::Remove { key } => {
            if !save.remove_key(key) {
                bail!("Key '{}' not found", key);
            }
            save.save()?;
            println!("Removed {}", key);
        }
        Command::Validate => {
            let violations = save.violations();
            if violations.is_empty() {
                println!("All fields valid");
            } else {
                for violation in &violations {
                    println!("{}", violation);
                }
                bail!("{} field(s) failed validation", violations.len());
            }
        }
        Command::Slots { max } => {
            for info in save.with_slots(|slots| slots.all_slots(*max)) {
                println!("{}", info.display_text());
            }
        }
        Command::SaveSlot { slot } => {
            save.save_to_slot(*slot)?;
            println!("Saved to {}", slot);
        }
        Command::LoadSlot { slot } => {
            save.load_from_slot(*slot)?;
            save.save()?;
            println!("Loaded {}", slot);
        }
        Command::CopySlot { from, to } => {
            save.with_slots(|slots| slots.copy_slot(*from, *to))?;
            println!("Copied {} to {}", from, to);
        }
        Command::DeleteSlot { slot } => {
            save.with_slots(|slots| slots.delete_slot(*slot))?;
            println!("Deleted {}", slot);
        }
        Command::SlotMeta { slot, name, play_time, player_level, character_level, custom_data } => {
            save.with_slots(|slots| {
                let current = slots.slot_info(*slot);
                slots.update_slot_metadata(
                    *slot,
                    name.as_deref().unwrap_or(&current.slot_name),
                    play_time.unwrap_or(current.play_time),
                    player_level.as_deref().unwrap_or(&current.player_level),
                    character_level.unwrap_or(current.character_level),
                    custom_data.as_deref().unwrap_or(&current.custom_data),
                )
            })?;
            println!("Updated {}", slot);
        }
        Command::Screenshot { slot, file } => {
            let png = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
            let path = save.with_slots(|slots| slots.save_slot_screenshot(*slot, &png))?;
            println!("Screenshot stored at {}", path.display());
        }
        Command::AutoSave => {
            save.with_slots(|slots| slots.auto_save())?;
            println!("Auto-saved");
        }
        Command::QuickSave => println!("Quick saved to {}", save.quick_save()?),
        Command::QuickLoad => {
            let slot = save.quick_load()?;
            save.save()?;
            println!("Quick loaded {}", slot);
        }
        Command::DeleteAll { max, yes } => {
            if !yes {
                bail!("Refusing to delete all save data without --yes");
            }
            let deleted = save.delete_all_save_data(*max)?;
            println!("Deleted {} file(s)", deleted);
        }
        Command::Schema(schema_command) => run_schema(schema_command, save, settings)?,
        Command::Convert { to } => {
            let target = Settings { format: *to, ..settings.clone() };
            let converted = EzSave::new(target.clone());
            converted.update_schema(|schema| *schema = save.schema())?;
            converted.write(|data| *data = save.snapshot());
            converted.save()?;
            println!(
                "Wrote {} and {}",
                target.config_file_path().display(),
                target.schema_file_path().display()
            );
        }
        Command::Keygen => println!("{}", generate_random_key()),
    }
    Ok(())
}

fn run_schema(command: &SchemaCommand, save: &EzSave, settings: &Settings) -> Result<()> {
    match command {
        SchemaCommand::Show => {
            print!("{}", format::save_schema(settings.format, &save.schema())?);
        }
        SchemaCommand::AddField { name, kind, array, default } => {
            let added = save.update_schema(|schema| {
                let name = match name {
                    Some(name) => name.clone(),
                    None => schema.add_field(),
                };
                let field = if *array {
                    let items = default
                        .split(';')
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect();
                    FieldDescriptor::array(name.clone(), (*kind).into(), items)
                } else {
                    FieldDescriptor::scalar(name.clone(), (*kind).into(), default.clone())
                };
                schema.insert(field);
                name
            })?;
            save.save()?;
            println!("Added field {}", added);
        }
        SchemaCommand::RemoveField { name } => {
            let removed = save.update_schema(|schema| schema.remove_field(name).is_some())?;
            if !removed {
                bail!("Field '{}' not in schema", name);
            }
            println!("Removed field {}", name);
        }
        SchemaCommand::Examples => {
            let store_settings = Settings { create_examples_on_init: true, ..settings.clone() };
            let _examples = EzSave::new(store_settings);
            println!("Example files in {}", settings.save_dir().display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_typed_text() {
        assert_eq!(typed_text(Kind::Float, "2").unwrap(), "2.0");
        assert_eq!(typed_text(Kind::Bool, "yes").unwrap(), "true");
        assert_eq!(typed_text(Kind::Vector, "1,2,3").unwrap(), "1.0,2.0,3.0");
        assert!(typed_text(Kind::Int, "x").is_err());
        assert!(typed_text(Kind::Rotator, "1,2").is_err());
    }

    #[test]
    fn test_slot_argument() {
        let cli = Cli::try_parse_from(["ezsave", "--format", "json", "save-slot", "auto"]).unwrap();
        assert_eq!(cli.format, Some(Format::Json));
        assert!(matches!(cli.command, Command::SaveSlot { slot: SlotId::Auto }));

        let cli = Cli::try_parse_from(["ezsave", "load-slot", "-1"]).unwrap();
        assert!(matches!(cli.command, Command::LoadSlot { slot: SlotId::Auto }));
    }
}
