use clap::{Arg, Command};
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use wikisync::callbacks::LogCallbacks;
use wikisync::logging::init_tracing;
use wikisync::{FsVault, MemoryWiki, SyncBuilder, SyncConfig};

/// Defaults, then the config file if one is given, then WIKISYNC_* variables
fn load_config(file: Option<&String>) -> Result<SyncConfig, Box<dyn Error>> {
	let mut config = match file {
		Some(file) => SyncConfig::load(Path::new(file))?,
		None => SyncConfig::default(),
	};
	config.apply_env()?;
	config.validate()?;
	Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
	init_tracing();

	let matches = Command::new("wikisync")
		.version(env!("CARGO_PKG_VERSION"))
		.about("Markdown vault to Wiki.js synchronization")
		.subcommand_required(true)
		.arg(
			Arg::new("file")
				.short('f')
				.long("file")
				.value_name("FILE")
				.global(true)
				.help("Configuration file (.toml, .json or .json5)"),
		)
		.subcommand(
			Command::new("preview")
				.about("Show the wiki page a note would become")
				.arg(Arg::new("vault").required(true).help("Vault directory"))
				.arg(Arg::new("note").required(true).help("Note path inside the vault")),
		)
		.subcommand(Command::new("config").about("Print the effective configuration"))
		.get_matches();

	let config = load_config(matches.get_one::<String>("file"))?;

	if let Some(sub_matches) = matches.subcommand_matches("preview") {
		let vault = sub_matches.get_one::<String>("vault").ok_or("preview: vault argument required")?;
		let note = sub_matches.get_one::<String>("note").ok_or("preview: note argument required")?;

		// Preview never contacts the wiki
		let engine = SyncBuilder::new()
			.wiki(Arc::new(MemoryWiki::new()))
			.vault(Arc::new(FsVault::new(vault)))
			.config(config)
			.callbacks(Arc::new(LogCallbacks))
			.build()?;
		let preview = engine.preview_page(note).await?;
		println!("{}", serde_json::to_string_pretty(&preview)?);
	} else if matches.subcommand_matches("config").is_some() {
		println!("{}", serde_json::to_string_pretty(&config)?);
	}

	Ok(())
}

// vim: ts=4
