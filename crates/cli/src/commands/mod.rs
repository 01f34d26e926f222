mod submit;

use std::path::Path;

use crate::cli::Commands;
use crate::error::Result;
use crate::settings::Settings;

pub use submit::build_config;

pub fn dispatch(command: Commands, settings_path: Option<&Path>) -> Result<()> {
	match command {
		Commands::Submit(args) => {
			let settings = Settings::load(settings_path)?;
			submit::execute(&args, settings)
		}
	}
}
