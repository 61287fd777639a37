//! Command-line converter from MagicaVoxel `.vox` files to block schematics.

// Crate-specific lint settings. (General settings can be found in the workspace manifest.)
#![forbid(unsafe_code)]

use anyhow::Context as _;
use clap::Parser as _;

use voxschem::ConversionOptions;

mod command_options;
use command_options::VoxschemArgs;
mod config_files;
mod logging;

fn main() -> Result<(), anyhow::Error> {
    // Destructure as a check that we're using all the args
    let VoxschemArgs {
        input,
        output,
        default_block,
        mapping,
        model,
        all_models,
        logging: logging_args,
        settings: settings_args,
    } = VoxschemArgs::parse();

    logging::install(&logging_args)?;

    let settings = settings_args.load()?;
    let explicit_mapping = mapping
        .or(settings.mapping)
        .map(|path| config_files::read_mapping_file(&path))
        .transpose()?;
    let options = ConversionOptions::new()
        .with_default_block(default_block.or(settings.default_block).unwrap_or_default())
        .with_explicit_mapping(explicit_mapping);
    let output = output.unwrap_or_else(|| input.with_extension("schematic"));

    let scene = voxschem::decode(&input)?;

    if all_models {
        let paths = scene
            .export_all(&output, &options)
            .with_context(|| format!("failed to export to '{}'", output.display()))?;
        log::info!("wrote {} schematic files", paths.len());
    } else {
        scene
            .export_model(model.unwrap_or(0), &output, &options)
            .with_context(|| format!("failed to export to '{}'", output.display()))?;
    }

    Ok(())
}
