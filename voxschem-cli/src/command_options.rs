//! Command line option parsing.

use std::path::PathBuf;

use clap::Parser;

use voxschem::BlockId;

use crate::config_files::SettingsArgs;
use crate::logging::LoggingArgs;

#[derive(Clone, Debug, Parser)]
#[command(
    name = "voxschem", author, about, version,
    help_template = "\
{name} {version}
{about-with-newline}
{usage-heading}
    {usage}

{all-args}{after-help}",
)]
pub(crate) struct VoxschemArgs {
    /// MagicaVoxel .vox file to convert.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Schematic file to write.
    ///
    /// If not specified, the input file name with the extension “.schematic” is used.
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Block for voxels whose color has no block, as a block id optionally followed by
    /// “:” and a metadata value.
    ///
    /// If not specified, the settings file is consulted, and otherwise 1 (stone) is used.
    #[arg(long = "default-block", value_name = "ID[:META]")]
    pub default_block: Option<BlockId>,

    /// JSON file listing the block for each palette color, replacing the built-in
    /// nearest-color matching.
    ///
    /// Its contents are an array of objects like
    /// {"color": [255, 0, 0], "numeric_id": "35:14"}.
    #[arg(long = "mapping", value_name = "FILE")]
    pub mapping: Option<PathBuf>,

    /// Index of the model to convert, if the file has more than one.
    #[arg(long = "model", value_name = "N", conflicts_with = "all_models")]
    pub model: Option<usize>,

    /// Convert every model, writing one file per model with its index inserted
    /// before the extension of OUTPUT.
    #[arg(long = "all-models")]
    pub all_models: bool,

    #[command(flatten)]
    pub logging: LoggingArgs,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory as _;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<VoxschemArgs, clap::Error> {
        VoxschemArgs::try_parse_from(std::iter::once("voxschem").chain(args.iter().copied()))
    }

    #[test]
    fn verify_cli() {
        VoxschemArgs::command().debug_assert();
    }

    #[test]
    fn minimal() {
        let args = parse(&["in.vox"]).unwrap();
        assert_eq!(args.input, PathBuf::from("in.vox"));
        assert_eq!(args.output, None);
        assert_eq!(args.default_block, None);
        assert_eq!(args.model, None);
        assert!(!args.all_models);
        assert!(!args.settings.no_config_files);
    }

    #[test]
    fn all_options() {
        let args = parse(&[
            "in.vox",
            "out.schematic",
            "--default-block=35:4",
            "--mapping",
            "colors.json",
            "--model",
            "2",
            "--no-config-files",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.output, Some(PathBuf::from("out.schematic")));
        assert_eq!(args.default_block, Some(BlockId::new(35, 4)));
        assert_eq!(args.mapping, Some(PathBuf::from("colors.json")));
        assert_eq!(args.model, Some(2));
        assert!(args.settings.no_config_files);
        assert!(args.logging.verbose);
    }

    #[test]
    fn bad_default_block() {
        let error = parse(&["in.vox", "--default-block", "stone"]).unwrap_err();
        assert_eq!(error.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn model_conflicts_with_all_models() {
        let error = parse(&["in.vox", "--model", "1", "--all-models"]).unwrap_err();
        assert_eq!(error.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
