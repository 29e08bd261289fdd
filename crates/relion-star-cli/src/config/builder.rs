use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use relion_star::core::io::parser::ParseOptions;
use relion_star::core::io::writer::WriteOptions;
use relion_star::workflows::defocus::DefocusGroupConfig;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

/// Merges defaults, the config file, `--set` values and command-line flags,
/// in increasing order of precedence.
pub fn build_config(cli: &Cli) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &cli.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &cli.set_values)?;

    let writer_file = file_config.writer.take().unwrap_or_default();
    let writer_args = cli.command.writer_args().cloned().unwrap_or_default();
    let write = WriteOptions {
        float_precision: writer_args
            .precision
            .or(writer_file.float_precision)
            .unwrap_or(defaults.float_precision),
        column_numbers: !writer_args.no_column_numbers
            && writer_file
                .column_numbers
                .unwrap_or(defaults.column_numbers),
        align_columns: !writer_args.no_align
            && writer_file.align_columns.unwrap_or(defaults.align_columns),
        header_comment: match writer_file.header_comment {
            Some(comment) if comment.is_empty() => None,
            Some(comment) => Some(comment),
            None => defaults.header_comment,
        },
    };

    let parser_file = file_config.parser.take().unwrap_or_default();
    let relion_types =
        !cli.no_relion_types && parser_file.relion_types.unwrap_or(defaults.relion_types);
    let mut parse = if relion_types {
        ParseOptions::relion()
    } else {
        ParseOptions::new()
    };
    if let Some(path) = cli.type_hints.as_ref().or(parser_file.type_hints.as_ref()) {
        parse = parse
            .load_hints(path)
            .map_err(|e| CliError::FileParsing {
                path: path.clone(),
                source: e.into(),
            })?;
    }

    let defocus_file = file_config.defocus_groups.take().unwrap_or_default();
    let (cli_max_range, cli_min_particles) = match &cli.command {
        Commands::DefocusGroups(args) => (args.max_range, args.min_particles),
        _ => (None, None),
    };
    let defocus = DefocusGroupConfig {
        max_range: cli_max_range
            .or(defocus_file.max_range)
            .unwrap_or(defaults.max_range),
        min_particles: cli_min_particles
            .or(defocus_file.min_particles)
            .unwrap_or(defaults.min_particles),
    };

    debug!(
        "Resolved configuration: writer {:?}, defocus {:?}, relion types {}",
        write, defocus, relion_types
    );

    Ok(AppConfig {
        parse,
        write,
        defocus,
    })
}

fn parse_value<T: FromStr>(key: &str, value_str: &str, kind: &str) -> Result<T> {
    value_str.parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value_str))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        match key {
            "writer.float-precision" => {
                config
                    .writer
                    .get_or_insert_with(Default::default)
                    .float_precision = Some(parse_value(key, value_str, "integer")?);
            }
            "writer.column-numbers" => {
                config
                    .writer
                    .get_or_insert_with(Default::default)
                    .column_numbers = Some(parse_value(key, value_str, "boolean")?);
            }
            "writer.align-columns" => {
                config
                    .writer
                    .get_or_insert_with(Default::default)
                    .align_columns = Some(parse_value(key, value_str, "boolean")?);
            }
            "writer.header-comment" => {
                config
                    .writer
                    .get_or_insert_with(Default::default)
                    .header_comment = Some(value_str.to_string());
            }
            "parser.relion-types" => {
                config
                    .parser
                    .get_or_insert_with(Default::default)
                    .relion_types = Some(parse_value(key, value_str, "boolean")?);
            }
            "parser.type-hints" => {
                config
                    .parser
                    .get_or_insert_with(Default::default)
                    .type_hints = Some(PathBuf::from(value_str));
            }
            "defocus-groups.max-range" => {
                config
                    .defocus_groups
                    .get_or_insert_with(Default::default)
                    .max_range = Some(parse_value(key, value_str, "float")?);
            }
            "defocus-groups.min-particles" => {
                config
                    .defocus_groups
                    .get_or_insert_with(Default::default)
                    .min_particles = Some(parse_value(key, value_str, "integer")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use relion_star::core::models::value::ColumnType;
    use std::fs;
    use tempfile::tempdir;

    fn parse_cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("rstar").chain(args.iter().copied()))
            .expect("valid command line")
    }

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let cli = parse_cli(&["reformat", "in.star", "-o", "out.star"]);
        let config = build_config(&cli).expect("build ok");

        assert_eq!(config.write.float_precision, 6);
        assert!(config.write.column_numbers);
        assert!(config.write.align_columns);
        assert_eq!(config.write.header_comment.as_deref(), Some("version 30001"));
        assert_eq!(config.parse.hint("rlnVoltage"), Some(ColumnType::Float));
        assert_eq!(config.defocus, DefocusGroupConfig::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("rstar.toml");
        let toml = r#"
            [writer]
            float-precision = 3
            align-columns = false
            header-comment = ""

            [parser]
            relion-types = false

            [defocus-groups]
            max-range = 500.0
            min-particles = 25
            "#;
        fs::write(&cfg_path, toml).unwrap();

        let cli = parse_cli(&[
            "defocus-groups",
            "particles@run_data.star",
            "-o",
            "out.star",
            "-c",
            cfg_path.to_str().unwrap(),
        ]);
        let config = build_config(&cli).expect("build ok");

        assert_eq!(config.write.float_precision, 3);
        assert!(!config.write.align_columns);
        assert!(config.write.column_numbers);
        assert_eq!(config.write.header_comment, None);
        assert_eq!(config.parse.hint("rlnVoltage"), None);
        assert_eq!(config.defocus.max_range, 500.0);
        assert_eq!(config.defocus.min_particles, 25);
    }

    #[test]
    fn set_values_override_file_and_flags_override_both() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("rstar.toml");
        fs::write(
            &cfg_path,
            "[writer]\nfloat-precision = 3\n[defocus-groups]\nmin-particles = 25\n",
        )
        .unwrap();

        let cli = parse_cli(&[
            "defocus-groups",
            "run_data.star",
            "-o",
            "out.star",
            "-c",
            cfg_path.to_str().unwrap(),
            "-S",
            "writer.float-precision=4",
            "-S",
            "defocus-groups.min-particles=50",
            "-S",
            "defocus-groups.max-range=750",
            "--min-particles",
            "5",
            "--no-align",
        ]);
        let config = build_config(&cli).expect("build ok");

        assert_eq!(config.write.float_precision, 4);
        assert!(!config.write.align_columns);
        assert_eq!(config.defocus.max_range, 750.0);
        assert_eq!(config.defocus.min_particles, 5);
    }

    #[test]
    fn type_hints_file_is_loaded() {
        let dir = tempdir().unwrap();
        let hints = dir.path().join("hints.toml");
        fs::write(&hints, "[labels]\nrlnMyScore = \"int\"\n").unwrap();

        let cli = parse_cli(&[
            "--type-hints",
            hints.to_str().unwrap(),
            "--no-relion-types",
            "info",
            "a.star",
        ]);
        let config = build_config(&cli).expect("build ok");
        assert_eq!(config.parse.hint("rlnMyScore"), Some(ColumnType::Int));
        assert_eq!(config.parse.hint("rlnDefocusU"), None);
    }

    #[test]
    fn invalid_set_values_are_rejected() {
        for bad in [
            "writer.float-precision",
            "writer.float-precision=six",
            "writer.unknown=1",
            "parser.relion-types=maybe",
        ] {
            let cli = parse_cli(&["info", "a.star", "-S", bad]);
            assert!(
                matches!(build_config(&cli), Err(CliError::Config(_))),
                "expected a config error for {bad}"
            );
        }
    }

    #[test]
    fn unknown_file_keys_and_missing_hints_are_reported() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("rstar.toml");
        fs::write(&cfg_path, "[writer]\nprecision = 3\n").unwrap();
        let cli = parse_cli(&["info", "a.star", "-c", cfg_path.to_str().unwrap()]);
        assert!(matches!(
            build_config(&cli),
            Err(CliError::FileParsing { .. })
        ));

        let missing = dir.path().join("missing.toml");
        let cli = parse_cli(&["info", "a.star", "--type-hints", missing.to_str().unwrap()]);
        assert!(matches!(
            build_config(&cli),
            Err(CliError::FileParsing { .. })
        ));
    }
}
