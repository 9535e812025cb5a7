use clap::{Parser, Subcommand};
use coros_client::FileType;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "coros")]
#[command(about = "List and export activities from the COROS training hub", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the most recent activities
    List {
        #[arg(long, default_value = "20")]
        count: u32,

        /// Activity type codes, comma separated (e.g. 100,102,200)
        #[arg(long, value_delimiter = ',', required = true)]
        modes: Vec<u32>,
    },

    /// Export one activity file
    Export {
        label_id: String,

        #[arg(long)]
        sport_type: String,

        /// csv, gpx, kml, tcx, fit or a raw numeric code
        #[arg(long, default_value = "fit")]
        format: FileType,

        /// Defaults to <LABEL_ID>.<format>
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_splits_modes() {
        let cli = Cli::try_parse_from(["coros", "list", "--count", "5", "--modes", "100,102"])
            .expect("parse");
        match cli.command {
            Commands::List { count, modes } => {
                assert_eq!(count, 5);
                assert_eq!(modes, vec![100, 102]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn list_requires_modes() {
        assert!(Cli::try_parse_from(["coros", "list"]).is_err());
    }

    #[test]
    fn export_defaults_to_fit() {
        let cli = Cli::try_parse_from(["coros", "export", "L1", "--sport-type", "100"])
            .expect("parse");
        match cli.command {
            Commands::Export {
                label_id,
                sport_type,
                format,
                output,
            } => {
                assert_eq!(label_id, "L1");
                assert_eq!(sport_type, "100");
                assert_eq!(format, FileType::FIT);
                assert!(output.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn export_accepts_named_and_numeric_formats() {
        let parse = |fmt: &str| {
            let cli = Cli::try_parse_from([
                "coros",
                "export",
                "L1",
                "--sport-type",
                "100",
                "--format",
                fmt,
            ])
            .expect("parse");
            match cli.command {
                Commands::Export { format, .. } => format,
                other => panic!("unexpected command {other:?}"),
            }
        };
        assert_eq!(parse("gpx"), FileType::GPX);
        assert_eq!(parse("TCX"), FileType::TCX);
        assert_eq!(parse("7"), FileType::from(7));
    }

    #[test]
    fn export_rejects_unknown_format_name() {
        let res = Cli::try_parse_from([
            "coros",
            "export",
            "L1",
            "--sport-type",
            "100",
            "--format",
            "shapefile",
        ]);
        assert!(res.is_err());
    }
}
