use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dagwalk",
    about = "Walk paths through linked JSON documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Block directory (overrides the config file)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a JSON document as a block and print its identifier
    Put(PutArgs),
    /// Resolve a path through a document, following links
    Get(GetArgs),
    /// Check whether a block is in the store
    Has(HasArgs),
    /// List the links a document holds
    Links(LinksArgs),
}

#[derive(Args)]
pub struct PutArgs {
    /// JSON file to store; reads stdin when omitted
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct GetArgs {
    /// Block identifier, or @file.json for a local document
    pub doc: String,
    /// Slash-separated path; empty for the document itself
    #[arg(default_value = "")]
    pub path: String,
    /// Maximum number of links to resolve
    #[arg(long)]
    pub budget: Option<usize>,
    /// Check fetched blocks against their identifiers
    #[arg(long)]
    pub verify: bool,
}

#[derive(Args)]
pub struct HasArgs {
    pub cid: String,
}

#[derive(Args)]
pub struct LinksArgs {
    /// Block identifier, or @file.json for a local document
    pub doc: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_put_stdin() {
        let cli = Cli::try_parse_from(["dagwalk", "put"]).unwrap();
        if let Command::Put(args) = cli.command {
            assert!(args.file.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_put_file() {
        let cli = Cli::try_parse_from(["dagwalk", "put", "doc.json"]).unwrap();
        if let Command::Put(args) = cli.command {
            assert_eq!(args.file, Some(PathBuf::from("doc.json")));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_get_defaults() {
        let cli = Cli::try_parse_from(["dagwalk", "get", "bafy001"]).unwrap();
        if let Command::Get(args) = cli.command {
            assert_eq!(args.doc, "bafy001");
            assert_eq!(args.path, "");
            assert!(!args.verify);
            assert_eq!(args.budget, None);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_get_with_flags() {
        let cli = Cli::try_parse_from([
            "dagwalk", "get", "@root.json", "/a/1", "--budget", "4", "--verify",
        ])
        .unwrap();
        if let Command::Get(args) = cli.command {
            assert_eq!(args.doc, "@root.json");
            assert_eq!(args.path, "/a/1");
            assert!(args.verify);
            assert_eq!(args.budget, Some(4));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_has() {
        let cli = Cli::try_parse_from(["dagwalk", "has", "bafy001"]).unwrap();
        if let Command::Has(args) = cli.command {
            assert_eq!(args.cid, "bafy001");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_links() {
        let cli = Cli::try_parse_from(["dagwalk", "links", "@doc.json"]).unwrap();
        assert!(matches!(cli.command, Command::Links(_)));
    }

    #[test]
    fn parse_global_options() {
        let cli = Cli::try_parse_from([
            "dagwalk", "has", "bafy001", "--store", "/tmp/blocks", "--config", "dw.toml", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/blocks")));
        assert_eq!(cli.config, Some(PathBuf::from("dw.toml")));
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["dagwalk", "--format", "json", "has", "x"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn resolve_flag_is_gone() {
        assert!(Cli::try_parse_from(["dagwalk", "get", "bafy001", "--resolve"]).is_err());
    }

    #[test]
    fn missing_doc_rejected() {
        assert!(Cli::try_parse_from(["dagwalk", "get"]).is_err());
    }
}
