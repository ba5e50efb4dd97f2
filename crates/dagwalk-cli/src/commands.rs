use std::fs;
use std::io::{self, Read, Write};
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use tracing::debug;

use dagwalk_codec::{decode, encode, encode_to_writer};
use dagwalk_model::{Node, Path};
use dagwalk_store::{BlockStore, FetchContext, FsBlockStore};
use dagwalk_traverse::{LinkContext, LinkSystem, Traversal, Walked};
use dagwalk_types::Cid;

use crate::cli::*;
use crate::config::CliConfig;

/// Everything a command needs: the resolved configuration and an open store.
struct Session {
    config: CliConfig,
    store: Arc<FsBlockStore>,
    format: OutputFormat,
}

impl Session {
    fn open(config: CliConfig, format: OutputFormat) -> anyhow::Result<Self> {
        let store = FsBlockStore::open(&config.store_dir)
            .with_context(|| format!("cannot open store at {}", config.store_dir.display()))?;
        debug!(store = %config.store_dir.display(), "opened block store");
        Ok(Self {
            config,
            store: Arc::new(store),
            format,
        })
    }

    fn links(&self, verify: bool) -> LinkSystem {
        LinkSystem::new(self.store.clone()).with_verification(verify || self.config.verify_blocks)
    }
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = CliConfig::discover(cli.config.as_deref())?;
    if let Some(dir) = cli.store {
        config.store_dir = dir;
    }
    let session = Session::open(config, cli.format)?;
    match cli.command {
        Command::Put(args) => cmd_put(&session, args),
        Command::Get(args) => cmd_get(&session, args),
        Command::Has(args) => cmd_has(&session, args),
        Command::Links(args) => cmd_links(&session, args),
    }
}

fn cmd_put(session: &Session, args: PutArgs) -> anyhow::Result<()> {
    let data = match &args.file {
        Some(path) => {
            fs::read(path).with_context(|| format!("cannot read {}", path.display()))?
        }
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf).context("cannot read stdin")?;
            buf
        }
    };
    let cid = put_document(session.store.as_ref(), &data)?;
    match session.format {
        OutputFormat::Text => println!("{}", cid.as_str().yellow()),
        OutputFormat::Json => println!("{}", json!({ "cid": cid })),
    }
    Ok(())
}

fn cmd_get(session: &Session, args: GetArgs) -> anyhow::Result<()> {
    let links = session.links(args.verify);
    let root = load_document(&links, &args.doc)?;

    let mut traversal = session.config.traversal.clone();
    if let Some(limit) = args.budget {
        traversal = traversal.with_link_budget(limit);
    }

    let path = Path::parse(&args.path);
    let walked = Traversal::with_config(&links, traversal)
        .walk(&FetchContext::new(), &root, &path)
        .with_context(|| format!("cannot resolve {} in {}", path, args.doc))?;

    match session.format {
        OutputFormat::Text => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            encode_to_writer(&mut out, &walked.node, true)?;
            writeln!(out)?;
        }
        OutputFormat::Json => println!("{}", walk_report(&walked)?),
    }
    Ok(())
}

fn cmd_has(session: &Session, args: HasArgs) -> anyhow::Result<()> {
    let cid = Cid::parse(&args.cid)?;
    let present = session.store.has(&FetchContext::new(), &cid)?;
    match session.format {
        OutputFormat::Text if present => println!("{} {}", "✓".green().bold(), cid.as_str().yellow()),
        OutputFormat::Text => println!("{} {} not in store", "✗".red().bold(), cid.as_str().yellow()),
        OutputFormat::Json => println!("{}", json!({ "cid": cid, "present": present })),
    }
    Ok(())
}

fn cmd_links(session: &Session, args: LinksArgs) -> anyhow::Result<()> {
    let node = load_document(&session.links(false), &args.doc)?;
    let links = node.links();
    match session.format {
        OutputFormat::Text => {
            if links.is_empty() {
                println!("No links.");
            }
            for cid in links {
                println!("  {}", cid.as_str().yellow());
            }
        }
        OutputFormat::Json => println!("{}", json!(links)),
    }
    Ok(())
}

/// Validate `data` as a document and store its canonical encoding.
fn put_document(store: &dyn BlockStore, data: &[u8]) -> anyhow::Result<Cid> {
    let node = decode(data).context("input is not a valid document")?;
    let canonical = encode(&node)?;
    let cid = store.put(&FetchContext::new(), &canonical)?;
    Ok(cid)
}

/// `@file.json` reads a local document; anything else names a block.
fn load_document(links: &LinkSystem, doc: &str) -> anyhow::Result<Node> {
    if let Some(file) = doc.strip_prefix('@') {
        let data = fs::read(file).with_context(|| format!("cannot read {file}"))?;
        return decode(&data).with_context(|| format!("{file} is not a valid document"));
    }
    let cid = Cid::parse(doc)?;
    let node = links.load(&FetchContext::new(), &cid, &LinkContext::default())?;
    Ok(node)
}

fn walk_report(walked: &Walked) -> anyhow::Result<serde_json::Value> {
    let value: serde_json::Value = serde_json::from_slice(&encode(&walked.node)?)?;
    Ok(json!({
        "path": walked.progress.path.to_string(),
        "links_resolved": walked.progress.links_resolved,
        "last_block": walked.progress.last_block.as_ref().map(|b| b.link.as_str()),
        "value": value,
    }))
}
