use std::io::{Read, Write};

use anyhow::{bail, Context as _};
use colored::Colorize;
use snip_store::{open_store, Context, Snippet, StoreConfig, StoreError};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = effective_config(&cli)?;
    match cli.command {
        Command::Put(args) => cmd_put(&config, args).await,
        Command::Get(args) => cmd_get(&config, args).await,
        Command::Config => cmd_config(&config),
    }
}

/// Config file (or defaults) with command-line overrides applied.
fn effective_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(root) = &cli.root {
        config.fs.root = root.clone();
    }
    Ok(config)
}

async fn cmd_put(config: &StoreConfig, args: PutArgs) -> anyhow::Result<()> {
    let body = match (&args.file, args.data) {
        (Some(path), _) => std::fs::read(path)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, Some(data)) => data.into_bytes(),
        (None, None) => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf).context("reading stdin")?;
            buf
        }
    };
    let snippet = Snippet::new(body);
    let id = args.id.unwrap_or_else(|| snippet.derive_id());

    // Failing to open the store is fatal for the process.
    let store = open_store(config).context("opening snippet store")?;
    store
        .put_snippet(&Context::background(), &id, &snippet)
        .await
        .with_context(|| format!("storing snippet {id}"))?;

    println!(
        "{} Stored {} ({} bytes, {} backend)",
        "✓".green().bold(),
        id.yellow().bold(),
        snippet.len(),
        store.backend().cyan()
    );
    Ok(())
}

async fn cmd_get(config: &StoreConfig, args: GetArgs) -> anyhow::Result<()> {
    let store = open_store(config).context("opening snippet store")?;
    let snippet = match store.get_snippet(&Context::background(), &args.id).await {
        Ok(snippet) => snippet,
        Err(StoreError::NotFound) => bail!("snippet {} not found", args.id),
        Err(e) => return Err(e).with_context(|| format!("fetching snippet {}", args.id)),
    };

    match &args.out {
        Some(path) => {
            std::fs::write(path, snippet.as_bytes())
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!(
                "{} Wrote {} bytes to {}",
                "✓".green().bold(),
                snippet.len(),
                path.display().to_string().bold()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(snippet.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn cmd_config(config: &StoreConfig) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
