// ABOUTME: CLI for reading ARD and ZDF Mediathek catalogs through the catalog adapters.
// ABOUTME: Prints items, channels, feeds and health reports as JSON.

mod config;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use mediathek_catalog::{
    adapter_for, adapter_is_working, publisher_for_url, Adapter, ChannelItemsOptions, Publisher,
};
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;

/// Read German public broadcaster catalogs and print normalized JSON.
#[derive(Parser, Debug)]
#[command(name = "mediathek")]
#[command(about = "Read ARD and ZDF Mediathek catalogs as normalized JSON", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/mediathek/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cache directory, overriding the config file.
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read an item by id
    Item { publisher: Publisher, id: String },
    /// Read an item from its page URL; the publisher is picked by host
    ItemUrl { url: String },
    /// Read a channel's metadata
    Channel { publisher: Publisher, id: String },
    /// List the item ids on the first page of a channel's feed
    Feed { publisher: Publisher, id: String },
    /// List every channel of a publisher
    Channels { publisher: Publisher },
    /// Read a channel together with its items
    ChannelItems {
        publisher: Publisher,
        id: String,

        /// Keep sign-language versions
        #[arg(long)]
        include_hearing_impaired: bool,

        /// Keep audio-described versions
        #[arg(long)]
        include_vision_impaired: bool,
    },
    /// Check that a publisher's adapter still works
    Check { publisher: Publisher },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(dir) = cli.cache_dir.clone() {
        config.fetch.cache_dir = Some(dir);
    }
    tracing::debug!(cache_dir = ?config.fetch.cache_dir, legacy = ?config.legacy.path, "configuration loaded");

    let fetcher = config.fetcher()?;
    let adapters = config.adapter_config()?;
    let adapter = |publisher: Publisher| -> Box<dyn Adapter> { adapter_for(publisher, fetcher.clone(), &adapters) };

    match cli.command {
        Command::Item { publisher, id } => {
            let item = adapter(publisher).read_item_by_id(&id)?;
            print_json(&item, cli.compact)
        }
        Command::ItemUrl { url } => {
            let publisher = publisher_for_url(&url).ok_or_else(|| anyhow!("no adapter handles {}", url))?;
            let item = adapter(publisher).read_item_by_url(&url)?;
            print_json(&item, cli.compact)
        }
        Command::Channel { publisher, id } => {
            let channel = adapter(publisher).read_channel(&id)?;
            print_json(&channel, cli.compact)
        }
        Command::Feed { publisher, id } => {
            let feed = adapter(publisher).read_channel_feed(&id)?;
            print_json(&feed, cli.compact)
        }
        Command::Channels { publisher } => {
            let channels = adapter(publisher).read_list_of_channels()?;
            print_json(&channels, cli.compact)
        }
        Command::ChannelItems {
            publisher,
            id,
            include_hearing_impaired,
            include_vision_impaired,
        } => {
            let options = ChannelItemsOptions {
                include_hearing_impaired,
                include_vision_impaired,
            };
            let channel = adapter(publisher).read_channel_with_items(&id, options)?;
            print_json(&channel, cli.compact)
        }
        Command::Check { publisher } => {
            let report = adapter_is_working(adapter(publisher).as_ref());
            print_json(&report, cli.compact)?;
            if report.is_error() {
                bail!("{} adapter is not working", publisher);
            }
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let out = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", out);
    Ok(())
}
