// Copyright (c) 2026 Seitti Labs Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Seitti Labs Oy - Spider Suite Binary
 * Reads start/stop control messages from stdin, emits JSON events on
 * stdout. Diagnostics go to stderr so the event stream stays clean.
 *
 * @copyright 2026 Seitti Labs Oy
 * @license Proprietary - Enterprise Edition
 */

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use seitti::control::{parse_control_message, ControlMessage, SpiderFactory, SpiderRunner};
use seitti::dns::HickoryDns;
use seitti::events::JsonLineSink;
use seitti::fetcher::{FetchConfig, Fetcher};
use seitti::frontier::Spider;
use seitti::spiders::{
    wordpress::VulnDb, ClickjackingSpider, InjectionSpider, OpenRedirectSpider, ParamHunterSpider,
    TakeoverSpider, WordPressSpider,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SpiderVariant {
    OpenRedirect,
    Takeover,
    Clickjacking,
    Wordpress,
    ParamHunter,
    Injection,
}

#[derive(Debug, Parser)]
#[command(name = "seitti", about = "Security testing spider suite", version)]
struct Cli {
    /// Spider variant to run for each start message
    #[arg(long, value_enum)]
    spider: SpiderVariant,

    /// Known-vulnerable plugin/theme versions for WordPress recon
    #[arg(long)]
    vuln_db: Option<PathBuf>,

    /// Default findings file for runs whose start message names none
    #[arg(long)]
    findings_file: Option<PathBuf>,
}

fn build_factory(cli: &Cli) -> Result<SpiderFactory> {
    let variant = cli.spider;
    let vuln_db = match &cli.vuln_db {
        Some(path) => Some(VulnDb::load(path)?),
        None => None,
    };

    Ok(Arc::new(move |reporter, options| {
        let fetcher = Arc::new(Fetcher::new(FetchConfig::default())?.with_reporter(reporter));
        let spider: Arc<dyn Spider> = match variant {
            SpiderVariant::OpenRedirect => {
                Arc::new(OpenRedirectSpider::new(fetcher, &options.canary_host))
            }
            SpiderVariant::Takeover => {
                let dns = Arc::new(HickoryDns::new()?);
                Arc::new(TakeoverSpider::new(fetcher, dns, &options.urls))
            }
            SpiderVariant::Clickjacking => Arc::new(ClickjackingSpider::new(fetcher)),
            SpiderVariant::Wordpress => {
                let mut spider = WordPressSpider::new(fetcher);
                if let Some(db) = &vuln_db {
                    spider = spider.with_vuln_db(db.clone());
                }
                Arc::new(spider)
            }
            SpiderVariant::ParamHunter => Arc::new(ParamHunterSpider::new(fetcher)),
            SpiderVariant::Injection => Arc::new(InjectionSpider::new(fetcher)),
        };
        Ok(spider)
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!(spider = ?cli.spider, "Seitti spider suite starting");

    let factory = build_factory(&cli)?;
    let runner = SpiderRunner::new(Arc::new(JsonLineSink), factory);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_control_message(line) {
            Ok(mut message) => {
                if let ControlMessage::Start { data } = &mut message {
                    if data.findings_file.is_none() {
                        data.findings_file = cli
                            .findings_file
                            .as_ref()
                            .map(|p| p.display().to_string());
                    }
                }
                runner.handle(message).await;
            }
            Err(err) => warn!(error = %err, "Ignoring malformed control message"),
        }
    }

    // Stdin closed; let any live run finish
    runner.join().await;
    info!("Control stream closed, exiting");
    Ok(())
}
