use anyhow::{bail, Result};
use clap::Parser;
use futures::future::join_all;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

use sitemap_links::link_extractor::{extract_links, try_extract_links, ExtractorConfig};
use sitemap_links::utils::logger::init_logger;
use sitemap_links::xml_source::{FetchConfig, XmlSource};

const MAX_CONCURRENT: usize = 4;

#[derive(Parser, Debug)]
#[command(
    name = "sitemap-links",
    about = "Extract link strings from sitemap-style XML documents",
    version
)]
struct Cli {
    /// Sitemap URLs or local XML files to process
    #[arg(required = true, value_name = "SOURCE")]
    sources: Vec<String>,

    /// Additional tag local-names whose text content is treated as a link
    #[arg(long = "tag", value_name = "NAME")]
    extra_tags: Vec<String>,

    /// Additional attribute names whose value is treated as a link
    #[arg(long = "attr", value_name = "NAME")]
    extra_attrs: Vec<String>,

    /// Emit per-source JSON reports instead of plain text
    #[arg(long)]
    json: bool,

    /// Report fetch/parse failures and exit non-zero instead of printing an
    /// empty result
    #[arg(long)]
    strict: bool,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    timeout: u64,

    /// Write logs to a timestamped file under this directory instead of stderr
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SourceReport {
    source: String,
    links: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_dir.as_deref())?;

    let extractor_config = ExtractorConfig::new()
        .with_extra_tags(cli.extra_tags.iter().cloned())
        .with_extra_attributes(cli.extra_attrs.iter().cloned());
    let fetch_config =
        FetchConfig::new().with_request_timeout(Duration::from_secs(cli.timeout));

    // Bounded concurrency across sources; each extraction stays sequential
    let mut reports = Vec::with_capacity(cli.sources.len());
    for chunk in cli.sources.chunks(MAX_CONCURRENT) {
        let futures = chunk
            .iter()
            .map(|source| process_source(source, &extractor_config, &fetch_config, cli.strict));
        reports.extend(join_all(futures).await);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("# {} ({} links)", report.source, report.links.len());
            if let Some(err) = &report.error {
                eprintln!("error: {}: {}", report.source, err);
            }
            for link in &report.links {
                println!("{}", link);
            }
        }
    }

    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    info!(sources = reports.len(), failed, "finished");
    if cli.strict && failed > 0 {
        bail!("{} of {} sources failed", failed, reports.len());
    }

    Ok(())
}

async fn process_source(
    raw: &str,
    extractor: &ExtractorConfig,
    fetch: &FetchConfig,
    strict: bool,
) -> SourceReport {
    let source = match XmlSource::from_arg(raw) {
        Ok(source) => source,
        Err(err) => {
            error!(source = raw, error = %err, "unusable source");
            return SourceReport {
                source: raw.to_string(),
                links: Vec::new(),
                error: strict.then(|| err.to_string()),
            };
        }
    };

    if strict {
        match try_extract_links(&source, extractor, fetch).await {
            Ok(links) => SourceReport {
                source: raw.to_string(),
                links,
                error: None,
            },
            Err(err) => SourceReport {
                source: raw.to_string(),
                links: Vec::new(),
                error: Some(err.to_string()),
            },
        }
    } else {
        let links = extract_links(&source, extractor, fetch).await;
        SourceReport {
            source: raw.to_string(),
            links,
            error: None,
        }
    }
}
