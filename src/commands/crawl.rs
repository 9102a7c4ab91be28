//! Live-data crawl command

use colored::*;
use eyre::Result;
use std::thread;
use std::time::Duration;

use super::print_structured;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::crawler::{AgentCrawlResult, Crawler, CrawlerSettings};
use crate::protocol::Protocol;
use crate::signals::github::GithubFetcher;
use crate::signals::market::DexScreenerFetcher;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub fn run(
    protocol: &Protocol,
    config: &Config,
    watch: bool,
    cycles: Option<usize>,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let mut crawler = Crawler::new(
        protocol.store().clone(),
        Box::new(GithubFetcher::new(&config.crawler)),
        Box::new(DexScreenerFetcher::new(&config.crawler)),
        CrawlerSettings::from(&config.crawler),
    );

    if !watch {
        let report = crawler.run_cycle();
        if format != OutputFormat::Text {
            return print_structured(format, &report);
        }
        if !quiet {
            print_results(&report.results);
            println!();
            println!("Updated {} of {} agent(s)", report.agents_updated, report.results.len());
        }
        return Ok(());
    }

    crawler.start()?;
    let mut seen = 0;
    loop {
        thread::sleep(POLL_INTERVAL);
        let status = crawler.status();
        if status.cycles_run as usize <= seen {
            continue;
        }
        seen = status.cycles_run as usize;

        if format != OutputFormat::Text {
            print_structured(format, &status)?;
        } else if !quiet {
            println!(
                "{} Cycle {} finished, {} update(s) so far",
                "●".green(),
                seen,
                status.total_updates
            );
            print_results(&status.last_results);
            if let Some(next) = status.next_run {
                println!("  next run: {}", next.format("%Y-%m-%d %H:%M:%S UTC").to_string().dimmed());
            }
        }

        if cycles.is_some_and(|limit| seen >= limit) {
            break;
        }
    }
    crawler.stop();
    Ok(())
}

fn print_results(results: &[AgentCrawlResult]) {
    for result in results {
        let sources: Vec<String> = result.sources.iter().map(|s| s.to_string()).collect();
        let marker = if sources.is_empty() { "○".dimmed() } else { "✓".green() };
        println!(
            "  {} {} {} {}",
            marker,
            result.agent_name.bold(),
            format!("score {:+}", result.live_score).cyan(),
            if sources.is_empty() {
                "no sources".dimmed()
            } else {
                sources.join(", ").normal()
            }
        );
        for error in &result.errors {
            println!("      {}", error.yellow());
        }
    }
}
