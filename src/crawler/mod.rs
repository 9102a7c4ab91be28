//! Live-data crawler
//!
//! Walks every agent in the store, asks both signal sources about it and
//! overwrites the agent's live-data snapshot whenever at least one source
//! answered. A failed fetch only costs that agent/source pair its
//! contribution; the cycle always runs to the end.

use chrono::{DateTime, Utc};
use eyre::Result;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

pub mod scheduler;

use crate::config::CrawlerConfig;
use crate::registry::reputation::clamp_live_score;
use crate::registry::{AgentLiveData, AgentProfile, EntityStore, SignalSource};
use crate::signals::{MarketDataFetcher, SourceControlFetcher, score_market, score_repo};
use scheduler::RepeatingTask;

#[derive(Debug, Clone, Copy)]
pub struct CrawlerSettings {
    pub interval: Duration,
    /// Pause inserted before every source-control fetch after the first in a cycle
    pub source_control_delay: Duration,
}

impl From<&CrawlerConfig> for CrawlerSettings {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs),
            source_control_delay: Duration::from_millis(config.source_control_delay_ms),
        }
    }
}

/// Outcome for one agent in one cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCrawlResult {
    pub agent_id: String,
    pub agent_name: String,
    pub sources: Vec<SignalSource>,
    pub live_score: i32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub agents_updated: usize,
    pub results: Vec<AgentCrawlResult>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerStatus {
    pub running: bool,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
    pub cycles_run: u64,
    pub total_updates: u64,
    pub last_results: Vec<AgentCrawlResult>,
}

#[derive(Debug, Default)]
struct CrawlState {
    last_run: Option<DateTime<Utc>>,
    cycles_run: u64,
    total_updates: u64,
    last_results: Vec<AgentCrawlResult>,
}

/// Everything a cycle needs; shared with the scheduler thread
struct CrawlContext {
    store: Arc<EntityStore>,
    source_control: Box<dyn SourceControlFetcher>,
    market: Box<dyn MarketDataFetcher>,
    settings: CrawlerSettings,
    state: Mutex<CrawlState>,
}

impl CrawlContext {
    fn state(&self) -> MutexGuard<'_, CrawlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_cycle(&self) -> CycleReport {
        let started_at = Utc::now();
        let agents = self.store.list_agents();
        log::info!("Crawl cycle started for {} agent(s)", agents.len());

        let mut repo_fetched = false;
        let mut agents_updated = 0;
        let mut results = Vec::with_capacity(agents.len());

        for agent in &agents {
            let (result, live_data) = self.crawl_agent(agent, &mut repo_fetched);
            if let Some(live_data) = live_data {
                if self.store.set_live_data(&agent.id, live_data) {
                    agents_updated += 1;
                }
            }
            results.push(result);
        }

        let finished_at = Utc::now();
        log::info!(
            "Crawl cycle finished: {}/{} agent(s) updated in {}ms",
            agents_updated,
            agents.len(),
            (finished_at - started_at).num_milliseconds()
        );

        let mut state = self.state();
        state.last_run = Some(finished_at);
        state.cycles_run += 1;
        state.total_updates += agents_updated as u64;
        state.last_results = results.clone();

        CycleReport {
            started_at,
            finished_at,
            agents_updated,
            results,
        }
    }

    /// Query both sources for one agent. Live data is returned only if at
    /// least one source contributed.
    fn crawl_agent(&self, agent: &AgentProfile, repo_fetched: &mut bool) -> (AgentCrawlResult, Option<AgentLiveData>) {
        let mut live = AgentLiveData {
            github: None,
            market: None,
            crawled_at: Utc::now(),
            sources: Vec::new(),
            live_score: 0,
        };
        let mut score = 0;
        let mut errors = Vec::new();

        if let Some(repo) = agent.links.github.as_deref() {
            if *repo_fetched && !self.settings.source_control_delay.is_zero() {
                thread::sleep(self.settings.source_control_delay);
            }
            *repo_fetched = true;

            match self.source_control.fetch(repo) {
                Ok(stats) => {
                    score += score_repo(&stats, Utc::now());
                    live.github = Some(stats);
                    live.sources.push(SignalSource::SourceControl);
                }
                Err(e) => {
                    log::warn!("Source-control fetch failed for {}: {:#}", agent.name, e);
                    errors.push(format!("{}: {:#}", SignalSource::SourceControl, e));
                }
            }
        }

        match self.market.fetch(&agent.name) {
            Ok(Some(stats)) => {
                score += score_market(&stats);
                live.market = Some(stats);
                live.sources.push(SignalSource::MarketData);
            }
            Ok(None) => log::debug!("No market data mapped for {}", agent.name),
            Err(e) => {
                log::warn!("Market-data fetch failed for {}: {:#}", agent.name, e);
                errors.push(format!("{}: {:#}", SignalSource::MarketData, e));
            }
        }

        live.live_score = clamp_live_score(score);
        let result = AgentCrawlResult {
            agent_id: agent.id.clone(),
            agent_name: agent.name.clone(),
            sources: live.sources.clone(),
            live_score: live.live_score,
            errors,
        };

        let live = if live.sources.is_empty() { None } else { Some(live) };
        (result, live)
    }
}

/// Periodic live-data refresher
pub struct Crawler {
    ctx: Arc<CrawlContext>,
    task: Option<RepeatingTask>,
}

impl Crawler {
    pub fn new(
        store: Arc<EntityStore>,
        source_control: Box<dyn SourceControlFetcher>,
        market: Box<dyn MarketDataFetcher>,
        settings: CrawlerSettings,
    ) -> Self {
        Self {
            ctx: Arc::new(CrawlContext {
                store,
                source_control,
                market,
                settings,
                state: Mutex::new(CrawlState::default()),
            }),
            task: None,
        }
    }

    /// Start the recurring schedule: one cycle now, then one per interval.
    /// Calling this while already running does nothing.
    pub fn start(&mut self) -> Result<()> {
        if self.task.is_some() {
            log::debug!("Crawler already running");
            return Ok(());
        }

        let ctx = self.ctx.clone();
        let task = RepeatingTask::spawn("crawler", self.ctx.settings.interval, move || {
            ctx.run_cycle();
        })?;
        self.task = Some(task);
        log::info!("Crawler started, interval {}s", self.ctx.settings.interval.as_secs());
        Ok(())
    }

    /// Cancel the schedule. An in-flight cycle completes before this returns.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
            log::info!("Crawler stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Run one cycle on the calling thread
    pub fn run_cycle(&self) -> CycleReport {
        self.ctx.run_cycle()
    }

    pub fn status(&self) -> CrawlerStatus {
        let running = self.is_running();
        let state = self.ctx.state();
        let interval = chrono::Duration::from_std(self.ctx.settings.interval).ok();

        CrawlerStatus {
            running,
            last_run: state.last_run,
            next_run: match (running, state.last_run, interval) {
                (true, Some(last), Some(interval)) => Some(last + interval),
                _ => None,
            },
            cycles_run: state.cycles_run,
            total_updates: state.total_updates,
            last_results: state.last_results.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{AgentLinks, MarketMetrics, NewAgent, SourceControlMetrics};
    use std::collections::HashMap;
    use std::time::Instant;

    struct FakeRepos {
        stats: HashMap<String, SourceControlMetrics>,
    }

    impl SourceControlFetcher for FakeRepos {
        fn fetch(&self, repo: &str) -> Result<SourceControlMetrics> {
            self.stats
                .get(repo)
                .cloned()
                .ok_or_else(|| eyre::eyre!("HTTP 503 for {}", repo))
        }
    }

    struct FakeMarket {
        data: HashMap<String, MarketMetrics>,
        failing: Vec<String>,
    }

    impl MarketDataFetcher for FakeMarket {
        fn fetch(&self, agent_name: &str) -> Result<Option<MarketMetrics>> {
            if self.failing.iter().any(|n| n == agent_name) {
                eyre::bail!("timed out");
            }
            Ok(self.data.get(agent_name).cloned())
        }
    }

    fn repo_stats(stars: u64, commits_30d: u32) -> SourceControlMetrics {
        SourceControlMetrics {
            stars,
            forks: 1,
            open_issues: 0,
            commits_30d,
            last_push: Utc::now(),
            latest_release: Some("v1.0.0".to_string()),
        }
    }

    fn market_stats(change_24h: f64, volume_24h: f64) -> MarketMetrics {
        MarketMetrics {
            symbol: "TKN".to_string(),
            price_usd: 1.0,
            change_24h,
            volume_24h,
            liquidity_usd: Some(1.0),
            pair_address: None,
            dex: None,
        }
    }

    fn add_agent(store: &EntityStore, name: &str, github: Option<&str>) -> String {
        store.register_agent(NewAgent {
            name: name.to_string(),
            description: name.to_string(),
            links: AgentLinks {
                github: github.map(|g| g.to_string()),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    fn settings() -> CrawlerSettings {
        CrawlerSettings {
            interval: Duration::from_secs(3600),
            source_control_delay: Duration::ZERO,
        }
    }

    fn crawler(store: Arc<EntityStore>, repos: FakeRepos, market: FakeMarket) -> Crawler {
        Crawler::new(store, Box::new(repos), Box::new(market), settings())
    }

    #[test]
    fn test_cycle_merges_both_sources() {
        let store = Arc::new(EntityStore::new());
        let id = add_agent(&store, "Alpha", Some("org/alpha"));
        let repos = FakeRepos {
            stats: HashMap::from([("org/alpha".to_string(), repo_stats(20_000, 150))]),
        };
        let market = FakeMarket {
            data: HashMap::from([("Alpha".to_string(), market_stats(15.0, 5_000_000.0))]),
            failing: Vec::new(),
        };

        let report = crawler(store.clone(), repos, market).run_cycle();
        assert_eq!(report.agents_updated, 1);

        let live = store.get_agent(&id).unwrap().live_data.unwrap();
        assert_eq!(live.sources, vec![SignalSource::SourceControl, SignalSource::MarketData]);
        // 8 from the repo plus 2 from the market
        assert_eq!(live.live_score, 10);
        assert!(live.github.is_some());
        assert!(live.market.is_some());
    }

    #[test]
    fn test_failures_are_isolated() {
        let store = Arc::new(EntityStore::new());
        let a = add_agent(&store, "A", Some("org/broken"));
        let b = add_agent(&store, "B", None);
        let repos = FakeRepos { stats: HashMap::new() };
        let market = FakeMarket {
            data: HashMap::from([
                ("A".to_string(), market_stats(0.0, 10.0)),
                ("B".to_string(), market_stats(-30.0, 10.0)),
            ]),
            failing: Vec::new(),
        };

        let report = crawler(store.clone(), repos, market).run_cycle();
        assert_eq!(report.agents_updated, 2);

        let live_a = store.get_agent(&a).unwrap().live_data.unwrap();
        assert_eq!(live_a.sources, vec![SignalSource::MarketData]);
        let live_b = store.get_agent(&b).unwrap().live_data.unwrap();
        assert_eq!(live_b.live_score, -2);

        assert_eq!(report.results[0].errors.len(), 1);
        assert!(report.results[0].errors[0].starts_with("source-control"));
    }

    #[test]
    fn test_market_failure_keeps_repo_update() {
        let store = Arc::new(EntityStore::new());
        let a = add_agent(&store, "A", Some("org/a"));
        let repos = FakeRepos {
            stats: HashMap::from([("org/a".to_string(), repo_stats(500, 10))]),
        };
        let market = FakeMarket {
            data: HashMap::new(),
            failing: vec!["A".to_string()],
        };

        crawler(store.clone(), repos, market).run_cycle();
        let live = store.get_agent(&a).unwrap().live_data.unwrap();
        assert_eq!(live.sources, vec![SignalSource::SourceControl]);
        assert!(live.market.is_none());
    }

    #[test]
    fn test_unmapped_agent_keeps_previous_live_data() {
        let store = Arc::new(EntityStore::new());
        let mapped = add_agent(&store, "Mapped", None);
        let unmapped = add_agent(&store, "Unmapped", None);
        let previous = AgentLiveData {
            github: None,
            market: None,
            crawled_at: Utc::now(),
            sources: vec![SignalSource::MarketData],
            live_score: 1,
        };
        store.set_live_data(&unmapped, previous.clone());

        let repos = FakeRepos { stats: HashMap::new() };
        let market = FakeMarket {
            data: HashMap::from([("Mapped".to_string(), market_stats(0.0, 10.0))]),
            failing: Vec::new(),
        };

        let report = crawler(store.clone(), repos, market).run_cycle();
        let unmapped_result = report.results.iter().find(|r| r.agent_id == unmapped).unwrap();
        assert!(unmapped_result.sources.is_empty());
        assert!(unmapped_result.errors.is_empty());
        assert_eq!(store.get_agent(&unmapped).unwrap().live_data, Some(previous));
        assert!(store.get_agent(&mapped).unwrap().live_data.is_some());
        assert_eq!(report.agents_updated, 1);
    }

    #[test]
    fn test_live_score_always_clamped() {
        let store = Arc::new(EntityStore::new());
        let mut stats = HashMap::new();
        let mut data = HashMap::new();
        let combos = [(0, 0, -50.0, 0.0), (50_000, 100, 50.0, 1e9), (500, 10, -7.0, 1e7)];
        for (i, (stars, commits, change, volume)) in combos.iter().enumerate() {
            let name = format!("agent{}", i);
            let repo = format!("org/{}", name);
            add_agent(&store, &name, Some(&repo));
            stats.insert(repo, repo_stats(*stars, *commits));
            data.insert(name, market_stats(*change, *volume));
        }

        let report = crawler(
            store.clone(),
            FakeRepos { stats },
            FakeMarket {
                data,
                failing: Vec::new(),
            },
        )
        .run_cycle();

        for agent in store.list_agents() {
            let score = agent.live_data.unwrap().live_score;
            assert!((-10..=10).contains(&score));
        }
        assert_eq!(report.agents_updated, 3);
    }

    #[test]
    fn test_status_tracks_latest_cycle_only() {
        let store = Arc::new(EntityStore::new());
        add_agent(&store, "A", None);
        let market = FakeMarket {
            data: HashMap::from([("A".to_string(), market_stats(0.0, 10.0))]),
            failing: Vec::new(),
        };
        let crawler = crawler(store.clone(), FakeRepos { stats: HashMap::new() }, market);

        let before = crawler.status();
        assert!(!before.running);
        assert!(before.last_run.is_none());

        crawler.run_cycle();
        add_agent(&store, "B", None);
        crawler.run_cycle();

        let status = crawler.status();
        assert_eq!(status.cycles_run, 2);
        assert_eq!(status.total_updates, 2);
        assert_eq!(status.last_results.len(), 2);
        assert!(status.last_run.is_some());
        // Not scheduled, so no next run
        assert!(status.next_run.is_none());
    }

    #[test]
    fn test_source_control_delay_between_repo_fetches() {
        let store = Arc::new(EntityStore::new());
        add_agent(&store, "A", Some("org/a"));
        add_agent(&store, "B", Some("org/b"));
        add_agent(&store, "C", None);
        let repos = FakeRepos {
            stats: HashMap::from([
                ("org/a".to_string(), repo_stats(1, 1)),
                ("org/b".to_string(), repo_stats(1, 1)),
            ]),
        };
        let market = FakeMarket {
            data: HashMap::new(),
            failing: Vec::new(),
        };
        let crawler = Crawler::new(
            store,
            Box::new(repos),
            Box::new(market),
            CrawlerSettings {
                interval: Duration::from_secs(3600),
                source_control_delay: Duration::from_millis(30),
            },
        );

        let started = Instant::now();
        crawler.run_cycle();
        // Two repo fetches, so exactly one delay
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(30));
        assert!(elapsed < Duration::from_millis(500));
    }

    #[test]
    fn test_start_is_idempotent_and_stop_cancels() {
        let store = Arc::new(EntityStore::new());
        add_agent(&store, "A", None);
        let market = FakeMarket {
            data: HashMap::from([("A".to_string(), market_stats(0.0, 10.0))]),
            failing: Vec::new(),
        };
        let mut crawler = crawler(store, FakeRepos { stats: HashMap::new() }, market);

        crawler.start().unwrap();
        crawler.start().unwrap();
        assert!(crawler.is_running());

        let deadline = Instant::now() + Duration::from_secs(2);
        while crawler.status().cycles_run == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }

        let status = crawler.status();
        assert_eq!(status.cycles_run, 1);
        let next = status.next_run.unwrap();
        assert_eq!(next - status.last_run.unwrap(), chrono::Duration::seconds(3600));

        crawler.stop();
        assert!(!crawler.is_running());
        assert_eq!(crawler.status().cycles_run, 1);
        assert!(crawler.status().next_run.is_none());
    }
}
