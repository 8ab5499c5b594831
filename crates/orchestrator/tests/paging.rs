//! Paged startup against a scripted launcher.

use std::{
    collections::HashSet,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use siege_net_peer::PeerError;
use siege_orchestrator::{ConnectReport, Orchestrator, OrchestratorConfig, PeerLauncher, PortAllocator};
use tokio::{sync::watch, time::Instant};

#[derive(Default)]
struct ScriptedLauncher {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    advertised: AtomicUsize,
    ports: Mutex<Vec<u16>>,
    failing: HashSet<usize>,
    delay: Option<Duration>,
}

impl ScriptedLauncher {
    fn failing(indices: &[usize]) -> Self {
        Self {
            failing: indices.iter().copied().collect(),
            ..Default::default()
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }
}

impl PeerLauncher for ScriptedLauncher {
    type Peer = usize;

    async fn launch(&self, index: usize, port: u16) -> Result<usize, PeerError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay.unwrap_or(Duration::from_millis(10))).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.ports.lock().unwrap().push(port);

        if self.failing.contains(&index) {
            Err(PeerError::Dial("connection refused".into()))
        } else {
            Ok(index)
        }
    }

    async fn advertise(&self, _peer: &usize) {
        self.advertised.fetch_add(1, Ordering::SeqCst);
    }
}

fn orchestrator(launcher: ScriptedLauncher, peers: usize, page: usize) -> Orchestrator<ScriptedLauncher> {
    let config = OrchestratorConfig {
        peer_count: peers,
        page_size: page,
        settle: Duration::from_secs(5),
    };
    Orchestrator::new(launcher, config, PortAllocator::default())
}

#[tokio::test(start_paused = true)]
async fn never_exceeds_one_page_in_flight() {
    let mut orchestrator = orchestrator(ScriptedLauncher::default(), 250, 100);
    let (peers, report) = orchestrator.connect_peers().await.unwrap();

    assert_eq!(
        report,
        ConnectReport {
            requested: 250,
            connected: 250,
            failed: 0,
            pages: 3,
            interrupted: false,
        }
    );
    assert_eq!(peers, (0..250).collect::<Vec<_>>());

    let launcher = orchestrator.launcher();
    assert_eq!(launcher.peak.load(Ordering::SeqCst), 100);
    assert_eq!(launcher.advertised.load(Ordering::SeqCst), 250);
}

#[tokio::test(start_paused = true)]
async fn ports_are_unique_and_start_above_base() {
    let mut orchestrator = orchestrator(ScriptedLauncher::default(), 30, 10);
    orchestrator.connect_peers().await.unwrap();

    let mut ports = orchestrator.launcher().ports.lock().unwrap().clone();
    ports.sort_unstable();
    assert_eq!(ports, (15001..15031).collect::<Vec<u16>>());
}

#[tokio::test(start_paused = true)]
async fn failed_peers_are_dropped() {
    let mut orchestrator = orchestrator(ScriptedLauncher::failing(&[3, 120]), 150, 100);
    let (peers, report) = orchestrator.connect_peers().await.unwrap();

    assert_eq!(report.connected, 148);
    assert_eq!(report.failed, 2);
    assert!(!peers.contains(&3));
    assert!(!peers.contains(&120));
    assert_eq!(
        orchestrator.launcher().advertised.load(Ordering::SeqCst),
        148
    );
}

#[tokio::test(start_paused = true)]
async fn empty_fleet_launches_nothing() {
    let mut orchestrator = orchestrator(ScriptedLauncher::default(), 0, 100);
    let (peers, report) = orchestrator.connect_peers().await.unwrap();

    assert!(peers.is_empty());
    assert_eq!(report.pages, 0);
    assert_eq!(orchestrator.launcher().peak.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn zero_page_size_is_an_error() {
    let mut orchestrator = orchestrator(ScriptedLauncher::default(), 5, 0);
    assert!(orchestrator.connect_peers().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn shutdown_during_settle_keeps_finished_pages() {
    let mut orchestrator = orchestrator(ScriptedLauncher::default(), 250, 100);
    let (tx, rx) = watch::channel(false);
    let started = Instant::now();

    let stop = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send(true).unwrap();
    });
    let (peers, report) = orchestrator.connect_peers_until(rx).await.unwrap();
    stop.await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(report.interrupted);
    assert_eq!(report.pages, 1);
    assert_eq!(peers, (0..100).collect::<Vec<_>>());
    assert_eq!(orchestrator.launcher().advertised.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn shutdown_abandons_a_slow_page() {
    let launcher = ScriptedLauncher::slow(Duration::from_secs(180));
    let mut orchestrator = orchestrator(launcher, 10, 10);
    let (tx, rx) = watch::channel(false);
    let started = Instant::now();

    let stop = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send(true).unwrap();
    });
    let (peers, report) = orchestrator.connect_peers_until(rx).await.unwrap();
    stop.await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(report.interrupted);
    assert!(peers.is_empty());
    assert_eq!(report.pages, 0);
    assert_eq!(report.connected, 0);
}

#[tokio::test]
async fn stopped_before_start_launches_nothing() {
    let mut orchestrator = orchestrator(ScriptedLauncher::default(), 5, 5);
    let (_tx, rx) = watch::channel(true);

    let (peers, report) = orchestrator.connect_peers_until(rx).await.unwrap();
    assert!(peers.is_empty());
    assert!(report.interrupted);
    assert_eq!(orchestrator.launcher().peak.load(Ordering::SeqCst), 0);
}
