// End-to-end tests for a timed session driven through GameServer:
// load, first guess, deferred advance, expiry, high scores and restart.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;

use tftdle::engine::candidate::{Candidate, CandidateSource, Mode};
use tftdle::engine::evaluator::GuessResult;
use tftdle::engine::lifecycle::{LifecycleSnapshot, LifecycleState, RoundLifecycle, SessionPhase};
use tftdle::engine::selector::{AssetResolver, RoundSelector};
use tftdle::engine::server::GameServer;
use tftdle::error::GameError;
use tftdle::loader;

/// Resolves after a short delay, failing a fixed set of refs.
struct SlowResolver {
    broken: HashSet<&'static str>,
    probes: AtomicUsize,
}

impl SlowResolver {
    fn new(broken: &[&'static str]) -> Self {
        Self {
            broken: broken.iter().copied().collect(),
            probes: AtomicUsize::new(0),
        }
    }
}

impl AssetResolver for SlowResolver {
    fn resolve<'a>(&'a self, image_ref: &'a str) -> BoxFuture<'a, bool> {
        self.probes.fetch_add(1, Ordering::Relaxed);
        async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            !self.broken.contains(image_ref)
        }
        .boxed()
    }
}

fn three_traits() -> CandidateSource {
    CandidateSource::new(vec![
        Candidate::new("Arcana", "arcana.svg"),
        Candidate::new("Chrono", "chrono.svg"),
        Candidate::new("Eldritch", "eldritch.svg"),
    ])
}

fn start(mode: Mode, resolver: Arc<SlowResolver>, source: CandidateSource) -> GameServer {
    let selector = RoundSelector::seeded(mode, resolver, 1234);
    GameServer::spawn(RoundLifecycle::new(selector, 60), source)
}

async fn ready(server: &GameServer) -> LifecycleSnapshot {
    let mut rx = server.subscribe();
    let snap = rx
        .wait_for(|s| s.state != LifecycleState::Loading)
        .await
        .unwrap()
        .clone();
    snap
}

fn current_name(snap: &LifecycleSnapshot) -> String {
    snap.round.as_ref().unwrap().candidate.name.clone()
}

#[tokio::test(start_paused = true)]
async fn test_full_session_lifecycle() {
    let resolver = Arc::new(SlowResolver::new(&[]));
    let server = start(Mode::Trait, resolver, three_traits());

    let snap = ready(&server).await;
    assert_eq!(snap.state, LifecycleState::Ready);
    assert_eq!(snap.session.phase, SessionPhase::NotStarted);
    let first_round = snap.round.clone().unwrap();

    // First guess starts the clock and scores per trait rules.
    let result = server.guess(current_name(&snap)).await.unwrap();
    assert_eq!(
        result,
        GuessResult {
            correct: true,
            points_awarded: 1
        }
    );
    let snap = server.snapshot();
    assert_eq!(snap.session.phase, SessionPhase::Running);
    assert_eq!(snap.session.running_score, 1);
    assert!(snap.advance_pending);
    assert_eq!(snap.round.as_ref().unwrap().number, first_round.number);

    // After the deferred delay a new round is in place.
    tokio::time::sleep(Duration::from_millis(600)).await;
    let snap = server.snapshot();
    assert!(!snap.advance_pending);
    assert_eq!(snap.round.as_ref().unwrap().number, first_round.number + 1);
    assert!(snap.last_result.is_none());

    // Run the clock out.
    tokio::time::sleep(Duration::from_secs(60)).await;
    let snap = server.snapshot();
    assert_eq!(snap.state, LifecycleState::Finished);
    assert_eq!(snap.session.phase, SessionPhase::Over);
    assert_eq!(snap.session.time_remaining_seconds, 0);
    assert_eq!(snap.session.running_score, 1);
    assert_eq!(snap.high_scores, vec![1]);

    // Score is frozen until restart.
    let err = server.guess(current_name(&snap)).await.unwrap_err();
    assert!(matches!(
        err,
        GameError::InvalidTransition {
            state: LifecycleState::Finished,
            ..
        }
    ));
    assert!(server.skip().await.is_err());
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(server.snapshot().high_scores, vec![1]);

    server.restart().await.unwrap();
    let snap = server.snapshot();
    assert_eq!(snap.state, LifecycleState::Ready);
    assert_eq!(snap.session.running_score, 0);
    assert_eq!(snap.session.time_remaining_seconds, 60);
    assert_eq!(snap.session.phase, SessionPhase::NotStarted);
    assert_eq!(snap.high_scores, vec![1]);

    server.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_high_scores_across_sessions() {
    let resolver = Arc::new(SlowResolver::new(&[]));
    let server = start(Mode::Trait, resolver, three_traits());
    ready(&server).await;

    for session in 0..8u32 {
        for _ in 0..(session % 4) {
            let name = current_name(&server.snapshot());
            assert!(server.guess(name).await.unwrap().correct);
            tokio::time::sleep(Duration::from_millis(600)).await;
        }
        server.guess("not a trait").await.unwrap();
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(server.snapshot().state, LifecycleState::Finished);

        let scores = server.snapshot().high_scores;
        assert!(scores.len() <= 6);
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(scores.len(), (session as usize + 1).min(6));

        server.restart().await.unwrap();
    }

    assert_eq!(server.snapshot().high_scores, vec![3, 3, 2, 2, 1, 1]);
}

#[tokio::test(start_paused = true)]
async fn test_broken_images_are_retried_transparently() {
    let resolver = Arc::new(SlowResolver::new(&["arcana.svg", "eldritch.svg"]));
    let server = start(Mode::Trait, resolver.clone(), three_traits());

    let snap = ready(&server).await;
    assert_eq!(current_name(&snap), "Chrono");
    for _ in 0..5 {
        server.skip().await.unwrap();
        assert_eq!(current_name(&server.snapshot()), "Chrono");
    }
    assert!(resolver.probes.load(Ordering::Relaxed) >= 6);
}

#[tokio::test(start_paused = true)]
async fn test_all_images_broken_is_fatal() {
    let resolver = Arc::new(SlowResolver::new(&["arcana.svg", "chrono.svg", "eldritch.svg"]));
    let server = start(Mode::Trait, resolver.clone(), three_traits());

    let snap = ready(&server).await;
    assert_eq!(snap.state, LifecycleState::LoadFailed);
    assert!(snap.round.is_none());
    assert_eq!(resolver.probes.load(Ordering::Relaxed), 3);

    assert!(server.guess("Arcana").await.is_err());
    tokio::time::sleep(Duration::from_secs(120)).await;
    let snap = server.snapshot();
    assert_eq!(snap.state, LifecycleState::LoadFailed);
    assert_eq!(snap.session.phase, SessionPhase::NotStarted);
}

#[tokio::test(start_paused = true)]
async fn test_skip_during_advance_delay_cancels_it() {
    let resolver = Arc::new(SlowResolver::new(&[]));
    let server = start(Mode::Trait, resolver, three_traits());
    let snap = ready(&server).await;
    let number = snap.round.as_ref().unwrap().number;

    server.guess(current_name(&snap)).await.unwrap();
    server.skip().await.unwrap();
    assert_eq!(server.snapshot().round.unwrap().number, number + 1);

    // The cancelled advance must not fire on top of the skipped round.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(server.snapshot().round.unwrap().number, number + 1);
}

#[tokio::test(start_paused = true)]
async fn test_tactician_and_augment_modes() {
    let resolver = Arc::new(SlowResolver::new(&[]));
    let server = start(
        Mode::Tactician,
        resolver.clone(),
        CandidateSource::new(vec![Candidate::new("Norra and Yuumi", "ny.png")]),
    );
    ready(&server).await;
    assert!(!server.guess("Yuumi").await.unwrap().correct);
    assert_eq!(server.guess("Norra").await.unwrap().points_awarded, 1);
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(server.guess("norra and yuumi").await.unwrap().points_awarded, 3);
    assert_eq!(server.snapshot().session.running_score, 4);
    server.shutdown().await;

    let server = start(
        Mode::Augment,
        resolver,
        CandidateSource::new(vec![Candidate::new("Sunfire Board II", "sb.png")]),
    );
    ready(&server).await;
    assert!(!server.guess("Sunfire Board II").await.unwrap().correct);
    assert_eq!(server.guess("Sunfire Board").await.unwrap().points_awarded, 2);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_server_stops_ticking() {
    let resolver = Arc::new(SlowResolver::new(&[]));
    let server = start(Mode::Trait, resolver, three_traits());
    ready(&server).await;
    server.guess("wrong").await.unwrap();

    let mut rx = server.subscribe();
    rx.borrow_and_update();
    drop(server);

    // The loop is aborted; its snapshot sender goes away with it.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(rx.changed().await.is_err());
}

#[tokio::test]
async fn test_bundled_data_files_load() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    for (mode, file) in [
        (Mode::Trait, "traits.json"),
        (Mode::Tactician, "tacticians.json"),
        (Mode::Augment, "augments.json"),
    ] {
        let source = loader::load_source(mode, &root.join(file)).await.unwrap();
        assert!(!source.is_empty(), "{file} should contain candidates");
    }
}
