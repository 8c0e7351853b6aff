//! End-to-end rounds between a phone and a watch controller over the
//! in-memory link.

use std::time::Duration;
use tandem_client::{
    spawn_peer, spawn_primary, ControllerHandle, ControllerOptions, LinkConfig, MemoryChannel,
    MessageChannel, Snapshot,
};
use tandem_core::GameEvent;
use tandem_types::{Choice, Command, Envelope, Outcome, COMMAND_PATH};
use tokio::sync::mpsc::UnboundedReceiver;

const WAIT: Duration = Duration::from_secs(2);

async fn eventually(handle: &ControllerHandle, predicate: impl FnMut(&Snapshot) -> bool) -> Snapshot {
    tokio::time::timeout(WAIT, handle.wait_for(predicate))
        .await
        .expect("timed out waiting for controller state")
        .expect("controller stopped")
}

async fn until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(WAIT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition never held");
}

fn drain(events: &mut UnboundedReceiver<GameEvent>) -> Vec<GameEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

struct Devices {
    phone: ControllerHandle,
    phone_events: UnboundedReceiver<GameEvent>,
    watch: ControllerHandle,
    watch_events: UnboundedReceiver<GameEvent>,
    link: MemoryChannel,
}

fn devices(config: LinkConfig) -> Devices {
    let (phone_link, watch_link) = MemoryChannel::pair(config);
    let link = phone_link.clone();
    let (phone, phone_events) = spawn_primary(phone_link, ControllerOptions::default());
    let (watch, watch_events) = spawn_peer(watch_link, ControllerOptions::default());
    Devices {
        phone,
        phone_events,
        watch,
        watch_events,
        link,
    }
}

impl Devices {
    async fn shutdown(self) {
        self.phone.shutdown().await.unwrap();
        self.watch.shutdown().await.unwrap();
    }
}

// ===========================================
// Full Rounds
// ===========================================

#[tokio::test]
async fn phone_rock_beats_watch_scissors() {
    let mut d = devices(LinkConfig::lossless());

    d.phone.submit_choice(Choice::Rock).unwrap();
    d.watch.submit_choice(Choice::Scissors).unwrap();

    let phone = eventually(&d.phone, |s| s.round.is_resolved()).await;
    let watch = eventually(&d.watch, |s| s.round.is_resolved()).await;

    assert_eq!(phone.round.outcome, Some(Outcome::PrimaryWins));
    assert_eq!(watch.round.outcome, Some(Outcome::PrimaryWins));
    assert_eq!(phone.round.remote_choice, Some(Choice::Scissors));
    assert_eq!(watch.round.remote_choice, None);
    assert_eq!(watch.status, "Winner: Phone");

    assert!(drain(&mut d.phone_events).contains(&GameEvent::ResultAvailable(Outcome::PrimaryWins)));
    assert!(drain(&mut d.watch_events).contains(&GameEvent::ResultAvailable(Outcome::PrimaryWins)));

    d.shutdown().await;
}

#[tokio::test]
async fn watch_first_then_phone_draws() {
    let mut d = devices(LinkConfig::lossless());

    d.watch.submit_choice(Choice::Paper).unwrap();
    let phone = eventually(&d.phone, |s| s.round.remote_choice.is_some()).await;
    assert_eq!(phone.status, "Now choose on the phone…");
    assert!(phone.round.accepting_input);

    d.phone.submit_choice(Choice::Paper).unwrap();

    let phone = eventually(&d.phone, |s| s.round.is_resolved()).await;
    let watch = eventually(&d.watch, |s| s.round.is_resolved()).await;
    assert_eq!(phone.round.outcome, Some(Outcome::Draw));
    assert_eq!(watch.round.outcome, Some(Outcome::Draw));
    assert_eq!(watch.status, "Draw");

    let watch_events = drain(&mut d.watch_events);
    assert!(watch_events.contains(&GameEvent::ResultAvailable(Outcome::Draw)));
    assert!(!watch_events
        .iter()
        .any(|e| matches!(e, GameEvent::Unhandled(_))));

    d.shutdown().await;
}

#[tokio::test]
async fn reset_after_result_clears_both_devices() {
    let d = devices(LinkConfig::lossless());

    d.phone.submit_choice(Choice::Scissors).unwrap();
    d.watch.submit_choice(Choice::Rock).unwrap();
    eventually(&d.watch, |s| s.round.outcome == Some(Outcome::PeerWins)).await;

    d.phone.request_reset().unwrap();

    let phone = eventually(&d.phone, |s| s.round.is_initial()).await;
    let watch = eventually(&d.watch, |s| s.round.is_initial()).await;
    assert!(phone.round.accepting_input && watch.round.accepting_input);
    assert_eq!(phone.round.outcome, None);
    assert_eq!(watch.round.outcome, None);

    d.shutdown().await;
}

#[tokio::test]
async fn play_again_from_watch_starts_a_new_round() {
    let d = devices(LinkConfig::lossless());

    d.phone.submit_choice(Choice::Paper).unwrap();
    d.watch.submit_choice(Choice::Rock).unwrap();
    eventually(&d.watch, |s| s.round.is_resolved()).await;

    d.watch.request_play_again().unwrap();
    eventually(&d.phone, |s| s.round.is_initial()).await;

    d.phone.submit_choice(Choice::Rock).unwrap();
    d.watch.submit_choice(Choice::Paper).unwrap();
    let watch = eventually(&d.watch, |s| s.round.is_resolved()).await;
    assert_eq!(watch.round.outcome, Some(Outcome::PeerWins));

    d.shutdown().await;
}

#[tokio::test]
async fn delayed_link_still_agrees() {
    let config = LinkConfig::lossless()
        .with_max_delay(Duration::from_millis(20))
        .with_seed(42);
    let d = devices(config);

    d.phone.submit_choice(Choice::Scissors).unwrap();
    d.watch.submit_choice(Choice::Paper).unwrap();

    let phone = eventually(&d.phone, |s| s.round.is_resolved()).await;
    let watch = eventually(&d.watch, |s| s.round.is_resolved()).await;
    assert_eq!(phone.round.outcome, watch.round.outcome);
    assert_eq!(phone.round.outcome, Some(Outcome::PrimaryWins));

    d.shutdown().await;
}

// ===========================================
// Faults
// ===========================================

#[tokio::test]
async fn unknown_command_changes_nothing() {
    let (tester, watch_link) = MemoryChannel::pair(LinkConfig::lossless());
    let (watch, mut events) = spawn_peer(watch_link, ControllerOptions::default());
    let target = tester.remote_id().clone();

    tester
        .send(&target, &Envelope::new(COMMAND_PATH, b"RPS:FOO".to_vec()))
        .await
        .unwrap();
    tester
        .send(&target, &Envelope::new("/status", b"RPS:RESULT:WATCH".to_vec()))
        .await
        .unwrap();
    tester
        .send(&target, &Envelope::command(Command::Result(Outcome::Draw)))
        .await
        .unwrap();

    let snapshot = eventually(&watch, |s| s.round.is_resolved()).await;
    assert_eq!(snapshot.round.outcome, Some(Outcome::Draw));
    assert!(snapshot.round.local_choice.is_none());

    watch.shutdown().await.unwrap();
    let seen = drain(&mut events);
    assert_eq!(seen.first(), Some(&GameEvent::Unhandled("RPS:FOO".into())));
    assert_eq!(
        seen.iter()
            .filter(|e| matches!(e, GameEvent::Unhandled(_)))
            .count(),
        1
    );
}

#[tokio::test]
async fn duplicate_result_notifies_once() {
    let (tester, watch_link) = MemoryChannel::pair(LinkConfig::lossless());
    let (watch, mut events) = spawn_peer(watch_link, ControllerOptions::default());
    let target = tester.remote_id().clone();

    watch.submit_choice(Choice::Rock).unwrap();
    let result = Envelope::command(Command::Result(Outcome::PeerWins));
    tester.send(&target, &result).await.unwrap();
    tester.send(&target, &result).await.unwrap();

    let snapshot = eventually(&watch, |s| s.round.is_resolved()).await;
    assert_eq!(snapshot.round.outcome, Some(Outcome::PeerWins));

    watch.shutdown().await.unwrap();
    let results = drain(&mut events)
        .into_iter()
        .filter(|e| matches!(e, GameEvent::ResultAvailable(_)))
        .count();
    assert_eq!(results, 1);
}

#[tokio::test]
async fn paused_phone_misses_the_watch_choice() {
    let d = devices(LinkConfig::lossless());

    d.phone.pause().unwrap();
    eventually(&d.phone, |s| !s.attached).await;

    d.watch.submit_choice(Choice::Rock).unwrap();
    until(|| d.link.dropped_while_detached() == 1).await;

    d.phone.resume().unwrap();
    let phone = eventually(&d.phone, |s| s.attached).await;
    assert_eq!(phone.round.remote_choice, None);

    // The watch is locked out; only a reset recovers the round.
    d.phone.submit_choice(Choice::Paper).unwrap();
    let phone = eventually(&d.phone, |s| s.round.local_choice.is_some()).await;
    assert!(!phone.round.is_resolved());

    d.phone.request_reset().unwrap();
    eventually(&d.watch, |s| s.round.is_initial()).await;

    d.shutdown().await;
}

#[tokio::test]
async fn lost_messages_stall_until_reset() {
    let d = devices(LinkConfig::lossless().with_loss(1.0));

    d.phone.submit_choice(Choice::Rock).unwrap();
    d.watch.submit_choice(Choice::Paper).unwrap();
    until(|| d.link.lost_count() == 2).await;

    let phone = d.phone.snapshot();
    assert_eq!(phone.round.remote_choice, None);
    assert!(!phone.round.is_resolved());
    assert_eq!(phone.status, "Calculating winner…");

    d.phone.request_reset().unwrap();
    d.watch.request_reset().unwrap();
    eventually(&d.phone, |s| s.round.is_initial()).await;
    eventually(&d.watch, |s| s.round.is_initial()).await;

    d.shutdown().await;
}

#[tokio::test]
async fn link_down_is_not_fatal() {
    let d = devices(LinkConfig::lossless());
    d.link.set_link_up(false);

    d.phone.submit_choice(Choice::Rock).unwrap();
    let phone = eventually(&d.phone, |s| s.round.local_choice.is_some()).await;
    assert!(!phone.round.accepting_input);

    d.link.set_link_up(true);
    d.phone.request_reset().unwrap();
    eventually(&d.phone, |s| s.round.is_initial()).await;

    d.shutdown().await;
}
