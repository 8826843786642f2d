use chargeguard::bus::SimulatedBus;
use chargeguard::events::{EventCode, EventSet};
use chargeguard::flap::{
    ALERT_CODE, FlapDetector, FlapState, HISTORY_DISABLE_FAILED, HISTORY_DISABLED,
};
use chargeguard::history::HistoryLog;
use chargeguard::notify::SubscriberHub;
use chargeguard::settings::MemorySettingsStore;
use chargeguard::writer::ValidatedWriter;

struct Rig {
    detector: FlapDetector,
    writer: ValidatedWriter,
    bus: SimulatedBus,
    hub: SubscriberHub,
    history: HistoryLog,
}

impl Rig {
    fn new() -> Self {
        let bus = SimulatedBus::new();
        // Charging enabled to begin with
        bus.set_register(0x0F, 0x20);
        let writer = ValidatedWriter::new(
            Box::new(bus.clone()),
            Box::new(MemorySettingsStore::new()),
        );
        Self {
            detector: FlapDetector::new(10, 4000),
            writer,
            bus,
            hub: SubscriberHub::new(),
            history: HistoryLog::in_memory(50),
        }
    }

    async fn feed(&mut self, now_ms: u64) -> bool {
        let events = EventSet::single(EventCode::ChargeStatusChange);
        self.detector
            .process(
                &events,
                now_ms,
                &mut self.writer,
                &self.hub,
                &mut self.history,
            )
            .await
            .is_some()
    }
}

#[tokio::test]
async fn fast_toggling_disables_charging_once() {
    let mut rig = Rig::new();
    let mut trips = 0;
    for i in 0..10 {
        if rig.feed(i * 100).await {
            trips += 1;
        }
    }
    assert_eq!(trips, 1);
    assert_eq!(rig.bus.writes(), vec![(0x0F, 0x00)]);
    assert_eq!(rig.detector.state(), FlapState::Armed);
    assert!(rig.detector.window().is_empty());
    assert_eq!(rig.history.entries()[0].message, HISTORY_DISABLED);
}

#[tokio::test]
async fn slow_toggling_never_trips() {
    let mut rig = Rig::new();
    for i in 0..40 {
        assert!(!rig.feed(i * 1000).await);
    }
    assert_eq!(rig.bus.write_count(), 0);
    assert!(rig.history.is_empty());
}

#[tokio::test]
async fn retrip_needs_a_full_new_window() {
    let mut rig = Rig::new();
    for i in 0..10 {
        rig.feed(i * 100).await;
    }
    for i in 0..9 {
        assert!(!rig.feed(2000 + i * 10).await);
    }
    assert!(rig.feed(2100).await);
    assert_eq!(rig.detector.trip_count(), 2);
}

#[tokio::test]
async fn alert_is_broadcast_as_json() {
    let mut rig = Rig::new();
    let mut rx = rig.hub.subscribe();
    for i in 0..10 {
        rig.feed(i * 50).await;
    }
    let alert: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(alert["alert"], ALERT_CODE);
    assert_eq!(
        alert["message"],
        "Rapid charge status toggling detected! Charging disabled."
    );
}

#[tokio::test]
async fn bus_failure_records_distinct_message() {
    let mut rig = Rig::new();
    rig.bus.fail_writes_at(0x0F);
    let mut rx = rig.hub.subscribe();
    for i in 0..10 {
        rig.feed(i * 100).await;
    }
    assert_eq!(rig.history.entries()[0].message, HISTORY_DISABLE_FAILED);
    assert_eq!(rig.bus.register(0x0F), 0x20);

    let alert: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(
        alert["message"],
        "Rapid charge status toggling detected! Failed to disable charging."
    );
    // Rearmed even though the write failed
    assert_eq!(rig.detector.state(), FlapState::Armed);
}
