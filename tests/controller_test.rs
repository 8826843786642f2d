use chargeguard::bus::SimulatedBus;
use chargeguard::config::Config;
use chargeguard::controller::{ADC_CONTROL_REGISTER, Controller, ControllerHandle};
use chargeguard::flap::{ALERT_CODE, HISTORY_DISABLED};
use chargeguard::history::HistoryLog;
use chargeguard::notify::SubscriberHub;
use chargeguard::settings::MemorySettingsStore;
use chargeguard::writer::ValidatedWriter;
use std::time::Duration;

fn build(
    store: MemorySettingsStore,
) -> (Controller, ControllerHandle, SimulatedBus, SubscriberHub) {
    let bus = SimulatedBus::new();
    let writer = ValidatedWriter::new(Box::new(bus.clone()), Box::new(store));
    let hub = SubscriberHub::new();
    let (controller, handle) =
        Controller::new(&Config::default(), writer, HistoryLog::in_memory(50), hub.clone());
    (controller, handle, bus, hub)
}

#[tokio::test]
async fn boot_replays_then_starts_adc() {
    let store = MemorySettingsStore::with_entries([("ICHG_8_0", 1000), ("EN_HIZ", 1)]);
    let (mut controller, _handle, bus, _hub) = build(store);

    let report = controller.boot().await;

    assert!(report.is_clean());
    assert_eq!(report.applied, vec!["ICHG_8_0", "EN_HIZ"]);
    let writes = bus.writes();
    assert_eq!(writes.last(), Some(&(ADC_CONTROL_REGISTER, 0xC0)));
    assert_eq!(bus.register(0x0F) & 0x04, 0x04);
}

#[tokio::test]
async fn handle_commands_are_served_by_the_loop() {
    let (mut controller, handle, bus, _hub) = build(MemorySettingsStore::new());

    let client = async {
        handle.write("ICHG_8_0", 1500).await.unwrap();
        let value = handle.read("ICHG_8_0").await.unwrap();
        let rejected = handle.write("ICHG_8_0", 9000).await.unwrap_err();
        let unknown = handle.read("NOT_A_FIELD").await.unwrap_err();
        handle.shutdown().await.unwrap();
        (value, rejected, unknown)
    };

    let ((value, rejected, unknown), ()) = tokio::join!(client, controller.run());

    assert_eq!(value, 1500);
    assert_eq!(rejected.kind(), "OutOfRange");
    assert_eq!(unknown.kind(), "UnknownField");
    assert_eq!(bus.register(0x04), 150);
}

#[tokio::test]
async fn interrupt_reaches_history_through_the_loop() {
    let (mut controller, handle, bus, hub) = build(MemorySettingsStore::new());
    let mut rx = hub.subscribe();

    let client = async {
        bus.raise_flags([0x01, 0, 0, 0, 0, 0]);
        handle.interrupt_flag().raise();

        let mut history = handle.history().await.unwrap();
        for _ in 0..200 {
            if !history.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
            history = handle.history().await.unwrap();
        }
        handle.mark_history_seen().await.unwrap();
        let seen = handle.history().await.unwrap();
        handle.shutdown().await.unwrap();
        (history, seen)
    };

    let ((history, seen), ()) = tokio::join!(client, controller.run());

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].message, r#"{"events":["VBUS_PRESENCE_CHANGE"]}"#);
    assert!(!history[0].seen);
    assert!(seen.iter().all(|e| e.seen));
    assert_eq!(rx.recv().await.unwrap(), history[0].message);
}

#[tokio::test]
async fn charge_status_bouncing_disables_charging() {
    let (mut controller, handle, bus, hub) = build(MemorySettingsStore::new());
    bus.set_register(0x0F, 0x20);
    let mut rx = hub.subscribe();
    let flag = handle.interrupt_flag();

    for i in 0..10u64 {
        bus.raise_flags([0, 0x80, 0, 0, 0, 0]);
        flag.raise();
        controller.tick(i * 100).await;
    }

    assert_eq!(bus.register(0x0F) & 0x20, 0);
    let report = controller.last_trip().unwrap();
    assert!(report.charging_disabled);
    assert_eq!(report.span_ms, 900);

    let history = controller.history().entries();
    assert_eq!(history.len(), 11);
    assert_eq!(history.last().unwrap().message, HISTORY_DISABLED);

    let mut messages = Vec::new();
    while let Ok(message) = rx.try_recv() {
        messages.push(message);
    }
    assert_eq!(messages.len(), 11);
    assert!(messages.last().unwrap().contains(ALERT_CODE));
}

#[tokio::test]
async fn requests_fail_once_loop_is_gone() {
    let (controller, handle, _bus, _hub) = build(MemorySettingsStore::new());
    drop(controller);
    let err = handle.write("EN_CHG", 1).await.unwrap_err();
    assert_eq!(err.kind(), "Channel");
}
