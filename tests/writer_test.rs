use chargeguard::bus::SimulatedBus;
use chargeguard::error::ChargerError;
use chargeguard::registers::{FIELDS, FieldKind, STATUS_FIELDS};
use chargeguard::settings::MemorySettingsStore;
use chargeguard::writer::ValidatedWriter;

fn writer() -> (ValidatedWriter, SimulatedBus, MemorySettingsStore) {
    let bus = SimulatedBus::new();
    let store = MemorySettingsStore::new();
    let writer = ValidatedWriter::new(Box::new(bus.clone()), Box::new(store.clone()));
    (writer, bus, store)
}

#[tokio::test]
async fn every_field_enforces_its_range_boundaries() {
    for field in FIELDS {
        let (mut w, _bus, _store) = writer();

        let below = w.write(field.name, field.min - 1).await.unwrap_err();
        assert!(
            matches!(below, ChargerError::OutOfRange { .. }),
            "{} accepted min-1",
            field.name
        );
        let above = w.write(field.name, field.max + 1).await.unwrap_err();
        assert!(
            matches!(above, ChargerError::OutOfRange { .. }),
            "{} accepted max+1",
            field.name
        );

        w.write(field.name, field.min)
            .await
            .unwrap_or_else(|e| panic!("{} rejected min: {}", field.name, e));
        w.write(field.name, field.max)
            .await
            .unwrap_or_else(|e| panic!("{} rejected max: {}", field.name, e));
    }
}

#[tokio::test]
async fn out_of_range_reports_bounds() {
    let (mut w, bus, _) = writer();
    let err = w.write("VREG_10_0", 20_000).await.unwrap_err();
    match err {
        ChargerError::OutOfRange { min, max, got, .. } => {
            assert_eq!((min, max, got), (3000, 18_800, 20_000));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(bus.write_count(), 0);
}

#[tokio::test]
async fn unknown_field_touches_nothing() {
    let (mut w, bus, store) = writer();
    let err = w.write("UNKNOWN_FIELD_XYZ", 1).await.unwrap_err();
    assert_eq!(err.kind(), "UnknownField");
    assert_eq!(bus.read_count(), 0);
    assert_eq!(bus.write_count(), 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn status_fields_are_read_only() {
    for field in STATUS_FIELDS {
        let (mut w, _bus, _) = writer();
        let err = w.write(field.name, field.min).await.unwrap_err();
        assert_eq!(err.kind(), "UnknownField", "{} was writable", field.name);
    }
}

#[tokio::test]
async fn masked_write_preserves_neighbouring_bits() {
    let (mut w, bus, store) = writer();
    bus.set_register(0x18, 0xB6);
    w.write("BHOT_1_0", 1).await.unwrap();
    assert_eq!(bus.register(0x18), 0xB4);
    assert_eq!(bus.writes(), vec![(0x18, 0xB4)]);
    assert_eq!(store.get("BHOT_1_0"), Some(1));
}

#[tokio::test]
async fn word_field_write_and_read_back() {
    let (mut w, bus, store) = writer();
    w.write("VREG_10_0", 8400).await.unwrap();
    assert_eq!(bus.register(0x01), 0x03);
    assert_eq!(bus.register(0x02), 0x48);
    assert_eq!(w.read("VREG_10_0").await.unwrap(), 8400);
    assert_eq!(store.get("VREG_10_0"), Some(8400));
}

#[tokio::test]
async fn failed_write_is_not_persisted() {
    let (mut w, bus, store) = writer();
    bus.fail_writes_at(0x0F);
    let err = w.write("EN_CHG", 0).await.unwrap_err();
    assert_eq!(err.kind(), "BusError");
    assert!(store.is_empty());
}

#[tokio::test]
async fn only_persistent_fields_reach_the_store() {
    for field in FIELDS {
        let (mut w, _bus, store) = writer();
        w.write(field.name, field.max).await.unwrap();
        match field.kind {
            FieldKind::Persistent => assert_eq!(store.get(field.name), Some(field.max)),
            FieldKind::Transient | FieldKind::FactoryReset => {
                assert!(store.is_empty(), "{} was persisted", field.name)
            }
        }
    }
}
