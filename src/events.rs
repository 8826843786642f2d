//! Interrupt flag decoding
//!
//! When the charger pulls its interrupt line it latches the cause in six
//! flag registers starting at REG22. One burst read collects all of them;
//! every set bit with a documented meaning becomes an [`EventCode`].

use crate::bus::BusPort;
use crate::logging::{StructuredLogger, get_logger};
use serde::{Serialize, Serializer};
use std::fmt;

/// First of the six flag registers
pub const FLAG_BASE: u8 = 0x22;

/// Number of flag registers read per interrupt
pub const FLAG_COUNT: usize = 6;

/// Named interrupt cause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCode {
    // REG22 Charger Flag 0
    IindpmEvent,
    VindpmEvent,
    WdExpired,
    PoorSource,
    PgStatusChange,
    Ac2PresenceChange,
    Ac1PresenceChange,
    VbusPresenceChange,
    // REG23 Charger Flag 1
    ChargeStatusChange,
    IcoStatusChange,
    VbusTypeChange,
    TregEvent,
    VbatPresenceChange,
    Bc12Done,
    // REG24 Charger Flag 2
    DpdmDone,
    AdcDone,
    VsysRegChange,
    FastChargeTimeout,
    TrickleChargeTimeout,
    PrechargeTimeout,
    TopoffTimeout,
    // REG25 Charger Flag 3
    VbatLowForOtg,
    TsColdEvent,
    TsCoolEvent,
    TsWarmEvent,
    TsHotEvent,
    // REG26 FAULT Flag 0
    IbatRegEvent,
    VbusOvpFault,
    VbatOvpFault,
    IbusOcpFault,
    IbatOcpFault,
    ConvOcpFault,
    Vac2OvpFault,
    Vac1OvpFault,
    // REG27 FAULT Flag 1
    VsysShortFault,
    VsysOvpFault,
    OtgOvpFault,
    OtgUvpFault,
    ThermalShutdown,
    /// The flag registers could not be read
    FlagReadError,
    /// The line fired but no known flag was set
    UnknownInterrupt,
}

impl EventCode {
    pub fn as_str(self) -> &'static str {
        match self {
            EventCode::IindpmEvent => "IINDPM_EVENT",
            EventCode::VindpmEvent => "VINDPM_EVENT",
            EventCode::WdExpired => "WD_EXPIRED",
            EventCode::PoorSource => "POOR_SOURCE",
            EventCode::PgStatusChange => "PG_STATUS_CHANGE",
            EventCode::Ac2PresenceChange => "AC2_PRESENCE_CHANGE",
            EventCode::Ac1PresenceChange => "AC1_PRESENCE_CHANGE",
            EventCode::VbusPresenceChange => "VBUS_PRESENCE_CHANGE",
            EventCode::ChargeStatusChange => "CHARGE_STATUS_CHANGE",
            EventCode::IcoStatusChange => "ICO_STATUS_CHANGE",
            EventCode::VbusTypeChange => "VBUS_TYPE_CHANGE",
            EventCode::TregEvent => "TREG_EVENT",
            EventCode::VbatPresenceChange => "VBAT_PRESENCE_CHANGE",
            EventCode::Bc12Done => "BC12_DONE",
            EventCode::DpdmDone => "DPDM_DONE",
            EventCode::AdcDone => "ADC_DONE",
            EventCode::VsysRegChange => "VSYS_REG_CHANGE",
            EventCode::FastChargeTimeout => "FAST_CHARGE_TIMEOUT",
            EventCode::TrickleChargeTimeout => "TRICKLE_CHARGE_TIMEOUT",
            EventCode::PrechargeTimeout => "PRECHARGE_TIMEOUT",
            EventCode::TopoffTimeout => "TOPOFF_TIMEOUT",
            EventCode::VbatLowForOtg => "VBAT_LOW_FOR_OTG",
            EventCode::TsColdEvent => "TS_COLD_EVENT",
            EventCode::TsCoolEvent => "TS_COOL_EVENT",
            EventCode::TsWarmEvent => "TS_WARM_EVENT",
            EventCode::TsHotEvent => "TS_HOT_EVENT",
            EventCode::IbatRegEvent => "IBAT_REG_EVENT",
            EventCode::VbusOvpFault => "VBUS_OVP_FAULT",
            EventCode::VbatOvpFault => "VBAT_OVP_FAULT",
            EventCode::IbusOcpFault => "IBUS_OCP_FAULT",
            EventCode::IbatOcpFault => "IBAT_OCP_FAULT",
            EventCode::ConvOcpFault => "CONV_OCP_FAULT",
            EventCode::Vac2OvpFault => "VAC2_OVP_FAULT",
            EventCode::Vac1OvpFault => "VAC1_OVP_FAULT",
            EventCode::VsysShortFault => "VSYS_SHORT_FAULT",
            EventCode::VsysOvpFault => "VSYS_OVP_FAULT",
            EventCode::OtgOvpFault => "OTG_OVP_FAULT",
            EventCode::OtgUvpFault => "OTG_UVP_FAULT",
            EventCode::ThermalShutdown => "THERMAL_SHUTDOWN",
            EventCode::FlagReadError => "FLAG_READ_ERROR",
            EventCode::UnknownInterrupt => "UNKNOWN_INTERRUPT",
        }
    }
}

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// (flag byte index, bit, event), in reporting order
///
/// Unlisted bits are reserved on the chip and ignored.
const FLAG_TABLE: &[(usize, u8, EventCode)] = &[
    (0, 7, EventCode::IindpmEvent),
    (0, 6, EventCode::VindpmEvent),
    (0, 5, EventCode::WdExpired),
    (0, 4, EventCode::PoorSource),
    (0, 3, EventCode::PgStatusChange),
    (0, 2, EventCode::Ac2PresenceChange),
    (0, 1, EventCode::Ac1PresenceChange),
    (0, 0, EventCode::VbusPresenceChange),
    (1, 7, EventCode::ChargeStatusChange),
    (1, 6, EventCode::IcoStatusChange),
    (1, 4, EventCode::VbusTypeChange),
    (1, 2, EventCode::TregEvent),
    (1, 1, EventCode::VbatPresenceChange),
    (1, 0, EventCode::Bc12Done),
    (2, 6, EventCode::DpdmDone),
    (2, 5, EventCode::AdcDone),
    (2, 4, EventCode::VsysRegChange),
    (2, 3, EventCode::FastChargeTimeout),
    (2, 2, EventCode::TrickleChargeTimeout),
    (2, 1, EventCode::PrechargeTimeout),
    (2, 0, EventCode::TopoffTimeout),
    (3, 4, EventCode::VbatLowForOtg),
    (3, 3, EventCode::TsColdEvent),
    (3, 2, EventCode::TsCoolEvent),
    (3, 1, EventCode::TsWarmEvent),
    (3, 0, EventCode::TsHotEvent),
    (4, 7, EventCode::IbatRegEvent),
    (4, 6, EventCode::VbusOvpFault),
    (4, 5, EventCode::VbatOvpFault),
    (4, 4, EventCode::IbusOcpFault),
    (4, 3, EventCode::IbatOcpFault),
    (4, 2, EventCode::ConvOcpFault),
    (4, 1, EventCode::Vac2OvpFault),
    (4, 0, EventCode::Vac1OvpFault),
    (5, 7, EventCode::VsysShortFault),
    (5, 6, EventCode::VsysOvpFault),
    (5, 5, EventCode::OtgOvpFault),
    (5, 4, EventCode::OtgUvpFault),
    (5, 2, EventCode::ThermalShutdown),
];

/// Ordered, duplicate-free set of events from one interrupt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventSet {
    events: Vec<EventCode>,
}

impl EventSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(code: EventCode) -> Self {
        Self { events: vec![code] }
    }

    pub fn insert(&mut self, code: EventCode) {
        if !self.contains(code) {
            self.events.push(code);
        }
    }

    pub fn contains(&self, code: EventCode) -> bool {
        self.events.contains(&code)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = EventCode> + '_ {
        self.events.iter().copied()
    }

    /// `{"events":[...]}` as broadcast and stored in history
    pub fn to_json(&self) -> String {
        // Unit variants serialise through `as_str`; this cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl FromIterator<EventCode> for EventSet {
    fn from_iter<T: IntoIterator<Item = EventCode>>(iter: T) -> Self {
        let mut set = EventSet::new();
        for code in iter {
            set.insert(code);
        }
        set
    }
}

/// Map six flag bytes to events; never returns an empty set
pub fn decode_flags(flags: &[u8; FLAG_COUNT]) -> EventSet {
    let set: EventSet = FLAG_TABLE
        .iter()
        .filter(|(byte, bit, _)| flags[*byte] & (1u8 << *bit) != 0)
        .map(|(_, _, code)| *code)
        .collect();
    if set.is_empty() {
        EventSet::single(EventCode::UnknownInterrupt)
    } else {
        set
    }
}

/// Reads and decodes the flag registers
pub struct EventDecoder {
    logger: StructuredLogger,
}

impl Default for EventDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDecoder {
    pub fn new() -> Self {
        Self {
            logger: get_logger("events"),
        }
    }

    /// One burst read of the flag registers
    ///
    /// A failed read is reported as [`EventCode::FlagReadError`] so the
    /// interrupt is never silently dropped.
    pub async fn decode(&self, bus: &mut dyn BusPort) -> EventSet {
        let bytes = match bus.read_burst(FLAG_BASE, FLAG_COUNT).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.logger.error(&format!("Failed to read interrupt flags: {}", e));
                return EventSet::single(EventCode::FlagReadError);
            }
        };
        let Ok(flags) = <[u8; FLAG_COUNT]>::try_from(bytes.as_slice()) else {
            self.logger.error(&format!(
                "Short flag read: expected {} bytes, got {}",
                FLAG_COUNT,
                bytes.len()
            ));
            return EventSet::single(EventCode::FlagReadError);
        };

        let events = decode_flags(&flags);
        self.logger.debug(&format!(
            "Flags {:02X?} decoded to {}",
            flags,
            events.to_json()
        ));
        events
    }
}
