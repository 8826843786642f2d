use super::BusPort;
use crate::error::{ChargerError, Result};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Flag registers are cleared by the chip once read
const FLAG_REGISTERS: std::ops::RangeInclusive<u8> = 0x22..=0x27;

/// Self-clearing action bits: (register, mask)
const SELF_CLEARING: &[(u8, u8)] = &[
    (0x09, 0x40),
    (0x0F, 0x48),
    (0x10, 0x08),
    (0x11, 0x80),
    (0x13, 0x02),
];

#[derive(Debug)]
struct SimState {
    registers: [u8; 256],
    fail_reads: HashSet<u8>,
    fail_writes: HashSet<u8>,
    fail_burst: bool,
    writes: Vec<(u8, u8)>,
    reads: usize,
}

/// In-memory register file with fault injection
///
/// Cloning shares the register file, so a test can keep one handle while the
/// controller owns another.
#[derive(Debug, Clone)]
pub struct SimulatedBus {
    state: Arc<Mutex<SimState>>,
}

impl Default for SimulatedBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedBus {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                registers: [0; 256],
                fail_reads: HashSet::new(),
                fail_writes: HashSet::new(),
                fail_burst: false,
                writes: Vec::new(),
                reads: 0,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        // A poisoned lock only means a test panicked mid-access
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_register(&self, address: u8, value: u8) {
        self.state().registers[address as usize] = value;
    }

    pub fn register(&self, address: u8) -> u8 {
        self.state().registers[address as usize]
    }

    /// Latch the six interrupt flag bytes starting at REG22
    pub fn raise_flags(&self, flags: [u8; 6]) {
        let mut state = self.state();
        for (i, byte) in flags.iter().enumerate() {
            state.registers[*FLAG_REGISTERS.start() as usize + i] |= *byte;
        }
    }

    pub fn fail_reads_at(&self, address: u8) {
        self.state().fail_reads.insert(address);
    }

    pub fn fail_writes_at(&self, address: u8) {
        self.state().fail_writes.insert(address);
    }

    pub fn fail_bursts(&self, fail: bool) {
        self.state().fail_burst = fail;
    }

    pub fn clear_faults(&self) {
        let mut state = self.state();
        state.fail_reads.clear();
        state.fail_writes.clear();
        state.fail_burst = false;
    }

    /// Every byte written so far, in order
    pub fn writes(&self) -> Vec<(u8, u8)> {
        self.state().writes.clone()
    }

    pub fn write_count(&self) -> usize {
        self.state().writes.len()
    }

    pub fn read_count(&self) -> usize {
        self.state().reads
    }
}

impl SimState {
    fn check_read(&mut self, address: u8, len: usize) -> Result<()> {
        self.reads += 1;
        for offset in 0..len {
            let a = address.wrapping_add(offset as u8);
            if self.fail_reads.contains(&a) {
                return Err(ChargerError::bus(format!("NACK reading 0x{:02X}", a)));
            }
        }
        Ok(())
    }

    fn check_write(&self, address: u8) -> Result<()> {
        if self.fail_writes.contains(&address) {
            return Err(ChargerError::bus(format!("NACK writing 0x{:02X}", address)));
        }
        Ok(())
    }

    fn read(&mut self, address: u8) -> u8 {
        let value = self.registers[address as usize];
        if FLAG_REGISTERS.contains(&address) {
            self.registers[address as usize] = 0;
        }
        value
    }

    fn store(&mut self, address: u8, value: u8) {
        self.writes.push((address, value));
        let settled = SELF_CLEARING
            .iter()
            .filter(|(a, _)| *a == address)
            .fold(value, |v, (_, mask)| v & !mask);
        self.registers[address as usize] = settled;
    }
}

#[async_trait::async_trait(?Send)]
impl BusPort for SimulatedBus {
    async fn read_byte(&mut self, address: u8) -> Result<u8> {
        let mut state = self.state();
        state.check_read(address, 1)?;
        Ok(state.read(address))
    }

    async fn write_byte(&mut self, address: u8, value: u8) -> Result<()> {
        let mut state = self.state();
        state.check_write(address)?;
        state.store(address, value);
        Ok(())
    }

    async fn read_word(&mut self, address: u8) -> Result<u16> {
        let mut state = self.state();
        state.check_read(address, 2)?;
        let msb = state.read(address);
        let lsb = state.read(address.wrapping_add(1));
        Ok(u16::from_be_bytes([msb, lsb]))
    }

    async fn write_word(&mut self, address: u8, value: u16) -> Result<()> {
        let mut state = self.state();
        state.check_write(address)?;
        let [msb, lsb] = value.to_be_bytes();
        state.store(address, msb);
        state.store(address.wrapping_add(1), lsb);
        Ok(())
    }

    async fn read_burst(&mut self, address: u8, len: usize) -> Result<Vec<u8>> {
        let mut state = self.state();
        if state.fail_burst {
            state.reads += 1;
            return Err(ChargerError::bus("burst read aborted"));
        }
        state.check_read(address, len)?;
        Ok((0..len)
            .map(|offset| state.read(address.wrapping_add(offset as u8)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_word_is_big_endian() {
        let mut bus = SimulatedBus::new();
        bus.write_word(0x01, 0x0348).await.unwrap();
        assert_eq!(bus.register(0x01), 0x03);
        assert_eq!(bus.register(0x02), 0x48);
        assert_eq!(bus.read_word(0x01).await.unwrap(), 0x0348);
    }

    #[tokio::test]
    async fn test_flags_clear_on_read() {
        let mut bus = SimulatedBus::new();
        bus.raise_flags([0x01, 0x80, 0, 0, 0, 0]);
        assert_eq!(
            bus.read_burst(0x22, 6).await.unwrap(),
            vec![0x01, 0x80, 0, 0, 0, 0]
        );
        assert_eq!(bus.read_burst(0x22, 6).await.unwrap(), vec![0; 6]);
    }

    #[tokio::test]
    async fn test_action_bits_self_clear() {
        let mut bus = SimulatedBus::new();
        bus.write_byte(0x10, 0x0D).await.unwrap();
        assert_eq!(bus.register(0x10), 0x05);
        assert_eq!(bus.writes(), vec![(0x10, 0x0D)]);
    }

    #[tokio::test]
    async fn test_fault_injection() {
        let mut bus = SimulatedBus::new();
        bus.fail_writes_at(0x0F);
        assert!(matches!(
            bus.write_byte(0x0F, 0).await,
            Err(ChargerError::Bus { .. })
        ));
        bus.fail_bursts(true);
        assert!(bus.read_burst(0x22, 6).await.is_err());
        bus.clear_faults();
        assert!(bus.write_byte(0x0F, 0).await.is_ok());
        assert!(bus.read_burst(0x22, 6).await.is_ok());
    }

    #[test]
    fn test_clones_share_registers() {
        let bus = SimulatedBus::new();
        let other = bus.clone();
        other.set_register(0x2E, 0xC0);
        assert_eq!(bus.register(0x2E), 0xC0);
    }
}
