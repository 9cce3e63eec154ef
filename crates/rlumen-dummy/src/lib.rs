//! rlumen-dummy - In-memory LM3554 emulator for testing
//!
//! This crate provides a dummy transport that emulates an LM3554 chip
//! behind the two-wire register protocol: a 1-byte frame latches a
//! register address for the next receive, a 2-byte frame is a register
//! write. It is useful for testing and development without real hardware,
//! and carries fault-injection hooks for exercising the retry and error
//! paths of the driver.

use rlumen_core::error::{Error, Result};
use rlumen_core::regs::Register;
use rlumen_core::transport::Transport;

/// One bus transaction as seen by the emulated chip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    /// Frame sent by the host (1-byte address or 2-byte address+value)
    Send(Vec<u8>),
    /// Reply returned to the host
    Receive(Vec<u8>),
}

/// Emulated LM3554 chip
///
/// Registers start at zero; seed them with [`set_register`] or
/// [`set_faults`] before driving the code under test.
///
/// [`set_register`]: DummyChip::set_register
/// [`set_faults`]: DummyChip::set_faults
#[derive(Debug)]
pub struct DummyChip {
    regs: [u8; 8],
    latched: Option<Register>,
    short_transfers: u32,
    fail_writes_to: Option<Register>,
    disconnected: bool,
    cancel_delays: bool,
    delays: u32,
    log: Vec<Transaction>,
}

fn reg_index(reg: Register) -> usize {
    match reg {
        Register::TorchBrightness => 0,
        Register::FlashBrightness => 1,
        Register::FlashDuration => 2,
        Register::Flag => 3,
        Register::Config1 => 4,
        Register::Config2 => 5,
        Register::VinMonitor => 6,
        Register::Gpio => 7,
    }
}

impl DummyChip {
    /// Create a new emulated chip with all registers zeroed
    pub fn new() -> Self {
        Self {
            regs: [0; 8],
            latched: None,
            short_transfers: 0,
            fail_writes_to: None,
            disconnected: false,
            cancel_delays: false,
            delays: 0,
            log: Vec::new(),
        }
    }

    /// Current value of a register
    pub fn register(&self, reg: Register) -> u8 {
        self.regs[reg_index(reg)]
    }

    /// Overwrite a register directly, bypassing the bus
    pub fn set_register(&mut self, reg: Register, value: u8) {
        self.regs[reg_index(reg)] = value;
    }

    /// Raise fault flags in the flag register
    pub fn set_faults(&mut self, raw: u8) {
        self.regs[reg_index(Register::Flag)] = raw;
    }

    /// Make the next `n` transfers report zero bytes moved
    pub fn short_transfers(&mut self, n: u32) {
        self.short_transfers = n;
    }

    /// Make every write frame addressed to `reg` come up short
    pub fn fail_writes_to(&mut self, reg: Option<Register>) {
        self.fail_writes_to = reg;
    }

    /// Simulate the device dropping off the bus
    pub fn set_disconnected(&mut self, disconnected: bool) {
        self.disconnected = disconnected;
    }

    /// Interrupt every retry pause with a cancellation
    pub fn cancel_delays(&mut self, cancel: bool) {
        self.cancel_delays = cancel;
    }

    /// Number of retry pauses requested so far
    pub fn delay_count(&self) -> u32 {
        self.delays
    }

    /// Transaction log since the last [`clear_log`](DummyChip::clear_log)
    pub fn log(&self) -> &[Transaction] {
        &self.log
    }

    /// Drop the recorded transactions
    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

impl Default for DummyChip {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for DummyChip {
    fn send(&mut self, bytes: &[u8]) -> Result<usize> {
        if self.disconnected {
            return Err(Error::NoDevice);
        }
        self.log.push(Transaction::Send(bytes.to_vec()));

        if self.short_transfers > 0 {
            self.short_transfers -= 1;
            log::trace!("dummy: dropping transfer (scripted short)");
            return Ok(0);
        }

        match *bytes {
            [addr] => {
                let reg = Register::from_addr(addr).ok_or(Error::BusError)?;
                self.latched = Some(reg);
                Ok(1)
            }
            [addr, value] => {
                let reg = Register::from_addr(addr).ok_or(Error::BusError)?;
                if self.fail_writes_to == Some(reg) {
                    log::trace!("dummy: dropping write to {:#04x} (scripted)", addr);
                    return Ok(1);
                }
                self.regs[reg_index(reg)] = value;
                Ok(2)
            }
            _ => Err(Error::BusError),
        }
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.disconnected {
            return Err(Error::NoDevice);
        }

        if self.short_transfers > 0 {
            self.short_transfers -= 1;
            self.log.push(Transaction::Receive(Vec::new()));
            return Ok(0);
        }

        let reg = self.latched.ok_or(Error::BusError)?;
        if buf.is_empty() {
            return Err(Error::InvalidArgument);
        }
        buf[0] = self.regs[reg_index(reg)];
        self.log.push(Transaction::Receive(vec![buf[0]]));
        Ok(1)
    }

    fn delay_ms(&mut self, _ms: u32) -> Result<()> {
        self.delays += 1;
        if self.cancel_delays {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlumen_core::access::{read_reg, write_reg, MAX_RW_RETRIES};
    use rlumen_core::device::Lm3554;
    use rlumen_core::regs::{
        Defaults, FaultFlags, CONFIG1_STROBE, CONFIG2_VIN_MONITOR, TORCH_ENABLE,
    };
    use rlumen_core::shared::SharedLm3554;

    const ALL_REGS: [Register; 8] = [
        Register::TorchBrightness,
        Register::FlashBrightness,
        Register::FlashDuration,
        Register::Flag,
        Register::Config1,
        Register::Config2,
        Register::VinMonitor,
        Register::Gpio,
    ];

    fn attach(chip: DummyChip) -> Lm3554<DummyChip> {
        Lm3554::attach(chip, Defaults::default()).expect("attach failed")
    }

    #[test]
    fn test_write_read_round_trip() {
        let mut chip = DummyChip::new();
        for reg in ALL_REGS {
            for value in 0..=u8::MAX {
                write_reg(&mut chip, reg, value).unwrap();
                assert_eq!(read_reg(&mut chip, reg).unwrap(), value);
            }
        }
    }

    #[test]
    fn test_read_retries_then_fails() {
        let mut chip = DummyChip::new();
        chip.short_transfers(u32::MAX);
        assert_eq!(read_reg(&mut chip, Register::Flag), Err(Error::BusError));
        // One short send per attempt, one pause after each
        let sends = chip
            .log()
            .iter()
            .filter(|t| matches!(t, Transaction::Send(_)))
            .count();
        assert_eq!(sends as u32, MAX_RW_RETRIES);
        assert_eq!(chip.delay_count(), MAX_RW_RETRIES);
    }

    #[test]
    fn test_write_retries_then_fails() {
        let mut chip = DummyChip::new();
        chip.short_transfers(u32::MAX);
        assert_eq!(
            write_reg(&mut chip, Register::Gpio, 0xAA),
            Err(Error::BusError)
        );
        assert_eq!(chip.log().len() as u32, MAX_RW_RETRIES);
        assert_eq!(chip.delay_count(), MAX_RW_RETRIES);
    }

    #[test]
    fn test_write_recovers_after_short_transfers() {
        let mut chip = DummyChip::new();
        chip.short_transfers(2);
        write_reg(&mut chip, Register::Gpio, 0x5A).unwrap();
        assert_eq!(chip.register(Register::Gpio), 0x5A);
        assert_eq!(chip.delay_count(), 2);
    }

    #[test]
    fn test_attach_programs_defaults_in_order() {
        let defaults = Defaults {
            torch_brightness: 0x01,
            flash_brightness: 0x02,
            flash_duration: 0x03,
            config_reg_1: 0x04,
            config_reg_2: 0x05,
            vin_monitor: 0x06,
            gpio_reg: 0x07,
        };
        let dev = Lm3554::attach(DummyChip::new(), defaults).unwrap();
        assert_eq!(dev.torch_brightness(), 0);
        assert_eq!(dev.strobe_brightness(), 0);

        let chip = dev.into_transport();
        let expected = [
            (Register::TorchBrightness, 0x01),
            (Register::FlashBrightness, 0x02),
            (Register::FlashDuration, 0x03),
            (Register::Config1, 0x04),
            (Register::Config2, 0x05),
            (Register::VinMonitor, 0x06),
            (Register::Gpio, 0x07),
        ];
        for (reg, value) in expected {
            assert_eq!(chip.register(reg), value);
        }
        let frames: Vec<_> = chip.log().to_vec();
        assert_eq!(
            frames,
            expected
                .iter()
                .map(|(reg, value)| Transaction::Send(vec![reg.addr(), *value]))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_attach_fails_on_fourth_write() {
        let mut chip = DummyChip::new();
        // Fourth register in the init order is config-1
        chip.fail_writes_to(Some(Register::Config1));
        let err = Lm3554::attach(chip, Defaults::default()).unwrap_err();
        assert_eq!(err, Error::InitFailed);
    }

    #[test]
    fn test_torch_zero_clears_enable() {
        let mut dev = attach(DummyChip::new());
        dev.transport_mut()
            .set_register(Register::TorchBrightness, 0xFF);
        dev.set_torch_brightness(0).unwrap();
        let reg = dev.transport_mut().register(Register::TorchBrightness);
        assert_eq!(reg & TORCH_ENABLE, 0);
        assert_eq!(reg, 0xC4);
        assert_eq!(dev.torch_brightness(), 0);
    }

    #[test]
    fn test_torch_one_step_sets_field_and_enable() {
        let mut dev = attach(DummyChip::new());
        dev.set_torch_brightness(32).unwrap();
        let reg = dev.transport_mut().register(Register::TorchBrightness);
        assert_eq!(reg >> 3 & 0x07, 1);
        assert_eq!(reg & TORCH_ENABLE, TORCH_ENABLE);
        assert_eq!(dev.torch_brightness(), 32);
    }

    #[test]
    fn test_torch_writes_vin_monitor_first() {
        let mut dev = attach(DummyChip::new());
        dev.transport_mut().clear_log();
        dev.set_torch_brightness(64).unwrap();

        let chip = dev.into_transport();
        assert_eq!(chip.register(Register::Config2), CONFIG2_VIN_MONITOR);
        // The config-2 write must land before the brightness write
        let sends: Vec<_> = chip
            .log()
            .iter()
            .filter_map(|t| match t {
                Transaction::Send(f) if f.len() == 2 => Some(f[0]),
                _ => None,
            })
            .collect();
        assert_eq!(sends, vec![Register::Config2.addr(), Register::TorchBrightness.addr()]);
    }

    #[test]
    fn test_torch_vin_monitor_failure_skips_brightness_write() {
        let mut dev = attach(DummyChip::new());
        dev.transport_mut()
            .set_register(Register::TorchBrightness, 0xAB);
        dev.transport_mut().fail_writes_to(Some(Register::Config2));
        assert_eq!(dev.set_torch_brightness(32), Err(Error::ConfigFailed));
        // Brightness register untouched, cache untouched
        assert_eq!(dev.transport_mut().register(Register::TorchBrightness), 0xAB);
        assert_eq!(dev.torch_brightness(), 0);
    }

    #[test]
    fn test_torch_level_out_of_range() {
        let mut dev = attach(DummyChip::new());
        dev.transport_mut().clear_log();
        assert_eq!(dev.set_torch_brightness(256), Err(Error::InvalidArgument));
        assert!(dev.transport_mut().log().is_empty());
    }

    #[test]
    fn test_strobe_one_step_preserves_masked_bits() {
        let mut dev = attach(DummyChip::new());
        dev.transport_mut()
            .set_register(Register::FlashBrightness, 0x83);
        dev.set_strobe_brightness(16).unwrap();
        let chip = dev.into_transport();
        let reg = chip.register(Register::FlashBrightness);
        assert_eq!(reg & 0x83, 0x83);
        assert_eq!(reg & !0x83, 1 << 3);
    }

    #[test]
    fn test_strobe_restores_default_torch_register() {
        let defaults = Defaults {
            torch_brightness: 0x3A,
            ..Defaults::default()
        };
        let mut dev = Lm3554::attach(DummyChip::new(), defaults).unwrap();
        dev.transport_mut()
            .set_register(Register::TorchBrightness, 0xFF);
        dev.set_strobe_brightness(48).unwrap();
        assert_eq!(
            dev.transport_mut().register(Register::TorchBrightness),
            0x3A
        );
        assert_eq!(dev.strobe_brightness(), 48);
    }

    #[test]
    fn test_strobe_config1_bit_tracks_level() {
        let mut dev = attach(DummyChip::new());
        dev.set_strobe_brightness(32).unwrap();
        assert_eq!(
            dev.transport_mut().register(Register::Config1) & CONFIG1_STROBE,
            0
        );
        dev.set_strobe_brightness(0).unwrap();
        assert_eq!(
            dev.transport_mut().register(Register::Config1) & CONFIG1_STROBE,
            CONFIG1_STROBE
        );
    }

    #[test]
    fn test_strobe_trailing_config1_failure_surfaces() {
        let mut dev = attach(DummyChip::new());
        dev.transport_mut().fail_writes_to(Some(Register::Config1));
        assert_eq!(dev.set_strobe_brightness(16), Err(Error::ConfigFailed));
        // Cache already updated when the trailing write runs, matching the
        // original driver's update order
        assert_eq!(dev.strobe_brightness(), 16);
    }

    #[test]
    fn test_faults_masked_and_cleared() {
        let mut dev = attach(DummyChip::new());
        dev.transport_mut().set_faults(0xFF);

        let flags = dev.read_and_clear_faults().unwrap();
        assert_eq!(flags.bits() & 0x40, 0);
        assert_eq!(flags.bits(), 0xBF);
        assert!(flags.contains(FaultFlags::LED_FAULT));
        assert!(flags.contains(FaultFlags::THERMAL_SHUTDOWN));

        // Register was cleared, so a second readout is empty
        assert_eq!(dev.read_and_clear_faults().unwrap(), FaultFlags::empty());
    }

    #[test]
    fn test_read_faults_does_not_clear() {
        let mut dev = attach(DummyChip::new());
        dev.transport_mut().set_faults(0x22);
        assert_eq!(dev.read_faults().unwrap().bits(), 0x22);
        assert_eq!(dev.read_faults().unwrap().bits(), 0x22);
    }

    #[test]
    fn test_fault_clear_failure_discards_flags() {
        let mut dev = attach(DummyChip::new());
        dev.transport_mut().set_faults(0x04);
        dev.transport_mut().fail_writes_to(Some(Register::Flag));
        assert_eq!(dev.read_and_clear_faults(), Err(Error::ConfigFailed));
    }

    #[test]
    fn test_cancelled_delay_aborts_retries() {
        let mut chip = DummyChip::new();
        chip.short_transfers(u32::MAX);
        chip.cancel_delays(true);
        assert_eq!(read_reg(&mut chip, Register::Flag), Err(Error::Cancelled));
        // Only the first pause ran
        assert_eq!(chip.delay_count(), 1);
    }

    #[test]
    fn test_cancelled_propagates_unwrapped() {
        let mut dev = attach(DummyChip::new());
        dev.transport_mut().short_transfers(u32::MAX);
        dev.transport_mut().cancel_delays(true);
        assert_eq!(dev.set_torch_brightness(32), Err(Error::Cancelled));
    }

    #[test]
    fn test_disconnected_reports_no_device() {
        let mut chip = DummyChip::new();
        chip.set_disconnected(true);
        assert_eq!(read_reg(&mut chip, Register::Flag), Err(Error::NoDevice));
        assert_eq!(chip.delay_count(), 0);
    }

    /// Split the transaction log into whole torch-set operations; any
    /// interleaving between threads breaks the parse.
    fn parse_torch_ops(log: &[Transaction]) -> Option<usize> {
        let mut ops = 0;
        let mut i = 0;
        while i < log.len() {
            match (&log[i], log.get(i + 1), log.get(i + 2), log.get(i + 3)) {
                (
                    Transaction::Send(read_addr),
                    Some(Transaction::Receive(_)),
                    Some(Transaction::Send(cfg2)),
                    Some(Transaction::Send(torch)),
                ) if read_addr[..] == [Register::TorchBrightness.addr()]
                    && cfg2[..] == [Register::Config2.addr(), CONFIG2_VIN_MONITOR]
                    && torch.len() == 2
                    && torch[0] == Register::TorchBrightness.addr() =>
                {
                    ops += 1;
                    i += 4;
                }
                _ => return None,
            }
        }
        Some(ops)
    }

    #[test]
    fn test_shared_handle_never_interleaves_sequences() {
        let shared = SharedLm3554::attach(DummyChip::new(), Defaults::default()).unwrap();
        shared.lock().transport_mut().clear_log();

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let handle = shared.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        handle.set_torch_brightness(32).unwrap();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        let mut guard = shared.lock();
        let ops = parse_torch_ops(guard.transport_mut().log());
        assert_eq!(ops, Some(100));
    }
}
