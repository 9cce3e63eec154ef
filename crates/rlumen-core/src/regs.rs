//! LM3554 register map and bit-field encodings
//!
//! The chip exposes eight single-byte registers. Brightness levels are
//! quantized into a field inside the torch/flash brightness registers;
//! the surrounding bits carry unrelated configuration and must be
//! preserved across updates.

use bitflags::bitflags;

/// Torch brightness quantization step
pub const TORCH_STEP: u32 = 32;
/// Strobe (flash) brightness quantization step
pub const STROBE_STEP: u32 = 16;
/// Highest brightness level accepted by the controller
pub const LEVEL_MAX: u32 = 255;

/// Bits of the torch brightness register preserved across an update
/// (everything outside the enable bit and the brightness field)
pub const TORCH_KEEP_MASK: u8 = 0xC4;
/// Torch enable bit
pub const TORCH_ENABLE: u8 = 0x02;
/// Bits of the flash brightness register preserved across an update
pub const FLASH_KEEP_MASK: u8 = 0x83;
/// Config-2 value selecting VIN monitor mode, required before a torch
/// brightness change
pub const CONFIG2_VIN_MONITOR: u8 = 0x08;
/// Strobe mode bit in the config-1 register
pub const CONFIG1_STROBE: u8 = 0x04;
/// Bits of the flag register reported to callers (bit 6 is reserved)
pub const FAULT_REPORT_MASK: u8 = 0xBF;

/// The eight valid register addresses
///
/// Nothing outside this set is ever put on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    /// Torch mode brightness and enable
    TorchBrightness = 0xA0,
    /// Flash (strobe) mode brightness
    FlashBrightness = 0xB0,
    /// Flash pulse duration
    FlashDuration = 0xC0,
    /// Fault flags (read-then-clear)
    Flag = 0xD0,
    /// Configuration register 1 (strobe mode select)
    Config1 = 0xE0,
    /// Configuration register 2 (VIN monitor select)
    Config2 = 0xF0,
    /// Input voltage monitor thresholds
    VinMonitor = 0x80,
    /// GPIO / TX pin configuration
    Gpio = 0x20,
}

impl Register {
    /// Wire address of this register
    pub fn addr(self) -> u8 {
        self as u8
    }

    /// Reverse lookup from a wire address, for bus emulation
    pub fn from_addr(addr: u8) -> Option<Self> {
        match addr {
            0xA0 => Some(Self::TorchBrightness),
            0xB0 => Some(Self::FlashBrightness),
            0xC0 => Some(Self::FlashDuration),
            0xD0 => Some(Self::Flag),
            0xE0 => Some(Self::Config1),
            0xF0 => Some(Self::Config2),
            0x80 => Some(Self::VinMonitor),
            0x20 => Some(Self::Gpio),
            _ => None,
        }
    }
}

bitflags! {
    /// Fault flags decoded from the flag register
    ///
    /// Reported values are masked with [`FAULT_REPORT_MASK`]; unnamed bits
    /// inside the mask are retained so callers see the raw chip state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FaultFlags: u8 {
        /// Open/short on the LED outputs
        const LED_FAULT             = 0x04;
        /// Die temperature exceeded the shutdown threshold
        const THERMAL_SHUTDOWN      = 0x02;
        /// TX1 interrupt asserted during flash
        const TX1_INTERRUPT_FAULT   = 0x08;
        /// Thermal monitor tripped
        const THERMAL_MONITOR_FAULT = 0x20;
        /// Input voltage fell below the VIN monitor threshold
        const VOLTAGE_MONITOR_FAULT = 0x80;
    }
}

impl FaultFlags {
    /// Decode a raw flag register value, dropping the reserved bit
    pub fn from_register(raw: u8) -> Self {
        Self::from_bits_retain(raw & FAULT_REPORT_MASK)
    }
}

/// Power-on register values, supplied by the platform at attach time
///
/// Never mutated after construction; the strobe path also writes the torch
/// default back to the chip when entering strobe mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Defaults {
    /// Torch brightness register default
    pub torch_brightness: u8,
    /// Flash brightness register default
    pub flash_brightness: u8,
    /// Flash duration register default
    pub flash_duration: u8,
    /// Config-1 register default
    pub config_reg_1: u8,
    /// Config-2 register default
    pub config_reg_2: u8,
    /// VIN monitor register default
    pub vin_monitor: u8,
    /// GPIO register default
    pub gpio_reg: u8,
}

impl Default for Defaults {
    /// Conservative bring-up values: both LED modes off, longest flash
    /// timeout, VIN monitor armed
    fn default() -> Self {
        Self {
            torch_brightness: 0x00,
            flash_brightness: 0x00,
            flash_duration: 0x1F,
            config_reg_1: 0x6C,
            config_reg_2: 0x00,
            vin_monitor: 0x01,
            gpio_reg: 0x00,
        }
    }
}

/// Encode a torch brightness level into the register value
///
/// Preserves the bits outside the enable bit and brightness field of the
/// current register value. Level 0 encodes "torch off" (enable bit clear).
pub fn encode_torch(current: u8, level: u32) -> u8 {
    let mut val = current & TORCH_KEEP_MASK;
    if level > 0 {
        val |= ((level / TORCH_STEP) as u8) << 3;
        val |= TORCH_ENABLE;
    }
    val
}

/// Encode a strobe brightness level into the flash brightness register value
pub fn encode_strobe(current: u8, level: u32) -> u8 {
    (current & FLASH_KEEP_MASK) | (((level / STROBE_STEP) as u8) << 3)
}

/// Compute the config-1 value written at the end of a strobe-set
///
/// The strobe bit is set, then cleared again whenever a nonzero level was
/// requested; the other config-1 bits pass through from the current value.
pub fn strobe_config1(current: u8, level: u32) -> u8 {
    let mut val = current | CONFIG1_STROBE;
    if level != 0 {
        val &= !CONFIG1_STROBE;
    }
    val
}
