//! Compute device selection

use std::fmt;

/// Target compute device.
///
/// This build carries no GPU backend; `Cuda` exists so configurations can
/// name a device ordinal, and binding an optimizer on a non-CPU device
/// fails with [`crate::Error::DeviceUnavailable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Cuda(u32),
}

impl Device {
    /// Map the conventional integer encoding: negative means CPU,
    /// non-negative is a CUDA ordinal.
    pub fn from_ordinal(ordinal: i32) -> Self {
        if ordinal < 0 {
            Device::Cpu
        } else {
            Device::Cuda(ordinal as u32)
        }
    }

    pub fn is_cpu(&self) -> bool {
        matches!(self, Device::Cpu)
    }
}

impl Default for Device {
    fn default() -> Self {
        Device::Cpu
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda(ordinal) => write!(f, "cuda:{ordinal}"),
        }
    }
}
