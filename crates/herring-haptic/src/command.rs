//! Control commands a haptic service issues next to its sample writes.

/// Magic value a service passes to prove it is the haptic service.
pub const TSPDRV_MAGIC_NUMBER: u32 = 0x494D_4D52;

const TSPDRV_IOCTL_GROUP: u32 = 0x52;

/// Encodes `_IO(group, nr)`: no direction bits, no size.
const fn io(nr: u32) -> u32 {
    (TSPDRV_IOCTL_GROUP << 8) | nr
}

pub const TSPDRV_STOP_KERNEL_TIMER: u32 = io(1);
pub const TSPDRV_IDENTIFY_CALLER: u32 = io(2);
pub const TSPDRV_ENABLE_AMP: u32 = io(3);
pub const TSPDRV_DISABLE_AMP: u32 = io(4);
pub const TSPDRV_GET_NUM_ACTUATORS: u32 = io(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Graceful stop: playback ends once the active slots drain.
    StopKernelTimer,
    IdentifyCaller { magic: u32 },
    EnableAmp { actuator: u8 },
    DisableAmp { actuator: u8 },
    GetNumActuators,
}

impl Command {
    /// Decodes a raw ioctl request; `None` for codes this device ignores.
    pub fn from_raw(cmd: u32, arg: u64) -> Option<Self> {
        match cmd {
            TSPDRV_STOP_KERNEL_TIMER => Some(Self::StopKernelTimer),
            TSPDRV_IDENTIFY_CALLER => Some(Self::IdentifyCaller { magic: arg as u32 }),
            TSPDRV_ENABLE_AMP => actuator_arg(arg).map(|actuator| Self::EnableAmp { actuator }),
            TSPDRV_DISABLE_AMP => actuator_arg(arg).map(|actuator| Self::DisableAmp { actuator }),
            TSPDRV_GET_NUM_ACTUATORS => Some(Self::GetNumActuators),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::StopKernelTimer => "stop_kernel_timer",
            Self::IdentifyCaller { .. } => "identify_caller",
            Self::EnableAmp { .. } => "enable_amp",
            Self::DisableAmp { .. } => "disable_amp",
            Self::GetNumActuators => "get_num_actuators",
        }
    }
}

fn actuator_arg(arg: u64) -> Option<u8> {
    u8::try_from(arg).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandReply {
    Done,
    NumActuators(u8),
    /// Unknown request or a magic number that did not match.
    Ignored,
}

impl CommandReply {
    /// Integer an ioctl caller would see.
    pub fn as_raw(self) -> i64 {
        match self {
            Self::NumActuators(count) => i64::from(count),
            Self::Done | Self::Ignored => 0,
        }
    }
}
