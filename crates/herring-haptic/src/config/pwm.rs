use crate::error::HapticError;

/// PWM period driving the vibrator motor, in timer ticks.
pub const PWM_PERIOD: u32 = 43_542;
pub const PWM_DUTY_MAX: u32 = 43_500;
pub const PWM_DUTY_MIN: u32 = 21_750;

const DUTY_STEP: u32 = (PWM_DUTY_MAX - PWM_DUTY_MIN) / 100;

/// Motor strength expressed as a percentage and its PWM duty value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmDuty {
    percent: u32,
    duty: u32,
}

impl Default for PwmDuty {
    /// Full strength; boots at the raw maximum rather than the 100% step.
    fn default() -> Self {
        Self {
            percent: 100,
            duty: PWM_DUTY_MAX,
        }
    }
}

impl PwmDuty {
    pub fn from_percent(percent: u32) -> Result<Self, HapticError> {
        if percent > 100 {
            return Err(HapticError::InvalidDuty { percent });
        }
        Ok(Self {
            percent,
            duty: percent * DUTY_STEP + PWM_DUTY_MIN,
        })
    }

    pub fn percent(self) -> u32 {
        self.percent
    }

    pub fn duty(self) -> u32 {
        self.duty
    }

    pub fn period(self) -> u32 {
        PWM_PERIOD
    }
}
