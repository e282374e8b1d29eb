//! Touch-key state machine.
//!
//! All methods take `&mut self`; callers serialize access the way the
//! service thread does.

use tracing::{debug, error, info, warn};

use crate::bus::{RetryPolicy, TouchkeyBus};
use crate::config::{KEY_OFF_DELAY_MAX_MS, KeyMode, TouchkeyConfig};
use crate::error::TouchkeyError;
use crate::report::KeyReport;

pub const BACKLIGHT_ON: u8 = 0x1;
pub const BACKLIGHT_OFF: u8 = 0x2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Press { code: u16 },
    Release { code: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchkeyState {
    pub is_dead: bool,
    pub is_powering_on: bool,
    pub is_backlight_on: bool,
    pub is_key_pressed: bool,
    /// A backlight request arrived while it could not be applied.
    pub is_delay_led_on: bool,
    pub is_bl_disabled: bool,
    pub key_off_delay_ms: u64,
}

pub struct TouchkeyController<B> {
    bus: B,
    keycodes: Vec<u16>,
    key_mode: KeyMode,
    retry: RetryPolicy,
    recovery_attempts: u32,
    state: TouchkeyState,
    key_off_requested: bool,
    events: Vec<KeyEvent>,
}

impl<B: TouchkeyBus> TouchkeyController<B> {
    pub fn new(bus: B, config: &TouchkeyConfig) -> Self {
        Self {
            bus,
            keycodes: config.keycodes.clone(),
            key_mode: config.key_mode,
            retry: config.retry_policy(),
            recovery_attempts: config.recovery_attempts,
            state: TouchkeyState {
                is_dead: false,
                is_powering_on: false,
                is_backlight_on: true,
                is_key_pressed: false,
                is_delay_led_on: false,
                is_bl_disabled: false,
                key_off_delay_ms: config.key_off_delay_ms,
            },
            key_off_requested: false,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> TouchkeyState {
        self.state
    }

    /// Key events produced since the last call.
    pub fn take_events(&mut self) -> Vec<KeyEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whether a release asked for the delayed backlight-off; clears the flag.
    pub fn take_key_off_request(&mut self) -> bool {
        std::mem::take(&mut self.key_off_requested)
    }

    pub fn key_off_delay_ms(&self) -> u64 {
        self.state.key_off_delay_ms
    }

    pub fn set_key_off_delay_ms(&mut self, millis: u64) -> Result<(), TouchkeyError> {
        if millis > KEY_OFF_DELAY_MAX_MS {
            return Err(TouchkeyError::DelayOutOfRange {
                millis,
                max: KEY_OFF_DELAY_MAX_MS,
            });
        }
        self.state.key_off_delay_ms = millis;
        Ok(())
    }

    /// Reads and decodes one report after the controller raised its
    /// interrupt line.
    pub fn handle_interrupt(&mut self) -> Result<(), TouchkeyError> {
        if self.state.is_powering_on {
            debug!("ignoring interrupt while powering on");
            return Ok(());
        }
        if self.state.is_dead {
            return Err(TouchkeyError::DeviceDead);
        }

        let report = match self.retry.read_byte(&mut self.bus).map(KeyReport::new) {
            Ok(report) if !report.esd_detected() => report,
            Ok(report) => {
                warn!(raw = report.raw(), "esd reset detected");
                return self.recover();
            },
            Err(error) => {
                warn!("report read failed: {error}");
                return self.recover();
            },
        };

        match self.key_mode {
            KeyMode::Scancode => self.apply_scancode_report(report),
            KeyMode::Bitmask => {
                self.apply_bitmask_report(report);
                Ok(())
            },
        }
    }

    fn apply_scancode_report(&mut self, report: KeyReport) -> Result<(), TouchkeyError> {
        if !report.is_release() {
            let code = self.keycode(report)?;
            self.events.push(KeyEvent::Press { code });
            self.state.is_key_pressed = true;
            debug!(code, "key pressed");
            return Ok(());
        }

        // Any release ends the press, even one naming an unmapped key.
        self.state.is_key_pressed = false;
        if std::mem::take(&mut self.state.is_delay_led_on) {
            self.write_backlight(self.state.is_backlight_on);
        }
        if !self.state.is_backlight_on {
            // The controller lights the keys on release by itself.
            self.key_off_requested = true;
        }

        let code = self.keycode(report)?;
        self.events.push(KeyEvent::Release { code });
        debug!(code, "key released");
        Ok(())
    }

    fn apply_bitmask_report(&mut self, report: KeyReport) {
        let mut any_pressed = false;
        for (index, &code) in self.keycodes.iter().enumerate() {
            if report.is_bit_set(index) {
                any_pressed = true;
                self.events.push(KeyEvent::Press { code });
            } else {
                self.events.push(KeyEvent::Release { code });
            }
        }
        self.state.is_key_pressed = any_pressed;
    }

    fn keycode(&self, report: KeyReport) -> Result<u16, TouchkeyError> {
        let scancode = report.scancode();
        usize::try_from(scancode)
            .ok()
            .and_then(|index| self.keycodes.get(index).copied())
            .ok_or_else(|| {
                warn!(scancode, raw = report.raw(), "scancode out of range");
                TouchkeyError::ScancodeOutOfRange {
                    scancode,
                    keycodes: self.keycodes.len(),
                }
            })
    }

    /// Power-cycles the controller until it answers a read again.
    ///
    /// Every key is reported up first. When all attempts fail the device is
    /// marked dead and left powered off.
    pub fn recover(&mut self) -> Result<(), TouchkeyError> {
        if self.state.is_dead {
            error!("device is already dead, skipping recovery");
            return Err(TouchkeyError::DeviceDead);
        }

        self.all_keys_up();
        for attempt in 1..=self.recovery_attempts {
            self.bus.set_power(false);
            self.bus.set_power(true);
            match self.retry.read_byte(&mut self.bus) {
                Ok(_) => {
                    info!(attempt, "touchkey recovered");
                    return Ok(());
                },
                Err(error) => warn!(attempt, "recovery read failed: {error}"),
            }
        }

        self.state.is_dead = true;
        self.bus.set_power(false);
        error!(attempts = self.recovery_attempts, "touchkey died");
        Err(TouchkeyError::RecoveryFailed {
            attempts: self.recovery_attempts,
        })
    }

    fn all_keys_up(&mut self) {
        self.events
            .extend(self.keycodes.iter().map(|&code| KeyEvent::Release { code }));
        self.state.is_key_pressed = false;
    }

    /// Backlight request from the lights service.
    ///
    /// Deferred while a key is held or the controller is powering on; an
    /// "on" request is dropped while the backlight is disabled.
    pub fn set_backlight(&mut self, on: bool) {
        if on && self.state.is_bl_disabled {
            debug!("backlight disabled, ignoring on request");
            return;
        }
        self.state.is_backlight_on = on;
        if self.state.is_powering_on || self.state.is_key_pressed {
            debug!(on, "deferring backlight request");
            self.state.is_delay_led_on = true;
            return;
        }
        self.write_backlight(on);
    }

    pub fn set_backlight_disabled(&mut self, disabled: bool) {
        self.state.is_bl_disabled = disabled;
    }

    /// Delayed backlight-off after a release; skipped when the backlight
    /// was switched on meanwhile.
    pub fn key_off_elapsed(&mut self) {
        if !self.state.is_powering_on && !self.state.is_backlight_on {
            self.write_backlight(false);
        }
    }

    /// Cuts controller power; interrupts are ignored until [`power_on`].
    ///
    /// [`power_on`]: Self::power_on
    pub fn power_off(&mut self) {
        self.state.is_powering_on = true;
        self.key_off_requested = false;
        if self.state.is_dead {
            return;
        }
        self.bus.set_power(false);
        self.all_keys_up();
        info!("touchkey powered off");
    }

    /// Powers the controller back up, clears the dead flag and applies a
    /// backlight request that was deferred meanwhile.
    pub fn power_on(&mut self) {
        self.bus.set_power(true);
        self.state.is_dead = false;
        self.state.is_powering_on = false;
        if std::mem::take(&mut self.state.is_delay_led_on) {
            self.write_backlight(self.state.is_backlight_on);
        }
        info!("touchkey powered on");
    }

    fn write_backlight(&mut self, on: bool) {
        let value = if on { BACKLIGHT_ON } else { BACKLIGHT_OFF };
        if let Err(error) = self.retry.write_byte(&mut self.bus, value) {
            error!(on, "backlight write failed: {error}");
        }
    }
}

#[cfg(test)]
#[path = "tests/controller.rs"]
mod controller_tests;
