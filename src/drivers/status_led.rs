//! On-board status LED.
//!
//! Lit while booting, then mirrors the WiFi link: on when connected, off
//! otherwise (manual mode included).

use embedded_hal::digital::OutputPin;

pub struct StatusLed<P> {
    pin: P,
    lit: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Wrap an output the caller has already driven HIGH.
    pub fn new(pin: P) -> Self {
        Self { pin, lit: true }
    }

    pub fn set(&mut self, lit: bool) {
        if lit == self.lit {
            return;
        }
        let ok = if lit {
            self.pin.set_high().is_ok()
        } else {
            self.pin.set_low().is_ok()
        };
        if ok {
            self.lit = lit;
        }
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
