//! Frame-sync pin helpers
//!
//! Some sensors start a frame when the host raises a frame-sync (FSIN)
//! line. The snapshot path drives it through `embedded_hal::digital::OutputPin`;
//! boards without one use [`NoPin`].

use core::convert::Infallible;
use embedded_hal::digital::{ErrorType, OutputPin};

/// Placeholder output pin that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
