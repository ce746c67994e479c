//! Simulated multi-channel servo kit.
//!
//! Stands in for a PCA9685-style 16-channel board when no hardware is
//! attached (host runs and tests).  Every channel records the angles
//! written to it; a channel can be forced to fail to exercise the device
//! fault path.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};

use crate::app::ports::ServoOutput;
use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct ChannelState {
    history: Vec<f32>,
    failing: bool,
}

/// Shared handle to a bank of simulated servo channels.
#[derive(Debug, Clone)]
pub struct ServoKit {
    channels: Rc<RefCell<Vec<ChannelState>>>,
}

impl ServoKit {
    pub fn new(channels: u8) -> Self {
        info!("Simulated servo kit: {} channels", channels);
        Self {
            channels: Rc::new(RefCell::new(
                (0..channels).map(|_| ChannelState::default()).collect(),
            )),
        }
    }

    pub fn len(&self) -> usize {
        self.channels.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Output handle for `channel`.  Writes to a channel the kit does not
    /// have fail with a device fault.
    pub fn channel(&self, channel: u8) -> SimServo {
        SimServo {
            kit: self.clone(),
            channel,
        }
    }

    /// Most recent angle written to `channel`.
    pub fn last_angle(&self, channel: u8) -> Option<f32> {
        self.channels
            .borrow()
            .get(usize::from(channel))
            .and_then(|c| c.history.last().copied())
    }

    /// Every angle written to `channel`, oldest first.
    pub fn history(&self, channel: u8) -> Vec<f32> {
        self.channels
            .borrow()
            .get(usize::from(channel))
            .map(|c| c.history.clone())
            .unwrap_or_default()
    }

    /// Make writes to `channel` fail (or succeed again).
    pub fn set_failing(&self, channel: u8, failing: bool) {
        if let Some(c) = self.channels.borrow_mut().get_mut(usize::from(channel)) {
            c.failing = failing;
        }
    }
}

/// One channel of a [`ServoKit`].
#[derive(Debug)]
pub struct SimServo {
    kit: ServoKit,
    channel: u8,
}

impl ServoOutput for SimServo {
    fn channel(&self) -> u8 {
        self.channel
    }

    fn write_angle(&mut self, degrees: f32) -> Result<()> {
        let mut channels = self.kit.channels.borrow_mut();
        match channels.get_mut(usize::from(self.channel)) {
            Some(c) if !c.failing => {
                debug!("servo ch{} -> {:.1}", self.channel, degrees);
                c.history.push(degrees);
                Ok(())
            }
            _ => Err(Error::DeviceFault {
                channel: self.channel,
            }),
        }
    }
}
