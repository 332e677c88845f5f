//! Per-frame observer ingestion.
//!
//! Observers are ephemeral: the simulation gathers one `(faction, position,
//! radius)` tuple per vision-capable entity each tick, feeds the batch to
//! the engine, and discards it. The engine never owns or tracks the source
//! entities.

use bevy_math::Vec2;

use crate::{
    engine::{FogEngine, FogError},
    faction::FactionId,
};

/// One circular visibility contribution for the current tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    pub faction: FactionId,
    pub position: Vec2,
    pub radius: f32,
}

impl Observer {
    pub fn new(faction: FactionId, position: Vec2, radius: f32) -> Self {
        Self {
            faction,
            position,
            radius,
        }
    }
}

impl FogEngine {
    /// Run one complete frame: `begin_frame`, one stamp per observer,
    /// `end_frame`.
    ///
    /// This is the canonical bracket for callers that do not need to
    /// interleave other work between stamps. A stamp failure (out-of-capacity
    /// faction) does not abort the frame: remaining observers are still
    /// stamped and the frame is closed, then the first error is returned.
    pub fn run_frame<I>(&mut self, observers: I) -> Result<(), FogError>
    where
        I: IntoIterator<Item = Observer>,
    {
        self.begin_frame();
        let mut first_error = None;
        for observer in observers {
            if let Err(err) = self.stamp(observer.faction, observer.position, observer.radius) {
                tracing::warn!(
                    target: "fog::frame",
                    faction = observer.faction.0,
                    error = %err,
                    "fog.observer_rejected"
                );
                first_error.get_or_insert(err);
            }
        }
        self.end_frame();
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
