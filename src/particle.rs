//! Particles indexed by the quadtree: a mutable 2D position and velocity.

use crate::geometry::{Point2D, Rect, Vector2D};
use crate::scalar::Scalar;
use std::cell::RefCell;
use std::rc::Rc;

/// A moving point. Shared via [`ParticleHandle`] so the quadtree can
/// relocate a particle between leaves without cloning its state.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "debug", derive(serde::Serialize, serde::Deserialize))]
pub struct Particle<S: Scalar> {
    position: Point2D<S>,
    velocity: Vector2D<S>,
}

/// Shared handle to a [`Particle`]; identity (for relocation bookkeeping)
/// is by `Rc` pointer, not by value.
pub type ParticleHandle<S> = Rc<RefCell<Particle<S>>>;

impl<S: Scalar> Particle<S> {
    pub fn new(position: Point2D<S>, velocity: Vector2D<S>) -> Self {
        Particle { position, velocity }
    }

    pub fn handle(position: Point2D<S>, velocity: Vector2D<S>) -> ParticleHandle<S> {
        Rc::new(RefCell::new(Particle::new(position, velocity)))
    }

    pub fn position(&self) -> Point2D<S> {
        self.position
    }

    pub fn velocity(&self) -> Vector2D<S> {
        self.velocity
    }

    pub fn set_position(&mut self, position: Point2D<S>) {
        self.position = position;
    }

    /// Advances the particle by one timestep, bouncing its velocity off
    /// `boundary`'s edges — the world's walls, not necessarily the leaf
    /// boundary that currently contains it.
    pub fn advance(&mut self, boundary: &Rect<S>) {
        self.position = self.position + self.velocity;
        if self.position.x < boundary.pmin().x || self.position.x > boundary.pmax().x {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y < boundary.pmin().y || self.position.y > boundary.pmax().y {
            self.velocity.y = -self.velocity.y;
        }
    }
}
