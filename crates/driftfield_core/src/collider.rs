//! # Colliders
//!
//! A collider is a capsule between two radius-bearing endpoints. The host
//! refreshes the whole set once per tick (e.g. from tracked fingertips) and
//! every particle reads it during the tick.
//!
//! ```text
//!        tip (xyz, r_tip)
//!         ●
//!        / \      radius is interpolated linearly
//!       /   \     between the two ends
//!      /     \
//!     ●───────●
//!        base (xyz, r_base)
//! ```
//!
//! Order matters: the first collider that captures a particle wins.

use bytemuck::{Pod, Zeroable};

use crate::error::{CoreError, CoreResult};
use crate::math::Vec3;
use crate::tuning::DEFAULT_MAX_COLLIDERS;

/// Capsule-like exclusion volume.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Collider {
    /// Base point (xyz) + radius at the base (w).
    pub base: [f32; 4],
    /// Tip point (xyz) + radius at the tip (w).
    pub tip: [f32; 4],
}

/// Normalized axis of a non-degenerate capsule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleAxis {
    /// Unit vector from base to tip.
    pub up: Vec3,
    /// Distance from base to tip.
    pub height: f32,
}

impl Collider {
    /// Creates a collider from its two ends.
    #[must_use]
    pub const fn new(base: [f32; 3], base_radius: f32, tip: [f32; 3], tip_radius: f32) -> Self {
        Self {
            base: [base[0], base[1], base[2], base_radius],
            tip: [tip[0], tip[1], tip[2], tip_radius],
        }
    }

    /// Base point.
    #[inline]
    #[must_use]
    pub const fn base_point(&self) -> Vec3 {
        Vec3::from_xyz(self.base)
    }

    /// Tip point.
    #[inline]
    #[must_use]
    pub const fn tip_point(&self) -> Vec3 {
        Vec3::from_xyz(self.tip)
    }

    /// Radius at the base.
    #[inline]
    #[must_use]
    pub const fn base_radius(&self) -> f32 {
        self.base[3]
    }

    /// Radius at the tip.
    #[inline]
    #[must_use]
    pub const fn tip_radius(&self) -> f32 {
        self.tip[3]
    }

    /// Capsule axis, or `None` for a zero-height (or non-finite) collider.
    ///
    /// Degenerate colliders never take part in the capsule pass.
    #[inline]
    #[must_use]
    pub fn axis(&self) -> Option<CapsuleAxis> {
        let span = self.tip_point() - self.base_point();
        let height = span.length();
        let up = span.try_normalize()?;
        Some(CapsuleAxis { up, height })
    }

    /// Whether this collider has zero height.
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.axis().is_none()
    }
}

/// Bounded, ordered list of colliders for one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct ColliderSet {
    colliders: Vec<Collider>,
    capacity: usize,
}

impl ColliderSet {
    /// Creates an empty set with `capacity` slots.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidParameter` if `capacity` is zero.
    pub fn new(capacity: usize) -> CoreResult<Self> {
        if capacity == 0 {
            return Err(CoreError::InvalidParameter(
                "collider capacity must be greater than zero".into(),
            ));
        }
        Ok(Self {
            colliders: Vec::with_capacity(capacity),
            capacity,
        })
    }

    /// Creates a set from a snapshot.
    ///
    /// # Errors
    ///
    /// Fails if the capacity is zero or the snapshot does not fit.
    pub fn from_slice(capacity: usize, colliders: &[Collider]) -> CoreResult<Self> {
        let mut set = Self::new(capacity)?;
        set.replace(colliders)?;
        Ok(set)
    }

    /// Replaces the whole snapshot. On error the previous snapshot is kept.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::TooManyColliders` if the snapshot does not fit.
    pub fn replace(&mut self, colliders: &[Collider]) -> CoreResult<()> {
        if colliders.len() > self.capacity {
            return Err(CoreError::TooManyColliders {
                capacity: self.capacity,
                requested: colliders.len(),
            });
        }
        self.colliders.clear();
        self.colliders.extend_from_slice(colliders);
        Ok(())
    }

    /// Appends one collider after the existing ones.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::TooManyColliders` if every slot is taken.
    pub fn push(&mut self, collider: Collider) -> CoreResult<()> {
        if self.colliders.len() == self.capacity {
            return Err(CoreError::TooManyColliders {
                capacity: self.capacity,
                requested: self.capacity + 1,
            });
        }
        self.colliders.push(collider);
        Ok(())
    }

    /// Removes every collider.
    pub fn clear(&mut self) {
        self.colliders.clear();
    }

    /// Number of slots.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of active colliders.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// Whether no collider is active.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Active colliders in evaluation order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Collider] {
        &self.colliders
    }

    /// Iterates over active colliders in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &Collider> {
        self.colliders.iter()
    }

    /// Bases and tips as two arrays of exactly `capacity` entries, unused
    /// slots zeroed. This is the layout a shader backend binds as two
    /// `vec4[capacity]` uniforms.
    #[must_use]
    pub fn uniform_arrays(&self) -> (Vec<[f32; 4]>, Vec<[f32; 4]>) {
        let mut bases = vec![[0.0; 4]; self.capacity];
        let mut tips = vec![[0.0; 4]; self.capacity];
        for (i, c) in self.colliders.iter().enumerate() {
            bases[i] = c.base;
            tips[i] = c.tip;
        }
        (bases, tips)
    }
}

impl Default for ColliderSet {
    fn default() -> Self {
        Self {
            colliders: Vec::with_capacity(DEFAULT_MAX_COLLIDERS),
            capacity: DEFAULT_MAX_COLLIDERS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collider_size() {
        assert_eq!(std::mem::size_of::<Collider>(), 32);
    }

    #[test]
    fn test_axis() {
        let c = Collider::new([0.0, 0.0, 0.0], 0.2, [0.0, 2.0, 0.0], 0.1);
        let axis = c.axis().unwrap();
        assert_eq!(axis.up, Vec3::Y);
        assert_eq!(axis.height, 2.0);
        assert_eq!(c.base_radius(), 0.2);
        assert_eq!(c.tip_radius(), 0.1);
    }

    #[test]
    fn test_zero_height_is_degenerate() {
        let c = Collider::new([1.0, 1.0, 1.0], 0.5, [1.0, 1.0, 1.0], 0.5);
        assert!(c.is_degenerate());
        assert!(Collider::default().is_degenerate());
    }

    #[test]
    fn test_capacity_enforced() {
        let c = Collider::new([0.0; 3], 0.1, [0.0, 1.0, 0.0], 0.1);
        let mut set = ColliderSet::new(2).unwrap();
        set.push(c).unwrap();
        set.push(c).unwrap();
        assert_eq!(
            set.push(c),
            Err(CoreError::TooManyColliders {
                capacity: 2,
                requested: 3
            })
        );

        // Failed replace keeps the old snapshot.
        assert!(set.replace(&[c, c, c]).is_err());
        assert_eq!(set.len(), 2);

        set.replace(&[c]).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(ColliderSet::new(0).is_err());
    }

    #[test]
    fn test_uniform_arrays_are_padded() {
        let c = Collider::new([1.0, 2.0, 3.0], 0.4, [1.0, 3.0, 3.0], 0.3);
        let set = ColliderSet::from_slice(8, &[c]).unwrap();
        let (bases, tips) = set.uniform_arrays();
        assert_eq!(bases.len(), 8);
        assert_eq!(tips.len(), 8);
        assert_eq!(bases[0], [1.0, 2.0, 3.0, 0.4]);
        assert_eq!(tips[0], [1.0, 3.0, 3.0, 0.3]);
        assert!(bases[1..].iter().all(|b| *b == [0.0; 4]));
    }
}
