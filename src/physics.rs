use glam::Vec3;

/// Static box collider for the physics engine sink.
///
/// Landscape colliders never move: the body has infinite mass (zero inverse
/// mass) and is never put to sleep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionCube {
    /// centre of the box in world space
    pub position: Vec3,
    pub half_size: Vec3,
    pub inverse_mass: f32,
    pub can_sleep: bool,
}

impl CollisionCube {
    pub fn new_static(position: Vec3, half_size: Vec3) -> Self {
        Self {
            position,
            half_size,
            inverse_mass: 0.0,
            can_sleep: false,
        }
    }

    pub fn has_infinite_mass(&self) -> bool {
        self.inverse_mass == 0.0
    }

    pub fn to_aabb(&self) -> Aabb {
        Aabb::new(self.position, -self.half_size, self.half_size)
    }
}

/// Axis aligned box stored as an offset plus local `min`/`max` extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub offset: Vec3,
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(offset: Vec3, min: Vec3, max: Vec3) -> Self {
        Self { offset, min, max }
    }

    pub fn world_min(&self) -> Vec3 {
        self.offset + self.min
    }

    pub fn world_max(&self) -> Vec3 {
        self.offset + self.max
    }

    pub fn center(&self) -> Vec3 {
        self.offset + (self.min + self.max) * 0.5
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        let (lo, hi) = (self.world_min(), self.world_max());
        p.cmpge(lo).all() && p.cmple(hi).all()
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        let (a_lo, a_hi) = (self.world_min(), self.world_max());
        let (b_lo, b_hi) = (other.world_min(), other.world_max());
        a_lo.cmple(b_hi).all() && b_lo.cmple(a_hi).all()
    }

    /// Slab test. Returns the distance along `dir` to the first contact, `0.0`
    /// if `origin` is already inside. `dir` need not be normalized; the
    /// distance is in units of `dir`.
    pub fn intersect_ray(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        let (lo, hi) = (self.world_min(), self.world_max());
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let (o, d) = (origin[axis], dir[axis]);
            if d.abs() < f32::EPSILON {
                // parallel to this slab
                if o < lo[axis] || o > hi[axis] {
                    return None;
                }
                continue;
            }
            let t1 = (lo[axis] - o) / d;
            let t2 = (hi[axis] - o) / d;
            t_enter = t_enter.max(t1.min(t2));
            t_exit = t_exit.min(t1.max(t2));
        }

        if t_exit < t_enter.max(0.0) {
            None
        } else {
            Some(t_enter.max(0.0))
        }
    }
}
