//! 射线、平面、球的求交

use glam::Vec3;

const EPSILON: f32 = 1e-6;

/// 射线
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// 单位方向
    pub direction: Vec3,
}

impl Ray {
    /// 方向为零向量时返回 `None`
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        Some(Self { origin, direction: direction.try_normalize()? })
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// 与平面的交点，平行或在身后时返回 `None`
    pub fn intersect_plane(&self, plane: &Plane) -> Option<Vec3> {
        let denom = plane.normal.dot(self.direction);
        if denom.abs() < EPSILON {
            return None;
        }
        let t = (plane.point - self.origin).dot(plane.normal) / denom;
        if t < 0.0 {
            return None;
        }
        Some(self.at(t))
    }

    /// 与球的最近交点距离
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrt_d = discriminant.sqrt();
        let near = -b - sqrt_d;
        if near >= 0.0 {
            return Some(near);
        }
        // 起点在球内
        let far = -b + sqrt_d;
        (far >= 0.0).then_some(far)
    }
}

/// 平面（点 + 法线）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    /// 法线为零向量时返回 `None`
    pub fn new(point: Vec3, normal: Vec3) -> Option<Self> {
        Some(Self { point, normal: normal.try_normalize()? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_plane() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z).unwrap();
        let plane = Plane::new(Vec3::new(0.0, 0.0, 1.0), Vec3::Z).unwrap();
        let hit = ray.intersect_plane(&plane).unwrap();
        assert!((hit - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-6);

        let parallel = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::X).unwrap();
        assert!(parallel.intersect_plane(&plane).is_none());

        let away = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z).unwrap();
        assert!(away.intersect_plane(&plane).is_none());
    }

    #[test]
    fn test_ray_sphere() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z).unwrap();
        let t = ray.intersect_sphere(Vec3::ZERO, 1.0).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
        assert!(ray.intersect_sphere(Vec3::new(3.0, 0.0, 0.0), 1.0).is_none());

        let inside = Ray::new(Vec3::ZERO, Vec3::X).unwrap();
        assert!((inside.intersect_sphere(Vec3::ZERO, 2.0).unwrap() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_direction_rejected() {
        assert!(Ray::new(Vec3::ZERO, Vec3::ZERO).is_none());
        assert!(Plane::new(Vec3::ZERO, Vec3::ZERO).is_none());
    }
}
