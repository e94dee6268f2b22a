//! 相机能力接口

use glam::{Mat4, Vec2, Vec3};

use super::ray::Ray;

/// 场景相机
pub trait SceneCamera {
    /// 屏幕坐标（客户区像素，左上角为原点）转世界射线
    fn ray_from_client(&self, client: Vec2) -> Option<Ray>;

    /// 相机朝向（单位向量）
    fn view_direction(&self) -> Vec3;
}

/// 透视相机
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// 垂直视角（弧度）
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// 视口尺寸（像素）
    pub viewport: Vec2,
}

impl PerspectiveCamera {
    pub fn new(position: Vec3, target: Vec3, viewport: Vec2) -> Self {
        Self {
            position,
            target,
            up: Vec3::Y,
            fov_y: 45f32.to_radians(),
            near: 0.1,
            far: 100.0,
            viewport,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let aspect = if self.viewport.y > 0.0 { self.viewport.x / self.viewport.y } else { 1.0 };
        Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
    }

    /// 客户区坐标转 NDC
    pub fn client_to_ndc(&self, client: Vec2) -> Option<Vec2> {
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return None;
        }
        Some(Vec2::new(
            client.x / self.viewport.x * 2.0 - 1.0,
            -(client.y / self.viewport.y * 2.0 - 1.0),
        ))
    }

    /// 世界坐标投影到客户区（测试和宿主摆放 UI 用）
    pub fn world_to_client(&self, point: Vec3) -> Vec2 {
        let ndc = (self.projection_matrix() * self.view_matrix()).project_point3(point);
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        )
    }
}

impl SceneCamera for PerspectiveCamera {
    fn ray_from_client(&self, client: Vec2) -> Option<Ray> {
        let ndc = self.client_to_ndc(client)?;
        let inverse = (self.projection_matrix() * self.view_matrix()).inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray::new(near, far - near)
    }

    fn view_direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_looks_forward() {
        let camera = PerspectiveCamera::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec2::new(800.0, 600.0));
        let ray = camera.ray_from_client(Vec2::new(400.0, 300.0)).unwrap();
        assert!(ray.direction.dot(Vec3::NEG_Z) > 0.9999);
        assert!(camera.view_direction().dot(Vec3::NEG_Z) > 0.9999);
    }

    #[test]
    fn test_project_then_cast_hits_point() {
        let camera = PerspectiveCamera::new(Vec3::new(0.0, 1.0, 8.0), Vec3::new(0.0, 1.0, 0.0), Vec2::new(1024.0, 768.0));
        let point = Vec3::new(0.7, 1.6, 0.0);
        let client = camera.world_to_client(point);
        let ray = camera.ray_from_client(client).unwrap();
        let t = ray.intersect_sphere(point, 0.01);
        assert!(t.is_some());
    }

    #[test]
    fn test_empty_viewport_has_no_ray() {
        let camera = PerspectiveCamera::new(Vec3::Z, Vec3::ZERO, Vec2::ZERO);
        assert!(camera.ray_from_client(Vec2::ZERO).is_none());
    }
}
