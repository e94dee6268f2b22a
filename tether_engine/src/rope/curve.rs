//! 绳子控制点与插值曲线

use glam::Vec3;

/// 控制点数量：锚点、25%、50%、75%、挂点
pub const ROPE_POINT_COUNT: usize = 5;

/// 四分点下垂量相对中点下垂量的比例
const QUARTER_SAG_RATIO: f32 = 0.5;

/// 绳子控制点，每帧原地重算
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RopeCurve {
    pub points: [Vec3; ROPE_POINT_COUNT],
    /// 本帧的松弛长度
    pub slack: f32,
}

impl RopeCurve {
    pub fn new(anchor: Vec3) -> Self {
        Self {
            points: [anchor; ROPE_POINT_COUNT],
            slack: 0.0,
        }
    }

    /// 按锚点和挂点重算控制点
    ///
    /// 中间三个点在直线插值的基础上往下垂，中点下垂最多，
    /// 四分点是中点的一半。绳子拉直时不下垂。
    pub fn rebuild(&mut self, anchor: Vec3, attach: Vec3, string_length: f32, sag_factor: f32) {
        let distance = anchor.distance(attach);
        self.slack = (string_length - distance).max(0.0);
        let mid_sag = self.slack * sag_factor;

        self.points[0] = anchor;
        self.points[1] = anchor.lerp(attach, 0.25);
        self.points[2] = anchor.lerp(attach, 0.5);
        self.points[3] = anchor.lerp(attach, 0.75);
        self.points[4] = attach;

        self.points[1].y -= mid_sag * QUARTER_SAG_RATIO;
        self.points[2].y -= mid_sag;
        self.points[3].y -= mid_sag * QUARTER_SAG_RATIO;
    }

    /// 中间三个点相对直线的下垂量
    pub fn sags(&self) -> [f32; 3] {
        let anchor = self.points[0];
        let attach = self.points[ROPE_POINT_COUNT - 1];
        let mut sags = [0.0; 3];
        for (i, t) in [0.25, 0.5, 0.75].into_iter().enumerate() {
            sags[i] = anchor.lerp(attach, t).y - self.points[i + 1].y;
        }
        sags
    }
}

/// 向心 Catmull-Rom 曲线求值
///
/// 端点外侧用镜像点补齐。返回 (位置, 切线)，切线未归一化。
pub fn catmull_rom(points: &[Vec3; ROPE_POINT_COUNT], t: f32) -> (Vec3, Vec3) {
    let last = ROPE_POINT_COUNT - 1;
    let p = last as f32 * t.clamp(0.0, 1.0);
    let mut segment = p.floor() as usize;
    let mut weight = p - segment as f32;
    if segment >= last {
        segment = last - 1;
        weight = 1.0;
    }

    let p1 = points[segment];
    let p2 = points[segment + 1];
    let p0 = if segment > 0 { points[segment - 1] } else { p1 * 2.0 - p2 };
    let p3 = if segment + 2 <= last { points[segment + 2] } else { p2 * 2.0 - p1 };

    let mut dt0 = p0.distance_squared(p1).powf(0.25);
    let mut dt1 = p1.distance_squared(p2).powf(0.25);
    let mut dt2 = p2.distance_squared(p3).powf(0.25);
    if dt1 < 1e-4 {
        dt1 = 1.0;
    }
    if dt0 < 1e-4 {
        dt0 = dt1;
    }
    if dt2 < 1e-4 {
        dt2 = dt1;
    }

    let t1 = ((p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1) * dt1;
    let t2 = ((p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2) * dt1;

    // 三次 Hermite
    let c0 = p1;
    let c1 = t1;
    let c2 = -3.0 * p1 + 3.0 * p2 - 2.0 * t1 - t2;
    let c3 = 2.0 * p1 - 2.0 * p2 + t1 + t2;

    let w = weight;
    let position = c0 + c1 * w + c2 * (w * w) + c3 * (w * w * w);
    let tangent = c1 + c2 * (2.0 * w) + c3 * (3.0 * w * w);
    (position, tangent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taut_rope_is_straight() {
        let mut curve = RopeCurve::new(Vec3::ZERO);
        curve.rebuild(Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.0, 1.0, 0.0), 2.0, 0.35);
        assert_eq!(curve.points.len(), ROPE_POINT_COUNT);
        assert_eq!(curve.slack, 0.0);
        assert!((curve.points[2] - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_slack_rope_sags() {
        let mut curve = RopeCurve::new(Vec3::ZERO);
        let anchor = Vec3::new(0.0, 3.0, 0.0);
        let attach = Vec3::new(1.0, 2.0, 0.0);
        curve.rebuild(anchor, attach, 2.0, 0.35);

        let slack = 2.0 - anchor.distance(attach);
        assert!((curve.slack - slack).abs() < 1e-6);

        let [quarter, mid, three_quarter] = curve.sags();
        assert!((mid - slack * 0.35).abs() < 1e-5);
        assert!(mid > 0.0);
        assert!(mid >= 2.0 * quarter - 1e-6);
        assert!(mid >= 2.0 * three_quarter - 1e-6);
        // 端点不动
        assert_eq!(curve.points[0], anchor);
        assert_eq!(curve.points[4], attach);
    }

    #[test]
    fn test_spline_passes_through_points() {
        let points = [
            Vec3::new(0.0, 3.0, 0.0),
            Vec3::new(0.2, 2.5, 0.0),
            Vec3::new(0.5, 2.0, 0.1),
            Vec3::new(0.7, 1.6, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        ];
        for (i, point) in points.iter().enumerate() {
            let (position, tangent) = catmull_rom(&points, i as f32 / 4.0);
            assert!((position - *point).length() < 1e-4, "point {i}");
            assert!(tangent.length() > 0.0);
        }
    }

    #[test]
    fn test_spline_degenerate_points_finite() {
        let points = [Vec3::ONE; ROPE_POINT_COUNT];
        let (position, tangent) = catmull_rom(&points, 0.37);
        assert!(position.is_finite());
        assert!(tangent.is_finite());
        assert!((position - Vec3::ONE).length() < 1e-6);
    }
}
