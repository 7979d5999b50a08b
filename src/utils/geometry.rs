/// Geometry utilities: perspective transforms, convex hulls and
/// minimum-area rectangles
use crate::models::Point;

/// Perspective transformation matrix (3x3)
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveTransform {
    a11: f64,
    a12: f64,
    a13: f64,
    a21: f64,
    a22: f64,
    a23: f64,
    a31: f64,
    a32: f64,
    a33: f64,
}

impl PerspectiveTransform {
    /// Create transform from 4 source points to 4 destination points
    pub fn from_points(src: &[Point; 4], dst: &[Point; 4]) -> Option<Self> {
        // Direct linear transform with a33 fixed to 1
        let mut a = [[0.0f64; 8]; 8];
        let mut b = [0.0f64; 8];

        for i in 0..4 {
            let (sx, sy) = (src[i].x as f64, src[i].y as f64);
            let (dx, dy) = (dst[i].x as f64, dst[i].y as f64);

            let row = i * 2;
            a[row] = [sx, sy, 1.0, 0.0, 0.0, 0.0, -dx * sx, -dx * sy];
            b[row] = dx;
            a[row + 1] = [0.0, 0.0, 0.0, sx, sy, 1.0, -dy * sx, -dy * sy];
            b[row + 1] = dy;
        }

        solve_linear_system(&a, &b).map(|solution| Self {
            a11: solution[0],
            a12: solution[1],
            a13: solution[2],
            a21: solution[3],
            a22: solution[4],
            a23: solution[5],
            a31: solution[6],
            a32: solution[7],
            a33: 1.0,
        })
    }

    /// Map the square `(0,0) (side,0) (side,side) (0,side)` onto `quad`
    pub fn square_to_quad(side: f32, quad: &[Point; 4]) -> Option<Self> {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(side, 0.0),
            Point::new(side, side),
            Point::new(0.0, side),
        ];
        Self::from_points(&square, quad)
    }

    /// Transform a point using this perspective matrix
    pub fn transform(&self, p: &Point) -> Point {
        let x = p.x as f64;
        let y = p.y as f64;

        let denominator = self.a31 * x + self.a32 * y + self.a33;
        if denominator.abs() < 1e-10 {
            return Point::new(0.0, 0.0);
        }

        let x_new = (self.a11 * x + self.a12 * y + self.a13) / denominator;
        let y_new = (self.a21 * x + self.a22 * y + self.a23) / denominator;

        Point::new(x_new as f32, y_new as f32)
    }
}

/// Solve 8x8 linear system using Gaussian elimination
#[allow(clippy::needless_range_loop)]
fn solve_linear_system(a: &[[f64; 8]; 8], b: &[f64; 8]) -> Option<[f64; 8]> {
    let mut a = *a;
    let mut b = *b;
    let n = 8;

    for i in 0..n {
        let mut max_val = a[i][i].abs();
        let mut max_row = i;
        for k in (i + 1)..n {
            if a[k][i].abs() > max_val {
                max_val = a[k][i].abs();
                max_row = k;
            }
        }

        // Singular
        if max_val < 1e-9 {
            return None;
        }

        if max_row != i {
            a.swap(i, max_row);
            b.swap(i, max_row);
        }

        for k in (i + 1)..n {
            let factor = a[k][i] / a[i][i];
            b[k] -= factor * b[i];
            for j in i..n {
                a[k][j] -= factor * a[i][j];
            }
        }
    }

    let mut x = [0.0f64; 8];
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in (i + 1)..n {
            sum -= a[i][j] * x[j];
        }
        x[i] = sum / a[i][i];
    }

    Some(x)
}

/// Convex hull (monotone chain), counter-clockwise in y-up terms.
///
/// Collinear points are dropped. Fewer than three distinct points are
/// returned as-is after sorting and de-duplication.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let turn = |o: &Point, a: &Point, b: &Point| o.to(a).cross(&o.to(b));

    let mut hull: Vec<Point> = Vec::with_capacity(pts.len() * 2);
    for p in &pts {
        while hull.len() >= 2 && turn(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(*p);
    }
    let lower_len = hull.len() + 1;
    for p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && turn(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(*p);
    }
    hull.pop();
    hull
}

/// Absolute shoelace area of a polygon
pub fn polygon_area(polygon: &[Point]) -> f32 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f32 = (0..n).map(|i| polygon[i].cross(&polygon[(i + 1) % n])).sum();
    (twice * 0.5).abs()
}

/// Rectangle with arbitrary orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedRect {
    /// Corners in order around the rectangle, positive shoelace sum
    pub corners: [Point; 4],
    /// Length along the first edge
    pub width: f32,
    /// Length along the second edge
    pub height: f32,
}

impl OrientedRect {
    /// Rectangle area
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Longer side over shorter side
    pub fn aspect(&self) -> f32 {
        let short = self.width.min(self.height);
        if short <= 0.0 {
            return f32::INFINITY;
        }
        self.width.max(self.height) / short
    }
}

/// Minimum-area enclosing rectangle of a convex hull (rotating calipers over
/// hull edges), grown by `pad` on every side.
pub fn min_area_rect(hull: &[Point], pad: f32) -> Option<OrientedRect> {
    if hull.len() < 3 {
        return None;
    }

    let mut best: Option<(f32, Point, f32, f32, f32, f32)> = None;
    for i in 0..hull.len() {
        let edge = hull[i].to(&hull[(i + 1) % hull.len()]);
        let len = edge.norm();
        if len < 1e-6 {
            continue;
        }
        let u = Point::new(edge.x / len, edge.y / len);
        let v = Point::new(-u.y, u.x);

        let (mut min_u, mut max_u) = (f32::MAX, f32::MIN);
        let (mut min_v, mut max_v) = (f32::MAX, f32::MIN);
        for p in hull {
            let pu = p.dot(&u);
            let pv = p.dot(&v);
            min_u = min_u.min(pu);
            max_u = max_u.max(pu);
            min_v = min_v.min(pv);
            max_v = max_v.max(pv);
        }

        let area = (max_u - min_u) * (max_v - min_v);
        if best.is_none_or(|b| area < b.0) {
            best = Some((area, u, min_u - pad, max_u + pad, min_v - pad, max_v + pad));
        }
    }

    let (_, u, min_u, max_u, min_v, max_v) = best?;
    let v = Point::new(-u.y, u.x);
    let at = |a: f32, b: f32| Point::new(u.x * a + v.x * b, u.y * a + v.y * b);
    let mut corners = [
        at(min_u, min_v),
        at(max_u, min_v),
        at(max_u, max_v),
        at(min_u, max_v),
    ];

    let twice: f32 = (0..4).map(|i| corners[i].cross(&corners[(i + 1) % 4])).sum();
    if twice < 0.0 {
        corners.reverse();
    }

    Some(OrientedRect {
        corners,
        width: max_u - min_u,
        height: max_v - min_v,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perspective_transform() {
        let src = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ];

        let dst = [
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(50.0, 50.0),
            Point::new(0.0, 50.0),
        ];

        let t = PerspectiveTransform::from_points(&src, &dst).unwrap();
        let p = t.transform(&Point::new(50.0, 50.0));
        assert!((p.x - 25.0).abs() < 1e-3 && (p.y - 25.0).abs() < 1e-3);
    }

    #[test]
    fn test_square_to_quad() {
        let quad = [
            Point::new(110.0, 40.0),
            Point::new(200.0, 60.0),
            Point::new(180.0, 150.0),
            Point::new(90.0, 130.0),
        ];
        let t = PerspectiveTransform::square_to_quad(12.0, &quad).unwrap();
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(12.0, 0.0),
            Point::new(12.0, 12.0),
            Point::new(0.0, 12.0),
        ];
        for (c, q) in corners.iter().zip(quad.iter()) {
            assert!(t.transform(c).distance(q) < 1e-2);
        }
    }

    #[test]
    fn test_degenerate_transform() {
        let collapsed = [Point::new(5.0, 5.0); 4];
        assert!(PerspectiveTransform::square_to_quad(10.0, &collapsed).is_none());
    }

    #[test]
    fn test_convex_hull() {
        let mut points = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
            Point::new(2.0, 0.0),
        ];
        for x in 1..4 {
            for y in 1..4 {
                points.push(Point::new(x as f32, y as f32));
            }
        }
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 4);
        assert!((polygon_area(&hull) - 16.0).abs() < 1e-4);
    }

    #[test]
    fn test_min_area_rect_rotated() {
        // Square of side 10 rotated by 30 degrees about (50, 50)
        let (s, c) = 30f32.to_radians().sin_cos();
        let square: Vec<Point> = [(-5.0, -5.0), (5.0, -5.0), (5.0, 5.0), (-5.0, 5.0)]
            .iter()
            .map(|&(x, y)| Point::new(50.0 + x * c - y * s, 50.0 + x * s + y * c))
            .collect();
        let hull = convex_hull(&square);
        let rect = min_area_rect(&hull, 0.5).unwrap();

        assert!((rect.width - 11.0).abs() < 1e-3);
        assert!((rect.height - 11.0).abs() < 1e-3);
        assert!((rect.aspect() - 1.0).abs() < 1e-3);
        let twice: f32 = (0..4)
            .map(|i| rect.corners[i].cross(&rect.corners[(i + 1) % 4]))
            .sum();
        assert!(twice > 0.0);
    }
}
