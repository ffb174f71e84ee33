use imageproc::point::Point;

use crate::raster::BoundingBox;


/// Enclosed area of a closed polygon (shoelace)
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points.iter().zip(points.iter().cycle().skip(1)).map(|(a, b)| {
        a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
    }).sum();
    (twice as f64 / 2.0).abs()
}

fn squared_distance(a: &Point<i32>, b: &Point<i32>) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    dx * dx + dy * dy
}

// distance from p to the line through a and b, or to a when a == b
fn line_distance(p: &Point<i32>, a: &Point<i32>, b: &Point<i32>) -> f64 {
    let len = squared_distance(a, b).sqrt();
    if len == 0.0 {
        return squared_distance(p, a).sqrt();
    }
    let cross = (b.x - a.x) as f64 * (p.y - a.y) as f64 - (b.y - a.y) as f64 * (p.x - a.x) as f64;
    cross.abs() / len
}

/// Douglas-Peucker on an open curve, both end points are always kept
fn simplify_open(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut stack = vec![(0, points.len() - 1)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let (index, dmax) = (start + 1..end).fold((start, 0.0), |(index, dmax), i| {
            let d = line_distance(&points[i], &points[start], &points[end]);
            if d > dmax { (i, d) } else { (index, dmax) }
        });
        if dmax > epsilon {
            keep[index] = true;
            stack.push((start, index));
            stack.push((index, end));
        }
    }
    points.iter().zip(keep).filter(|(_, k)| *k).map(|(p, _)| *p).collect()
}

fn farthest_from(points: &[Point<i32>], origin: &Point<i32>) -> (usize, f64) {
    points.iter().enumerate().fold((0, 0.0), |(index, best), (i, p)| {
        let d = squared_distance(origin, p);
        if d > best { (i, d) } else { (index, best) }
    })
}

/// Approximate a closed contour with a polygon whose vertices deviate from it
/// by at most `epsilon`.
///
/// The raster scan start of a contour usually sits on an edge near a rounded
/// corner, so the contour is restarted at the point farthest from it, which is
/// an extreme point of the shape. It is then cut there and at the point
/// farthest from the new start, each half is simplified on its own, and
/// vertices that sit on the segment joining their neighbours are dropped.
pub fn approximate_closed_polygon(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let (start, start_dist) = farthest_from(points, &points[0]);
    if start_dist == 0.0 {
        return vec![points[0]];
    }
    let points: Vec<Point<i32>> = points[start..].iter().chain(points[..start].iter()).cloned().collect();
    let first = points[0];
    let (far, _) = farthest_from(&points, &first);

    let mut polygon = simplify_open(&points[..=far], epsilon);
    let mut back: Vec<Point<i32>> = points[far..].to_vec();
    back.push(first);
    let back = simplify_open(&back, epsilon);
    // skip the shared far point and the closing copy of the first point
    polygon.extend_from_slice(&back[1..back.len() - 1]);

    let mut i = 0;
    while polygon.len() > 3 && i < polygon.len() {
        let n = polygon.len();
        let prev = polygon[(i + n - 1) % n];
        let next = polygon[(i + 1) % n];
        if line_distance(&polygon[i], &prev, &next) <= epsilon {
            polygon.remove(i);
            i = 0;
        } else {
            i += 1;
        }
    }
    polygon
}

/// Smallest axis aligned box holding every point, edges inclusive
pub fn bounding_rect(points: &[Point<i32>]) -> Option<BoundingBox> {
    let first = points.first()?;
    let (min_x, min_y, max_x, max_y) = points.iter().fold(
        (first.x, first.y, first.x, first.y),
        |(min_x, min_y, max_x, max_y), p| (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y)),
    );
    if min_x < 0 || min_y < 0 {
        return None;
    }
    Some(BoundingBox::new(min_x as u32, min_y as u32, (max_x - min_x + 1) as u32, (max_y - min_y + 1) as u32))
}
