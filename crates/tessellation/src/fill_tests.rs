use crate::geometry_builder::*;
use crate::math::*;
use crate::path::{Path, PathBuilder, PathEvent};
use crate::{FillOptions, FillRule, FillTessellator, FillVertex, Orientation, VertexId};
use crate::{InvalidOptions, TessellationError};

use alloc::vec::Vec;
use core::f32::consts::PI;

fn tessellate(
    path: &Path,
    options: &FillOptions,
    log: bool,
) -> Result<VertexBuffers<Point, u16>, TessellationError> {
    let mut buffers: VertexBuffers<Point, u16> = VertexBuffers::new();
    {
        let mut vertex_builder = simple_builder(&mut buffers);
        let mut tess = FillTessellator::new();
        tess.set_logging(log);
        tess.tessellate_path(path, options, &mut vertex_builder)?;
    }

    check_mesh(&buffers);

    Ok(buffers)
}

fn check_mesh(buffers: &VertexBuffers<Point, u16>) {
    assert_eq!(buffers.indices.len() % 3, 0);
    for tri in buffers.indices.chunks(3) {
        for &idx in tri {
            assert!((idx as usize) < buffers.vertices.len(), "index {} out of range", idx);
        }
        let a = buffers.vertices[tri[0] as usize];
        let b = buffers.vertices[tri[1] as usize];
        let c = buffers.vertices[tri[2] as usize];
        assert!((b - a).cross(c - a) > 0.0, "triangle {:?} isn't counter-clockwise", tri);
    }
}

fn mesh_area(buffers: &VertexBuffers<Point, u16>) -> f32 {
    buffers
        .indices
        .chunks(3)
        .map(|tri| {
            let a = buffers.vertices[tri[0] as usize];
            let b = buffers.vertices[tri[1] as usize];
            let c = buffers.vertices[tri[2] as usize];
            (b - a).cross(c - a) * 0.5
        })
        .sum()
}

fn polygon_area(points: &[Point]) -> f32 {
    let mut area = 0.0;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        area += a.to_vector().cross(b.to_vector());
    }

    area.abs() * 0.5
}

fn assert_area(actual: f32, expected: f32) {
    let epsilon = 1e-3 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= epsilon,
        "expected an area of {}, got {}",
        expected,
        actual
    );
}

fn polygons(contours: &[&[Point]]) -> Path {
    let mut builder = Path::builder();
    for contour in contours {
        builder.begin(contour[0]).unwrap();
        for p in &contour[1..] {
            builder.line_to(*p).unwrap();
        }
        builder.close().unwrap();
    }

    builder.build().unwrap()
}

fn build(f: impl FnOnce(&mut PathBuilder)) -> Path {
    let mut builder = Path::builder();
    f(&mut builder);

    builder.build().unwrap()
}

fn rotated(path: &Path, angle: f32) -> Path {
    let (sin, cos) = angle.sin_cos();
    let points: Vec<Point> = path
        .points()
        .iter()
        .map(|p| point(p.x * cos - p.y * sin, p.x * sin + p.y * cos))
        .collect();

    Path::from_raw_parts(path.verbs(), &points).unwrap()
}

/// Tessellates the path with both fill rules and both sweep orientations.
fn test_path(path: &Path) {
    test_path_internal(path, FillRule::EvenOdd, None, None);
    test_path_internal(path, FillRule::NonZero, None, None);
}

fn test_path_internal(
    path: &Path,
    fill_rule: FillRule,
    expected_triangle_count: Option<usize>,
    expected_area: Option<f32>,
) {
    for orientation in [Orientation::Vertical, Orientation::Horizontal] {
        let options = FillOptions::tolerance(0.05)
            .with_fill_rule(fill_rule)
            .with_sweep_orientation(orientation);

        let buffers = match tessellate(path, &options, false) {
            Ok(buffers) => buffers,
            Err(e) => {
                // Run again with the sweep traced before failing.
                let _ = tessellate(path, &options, true);
                panic!("{:?} fill with {:?} sweep failed: {}", fill_rule, orientation, e);
            }
        };

        if let Some(expected) = expected_triangle_count {
            assert_eq!(
                buffers.indices.len() / 3,
                expected,
                "{:?} fill with {:?} sweep",
                fill_rule,
                orientation
            );
        }

        if let Some(expected) = expected_area {
            assert_area(mesh_area(&buffers), expected);
        }
    }
}

fn test_path_with_rotations(
    path: Path,
    step: f32,
    expected_triangle_count: Option<usize>,
    expected_area: Option<f32>,
) {
    let mut angle = 0.0;
    while angle < PI * 2.0 {
        let transformed_path = rotated(&path, angle);

        test_path_internal(
            &transformed_path,
            FillRule::EvenOdd,
            expected_triangle_count,
            expected_area,
        );
        test_path_internal(&transformed_path, FillRule::NonZero, None, None);

        angle += step;
    }
}

#[test]
fn test_simple_triangle() {
    let path = polygons(&[&[point(0.0, 0.0), point(1.0, 1.0), point(0.0, 1.0)]]);

    test_path_with_rotations(path, 0.01, Some(1), Some(0.5));
}

#[test]
fn test_square() {
    let path = build(|b| {
        b.add_rect(&box2d(0.0, 0.0, 10.0, 10.0)).unwrap();
    });

    let buffers = tessellate(&path, &FillOptions::default(), false).unwrap();
    assert_eq!(buffers.vertices.len(), 4);
    assert_eq!(buffers.indices.len(), 6);
    assert_area(mesh_area(&buffers), 100.0);
    for corner in [point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0), point(0.0, 10.0)] {
        assert!(buffers.vertices.contains(&corner));
    }
}

#[test]
fn test_convex_polygon() {
    let n = 12;
    let points: Vec<Point> = (0..n)
        .map(|i| {
            let (s, c) = (i as f32 * 2.0 * PI / n as f32).sin_cos();
            point(c * 10.0, s * 10.0)
        })
        .collect();
    let path = polygons(&[&points]);

    let buffers = tessellate(&path, &FillOptions::default(), false).unwrap();
    assert_eq!(buffers.vertices.len(), n);
    assert_eq!(buffers.indices.len() / 3, n - 2);
    assert_area(mesh_area(&buffers), polygon_area(&points));
}

#[test]
fn test_simple_monotone() {
    let points = [
        point(0.0, 0.0),
        point(-1.0, 1.0),
        point(-3.0, 2.0),
        point(-1.0, 3.0),
        point(-4.0, 5.0),
        point(0.0, 6.0),
    ];
    let path = polygons(&[&points]);

    test_path_internal(&path, FillRule::EvenOdd, Some(4), Some(polygon_area(&points)));
    test_path_internal(&path, FillRule::NonZero, Some(4), Some(polygon_area(&points)));
}

#[test]
fn test_simple_split() {
    let points = [
        point(0.0, 0.0),
        point(2.0, 1.0),
        point(2.0, 3.0),
        point(1.0, 2.0),
        point(0.0, 3.0),
    ];
    let area = polygon_area(&points);

    test_path_with_rotations(polygons(&[&points]), 0.001, Some(3), Some(area));
}

#[test]
fn test_simple_merge_split() {
    let points = [
        point(0.0, 0.0),
        point(1.0, 1.0),
        point(2.0, 0.0),
        point(2.0, 3.0),
        point(1.0, 2.0),
        point(0.0, 3.0),
    ];
    let area = polygon_area(&points);

    test_path_with_rotations(polygons(&[&points]), 0.001, Some(4), Some(area));
}

#[test]
fn test_simple_1() {
    let points = [
        point(0.0, 0.0),
        point(1.0, 1.0),
        point(2.0, 0.0),
        point(1.0, 3.0),
        point(0.5, 4.0),
        point(0.0, 3.0),
    ];
    let area = polygon_area(&points);

    test_path_with_rotations(polygons(&[&points]), 0.001, Some(4), Some(area));
}

#[test]
fn test_simple_aligned() {
    let points = [
        point(0.0, 0.0),
        point(1.0, 0.0),
        point(2.0, 0.0),
        point(2.0, 1.0),
        point(2.0, 2.0),
        point(1.0, 2.0),
        point(0.0, 2.0),
        point(0.0, 1.0),
    ];

    test_path_with_rotations(polygons(&[&points]), 0.01, None, Some(4.0));
}

#[test]
fn test_concave() {
    // A "U" shape, open at the top.
    let points = [
        point(0.0, 0.0),
        point(30.0, 0.0),
        point(30.0, 30.0),
        point(20.0, 30.0),
        point(20.0, 10.0),
        point(10.0, 10.0),
        point(10.0, 30.0),
        point(0.0, 30.0),
    ];
    let path = polygons(&[&points]);

    test_path_internal(&path, FillRule::EvenOdd, Some(6), Some(700.0));
    test_path_internal(&rotated(&path, PI), FillRule::NonZero, Some(6), Some(700.0));
}

#[test]
fn test_hole_1() {
    let outer = [point(-11.0, 5.0), point(0.0, -5.0), point(10.0, 5.0)];
    let inner = [point(-5.0, 2.0), point(0.0, -2.0), point(4.0, 2.0)];
    let path = polygons(&[&outer, &inner]);

    let hole_area = polygon_area(&outer) - polygon_area(&inner);
    test_path_with_rotations(path.clone(), 0.001, Some(6), Some(hole_area));

    // Both contours go the same way, so the inner one isn't a hole with the non-zero rule.
    test_path_internal(&path, FillRule::NonZero, None, Some(polygon_area(&outer)));
}

#[test]
fn test_hole_opposite_direction() {
    let path = build(|b| {
        b.add_rect(&box2d(0.0, 0.0, 10.0, 10.0)).unwrap();
        b.begin(point(2.0, 2.0)).unwrap();
        b.line_to(point(8.0, 2.0)).unwrap();
        b.line_to(point(8.0, 8.0)).unwrap();
        b.line_to(point(2.0, 8.0)).unwrap();
        b.close().unwrap();
    });

    test_path_internal(&path, FillRule::EvenOdd, Some(8), Some(64.0));
    test_path_internal(&path, FillRule::NonZero, Some(8), Some(64.0));
}

#[test]
fn test_degenerate_same_position() {
    let path = build(|b| {
        b.begin(point(0.0, 0.0)).unwrap();
        for _ in 0..5 {
            b.line_to(point(0.0, 0.0)).unwrap();
        }
        b.close().unwrap();
    });

    test_path_with_rotations(path, 0.01, Some(0), None);
}

#[test]
fn test_intersecting_bow_tie() {
    // Simple self-intersecting shape.
    // x  x
    // |\/|
    // |/\|
    // x  x
    let path = polygons(&[&[
        point(0.0, 0.0),
        point(2.0, 2.0),
        point(2.0, 0.0),
        point(0.0, 2.0),
    ]]);

    test_path_internal(&path, FillRule::EvenOdd, Some(2), Some(2.0));
    test_path_internal(&path, FillRule::NonZero, Some(2), Some(2.0));
}

#[test]
fn test_auto_intersection_type1() {
    //  o.___
    //   \   'o
    //    \ /
    //     x  <-- intersection!
    //    / \
    //  o.___\
    //       'o
    let path = polygons(&[&[
        point(0.0, 0.0),
        point(2.0, 1.0),
        point(0.0, 2.0),
        point(2.0, 3.0),
    ]]);

    test_path_with_rotations(path, 0.01, Some(2), Some(2.0));
}

#[test]
fn test_auto_intersection_type2() {
    //  o
    //  |\   ,o
    //  | \ / |
    //  |  x  | <-- intersection!
    //  | / \ |
    //  o'   \|
    //        o
    let path = polygons(&[&[
        point(0.0, 0.0),
        point(2.0, 3.0),
        point(2.0, 1.0),
        point(0.0, 2.0),
    ]]);

    test_path_with_rotations(path, 0.01, Some(2), None);
}

#[test]
fn test_auto_intersection_multi() {
    //      .
    //  ___/_\___
    //  | /   \ |
    //  |/     \|
    // /|       |\
    // \|       |/
    //  |\     /|
    //  |_\___/_|
    //     \ /
    //      '
    let square = [point(20.0, 20.0), point(60.0, 20.0), point(60.0, 60.0), point(20.0, 60.0)];
    let diamond = [point(40.0, 10.0), point(70.0, 40.0), point(40.0, 70.0), point(10.0, 40.0)];
    let path = polygons(&[&square, &diamond]);

    // The overlap is the square without its corners.
    test_path_with_rotations(path.clone(), 0.011, Some(8), Some(1600.0 + 1800.0 - 2.0 * 1400.0));
    test_path_internal(&path, FillRule::NonZero, None, Some(1600.0 + 1800.0 - 1400.0));
}

#[test]
fn test_star() {
    // A five-pointed star drawn in a single stroke.
    let points: Vec<Point> = (0..5)
        .map(|i| {
            let (s, c) = (PI / 2.0 + i as f32 * 4.0 * PI / 5.0).sin_cos();
            point(c * 100.0, s * 100.0)
        })
        .collect();
    let path = polygons(&[&points]);

    let even_odd = tessellate(&path, &FillOptions::even_odd(), false).unwrap();
    let non_zero = tessellate(&path, &FillOptions::non_zero(), false).unwrap();

    // The pentagon in the middle has a winding number of 2.
    let pentagon_area = mesh_area(&non_zero) - mesh_area(&even_odd);
    assert!(pentagon_area > 0.0);
    assert_eq!(even_odd.indices.len() / 3, 5);

    test_path(&path);
}

#[test]
fn test_identical_squares() {
    let path = build(|b| {
        b.add_rect(&box2d(0.0, 0.0, 10.0, 10.0)).unwrap();
        b.add_rect(&box2d(0.0, 0.0, 10.0, 10.0)).unwrap();
    });

    let even_odd = tessellate(&path, &FillOptions::even_odd(), false).unwrap();
    assert_area(mesh_area(&even_odd), 0.0);
    assert!(even_odd.indices.is_empty());

    let non_zero = tessellate(&path, &FillOptions::non_zero(), false).unwrap();
    assert_area(mesh_area(&non_zero), 100.0);
}

#[test]
fn test_overlapping_circles() {
    let path = build(|b| {
        b.add_circle(point(0.0, 0.0), 10.0).unwrap();
        b.add_circle(point(10.0, 0.0), 10.0).unwrap();
    });
    let options = FillOptions::tolerance(0.01);

    let even_odd = tessellate(&path, &options.with_fill_rule(FillRule::EvenOdd), false).unwrap();
    let non_zero = tessellate(&path, &options.with_fill_rule(FillRule::NonZero), false).unwrap();

    // Lens shaped intersection of two circles of radius r whose centers are r apart.
    let r: f32 = 10.0;
    let lens = r * r * (2.0 * PI / 3.0 - 3.0f32.sqrt() / 2.0);
    let union = 2.0 * PI * r * r - lens;

    let even_odd_area = mesh_area(&even_odd);
    let non_zero_area = mesh_area(&non_zero);
    assert!((non_zero_area - union).abs() < union * 0.01);
    assert!((even_odd_area - (union - lens)).abs() < union * 0.01);
    assert!(even_odd_area < non_zero_area);
}

#[test]
fn test_circle_area() {
    let path = build(|b| {
        b.add_circle(point(5.0, -3.0), 50.0).unwrap();
    });

    for tolerance in [0.5, 0.1, 0.01] {
        let buffers = tessellate(&path, &FillOptions::tolerance(tolerance), false).unwrap();
        let area = mesh_area(&buffers);
        let exact = PI * 50.0 * 50.0;

        // The flattened circle is inscribed.
        assert!(area <= exact * 1.001);
        assert!(area >= exact * 0.97);
    }
}

#[test]
fn three_edges_below() {
    //       .
    //      /|
    //     / |
    //    x  |
    //   /|\ |
    //  / | \|
    // /__|  .
    let path = polygons(&[
        &[point(1.0, 0.0), point(0.0, 1.0), point(2.0, 2.0)],
        &[point(1.0, 0.0), point(-1.0, 2.0), point(0.0, 1.0), point(0.0, 2.0)],
    ]);

    test_path(&path);
}

#[test]
fn test_colinear_1() {
    let path = polygons(&[&[point(20.0, 150.0), point(80.0, 150.0)]]);

    test_path_with_rotations(path, 0.01, Some(0), None);
}

#[test]
fn test_colinear_2() {
    let path = polygons(&[&[point(20.0, 150.0), point(80.0, 150.0), point(20.0, 150.0)]]);

    test_path_with_rotations(path, 0.01, Some(0), None);
}

#[test]
fn test_colinear_3() {
    // The path goes through many points along a line.
    let path = polygons(&[&[
        point(0.0, 1.0),
        point(0.0, 3.0),
        point(0.0, 5.0),
        point(0.0, 4.0),
        point(0.0, 2.0),
    ]]);

    test_path_internal(&path, FillRule::EvenOdd, Some(0), None);
    test_path_internal(&path, FillRule::NonZero, Some(0), None);
}

#[test]
fn test_colinear_4() {
    // The path goes back and forth along a line.
    let path = polygons(&[&[point(0.0, 2.0), point(0.0, 1.0), point(0.0, 3.0), point(0.0, 0.0)]]);

    test_path_internal(&path, FillRule::EvenOdd, Some(0), None);
    test_path_internal(&path, FillRule::NonZero, Some(0), None);
}

#[test]
fn test_colinear_touching_squares() {
    // Two squares touching.
    //
    // x-----x-----x
    // |     |     |
    // |     |     |
    // x-----x-----x
    //
    let path = polygons(&[
        &[point(0.0, 0.0), point(1.0, 0.0), point(1.0, 1.0), point(0.0, 1.0)],
        &[point(1.0, 0.0), point(2.0, 0.0), point(2.0, 1.0), point(1.0, 1.0)],
    ]);

    test_path_internal(&path, FillRule::EvenOdd, None, Some(2.0));
    test_path_internal(&path, FillRule::NonZero, None, Some(2.0));
}

#[test]
fn angle_precision() {
    // Some of the edges are almost parallel, which puts the precision of their ordering
    // in the sweep line to the test.
    let path = polygons(&[&[
        point(0.007982401, 0.0121872),
        point(0.008415101, 0.0116545),
        point(0.008623006, 0.011589845),
        point(0.008464893, 0.011639819),
        point(0.0122631, 0.0069716),
    ]]);

    test_path(&path);
}

#[test]
fn n_segments_intersecting() {
    // Many segments intersecting at the same position (center).
    for i in 1..6 {
        let mut builder = Path::builder();

        let center = point(-2.0, -5.0);
        let n = i * 4 - 1;
        let delta = PI / n as f32;
        let mut radius = 1000.0;
        builder.begin(center + vector(radius, 0.0)).unwrap();
        builder.line_to(center - vector(-radius, 0.0)).unwrap();
        for i in 0..n {
            let (s, c) = (i as f32 * delta).sin_cos();
            builder.line_to(center + vector(c, s) * radius).unwrap();
            builder.line_to(center - vector(c, s) * radius).unwrap();
            radius = -radius;
        }
        builder.close().unwrap();

        test_path_with_rotations(builder.build().unwrap(), 0.1, None, None);
    }
}

#[test]
fn back_along_previous_edge() {
    // Edges that come back along the previous edge.
    let path = polygons(&[&[point(0.0, 0.0), point(1.0, 1.0), point(0.8, 0.8), point(1.5, 1.5)]]);

    test_path(&path);
}

#[test]
fn spike_back_along_vertical_edge() {
    // (70, 80) -> (70, 59) -> (70, 79) goes up and comes most of the way back down,
    // only (70, 79) -> (70, 80) is left of the spike.
    let path = polygons(&[&[
        point(90.0, 94.0),
        point(70.0, 80.0),
        point(70.0, 59.0),
        point(70.0, 79.0),
        point(52.0, 42.0),
    ]]);

    let expected = polygon_area(&[
        point(90.0, 94.0),
        point(70.0, 80.0),
        point(70.0, 79.0),
        point(52.0, 42.0),
    ]);
    assert_area(expected, 245.0);

    test_path_internal(&path, FillRule::EvenOdd, None, Some(245.0));
    test_path_internal(&path, FillRule::NonZero, None, Some(245.0));
}

#[test]
fn spike_back_along_horizontal_edge() {
    // Same shape, a quarter turn: the spike is now a horizontal edge on the sweep line
    // that is split by the point where it turns back.
    let path = polygons(&[&[
        point(-94.0, 90.0),
        point(-80.0, 70.0),
        point(-59.0, 70.0),
        point(-79.0, 70.0),
        point(-42.0, 52.0),
    ]]);

    test_path_internal(&path, FillRule::EvenOdd, None, Some(245.0));
    test_path_internal(&path, FillRule::NonZero, None, Some(245.0));
}

#[test]
fn random_polygons_coverage() {
    use crate::geom::LineSegment;

    // xorshift32, fixed seed.
    let mut state: u32 = 0x2545_f491;
    let mut next = move |n: u32| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state % n
    };

    fn winding_number(contour: &[Point], p: Point) -> i16 {
        let mut winding = 0;
        for i in 0..contour.len() {
            let a = contour[i];
            let b = contour[(i + 1) % contour.len()];
            let side = (b - a).cross(p - a);
            if a.y <= p.y {
                if b.y > p.y && side > 0.0 {
                    winding += 1;
                }
            } else if b.y <= p.y && side < 0.0 {
                winding -= 1;
            }
        }

        winding
    }

    fn near_segment(a: Point, b: Point, p: Point) -> bool {
        LineSegment { from: a, to: b }.distance_to_point(p) < 0.1
    }

    for _ in 0..48 {
        let n = 4 + next(4) as usize;
        let contour: Vec<Point> = (0..n)
            .map(|_| point(next(101) as f32, next(101) as f32))
            .collect();
        let path = polygons(&[&contour[..]]);

        for fill_rule in [FillRule::EvenOdd, FillRule::NonZero] {
            for orientation in [Orientation::Vertical, Orientation::Horizontal] {
                let options = FillOptions::tolerance(0.05)
                    .with_fill_rule(fill_rule)
                    .with_sweep_orientation(orientation);
                let buffers = tessellate(&path, &options, false).unwrap();
                let triangles: Vec<[Point; 3]> = buffers
                    .indices
                    .chunks(3)
                    .map(|tri| {
                        [
                            buffers.vertices[tri[0] as usize],
                            buffers.vertices[tri[1] as usize],
                            buffers.vertices[tri[2] as usize],
                        ]
                    })
                    .collect();

                for i in 0..50 {
                    for j in 0..50 {
                        let p = point(i as f32 * 2.0 + 0.5, j as f32 * 2.0 + 0.5);

                        let on_contour = (0..n)
                            .any(|k| near_segment(contour[k], contour[(k + 1) % n], p));
                        let on_triangle = triangles.iter().any(|t| {
                            near_segment(t[0], t[1], p)
                                || near_segment(t[1], t[2], p)
                                || near_segment(t[2], t[0], p)
                        });
                        if on_contour || on_triangle {
                            continue;
                        }

                        let covered = triangles
                            .iter()
                            .filter(|t| {
                                (t[1] - t[0]).cross(p - t[0]) > 0.0
                                    && (t[2] - t[1]).cross(p - t[1]) > 0.0
                                    && (t[0] - t[2]).cross(p - t[2]) > 0.0
                            })
                            .count();
                        let expected = fill_rule.is_in(winding_number(&contour, p)) as usize;

                        assert_eq!(
                            covered, expected,
                            "{:?} fill of {:?} with {:?} sweep at {:?}",
                            fill_rule, contour, orientation, p
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn test_sweep_orientations_agree() {
    let path = build(|b| {
        b.add_rounded_rect(&box2d(0.0, 0.0, 80.0, 40.0), 10.0).unwrap();
        b.add_ellipse(point(40.0, 20.0), size(20.0, 10.0)).unwrap();
        b.begin(point(-10.0, -10.0)).unwrap();
        b.quadratic_bezier_to(point(50.0, 80.0), point(90.0, -10.0)).unwrap();
        b.cubic_bezier_to(point(60.0, 20.0), point(20.0, 20.0), point(-10.0, -10.0)).unwrap();
        b.close().unwrap();
    });

    for fill_rule in [FillRule::EvenOdd, FillRule::NonZero] {
        let options = FillOptions::tolerance(0.05).with_fill_rule(fill_rule);
        let vertical = tessellate(&path, &options, false).unwrap();
        let horizontal = tessellate(
            &path,
            &options.with_sweep_orientation(Orientation::Horizontal),
            false,
        )
        .unwrap();

        assert!(!vertical.indices.is_empty());
        assert_area(mesh_area(&horizontal), mesh_area(&vertical));
    }
}

#[test]
fn test_without_intersections() {
    let path = build(|b| {
        b.add_circle(point(0.0, 0.0), 20.0).unwrap();
        b.add_rect(&box2d(-5.0, -5.0, 5.0, 5.0)).unwrap();
    });

    let options = FillOptions::tolerance(0.05);
    let checked = tessellate(&path, &options, false).unwrap();
    let unchecked = tessellate(&path, &options.with_intersections(false), false).unwrap();

    assert_eq!(checked.vertices, unchecked.vertices);
    assert_eq!(checked.indices, unchecked.indices);
}

#[test]
fn test_deterministic_output() {
    let path = polygons(&[
        &[point(20.0, 20.0), point(60.0, 20.0), point(60.0, 60.0), point(20.0, 60.0)],
        &[point(40.0, 10.0), point(70.0, 40.0), point(40.0, 70.0), point(10.0, 40.0)],
    ]);

    let mut tess = FillTessellator::new();
    let mut results = Vec::new();
    for _ in 0..3 {
        let mut buffers: VertexBuffers<Point, u16> = VertexBuffers::new();
        tess.tessellate_path(&path, &FillOptions::default(), &mut simple_builder(&mut buffers))
            .unwrap();
        results.push(buffers);
    }

    for buffers in &results[1..] {
        assert_eq!(buffers.vertices, results[0].vertices);
        assert_eq!(buffers.indices, results[0].indices);
    }
}

#[test]
fn test_empty_input() {
    let mut buffers: VertexBuffers<Point, u16> = VertexBuffers::new();
    let mut tess = FillTessellator::new();

    tess.tessellate_path(&Path::new(), &FillOptions::default(), &mut simple_builder(&mut buffers))
        .unwrap();
    assert!(buffers.vertices.is_empty());

    let events = [
        PathEvent::Begin {
            at: point(1.0, 1.0),
        },
        PathEvent::End {
            last: point(1.0, 1.0),
            first: point(1.0, 1.0),
            close: true,
        },
    ];
    tess.tessellate(events, &FillOptions::default(), &mut simple_builder(&mut buffers))
        .unwrap();
    assert!(buffers.vertices.is_empty());
    assert!(buffers.indices.is_empty());
}

#[test]
fn test_non_finite_input() {
    let events = [
        PathEvent::Begin {
            at: point(0.0, 0.0),
        },
        PathEvent::Line {
            from: point(0.0, 0.0),
            to: point(f32::NAN, 1.0),
        },
        PathEvent::Line {
            from: point(f32::NAN, 1.0),
            to: point(1.0, 0.0),
        },
        PathEvent::End {
            last: point(1.0, 0.0),
            first: point(0.0, 0.0),
            close: true,
        },
    ];

    let mut buffers: VertexBuffers<Point, u16> = VertexBuffers::new();
    let result = FillTessellator::new().tessellate(
        events,
        &FillOptions::default(),
        &mut simple_builder(&mut buffers),
    );

    assert_eq!(
        result,
        Err(TessellationError::GeometryBuilder(GeometryBuilderError::InvalidVertex))
    );
    assert!(buffers.vertices.is_empty());
    assert!(buffers.indices.is_empty());
}

#[test]
fn test_invalid_options() {
    struct Recorder {
        begun: bool,
    }

    impl GeometryBuilder for Recorder {
        fn begin_geometry(&mut self) {
            self.begun = true;
        }
        fn add_triangle(&mut self, _: VertexId, _: VertexId, _: VertexId) {
            panic!("unexpected triangle");
        }
    }

    impl FillGeometryBuilder for Recorder {
        fn add_fill_vertex(&mut self, _: FillVertex) -> Result<VertexId, GeometryBuilderError> {
            panic!("unexpected vertex");
        }
    }

    let path = polygons(&[&[point(0.0, 0.0), point(1.0, 0.0), point(1.0, 1.0)]]);
    let mut output = Recorder { begun: false };

    for tolerance in [0.0, -1.0, f32::NAN] {
        assert_eq!(
            FillTessellator::new().tessellate_path(
                &path,
                &FillOptions::tolerance(tolerance),
                &mut output
            ),
            Err(TessellationError::InvalidOptions(InvalidOptions::Tolerance)),
        );
    }

    assert!(!output.begun);
}

#[test]
fn test_too_many_vertices() {
    // The geometry builder runs out of vertex ids.
    struct Builder {
        max_vertices: u32,
        aborted: bool,
    }

    impl GeometryBuilder for Builder {
        fn add_triangle(&mut self, _a: VertexId, _b: VertexId, _c: VertexId) {}
        fn abort_geometry(&mut self) {
            self.aborted = true;
        }
    }

    impl FillGeometryBuilder for Builder {
        fn add_fill_vertex(&mut self, _: FillVertex) -> Result<VertexId, GeometryBuilderError> {
            if self.max_vertices == 0 {
                return Err(GeometryBuilderError::TooManyVertices);
            }
            self.max_vertices -= 1;
            Ok(VertexId(self.max_vertices))
        }
    }

    let path = build(|b| {
        b.add_circle(point(0.0, 0.0), 100.0).unwrap();
        b.add_rect(&box2d(-50.0, -50.0, 50.0, 50.0)).unwrap();
    });

    let mut tess = FillTessellator::new();
    let options = FillOptions::tolerance(0.05);

    for max_vertices in [0, 10, 100] {
        let mut output = Builder {
            max_vertices,
            aborted: false,
        };
        assert_eq!(
            tess.tessellate_path(&path, &options, &mut output),
            Err(TessellationError::GeometryBuilder(
                GeometryBuilderError::TooManyVertices
            )),
        );
        assert!(output.aborted);
    }
}

#[test]
fn test_small_index_type() {
    let path = build(|b| {
        b.add_circle(point(0.0, 0.0), 100.0).unwrap();
    });

    let mut buffers: VertexBuffers<Point, u8> = VertexBuffers::new();
    let result = FillTessellator::new().tessellate_path(
        &path,
        &FillOptions::tolerance(0.01),
        &mut BuffersBuilder::new(&mut buffers, Positions),
    );

    assert_eq!(
        result,
        Err(TessellationError::GeometryBuilder(GeometryBuilderError::TooManyVertices))
    );

    // The partial output stays consistent.
    assert_eq!(buffers.vertices.len(), 255);
    assert_eq!(buffers.indices.len() % 3, 0);
    assert!(buffers.indices.iter().all(|&i| (i as usize) < buffers.vertices.len()));
}

#[test]
fn test_callback_abort() {
    let path = build(|b| {
        b.add_circle(point(0.0, 0.0), 10.0).unwrap();
    });

    let mut count = 0u32;
    let mut triangles = Vec::new();
    let result = FillTessellator::new().tessellate_path(
        &path,
        &FillOptions::tolerance(0.01),
        &mut CallbackBuilder::new(
            |_: f32, _: f32| {
                if count == 20 {
                    return u32::MAX - 1;
                }
                count += 1;
                count - 1
            },
            |a, b, c| triangles.push([a, b, c]),
        ),
    );

    assert_eq!(
        result,
        Err(TessellationError::GeometryBuilder(GeometryBuilderError::InvalidVertex))
    );
    assert_eq!(count, 20);
    assert!(triangles.iter().flatten().all(|&i| i < 20));
}

#[test]
fn test_vertex_offset() {
    let path = build(|b| {
        b.add_rect(&box2d(0.0, 0.0, 1.0, 1.0)).unwrap();
    });

    let mut tess = FillTessellator::new();

    // Appending to buffers that already hold vertices.
    let mut buffers: VertexBuffers<Point, u32> = VertexBuffers::new();
    buffers.vertices.extend([point(-1.0, -1.0); 3]);
    tess.tessellate_path(
        &path,
        &FillOptions::default(),
        &mut BuffersBuilder::new(&mut buffers, Positions),
    )
    .unwrap();

    assert_eq!(buffers.vertices.len(), 7);
    assert_eq!(buffers.indices.len(), 6);
    assert!(buffers.indices.iter().all(|&i| (3..7).contains(&i)));

    // Indices into a larger vertex buffer assembled elsewhere.
    let mut buffers: VertexBuffers<Point, u32> = VertexBuffers::new();
    tess.tessellate_path(
        &path,
        &FillOptions::default(),
        &mut BuffersBuilder::new(&mut buffers, Positions).with_vertex_offset(100),
    )
    .unwrap();

    assert_eq!(buffers.vertices.len(), 4);
    assert!(buffers.indices.iter().all(|&i| (100..104).contains(&i)));
}
