use image::GrayImage;
use imageproc::{ contours::find_contours, edges, geometry::arc_length, point::Point };
use log::debug;

use std::cmp::Ordering;

use crate::config::PipelineConfig;
use crate::geometry::{ approximate_closed_polygon, bounding_rect, contour_area };
use crate::raster::{ BoundingBox, Raster };

/// A four sided contour approximation and the box around it
#[derive(Debug, Clone, PartialEq)]
pub struct PlateCandidate {
    pub bbox: BoundingBox,
    pub polygon: Vec<Point<i32>>,
}

/// Edge and contour based plate search
#[derive(Debug, Clone)]
pub struct PlateLocalizer {
    canny_low: f32,
    canny_high: f32,
    max_candidates: usize,
    polygon_tolerance: f64,
    min_aspect_ratio: f64,
    max_aspect_ratio: f64,
}

impl PlateLocalizer {

    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            canny_low: config.canny_low,
            canny_high: config.canny_high,
            max_candidates: config.max_candidates,
            polygon_tolerance: config.polygon_tolerance,
            min_aspect_ratio: config.min_aspect_ratio,
            max_aspect_ratio: config.max_aspect_ratio,
        }
    }

    /// Find the region most likely to hold a plate in a preprocessed raster
    pub fn locate(&self, grayscale: &Raster) -> Option<BoundingBox> {
        match grayscale {
            Raster::Grayscale(img) => self.locate_luma(img),
            other => self.locate_luma(&other.to_luma()),
        }
    }

    pub fn locate_luma(&self, gray: &GrayImage) -> Option<BoundingBox> {
        let edges = self.edge_map(gray);
        self.select(&edges)
    }

    /// Binary edge raster, 255 on edges
    pub fn edge_map(&self, gray: &GrayImage) -> GrayImage {
        edges::canny(gray, self.canny_low, self.canny_high)
    }

    /// Take the first quadrilateral among the largest contours and accept it
    /// only when its aspect ratio looks like a plate.
    ///
    /// A quadrilateral with the wrong ratio ends the search, the smaller
    /// contours behind it are not considered.
    pub fn select(&self, edges: &GrayImage) -> Option<BoundingBox> {
        let candidate = self.find_candidate(edges)?;
        let ratio = candidate.bbox.aspect_ratio();
        if ratio > self.min_aspect_ratio && ratio < self.max_aspect_ratio {
            Some(candidate.bbox)
        } else {
            debug!("quadrilateral {} rejected, aspect ratio {:.2}", candidate.bbox, ratio);
            None
        }
    }

    /// First four vertex approximation among the `max_candidates` largest
    /// contours, scanned from the largest area down
    pub fn find_candidate(&self, edges: &GrayImage) -> Option<PlateCandidate> {
        let contours = find_contours::<i32>(edges);

        let mut ranked: Vec<(f64, &[Point<i32>])> = contours.iter()
            .map(|c| (contour_area(&c.points), &c.points[..]))
            .collect();
        // stable, equal areas keep extraction order
        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        ranked.truncate(self.max_candidates);
        debug!("{} contours, examining {}", contours.len(), ranked.len());

        ranked.into_iter().find_map(|(_, points)| {
            let perimeter = arc_length(points, true);
            let polygon = approximate_closed_polygon(points, self.polygon_tolerance * perimeter);
            if polygon.len() != 4 {
                return None;
            }
            let bbox = bounding_rect(&polygon)?;
            Some(PlateCandidate { bbox, polygon })
        })
    }
}

impl Default for PlateLocalizer {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}


#[cfg(test)]
mod test {

    use image::{ GrayImage, Luma, Rgb, RgbImage };
    use imageproc::{ drawing, rect::Rect };

    use super::PlateLocalizer;
    use crate::config::PipelineConfig;
    use crate::preprocess::Preprocessor;
    use crate::raster::{ BoundingBox, Raster };

    // two pixel thick outline, as a binary edge map
    fn outline(canvas: &mut GrayImage, x: i32, y: i32, w: u32, h: u32) {
        drawing::draw_hollow_rect_mut(canvas, Rect::at(x, y).of_size(w, h), Luma([255]));
        drawing::draw_hollow_rect_mut(canvas, Rect::at(x + 1, y + 1).of_size(w - 2, h - 2), Luma([255]));
    }

    fn close_to(found: BoundingBox, expected: BoundingBox, tolerance: i64) -> bool {
        (found.x as i64 - expected.x as i64).abs() <= tolerance
            && (found.y as i64 - expected.y as i64).abs() <= tolerance
            && (found.width as i64 - expected.width as i64).abs() <= tolerance
            && (found.height as i64 - expected.height as i64).abs() <= tolerance
    }

    #[test]
    fn accepts_plate_shaped_outline() {
        let mut edges = GrayImage::new(240, 120);
        outline(&mut edges, 20, 30, 128, 40);
        let found = PlateLocalizer::default().select(&edges);
        assert_eq!(found, Some(BoundingBox::new(20, 30, 128, 40)));
    }

    #[test]
    fn aspect_ratio_bounds_are_exclusive() {
        let localizer = PlateLocalizer::default();
        let cases = [(100, false), (101, true), (199, true), (200, false)];
        for (width, accepted) in cases.iter() {
            let mut edges = GrayImage::new(240, 120);
            outline(&mut edges, 20, 30, *width, 40);
            let found = localizer.select(&edges);
            assert_eq!(found.is_some(), *accepted, "width {}", width);
        }
    }

    #[test]
    fn rejects_square_and_thin_bar() {
        let localizer = PlateLocalizer::default();

        let mut square = GrayImage::new(200, 200);
        outline(&mut square, 50, 50, 80, 80);
        assert_eq!(localizer.select(&square), None);

        let mut bar = GrayImage::new(300, 100);
        outline(&mut bar, 20, 40, 240, 20);
        assert_eq!(localizer.select(&bar), None);
    }

    #[test]
    fn empty_edges_find_nothing() {
        let edges = GrayImage::new(64, 64);
        assert_eq!(PlateLocalizer::default().find_candidate(&edges), None);
    }

    #[test]
    fn largest_quadrilateral_wins() {
        let mut edges = GrayImage::new(200, 160);
        outline(&mut edges, 10, 10, 120, 40);
        outline(&mut edges, 10, 80, 150, 50);
        let found = PlateLocalizer::default().select(&edges);
        assert_eq!(found, Some(BoundingBox::new(10, 80, 150, 50)));
    }

    #[test]
    fn non_quadrilateral_is_skipped() {
        let mut edges = GrayImage::new(320, 160);
        drawing::draw_hollow_circle_mut(&mut edges, (60, 80), 50, Luma([255]));
        outline(&mut edges, 150, 60, 120, 40);
        let found = PlateLocalizer::default().select(&edges);
        assert_eq!(found, Some(BoundingBox::new(150, 60, 120, 40)));
    }

    #[test]
    fn wrong_ratio_quadrilateral_stops_search() {
        // the square is larger, so it is the first quadrilateral seen
        let mut edges = GrayImage::new(320, 200);
        outline(&mut edges, 10, 10, 150, 150);
        outline(&mut edges, 180, 20, 120, 40);
        assert_eq!(PlateLocalizer::default().select(&edges), None);

        let candidate = PlateLocalizer::default().find_candidate(&edges);
        assert_eq!(candidate.map(|c| c.bbox), Some(BoundingBox::new(10, 10, 150, 150)));
    }

    #[test]
    fn custom_ratio_bounds() {
        let config = PipelineConfig { min_aspect_ratio: 0.8, max_aspect_ratio: 1.2, ..Default::default() };
        let mut square = GrayImage::new(200, 200);
        outline(&mut square, 50, 50, 80, 80);
        assert_eq!(PlateLocalizer::new(&config).select(&square), Some(BoundingBox::new(50, 50, 80, 80)));
    }

    #[test]
    fn locates_filled_plate_in_photo() {
        let mut img = RgbImage::from_pixel(320, 200, Rgb([40, 40, 40]));
        drawing::draw_filled_rect_mut(&mut img, Rect::at(80, 70).of_size(160, 50), Rgb([230, 230, 230]));
        let gray = Preprocessor::default().preprocess(&Raster::from(img));

        let found = PlateLocalizer::default().locate(&gray);
        let found = match found {
            Some(bbox) => bbox,
            None => panic!("plate not found"),
        };
        assert!(close_to(found, BoundingBox::new(80, 70, 160, 50), 3), "found {}", found);
    }

    #[test]
    fn filled_plates_across_ratio_range() {
        // height 40, widths give ratios 2.3 2.7 3.2 4.0 4.6 5.5
        let cases = [(92, false), (108, true), (128, true), (160, true), (184, true), (220, false)];
        let localizer = PlateLocalizer::default();
        for (width, accepted) in cases.iter() {
            let mut img = RgbImage::from_pixel(400, 200, Rgb([40, 40, 40]));
            drawing::draw_filled_rect_mut(&mut img, Rect::at(60, 80).of_size(*width, 40), Rgb([230, 230, 230]));
            let gray = Preprocessor::default().preprocess(&Raster::from(img));

            match localizer.locate(&gray) {
                Some(found) => {
                    assert!(*accepted, "width {} should be rejected, found {}", width, found);
                    assert!(close_to(found, BoundingBox::new(60, 80, *width, 40), 3), "width {}: found {}", width, found);
                }
                None => assert!(!*accepted, "width {} not found", width),
            }
        }
    }

    #[test]
    fn filled_square_is_not_a_plate() {
        let mut img = RgbImage::from_pixel(200, 200, Rgb([40, 40, 40]));
        drawing::draw_filled_rect_mut(&mut img, Rect::at(50, 50).of_size(90, 90), Rgb([230, 230, 230]));
        let gray = Preprocessor::default().preprocess(&Raster::from(img));
        assert_eq!(PlateLocalizer::default().locate(&gray), None);
    }
}
