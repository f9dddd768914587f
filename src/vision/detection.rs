//! Text region extraction from the detection model's probability map
//!
//! The detection model outputs a per-pixel text probability. Regions are found by
//! thresholding the map, grouping connected pixels, scoring each group by its mean
//! probability and expanding the surviving boxes by the unclip distance.

use ndarray::{Array2, ArrayView2};
use tracing::debug;

use super::preprocess::DetScale;

/// Parameters controlling box extraction
#[derive(Debug, Clone, Copy)]
pub struct DetParams {
    /// Pixel threshold for binarization
    pub thresh: f32,
    /// Minimum mean probability for a region to be kept
    pub box_thresh: f32,
    /// Expansion ratio applied to each region
    pub unclip_ratio: f32,
    /// Maximum number of regions considered
    pub max_candidates: usize,
}

/// A detected text box in original page coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedBox {
    /// Corners: top-left, top-right, bottom-right, bottom-left
    pub polygon: [[f32; 2]; 4],
    /// Mean probability inside the region
    pub score: f32,
}

impl DetectedBox {
    fn top(&self) -> f32 {
        self.polygon[0][1]
    }

    fn left(&self) -> f32 {
        self.polygon[0][0]
    }
}

/// Connected region in probability-map coordinates
struct Region {
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
    prob_sum: f32,
    pixels: usize,
}

/// Smallest side (in map pixels) a region must have to be kept
const MIN_REGION_SIDE: usize = 3;

/// Extract text boxes from a probability map.
///
/// `scale` converts map coordinates back to the page; boxes are clipped to
/// `page_size` and returned in reading order.
pub fn extract_boxes(
    prob_map: ArrayView2<f32>,
    params: &DetParams,
    scale: DetScale,
    page_size: (u32, u32),
) -> Vec<DetectedBox> {
    let (height, width) = prob_map.dim();
    if height == 0 || width == 0 {
        return Vec::new();
    }

    let binary = prob_map.mapv(|p| p > params.thresh);
    let regions = find_regions(&binary, prob_map);
    debug!("Probability map {}x{}: {} candidate regions", width, height, regions.len());

    let (page_w, page_h) = (page_size.0 as f32, page_size.1 as f32);
    let mut boxes = Vec::new();

    for region in regions.into_iter().take(params.max_candidates) {
        let region_w = region.max_x - region.min_x + 1;
        let region_h = region.max_y - region.min_y + 1;
        if region_w.min(region_h) < MIN_REGION_SIDE {
            continue;
        }

        let score = region.prob_sum / region.pixels as f32;
        if score < params.box_thresh {
            continue;
        }

        let [x0, y0, x1, y1] = unclip_rect(
            [
                region.min_x as f32,
                region.min_y as f32,
                (region.max_x + 1) as f32,
                (region.max_y + 1) as f32,
            ],
            params.unclip_ratio,
        );

        let x0 = (x0 / scale.ratio_w).clamp(0.0, page_w);
        let x1 = (x1 / scale.ratio_w).clamp(0.0, page_w);
        let y0 = (y0 / scale.ratio_h).clamp(0.0, page_h);
        let y1 = (y1 / scale.ratio_h).clamp(0.0, page_h);

        boxes.push(DetectedBox {
            polygon: [[x0, y0], [x1, y0], [x1, y1], [x0, y1]],
            score,
        });
    }

    sort_reading_order(&mut boxes);
    boxes
}

/// Group foreground pixels into 4-connected regions
fn find_regions(binary: &Array2<bool>, prob_map: ArrayView2<f32>) -> Vec<Region> {
    let (height, width) = binary.dim();
    let mut visited = Array2::<bool>::default((height, width));
    let mut regions = Vec::new();
    let mut stack = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if !binary[[y, x]] || visited[[y, x]] {
                continue;
            }

            let mut region = Region {
                min_x: x,
                max_x: x,
                min_y: y,
                max_y: y,
                prob_sum: 0.0,
                pixels: 0,
            };

            visited[[y, x]] = true;
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                region.min_x = region.min_x.min(cx);
                region.max_x = region.max_x.max(cx);
                region.min_y = region.min_y.min(cy);
                region.max_y = region.max_y.max(cy);
                region.prob_sum += prob_map[[cy, cx]];
                region.pixels += 1;

                let neighbors = [
                    (cx.wrapping_sub(1), cy),
                    (cx + 1, cy),
                    (cx, cy.wrapping_sub(1)),
                    (cx, cy + 1),
                ];
                for (nx, ny) in neighbors {
                    if nx < width && ny < height && binary[[ny, nx]] && !visited[[ny, nx]] {
                        visited[[ny, nx]] = true;
                        stack.push((nx, ny));
                    }
                }
            }

            regions.push(region);
        }
    }

    regions
}

/// Expand a rectangle `[x0, y0, x1, y1]` outward by `area * ratio / perimeter`
pub fn unclip_rect(rect: [f32; 4], ratio: f32) -> [f32; 4] {
    let w = rect[2] - rect[0];
    let h = rect[3] - rect[1];
    let perimeter = 2.0 * (w + h);
    if perimeter <= 0.0 {
        return rect;
    }

    let distance = w * h * ratio / perimeter;
    [
        rect[0] - distance,
        rect[1] - distance,
        rect[2] + distance,
        rect[3] + distance,
    ]
}

/// Sort top-to-bottom, then left-to-right for boxes on the same line
pub fn sort_reading_order(boxes: &mut [DetectedBox]) {
    boxes.sort_by(|a, b| {
        a.top()
            .partial_cmp(&b.top())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.left().partial_cmp(&b.left()).unwrap_or(std::cmp::Ordering::Equal))
    });

    // Boxes whose tops differ by less than this are treated as the same line
    const LINE_TOLERANCE: f32 = 10.0;

    for i in 0..boxes.len() {
        let mut j = i;
        while j > 0
            && (boxes[j].top() - boxes[j - 1].top()).abs() < LINE_TOLERANCE
            && boxes[j].left() < boxes[j - 1].left()
        {
            boxes.swap(j, j - 1);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> DetParams {
        DetParams {
            thresh: 0.3,
            box_thresh: 0.6,
            unclip_ratio: 1.5,
            max_candidates: 1000,
        }
    }

    const UNIT: DetScale = DetScale {
        ratio_w: 1.0,
        ratio_h: 1.0,
    };

    #[test]
    fn test_extract_boxes_empty() {
        let prob_map = Array2::<f32>::zeros((100, 100));
        let boxes = extract_boxes(prob_map.view(), &params(), UNIT, (100, 100));
        assert!(boxes.is_empty());
    }

    #[test]
    fn test_extract_single_region() {
        let mut prob_map = Array2::<f32>::zeros((100, 100));
        for y in 20..40 {
            for x in 30..70 {
                prob_map[[y, x]] = 0.9;
            }
        }

        let boxes = extract_boxes(prob_map.view(), &params(), UNIT, (100, 100));
        assert_eq!(boxes.len(), 1);

        let b = &boxes[0];
        assert!((b.score - 0.9).abs() < 0.001);
        // Expanded beyond the raw 30..70 x 20..40 region
        assert!(b.polygon[0][0] < 30.0);
        assert!(b.polygon[0][1] < 20.0);
        assert!(b.polygon[2][0] > 70.0);
        assert!(b.polygon[2][1] > 40.0);
    }

    #[test]
    fn test_low_score_region_dropped() {
        let mut prob_map = Array2::<f32>::zeros((50, 50));
        for y in 10..20 {
            for x in 10..30 {
                prob_map[[y, x]] = 0.4;
            }
        }

        let boxes = extract_boxes(prob_map.view(), &params(), UNIT, (50, 50));
        assert!(boxes.is_empty());
    }

    #[test]
    fn test_tiny_region_dropped() {
        let mut prob_map = Array2::<f32>::zeros((50, 50));
        prob_map[[5, 5]] = 0.95;
        prob_map[[5, 6]] = 0.95;

        let boxes = extract_boxes(prob_map.view(), &params(), UNIT, (50, 50));
        assert!(boxes.is_empty());
    }

    #[test]
    fn test_boxes_scaled_and_clipped_to_page() {
        let mut prob_map = Array2::<f32>::zeros((64, 64));
        for y in 0..10 {
            for x in 0..20 {
                prob_map[[y, x]] = 0.9;
            }
        }

        let scale = DetScale {
            ratio_w: 0.5,
            ratio_h: 0.5,
        };
        let boxes = extract_boxes(prob_map.view(), &params(), scale, (128, 128));
        assert_eq!(boxes.len(), 1);
        let b = &boxes[0];
        assert_eq!(b.polygon[0], [0.0, 0.0]);
        assert!(b.polygon[2][0] > 40.0 && b.polygon[2][0] <= 128.0);
    }

    #[test]
    fn test_reading_order() {
        let mk = |x: f32, y: f32| DetectedBox {
            polygon: [[x, y], [x + 10.0, y], [x + 10.0, y + 5.0], [x, y + 5.0]],
            score: 0.9,
        };

        // Second line, then two boxes on the first line with slightly different tops
        let mut boxes = vec![mk(0.0, 50.0), mk(80.0, 10.0), mk(5.0, 14.0)];
        sort_reading_order(&mut boxes);

        assert_eq!(boxes[0].polygon[0], [5.0, 14.0]);
        assert_eq!(boxes[1].polygon[0], [80.0, 10.0]);
        assert_eq!(boxes[2].polygon[0], [0.0, 50.0]);
    }

    #[test]
    fn test_unclip_rect() {
        // 100 x 50: area 5000, perimeter 300, distance = 5000 * 1.5 / 300 = 25
        let expanded = unclip_rect([0.0, 0.0, 100.0, 50.0], 1.5);
        assert_eq!(expanded, [-25.0, -25.0, 125.0, 75.0]);
    }
}
