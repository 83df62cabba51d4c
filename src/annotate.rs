use crate::detection::Detection;
use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const STROKE_WIDTH: i32 = 2;
const LABEL_OFFSET: i32 = 10;
const LABEL_SCALE: f32 = 16.0;

static FONT_BYTES: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Draws detection overlays (rectangle plus class/confidence label) onto a
/// working image buffer.
pub struct Annotator {
    font: FontRef<'static>,
    scale: PxScale,
}

impl Annotator {
    pub fn new() -> Self {
        let font = FontRef::try_from_slice(FONT_BYTES).expect("embedded font is valid");
        Self {
            font,
            scale: PxScale::from(LABEL_SCALE),
        }
    }

    pub fn annotate(&self, image: &mut RgbImage, detections: &[Detection]) {
        for detection in detections {
            self.draw_detection(image, detection);
        }
    }

    fn draw_detection(&self, image: &mut RgbImage, detection: &Detection) {
        let bbox = &detection.bounding_box;
        let x1 = clamp_coord(bbox.x);
        let y1 = clamp_coord(bbox.y);
        let x2 = clamp_coord(bbox.x + bbox.width);
        let y2 = clamp_coord(bbox.y + bbox.height);

        for inset in 0..STROKE_WIDTH {
            let left = x1 + inset;
            let top = y1 + inset;
            let right = x2 - inset;
            let bottom = y2 - inset;
            if right <= left || bottom <= top {
                break;
            }
            let rect =
                Rect::at(left, top).of_size((right - left) as u32, (bottom - top) as u32);
            draw_hollow_rect_mut(image, rect, BOX_COLOR);
        }

        let label = label_text(detection);
        let label_y = y1 - LABEL_OFFSET - self.scale.y as i32;
        draw_text_mut(
            image,
            BOX_COLOR,
            x1.max(0),
            label_y.max(0),
            self.scale,
            &self.font,
            &label,
        );
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn label_text(detection: &Detection) -> String {
    format!("{} ({:.2})", detection.class_name, detection.confidence)
}

fn clamp_coord(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
