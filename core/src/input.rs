use serde::{Deserialize, Serialize};

use crate::outline::Point;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

/// `scale` is logical units per raw unit; padding is in raw units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
}

/// Maps container-relative pointer positions into the logical viewport,
/// which is fitted into the container with its aspect ratio preserved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInputMapper {
    viewport: Size,
}

impl PointerInputMapper {
    pub fn new(viewport: Size) -> Self {
        Self { viewport }
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn letterbox(&self, container: Size) -> Option<Letterbox> {
        if !container.has_area() || !self.viewport.has_area() {
            return None;
        }
        let view = self.viewport;
        if container.width / container.height > view.width / view.height {
            // Container is relatively wider: fit height, pad left and right.
            let scale = view.height / container.height;
            Some(Letterbox {
                scale,
                pad_x: (container.width - view.width / scale) * 0.5,
                pad_y: 0.0,
            })
        } else {
            let scale = view.width / container.width;
            Some(Letterbox {
                scale,
                pad_x: 0.0,
                pad_y: (container.height - view.height / scale) * 0.5,
            })
        }
    }

    pub fn to_logical(&self, container: Size, raw: Point) -> Option<Point> {
        let fit = self.letterbox(container)?;
        Some(((raw.0 - fit.pad_x) * fit.scale, (raw.1 - fit.pad_y) * fit.scale))
    }

    pub fn to_raw(&self, container: Size, logical: Point) -> Option<Point> {
        let fit = self.letterbox(container)?;
        Some((logical.0 / fit.scale + fit.pad_x, logical.1 / fit.scale + fit.pad_y))
    }
}
