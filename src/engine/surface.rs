use super::palette::Rgb;

/// Color plus coverage. `alpha` is already composed (entity × global × fade).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Rgb,
    pub alpha: f64,
}

impl Paint {
    pub fn new(color: Rgb, alpha: f64) -> Self {
        Paint { color, alpha: alpha.clamp(0.0, 1.0) }
    }

    pub fn is_visible(&self) -> bool {
        self.alpha > 1e-3
    }
}

/// A 2D drawing target measured in logical pixels.
///
/// Every frame starts with `clear`; nothing drawn in an earlier frame is
/// expected to survive it.
pub trait Surface {
    /// Logical (width, height).
    fn size(&self) -> (f64, f64);

    fn clear(&mut self, background: Rgb);

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, paint: Paint);

    /// Radial gradient from `paint` at the center to transparent at `radius`.
    fn glow(&mut self, cx: f64, cy: f64, radius: f64, paint: Paint);

    fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, width: f64, paint: Paint);

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, paint: Paint);

    /// Fill from the curve `tops` (sampled every `step` px from x = 0) down to the bottom edge.
    fn fill_below(&mut self, tops: &[f64], step: f64, paint: Paint);

    /// Circle outline.
    fn ring(&mut self, cx: f64, cy: f64, radius: f64, width: f64, paint: Paint) {
        let segments = ((radius * 0.8).ceil() as usize).clamp(12, 96);
        let mut prev = (cx + radius, cy);
        for i in 1..=segments {
            let a = i as f64 / segments as f64 * std::f64::consts::TAU;
            let next = (cx + a.cos() * radius, cy + a.sin() * radius);
            self.line(prev.0, prev.1, next.0, next.1, width, paint);
            prev = next;
        }
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    /// One recorded draw call.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Op {
        Clear(Rgb),
        Circle { x: f64, y: f64, r: f64, paint: Paint },
        Glow { x: f64, y: f64, r: f64, paint: Paint },
        Line { paint: Paint },
        Rect { paint: Paint },
        Below { paint: Paint },
    }

    impl Op {
        pub fn paint(&self) -> Option<Paint> {
            match self {
                Op::Clear(_) => None,
                Op::Circle { paint, .. }
                | Op::Glow { paint, .. }
                | Op::Line { paint }
                | Op::Rect { paint }
                | Op::Below { paint } => Some(*paint),
            }
        }
    }

    /// Surface that records calls instead of drawing, for assertions in tests.
    pub struct RecordingSurface {
        pub width: f64,
        pub height: f64,
        pub ops: Vec<Op>,
    }

    impl RecordingSurface {
        pub fn new(width: f64, height: f64) -> Self {
            RecordingSurface { width, height, ops: Vec::new() }
        }
    }

    impl Surface for RecordingSurface {
        fn size(&self) -> (f64, f64) {
            (self.width, self.height)
        }
        fn clear(&mut self, background: Rgb) {
            self.ops.clear();
            self.ops.push(Op::Clear(background));
        }
        fn fill_circle(&mut self, x: f64, y: f64, r: f64, paint: Paint) {
            self.ops.push(Op::Circle { x, y, r, paint });
        }
        fn glow(&mut self, x: f64, y: f64, r: f64, paint: Paint) {
            self.ops.push(Op::Glow { x, y, r, paint });
        }
        fn line(&mut self, _x0: f64, _y0: f64, _x1: f64, _y1: f64, _w: f64, paint: Paint) {
            self.ops.push(Op::Line { paint });
        }
        fn fill_rect(&mut self, _x: f64, _y: f64, _w: f64, _h: f64, paint: Paint) {
            self.ops.push(Op::Rect { paint });
        }
        fn fill_below(&mut self, _tops: &[f64], _step: f64, paint: Paint) {
            self.ops.push(Op::Below { paint });
        }
    }
}
