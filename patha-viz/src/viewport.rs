//! Incremental viewport normalization.
//!
//! Keeps an unbounded, growing point stream inside a fixed-size canvas. The
//! transform is `canvas = (raw + shift) * scale` followed by a vertical flip
//! to canvas-up convention. Both transform components move monotonically —
//! the shift only grows, the scale only shrinks — and a change re-projects
//! the entire stored history through invert-then-reapply, so previously
//! placed points are repositioned exactly, never approximated.

use patha_core::{Node, Vec2};

/// Maps raw path coordinates into a fixed canvas, incrementally.
pub struct ViewportNormalizer {
    width: f64,
    height: f64,
    shift: Vec2,
    scale: f64,
    canvas: Vec<Node>,
}

impl ViewportNormalizer {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            shift: Vec2::ZERO,
            scale: 1.0,
            canvas: Vec::new(),
        }
    }

    /// Fold a batch of raw nodes into the canvas. Afterwards every node ever
    /// ingested projects inside `[0, width] x [0, height]`.
    pub fn ingest(&mut self, batch: &[Node]) {
        if batch.is_empty() {
            return;
        }

        // Grow the shift if any new node would project negative. History
        // already satisfies the current shift, and a larger one keeps it
        // non-negative too.
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        for node in batch {
            min_x = min_x.min(node.x);
            min_y = min_y.min(node.y);
        }

        let mut shift = self.shift;
        if min_x + shift.x < 0.0 {
            shift.x = -min_x;
        }
        if min_y + shift.y < 0.0 {
            shift.y = -min_y;
        }
        if shift != self.shift {
            tracing::debug!("Shift grows to ({:.1}, {:.1})", shift.x, shift.y);
            self.reproject(shift, self.scale);
        }

        // Shrink the scale if any shifted maximum would overflow the canvas.
        // The maximum runs over history and batch alike; history raw
        // coordinates are recovered through the inverse transform.
        let mut max_x: f64 = 0.0;
        let mut max_y: f64 = 0.0;
        for node in batch {
            max_x = max_x.max(node.x + self.shift.x);
            max_y = max_y.max(node.y + self.shift.y);
        }
        for canvas_node in &self.canvas {
            let raw = self.unproject(*canvas_node);
            max_x = max_x.max(raw.x + self.shift.x);
            max_y = max_y.max(raw.y + self.shift.y);
        }

        if max_x * self.scale > self.width || max_y * self.scale > self.height {
            // A zero-extent axis puts no constraint on the scale; a fully
            // zero-extent bounding box leaves it unchanged
            let fit_x = if max_x > 0.0 {
                self.width / max_x
            } else {
                f64::INFINITY
            };
            let fit_y = if max_y > 0.0 {
                self.height / max_y
            } else {
                f64::INFINITY
            };
            let fit = fit_x.min(fit_y);

            // The scale only ever shrinks; growing it would let earlier,
            // already-fitted nodes overflow again
            if fit.is_finite() && fit < self.scale {
                tracing::debug!("Scale shrinks to {:.4}", fit);
                self.reproject(self.shift, fit);
            }
        }

        for node in batch {
            let projected = self.project(*node);
            self.canvas.push(projected);
        }
    }

    /// Canvas-space nodes in ingestion order.
    pub fn canvas_nodes(&self) -> &[Node] {
        &self.canvas
    }

    /// Owned copy of the canvas-space nodes, for handing across threads.
    pub fn snapshot(&self) -> Vec<Node> {
        self.canvas.clone()
    }

    pub fn shift(&self) -> Vec2 {
        self.shift
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Raw to canvas, vertical flip applied last.
    fn project(&self, raw: Node) -> Node {
        let scaled = (raw + self.shift) * self.scale;
        Node::new(scaled.x, self.height - scaled.y)
    }

    /// Canvas back to raw; exact inverse of `project` under the current
    /// transform.
    fn unproject(&self, canvas: Node) -> Node {
        let scaled_y = self.height - canvas.y;
        Node::new(
            canvas.x / self.scale - self.shift.x,
            scaled_y / self.scale - self.shift.y,
        )
    }

    /// Replace the transform and re-project the whole stored history
    /// through it.
    fn reproject(&mut self, shift: Vec2, scale: f64) {
        let raw: Vec<Node> = self.canvas.iter().map(|c| self.unproject(*c)).collect();
        self.shift = shift;
        self.scale = scale;
        let projected: Vec<Node> = raw.into_iter().map(|n| self.project(n)).collect();
        self.canvas = projected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const EPS: f64 = 1e-9;

    fn assert_all_in_bounds(viewport: &ViewportNormalizer, width: f64, height: f64) {
        for node in viewport.canvas_nodes() {
            assert!(
                node.x >= -EPS && node.x <= width + EPS,
                "x out of bounds: {:?}",
                node
            );
            assert!(
                node.y >= -EPS && node.y <= height + EPS,
                "y out of bounds: {:?}",
                node
            );
        }
    }

    #[test]
    fn test_fitting_batch_needs_no_transform_change() {
        let mut viewport = ViewportNormalizer::new(200.0, 100.0);
        viewport.ingest(&[Node::new(0.0, 0.0), Node::new(100.0, 50.0)]);

        assert_eq!(viewport.shift(), Vec2::ZERO);
        assert_eq!(viewport.scale(), 1.0);
        assert_all_in_bounds(&viewport, 200.0, 100.0);
    }

    #[test]
    fn test_vertical_flip_applied_last() {
        let mut viewport = ViewportNormalizer::new(200.0, 100.0);
        viewport.ingest(&[Node::new(0.0, 0.0), Node::new(30.0, 40.0)]);

        let canvas = viewport.canvas_nodes();
        // Canvas-up: raw y=0 lands at the bottom edge
        assert_relative_eq!(canvas[0].y, 100.0);
        assert_relative_eq!(canvas[1].y, 60.0);
    }

    #[test]
    fn test_negative_x_grows_shift_and_keeps_history_in_bounds() {
        let mut viewport = ViewportNormalizer::new(200.0, 100.0);
        viewport.ingest(&[Node::new(0.0, 0.0), Node::new(100.0, 0.0)]);
        viewport.ingest(&[Node::new(-50.0, 0.0)]);

        assert_relative_eq!(viewport.shift().x, 50.0);
        // Every stored canvas x, history included, stays non-negative
        for node in viewport.canvas_nodes() {
            assert!(node.x >= -EPS, "x went negative: {:?}", node);
        }
        assert_all_in_bounds(&viewport, 200.0, 100.0);

        let xs: Vec<f64> = viewport.canvas_nodes().iter().map(|n| n.x).collect();
        assert_relative_eq!(xs[0], 50.0, epsilon = 1e-6);
        assert_relative_eq!(xs[1], 150.0, epsilon = 1e-6);
        assert_relative_eq!(xs[2], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_overflow_shrinks_scale_for_history_and_batch() {
        let mut viewport = ViewportNormalizer::new(200.0, 100.0);
        viewport.ingest(&[Node::new(0.0, 0.0), Node::new(100.0, 50.0)]);
        viewport.ingest(&[Node::new(400.0, 100.0)]);

        // min(200/400, 100/100) = 0.5
        assert_relative_eq!(viewport.scale(), 0.5);
        assert_all_in_bounds(&viewport, 200.0, 100.0);

        // History was re-projected under the new scale, not left behind
        let canvas = viewport.canvas_nodes();
        assert_relative_eq!(canvas[1].x, 50.0, epsilon = 1e-6);
    }

    #[test]
    fn test_shift_then_scale_in_one_ingest() {
        let mut viewport = ViewportNormalizer::new(200.0, 100.0);
        viewport.ingest(&[Node::new(0.0, 0.0), Node::new(100.0, 0.0)]);
        // Far negative: needs a 300mm shift, which pushes the old maximum to
        // 400 shifted and forces a scale of 0.5
        viewport.ingest(&[Node::new(-300.0, 0.0)]);

        assert_relative_eq!(viewport.shift().x, 300.0);
        assert_relative_eq!(viewport.scale(), 0.5, epsilon = 1e-9);
        assert_all_in_bounds(&viewport, 200.0, 100.0);
    }

    #[test]
    fn test_zero_extent_batch_leaves_scale_unchanged() {
        let mut viewport = ViewportNormalizer::new(200.0, 100.0);
        viewport.ingest(&[Node::new(0.0, 0.0)]);
        viewport.ingest(&[Node::new(0.0, 0.0)]);

        assert_eq!(viewport.scale(), 1.0);
        assert_eq!(viewport.canvas_nodes().len(), 2);
        assert_all_in_bounds(&viewport, 200.0, 100.0);
    }

    #[test]
    fn test_scale_never_increases() {
        let mut viewport = ViewportNormalizer::new(1280.0, 720.0);
        let mut rng = StdRng::seed_from_u64(42);

        let mut last_scale = viewport.scale();
        for _ in 0..200 {
            let batch: Vec<Node> = (0..rng.gen_range(1..6))
                .map(|_| {
                    Node::new(
                        rng.gen_range(-5000.0..5000.0),
                        rng.gen_range(-5000.0..5000.0),
                    )
                })
                .collect();
            viewport.ingest(&batch);

            assert!(
                viewport.scale() <= last_scale + 1e-12,
                "scale grew: {} -> {}",
                last_scale,
                viewport.scale()
            );
            last_scale = viewport.scale();
            assert_all_in_bounds(&viewport, 1280.0, 720.0);
        }
    }

    #[test]
    fn test_shift_never_shrinks() {
        let mut viewport = ViewportNormalizer::new(1280.0, 720.0);
        let mut rng = StdRng::seed_from_u64(7);

        let mut last_shift = viewport.shift();
        for _ in 0..200 {
            viewport.ingest(&[Node::new(
                rng.gen_range(-2000.0..2000.0),
                rng.gen_range(-2000.0..2000.0),
            )]);

            let shift = viewport.shift();
            assert!(shift.x >= last_shift.x - 1e-12);
            assert!(shift.y >= last_shift.y - 1e-12);
            last_shift = shift;
        }
    }
}
