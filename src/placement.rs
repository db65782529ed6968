//! Badge placement.
//!
//! Coordinates are signed: on images smaller than a badge, anchors go
//! negative and the badge is clipped when drawn.

/// Pixel footprint of rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl TextSize {
    /// Create a new text footprint.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Top-left anchor of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    /// Horizontal offset from the left edge.
    pub x: i64,
    /// Vertical offset from the top edge.
    pub y: i64,
}

/// Rectangle with inclusive bounds on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Leftmost column.
    pub left: i64,
    /// Topmost row.
    pub top: i64,
    /// Rightmost column (inclusive).
    pub right: i64,
    /// Bottom row (inclusive).
    pub bottom: i64,
}

impl Rect {
    /// Whether two rectangles share at least one pixel.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left <= other.right
            && other.left <= self.right
            && self.top <= other.bottom
            && other.top <= self.bottom
    }
}

/// Anchor text `padding` pixels from the right and bottom edges.
#[must_use]
pub fn place_bottom_right(image: (u32, u32), text: TextSize, padding: u32) -> Point {
    let (width, height) = image;
    Point {
        x: i64::from(width) - i64::from(text.width) - i64::from(padding),
        y: i64::from(height) - i64::from(text.height) - i64::from(padding),
    }
}

/// Anchor text `padding` pixels from the top-left corner.
#[must_use]
pub fn place_top_left(padding: u32) -> Point {
    Point {
        x: i64::from(padding),
        y: i64::from(padding),
    }
}

/// Backing box for text at `origin`, grown by `padding` on every side.
#[must_use]
pub fn badge_rect(origin: Point, text: TextSize, padding: u32) -> Rect {
    let pad = i64::from(padding);
    Rect {
        left: origin.x - pad,
        top: origin.y - pad,
        right: origin.x + i64::from(text.width) + pad,
        bottom: origin.y + i64::from(text.height) + pad,
    }
}

/// Where both badges land on a given image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeLayout {
    /// Ownership notice text anchor.
    pub owner_origin: Point,
    /// Ownership notice backing box.
    pub owner_box: Rect,
    /// Timestamp text anchor.
    pub timestamp_origin: Point,
    /// Timestamp backing box.
    pub timestamp_box: Rect,
}

impl BadgeLayout {
    /// Lay out the ownership badge bottom-right and the timestamp badge
    /// top-left.
    #[must_use]
    pub fn compute(
        image: (u32, u32),
        owner: TextSize,
        timestamp: TextSize,
        margin: u32,
        padding: u32,
    ) -> Self {
        let owner_origin = place_bottom_right(image, owner, margin);
        let timestamp_origin = place_top_left(margin);
        Self {
            owner_origin,
            owner_box: badge_rect(owner_origin, owner, padding),
            timestamp_origin,
            timestamp_box: badge_rect(timestamp_origin, timestamp, padding),
        }
    }

    /// Whether the two backing boxes collide.
    #[must_use]
    pub fn overlaps(&self) -> bool {
        self.owner_box.intersects(&self.timestamp_box)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_right_accounts_for_text_footprint() {
        let p = place_bottom_right((800, 600), TextSize::new(300, 40), 20);
        assert_eq!(p, Point { x: 480, y: 540 });
    }

    #[test]
    fn bottom_right_goes_negative_on_tiny_images() {
        let p = place_bottom_right((50, 30), TextSize::new(300, 40), 20);
        assert_eq!(p, Point { x: -270, y: -30 });
    }

    #[test]
    fn top_left_is_fixed() {
        assert_eq!(place_top_left(20), Point { x: 20, y: 20 });
    }

    #[test]
    fn timestamp_box_matches_fixed_corner() {
        let layout = BadgeLayout::compute(
            (800, 600),
            TextSize::new(300, 40),
            TextSize::new(200, 40),
            20,
            10,
        );
        assert_eq!(
            layout.timestamp_box,
            Rect {
                left: 10,
                top: 10,
                right: 230,
                bottom: 70
            }
        );
        assert_eq!(layout.owner_box.right, 790);
        assert_eq!(layout.owner_box.bottom, 590);
        assert!(!layout.overlaps());
    }

    #[test]
    fn small_image_reports_overlap() {
        let layout = BadgeLayout::compute(
            (120, 80),
            TextSize::new(300, 40),
            TextSize::new(200, 40),
            20,
            10,
        );
        assert!(layout.overlaps());
    }

    #[test]
    fn rect_intersection_is_inclusive() {
        let a = Rect {
            left: 0,
            top: 0,
            right: 10,
            bottom: 10,
        };
        let touching = Rect {
            left: 10,
            top: 10,
            right: 20,
            bottom: 20,
        };
        let apart = Rect {
            left: 11,
            top: 0,
            right: 20,
            bottom: 10,
        };
        assert!(a.intersects(&touching));
        assert!(!a.intersects(&apart));
    }
}
