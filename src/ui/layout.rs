use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub const MIN_WIDTH: u16 = 40;
pub const MIN_HEIGHT: u16 = 16;
const SUN_PATH_ROWS: u16 = 9;
const WIDE_WIDTH: u16 = 100;

/// Panels drawn over the backdrop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneLayout {
    pub header: Rect,
    pub conditions: Rect,
    pub sun_path: Rect,
    pub details: Rect,
    pub status: Rect,
}

/// `None` when the terminal is too small to show the pane.
#[must_use]
pub fn pane_layout(area: Rect) -> Option<PaneLayout> {
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        return None;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);
    let (header, body, status) = (rows[0], rows[1], rows[2]);

    let (left, details) = if area.width >= WIDE_WIDTH {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
            .split(body);
        (columns[0], columns[1])
    } else {
        (body, Rect::new(body.x, body.bottom(), body.width, 0))
    };

    let stacked = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(SUN_PATH_ROWS),
            Constraint::Min(0),
        ])
        .split(left);

    let details = if details.height == 0 {
        stacked[2]
    } else {
        details
    };

    Some(PaneLayout {
        header,
        conditions: stacked[0],
        sun_path: stacked[1],
        details,
        status,
    })
}

/// Drawable cells inside the bordered sun-path panel for a terminal of this size.
#[must_use]
pub fn sun_strip_size(width: u16, height: u16) -> (u16, u16) {
    pane_layout(Rect::new(0, 0, width, height)).map_or((0, 0), |layout| {
        let inner = inner(layout.sun_path);
        (inner.width, inner.height)
    })
}

/// Area inside a one-cell border.
#[must_use]
pub fn inner(area: Rect) -> Rect {
    Rect::new(
        area.x.saturating_add(1),
        area.y.saturating_add(1),
        area.width.saturating_sub(2),
        area.height.saturating_sub(2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_terminals_get_no_layout() {
        assert!(pane_layout(Rect::new(0, 0, 39, 30)).is_none());
        assert!(pane_layout(Rect::new(0, 0, 80, 15)).is_none());
        assert_eq!(sun_strip_size(20, 10), (0, 0));
    }

    #[test]
    fn narrow_terminals_stack_details_below() {
        let layout = pane_layout(Rect::new(0, 0, 80, 30)).unwrap();
        assert_eq!(layout.header.height, 1);
        assert_eq!(layout.status.y, 29);
        assert_eq!(layout.sun_path.width, 80);
        assert_eq!(layout.details.y, layout.sun_path.bottom());
        assert_eq!(sun_strip_size(80, 30), (78, SUN_PATH_ROWS - 2));
    }

    #[test]
    fn wide_terminals_put_details_beside() {
        let layout = pane_layout(Rect::new(0, 0, 140, 40)).unwrap();
        assert_eq!(layout.details.y, layout.conditions.y);
        assert!(layout.details.x >= layout.sun_path.right());
        assert_eq!(layout.details.height, 38);
    }
}
