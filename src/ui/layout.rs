//! Layout helpers: split the terminal area into regions and map virtual
//! page pixels onto terminal cells.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use scroll_choreo::core::geometry;

use crate::app::page::{CELL_HEIGHT, CELL_WIDTH, NAV_ROWS};

/// Page viewport with the sticky navbar on top and a status bar below.
pub struct AppLayout {
    /// Everything the virtual page scrolls through (navbar overlays its top).
    pub page_area: Rect,
    pub nav_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(NAV_ROWS + 1), // page (takes all remaining space)
                Constraint::Length(1),         // status bar
            ])
            .split(area);

        let page_area = chunks[0];
        let nav_area = Rect {
            height: NAV_ROWS.min(page_area.height),
            ..page_area
        };
        Self {
            page_area,
            nav_area,
            status_area: chunks[1],
        }
    }
}

/// Cells covered by a viewport-pixel rectangle, clipped to `area`.
/// `None` when nothing of it is on screen.
pub fn to_cells(rect: geometry::Rect, area: Rect) -> Option<Rect> {
    let left = (rect.x / CELL_WIDTH).floor().max(0.0);
    let top = (rect.y / CELL_HEIGHT).floor().max(0.0);
    let right = (rect.right() / CELL_WIDTH).ceil().min(f64::from(area.width));
    let bottom = (rect.bottom() / CELL_HEIGHT).ceil().min(f64::from(area.height));
    if right <= left || bottom <= top {
        return None;
    }
    Some(Rect {
        x: area.x + left as u16,
        y: area.y + top as u16,
        width: (right - left) as u16,
        height: (bottom - top) as u16,
    })
}

/// Terminal row for a viewport-pixel `y`, if it is inside `area`.
pub fn row_at(y: f64, area: Rect) -> Option<u16> {
    let row = (y / CELL_HEIGHT).floor();
    (row >= 0.0 && row < f64::from(area.height)).then(|| area.y + row as u16)
}
