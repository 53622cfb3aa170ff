//! Virtual page the showcase scrolls through.
//!
//! Everything is laid out in virtual pixels so the engine sees the same
//! kind of geometry a browser would hand it.  One terminal cell is
//! [`CELL_WIDTH`] × [`CELL_HEIGHT`] pixels.

use scroll_choreo::core::docking::NAV_LOGO_ANCHOR;
use scroll_choreo::core::geometry::{Rect, Size, Viewport};
use scroll_choreo::core::host::AnchorLookup;
use scroll_choreo::core::scroll::{ElementSpan, ScrollGeometry};

pub const CELL_WIDTH: f64 = 8.0;
pub const CELL_HEIGHT: f64 = 16.0;

/// Rows the sticky navbar covers at the top of the viewport.
pub const NAV_ROWS: u16 = 3;

/// Narrowest terminal (in columns) that still lays out the navbar logo slot.
pub const NAV_LOGO_MIN_COLS: u16 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Hero,
    Circuits,
    Neural,
    Contact,
}

impl SectionKind {
    pub const ALL: [SectionKind; 4] = [
        SectionKind::Hero,
        SectionKind::Circuits,
        SectionKind::Neural,
        SectionKind::Contact,
    ];

    /// Height as a multiple of the viewport height.
    fn viewport_heights(self) -> f64 {
        match self {
            SectionKind::Hero | SectionKind::Circuits | SectionKind::Neural => 1.0,
            SectionKind::Contact => 0.6,
        }
    }
}

/// Terminal cells → viewport in virtual pixels.
pub fn viewport_for_cells(cols: u16, rows: u16) -> Viewport {
    Viewport::new(Size::new(
        f64::from(cols) * CELL_WIDTH,
        f64::from(rows) * CELL_HEIGHT,
    ))
}

#[derive(Debug, Clone)]
pub struct PageLayout {
    viewport: Viewport,
    sections: Vec<(SectionKind, ElementSpan)>,
    height: f64,
}

impl PageLayout {
    pub fn new(viewport: Viewport) -> Self {
        let vh = viewport.size.height;
        let mut top = 0.0;
        let sections = SectionKind::ALL
            .iter()
            .map(|&kind| {
                let span = ElementSpan::new(top, kind.viewport_heights() * vh);
                top += span.height;
                (kind, span)
            })
            .collect();
        Self {
            viewport,
            sections,
            height: top,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn max_scroll(&self) -> f64 {
        (self.height - self.viewport.size.height).max(0.0)
    }

    pub fn clamp_scroll(&self, scroll: f64) -> f64 {
        if scroll.is_finite() {
            scroll.clamp(0.0, self.max_scroll())
        } else {
            0.0
        }
    }

    pub fn section(&self, kind: SectionKind) -> ElementSpan {
        self.sections
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, span)| *span)
            .unwrap_or_default()
    }

    /// Geometry for whole-document timelines.
    pub fn page_geometry(&self, scroll: f64) -> ScrollGeometry {
        ScrollGeometry {
            scroll,
            viewport_height: self.viewport.size.height,
            element: ElementSpan::new(0.0, self.height),
        }
    }

    pub fn section_geometry(&self, kind: SectionKind, scroll: f64) -> ScrollGeometry {
        ScrollGeometry {
            scroll,
            viewport_height: self.viewport.size.height,
            element: self.section(kind),
        }
    }

    /// Section rectangle in viewport coordinates at `scroll`.
    pub fn on_screen(&self, kind: SectionKind, scroll: f64) -> Rect {
        let span = self.section(kind);
        Rect::new(0.0, span.top - scroll, self.viewport.size.width, span.height)
    }

    /// Full size of a canvas section, which is what its animator draws into.
    pub fn canvas_viewport(&self, kind: SectionKind) -> Viewport {
        Viewport {
            size: Size::new(self.viewport.size.width, self.section(kind).height),
            ..self.viewport
        }
    }

    /// Navbar logo slot in viewport pixels, or `None` when the terminal is
    /// too narrow for the navbar to lay it out.
    pub fn nav_logo_slot(&self) -> Option<Rect> {
        let cols = (self.viewport.size.width / CELL_WIDTH) as u16;
        if cols < NAV_LOGO_MIN_COLS {
            return None;
        }
        Some(Rect::new(
            2.0 * CELL_WIDTH,
            0.0,
            14.0 * CELL_WIDTH,
            f64::from(NAV_ROWS) * CELL_HEIGHT,
        ))
    }
}

impl AnchorLookup for PageLayout {
    fn anchor_rect(&self, name: &str) -> Option<Rect> {
        match name {
            NAV_LOGO_ANCHOR => self.nav_logo_slot(),
            _ => None,
        }
    }
}
