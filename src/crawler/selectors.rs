//! CSS selectors of the catalogue layout
//!
//! The portal is built on the French government design system, hence the
//! `fr-` prefixes.

use crate::{Result, ScrapeError};
use scraper::Selector;

/// One card of the listing
pub const CARD: &str = ".fr-card";

/// Call-to-action link inside a card, leading to the detail page
pub const CARD_ACTION: &str = "a.fr-btn";

/// Pagination control advancing the listing
pub const NEXT_PAGE: &str = "button.fr-pagination__link.fr-pagination__link--next";

/// Present once a detail page has rendered its content
pub const DETAIL_MARKER: &str = ".fr-grid-row";

/// Programme title on a detail page
pub const TITLE: &str = "h1.fr-h2.fr-mb-1w";

/// One session block on a detail page
pub const SECTION: &str = ".fr-tile__body .fr-accordion";

pub const SECTION_DATE: &str = ".fr-accordion__btn .fr-badge";

pub const SECTION_SCHEDULE: &str = ".fr-collapse.fr-collapse--expanded p > strong";

pub const SECTION_PRESENCE: &str = ".list-unstyled .fr-icon-arrow-right-line";

/// Bold labels of the expanded body, one of which introduces the comment
pub const SECTION_LABELS: &str = ".fr-collapse--expanded strong";

pub const SECTION_LINK: &str = ".fr-icon-arrow-right-line a";

/// Label text preceding the institution's comment
pub const COMMENT_LABEL: &str = "Commentaire de l'établissement :";

/// Parses a CSS selector
pub fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector(format!("{}: {:?}", css, e)))
}

/// Compiled selectors of a detail page
pub struct DetailSelectors {
    pub title: Selector,
    pub section: Selector,
    pub date: Selector,
    pub schedule: Selector,
    pub presence: Selector,
    pub labels: Selector,
    pub link: Selector,
}

impl DetailSelectors {
    pub fn compile() -> Result<Self> {
        Ok(Self {
            title: compile(TITLE)?,
            section: compile(SECTION)?,
            date: compile(SECTION_DATE)?,
            schedule: compile(SECTION_SCHEDULE)?,
            presence: compile(SECTION_PRESENCE)?,
            labels: compile(SECTION_LABELS)?,
            link: compile(SECTION_LINK)?,
        })
    }
}
