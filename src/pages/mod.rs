//! Static page table of the monitoring app.
//!
//! Every screen is identified by a [`PageId`]. Titles and icons are resolved
//! from a fixed table instead of being recomputed from route strings.

use serde::Serialize;

/// Text shown on pages that have no content yet.
pub const PLACEHOLDER_TEXT: &str = "Content for this page will be displayed here.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PageId {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

/// Display record for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub id: PageId,
    /// Navigation route name, e.g. `PageA`.
    pub route: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    /// Whether the page only shows [`PLACEHOLDER_TEXT`].
    pub placeholder: bool,
}

const PAGES: [PageInfo; 8] = [
    PageInfo {
        id: PageId::A,
        route: "PageA",
        title: "Bin Status",
        icon: "🗑️",
        placeholder: false,
    },
    PageInfo {
        id: PageId::B,
        route: "PageB",
        title: "Shortest Route",
        icon: "🗺️",
        placeholder: true,
    },
    PageInfo {
        id: PageId::C,
        route: "PageC",
        title: "QR Code",
        icon: "📱",
        placeholder: false,
    },
    PageInfo {
        id: PageId::D,
        route: "PageD",
        title: "Load Prediction",
        icon: "📈",
        placeholder: true,
    },
    PageInfo {
        id: PageId::E,
        route: "PageE",
        title: "Data Analytics",
        icon: "📊",
        placeholder: true,
    },
    PageInfo {
        id: PageId::F,
        route: "PageF",
        title: "Stamps",
        icon: "📱",
        placeholder: true,
    },
    PageInfo {
        id: PageId::G,
        route: "PageG",
        title: "Settings",
        icon: "⚙️",
        placeholder: true,
    },
    PageInfo {
        id: PageId::H,
        route: "PageH",
        title: "Logout",
        icon: "🚪",
        placeholder: false,
    },
];

/// Pages reachable from the home screen, in button order.
const HOME_MENU: [PageId; 4] = [PageId::A, PageId::C, PageId::G, PageId::H];

impl PageId {
    pub const ALL: [PageId; 8] = [
        PageId::A,
        PageId::B,
        PageId::C,
        PageId::D,
        PageId::E,
        PageId::F,
        PageId::G,
        PageId::H,
    ];

    /// Resolve a single-letter page code, case-insensitively.
    pub fn from_code(code: char) -> Option<Self> {
        let index = (code.to_ascii_uppercase() as u32).checked_sub('A' as u32)?;
        Self::ALL.get(index as usize).copied()
    }

    /// Resolve a route name such as `PageE`.
    pub fn from_route(route: &str) -> Option<Self> {
        let mut rest = route.strip_prefix("Page")?.chars();
        match (rest.next(), rest.next()) {
            (Some(code), None) if code.is_ascii_uppercase() => Self::from_code(code),
            _ => None,
        }
    }

    pub fn info(self) -> &'static PageInfo {
        &PAGES[self as usize]
    }

    pub fn title(self) -> &'static str {
        self.info().title
    }
}

/// The whole route table.
pub fn all_pages() -> &'static [PageInfo] {
    &PAGES
}

/// The home screen buttons: Bin Status, QR Code, Settings, Logout.
pub fn home_menu() -> impl Iterator<Item = &'static PageInfo> {
    HOME_MENU.iter().map(|id| id.info())
}
