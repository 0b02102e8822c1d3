//! Configuration module

mod site;

pub use site::HighlightConfig;
pub use site::MenuItem;
pub use site::SiteConfig;
pub use site::ThemeConfig;
pub use site::WidgetsConfig;
