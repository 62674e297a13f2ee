//! The dashboard server acting as host platform for the notification
//! protocol: display surface, page clients, permission prompt, alerts.

pub mod alert;
pub mod desktop;
pub mod pages;
pub mod permission;

pub use alert::PageAlert;
pub use desktop::DesktopSurface;
pub use pages::PageRegistry;
pub use permission::PermissionBroker;
