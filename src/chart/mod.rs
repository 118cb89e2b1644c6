//! The headless chart core: date window, scroll anchoring, layout cache,
//! window maintenance, bar geometry, filters and the controller tying them
//! to host input. Nothing in here depends on egui.

pub mod controller;
pub mod date_window;
pub mod dimensions;
pub mod filter;
pub mod maintainer;
pub mod overlay;
pub mod scheduler;
pub mod scroll_anchor;

pub use controller::{ChartEvent, ProgressIntent, ViewportController, WheelInput};
pub use dimensions::LayoutProbe;
pub use filter::FilterColumn;
pub use maintainer::WindowPolicy;
pub use overlay::{Lane, OverlayBar};
pub use scroll_anchor::ScrollSurface;
