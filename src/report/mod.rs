pub mod export;
pub mod table;
pub mod window;

pub use table::render_report;
pub use window::DisplayWindow;
