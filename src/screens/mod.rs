pub mod dashboard;
pub mod screensaver;

// Two screens: the dashboard (host metrics, containers, disks) and the
// screensaver that takes over after the idle timeout.

pub use dashboard::{Dashboard, DashboardView};
pub use screensaver::ScreensaverScreen;
