//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod audio;
pub mod touch;
pub mod ui;

pub use audio::audio_task;
pub use touch::touch_task;
pub use ui::ui_task;
