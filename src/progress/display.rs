//! Terminal progress bars.
//!
//! [`ProgressBarObserver`] turns fetch notifications into `indicatif` bars:
//! a main bar counting finished archives and one child bar per archive in
//! flight, all coordinated by a single [`MultiProgress`].

use crate::progress::{Progress, ProgressObserver, StyleOptions};

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Progress observer drawing `indicatif` bars.
pub struct ProgressBarObserver {
    /// The multi-progress instance for coordinating multiple progress bars.
    multi: Arc<MultiProgress>,
    /// The main progress bar for overall progress.
    main: ProgressBar,
    /// Child bars of archives currently transferring.
    children: Mutex<HashMap<String, ProgressBar>>,
    /// Style options for progress bars.
    style_options: StyleOptions,
    /// Whether the main progress bar is drawn.
    show_main_progress: bool,
}

impl ProgressBarObserver {
    /// Create bars for `total_archives` archives.
    ///
    /// The main bar is only drawn when more than one archive is fetched.
    pub fn new(style_options: StyleOptions, total_archives: usize) -> Self {
        let multi = match style_options.is_enabled() {
            true => Arc::new(MultiProgress::new()),
            false => Arc::new(MultiProgress::with_draw_target(ProgressDrawTarget::hidden())),
        };

        let show_main_progress = total_archives > 1;

        let main = if show_main_progress {
            let main = multi.add(style_options.main().to_progress_bar(total_archives as u64));
            main.tick();
            main
        } else {
            ProgressBar::hidden()
        };

        Self {
            multi,
            main,
            children: Mutex::new(HashMap::new()),
            style_options,
            show_main_progress,
        }
    }

    /// Finish the main bar, clearing or keeping it based on configuration.
    pub fn finish(&self) {
        if self.show_main_progress {
            if self.style_options.main().clear {
                self.main.finish_and_clear();
            } else {
                self.main.finish();
            }
        }
    }

    fn finish_child(&self, pb: ProgressBar) {
        if self.style_options.child().clear {
            pb.finish_and_clear();
        } else {
            pb.finish();
        }
    }
}

impl std::fmt::Debug for ProgressBarObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressBarObserver")
            .field("style_options", &self.style_options)
            .field("show_main_progress", &self.show_main_progress)
            .finish()
    }
}

impl ProgressObserver for ProgressBarObserver {
    fn on_start(&self, progress: &Progress<'_>) {
        // Resumed transfers start where the local file ends.
        let pb = self.multi.add(
            self.style_options
                .child()
                .to_progress_bar(progress.total)
                .with_position(progress.transferred)
                .with_message(progress.identifier.to_string()),
        );
        if let Ok(mut children) = self.children.lock() {
            children.insert(progress.identifier.to_string(), pb);
        }
    }

    fn on_chunk(&self, progress: &Progress<'_>) {
        if let Ok(children) = self.children.lock() {
            if let Some(pb) = children.get(progress.identifier) {
                pb.set_position(progress.transferred);
            }
        }
    }

    fn on_finish(&self, identifier: &str) {
        let pb = match self.children.lock() {
            Ok(mut children) => children.remove(identifier),
            Err(_) => None,
        };
        if let Some(pb) = pb {
            self.finish_child(pb);
        }
        self.main.inc(1);
    }
}
