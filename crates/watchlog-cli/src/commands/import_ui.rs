use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::sync::Mutex;
use watchlog_core::{ProgressSink, Stage};

/// Progress bar per stage on a terminal, structured log lines otherwise.
pub struct ImportUI {
    bar: Mutex<Option<ProgressBar>>,
    interactive: bool,
}

impl ImportUI {
    pub fn new(quiet: bool) -> Self {
        let interactive = !quiet && is_interactive();
        if !interactive {
            tracing::debug!(
                operation = "ui_init",
                mode = "non_interactive",
                "Progress bars disabled, using structured logging"
            );
        }

        Self {
            bar: Mutex::new(None),
            interactive,
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(bar) = guard.as_ref() {
                f(bar);
            }
        }
    }
}

impl ProgressSink for ImportUI {
    fn stage_started(&self, stage: Stage, total: usize) {
        if !self.interactive {
            tracing::info!(operation = "stage_started", stage = %stage, total = total, "{} started", stage);
            return;
        }

        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:>6} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
            .map(|s| s.progress_chars("█▉▊▋▌▍▎▏  "))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_prefix(stage.to_string());

        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn item_done(&self, stage: Stage, current: usize, label: &str) {
        if self.interactive {
            self.with_bar(|bar| {
                bar.set_position(current as u64);
                bar.set_message(label.to_string());
            });
        } else {
            tracing::debug!(
                operation = "progress",
                stage = %stage,
                current = current,
                item = label,
                "Progress update"
            );
        }
    }

    fn stage_finished(&self, stage: Stage) {
        if !self.interactive {
            tracing::info!(operation = "stage_finished", stage = %stage, "{} finished", stage);
            return;
        }

        if let Ok(mut guard) = self.bar.lock() {
            if let Some(bar) = guard.take() {
                bar.finish_with_message("done");
            }
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
