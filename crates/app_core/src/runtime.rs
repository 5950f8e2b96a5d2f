//! Interaction-thread event loop
//!
//! Multiplexes posted [`ViewerTask`]s, user input and the viewer's timers
//! onto the thread that owns the [`PictureViewer`].

use crate::viewer::{InputEvent, PictureViewer, ViewerChrome, ViewerTask};
use crossbeam_channel::{select, Receiver};
use std::time::Duration;

/// Wake-up interval when no timer is pending
const IDLE_WAIT: Duration = Duration::from_millis(500);

pub struct ViewerLoop<C: ViewerChrome> {
    viewer: PictureViewer<C>,
    tasks: Receiver<ViewerTask>,
    input: Receiver<InputEvent>,
}

impl<C: ViewerChrome> ViewerLoop<C> {
    pub fn new(viewer: PictureViewer<C>, tasks: Receiver<ViewerTask>, input: Receiver<InputEvent>) -> Self {
        Self { viewer, tasks, input }
    }

    pub fn viewer(&self) -> &PictureViewer<C> {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut PictureViewer<C> {
        &mut self.viewer
    }

    /// Run until the viewer asks to quit or the input side hangs up.
    /// The viewer is shut down on return.
    pub fn run(&mut self) {
        tracing::debug!("Viewer loop started");
        while !self.viewer.should_quit() {
            let wait = self.viewer.time_until_next_timer().unwrap_or(IDLE_WAIT);
            select! {
                recv(self.tasks) -> task => match task {
                    Ok(task) => self.viewer.handle_task(task),
                    Err(_) => break,
                },
                recv(self.input) -> event => match event {
                    Ok(event) => {
                        if let Err(e) = self.viewer.handle_input(event) {
                            if !e.is_recoverable() {
                                tracing::error!("Viewer stopped: {}", e);
                                break;
                            }
                            tracing::warn!("{}", e.user_message());
                        }
                    }
                    Err(_) => {
                        tracing::debug!("Input closed");
                        break;
                    }
                },
                default(wait) => {}
            }
            self.viewer.run_due_timers();
        }
        self.viewer.shutdown();
        tracing::debug!("Viewer loop finished");
    }
}
