//! Terminal front end
//!
//! The viewer's display side is a line-oriented terminal: widget updates are
//! printed, and commands typed on standard input become viewer input.

use anyhow::{Context, Result};
use app_core::viewer::{
    task_channel, Background, Controls, FileIndex, InputEvent, Key, LabelsContext, Point, Size, SystemClock,
    ViewerAction, ViewerChrome, ViewerServices, CONFIRM_DELETE_KEY,
};
use app_core::{
    AppConfig, DecodedImage, DomainEvent, EventBus, FileIterator, ImageLoader, PathListIterator, PictureViewer,
    ViewerLoop, ViewerMode,
};
use app_fs::DefaultFileOperations;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

const HELP: &str = "\
Commands:
  n, next          next picture        p, prev          previous picture
  +, in            zoom in             -, out           zoom out
  0, reset         fit / actual size   left right up down  keys
  wheel X Y D      wheel at X,Y        drag X1 Y1 X2 Y2 drag or swipe
  size W H         resize viewport     d, delete        delete picture
  i, info          file info           b, back          close viewer
  h, help          this help           q, quit          exit";

/// Display side of the viewer on a terminal
struct TerminalChrome {
    /// Set while `confirm` waits for the next input line
    confirm_pending: Arc<AtomicBool>,
    answers: Receiver<String>,
    last_scale: Option<f64>,
}

impl TerminalChrome {
    fn new(confirm_pending: Arc<AtomicBool>, answers: Receiver<String>) -> Self {
        Self {
            confirm_pending,
            answers,
            last_scale: None,
        }
    }
}

impl ViewerChrome for TerminalChrome {
    fn set_title(&mut self, title: &str) {
        println!("== {} ==", title);
    }

    fn show_viewer(&mut self) {
        tracing::debug!("Viewer shown");
    }

    fn hide_viewer(&mut self) {
        println!("Viewer closed");
    }

    fn show_main_view(&mut self) {
        println!("Back to the library");
    }

    fn set_slot_image(&mut self, slot: usize, image: Option<Arc<DecodedImage>>) {
        tracing::debug!(slot, size = ?image.map(|i| (i.width, i.height)), "Slot image");
    }

    fn set_slot_background(&mut self, slot: usize, background: &Background) {
        tracing::trace!(slot, ?background, "Slot background");
    }

    fn set_slot_offset(&mut self, slot: usize, x: Option<f64>) {
        tracing::trace!(slot, ?x, "Slot offset");
    }

    fn show_loading_tip(&mut self, visible: bool) {
        if visible {
            println!("Loading...");
        }
    }

    fn set_loading_progress(&mut self, percent: f32) {
        tracing::debug!(percent, "Loading progress");
    }

    fn show_unsupported_tip(&mut self, visible: bool) {
        if visible {
            println!("Unsupported picture");
        }
    }

    fn show_empty_tip(&mut self, visible: bool) {
        if visible {
            println!("No pictures");
        }
    }

    fn update_controls(&mut self, controls: &Controls) {
        tracing::debug!(?controls, "Controls");
    }

    fn update_labels(&mut self, labels: &LabelsContext) {
        let Some((width, height)) = labels.image_size else {
            self.last_scale = None;
            return;
        };
        if self.last_scale != Some(labels.scale) {
            self.last_scale = Some(labels.scale);
            println!("{}x{} at {:.0}%", width, height, labels.scale * 100.0);
        }
    }

    fn confirm(&mut self, title_key: &str) -> bool {
        let title = match title_key {
            CONFIRM_DELETE_KEY => "Delete this picture?",
            other => other,
        };
        self.confirm_pending.store(true, Ordering::Release);
        print!("{} [y/N] ", title);
        let _ = std::io::stdout().flush();
        match self.answers.recv() {
            Ok(answer) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }

    fn show_info(&mut self, path: &Path) {
        match std::fs::metadata(path) {
            Ok(meta) => println!("{} ({} bytes)", path.display(), meta.len()),
            Err(e) => println!("{} ({})", path.display(), e),
        }
    }

    fn quit(&mut self) {
        println!("Bye");
    }
}

/// The library index is not part of this front end; deletions are logged
struct LoggingIndex;

impl FileIndex for LoggingIndex {
    fn delete_files(&mut self, paths: &[PathBuf]) {
        for path in paths {
            tracing::info!("Removed from index: {}", path.display());
        }
    }
}

#[derive(Debug, PartialEq)]
enum Command {
    Input(Vec<InputEvent>),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let name = words.next()?;
    let args: Vec<f64> = words.map(str::parse).collect::<Result<_, _>>().ok()?;

    let action = |action| Some(Command::Input(vec![InputEvent::Action(action)]));
    let key = |key| Some(Command::Input(vec![InputEvent::Key(key)]));
    match (name, args.as_slice()) {
        ("n" | "next", []) => action(ViewerAction::Next),
        ("p" | "prev", []) => action(ViewerAction::Prev),
        ("+" | "in", []) => action(ViewerAction::ZoomIn),
        ("-" | "out", []) => action(ViewerAction::ZoomOut),
        ("0" | "reset", []) => action(ViewerAction::ResetSize),
        ("d" | "delete", []) => action(ViewerAction::Delete),
        ("i" | "info", []) => action(ViewerAction::Info),
        ("b" | "back", []) => action(ViewerAction::Back),
        ("left", []) => key(Key::Left),
        ("right", []) => key(Key::Right),
        ("up", []) => key(Key::Up),
        ("down", []) => key(Key::Down),
        ("wheel", &[x, y, delta]) => Some(Command::Input(vec![InputEvent::Wheel {
            at: Point::new(x, y),
            delta,
        }])),
        ("drag", &[x1, y1, x2, y2]) => {
            let from = Point::new(x1, y1);
            let to = Point::new(x2, y2);
            Some(Command::Input(vec![
                InputEvent::MouseDown(from),
                InputEvent::MouseMove(from.midpoint(to)),
                InputEvent::MouseMove(to),
                InputEvent::MouseUp(to),
            ]))
        }
        ("size", &[w, h]) if w > 0.0 && h > 0.0 => Some(Command::Input(vec![InputEvent::Resize(Size::new(w, h))])),
        ("h" | "help", []) => Some(Command::Help),
        ("q" | "quit", []) => Some(Command::Quit),
        _ => None,
    }
}

/// Read commands from stdin. Closing the input sender ends the viewer loop.
fn spawn_command_reader(input: Sender<InputEvent>, answers: Sender<String>, confirm_pending: Arc<AtomicBool>) -> Result<()> {
    thread::Builder::new()
        .name("command-reader".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if confirm_pending.swap(false, Ordering::AcqRel) {
                    if answers.send(line).is_err() {
                        break;
                    }
                    continue;
                }
                match parse_command(&line) {
                    Some(Command::Input(events)) => {
                        if events.into_iter().any(|event| input.send(event).is_err()) {
                            break;
                        }
                    }
                    Some(Command::Help) => println!("{}", HELP),
                    Some(Command::Quit) => break,
                    None if line.trim().is_empty() => {}
                    None => println!("Unknown command: {} (h for help)", line.trim()),
                }
            }
            tracing::debug!("Command reader finished");
        })
        .context("Failed to spawn command reader")?;
    Ok(())
}

fn spawn_event_log(events: Receiver<DomainEvent>) -> Result<()> {
    thread::Builder::new()
        .name("event-log".into())
        .spawn(move || {
            for event in events {
                match event {
                    DomainEvent::FileDeleted(path) => tracing::info!("File deleted: {}", path.display()),
                }
            }
        })
        .context("Failed to spawn event log")?;
    Ok(())
}

/// Open `path` and run the viewer until the user quits
pub fn run(config: AppConfig, path: PathBuf) -> Result<()> {
    anyhow::ensure!(path.is_file(), "Not a file: {}", path.display());

    let (tasks, task_rx) = task_channel();
    let (input_tx, input_rx) = unbounded();
    let (answer_tx, answer_rx) = unbounded();
    let confirm_pending = Arc::new(AtomicBool::new(false));

    let events = EventBus::new();
    spawn_event_log(events.subscribe())?;

    let services = ViewerServices {
        source: Arc::new(ImageLoader::new()?),
        files: Arc::new(DefaultFileOperations::new()),
        index: Box::new(LoggingIndex),
        events,
        clock: Arc::new(SystemClock),
    };
    let chrome = TerminalChrome::new(Arc::clone(&confirm_pending), answer_rx);
    let mut viewer = PictureViewer::new(&config, chrome, services, tasks)?;
    viewer.resize(Size::new(1280.0, 800.0));

    // Full mode expects the list from the library; here it is the folder
    let mut current = path;
    if config.general.start_mode == ViewerMode::Full {
        let iterator = PathListIterator::from(app_fs::scan_folder_of(&current)?);
        if let Some(scanned) = iterator.filepath() {
            current = scanned.to_path_buf();
        }
        viewer.set_iterator(Box::new(iterator));
    }
    viewer.open(&current);
    println!("{}", HELP);

    spawn_command_reader(input_tx, answer_tx, confirm_pending)?;
    ViewerLoop::new(viewer, task_rx, input_rx).run();

    tracing::info!("LC-Finder exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actions_and_keys() {
        assert_eq!(
            parse_command("n"),
            Some(Command::Input(vec![InputEvent::Action(ViewerAction::Next)]))
        );
        assert_eq!(
            parse_command("  delete "),
            Some(Command::Input(vec![InputEvent::Action(ViewerAction::Delete)]))
        );
        assert_eq!(parse_command("left"), Some(Command::Input(vec![InputEvent::Key(Key::Left)])));
        assert_eq!(parse_command("q"), Some(Command::Quit));
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("next 3"), None);
    }

    #[test]
    fn test_parse_pointer_commands() {
        assert_eq!(
            parse_command("wheel 10 20 -1"),
            Some(Command::Input(vec![InputEvent::Wheel {
                at: Point::new(10.0, 20.0),
                delta: -1.0,
            }]))
        );
        let Some(Command::Input(events)) = parse_command("drag 400 300 200 300") else {
            panic!("drag not parsed");
        };
        assert_eq!(events.len(), 4);
        assert_eq!(events[1], InputEvent::MouseMove(Point::new(300.0, 300.0)));
        assert_eq!(parse_command("size 0 10"), None);
        assert_eq!(parse_command("wheel a b c"), None);
    }
}
