#![forbid(unsafe_code)]
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]

#[cfg(target_arch = "wasm32")]
compile_error!("markpane is a native desktop app; web/wasm builds are not supported.");

use std::{ffi::OsString, path::PathBuf, time::Instant};

use eframe::egui;
use markpane_core::{
    Command, FileLifecycle, KeyChord, MarkdownConverter, Outcome, Session, config::Config, input,
};

mod dialog;
mod preview;

use dialog::NativeDialog;
use preview::PreviewPane;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct LaunchOptions {
    path: Option<PathBuf>,
}

fn parse_launch_options<I, S>(args: I) -> LaunchOptions
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut path = None;

    for arg in args {
        let arg = arg.into();
        if arg.to_string_lossy().starts_with('-') {
            continue;
        }
        if path.is_none() {
            path = Some(PathBuf::from(arg));
        }
    }

    LaunchOptions { path }
}

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load();
    let launch_options = parse_launch_options(std::env::args_os().skip(1));
    let app = MarkpaneApp::new(&config, launch_options);

    // Viewport sizes are in points, so they scale with the OS DPI factor.
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Markdown Editor")
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };
    eframe::run_native(
        "markpane",
        options,
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
}

struct MarkpaneApp {
    session: Session<MarkdownConverter, PreviewPane>,
    lifecycle: FileLifecycle,
    dialog: NativeDialog,
    error: Option<String>,
    title: String,
}

impl eframe::App for MarkpaneApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut commands = ctx.input_mut(take_shortcuts);

        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    for entry in input::FILE_MENU {
                        let button = egui::Button::new(entry.label()).shortcut_text(entry.accelerator);
                        if ui.add(button).on_hover_text(entry.help).clicked() {
                            commands.push(entry.command);
                            ui.close();
                        }
                    }
                });
            });
        });

        for command in commands {
            self.run(command);
        }

        if let Some(remaining) = self.session.flush_due(Instant::now()) {
            ctx.request_repaint_after(remaining);
        }

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| self.show_status(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |columns| {
                self.show_editor(&mut columns[0]);
                self.show_preview(&mut columns[1]);
            });
        });

        self.update_viewport_title(ctx);
    }
}

/// Pull bound shortcuts out of this frame's events so the editor never sees them.
fn take_shortcuts(input: &mut egui::InputState) -> Vec<Command> {
    let mut commands = Vec::new();
    input.events.retain(|event| {
        let egui::Event::Key {
            key,
            pressed: true,
            modifiers,
            ..
        } = event
        else {
            return true;
        };
        let chord = KeyChord {
            ctrl: modifiers.command,
            alt: modifiers.alt,
            shift: modifiers.shift,
            key: key_char(*key),
        };
        match input::dispatch_key(chord) {
            Some(command) => {
                commands.push(command);
                false
            }
            None => true,
        }
    });
    commands
}

fn key_char(key: egui::Key) -> Option<char> {
    let mut chars = key.name().chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

impl MarkpaneApp {
    fn new(config: &Config, options: LaunchOptions) -> Self {
        let mut app = Self {
            session: Session::new(
                MarkdownConverter,
                PreviewPane::default(),
                config.session_options(),
            ),
            lifecycle: config.lifecycle(),
            dialog: NativeDialog,
            error: None,
            title: String::new(),
        };
        if let Some(path) = options.path {
            app.open_startup_path(path);
        }
        app
    }

    /// An unreadable startup file leaves the empty document in place.
    fn open_startup_path(&mut self, path: PathBuf) {
        if let Err(err) = self.lifecycle.open_path(&mut self.session, path) {
            tracing::warn!(%err, "starting with an empty document");
            self.error = Some(format!("Open failed: {err}"));
        }
    }

    fn run(&mut self, command: Command) {
        match self
            .lifecycle
            .run(command, &mut self.session, &mut self.dialog)
        {
            Ok(Outcome::Completed) => self.error = None,
            Ok(Outcome::Cancelled) => {}
            Err(err) => {
                tracing::warn!(%err, ?command, "command failed");
                self.error = Some(format!("{} failed: {err}", command.label()));
            }
        }
    }

    fn show_editor(&mut self, ui: &mut egui::Ui) {
        self.session.edit_text(|text| {
            let editor = egui::TextEdit::multiline(text)
                .desired_width(f32::INFINITY)
                .font(egui::TextStyle::Monospace)
                .id(egui::Id::new("editor"));
            ui.add_sized(ui.available_size(), editor).changed()
        });
    }

    fn show_preview(&mut self, ui: &mut egui::Ui) {
        if !self.session.renderer_mut().ui(ui) {
            return;
        }
        match self.session.renderer().open_in_browser() {
            Ok(path) => tracing::info!(path = %path.display(), "preview opened in browser"),
            Err(err) => {
                tracing::warn!(%err, "failed to open preview in browser");
                self.error = Some(format!("Open in browser failed: {err}"));
            }
        }
    }

    fn show_status(&mut self, ui: &mut egui::Ui) {
        let mut clear_error = false;

        ui.horizontal(|ui| {
            ui.label(self.session.document().path_label());

            if self.session.document().is_dirty() {
                ui.separator();
                ui.colored_label(ui.visuals().warn_fg_color, "Modified");
            }

            if let Some(err) = self.session.conversion_error() {
                ui.separator();
                ui.colored_label(ui.visuals().warn_fg_color, err.to_string());
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(error) = self.error.as_deref() {
                    if ui.button("x").clicked() {
                        clear_error = true;
                    }
                    ui.colored_label(ui.visuals().error_fg_color, error);
                }
            });
        });

        if clear_error {
            self.error = None;
        }
    }

    fn update_viewport_title(&mut self, ctx: &egui::Context) {
        let doc = self.session.document();
        let title = format!(
            "Markdown Editor - {}{}",
            doc.title(),
            if doc.is_dirty() { "*" } else { "" }
        );
        if title != self.title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.title = title;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn parse(args: &[&str]) -> LaunchOptions {
        parse_launch_options(args.iter().copied().map(OsString::from))
    }

    #[test]
    fn parse_launch_options_takes_first_path() {
        let cases = [
            (&[][..], None),
            (&["README.md"][..], Some("README.md")),
            (&["README.md", "OTHER.md"][..], Some("README.md")),
            (&["--verbose", "notes.md"][..], Some("notes.md")),
        ];

        for (args, path) in cases {
            let options = parse(args);
            assert_eq!(options.path.as_deref(), path.map(PathBuf::from).as_deref());
        }
    }

    #[test]
    fn key_char_maps_letters_only() {
        assert_eq!(key_char(egui::Key::N), Some('N'));
        assert_eq!(key_char(egui::Key::S), Some('S'));
        assert_eq!(key_char(egui::Key::Enter), None);
    }

    fn key_event(key: egui::Key, modifiers: egui::Modifiers) -> egui::Event {
        egui::Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers,
        }
    }

    #[test]
    fn shortcuts_are_consumed_and_other_keys_pass_through() {
        let mut input = egui::InputState::default();
        input.events = vec![
            key_event(egui::Key::S, egui::Modifiers::COMMAND),
            key_event(egui::Key::A, egui::Modifiers::COMMAND),
            key_event(egui::Key::N, egui::Modifiers::NONE),
            egui::Event::Text("n".to_owned()),
        ];

        let commands = take_shortcuts(&mut input);
        assert_eq!(commands, [Command::Save]);
        assert_eq!(input.events.len(), 3);
    }

    #[test]
    fn unreadable_startup_path_starts_empty() {
        let missing = std::env::temp_dir().join("markpane-startup-missing-98765.md");
        let app = MarkpaneApp::new(
            &Config::default(),
            LaunchOptions {
                path: Some(missing),
            },
        );
        assert_eq!(app.session.text(), "");
        assert!(app.error.as_deref().is_some_and(|e| e.starts_with("Open failed")));
    }

    #[test]
    fn startup_path_is_rendered() {
        let dir = std::env::temp_dir().join(format!("markpane-startup-{}", std::process::id()));
        let _ = fs::create_dir_all(&dir);
        let path = dir.join("start.md");
        fs::write(&path, "# Hi").ok();

        let app = MarkpaneApp::new(&Config::default(), LaunchOptions { path: Some(path) });
        assert_eq!(app.session.text(), "# Hi");
        assert!(app.session.renderer().page().html.contains("<h1>Hi</h1>"));
        assert!(app.error.is_none());

        let _ = fs::remove_dir_all(&dir);
    }
}
