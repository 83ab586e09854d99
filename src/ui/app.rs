//! Main Quip application struct and eframe integration

use eframe::egui;
use egui::{CentralPanel, RichText, ScrollArea};
use tracing::{debug, info, warn};

use crate::commands::PLAY_MUSIC_PHRASE;
use crate::pipeline::{DispatchEvent, DispatcherHandle};
use crate::playback::{MusicPlayer, TRACK_PATH};
use crate::ui::theme::Theme;
use crate::QuipError;

/// Commands exposed as one-tap quick buttons.
const QUICK_COMMANDS: &[&str] = &["play music", "call mom", "what's the weather?"];

/// Main Quip application
pub struct QuipApp {
    /// Handle to the dispatch worker (taken on exit)
    handle: Option<DispatcherHandle>,
    /// Text field contents
    input: String,
    /// UI theme
    theme: Theme,
    /// Audio player, if an output device was available
    player: Option<MusicPlayer>,
}

impl QuipApp {
    /// Create the application around a running dispatcher
    pub fn new(cc: &eframe::CreationContext<'_>, handle: DispatcherHandle) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);

        let player = match MusicPlayer::new() {
            Ok(player) => Some(player),
            Err(e) => {
                warn!("[AUDIO] Playback unavailable: {}", e);
                None
            }
        };

        info!("Quip UI initialized");

        Self {
            handle: Some(handle),
            input: String::new(),
            theme,
            player,
        }
    }

    /// Submit whatever is in the text field
    fn submit_input(&mut self) {
        let text = std::mem::take(&mut self.input);
        self.submit(text);
    }

    /// Send a command to the dispatcher
    fn submit(&mut self, text: impl Into<String>) {
        let Some(handle) = self.handle.as_ref() else {
            return;
        };
        match handle.submit(text) {
            Ok(()) => {}
            Err(QuipError::PipelineBusy) => {
                // Button should be disabled while busy; drop the extra click
                debug!("Submission refused, pipeline busy");
            }
            Err(e) => warn!("Submission failed: {}", e),
        }
    }

    /// Drain worker events, triggering playback where needed
    fn process_events(&mut self, ctx: &egui::Context) {
        let mut events = Vec::new();
        if let Some(handle) = self.handle.as_ref() {
            while let Some(event) = handle.try_recv_event() {
                events.push(event);
            }
        }

        for event in events {
            if let DispatchEvent::Responded { matched_phrase, .. } = &event {
                if matched_phrase == PLAY_MUSIC_PHRASE {
                    self.start_playback();
                }
            }
            ctx.request_repaint();
        }
    }

    /// Start playing the bundled track
    fn start_playback(&mut self) {
        let Some(player) = self.player.as_mut() else {
            warn!("[AUDIO] No playback device, skipping track");
            return;
        };
        if let Err(e) = player.play(TRACK_PATH) {
            warn!("[AUDIO] {}", e);
        }
    }

    /// Stop the current track
    fn stop_playback(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.stop();
        }
    }
}

impl eframe::App for QuipApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_events(ctx);

        let Some(handle) = self.handle.as_ref() else {
            return;
        };
        let snapshot = handle.state().snapshot();
        let busy = snapshot.is_busy();

        // Keep polling for worker events while a submission is in flight
        if busy {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        let mut submitted = false;
        let mut quick_command: Option<&str> = None;
        let mut stop_music = false;

        CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("🤖 Quip");
            });
            ui.add_space(self.theme.spacing);

            // Quick command buttons
            ui.horizontal(|ui| {
                for command in QUICK_COMMANDS {
                    if ui.add_enabled(!busy, egui::Button::new(*command)).clicked() {
                        quick_command = Some(*command);
                    }
                }
            });
            ui.add_space(self.theme.spacing_sm);

            // Text input
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.input)
                    .hint_text("Type a command...")
                    .desired_width(f32::INFINITY),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submitted = true;
            }

            ui.horizontal(|ui| {
                if ui.add_enabled(!busy, egui::Button::new("Submit")).clicked() {
                    submitted = true;
                }
                if ui
                    .button(RichText::new("Stop Music").color(self.theme.error))
                    .clicked()
                {
                    stop_music = true;
                }
                if busy {
                    ui.spinner();
                }
            });
            ui.add_space(self.theme.spacing);

            // Response area
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new(snapshot.response_text.as_str())
                        .size(18.0)
                        .color(self.theme.text_primary),
                );
            });
            ui.add_space(self.theme.spacing);

            // Activity log, newest first
            ScrollArea::vertical().max_height(150.0).show(ui, |ui| {
                for line in snapshot.log.iter().rev() {
                    ui.label(
                        RichText::new(line.as_str())
                            .size(12.0)
                            .color(self.theme.text_muted),
                    );
                }
            });
        });

        if let Some(command) = quick_command {
            self.input.clear();
            self.submit(command);
        } else if submitted && !busy {
            self.submit_input();
        }
        if stop_music {
            self.stop_playback();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.stop_playback();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.shutdown() {
                warn!("Dispatcher shutdown failed: {}", e);
            }
        }
    }
}
