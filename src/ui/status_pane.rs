// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use nimbus_client::catalog::frame_label;
use nimbus_client::Coordinates;

use crate::status::{DiagnosticLevel, StatusLog};

/// Snapshot of app state shown alongside the diagnostics
#[derive(Debug, Clone, Copy)]
pub struct StatusSummary {
    pub frame_count: usize,
    pub generated: Option<i64>,
    pub playing: bool,
    pub center: Coordinates,
}

#[derive(Debug)]
pub struct StatusPane {
    pub visible: bool,
    pub collapsed: bool,
}

impl Default for StatusPane {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusPane {
    pub fn new() -> Self {
        Self {
            visible: true,
            collapsed: true,
        }
    }

    /// Render the status pane as a floating window
    pub fn render(&mut self, ctx: &egui::Context, status: &mut StatusLog, summary: &StatusSummary) {
        if !self.visible {
            egui::Window::new("show_status")
                .title_bar(false)
                .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(10.0, -10.0))
                .resizable(false)
                .frame(
                    egui::Frame::window(&ctx.style())
                        .fill(egui::Color32::from_rgba_unmultiplied(25, 30, 35, 200))
                        .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(60, 80, 100)))
                        .corner_radius(6.0),
                )
                .show(ctx, |ui| {
                    if ui
                        .button(
                            egui::RichText::new("📊 Show Status")
                                .color(egui::Color32::from_rgb(150, 200, 220))
                                .size(11.0),
                        )
                        .clicked()
                    {
                        self.visible = true;
                    }
                });
            return;
        }

        egui::Window::new("Status")
            .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(10.0, -10.0))
            .default_width(280.0)
            .resizable(false)
            .collapsible(false)
            .title_bar(false)
            .frame(
                egui::Frame::window(&ctx.style())
                    .fill(egui::Color32::from_rgba_unmultiplied(25, 30, 35, 230))
                    .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(60, 80, 100)))
                    .corner_radius(6.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new("◈ STATUS")
                            .color(egui::Color32::from_rgb(100, 180, 220))
                            .size(12.0)
                            .strong(),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .button(
                                egui::RichText::new("✕")
                                    .size(12.0)
                                    .color(egui::Color32::from_rgb(200, 100, 100)),
                            )
                            .on_hover_text("Hide status pane")
                            .clicked()
                        {
                            self.visible = false;
                        }

                        ui.add_space(4.0);

                        let collapse_icon = if self.collapsed { "▲" } else { "▼" };
                        if ui
                            .button(egui::RichText::new(collapse_icon).size(10.0))
                            .on_hover_text(if self.collapsed { "Expand" } else { "Collapse" })
                            .clicked()
                        {
                            self.collapsed = !self.collapsed;
                        }
                    });
                });

                render_current(ui, status);

                if self.collapsed {
                    return;
                }

                ui.separator();
                render_summary(ui, summary);
                ui.add_space(6.0);
                render_diagnostics_section(ui, status);
            });
    }
}

fn level_style(level: DiagnosticLevel) -> (&'static str, egui::Color32) {
    match level {
        DiagnosticLevel::Info => ("ℹ", egui::Color32::from_rgb(100, 180, 255)),
        DiagnosticLevel::Warning => ("⚠", egui::Color32::from_rgb(255, 200, 100)),
        DiagnosticLevel::Error => ("✕", egui::Color32::from_rgb(255, 100, 100)),
    }
}

fn render_current(ui: &mut egui::Ui, status: &mut StatusLog) {
    let Some(current) = status.current() else {
        return;
    };

    let (icon, color) = level_style(current.level);
    let dismissed = ui
        .horizontal(|ui| {
            ui.label(egui::RichText::new(icon).color(color).size(10.0));
            ui.label(
                egui::RichText::new(&current.message)
                    .color(egui::Color32::from_rgb(200, 200, 200))
                    .size(10.0),
            );
            ui.small_button("✕")
                .on_hover_text("Dismiss (kept in diagnostics)")
                .clicked()
        })
        .inner;

    if dismissed {
        status.clear_current();
    }
}

fn summary_row(ui: &mut egui::Ui, name: &str, value: String) {
    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(name)
                .color(egui::Color32::from_rgb(130, 130, 130))
                .size(9.0),
        );
        ui.label(
            egui::RichText::new(value)
                .color(egui::Color32::from_rgb(200, 200, 200))
                .size(9.0)
                .monospace(),
        );
    });
}

fn render_summary(ui: &mut egui::Ui, summary: &StatusSummary) {
    summary_row(ui, "Frames:", summary.frame_count.to_string());
    if let Some(generated) = summary.generated {
        summary_row(
            ui,
            "Catalog:",
            frame_label(generated).trim_start_matches("Frame: ").to_string(),
        );
    }
    summary_row(
        ui,
        "Playback:",
        if summary.playing { "playing" } else { "paused" }.to_string(),
    );
    summary_row(ui, "Center:", summary.center.to_string());
}

fn render_diagnostics_section(ui: &mut egui::Ui, status: &StatusLog) {
    ui.label(
        egui::RichText::new("DIAGNOSTICS")
            .color(egui::Color32::from_rgb(150, 150, 150))
            .size(10.0)
            .strong(),
    );

    ui.add_space(3.0);

    if status.diagnostics.is_empty() {
        ui.label(
            egui::RichText::new("No messages")
                .color(egui::Color32::from_rgb(100, 100, 100))
                .size(8.0)
                .italics(),
        );
        return;
    }

    // Each line is approximately 14 pixels tall
    let line_height = 14.0;
    let max_visible_lines = 8.0;

    egui::ScrollArea::vertical()
        .max_height(line_height * max_visible_lines)
        .auto_shrink([false, true])
        .show(ui, |ui| {
            // Newest first
            for diagnostic in status.diagnostics.iter().rev() {
                ui.horizontal(|ui| {
                    let (icon, color) = level_style(diagnostic.level);
                    ui.label(egui::RichText::new(icon).color(color).size(9.0));

                    let time_str = diagnostic.timestamp.format("%H:%M:%S").to_string();
                    ui.label(
                        egui::RichText::new(time_str)
                            .color(egui::Color32::from_rgb(100, 100, 100))
                            .size(8.0)
                            .monospace(),
                    );

                    ui.label(
                        egui::RichText::new(&diagnostic.message)
                            .color(egui::Color32::from_rgb(180, 180, 180))
                            .size(8.0),
                    )
                    .on_hover_text(&diagnostic.message);
                });
            }
        });
}
