//! The predictor window.

use egui::{Align2, Color32, RichText};
use tracing::info;

use crate::data::{FeatureColumn, FeatureKind};
use crate::predictor::{Classifier, Predictor};

pub const HEADER_TITLE: &str = "Loan Approval Predictor";
pub const PREDICT_LABEL: &str = "Predict Loan Status";

const FIELD_WIDTH: f32 = 220.0;
const BUTTON_GREEN: Color32 = Color32::from_rgb(0x2e, 0x7d, 0x32);
const ERROR_RED: Color32 = Color32::from_rgb(0xc6, 0x28, 0x28);

/// Editable state of one form control.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    /// Closed set of known categories; `selected` indexes `options`.
    Choice {
        options: Vec<String>,
        selected: usize,
    },
    /// Free text expected to parse as a number.
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub input: FieldInput,
}

impl FormField {
    /// Text the control currently holds.
    pub fn value(&self) -> &str {
        match &self.input {
            FieldInput::Choice { options, selected } => {
                options.get(*selected).map(String::as_str).unwrap_or_default()
            }
            FieldInput::Text(text) => text,
        }
    }
}

/// One control per feature column, in column order. Categorical columns start
/// on their first known value; numeric columns start empty.
pub fn build_form(columns: &[FeatureColumn]) -> Vec<FormField> {
    columns
        .iter()
        .map(|column| FormField {
            name: column.name.clone(),
            input: match &column.kind {
                FeatureKind::Categorical(encoder) => FieldInput::Choice {
                    options: encoder.classes().to_vec(),
                    selected: 0,
                },
                FeatureKind::Numeric => FieldInput::Text(String::new()),
            },
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Error,
    Info,
}

/// A modal message shown over the form until dismissed.
#[derive(Debug, Clone, PartialEq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub title: &'static str,
    pub message: String,
}

/// Application state: the trained predictor, its score, the form and any open
/// dialog.
pub struct LoanApp<C> {
    predictor: Predictor<C>,
    accuracy: f64,
    form: Vec<FormField>,
    dialog: Option<Dialog>,
}

impl<C: Classifier> LoanApp<C> {
    pub fn new(predictor: Predictor<C>, accuracy: f64) -> Self {
        let form = build_form(predictor.columns());
        LoanApp {
            predictor,
            accuracy,
            form,
            dialog: None,
        }
    }

    pub fn form(&self) -> &[FormField] {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut [FormField] {
        &mut self.form
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn dismiss_dialog(&mut self) {
        self.dialog = None;
    }

    /// Handles a click on the predict button. The form keeps its values
    /// whatever the result.
    pub fn on_predict(&mut self) {
        let values: Vec<&str> = self.form.iter().map(FormField::value).collect();
        self.dialog = Some(match self.predictor.predict(&values) {
            Ok(outcome) => {
                info!("Prediction: {}", outcome.label());
                Dialog {
                    kind: DialogKind::Info,
                    title: "Prediction Result",
                    message: outcome.message(),
                }
            }
            Err(err) if err.is_input_error() => Dialog {
                kind: DialogKind::Error,
                title: "Input Error",
                message: err.to_string(),
            },
            Err(err) => Dialog {
                kind: DialogKind::Error,
                title: "Error",
                message: err.to_string(),
            },
        });
    }

    fn render_header(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(10.0);
            ui.label(RichText::new(HEADER_TITLE).size(22.0).strong());
            ui.add_space(5.0);
            ui.label(RichText::new(format!("Model Accuracy: {:.2}", self.accuracy)).size(14.0));
            ui.add_space(8.0);
        });
    }

    fn render_form(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            for (idx, field) in self.form.iter_mut().enumerate() {
                ui.add_space(5.0);
                ui.label(RichText::new(field.name.as_str()).size(14.0));
                match &mut field.input {
                    FieldInput::Choice { options, selected } => {
                        let current = options.get(*selected).cloned().unwrap_or_default();
                        egui::ComboBox::from_id_salt(("form_field", idx))
                            .width(FIELD_WIDTH)
                            .selected_text(current)
                            .show_ui(ui, |ui| {
                                for (i, option) in options.iter().enumerate() {
                                    ui.selectable_value(selected, i, option.as_str());
                                }
                            });
                    }
                    FieldInput::Text(text) => {
                        ui.add(egui::TextEdit::singleline(text).desired_width(FIELD_WIDTH));
                    }
                }
            }
            ui.add_space(10.0);
        });
    }

    fn render_predict_bar(&mut self, ui: &mut egui::Ui, enabled: bool) {
        ui.vertical_centered(|ui| {
            ui.add_space(10.0);
            let button = egui::Button::new(
                RichText::new(PREDICT_LABEL)
                    .size(16.0)
                    .strong()
                    .color(Color32::WHITE),
            )
            .fill(BUTTON_GREEN)
            .min_size(egui::vec2(260.0, 44.0));
            if ui.add_enabled(enabled, button).clicked() {
                self.on_predict();
            }
            ui.add_space(10.0);
        });
    }

    fn render_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = &self.dialog else {
            return;
        };

        let mut open = true;
        let mut acknowledged = false;
        let color = match dialog.kind {
            DialogKind::Error => ERROR_RED,
            DialogKind::Info => ctx.style().visuals.text_color(),
        };
        egui::Window::new(dialog.title)
            .id(egui::Id::new("predictor_dialog"))
            .anchor(Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .order(egui::Order::Foreground)
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.set_min_width(280.0);
                ui.label(RichText::new(dialog.message.as_str()).size(15.0).color(color));
                ui.add_space(12.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        acknowledged = true;
                    }
                });
            });

        let escape = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        if !open || acknowledged || escape {
            self.dismiss_dialog();
        }
    }
}

impl<C: Classifier> eframe::App for LoanApp<C> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let idle = self.dialog.is_none();

        egui::TopBottomPanel::top("header").show(ctx, |ui| self.render_header(ui));
        egui::TopBottomPanel::bottom("predict_bar").show(ctx, |ui| {
            self.render_predict_bar(ui, idle);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.add_enabled_ui(idle, |ui| self.render_form(ui));
                });
        });

        self.render_dialog(ctx);
    }
}
