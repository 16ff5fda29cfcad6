//! The tint parameter and the materials it drives.

use crate::{colour::Colour, config::PanelConfig};

/// Index of the toon material the tint is written into.
pub const TINTED_MATERIAL: usize = 0;

/// Colours of the materials the scene owns, as the GPU should see them.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialPalette {
    pub toon: Vec<Colour>,
    pub particles: Colour,
    dirty: bool,
}

impl MaterialPalette {
    pub fn new(toon: Vec<Colour>, particles: Colour) -> Self {
        Self {
            toon,
            particles,
            dirty: false,
        }
    }

    /// Write `colour` into the tinted toon material and the particle material.
    pub fn tint(&mut self, colour: Colour) {
        if let Some(toon) = self.toon.get_mut(TINTED_MATERIAL) {
            *toon = colour;
        }
        self.particles = colour;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether there are colours to upload and marks them uploaded.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

/// One editable colour plus a list of preset swatches to cycle through.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterPanel {
    value: Colour,
    swatches: Vec<Colour>,
    next: usize,
    /// Contents of the hex field, committed when it loses focus.
    hex_input: String,
}

impl ParameterPanel {
    pub fn new(value: Colour, swatches: Vec<Colour>) -> Self {
        // start cycling after the current value if it is one of the swatches
        let next = swatches
            .iter()
            .position(|swatch| *swatch == value)
            .map_or(0, |i| i + 1);
        Self {
            value,
            swatches,
            next,
            hex_input: value.to_string(),
        }
    }

    /// Build the panel from config. Unparsable colours are logged and skipped.
    pub fn from_config(config: &PanelConfig) -> Self {
        let value = Colour::from_hex(&config.initial).unwrap_or_else(|e| {
            let fallback = PanelConfig::default().initial;
            log::error!("Invalid initial panel colour, using {fallback}: {e:#}");
            Colour::from_hex(&fallback).unwrap_or(Colour::WHITE)
        });
        let swatches = config
            .swatches
            .iter()
            .filter_map(|hex| match Colour::from_hex(hex) {
                Ok(colour) => Some(colour),
                Err(e) => {
                    log::error!("Skipping swatch: {e:#}");
                    None
                }
            })
            .collect();
        Self::new(value, swatches)
    }

    pub fn value(&self) -> Colour {
        self.value
    }

    pub fn swatches(&self) -> &[Colour] {
        &self.swatches
    }

    pub fn hex_input(&self) -> &str {
        &self.hex_input
    }

    /// Set the parameter and propagate it into the palette.
    pub fn edit(&mut self, colour: Colour, palette: &mut MaterialPalette) {
        log::debug!("Material colour set to {colour}");
        self.value = colour;
        self.hex_input = colour.to_string();
        palette.tint(colour);
    }

    /// Parse and set a hex colour. On error the previous value is kept.
    pub fn edit_hex(&mut self, hex: &str, palette: &mut MaterialPalette) -> anyhow::Result<()> {
        let colour = Colour::from_hex(hex)?;
        self.edit(colour, palette);
        Ok(())
    }

    /// Switch to the next swatch, wrapping around. Returns the new value.
    pub fn next_swatch(&mut self, palette: &mut MaterialPalette) -> Option<Colour> {
        if self.swatches.is_empty() {
            return None;
        }
        let colour = self.swatches[self.next % self.swatches.len()];
        self.next = (self.next + 1) % self.swatches.len();
        self.edit(colour, palette);
        Some(colour)
    }

    /// Apply whatever was typed into the hex field. Invalid input is logged
    /// and the field reset to the current value.
    pub fn commit_hex_input(&mut self, palette: &mut MaterialPalette) {
        let input = self.hex_input.trim().to_string();
        if input.eq_ignore_ascii_case(&self.value.to_string()) {
            return;
        }
        if let Err(e) = self.edit_hex(&input, palette) {
            log::warn!("Ignoring colour input: {e:#}");
            self.hex_input = self.value.to_string();
        }
    }

    /// One button per swatch, a click selects it. Returns the button rects.
    fn swatch_buttons(
        &mut self,
        ui: &mut egui::Ui,
        palette: &mut MaterialPalette,
    ) -> Vec<egui::Rect> {
        let mut rects = Vec::with_capacity(self.swatches.len());
        for i in 0..self.swatches.len() {
            let swatch = self.swatches[i];
            let [r, g, b] = swatch.to_srgb8();
            let button = egui::Button::new("")
                .fill(egui::Color32::from_rgb(r, g, b))
                .min_size(egui::vec2(18.0, 18.0));
            let response = ui.add(button).on_hover_text(swatch.to_string());
            if response.clicked() {
                self.next = (i + 1) % self.swatches.len();
                self.edit(swatch, palette);
            }
            rects.push(response.rect);
        }
        rects
    }

    /// Colour picker, swatch buttons and hex field.
    pub fn ui(&mut self, ui: &mut egui::Ui, palette: &mut MaterialPalette) {
        ui.horizontal(|ui| {
            ui.label("Material colour");
            let mut rgb = self.value.to_srgb8();
            if egui::color_picker::color_edit_button_srgb(ui, &mut rgb).changed() {
                self.edit(Colour::from_srgb8(rgb), palette);
            }
        });

        if !self.swatches.is_empty() {
            ui.horizontal(|ui| self.swatch_buttons(ui, palette));
        }

        ui.horizontal(|ui| {
            ui.label("Hex");
            let field =
                ui.add(egui::TextEdit::singleline(&mut self.hex_input).desired_width(72.0));
            if field.lost_focus() {
                self.commit_hex_input(palette);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> Colour {
        Colour::from_hex(s).unwrap()
    }

    fn palette() -> MaterialPalette {
        MaterialPalette::new(
            vec![hex("#E4572E"), hex("#17BEBB"), hex("#FFC914"), hex("#76B041")],
            hex("#ffeded"),
        )
    }

    #[test]
    fn editing_tints_exactly_two_materials() {
        let mut palette = palette();
        let before = palette.clone();
        let mut panel = ParameterPanel::new(hex("#ffeded"), vec![]);

        panel.edit(hex("#123456"), &mut palette);

        assert_eq!(panel.value(), hex("#123456"));
        assert_eq!(palette.toon[TINTED_MATERIAL], hex("#123456"));
        assert_eq!(palette.particles, hex("#123456"));
        assert_eq!(palette.toon[1..], before.toon[1..]);
        assert!(palette.take_dirty());
        assert!(!palette.is_dirty());
    }

    #[test]
    fn invalid_hex_keeps_the_previous_value() {
        let mut palette = palette();
        let mut panel = ParameterPanel::new(hex("#ffeded"), vec![]);
        assert!(panel.edit_hex("#12", &mut palette).is_err());
        assert_eq!(panel.value(), hex("#ffeded"));
        assert!(!palette.is_dirty());
    }

    #[test]
    fn swatches_cycle_after_the_current_value() {
        let mut palette = palette();
        let swatches = vec![hex("#ffeded"), hex("#e4572e"), hex("#17bebb")];
        let mut panel = ParameterPanel::new(hex("#ffeded"), swatches);
        assert_eq!(panel.next_swatch(&mut palette), Some(hex("#e4572e")));
        assert_eq!(panel.next_swatch(&mut palette), Some(hex("#17bebb")));
        assert_eq!(panel.next_swatch(&mut palette), Some(hex("#ffeded")));
    }

    #[test]
    fn typed_hex_is_committed_once() {
        let mut palette = palette();
        let mut panel = ParameterPanel::new(hex("#ffeded"), vec![]);
        assert_eq!(panel.hex_input(), "#ffeded");

        panel.hex_input = " #336699 ".to_string();
        panel.commit_hex_input(&mut palette);
        assert_eq!(panel.value(), hex("#336699"));
        assert_eq!(panel.hex_input(), "#336699");
        assert!(palette.take_dirty());

        // committing an unchanged field does not tint again
        panel.commit_hex_input(&mut palette);
        assert!(!palette.is_dirty());
    }

    #[test]
    fn bad_typed_hex_resets_the_field() {
        let mut palette = palette();
        let mut panel = ParameterPanel::new(hex("#ffeded"), vec![]);
        panel.hex_input = "#+f+f+f".to_string();
        panel.commit_hex_input(&mut palette);
        assert_eq!(panel.value(), hex("#ffeded"));
        assert_eq!(panel.hex_input(), "#ffeded");
        assert!(!palette.is_dirty());
    }

    #[test]
    fn swatch_key_updates_the_hex_field() {
        let mut palette = palette();
        let mut panel = ParameterPanel::new(hex("#ffeded"), vec![hex("#e4572e")]);
        panel.next_swatch(&mut palette);
        assert_eq!(panel.hex_input(), "#e4572e");
    }

    #[test]
    fn showing_the_panel_without_input_changes_nothing() {
        let mut palette = palette();
        let mut panel = ParameterPanel::new(hex("#ffeded"), vec![hex("#e4572e"), hex("#17bebb")]);
        let ctx = egui::Context::default();
        for _ in 0..2 {
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| panel.ui(ui, &mut palette));
            });
        }
        assert_eq!(panel.value(), hex("#ffeded"));
        assert!(!palette.is_dirty());
    }

    #[test]
    fn clicking_a_swatch_tints_the_palette() {
        let mut palette = palette();
        let swatches = vec![hex("#ffeded"), hex("#e4572e"), hex("#17bebb")];
        let mut panel = ParameterPanel::new(hex("#ffeded"), swatches);
        let ctx = egui::Context::default();
        let frame = |panel: &mut ParameterPanel,
                     palette: &mut MaterialPalette,
                     events: Vec<egui::Event>| {
            let mut rects = Vec::new();
            let input = egui::RawInput {
                events,
                ..Default::default()
            };
            let _ = ctx.run(input, |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.horizontal(|ui| rects = panel.swatch_buttons(ui, palette));
                });
            });
            rects
        };

        let rects = frame(&mut panel, &mut palette, vec![]);
        assert_eq!(rects.len(), 3);
        let at = rects[2].center();
        let press = |pressed| egui::Event::PointerButton {
            pos: at,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::NONE,
        };
        frame(&mut panel, &mut palette, vec![egui::Event::PointerMoved(at)]);
        frame(&mut panel, &mut palette, vec![press(true)]);
        frame(&mut panel, &mut palette, vec![press(false)]);

        assert_eq!(panel.value(), hex("#17bebb"));
        assert_eq!(palette.particles, hex("#17bebb"));
        assert!(palette.is_dirty());
        // the key continues after the clicked swatch
        assert_eq!(panel.next_swatch(&mut palette), Some(hex("#ffeded")));
    }

    #[test]
    fn config_with_bad_entries_still_builds() {
        let config = PanelConfig {
            initial: "not a colour".to_string(),
            swatches: vec!["#000000".to_string(), "#zzzzzz".to_string()],
        };
        let panel = ParameterPanel::from_config(&config);
        assert_eq!(panel.value(), hex("#ffeded"));
        assert_eq!(panel.swatches(), &[hex("#000000")]);
    }
}
