use egui::Context;

use crate::model::scene::{BALL_AMOUNT_RANGE, BLENDING_RANGE, FRACTAL_ITERATION_RANGE, SIZE_RANGE};
use crate::model::{SceneId, SceneSettings};

const BOUNCY_BALLS_HELP: [&str; 5] = [
    "WASD keys to move",
    "RIGHT CLICK to toggle mouse",
    "SPACE key to bounce balls",
    "E/Q keys to fly up/down",
    "1, 2, 3 keys to see other scenes",
];

const FRACTAL_HELP: [&str; 1] = ["You need some flying to see whole scene"];

/// Build the overlay for the active scene. Slider edits land in `settings`
/// and take effect on the next frame.
pub fn build_ui(
    egui_ctx: &Context,
    raw_input: egui::RawInput,
    scene: SceneId,
    settings: &mut SceneSettings,
    fps: f32,
) -> egui::FullOutput {
    egui_ctx.run(raw_input, |ctx| match scene {
        SceneId::BouncyBalls => draw_bouncy_balls_window(ctx, settings, fps),
        SceneId::Fractal => draw_fractal_window(ctx, settings, fps),
        SceneId::Test => {}
    })
}

fn draw_bouncy_balls_window(ctx: &Context, settings: &mut SceneSettings, fps: f32) {
    egui::Window::new(SceneId::BouncyBalls.label())
        .default_pos([8.0, 8.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.add(egui::Slider::new(&mut settings.ball_amount, BALL_AMOUNT_RANGE).text("Ball Amount"));
            ui.add(egui::Slider::new(&mut settings.visible_size, SIZE_RANGE).text("Visible Size"));
            ui.add(egui::Slider::new(&mut settings.collision_size, SIZE_RANGE).text("Collision Size"));
            ui.add(egui::Slider::new(&mut settings.blending, BLENDING_RANGE).text("Blending"));
            ui.separator();
            help_text(ui, &BOUNCY_BALLS_HELP);
            fps_label(ui, fps);
        });
}

fn draw_fractal_window(ctx: &Context, settings: &mut SceneSettings, fps: f32) {
    egui::Window::new(SceneId::Fractal.label())
        .default_pos([8.0, 8.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.add(egui::Slider::new(&mut settings.fractal_iteration, FRACTAL_ITERATION_RANGE).text("Iteration"));
            ui.separator();
            help_text(ui, &FRACTAL_HELP);
            fps_label(ui, fps);
        });
}

fn help_text(ui: &mut egui::Ui, lines: &[&str]) {
    for line in lines {
        ui.label(egui::RichText::new(format!("- {line}")).small());
    }
}

fn fps_label(ui: &mut egui::Ui, fps: f32) {
    ui.label(egui::RichText::new(format!("FPS: {fps:.0}")).small());
}
