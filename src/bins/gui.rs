use dotenv::dotenv;
use eframe::{egui, Frame};
use egui::{CentralPanel, Color32, ColorImage, Context, TextureHandle};
use image::imageops::{self, FilterType};
use log::{error, info};
use opencv::core::Mat;
use rfd::FileDialog;
use stature::{
    utils::{annotate, rgba_from_mat},
    ExtentPair, ImageRole, MeasurementSession, PreprocessConfig,
};

/// Preview canvas size
const PREVIEW_WIDTH: u32 = 300;
const PREVIEW_HEIGHT: u32 = 400;

enum Status {
    Info(String),
    Result(String),
    Error(String),
}

struct HeightApp {
    session: MeasurementSession,
    reference_height: f64,
    reference_texture: Option<TextureHandle>,
    subject_texture: Option<TextureHandle>,
    status: Status,
}

impl HeightApp {
    fn new(config: PreprocessConfig) -> Self {
        Self {
            session: MeasurementSession::new(config),
            reference_height: 0.0,
            reference_texture: None,
            subject_texture: None,
            status: Status::Info("Load both images and enter the reference height".to_string()),
        }
    }

    fn load(&mut self, ctx: &Context, role: ImageRole) {
        let Some(path) = FileDialog::new()
            .add_filter("image", &["jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp"])
            .pick_file()
        else {
            return;
        };

        let loaded = match role {
            ImageRole::Reference => self.session.load_reference(&path),
            ImageRole::Subject => self.session.load_subject(&path),
        };
        let texture = loaded.and_then(|image| preview_texture(ctx, role, image));

        match texture {
            Ok(texture) => {
                match role {
                    ImageRole::Reference => self.reference_texture = Some(texture),
                    ImageRole::Subject => self.subject_texture = Some(texture),
                }
                self.status = Status::Info(format!("Loaded {} image {}", role, path.display()));
            }
            Err(e) => {
                error!("failed to load {}: {}", path.display(), e);
                self.status = Status::Error(e.to_string());
            }
        }
    }

    fn calculate(&mut self, ctx: &Context) {
        self.session.set_reference_height(self.reference_height);

        let result = match self.session.measure() {
            Ok(result) => result,
            Err(e) => {
                error!("estimation failed: {}", e);
                self.status = Status::Error(e.to_string());
                return;
            }
        };
        info!("estimated height {}", result);

        let marked = [
            (ImageRole::Reference, self.session.reference_image(), result.reference),
            (ImageRole::Subject, self.session.subject_image(), result.subject),
        ]
        .into_iter()
        .filter_map(|(role, image, extents)| image.map(|image| (role, image, extents)))
        .map(|(role, image, extents)| marked_texture(ctx, role, image, &extents).map(|t| (role, t)))
        .collect::<stature::Result<Vec<_>>>();

        match marked {
            Ok(textures) => {
                for (role, texture) in textures {
                    match role {
                        ImageRole::Reference => self.reference_texture = Some(texture),
                        ImageRole::Subject => self.subject_texture = Some(texture),
                    }
                }
                self.status = Status::Result(format!("Estimated height: {result} cm"));
            }
            Err(e) => self.status = Status::Error(e.to_string()),
        }
    }
}

impl eframe::App for HeightApp {
    fn update(&mut self, ctx: &Context, _frame: &mut Frame) {
        CentralPanel::default().show(ctx, |ui| {
            ui.heading("Height Calculator");

            ui.horizontal(|ui| {
                if ui.button("Load Reference Image").clicked() {
                    self.load(ctx, ImageRole::Reference);
                }
                if ui.button("Load Person Image").clicked() {
                    self.load(ctx, ImageRole::Subject);
                }
            });

            ui.horizontal(|ui| {
                ui.label("Reference Height (cm):");
                ui.add(
                    egui::DragValue::new(&mut self.reference_height)
                        .speed(0.5)
                        .range(0.0..=10_000.0),
                );
            });

            if ui.button("Calculate Height").clicked() {
                self.calculate(ctx);
            }

            match &self.status {
                Status::Info(text) => ui.label(text),
                Status::Result(text) => ui.colored_label(Color32::GREEN, text),
                Status::Error(text) => ui.colored_label(Color32::RED, text),
            };

            ui.separator();
            ui.horizontal(|ui| {
                for texture in [&self.reference_texture, &self.subject_texture] {
                    match texture {
                        Some(texture) => {
                            ui.image((texture.id(), texture.size_vec2()));
                        }
                        None => {
                            ui.allocate_space(egui::vec2(
                                PREVIEW_WIDTH as f32,
                                PREVIEW_HEIGHT as f32,
                            ));
                        }
                    }
                }
            });
        });
    }
}

fn marked_texture(
    ctx: &Context,
    role: ImageRole,
    image: &Mat,
    extents: &ExtentPair,
) -> stature::Result<TextureHandle> {
    let marked = annotate(image, extents)?;
    preview_texture(ctx, role, &marked)
}

/// Resizes to the preview canvas and uploads as a texture.
fn preview_texture(ctx: &Context, role: ImageRole, image: &Mat) -> stature::Result<TextureHandle> {
    let rgba = rgba_from_mat(image)?;
    let resized = imageops::resize(&rgba, PREVIEW_WIDTH, PREVIEW_HEIGHT, FilterType::Lanczos3);

    let im = ColorImage::from_rgba_unmultiplied(
        [resized.width() as usize, resized.height() as usize],
        resized.as_raw(),
    );
    Ok(ctx.load_texture(format!("{role}_preview"), im, Default::default()))
}

fn main() -> Result<(), eframe::Error> {
    dotenv().ok();
    env_logger::init();

    let config = match PreprocessConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}, falling back to defaults");
            PreprocessConfig::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Height Calculator",
        options,
        Box::new(|_cc| Ok(Box::new(HeightApp::new(config)))),
    )
}
