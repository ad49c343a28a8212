// screen-translator/src/app.rs

// ============================================================================
// MÓDULO APP - Janela principal (roda na main thread)
// ============================================================================
// - botão de captura (desativado enquanto o pipeline está ocupado)
// - status colorido
// - painéis com o texto original e a tradução
// - seção de configurações
//
// Durante a seleção a janela encolhe para 1x1 pixel para não aparecer no
// screenshot, e volta ao tamanho anterior quando o seletor fecha.
// ============================================================================

use crossbeam_channel::{unbounded, Receiver, Sender};
use image::DynamicImage;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_state::{AppCommand, AppState};
use crate::config::{AppConfig, Config};
use crate::processing::{self, PipelineEvent, PipelineOutcome, PipelineState};
use crate::region_selector::RegionSelector;
use crate::settings_ui::SettingsPanel;

/// Tamanho inicial da janela
pub const WINDOW_SIZE: [f32; 2] = [520.0, 640.0];

/// Tempo para o gerenciador de janelas aplicar o encolhimento antes do
/// screenshot
const HIDE_DELAY: Duration = Duration::from_millis(200);

/// Posição e tamanho da janela antes de esconder
#[derive(Debug, Clone, Copy)]
struct SavedWindow {
    position: Option<egui::Pos2>,
    size: egui::Vec2,
}

pub struct TranslatorApp {
    config: Config,
    state: AppState,
    command_receiver: Receiver<AppCommand>,
    events_sender: Sender<PipelineEvent>,
    events_receiver: Receiver<PipelineEvent>,
    pipeline_state: PipelineState,
    status: String,
    original_text: String,
    translated_text: String,
    selector: RegionSelector,
    /// Quando abrir o seletor (a janela já terá encolhido)
    capture_at: Option<Instant>,
    saved_window: Option<SavedWindow>,
    settings: SettingsPanel,
}

impl TranslatorApp {
    pub fn new(config: Config, state: AppState, command_receiver: Receiver<AppCommand>) -> Self {
        let (events_sender, events_receiver) = unbounded();
        let settings = SettingsPanel::new(&config.app_config);
        let pipeline_state = PipelineState::Idle;

        TranslatorApp {
            config,
            state,
            command_receiver,
            events_sender,
            events_receiver,
            status: pipeline_state.status_message(),
            pipeline_state,
            original_text: String::new(),
            translated_text: String::new(),
            selector: RegionSelector::new(),
            capture_at: None,
            saved_window: None,
            settings,
        }
    }

    fn set_state(&mut self, state: PipelineState) {
        debug!("🔁 Estado: {:?} → {:?}", self.pipeline_state, state);
        self.status = state.status_message();
        self.pipeline_state = state;
    }

    fn fail(&mut self, reason: &str, details: String) {
        error!("❌ {}: {}", reason, details);
        self.original_text = details;
        self.translated_text.clear();
        self.set_state(PipelineState::Done(PipelineOutcome::Failed(reason.to_string())));
    }

    // ========================================================================
    // CAPTURA
    // ========================================================================

    /// Botão ou hotkey: esconde a janela e agenda o seletor
    fn request_capture(&mut self, ctx: &egui::Context) {
        if self.pipeline_state.is_busy() {
            info!("⏳ Captura ignorada: processamento em andamento");
            return;
        }

        info!("");
        info!("📷 ============================================");
        info!("📷 NOVA CAPTURA");
        info!("📷 ============================================");

        self.set_state(PipelineState::AwaitingSelection);
        self.hide_window(ctx);
        self.capture_at = Some(Instant::now() + HIDE_DELAY);
        ctx.request_repaint_after(HIDE_DELAY);
    }

    fn hide_window(&mut self, ctx: &egui::Context) {
        let (outer, inner) = ctx.input(|i| (i.viewport().outer_rect, i.viewport().inner_rect));

        self.saved_window = Some(SavedWindow {
            position: outer.map(|r| r.min),
            size: inner
                .map(|r| r.size())
                .unwrap_or_else(|| egui::vec2(WINDOW_SIZE[0], WINDOW_SIZE[1])),
        });

        ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(egui::vec2(1.0, 1.0)));
    }

    fn restore_window(&mut self, ctx: &egui::Context) {
        let Some(saved) = self.saved_window.take() else {
            return;
        };

        ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(saved.size));
        if let Some(position) = saved.position {
            ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(position));
        }
        ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
    }

    fn open_selector_when_due(&mut self, ctx: &egui::Context) {
        let Some(deadline) = self.capture_at else {
            return;
        };

        let now = Instant::now();
        if now < deadline {
            ctx.request_repaint_after(deadline - now);
            return;
        }
        self.capture_at = None;

        if let Err(e) = self.selector.start_capture() {
            self.restore_window(ctx);
            self.fail("Falha na captura de tela", format!("{:#}", e));
        }
    }

    /// Seletor fechou: inicia o worker ou volta para Idle
    fn finish_selection(&mut self, ctx: &egui::Context) {
        self.restore_window(ctx);

        let bitmap = self.selector.take_selected_bitmap();
        let cache = self.state.translation_cache.clone();
        let events = self.events_sender.clone();
        let ctx = ctx.clone();

        self.start_pipeline(bitmap, move |bitmap, config| {
            processing::spawn_worker(bitmap, config, cache, events, ctx).map(|_| ())
        });
    }

    /// Sem recorte = captura cancelada; com recorte, `spawn` dispara o worker
    fn start_pipeline<F>(&mut self, bitmap: Option<DynamicImage>, spawn: F)
    where
        F: FnOnce(DynamicImage, Arc<AppConfig>) -> anyhow::Result<()>,
    {
        let Some(bitmap) = bitmap else {
            self.pipeline_state = PipelineState::Idle;
            self.status = "Captura cancelada".to_string();
            return;
        };

        match spawn(bitmap, self.config.snapshot()) {
            Ok(()) => self.set_state(PipelineState::Extracting),
            Err(e) => self.fail("Falha ao iniciar processamento", format!("{:#}", e)),
        }
    }

    // ========================================================================
    // MENSAGENS DAS OUTRAS THREADS
    // ========================================================================

    fn handle_commands(&mut self, ctx: &egui::Context) {
        while let Ok(command) = self.command_receiver.try_recv() {
            match command {
                AppCommand::StartCapture => self.request_capture(ctx),
                AppCommand::ReloadConfig => {
                    let previous = self.config.app_config.clone();
                    match self.config.reload() {
                        Ok(()) => {
                            self.settings.sync_from(&self.config.app_config);
                            self.apply_config_change(&previous);
                            info!("✅ Configurações recarregadas!");
                        }
                        Err(e) => {
                            warn!("⚠️  Erro ao recarregar config: {:#}", e);
                            warn!("   Mantendo as configurações atuais");
                        }
                    }
                }
            }
        }
    }

    fn handle_pipeline_events(&mut self) {
        while let Ok(event) = self.events_receiver.try_recv() {
            match event {
                PipelineEvent::StateChanged(state) => self.set_state(state),
                PipelineEvent::Finished(report) => {
                    self.original_text = report.original;
                    self.translated_text = report.translated;
                    self.set_state(PipelineState::Done(report.outcome));
                }
            }
        }
    }

    fn apply_config_change(&mut self, previous: &AppConfig) {
        let current = &self.config.app_config;

        if self.state.set_capture_hotkey(&current.capture_hotkey) {
            info!("⌨️  Nova tecla de captura: {}", current.capture_hotkey);
        }

        if translation_settings_changed(previous, current) {
            self.state.translation_cache.clear();
        }
    }

    // ========================================================================
    // RENDERIZAÇÃO
    // ========================================================================

    fn render_main(&mut self, ctx: &egui::Context) {
        let alpha = background_alpha(self.config.app_config.window_opacity);
        let font_size = self.config.app_config.result_font_size as f32;

        egui::CentralPanel::default()
            .frame(
                egui::Frame::central_panel(&ctx.style())
                    .fill(egui::Color32::from_rgba_unmultiplied(27, 27, 27, alpha)),
            )
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.horizontal(|ui| {
                        let capture = ui.add_enabled(
                            !self.pipeline_state.is_busy(),
                            egui::Button::new("📷 Capturar região"),
                        );
                        if capture.clicked() {
                            self.request_capture(ctx);
                        }

                        ui.label(
                            egui::RichText::new(format!("({})", self.config.app_config.capture_hotkey))
                                .color(egui::Color32::GRAY),
                        );
                    });

                    ui.add_space(5.0);
                    ui.colored_label(status_color(&self.pipeline_state), &self.status);
                    ui.add_space(10.0);

                    ui.label("Texto original:");
                    ui.add(
                        egui::TextEdit::multiline(&mut self.original_text.as_str())
                            .desired_rows(4)
                            .desired_width(f32::INFINITY),
                    );

                    ui.add_space(8.0);

                    ui.label("Tradução:");
                    ui.add(
                        egui::TextEdit::multiline(&mut self.translated_text.as_str())
                            .font(egui::FontId::proportional(font_size))
                            .desired_rows(6)
                            .desired_width(f32::INFINITY),
                    );

                    ui.add_space(5.0);

                    ui.horizontal(|ui| {
                        let has_translation = !self.translated_text.is_empty();
                        if ui
                            .add_enabled(has_translation, egui::Button::new("📋 Copiar tradução"))
                            .clicked()
                        {
                            let text = self.translated_text.clone();
                            ctx.output_mut(|o| o.copied_text = text);
                            self.status = "Tradução copiada!".to_string();
                        }

                        if ui.button("🗑 Limpar").clicked() {
                            self.original_text.clear();
                            self.translated_text.clear();
                            if !self.pipeline_state.is_busy() {
                                self.set_state(PipelineState::Idle);
                            }
                        }
                    });

                    ui.add_space(15.0);

                    egui::CollapsingHeader::new("⚙ Configurações")
                        .default_open(false)
                        .show(ui, |ui| {
                            let previous = self.config.app_config.clone();
                            if self.settings.show(ui, &mut self.config) {
                                self.apply_config_change(&previous);
                            }
                        });
                });
            });
    }
}

impl eframe::App for TranslatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_commands(ctx);
        self.handle_pipeline_events();
        self.open_selector_when_due(ctx);

        if self.selector.is_visible() {
            self.selector.show(ctx);

            if !self.selector.is_visible() {
                self.finish_selection(ctx);
            }
        }

        self.render_main(ctx);
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        // Fundo transparente; a opacidade vem do painel central
        [0.0, 0.0, 0.0, 0.0]
    }
}

/// Alpha do fundo a partir da opacidade configurada (limitada a 0.3 - 1.0)
pub fn background_alpha(opacity: f32) -> u8 {
    let opacity = if opacity.is_finite() { opacity } else { 1.0 };
    (opacity.clamp(0.3, 1.0) * 255.0).round() as u8
}

pub fn status_color(state: &PipelineState) -> egui::Color32 {
    match state {
        PipelineState::Idle => egui::Color32::GRAY,
        PipelineState::Done(PipelineOutcome::Succeeded) => egui::Color32::from_rgb(80, 200, 120),
        PipelineState::Done(PipelineOutcome::Failed(_)) => egui::Color32::from_rgb(230, 80, 80),
        _ => egui::Color32::from_rgb(230, 190, 60),
    }
}

/// Mudou algo que afeta o resultado de uma tradução já em cache?
fn translation_settings_changed(previous: &AppConfig, current: &AppConfig) -> bool {
    previous.translation_backend != current.translation_backend
        || previous.ollama_url != current.ollama_url
        || previous.ollama_model != current.ollama_model
        || previous.google_api_key != current.google_api_key
}
