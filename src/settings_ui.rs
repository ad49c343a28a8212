// screen-translator/src/settings_ui.rs

// ============================================================================
// MÓDULO SETTINGS UI - Seção de configurações da janela principal
// ============================================================================
// Edita uma cópia (rascunho) do AppConfig. Nada vai para o disco até o
// usuário clicar em "Salvar" ou "Restaurar padrões".
//
// Listar modelos e testar a conexão com o Ollama rodam numa thread de fundo;
// o resultado volta por um canal e é aplicado no próximo frame.
// ============================================================================

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::{AppConfig, Config, OcrBackend, TranslationBackend};
use crate::hotkey;
use crate::ocr::{self, OCR_LANGUAGES};
use crate::translator::{self, TranslationError};

/// Idiomas de destino oferecidos na lista
pub const TARGET_LANGUAGES: &[&str] = &[
    "en", "vi", "ja", "ko", "zh", "es", "fr", "de", "ru", "pt", "it", "th",
];

const STATUS_DURATION: Duration = Duration::from_secs(3);

/// Resultado de uma verificação feita em background
#[derive(Debug)]
pub enum CheckResult {
    Models(Result<Vec<String>, TranslationError>),
    Connection(Result<Vec<String>, TranslationError>),
}

pub struct SettingsPanel {
    draft: AppConfig,
    status: Option<(String, Instant)>,
    /// Modelos instalados no Ollama (última consulta)
    models: Vec<String>,
    check_running: bool,
    check_sender: Sender<CheckResult>,
    check_receiver: Receiver<CheckResult>,
    tesseract_available: bool,
    windows_ocr_available: bool,
}

impl SettingsPanel {
    pub fn new(config: &AppConfig) -> Self {
        let (check_sender, check_receiver) = unbounded();

        SettingsPanel {
            draft: config.clone(),
            status: None,
            models: Vec::new(),
            check_running: false,
            check_sender,
            check_receiver,
            tesseract_available: ocr::tesseract::is_available(),
            windows_ocr_available: ocr::windows_ocr::is_available(),
        }
    }

    /// Descarta o rascunho e volta a refletir o arquivo
    pub fn sync_from(&mut self, config: &AppConfig) {
        self.draft = config.clone();
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now()));
    }

    /// Grava o rascunho. Retorna true se o config mudou.
    pub fn save_draft(&mut self, config: &mut Config) -> bool {
        let draft = self.draft.clone();
        match config.update(|cfg| *cfg = draft) {
            Ok(()) => {
                info!("💾 Configurações salvas!");
                self.set_status("Salvo!");
                true
            }
            Err(e) => {
                error!("❌ Erro ao salvar: {:#}", e);
                self.set_status(format!("Erro: {:#}", e));
                false
            }
        }
    }

    /// Restaura os padrões (no arquivo e no rascunho)
    pub fn restore_defaults(&mut self, config: &mut Config) -> bool {
        let result = config.reset_to_defaults();
        self.draft = config.app_config.clone();

        match result {
            Ok(()) => {
                self.set_status("Padrões restaurados!");
                true
            }
            Err(e) => {
                error!("❌ Erro ao restaurar padrões: {:#}", e);
                self.set_status(format!("Erro: {:#}", e));
                false
            }
        }
    }

    // ========================================================================
    // VERIFICAÇÕES EM BACKGROUND
    // ========================================================================

    fn spawn_check(&mut self, ctx: &egui::Context, test_model: bool) {
        if self.check_running {
            return;
        }
        self.check_running = true;
        self.set_status(if test_model {
            "Testando conexão..."
        } else {
            "Buscando modelos..."
        });

        let url = self.draft.ollama_url.clone();
        let model = self.draft.ollama_model.clone();
        let sender = self.check_sender.clone();
        let ctx = ctx.clone();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    let error = TranslationError::Request(e.to_string());
                    let result = if test_model {
                        CheckResult::Connection(Err(error))
                    } else {
                        CheckResult::Models(Err(error))
                    };
                    let _ = sender.send(result);
                    ctx.request_repaint();
                    return;
                }
            };

            let result = if test_model {
                CheckResult::Connection(runtime.block_on(translator::test_connection(&url, &model)))
            } else {
                CheckResult::Models(runtime.block_on(translator::list_models(&url)))
            };

            let _ = sender.send(result);
            ctx.request_repaint();
        });
    }

    /// Aplica o resultado de uma verificação (chamado na thread da UI)
    pub fn apply_check(&mut self, result: CheckResult) {
        self.check_running = false;

        match result {
            CheckResult::Models(Ok(models)) => {
                self.set_status(format!("{} modelo(s) encontrado(s)", models.len()));
                self.models = models;
            }
            CheckResult::Connection(Ok(models)) => {
                self.set_status(format!("✓ Conectado! Modelo '{}' pronto", self.draft.ollama_model));
                self.models = models;
            }
            CheckResult::Models(Err(e)) | CheckResult::Connection(Err(e)) => {
                warn!("⚠️  Verificação do Ollama falhou: {}", e);
                if let TranslationError::ModelNotFound {
                    available: Some(models),
                    ..
                } = &e
                {
                    self.models = models.clone();
                }
                self.set_status(format!("✗ {}", e));
            }
        }
    }

    // ========================================================================
    // RENDERIZAÇÃO
    // ========================================================================

    /// Desenha a seção. Retorna true quando o config foi alterado no disco.
    pub fn show(&mut self, ui: &mut egui::Ui, config: &mut Config) -> bool {
        while let Ok(result) = self.check_receiver.try_recv() {
            self.apply_check(result);
        }

        self.render_ocr_group(ui);
        ui.add_space(10.0);
        self.render_translation_group(ui);
        ui.add_space(10.0);
        self.render_window_group(ui);
        ui.add_space(10.0);

        let mut changed = false;

        ui.horizontal(|ui| {
            if ui.button("Salvar").clicked() {
                changed |= self.save_draft(config);
            }

            if ui.button("Restaurar padrões").clicked() {
                changed |= self.restore_defaults(config);
            }

            if let Some((message, time)) = &self.status {
                if time.elapsed() < STATUS_DURATION || self.check_running {
                    ui.label(message);
                }
            }
        });

        changed
    }

    fn render_ocr_group(&mut self, ui: &mut egui::Ui) {
        full_width_group(ui, |ui| {
            ui.label("OCR:");
            ui.add_space(5.0);

            egui::Grid::new("settings_ocr_grid")
                .num_columns(2)
                .spacing([10.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Motor:");
                    egui::ComboBox::from_id_source("ocr_backend")
                        .selected_text(self.draft.ocr_backend.label())
                        .show_ui(ui, |ui| {
                            for backend in [OcrBackend::Tesseract, OcrBackend::Windows] {
                                ui.selectable_value(
                                    &mut self.draft.ocr_backend,
                                    backend,
                                    backend.label(),
                                );
                            }
                        });
                    ui.end_row();

                    ui.label("Idioma do texto:");
                    let selected = ocr::find_language(&self.draft.ocr_language)
                        .map(|lang| lang.name)
                        .unwrap_or("Automático");
                    egui::ComboBox::from_id_source("ocr_language")
                        .selected_text(selected)
                        .show_ui(ui, |ui| {
                            ui.selectable_value(
                                &mut self.draft.ocr_language,
                                "auto".to_string(),
                                "Automático",
                            );
                            for lang in OCR_LANGUAGES {
                                ui.selectable_value(
                                    &mut self.draft.ocr_language,
                                    lang.code.to_string(),
                                    lang.name,
                                );
                            }
                        });
                    ui.end_row();
                });

            ui.add_space(3.0);
            let available = match self.draft.ocr_backend {
                OcrBackend::Tesseract => self.tesseract_available,
                OcrBackend::Windows => self.windows_ocr_available,
            };
            if available {
                ui.label("Disponível");
            } else {
                ui.colored_label(egui::Color32::from_rgb(230, 160, 60), "Não encontrado neste sistema");
            }
        });
    }

    fn render_translation_group(&mut self, ui: &mut egui::Ui) {
        full_width_group(ui, |ui| {
            ui.label("Tradução:");
            ui.add_space(5.0);

            egui::Grid::new("settings_translation_grid")
                .num_columns(2)
                .spacing([10.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Serviço:");
                    egui::ComboBox::from_id_source("translation_backend")
                        .selected_text(self.draft.translation_backend.label())
                        .show_ui(ui, |ui| {
                            for backend in [TranslationBackend::Ollama, TranslationBackend::Google] {
                                ui.selectable_value(
                                    &mut self.draft.translation_backend,
                                    backend,
                                    backend.label(),
                                );
                            }
                        });
                    ui.end_row();

                    ui.label("Idioma destino:");
                    egui::ComboBox::from_id_source("target_language")
                        .selected_text(translator::language_name(&self.draft.target_language))
                        .show_ui(ui, |ui| {
                            for code in TARGET_LANGUAGES {
                                ui.selectable_value(
                                    &mut self.draft.target_language,
                                    code.to_string(),
                                    translator::language_name(code),
                                );
                            }
                        });
                    ui.end_row();
                });

            ui.add_space(8.0);

            match self.draft.translation_backend {
                TranslationBackend::Ollama => self.render_ollama_fields(ui),
                TranslationBackend::Google => {
                    egui::Grid::new("settings_google_grid")
                        .num_columns(2)
                        .spacing([10.0, 6.0])
                        .show(ui, |ui| {
                            ui.label("API Key:");
                            ui.add(
                                egui::TextEdit::singleline(&mut self.draft.google_api_key)
                                    .password(true)
                                    .desired_width(300.0),
                            );
                            ui.end_row();
                        });

                    ui.add_space(3.0);
                    if self.draft.google_api_key.is_empty() {
                        ui.label("Sem API key: usa o endpoint público (ou GOOGLE_API_KEY do .env)");
                    } else {
                        ui.label("Configurado");
                    }
                }
            }
        });
    }

    fn render_ollama_fields(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("settings_ollama_grid")
            .num_columns(2)
            .spacing([10.0, 6.0])
            .show(ui, |ui| {
                ui.label("URL:");
                ui.add(egui::TextEdit::singleline(&mut self.draft.ollama_url).desired_width(300.0));
                ui.end_row();

                ui.label("Modelo:");
                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut self.draft.ollama_model).desired_width(180.0),
                    );
                    if !self.models.is_empty() {
                        egui::ComboBox::from_id_source("ollama_models")
                            .selected_text("Instalados")
                            .show_ui(ui, |ui| {
                                for model in &self.models {
                                    ui.selectable_value(
                                        &mut self.draft.ollama_model,
                                        model.clone(),
                                        model,
                                    );
                                }
                            });
                    }
                });
                ui.end_row();
            });

        ui.add_space(5.0);

        let ctx = ui.ctx().clone();
        ui.horizontal(|ui| {
            ui.add_enabled_ui(!self.check_running, |ui| {
                if ui.button("🔄 Atualizar modelos").clicked() {
                    self.spawn_check(&ctx, false);
                }
                if ui.button("🔌 Testar conexão").clicked() {
                    self.spawn_check(&ctx, true);
                }
            });
            if self.check_running {
                ui.spinner();
            }
        });
    }

    fn render_window_group(&mut self, ui: &mut egui::Ui) {
        full_width_group(ui, |ui| {
            ui.label("Janela e atalho:");
            ui.add_space(5.0);

            egui::Grid::new("settings_window_grid")
                .num_columns(2)
                .spacing([10.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Opacidade:");
                    ui.add(egui::Slider::new(&mut self.draft.window_opacity, 0.3..=1.0));
                    ui.end_row();

                    ui.label("Fonte da tradução:");
                    ui.add(egui::Slider::new(&mut self.draft.result_font_size, 10..=40).suffix("px"));
                    ui.end_row();

                    ui.label("Tecla de captura:");
                    egui::ComboBox::from_id_source("capture_hotkey")
                        .selected_text(&self.draft.capture_hotkey)
                        .show_ui(ui, |ui| {
                            for (name, _) in hotkey::SUPPORTED_KEYS {
                                ui.selectable_value(
                                    &mut self.draft.capture_hotkey,
                                    name.to_string(),
                                    *name,
                                );
                            }
                        });
                    ui.end_row();
                });
        });
    }
}

/// Grupo (caixa com borda) que ocupa a largura toda
fn full_width_group(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
    let available_width = ui.available_width();

    // .max(0.0) evita panic quando a janela ainda não redimensionou
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_min_width((available_width - 12.0).max(0.0));
        add_contents(ui);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn temp_config(dir: &TempDir) -> Config {
        Config::load_from(dir.path().join("config.json"))
    }

    fn panel(config: &AppConfig) -> SettingsPanel {
        let (check_sender, check_receiver) = unbounded();
        SettingsPanel {
            draft: config.clone(),
            status: None,
            models: Vec::new(),
            check_running: true,
            check_sender,
            check_receiver,
            tesseract_available: true,
            windows_ocr_available: false,
        }
    }

    #[test]
    fn target_languages_all_have_names() {
        for code in TARGET_LANGUAGES {
            assert_ne!(translator::language_name(code), *code, "sem nome para {}", code);
        }
    }

    #[test]
    fn save_writes_draft_to_disk() {
        let dir = TempDir::new().unwrap();
        let mut config = temp_config(&dir);
        let mut panel = panel(&config.app_config);

        panel.draft.target_language = "ja".to_string();
        panel.draft.capture_hotkey = "F10".to_string();
        assert!(panel.save_draft(&mut config));

        let reloaded = Config::load_from(PathBuf::from(config.path()));
        assert_eq!(reloaded.app_config.target_language, "ja");
        assert_eq!(reloaded.app_config.capture_hotkey, "F10");
    }

    #[test]
    fn restore_defaults_resets_draft() {
        let dir = TempDir::new().unwrap();
        let mut config = temp_config(&dir);
        let mut panel = panel(&config.app_config);

        panel.draft.window_opacity = 0.4;
        panel.save_draft(&mut config);
        assert!(panel.restore_defaults(&mut config));

        assert_eq!(panel.draft, AppConfig::default());
        assert_eq!(config.app_config, AppConfig::default());
    }

    #[test]
    fn model_list_result_fills_picker() {
        let mut panel = panel(&AppConfig::default());

        panel.apply_check(CheckResult::Models(Ok(vec![
            "llama3:latest".to_string(),
            "qwen2".to_string(),
        ])));

        assert!(!panel.check_running);
        assert_eq!(panel.models.len(), 2);
    }

    #[test]
    fn missing_model_still_shows_installed_ones() {
        let mut panel = panel(&AppConfig::default());

        panel.apply_check(CheckResult::Connection(Err(TranslationError::ModelNotFound {
            model: "llama3".to_string(),
            available: Some(vec!["qwen2".to_string()]),
        })));

        assert_eq!(panel.models, vec!["qwen2".to_string()]);
        let (message, _) = panel.status.clone().unwrap();
        assert!(message.starts_with('✗'));
        assert!(message.contains("llama3"));
    }
}
