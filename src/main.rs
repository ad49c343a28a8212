// screen-translator/src/main.rs

// ============================================================================
// SCREEN TRANSLATOR - Seleciona uma área da tela, extrai o texto e traduz
// ============================================================================

#[macro_use]
extern crate log;

// ============================================================================
// DECLARAÇÃO DE MÓDULOS
// ============================================================================
mod app;
mod app_state;
mod cache;
mod config;
mod fonts;
mod hotkey;
mod ocr;
mod processing;
mod region_selector;
mod runtime;
mod screenshot;
mod settings_ui;
mod translator;

// ============================================================================
// IMPORTS
// ============================================================================
use anyhow::{anyhow, Result};
use app::{TranslatorApp, WINDOW_SIZE};
use app_state::{AppCommand, AppState};
use config::Config;
use crossbeam_channel::unbounded;

// ============================================================================
// FUNÇÃO PRINCIPAL
// ============================================================================
fn main() -> Result<()> {
    // .env opcional (GOOGLE_API_KEY)
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("🌐 ============================================");
    info!("🌐 SCREEN TRANSLATOR - OCR + Tradução");
    info!("🌐 ============================================");
    info!("");

    info!("⚙️  Configurando sistema...");

    let config = Config::load();

    // Canal de comandos (hotkeys / watcher → UI)
    let (command_sender, command_receiver) = unbounded::<AppCommand>();

    let state = AppState::new(command_sender, &config.app_config.capture_hotkey);
    let config_path = config.path().to_path_buf();

    info!("✅ Sistema pronto!");
    info!("");
    info!(
        "🎯 Pressione {} ou clique em \"Capturar região\" para traduzir",
        config.app_config.capture_hotkey
    );
    info!("");

    // ========================================================================
    // JANELA PRINCIPAL NA MAIN THREAD
    // ========================================================================
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Screen Translator")
            .with_inner_size(WINDOW_SIZE)
            .with_min_inner_size([360.0, 400.0])
            .with_always_on_top()
            .with_transparent(true),

        ..Default::default()
    };

    eframe::run_native(
        "Screen Translator",
        options,
        Box::new(move |cc| {
            fonts::install_fallback_fonts(&cc.egui_ctx);

            // Threads de fundo só acordam a UI, nunca mexem no config
            runtime::hotkeys::start_hotkey_thread(state.clone(), cc.egui_ctx.clone());
            runtime::config_watcher::start_config_watcher(
                config_path,
                state.clone(),
                cc.egui_ctx.clone(),
            );

            Ok(Box::new(TranslatorApp::new(config, state, command_receiver)) as Box<dyn eframe::App>)
        }),
    )
    .map_err(|e| anyhow!("Falha ao abrir a janela: {}", e))?;

    info!("👋 Encerrando");
    Ok(())
}
