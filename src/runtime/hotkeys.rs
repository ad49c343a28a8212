// screen-translator/src/runtime/hotkeys.rs

// ============================================================================
// THREAD DE HOTKEYS (roda em background)
// ============================================================================

use crate::app_state::{AppCommand, AppState};
use crate::hotkey::HotkeyManager;
use std::thread;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn start_hotkey_thread(state: AppState, ctx: egui::Context) {
    thread::spawn(move || {
        info!("⌨️  Thread de hotkeys iniciada");

        let mut key_name = state.capture_hotkey();
        let mut hotkey_manager = HotkeyManager::new(&key_name);

        loop {
            // Tecla alterada nas configurações
            let configured = state.capture_hotkey();
            if configured != key_name {
                key_name = configured;
                hotkey_manager = HotkeyManager::new(&key_name);
                info!("⌨️  Hotkey recarregada!");
            }

            if hotkey_manager.poll() {
                info!("");
                info!("🎯 ============================================");
                info!("🎯 HOTKEY {:?} - SOLICITANDO CAPTURA", hotkey_manager.key());
                info!("🎯 ============================================");

                if !state.send(AppCommand::StartCapture) {
                    break;
                }

                // A UI pode estar dormindo (janela sem foco)
                ctx.request_repaint();
            }

            thread::sleep(POLL_INTERVAL);
        }

        info!("⌨️  Thread de hotkeys encerrada");
    });
}
