// screen-translator/src/app_state.rs

// ============================================================================
// MÓDULO APP STATE - Estado compartilhado entre a UI e as threads de fundo
// ============================================================================
// - AppCommand: comandos das threads de fundo para a thread da UI
// - AppState: canal de comandos, cache de traduções e a tecla de captura
//
// A configuração em si fica só na thread da UI; as threads de fundo apenas
// pedem coisas por AppCommand.
// ============================================================================

use crossbeam_channel::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cache::TranslationCache;

// ============================================================================
// COMANDOS ENTRE THREADS
// ============================================================================

/// Comandos enviados para a thread da UI
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Inicia uma captura (mesmo efeito do botão)
    StartCapture,
    /// config.json foi alterado por fora, recarregar
    ReloadConfig,
}

// ============================================================================
// ESTADO COMPARTILHADO
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub command_sender: Sender<AppCommand>,
    /// Cache de traduções (vive a sessão inteira)
    pub translation_cache: TranslationCache,
    /// Nome da tecla de captura; a thread de hotkeys recria o
    /// HotkeyManager quando ele muda
    capture_hotkey: Arc<Mutex<String>>,
}

impl AppState {
    pub fn new(command_sender: Sender<AppCommand>, capture_hotkey: &str) -> Self {
        AppState {
            command_sender,
            translation_cache: TranslationCache::new(),
            capture_hotkey: Arc::new(Mutex::new(capture_hotkey.to_string())),
        }
    }

    fn hotkey(&self) -> MutexGuard<'_, String> {
        self.capture_hotkey
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capture_hotkey(&self) -> String {
        self.hotkey().clone()
    }

    /// Atualiza a tecla de captura. Retorna true se ela mudou.
    pub fn set_capture_hotkey(&self, key_name: &str) -> bool {
        let mut current = self.hotkey();
        if *current == key_name {
            return false;
        }

        *current = key_name.to_string();
        true
    }

    /// Envia um comando para a UI (erro só se a UI já foi encerrada)
    pub fn send(&self, command: AppCommand) -> bool {
        match self.command_sender.send(command) {
            Ok(()) => true,
            Err(e) => {
                error!("❌ Erro ao enviar comando: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn hotkey_change_is_reported_once() {
        let (tx, _rx) = unbounded();
        let state = AppState::new(tx, "F9");

        assert!(!state.set_capture_hotkey("F9"));
        assert!(state.set_capture_hotkey("F10"));
        assert!(!state.set_capture_hotkey("F10"));
        assert_eq!(state.capture_hotkey(), "F10");
    }

    #[test]
    fn clones_share_channel_and_cache() {
        let (tx, rx) = unbounded();
        let state = AppState::new(tx, "F9");
        let other = state.clone();

        assert!(other.send(AppCommand::StartCapture));
        assert_eq!(rx.try_recv(), Ok(AppCommand::StartCapture));

        other.translation_cache.set("ollama", "pt", "Hi", "Oi");
        assert_eq!(state.translation_cache.len(), 1);
    }

    #[test]
    fn send_fails_after_ui_closed() {
        let (tx, rx) = unbounded();
        let state = AppState::new(tx, "F9");
        drop(rx);

        assert!(!state.send(AppCommand::ReloadConfig));
    }
}
