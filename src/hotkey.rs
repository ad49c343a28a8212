// screen-translator/src/hotkey.rs

// ============================================================================
// MÓDULO HOTKEY - Tecla global de captura usando device_query
// ============================================================================
//
// device_query lê o estado do teclado do sistema, então a tecla funciona
// mesmo com outra janela (ex: o jogo) em foco.
//
// ============================================================================

use device_query::{DeviceQuery, DeviceState, Keycode};

/// Tecla usada quando o nome configurado não é reconhecido
pub const DEFAULT_CAPTURE_KEY: Keycode = Keycode::F9;

/// Nomes aceitos no config.json (campo "capture_hotkey")
pub const SUPPORTED_KEYS: &[(&str, Keycode)] = &[
    ("F1", Keycode::F1),
    ("F2", Keycode::F2),
    ("F3", Keycode::F3),
    ("F4", Keycode::F4),
    ("F5", Keycode::F5),
    ("F6", Keycode::F6),
    ("F7", Keycode::F7),
    ("F8", Keycode::F8),
    ("F9", Keycode::F9),
    ("F10", Keycode::F10),
    ("F11", Keycode::F11),
    ("F12", Keycode::F12),
    ("Numpad0", Keycode::Numpad0),
    ("Numpad1", Keycode::Numpad1),
    ("Numpad2", Keycode::Numpad2),
    ("Numpad3", Keycode::Numpad3),
    ("Numpad4", Keycode::Numpad4),
    ("Numpad5", Keycode::Numpad5),
    ("Numpad6", Keycode::Numpad6),
    ("Numpad7", Keycode::Numpad7),
    ("Numpad8", Keycode::Numpad8),
    ("Numpad9", Keycode::Numpad9),
    ("NumpadAdd", Keycode::NumpadAdd),
    ("NumpadSubtract", Keycode::NumpadSubtract),
    ("NumpadMultiply", Keycode::NumpadMultiply),
    ("NumpadDivide", Keycode::NumpadDivide),
    ("Insert", Keycode::Insert),
    ("Home", Keycode::Home),
    ("End", Keycode::End),
    ("PageUp", Keycode::PageUp),
    ("PageDown", Keycode::PageDown),
];

/// Converte o nome da tecla (sem diferenciar maiúsculas) para Keycode
pub fn parse_key(name: &str) -> Option<Keycode> {
    let name = name.trim();
    SUPPORTED_KEYS
        .iter()
        .find(|(key_name, _)| key_name.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
}

/// Detecta a tecla de captura (dispara uma vez por pressionamento)
pub struct HotkeyManager {
    device_state: DeviceState,
    key: Keycode,
    was_pressed: bool,
}

impl HotkeyManager {
    /// Cria um novo gerenciador para a tecla configurada
    pub fn new(key_name: &str) -> Self {
        let key = parse_key(key_name).unwrap_or_else(|| {
            warn!(
                "⚠️  Tecla '{}' não reconhecida, usando {:?}",
                key_name, DEFAULT_CAPTURE_KEY
            );
            DEFAULT_CAPTURE_KEY
        });

        info!("⌨️  Tecla de captura: {:?}", key);

        HotkeyManager {
            device_state: DeviceState::new(),
            key,
            was_pressed: false,
        }
    }

    pub fn key(&self) -> Keycode {
        self.key
    }

    /// true só no instante em que a tecla é pressionada (segurar não repete)
    pub fn poll(&mut self) -> bool {
        let pressed = self.device_state.get_keys().contains(&self.key);
        rising_edge(&mut self.was_pressed, pressed)
    }
}

fn rising_edge(was_pressed: &mut bool, pressed: bool) -> bool {
    let triggered = pressed && !*was_pressed;
    *was_pressed = pressed;
    triggered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_names_ignoring_case() {
        assert_eq!(parse_key("F9"), Some(Keycode::F9));
        assert_eq!(parse_key(" numpadadd "), Some(Keycode::NumpadAdd));
        assert_eq!(parse_key("pageup"), Some(Keycode::PageUp));
        assert_eq!(parse_key("Ctrl+Shift+X"), None);
    }

    #[test]
    fn holding_the_key_triggers_once() {
        let mut was_pressed = false;
        let samples = [false, true, true, true, false, true];
        let triggers: Vec<bool> = samples
            .iter()
            .map(|&pressed| rising_edge(&mut was_pressed, pressed))
            .collect();

        assert_eq!(triggers, vec![false, true, false, false, false, true]);
    }
}
