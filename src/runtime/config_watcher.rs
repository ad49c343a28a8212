// screen-translator/src/runtime/config_watcher.rs

// ============================================================================
// THREAD DE CONFIG WATCHER (monitora mudanças no config.json)
// ============================================================================
//
// Observa o diretório do arquivo (não o arquivo em si): editores que
// salvam via "grava temporário + renomeia" trocam o inode e um watch
// direto no arquivo pararia de receber eventos.
//
// ============================================================================

use crate::app_state::{AppCommand, AppState};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::thread;
use std::time::{Duration, Instant};

const DEBOUNCE: Duration = Duration::from_millis(500);

/// Ignora rajadas de eventos (um save gera vários Modify seguidos)
struct Debouncer {
    window: Duration,
    last: Option<Instant>,
}

impl Debouncer {
    fn new(window: Duration) -> Self {
        Debouncer { window, last: None }
    }

    fn ready(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last {
            if now.duration_since(last) < self.window {
                return false;
            }
        }

        self.last = Some(now);
        true
    }
}

/// O evento é uma escrita/criação do arquivo observado?
fn concerns_file(event: &Event, file_name: &OsString) -> bool {
    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
        return false;
    }

    event
        .paths
        .iter()
        .any(|p| p.file_name().map(|n| n == file_name.as_os_str()).unwrap_or(false))
}

fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

pub fn start_config_watcher(path: PathBuf, state: AppState, ctx: egui::Context) {
    thread::spawn(move || {
        info!("👁️  Thread de monitoramento do config.json iniciada");

        let Some(file_name) = path.file_name().map(|n| n.to_os_string()) else {
            error!("❌ Caminho de configuração inválido: {:?}", path);
            return;
        };

        let (tx, rx) = channel();

        let mut watcher = match notify::recommended_watcher(tx) {
            Ok(w) => w,
            Err(e) => {
                error!("❌ Erro ao criar watcher: {}", e);
                return;
            }
        };

        let dir = watch_dir(&path);
        if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
            error!("❌ Erro ao monitorar {:?}: {}", dir, e);
            return;
        }

        info!("✅ Monitorando {:?} para mudanças...", path);

        let mut debouncer = Debouncer::new(DEBOUNCE);

        for event_result in rx {
            let event = match event_result {
                Ok(event) => event,
                Err(e) => {
                    warn!("⚠️  Erro do watcher: {}", e);
                    continue;
                }
            };

            if !concerns_file(&event, &file_name) || !debouncer.ready(Instant::now()) {
                continue;
            }

            info!("");
            info!("🔄 CONFIG.JSON MODIFICADO - RECARREGANDO");

            // Dá tempo do editor terminar de escrever
            thread::sleep(Duration::from_millis(100));

            if !state.send(AppCommand::ReloadConfig) {
                break;
            }
            ctx.request_repaint();
        }

        info!("👁️  Monitoramento do config.json encerrado");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, ModifyKind};

    fn modify(path: &str) -> Event {
        Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path(PathBuf::from(path))
    }

    #[test]
    fn only_events_for_the_config_file_count() {
        let name = OsString::from("config.json");

        assert!(concerns_file(&modify("/app/config.json"), &name));
        assert!(concerns_file(
            &Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("config.json")),
            &name
        ));
        assert!(!concerns_file(&modify("/app/other.json"), &name));
        assert!(!concerns_file(
            &Event::new(EventKind::Access(AccessKind::Any)).add_path(PathBuf::from("config.json")),
            &name
        ));
    }

    #[test]
    fn bursts_are_debounced() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        let start = Instant::now();

        assert!(debouncer.ready(start));
        assert!(!debouncer.ready(start + Duration::from_millis(100)));
        assert!(!debouncer.ready(start + Duration::from_millis(499)));
        assert!(debouncer.ready(start + Duration::from_millis(600)));
    }

    #[test]
    fn relative_file_watches_current_dir() {
        assert_eq!(watch_dir(Path::new("config.json")), PathBuf::from("."));
        assert_eq!(watch_dir(Path::new("/etc/app/config.json")), PathBuf::from("/etc/app"));
    }
}
