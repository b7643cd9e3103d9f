use tauri::Manager;

mod commands;
mod error;
mod ext;
mod state;

pub use error::{Error, Result};
pub use ext::*;
pub use hypr_storage::ObsidianVault;
pub use state::*;

const PLUGIN_NAME: &str = "settings";

fn make_specta_builder<R: tauri::Runtime>() -> tauri_specta::Builder<R> {
    tauri_specta::Builder::<R>::new()
        .plugin_name(PLUGIN_NAME)
        .commands(tauri_specta::collect_commands![
            commands::settings_path::<tauri::Wry>,
            commands::global_base::<tauri::Wry>,
            commands::vault_base::<tauri::Wry>,
            commands::change_vault_base::<tauri::Wry>,
            commands::load::<tauri::Wry>,
            commands::save::<tauri::Wry>,
            commands::obsidian_vaults::<tauri::Wry>,
        ])
        .events(tauri_specta::collect_events![])
        .error_handling(tauri_specta::ErrorHandlingMode::Result)
}

pub fn init<R: tauri::Runtime>() -> tauri::plugin::TauriPlugin<R> {
    let specta_builder = make_specta_builder();

    tauri::plugin::Builder::new(PLUGIN_NAME)
        .invoke_handler(specta_builder.invoke_handler())
        .setup(move |app, _api| {
            specta_builder.mount_events(app);

            let vault_base = app.settings().fresh_vault_base().unwrap();
            let state = state::State::new(vault_base);
            assert!(app.manage(state));
            Ok(())
        })
        .build()
}
