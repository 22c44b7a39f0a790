mod auth;
mod block;
mod config_cmd;
mod draft_cmd;
mod generate;
mod manual;
mod page;
mod template;

pub use auth::AuthCommand;
pub use block::BlockCommand;
pub use config_cmd::ConfigCommand;
pub use draft_cmd::DraftCommand;
pub use generate::GenerateCommand;
pub use manual::ManualCommand;
pub use page::PageCommand;
pub use template::TemplateCommand;

use clap::ValueEnum;
use neomanual::config::Config;
use neomanual::draft::DraftStore;
use neomanual_core::Editor;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub type CommandResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub fn draft_store(config: &Config) -> DraftStore {
    DraftStore::new(&config.draft_path.value)
}

pub fn load_editor(config: &Config) -> CommandResult<Editor> {
    let mut editor = draft_store(config).load()?;
    editor.set_grid_size(config.grid_size.value);
    Ok(editor)
}

/// Runs `op` on the draft. The draft is written only if `op` succeeds.
pub fn with_draft<T>(
    config: &Config,
    op: impl FnOnce(&mut Editor) -> CommandResult<T>,
) -> CommandResult<T> {
    let mut editor = load_editor(config)?;
    let result = op(&mut editor)?;
    draft_store(config).save(&editor)?;
    Ok(result)
}

/// Converts a 1-based page number from the command line.
pub fn page_index(number: usize) -> CommandResult<usize> {
    number
        .checked_sub(1)
        .ok_or_else(|| "Page numbers start at 1".into())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use tempfile::TempDir;

    /// A config whose draft and database live in a temp dir.
    pub fn test_config() -> (Config, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &config_path,
            "database_path: test.db\ndraft_path: draft.json\n",
        )
        .unwrap();
        let config = Config::load(Some(config_path)).unwrap();
        (config, temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::test_config;
    use super::*;

    #[test]
    fn test_failed_operation_keeps_draft() {
        let (config, _temp_dir) = test_config();
        let id = with_draft(&config, |editor| Ok(editor.add_text_block()?)).unwrap();

        let result: CommandResult = with_draft(&config, |editor| {
            editor.delete_block(&id)?;
            Err("boom".into())
        });
        assert!(result.is_err());

        let editor = load_editor(&config).unwrap();
        assert!(editor.layout().find_block(&id).is_some());
    }

    #[test]
    fn test_page_index() {
        assert_eq!(page_index(1).unwrap(), 0);
        assert!(page_index(0).is_err());
    }
}
