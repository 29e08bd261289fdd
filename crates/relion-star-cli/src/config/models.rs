use relion_star::core::io::parser::ParseOptions;
use relion_star::core::io::writer::WriteOptions;
use relion_star::workflows::defocus::DefocusGroupConfig;

/// Settings shared by every command after all sources are merged.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub parse: ParseOptions,
    pub write: WriteOptions,
    pub defocus: DefocusGroupConfig,
}
