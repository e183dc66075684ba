/// Config file read when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "crpt.toml";

/// Positional arguments of the submit driver: `[config-path] [documents-path] [signature]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitArgs {
    pub config_path: String,
    /// JSON file holding one document or an array of documents
    pub documents_path: Option<String>,
    pub signature: String,
}

impl SubmitArgs {
    /// Parses the process arguments
    pub fn from_env() -> Self {
        Self::parse(std::env::args().skip(1))
    }

    /// Parses arguments, excluding the program name
    pub fn parse<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();

        let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let documents_path = args.next().filter(|path| path != "-");
        let signature = args.next().unwrap_or_default();

        Self { config_path, documents_path, signature }
    }
}
