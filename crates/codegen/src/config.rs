#[derive(Debug, Default, Clone, Copy)]
pub struct Config {
    /// Omit all whitespace that is not required to separate tokens.
    pub minify: bool,
}
