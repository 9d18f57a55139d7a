use std::path::Path;

/// Extensions of the containers the tool accepts as input.
pub const SUPPORTED_EXTENSIONS: [&str; 16] = [
    "mkv", "avi", "mp4", "3gp", "mov", "mpg", "mpeg", "qt", "wmv", "m2ts", "rmvb", "rm", "rv",
    "ogm", "flv", "asf",
];

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Container {
    #[default]
    Matroska,
}

impl ToString for Container {
    fn to_string(&self) -> String {
        match self {
            Container::Matroska => String::from("matroska"),
        }
    }
}

impl Container {
    pub fn extension(container: Container) -> &'static str {
        match container {
            Container::Matroska => "mkv",
        }
    }

    pub fn parameters(container: Container) -> Vec<String> {
        vec![
            String::from("-f"),
            container.to_string(),
        ]
    }
}

/// True iff the extension of `path` is one of `extensions`, ignoring case.
pub fn is_supported_file<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => extensions.iter().any(|e| e.as_ref().eq_ignore_ascii_case(ext)),
        None => false,
    }
}
