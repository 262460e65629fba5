//! Wire actions
//!
//! The action vocabulary of the file manager protocol and its parsing.

/// Client-requested operation, parsed from the `action` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Store uploaded file parts
    Upload,
    /// Stream a file inline (browser may render it)
    Show,
    /// Stream a file as an attachment
    Download,
    /// Rename or move an entry
    Rename,
    /// Delete an entry, recursively for folders
    Delete,
    /// List a folder
    Read,
    /// Create a subfolder
    CreateFolder,
    /// Anything unrecognized, kept for the error message
    Unknown(String),
}

/// Parse the raw `action` parameter into the `Action` enum.
pub fn parse_action(raw: &str) -> Action {
    match raw {
        "upload" => Action::Upload,
        "show" => Action::Show,
        "download" => Action::Download,
        "rename" => Action::Rename,
        "delete" => Action::Delete,
        "read" => Action::Read,
        "create_folder" => Action::CreateFolder,
        other => Action::Unknown(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_actions_parse() {
        assert_eq!(parse_action("upload"), Action::Upload);
        assert_eq!(parse_action("show"), Action::Show);
        assert_eq!(parse_action("download"), Action::Download);
        assert_eq!(parse_action("rename"), Action::Rename);
        assert_eq!(parse_action("delete"), Action::Delete);
        assert_eq!(parse_action("read"), Action::Read);
        assert_eq!(parse_action("create_folder"), Action::CreateFolder);
    }

    #[test]
    fn unknown_actions_keep_their_name() {
        assert_eq!(parse_action("format"), Action::Unknown("format".to_string()));
        assert_eq!(parse_action(""), Action::Unknown(String::new()));
        // Matching is case-sensitive, like the rest of the protocol.
        assert_eq!(parse_action("Upload"), Action::Unknown("Upload".to_string()));
    }
}
