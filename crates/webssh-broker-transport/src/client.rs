//! Terminal front-end page served after a successful redemption.

use std::{path::Path, sync::Arc};

use crate::error::SetupError;

/// Client page body, read once when the server is set up.
#[derive(Debug, Clone)]
pub struct ClientPage {
    html: Arc<str>,
}

impl ClientPage {
    /// Read `client.htm` from the public directory, or use the built-in page
    /// when none is configured.
    ///
    /// # Errors
    /// Returns error if the configured page cannot be read.
    pub fn load(public_path: Option<&Path>) -> Result<Self, SetupError> {
        let html = match public_path {
            Some(dir) => {
                let path = dir.join("client.htm");
                std::fs::read_to_string(&path)
                    .map_err(|source| SetupError::ClientPage { path, source })?
            }
            None => CLIENT_HTML.to_string(),
        };
        Ok(Self { html: html.into() })
    }

    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }
}

const CLIENT_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>WebSSH</title>
    <style>
        body {
            margin: 0;
            background: #000;
            color: #d4d4d4;
            font-family: system-ui, sans-serif;
        }
        #header { padding: 4px 8px; }
        #terminal-container { width: 100%; height: calc(100vh - 30px); }
    </style>
</head>
<body>
    <div id="header"></div>
    <div id="terminal-container"></div>
</body>
</html>
"#;
