use sl_core::{ProcessError, ProcessResult};

/// Open `url` with the platform's default handler. Blocks until the opener
/// has handed the URL over.
pub fn open_url(url: &str) -> ProcessResult<()> {
    open::that(url).map_err(|e| ProcessError::Browser {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Address of the web application on the local web port.
pub fn app_url(web_port: u16, browser_path: &str) -> String {
    format!("http://localhost:{web_port}{browser_path}")
}
