//! Authorization code acquisition.
//!
//! Interactive consent is reduced to a single capability: given the
//! authorization URL, produce the code the user was issued. CLI tools use
//! [`ConsolePrompt`]; server deployments can substitute a callback-URL
//! listener or any other programmatic supplier.

use std::io::{BufRead, Write};

use crate::error::{Error, Result};

/// Supplies an OAuth authorization code for a given authorization URL.
///
/// Implementations may block; this is the one designed suspension point
/// distinct from network I/O.
pub trait AuthCodeProvider: Send + Sync {
    /// Returns the authorization code for the given consent URL.
    fn authorization_code(&self, auth_url: &str) -> Result<String>;
}

/// Prompts for the authorization code on the console.
///
/// Prints the authorization URL, asks the user to visit it, and reads the
/// resulting code from stdin.
#[derive(Debug, Default)]
pub struct ConsolePrompt;

impl AuthCodeProvider for ConsolePrompt {
    fn authorization_code(&self, auth_url: &str) -> Result<String> {
        let mut stderr = std::io::stderr();
        let _ = writeln!(
            stderr,
            "Open the following link in your browser:\n{}\n",
            auth_url
        );
        let _ = write!(stderr, "Enter verification code: ");
        let _ = stderr.flush();

        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| Error::AuthExchange(format!("failed to read authorization code: {}", e)))?;

        let code = line.trim();
        if code.is_empty() {
            return Err(Error::AuthExchange("empty authorization code".to_string()));
        }
        Ok(code.to_string())
    }
}
