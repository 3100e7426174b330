// ABOUTME: Interactive credential prompts.
// ABOUTME: Reads the username from stdin and the password without echo.

use saltrun::error::{Error, Result};
use std::io::{self, BufRead, Write};

pub fn username() -> Result<String> {
    eprint!("Username: ");
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let name = line.trim().to_string();
    if name.is_empty() {
        return Err(Error::Prompt("username cannot be empty".to_string()));
    }
    Ok(name)
}

pub fn password() -> Result<String> {
    rpassword::prompt_password("Password: ").map_err(|e| Error::Prompt(e.to_string()))
}
