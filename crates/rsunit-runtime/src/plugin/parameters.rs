//! Parameters passed to a plug-in on initialization

use std::fmt;

/// The raw parameter string given after `plugin=` on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlugInParameters {
    command_line: String,
}

impl PlugInParameters {
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
        }
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    pub fn is_empty(&self) -> bool {
        self.command_line.trim().is_empty()
    }

    /// Whitespace separated arguments; double quotes group words
    ///
    /// Quotes are removed from the result, and `""` yields an empty argument.
    /// An unterminated quote extends to the end of the string.
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        let mut current = String::new();
        let mut in_arg = false;
        let mut quoted = false;

        for c in self.command_line.chars() {
            match c {
                '"' => {
                    quoted = !quoted;
                    in_arg = true;
                }
                c if c.is_whitespace() && !quoted => {
                    if in_arg {
                        args.push(std::mem::take(&mut current));
                        in_arg = false;
                    }
                }
                c => {
                    current.push(c);
                    in_arg = true;
                }
            }
        }
        if in_arg {
            args.push(current);
        }
        args
    }
}

impl fmt::Display for PlugInParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line)
    }
}
