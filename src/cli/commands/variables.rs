//! Variables command implementation.
//!
//! The `compose-core variables` command lists every variable the compose file
//! references, without resolving any of them.

use std::io::Write;

use crate::cli::args::VariablesArgs;
use crate::cli::table::Table;
use crate::config::{extract_variables, load_config_value, ConfigPaths, Variable};
use crate::error::{ComposeError, Result};

use super::dispatcher::{Command, CommandResult};

/// The variables command implementation.
pub struct VariablesCommand {
    paths: ConfigPaths,
    args: VariablesArgs,
}

impl VariablesCommand {
    /// Create a new variables command.
    pub fn new(paths: ConfigPaths, args: VariablesArgs) -> Self {
        Self { paths, args }
    }
}

impl Command for VariablesCommand {
    fn execute(&self, out: &mut dyn Write) -> Result<CommandResult> {
        let document = load_config_value(self.paths.require_compose_file()?)?;
        let variables = extract_variables(&document, None);

        if self.args.json {
            let list: Vec<&Variable> = variables.values().collect();
            let json =
                serde_json::to_string_pretty(&list).map_err(|e| ComposeError::Other(e.into()))?;
            writeln!(out, "{}", json)?;
            return Ok(CommandResult::success());
        }

        let mut table = Table::new(["NAME", "REQUIRED", "DEFAULT VALUE"]);
        for variable in variables.values() {
            table.add_row([
                variable.name.as_str(),
                if variable.required { "true" } else { "false" },
                variable.default_value.as_deref().unwrap_or(""),
            ]);
        }
        writeln!(out, "{}", table.render())?;

        Ok(CommandResult::success())
    }
}
