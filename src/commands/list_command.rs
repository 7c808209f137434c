//! Algorithm listing command

use log::debug;

use crate::commands::command_traits::Command;
use crate::processing::{ProcessingRegistry, ProcessingResult, UavPreparerPlugin};

/// Prints every registered algorithm with its parameters
pub struct ListAlgorithmsCommand;

impl ListAlgorithmsCommand {
    pub fn new() -> Self {
        ListAlgorithmsCommand
    }

    /// Renders the listing for a registry
    pub fn render(registry: &ProcessingRegistry) -> String {
        let mut text = String::new();

        for id in registry.algorithm_ids() {
            let Some(algorithm) = registry.algorithm(&id) else { continue };
            text.push_str(&format!("{}  {}\n", id, algorithm.display_name()));

            for definition in algorithm.parameter_definitions() {
                let default = definition.default.as_deref()
                    .map(|value| format!(" [default: {}]", value))
                    .unwrap_or_default();
                let optional = if definition.optional && definition.default.is_none() { " (optional)" } else { "" };
                text.push_str(&format!("    {:<16} {}{}{}\n", definition.name, definition.description, default, optional));
            }
        }

        text
    }
}

impl Default for ListAlgorithmsCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for ListAlgorithmsCommand {
    fn execute(&self) -> ProcessingResult<()> {
        let mut registry = ProcessingRegistry::new();
        UavPreparerPlugin::register(&mut registry)?;
        debug!("Listing {} algorithm(s)", registry.algorithm_ids().len());

        print!("{}", Self::render(&registry));
        Ok(())
    }
}
