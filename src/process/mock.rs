use crate::process::{CommandExecutor, CommandLine, CommandResult};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone)]
enum Reply {
    Result(CommandResult),
    SpawnError,
}

#[derive(Debug, Default)]
struct Script {
    rules: Vec<(String, Reply)>,
    calls: Vec<String>,
}

/// Executor replaying canned results, for testing without spawning processes
///
/// Rules match on the rendered command line by prefix; the most recently
/// added matching rule wins. Unmatched commands succeed with empty output.
/// Clones share the same script and call log.
#[derive(Debug, Clone, Default)]
pub struct ScriptedExecutor {
    script: Rc<RefCell<Script>>,
}

impl ScriptedExecutor {
    /// Create an executor where every command succeeds silently
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `result` to commands starting with `prefix`
    pub fn respond(&self, prefix: impl Into<String>, result: CommandResult) {
        self.script
            .borrow_mut()
            .rules
            .push((prefix.into(), Reply::Result(result)));
    }

    /// Fail commands starting with `prefix` with exit code 1
    pub fn fail(&self, prefix: impl Into<String>, stderr: impl Into<String>) {
        self.respond(prefix, CommandResult::failure(1, stderr));
    }

    /// Make commands starting with `prefix` fail to spawn
    pub fn spawn_error(&self, prefix: impl Into<String>) {
        self.script
            .borrow_mut()
            .rules
            .push((prefix.into(), Reply::SpawnError));
    }

    /// Every command line executed so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.script.borrow().calls.clone()
    }

    /// Number of executed commands starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.script
            .borrow()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn execute(&self, command: &CommandLine) -> std::io::Result<CommandResult> {
        let rendered = command.to_string();
        let mut script = self.script.borrow_mut();
        script.calls.push(rendered.clone());

        let reply = script
            .rules
            .iter()
            .rev()
            .find(|(prefix, _)| rendered.starts_with(prefix.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(Reply::Result(result)) => Ok(result),
            Some(Reply::SpawnError) => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{}: command not found", command.program),
            )),
            None => Ok(CommandResult::success("")),
        }
    }
}
